//! Dialect for the PostgreSQL interface of Google Cloud Spanner.
//!
//! Spanner speaks a fixed PostgreSQL 15 dialect without window functions,
//! lateral joins or sized types. Locks are plain `for update`; `nowait`,
//! `skip locked` and lock timeouts are rejected.

use oxide_dialect_core::ast::{Size, SqlTypeCode};
use oxide_dialect_core::dialect::{
    default_column_type, unsupported_unit, DatabaseVersion, Dialect, FunctionRegistry,
    IntervalType, LockOptions, LockTimeout, RowLockStrategy, TemporalType, TemporalUnit,
};
use oxide_dialect_core::exception::{
    extract_using_regex, ConstraintKind, JdbcError, JdbcErrorKind, SqlError,
};
use oxide_dialect_core::identity::{IdentityColumnSupport, StandardIdentityColumnSupport};
use oxide_dialect_core::pagination::{LimitHandler, LimitOffsetLimitHandler};
use oxide_dialect_core::sequence::{SequenceSupport, StandardSequenceSupport};
use oxide_dialect_core::translate::{
    standard, PaginationStyle, SqlAstTranslator, TranslationContext,
};
use oxide_dialect_core::Result;

use super::{classified, postgres};

const NOT_NULL_VIOLATION: &str = "(must not be NULL in table|does not specify a non-null value for NOT NULL column|Cannot specify a null value for column)";
const FOREIGN_KEY_VIOLATION: &str = "Foreign key.*(constraint violation on table|constraint violation when deleting or updating referenced key|violated on table)";
const CHECK_VIOLATION: &str = "(Check constraint)";

/// Spanner error code of an insert colliding with an existing row.
const ALREADY_EXISTS: i32 = 6;

/// Google Cloud Spanner, PostgreSQL interface.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpannerDialect;

impl SpannerDialect {
    /// The PostgreSQL version Spanner emulates, whatever it reports.
    pub const MINIMUM_VERSION: DatabaseVersion = DatabaseVersion::make(15, 0);

    /// Creates the dialect. Spanner has a single version.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn interval_pattern(&self, unit: TemporalUnit) -> Result<String> {
        let (amount, unit) = match unit {
            TemporalUnit::Nanosecond => ("(?2)/1e3", "microsecond"),
            TemporalUnit::Native => ("(?2)", "second"),
            TemporalUnit::DayOfWeek
            | TemporalUnit::DayOfMonth
            | TemporalUnit::DayOfYear
            | TemporalUnit::Epoch => return Err(unsupported_unit(self.name(), "timestampadd", unit)),
            other => ("(?2)", other.as_str()),
        };
        Ok(format!("cast(concat(cast({amount} as text), ' {unit}') as interval)"))
    }
}

impl Dialect for SpannerDialect {
    fn name(&self) -> &'static str {
        "spanner"
    }

    fn version(&self) -> DatabaseVersion {
        Self::MINIMUM_VERSION
    }

    fn minimum_version(&self) -> DatabaseVersion {
        Self::MINIMUM_VERSION
    }

    fn column_type(&self, code: SqlTypeCode) -> String {
        match code {
            // no precision on timestamps
            SqlTypeCode::Time
            | SqlTypeCode::TimeWithTimezone
            | SqlTypeCode::Timestamp
            | SqlTypeCode::TimestampWithTimezone => "timestamp with time zone",
            SqlTypeCode::Binary
            | SqlTypeCode::Varbinary
            | SqlTypeCode::Long32varbinary
            | SqlTypeCode::Blob => "bytea",
            SqlTypeCode::Clob | SqlTypeCode::Nclob => "character varying",
            SqlTypeCode::Numeric => "numeric",
            SqlTypeCode::Decimal => "decimal",
            SqlTypeCode::Char | SqlTypeCode::Nchar | SqlTypeCode::Nvarchar => "varchar($l)",
            SqlTypeCode::Tinyint | SqlTypeCode::Smallint | SqlTypeCode::Integer => "bigint",
            SqlTypeCode::Uuid => "uuid",
            SqlTypeCode::Json => "jsonb",
            other => default_column_type(other),
        }
        .to_string()
    }

    fn cast_type(&self, code: SqlTypeCode) -> String {
        match code {
            SqlTypeCode::Char
            | SqlTypeCode::Nchar
            | SqlTypeCode::Varchar
            | SqlTypeCode::Nvarchar
            | SqlTypeCode::Long32varchar
            | SqlTypeCode::Long32nvarchar => "text".into(),
            other => self.type_name(other, Size::default()),
        }
    }

    fn max_varchar_length(&self) -> u32 {
        2_621_440
    }

    fn max_varbinary_length(&self) -> u32 {
        10_485_760
    }

    fn max_identifier_length(&self) -> u32 {
        63
    }

    fn timestampadd_pattern(
        &self,
        unit: TemporalUnit,
        temporal_type: TemporalType,
        interval: Option<IntervalType>,
    ) -> Result<String> {
        if interval.is_some() {
            return Ok("(?2+?3)".into());
        }
        let target = match temporal_type {
            TemporalType::Date => "date".to_string(),
            TemporalType::Time | TemporalType::Timestamp => self.cast_type(SqlTypeCode::Timestamp),
        };
        Ok(format!("cast(?3+{} as {target})", self.interval_pattern(unit)?))
    }

    fn timestampdiff_pattern(
        &self,
        unit: TemporalUnit,
        from_type: TemporalType,
        to_type: TemporalType,
    ) -> Result<String> {
        let _ = (from_type, to_type);
        postgres::interval_field_difference(unit, "/")
            .ok_or_else(|| unsupported_unit(self.name(), "timestampdiff", unit))
    }

    fn current_time(&self) -> &'static str {
        "current_timestamp"
    }

    fn current_timestamp_select_string(&self) -> String {
        "select now()".into()
    }

    fn fractional_second_precision_in_nanos(&self) -> u64 {
        1_000
    }

    fn limit_handler(&self) -> &'static dyn LimitHandler {
        &LimitOffsetLimitHandler::INSTANCE
    }

    fn supports_offset_fetch_clause(&self) -> bool {
        false
    }

    fn sequence_support(&self) -> &'static dyn SequenceSupport {
        &StandardSequenceSupport::SPANNER
    }

    fn identity_column_support(&self) -> &'static dyn IdentityColumnSupport {
        &StandardIdentityColumnSupport::GENERATED
    }

    fn for_update_string(&self) -> String {
        " for update".into()
    }

    fn for_update_of_string(&self, aliases: &str) -> String {
        let _ = aliases;
        self.for_update_string()
    }

    fn read_lock_string(&self, timeout: LockTimeout) -> String {
        self.write_lock_string(timeout)
    }

    fn write_lock_string(&self, timeout: LockTimeout) -> String {
        let _ = timeout;
        self.for_update_string()
    }

    fn row_lock_strategy(&self) -> RowLockStrategy {
        RowLockStrategy::None
    }

    fn supports_lock_timeouts(&self) -> bool {
        false
    }

    fn add_foreign_key_constraint_string(
        &self,
        constraint_name: &str,
        foreign_key: &[&str],
        referenced_table: &str,
        primary_key: &[&str],
        references_primary_key: bool,
    ) -> String {
        // referenced columns are always listed
        let _ = references_primary_key;
        format!(
            " add constraint {} foreign key ({}) references {referenced_table} ({})",
            self.quote(constraint_name),
            foreign_key.join(", "),
            primary_key.join(", ")
        )
    }

    fn cascade_constraints_string(&self) -> &'static str {
        ""
    }

    fn no_columns_insert_string(&self) -> &'static str {
        "default values"
    }

    fn supports_if_exists_before_table_name(&self) -> bool {
        true
    }

    fn supports_window_functions(&self) -> bool {
        false
    }

    fn supports_row_value_constructor_syntax(&self) -> bool {
        false
    }

    fn supports_update_from(&self) -> bool {
        false
    }

    fn supports_merge(&self) -> bool {
        false
    }

    fn supports_recursive_cte(&self) -> bool {
        false
    }

    fn from_dual_for_select_only(&self) -> &'static str {
        " from unnest(ARRAY[1]) dual"
    }

    fn dual(&self) -> &'static str {
        "unnest(ARRAY[1])"
    }

    fn initialize_function_registry(&self, registry: &mut FunctionRegistry) {
        registry.register_alias("substring", "substr");
        registry.register_pattern("left", "substr(?1,1,?2)");
        registry.register_pattern("right", "substr(?1,-?2)");
        registry.register_alias("every", "bool_and");
        registry.register_alias("any", "bool_or");
    }

    fn convert_exception(
        &self,
        error: &SqlError,
        message: &str,
        sql: Option<&str>,
    ) -> Option<JdbcError> {
        let message_text = error.message.as_str();
        let constraint = if error.error_code == ALREADY_EXISTS {
            Some(ConstraintKind::Unique)
        } else if extract_using_regex(NOT_NULL_VIOLATION, message_text).is_some() {
            Some(ConstraintKind::NotNull)
        } else if extract_using_regex(CHECK_VIOLATION, message_text).is_some() {
            Some(ConstraintKind::Check)
        } else if extract_using_regex(FOREIGN_KEY_VIOLATION, message_text).is_some() {
            Some(ConstraintKind::ForeignKey)
        } else {
            None
        };
        match constraint {
            // Spanner messages name no constraint
            Some(kind) => classified(
                self.name(),
                JdbcErrorKind::constraint(kind, None),
                error,
                message,
                sql,
            ),
            None => postgres::convert_sql_state(self.name(), error, message, sql),
        }
    }

    fn build_translator(&self) -> Box<dyn SqlAstTranslator<'_> + '_> {
        Box::new(SpannerSqlAstTranslator::new(self))
    }
}

/// Translator paging with `limit ? offset ?` and refusing lock timeouts.
#[derive(Debug)]
pub struct SpannerSqlAstTranslator<'d> {
    context: TranslationContext<'d>,
}

impl<'d> SpannerSqlAstTranslator<'d> {
    /// Creates a translator for `dialect`.
    #[must_use]
    pub fn new(dialect: &'d SpannerDialect) -> Self {
        Self {
            context: TranslationContext::new(dialect),
        }
    }
}

impl<'d> SqlAstTranslator<'d> for SpannerSqlAstTranslator<'d> {
    fn context(&mut self) -> &mut TranslationContext<'d> {
        &mut self.context
    }

    fn context_ref(&self) -> &TranslationContext<'d> {
        &self.context
    }

    fn pagination_style(&self) -> PaginationStyle {
        PaginationStyle::LimitOffset
    }

    fn render_lock(&mut self, options: &LockOptions) -> Result<()> {
        if options.mode.is_pessimistic() {
            match options.effective_timeout() {
                LockTimeout::NoWait => return Err(standard::unsupported(self, "no wait")),
                LockTimeout::SkipLocked => return Err(standard::unsupported(self, "skip locked")),
                LockTimeout::Millis(_) => return Err(standard::unsupported(self, "lock timeout")),
                LockTimeout::WaitForever => {}
            }
        }
        standard::render_lock(self, options)
    }
}
