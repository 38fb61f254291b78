//! DB2 dialect for LUW, iSeries and z/OS.
//!
//! The three platforms share SQL but differ in pagination, in the
//! statements that need a dummy table and in the versions at which
//! features appeared. LUW versions below 11.1 page with
//! `rownumber() over()`.

use core::fmt;

use oxide_dialect_core::ast::{CastTarget, Expr, Size, SqlTypeCode};
use oxide_dialect_core::dialect::{
    common, default_column_type, push_hex, DatabaseVersion, Dialect, FunctionRegistry,
    IntervalType, LockTimeout, RowLockStrategy, TemporalType, TemporalUnit,
};
use oxide_dialect_core::exception::{
    extract_using_regex, strip_owner, ConstraintKind, JdbcError, JdbcErrorKind, SqlError,
};
use oxide_dialect_core::identity::{IdentityColumnSupport, StandardIdentityColumnSupport};
use oxide_dialect_core::pagination::{
    FetchLimitHandler, LegacyDb2LimitHandler, LimitHandler, OffsetFetchLimitHandler,
};
use oxide_dialect_core::sequence::{SequenceSupport, StandardSequenceSupport};
use oxide_dialect_core::translate::{standard, SqlAstTranslator, TranslationContext};
use oxide_dialect_core::Result;

use super::{classified, db2_select_null_string, oracle_datetime_format};

const BIND_PARAMETERS_NUMBER_LIMIT: u32 = 32_767;

const FOR_SHARE: &str = " for read only with rs use and keep share locks";
const FOR_UPDATE: &str = " for read only with rs use and keep update locks";
const SKIP_LOCKED: &str = " skip locked data";

/// The DB2 product line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Db2Platform {
    /// Linux, Unix and Windows.
    Luw,
    /// IBM i, formerly AS/400.
    ISeries,
    /// Mainframe.
    ZOs,
}

impl Db2Platform {
    /// Oldest supported version of the platform.
    #[must_use]
    pub const fn minimum_version(self) -> DatabaseVersion {
        match self {
            Self::Luw => DatabaseVersion::make(9, 0),
            Self::ISeries => DatabaseVersion::make(7, 1),
            Self::ZOs => DatabaseVersion::make(10, 0),
        }
    }
}

impl fmt::Display for Db2Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Luw => "luw",
            Self::ISeries => "iseries",
            Self::ZOs => "zos",
        })
    }
}

/// DB2 dialect.
#[derive(Debug, Clone, Copy)]
pub struct Db2Dialect {
    platform: Db2Platform,
    version: DatabaseVersion,
}

impl Db2Dialect {
    /// Oldest supported LUW version.
    pub const MINIMUM_VERSION: DatabaseVersion = Db2Platform::Luw.minimum_version();

    /// Creates a dialect for DB2 LUW.
    #[must_use]
    pub const fn new(version: DatabaseVersion) -> Self {
        Self::for_platform(Db2Platform::Luw, version)
    }

    /// Creates a dialect for a platform and its own version numbering.
    #[must_use]
    pub const fn for_platform(platform: Db2Platform, version: DatabaseVersion) -> Self {
        Self { platform, version }
    }

    /// The platform the dialect was built for.
    #[must_use]
    pub const fn platform(&self) -> Db2Platform {
        self.platform
    }

    const fn is_luw(&self) -> bool {
        matches!(self.platform, Db2Platform::Luw)
    }

    /// LUW version check; the mainframe platforms count as current.
    const fn luw_before(&self, major: u16, minor: u16) -> bool {
        self.is_luw() && self.version.is_before(major, minor)
    }

    fn lock_string(&self, base: &str, timeout: LockTimeout) -> String {
        if timeout == LockTimeout::SkipLocked && self.supports_skip_locked() {
            format!("{base}{SKIP_LOCKED}")
        } else {
            base.to_string()
        }
    }
}

impl Default for Db2Dialect {
    fn default() -> Self {
        Self::new(Self::MINIMUM_VERSION)
    }
}

impl Dialect for Db2Dialect {
    fn name(&self) -> &'static str {
        match self.platform {
            Db2Platform::Luw => "db2",
            Db2Platform::ISeries => "db2i",
            Db2Platform::ZOs => "db2zos",
        }
    }

    fn version(&self) -> DatabaseVersion {
        self.version
    }

    fn minimum_version(&self) -> DatabaseVersion {
        self.platform.minimum_version()
    }

    fn column_type(&self, code: SqlTypeCode) -> String {
        let legacy = self.luw_before(11, 0);
        match code {
            SqlTypeCode::Boolean if legacy => "smallint",
            SqlTypeCode::Tinyint => "smallint",
            SqlTypeCode::Numeric | SqlTypeCode::Decimal => "decimal($p,$s)",
            SqlTypeCode::Float | SqlTypeCode::Double => "double",
            SqlTypeCode::Nchar => "char($l)",
            SqlTypeCode::Nvarchar | SqlTypeCode::Long32nvarchar => "varchar($l)",
            SqlTypeCode::Nclob => "clob",
            SqlTypeCode::Binary if legacy => "char($l) for bit data",
            SqlTypeCode::Varbinary | SqlTypeCode::Long32varbinary if legacy => {
                "varchar($l) for bit data"
            }
            SqlTypeCode::TimeWithTimezone => "time",
            SqlTypeCode::TimestampWithTimezone => "timestamp($p)",
            SqlTypeCode::Uuid => "char(16) for bit data",
            SqlTypeCode::Json => "clob",
            other => default_column_type(other),
        }
        .to_string()
    }

    fn cast_type(&self, code: SqlTypeCode) -> String {
        match code {
            SqlTypeCode::Varchar | SqlTypeCode::Nvarchar | SqlTypeCode::Char | SqlTypeCode::Nchar => {
                self.type_name(SqlTypeCode::Varchar, Size::length(self.max_varchar_length()))
            }
            other => self.type_name(other, Size::default()),
        }
    }

    fn max_varchar_length(&self) -> u32 {
        32_672
    }

    fn max_nvarchar_length(&self) -> u32 {
        32_672
    }

    fn max_varbinary_length(&self) -> u32 {
        32_672
    }

    fn default_decimal_precision(&self) -> u32 {
        31
    }

    fn default_timestamp_precision(&self) -> u32 {
        9
    }

    fn max_identifier_length(&self) -> u32 {
        128
    }

    fn default_batch_size(&self) -> u32 {
        0
    }

    fn in_expression_count_limit(&self) -> Option<u32> {
        Some(BIND_PARAMETERS_NUMBER_LIMIT)
    }

    fn parameter_count_limit(&self) -> Option<u32> {
        Some(BIND_PARAMETERS_NUMBER_LIMIT)
    }

    fn select_clause_null_string(&self, code: SqlTypeCode) -> String {
        db2_select_null_string(code)
    }

    fn to_boolean_value_string(&self, value: bool) -> &'static str {
        match (self.luw_before(11, 0), value) {
            (true, true) => "1",
            (true, false) => "0",
            (false, true) => "true",
            (false, false) => "false",
        }
    }

    fn append_binary_literal(&self, buf: &mut String, value: &[u8]) {
        buf.push_str("BX'");
        push_hex(buf, value);
        buf.push('\'');
    }

    fn datetime_format_pattern(&self, format: &str) -> Result<String> {
        Ok(oracle_datetime_format(format))
    }

    fn format_function_pattern(&self) -> Option<&'static str> {
        Some("varchar_format(?1,?2)")
    }

    fn extract_pattern(&self, unit: TemporalUnit) -> Result<String> {
        Ok(match unit {
            TemporalUnit::Week => "week_iso(?2)".into(),
            TemporalUnit::DayOfWeek => "dayofweek(?2)".into(),
            TemporalUnit::DayOfYear => "dayofyear(?2)".into(),
            TemporalUnit::Quarter => "quarter(?2)".into(),
            TemporalUnit::Epoch => "(days(?2)-719163)*86400+midnight_seconds(?2)".into(),
            _ => "?1(?2)".into(),
        })
    }

    fn translate_duration_field(&self, unit: TemporalUnit) -> String {
        match unit {
            TemporalUnit::Native => "second".into(),
            other => other.as_str().into(),
        }
    }

    fn timestampadd_pattern(
        &self,
        unit: TemporalUnit,
        temporal_type: TemporalType,
        interval: Option<IntervalType>,
    ) -> Result<String> {
        let _ = interval;
        let cast = if unit.is_date_unit() {
            temporal_type == TemporalType::Time
        } else {
            temporal_type == TemporalType::Date
        };
        let mut pattern = String::from(if cast { "cast(?3 as timestamp)" } else { "?3" });
        pattern.push_str("+(");
        pattern.push_str(match unit {
            TemporalUnit::Native => "?2) seconds",
            TemporalUnit::Nanosecond => "(?2)/1e9) seconds",
            TemporalUnit::Week => "(?2)*7) days",
            TemporalUnit::Quarter => "(?2)*3) months",
            _ => "?2) ?1s",
        });
        Ok(pattern)
    }

    fn timestampdiff_pattern(
        &self,
        unit: TemporalUnit,
        from_type: TemporalType,
        to_type: TemporalType,
    ) -> Result<String> {
        let cast_from = from_type != TemporalType::Timestamp && !unit.is_date_unit();
        let cast_to = to_type != TemporalType::Timestamp && !unit.is_date_unit();
        let mut pattern = String::from(match unit {
            TemporalUnit::Native | TemporalUnit::Nanosecond => "(seconds_between(",
            TemporalUnit::Month | TemporalUnit::Quarter => "trunc(months_between(",
            _ => "?1s_between(",
        });
        pattern.push_str(if cast_to { "cast(?3 as timestamp)" } else { "?3" });
        pattern.push(',');
        pattern.push_str(if cast_from { "cast(?2 as timestamp)" } else { "?2" });
        pattern.push(')');
        pattern.push_str(match unit {
            TemporalUnit::Native => "+(microsecond(?3)-microsecond(?2))/1e6)",
            TemporalUnit::Nanosecond => "*1e9+(microsecond(?3)-microsecond(?2))*1e3)",
            TemporalUnit::Month => ")",
            TemporalUnit::Quarter => "/3)",
            _ => "",
        });
        Ok(pattern)
    }

    fn current_timestamp_select_string(&self) -> String {
        if self.is_luw() {
            "values current timestamp".into()
        } else {
            "select current timestamp from sysibm.sysdummy1".into()
        }
    }

    fn fractional_second_precision_in_nanos(&self) -> u64 {
        1_000_000_000
    }

    fn limit_handler(&self) -> &'static dyn LimitHandler {
        match self.platform {
            Db2Platform::Luw if self.version.is_before(11, 1) => &LegacyDb2LimitHandler::INSTANCE,
            _ if self.supports_offset_fetch_clause() => &OffsetFetchLimitHandler::INSTANCE,
            Db2Platform::Luw | Db2Platform::ISeries | Db2Platform::ZOs => {
                &FetchLimitHandler::INSTANCE
            }
        }
    }

    fn supports_offset_fetch_clause(&self) -> bool {
        match self.platform {
            Db2Platform::Luw => self.version.is_same_or_after(11, 1),
            Db2Platform::ISeries => self.version.is_same_or_after(7, 3),
            Db2Platform::ZOs => self.version.is_same_or_after(12, 0),
        }
    }

    fn sequence_support(&self) -> &'static dyn SequenceSupport {
        match self.platform {
            Db2Platform::Luw if self.version.is_before(9, 7) => &StandardSequenceSupport::DB2_LEGACY,
            Db2Platform::Luw => &StandardSequenceSupport::DB2,
            Db2Platform::ISeries | Db2Platform::ZOs => &StandardSequenceSupport::DB2_ZOS,
        }
    }

    fn identity_column_support(&self) -> &'static dyn IdentityColumnSupport {
        if self.is_luw() {
            &StandardIdentityColumnSupport::DB2
        } else {
            &StandardIdentityColumnSupport::DB2_ZOS
        }
    }

    fn query_sequences_string(&self) -> Option<&'static str> {
        Some(match self.platform {
            Db2Platform::Luw => "select * from syscat.sequences",
            Db2Platform::ISeries => "select distinct sequence_name from qsys2.syssequences",
            Db2Platform::ZOs => "select * from sysibm.syssequences",
        })
    }

    fn for_update_string(&self) -> String {
        FOR_UPDATE.into()
    }

    fn for_update_skip_locked_string(&self) -> String {
        self.lock_string(FOR_UPDATE, LockTimeout::SkipLocked)
    }

    fn read_lock_string(&self, timeout: LockTimeout) -> String {
        self.lock_string(FOR_SHARE, timeout)
    }

    fn write_lock_string(&self, timeout: LockTimeout) -> String {
        self.lock_string(FOR_UPDATE, timeout)
    }

    fn row_lock_strategy(&self) -> RowLockStrategy {
        RowLockStrategy::None
    }

    fn supports_skip_locked(&self) -> bool {
        self.is_luw() && self.version.is_same_or_after(11, 5)
    }

    fn supports_lock_timeouts(&self) -> bool {
        false
    }

    fn supports_outer_join_for_update(&self) -> bool {
        false
    }

    fn drop_schema_command(&self, name: &str) -> Vec<String> {
        vec![format!("drop schema {name} restrict")]
    }

    fn temporary_table_create_command(&self) -> &'static str {
        "declare global temporary table"
    }

    fn temporary_table_create_options(&self) -> Option<&'static str> {
        Some("not logged")
    }

    fn no_columns_insert_string(&self) -> &'static str {
        "values (default)"
    }

    fn supports_comment_on(&self) -> bool {
        true
    }

    fn supports_lateral(&self) -> bool {
        !self.luw_before(9, 1)
    }

    fn supports_distinct_from_predicate(&self) -> bool {
        !self.luw_before(11, 1)
    }

    fn supports_null_precedence(&self) -> bool {
        false
    }

    fn supports_merge(&self) -> bool {
        true
    }

    fn supports_predicate_as_expression(&self) -> bool {
        false
    }

    fn supports_exists_in_select(&self) -> bool {
        false
    }

    fn from_dual_for_select_only(&self) -> &'static str {
        " from sysibm.dual"
    }

    fn dual(&self) -> &'static str {
        "sysibm.dual"
    }

    fn initialize_function_registry(&self, registry: &mut FunctionRegistry) {
        common::cot_from_tan(registry);
        common::log_from_ln(registry);
        common::bit_length_from_length(registry);
        common::locate_position(registry);
        common::truncate_trunc(registry);
        registry.register_pattern("degrees", "degrees(?1)");
        registry.register_pattern("radians", "radians(?1)");
        registry.register_pattern("octet_length", "length(?1)");
        registry.register_pattern("posstr", "posstr(?1,?2)");
        registry.register_alias("substring", "substr");
    }

    fn lowercase_function(&self) -> &'static str {
        if self.luw_before(9, 7) {
            "lcase"
        } else {
            "lower"
        }
    }

    fn supports_untyped_function_parameters(&self) -> bool {
        false
    }

    fn convert_exception(
        &self,
        error: &SqlError,
        message: &str,
        sql: Option<&str>,
    ) -> Option<JdbcError> {
        let kind = match (error.error_code, error.sql_state()) {
            (-952, Some("57014")) => JdbcErrorKind::QueryTimeout,
            (-911, _) | (_, Some("40001")) => JdbcErrorKind::LockAcquisition,
            (-803, _) => {
                JdbcErrorKind::constraint(ConstraintKind::Unique, self.extract_constraint_name(error))
            }
            (-532..=-530, _) => JdbcErrorKind::constraint(
                ConstraintKind::ForeignKey,
                self.extract_constraint_name(error),
            ),
            (-407, _) => JdbcErrorKind::constraint(ConstraintKind::NotNull, None),
            _ => return None,
        };
        classified(self.name(), kind, error, message, sql)
    }

    fn extract_constraint_name(&self, error: &SqlError) -> Option<String> {
        // SQLERRMC carries the index number for -803 and the constraint for -530
        let token = extract_using_regex(r"SQLERRMC=(?:\d+;)?([^,;\s]+)", &error.message)?;
        Some(strip_owner(&token).to_string())
    }

    fn build_translator(&self) -> Box<dyn SqlAstTranslator<'_> + '_> {
        Box::new(Db2SqlAstTranslator::new(self))
    }
}

/// Casts the first result of a CASE whose results are all untyped bind
/// parameters, since DB2 cannot infer the type of such an expression.
#[derive(Debug)]
struct Db2SqlAstTranslator<'d> {
    context: TranslationContext<'d>,
}

impl<'d> Db2SqlAstTranslator<'d> {
    fn new(dialect: &'d dyn Dialect) -> Self {
        Self {
            context: TranslationContext::new(dialect),
        }
    }
}

fn all_results_untyped(when_clauses: &[(Expr, Expr)], else_clause: Option<&Expr>) -> bool {
    when_clauses
        .iter()
        .map(|(_, result)| result)
        .chain(else_clause)
        .all(Expr::is_untyped_parameter)
}

impl<'d> SqlAstTranslator<'d> for Db2SqlAstTranslator<'d> {
    fn context(&mut self) -> &mut TranslationContext<'d> {
        &mut self.context
    }

    fn context_ref(&self) -> &TranslationContext<'d> {
        &self.context
    }

    fn visit_case(
        &mut self,
        operand: Option<&Expr>,
        when_clauses: &[(Expr, Expr)],
        else_clause: Option<&Expr>,
    ) -> Result<()> {
        let Some(((condition, first), rest)) = when_clauses.split_first() else {
            return standard::visit_case(self, operand, when_clauses, else_clause);
        };
        if !all_results_untyped(when_clauses, else_clause) {
            return standard::visit_case(self, operand, when_clauses, else_clause);
        }
        let cast = Expr::Cast {
            expr: Box::new(first.clone()),
            target: CastTarget::new(SqlTypeCode::Varchar),
        };
        let mut clauses = Vec::with_capacity(when_clauses.len());
        clauses.push((condition.clone(), cast));
        clauses.extend(rest.iter().cloned());
        standard::visit_case(self, operand, &clauses, else_clause)
    }
}
