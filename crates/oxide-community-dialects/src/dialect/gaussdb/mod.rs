//! GaussDB and openGauss dialect.
//!
//! GaussDB grew out of PostgreSQL, so types, temporal arithmetic and error
//! states follow it. Pagination uses the MySQL style `limit ?, ?`, and
//! `to_char` formats datetimes with Oracle style patterns.

mod aggregate;

pub use aggregate::{AggregateComponent, AggregateKind, ComponentUpdate, GaussDbAggregateSupport};

use oxide_dialect_core::ast::{Size, SqlTypeCode};
use oxide_dialect_core::dialect::{
    common, default_column_type, push_hex, DatabaseVersion, Dialect, FunctionRegistry,
    IntervalType, LockTimeout, RowLockStrategy, TemporalType, TemporalUnit,
};
use oxide_dialect_core::exception::{JdbcError, SqlError};
use oxide_dialect_core::identity::{IdentityColumnSupport, StandardIdentityColumnSupport};
use oxide_dialect_core::pagination::{LimitHandler, LimitLimitHandler};
use oxide_dialect_core::sequence::{SequenceSupport, StandardSequenceSupport};
use oxide_dialect_core::translate::{PaginationStyle, SqlAstTranslator};
use oxide_dialect_core::{DialectError, Result};

use super::{oracle_datetime_format, postgres, PagingTranslator};

/// GaussDB dialect.
#[derive(Debug, Clone, Copy)]
pub struct GaussDbDialect {
    version: DatabaseVersion,
}

impl GaussDbDialect {
    /// Oldest supported version.
    pub const MINIMUM_VERSION: DatabaseVersion = DatabaseVersion::make(2, 0);

    /// Creates a dialect for a GaussDB version.
    #[must_use]
    pub const fn new(version: DatabaseVersion) -> Self {
        Self { version }
    }

    /// Prefixes `sql` with an optimizer hint comment.
    #[must_use]
    pub fn query_hint_string(&self, sql: &str, hints: &str) -> String {
        if hints.trim().is_empty() {
            sql.to_string()
        } else {
            format!("/*+ {hints} */ {sql}")
        }
    }

    /// Statements creating an enum type usable wherever a `varchar` is.
    #[must_use]
    pub fn create_enum_type_command(&self, name: &str, values: &[&str]) -> Vec<String> {
        let values = values
            .iter()
            .map(|value| format!("'{}'", value.replace('\'', "''")))
            .collect::<Vec<_>>()
            .join(",");
        vec![
            format!("create type {name} as enum ({values})"),
            format!("create cast (varchar as {name}) with inout as implicit"),
            format!("create cast ({name} as varchar) with inout as implicit"),
        ]
    }

    /// Statement dropping an enum type and the casts depending on it.
    #[must_use]
    pub fn drop_enum_type_command(&self, name: &str) -> String {
        format!("drop type if exists {name} cascade")
    }

    /// Support for JSON, XML and composite type aggregate columns.
    #[must_use]
    pub const fn aggregate_support(&self) -> GaussDbAggregateSupport {
        GaussDbAggregateSupport::INSTANCE
    }
}

impl Default for GaussDbDialect {
    fn default() -> Self {
        Self::new(Self::MINIMUM_VERSION)
    }
}

/// Drops the `(...)` size groups of a column type.
fn raw_type_name(column_type: &str) -> String {
    let mut depth = 0_u32;
    let mut raw = String::with_capacity(column_type.len());
    for c in column_type.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => raw.push(c),
            _ => {}
        }
    }
    raw.trim().to_string()
}

impl Dialect for GaussDbDialect {
    fn name(&self) -> &'static str {
        "gaussdb"
    }

    fn version(&self) -> DatabaseVersion {
        self.version
    }

    fn minimum_version(&self) -> DatabaseVersion {
        Self::MINIMUM_VERSION
    }

    fn column_type(&self, code: SqlTypeCode) -> String {
        match code {
            SqlTypeCode::Tinyint => "smallint",
            SqlTypeCode::Nchar => "char($l)",
            SqlTypeCode::Nvarchar => "varchar($l)",
            SqlTypeCode::Long32varchar | SqlTypeCode::Long32nvarchar | SqlTypeCode::Clob => {
                "text"
            }
            SqlTypeCode::Nclob => "clob",
            SqlTypeCode::Binary
            | SqlTypeCode::Varbinary
            | SqlTypeCode::Long32varbinary
            | SqlTypeCode::Blob => "bytea",
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
            | SqlTypeCode::Nvarchar => "varchar".into(),
            SqlTypeCode::Long32varchar | SqlTypeCode::Long32nvarchar => "text".into(),
            SqlTypeCode::Nclob => "clob".into(),
            SqlTypeCode::Binary | SqlTypeCode::Varbinary | SqlTypeCode::Long32varbinary => {
                "bytea".into()
            }
            other => self.type_name(other, Size::default()),
        }
    }

    fn max_varchar_length(&self) -> u32 {
        10_485_760
    }

    fn max_varbinary_length(&self) -> u32 {
        i32::MAX.unsigned_abs()
    }

    fn max_identifier_length(&self) -> u32 {
        63
    }

    fn default_batch_size(&self) -> u32 {
        15
    }

    fn select_clause_null_string(&self, code: SqlTypeCode) -> String {
        format!("cast(null as {})", raw_type_name(&self.column_type(code)))
    }

    fn append_binary_literal(&self, buf: &mut String, value: &[u8]) {
        buf.push_str("bytea '\\x");
        push_hex(buf, value);
        buf.push('\'');
    }

    fn datetime_format_pattern(&self, format: &str) -> Result<String> {
        Ok(oracle_datetime_format(format))
    }

    fn format_function_pattern(&self) -> Option<&'static str> {
        Some("to_char(?1,?2)")
    }

    fn extract_pattern(&self, unit: TemporalUnit) -> Result<String> {
        Ok(match unit {
            // dow counts from 0
            TemporalUnit::DayOfWeek => "(extract(?1 from ?2)+1)".into(),
            _ => "extract(?1 from ?2)".into(),
        })
    }

    fn translate_extract_field(&self, unit: TemporalUnit) -> String {
        match unit {
            TemporalUnit::DayOfMonth => "day".into(),
            TemporalUnit::DayOfYear => "doy".into(),
            TemporalUnit::DayOfWeek => "dow".into(),
            other => other.as_str().into(),
        }
    }

    fn timestampadd_pattern(
        &self,
        unit: TemporalUnit,
        temporal_type: TemporalType,
        interval: Option<IntervalType>,
    ) -> Result<String> {
        postgres::timestampadd_pattern(self.name(), unit, temporal_type, interval, "second")
    }

    fn timestampdiff_pattern(
        &self,
        unit: TemporalUnit,
        from_type: TemporalType,
        to_type: TemporalType,
    ) -> Result<String> {
        let _ = (from_type, to_type);
        if let Some(pattern) = postgres::interval_field_difference(unit, "/") {
            return Ok(pattern);
        }
        match unit {
            TemporalUnit::Hour
            | TemporalUnit::Minute
            | TemporalUnit::Second
            | TemporalUnit::Nanosecond
            | TemporalUnit::Native => Ok(format!(
                "extract(epoch from ?3-?2){}",
                TemporalUnit::Second
                    .conversion_factor(unit, self.fractional_second_precision_in_nanos())?
            )),
            _ => Err(DialectError::Semantic(format!("unrecognized field: {unit}"))),
        }
    }

    fn current_time(&self) -> &'static str {
        "localtime"
    }

    fn current_timestamp(&self) -> &'static str {
        "localtimestamp"
    }

    fn current_timestamp_select_string(&self) -> String {
        "select now()".into()
    }

    fn fractional_second_precision_in_nanos(&self) -> u64 {
        1_000_000_000
    }

    fn limit_handler(&self) -> &'static dyn LimitHandler {
        &LimitLimitHandler::INSTANCE
    }

    fn supports_offset_fetch_clause(&self) -> bool {
        false
    }

    fn sequence_support(&self) -> &'static dyn SequenceSupport {
        &StandardSequenceSupport::POSTGRESQL
    }

    fn identity_column_support(&self) -> &'static dyn IdentityColumnSupport {
        &StandardIdentityColumnSupport::SERIAL
    }

    fn query_sequences_string(&self) -> Option<&'static str> {
        Some("select * from information_schema.sequences")
    }

    fn for_update_string(&self) -> String {
        " for update".into()
    }

    fn read_lock_string(&self, timeout: LockTimeout) -> String {
        match timeout {
            LockTimeout::NoWait => " for share nowait".into(),
            LockTimeout::SkipLocked => " for share skip locked".into(),
            LockTimeout::WaitForever | LockTimeout::Millis(_) => " for share".into(),
        }
    }

    fn row_lock_strategy(&self) -> RowLockStrategy {
        RowLockStrategy::Table
    }

    fn supports_skip_locked(&self) -> bool {
        true
    }

    fn supports_no_wait(&self) -> bool {
        true
    }

    fn supports_outer_join_for_update(&self) -> bool {
        false
    }

    fn cascade_constraints_string(&self) -> &'static str {
        " cascade"
    }

    fn no_columns_insert_string(&self) -> &'static str {
        "default values"
    }

    fn supports_if_exists_before_table_name(&self) -> bool {
        true
    }

    fn supports_comment_on(&self) -> bool {
        true
    }

    fn supports_distinct_from_predicate(&self) -> bool {
        true
    }

    fn supports_merge(&self) -> bool {
        self.version.is_same_or_after(15, 0)
    }

    fn supports_case_insensitive_like(&self) -> bool {
        true
    }

    fn initialize_function_registry(&self, registry: &mut FunctionRegistry) {
        common::bit_length_from_octet_length(registry);
        common::locate_position(registry);
        common::truncate_trunc(registry);
        registry.register_alias("every", "bool_and");
        registry.register_alias("any", "bool_or");
        registry.register_alias("listagg", "string_agg");
        registry.register_pattern("bitxor", "(?1#?2)");
    }

    fn convert_exception(
        &self,
        error: &SqlError,
        message: &str,
        sql: Option<&str>,
    ) -> Option<JdbcError> {
        postgres::convert_sql_state(self.name(), error, message, sql)
    }

    fn extract_constraint_name(&self, error: &SqlError) -> Option<String> {
        postgres::extract_constraint_name(error)
    }

    fn build_translator(&self) -> Box<dyn SqlAstTranslator<'_> + '_> {
        Box::new(PagingTranslator::new(self, PaginationStyle::LimitComma))
    }
}

#[cfg(test)]
mod tests {
    use oxide_dialect_core::ast::{Expr, SelectColumn, SelectStatement, Statement, TableRef};
    use oxide_dialect_core::dialect::{LockMode, LockOptions};
    use oxide_dialect_core::translate::QueryOptions;

    use super::*;

    #[test]
    fn test_types() {
        let dialect = GaussDbDialect::default();
        assert_eq!(dialect.column_type(SqlTypeCode::Blob), "bytea");
        assert_eq!(dialect.column_type(SqlTypeCode::Clob), "text");
        assert_eq!(dialect.cast_type(SqlTypeCode::Nchar), "varchar");
        assert_eq!(
            dialect.select_clause_null_string(SqlTypeCode::Varchar),
            "cast(null as varchar)"
        );
        assert_eq!(
            dialect.select_clause_null_string(SqlTypeCode::Decimal),
            "cast(null as decimal)"
        );
        let mut literal = String::new();
        dialect.append_binary_literal(&mut literal, &[0xca, 0xfe]);
        assert_eq!(literal, "bytea '\\xCAFE'");
    }

    #[test]
    fn test_temporal_patterns() {
        let dialect = GaussDbDialect::default();
        let ts = TemporalType::Timestamp;
        assert_eq!(
            dialect.timestampdiff_pattern(TemporalUnit::Quarter, ts, ts).unwrap(),
            "(extract(year from ?3-?2)*4+extract(month from ?3-?2)/3)"
        );
        assert_eq!(
            dialect.timestampdiff_pattern(TemporalUnit::Hour, ts, ts).unwrap(),
            "extract(epoch from ?3-?2)/3600"
        );
        assert!(dialect
            .timestampdiff_pattern(TemporalUnit::DayOfYear, ts, ts)
            .is_err());
        assert_eq!(
            dialect.timestampadd_pattern(TemporalUnit::Native, ts, None).unwrap(),
            "cast(?3+(?2)*interval '1 second' as timestamp)"
        );
        assert_eq!(dialect.translate_extract_field(TemporalUnit::DayOfWeek), "dow");
        assert_eq!(dialect.current_timestamp(), "localtimestamp");
    }

    #[test]
    fn test_format() {
        let dialect = GaussDbDialect::default();
        assert_eq!(dialect.format_function_pattern(), Some("to_char(?1,?2)"));
        assert_eq!(
            dialect.datetime_format_pattern("yyyy-MM-dd HH:mm:ss").unwrap(),
            "YYYY-MM-DD HH24:MI:SS"
        );
    }

    #[test]
    fn test_locking() {
        let dialect = GaussDbDialect::default();
        let read = LockOptions::new(LockMode::PessimisticRead);
        assert_eq!(dialect.lock_clause(&read), " for share");
        assert_eq!(
            dialect.lock_clause(&read.with_timeout(LockTimeout::SkipLocked)),
            " for share skip locked"
        );
        assert_eq!(
            dialect.lock_clause(&LockOptions::new(LockMode::UpgradeNoWait)),
            " for update nowait"
        );
        assert_eq!(
            dialect.lock_clause(
                &LockOptions::new(LockMode::PessimisticWrite).with_timeout(LockTimeout::Millis(500))
            ),
            " for update"
        );
    }

    #[test]
    fn test_limit_comma() {
        let mut select = SelectStatement::new(
            vec![SelectColumn::new(Expr::column("a"))],
            Some(TableRef::table("t")),
        );
        select.limit = Some(Expr::param(1));
        select.offset = Some(Expr::param(2));
        let operation = GaussDbDialect::default()
            .translate(&Statement::Select(select), &QueryOptions::default())
            .unwrap();
        assert_eq!(operation.sql, "select a from t limit ?,?");
    }

    #[test]
    fn test_enum_types_and_hints() {
        let dialect = GaussDbDialect::default();
        assert_eq!(
            dialect.create_enum_type_command("mood", &["sad", "o'k"]),
            vec![
                "create type mood as enum ('sad','o''k')".to_string(),
                "create cast (varchar as mood) with inout as implicit".to_string(),
                "create cast (mood as varchar) with inout as implicit".to_string(),
            ]
        );
        assert_eq!(dialect.drop_enum_type_command("mood"), "drop type if exists mood cascade");
        assert_eq!(
            dialect.query_hint_string("select 1", "indexscan(t)"),
            "/*+ indexscan(t) */ select 1"
        );
        assert_eq!(dialect.query_hint_string("select 1", " "), "select 1");
    }

    #[test]
    fn test_merge_by_version() {
        assert!(!GaussDbDialect::default().supports_merge());
        assert!(GaussDbDialect::new(DatabaseVersion::make(15, 0)).supports_merge());
    }
}
