//! Sybase Adaptive Server Enterprise dialect, 15.0 and later.

use oxide_dialect_core::ast::{DatetimeLiteral, SqlTypeCode};
use oxide_dialect_core::dialect::{
    common, push_hex, unsupported_unit, DatabaseVersion, Dialect, FunctionRegistry,
    IntervalType, LockMode, LockOptions, LockTimeout, TemporalType, TemporalUnit,
};
use oxide_dialect_core::exception::{
    extract_using_template, ConstraintKind, JdbcError, JdbcErrorKind, SqlError,
};
use oxide_dialect_core::identity::{IdentityColumnSupport, StandardIdentityColumnSupport};
use oxide_dialect_core::pagination::{LimitHandler, TopLimitHandler};
use oxide_dialect_core::sequence::{NoSequenceSupport, SequenceSupport};
use oxide_dialect_core::translate::{PaginationStyle, SqlAstTranslator};
use oxide_dialect_core::Result;

use super::{classified, transact_sql_column_type, PagingTranslator};

/// Sybase ASE dialect.
#[derive(Debug, Clone, Copy)]
pub struct SybaseDialect {
    version: DatabaseVersion,
}

impl SybaseDialect {
    /// Oldest supported version.
    pub const MINIMUM_VERSION: DatabaseVersion = DatabaseVersion::make(15, 0);

    /// Creates a dialect for an ASE version.
    #[must_use]
    pub const fn new(version: DatabaseVersion) -> Self {
        Self { version }
    }

    /// 15.5 brought `bigdatetime` and `bigtime` with microseconds.
    const fn has_big_datetime(&self) -> bool {
        self.version.is_same_or_after(15, 5)
    }
}

impl Default for SybaseDialect {
    fn default() -> Self {
        Self::new(Self::MINIMUM_VERSION)
    }
}

impl Dialect for SybaseDialect {
    fn name(&self) -> &'static str {
        "sybase"
    }

    fn version(&self) -> DatabaseVersion {
        self.version
    }

    fn minimum_version(&self) -> DatabaseVersion {
        Self::MINIMUM_VERSION
    }

    fn column_type(&self, code: SqlTypeCode) -> String {
        let big = self.has_big_datetime();
        match code {
            // bit columns cannot be null
            SqlTypeCode::Boolean => "tinyint",
            SqlTypeCode::Double => "double precision",
            SqlTypeCode::Date => "date",
            SqlTypeCode::Time | SqlTypeCode::TimeWithTimezone if big => "bigtime",
            SqlTypeCode::Time | SqlTypeCode::TimeWithTimezone => "time",
            SqlTypeCode::Timestamp | SqlTypeCode::TimestampWithTimezone if big => "bigdatetime",
            SqlTypeCode::Nchar => "unichar($l)",
            SqlTypeCode::Nvarchar => "univarchar($l)",
            SqlTypeCode::Long32varchar | SqlTypeCode::Json => "text",
            SqlTypeCode::Long32nvarchar | SqlTypeCode::Nclob => "unitext",
            SqlTypeCode::Long32varbinary => "image",
            SqlTypeCode::Uuid => "binary(16)",
            other => transact_sql_column_type(other),
        }
        .to_string()
    }

    fn max_varchar_length(&self) -> u32 {
        16_384
    }

    fn max_nvarchar_length(&self) -> u32 {
        8_192
    }

    fn max_varbinary_length(&self) -> u32 {
        16_384
    }

    fn default_timestamp_precision(&self) -> u32 {
        if self.has_big_datetime() {
            6
        } else {
            3
        }
    }

    fn max_identifier_length(&self) -> u32 {
        255
    }

    fn parameter_count_limit(&self) -> Option<u32> {
        Some(2048)
    }

    fn to_boolean_value_string(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    fn append_binary_literal(&self, buf: &mut String, value: &[u8]) {
        buf.push_str("0x");
        push_hex(buf, value);
    }

    fn append_datetime_literal(&self, buf: &mut String, value: DatetimeLiteral) {
        let literal = match value {
            DatetimeLiteral::Date(d) => format!("cast('{}' as date)", d.format("%Y-%m-%d")),
            DatetimeLiteral::Time(t) if self.has_big_datetime() => {
                format!("cast('{}' as bigtime)", t.format("%H:%M:%S%.6f"))
            }
            DatetimeLiteral::Time(t) => format!("cast('{}' as time)", t.format("%H:%M:%S")),
            DatetimeLiteral::Timestamp(ts) if self.has_big_datetime() => format!(
                "cast('{}' as bigdatetime)",
                ts.format("%Y-%m-%d %H:%M:%S%.6f")
            ),
            DatetimeLiteral::Timestamp(ts) => {
                format!("cast('{}' as datetime)", ts.format("%Y-%m-%d %H:%M:%S%.3f"))
            }
        };
        buf.push_str(&literal);
    }

    fn extract_pattern(&self, unit: TemporalUnit) -> Result<String> {
        Ok(match unit {
            TemporalUnit::Epoch => "datediff(second,'1970-01-01',?2)",
            _ => "datepart(?1,?2)",
        }
        .into())
    }

    fn translate_extract_field(&self, unit: TemporalUnit) -> String {
        match unit {
            TemporalUnit::Week => "calweekofyear".into(),
            TemporalUnit::DayOfMonth => "day".into(),
            TemporalUnit::DayOfYear => "dayofyear".into(),
            TemporalUnit::DayOfWeek => "weekday".into(),
            other => other.as_str().into(),
        }
    }

    fn translate_duration_field(&self, unit: TemporalUnit) -> String {
        match unit {
            TemporalUnit::Native => "microsecond".into(),
            other => other.as_str().into(),
        }
    }

    fn timestampadd_pattern(
        &self,
        unit: TemporalUnit,
        _temporal_type: TemporalType,
        _interval: Option<IntervalType>,
    ) -> Result<String> {
        Ok(match unit {
            TemporalUnit::Nanosecond => "dateadd(microsecond,(?2)/1000,?3)",
            TemporalUnit::Native => "dateadd(microsecond,?2,?3)",
            TemporalUnit::Year
            | TemporalUnit::Quarter
            | TemporalUnit::Month
            | TemporalUnit::Week
            | TemporalUnit::Day
            | TemporalUnit::Hour
            | TemporalUnit::Minute
            | TemporalUnit::Second => "dateadd(?1,?2,?3)",
            other => return Err(unsupported_unit(self.name(), "timestampadd", other)),
        }
        .into())
    }

    fn timestampdiff_pattern(
        &self,
        unit: TemporalUnit,
        _from_type: TemporalType,
        _to_type: TemporalType,
    ) -> Result<String> {
        Ok(match unit {
            TemporalUnit::Nanosecond => "(datediff(microsecond,?2,?3)*1000)",
            TemporalUnit::Native => "datediff(microsecond,?2,?3)",
            TemporalUnit::Year
            | TemporalUnit::Quarter
            | TemporalUnit::Month
            | TemporalUnit::Week
            | TemporalUnit::Day
            | TemporalUnit::Hour
            | TemporalUnit::Minute
            | TemporalUnit::Second => "datediff(?1,?2,?3)",
            other => return Err(unsupported_unit(self.name(), "timestampdiff", other)),
        }
        .into())
    }

    fn current_date(&self) -> &'static str {
        "current_date()"
    }

    fn current_time(&self) -> &'static str {
        "current_time()"
    }

    fn current_timestamp(&self) -> &'static str {
        "getdate()"
    }

    fn current_timestamp_select_string(&self) -> String {
        "select getdate()".into()
    }

    fn fractional_second_precision_in_nanos(&self) -> u64 {
        1000
    }

    fn limit_handler(&self) -> &'static dyn LimitHandler {
        &TopLimitHandler::INLINE_INSTANCE
    }

    fn supports_offset_fetch_clause(&self) -> bool {
        false
    }

    fn sequence_support(&self) -> &'static dyn SequenceSupport {
        &NoSequenceSupport::INSTANCE
    }

    fn identity_column_support(&self) -> &'static dyn IdentityColumnSupport {
        &StandardIdentityColumnSupport::SYBASE
    }

    fn for_update_string(&self) -> String {
        String::new()
    }

    fn uses_lock_hints(&self) -> bool {
        true
    }

    fn append_lock_hint(&self, options: &LockOptions, table: &str) -> String {
        if !options.mode.is_pessimistic() {
            return table.to_string();
        }
        if options.mode == LockMode::UpgradeSkipLocked
            || options.effective_timeout() == LockTimeout::SkipLocked
        {
            format!("{table} readpast")
        } else {
            format!("{table} holdlock")
        }
    }

    fn supports_skip_locked(&self) -> bool {
        true
    }

    fn supports_lock_timeouts(&self) -> bool {
        false
    }

    fn supports_outer_join_for_update(&self) -> bool {
        false
    }

    fn add_column_string(&self) -> &'static str {
        "add"
    }

    fn cascade_constraints_string(&self) -> &'static str {
        ""
    }

    fn create_schema_command(&self, _name: &str) -> Vec<String> {
        Vec::new()
    }

    fn drop_schema_command(&self, _name: &str) -> Vec<String> {
        Vec::new()
    }

    fn temporary_table_create_command(&self) -> &'static str {
        "create table"
    }

    fn supports_window_functions(&self) -> bool {
        false
    }

    fn supports_values_list(&self) -> bool {
        false
    }

    fn supports_values_list_for_insert(&self) -> bool {
        false
    }

    fn supports_row_value_constructor_syntax(&self) -> bool {
        false
    }

    fn supports_null_precedence(&self) -> bool {
        false
    }

    fn supports_intersect(&self) -> bool {
        false
    }

    fn supports_except(&self) -> bool {
        false
    }

    fn supports_merge(&self) -> bool {
        self.version.is_same_or_after(15, 7)
    }

    fn supports_update_from(&self) -> bool {
        true
    }

    fn supports_predicate_as_expression(&self) -> bool {
        false
    }

    fn supports_boolean_expression_as_predicate(&self) -> bool {
        false
    }

    fn supports_recursive_cte(&self) -> bool {
        false
    }

    fn supports_exists_in_select(&self) -> bool {
        false
    }

    fn from_dual_for_select_only(&self) -> &'static str {
        ""
    }

    fn dual(&self) -> &'static str {
        "(select 1 c1)"
    }

    fn open_quote(&self) -> char {
        '['
    }

    fn close_quote(&self) -> char {
        ']'
    }

    fn concat_operator(&self) -> &'static str {
        "+"
    }

    fn initialize_function_registry(&self, registry: &mut FunctionRegistry) {
        common::locate_charindex(registry);
        registry.register_pattern("bit_length", "datalength(?1)*8");
        registry.register_pattern("mod", "(?1 % ?2)");
        registry.register_pattern("repeat", "replicate(?1,?2)");
        registry.register_alias("character_length", "char_length");
        registry.register_no_args("getdate", "getdate()");
        registry.register_no_args("newid", "newid()");
    }

    fn convert_exception(
        &self,
        error: &SqlError,
        message: &str,
        sql: Option<&str>,
    ) -> Option<JdbcError> {
        if matches!(error.sql_state(), Some("JZ0TO" | "JZ006")) {
            return classified(self.name(), JdbcErrorKind::QueryTimeout, error, message, sql);
        }
        let constraint = |kind| JdbcErrorKind::constraint(kind, self.extract_constraint_name(error));
        let kind = match error.error_code {
            12205 => JdbcErrorKind::LockTimeout,
            1205 => JdbcErrorKind::LockAcquisition,
            2601 | 2627 => constraint(ConstraintKind::Unique),
            515 => constraint(ConstraintKind::NotNull),
            546 | 547 => constraint(ConstraintKind::ForeignKey),
            _ => return None,
        };
        classified(self.name(), kind, error, message, sql)
    }

    fn extract_constraint_name(&self, error: &SqlError) -> Option<String> {
        match error.error_code {
            2601 | 2627 => extract_using_template("unique index '", "'", &error.message)
                .or_else(|| extract_using_template("constraint '", "'", &error.message)),
            546 | 547 => extract_using_template("constraint name = '", "'", &error.message),
            _ => None,
        }
    }

    fn build_translator(&self) -> Box<dyn SqlAstTranslator<'_> + '_> {
        Box::new(PagingTranslator::new(
            self,
            PaginationStyle::Top {
                parenthesized: false,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use oxide_dialect_core::ast::{Expr, SelectColumn, SelectStatement, Statement, TableRef};
    use oxide_dialect_core::pagination::Limit;
    use oxide_dialect_core::translate::QueryOptions;
    use oxide_dialect_core::DialectError;

    use super::*;

    fn sybase(major: u16, minor: u16) -> SybaseDialect {
        SybaseDialect::new(DatabaseVersion::make(major, minor))
    }

    fn select_a() -> SelectStatement {
        SelectStatement::new(
            vec![SelectColumn::new(Expr::column("a"))],
            Some(TableRef::table("t").alias("x")),
        )
    }

    #[test]
    fn test_column_types() {
        assert_eq!(sybase(15, 0).column_type(SqlTypeCode::Timestamp), "datetime");
        assert_eq!(sybase(15, 7).column_type(SqlTypeCode::Timestamp), "bigdatetime");
        assert_eq!(sybase(15, 0).column_type(SqlTypeCode::Boolean), "tinyint");
        assert_eq!(sybase(15, 0).column_type(SqlTypeCode::Blob), "image");
        assert_eq!(sybase(15, 0).column_type(SqlTypeCode::Nvarchar), "univarchar($l)");
    }

    #[test]
    fn test_holdlock_hint() {
        let mut select = select_a();
        select.where_clause = Some(Expr::column("a").eq(Expr::param(1)));
        let options =
            QueryOptions::default().with_lock(LockOptions::new(LockMode::PessimisticWrite));
        let operation = SybaseDialect::default()
            .translate(&Statement::Select(select), &options)
            .unwrap();
        assert_eq!(operation.sql, "select a from t x holdlock where a=?");

        let skip = LockOptions::new(LockMode::PessimisticWrite).with_timeout(LockTimeout::SkipLocked);
        assert_eq!(SybaseDialect::default().append_lock_hint(&skip, "t"), "t readpast");
    }

    #[test]
    fn test_top() {
        let mut select = select_a();
        select.limit = Some(Expr::param(1));
        let operation = SybaseDialect::default()
            .translate(&Statement::Select(select), &QueryOptions::default())
            .unwrap();
        assert_eq!(operation.sql, "select top ? a from t x");

        let limited = SybaseDialect::default()
            .limit_handler()
            .process_sql("select a from t", &Limit::new(None, Some(10)))
            .unwrap();
        assert_eq!(limited.sql, "select top 10 a from t");
    }

    #[test]
    fn test_offsets_need_window_functions() {
        let mut select = select_a();
        select.limit = Some(Expr::param(1));
        select.offset = Some(Expr::param(2));
        let error = SybaseDialect::default()
            .translate(&Statement::Select(select), &QueryOptions::default())
            .unwrap_err();
        assert!(matches!(error, DialectError::Unsupported(_)));
    }

    #[test]
    fn test_temporal_patterns() {
        let dialect = SybaseDialect::default();
        assert_eq!(
            dialect
                .timestampdiff_pattern(TemporalUnit::Hour, TemporalType::Timestamp, TemporalType::Timestamp)
                .unwrap(),
            "datediff(?1,?2,?3)"
        );
        assert_eq!(dialect.translate_extract_field(TemporalUnit::Week), "calweekofyear");
        assert!(dialect
            .timestampadd_pattern(TemporalUnit::DayOfYear, TemporalType::Date, None)
            .is_err());
    }

    #[test]
    fn test_identity() {
        let identity = SybaseDialect::default().identity_column_support();
        assert_eq!(
            identity.append_identity_select_to_insert("insert into t (a) values (?)"),
            "insert into t (a) values (?)\nselect @@identity"
        );
        assert!(SybaseDialect::default().sequence_support().sequence_next_val_string("s").is_err());
    }

    #[test]
    fn test_convert_exception() {
        let dialect = SybaseDialect::default();
        let unique = SqlError::new(
            2601,
            "Attempt to insert duplicate key row in object 't' with unique index 'ux_t'",
        );
        assert_eq!(
            dialect.convert_exception(&unique, "insert", None).unwrap().kind,
            JdbcErrorKind::constraint(ConstraintKind::Unique, Some("ux_t".into()))
        );
        let foreign_key = SqlError::new(
            546,
            "Foreign key constraint violation occurred, dbname = 'db', table name = 't', constraint name = 'fk_t'",
        );
        assert_eq!(
            dialect.convert_exception(&foreign_key, "insert", None).unwrap().kind,
            JdbcErrorKind::constraint(ConstraintKind::ForeignKey, Some("fk_t".into()))
        );
        let timeout = SqlError::new(0, "timed out").with_sql_state("JZ0TO");
        assert_eq!(
            dialect.convert_exception(&timeout, "select", None).unwrap().kind,
            JdbcErrorKind::QueryTimeout
        );
        assert!(dialect.convert_exception(&SqlError::new(208, "no table"), "x", None).is_none());
    }
}
