//! CUBRID dialect, 10.2 and later.

use oxide_dialect_core::ast::{DatetimeLiteral, SqlTypeCode};
use oxide_dialect_core::dialect::{
    common, default_column_type, unsupported_unit, DatabaseVersion, DistinctFromStrategy,
    Dialect, FunctionRegistry, IntervalType, TemporalType, TemporalUnit,
};
use oxide_dialect_core::exception::{
    extract_using_template, ConstraintKind, JdbcError, JdbcErrorKind, SqlError,
};
use oxide_dialect_core::identity::{IdentityColumnSupport, StandardIdentityColumnSupport};
use oxide_dialect_core::pagination::{LimitHandler, LimitLimitHandler};
use oxide_dialect_core::sequence::{SequenceSupport, StandardSequenceSupport};
use oxide_dialect_core::translate::{PaginationStyle, SqlAstTranslator};
use oxide_dialect_core::Result;

use super::{classified, mysql_datetime_format, PagingTranslator};

/// CUBRID dialect.
#[derive(Debug, Clone, Copy)]
pub struct CubridDialect {
    version: DatabaseVersion,
}

impl CubridDialect {
    /// Oldest supported version.
    pub const MINIMUM_VERSION: DatabaseVersion = DatabaseVersion::make(10, 2);

    /// Creates a dialect for a CUBRID version.
    #[must_use]
    pub const fn new(version: DatabaseVersion) -> Self {
        Self { version }
    }

    /// Difference of two datetimes in milliseconds, converted to `unit`.
    fn millisecond_difference(&self, unit: TemporalUnit) -> Result<String> {
        // datetime subtraction yields milliseconds
        let factor = TemporalUnit::Native
            .conversion_factor(unit, self.fractional_second_precision_in_nanos())?;
        Ok(format!("((?3-?2){factor})"))
    }
}

impl Default for CubridDialect {
    fn default() -> Self {
        Self::new(Self::MINIMUM_VERSION)
    }
}

impl Dialect for CubridDialect {
    fn name(&self) -> &'static str {
        "cubrid"
    }

    fn version(&self) -> DatabaseVersion {
        self.version
    }

    fn minimum_version(&self) -> DatabaseVersion {
        Self::MINIMUM_VERSION
    }

    fn column_type(&self, code: SqlTypeCode) -> String {
        match code {
            SqlTypeCode::Boolean => "bit",
            SqlTypeCode::Tinyint => "smallint",
            SqlTypeCode::Double => "double",
            SqlTypeCode::Timestamp => "datetime",
            SqlTypeCode::TimestampWithTimezone => "datetimetz",
            SqlTypeCode::TimeWithTimezone => "time",
            SqlTypeCode::Nchar => "char($l)",
            SqlTypeCode::Nvarchar => "varchar($l)",
            SqlTypeCode::Binary => "bit($l)",
            SqlTypeCode::Varbinary => "bit varying($l)",
            SqlTypeCode::Long32varbinary | SqlTypeCode::Blob => "blob",
            SqlTypeCode::Long32varchar | SqlTypeCode::Long32nvarchar => "string",
            SqlTypeCode::Clob | SqlTypeCode::Nclob => "clob",
            SqlTypeCode::Uuid => "char(36)",
            SqlTypeCode::Json => "json",
            other => default_column_type(other),
        }
        .to_string()
    }

    fn max_varchar_length(&self) -> u32 {
        1_073_741_823
    }

    fn max_nvarchar_length(&self) -> u32 {
        1_073_741_823
    }

    fn max_varbinary_length(&self) -> u32 {
        // bits, not bytes
        1_073_741_823 / 8
    }

    fn default_timestamp_precision(&self) -> u32 {
        3
    }

    fn max_identifier_length(&self) -> u32 {
        254
    }

    fn to_boolean_value_string(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    fn append_datetime_literal(&self, buf: &mut String, value: DatetimeLiteral) {
        let literal = match value {
            DatetimeLiteral::Date(d) => format!("date'{}'", d.format("%Y-%m-%d")),
            DatetimeLiteral::Time(t) => format!("time'{}'", t.format("%H:%M:%S")),
            DatetimeLiteral::Timestamp(ts) => {
                format!("datetime'{}'", ts.format("%Y-%m-%d %H:%M:%S%.3f"))
            }
        };
        buf.push_str(&literal);
    }

    fn datetime_format_pattern(&self, format: &str) -> Result<String> {
        Ok(mysql_datetime_format(format))
    }

    fn format_function_pattern(&self) -> Option<&'static str> {
        Some("date_format(?1,?2)")
    }

    fn extract_pattern(&self, unit: TemporalUnit) -> Result<String> {
        Ok(match unit {
            TemporalUnit::DayOfWeek => "dayofweek(?2)",
            TemporalUnit::DayOfMonth => "dayofmonth(?2)",
            TemporalUnit::DayOfYear => "dayofyear(?2)",
            TemporalUnit::Week => "week(?2,3)",
            TemporalUnit::Epoch => "unix_timestamp(?2)",
            _ => "extract(?1 from ?2)",
        }
        .into())
    }

    fn translate_duration_field(&self, unit: TemporalUnit) -> String {
        match unit {
            TemporalUnit::Native => "millisecond".into(),
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
            TemporalUnit::Nanosecond => "adddate(?3,interval (?2)/1e6 millisecond)",
            TemporalUnit::Native => "adddate(?3,interval ?2 millisecond)",
            TemporalUnit::Year
            | TemporalUnit::Quarter
            | TemporalUnit::Month
            | TemporalUnit::Week
            | TemporalUnit::Day
            | TemporalUnit::Hour
            | TemporalUnit::Minute
            | TemporalUnit::Second => "adddate(?3,interval ?2 ?1)",
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
            TemporalUnit::Year => "trunc(months_between(?3,?2)/12)".into(),
            TemporalUnit::Quarter => "trunc(months_between(?3,?2)/3)".into(),
            TemporalUnit::Month => "trunc(months_between(?3,?2))".into(),
            TemporalUnit::Week => "trunc(datediff(?3,?2)/7)".into(),
            TemporalUnit::Day => "datediff(?3,?2)".into(),
            TemporalUnit::Hour
            | TemporalUnit::Minute
            | TemporalUnit::Second
            | TemporalUnit::Nanosecond
            | TemporalUnit::Native => self.millisecond_difference(unit)?,
            other => return Err(unsupported_unit(self.name(), "timestampdiff", other)),
        })
    }

    fn current_timestamp(&self) -> &'static str {
        "sysdatetime"
    }

    fn current_timestamp_select_string(&self) -> String {
        "select now()".into()
    }

    fn fractional_second_precision_in_nanos(&self) -> u64 {
        1_000_000
    }

    fn limit_handler(&self) -> &'static dyn LimitHandler {
        &LimitLimitHandler::INSTANCE
    }

    fn supports_offset_fetch_clause(&self) -> bool {
        false
    }

    fn sequence_support(&self) -> &'static dyn SequenceSupport {
        &StandardSequenceSupport::CUBRID
    }

    fn identity_column_support(&self) -> &'static dyn IdentityColumnSupport {
        &StandardIdentityColumnSupport::AUTO_INCREMENT
    }

    fn query_sequences_string(&self) -> Option<&'static str> {
        Some("select name from db_serial")
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

    fn drop_foreign_key_string(&self) -> &'static str {
        " drop foreign key "
    }

    fn create_schema_command(&self, _name: &str) -> Vec<String> {
        Vec::new()
    }

    fn drop_schema_command(&self, _name: &str) -> Vec<String> {
        Vec::new()
    }

    fn supports_temporary_tables(&self) -> bool {
        false
    }

    fn no_columns_insert_string(&self) -> &'static str {
        "default values"
    }

    fn supports_if_exists_before_table_name(&self) -> bool {
        true
    }

    fn supports_comment_on(&self) -> bool {
        false
    }

    fn supports_lateral(&self) -> bool {
        false
    }

    fn supports_row_value_constructor_syntax_in_in_list(&self) -> bool {
        true
    }

    fn supports_on_duplicate_key(&self) -> bool {
        true
    }

    fn supports_exists_in_select(&self) -> bool {
        false
    }

    fn distinct_from_strategy(&self) -> DistinctFromStrategy {
        DistinctFromStrategy::NullSafeEquals
    }

    fn from_dual_for_select_only(&self) -> &'static str {
        " from db_root"
    }

    fn dual(&self) -> &'static str {
        "db_root"
    }

    fn initialize_function_registry(&self, registry: &mut FunctionRegistry) {
        common::locate_instr(registry);
        common::bit_length_from_length(registry);
        common::truncate_trunc(registry);
        registry.register_alias("character_length", "char_length");
        registry.register_no_args("sysdate", "sysdate");
        registry.register_no_args("systime", "systime");
        registry.register_no_args("systimestamp", "systimestamp");
        registry.register_no_args("sysdatetime", "sysdatetime");
        registry.register_no_args("now", "now()");
        registry.register_no_args("database", "database()");
        registry.register_no_args("last_insert_id", "last_insert_id()");
    }

    fn convert_exception(
        &self,
        error: &SqlError,
        message: &str,
        sql: Option<&str>,
    ) -> Option<JdbcError> {
        let constraint = |kind| JdbcErrorKind::constraint(kind, self.extract_constraint_name(error));
        let kind = match error.error_code {
            -670 => constraint(ConstraintKind::Unique),
            -631 => constraint(ConstraintKind::NotNull),
            -73 => JdbcErrorKind::LockTimeout,
            // aborted by deadlock resolution
            -72 => JdbcErrorKind::LockAcquisition,
            _ => return None,
        };
        classified(self.name(), kind, error, message, sql)
    }

    fn extract_constraint_name(&self, error: &SqlError) -> Option<String> {
        match error.error_code {
            -670 => extract_using_template("INDEX ", "(", &error.message),
            -631 => extract_using_template("Attribute \"", "\"", &error.message),
            _ => None,
        }
    }

    fn build_translator(&self) -> Box<dyn SqlAstTranslator<'_> + '_> {
        Box::new(PagingTranslator::new(self, PaginationStyle::LimitComma))
    }
}

#[cfg(test)]
mod tests {
    use oxide_dialect_core::ast::{Expr, SelectColumn, SelectStatement, Statement, TableRef};
    use oxide_dialect_core::pagination::Limit;
    use oxide_dialect_core::translate::QueryOptions;

    use super::*;

    #[test]
    fn test_column_types() {
        let dialect = CubridDialect::default();
        assert_eq!(dialect.column_type(SqlTypeCode::Timestamp), "datetime");
        assert_eq!(dialect.column_type(SqlTypeCode::Boolean), "bit");
        assert_eq!(dialect.column_type(SqlTypeCode::Varbinary), "bit varying($l)");
    }

    #[test]
    fn test_timestampdiff_in_milliseconds() {
        let dialect = CubridDialect::default();
        let diff = |unit| {
            dialect
                .timestampdiff_pattern(unit, TemporalType::Timestamp, TemporalType::Timestamp)
                .unwrap()
        };
        assert_eq!(diff(TemporalUnit::Native), "((?3-?2))");
        assert_eq!(diff(TemporalUnit::Hour), "((?3-?2)/3600000)");
        assert_eq!(diff(TemporalUnit::Nanosecond), "((?3-?2)*1000000)");
        assert_eq!(diff(TemporalUnit::Day), "datediff(?3,?2)");
        assert!(dialect
            .timestampdiff_pattern(TemporalUnit::Epoch, TemporalType::Date, TemporalType::Date)
            .is_err());
    }

    #[test]
    fn test_timestampadd() {
        let dialect = CubridDialect::default();
        assert_eq!(
            dialect
                .timestampadd_pattern(TemporalUnit::Week, TemporalType::Date, None)
                .unwrap(),
            "adddate(?3,interval ?2 ?1)"
        );
    }

    #[test]
    fn test_null_safe_equals() {
        let mut select = SelectStatement::new(
            vec![SelectColumn::new(Expr::column("a"))],
            Some(TableRef::table("t")),
        );
        select.where_clause = Some(Expr::not_distinct_from(Expr::column("a"), Expr::param(1)));
        select.limit = Some(Expr::param(2));
        select.offset = Some(Expr::param(3));
        let operation = CubridDialect::default()
            .translate(&Statement::Select(select), &QueryOptions::default())
            .unwrap();
        assert_eq!(operation.sql, "select a from t where a<=>? limit ?,?");
    }

    #[test]
    fn test_limit_handler() {
        let limited = CubridDialect::default()
            .limit_handler()
            .process_sql("select a from t", &Limit::new(Some(20), Some(10)))
            .unwrap();
        assert_eq!(limited.sql, "select a from t limit ?, ?");
        assert_eq!(limited.trailing, vec![20, 10]);
    }

    #[test]
    fn test_serials() {
        let dialect = CubridDialect::default();
        let sequences = dialect.sequence_support();
        assert_eq!(sequences.select_sequence_next_val_string("s").unwrap(), "s.next_value");
        assert_eq!(sequences.drop_sequence_strings("s").unwrap(), vec!["drop serial s"]);
        assert_eq!(
            dialect.identity_column_support().identity_column_string(SqlTypeCode::Bigint).unwrap(),
            "not null auto_increment"
        );
    }

    #[test]
    fn test_convert_exception() {
        let dialect = CubridDialect::default();
        let unique = SqlError::new(
            -670,
            "Operation would have caused one or more unique constraint violations. INDEX pk_t_id(B+tree: 0|185|950) ON CLASS t",
        );
        assert_eq!(
            dialect.convert_exception(&unique, "insert", None).unwrap().kind,
            JdbcErrorKind::constraint(ConstraintKind::Unique, Some("pk_t_id".into()))
        );
        let deadlock = SqlError::new(-72, "The transaction has been aborted by the system.");
        assert_eq!(
            dialect.convert_exception(&deadlock, "update", None).unwrap().kind,
            JdbcErrorKind::LockAcquisition
        );
        assert!(dialect.convert_exception(&SqlError::new(-493, "syntax"), "x", None).is_none());
    }
}
