//! Altibase dialect, 7.1 and later.

use oxide_dialect_core::ast::{DatetimeLiteral, SqlTypeCode};
use oxide_dialect_core::dialect::{
    common, default_column_type, push_hex, unsupported_unit, DatabaseVersion,
    DistinctFromStrategy, Dialect, FunctionRegistry, IntervalType, TemporalType, TemporalUnit,
};
use oxide_dialect_core::exception::{ConstraintKind, JdbcError, JdbcErrorKind, SqlError};
use oxide_dialect_core::pagination::{LimitHandler, LimitOffsetLimitHandler};
use oxide_dialect_core::sequence::{SequenceSupport, StandardSequenceSupport};
use oxide_dialect_core::translate::{PaginationStyle, SqlAstTranslator};
use oxide_dialect_core::Result;

use super::{classified, oracle_datetime_format, PagingTranslator};

/// Altibase dialect.
#[derive(Debug, Clone, Copy)]
pub struct AltibaseDialect {
    version: DatabaseVersion,
}

impl AltibaseDialect {
    /// Oldest supported version.
    pub const MINIMUM_VERSION: DatabaseVersion = DatabaseVersion::make(7, 1);

    /// Creates a dialect for an Altibase version.
    #[must_use]
    pub const fn new(version: DatabaseVersion) -> Self {
        Self { version }
    }
}

impl Default for AltibaseDialect {
    fn default() -> Self {
        Self::new(Self::MINIMUM_VERSION)
    }
}

impl Dialect for AltibaseDialect {
    fn name(&self) -> &'static str {
        "altibase"
    }

    fn version(&self) -> DatabaseVersion {
        self.version
    }

    fn minimum_version(&self) -> DatabaseVersion {
        Self::MINIMUM_VERSION
    }

    fn column_type(&self, code: SqlTypeCode) -> String {
        match code {
            SqlTypeCode::Boolean => "char(1)",
            SqlTypeCode::Tinyint => "smallint",
            SqlTypeCode::Bit => "varbit($l)",
            SqlTypeCode::Float => "float",
            SqlTypeCode::Double => "double",
            SqlTypeCode::Numeric | SqlTypeCode::Decimal => "numeric($p,$s)",
            // date carries microseconds
            SqlTypeCode::Time
            | SqlTypeCode::TimeWithTimezone
            | SqlTypeCode::Timestamp
            | SqlTypeCode::TimestampWithTimezone => "date",
            SqlTypeCode::Binary => "byte($l)",
            SqlTypeCode::Varbinary => "varbyte($l)",
            SqlTypeCode::Long32varbinary | SqlTypeCode::Blob => "blob",
            SqlTypeCode::Long32varchar
            | SqlTypeCode::Long32nvarchar
            | SqlTypeCode::Clob
            | SqlTypeCode::Nclob
            | SqlTypeCode::Json => "clob",
            SqlTypeCode::Uuid => "byte(16)",
            other => default_column_type(other),
        }
        .to_string()
    }

    fn max_varchar_length(&self) -> u32 {
        32_000
    }

    fn max_nvarchar_length(&self) -> u32 {
        16_000
    }

    fn max_varbinary_length(&self) -> u32 {
        32_000
    }

    fn default_decimal_precision(&self) -> u32 {
        38
    }

    fn default_timestamp_precision(&self) -> u32 {
        6
    }

    fn max_identifier_length(&self) -> u32 {
        128
    }

    fn to_boolean_value_string(&self, value: bool) -> &'static str {
        if value {
            "'1'"
        } else {
            "'0'"
        }
    }

    fn append_binary_literal(&self, buf: &mut String, value: &[u8]) {
        buf.push_str("byte'");
        push_hex(buf, value);
        buf.push('\'');
    }

    fn append_datetime_literal(&self, buf: &mut String, value: DatetimeLiteral) {
        let literal = match value {
            DatetimeLiteral::Date(d) => {
                format!("to_date('{}','YYYY-MM-DD')", d.format("%Y-%m-%d"))
            }
            DatetimeLiteral::Time(t) => {
                format!("to_date('{}','HH24:MI:SS')", t.format("%H:%M:%S"))
            }
            DatetimeLiteral::Timestamp(ts) => format!(
                "to_date('{}','YYYY-MM-DD HH24:MI:SS.FF6')",
                ts.format("%Y-%m-%d %H:%M:%S%.6f")
            ),
        };
        buf.push_str(&literal);
    }

    fn datetime_format_pattern(&self, format: &str) -> Result<String> {
        Ok(oracle_datetime_format(format))
    }

    fn format_function_pattern(&self) -> Option<&'static str> {
        Some("to_char(?1,?2)")
    }

    fn extract_pattern(&self, unit: TemporalUnit) -> Result<String> {
        Ok(match unit {
            TemporalUnit::Epoch => "datediff(to_date('1970-01-01','YYYY-MM-DD'),?2,'second')",
            TemporalUnit::Week => "extract(?2,'isoweek')",
            _ => "extract(?2,'?1')",
        }
        .into())
    }

    fn translate_extract_field(&self, unit: TemporalUnit) -> String {
        match unit {
            TemporalUnit::DayOfMonth => "day".into(),
            TemporalUnit::DayOfYear => "dayofyear".into(),
            TemporalUnit::DayOfWeek => "dayofweek".into(),
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
            TemporalUnit::Nanosecond => "dateadd(?3,(?2)/1e3,'microsecond')",
            TemporalUnit::Native => "dateadd(?3,?2,'microsecond')",
            TemporalUnit::Year
            | TemporalUnit::Quarter
            | TemporalUnit::Month
            | TemporalUnit::Week
            | TemporalUnit::Day
            | TemporalUnit::Hour
            | TemporalUnit::Minute
            | TemporalUnit::Second => "dateadd(?3,?2,'?1')",
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
            TemporalUnit::Nanosecond => "datediff(?2,?3,'microsecond')*1e3",
            TemporalUnit::Native => "datediff(?2,?3,'microsecond')",
            TemporalUnit::Year
            | TemporalUnit::Quarter
            | TemporalUnit::Month
            | TemporalUnit::Week
            | TemporalUnit::Day
            | TemporalUnit::Hour
            | TemporalUnit::Minute
            | TemporalUnit::Second => "datediff(?2,?3,'?1')",
            other => return Err(unsupported_unit(self.name(), "timestampdiff", other)),
        }
        .into())
    }

    fn current_date(&self) -> &'static str {
        "sysdate"
    }

    fn current_time(&self) -> &'static str {
        "sysdate"
    }

    fn current_timestamp(&self) -> &'static str {
        "systimestamp"
    }

    fn current_timestamp_select_string(&self) -> String {
        "select systimestamp from dual".into()
    }

    fn fractional_second_precision_in_nanos(&self) -> u64 {
        1000
    }

    fn limit_handler(&self) -> &'static dyn LimitHandler {
        &LimitOffsetLimitHandler::INSTANCE
    }

    fn supports_offset_fetch_clause(&self) -> bool {
        false
    }

    fn sequence_support(&self) -> &'static dyn SequenceSupport {
        &StandardSequenceSupport::ALTIBASE
    }

    fn query_sequences_string(&self) -> Option<&'static str> {
        Some("select table_name from system_.sys_tables_ where table_type = 'S'")
    }

    fn supports_no_wait(&self) -> bool {
        true
    }

    fn supports_wait(&self) -> bool {
        true
    }

    fn supports_outer_join_for_update(&self) -> bool {
        false
    }

    fn cascade_constraints_string(&self) -> &'static str {
        " cascade constraints"
    }

    fn add_column_string(&self) -> &'static str {
        "add column"
    }

    fn create_schema_command(&self, _name: &str) -> Vec<String> {
        Vec::new()
    }

    fn drop_schema_command(&self, _name: &str) -> Vec<String> {
        Vec::new()
    }

    fn temporary_table_create_command(&self) -> &'static str {
        "create temporary table"
    }

    fn temporary_table_create_options(&self) -> Option<&'static str> {
        Some("on commit delete rows")
    }

    fn supports_if_exists_before_table_name(&self) -> bool {
        true
    }

    fn supports_comment_on(&self) -> bool {
        true
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

    fn supports_row_value_constructor_syntax_in_in_list(&self) -> bool {
        true
    }

    fn supports_predicate_as_expression(&self) -> bool {
        false
    }

    fn supports_boolean_expression_as_predicate(&self) -> bool {
        false
    }

    fn supports_exists_in_select(&self) -> bool {
        false
    }

    fn except_keyword(&self) -> &'static str {
        "minus"
    }

    fn from_dual_for_select_only(&self) -> &'static str {
        " from dual"
    }

    fn dual(&self) -> &'static str {
        "dual"
    }

    fn distinct_from_strategy(&self) -> DistinctFromStrategy {
        DistinctFromStrategy::Decode
    }

    fn initialize_function_registry(&self, registry: &mut FunctionRegistry) {
        common::cot_from_tan(registry);
        common::locate_instr(registry);
        common::bit_length_from_length(registry);
        common::truncate_trunc(registry);
        registry.register_alias("character_length", "char_length");
        registry.register_pattern("repeat", "replicate(?1,?2)");
        registry.register_no_args("sysdate", "sysdate");
        registry.register_no_args("systimestamp", "systimestamp");
        registry.register_no_args("sys_guid", "sys_guid()");
    }

    fn convert_exception(
        &self,
        error: &SqlError,
        message: &str,
        sql: Option<&str>,
    ) -> Option<JdbcError> {
        // messages name neither the index nor the column
        let kind = match error.error_code {
            69720 => JdbcErrorKind::constraint(ConstraintKind::Unique, None),
            200_820 => JdbcErrorKind::constraint(ConstraintKind::NotNull, None),
            334_393 => JdbcErrorKind::LockTimeout,
            _ => return None,
        };
        classified(self.name(), kind, error, message, sql)
    }

    fn build_translator(&self) -> Box<dyn SqlAstTranslator<'_> + '_> {
        Box::new(PagingTranslator::new(self, PaginationStyle::LimitOffset))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use oxide_dialect_core::ast::{
        Expr, SelectColumn, SelectStatement, SetOperation, SetOperator, Statement, TableRef,
    };
    use oxide_dialect_core::dialect::{LockMode, LockOptions, LockTimeout};
    use oxide_dialect_core::pagination::Limit;
    use oxide_dialect_core::translate::QueryOptions;

    use super::*;

    fn select_a() -> SelectStatement {
        SelectStatement::new(
            vec![SelectColumn::new(Expr::column("a"))],
            Some(TableRef::table("t")),
        )
    }

    #[test]
    fn test_column_types() {
        let dialect = AltibaseDialect::default();
        assert_eq!(dialect.column_type(SqlTypeCode::Boolean), "char(1)");
        assert_eq!(dialect.column_type(SqlTypeCode::Timestamp), "date");
        assert_eq!(dialect.column_type(SqlTypeCode::Varbinary), "varbyte($l)");
        assert_eq!(dialect.column_type(SqlTypeCode::Integer), "integer");
    }

    #[test]
    fn test_literals() {
        let dialect = AltibaseDialect::default();
        let mut buf = String::new();
        dialect.append_boolean_literal(&mut buf, true);
        dialect.append_binary_literal(&mut buf, &[0xab]);
        assert_eq!(buf, "'1'byte'AB'");

        let mut buf = String::new();
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        dialect.append_datetime_literal(&mut buf, DatetimeLiteral::Date(date));
        assert_eq!(buf, "to_date('2024-02-29','YYYY-MM-DD')");
    }

    #[test]
    fn test_temporal_patterns() {
        let dialect = AltibaseDialect::default();
        assert_eq!(
            dialect
                .timestampadd_pattern(TemporalUnit::Month, TemporalType::Timestamp, None)
                .unwrap(),
            "dateadd(?3,?2,'?1')"
        );
        assert_eq!(
            dialect
                .timestampdiff_pattern(TemporalUnit::Native, TemporalType::Date, TemporalType::Date)
                .unwrap(),
            "datediff(?2,?3,'microsecond')"
        );
        assert!(dialect
            .timestampadd_pattern(TemporalUnit::Epoch, TemporalType::Date, None)
            .is_err());
        assert_eq!(dialect.extract_pattern(TemporalUnit::Year).unwrap(), "extract(?2,'?1')");
    }

    #[test]
    fn test_limit_offset() {
        let mut select = select_a();
        select.limit = Some(Expr::param(1));
        select.offset = Some(Expr::param(2));
        let operation = AltibaseDialect::default()
            .translate(&Statement::Select(select), &QueryOptions::default())
            .unwrap();
        assert_eq!(operation.sql, "select a from t limit ? offset ?");

        let limited = AltibaseDialect::default()
            .limit_handler()
            .process_sql("select a from t for update", &Limit::new(Some(5), Some(10)))
            .unwrap();
        assert_eq!(limited.sql, "select a from t limit ? offset ? for update");
        assert_eq!(limited.trailing, vec![10, 5]);
    }

    #[test]
    fn test_except_is_minus() {
        let mut select = select_a();
        select.set_ops.push(SetOperation {
            op: SetOperator::Except,
            query: select_a(),
        });
        let operation = AltibaseDialect::default()
            .translate(&Statement::Select(select), &QueryOptions::default())
            .unwrap();
        assert_eq!(operation.sql, "select a from t minus select a from t");
    }

    #[test]
    fn test_lock_clause() {
        let dialect = AltibaseDialect::default();
        let nowait = LockOptions::new(LockMode::PessimisticWrite).with_timeout(LockTimeout::NoWait);
        assert_eq!(dialect.lock_clause(&nowait), " for update nowait");
        let wait = LockOptions::new(LockMode::PessimisticWrite).with_timeout(LockTimeout::Millis(3000));
        assert_eq!(dialect.lock_clause(&wait), " for update wait 3");
    }

    #[test]
    fn test_sequences() {
        let support = AltibaseDialect::default().sequence_support();
        assert_eq!(support.select_sequence_next_val_string("s").unwrap(), "s.nextval");
    }

    #[test]
    fn test_convert_exception() {
        let dialect = AltibaseDialect::default();
        let unique = SqlError::new(69720, "The row already exists in a unique index.");
        assert_eq!(
            dialect.convert_exception(&unique, "insert", None).unwrap().kind,
            JdbcErrorKind::constraint(ConstraintKind::Unique, None)
        );
        let timeout = SqlError::new(334_393, "Lock wait timeout");
        assert_eq!(
            dialect.convert_exception(&timeout, "update", None).unwrap().kind,
            JdbcErrorKind::LockTimeout
        );
        assert!(dialect.convert_exception(&SqlError::new(1, "other"), "x", None).is_none());
    }
}
