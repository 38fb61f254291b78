//! Oracle dialect, 8i and later.

use oxide_dialect_core::ast::SqlTypeCode;
use oxide_dialect_core::dialect::{
    common, default_column_type, push_hex, unsupported_unit, DatabaseVersion,
    DistinctFromStrategy, Dialect, FunctionRegistry, IntervalType, TemporalType, TemporalUnit,
};
use oxide_dialect_core::exception::{
    extract_using_template, ConstraintKind, JdbcError, JdbcErrorKind, SqlError,
};
use oxide_dialect_core::identity::{IdentityColumnSupport, StandardIdentityColumnSupport};
use oxide_dialect_core::pagination::{
    LegacyOracleLimitHandler, LimitHandler, OffsetFetchLimitHandler,
};
use oxide_dialect_core::sequence::{SequenceSupport, StandardSequenceSupport};
use oxide_dialect_core::translate::{PaginationStyle, SqlAstTranslator};
use oxide_dialect_core::Result;

use super::{classified, oracle_datetime_format, PagingTranslator};

const IN_LIST_LIMIT: u32 = 1000;

/// Adds `months` to `date`, clamping the day to the end of the target month.
fn add_months_pattern(months: &str) -> String {
    format!(
        "(trunc(?3, 'MONTH') + numtoyminterval({months}, 'MONTH') + (least(extract(day from ?3), extract(day from last_day(trunc(?3, 'MONTH') + numtoyminterval({months}, 'MONTH')))) - 1))"
    )
}

/// Oracle dialect.
#[derive(Debug, Clone, Copy)]
pub struct OracleDialect {
    version: DatabaseVersion,
}

impl OracleDialect {
    /// Oldest supported version.
    pub const MINIMUM_VERSION: DatabaseVersion = DatabaseVersion::make(8, 0);

    /// Creates a dialect for an Oracle version.
    #[must_use]
    pub const fn new(version: DatabaseVersion) -> Self {
        Self { version }
    }

    const fn before(&self, major: u16) -> bool {
        self.version.is_before(major, 0)
    }

    /// 12c brought `offset ... fetch`.
    const fn has_fetch_clause(&self) -> bool {
        self.version.is_same_or_after(12, 1)
    }

    /// `extract(field from (?3-?2))` converted to `to`.
    fn extract_difference(&self, field: TemporalUnit, to: TemporalUnit) -> Result<String> {
        let qualifier = match field {
            TemporalUnit::Year | TemporalUnit::Month => " year(9) to month",
            TemporalUnit::Day | TemporalUnit::Hour | TemporalUnit::Minute | TemporalUnit::Second => {
                ""
            }
            other => return Err(unsupported_unit(self.name(), "timestampdiff", other)),
        };
        Ok(format!(
            "extract({} from (?3-?2){qualifier}){}",
            self.translate_extract_field(field),
            field.conversion_factor(to, self.fractional_second_precision_in_nanos())?
        ))
    }

    /// Difference of two timestamps in a sub-day unit.
    fn interval_difference(&self, unit: TemporalUnit) -> Result<String> {
        let nanos = self.fractional_second_precision_in_nanos();
        if self.supports_lateral() {
            return Ok(format!(
                "(select extract(day from t.i){}+extract(hour from t.i){}+extract(minute from t.i){}+extract(second from t.i){} from(select ?3-?2 i from dual)t)",
                TemporalUnit::Day.conversion_factor(unit, nanos)?,
                TemporalUnit::Hour.conversion_factor(unit, nanos)?,
                TemporalUnit::Minute.conversion_factor(unit, nanos)?,
                TemporalUnit::Second.conversion_factor(unit, nanos)?,
            ));
        }
        let fields = [
            TemporalUnit::Day,
            TemporalUnit::Hour,
            TemporalUnit::Minute,
            TemporalUnit::Second,
        ]
        .into_iter()
        .map(|field| self.extract_difference(field, unit))
        .collect::<Result<Vec<_>>>()?;
        Ok(format!("({})", fields.join("+")))
    }
}

impl Default for OracleDialect {
    fn default() -> Self {
        Self::new(Self::MINIMUM_VERSION)
    }
}

impl Dialect for OracleDialect {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn version(&self) -> DatabaseVersion {
        self.version
    }

    fn minimum_version(&self) -> DatabaseVersion {
        Self::MINIMUM_VERSION
    }

    fn column_type(&self, code: SqlTypeCode) -> String {
        let legacy = self.before(9);
        match code {
            SqlTypeCode::Boolean | SqlTypeCode::Bit => "number(1,0)",
            SqlTypeCode::Tinyint => "number(3,0)",
            SqlTypeCode::Smallint => "number(5,0)",
            SqlTypeCode::Integer => "number(10,0)",
            SqlTypeCode::Bigint => "number(19,0)",
            SqlTypeCode::Real => "float(24)",
            SqlTypeCode::Double => "float(53)",
            SqlTypeCode::Numeric | SqlTypeCode::Decimal => "number($p,$s)",
            SqlTypeCode::Time => "date",
            SqlTypeCode::Timestamp | SqlTypeCode::TimestampWithTimezone
            | SqlTypeCode::TimeWithTimezone
                if legacy =>
            {
                "date"
            }
            SqlTypeCode::TimeWithTimezone => "timestamp($p) with time zone",
            SqlTypeCode::Varchar | SqlTypeCode::Long32varchar if legacy => "varchar2($l)",
            SqlTypeCode::Varchar | SqlTypeCode::Long32varchar => "varchar2($l char)",
            SqlTypeCode::Nvarchar | SqlTypeCode::Long32nvarchar => "nvarchar2($l)",
            SqlTypeCode::Binary | SqlTypeCode::Varbinary | SqlTypeCode::Long32varbinary => {
                "raw($l)"
            }
            SqlTypeCode::Uuid => "raw(16)",
            SqlTypeCode::Json if self.version.is_same_or_after(21, 0) => "json",
            SqlTypeCode::Json if self.version.is_same_or_after(12, 0) => "blob",
            SqlTypeCode::Json => "clob",
            SqlTypeCode::Sqlxml => "xmltype",
            other => default_column_type(other),
        }
        .to_string()
    }

    fn max_varchar_length(&self) -> u32 {
        4000
    }

    fn max_nvarchar_length(&self) -> u32 {
        4000
    }

    fn max_varbinary_length(&self) -> u32 {
        2000
    }

    fn default_timestamp_precision(&self) -> u32 {
        if self.before(10) {
            6
        } else {
            9
        }
    }

    fn max_identifier_length(&self) -> u32 {
        if self.version.is_same_or_after(12, 2) {
            128
        } else {
            30
        }
    }

    fn default_batch_size(&self) -> u32 {
        15
    }

    fn in_expression_count_limit(&self) -> Option<u32> {
        Some(IN_LIST_LIMIT)
    }

    fn select_clause_null_string(&self, code: SqlTypeCode) -> String {
        if !self.before(9) {
            return "null".into();
        }
        if code.is_character() {
            "to_char(null)".into()
        } else if code.is_temporal() {
            "to_date(null)".into()
        } else {
            "to_number(null)".into()
        }
    }

    fn to_boolean_value_string(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    fn append_binary_literal(&self, buf: &mut String, bytes: &[u8]) {
        buf.push_str("hextoraw('");
        push_hex(buf, bytes);
        buf.push_str("')");
    }

    fn datetime_format_pattern(&self, format: &str) -> Result<String> {
        Ok(oracle_datetime_format(format))
    }

    fn format_function_pattern(&self) -> Option<&'static str> {
        Some("to_char(?1,?2)")
    }

    fn extract_pattern(&self, unit: TemporalUnit) -> Result<String> {
        Ok(match unit {
            TemporalUnit::DayOfWeek => "to_number(to_char(?2,'D'))",
            TemporalUnit::DayOfMonth => "to_number(to_char(?2,'DD'))",
            TemporalUnit::DayOfYear => "to_number(to_char(?2,'DDD'))",
            TemporalUnit::Week => "to_number(to_char(?2,'IW'))",
            TemporalUnit::Quarter => "to_number(to_char(?2,'Q'))",
            TemporalUnit::Hour => "to_number(to_char(?2,'HH24'))",
            TemporalUnit::Minute => "to_number(to_char(?2,'MI'))",
            TemporalUnit::Second => "to_number(to_char(?2,'SS'))",
            TemporalUnit::Epoch => {
                "trunc((cast(?2 at time zone 'UTC' as date) - date '1970-1-1')*86400)"
            }
            _ => "extract(?1 from ?2)",
        }
        .into())
    }

    fn timestampadd_pattern(
        &self,
        unit: TemporalUnit,
        temporal_type: TemporalType,
        _interval: Option<IntervalType>,
    ) -> Result<String> {
        let is_date = temporal_type == TemporalType::Date;
        Ok(match unit {
            TemporalUnit::Year => add_months_pattern("?2*12"),
            TemporalUnit::Quarter => add_months_pattern("?2*3"),
            TemporalUnit::Month => add_months_pattern("?2"),
            TemporalUnit::Week if is_date => format!(
                "(?3+(?2){})",
                unit.conversion_factor(TemporalUnit::Day, self.fractional_second_precision_in_nanos())?
            ),
            TemporalUnit::Week => "(?3+numtodsinterval((?2)*7,'day'))".into(),
            TemporalUnit::Day if is_date => "(?3+(?2))".into(),
            TemporalUnit::Day | TemporalUnit::Hour | TemporalUnit::Minute | TemporalUnit::Second => {
                "(?3+numtodsinterval(?2,'?1'))".into()
            }
            TemporalUnit::Nanosecond => "(?3+numtodsinterval((?2)/1e9,'second'))".into(),
            TemporalUnit::Native => "(?3+numtodsinterval(?2,'second'))".into(),
            other => return Err(unsupported_unit(self.name(), "timestampadd", other)),
        })
    }

    fn timestampdiff_pattern(
        &self,
        unit: TemporalUnit,
        from_type: TemporalType,
        to_type: TemporalType,
    ) -> Result<String> {
        let has_time_part = from_type != TemporalType::Date || to_type != TemporalType::Date;
        let days = if has_time_part {
            "(cast(?3 as date)-cast(?2 as date))"
        } else {
            "(?3-?2)"
        };
        let nanos = self.fractional_second_precision_in_nanos();
        Ok(match unit {
            TemporalUnit::Year => self.extract_difference(TemporalUnit::Year, unit)?,
            TemporalUnit::Quarter | TemporalUnit::Month => format!(
                "({}+{})",
                self.extract_difference(TemporalUnit::Year, unit)?,
                self.extract_difference(TemporalUnit::Month, unit)?
            ),
            TemporalUnit::Day => days.into(),
            TemporalUnit::Week | TemporalUnit::Hour | TemporalUnit::Minute | TemporalUnit::Second => {
                format!("({days}{})", TemporalUnit::Day.conversion_factor(unit, nanos)?)
            }
            TemporalUnit::Native | TemporalUnit::Nanosecond if has_time_part => {
                self.interval_difference(unit)?
            }
            TemporalUnit::Native | TemporalUnit::Nanosecond => {
                format!("((?3-?2){})", TemporalUnit::Day.conversion_factor(unit, nanos)?)
            }
            other => return Err(unsupported_unit(self.name(), "timestampdiff", other)),
        })
    }

    fn current_date(&self) -> &'static str {
        if self.before(9) {
            "sysdate"
        } else {
            "current_date"
        }
    }

    fn current_time(&self) -> &'static str {
        self.current_timestamp()
    }

    fn current_timestamp(&self) -> &'static str {
        if self.before(9) {
            "sysdate"
        } else {
            "current_timestamp"
        }
    }

    fn current_timestamp_select_string(&self) -> String {
        if self.before(9) {
            "select sysdate from dual".into()
        } else {
            "select systimestamp from dual".into()
        }
    }

    fn fractional_second_precision_in_nanos(&self) -> u64 {
        1_000_000_000
    }

    fn limit_handler(&self) -> &'static dyn LimitHandler {
        if self.has_fetch_clause() {
            &OffsetFetchLimitHandler::INSTANCE
        } else {
            &LegacyOracleLimitHandler::INSTANCE
        }
    }

    fn supports_offset_fetch_clause(&self) -> bool {
        self.has_fetch_clause()
    }

    fn sequence_support(&self) -> &'static dyn SequenceSupport {
        &StandardSequenceSupport::ORACLE
    }

    fn identity_column_support(&self) -> &'static dyn IdentityColumnSupport {
        if self.before(12) {
            &StandardIdentityColumnSupport::NONE
        } else {
            &StandardIdentityColumnSupport::GENERATED
        }
    }

    fn query_sequences_string(&self) -> Option<&'static str> {
        Some("select * from all_sequences")
    }

    fn supports_skip_locked(&self) -> bool {
        !self.before(10)
    }

    fn supports_no_wait(&self) -> bool {
        !self.before(9)
    }

    fn supports_wait(&self) -> bool {
        !self.before(9)
    }

    fn add_column_string(&self) -> &'static str {
        "add"
    }

    fn cascade_constraints_string(&self) -> &'static str {
        " cascade constraints"
    }

    fn create_schema_command(&self, _name: &str) -> Vec<String> {
        Vec::new()
    }

    fn drop_schema_command(&self, _name: &str) -> Vec<String> {
        Vec::new()
    }

    fn temporary_table_create_command(&self) -> &'static str {
        "create global temporary table"
    }

    fn temporary_table_create_options(&self) -> Option<&'static str> {
        Some("on commit delete rows")
    }

    fn supports_comment_on(&self) -> bool {
        true
    }

    fn supports_lateral(&self) -> bool {
        self.version.is_same_or_after(12, 1)
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
        self.version.is_same_or_after(8, 2)
    }

    fn except_keyword(&self) -> &'static str {
        "minus"
    }

    fn supports_merge(&self) -> bool {
        !self.before(9)
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
        self.version.is_same_or_after(11, 2)
    }

    fn supports_exists_in_select(&self) -> bool {
        false
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
        common::locate_instr(registry);
        common::repeat_lpad(registry);
        common::truncate_trunc(registry);
        registry.register_alias("char", "chr");
        registry.register_alias("ceiling", "ceil");
        registry.register_alias("substring", "substr");
        registry.register_pattern("log10", "log(10,?1)");
        registry.register_pattern("character_length", "length(?1)");
        registry.register_pattern("octet_length", "lengthb(?1)");
        registry.register_pattern("bit_length", "lengthb(?1)*8");
        registry.register_pattern("bitor", "(?1+?2-bitand(?1,?2))");
        registry.register_pattern("bitxor", "(?1+?2-2*bitand(?1,?2))");
        if self.before(9) {
            registry.register_pattern("coalesce", "nvl(?1,?2)");
        }
    }

    fn cast_pattern(&self, from: Option<SqlTypeCode>, to: SqlTypeCode) -> String {
        let pattern = match (from, to) {
            (Some(SqlTypeCode::Boolean), SqlTypeCode::Varchar | SqlTypeCode::Char) => {
                "decode(?1,0,'false',1,'true',null)"
            }
            (Some(SqlTypeCode::Date), SqlTypeCode::Varchar) => "to_char(?1,'YYYY-MM-DD')",
            (Some(SqlTypeCode::Time), SqlTypeCode::Varchar) => "to_char(?1,'HH24:MI:SS')",
            (Some(SqlTypeCode::Timestamp), SqlTypeCode::Varchar) => {
                "to_char(?1,'YYYY-MM-DD HH24:MI:SS.FF9')"
            }
            (Some(SqlTypeCode::TimestampWithTimezone), SqlTypeCode::Varchar) => {
                "to_char(?1,'YYYY-MM-DD HH24:MI:SS.FF9TZH:TZM')"
            }
            (Some(SqlTypeCode::Varchar | SqlTypeCode::Char), SqlTypeCode::Boolean) => {
                "decode(lower(?1),'true',1,'false',0,null)"
            }
            (Some(SqlTypeCode::Varchar | SqlTypeCode::Char), SqlTypeCode::Date) => {
                "to_date(?1,'YYYY-MM-DD')"
            }
            (Some(SqlTypeCode::Varchar | SqlTypeCode::Char), SqlTypeCode::Time) => {
                "to_date(?1,'HH24:MI:SS')"
            }
            (Some(SqlTypeCode::Varchar | SqlTypeCode::Char), SqlTypeCode::Timestamp) => {
                "to_timestamp(?1,'YYYY-MM-DD HH24:MI:SS.FF9')"
            }
            (
                Some(SqlTypeCode::Varchar | SqlTypeCode::Char),
                SqlTypeCode::TimestampWithTimezone,
            ) => "to_timestamp_tz(?1,'YYYY-MM-DD HH24:MI:SS.FF9TZH:TZM')",
            (_, SqlTypeCode::Clob) => "to_clob(?1)",
            (_, SqlTypeCode::Sqlxml) => "xmlparse(document ?1)",
            _ => "cast(?1 as ?2)",
        };
        pattern.into()
    }

    fn convert_exception(
        &self,
        error: &SqlError,
        message: &str,
        sql: Option<&str>,
    ) -> Option<JdbcError> {
        let constraint = |kind| JdbcErrorKind::constraint(kind, self.extract_constraint_name(error));
        let kind = match error.error_code {
            30006 | 54 | 4021 => JdbcErrorKind::LockTimeout,
            60 | 4020 => JdbcErrorKind::LockAcquisition,
            1013 => JdbcErrorKind::QueryTimeout,
            1 => constraint(ConstraintKind::Unique),
            1400 | 1407 => constraint(ConstraintKind::NotNull),
            2291 | 2292 => constraint(ConstraintKind::ForeignKey),
            2290 => constraint(ConstraintKind::Check),
            _ => return None,
        };
        classified(self.name(), kind, error, message, sql)
    }

    fn extract_constraint_name(&self, error: &SqlError) -> Option<String> {
        match error.error_code {
            1 | 2290 | 2291 | 2292 => extract_using_template("(", ")", &error.message),
            _ => None,
        }
    }

    fn build_translator(&self) -> Box<dyn SqlAstTranslator<'_> + '_> {
        let style = if self.has_fetch_clause() {
            PaginationStyle::OffsetFetch
        } else {
            PaginationStyle::RowNumber
        };
        Box::new(PagingTranslator::new(self, style).with_empty_window_order("order by 1"))
    }
}

#[cfg(test)]
mod tests {
    use oxide_dialect_core::ast::{Expr, SelectColumn, SelectStatement, Size, Statement, TableRef};
    use oxide_dialect_core::dialect::{LockMode, LockOptions, LockTimeout};
    use oxide_dialect_core::pagination::Limit;
    use oxide_dialect_core::translate::QueryOptions;

    use super::*;

    fn oracle(major: u16, minor: u16) -> OracleDialect {
        OracleDialect::new(DatabaseVersion::make(major, minor))
    }

    #[test]
    fn test_column_types_by_version() {
        assert_eq!(oracle(8, 1).column_type(SqlTypeCode::Timestamp), "date");
        assert_eq!(oracle(19, 0).type_name(SqlTypeCode::Timestamp, Size::default()), "timestamp(9)");
        assert_eq!(oracle(9, 2).type_name(SqlTypeCode::Timestamp, Size::default()), "timestamp(6)");
        assert_eq!(oracle(19, 0).type_name(SqlTypeCode::Varchar, Size::length(20)), "varchar2(20 char)");
        assert_eq!(oracle(8, 1).type_name(SqlTypeCode::Varchar, Size::length(20)), "varchar2(20)");
        assert_eq!(oracle(19, 0).column_type(SqlTypeCode::Json), "blob");
        assert_eq!(oracle(21, 0).column_type(SqlTypeCode::Json), "json");
        assert_eq!(oracle(8, 1).select_clause_null_string(SqlTypeCode::Date), "to_date(null)");
    }

    #[test]
    fn test_timestampadd() {
        let dialect = oracle(19, 0);
        assert_eq!(
            dialect
                .timestampadd_pattern(TemporalUnit::Week, TemporalType::Date, None)
                .unwrap(),
            "(?3+(?2)*7)"
        );
        assert_eq!(
            dialect
                .timestampadd_pattern(TemporalUnit::Hour, TemporalType::Timestamp, None)
                .unwrap(),
            "(?3+numtodsinterval(?2,'?1'))"
        );
        assert!(dialect
            .timestampadd_pattern(TemporalUnit::DayOfWeek, TemporalType::Timestamp, None)
            .is_err());
        assert!(dialect
            .timestampadd_pattern(TemporalUnit::Month, TemporalType::Date, None)
            .unwrap()
            .contains("numtoyminterval(?2, 'MONTH')"));
    }

    #[test]
    fn test_timestampdiff() {
        let dialect = oracle(19, 0);
        assert_eq!(
            dialect
                .timestampdiff_pattern(TemporalUnit::Hour, TemporalType::Timestamp, TemporalType::Timestamp)
                .unwrap(),
            "((cast(?3 as date)-cast(?2 as date))*24)"
        );
        assert_eq!(
            dialect
                .timestampdiff_pattern(TemporalUnit::Quarter, TemporalType::Date, TemporalType::Date)
                .unwrap(),
            "(extract(year from (?3-?2) year(9) to month)*4+extract(month from (?3-?2) year(9) to month)/3)"
        );
        assert_eq!(
            dialect
                .timestampdiff_pattern(TemporalUnit::Native, TemporalType::Timestamp, TemporalType::Timestamp)
                .unwrap(),
            "(select extract(day from t.i)*86400+extract(hour from t.i)*3600+extract(minute from t.i)*60+extract(second from t.i) from(select ?3-?2 i from dual)t)"
        );
        assert!(oracle(11, 2)
            .timestampdiff_pattern(TemporalUnit::Second, TemporalType::Timestamp, TemporalType::Timestamp)
            .is_ok());
    }

    #[test]
    fn test_limit_handler_by_version() {
        assert_eq!(oracle(11, 2).limit_handler().name(), "legacy-oracle");
        assert_eq!(oracle(12, 1).limit_handler().name(), "offset-fetch");
        let limited = oracle(11, 2)
            .limit_handler()
            .process_sql("select a from t", &Limit::new(None, Some(5)))
            .unwrap();
        assert_eq!(limited.sql, "select * from ( select a from t ) where rownum <= ?");
    }

    #[test]
    fn test_row_number_pagination_before_12c() {
        let mut select = SelectStatement::new(
            vec![SelectColumn::new(Expr::column("a"))],
            Some(TableRef::table("t")),
        );
        select.limit = Some(Expr::param(1));
        let operation = oracle(11, 2)
            .translate(&Statement::Select(select), &QueryOptions::default())
            .unwrap();
        assert!(operation.sql.contains("row_number() over(order by 1) rn_"));
    }

    #[test]
    fn test_lock_clauses() {
        let write = LockOptions::new(LockMode::PessimisticWrite).with_timeout(LockTimeout::NoWait);
        assert_eq!(oracle(19, 0).lock_clause(&write), " for update nowait");
        assert_eq!(oracle(8, 1).lock_clause(&write), " for update");
        let skip = LockOptions::new(LockMode::PessimisticWrite)
            .with_timeout(LockTimeout::SkipLocked)
            .with_aliases(["t.id"]);
        assert_eq!(oracle(19, 0).lock_clause(&skip), " for update of t.id skip locked");
    }

    #[test]
    fn test_literals_and_keywords() {
        let dialect = oracle(19, 0);
        let mut buf = String::new();
        dialect.append_binary_literal(&mut buf, &[0xCA, 0xFE]);
        assert_eq!(buf, "hextoraw('CAFE')");
        assert_eq!(dialect.except_keyword(), "minus");
        assert_eq!(dialect.distinct_from_strategy(), DistinctFromStrategy::Decode);
        assert_eq!(dialect.cast_pattern(Some(SqlTypeCode::Varchar), SqlTypeCode::Date), "to_date(?1,'YYYY-MM-DD')");
    }

    #[test]
    fn test_convert_exception() {
        let dialect = oracle(19, 0);
        let unique = SqlError::new(1, "ORA-00001: unique constraint (APP.UK_EMAIL) violated");
        assert_eq!(
            dialect.convert_exception(&unique, "insert", None).unwrap().kind,
            JdbcErrorKind::constraint(ConstraintKind::Unique, Some("APP.UK_EMAIL".into()))
        );
        let check = SqlError::new(2290, "ORA-02290: check constraint (APP.CK_AGE) violated");
        assert_eq!(
            dialect.convert_exception(&check, "insert", None).unwrap().kind,
            JdbcErrorKind::constraint(ConstraintKind::Check, Some("APP.CK_AGE".into()))
        );
        assert_eq!(
            dialect
                .convert_exception(&SqlError::new(60, "ORA-00060: deadlock"), "update", None)
                .unwrap()
                .kind,
            JdbcErrorKind::LockAcquisition
        );
        assert!(dialect.convert_exception(&SqlError::new(942, "no table"), "x", None).is_none());
    }
}
