//! Teradata dialect, 14.0 and later.

use oxide_dialect_core::ast::{DatetimeLiteral, SqlTypeCode};
use oxide_dialect_core::dialect::{
    common, default_column_type, push_hex, unsupported_unit, DatabaseVersion, Dialect,
    FunctionRegistry, IntervalType, LockOptions, LockTimeout, RowLockStrategy, TemporalType,
    TemporalUnit,
};
use oxide_dialect_core::exception::{ConstraintKind, JdbcError, JdbcErrorKind, SqlError};
use oxide_dialect_core::identity::{IdentityColumnSupport, StandardIdentityColumnSupport};
use oxide_dialect_core::pagination::{LimitHandler, TopLimitHandler};
use oxide_dialect_core::sequence::{NoSequenceSupport, SequenceSupport};
use oxide_dialect_core::translate::{PaginationStyle, SqlAstTranslator, TranslationContext};
use oxide_dialect_core::Result;
use tracing::debug;

use super::{classified, oracle_datetime_format_with};

/// Seconds between `?2` and `?3`, counting whole days through date
/// arithmetic.
const SECONDS_BETWEEN: &str = "((cast(?3 as date)-cast(?2 as date))*86400\
    +(extract(hour from ?3)-extract(hour from ?2))*3600\
    +(extract(minute from ?3)-extract(minute from ?2))*60\
    +(extract(second from ?3)-extract(second from ?2)))";

/// Teradata dialect.
#[derive(Debug, Clone, Copy)]
pub struct TeradataDialect {
    version: DatabaseVersion,
}

impl TeradataDialect {
    /// Oldest supported version.
    pub const MINIMUM_VERSION: DatabaseVersion = DatabaseVersion::make(14, 0);

    /// Creates a dialect for a Teradata version.
    #[must_use]
    pub const fn new(version: DatabaseVersion) -> Self {
        Self { version }
    }

    const fn has_json(&self) -> bool {
        self.version.is_same_or_after(15, 0)
    }
}

impl Default for TeradataDialect {
    fn default() -> Self {
        Self::new(Self::MINIMUM_VERSION)
    }
}

/// `locking row for <access>`, with `nowait` when asked to fail fast.
fn locking_row(access: &str, timeout: LockTimeout) -> String {
    let nowait = if timeout == LockTimeout::NoWait {
        " nowait"
    } else {
        ""
    };
    format!("locking row for {access}{nowait}")
}

impl Dialect for TeradataDialect {
    fn name(&self) -> &'static str {
        "teradata"
    }

    fn version(&self) -> DatabaseVersion {
        self.version
    }

    fn minimum_version(&self) -> DatabaseVersion {
        Self::MINIMUM_VERSION
    }

    fn column_type(&self, code: SqlTypeCode) -> String {
        match code {
            SqlTypeCode::Boolean | SqlTypeCode::Bit | SqlTypeCode::Tinyint => "byteint".into(),
            SqlTypeCode::Double => "double precision".into(),
            SqlTypeCode::Numeric => "numeric($p,$s)".into(),
            SqlTypeCode::TimeWithTimezone => "time($p) with time zone".into(),
            SqlTypeCode::TimestampWithTimezone => "timestamp($p) with time zone".into(),
            SqlTypeCode::Nchar => "char($l) character set unicode".into(),
            SqlTypeCode::Nvarchar => "varchar($l) character set unicode".into(),
            SqlTypeCode::Binary => "byte($l)".into(),
            SqlTypeCode::Varbinary => "varbyte($l)".into(),
            SqlTypeCode::Long32varbinary | SqlTypeCode::Blob => "blob".into(),
            SqlTypeCode::Long32varchar => "long varchar".into(),
            SqlTypeCode::Long32nvarchar => "long varchar character set unicode".into(),
            SqlTypeCode::Clob => "clob".into(),
            SqlTypeCode::Nclob => "clob character set unicode".into(),
            SqlTypeCode::Uuid => "byte(16)".into(),
            SqlTypeCode::Json if self.has_json() => "json".into(),
            SqlTypeCode::Json => "clob".into(),
            SqlTypeCode::Sqlxml => "xml".into(),
            other => default_column_type(other).into(),
        }
    }

    fn max_varchar_length(&self) -> u32 {
        64_000
    }

    fn max_nvarchar_length(&self) -> u32 {
        32_000
    }

    fn max_varbinary_length(&self) -> u32 {
        64_000
    }

    fn default_decimal_precision(&self) -> u32 {
        18
    }

    fn max_identifier_length(&self) -> u32 {
        128
    }

    fn in_expression_count_limit(&self) -> Option<u32> {
        Some(1024)
    }

    fn to_boolean_value_string(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    fn append_binary_literal(&self, buf: &mut String, value: &[u8]) {
        buf.push('\'');
        push_hex(buf, value);
        buf.push_str("'xb");
    }

    fn append_datetime_literal(&self, buf: &mut String, value: DatetimeLiteral) {
        let literal = match value {
            DatetimeLiteral::Date(d) => format!("date '{}'", d.format("%Y-%m-%d")),
            DatetimeLiteral::Time(t) => format!("time '{}'", t.format("%H:%M:%S")),
            DatetimeLiteral::Timestamp(ts) => {
                format!("timestamp '{}'", ts.format("%Y-%m-%d %H:%M:%S%.6f"))
            }
        };
        buf.push_str(&literal);
    }

    fn datetime_format_pattern(&self, format: &str) -> Result<String> {
        // no fill mode and no ISO week based year
        Ok(oracle_datetime_format_with(
            format,
            &[
                ("MMMM", "MONTH"),
                ("M", "MM"),
                ("w", "IW"),
                ("YYYY", "YYYY"),
                ("YYY", "YYYY"),
                ("YY", "YY"),
                ("Y", "Y"),
                ("EEEE", "DAY"),
                ("d", "DD"),
                ("D", "DDD"),
                ("h", "HH12"),
                ("H", "HH24"),
                ("m", "MI"),
                ("s", "SS"),
            ],
        ))
    }

    fn format_function_pattern(&self) -> Option<&'static str> {
        Some("to_char(?1,?2)")
    }

    fn extract_pattern(&self, unit: TemporalUnit) -> Result<String> {
        Ok(match unit {
            TemporalUnit::DayOfWeek => "td_day_of_week(?2)",
            TemporalUnit::DayOfYear => "td_day_of_year(?2)",
            TemporalUnit::Week => "td_week_of_year(?2)",
            TemporalUnit::Quarter => "td_quarter_of_year(?2)",
            TemporalUnit::Epoch => {
                "((cast(?2 as date)-date '1970-01-01')*86400+extract(hour from ?2)*3600+extract(minute from ?2)*60+extract(second from ?2))"
            }
            _ => "extract(?1 from ?2)",
        }
        .into())
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
            TemporalUnit::Year => "add_months(?3,12*(?2))",
            TemporalUnit::Quarter => "add_months(?3,3*(?2))",
            TemporalUnit::Month => "add_months(?3,?2)",
            TemporalUnit::Week => "(?3+(?2)*interval '7' day)",
            TemporalUnit::Day | TemporalUnit::Hour | TemporalUnit::Minute => {
                "(?3+(?2)*interval '1' ?1)"
            }
            TemporalUnit::Second => "(?3+(?2)*interval '1' second)",
            TemporalUnit::Nanosecond => "(?3+(?2)/1e9*interval '1' second)",
            TemporalUnit::Native => "(?3+(?2)/1e6*interval '1' second)",
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
        let nanos = self.fractional_second_precision_in_nanos();
        Ok(match unit {
            TemporalUnit::Year => "trunc(months_between(?3,?2)/12)".into(),
            TemporalUnit::Quarter => "trunc(months_between(?3,?2)/3)".into(),
            TemporalUnit::Month => "trunc(months_between(?3,?2))".into(),
            TemporalUnit::Week => "((cast(?3 as date)-cast(?2 as date))/7)".into(),
            TemporalUnit::Day => "(cast(?3 as date)-cast(?2 as date))".into(),
            TemporalUnit::Hour
            | TemporalUnit::Minute
            | TemporalUnit::Second
            | TemporalUnit::Nanosecond
            | TemporalUnit::Native => format!(
                "({SECONDS_BETWEEN}{})",
                TemporalUnit::Second.conversion_factor(unit, nanos)?
            ),
            other => return Err(unsupported_unit(self.name(), "timestampdiff", other)),
        })
    }

    fn current_timestamp_select_string(&self) -> String {
        "select current_timestamp".into()
    }

    fn fractional_second_precision_in_nanos(&self) -> u64 {
        1000
    }

    fn limit_handler(&self) -> &'static dyn LimitHandler {
        &TopLimitHandler::INSTANCE
    }

    fn supports_offset_fetch_clause(&self) -> bool {
        false
    }

    fn sequence_support(&self) -> &'static dyn SequenceSupport {
        &NoSequenceSupport::INSTANCE
    }

    fn identity_column_support(&self) -> &'static dyn IdentityColumnSupport {
        &StandardIdentityColumnSupport::TERADATA
    }

    fn for_update_string(&self) -> String {
        "locking row for write".into()
    }

    fn read_lock_string(&self, timeout: LockTimeout) -> String {
        locking_row("read", timeout)
    }

    fn write_lock_string(&self, timeout: LockTimeout) -> String {
        locking_row("write", timeout)
    }

    fn row_lock_strategy(&self) -> RowLockStrategy {
        RowLockStrategy::None
    }

    fn supports_no_wait(&self) -> bool {
        true
    }

    fn supports_lock_timeouts(&self) -> bool {
        false
    }

    fn add_column_string(&self) -> &'static str {
        "add"
    }

    fn cascade_constraints_string(&self) -> &'static str {
        ""
    }

    fn create_schema_command(&self, _name: &str) -> Vec<String> {
        // databases need a perm space owner
        Vec::new()
    }

    fn drop_schema_command(&self, _name: &str) -> Vec<String> {
        Vec::new()
    }

    fn temporary_table_create_command(&self) -> &'static str {
        "create global temporary table"
    }

    fn temporary_table_create_options(&self) -> Option<&'static str> {
        Some("on commit preserve rows")
    }

    fn no_columns_insert_string(&self) -> &'static str {
        "default values"
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

    fn supports_update_from(&self) -> bool {
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

    fn supports_case_insensitive_like(&self) -> bool {
        false
    }

    fn from_dual_for_select_only(&self) -> &'static str {
        ""
    }

    fn dual(&self) -> &'static str {
        "(select 1 c1)"
    }

    fn initialize_function_registry(&self, registry: &mut FunctionRegistry) {
        common::locate_position(registry);
        common::mod_operator(registry);
        common::bit_length_from_octet_length(registry);
        common::truncate_trunc(registry);
        registry.register_alias("substring", "substr");
        registry.register_no_args("user", "user");
        registry.register_no_args("database", "database");
    }

    fn convert_exception(
        &self,
        error: &SqlError,
        message: &str,
        sql: Option<&str>,
    ) -> Option<JdbcError> {
        // messages name neither the index nor the constraint
        let kind = match error.error_code {
            2631 => JdbcErrorKind::LockAcquisition,
            3120 => JdbcErrorKind::LockTimeout,
            2801..=2803 => JdbcErrorKind::constraint(ConstraintKind::Unique, None),
            3811 => JdbcErrorKind::constraint(ConstraintKind::NotNull, None),
            2700 => JdbcErrorKind::constraint(ConstraintKind::ForeignKey, None),
            _ => return None,
        };
        classified(self.name(), kind, error, message, sql)
    }

    fn build_translator(&self) -> Box<dyn SqlAstTranslator<'_> + '_> {
        Box::new(TeradataSqlAstTranslator::new(self))
    }
}

/// Translator writing `top` and putting locks in a `locking row for`
/// prefix.
#[derive(Debug)]
pub struct TeradataSqlAstTranslator<'d> {
    context: TranslationContext<'d>,
}

impl<'d> TeradataSqlAstTranslator<'d> {
    /// Creates a translator for `dialect`.
    #[must_use]
    pub fn new(dialect: &'d TeradataDialect) -> Self {
        Self {
            context: TranslationContext::new(dialect),
        }
    }
}

impl<'d> SqlAstTranslator<'d> for TeradataSqlAstTranslator<'d> {
    fn context(&mut self) -> &mut TranslationContext<'d> {
        &mut self.context
    }

    fn context_ref(&self) -> &TranslationContext<'d> {
        &self.context
    }

    fn pagination_style(&self) -> PaginationStyle {
        PaginationStyle::Top {
            parenthesized: false,
        }
    }

    fn empty_window_order(&self) -> &'static str {
        "order by 1"
    }

    fn render_lock(&mut self, options: &LockOptions) -> Result<()> {
        let clause = self.context.dialect.lock_clause(options);
        if !clause.is_empty() {
            debug!(clause = %clause, "prefixing locking modifier");
            self.context.sql.insert_str(0, &format!("{clause} "));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use oxide_dialect_core::ast::{
        Expr, OrderBy, SelectColumn, SelectStatement, Statement, TableRef,
    };
    use oxide_dialect_core::dialect::LockMode;
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
        let dialect = TeradataDialect::default();
        assert_eq!(dialect.column_type(SqlTypeCode::Boolean), "byteint");
        assert_eq!(
            dialect.column_type(SqlTypeCode::Nvarchar),
            "varchar($l) character set unicode"
        );
        assert_eq!(dialect.column_type(SqlTypeCode::Json), "clob");
        assert_eq!(
            TeradataDialect::new(DatabaseVersion::make(16, 20)).column_type(SqlTypeCode::Json),
            "json"
        );
    }

    #[test]
    fn test_locking_prefix() {
        let mut select = select_a();
        select.where_clause = Some(Expr::column("a").eq(Expr::param(1)));
        select.limit = Some(Expr::param(2));
        let options =
            QueryOptions::default().with_lock(LockOptions::new(LockMode::PessimisticWrite));
        let operation = TeradataDialect::default()
            .translate(&Statement::Select(select), &options)
            .unwrap();
        assert_eq!(operation.sql, "locking row for write select top ? a from t where a=?");
    }

    #[test]
    fn test_lock_clause() {
        let dialect = TeradataDialect::default();
        let read = LockOptions::new(LockMode::PessimisticRead);
        assert_eq!(dialect.lock_clause(&read), "locking row for read");
        let nowait = LockOptions::new(LockMode::UpgradeNoWait).with_aliases(["x"]);
        assert_eq!(dialect.lock_clause(&nowait), "locking row for write nowait");
        assert_eq!(dialect.lock_clause(&LockOptions::new(LockMode::Read)), "");
    }

    #[test]
    fn test_offset_uses_row_number() {
        let mut select = select_a();
        select.order_by.push(OrderBy::asc(Expr::column("a")));
        select.limit = Some(Expr::param(1));
        select.offset = Some(Expr::param(2));
        let operation = TeradataDialect::default()
            .translate(&Statement::Select(select), &QueryOptions::default())
            .unwrap();
        assert!(operation.sql.contains("row_number() over(order by a)"), "{}", operation.sql);
    }

    #[test]
    fn test_top_limit_handler() {
        let limited = TeradataDialect::default()
            .limit_handler()
            .process_sql("locking row for write select a from t", &Limit::new(None, Some(3)))
            .unwrap();
        assert_eq!(limited.sql, "locking row for write select top ? a from t");
        assert_eq!(limited.leading, vec![3]);
    }

    #[test]
    fn test_timestampdiff() {
        let dialect = TeradataDialect::default();
        let hours = dialect
            .timestampdiff_pattern(TemporalUnit::Hour, TemporalType::Timestamp, TemporalType::Timestamp)
            .unwrap();
        assert!(hours.starts_with("(((cast(?3 as date)-cast(?2 as date))*86400"));
        assert!(hours.ends_with("/3600)"));
        assert_eq!(
            dialect
                .timestampadd_pattern(TemporalUnit::Month, TemporalType::Date, None)
                .unwrap(),
            "add_months(?3,?2)"
        );
    }

    #[test]
    fn test_identity_without_sequences() {
        let dialect = TeradataDialect::default();
        assert_eq!(
            dialect
                .identity_column_support()
                .identity_column_string(SqlTypeCode::Integer)
                .unwrap(),
            "generated by default as identity not null"
        );
        assert!(!dialect.sequence_support().supports_sequences());
    }

    #[test]
    fn test_convert_exception() {
        let dialect = TeradataDialect::default();
        let kind = |code| {
            dialect
                .convert_exception(&SqlError::new(code, "failure"), "x", None)
                .map(|error| error.kind)
        };
        assert_eq!(
            kind(2802),
            Some(JdbcErrorKind::constraint(ConstraintKind::Unique, None))
        );
        assert_eq!(kind(3120), Some(JdbcErrorKind::LockTimeout));
        assert_eq!(kind(2631), Some(JdbcErrorKind::LockAcquisition));
        assert_eq!(kind(3807), None);
    }
}
