//! Microsoft SQL Server dialect, 2000 to 2008 R2 and later releases
//! through the legacy code paths.

use oxide_dialect_core::ast::{
    DatetimeLiteral, InsertStatement, OnConflict, SelectStatement, Size, SqlTypeCode,
};
use oxide_dialect_core::dialect::{
    common, push_hex, DatabaseVersion, DistinctFromStrategy, Dialect, FunctionRegistry,
    IntervalType, LockMode, LockOptions, LockTimeout, TemporalType, TemporalUnit,
};
use oxide_dialect_core::exception::{
    extract_using_template, ConstraintKind, JdbcError, JdbcErrorKind, SqlError,
};
use oxide_dialect_core::identity::{IdentityColumnSupport, StandardIdentityColumnSupport};
use oxide_dialect_core::pagination::{
    LimitHandler, SqlServer2005LimitHandler, SqlServer2012LimitHandler, TopLimitHandler,
};
use oxide_dialect_core::sequence::{NoSequenceSupport, SequenceSupport, StandardSequenceSupport};
use oxide_dialect_core::translate::{
    standard, Clause, PaginationStyle, SqlAstTranslator, TranslationContext,
};
use oxide_dialect_core::Result;
use tracing::debug;

use super::{classified, sql_server_datetime_format, transact_sql_column_type};

const PARAM_LIST_SIZE_LIMIT: u32 = 2100;

/// SQL Server dialect.
#[derive(Debug, Clone, Copy)]
pub struct SqlServerDialect {
    version: DatabaseVersion,
}

impl SqlServerDialect {
    /// Oldest supported version, SQL Server 2000.
    pub const MINIMUM_VERSION: DatabaseVersion = DatabaseVersion::make(8, 0);

    /// Creates a dialect for a SQL Server version.
    #[must_use]
    pub const fn new(version: DatabaseVersion) -> Self {
        Self { version }
    }

    const fn at_least(&self, major: u16) -> bool {
        self.version.is_same_or_after(major, 0)
    }

    fn lock_hint(&self, options: &LockOptions) -> Option<String> {
        let timeout = options.effective_timeout();
        if !self.at_least(9) {
            return match options.mode {
                LockMode::PessimisticRead => Some("holdlock,rowlock".into()),
                mode if mode.is_pessimistic() => Some("updlock,rowlock".into()),
                _ => None,
            };
        }
        let skip_locked = timeout == LockTimeout::SkipLocked;
        let no_wait = if timeout == LockTimeout::NoWait {
            ",nowait"
        } else {
            ""
        };
        let read_past = if skip_locked { ",readpast" } else { "" };
        let hint = match options.mode {
            LockMode::UpgradeSkipLocked => format!("updlock,rowlock,readpast{no_wait}"),
            LockMode::UpgradeNoWait => "updlock,holdlock,rowlock,nowait".into(),
            LockMode::PessimisticRead => {
                let lock = if skip_locked { "updlock" } else { "holdlock" };
                format!("{lock},rowlock{no_wait}{read_past}")
            }
            LockMode::PessimisticWrite | LockMode::PessimisticForceIncrement => {
                let lock = if skip_locked {
                    "updlock"
                } else {
                    "updlock,holdlock"
                };
                format!("{lock},rowlock{no_wait}{read_past}")
            }
            _ => return None,
        };
        Some(hint)
    }
}

impl Default for SqlServerDialect {
    fn default() -> Self {
        Self::new(Self::MINIMUM_VERSION)
    }
}

impl Dialect for SqlServerDialect {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn version(&self) -> DatabaseVersion {
        self.version
    }

    fn minimum_version(&self) -> DatabaseVersion {
        Self::MINIMUM_VERSION
    }

    fn column_type(&self, code: SqlTypeCode) -> String {
        // float is double precision
        if code == SqlTypeCode::Double {
            return "float".into();
        }
        let modern = match code {
            SqlTypeCode::Clob if self.at_least(9) => "varchar(max)",
            SqlTypeCode::Nclob if self.at_least(9) => "nvarchar(max)",
            SqlTypeCode::Blob if self.at_least(9) => "varbinary(max)",
            SqlTypeCode::Date if self.at_least(10) => "date",
            SqlTypeCode::Time if self.at_least(10) => "time",
            SqlTypeCode::Timestamp if self.at_least(10) => "datetime2($p)",
            SqlTypeCode::TimeWithTimezone | SqlTypeCode::TimestampWithTimezone
                if self.at_least(10) =>
            {
                "datetimeoffset($p)"
            }
            SqlTypeCode::Sqlxml => "xml",
            SqlTypeCode::Uuid => "uniqueidentifier",
            other => transact_sql_column_type(other),
        };
        modern.to_string()
    }

    fn cast_type(&self, code: SqlTypeCode) -> String {
        if self.at_least(9) {
            match code {
                SqlTypeCode::Varchar | SqlTypeCode::Long32varchar | SqlTypeCode::Clob => {
                    return "varchar(max)".into();
                }
                SqlTypeCode::Nvarchar | SqlTypeCode::Long32nvarchar | SqlTypeCode::Nclob => {
                    return "nvarchar(max)".into();
                }
                SqlTypeCode::Varbinary | SqlTypeCode::Long32varbinary | SqlTypeCode::Blob => {
                    return "varbinary(max)".into();
                }
                _ => {}
            }
        }
        self.type_name(code, Size::default())
    }

    fn max_varchar_length(&self) -> u32 {
        8000
    }

    fn max_nvarchar_length(&self) -> u32 {
        4000
    }

    fn default_timestamp_precision(&self) -> u32 {
        7
    }

    fn in_expression_count_limit(&self) -> Option<u32> {
        Some(PARAM_LIST_SIZE_LIMIT)
    }

    fn parameter_count_limit(&self) -> Option<u32> {
        Some(PARAM_LIST_SIZE_LIMIT)
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
            DatetimeLiteral::Time(t) => format!("cast('{}' as time)", t.format("%H:%M:%S")),
            DatetimeLiteral::Timestamp(ts) => format!(
                "cast('{}' as datetime2)",
                ts.format("%Y-%m-%d %H:%M:%S%.6f")
            ),
        };
        buf.push_str(&literal);
    }

    fn datetime_format_pattern(&self, format: &str) -> Result<String> {
        Ok(sql_server_datetime_format(format))
    }

    fn format_function_pattern(&self) -> Option<&'static str> {
        self.at_least(11).then_some("format(?1,?2)")
    }

    fn extract_pattern(&self, unit: TemporalUnit) -> Result<String> {
        Ok(match unit {
            TemporalUnit::Second => "(datepart(second,?2)+datepart(nanosecond,?2)/1000000000)",
            TemporalUnit::Epoch => "datediff_big(second, '1970-01-01', ?2)",
            // ISO week number
            TemporalUnit::Week if !self.at_least(10) => {
                "((datepart(dy,dateadd(dd,datediff(dd,'17530101',?2)/7*7,'17530104'))+6)/7)"
            }
            _ => "datepart(?1,?2)",
        }
        .into())
    }

    fn translate_extract_field(&self, unit: TemporalUnit) -> String {
        match unit {
            TemporalUnit::Week => "isowk".into(),
            TemporalUnit::DayOfMonth => "day".into(),
            TemporalUnit::DayOfYear => "dayofyear".into(),
            TemporalUnit::DayOfWeek => "weekday".into(),
            other => other.as_str().into(),
        }
    }

    fn timestampadd_pattern(
        &self,
        unit: TemporalUnit,
        _temporal_type: TemporalType,
        _interval: Option<IntervalType>,
    ) -> Result<String> {
        // dateadd() takes an int, so whole seconds and the nanosecond
        // remainder are added separately
        Ok(match unit {
            TemporalUnit::Nanosecond | TemporalUnit::Native => {
                "dateadd(nanosecond,?2%1000000000,dateadd(second,?2/1000000000,?3))"
            }
            _ => "dateadd(?1,?2,?3)",
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
            TemporalUnit::Native => "datediff_big(nanosecond,?2,?3)",
            TemporalUnit::Nanosecond => "datediff_big(?1,?2,?3)",
            _ => "datediff(?1,?2,?3)",
        }
        .into())
    }

    fn current_date(&self) -> &'static str {
        "convert(date,getdate())"
    }

    fn current_time(&self) -> &'static str {
        "convert(time,getdate())"
    }

    fn current_timestamp(&self) -> &'static str {
        "sysdatetime()"
    }

    fn current_timestamp_select_string(&self) -> String {
        "select current_timestamp".into()
    }

    fn limit_handler(&self) -> &'static dyn LimitHandler {
        if self.at_least(11) {
            &SqlServer2012LimitHandler::INSTANCE
        } else if self.at_least(9) {
            &SqlServer2005LimitHandler::INSTANCE
        } else {
            &TopLimitHandler::INLINE_INSTANCE
        }
    }

    fn supports_offset_fetch_clause(&self) -> bool {
        self.at_least(11)
    }

    fn sequence_support(&self) -> &'static dyn SequenceSupport {
        if self.at_least(16) {
            &StandardSequenceSupport::SQL_SERVER_16
        } else if self.at_least(11) {
            &StandardSequenceSupport::SQL_SERVER
        } else {
            &NoSequenceSupport::INSTANCE
        }
    }

    fn identity_column_support(&self) -> &'static dyn IdentityColumnSupport {
        &StandardIdentityColumnSupport::SQL_SERVER
    }

    fn query_sequences_string(&self) -> Option<&'static str> {
        // upper case works with case sensitive collations
        self.at_least(11)
            .then_some("select * from INFORMATION_SCHEMA.SEQUENCES")
    }

    fn for_update_string(&self) -> String {
        String::new()
    }

    fn uses_lock_hints(&self) -> bool {
        true
    }

    fn append_lock_hint(&self, options: &LockOptions, table: &str) -> String {
        match self.lock_hint(options) {
            Some(hint) => format!("{table} with ({hint})"),
            None => table.to_string(),
        }
    }

    fn supports_skip_locked(&self) -> bool {
        self.at_least(9)
    }

    fn supports_no_wait(&self) -> bool {
        self.at_least(9)
    }

    fn add_column_string(&self) -> &'static str {
        "add"
    }

    fn drop_schema_command(&self, name: &str) -> Vec<String> {
        if self.at_least(13) {
            vec![format!("drop schema if exists {name}")]
        } else {
            vec![format!("drop schema {name}")]
        }
    }

    fn temporary_table_create_command(&self) -> &'static str {
        "create table"
    }

    fn no_columns_insert_string(&self) -> &'static str {
        "default values"
    }

    fn generated_as(&self, expression: &str) -> String {
        format!(" as ({expression}) persisted")
    }

    fn supports_if_exists_before_table_name(&self) -> bool {
        self.at_least(16)
    }

    fn supports_lateral(&self) -> bool {
        self.at_least(9)
    }

    fn supports_distinct_from_predicate(&self) -> bool {
        self.at_least(16)
    }

    fn supports_values_list(&self) -> bool {
        self.at_least(10)
    }

    fn supports_values_list_for_insert(&self) -> bool {
        self.at_least(10)
    }

    fn supports_row_value_constructor_syntax(&self) -> bool {
        false
    }

    fn supports_null_precedence(&self) -> bool {
        false
    }

    fn supports_intersect(&self) -> bool {
        self.at_least(9)
    }

    fn supports_except(&self) -> bool {
        self.at_least(9)
    }

    fn supports_merge(&self) -> bool {
        self.at_least(10)
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
        self.at_least(9)
    }

    fn supports_window_functions(&self) -> bool {
        self.at_least(9)
    }

    fn supports_exists_in_select(&self) -> bool {
        false
    }

    fn distinct_from_strategy(&self) -> DistinctFromStrategy {
        if self.supports_distinct_from_predicate() {
            DistinctFromStrategy::Native
        } else if self.at_least(9) {
            DistinctFromStrategy::Intersect
        } else {
            DistinctFromStrategy::Case
        }
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
        registry.register_pattern("octet_length", "datalength(?1)");
        registry.register_pattern("bit_length", "datalength(?1)*8");
        registry.register_alias("character_length", "len");
        registry.register_pattern("mod", "(?1%?2)");
        registry.register_pattern("log10", "log10(?1)");
        registry.register_pattern("repeat", "replicate(?1,?2)");
        registry.register_pattern("truncate", "round(?1,?2,1)");
        registry.register_pattern("trunc", "round(?1,?2,1)");
        registry.register_no_args("getdate", "getdate()");
        if self.at_least(10) {
            common::locate_charindex(registry);
        }
        if self.at_least(16) {
            registry.register_pattern("least", "least(?1,?2)");
            registry.register_pattern("greatest", "greatest(?1,?2)");
        } else {
            common::least_greatest_case(registry);
        }
    }

    fn cast_pattern(&self, from: Option<SqlTypeCode>, to: SqlTypeCode) -> String {
        let to_string = to.is_character();
        match from {
            Some(SqlTypeCode::Timestamp | SqlTypeCode::TimestampWithTimezone) if to_string => {
                "format(?1,'yyyy-MM-dd HH:mm:ss')".into()
            }
            Some(SqlTypeCode::Time) if to_string => "format(?1,'hh\\:mm\\:ss')".into(),
            _ => "cast(?1 as ?2)".into(),
        }
    }

    fn convert_exception(
        &self,
        error: &SqlError,
        message: &str,
        sql: Option<&str>,
    ) -> Option<JdbcError> {
        if error.sql_state() == Some("HY008") {
            return classified(self.name(), JdbcErrorKind::QueryTimeout, error, message, sql);
        }
        let constraint = |kind| JdbcErrorKind::constraint(kind, self.extract_constraint_name(error));
        let kind = match error.error_code {
            1222 => JdbcErrorKind::LockTimeout,
            1205 => JdbcErrorKind::LockAcquisition,
            2627 | 2601 => constraint(ConstraintKind::Unique),
            547 if error.message.contains("CHECK constraint") => constraint(ConstraintKind::Check),
            547 => constraint(ConstraintKind::ForeignKey),
            515 => constraint(ConstraintKind::NotNull),
            _ => return None,
        };
        classified(self.name(), kind, error, message, sql)
    }

    fn extract_constraint_name(&self, error: &SqlError) -> Option<String> {
        match error.error_code {
            2627 | 2601 => extract_using_template("constraint '", "'", &error.message)
                .or_else(|| extract_using_template("unique index '", "'", &error.message)),
            547 => extract_using_template("constraint \"", "\"", &error.message),
            _ => None,
        }
    }

    fn build_translator(&self) -> Box<dyn SqlAstTranslator<'_> + '_> {
        Box::new(SqlServerSqlAstTranslator::new(self))
    }
}

/// Translator writing `top`, or `offset ... fetch` with a stand-in
/// ordering from SQL Server 2012.
#[derive(Debug)]
pub struct SqlServerSqlAstTranslator<'d> {
    context: TranslationContext<'d>,
    style: PaginationStyle,
}

impl<'d> SqlServerSqlAstTranslator<'d> {
    /// Creates a translator for `dialect`.
    #[must_use]
    pub fn new(dialect: &'d SqlServerDialect) -> Self {
        let style = if dialect.at_least(11) {
            PaginationStyle::OffsetFetch
        } else {
            PaginationStyle::Top {
                parenthesized: dialect.at_least(9),
            }
        };
        Self {
            context: TranslationContext::new(dialect),
            style,
        }
    }
}

impl<'d> SqlAstTranslator<'d> for SqlServerSqlAstTranslator<'d> {
    fn context(&mut self) -> &mut TranslationContext<'d> {
        &mut self.context
    }

    fn context_ref(&self) -> &TranslationContext<'d> {
        &self.context
    }

    fn pagination_style(&self) -> PaginationStyle {
        self.style
    }

    fn empty_window_order(&self) -> &'static str {
        "order by @@version"
    }

    fn visit_offset_fetch(&mut self, select: &SelectStatement) -> Result<()> {
        if self.style != PaginationStyle::OffsetFetch || !select.has_fetch() {
            return standard::visit_offset_fetch(self, select);
        }
        self.context.push_clause(Clause::Fetch);
        if select.order_by.is_empty() {
            debug!("adding a stand-in ordering for offset/fetch");
            self.context.append(" order by @@version");
        }
        // fetch is only allowed after offset
        self.context.append(" offset ");
        match &select.offset {
            Some(offset) => self.visit_expr(offset)?,
            None => self.context.append("0"),
        }
        self.context.append(" rows");
        if let Some(limit) = &select.limit {
            self.context.append(" fetch next ");
            self.visit_expr(limit)?;
            self.context.append(" rows only");
        }
        self.context.pop_clause();
        Ok(())
    }

    fn visit_upsert(&mut self, insert: &InsertStatement, conflict: &OnConflict) -> Result<()> {
        standard::visit_upsert(self, insert, conflict)?;
        // merge must be terminated
        self.context.append(";");
        Ok(())
    }
}
