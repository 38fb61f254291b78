//! SingleStore (formerly MemSQL) dialect.
//!
//! SingleStore speaks the MySQL protocol but has no foreign keys, no
//! sequences and no schemas in the JDBC sense. Row locking with
//! `for update` is off unless explicitly enabled, since it locks whole
//! partitions.

use core::fmt;
use core::str::FromStr;

use oxide_dialect_core::ast::{BinaryOp, DatetimeLiteral, Expr, Size, SqlTypeCode};
use oxide_dialect_core::dialect::{
    common, default_column_type, DatabaseVersion, Dialect,
    DistinctFromStrategy, FunctionRegistry, IntervalType, LockTimeout, TemporalType,
    TemporalUnit,
};
use oxide_dialect_core::exception::{
    extract_using_template, ConstraintKind, JdbcError, JdbcErrorKind, SqlError,
};
use oxide_dialect_core::identity::{IdentityColumnSupport, StandardIdentityColumnSupport};
use oxide_dialect_core::pagination::{LimitHandler, LimitLimitHandler};
use oxide_dialect_core::sequence::{NoSequenceSupport, SequenceSupport};
use oxide_dialect_core::translate::{
    standard, PaginationStyle, SqlAstTranslator, TranslationContext,
};
use oxide_dialect_core::{DialectError, Result};
use serde::{Deserialize, Serialize};

use super::{classified, mysql_datetime_format};

const PARAM_LIST_SIZE_LIMIT: u32 = 1_048_576;

/// Storage of tables created by the dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SingleStoreTableType {
    Rowstore,
    Columnstore,
}

impl SingleStoreTableType {
    /// Returns the lower-case keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rowstore => "rowstore",
            Self::Columnstore => "columnstore",
        }
    }
}

impl fmt::Display for SingleStoreTableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SingleStoreTableType {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rowstore" => Ok(Self::Rowstore),
            "columnstore" => Ok(Self::Columnstore),
            _ => Err(DialectError::Semantic(format!(
                "unknown SingleStore table type '{s}'"
            ))),
        }
    }
}

/// SingleStore dialect.
#[derive(Debug, Clone, Copy)]
pub struct SingleStoreDialect {
    version: DatabaseVersion,
    table_type: Option<SingleStoreTableType>,
    for_update_locking: bool,
}

impl SingleStoreDialect {
    /// Oldest supported version.
    pub const MINIMUM_VERSION: DatabaseVersion = DatabaseVersion::make(8, 0);

    /// Creates a dialect with the default table type and `for update`
    /// disabled.
    #[must_use]
    pub const fn new(version: DatabaseVersion) -> Self {
        Self {
            version,
            table_type: None,
            for_update_locking: false,
        }
    }

    /// Creates tables of the given storage type.
    #[must_use]
    pub const fn with_table_type(mut self, table_type: SingleStoreTableType) -> Self {
        self.table_type = Some(table_type);
        self
    }

    /// Enables `for update` row locking.
    #[must_use]
    pub const fn with_for_update_locking(mut self, enabled: bool) -> Self {
        self.for_update_locking = enabled;
        self
    }

    /// Explicit table type, if any.
    #[must_use]
    pub const fn table_type(&self) -> Option<SingleStoreTableType> {
        self.table_type
    }

    /// Returns true if `for update` is written.
    #[must_use]
    pub const fn is_for_update_locking_enabled(&self) -> bool {
        self.for_update_locking
    }

    /// Command starting a `create table` statement.
    #[must_use]
    pub fn create_table_string(&self) -> String {
        match self.table_type {
            Some(table_type) => format!("create {table_type} table"),
            None => "create table".into(),
        }
    }
}

impl Default for SingleStoreDialect {
    fn default() -> Self {
        Self::new(Self::MINIMUM_VERSION)
    }
}

impl Dialect for SingleStoreDialect {
    fn name(&self) -> &'static str {
        "singlestore"
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
            SqlTypeCode::Timestamp => "datetime($p)",
            SqlTypeCode::TimestampWithTimezone => "timestamp($p)",
            SqlTypeCode::TimeWithTimezone => "time($p)",
            SqlTypeCode::Numeric => "decimal($p,$s)",
            SqlTypeCode::Float | SqlTypeCode::Double => "double precision",
            SqlTypeCode::Nchar => "char($l) character set utf8",
            SqlTypeCode::Nvarchar => "varchar($l) character set utf8",
            SqlTypeCode::Blob | SqlTypeCode::Long32varbinary => "longblob",
            SqlTypeCode::Nclob | SqlTypeCode::Long32nvarchar => "longtext character set utf8",
            SqlTypeCode::Clob | SqlTypeCode::Long32varchar => "longtext",
            SqlTypeCode::Uuid => "binary(16)",
            other => default_column_type(other),
        }
        .to_string()
    }

    fn cast_type(&self, code: SqlTypeCode) -> String {
        match code {
            SqlTypeCode::Boolean | SqlTypeCode::Bit => "unsigned".into(),
            SqlTypeCode::Tinyint
            | SqlTypeCode::Smallint
            | SqlTypeCode::Integer
            | SqlTypeCode::Bigint => "signed".into(),
            SqlTypeCode::Char | SqlTypeCode::Varchar | SqlTypeCode::Long32varchar => {
                "char".into()
            }
            SqlTypeCode::Nchar | SqlTypeCode::Nvarchar | SqlTypeCode::Long32nvarchar => {
                "char character set utf8".into()
            }
            SqlTypeCode::Binary | SqlTypeCode::Varbinary | SqlTypeCode::Long32varbinary => {
                "binary".into()
            }
            other => self.type_name(other, Size::default()),
        }
    }

    fn max_varchar_length(&self) -> u32 {
        21_844
    }

    fn max_varbinary_length(&self) -> u32 {
        65_533
    }

    fn default_decimal_precision(&self) -> u32 {
        65
    }

    fn float_precision(&self) -> u32 {
        23
    }

    fn max_identifier_length(&self) -> u32 {
        64
    }

    fn in_expression_count_limit(&self) -> Option<u32> {
        Some(PARAM_LIST_SIZE_LIMIT)
    }

    fn append_string_literal(&self, buf: &mut String, value: &str) {
        buf.push('\'');
        for c in value.chars() {
            if c == '\'' || c == '\\' {
                buf.push(c);
            }
            buf.push(c);
        }
        buf.push('\'');
    }

    fn append_datetime_literal(&self, buf: &mut String, value: DatetimeLiteral) {
        let literal = match value {
            DatetimeLiteral::Date(d) => format!("date('{}')", d.format("%Y-%m-%d")),
            DatetimeLiteral::Time(t) => format!("time('{}')", t.format("%H:%M:%S")),
            DatetimeLiteral::Timestamp(ts) => {
                format!("timestamp('{}')", ts.format("%Y-%m-%d %H:%M:%S%.6f"))
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
            TemporalUnit::Second => "(second(?2)+microsecond(?2)/1e6)",
            TemporalUnit::Week => "weekofyear(?2)",
            TemporalUnit::DayOfWeek => "dayofweek(?2)",
            TemporalUnit::DayOfMonth => "dayofmonth(?2)",
            TemporalUnit::DayOfYear => "dayofyear(?2)",
            TemporalUnit::Epoch => "unix_timestamp(?2)",
            _ => "?1(?2)",
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
        temporal_type: TemporalType,
        _interval: Option<IntervalType>,
    ) -> Result<String> {
        // seconds go through microseconds to keep the fraction
        let add = match unit {
            TemporalUnit::Nanosecond => "timestampadd(microsecond,(?2)/1e3,{})",
            TemporalUnit::Native => "timestampadd(microsecond,?2,{})",
            TemporalUnit::Second => "timestampadd(microsecond,?2*1000000,{})",
            _ => "timestampadd(?1,?2,{})",
        };
        Ok(if temporal_type == TemporalType::Time {
            format!(
                "time({})",
                add.replace("{}", "to_timestamp(?3,'HH24:MI:SS.FF6')")
            )
        } else {
            add.replace("{}", "?3")
        })
    }

    fn timestampdiff_pattern(
        &self,
        unit: TemporalUnit,
        from_type: TemporalType,
        to_type: TemporalType,
    ) -> Result<String> {
        let from = if from_type == TemporalType::Time {
            "to_timestamp(?2,'HH24:MI:SS.FF6')"
        } else {
            "?2"
        };
        let to = if to_type == TemporalType::Time {
            "to_timestamp(?3,'HH24:MI:SS.FF6')"
        } else {
            "?3"
        };
        Ok(match unit {
            TemporalUnit::Nanosecond => format!("timestampdiff(microsecond,{from},{to})*1e3"),
            TemporalUnit::Native => format!("timestampdiff(microsecond,{from},{to})"),
            _ => format!("timestampdiff(?1,{from},{to})"),
        })
    }

    fn current_timestamp(&self) -> &'static str {
        "current_timestamp(6)"
    }

    fn current_timestamp_select_string(&self) -> String {
        "select now()".into()
    }

    fn fractional_second_precision_in_nanos(&self) -> u64 {
        1_000
    }

    fn limit_handler(&self) -> &'static dyn LimitHandler {
        &LimitLimitHandler::INSTANCE
    }

    fn supports_offset_fetch_clause(&self) -> bool {
        false
    }

    fn sequence_support(&self) -> &'static dyn SequenceSupport {
        &NoSequenceSupport::INSTANCE
    }

    fn identity_column_support(&self) -> &'static dyn IdentityColumnSupport {
        &StandardIdentityColumnSupport::AUTO_INCREMENT
    }

    fn for_update_string(&self) -> String {
        if self.for_update_locking {
            " for update".into()
        } else {
            String::new()
        }
    }

    fn write_lock_string(&self, _timeout: LockTimeout) -> String {
        self.for_update_string()
    }

    fn for_update_nowait_string(&self) -> String {
        self.for_update_string()
    }

    fn for_update_skip_locked_string(&self) -> String {
        self.for_update_string()
    }

    fn supports_lock_timeouts(&self) -> bool {
        false
    }

    fn drop_foreign_key_string(&self) -> &'static str {
        ""
    }

    fn add_foreign_key_constraint_string(
        &self,
        _constraint_name: &str,
        _foreign_key: &[&str],
        _referenced_table: &str,
        _primary_key: &[&str],
        _references_primary_key: bool,
    ) -> String {
        // foreign keys are not enforced
        String::new()
    }

    fn add_primary_key_constraint_string(&self, _constraint_name: &str) -> String {
        String::new()
    }

    fn create_schema_command(&self, _name: &str) -> Vec<String> {
        Vec::new()
    }

    fn drop_schema_command(&self, _name: &str) -> Vec<String> {
        Vec::new()
    }

    fn temporary_table_create_command(&self) -> &'static str {
        "create temporary table if not exists"
    }

    fn no_columns_insert_string(&self) -> &'static str {
        "values ()"
    }

    fn generated_as(&self, expression: &str) -> String {
        format!(" as ({expression}) persisted")
    }

    fn supports_if_exists_before_table_name(&self) -> bool {
        true
    }

    fn supports_comment_on(&self) -> bool {
        true
    }

    fn supports_null_precedence(&self) -> bool {
        false
    }

    fn supports_merge(&self) -> bool {
        false
    }

    fn supports_on_duplicate_key(&self) -> bool {
        true
    }

    fn supports_update_from(&self) -> bool {
        true
    }

    fn supports_distinct_from_predicate(&self) -> bool {
        false
    }

    fn distinct_from_strategy(&self) -> DistinctFromStrategy {
        DistinctFromStrategy::NullSafeEquals
    }

    fn open_quote(&self) -> char {
        '`'
    }

    fn close_quote(&self) -> char {
        '`'
    }

    fn initialize_function_registry(&self, registry: &mut FunctionRegistry) {
        common::cot_from_tan(registry);
        common::locate_instr(registry);
        common::truncate_trunc(registry);
        registry.register_pattern("chr", "char(?1 using utf8mb4)");
        registry.register_pattern("median", "median(?1) over ()");
        registry.register_pattern("pi", "pi() :> double");
        registry.register_pattern("listagg", "group_concat(?1 separator ?2)");
        registry.register_no_args("now", "now()");
        registry.register_no_args("curdate", "curdate()");
        registry.register_no_args("curtime", "curtime()");
        registry.register_no_args("localtime", "localtime");
    }

    fn cast_pattern(&self, _from: Option<SqlTypeCode>, to: SqlTypeCode) -> String {
        if matches!(to, SqlTypeCode::Float | SqlTypeCode::Double | SqlTypeCode::Real) {
            "?1 :> ?2".into()
        } else {
            "cast(?1 as ?2)".into()
        }
    }

    fn convert_exception(
        &self,
        error: &SqlError,
        message: &str,
        sql: Option<&str>,
    ) -> Option<JdbcError> {
        let kind = match error.error_code {
            1205 | 3572 => JdbcErrorKind::PessimisticLock,
            1206 | 1207 => JdbcErrorKind::LockAcquisition,
            1062 => JdbcErrorKind::constraint(
                ConstraintKind::Unique,
                self.extract_constraint_name(error),
            ),
            _ => match error.sql_state() {
                Some("41000") => JdbcErrorKind::LockTimeout,
                Some("40001") => JdbcErrorKind::LockAcquisition,
                _ => return None,
            },
        };
        classified(self.name(), kind, error, message, sql)
    }

    fn extract_constraint_name(&self, error: &SqlError) -> Option<String> {
        if error.sql_state() == Some("23000") {
            extract_using_template(" for key '", "'", &error.message)
        } else {
            None
        }
    }

    fn build_translator(&self) -> Box<dyn SqlAstTranslator<'_> + '_> {
        Box::new(SingleStoreSqlAstTranslator::new(self))
    }
}

/// Translator writing `limit` and `concat()`.
#[derive(Debug)]
pub struct SingleStoreSqlAstTranslator<'d> {
    context: TranslationContext<'d>,
}

impl<'d> SingleStoreSqlAstTranslator<'d> {
    /// Creates a translator for `dialect`.
    #[must_use]
    pub fn new(dialect: &'d SingleStoreDialect) -> Self {
        Self {
            context: TranslationContext::new(dialect),
        }
    }
}

impl<'d> SqlAstTranslator<'d> for SingleStoreSqlAstTranslator<'d> {
    fn context(&mut self) -> &mut TranslationContext<'d> {
        &mut self.context
    }

    fn context_ref(&self) -> &TranslationContext<'d> {
        &self.context
    }

    fn pagination_style(&self) -> PaginationStyle {
        PaginationStyle::LimitComma
    }

    // `||` is a logical or
    fn visit_expr(&mut self, expr: &Expr) -> Result<()> {
        if let Expr::Binary {
            left,
            op: BinaryOp::Concat,
            right,
        } = expr
        {
            self.context.append("concat(");
            self.visit_expr(left)?;
            self.context.append(",");
            self.visit_expr(right)?;
            self.context.append(")");
            return Ok(());
        }
        standard::visit_expr(self, expr)
    }
}

#[cfg(test)]
mod tests {
    use oxide_dialect_core::ast::{SelectColumn, SelectStatement, Statement, TableRef};
    use oxide_dialect_core::dialect::{LockMode, LockOptions};
    use oxide_dialect_core::translate::QueryOptions;

    use super::*;

    fn select(columns: Vec<SelectColumn>) -> SelectStatement {
        SelectStatement::new(columns, Some(TableRef::table("t")))
    }

    #[test]
    fn test_column_and_cast_types() {
        let dialect = SingleStoreDialect::default();
        assert_eq!(dialect.column_type(SqlTypeCode::Boolean), "bit");
        assert_eq!(dialect.column_type(SqlTypeCode::Timestamp), "datetime($p)");
        assert_eq!(dialect.column_type(SqlTypeCode::Clob), "longtext");
        assert_eq!(dialect.cast_type(SqlTypeCode::Integer), "signed");
        assert_eq!(dialect.cast_type(SqlTypeCode::Nvarchar), "char character set utf8");
        assert_eq!(dialect.cast_pattern(None, SqlTypeCode::Double), "?1 :> ?2");
    }

    #[test]
    fn test_temporal_patterns() {
        let dialect = SingleStoreDialect::default();
        assert_eq!(
            dialect
                .timestampadd_pattern(TemporalUnit::Second, TemporalType::Timestamp, None)
                .unwrap(),
            "timestampadd(microsecond,?2*1000000,?3)"
        );
        assert_eq!(
            dialect
                .timestampadd_pattern(TemporalUnit::Hour, TemporalType::Time, None)
                .unwrap(),
            "time(timestampadd(?1,?2,to_timestamp(?3,'HH24:MI:SS.FF6')))"
        );
        assert_eq!(
            dialect
                .timestampdiff_pattern(TemporalUnit::Nanosecond, TemporalType::Time, TemporalType::Timestamp)
                .unwrap(),
            "timestampdiff(microsecond,to_timestamp(?2,'HH24:MI:SS.FF6'),?3)*1e3"
        );
        assert_eq!(dialect.extract_pattern(TemporalUnit::Epoch).unwrap(), "unix_timestamp(?2)");
    }

    #[test]
    fn test_string_literal_escapes_backslash() {
        let mut buf = String::new();
        SingleStoreDialect::default().append_string_literal(&mut buf, r"it's C:\tmp");
        assert_eq!(buf, r"'it''s C:\\tmp'");
    }

    #[test]
    fn test_for_update_switch() {
        let write = LockOptions::new(LockMode::PessimisticWrite);
        assert_eq!(SingleStoreDialect::default().lock_clause(&write), "");
        let enabled = SingleStoreDialect::default().with_for_update_locking(true);
        assert_eq!(enabled.lock_clause(&write), " for update");
        assert_eq!(
            enabled.lock_clause(&LockOptions::new(LockMode::UpgradeNoWait)),
            " for update"
        );
    }

    #[test]
    fn test_table_type() {
        let dialect =
            SingleStoreDialect::default().with_table_type(SingleStoreTableType::Columnstore);
        assert_eq!(dialect.create_table_string(), "create columnstore table");
        assert_eq!(SingleStoreDialect::default().create_table_string(), "create table");
        assert_eq!(
            "ROWSTORE".parse::<SingleStoreTableType>().unwrap(),
            SingleStoreTableType::Rowstore
        );
        assert!("heap".parse::<SingleStoreTableType>().is_err());
    }

    #[test]
    fn test_translation() {
        let mut query = select(vec![SelectColumn::new(
            Expr::column("a").binary(BinaryOp::Concat, Expr::column("b")),
        )]);
        query.offset = Some(Expr::param(1));
        query.limit = Some(Expr::param(2));
        let operation = SingleStoreDialect::default()
            .translate(&Statement::Select(query), &QueryOptions::default())
            .unwrap();
        assert_eq!(operation.sql, "select concat(a,b) from t limit ?,?");

        let mut query = select(vec![SelectColumn::new(Expr::column("a"))]);
        query.where_clause = Some(Expr::column("a").not_distinct_from(Expr::param(1)));
        let operation = SingleStoreDialect::default()
            .translate(&Statement::Select(query), &QueryOptions::default())
            .unwrap();
        assert_eq!(operation.sql, "select a from t where a<=>?");
    }

    #[test]
    fn test_convert_exception() {
        let dialect = SingleStoreDialect::default();
        let unique = SqlError::new(1062, "Duplicate entry '1' for key 'PRIMARY'")
            .with_sql_state("23000");
        assert_eq!(
            dialect.convert_exception(&unique, "insert", None).unwrap().kind,
            JdbcErrorKind::constraint(ConstraintKind::Unique, Some("PRIMARY".into()))
        );
        assert_eq!(
            dialect
                .convert_exception(&SqlError::new(3572, "locked"), "x", None)
                .unwrap()
                .kind,
            JdbcErrorKind::PessimisticLock
        );
        let timeout = SqlError::new(9999, "lock wait").with_sql_state("41000");
        assert_eq!(
            dialect.convert_exception(&timeout, "x", None).unwrap().kind,
            JdbcErrorKind::LockTimeout
        );
        assert!(dialect.convert_exception(&SqlError::new(1146, "no table"), "x", None).is_none());
    }
}
