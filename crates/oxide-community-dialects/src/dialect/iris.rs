//! InterSystems IRIS dialect.

use oxide_dialect_core::ast::SqlTypeCode;
use oxide_dialect_core::dialect::{
    common, default_column_type, unsupported_unit, DatabaseVersion, Dialect, FunctionRegistry,
    IntervalType, TemporalType, TemporalUnit,
};
use oxide_dialect_core::exception::{
    extract_using_template, ConstraintKind, JdbcError, JdbcErrorKind, SqlError,
};
use oxide_dialect_core::identity::{IdentityColumnSupport, StandardIdentityColumnSupport};
use oxide_dialect_core::pagination::{IrisLimitHandler, LimitHandler};
use oxide_dialect_core::translate::{PaginationStyle, SqlAstTranslator};
use oxide_dialect_core::Result;

use super::{classified, PagingTranslator};

/// InterSystems IRIS dialect.
#[derive(Debug, Clone, Copy)]
pub struct IrisDialect {
    version: DatabaseVersion,
}

impl IrisDialect {
    /// Oldest supported version.
    pub const MINIMUM_VERSION: DatabaseVersion = DatabaseVersion::make(2021, 1);

    /// Creates a dialect for an IRIS version.
    #[must_use]
    pub const fn new(version: DatabaseVersion) -> Self {
        Self { version }
    }
}

impl Default for IrisDialect {
    fn default() -> Self {
        Self::new(Self::MINIMUM_VERSION)
    }
}

impl Dialect for IrisDialect {
    fn name(&self) -> &'static str {
        "iris"
    }

    fn version(&self) -> DatabaseVersion {
        self.version
    }

    fn minimum_version(&self) -> DatabaseVersion {
        Self::MINIMUM_VERSION
    }

    fn column_type(&self, code: SqlTypeCode) -> String {
        match code {
            SqlTypeCode::Boolean | SqlTypeCode::Bit => "bit",
            SqlTypeCode::Char | SqlTypeCode::Nchar => "char(1)",
            SqlTypeCode::Bigint => "bigint",
            SqlTypeCode::Double => "double",
            SqlTypeCode::Float => "float",
            SqlTypeCode::TimestampWithTimezone | SqlTypeCode::Timestamp => "timestamp",
            SqlTypeCode::TimeWithTimezone => "time",
            SqlTypeCode::Nvarchar => "varchar($l)",
            SqlTypeCode::Binary | SqlTypeCode::Varbinary => "varbinary($l)",
            SqlTypeCode::Long32varbinary | SqlTypeCode::Blob => "longvarbinary",
            SqlTypeCode::Long32varchar
            | SqlTypeCode::Long32nvarchar
            | SqlTypeCode::Clob
            | SqlTypeCode::Nclob
            | SqlTypeCode::Json => "longvarchar",
            SqlTypeCode::Uuid => "char(36)",
            other => default_column_type(other),
        }
        .to_string()
    }

    fn to_boolean_value_string(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    fn extract_pattern(&self, unit: TemporalUnit) -> Result<String> {
        Ok(match unit {
            TemporalUnit::Epoch => "datediff('s','1970-01-01 00:00:00',?2)",
            _ => "?1(?2)",
        }
        .into())
    }

    fn translate_extract_field(&self, unit: TemporalUnit) -> String {
        match unit {
            TemporalUnit::DayOfMonth => "dayofmonth".into(),
            TemporalUnit::DayOfYear => "dayofyear".into(),
            TemporalUnit::DayOfWeek => "dayofweek".into(),
            other => other.as_str().into(),
        }
    }

    fn timestampadd_pattern(
        &self,
        unit: TemporalUnit,
        _temporal_type: TemporalType,
        _interval: Option<IntervalType>,
    ) -> Result<String> {
        if !is_datepart(unit) {
            return Err(unsupported_unit(self.name(), "timestampadd", unit));
        }
        Ok("dateadd(?1,?2,?3)".into())
    }

    fn timestampdiff_pattern(
        &self,
        unit: TemporalUnit,
        _from_type: TemporalType,
        _to_type: TemporalType,
    ) -> Result<String> {
        if !is_datepart(unit) {
            return Err(unsupported_unit(self.name(), "timestampdiff", unit));
        }
        Ok("datediff(?1,?2,?3)".into())
    }

    fn current_timestamp_select_string(&self) -> String {
        "select current_timestamp".into()
    }

    fn limit_handler(&self) -> &'static dyn LimitHandler {
        &IrisLimitHandler::INSTANCE
    }

    fn supports_offset_fetch_clause(&self) -> bool {
        false
    }

    fn identity_column_support(&self) -> &'static dyn IdentityColumnSupport {
        &StandardIdentityColumnSupport::IRIS
    }

    fn supports_lock_timeouts(&self) -> bool {
        false
    }

    fn supports_outer_join_for_update(&self) -> bool {
        false
    }

    fn drop_foreign_key_string(&self) -> &'static str {
        " drop foreign key "
    }

    fn add_foreign_key_constraint_string(
        &self,
        constraint_name: &str,
        foreign_key: &[&str],
        referenced_table: &str,
        primary_key: &[&str],
        _references_primary_key: bool,
    ) -> String {
        // referenced columns are always listed
        format!(
            " add constraint {constraint_name} foreign key ({}) references {referenced_table} ({})",
            foreign_key.join(", "),
            primary_key.join(", ")
        )
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
        "create table if not exists"
    }

    fn no_columns_insert_string(&self) -> &'static str {
        " default values"
    }

    fn supports_null_precedence(&self) -> bool {
        false
    }

    fn supports_values_list_for_insert(&self) -> bool {
        false
    }

    fn supports_exists_in_select(&self) -> bool {
        false
    }

    fn lowercase_function(&self) -> &'static str {
        "lower"
    }

    fn initialize_function_registry(&self, registry: &mut FunctionRegistry) {
        common::bit_length_from_length(registry);
        common::cot_from_tan(registry);
        common::locate_position(registry);
        registry.register_alias("chr", "char");
        registry.register_alias("character_length", "len");
        registry.register_alias("repeat", "replicate");
        registry.register_no_args("now", "now()");
        registry.register_no_args("curdate", "curdate()");
        registry.register_no_args("curtime", "curtime()");
        registry.register_no_args("database", "database()");
        registry.register_no_args("getdate", "getdate()");
    }

    fn convert_exception(
        &self,
        error: &SqlError,
        message: &str,
        sql: Option<&str>,
    ) -> Option<JdbcError> {
        let constraint = |kind| JdbcErrorKind::constraint(kind, self.extract_constraint_name(error));
        let kind = match error.error_code {
            -119 | -120 => constraint(ConstraintKind::Unique),
            -124..=-121 => constraint(ConstraintKind::ForeignKey),
            -108 => constraint(ConstraintKind::NotNull),
            _ if error.sql_state_class() == Some("22") => JdbcErrorKind::DataException,
            _ => return None,
        };
        classified(self.name(), kind, error, message, sql)
    }

    fn extract_constraint_name(&self, error: &SqlError) -> Option<String> {
        extract_using_template("(", ")", &error.message)
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

/// Units `dateadd` and `datediff` accept.
const fn is_datepart(unit: TemporalUnit) -> bool {
    matches!(
        unit,
        TemporalUnit::Year
            | TemporalUnit::Quarter
            | TemporalUnit::Month
            | TemporalUnit::Week
            | TemporalUnit::Day
            | TemporalUnit::Hour
            | TemporalUnit::Minute
            | TemporalUnit::Second
            | TemporalUnit::Nanosecond
            | TemporalUnit::Native
    )
}

#[cfg(test)]
mod tests {
    use oxide_dialect_core::ast::{Expr, SelectColumn, SelectStatement, Statement, TableRef};
    use oxide_dialect_core::pagination::Limit;
    use oxide_dialect_core::translate::QueryOptions;

    use super::*;

    #[test]
    fn test_column_types() {
        let dialect = IrisDialect::default();
        assert_eq!(dialect.column_type(SqlTypeCode::Boolean), "bit");
        assert_eq!(dialect.column_type(SqlTypeCode::Clob), "longvarchar");
        assert_eq!(dialect.column_type(SqlTypeCode::Varbinary), "varbinary($l)");
    }

    #[test]
    fn test_temporal_patterns() {
        let dialect = IrisDialect::default();
        assert_eq!(
            dialect
                .timestampadd_pattern(TemporalUnit::Day, TemporalType::Timestamp, None)
                .unwrap(),
            "dateadd(?1,?2,?3)"
        );
        assert!(dialect
            .timestampdiff_pattern(TemporalUnit::DayOfWeek, TemporalType::Date, TemporalType::Date)
            .is_err());
        assert_eq!(dialect.translate_extract_field(TemporalUnit::DayOfYear), "dayofyear");
    }

    #[test]
    fn test_top_pagination() {
        let mut select = SelectStatement::new(
            vec![SelectColumn::new(Expr::column("a"))],
            Some(TableRef::table("t")),
        );
        select.limit = Some(Expr::param(1));
        let operation = IrisDialect::default()
            .translate(&Statement::Select(select), &QueryOptions::default())
            .unwrap();
        assert_eq!(operation.sql, "select top ? a from t");
    }

    #[test]
    fn test_limit_handler_wraps_offsets() {
        let limited = IrisDialect::default()
            .limit_handler()
            .process_sql("select a from t", &Limit::new(Some(10), Some(5)))
            .unwrap();
        assert_eq!(limited.sql, "select * from (select top all a from t) where %vid between ? and ?");
        assert_eq!(limited.trailing, vec![11, 15]);
    }

    #[test]
    fn test_convert_exception() {
        let dialect = IrisDialect::default();
        let unique = SqlError::new(-119, "UNIQUE or PRIMARY KEY Constraint (IDX_NAME) failed");
        assert_eq!(
            dialect.convert_exception(&unique, "insert", None).unwrap().kind,
            JdbcErrorKind::constraint(ConstraintKind::Unique, Some("IDX_NAME".into()))
        );
        let data = SqlError::new(-104, "field validation failed").with_sql_state("22001");
        assert_eq!(
            dialect.convert_exception(&data, "insert", None).unwrap().kind,
            JdbcErrorKind::DataException
        );
        assert!(dialect.convert_exception(&SqlError::new(-30, "no table"), "x", None).is_none());
    }
}
