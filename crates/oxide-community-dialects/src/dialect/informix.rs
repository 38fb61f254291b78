//! Informix dialect, and the family of products derived from it.

use core::fmt;
use core::marker::PhantomData;

use oxide_dialect_core::ast::{expand_type_template, DatetimeLiteral, Size, SqlTypeCode};
use oxide_dialect_core::dialect::{
    common, default_column_type, unsupported_unit, DatabaseVersion, DatetimeFormatReplacer,
    Dialect, FunctionRegistry, IntervalType, TemporalType, TemporalUnit,
};
use oxide_dialect_core::exception::{
    extract_using_template, strip_owner, ConstraintKind, JdbcError, JdbcErrorKind, SqlError,
};
use oxide_dialect_core::identity::{IdentityColumnSupport, StandardIdentityColumnSupport};
use oxide_dialect_core::pagination::{FirstLimitHandler, LimitHandler, SkipFirstLimitHandler};
use oxide_dialect_core::sequence::{SequenceSupport, StandardSequenceSupport};
use oxide_dialect_core::translate::{PaginationStyle, SqlAstTranslator};
use oxide_dialect_core::Result;

use super::{classified, PagingTranslator};

const DUAL: &str = "(select 0 from systables where tabid=1)";

/// A product speaking Informix SQL.
pub trait InformixFlavor: fmt::Debug + Send + Sync + 'static {
    /// Dialect name.
    const NAME: &'static str;
    /// Oldest supported version, in the product's own numbering.
    const MINIMUM_VERSION: DatabaseVersion;
    /// Version of the Informix engine the product version corresponds to.
    fn engine_version(version: DatabaseVersion) -> DatabaseVersion;
}

/// IBM Informix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Informix;

impl InformixFlavor for Informix {
    const NAME: &'static str = "informix";
    const MINIMUM_VERSION: DatabaseVersion = DatabaseVersion::make(7, 0);

    fn engine_version(version: DatabaseVersion) -> DatabaseVersion {
        version
    }
}

/// Dialect of Informix and the products built on its engine.
pub struct InformixFamily<F> {
    version: DatabaseVersion,
    flavor: PhantomData<F>,
}

/// Informix dialect.
pub type InformixDialect = InformixFamily<Informix>;

impl<F: InformixFlavor> InformixFamily<F> {
    /// Oldest supported version.
    pub const MINIMUM_VERSION: DatabaseVersion = F::MINIMUM_VERSION;

    /// Creates a dialect for a product version.
    #[must_use]
    pub const fn new(version: DatabaseVersion) -> Self {
        Self {
            version,
            flavor: PhantomData,
        }
    }

    fn engine(&self) -> DatabaseVersion {
        F::engine_version(self.version)
    }

    fn engine_at_least(&self, major: u16, minor: u16) -> bool {
        self.engine().is_same_or_after(major, minor)
    }
}

impl<F> Clone for InformixFamily<F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F> Copy for InformixFamily<F> {}

impl<F: InformixFlavor> fmt::Debug for InformixFamily<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InformixFamily")
            .field("name", &F::NAME)
            .field("version", &self.version)
            .finish()
    }
}

impl<F: InformixFlavor> Default for InformixFamily<F> {
    fn default() -> Self {
        Self::new(F::MINIMUM_VERSION)
    }
}

/// Informix variation of the MySQL `date_format` vocabulary.
fn informix_datetime_format(format: &str) -> String {
    DatetimeFormatReplacer::new(
        "",
        &[
            ("%", "%%"),
            ("yyyy", "%Y"),
            ("yyy", "%Y"),
            ("yy", "%y"),
            ("y", "Y"),
            ("MMMM", "%B"),
            ("MMM", "%b"),
            ("MM", "%m"),
            ("M", "%c"),
            ("EEEE", "%A"),
            ("EEE", "%a"),
            ("ee", "%w"),
            ("e", "%w"),
            ("dd", "%d"),
            ("d", "%e"),
            ("a", "%p"),
            ("hh", "%I"),
            ("HH", "%H"),
            ("h", "%I"),
            ("H", "%H"),
            ("mm", "%M"),
            ("m", "%M"),
            ("ss", "%S"),
            ("s", "%S"),
            ("SSSSSS", "%F5"),
            ("SSSSS", "%F5"),
            ("SSSS", "%F4"),
            ("SSS", "%F3"),
            ("SS", "%F2"),
            ("S", "%F1"),
        ],
    )
    .replace(format)
}

impl<F: InformixFlavor> Dialect for InformixFamily<F> {
    fn name(&self) -> &'static str {
        F::NAME
    }

    fn version(&self) -> DatabaseVersion {
        self.version
    }

    fn minimum_version(&self) -> DatabaseVersion {
        F::MINIMUM_VERSION
    }

    fn column_type(&self, code: SqlTypeCode) -> String {
        match code {
            SqlTypeCode::Tinyint => "smallint",
            SqlTypeCode::Bigint => "int8",
            SqlTypeCode::Real => "smallfloat",
            SqlTypeCode::Float | SqlTypeCode::Double => "float",
            SqlTypeCode::Time => "datetime hour to second",
            SqlTypeCode::Timestamp | SqlTypeCode::TimestampWithTimezone => {
                "datetime year to fraction($p)"
            }
            SqlTypeCode::Binary | SqlTypeCode::Varbinary | SqlTypeCode::Long32varbinary => "byte",
            SqlTypeCode::Long32varchar | SqlTypeCode::Long32nvarchar => "text",
            SqlTypeCode::Varchar | SqlTypeCode::Nvarchar => "lvarchar($l)",
            SqlTypeCode::Nclob => "clob",
            SqlTypeCode::Uuid => "char(36)",
            SqlTypeCode::Json => "lvarchar(32739)",
            other => default_column_type(other),
        }
        .to_string()
    }

    fn type_name(&self, code: SqlTypeCode, size: Size) -> String {
        let length = size.length.unwrap_or(Size::DEFAULT_LENGTH);
        // short strings fit the plain types
        let template = match code {
            SqlTypeCode::Varchar if length <= 255 => "varchar($l)".to_string(),
            SqlTypeCode::Nvarchar if length <= 255 => "nvarchar($l)".to_string(),
            other => self.column_type(other),
        };
        let precision = size.precision.unwrap_or_else(|| {
            if code.is_temporal() {
                self.default_timestamp_precision()
            } else {
                self.default_decimal_precision()
            }
        });
        expand_type_template(
            &template,
            length,
            precision,
            size.scale.unwrap_or(Size::DEFAULT_SCALE),
        )
    }

    fn max_varchar_length(&self) -> u32 {
        32_739
    }

    fn max_nvarchar_length(&self) -> u32 {
        32_739
    }

    fn default_decimal_precision(&self) -> u32 {
        32
    }

    fn default_timestamp_precision(&self) -> u32 {
        5
    }

    fn float_precision(&self) -> u32 {
        8
    }

    fn double_precision(&self) -> u32 {
        16
    }

    fn select_clause_null_string(&self, code: SqlTypeCode) -> String {
        let type_name = self.type_name(code, Size::length(Size::DEFAULT_LENGTH));
        let bare = type_name.split('(').next().unwrap_or(&type_name);
        format!("null::{bare}")
    }

    fn to_boolean_value_string(&self, value: bool) -> &'static str {
        if value {
            "'t'"
        } else {
            "'f'"
        }
    }

    fn append_datetime_literal(&self, buf: &mut String, value: DatetimeLiteral) {
        let literal = match value {
            DatetimeLiteral::Date(d) => format!("{{d '{}'}}", d.format("%Y-%m-%d")),
            DatetimeLiteral::Time(t) => format!("{{t '{}'}}", t.format("%H:%M:%S")),
            DatetimeLiteral::Timestamp(ts) => {
                format!("{{ts '{}'}}", ts.format("%Y-%m-%d %H:%M:%S%.6f"))
            }
        };
        buf.push_str(&literal);
    }

    fn datetime_format_pattern(&self, format: &str) -> Result<String> {
        Ok(informix_datetime_format(format))
    }

    fn format_function_pattern(&self) -> Option<&'static str> {
        Some("to_char(?1,?2)")
    }

    fn extract_pattern(&self, unit: TemporalUnit) -> Result<String> {
        Ok(match unit {
            TemporalUnit::Second => "to_number(to_char(?2,'%S'))",
            TemporalUnit::Minute => "to_number(to_char(?2,'%M'))",
            TemporalUnit::Hour => "to_number(to_char(?2,'%H'))",
            TemporalUnit::DayOfWeek => "(weekday(?2)+1)",
            TemporalUnit::DayOfMonth => "day(?2)",
            TemporalUnit::Epoch => "dbinfo('utc_current')",
            _ => "?1(?2)",
        }
        .into())
    }

    fn timestampadd_pattern(
        &self,
        unit: TemporalUnit,
        _temporal_type: TemporalType,
        _interval: Option<IntervalType>,
    ) -> Result<String> {
        Ok(match unit {
            TemporalUnit::Week => "(?3+(?2)*7 units day)",
            TemporalUnit::Quarter => "(?3+(?2)*3 units month)",
            TemporalUnit::Year
            | TemporalUnit::Month
            | TemporalUnit::Day
            | TemporalUnit::Hour
            | TemporalUnit::Minute
            | TemporalUnit::Second => "(?3+(?2) units ?1)",
            _ => return Err(unsupported_unit(self.name(), "timestampadd", unit)),
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
            TemporalUnit::Year => "(year(?3)-year(?2))",
            TemporalUnit::Quarter => "(((year(?3)-year(?2))*12+month(?3)-month(?2))/3)",
            TemporalUnit::Month => "((year(?3)-year(?2))*12+month(?3)-month(?2))",
            TemporalUnit::Week => "((date(?3)-date(?2))/7)",
            TemporalUnit::Day => "(date(?3)-date(?2))",
            _ => return Err(unsupported_unit(self.name(), "timestampdiff", unit)),
        }
        .into())
    }

    fn current_date(&self) -> &'static str {
        "today"
    }

    fn current_time(&self) -> &'static str {
        "current"
    }

    fn current_timestamp(&self) -> &'static str {
        "current"
    }

    fn current_timestamp_select_string(&self) -> String {
        "select distinct current timestamp from informix.systables".into()
    }

    fn limit_handler(&self) -> &'static dyn LimitHandler {
        if !self.engine_at_least(10, 0) {
            &FirstLimitHandler::INSTANCE
        } else if self.engine_at_least(11, 0) {
            &SkipFirstLimitHandler::INSTANCE
        } else {
            &SkipFirstLimitHandler::INLINE_INSTANCE
        }
    }

    fn supports_offset_fetch_clause(&self) -> bool {
        false
    }

    fn sequence_support(&self) -> &'static dyn SequenceSupport {
        if self.engine_at_least(11, 70) {
            &StandardSequenceSupport::INFORMIX
        } else {
            &StandardSequenceSupport::INFORMIX_UNPOOLED
        }
    }

    fn identity_column_support(&self) -> &'static dyn IdentityColumnSupport {
        &StandardIdentityColumnSupport::INFORMIX
    }

    fn query_sequences_string(&self) -> Option<&'static str> {
        Some("select systables.tabname as sequence_name,syssequences.* from syssequences join systables on syssequences.tabid=systables.tabid where tabtype='Q'")
    }

    fn add_column_string(&self) -> &'static str {
        "add"
    }

    fn add_foreign_key_constraint_string(
        &self,
        constraint_name: &str,
        foreign_key: &[&str],
        referenced_table: &str,
        primary_key: &[&str],
        references_primary_key: bool,
    ) -> String {
        // the constraint name trails the definition
        let mut sql = format!(
            " add constraint  foreign key ({}) references {referenced_table}",
            foreign_key.join(", ")
        );
        if !references_primary_key {
            sql.push_str(&format!(" ({})", primary_key.join(", ")));
        }
        sql.push_str(" constraint ");
        sql.push_str(constraint_name);
        sql
    }

    fn add_primary_key_constraint_string(&self, constraint_name: &str) -> String {
        format!(" add constraint primary key constraint {constraint_name} ")
    }

    fn create_schema_command(&self, name: &str) -> Vec<String> {
        vec![format!("create schema authorization {name}")]
    }

    fn drop_schema_command(&self, _name: &str) -> Vec<String> {
        Vec::new()
    }

    fn temporary_table_create_command(&self) -> &'static str {
        "create temp table"
    }

    fn temporary_table_create_options(&self) -> Option<&'static str> {
        Some("with no log")
    }

    fn no_columns_insert_string(&self) -> &'static str {
        "values (0)"
    }

    fn supports_if_exists_before_table_name(&self) -> bool {
        self.engine_at_least(11, 70)
    }

    fn supports_window_functions(&self) -> bool {
        self.engine_at_least(12, 10)
    }

    fn supports_lateral(&self) -> bool {
        self.engine_at_least(12, 10)
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
        self.engine_at_least(12, 10)
    }

    fn supports_intersect(&self) -> bool {
        self.engine_at_least(11, 70)
    }

    fn supports_except(&self) -> bool {
        self.engine_at_least(11, 70)
    }

    fn supports_merge(&self) -> bool {
        self.engine_at_least(11, 50)
    }

    fn from_dual_for_select_only(&self) -> &'static str {
        " from (select 0 from systables where tabid=1) dual"
    }

    fn dual(&self) -> &'static str {
        DUAL
    }

    fn initialize_function_registry(&self, registry: &mut FunctionRegistry) {
        common::least_greatest_case(registry);
        common::bit_length_from_length(registry);
        if self.engine_at_least(12, 0) {
            common::locate_charindex(registry);
        }
        registry.register_alias("ceiling", "ceil");
        registry.register_alias("char", "chr");
        registry.register_alias("substring", "substr");
        registry.register_alias("truncate", "trunc");
        registry.register_pattern("matches", "(?1 matches ?2)");
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
        let constraint = |kind| JdbcErrorKind::constraint(kind, self.extract_constraint_name(error));
        let kind = match error.error_code {
            -268 => constraint(ConstraintKind::Unique),
            -691 | -692 => constraint(ConstraintKind::ForeignKey),
            -391 => constraint(ConstraintKind::NotNull),
            -244 => JdbcErrorKind::LockTimeout,
            -143 => JdbcErrorKind::LockAcquisition,
            -213 => JdbcErrorKind::QueryTimeout,
            _ => return None,
        };
        classified(self.name(), kind, error, message, sql)
    }

    fn extract_constraint_name(&self, error: &SqlError) -> Option<String> {
        let message = &error.message;
        let name = match error.error_code {
            -268 => extract_using_template("Unique constraint (", ") violated.", message),
            -691 => extract_using_template(
                "Missing key in referenced table for referential constraint (",
                ").",
                message,
            ),
            -692 => extract_using_template(
                "Key value for constraint (",
                ") is still being referenced.",
                message,
            ),
            _ => None,
        }?;
        // reported as owner.constraint
        Some(strip_owner(&name).to_string())
    }

    fn build_translator(&self) -> Box<dyn SqlAstTranslator<'_> + '_> {
        Box::new(PagingTranslator::new(self, PaginationStyle::SkipFirst))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use oxide_dialect_core::ast::{Expr, SelectColumn, SelectStatement, Statement, TableRef};
    use oxide_dialect_core::translate::QueryOptions;

    use super::*;

    fn informix(major: u16, minor: u16) -> InformixDialect {
        InformixDialect::new(DatabaseVersion::make(major, minor))
    }

    #[test]
    fn test_column_types() {
        let dialect = informix(12, 10);
        assert_eq!(
            dialect.type_name(SqlTypeCode::Timestamp, Size::default()),
            "datetime year to fraction(5)"
        );
        assert_eq!(dialect.type_name(SqlTypeCode::Varchar, Size::length(100)), "varchar(100)");
        assert_eq!(dialect.type_name(SqlTypeCode::Varchar, Size::length(1000)), "lvarchar(1000)");
        assert_eq!(dialect.type_name(SqlTypeCode::Bigint, Size::default()), "int8");
        assert_eq!(dialect.select_clause_null_string(SqlTypeCode::Varchar), "null::varchar");
        assert_eq!(dialect.select_clause_null_string(SqlTypeCode::Bigint), "null::int8");
    }

    #[test]
    fn test_literals() {
        let dialect = informix(12, 10);
        let mut buf = String::new();
        dialect.append_boolean_literal(&mut buf, true);
        buf.push(',');
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        dialect.append_datetime_literal(&mut buf, DatetimeLiteral::Date(date));
        assert_eq!(buf, "'t',{d '2024-03-01'}");
        assert_eq!(dialect.datetime_format_pattern("yyyy-MM-dd 'at' HH").unwrap(), "%Y-%m-%d at %H");
    }

    #[test]
    fn test_strategies_by_version() {
        assert_eq!(informix(9, 40).limit_handler().name(), "first");
        assert_eq!(informix(10, 0).limit_handler().name(), "skip-first");
        assert!(!informix(10, 0).limit_handler().supports_variable_limit());
        assert!(informix(11, 50).limit_handler().supports_variable_limit());
        assert!(!informix(11, 50).sequence_support().supports_pooled_sequences());
        assert!(informix(12, 10).sequence_support().supports_pooled_sequences());
        assert!(!informix(11, 50).supports_window_functions());
    }

    #[test]
    fn test_temporal_patterns() {
        let dialect = informix(12, 10);
        assert_eq!(
            dialect
                .timestampadd_pattern(TemporalUnit::Week, TemporalType::Date, None)
                .unwrap(),
            "(?3+(?2)*7 units day)"
        );
        assert!(dialect
            .timestampadd_pattern(TemporalUnit::Nanosecond, TemporalType::Timestamp, None)
            .is_err());
        assert_eq!(dialect.extract_pattern(TemporalUnit::DayOfWeek).unwrap(), "(weekday(?2)+1)");
    }

    #[test]
    fn test_ddl_strings() {
        let dialect = informix(12, 10);
        assert_eq!(
            dialect.add_foreign_key_constraint_string("fk_a", &["b_id"], "b", &["id"], true),
            " add constraint  foreign key (b_id) references b constraint fk_a"
        );
        assert_eq!(
            dialect.add_primary_key_constraint_string("pk_a"),
            " add constraint primary key constraint pk_a "
        );
    }

    #[test]
    fn test_skip_first_pagination() {
        let mut select = SelectStatement::new(
            vec![SelectColumn::new(Expr::column("a"))],
            Some(TableRef::table("t")),
        );
        select.offset = Some(Expr::param(1));
        select.limit = Some(Expr::param(2));
        let operation = informix(12, 10)
            .translate(&Statement::Select(select), &QueryOptions::default())
            .unwrap();
        assert_eq!(operation.sql, "select skip ? first ? a from t");
    }

    #[test]
    fn test_convert_exception() {
        let dialect = informix(12, 10);
        let unique = SqlError::new(-268, "Unique constraint (informix.u_name) violated.");
        assert_eq!(
            dialect.convert_exception(&unique, "insert", None).unwrap().kind,
            JdbcErrorKind::constraint(ConstraintKind::Unique, Some("u_name".into()))
        );
        let fk = SqlError::new(
            -692,
            "Key value for constraint (informix.fk_b) is still being referenced.",
        );
        assert_eq!(
            dialect.convert_exception(&fk, "delete", None).unwrap().kind,
            JdbcErrorKind::constraint(ConstraintKind::ForeignKey, Some("fk_b".into()))
        );
        assert_eq!(
            dialect
                .convert_exception(&SqlError::new(-244, "could not do a physical-order read"), "select", None)
                .unwrap()
                .kind,
            JdbcErrorKind::LockTimeout
        );
        assert!(dialect.convert_exception(&SqlError::new(-206, "no table"), "x", None).is_none());
    }
}
