//! Apache Derby dialect.
//!
//! Derby has no `extract()`, so fields come from its scalar functions and
//! the JDBC escape `{fn timestampdiff(...)}`. Offset and fetch arrived in
//! 10.5, sequences in 10.6 and a real boolean type in 10.7.

use oxide_dialect_core::ast::SqlTypeCode;
use oxide_dialect_core::dialect::{
    common, default_column_type, DatabaseVersion, Dialect, FunctionRegistry, IntervalType,
    LockTimeout, RowLockStrategy, TemporalType, TemporalUnit,
};
use oxide_dialect_core::exception::{
    extract_using_template, ConstraintKind, JdbcError, JdbcErrorKind, SqlError,
};
use oxide_dialect_core::identity::{IdentityColumnSupport, StandardIdentityColumnSupport};
use oxide_dialect_core::pagination::{DerbyLimitHandler, LimitHandler, NoopLimitHandler};
use oxide_dialect_core::sequence::{NoSequenceSupport, SequenceSupport, StandardSequenceSupport};
use oxide_dialect_core::{DialectError, Result};

use super::{classified, db2_select_null_string};

/// Derby dialect.
#[derive(Debug, Clone, Copy)]
pub struct DerbyDialect {
    version: DatabaseVersion,
}

impl DerbyDialect {
    /// Oldest supported version.
    pub const MINIMUM_VERSION: DatabaseVersion = DatabaseVersion::make(10, 0);

    /// Creates a dialect for a Derby version.
    #[must_use]
    pub const fn new(version: DatabaseVersion) -> Self {
        Self { version }
    }

    const fn has_boolean(&self) -> bool {
        self.version.is_same_or_after(10, 7)
    }
}

impl Default for DerbyDialect {
    fn default() -> Self {
        Self::new(Self::MINIMUM_VERSION)
    }
}

impl Dialect for DerbyDialect {
    fn name(&self) -> &'static str {
        "derby"
    }

    fn version(&self) -> DatabaseVersion {
        self.version
    }

    fn minimum_version(&self) -> DatabaseVersion {
        Self::MINIMUM_VERSION
    }

    fn column_type(&self, code: SqlTypeCode) -> String {
        match code {
            SqlTypeCode::Boolean if !self.has_boolean() => "smallint",
            SqlTypeCode::Tinyint => "smallint",
            SqlTypeCode::Numeric | SqlTypeCode::Decimal => "decimal($p,$s)",
            SqlTypeCode::Binary => "char($l) for bit data",
            SqlTypeCode::Varbinary | SqlTypeCode::Long32varbinary => "varchar($l) for bit data",
            SqlTypeCode::Nchar => "char($l)",
            SqlTypeCode::Nvarchar | SqlTypeCode::Long32nvarchar => "varchar($l)",
            SqlTypeCode::Clob | SqlTypeCode::Nclob => "clob",
            SqlTypeCode::Time | SqlTypeCode::TimeWithTimezone => "time",
            SqlTypeCode::Timestamp | SqlTypeCode::TimestampWithTimezone => "timestamp",
            SqlTypeCode::Uuid => "char(16) for bit data",
            SqlTypeCode::Json => "clob",
            other => default_column_type(other),
        }
        .to_string()
    }

    fn max_varchar_length(&self) -> u32 {
        32_672
    }

    fn default_decimal_precision(&self) -> u32 {
        31
    }

    fn default_timestamp_precision(&self) -> u32 {
        9
    }

    fn float_precision(&self) -> u32 {
        23
    }

    fn double_precision(&self) -> u32 {
        52
    }

    fn default_batch_size(&self) -> u32 {
        15
    }

    fn select_clause_null_string(&self, code: SqlTypeCode) -> String {
        db2_select_null_string(code)
    }

    fn to_boolean_value_string(&self, value: bool) -> &'static str {
        match (self.has_boolean(), value) {
            (false, true) => "1",
            (false, false) => "0",
            (true, true) => "true",
            (true, false) => "false",
        }
    }

    fn datetime_format_pattern(&self, format: &str) -> Result<String> {
        let _ = format;
        Err(DialectError::unsupported(self.name(), "format()"))
    }

    fn extract_pattern(&self, unit: TemporalUnit) -> Result<String> {
        Ok(match unit {
            TemporalUnit::DayOfMonth => "day(?2)",
            TemporalUnit::DayOfYear => {
                "({fn timestampdiff(sql_tsi_day,date(char(year(?2),4)||'-01-01'),?2)}+1)"
            }
            TemporalUnit::DayOfWeek => {
                "(mod(mod({fn timestampdiff(sql_tsi_day,{d '1970-01-01'},?2)}+4,7)+7,7)+1)"
            }
            TemporalUnit::Week => {
                "(({fn timestampdiff(sql_tsi_day,date(char(year(?2),4)||'-01-01'),{fn timestampadd(sql_tsi_day,{fn timestampdiff(sql_tsi_day,{d '1753-01-01'},?2)}/7*7,{d '1753-01-04'})})}+7)/7)"
            }
            TemporalUnit::Quarter => "((month(?2)+2)/3)",
            TemporalUnit::Epoch => {
                "{fn timestampdiff(sql_tsi_second,{ts '1970-01-01 00:00:00'},?2)}"
            }
            _ => "?1(?2)",
        }
        .into())
    }

    fn timestampadd_pattern(
        &self,
        unit: TemporalUnit,
        temporal_type: TemporalType,
        interval: Option<IntervalType>,
    ) -> Result<String> {
        let _ = (temporal_type, interval);
        Ok(match unit {
            TemporalUnit::Nanosecond | TemporalUnit::Native => {
                "{fn timestampadd(sql_tsi_frac_second,mod(bigint(?2),1000000000),{fn timestampadd(sql_tsi_second,bigint((?2)/1000000000),?3)})}"
            }
            _ => "{fn timestampadd(sql_tsi_?1,bigint(?2),?3)}",
        }
        .into())
    }

    fn timestampdiff_pattern(
        &self,
        unit: TemporalUnit,
        from_type: TemporalType,
        to_type: TemporalType,
    ) -> Result<String> {
        let _ = (from_type, to_type);
        Ok(match unit {
            TemporalUnit::Nanosecond | TemporalUnit::Native => {
                "{fn timestampdiff(sql_tsi_frac_second,?2,?3)}"
            }
            _ => "{fn timestampdiff(sql_tsi_?1,?2,?3)}",
        }
        .into())
    }

    fn current_timestamp_select_string(&self) -> String {
        "values current timestamp".into()
    }

    fn limit_handler(&self) -> &'static dyn LimitHandler {
        if self.version.is_before(10, 5) {
            &NoopLimitHandler::INSTANCE
        } else if self.version.is_before(10, 6) {
            &DerbyLimitHandler::INLINE_INSTANCE
        } else {
            &DerbyLimitHandler::INSTANCE
        }
    }

    fn supports_offset_fetch_clause(&self) -> bool {
        self.version.is_same_or_after(10, 5)
    }

    fn sequence_support(&self) -> &'static dyn SequenceSupport {
        if self.version.is_before(10, 6) {
            &NoSequenceSupport::INSTANCE
        } else {
            &StandardSequenceSupport::DERBY
        }
    }

    fn identity_column_support(&self) -> &'static dyn IdentityColumnSupport {
        &StandardIdentityColumnSupport::DB2
    }

    fn query_sequences_string(&self) -> Option<&'static str> {
        self.version.is_same_or_after(10, 6).then_some(
            "select sys.sysschemas.schemaname as sequence_schema,sys.syssequences.* from sys.syssequences left join sys.sysschemas on sys.syssequences.schemaid=sys.sysschemas.schemaid",
        )
    }

    fn for_update_string(&self) -> String {
        " for update with rs".into()
    }

    fn read_lock_string(&self, timeout: LockTimeout) -> String {
        let _ = timeout;
        " for read only with rs".into()
    }

    fn write_lock_string(&self, timeout: LockTimeout) -> String {
        let _ = timeout;
        self.for_update_string()
    }

    fn row_lock_strategy(&self) -> RowLockStrategy {
        RowLockStrategy::None
    }

    fn supports_lock_timeouts(&self) -> bool {
        false
    }

    fn supports_outer_join_for_update(&self) -> bool {
        false
    }

    fn drop_schema_command(&self, name: &str) -> Vec<String> {
        vec![format!("drop schema {name} restrict")]
    }

    fn temporary_table_create_command(&self) -> &'static str {
        "declare global temporary table"
    }

    fn temporary_table_create_options(&self) -> Option<&'static str> {
        Some("not logged")
    }

    fn supports_window_functions(&self) -> bool {
        self.version.is_same_or_after(10, 4)
    }

    fn supports_merge(&self) -> bool {
        self.version.is_same_or_after(10, 11)
    }

    fn supports_exists_in_select(&self) -> bool {
        false
    }

    fn from_dual_for_select_only(&self) -> &'static str {
        " from (values 0) dual"
    }

    fn dual(&self) -> &'static str {
        "(values 0)"
    }

    fn cast_pattern(&self, from: Option<SqlTypeCode>, to: SqlTypeCode) -> String {
        let pattern = match (from, to) {
            (_, SqlTypeCode::Real | SqlTypeCode::Float) => "cast(double(?1) as real)",
            (_, SqlTypeCode::Double) => "double(?1)",
            (Some(from), SqlTypeCode::Varchar | SqlTypeCode::Char) => match from {
                SqlTypeCode::Real | SqlTypeCode::Float | SqlTypeCode::Double => {
                    return format!(
                        "cast(trim(cast(cast(?1 as decimal({},2)) as char(254))) as ?2)",
                        self.default_decimal_precision()
                    );
                }
                SqlTypeCode::Tinyint
                | SqlTypeCode::Smallint
                | SqlTypeCode::Integer
                | SqlTypeCode::Bigint
                | SqlTypeCode::Numeric
                | SqlTypeCode::Decimal => "cast(trim(cast(?1 as char(254))) as ?2)",
                SqlTypeCode::Date => "cast(?1 as varchar(10))",
                SqlTypeCode::Time => "cast(?1 as varchar(8))",
                SqlTypeCode::Timestamp => "cast(?1 as varchar(30))",
                _ => "cast(?1 as ?2)",
            },
            _ => "cast(?1 as ?2)",
        };
        pattern.into()
    }

    fn initialize_function_registry(&self, registry: &mut FunctionRegistry) {
        common::least_greatest_case(registry);
        common::bit_length_from_length(registry);
        common::log_from_ln(registry);
        registry.register_alias("substring", "substr");
        registry.register_alias("character_length", "length");
        registry.register_pattern("octet_length", "length(?1)");
        registry.register_pattern("power", "exp(ln(?1)*?2)");
        registry.register_pattern("left", "substr(?1,1,?2)");
        registry.register_pattern("right", "substr(?1,length(?1)-(?2)+1)");
        registry.register_pattern("locate", "locate(?1,?2)");
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
        let kind = match error.sql_state()? {
            "23505" => JdbcErrorKind::constraint(
                ConstraintKind::Unique,
                self.extract_constraint_name(error),
            ),
            "23503" => JdbcErrorKind::constraint(
                ConstraintKind::ForeignKey,
                self.extract_constraint_name(error),
            ),
            "23502" => JdbcErrorKind::constraint(ConstraintKind::NotNull, None),
            "40XL1" | "40XL2" => JdbcErrorKind::LockTimeout,
            "40001" => JdbcErrorKind::LockAcquisition,
            "XCL52" => JdbcErrorKind::QueryTimeout,
            _ => return None,
        };
        classified(self.name(), kind, error, message, sql)
    }

    fn extract_constraint_name(&self, error: &SqlError) -> Option<String> {
        match error.sql_state()? {
            "23505" | "23503" => extract_using_template("'", "'", &error.message),
            _ => None,
        }
    }
}
