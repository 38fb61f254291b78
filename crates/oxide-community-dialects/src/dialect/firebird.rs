//! Firebird dialect, 2.5 and later.

use oxide_dialect_core::ast::SqlTypeCode;
use oxide_dialect_core::dialect::{
    default_column_type, unsupported_unit, DatabaseVersion, Dialect, FunctionRegistry,
    IntervalType, TemporalType, TemporalUnit,
};
use oxide_dialect_core::exception::{
    extract_using_regex, ConstraintKind, JdbcError, JdbcErrorKind, SqlError,
};
use oxide_dialect_core::identity::{IdentityColumnSupport, StandardIdentityColumnSupport};
use oxide_dialect_core::pagination::{FirstSkipLimitHandler, LimitHandler, OffsetFetchLimitHandler};
use oxide_dialect_core::sequence::{SequenceSupport, StandardSequenceSupport};
use oxide_dialect_core::translate::{PaginationStyle, SqlAstTranslator, StandardSqlAstTranslator};
use oxide_dialect_core::{DialectError, Result};

use super::{classified, PagingTranslator};

const CONSTRAINT_CODES: [i32; 5] = [335_544_466, 336_396_758, 335_544_558, 336_396_991, 335_544_665];

/// Firebird dialect.
#[derive(Debug, Clone, Copy)]
pub struct FirebirdDialect {
    version: DatabaseVersion,
}

impl FirebirdDialect {
    /// Oldest supported version.
    pub const MINIMUM_VERSION: DatabaseVersion = DatabaseVersion::make(2, 5);

    /// Creates a dialect for a Firebird version.
    #[must_use]
    pub const fn new(version: DatabaseVersion) -> Self {
        Self { version }
    }

    const fn before(&self, major: u16) -> bool {
        self.version.is_before(major, 0)
    }
}

impl Default for FirebirdDialect {
    fn default() -> Self {
        Self::new(Self::MINIMUM_VERSION)
    }
}

impl Dialect for FirebirdDialect {
    fn name(&self) -> &'static str {
        "firebird"
    }

    fn version(&self) -> DatabaseVersion {
        self.version
    }

    fn minimum_version(&self) -> DatabaseVersion {
        Self::MINIMUM_VERSION
    }

    fn column_type(&self, code: SqlTypeCode) -> String {
        let legacy = self.before(4);
        match code {
            SqlTypeCode::Boolean if self.before(3) => "smallint",
            SqlTypeCode::Tinyint => "smallint",
            SqlTypeCode::Timestamp => "timestamp",
            SqlTypeCode::TimeWithTimezone if legacy => "time",
            SqlTypeCode::TimeWithTimezone => "time with time zone",
            SqlTypeCode::TimestampWithTimezone if legacy => "timestamp",
            SqlTypeCode::TimestampWithTimezone => "timestamp with time zone",
            SqlTypeCode::Binary if legacy => "char($l) character set octets",
            SqlTypeCode::Varbinary | SqlTypeCode::Long32varbinary if legacy => {
                "varchar($l) character set octets"
            }
            SqlTypeCode::Blob => "blob sub_type binary",
            SqlTypeCode::Clob | SqlTypeCode::Nclob => "blob sub_type text",
            SqlTypeCode::Uuid => "char(16) character set octets",
            other => default_column_type(other),
        }
        .to_string()
    }

    fn max_varchar_length(&self) -> u32 {
        8_191
    }

    fn max_varbinary_length(&self) -> u32 {
        32_765
    }

    fn default_decimal_precision(&self) -> u32 {
        if self.before(4) {
            18
        } else {
            38
        }
    }

    fn default_timestamp_precision(&self) -> u32 {
        3
    }

    fn float_precision(&self) -> u32 {
        if self.before(4) {
            21
        } else {
            24
        }
    }

    fn max_identifier_length(&self) -> u32 {
        if self.before(4) {
            31
        } else {
            63
        }
    }

    fn default_batch_size(&self) -> u32 {
        0
    }

    fn in_expression_count_limit(&self) -> Option<u32> {
        Some(1_500)
    }

    fn to_boolean_value_string(&self, value: bool) -> &'static str {
        match (self.before(3), value) {
            (true, true) => "1",
            (true, false) => "0",
            (false, true) => "true",
            (false, false) => "false",
        }
    }

    fn datetime_format_pattern(&self, format: &str) -> Result<String> {
        let _ = format;
        Err(DialectError::unsupported(self.name(), "format()"))
    }

    fn extract_pattern(&self, unit: TemporalUnit) -> Result<String> {
        Ok(match unit {
            TemporalUnit::DayOfWeek | TemporalUnit::DayOfYear => "(extract(?1 from ?2)+1)".into(),
            TemporalUnit::Quarter => "((extract(month from ?2)+2)/3)".into(),
            TemporalUnit::Epoch => "datediff(second from timestamp '1970-01-01 00:00:00' to ?2)".into(),
            _ => "extract(?1 from ?2)".into(),
        })
    }

    fn translate_extract_field(&self, unit: TemporalUnit) -> String {
        match unit {
            TemporalUnit::DayOfMonth => "day".into(),
            TemporalUnit::DayOfYear => "yearday".into(),
            TemporalUnit::DayOfWeek => "weekday".into(),
            other => other.as_str().into(),
        }
    }

    fn translate_duration_field(&self, unit: TemporalUnit) -> String {
        match unit {
            TemporalUnit::Native | TemporalUnit::Nanosecond => "millisecond".into(),
            other => other.as_str().into(),
        }
    }

    fn timestampadd_pattern(
        &self,
        unit: TemporalUnit,
        temporal_type: TemporalType,
        interval: Option<IntervalType>,
    ) -> Result<String> {
        let _ = (temporal_type, interval);
        Ok(match unit {
            TemporalUnit::Native => "dateadd((?2) millisecond to ?3)",
            TemporalUnit::Nanosecond => "dateadd((?2)/1e6 millisecond to ?3)",
            TemporalUnit::Week => "dateadd((?2)*7 day to ?3)",
            TemporalUnit::Quarter => "dateadd((?2)*3 month to ?3)",
            TemporalUnit::DayOfWeek
            | TemporalUnit::DayOfMonth
            | TemporalUnit::DayOfYear
            | TemporalUnit::Epoch => {
                return Err(unsupported_unit(self.name(), "timestampadd", unit));
            }
            _ => "dateadd(?2 ?1 to ?3)",
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
            TemporalUnit::Native => "datediff(millisecond from ?2 to ?3)",
            TemporalUnit::Nanosecond => "datediff(millisecond from ?2 to ?3)*1e6",
            TemporalUnit::Week => "datediff(day from ?2 to ?3)/7",
            TemporalUnit::Quarter => "datediff(month from ?2 to ?3)/3",
            TemporalUnit::DayOfWeek
            | TemporalUnit::DayOfMonth
            | TemporalUnit::DayOfYear
            | TemporalUnit::Epoch => {
                return Err(unsupported_unit(self.name(), "timestampdiff", unit));
            }
            _ => "datediff(?1 from ?2 to ?3)",
        }
        .into())
    }

    fn current_time(&self) -> &'static str {
        if self.before(4) {
            "current_time"
        } else {
            "localtime"
        }
    }

    fn current_timestamp(&self) -> &'static str {
        if self.before(4) {
            "current_timestamp"
        } else {
            "localtimestamp"
        }
    }

    fn current_timestamp_select_string(&self) -> String {
        "select current_timestamp from rdb$database".into()
    }

    fn fractional_second_precision_in_nanos(&self) -> u64 {
        1_000_000
    }

    fn limit_handler(&self) -> &'static dyn LimitHandler {
        if self.before(3) {
            &FirstSkipLimitHandler::INSTANCE
        } else {
            &OffsetFetchLimitHandler::INSTANCE
        }
    }

    fn supports_offset_fetch_clause(&self) -> bool {
        !self.before(3)
    }

    fn sequence_support(&self) -> &'static dyn SequenceSupport {
        if !self.before(4) {
            &StandardSequenceSupport::FIREBIRD
        } else if self.version.major == 3 {
            &StandardSequenceSupport::FIREBIRD_3
        } else {
            &StandardSequenceSupport::INTERBASE
        }
    }

    fn identity_column_support(&self) -> &'static dyn IdentityColumnSupport {
        if self.before(3) {
            &StandardIdentityColumnSupport::NONE
        } else {
            &StandardIdentityColumnSupport::GENERATED
        }
    }

    fn query_sequences_string(&self) -> Option<&'static str> {
        Some(if self.before(3) {
            "select rdb$generator_name from rdb$generators"
        } else {
            "select rdb$generator_name,rdb$initial_value,rdb$generator_increment from rdb$generators where coalesce(rdb$system_flag,0)=0"
        })
    }

    fn for_update_string(&self) -> String {
        " with lock".into()
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

    fn create_schema_command(&self, name: &str) -> Vec<String> {
        let _ = name;
        Vec::new()
    }

    fn drop_schema_command(&self, name: &str) -> Vec<String> {
        let _ = name;
        Vec::new()
    }

    fn temporary_table_create_command(&self) -> &'static str {
        "create global temporary table"
    }

    fn temporary_table_create_options(&self) -> Option<&'static str> {
        Some("on commit delete rows")
    }

    fn no_columns_insert_string(&self) -> &'static str {
        "default values"
    }

    fn supports_comment_on(&self) -> bool {
        self.version.is_same_or_after(2, 0)
    }

    fn supports_window_functions(&self) -> bool {
        !self.before(3)
    }

    fn supports_lateral(&self) -> bool {
        !self.before(4)
    }

    fn supports_distinct_from_predicate(&self) -> bool {
        true
    }

    fn supports_values_list(&self) -> bool {
        false
    }

    fn supports_values_list_for_insert(&self) -> bool {
        false
    }

    fn supports_null_precedence(&self) -> bool {
        self.version.is_same_or_after(1, 5)
    }

    fn supports_intersect(&self) -> bool {
        false
    }

    fn supports_except(&self) -> bool {
        false
    }

    fn supports_predicate_as_expression(&self) -> bool {
        !self.before(3)
    }

    fn supports_exists_in_select(&self) -> bool {
        !self.before(3)
    }

    fn from_dual_for_select_only(&self) -> &'static str {
        " from rdb$database"
    }

    fn dual(&self) -> &'static str {
        "rdb$database"
    }

    fn initialize_function_registry(&self, registry: &mut FunctionRegistry) {
        registry.register_pattern("radians", "((?1)*pi()/180e0)");
        registry.register_pattern("degrees", "((?1)*180e0/pi())");
        registry.register_alias("ascii", "ascii_val");
        registry.register_alias("chr", "ascii_char");
        registry.register_alias("char", "ascii_char");
        registry.register_pattern("locate", "position(?1,?2)");
    }

    fn convert_exception(
        &self,
        error: &SqlError,
        message: &str,
        sql: Option<&str>,
    ) -> Option<JdbcError> {
        let kind = match error.error_code {
            335_544_336 if error.message.contains("update conflicts with concurrent update") => {
                JdbcErrorKind::LockTimeout
            }
            335_544_336 | 335_544_474 | 335_544_475 | 335_544_476 => JdbcErrorKind::LockAcquisition,
            335_544_345 | 335_544_510 => JdbcErrorKind::LockTimeout,
            code if CONSTRAINT_CODES.contains(&code) || is_violation_message(&error.message) => {
                JdbcErrorKind::constraint(
                    ConstraintKind::Other,
                    self.extract_constraint_name(error),
                )
            }
            _ => return None,
        };
        classified(self.name(), kind, error, message, sql)
    }

    fn extract_constraint_name(&self, error: &SqlError) -> Option<String> {
        extract_using_regex(r#"violation of .+? constraint "([^"]+)""#, &error.message).or_else(
            || {
                extract_using_regex(
                    r"Operation violates CHECK constraint (.+?) on view or table",
                    &error.message,
                )
            },
        )
    }

    fn build_translator(&self) -> Box<dyn SqlAstTranslator<'_> + '_> {
        if self.before(3) {
            Box::new(PagingTranslator::new(self, PaginationStyle::FirstSkip))
        } else {
            Box::new(StandardSqlAstTranslator::new(self))
        }
    }
}

fn is_violation_message(message: &str) -> bool {
    message.contains("violation of ") || message.contains("violates CHECK constraint")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fb(major: u16) -> FirebirdDialect {
        FirebirdDialect::new(DatabaseVersion::make(major, 0))
    }

    #[test]
    fn test_version_dependent_types() {
        assert_eq!(fb(2).column_type(SqlTypeCode::Boolean), "smallint");
        assert_eq!(fb(3).column_type(SqlTypeCode::Boolean), "boolean");
        assert_eq!(fb(3).column_type(SqlTypeCode::Varbinary), "varchar($l) character set octets");
        assert_eq!(fb(4).column_type(SqlTypeCode::Varbinary), "varbinary($l)");
        assert_eq!(fb(4).column_type(SqlTypeCode::TimestampWithTimezone), "timestamp with time zone");
        assert_eq!(fb(3).default_decimal_precision(), 18);
        assert_eq!(fb(4).max_identifier_length(), 63);
    }

    #[test]
    fn test_booleans() {
        assert_eq!(fb(2).to_boolean_value_string(true), "1");
        assert_eq!(fb(3).to_boolean_value_string(false), "false");
    }

    #[test]
    fn test_temporal_patterns() {
        let dialect = fb(3);
        assert_eq!(
            dialect
                .timestampadd_pattern(TemporalUnit::Week, TemporalType::Timestamp, None)
                .unwrap(),
            "dateadd((?2)*7 day to ?3)"
        );
        assert_eq!(
            dialect
                .timestampdiff_pattern(TemporalUnit::Quarter, TemporalType::Date, TemporalType::Date)
                .unwrap(),
            "datediff(month from ?2 to ?3)/3"
        );
        assert_eq!(
            dialect.extract_pattern(TemporalUnit::DayOfWeek).unwrap(),
            "(extract(?1 from ?2)+1)"
        );
        assert_eq!(dialect.translate_extract_field(TemporalUnit::DayOfWeek), "weekday");
        assert!(dialect.datetime_format_pattern("yyyy").is_err());
    }

    #[test]
    fn test_strategies_by_version() {
        assert_eq!(fb(2).limit_handler().name(), "first-skip");
        assert_eq!(fb(3).limit_handler().name(), "offset-fetch");
        assert_eq!(
            fb(2).sequence_support().select_sequence_next_val_string("s").unwrap(),
            "gen_id(s,1)"
        );
        assert_eq!(
            fb(3).sequence_support().create_sequence_strings("s", 1, 50).unwrap(),
            vec!["create sequence s start with -49 increment by 50".to_string()]
        );
        assert!(!fb(2).identity_column_support().supports_identity_columns());
        assert!(fb(3).identity_column_support().supports_identity_columns());
    }

    #[test]
    fn test_lock_clause() {
        use oxide_dialect_core::dialect::{LockMode, LockOptions};
        assert_eq!(fb(3).lock_clause(&LockOptions::new(LockMode::PessimisticWrite)), " with lock");
    }

    #[test]
    fn test_convert_exception() {
        let dialect = fb(3);
        let deadlock = SqlError::new(335_544_336, "deadlock; update conflicts with concurrent update");
        assert_eq!(
            dialect.convert_exception(&deadlock, "update", None).unwrap().kind,
            JdbcErrorKind::LockTimeout
        );
        let deadlock = SqlError::new(335_544_336, "deadlock");
        assert_eq!(
            dialect.convert_exception(&deadlock, "update", None).unwrap().kind,
            JdbcErrorKind::LockAcquisition
        );
        let fk = SqlError::new(
            335_544_466,
            r#"violation of FOREIGN KEY constraint "FK_ORDER" on table "ORDERS""#,
        );
        assert_eq!(
            dialect.convert_exception(&fk, "insert", None).unwrap().kind,
            JdbcErrorKind::constraint(ConstraintKind::Other, Some("FK_ORDER".into()))
        );
        let check = SqlError::new(1, "Operation violates CHECK constraint CK_AGE on view or table T");
        assert_eq!(dialect.extract_constraint_name(&check).as_deref(), Some("CK_AGE"));
        assert!(dialect.convert_exception(&SqlError::new(1, "boom"), "x", None).is_none());
    }
}
