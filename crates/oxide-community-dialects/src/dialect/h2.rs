//! H2 dialect for versions before 2.1.

use oxide_dialect_core::ast::{Size, SqlTypeCode};
use oxide_dialect_core::dialect::{
    common, default_column_type, DatabaseVersion, DatetimeFormatReplacer, Dialect,
    FunctionRegistry, IntervalType, TemporalType, TemporalUnit,
};
use oxide_dialect_core::exception::{ConstraintKind, JdbcError, JdbcErrorKind, SqlError};
use oxide_dialect_core::identity::{IdentityColumnSupport, StandardIdentityColumnSupport};
use oxide_dialect_core::pagination::{LimitHandler, LimitOffsetLimitHandler, OffsetFetchLimitHandler};
use oxide_dialect_core::sequence::{SequenceSupport, StandardSequenceSupport};
use oxide_dialect_core::Result;

use super::{classified, oracle_datetime_format};

/// H2 dialect.
#[derive(Debug, Clone, Copy)]
pub struct H2Dialect {
    version: DatabaseVersion,
}

impl H2Dialect {
    /// Oldest supported version.
    pub const MINIMUM_VERSION: DatabaseVersion = DatabaseVersion::new(1, 4, 0);

    /// Creates a dialect for an H2 version.
    #[must_use]
    pub const fn new(version: DatabaseVersion) -> Self {
        Self { version }
    }

    // 1.4.200 reworked sequences, current_timestamp and drop cascading.
    const fn is_modern(&self) -> bool {
        self.version.is_same_or_after_micro(1, 4, 200)
    }
}

impl Default for H2Dialect {
    fn default() -> Self {
        Self::new(Self::MINIMUM_VERSION)
    }
}

impl Dialect for H2Dialect {
    fn name(&self) -> &'static str {
        "h2"
    }

    fn version(&self) -> DatabaseVersion {
        self.version
    }

    fn minimum_version(&self) -> DatabaseVersion {
        Self::MINIMUM_VERSION
    }

    fn column_type(&self, code: SqlTypeCode) -> String {
        match code {
            SqlTypeCode::Numeric if self.version.is_before(2, 0) => "decimal($p,$s)",
            SqlTypeCode::TimeWithTimezone if self.version.is_before(2, 0) => {
                "timestamp($p) with time zone"
            }
            SqlTypeCode::Nchar => "char($l)",
            SqlTypeCode::Nvarchar | SqlTypeCode::Long32nvarchar => "varchar($l)",
            SqlTypeCode::Uuid => "uuid",
            other => default_column_type(other),
        }
        .to_string()
    }

    fn cast_type(&self, code: SqlTypeCode) -> String {
        match code {
            SqlTypeCode::Char | SqlTypeCode::Nchar => "char".into(),
            SqlTypeCode::Varchar
            | SqlTypeCode::Nvarchar
            | SqlTypeCode::Long32varchar
            | SqlTypeCode::Long32nvarchar => "varchar".into(),
            SqlTypeCode::Binary | SqlTypeCode::Varbinary | SqlTypeCode::Long32varbinary => {
                "varbinary".into()
            }
            other => self.type_name(other, Size::default()),
        }
    }

    fn default_batch_size(&self) -> u32 {
        15
    }

    fn datetime_format_pattern(&self, format: &str) -> Result<String> {
        if self.is_modern() {
            return Ok(oracle_datetime_format(format));
        }
        let replacer = DatetimeFormatReplacer::new(
            "''",
            &[("e", "u"), ("xxx", "XXX"), ("xx", "XX"), ("x", "X")],
        );
        Ok(replacer.replace(format))
    }

    fn format_function_pattern(&self) -> Option<&'static str> {
        Some(if self.is_modern() {
            "to_char(?1,?2)"
        } else {
            "formatdatetime(?1,?2)"
        })
    }

    fn extract_pattern(&self, unit: TemporalUnit) -> Result<String> {
        Ok(match unit {
            TemporalUnit::Second => {
                "(extract(second from ?2)+extract(nanosecond from ?2)/1e9)".into()
            }
            _ => "extract(?1 from ?2)".into(),
        })
    }

    fn translate_extract_field(&self, unit: TemporalUnit) -> String {
        match unit {
            TemporalUnit::DayOfMonth => "day".into(),
            TemporalUnit::DayOfYear => "doy".into(),
            TemporalUnit::DayOfWeek => "dow".into(),
            TemporalUnit::Week => "iso_week".into(),
            other => other.as_str().into(),
        }
    }

    fn timestampadd_pattern(
        &self,
        unit: TemporalUnit,
        temporal_type: TemporalType,
        interval: Option<IntervalType>,
    ) -> Result<String> {
        let _ = (unit, temporal_type);
        Ok(if interval == Some(IntervalType::Second) {
            "(?2+?3)".into()
        } else {
            "dateadd(?1,?2,?3)".into()
        })
    }

    fn timestampdiff_pattern(
        &self,
        unit: TemporalUnit,
        from_type: TemporalType,
        to_type: TemporalType,
    ) -> Result<String> {
        let _ = (unit, from_type, to_type);
        Ok("datediff(?1,?2,?3)".into())
    }

    fn current_time(&self) -> &'static str {
        if self.is_modern() {
            "localtime"
        } else {
            "current_time"
        }
    }

    fn current_timestamp(&self) -> &'static str {
        if self.is_modern() {
            "localtimestamp"
        } else {
            "current_timestamp"
        }
    }

    fn current_timestamp_select_string(&self) -> String {
        "call current_timestamp()".into()
    }

    fn limit_handler(&self) -> &'static dyn LimitHandler {
        if self.version.is_same_or_after_micro(1, 4, 195) {
            &OffsetFetchLimitHandler::INSTANCE
        } else {
            &LimitOffsetLimitHandler::OFFSET_ONLY_INSTANCE
        }
    }

    fn supports_offset_fetch_clause(&self) -> bool {
        self.version.is_same_or_after_micro(1, 4, 198)
    }

    fn sequence_support(&self) -> &'static dyn SequenceSupport {
        if self.is_modern() {
            &StandardSequenceSupport::H2_V2
        } else {
            &StandardSequenceSupport::H2_V1
        }
    }

    fn identity_column_support(&self) -> &'static dyn IdentityColumnSupport {
        &StandardIdentityColumnSupport::H2
    }

    fn query_sequences_string(&self) -> Option<&'static str> {
        self.version
            .is_same_or_after_micro(1, 4, 32)
            .then_some("select * from INFORMATION_SCHEMA.SEQUENCES")
    }

    fn supports_no_wait(&self) -> bool {
        self.version.is_same_or_after(2, 0)
    }

    fn supports_skip_locked(&self) -> bool {
        self.version.is_same_or_after(2, 0)
    }

    fn cascade_constraints_string(&self) -> &'static str {
        if self.is_modern() {
            " cascade"
        } else {
            ""
        }
    }

    fn supports_if_exists_before_table_name(&self) -> bool {
        self.is_modern()
    }

    fn supports_if_exists_after_table_name(&self) -> bool {
        !self.is_modern()
    }

    fn supports_comment_on(&self) -> bool {
        true
    }

    fn temporary_table_create_command(&self) -> &'static str {
        "create cached local temporary table if not exists"
    }

    fn temporary_table_create_options(&self) -> Option<&'static str> {
        Some("on commit drop transactional")
    }

    fn supports_window_functions(&self) -> bool {
        self.is_modern()
    }

    fn supports_lateral(&self) -> bool {
        self.version.is_same_or_after_micro(1, 4, 200)
    }

    fn supports_distinct_from_predicate(&self) -> bool {
        true
    }

    fn supports_merge(&self) -> bool {
        true
    }

    fn supports_case_insensitive_like(&self) -> bool {
        self.version.is_same_or_after_micro(1, 4, 194)
    }

    fn supports_recursive_cte(&self) -> bool {
        self.version.is_same_or_after_micro(1, 4, 196)
    }

    fn initialize_function_registry(&self, registry: &mut FunctionRegistry) {
        common::mod_operator(registry);
        common::bit_length_from_octet_length(registry);
        common::locate_position(registry);
        common::truncate_trunc(registry);
        registry.register_alias("substring", "substr");
        registry.register_no_args("now", "localtimestamp");
        registry.register_no_args("curdate", "current_date");
        registry.register_no_args("curtime", "localtime");
    }

    fn convert_exception(
        &self,
        error: &SqlError,
        message: &str,
        sql: Option<&str>,
    ) -> Option<JdbcError> {
        let kind = match error.error_code {
            23505 => JdbcErrorKind::constraint(
                ConstraintKind::Unique,
                self.extract_constraint_name(error),
            ),
            40001 => JdbcErrorKind::LockAcquisition,
            50200 => JdbcErrorKind::PessimisticLock,
            90006 => JdbcErrorKind::constraint(
                ConstraintKind::NotNull,
                self.extract_constraint_name(error),
            ),
            57014 => JdbcErrorKind::QueryTimeout,
            _ => return None,
        };
        classified(self.name(), kind, error, message, sql)
    }

    fn extract_constraint_name(&self, error: &SqlError) -> Option<String> {
        let state = error.sql_state()?;
        if !state.starts_with("23") {
            return None;
        }
        let (_, name) = error.message.split_once("violation: ")?;
        if state == "23506" {
            let name = name.get(1..)?;
            return name.split_once(':').map(|(name, _)| name.to_string());
        }
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_dependent_strategies() {
        let old = H2Dialect::new(DatabaseVersion::new(1, 4, 190));
        let new = H2Dialect::new(DatabaseVersion::new(1, 4, 200));
        assert_eq!(old.limit_handler().name(), "limit-offset");
        assert_eq!(new.limit_handler().name(), "offset-fetch");
        assert_eq!(old.current_timestamp(), "current_timestamp");
        assert_eq!(new.current_timestamp(), "localtimestamp");
        assert_eq!(
            old.sequence_support().select_sequence_next_val_string("s").unwrap(),
            "nextval('s')"
        );
        assert_eq!(
            new.sequence_support().select_sequence_next_val_string("s").unwrap(),
            "next value for s"
        );
        assert!(new.supports_if_exists_before_table_name());
        assert!(old.supports_if_exists_after_table_name());
    }

    #[test]
    fn test_column_types() {
        let dialect = H2Dialect::new(DatabaseVersion::new(1, 4, 200));
        assert_eq!(dialect.column_type(SqlTypeCode::Numeric), "decimal($p,$s)");
        assert_eq!(dialect.column_type(SqlTypeCode::Nvarchar), "varchar($l)");
        assert_eq!(dialect.cast_type(SqlTypeCode::Nvarchar), "varchar");
        let v2 = H2Dialect::new(DatabaseVersion::new(2, 0, 202));
        assert_eq!(v2.column_type(SqlTypeCode::Numeric), "numeric($p,$s)");
    }

    #[test]
    fn test_temporal_patterns() {
        let dialect = H2Dialect::default();
        assert_eq!(
            dialect.extract_pattern(TemporalUnit::Second).unwrap(),
            "(extract(second from ?2)+extract(nanosecond from ?2)/1e9)"
        );
        assert_eq!(
            dialect
                .timestampadd_pattern(TemporalUnit::Day, TemporalType::Timestamp, None)
                .unwrap(),
            "dateadd(?1,?2,?3)"
        );
        assert_eq!(
            dialect
                .timestampadd_pattern(
                    TemporalUnit::Second,
                    TemporalType::Timestamp,
                    Some(IntervalType::Second)
                )
                .unwrap(),
            "(?2+?3)"
        );
        assert_eq!(dialect.translate_extract_field(TemporalUnit::Week), "iso_week");
    }

    #[test]
    fn test_datetime_format() {
        let old = H2Dialect::default();
        assert_eq!(old.datetime_format_pattern("yyyy-MM-dd'T'HH:mm xxx").unwrap(), "yyyy-MM-dd''T''HH:mm XXX");
        let new = H2Dialect::new(DatabaseVersion::new(2, 0, 202));
        assert_eq!(new.datetime_format_pattern("yyyy-MM-dd").unwrap(), "YYYY-MM-DD");
    }

    #[test]
    fn test_convert_exception() {
        let dialect = H2Dialect::default();
        let error = SqlError::new(23505, "Unique index or primary key violation: UK_EMAIL")
            .with_sql_state("23505");
        let converted = dialect.convert_exception(&error, "insert", None).unwrap();
        assert_eq!(
            converted.kind,
            JdbcErrorKind::constraint(ConstraintKind::Unique, Some("UK_EMAIL".into()))
        );
        let timeout = SqlError::new(57014, "Statement was canceled");
        assert_eq!(
            dialect.convert_exception(&timeout, "select", None).unwrap().kind,
            JdbcErrorKind::QueryTimeout
        );
        assert!(dialect.convert_exception(&SqlError::new(42000, "syntax"), "x", None).is_none());
    }
}
