//! CockroachDB dialect for versions before 23.1.

use oxide_dialect_core::ast::{Size, SqlTypeCode};
use oxide_dialect_core::dialect::{
    common, default_column_type, DatabaseVersion, DatetimeFormatReplacer, Dialect,
    FunctionRegistry, IntervalType, LockTimeout, RowLockStrategy, TemporalType, TemporalUnit,
};
use oxide_dialect_core::exception::{JdbcError, SqlError};
use oxide_dialect_core::identity::{IdentityColumnSupport, StandardIdentityColumnSupport};
use oxide_dialect_core::pagination::{LimitHandler, OffsetFetchLimitHandler};
use oxide_dialect_core::sequence::{SequenceSupport, StandardSequenceSupport};
use oxide_dialect_core::{DialectError, Result};

use super::postgres;

/// `experimental_strftime` conversions: MySQL's, with the names of days,
/// months and ISO weeks spelled the strftime way.
const STRFTIME_FORMAT_RULES: [(&str, &str); 39] = [
    ("%", "%%"),
    ("yyyy", "%Y"),
    ("yyy", "%Y"),
    ("yy", "%y"),
    ("y", "%Y"),
    ("MMMM", "%B"),
    ("MMM", "%b"),
    ("MM", "%m"),
    ("M", "%m"),
    ("ww", "%V"),
    ("w", "%V"),
    ("YYYY", "%x"),
    ("YYY", "%x"),
    ("YY", "%x"),
    ("Y", "%x"),
    ("EEEE", "%A"),
    ("EEE", "%a"),
    ("ee", "%w"),
    ("e", "%w"),
    ("dd", "%d"),
    ("d", "%e"),
    ("DDD", "%j"),
    ("DD", "%j"),
    ("D", "%j"),
    ("a", "%p"),
    ("hh", "%I"),
    ("HH", "%H"),
    ("h", "%l"),
    ("H", "%k"),
    ("mm", "%M"),
    ("m", "%M"),
    ("ss", "%S"),
    ("s", "%S"),
    ("SSSSSS", "%f"),
    ("SSSSS", "%f"),
    ("SSSS", "%f"),
    ("SSS", "%f"),
    ("SS", "%f"),
    ("S", "%f"),
];

/// CockroachDB dialect.
#[derive(Debug, Clone, Copy)]
pub struct CockroachDialect {
    version: DatabaseVersion,
}

impl CockroachDialect {
    /// Oldest supported version.
    pub const MINIMUM_VERSION: DatabaseVersion = DatabaseVersion::make(19, 2);

    /// Creates a dialect for a CockroachDB version.
    #[must_use]
    pub const fn new(version: DatabaseVersion) -> Self {
        Self { version }
    }

    /// Reads the version from what `select version()` returns, e.g.
    /// `CockroachDB CCL v21.2.10 (x86_64-unknown-linux-gnu, ...)`.
    #[must_use]
    pub fn parse_version(version: &str) -> Option<DatabaseVersion> {
        version
            .split_whitespace()
            .filter_map(|word| word.strip_prefix('v'))
            .find(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
            .and_then(|rest| rest.parse().ok())
    }

    // 20.1 brought for update, lateral joins and recursive queries.
    const fn is_v20_1(&self) -> bool {
        self.version.is_same_or_after(20, 1)
    }
}

impl Default for CockroachDialect {
    fn default() -> Self {
        Self::new(Self::MINIMUM_VERSION)
    }
}

impl Dialect for CockroachDialect {
    fn name(&self) -> &'static str {
        "cockroach"
    }

    fn version(&self) -> DatabaseVersion {
        self.version
    }

    fn minimum_version(&self) -> DatabaseVersion {
        Self::MINIMUM_VERSION
    }

    fn column_type(&self, code: SqlTypeCode) -> String {
        match code {
            SqlTypeCode::Tinyint => "smallint",
            SqlTypeCode::Integer => "int4",
            SqlTypeCode::Nchar => "char($l)",
            SqlTypeCode::Nvarchar => "varchar($l)",
            SqlTypeCode::Clob | SqlTypeCode::Nclob => "string",
            SqlTypeCode::Binary | SqlTypeCode::Varbinary | SqlTypeCode::Blob => "bytes",
            SqlTypeCode::Uuid => "uuid",
            SqlTypeCode::Json if self.version.is_same_or_after(20, 0) => "jsonb",
            other => default_column_type(other),
        }
        .to_string()
    }

    fn cast_type(&self, code: SqlTypeCode) -> String {
        match code {
            SqlTypeCode::Char
            | SqlTypeCode::Nchar
            | SqlTypeCode::Varchar
            | SqlTypeCode::Nvarchar
            | SqlTypeCode::Long32varchar
            | SqlTypeCode::Long32nvarchar => "string".into(),
            SqlTypeCode::Binary | SqlTypeCode::Varbinary | SqlTypeCode::Long32varbinary => {
                "bytes".into()
            }
            other => self.type_name(other, Size::default()),
        }
    }

    fn max_identifier_length(&self) -> u32 {
        63
    }

    fn datetime_format_pattern(&self, format: &str) -> Result<String> {
        Ok(DatetimeFormatReplacer::new("", &STRFTIME_FORMAT_RULES).replace(format))
    }

    fn format_function_pattern(&self) -> Option<&'static str> {
        Some("experimental_strftime(?1,?2)")
    }

    fn extract_pattern(&self, unit: TemporalUnit) -> Result<String> {
        Ok(match unit {
            // dayofweek counts from 0
            TemporalUnit::DayOfWeek => "(extract(?1 from ?2)+1)".into(),
            _ => "extract(?1 from ?2)".into(),
        })
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
        temporal_type: TemporalType,
        interval: Option<IntervalType>,
    ) -> Result<String> {
        postgres::timestampadd_pattern(self.name(), unit, temporal_type, interval, "microsecond")
    }

    fn timestampdiff_pattern(
        &self,
        unit: TemporalUnit,
        from_type: TemporalType,
        to_type: TemporalType,
    ) -> Result<String> {
        let nanos = self.fractional_second_precision_in_nanos();
        if from_type == TemporalType::Date && to_type == TemporalType::Date {
            // date minus date is a number of days
            return Ok(if unit.is_month_based() {
                format!(
                    "extract({} from age(cast(?3 as timestamptz),cast(?2 as timestamptz)))",
                    self.translate_duration_field(unit)
                )
            } else {
                format!("(?3-?2){}", TemporalUnit::Day.conversion_factor(unit, nanos)?)
            });
        }
        if let Some(pattern) = postgres::interval_field_difference(unit, "//")
            .filter(|_| self.is_v20_1() || unit.is_month_based())
        {
            return Ok(pattern);
        }
        if self.is_v20_1() {
            return match unit {
                TemporalUnit::Hour
                | TemporalUnit::Minute
                | TemporalUnit::Second
                | TemporalUnit::Nanosecond
                | TemporalUnit::Native => Ok(format!(
                    "round(extract(epoch from ?3-?2){})::int",
                    TemporalUnit::Second.conversion_factor(unit, nanos)?
                )),
                _ => Err(DialectError::Semantic(format!("unrecognized field: {unit}"))),
            };
        }
        // extract() takes no interval before 20.1
        Ok(match unit {
            TemporalUnit::Week => "extract_duration(hour from ?3-?2)/168".into(),
            TemporalUnit::Day => "extract_duration(hour from ?3-?2)/24".into(),
            TemporalUnit::Nanosecond => "extract_duration(microsecond from ?3-?2)*1e3".into(),
            _ => "extract_duration(?1 from ?3-?2)".into(),
        })
    }

    fn current_timestamp_select_string(&self) -> String {
        "select now()".into()
    }

    fn fractional_second_precision_in_nanos(&self) -> u64 {
        1_000
    }

    fn limit_handler(&self) -> &'static dyn LimitHandler {
        &OffsetFetchLimitHandler::INSTANCE
    }

    fn sequence_support(&self) -> &'static dyn SequenceSupport {
        &StandardSequenceSupport::POSTGRESQL
    }

    fn identity_column_support(&self) -> &'static dyn IdentityColumnSupport {
        &StandardIdentityColumnSupport::SERIAL
    }

    fn query_sequences_string(&self) -> Option<&'static str> {
        Some(
            "select sequence_name,sequence_schema,sequence_catalog,start_value,minimum_value,maximum_value,increment from information_schema.sequences",
        )
    }

    fn for_update_string(&self) -> String {
        if self.is_v20_1() {
            " for update".into()
        } else {
            String::new()
        }
    }

    fn for_update_of_string(&self, aliases: &str) -> String {
        if self.is_v20_1() {
            format!(" for update of {aliases}")
        } else {
            String::new()
        }
    }

    fn read_lock_string(&self, timeout: LockTimeout) -> String {
        if matches!(timeout, LockTimeout::NoWait) && self.supports_no_wait() {
            " for share nowait".into()
        } else {
            " for share".into()
        }
    }

    fn row_lock_strategy(&self) -> RowLockStrategy {
        if self.is_v20_1() {
            RowLockStrategy::Table
        } else {
            RowLockStrategy::None
        }
    }

    fn supports_no_wait(&self) -> bool {
        self.is_v20_1()
    }

    fn supports_outer_join_for_update(&self) -> bool {
        false
    }

    fn cascade_constraints_string(&self) -> &'static str {
        " cascade"
    }

    fn no_columns_insert_string(&self) -> &'static str {
        "default values"
    }

    fn supports_if_exists_before_table_name(&self) -> bool {
        true
    }

    fn supports_lateral(&self) -> bool {
        self.is_v20_1()
    }

    fn supports_distinct_from_predicate(&self) -> bool {
        true
    }

    fn supports_null_precedence(&self) -> bool {
        false
    }

    fn supports_update_from(&self) -> bool {
        true
    }

    fn supports_case_insensitive_like(&self) -> bool {
        true
    }

    fn supports_recursive_cte(&self) -> bool {
        self.is_v20_1()
    }

    fn initialize_function_registry(&self, registry: &mut FunctionRegistry) {
        common::bit_length_from_octet_length(registry);
        common::locate_position(registry);
        common::truncate_trunc(registry);
        registry.register_pattern("bitxor", "(?1#?2)");
        registry.register_pattern("bitand", "(?1&?2)");
        registry.register_pattern("bitor", "(?1|?2)");
        registry.register_alias("every", "bool_and");
        registry.register_alias("any", "bool_or");
        registry.register_alias("listagg", "string_agg");
    }

    fn convert_exception(
        &self,
        error: &SqlError,
        message: &str,
        sql: Option<&str>,
    ) -> Option<JdbcError> {
        postgres::convert_sql_state(self.name(), error, message, sql)
    }

    fn extract_constraint_name(&self, error: &SqlError) -> Option<String> {
        postgres::extract_constraint_name(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxide_dialect_core::dialect::{LockMode, LockOptions};
    use oxide_dialect_core::exception::{ConstraintKind, JdbcErrorKind, SqlExceptionConverter};

    #[test]
    fn test_parse_version() {
        assert_eq!(
            CockroachDialect::parse_version(
                "CockroachDB CCL v21.2.10 (x86_64-unknown-linux-gnu, built 2022/05/02 17:38:58, go1.16.6)"
            ),
            Some(DatabaseVersion::new(21, 2, 10))
        );
        assert_eq!(
            CockroachDialect::parse_version("CockroachDB OSS v20.1"),
            Some(DatabaseVersion::make(20, 1))
        );
        assert_eq!(CockroachDialect::parse_version("PostgreSQL 13.3"), None);
    }

    #[test]
    fn test_column_types() {
        let old = CockroachDialect::default();
        let new = CockroachDialect::new(DatabaseVersion::make(22, 2));
        assert_eq!(old.column_type(SqlTypeCode::Json), "json");
        assert_eq!(new.column_type(SqlTypeCode::Json), "jsonb");
        assert_eq!(new.column_type(SqlTypeCode::Blob), "bytes");
        assert_eq!(new.cast_type(SqlTypeCode::Nvarchar), "string");
        assert_eq!(new.type_name(SqlTypeCode::Integer, Size::default()), "int4");
    }

    #[test]
    fn test_locking_by_version() {
        let old = CockroachDialect::new(DatabaseVersion::make(19, 2));
        let new = CockroachDialect::new(DatabaseVersion::make(21, 1));
        let write = LockOptions::new(LockMode::PessimisticWrite);
        assert_eq!(old.lock_clause(&write), "");
        assert_eq!(new.lock_clause(&write), " for update");
        assert_eq!(
            new.lock_clause(&LockOptions::new(LockMode::PessimisticRead)),
            " for share"
        );
        assert_eq!(
            new.lock_clause(&LockOptions::new(LockMode::UpgradeNoWait)),
            " for update nowait"
        );
        assert_eq!(
            new.lock_clause(&LockOptions::new(LockMode::UpgradeSkipLocked)),
            " for update"
        );
        assert_eq!(new.row_lock_strategy(), RowLockStrategy::Table);
        assert_eq!(old.row_lock_strategy(), RowLockStrategy::None);
    }

    #[test]
    fn test_timestampdiff_by_version() {
        let old = CockroachDialect::default();
        let new = CockroachDialect::new(DatabaseVersion::make(21, 2));
        let ts = TemporalType::Timestamp;
        assert_eq!(
            new.timestampdiff_pattern(TemporalUnit::Quarter, ts, ts).unwrap(),
            "(extract(year from ?3-?2)*4+extract(month from ?3-?2)//3)"
        );
        assert_eq!(
            new.timestampdiff_pattern(TemporalUnit::Minute, ts, ts).unwrap(),
            "round(extract(epoch from ?3-?2)/60)::int"
        );
        assert_eq!(
            old.timestampdiff_pattern(TemporalUnit::Week, ts, ts).unwrap(),
            "extract_duration(hour from ?3-?2)/168"
        );
        assert_eq!(
            old.timestampdiff_pattern(TemporalUnit::Year, ts, ts).unwrap(),
            "extract(year from ?3-?2)"
        );
        let date = TemporalType::Date;
        assert_eq!(
            new.timestampdiff_pattern(TemporalUnit::Week, date, date).unwrap(),
            "(?3-?2)/7"
        );
        assert_eq!(
            new.timestampdiff_pattern(TemporalUnit::Month, date, date).unwrap(),
            "extract(month from age(cast(?3 as timestamptz),cast(?2 as timestamptz)))"
        );
    }

    #[test]
    fn test_temporal_patterns() {
        let dialect = CockroachDialect::new(DatabaseVersion::make(21, 2));
        assert_eq!(
            dialect
                .timestampadd_pattern(TemporalUnit::Native, TemporalType::Timestamp, None)
                .unwrap(),
            "cast(?3+(?2)*interval '1 microsecond' as timestamp)"
        );
        assert_eq!(
            dialect.extract_pattern(TemporalUnit::DayOfWeek).unwrap(),
            "(extract(?1 from ?2)+1)"
        );
        assert_eq!(dialect.translate_extract_field(TemporalUnit::DayOfYear), "dayofyear");
        assert_eq!(
            dialect.datetime_format_pattern("EEEE dd MMMM yyyy HH:mm").unwrap(),
            "%A %d %B %Y %H:%M"
        );
    }

    #[test]
    fn test_convert_exception() {
        let dialect = CockroachDialect::new(DatabaseVersion::make(21, 2));
        let busy = SqlError::new(0, "could not obtain lock").with_sql_state("55P03");
        assert_eq!(
            dialect.convert_exception(&busy, "select", None).unwrap().kind,
            JdbcErrorKind::PessimisticLock
        );
        let fk = SqlError::new(
            0,
            "insert on table \"orders\" violates foreign key constraint \"fk_customer\"",
        )
        .with_sql_state("23503");
        assert_eq!(
            SqlExceptionConverter::for_dialect(&dialect)
                .convert(&fk, "insert", None)
                .kind,
            JdbcErrorKind::constraint(ConstraintKind::ForeignKey, Some("fk_customer".into()))
        );
    }
}
