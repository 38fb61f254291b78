//! HyperSQL dialect, 1.8 and later.

use oxide_dialect_core::ast::SqlTypeCode;
use oxide_dialect_core::dialect::{
    common, default_column_type, DatabaseVersion, Dialect, FunctionRegistry, IntervalType,
    TemporalType, TemporalUnit,
};
use oxide_dialect_core::exception::{
    extract_using_template, ConstraintKind, JdbcError, JdbcErrorKind, SqlError,
};
use oxide_dialect_core::identity::{IdentityColumnSupport, StandardIdentityColumnSupport};
use oxide_dialect_core::pagination::{
    LegacyHsqlLimitHandler, LimitHandler, LimitOffsetLimitHandler, OffsetFetchLimitHandler,
};
use oxide_dialect_core::sequence::{SequenceSupport, StandardSequenceSupport};
use oxide_dialect_core::translate::{PaginationStyle, SqlAstTranslator, StandardSqlAstTranslator};
use oxide_dialect_core::Result;

use super::{classified, oracle_datetime_format_with, PagingTranslator};

/// HyperSQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct HsqlDialect {
    version: DatabaseVersion,
}

impl HsqlDialect {
    /// Oldest supported version.
    pub const MINIMUM_VERSION: DatabaseVersion = DatabaseVersion::make(1, 8);

    /// Creates a dialect for a HyperSQL version.
    #[must_use]
    pub const fn new(version: DatabaseVersion) -> Self {
        Self { version }
    }

    /// 1.8 has no lobs, no `for update` and reports errors differently.
    const fn is_legacy(&self) -> bool {
        self.version.is_before(2, 0)
    }
}

impl Default for HsqlDialect {
    fn default() -> Self {
        Self::new(Self::MINIMUM_VERSION)
    }
}

impl Dialect for HsqlDialect {
    fn name(&self) -> &'static str {
        "hsql"
    }

    fn version(&self) -> DatabaseVersion {
        self.version
    }

    fn minimum_version(&self) -> DatabaseVersion {
        Self::MINIMUM_VERSION
    }

    fn column_type(&self, code: SqlTypeCode) -> String {
        match code {
            SqlTypeCode::Nclob => "clob",
            SqlTypeCode::Numeric if self.is_legacy() => "numeric",
            SqlTypeCode::Blob if self.is_legacy() => "longvarbinary",
            SqlTypeCode::Clob if self.is_legacy() => "longvarchar",
            SqlTypeCode::Uuid => "uuid",
            SqlTypeCode::Json => "clob",
            other => default_column_type(other),
        }
        .to_string()
    }

    fn default_batch_size(&self) -> u32 {
        15
    }

    fn select_clause_null_string(&self, code: SqlTypeCode) -> String {
        let type_name = match code {
            SqlTypeCode::Char | SqlTypeCode::Varchar | SqlTypeCode::Long32varchar => "varchar(100)",
            SqlTypeCode::Binary | SqlTypeCode::Varbinary | SqlTypeCode::Long32varbinary => {
                "varbinary(100)"
            }
            SqlTypeCode::Clob => "clob",
            SqlTypeCode::Blob => "blob",
            SqlTypeCode::Date => "date",
            SqlTypeCode::Timestamp | SqlTypeCode::TimestampWithTimezone => "timestamp",
            SqlTypeCode::Boolean => "boolean",
            SqlTypeCode::Bit => "bit",
            SqlTypeCode::Time => "time",
            _ => "int",
        };
        format!("cast(null as {type_name})")
    }

    fn datetime_format_pattern(&self, format: &str) -> Result<String> {
        // case sensitive month and day names, and no fraction digit counts
        Ok(oracle_datetime_format_with(
            format,
            &[
                ("MMMM", "MONTH"),
                ("EEEE", "DAY"),
                ("SSSSSS", "FF"),
                ("SSSSS", "FF"),
                ("SSSS", "FF"),
                ("SSS", "FF"),
                ("SS", "FF"),
                ("S", "FF"),
            ],
        ))
    }

    fn format_function_pattern(&self) -> Option<&'static str> {
        Some("to_char(?1,?2)")
    }

    fn translate_extract_field(&self, unit: TemporalUnit) -> String {
        match unit {
            TemporalUnit::Week => "week_of_year".into(),
            other => other.as_str().into(),
        }
    }

    fn timestampadd_pattern(
        &self,
        unit: TemporalUnit,
        temporal_type: TemporalType,
        interval: Option<IntervalType>,
    ) -> Result<String> {
        let _ = interval;
        let operand = if temporal_type != TemporalType::Timestamp && !unit.is_date_unit() {
            "cast(?3 as timestamp)"
        } else {
            "?3"
        };
        Ok(match unit {
            TemporalUnit::Nanosecond | TemporalUnit::Native => {
                format!("timestampadd(sql_tsi_frac_second,?2,{operand})")
            }
            TemporalUnit::Week => format!("dateadd('day',?2*7,{operand})"),
            _ => format!("dateadd('?1',?2,{operand})"),
        })
    }

    fn timestampdiff_pattern(
        &self,
        unit: TemporalUnit,
        from_type: TemporalType,
        to_type: TemporalType,
    ) -> Result<String> {
        let cast = |temporal_type: TemporalType, operand: &'static str| {
            if temporal_type != TemporalType::Timestamp && !unit.is_date_unit() {
                format!("cast({operand} as timestamp)")
            } else {
                operand.to_string()
            }
        };
        let from = cast(from_type, "?2");
        let to = cast(to_type, "?3");
        Ok(match unit {
            TemporalUnit::Nanosecond | TemporalUnit::Native => {
                format!("timestampdiff(sql_tsi_frac_second,{from},{to})")
            }
            TemporalUnit::Week => format!("(datediff('day',{from},{to})/7)"),
            _ => format!("datediff('?1',{from},{to})"),
        })
    }

    fn current_time(&self) -> &'static str {
        "localtime"
    }

    fn current_timestamp(&self) -> &'static str {
        "localtimestamp"
    }

    fn current_timestamp_select_string(&self) -> String {
        "call current_timestamp".into()
    }

    fn limit_handler(&self) -> &'static dyn LimitHandler {
        if self.is_legacy() {
            &LegacyHsqlLimitHandler::INSTANCE
        } else if self.version.is_before(2, 5) {
            &LimitOffsetLimitHandler::OFFSET_ONLY_INSTANCE
        } else {
            &OffsetFetchLimitHandler::INSTANCE
        }
    }

    fn supports_offset_fetch_clause(&self) -> bool {
        !self.is_legacy()
    }

    fn sequence_support(&self) -> &'static dyn SequenceSupport {
        &StandardSequenceSupport::HSQL
    }

    fn identity_column_support(&self) -> &'static dyn IdentityColumnSupport {
        &StandardIdentityColumnSupport::HSQL
    }

    fn query_sequences_string(&self) -> Option<&'static str> {
        Some("select * from information_schema.sequences")
    }

    fn for_update_string(&self) -> String {
        if self.is_legacy() {
            String::new()
        } else {
            " for update".into()
        }
    }

    fn supports_lock_timeouts(&self) -> bool {
        false
    }

    fn cascade_constraints_string(&self) -> &'static str {
        " cascade "
    }

    fn temporary_table_create_command(&self) -> &'static str {
        if self.is_legacy() {
            "create global temporary table"
        } else {
            "declare local temporary table"
        }
    }

    fn supports_if_exists_after_table_name(&self) -> bool {
        true
    }

    fn supports_comment_on(&self) -> bool {
        !self.is_legacy()
    }

    fn supports_window_functions(&self) -> bool {
        !self.is_legacy()
    }

    fn supports_lateral(&self) -> bool {
        self.version.is_same_or_after_micro(2, 6, 1)
    }

    fn supports_distinct_from_predicate(&self) -> bool {
        true
    }

    fn supports_values_list(&self) -> bool {
        !self.is_legacy()
    }

    fn supports_merge(&self) -> bool {
        !self.is_legacy()
    }

    fn initialize_function_registry(&self, registry: &mut FunctionRegistry) {
        common::truncate_trunc(registry);
        registry.register_alias("chr", "char");
        registry.register_alias("substring", "substr");
        registry.register_no_args("now", "localtimestamp");
        registry.register_no_args("curdate", "current_date");
        registry.register_no_args("curtime", "localtime");
    }

    fn cast_pattern(&self, from: Option<SqlTypeCode>, to: SqlTypeCode) -> String {
        match (from, to) {
            (
                Some(SqlTypeCode::Boolean),
                SqlTypeCode::Integer | SqlTypeCode::Bigint | SqlTypeCode::Smallint | SqlTypeCode::Tinyint,
            ) => "case ?1 when false then 0 when true then 1 end".into(),
            (
                Some(SqlTypeCode::Integer | SqlTypeCode::Bigint | SqlTypeCode::Smallint | SqlTypeCode::Tinyint),
                SqlTypeCode::Boolean,
            ) => "case ?1 when 0 then false when 1 then true end".into(),
            (Some(SqlTypeCode::Boolean), SqlTypeCode::Varchar | SqlTypeCode::Char) => {
                "trim(case ?1 when false then 'false' when true then 'true' end)".into()
            }
            _ => "cast(?1 as ?2)".into(),
        }
    }

    fn convert_exception(
        &self,
        error: &SqlError,
        message: &str,
        sql: Option<&str>,
    ) -> Option<JdbcError> {
        if error.error_code != -104 {
            return None;
        }
        let kind = JdbcErrorKind::constraint(ConstraintKind::Unique, self.extract_constraint_name(error));
        classified(self.name(), kind, error, message, sql)
    }

    fn extract_constraint_name(&self, error: &SqlError) -> Option<String> {
        let message = &error.message;
        if !self.is_legacy() {
            return match error.error_code {
                -8 | -9 | -104 | -177 => extract_using_template("; ", " table: ", message),
                _ => None,
            };
        }
        match error.error_code {
            -8 => extract_using_template("Integrity constraint violation ", " table:", message),
            -9 => extract_using_template("Violation of unique index: ", " in statement [", message),
            -104 => extract_using_template("Unique constraint violation: ", " in statement [", message),
            -177 => extract_using_template(
                "Integrity constraint violation - no parent ",
                " table:",
                message,
            ),
            _ => None,
        }
    }

    fn build_translator(&self) -> Box<dyn SqlAstTranslator<'_> + '_> {
        if self.is_legacy() {
            Box::new(PagingTranslator::new(self, PaginationStyle::LimitOffset))
        } else {
            Box::new(StandardSqlAstTranslator::new(self))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hsql(major: u16, minor: u16) -> HsqlDialect {
        HsqlDialect::new(DatabaseVersion::make(major, minor))
    }

    #[test]
    fn test_legacy_types() {
        assert_eq!(hsql(1, 8).column_type(SqlTypeCode::Clob), "longvarchar");
        assert_eq!(hsql(2, 7).column_type(SqlTypeCode::Clob), "clob");
        assert_eq!(hsql(2, 7).column_type(SqlTypeCode::Nclob), "clob");
        assert_eq!(hsql(2, 7).select_clause_null_string(SqlTypeCode::Varchar), "cast(null as varchar(100))");
    }

    #[test]
    fn test_limit_handlers() {
        assert_eq!(hsql(1, 8).limit_handler().name(), "legacy-hsql");
        assert_eq!(hsql(2, 4).limit_handler().name(), "limit-offset");
        assert_eq!(hsql(2, 7).limit_handler().name(), "offset-fetch");
    }

    #[test]
    fn test_temporal_patterns() {
        let dialect = hsql(2, 7);
        assert_eq!(
            dialect
                .timestampdiff_pattern(TemporalUnit::Week, TemporalType::Date, TemporalType::Date)
                .unwrap(),
            "(datediff('day',?2,?3)/7)"
        );
        assert_eq!(
            dialect
                .timestampadd_pattern(TemporalUnit::Hour, TemporalType::Date, None)
                .unwrap(),
            "dateadd('?1',?2,cast(?3 as timestamp))"
        );
        assert_eq!(dialect.translate_extract_field(TemporalUnit::Week), "week_of_year");
        assert_eq!(
            dialect.datetime_format_pattern("dd MMMM yyyy HH:mm:ss.SSS").unwrap(),
            "DD MONTH YYYY HH24:MI:SS.FF"
        );
    }

    #[test]
    fn test_lock_strings() {
        assert_eq!(hsql(1, 8).for_update_string(), "");
        assert_eq!(hsql(2, 0).for_update_string(), " for update");
    }

    #[test]
    fn test_unique_violation_names() {
        let modern = SqlError::new(
            -104,
            "integrity constraint violation: unique constraint or index violation; UK_NAME table: USERS",
        );
        assert_eq!(
            hsql(2, 7).convert_exception(&modern, "insert", None).unwrap().kind,
            JdbcErrorKind::constraint(ConstraintKind::Unique, Some("UK_NAME".into()))
        );
        let legacy = SqlError::new(-104, "Unique constraint violation: UK_NAME in statement [insert]");
        assert_eq!(hsql(1, 8).extract_constraint_name(&legacy).as_deref(), Some("UK_NAME"));
        assert!(hsql(2, 7).convert_exception(&SqlError::new(-5501, "x"), "x", None).is_none());
    }
}
