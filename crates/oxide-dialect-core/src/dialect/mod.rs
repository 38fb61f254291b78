//! SQL Dialect support.
//!
//! Databases differ in type names, pagination, locking, sequences,
//! functions and error codes. [`Dialect`] describes one product and
//! version. Its default methods describe an ANSI baseline; a product
//! overrides what differs.
//!
//! Strategy objects ([`LimitHandler`], [`SequenceSupport`],
//! [`IdentityColumnSupport`]) are shared statics selected by version.

mod capabilities;
mod format;
mod function;
mod generic;
mod lock;
mod pattern;
mod temporal;
mod version;

use core::fmt;

use serde::{Deserialize, Serialize};

pub use capabilities::{
    Capabilities, Features, IdentityCapabilities, Limits, LockingCapabilities,
    PaginationCapabilities, SequenceCapabilities,
};
pub use format::DatetimeFormatReplacer;
pub use function::{common, render_call, FunctionRegistry, FunctionRenderer};
pub use generic::GenericDialect;
pub use lock::{LockMode, LockOptions, LockTimeout, RowLockStrategy};
pub use pattern::{render_pattern, Fragment, Pattern};
pub use temporal::{IntervalType, TemporalType, TemporalUnit};
pub use version::DatabaseVersion;

use crate::ast::{expand_type_template, DatetimeLiteral, Size, SqlTypeCode, Statement};
use crate::error::{DialectError, Result};
use crate::exception::{JdbcError, SqlError};
use crate::identity::{IdentityColumnSupport, StandardIdentityColumnSupport};
use crate::pagination::{LimitHandler, OffsetFetchLimitHandler};
use crate::sequence::{SequenceSupport, StandardSequenceSupport};
use crate::translate::{
    JdbcOperation, QueryOptions, SqlAstTranslator, StandardSqlAstTranslator,
};

/// How `is [not] distinct from` is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistinctFromStrategy {
    /// `a is distinct from b`.
    Native,
    /// `case when a=b or a is null and b is null then 0 else 1 end=1`.
    Case,
    /// `decode(a,b,0,1)=1`.
    Decode,
    /// `not exists (select a intersect select b)`.
    Intersect,
    /// `not (a<=>b)`.
    NullSafeEquals,
}

/// Gives access to a dialect as a trait object.
///
/// Implemented for every sized [`Dialect`]; default methods use it to
/// hand `self` to code that takes `&dyn Dialect`.
pub trait AsDialect {
    /// Returns `self` as a trait object.
    fn as_dialect(&self) -> &dyn Dialect;
}

impl<T: Dialect> AsDialect for T {
    fn as_dialect(&self) -> &dyn Dialect {
        self
    }
}

/// Behavior of one database product and version.
pub trait Dialect: AsDialect + Send + Sync + fmt::Debug {
    // ---- identity ----

    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Version the dialect was built for.
    fn version(&self) -> DatabaseVersion;

    /// Oldest supported version.
    fn minimum_version(&self) -> DatabaseVersion {
        DatabaseVersion::make(0, 0)
    }

    // ---- types ----

    /// Column type template for a type code, with `$l`, `$p` and `$s`
    /// standing for length, precision and scale.
    fn column_type(&self, code: SqlTypeCode) -> String {
        default_column_type(code).to_string()
    }

    /// Type name used as the target of a cast.
    fn cast_type(&self, code: SqlTypeCode) -> String {
        self.type_name(code, Size::default())
    }

    /// Column type with the template filled in; missing sizes take the
    /// dialect defaults.
    fn type_name(&self, code: SqlTypeCode, size: Size) -> String {
        let length = size.length.unwrap_or_else(|| default_length(self, code));
        let precision = size
            .precision
            .unwrap_or_else(|| default_precision(self, code));
        let scale = size.scale.unwrap_or(Size::DEFAULT_SCALE);
        expand_type_template(&self.column_type(code), length, precision, scale)
    }

    /// Longest `varchar` length.
    fn max_varchar_length(&self) -> u32 {
        2_147_483_647
    }

    /// Longest `nvarchar` length.
    fn max_nvarchar_length(&self) -> u32 {
        self.max_varchar_length()
    }

    /// Longest `varbinary` length.
    fn max_varbinary_length(&self) -> u32 {
        self.max_varchar_length()
    }

    /// Precision of `numeric` and `decimal` without an explicit one.
    fn default_decimal_precision(&self) -> u32 {
        38
    }

    /// Fractional second digits of timestamps without an explicit one.
    fn default_timestamp_precision(&self) -> u32 {
        6
    }

    /// Binary digits of `float`.
    fn float_precision(&self) -> u32 {
        24
    }

    /// Binary digits of `double`.
    fn double_precision(&self) -> u32 {
        53
    }

    /// Longest identifier.
    fn max_identifier_length(&self) -> u32 {
        128
    }

    /// Suggested JDBC batch size.
    fn default_batch_size(&self) -> u32 {
        1
    }

    /// Most elements allowed in an `in` list, if limited.
    fn in_expression_count_limit(&self) -> Option<u32> {
        None
    }

    /// Most bind parameters allowed in a statement, if limited.
    fn parameter_count_limit(&self) -> Option<u32> {
        None
    }

    /// Typed null for a select list, needed in unions on some databases.
    fn select_clause_null_string(&self, code: SqlTypeCode) -> String {
        let _ = code;
        "null".into()
    }

    // ---- literals ----

    /// SQL text of a boolean value.
    fn to_boolean_value_string(&self, value: bool) -> &'static str {
        if value {
            "true"
        } else {
            "false"
        }
    }

    /// Appends a boolean literal.
    fn append_boolean_literal(&self, buf: &mut String, value: bool) {
        buf.push_str(self.to_boolean_value_string(value));
    }

    /// Appends a quoted string literal.
    fn append_string_literal(&self, buf: &mut String, value: &str) {
        buf.push('\'');
        buf.push_str(&value.replace('\'', "''"));
        buf.push('\'');
    }

    /// Appends a binary literal.
    fn append_binary_literal(&self, buf: &mut String, value: &[u8]) {
        buf.push_str("X'");
        push_hex(buf, value);
        buf.push('\'');
    }

    /// Appends a date, time or timestamp literal.
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

    /// Translates a Java-style datetime pattern into the native one.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Unsupported`] when the database cannot
    /// format datetimes.
    fn datetime_format_pattern(&self, format: &str) -> Result<String> {
        Ok(format.to_string())
    }

    /// Pattern formatting `?1` with the native format string `?2`.
    fn format_function_pattern(&self) -> Option<&'static str> {
        None
    }

    // ---- temporal ----

    /// Pattern extracting field `?1` from `?2`.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Semantic`] for fields the database cannot
    /// extract.
    fn extract_pattern(&self, unit: TemporalUnit) -> Result<String> {
        let _ = unit;
        Ok("extract(?1 from ?2)".into())
    }

    /// Native name of an extractable field.
    fn translate_extract_field(&self, unit: TemporalUnit) -> String {
        match unit {
            TemporalUnit::DayOfMonth => "day".into(),
            TemporalUnit::DayOfYear => "doy".into(),
            TemporalUnit::DayOfWeek => "dow".into(),
            other => other.as_str().into(),
        }
    }

    /// Native name of a duration unit.
    fn translate_duration_field(&self, unit: TemporalUnit) -> String {
        match unit {
            TemporalUnit::Native => "nanosecond".into(),
            other => other.as_str().into(),
        }
    }

    /// Pattern adding `?2` units `?1` to `?3`.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Semantic`] or [`DialectError::Unsupported`]
    /// for units the database cannot add.
    fn timestampadd_pattern(
        &self,
        unit: TemporalUnit,
        temporal_type: TemporalType,
        interval: Option<IntervalType>,
    ) -> Result<String> {
        let _ = (unit, temporal_type, interval);
        Ok("timestampadd(?1,?2,?3)".into())
    }

    /// Pattern counting units `?1` from `?2` to `?3`.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Semantic`] or [`DialectError::Unsupported`]
    /// for units the database cannot count.
    fn timestampdiff_pattern(
        &self,
        unit: TemporalUnit,
        from_type: TemporalType,
        to_type: TemporalType,
    ) -> Result<String> {
        let _ = (unit, from_type, to_type);
        Ok("timestampdiff(?1,?2,?3)".into())
    }

    /// `current_date` function.
    fn current_date(&self) -> &'static str {
        "current_date"
    }

    /// `current_time` function.
    fn current_time(&self) -> &'static str {
        "current_time"
    }

    /// `current_timestamp` function.
    fn current_timestamp(&self) -> &'static str {
        "current_timestamp"
    }

    /// Statement selecting the current timestamp.
    fn current_timestamp_select_string(&self) -> String {
        format!(
            "select {}{}",
            self.current_timestamp(),
            self.from_dual_for_select_only()
        )
    }

    /// Length of [`TemporalUnit::Native`] in nanoseconds.
    fn fractional_second_precision_in_nanos(&self) -> u64 {
        1
    }

    // ---- pagination ----

    /// Handler applying row limits to root queries.
    fn limit_handler(&self) -> &'static dyn LimitHandler {
        &OffsetFetchLimitHandler::INSTANCE
    }

    /// Returns true if `offset ... fetch` can be written in any query.
    fn supports_offset_fetch_clause(&self) -> bool {
        true
    }

    // ---- sequences and identity ----

    /// Sequence SQL.
    fn sequence_support(&self) -> &'static dyn SequenceSupport {
        &StandardSequenceSupport::ANSI
    }

    /// Identity column SQL.
    fn identity_column_support(&self) -> &'static dyn IdentityColumnSupport {
        &StandardIdentityColumnSupport::NONE
    }

    /// Query listing the sequences of the database.
    fn query_sequences_string(&self) -> Option<&'static str> {
        None
    }

    // ---- locking ----

    /// Clause locking the selected rows.
    fn for_update_string(&self) -> String {
        " for update".into()
    }

    /// Clause locking the rows of the given aliases or columns.
    fn for_update_of_string(&self, aliases: &str) -> String {
        format!("{} of {aliases}", self.for_update_string())
    }

    /// Lock clause failing immediately on conflict.
    fn for_update_nowait_string(&self) -> String {
        if self.supports_no_wait() {
            format!("{} nowait", self.for_update_string())
        } else {
            self.for_update_string()
        }
    }

    /// Lock clause skipping locked rows.
    fn for_update_skip_locked_string(&self) -> String {
        if self.supports_skip_locked() {
            format!("{} skip locked", self.for_update_string())
        } else {
            self.for_update_string()
        }
    }

    /// Lock clause waiting at most `seconds`.
    fn for_update_wait_string(&self, seconds: u32) -> String {
        if self.supports_wait() {
            format!("{} wait {seconds}", self.for_update_string())
        } else {
            self.for_update_string()
        }
    }

    /// Shared lock clause.
    fn read_lock_string(&self, timeout: LockTimeout) -> String {
        timed_for_update(self, timeout)
    }

    /// Exclusive lock clause.
    fn write_lock_string(&self, timeout: LockTimeout) -> String {
        timed_for_update(self, timeout)
    }

    /// Lock clause appended to a query for `options`; empty for
    /// non-pessimistic modes.
    fn lock_clause(&self, options: &LockOptions) -> String {
        if !options.mode.is_pessimistic() {
            return String::new();
        }
        let timeout = options.effective_timeout();
        if !options.aliases.is_empty() && self.row_lock_strategy() != RowLockStrategy::None {
            let clause = self.for_update_of_string(&options.aliases.join(","));
            return with_timeout_suffix(self, clause, timeout);
        }
        match options.mode {
            LockMode::PessimisticRead => self.read_lock_string(timeout),
            _ => self.write_lock_string(timeout),
        }
    }

    /// Returns true if locks are written as table hints.
    fn uses_lock_hints(&self) -> bool {
        false
    }

    /// Table reference with a lock hint appended.
    fn append_lock_hint(&self, options: &LockOptions, table: &str) -> String {
        let _ = options;
        table.to_string()
    }

    /// What `for update of` names.
    fn row_lock_strategy(&self) -> RowLockStrategy {
        RowLockStrategy::Column
    }

    /// Returns true for `skip locked`.
    fn supports_skip_locked(&self) -> bool {
        false
    }

    /// Returns true for `nowait`.
    fn supports_no_wait(&self) -> bool {
        false
    }

    /// Returns true for `wait N`.
    fn supports_wait(&self) -> bool {
        false
    }

    /// Returns true if lock timeouts are honored.
    fn supports_lock_timeouts(&self) -> bool {
        true
    }

    /// Returns true if outer joined rows can be locked.
    fn supports_outer_join_for_update(&self) -> bool {
        true
    }

    // ---- DDL ----

    /// Keyword adding a column.
    fn add_column_string(&self) -> &'static str {
        "add column"
    }

    /// Keyword dropping a foreign key.
    fn drop_foreign_key_string(&self) -> &'static str {
        "drop constraint"
    }

    /// Clause adding a foreign key.
    fn add_foreign_key_constraint_string(
        &self,
        constraint_name: &str,
        foreign_key: &[&str],
        referenced_table: &str,
        primary_key: &[&str],
        references_primary_key: bool,
    ) -> String {
        let mut sql = format!(
            " add constraint {} foreign key ({}) references {referenced_table}",
            self.quote(constraint_name),
            foreign_key.join(", ")
        );
        if !references_primary_key {
            sql.push_str(&format!(" ({})", primary_key.join(", ")));
        }
        sql
    }

    /// Clause adding a primary key.
    fn add_primary_key_constraint_string(&self, constraint_name: &str) -> String {
        format!(" add constraint {constraint_name} primary key ")
    }

    /// Suffix cascading a drop to constraints.
    fn cascade_constraints_string(&self) -> &'static str {
        ""
    }

    /// Statements creating a schema.
    fn create_schema_command(&self, name: &str) -> Vec<String> {
        vec![format!("create schema {name}")]
    }

    /// Statements dropping a schema.
    fn drop_schema_command(&self, name: &str) -> Vec<String> {
        vec![format!("drop schema {name}")]
    }

    /// Command creating a temporary table.
    fn temporary_table_create_command(&self) -> &'static str {
        "create local temporary table"
    }

    /// Options appended to a temporary table definition.
    fn temporary_table_create_options(&self) -> Option<&'static str> {
        None
    }

    /// Insert tail for a row of defaults.
    fn no_columns_insert_string(&self) -> &'static str {
        "values ( )"
    }

    /// Column suffix for a generated column.
    fn generated_as(&self, expression: &str) -> String {
        format!(" generated always as ({expression})")
    }

    /// Returns true for `drop table if exists t`.
    fn supports_if_exists_before_table_name(&self) -> bool {
        false
    }

    /// Returns true for `drop table t if exists`.
    fn supports_if_exists_after_table_name(&self) -> bool {
        false
    }

    /// Returns true for `comment on`.
    fn supports_comment_on(&self) -> bool {
        false
    }

    // ---- capability flags ----

    /// Returns true for window functions.
    fn supports_window_functions(&self) -> bool {
        true
    }

    /// Returns true for `lateral`.
    fn supports_lateral(&self) -> bool {
        false
    }

    /// Returns true for a native `is distinct from`.
    fn supports_distinct_from_predicate(&self) -> bool {
        false
    }

    /// Returns true for `values` as a query.
    fn supports_values_list(&self) -> bool {
        true
    }

    /// Returns true for multi-row `insert ... values`.
    fn supports_values_list_for_insert(&self) -> bool {
        true
    }

    /// Returns true for row value comparisons.
    fn supports_row_value_constructor_syntax(&self) -> bool {
        true
    }

    /// Returns true for row values in `in` lists.
    fn supports_row_value_constructor_syntax_in_in_list(&self) -> bool {
        self.supports_row_value_constructor_syntax()
    }

    /// Returns true for `nulls first` and `nulls last`.
    fn supports_null_precedence(&self) -> bool {
        true
    }

    /// Returns true for `intersect`.
    fn supports_intersect(&self) -> bool {
        true
    }

    /// Returns true for `except` (or `minus`).
    fn supports_except(&self) -> bool {
        true
    }

    /// Keyword of the set difference.
    fn except_keyword(&self) -> &'static str {
        "except"
    }

    /// Returns true for `merge`.
    fn supports_merge(&self) -> bool {
        true
    }

    /// Returns true for `insert ... on conflict`.
    fn supports_conflict_clause(&self) -> bool {
        false
    }

    /// Returns true for `insert ... on duplicate key update`.
    fn supports_on_duplicate_key(&self) -> bool {
        false
    }

    /// Returns true for `update ... from`.
    fn supports_update_from(&self) -> bool {
        false
    }

    /// Returns true if a predicate may be used where a value is expected.
    fn supports_predicate_as_expression(&self) -> bool {
        true
    }

    /// Returns true if a boolean value may be used as a predicate.
    fn supports_boolean_expression_as_predicate(&self) -> bool {
        true
    }

    /// Returns true for a native case insensitive `like`.
    fn supports_case_insensitive_like(&self) -> bool {
        false
    }

    /// Returns true for temporary tables.
    fn supports_temporary_tables(&self) -> bool {
        true
    }

    /// Returns true for recursive common table expressions.
    fn supports_recursive_cte(&self) -> bool {
        true
    }

    /// Returns true if `exists` can be a select item.
    fn supports_exists_in_select(&self) -> bool {
        true
    }

    /// Returns true if a bare `?` may be a function argument. When false,
    /// such parameters are rendered inside a `cast`.
    fn supports_untyped_function_parameters(&self) -> bool {
        true
    }

    /// From clause for a select without tables, with a leading space.
    fn from_dual_for_select_only(&self) -> &'static str {
        ""
    }

    /// One-row table.
    fn dual(&self) -> &'static str {
        "(values (0))"
    }

    /// How `is [not] distinct from` is written.
    fn distinct_from_strategy(&self) -> DistinctFromStrategy {
        if self.supports_distinct_from_predicate() {
            DistinctFromStrategy::Native
        } else {
            DistinctFromStrategy::Case
        }
    }

    // ---- quoting ----

    /// Opening identifier quote.
    fn open_quote(&self) -> char {
        '"'
    }

    /// Closing identifier quote.
    fn close_quote(&self) -> char {
        '"'
    }

    /// Converts a name quoted with `` ` ``, `"` or `[` to this dialect's
    /// quotes. Other names are returned unchanged.
    fn quote(&self, name: &str) -> String {
        match name.chars().next() {
            Some('`' | '"' | '[') if name.len() >= 2 => format!(
                "{}{}{}",
                self.open_quote(),
                &name[1..name.len() - 1],
                self.close_quote()
            ),
            _ => name.to_string(),
        }
    }

    // ---- functions ----

    /// Registers the dialect's function renderings.
    fn initialize_function_registry(&self, registry: &mut FunctionRegistry) {
        let _ = registry;
    }

    /// Name of the lower-case function.
    fn lowercase_function(&self) -> &'static str {
        "lower"
    }

    /// String concatenation operator.
    fn concat_operator(&self) -> &'static str {
        "||"
    }

    /// Pattern casting `?1` to the type `?2`.
    fn cast_pattern(&self, from: Option<SqlTypeCode>, to: SqlTypeCode) -> String {
        let _ = (from, to);
        "cast(?1 as ?2)".into()
    }

    // ---- exceptions ----

    /// Classifies a vendor error by its codes, or returns `None`.
    fn convert_exception(
        &self,
        error: &SqlError,
        message: &str,
        sql: Option<&str>,
    ) -> Option<JdbcError> {
        let _ = (error, message, sql);
        None
    }

    /// Name of the constraint a violation reports.
    fn extract_constraint_name(&self, error: &SqlError) -> Option<String> {
        let _ = error;
        None
    }

    // ---- translation ----

    /// Creates a translator for one statement.
    fn build_translator(&self) -> Box<dyn SqlAstTranslator<'_> + '_> {
        Box::new(StandardSqlAstTranslator::new(self.as_dialect()))
    }

    /// Translates a statement.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Unsupported`] for constructs the database
    /// cannot express, or the error of a failing pattern.
    fn translate(&self, statement: &Statement, options: &QueryOptions) -> Result<JdbcOperation> {
        self.build_translator().translate(statement, options)
    }

    /// Snapshot of every flag and limit.
    fn capabilities(&self) -> Capabilities {
        Capabilities::of(self.as_dialect())
    }
}

/// ANSI column type templates.
#[must_use]
pub const fn default_column_type(code: SqlTypeCode) -> &'static str {
    match code {
        SqlTypeCode::Boolean => "boolean",
        SqlTypeCode::Bit => "bit",
        SqlTypeCode::Tinyint => "tinyint",
        SqlTypeCode::Smallint => "smallint",
        SqlTypeCode::Integer => "integer",
        SqlTypeCode::Bigint => "bigint",
        SqlTypeCode::Real => "real",
        SqlTypeCode::Float => "float($p)",
        SqlTypeCode::Double => "double precision",
        SqlTypeCode::Numeric => "numeric($p,$s)",
        SqlTypeCode::Decimal => "decimal($p,$s)",
        SqlTypeCode::Char => "char($l)",
        SqlTypeCode::Nchar => "nchar($l)",
        SqlTypeCode::Varchar | SqlTypeCode::Long32varchar => "varchar($l)",
        SqlTypeCode::Nvarchar | SqlTypeCode::Long32nvarchar => "nvarchar($l)",
        SqlTypeCode::Clob => "clob",
        SqlTypeCode::Nclob => "nclob",
        SqlTypeCode::Binary => "binary($l)",
        SqlTypeCode::Varbinary | SqlTypeCode::Long32varbinary => "varbinary($l)",
        SqlTypeCode::Blob => "blob",
        SqlTypeCode::Date => "date",
        SqlTypeCode::Time => "time",
        SqlTypeCode::TimeWithTimezone => "time with time zone",
        SqlTypeCode::Timestamp => "timestamp($p)",
        SqlTypeCode::TimestampWithTimezone => "timestamp($p) with time zone",
        SqlTypeCode::Uuid => "binary(16)",
        SqlTypeCode::Json => "json",
        SqlTypeCode::Sqlxml => "xml",
    }
}

fn default_length<D: Dialect + ?Sized>(dialect: &D, code: SqlTypeCode) -> u32 {
    match code {
        SqlTypeCode::Long32varchar => dialect.max_varchar_length(),
        SqlTypeCode::Long32nvarchar => dialect.max_nvarchar_length(),
        SqlTypeCode::Long32varbinary => dialect.max_varbinary_length(),
        _ => Size::DEFAULT_LENGTH,
    }
}

fn default_precision<D: Dialect + ?Sized>(dialect: &D, code: SqlTypeCode) -> u32 {
    match code {
        SqlTypeCode::Float | SqlTypeCode::Real => dialect.float_precision(),
        SqlTypeCode::Double => dialect.double_precision(),
        SqlTypeCode::Time
        | SqlTypeCode::TimeWithTimezone
        | SqlTypeCode::Timestamp
        | SqlTypeCode::TimestampWithTimezone => dialect.default_timestamp_precision(),
        _ => dialect.default_decimal_precision(),
    }
}

fn timed_for_update<D: Dialect + ?Sized>(dialect: &D, timeout: LockTimeout) -> String {
    match timeout {
        LockTimeout::NoWait => dialect.for_update_nowait_string(),
        LockTimeout::SkipLocked => dialect.for_update_skip_locked_string(),
        LockTimeout::Millis(_) => match timeout.seconds() {
            Some(seconds) => dialect.for_update_wait_string(seconds),
            None => dialect.for_update_string(),
        },
        LockTimeout::WaitForever => dialect.for_update_string(),
    }
}

fn with_timeout_suffix<D: Dialect + ?Sized>(
    dialect: &D,
    mut clause: String,
    timeout: LockTimeout,
) -> String {
    match timeout {
        LockTimeout::NoWait if dialect.supports_no_wait() => clause.push_str(" nowait"),
        LockTimeout::SkipLocked if dialect.supports_skip_locked() => {
            clause.push_str(" skip locked");
        }
        LockTimeout::Millis(_) if dialect.supports_wait() => {
            if let Some(seconds) = timeout.seconds() {
                clause.push_str(&format!(" wait {seconds}"));
            }
        }
        _ => {}
    }
    clause
}

/// Appends `bytes` as upper-case hexadecimal.
pub fn push_hex(buf: &mut String, bytes: &[u8]) {
    const DIGITS: &[u8; 16] = b"0123456789ABCDEF";
    for byte in bytes {
        buf.push(char::from(DIGITS[usize::from(byte >> 4)]));
        buf.push(char::from(DIGITS[usize::from(byte & 0x0f)]));
    }
}

/// Unsupported-unit error shared by temporal patterns.
#[must_use]
pub fn unsupported_unit(dialect: &str, operation: &str, unit: TemporalUnit) -> DialectError {
    DialectError::Semantic(format!(
        "{operation} does not support unit '{unit}' on {dialect}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::DatetimeLiteral;
    use chrono::NaiveDate;

    #[test]
    fn test_type_name_defaults() {
        let dialect = GenericDialect::new();
        assert_eq!(
            dialect.type_name(SqlTypeCode::Varchar, Size::default()),
            "varchar(255)"
        );
        assert_eq!(
            dialect.type_name(SqlTypeCode::Decimal, Size::precision(10, 3)),
            "decimal(10,3)"
        );
        assert_eq!(
            dialect.type_name(SqlTypeCode::Timestamp, Size::default()),
            "timestamp(6)"
        );
        assert_eq!(dialect.type_name(SqlTypeCode::Float, Size::default()), "float(24)");
    }

    #[test]
    fn test_quote_conversion() {
        let dialect = GenericDialect::new();
        assert_eq!(dialect.quote("`order`"), "\"order\"");
        assert_eq!(dialect.quote("[user]"), "\"user\"");
        assert_eq!(dialect.quote("plain"), "plain");
    }

    #[test]
    fn test_literals() {
        let dialect = GenericDialect::new();
        let mut buf = String::new();
        dialect.append_string_literal(&mut buf, "it's");
        buf.push(' ');
        dialect.append_binary_literal(&mut buf, &[0xca, 0xfe]);
        buf.push(' ');
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        dialect.append_datetime_literal(&mut buf, DatetimeLiteral::Date(date));
        assert_eq!(buf, "'it''s' X'CAFE' date '2024-02-29'");
    }

    #[test]
    fn test_lock_clause() {
        let dialect = GenericDialect::new();
        assert_eq!(dialect.lock_clause(&LockOptions::new(LockMode::Read)), "");
        assert_eq!(
            dialect.lock_clause(&LockOptions::new(LockMode::PessimisticWrite)),
            " for update"
        );
        assert_eq!(
            dialect.lock_clause(
                &LockOptions::new(LockMode::PessimisticWrite).with_aliases(["a", "b"])
            ),
            " for update of a,b"
        );
    }

    #[test]
    fn test_foreign_key_string() {
        let dialect = GenericDialect::new();
        assert_eq!(
            dialect.add_foreign_key_constraint_string("fk1", &["a", "b"], "t", &["x", "y"], false),
            " add constraint fk1 foreign key (a, b) references t (x, y)"
        );
    }
}
