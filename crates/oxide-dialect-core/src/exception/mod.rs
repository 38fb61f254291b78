//! Classification of vendor errors.
//!
//! A [`SqlError`] carries what a driver reports: a vendor error code, a
//! SQL state and a message, possibly chained. [`SqlExceptionConverter`]
//! runs it through a chain of [`SqlExceptionConversionDelegate`]s, the
//! dialect's own first, and always produces a [`JdbcError`].

mod extractor;
#[cfg(feature = "sqlx")]
mod sqlx_bridge;

use core::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dialect::Dialect;

pub use extractor::{extract_using_regex, extract_using_template, strip_owner};

/// An error as reported by a database driver.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct SqlError {
    /// Vendor error code, 0 when unknown.
    pub error_code: i32,
    /// Five character SQL state.
    pub sql_state: Option<String>,
    /// Driver message.
    pub message: String,
    /// Chained error.
    pub next: Option<Box<SqlError>>,
}

impl SqlError {
    /// Creates an error with a vendor code and message.
    #[must_use]
    pub fn new(error_code: i32, message: impl Into<String>) -> Self {
        Self {
            error_code,
            message: message.into(),
            ..Self::default()
        }
    }

    /// Sets the SQL state.
    #[must_use]
    pub fn with_sql_state(mut self, sql_state: impl Into<String>) -> Self {
        self.sql_state = Some(sql_state.into());
        self
    }

    /// Chains another error.
    #[must_use]
    pub fn with_next(mut self, next: Self) -> Self {
        self.next = Some(Box::new(next));
        self
    }

    /// SQL state of this error, or of the first chained error that has one.
    #[must_use]
    pub fn sql_state(&self) -> Option<&str> {
        match self.sql_state.as_deref() {
            Some(state) if !state.is_empty() => Some(state),
            _ => self.next.as_deref().and_then(Self::sql_state),
        }
    }

    /// First two characters of the SQL state.
    #[must_use]
    pub fn sql_state_class(&self) -> Option<&str> {
        self.sql_state().and_then(|state| state.get(..2))
    }
}

/// Kind of violated constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    NotNull,
    Check,
    Other,
}

/// Classified error category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum JdbcErrorKind {
    ConstraintViolation {
        kind: ConstraintKind,
        constraint_name: Option<String>,
    },
    LockTimeout,
    LockAcquisition,
    PessimisticLock,
    QueryTimeout,
    DataException,
    SqlGrammar,
    Connection,
    Generic,
}

impl JdbcErrorKind {
    /// Short lower-case label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ConstraintViolation { .. } => "constraint violation",
            Self::LockTimeout => "lock timeout",
            Self::LockAcquisition => "lock acquisition",
            Self::PessimisticLock => "pessimistic lock",
            Self::QueryTimeout => "query timeout",
            Self::DataException => "data exception",
            Self::SqlGrammar => "sql grammar",
            Self::Connection => "connection",
            Self::Generic => "generic",
        }
    }

    /// A constraint violation.
    #[must_use]
    pub const fn constraint(kind: ConstraintKind, constraint_name: Option<String>) -> Self {
        Self::ConstraintViolation {
            kind,
            constraint_name,
        }
    }
}

impl fmt::Display for JdbcErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A classified driver error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct JdbcError {
    /// Category.
    pub kind: JdbcErrorKind,
    /// Caller supplied context message.
    pub message: String,
    /// SQL that failed, if known.
    pub sql: Option<String>,
    /// Underlying driver error.
    #[source]
    pub source: SqlError,
}

impl JdbcError {
    /// Creates a classified error.
    #[must_use]
    pub fn new(kind: JdbcErrorKind, error: &SqlError, message: &str, sql: Option<&str>) -> Self {
        Self {
            kind,
            message: message.to_string(),
            sql: sql.map(str::to_string),
            source: error.clone(),
        }
    }
}

/// One link of the conversion chain.
pub trait SqlExceptionConversionDelegate: Send + Sync + fmt::Debug {
    /// Classifies the error, or returns `None` to defer to the next link.
    fn convert(&self, error: &SqlError, message: &str, sql: Option<&str>) -> Option<JdbcError>;
}

/// Delegates to [`Dialect::convert_exception`].
#[derive(Debug)]
pub struct DialectConversionDelegate<'d> {
    dialect: &'d dyn Dialect,
}

impl<'d> DialectConversionDelegate<'d> {
    /// Wraps a dialect.
    #[must_use]
    pub const fn new(dialect: &'d dyn Dialect) -> Self {
        Self { dialect }
    }
}

impl SqlExceptionConversionDelegate for DialectConversionDelegate<'_> {
    fn convert(&self, error: &SqlError, message: &str, sql: Option<&str>) -> Option<JdbcError> {
        self.dialect.convert_exception(error, message, sql)
    }
}

/// Classifies by SQL state class.
#[derive(Debug, Default)]
pub struct SqlStateConversionDelegate<'d> {
    dialect: Option<&'d dyn Dialect>,
}

const INTEGRITY_CLASSES: [&str; 3] = ["23", "27", "44"];
const DATA_CLASSES: [&str; 2] = ["21", "22"];
const GRAMMAR_CLASSES: [&str; 7] = ["07", "20", "2A", "37", "42", "65", "S0"];

impl<'d> SqlStateConversionDelegate<'d> {
    /// Creates a delegate that asks `dialect` for constraint names.
    #[must_use]
    pub const fn new(dialect: Option<&'d dyn Dialect>) -> Self {
        Self { dialect }
    }

    fn constraint_kind(state: &str) -> ConstraintKind {
        match state {
            "23505" => ConstraintKind::Unique,
            "23503" => ConstraintKind::ForeignKey,
            "23502" => ConstraintKind::NotNull,
            "23513" | "23514" => ConstraintKind::Check,
            _ => ConstraintKind::Other,
        }
    }
}

impl SqlExceptionConversionDelegate for SqlStateConversionDelegate<'_> {
    fn convert(&self, error: &SqlError, message: &str, sql: Option<&str>) -> Option<JdbcError> {
        let state = error.sql_state()?;
        let class = error.sql_state_class()?;
        let kind = if matches!(state, "HYT00" | "HYT01" | "70100") {
            JdbcErrorKind::QueryTimeout
        } else if INTEGRITY_CLASSES.contains(&class) {
            let name = self
                .dialect
                .and_then(|dialect| dialect.extract_constraint_name(error));
            JdbcErrorKind::constraint(Self::constraint_kind(state), name)
        } else if DATA_CLASSES.contains(&class) {
            JdbcErrorKind::DataException
        } else if GRAMMAR_CLASSES.contains(&class) {
            JdbcErrorKind::SqlGrammar
        } else if class == "08" {
            JdbcErrorKind::Connection
        } else if class == "40" {
            JdbcErrorKind::LockAcquisition
        } else {
            return None;
        };
        Some(JdbcError::new(kind, error, message, sql))
    }
}

/// Last link: everything is generic.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatchAllConversionDelegate;

impl SqlExceptionConversionDelegate for CatchAllConversionDelegate {
    fn convert(&self, error: &SqlError, message: &str, sql: Option<&str>) -> Option<JdbcError> {
        Some(JdbcError::new(JdbcErrorKind::Generic, error, message, sql))
    }
}

/// Chain of conversion delegates.
#[derive(Debug, Default)]
pub struct SqlExceptionConverter<'d> {
    delegates: Vec<Box<dyn SqlExceptionConversionDelegate + 'd>>,
}

impl<'d> SqlExceptionConverter<'d> {
    /// Creates an empty chain. An empty chain classifies everything as
    /// generic.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard chain for a dialect: dialect codes, SQL state classes,
    /// then catch-all.
    #[must_use]
    pub fn for_dialect(dialect: &'d dyn Dialect) -> Self {
        Self::new()
            .with_delegate(DialectConversionDelegate::new(dialect))
            .with_delegate(SqlStateConversionDelegate::new(Some(dialect)))
            .with_delegate(CatchAllConversionDelegate)
    }

    /// Appends a delegate to the chain.
    #[must_use]
    pub fn with_delegate(mut self, delegate: impl SqlExceptionConversionDelegate + 'd) -> Self {
        self.delegates.push(Box::new(delegate));
        self
    }

    /// Classifies an error.
    #[must_use]
    pub fn convert(&self, error: &SqlError, message: &str, sql: Option<&str>) -> JdbcError {
        for delegate in &self.delegates {
            if let Some(converted) = delegate.convert(error, message, sql) {
                debug!(
                    error_code = error.error_code,
                    sql_state = error.sql_state(),
                    kind = converted.kind.label(),
                    "converted SQL error"
                );
                return converted;
            }
        }
        JdbcError::new(JdbcErrorKind::Generic, error, message, sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_state_falls_back_to_chain() {
        let error = SqlError::new(1, "outer")
            .with_next(SqlError::new(2, "inner").with_sql_state("23505"));
        assert_eq!(error.sql_state(), Some("23505"));
        assert_eq!(error.sql_state_class(), Some("23"));
        assert_eq!(SqlError::new(1, "x").sql_state(), None);
    }

    #[test]
    fn test_sql_state_classes() {
        let delegate = SqlStateConversionDelegate::new(None);
        let convert = |state: &str| {
            delegate
                .convert(&SqlError::new(0, "x").with_sql_state(state), "m", None)
                .map(|e| e.kind)
        };
        assert_eq!(
            convert("23505"),
            Some(JdbcErrorKind::constraint(ConstraintKind::Unique, None))
        );
        assert_eq!(convert("22012"), Some(JdbcErrorKind::DataException));
        assert_eq!(convert("42S02"), Some(JdbcErrorKind::SqlGrammar));
        assert_eq!(convert("08001"), Some(JdbcErrorKind::Connection));
        assert_eq!(convert("40001"), Some(JdbcErrorKind::LockAcquisition));
        assert_eq!(convert("HYT00"), Some(JdbcErrorKind::QueryTimeout));
        assert_eq!(convert("XX000"), None);
    }

    #[test]
    fn test_empty_chain_is_total() {
        let converter =
            SqlExceptionConverter::new().with_delegate(SqlStateConversionDelegate::new(None));
        let converted =
            converter.convert(&SqlError::new(7, "boom"), "insert failed", Some("insert"));
        assert_eq!(converted.kind, JdbcErrorKind::Generic);
        assert_eq!(converted.sql.as_deref(), Some("insert"));
        assert_eq!(converted.to_string(), "generic: insert failed");
    }
}
