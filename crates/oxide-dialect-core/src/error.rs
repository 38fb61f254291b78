//! Error types for dialect operations and SQL translation.

/// Errors raised while asking a dialect for SQL or translating a statement.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DialectError {
    /// The construct has no representation in the target dialect.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// An illegal temporal unit, conversion or other semantic problem.
    #[error("Semantic error: {0}")]
    Semantic(String),

    /// The dialect cannot map the requested generator (sequence, identity).
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// A database version string could not be parsed.
    #[error("Invalid database version: {0}")]
    InvalidVersion(String),

    /// Arguments did not match what a function pattern expects.
    #[error("Function '{name}' expects {expected} argument(s), got {actual}")]
    ArgumentCount {
        /// Function name.
        name: String,
        /// Expected argument count.
        expected: usize,
        /// Actual argument count.
        actual: usize,
    },
}

impl DialectError {
    /// Creates an [`DialectError::Unsupported`] error naming the dialect.
    #[must_use]
    pub fn unsupported(dialect: &str, what: impl core::fmt::Display) -> Self {
        Self::Unsupported(format!("{what} is not supported by {dialect}"))
    }
}

/// Result type for dialect operations.
pub type Result<T> = std::result::Result<T, DialectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_message() {
        let err = DialectError::unsupported("Informix", "INTERSECT");
        assert_eq!(
            err.to_string(),
            "Unsupported operation: INTERSECT is not supported by Informix"
        );
    }
}
