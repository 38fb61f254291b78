//! Generic SQL dialect.

use super::{DatabaseVersion, Dialect};

/// A generic SQL dialect using ANSI SQL standards.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericDialect;

impl GenericDialect {
    /// Creates a new generic dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for GenericDialect {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn version(&self) -> DatabaseVersion {
        DatabaseVersion::make(0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_dialect() {
        let dialect = GenericDialect::new();
        assert_eq!(dialect.name(), "generic");
        assert_eq!(dialect.open_quote(), '"');
        assert_eq!(dialect.limit_handler().name(), "offset-fetch");
        assert!(dialect.supports_merge());
        assert!(!dialect.supports_conflict_clause());
        assert!(dialect.sequence_support().supports_sequences());
        assert!(!dialect.identity_column_support().supports_identity_columns());
    }
}
