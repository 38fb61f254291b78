//! SinoDB, a product on the Informix engine with its own version numbering.

use oxide_dialect_core::dialect::DatabaseVersion;

use super::informix::{InformixFamily, InformixFlavor};

/// SinoDB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinoDb;

impl InformixFlavor for SinoDb {
    const NAME: &'static str = "sinodb";
    const MINIMUM_VERSION: DatabaseVersion = DatabaseVersion::make(16, 8);

    // every supported release ships the 12.10 engine
    fn engine_version(_version: DatabaseVersion) -> DatabaseVersion {
        DatabaseVersion::make(12, 10)
    }
}

/// SinoDB dialect.
pub type SinoDbDialect = InformixFamily<SinoDb>;

#[cfg(test)]
mod tests {
    use oxide_dialect_core::ast::SqlTypeCode;
    use oxide_dialect_core::dialect::Dialect;
    use oxide_dialect_core::exception::{ConstraintKind, JdbcErrorKind, SqlError};

    use super::*;

    #[test]
    fn test_identity() {
        let dialect = SinoDbDialect::default();
        assert_eq!(dialect.name(), "sinodb");
        assert_eq!(dialect.version(), DatabaseVersion::make(16, 8));
        assert_eq!(dialect.minimum_version(), SinoDbDialect::MINIMUM_VERSION);
    }

    #[test]
    fn test_modern_engine_features() {
        let dialect = SinoDbDialect::default();
        assert!(dialect.supports_window_functions());
        assert!(dialect.supports_null_precedence());
        assert!(dialect.sequence_support().supports_pooled_sequences());
        assert_eq!(dialect.limit_handler().name(), "skip-first");
        assert_eq!(dialect.column_type(SqlTypeCode::Bigint), "int8");
    }

    #[test]
    fn test_shares_informix_error_codes() {
        let error = SqlError::new(-268, "Unique constraint (sinodb.u_code) violated.");
        let converted = SinoDbDialect::default()
            .convert_exception(&error, "insert", None)
            .unwrap();
        assert_eq!(
            converted.kind,
            JdbcErrorKind::constraint(ConstraintKind::Unique, Some("u_code".into()))
        );
    }
}
