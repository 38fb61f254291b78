//! Error types for the dialect CLI.

use std::path::PathBuf;

use oxide_dialect_core::DialectError;

/// Errors that can occur while running a command.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Neither a database name nor a URL was given.
    #[error("A database is required: pass --database or --url")]
    MissingDatabase,

    /// No community database matches the metadata.
    #[error("No community dialect matches '{0}'")]
    Unresolved(String),

    /// A setting was not written as `key=value`.
    #[error("Invalid setting '{0}', expected key=value")]
    InvalidSetting(String),

    /// The dialect rejected the request.
    #[error(transparent)]
    Dialect(#[from] DialectError),

    /// The statement file is not valid JSON for a statement.
    #[error("Invalid statement JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The statement file could not be read.
    #[error("Failed to read '{path}': {source}")]
    Read {
        /// Path of the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type for CLI commands.
pub type Result<T> = std::result::Result<T, CliError>;
