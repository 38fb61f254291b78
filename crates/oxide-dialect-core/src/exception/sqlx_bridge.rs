//! Bridge from `sqlx` database errors.

use std::borrow::Cow;

use sqlx::error::DatabaseError;

use super::SqlError;

impl SqlError {
    /// Builds a [`SqlError`] from a `sqlx` database error.
    ///
    /// A numeric driver code becomes the vendor error code; a five
    /// character code is kept as the SQL state.
    #[must_use]
    pub fn from_database_error(error: &dyn DatabaseError) -> Self {
        let code = error.code().map(Cow::into_owned);
        let error_code = code
            .as_deref()
            .and_then(|c| c.parse::<i32>().ok())
            .unwrap_or_default();
        let sql_state = code.filter(|c| c.len() == 5);
        Self {
            error_code,
            sql_state,
            message: error.message().to_string(),
            next: None,
        }
    }

    /// Builds a [`SqlError`] from a `sqlx` error, if it came from the
    /// database.
    #[must_use]
    pub fn from_sqlx(error: &sqlx::Error) -> Option<Self> {
        error.as_database_error().map(Self::from_database_error)
    }
}
