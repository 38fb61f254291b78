//! # oxide-dialect-core
//!
//! The contract a database dialect fulfils, and the machinery shared by all
//! dialects.
//!
//! This crate provides:
//! - A small SQL statement tree ([`ast`]) that callers build and dialects render
//! - The [`Dialect`] trait: type names, literals, temporal arithmetic, locking,
//!   DDL fragments, feature flags and error classification, each with an ANSI
//!   default
//! - Row limit handlers ([`pagination`]), sequence and identity column support
//!   ([`sequence`], [`identity`])
//! - A translator ([`translate`]) that writes a statement in a dialect's syntax,
//!   emulating what the database lacks
//! - Classification of vendor errors ([`exception`])
//!
//! ## Translating a statement
//!
//! ```rust
//! use oxide_dialect_core::ast::{Expr, SelectColumn, SelectStatement, Statement, TableRef};
//! use oxide_dialect_core::dialect::{Dialect, GenericDialect};
//! use oxide_dialect_core::pagination::Limit;
//! use oxide_dialect_core::translate::QueryOptions;
//!
//! let mut select = SelectStatement::new(
//!     vec![SelectColumn::new(Expr::column("id"))],
//!     Some(TableRef::table("users")),
//! );
//! select.where_clause = Some(Expr::column("name").eq(Expr::param(1)));
//!
//! let options = QueryOptions::default().with_limit(Limit::new(None, Some(10)));
//! let operation = GenericDialect::new()
//!     .translate(&Statement::Select(select), &options)
//!     .unwrap();
//!
//! assert_eq!(operation.sql, "select id from users where name=? fetch first ? rows only");
//! ```

pub mod ast;
pub mod dialect;
pub mod error;
pub mod exception;
pub mod identity;
pub mod pagination;
pub mod sequence;
pub mod translate;

pub use ast::{Expr, Statement};
pub use dialect::{Capabilities, DatabaseVersion, Dialect, GenericDialect};
pub use error::{DialectError, Result};
pub use exception::{JdbcError, JdbcErrorKind, SqlError, SqlExceptionConverter};
pub use translate::{JdbcOperation, QueryOptions, SqlAstTranslator};
