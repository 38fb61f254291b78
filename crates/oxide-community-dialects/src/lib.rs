//! # oxide-community-dialects
//!
//! Dialects for the community supported databases, built on
//! `oxide-dialect-core`.
//!
//! Each dialect turns the portable AST into SQL its database accepts,
//! reports what the database can do and classifies the errors it raises.
//! [`resolve_dialect`] picks one from what a driver reports.
//!
//! # How the databases differ
//!
//! - **Pagination**: Oracle, DB2, Derby and SQL Server 2012+ use
//!   `offset ? rows fetch next ? rows only`; Informix and Firebird put
//!   `skip ? first ?` after `select`; Sybase and Teradata only know
//!   `top`, so offsets are emulated with `row_number()` where window
//!   functions exist; CUBRID and GaussDB use MySQL's `limit ?, ?`;
//!   CockroachDB and Spanner follow PostgreSQL.
//! - **Locking**: most use `for update`, SQL Server and Sybase put lock
//!   hints after the table name and Teradata prefixes the whole query
//!   with `locking row for write`.
//! - **Temporal arithmetic**: every dialect renders `timestampadd` and
//!   `timestampdiff` from a pattern where `?1` is the unit, `?2` the
//!   magnitude or start and `?3` the date or end.
//! - **Booleans**: Oracle, DB2 before 11.1, Sybase and
//!   Teradata have no boolean type and store numbers or characters.
//! - **Sequences**: DB2, Oracle, H2, HSQLDB, Derby, Firebird, Informix,
//!   CUBRID serials, Altibase, SQL Server 2012+ and the PostgreSQL
//!   family have them, Spanner only bit-reversed ones; Sybase,
//!   Teradata and SingleStore rely on identity columns.
//!
//! ## Example
//!
//! ```rust
//! use oxide_community_dialects::{resolve_dialect, DialectResolutionInfo};
//! use oxide_dialect_core::Dialect;
//!
//! let info = DialectResolutionInfo::new("Informix Dynamic Server")
//!     .with_version_string("14.10.FC8")
//!     .unwrap();
//! let dialect = resolve_dialect(&info).unwrap();
//! assert_eq!(dialect.name(), "informix");
//! assert_eq!(dialect.version().to_string(), "14.10.0");
//! ```

pub mod database;
pub mod dialect;

pub use database::{resolve_dialect, CommunityDatabase, DialectResolutionInfo};
pub use dialect::{
    AltibaseDialect, CockroachDialect, CubridDialect, Db2Dialect, Db2Platform, DerbyDialect,
    FirebirdDialect, GaussDbDialect, H2Dialect, HsqlDialect, InformixDialect, IrisDialect,
    OracleDialect, SingleStoreDialect, SingleStoreTableType, SinoDbDialect, SpannerDialect,
    SqlServerDialect, SybaseDialect, TeradataDialect,
};
