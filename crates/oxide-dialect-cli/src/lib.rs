//! Command-line inspection of the community SQL dialects.
//!
//! `oxide-dialect` answers the questions an application asks a dialect
//! without needing a live database:
//!
//! - **resolve**: which dialect a product name or JDBC URL maps to, and
//!   whether its version is supported
//! - **capabilities**: the full flag and limit snapshot, as JSON
//! - **column-type**: the DDL type for a generic type code
//! - **patterns**: `extract`, `timestampadd` and `timestampdiff` patterns
//! - **classify**: the category of a vendor error code
//! - **translate**: SQL for a JSON encoded statement
//! - **sequence**: next value and DDL strings for a sequence
//!
//! # CLI Usage
//!
//! ```bash
//! # Which dialect does this URL need?
//! oxide-dialect --url jdbc:informix-sqli://db:9088/stores resolve
//!
//! # Column type on SQL Server 2019
//! oxide-dialect -d sqlserver --dialect-version 15.0 column-type timestamp
//!
//! # Paginate a statement for Teradata
//! OXIDE_DIALECT=teradata oxide-dialect translate query.json --limit 10
//! ```

pub mod commands;
pub mod error;

pub use commands::DialectSelector;
pub use error::{CliError, Result};
