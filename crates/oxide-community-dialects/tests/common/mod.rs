#![allow(dead_code)]

use oxide_community_dialects::{CommunityDatabase, DialectResolutionInfo};
use oxide_dialect_core::exception::{JdbcError, SqlError};
use oxide_dialect_core::pagination::Limit;
use oxide_dialect_core::Dialect;

/// Every database name, for `#[values]` lists.
pub const DATABASES: [&str; 18] = [
    "altibase",
    "cockroach",
    "cubrid",
    "db2",
    "derby",
    "firebird",
    "gaussdb",
    "h2",
    "hsql",
    "informix",
    "iris",
    "oracle",
    "singlestore",
    "sinodb",
    "spanner",
    "sqlserver",
    "sybase",
    "teradata",
];

/// A recent release of each database.
pub fn latest_version(database: &str) -> &'static str {
    match database {
        "altibase" => "7.3.0",
        "cockroach" => "23.1.11",
        "cubrid" => "11.2.0",
        "db2" => "11.5.8",
        "derby" => "10.16.1",
        "firebird" => "4.0.2",
        "gaussdb" => "5.0.1",
        "h2" => "2.2.224",
        "hsql" => "2.7.2",
        "informix" => "14.10.FC8",
        "iris" => "2023.1",
        "oracle" => "21.3.0",
        "singlestore" => "8.5.0",
        "sinodb" => "16.8",
        "spanner" => "15.0",
        "sqlserver" => "16.0.1000",
        "sybase" => "16.0",
        "teradata" => "17.20",
        other => panic!("Unknown database: {other}"),
    }
}

pub fn database(name: &str) -> CommunityDatabase {
    name.parse()
        .unwrap_or_else(|e| panic!("Unknown database: {name}\nError: {e:?}"))
}

/// Dialect of `name` at `version`.
pub fn dialect(name: &str, version: &str) -> Box<dyn Dialect> {
    let info = DialectResolutionInfo::default()
        .with_version_string(version)
        .unwrap_or_else(|e| panic!("Invalid version: {version}\nError: {e:?}"));
    database(name).create_dialect(&info)
}

/// Dialect of `name` at its oldest supported version.
pub fn oldest(name: &str) -> Box<dyn Dialect> {
    database(name).create_dialect(&DialectResolutionInfo::default())
}

/// Dialect of `name` at a recent version.
pub fn latest(name: &str) -> Box<dyn Dialect> {
    dialect(name, latest_version(name))
}

/// Both ends of the supported version range.
pub fn version_range(name: &str) -> [Box<dyn Dialect>; 2] {
    [oldest(name), latest(name)]
}

/// Checks that a temporal pattern only uses `?1`, `?2` and `?3` and
/// reads both operands.
pub fn assert_temporal_placeholders(pattern: &str) {
    for (index, _) in pattern.match_indices('?') {
        let next = pattern[index + 1..].chars().next();
        assert!(
            matches!(next, Some('1'..='3')),
            "Stray placeholder at {index} in: {pattern}"
        );
    }
    assert!(pattern.contains("?2"), "Missing ?2 in: {pattern}");
    assert!(pattern.contains("?3"), "Missing ?3 in: {pattern}");
}

pub fn vendor_error(code: i32, sql_state: Option<&str>, message: &str) -> SqlError {
    let error = SqlError::new(code, message);
    match sql_state {
        Some(state) => error.with_sql_state(state),
        None => error,
    }
}

/// Converts a vendor error, panicking when the dialect does not know it.
pub fn convert(dialect: &dyn Dialect, error: &SqlError) -> JdbcError {
    dialect
        .convert_exception(error, "could not execute statement", Some("update t set a=?"))
        .unwrap_or_else(|| panic!("{} left {error:?} unclassified", dialect.name()))
}

pub fn limit_sql(dialect: &dyn Dialect, sql: &str, first: u64, max: u64) -> String {
    dialect
        .limit_handler()
        .process_sql(sql, &Limit::new(Some(first), Some(max)))
        .unwrap_or_else(|e| panic!("{} failed to limit: {sql}\nError: {e:?}", dialect.name()))
        .sql
}
