//! Tests for capability snapshots.

mod common;
use common::*;

use oxide_dialect_core::ast::SqlTypeCode;
use rstest::rstest;

#[rstest]
fn capabilities_are_deterministic(
    #[values(
        "altibase", "cockroach", "cubrid", "db2", "derby", "firebird", "gaussdb", "h2", "hsql",
        "informix", "iris", "oracle", "singlestore", "sinodb", "spanner", "sqlserver", "sybase",
        "teradata"
    )]
    name: &str,
) {
    let first = latest(name).capabilities();
    let second = latest(name).capabilities();
    assert_eq!(first, second);
    assert_eq!(first.column_types.len(), SqlTypeCode::ALL.len());
}

#[test]
fn capabilities_report_the_version() {
    for name in DATABASES {
        let oldest = oldest(name).capabilities();
        assert_eq!(oldest.version, oldest.minimum_version, "{name}");
        let latest = latest(name).capabilities();
        assert!(latest.version >= latest.minimum_version, "{name}");
    }
}

#[test]
fn capabilities_serialize_to_json() {
    let value = serde_json::to_value(latest("cubrid").capabilities()).unwrap();
    assert_eq!(value["name"], "cubrid");
    assert_eq!(value["pagination"]["limit_handler"], "limit-limit");
    assert_eq!(value["features"]["on_duplicate_key"], true);
}

#[test]
fn offset_fetch_follows_the_limit_handler() {
    for name in DATABASES {
        for dialect in version_range(name) {
            let capabilities = dialect.capabilities();
            if capabilities.pagination.supports_offset_fetch_clause {
                assert!(
                    capabilities.pagination.supports_offset,
                    "{} {} claims offset/fetch without offsets",
                    capabilities.name,
                    capabilities.version
                );
            }
        }
    }
}

#[rstest]
#[case("sybase", false)]
#[case("teradata", true)]
#[case("oracle", true)]
#[case("db2", true)]
fn window_functions(#[case] name: &str, #[case] expected: bool) {
    assert_eq!(latest(name).capabilities().features.window_functions, expected);
}
