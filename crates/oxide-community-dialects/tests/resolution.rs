//! Tests for picking a dialect from product names and URLs.

mod common;
use common::*;

use oxide_community_dialects::database::{SINGLESTORE_FOR_UPDATE_LOCKING, SINGLESTORE_TABLE_TYPE};
use oxide_community_dialects::{resolve_dialect, CommunityDatabase, DialectResolutionInfo};
use oxide_dialect_core::DatabaseVersion;
use rstest::rstest;

fn resolve(info: &DialectResolutionInfo) -> (String, DatabaseVersion) {
    let dialect =
        resolve_dialect(info).unwrap_or_else(|| panic!("No dialect resolved for {info:?}"));
    (dialect.name().to_string(), dialect.version())
}

#[rstest]
#[case("Altibase", "7.3.0.0.2", "altibase")]
#[case("CockroachDB", "v23.1.11", "cockroach")]
#[case(
    "PostgreSQL",
    "CockroachDB CCL v22.2.5 (x86_64-pc-linux-gnu, built 2023/02/16)",
    "cockroach"
)]
#[case("CUBRID", "11.2.0.0038", "cubrid")]
#[case("DB2/LINUXX8664", "11.5.8", "db2")]
#[case("DB2 UDB for AS/400", "7.4", "db2i")]
#[case("Apache Derby", "10.16.1.1", "derby")]
#[case("Firebird 4.0", "4.0.2", "firebird")]
#[case("GaussDB Kernel", "505.1.0", "gaussdb")]
#[case("openGauss", "5.0.1", "gaussdb")]
#[case("H2", "2.2.224 (2023-09-17)", "h2")]
#[case("HSQL Database Engine", "2.7.2", "hsql")]
#[case("Informix Dynamic Server", "14.10.FC8", "informix")]
#[case("SinoDB Dynamic Server", "16.8", "sinodb")]
#[case("InterSystems IRIS", "2023.1", "iris")]
#[case("Oracle", "21.3.0.0.0", "oracle")]
#[case("Microsoft SQL Server", "16.00.1000", "sqlserver")]
#[case("Adaptive Server Enterprise", "16.0", "sybase")]
#[case("Teradata", "17.20.03.09", "teradata")]
#[case("SingleStore", "8.5.4", "singlestore")]
fn product_names(#[case] product: &str, #[case] version: &str, #[case] expected: &str) {
    let info = DialectResolutionInfo::new(product)
        .with_version_string(version)
        .unwrap();
    let (name, resolved) = resolve(&info);
    assert_eq!(name, expected);
    assert_eq!(resolved, info.version());
}

#[rstest]
#[case("jdbc:altibase://db:20300/mydb", "altibase")]
#[case("jdbc:cockroachdb://db:26257/app", "cockroach")]
#[case("jdbc:cubrid:db:33000:demodb:::", "cubrid")]
#[case("jdbc:db2://db:50000/sample", "db2")]
#[case("jdbc:as400://db/lib", "db2i")]
#[case("jdbc:derby:memory:test;create=true", "derby")]
#[case("jdbc:firebirdsql://db:3050/employee", "firebird")]
#[case("jdbc:gaussdb://db:8000/app", "gaussdb")]
#[case("jdbc:opengauss://db:5432/app", "gaussdb")]
#[case("jdbc:h2:mem:test", "h2")]
#[case("jdbc:hsqldb:mem:test", "hsql")]
#[case("jdbc:informix-sqli://db:9088/stores:INFORMIXSERVER=ol", "informix")]
#[case("jdbc:sinodb-sqli://db:9088/stores", "sinodb")]
#[case("jdbc:IRIS://db:1972/USER", "iris")]
#[case("jdbc:oracle:thin:@db:1521/xe", "oracle")]
#[case("jdbc:cloudspanner:/projects/p/instances/i/databases/app", "spanner")]
#[case("jdbc:sqlserver://db:1433;databaseName=app", "sqlserver")]
#[case("jdbc:jtds:sybase://db:5000/app", "sybase")]
#[case("jdbc:teradata://db/DATABASE=app", "teradata")]
#[case("jdbc:singlestore://db:3306/app", "singlestore")]
fn urls(#[case] url: &str, #[case] expected: &str) {
    let dialect = resolve_dialect(&DialectResolutionInfo::from_url(url))
        .unwrap_or_else(|| panic!("No dialect resolved for {url}"));
    assert_eq!(dialect.name(), expected);
    assert_eq!(dialect.version(), dialect.minimum_version());
}

#[test]
fn db2_on_zos_reports_packed_versions() {
    let info = DialectResolutionInfo::new("DB2")
        .with_version_string("DSN12015")
        .unwrap();
    let (name, version) = resolve(&info);
    assert_eq!(name, "db2zos");
    assert_eq!(version, DatabaseVersion::new(12, 1, 5));
}

#[test]
fn unknown_products_resolve_to_nothing() {
    assert!(resolve_dialect(&DialectResolutionInfo::new("PostgreSQL")).is_none());
    assert!(resolve_dialect(&DialectResolutionInfo::from_url("jdbc:postgresql://db/app")).is_none());
    assert!(resolve_dialect(&DialectResolutionInfo::default()).is_none());
}

#[rstest]
#[case("Google Cloud Spanner")]
#[case("Spanner")]
fn spanner_ignores_the_reported_version(#[case] product: &str) {
    let info = DialectResolutionInfo::new(product)
        .with_version_string("1.0")
        .unwrap();
    let (name, version) = resolve(&info);
    assert_eq!(name, "spanner");
    assert_eq!(version, DatabaseVersion::make(15, 0));
}

#[test]
fn postgresql_banners_without_cockroach_stay_unresolved() {
    let info = DialectResolutionInfo {
        product_version: Some("PostgreSQL 15.4 on x86_64-pc-linux-gnu".into()),
        ..DialectResolutionInfo::new("PostgreSQL")
    };
    assert!(resolve_dialect(&info).is_none());
}

#[test]
fn old_versions_still_resolve() {
    let info = DialectResolutionInfo::new("Teradata").with_version(DatabaseVersion::make(13, 0));
    let (name, version) = resolve(&info);
    assert_eq!(name, "teradata");
    assert_eq!(version, DatabaseVersion::make(13, 0));
}

#[test]
fn single_store_settings_reach_the_dialect() {
    let info = DialectResolutionInfo::new("SingleStore")
        .with_version_string("8.5")
        .unwrap()
        .with_setting(SINGLESTORE_FOR_UPDATE_LOCKING, "true")
        .with_setting(SINGLESTORE_TABLE_TYPE, "rowstore");
    let dialect = resolve_dialect(&info).unwrap();
    assert_eq!(dialect.for_update_string(), " for update");
}

#[test]
fn metadata_round_trips_through_json() {
    let info: DialectResolutionInfo = serde_json::from_str(
        r#"{"product_name":"Oracle","major":19,"url":"jdbc:oracle:thin:@db:1521/orcl"}"#,
    )
    .unwrap();
    assert_eq!(info.version(), DatabaseVersion::make(19, 0));
    assert_eq!(resolve(&info).0, "oracle");
}

#[test]
fn database_metadata() {
    assert_eq!(CommunityDatabase::ALL.len(), DATABASES.len());
    for name in DATABASES {
        let database = database(name);
        assert!(CommunityDatabase::ALL.contains(&database), "{name}");
        assert!(database.matches_url(database.url_prefix()), "{database}");
        assert!(!database.driver_class_name().is_empty(), "{database}");
        assert_eq!(database.to_string().parse::<CommunityDatabase>().unwrap(), database);
        let info = DialectResolutionInfo::from_url(database.url_prefix())
            .with_version_string(latest_version(name))
            .unwrap();
        assert_eq!(resolve(&info).1, latest(name).version(), "{name}");
    }
}
