//! Detection of the community databases from connection metadata.
//!
//! [`resolve_dialect`] looks at the product name a driver reports first
//! and falls back to the connection URL, so a connection string alone is
//! enough to pick a dialect.

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;

use oxide_dialect_core::dialect::{DatabaseVersion, Dialect};
use oxide_dialect_core::{DialectError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dialect::{
    AltibaseDialect, CockroachDialect, CubridDialect, Db2Dialect, Db2Platform, DerbyDialect,
    FirebirdDialect, GaussDbDialect, H2Dialect, HsqlDialect, InformixDialect, IrisDialect,
    OracleDialect, SingleStoreDialect, SingleStoreTableType, SinoDbDialect, SpannerDialect,
    SqlServerDialect, SybaseDialect, TeradataDialect,
};

/// Setting holding the SingleStore table type, `rowstore` or `columnstore`.
pub const SINGLESTORE_TABLE_TYPE: &str = "singlestore.table_type";

/// Setting enabling `for update` on SingleStore.
pub const SINGLESTORE_FOR_UPDATE_LOCKING: &str = "singlestore.for_update_lock_enabled";

/// What is known about a connection when choosing its dialect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialectResolutionInfo {
    /// Product name reported by the driver.
    pub product_name: String,
    /// Product version string reported by the driver.
    pub product_version: Option<String>,
    /// Major version.
    pub major: u16,
    /// Minor version.
    pub minor: u16,
    /// Micro version.
    pub micro: u16,
    /// Connection URL.
    pub url: Option<String>,
    /// Dialect settings.
    pub settings: BTreeMap<String, String>,
}

impl DialectResolutionInfo {
    /// Creates resolution info for a product name.
    #[must_use]
    pub fn new(product_name: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            ..Self::default()
        }
    }

    /// Creates resolution info knowing only the connection URL.
    #[must_use]
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Sets the version components.
    #[must_use]
    pub const fn with_version(mut self, version: DatabaseVersion) -> Self {
        self.major = version.major;
        self.minor = version.minor;
        self.micro = version.micro;
        self
    }

    /// Sets the version string and the components parsed from it.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::InvalidVersion`] when no version number can
    /// be read from the string. CockroachDB's `CockroachDB CCL v21.2.10 ...`
    /// banners are read from their `v` word.
    pub fn with_version_string(mut self, version: &str) -> Result<Self> {
        let parsed = match version.parse::<DatabaseVersion>() {
            Ok(parsed) => parsed,
            Err(error) => CockroachDialect::parse_version(version).ok_or(error)?,
        };
        self.product_version = Some(version.to_string());
        Ok(self.with_version(parsed))
    }

    /// Sets the connection URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Adds a dialect setting.
    #[must_use]
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// The version as a [`DatabaseVersion`].
    #[must_use]
    pub const fn version(&self) -> DatabaseVersion {
        DatabaseVersion::new(self.major, self.minor, self.micro)
    }

    /// Value of a dialect setting.
    #[must_use]
    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    /// The version, or `minimum` when no version is known.
    fn version_or(&self, minimum: DatabaseVersion) -> DatabaseVersion {
        let version = self.version();
        if version == DatabaseVersion::default() {
            debug!(%minimum, "no version given, assuming the oldest supported one");
            minimum
        } else {
            version
        }
    }
}

/// How a product identifies itself.
struct Product {
    name: &'static str,
    /// Product names, compared ignoring case.
    product_names: &'static [&'static str],
    /// Whether a product name only has to start with one of the names.
    prefix: bool,
    url_prefixes: &'static [&'static str],
    driver: &'static str,
}

/// The community supported databases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunityDatabase {
    /// Altibase.
    Altibase,
    /// CockroachDB.
    Cockroach,
    /// CUBRID.
    Cubrid,
    /// IBM DB2 on every platform.
    Db2,
    /// Apache Derby.
    Derby,
    /// Firebird.
    Firebird,
    /// GaussDB and openGauss.
    GaussDb,
    /// H2.
    H2,
    /// HyperSQL.
    Hsql,
    /// IBM Informix.
    Informix,
    /// InterSystems IRIS.
    Iris,
    /// Oracle.
    Oracle,
    /// SingleStore.
    SingleStore,
    /// SinoDB.
    SinoDb,
    /// Google Cloud Spanner through its PostgreSQL interface.
    Spanner,
    /// Microsoft SQL Server.
    SqlServer,
    /// Sybase ASE.
    Sybase,
    /// Teradata.
    Teradata,
}

/// Product data, in the order of [`CommunityDatabase::ALL`].
static PRODUCTS: [Product; 18] = [
    Product {
        name: "altibase",
        product_names: &["Altibase"],
        prefix: false,
        url_prefixes: &["jdbc:altibase:"],
        driver: "Altibase.jdbc.driver.AltibaseDriver",
    },
    Product {
        name: "cockroach",
        product_names: &["CockroachDB"],
        prefix: true,
        url_prefixes: &["jdbc:cockroachdb:"],
        driver: "org.postgresql.Driver",
    },
    Product {
        name: "cubrid",
        product_names: &["CUBRID"],
        prefix: false,
        url_prefixes: &["jdbc:cubrid:"],
        driver: "cubrid.jdbc.driver.CUBRIDDriver",
    },
    Product {
        name: "db2",
        product_names: &["DB2"],
        prefix: true,
        url_prefixes: &["jdbc:db2:", "jdbc:as400:"],
        driver: "com.ibm.db2.jcc.DB2Driver",
    },
    Product {
        name: "derby",
        product_names: &["Apache Derby"],
        prefix: false,
        url_prefixes: &["jdbc:derby:"],
        driver: "org.apache.derby.jdbc.EmbeddedDriver",
    },
    Product {
        name: "firebird",
        product_names: &["Firebird"],
        prefix: true,
        url_prefixes: &["jdbc:firebirdsql:", "jdbc:firebird:"],
        driver: "org.firebirdsql.jdbc.FBDriver",
    },
    Product {
        name: "gaussdb",
        product_names: &["GaussDB", "openGauss"],
        prefix: true,
        url_prefixes: &["jdbc:gaussdb:", "jdbc:opengauss:"],
        driver: "com.huawei.gaussdb.jdbc.Driver",
    },
    Product {
        name: "h2",
        product_names: &["H2"],
        prefix: false,
        url_prefixes: &["jdbc:h2:"],
        driver: "org.h2.Driver",
    },
    Product {
        name: "hsql",
        product_names: &["HSQL Database Engine"],
        prefix: false,
        url_prefixes: &["jdbc:hsqldb:"],
        driver: "org.hsqldb.jdbc.JDBCDriver",
    },
    Product {
        name: "informix",
        product_names: &["Informix", "IBM Informix"],
        prefix: true,
        url_prefixes: &["jdbc:informix-sqli:", "jdbc:informix-direct:"],
        driver: "com.informix.jdbc.IfxDriver",
    },
    Product {
        name: "iris",
        product_names: &["InterSystems IRIS"],
        prefix: true,
        url_prefixes: &["jdbc:iris:"],
        driver: "com.intersystems.jdbc.IRISDriver",
    },
    Product {
        name: "oracle",
        product_names: &["Oracle"],
        prefix: false,
        url_prefixes: &["jdbc:oracle:"],
        driver: "oracle.jdbc.OracleDriver",
    },
    Product {
        name: "singlestore",
        product_names: &["SingleStore", "MemSQL"],
        prefix: false,
        url_prefixes: &["jdbc:singlestore:"],
        driver: "com.singlestore.jdbc.Driver",
    },
    Product {
        name: "sinodb",
        product_names: &["SinoDB"],
        prefix: true,
        url_prefixes: &["jdbc:sinodb-sqli:"],
        driver: "com.sinodbms.jdbc.IfxDriver",
    },
    Product {
        name: "spanner",
        product_names: &["Google Cloud Spanner", "Spanner"],
        prefix: false,
        url_prefixes: &["jdbc:cloudspanner:"],
        driver: "com.google.cloud.spanner.jdbc.JdbcDriver",
    },
    Product {
        name: "sqlserver",
        product_names: &["Microsoft SQL Server"],
        prefix: true,
        url_prefixes: &["jdbc:sqlserver:", "jdbc:jtds:sqlserver:"],
        driver: "com.microsoft.sqlserver.jdbc.SQLServerDriver",
    },
    Product {
        name: "sybase",
        product_names: &["Adaptive Server Enterprise", "ASE", "Sybase SQL Server"],
        prefix: false,
        url_prefixes: &["jdbc:sybase:", "jdbc:jtds:sybase:"],
        driver: "com.sybase.jdbc4.jdbc.SybDriver",
    },
    Product {
        name: "teradata",
        product_names: &["Teradata"],
        prefix: false,
        url_prefixes: &["jdbc:teradata:"],
        driver: "com.teradata.jdbc.TeraDriver",
    },
];

impl CommunityDatabase {
    /// Every database, in detection order.
    pub const ALL: [Self; 18] = [
        Self::Altibase,
        Self::Cockroach,
        Self::Cubrid,
        Self::Db2,
        Self::Derby,
        Self::Firebird,
        Self::GaussDb,
        Self::H2,
        Self::Hsql,
        Self::Informix,
        Self::Iris,
        Self::Oracle,
        Self::SingleStore,
        Self::SinoDb,
        Self::Spanner,
        Self::SqlServer,
        Self::Sybase,
        Self::Teradata,
    ];

    const fn product(self) -> &'static Product {
        &PRODUCTS[self as usize]
    }

    /// Short lower-case name, also the dialect name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.product().name
    }

    /// Returns true if a driver reporting `product_name` talks to this
    /// database.
    #[must_use]
    pub fn matches_product_name(self, product_name: &str) -> bool {
        let product = self.product();
        let product_name = product_name.trim();
        product.product_names.iter().any(|name| {
            if product.prefix {
                starts_with_ignore_case(product_name, name)
            } else {
                product_name.eq_ignore_ascii_case(name)
            }
        })
    }

    /// Returns true if `url` connects to this database.
    #[must_use]
    pub fn matches_url(self, url: &str) -> bool {
        self.product()
            .url_prefixes
            .iter()
            .any(|prefix| starts_with_ignore_case(url.trim(), prefix))
    }

    /// Canonical URL prefix.
    #[must_use]
    pub const fn url_prefix(self) -> &'static str {
        self.product().url_prefixes[0]
    }

    /// Class name of the usual JDBC driver.
    #[must_use]
    pub const fn driver_class_name(self) -> &'static str {
        self.product().driver
    }

    /// Database whose product name is `product_name`.
    #[must_use]
    pub fn from_product_name(product_name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|database| database.matches_product_name(product_name))
    }

    /// Database `url` connects to.
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|database| database.matches_url(url))
    }

    /// Database described by `info`, by product name first and URL second.
    /// CockroachDB speaks the PostgreSQL protocol, so its driver reports
    /// `PostgreSQL` with a `CockroachDB ...` version string.
    #[must_use]
    pub fn detect(info: &DialectResolutionInfo) -> Option<Self> {
        Self::from_product_name(&info.product_name)
            .or_else(|| {
                let version = info.product_version.as_deref()?;
                (info.product_name.trim().eq_ignore_ascii_case("PostgreSQL")
                    && Self::Cockroach.matches_product_name(version))
                .then_some(Self::Cockroach)
            })
            .or_else(|| info.url.as_deref().and_then(Self::from_url))
    }

    /// Creates the dialect for the version in `info`, or for the oldest
    /// supported version when `info` carries none.
    #[must_use]
    pub fn create_dialect(self, info: &DialectResolutionInfo) -> Box<dyn Dialect> {
        match self {
            Self::Altibase => Box::new(AltibaseDialect::new(
                info.version_or(AltibaseDialect::MINIMUM_VERSION),
            )),
            Self::Cockroach => Box::new(CockroachDialect::new(
                info.version_or(CockroachDialect::MINIMUM_VERSION),
            )),
            Self::Cubrid => Box::new(CubridDialect::new(
                info.version_or(CubridDialect::MINIMUM_VERSION),
            )),
            Self::Db2 => {
                let platform = db2_platform(info);
                Box::new(Db2Dialect::for_platform(
                    platform,
                    info.version_or(platform.minimum_version()),
                ))
            }
            Self::Derby => Box::new(DerbyDialect::new(info.version_or(DerbyDialect::MINIMUM_VERSION))),
            Self::Firebird => Box::new(FirebirdDialect::new(
                info.version_or(FirebirdDialect::MINIMUM_VERSION),
            )),
            Self::GaussDb => Box::new(GaussDbDialect::new(
                info.version_or(GaussDbDialect::MINIMUM_VERSION),
            )),
            Self::H2 => Box::new(H2Dialect::new(info.version_or(H2Dialect::MINIMUM_VERSION))),
            Self::Hsql => Box::new(HsqlDialect::new(info.version_or(HsqlDialect::MINIMUM_VERSION))),
            Self::Informix => Box::new(InformixDialect::new(
                info.version_or(InformixDialect::MINIMUM_VERSION),
            )),
            Self::Iris => Box::new(IrisDialect::new(info.version_or(IrisDialect::MINIMUM_VERSION))),
            Self::Oracle => Box::new(OracleDialect::new(
                info.version_or(OracleDialect::MINIMUM_VERSION),
            )),
            Self::SingleStore => Box::new(single_store(info)),
            Self::SinoDb => Box::new(SinoDbDialect::new(
                info.version_or(SinoDbDialect::MINIMUM_VERSION),
            )),
            // one version, whatever the server reports
            Self::Spanner => Box::new(SpannerDialect::new()),
            Self::SqlServer => Box::new(SqlServerDialect::new(
                info.version_or(SqlServerDialect::MINIMUM_VERSION),
            )),
            Self::Sybase => Box::new(SybaseDialect::new(
                info.version_or(SybaseDialect::MINIMUM_VERSION),
            )),
            Self::Teradata => Box::new(TeradataDialect::new(
                info.version_or(TeradataDialect::MINIMUM_VERSION),
            )),
        }
    }
}

impl fmt::Display for CommunityDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CommunityDatabase {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|database| database.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DialectError::Semantic(format!("unknown database '{s}'")))
    }
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// z/OS reports `DSNvvrrm` versions; IBM i reports its own product name.
fn db2_platform(info: &DialectResolutionInfo) -> Db2Platform {
    let version = info.product_version.as_deref().unwrap_or_default().trim();
    if starts_with_ignore_case(version, "DSN") {
        Db2Platform::ZOs
    } else if starts_with_ignore_case(&info.product_name, "DB2 UDB for AS/400")
        || info
            .url
            .as_deref()
            .is_some_and(|url| starts_with_ignore_case(url, "jdbc:as400:"))
    {
        Db2Platform::ISeries
    } else {
        Db2Platform::Luw
    }
}

fn single_store(info: &DialectResolutionInfo) -> SingleStoreDialect {
    let mut dialect =
        SingleStoreDialect::new(info.version_or(SingleStoreDialect::MINIMUM_VERSION));
    if let Some(value) = info.setting(SINGLESTORE_TABLE_TYPE) {
        match value.parse::<SingleStoreTableType>() {
            Ok(table_type) => dialect = dialect.with_table_type(table_type),
            Err(error) => warn!(%error, "ignoring {SINGLESTORE_TABLE_TYPE}"),
        }
    }
    if let Some(value) = info.setting(SINGLESTORE_FOR_UPDATE_LOCKING) {
        dialect = dialect.with_for_update_locking(value.trim().eq_ignore_ascii_case("true"));
    }
    dialect
}

/// Picks the dialect for a connection.
///
/// Product names are tried before URLs. Returns `None` when no community
/// database matches. A version older than the dialect supports is
/// logged and used anyway.
#[must_use]
pub fn resolve_dialect(info: &DialectResolutionInfo) -> Option<Box<dyn Dialect>> {
    let database = CommunityDatabase::detect(info)?;
    let dialect = database.create_dialect(info);
    if dialect.version() < dialect.minimum_version() {
        warn!(
            database = %database,
            version = %dialect.version(),
            minimum = %dialect.minimum_version(),
            "database version is older than the dialect supports"
        );
    }
    debug!(database = %database, version = %dialect.version(), "resolved dialect");
    Some(dialect)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_name_matching() {
        assert!(CommunityDatabase::Db2.matches_product_name("DB2/LINUXX8664"));
        assert!(CommunityDatabase::SqlServer.matches_product_name("Microsoft SQL Server"));
        assert!(CommunityDatabase::Oracle.matches_product_name("oracle"));
        assert!(!CommunityDatabase::Oracle.matches_product_name("Oracle Rdb"));
        assert!(!CommunityDatabase::H2.matches_product_name("HSQL Database Engine"));
    }

    #[test]
    fn test_url_matching() {
        assert!(CommunityDatabase::Informix.matches_url("jdbc:informix-sqli://db:9088/app"));
        assert!(CommunityDatabase::Sybase.matches_url("jdbc:jtds:sybase://db:5000/app"));
        assert!(CommunityDatabase::Altibase.matches_url("jdbc:Altibase://db:20300/mydb"));
        assert!(!CommunityDatabase::SqlServer.matches_url("jdbc:jtds:sybase://db"));
        assert_eq!(CommunityDatabase::Teradata.url_prefix(), "jdbc:teradata:");
    }

    #[test]
    fn test_names_round_trip() {
        for database in CommunityDatabase::ALL {
            assert_eq!(database.name().parse::<CommunityDatabase>().unwrap(), database);
        }
        assert!("postgresql".parse::<CommunityDatabase>().is_err());
    }

    #[test]
    fn test_db2_platforms() {
        let zos = DialectResolutionInfo::new("DB2")
            .with_version_string("DSN12015")
            .unwrap();
        assert_eq!(db2_platform(&zos), Db2Platform::ZOs);
        assert_eq!(zos.version(), DatabaseVersion::new(12, 1, 5));

        let iseries = DialectResolutionInfo::new("DB2 UDB for AS/400");
        assert_eq!(db2_platform(&iseries), Db2Platform::ISeries);
        assert_eq!(db2_platform(&DialectResolutionInfo::new("DB2/NT64")), Db2Platform::Luw);
    }

    #[test]
    fn test_single_store_settings() {
        let info = DialectResolutionInfo::new("SingleStore")
            .with_setting(SINGLESTORE_TABLE_TYPE, "columnstore")
            .with_setting(SINGLESTORE_FOR_UPDATE_LOCKING, "true");
        let dialect = single_store(&info);
        assert_eq!(dialect.table_type(), Some(SingleStoreTableType::Columnstore));
        assert!(dialect.is_for_update_locking_enabled());

        let ignored = single_store(
            &DialectResolutionInfo::new("SingleStore").with_setting(SINGLESTORE_TABLE_TYPE, "heap"),
        );
        assert_eq!(ignored.table_type(), None);
    }

    #[test]
    fn test_missing_version_uses_minimum() {
        let dialect = CommunityDatabase::Teradata.create_dialect(&DialectResolutionInfo::new("Teradata"));
        assert_eq!(dialect.version(), TeradataDialect::MINIMUM_VERSION);
    }

    #[test]
    fn test_resolve_prefers_product_name() {
        let info = DialectResolutionInfo::new("Apache Derby")
            .with_version(DatabaseVersion::make(10, 15))
            .with_url("jdbc:h2:mem:test");
        assert_eq!(resolve_dialect(&info).unwrap().name(), "derby");
        assert!(resolve_dialect(&DialectResolutionInfo::new("PostgreSQL")).is_none());
    }

    #[test]
    fn test_cockroach_behind_postgresql_driver() {
        let info = DialectResolutionInfo::new("PostgreSQL")
            .with_version_string("CockroachDB CCL v21.2.10 (x86_64-unknown-linux-gnu, go1.16.6)")
            .unwrap();
        assert_eq!(CommunityDatabase::detect(&info), Some(CommunityDatabase::Cockroach));
        let dialect = resolve_dialect(&info).unwrap();
        assert_eq!(dialect.name(), "cockroach");
        assert_eq!(dialect.version(), DatabaseVersion::new(21, 2, 10));

        let postgres = DialectResolutionInfo::new("PostgreSQL")
            .with_version_string("15.4")
            .unwrap();
        assert_eq!(CommunityDatabase::detect(&postgres), None);
        assert!(DialectResolutionInfo::new("x").with_version_string("CockroachDB").is_err());
    }

    #[test]
    fn test_postgresql_family_urls() {
        assert_eq!(
            CommunityDatabase::from_url("jdbc:opengauss://db:8000/app"),
            Some(CommunityDatabase::GaussDb)
        );
        assert_eq!(
            CommunityDatabase::from_url("jdbc:cloudspanner:/projects/p/instances/i/databases/d"),
            Some(CommunityDatabase::Spanner)
        );
        assert!(CommunityDatabase::GaussDb.matches_product_name("openGauss 5.0"));
        let info = DialectResolutionInfo::new("Google Cloud Spanner")
            .with_version(DatabaseVersion::make(1, 0));
        let spanner = CommunityDatabase::Spanner.create_dialect(&info);
        assert_eq!(spanner.version(), SpannerDialect::MINIMUM_VERSION);
    }
}
