//! The subcommands, as functions returning serializable reports.
//!
//! `main` only parses arguments, calls one of these and prints the report
//! as JSON.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use oxide_community_dialects::{resolve_dialect, CommunityDatabase, DialectResolutionInfo};
use oxide_dialect_core::ast::{Size, SqlTypeCode};
use oxide_dialect_core::dialect::{LockMode, LockOptions, TemporalType, TemporalUnit};
use oxide_dialect_core::exception::{JdbcErrorKind, SqlError, SqlExceptionConverter};
use oxide_dialect_core::pagination::Limit;
use oxide_dialect_core::translate::{JdbcOperation, QueryOptions};
use oxide_dialect_core::{Capabilities, Dialect, Result as DialectResult, Statement};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{CliError, Result};

/// How the dialect of a command is chosen.
#[derive(Debug, Clone, Default)]
pub struct DialectSelector {
    /// Database name, as accepted by [`CommunityDatabase`]'s `FromStr`.
    pub database: Option<String>,
    /// Version string, parsed leniently.
    pub version: Option<String>,
    /// Connection URL, used when no database name is given.
    pub url: Option<String>,
    /// Dialect settings.
    pub settings: Vec<(String, String)>,
}

impl DialectSelector {
    /// Resolution info carrying the version, URL and settings.
    ///
    /// # Errors
    ///
    /// Fails when the version string holds no version number.
    pub fn info(&self, product_name: &str) -> Result<DialectResolutionInfo> {
        let mut info = DialectResolutionInfo::new(product_name);
        if let Some(version) = &self.version {
            info = info.with_version_string(version)?;
        }
        if let Some(url) = &self.url {
            info = info.with_url(url);
        }
        for (key, value) in &self.settings {
            info = info.with_setting(key, value);
        }
        Ok(info)
    }

    /// Builds the selected dialect.
    ///
    /// # Errors
    ///
    /// Fails when the database name is unknown, when neither a name nor a
    /// URL is given, or when the URL matches no database.
    pub fn select(&self) -> Result<Box<dyn Dialect>> {
        let info = self.info("")?;
        if let Some(name) = &self.database {
            let database: CommunityDatabase = name.parse()?;
            debug!(%database, "dialect chosen by name");
            return Ok(database.create_dialect(&info));
        }
        let url = self.url.as_deref().ok_or(CliError::MissingDatabase)?;
        resolve_dialect(&info).ok_or_else(|| CliError::Unresolved(url.to_string()))
    }
}

/// Parses a `key=value` setting.
///
/// # Errors
///
/// Fails when there is no `=` or the key is empty.
pub fn parse_setting(setting: &str) -> Result<(String, String)> {
    match setting.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(CliError::InvalidSetting(setting.to_string())),
    }
}

/// Outcome of resolving connection metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub database: CommunityDatabase,
    pub dialect: String,
    pub version: String,
    pub minimum_version: String,
    /// False when the version is older than the dialect supports.
    pub supported: bool,
    pub driver_class_name: String,
    pub url_prefix: String,
}

/// Resolves the dialect for a product name, falling back to the URL.
///
/// # Errors
///
/// Fails when the version is unreadable or nothing matches.
pub fn resolve(
    selector: &DialectSelector,
    product_name: &str,
    product_version: Option<&str>,
) -> Result<Resolution> {
    let mut info = selector.info(product_name)?;
    if let Some(version) = product_version {
        info = info.with_version_string(version)?;
    }
    let unresolved = || {
        CliError::Unresolved(
            info.url
                .clone()
                .unwrap_or_else(|| product_name.to_string()),
        )
    };
    let database = CommunityDatabase::detect(&info).ok_or_else(unresolved)?;
    let dialect = resolve_dialect(&info).ok_or_else(unresolved)?;
    let supported = dialect.version() >= dialect.minimum_version();
    info!(%database, version = %dialect.version(), "resolved");
    Ok(Resolution {
        database,
        dialect: dialect.name().to_string(),
        version: dialect.version().to_string(),
        minimum_version: dialect.minimum_version().to_string(),
        supported,
        driver_class_name: database.driver_class_name().to_string(),
        url_prefix: database.url_prefix().to_string(),
    })
}

/// Capability snapshot of a dialect.
#[must_use]
pub fn capabilities(dialect: &dyn Dialect) -> Capabilities {
    dialect.capabilities()
}

/// A column type, as a template and rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnType {
    pub code: SqlTypeCode,
    pub template: String,
    pub rendered: String,
    pub cast: String,
}

/// Renders the column type of `code`.
#[must_use]
pub fn column_type(dialect: &dyn Dialect, code: SqlTypeCode, size: Size) -> ColumnType {
    ColumnType {
        code,
        template: dialect.column_type(code),
        rendered: dialect.type_name(code, size),
        cast: dialect.cast_type(code),
    }
}

/// A pattern, or why the dialect has none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rendered {
    Pattern(String),
    Unsupported(String),
}

impl From<DialectResult<String>> for Rendered {
    fn from(result: DialectResult<String>) -> Self {
        match result {
            Ok(pattern) => Self::Pattern(pattern),
            Err(error) => Self::Unsupported(error.to_string()),
        }
    }
}

/// Temporal patterns of one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemporalPatterns {
    pub unit: TemporalUnit,
    pub extract: Rendered,
    pub timestampadd: Rendered,
    pub timestampdiff: Rendered,
}

/// Extract, add and diff patterns for `unit`, or for every unit.
#[must_use]
pub fn patterns(dialect: &dyn Dialect, unit: Option<TemporalUnit>) -> Vec<TemporalPatterns> {
    let units = unit.map_or_else(|| TemporalUnit::ALL.to_vec(), |unit| vec![unit]);
    units
        .into_iter()
        .map(|unit| TemporalPatterns {
            unit,
            extract: dialect.extract_pattern(unit).into(),
            timestampadd: dialect
                .timestampadd_pattern(unit, TemporalType::Timestamp, None)
                .into(),
            timestampdiff: dialect
                .timestampdiff_pattern(unit, TemporalType::Timestamp, TemporalType::Timestamp)
                .into(),
        })
        .collect()
}

/// How a vendor error is classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub label: &'static str,
    pub kind: JdbcErrorKind,
    pub message: String,
}

/// Classifies a vendor error through the dialect's conversion chain.
#[must_use]
pub fn classify(
    dialect: &dyn Dialect,
    error_code: i32,
    sql_state: Option<&str>,
    message: &str,
) -> Classification {
    let mut error = SqlError::new(error_code, message);
    if let Some(state) = sql_state {
        error = error.with_sql_state(state);
    }
    let converted = SqlExceptionConverter::for_dialect(dialect).convert(&error, message, None);
    Classification {
        label: converted.kind.label(),
        kind: converted.kind,
        message: converted.message,
    }
}

/// Reads a statement from a JSON file, or from stdin when `path` is `-`.
///
/// # Errors
///
/// Fails when the file cannot be read or holds no statement.
pub fn read_statement(path: &Path) -> Result<Statement> {
    let read_error = |source| CliError::Read {
        path: path.to_path_buf(),
        source,
    };
    let json = if path == Path::new("-") {
        let mut json = String::new();
        io::stdin().read_to_string(&mut json).map_err(read_error)?;
        json
    } else {
        fs::read_to_string(path).map_err(read_error)?
    };
    Ok(serde_json::from_str(&json)?)
}

/// Translates a statement with an optional row limit and lock.
///
/// # Errors
///
/// Fails when the dialect cannot express the statement.
pub fn translate(
    dialect: &dyn Dialect,
    statement: &Statement,
    limit: Limit,
    lock: Option<LockMode>,
) -> Result<JdbcOperation> {
    let mut options = QueryOptions::default();
    if !limit.is_empty() {
        options = options.with_limit(limit);
    }
    if let Some(mode) = lock {
        options = options.with_lock(LockOptions::new(mode));
    }
    Ok(dialect.translate(statement, &options)?)
}

/// Sequence statements for one sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceStrings {
    pub supports_sequences: bool,
    pub next_value: Option<String>,
    pub select_next_value: Option<String>,
    pub create: Vec<String>,
    pub drop: Vec<String>,
    pub query_sequences: Option<String>,
}

/// Sequence statements of the dialect for `name`.
#[must_use]
pub fn sequence(dialect: &dyn Dialect, name: &str, start: i64, increment: i64) -> SequenceStrings {
    let support = dialect.sequence_support();
    if !support.supports_sequences() {
        warn!(dialect = dialect.name(), "database has no sequences");
    }
    SequenceStrings {
        supports_sequences: support.supports_sequences(),
        next_value: support.sequence_next_val_string(name).ok(),
        select_next_value: support.select_sequence_next_val_string(name).ok(),
        create: support
            .create_sequence_strings(name, start, increment)
            .unwrap_or_default(),
        drop: support.drop_sequence_strings(name).unwrap_or_default(),
        query_sequences: dialect.query_sequences_string().map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use oxide_dialect_core::ast::{Expr, SelectColumn, SelectStatement, TableRef};

    use super::*;

    fn selector(database: &str) -> DialectSelector {
        DialectSelector {
            database: Some(database.into()),
            ..DialectSelector::default()
        }
    }

    #[test]
    fn test_select_by_name_and_url() {
        assert_eq!(selector("cubrid").select().unwrap().name(), "cubrid");
        let by_url = DialectSelector {
            url: Some("jdbc:teradata://db/app".into()),
            version: Some("17.20".into()),
            ..DialectSelector::default()
        };
        assert_eq!(by_url.select().unwrap().name(), "teradata");
        assert!(matches!(
            DialectSelector::default().select(),
            Err(CliError::MissingDatabase)
        ));
        assert!(matches!(selector("mysql").select(), Err(CliError::Dialect(_))));
    }

    #[test]
    fn test_parse_setting() {
        assert_eq!(
            parse_setting("singlestore.table_type = columnstore").unwrap(),
            ("singlestore.table_type".into(), "columnstore".into())
        );
        assert!(parse_setting("=x").is_err());
        assert!(parse_setting("flag").is_err());
    }

    #[test]
    fn test_resolve_report() {
        let resolution = resolve(&DialectSelector::default(), "Teradata", Some("13.10")).unwrap();
        assert_eq!(resolution.database, CommunityDatabase::Teradata);
        assert_eq!(resolution.version, "13.10.0");
        assert!(!resolution.supported);
        assert_eq!(resolution.driver_class_name, "com.teradata.jdbc.TeraDriver");
        assert!(matches!(
            resolve(&DialectSelector::default(), "PostgreSQL", None),
            Err(CliError::Unresolved(_))
        ));
    }

    #[test]
    fn test_patterns_report_unsupported_units() {
        let dialect = selector("sybase").select().unwrap();
        let rows = patterns(dialect.as_ref(), Some(TemporalUnit::DayOfWeek));
        assert_eq!(rows.len(), 1);
        assert!(matches!(rows[0].timestampadd, Rendered::Unsupported(_)));
        assert_eq!(patterns(dialect.as_ref(), None).len(), TemporalUnit::ALL.len());
    }

    #[test]
    fn test_classify_falls_back_to_sql_state() {
        let dialect = selector("altibase").select().unwrap();
        assert_eq!(classify(dialect.as_ref(), 334_393, None, "timeout").label, "lock timeout");
        assert_eq!(
            classify(dialect.as_ref(), 1, Some("42000"), "syntax").label,
            "sql grammar"
        );
        assert_eq!(classify(dialect.as_ref(), 1, None, "boom").label, "generic");
    }

    #[test]
    fn test_translate_with_limit() {
        let dialect = selector("cubrid").select().unwrap();
        let statement = Statement::Select(SelectStatement::new(
            vec![SelectColumn::new(Expr::column("a"))],
            Some(TableRef::table("t")),
        ));
        let operation = translate(
            dialect.as_ref(),
            &statement,
            Limit::new(Some(5), Some(10)),
            None,
        )
        .unwrap();
        assert_eq!(operation.sql, "select a from t limit ?, ?");
    }

    #[test]
    fn test_sequence_strings() {
        let cubrid = selector("cubrid").select().unwrap();
        let strings = sequence(cubrid.as_ref(), "s", 1, 1);
        assert!(strings.supports_sequences);
        assert_eq!(strings.select_next_value.as_deref(), Some("s.next_value"));
        assert_eq!(strings.drop, vec!["drop serial s".to_string()]);

        let sybase = selector("sybase").select().unwrap();
        let none = sequence(sybase.as_ref(), "s", 1, 1);
        assert!(!none.supports_sequences);
        assert!(none.next_value.is_none());
        assert!(none.create.is_empty());
    }
}
