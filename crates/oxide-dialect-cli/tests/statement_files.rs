//! Translation of statements read from JSON files.

use std::io::Write;
use std::path::Path;

use oxide_dialect_cli::commands::{read_statement, translate};
use oxide_dialect_cli::{CliError, DialectSelector};
use oxide_dialect_core::ast::{Expr, SelectColumn, SelectStatement, TableRef};
use oxide_dialect_core::dialect::LockMode;
use oxide_dialect_core::pagination::Limit;
use oxide_dialect_core::Statement;
use rstest::rstest;
use tempfile::NamedTempFile;

fn select_a_from_t() -> Statement {
    Statement::Select(SelectStatement::new(
        vec![SelectColumn::new(Expr::column("a"))],
        Some(TableRef::table("t")),
    ))
}

fn statement_file(statement: &Statement) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string(statement).unwrap().as_bytes())
        .unwrap();
    file
}

fn dialect_named(name: &str, version: &str) -> DialectSelector {
    DialectSelector {
        database: Some(name.into()),
        version: Some(version.into()),
        ..DialectSelector::default()
    }
}

#[test]
fn statement_survives_the_file() {
    let statement = select_a_from_t();
    let file = statement_file(&statement);
    assert_eq!(read_statement(file.path()).unwrap(), statement);
}

#[test]
fn missing_file_names_the_path() {
    let err = read_statement(Path::new("/nonexistent/query.json")).unwrap_err();
    assert!(matches!(err, CliError::Read { .. }));
    assert!(err.to_string().contains("/nonexistent/query.json"));
}

#[test]
fn garbage_is_a_json_error() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"select a from t").unwrap();
    assert!(matches!(
        read_statement(file.path()),
        Err(CliError::Json(_))
    ));
}

#[rstest]
#[case("cubrid", "11.2", "select a from t limit ?")]
#[case("informix", "14.10.FC8", "select first ? a from t")]
#[case("informix", "7.31", "select first 10 a from t")]
#[case("sqlserver", "8.0", "select top 10 a from t")]
fn limited_translation(#[case] database: &str, #[case] version: &str, #[case] expected: &str) {
    let file = statement_file(&select_a_from_t());
    let statement = read_statement(file.path()).unwrap();
    let dialect = dialect_named(database, version).select().unwrap();
    let operation = translate(
        dialect.as_ref(),
        &statement,
        Limit::new(None, Some(10)),
        None,
    )
    .unwrap();
    assert_eq!(operation.sql, expected);
}

#[test]
fn locked_translation_mentions_update() {
    let dialect = dialect_named("oracle", "19.0").select().unwrap();
    let operation = translate(
        dialect.as_ref(),
        &select_a_from_t(),
        Limit::new(None, None),
        Some(LockMode::PessimisticWrite),
    )
    .unwrap();
    assert!(operation.sql.starts_with("select a from t"));
    assert!(operation.sql.contains("for update"));
}
