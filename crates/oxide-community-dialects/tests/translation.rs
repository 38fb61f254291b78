//! Tests for translated statements: parameters passed to functions.

mod common;
use common::*;

use oxide_dialect_core::ast::{
    Expr, SelectColumn, SelectStatement, SqlTypeCode, Statement, TableRef,
};
use oxide_dialect_core::translate::QueryOptions;
use rstest::rstest;

fn function_arguments(argument: Expr) -> Statement {
    let mut select = SelectStatement::new(
        vec![SelectColumn::new(Expr::function("upper", vec![argument]))],
        Some(TableRef::table("t")),
    );
    select.where_clause =
        Some(Expr::function("length", vec![Expr::param(2)]).eq(Expr::integer(3)));
    Statement::Select(select)
}

fn translated(name: &str, version: &str, statement: &Statement) -> String {
    dialect(name, version)
        .translate(statement, &QueryOptions::default())
        .unwrap_or_else(|e| panic!("{name} {version} failed: {e:?}"))
        .sql
}

#[rstest]
#[case(
    "db2",
    "11.5",
    "select upper(cast(? as varchar(32672))) from t where length(cast(? as varchar(32672)))=3"
)]
#[case(
    "derby",
    "10.16",
    "select upper(cast(? as varchar(255))) from t where length(cast(? as varchar(255)))=3"
)]
#[case(
    "informix",
    "14.10",
    "select upper(cast(? as varchar(255))) from t where length(cast(? as varchar(255)))=3"
)]
fn function_parameters_are_cast(#[case] name: &str, #[case] version: &str, #[case] expected: &str) {
    let statement = function_arguments(Expr::param(1));
    assert_eq!(translated(name, version, &statement), expected);
    assert!(!dialect(name, version).capabilities().features.untyped_function_parameters);
}

#[rstest]
#[case("oracle", "21.3")]
#[case("h2", "2.2")]
#[case("sqlserver", "16.0")]
fn function_parameters_stay_bare(#[case] name: &str, #[case] version: &str) {
    let statement = function_arguments(Expr::param(1));
    assert_eq!(
        translated(name, version, &statement),
        "select upper(?) from t where length(?)=3"
    );
}

#[test]
fn explicit_cast_is_not_cast_again() {
    let statement = function_arguments(Expr::param(1).cast(SqlTypeCode::Integer));
    let sql = translated("derby", "10.16", &statement);
    assert!(sql.starts_with("select upper(cast(? as integer)) from t"), "{sql}");
    assert_eq!(sql.matches("cast(").count(), 2, "{sql}");
}
