//! Dialects of the community supported databases.
//!
//! Each module holds one product: a dialect struct built from a
//! [`DatabaseVersion`](oxide_dialect_core::dialect::DatabaseVersion), and a
//! translator when the product needs more than the standard rendering.

mod altibase;
mod cockroach;
mod cubrid;
mod db2;
mod derby;
mod firebird;
mod gaussdb;
mod h2;
mod hsql;
mod informix;
mod iris;
mod oracle;
mod postgres;
mod singlestore;
mod sinodb;
mod spanner;
mod sqlserver;
mod sybase;
mod teradata;

pub use altibase::AltibaseDialect;
pub use cockroach::CockroachDialect;
pub use cubrid::CubridDialect;
pub use db2::{Db2Dialect, Db2Platform};
pub use derby::DerbyDialect;
pub use firebird::FirebirdDialect;
pub use gaussdb::{
    AggregateComponent, AggregateKind, ComponentUpdate, GaussDbAggregateSupport, GaussDbDialect,
};
pub use h2::H2Dialect;
pub use hsql::HsqlDialect;
pub use informix::{Informix, InformixDialect, InformixFamily, InformixFlavor};
pub use iris::IrisDialect;
pub use oracle::OracleDialect;
pub use singlestore::{SingleStoreDialect, SingleStoreSqlAstTranslator, SingleStoreTableType};
pub use sinodb::{SinoDb, SinoDbDialect};
pub use spanner::{SpannerDialect, SpannerSqlAstTranslator};
pub use sqlserver::{SqlServerDialect, SqlServerSqlAstTranslator};
pub use sybase::SybaseDialect;
pub use teradata::{TeradataDialect, TeradataSqlAstTranslator};

use oxide_dialect_core::ast::SqlTypeCode;
use oxide_dialect_core::dialect::{default_column_type, DatetimeFormatReplacer, Dialect};
use oxide_dialect_core::exception::{JdbcError, JdbcErrorKind, SqlError};
use oxide_dialect_core::translate::{PaginationStyle, SqlAstTranslator, TranslationContext};
use tracing::debug;

/// Translator that differs from the standard one only in how offset and
/// fetch are written.
#[derive(Debug)]
pub(crate) struct PagingTranslator<'d> {
    context: TranslationContext<'d>,
    style: PaginationStyle,
    empty_window_order: &'static str,
}

impl<'d> PagingTranslator<'d> {
    pub(crate) fn new(dialect: &'d dyn Dialect, style: PaginationStyle) -> Self {
        Self {
            context: TranslationContext::new(dialect),
            style,
            empty_window_order: "",
        }
    }

    /// Sets the window of a ranking function called without one.
    pub(crate) const fn with_empty_window_order(mut self, order: &'static str) -> Self {
        self.empty_window_order = order;
        self
    }
}

impl<'d> SqlAstTranslator<'d> for PagingTranslator<'d> {
    fn context(&mut self) -> &mut TranslationContext<'d> {
        &mut self.context
    }

    fn context_ref(&self) -> &TranslationContext<'d> {
        &self.context
    }

    fn pagination_style(&self) -> PaginationStyle {
        self.style
    }

    fn empty_window_order(&self) -> &'static str {
        self.empty_window_order
    }
}

/// Wraps a classification in a [`JdbcError`].
pub(crate) fn classified(
    dialect: &str,
    kind: JdbcErrorKind,
    error: &SqlError,
    message: &str,
    sql: Option<&str>,
) -> Option<JdbcError> {
    debug!(
        dialect,
        code = error.error_code,
        sql_state = error.sql_state(),
        kind = %kind,
        "converted vendor error"
    );
    Some(JdbcError::new(kind, error, message, sql))
}

const ORACLE_FORMAT_RULES: [(&str, &str); 50] = [
    ("GG", "AD"),
    ("G", "AD"),
    ("yyyy", "YYYY"),
    ("yyy", "YYYY"),
    ("yy", "YY"),
    ("y", "Y"),
    ("MMMM", "FMMonth"),
    ("MMM", "Mon"),
    ("MM", "MM"),
    ("M", "FMMM"),
    ("ww", "IW"),
    ("w", "FMIW"),
    ("YYYY", "IYYY"),
    ("YYY", "IYYY"),
    ("YY", "IY"),
    ("Y", "I"),
    ("W", "W"),
    ("EEEE", "FMDay"),
    ("EEE", "Dy"),
    ("ee", "D"),
    ("e", "D"),
    ("dd", "DD"),
    ("d", "FMDD"),
    ("DDD", "DDD"),
    ("DD", "DDD"),
    ("D", "FMDDD"),
    ("a", "AM"),
    ("hh", "HH12"),
    ("HH", "HH24"),
    ("h", "FMHH12"),
    ("H", "FMHH24"),
    ("mm", "MI"),
    ("m", "FMMI"),
    ("ss", "SS"),
    ("s", "FMSS"),
    ("SSSSSS", "FF6"),
    ("SSSSS", "FF5"),
    ("SSSS", "FF4"),
    ("SSS", "FF3"),
    ("SS", "FF2"),
    ("S", "FF1"),
    ("zzz", "TZR"),
    ("zz", "TZR"),
    ("z", "TZR"),
    ("ZZZ", "TZHTZM"),
    ("ZZ", "TZHTZM"),
    ("Z", "TZHTZM"),
    ("xxx", "TZH:TZM"),
    ("xx", "TZHTZM"),
    ("x", "TZH"),
];

/// Oracle `to_char` format for a Java-style pattern. Also understood by
/// Altibase, H2 2.x and DB2.
pub(crate) fn oracle_datetime_format(format: &str) -> String {
    DatetimeFormatReplacer::new("\"", &ORACLE_FORMAT_RULES).replace(format)
}

/// Oracle format with some rules replaced, for databases that only
/// understand part of the Oracle vocabulary.
pub(crate) fn oracle_datetime_format_with(format: &str, overrides: &[(&str, &str)]) -> String {
    let rules = ORACLE_FORMAT_RULES
        .iter()
        .map(|&(from, to)| {
            let to = overrides
                .iter()
                .find(|(source, _)| *source == from)
                .map_or(to, |&(_, replacement)| replacement);
            (from.to_string(), to.to_string())
        })
        .collect();
    DatetimeFormatReplacer::from_rules("\"", rules).replace(format)
}

/// .NET style format of SQL Server and Sybase `format()`.
pub(crate) fn sql_server_datetime_format(format: &str) -> String {
    DatetimeFormatReplacer::new(
        "'",
        &[
            ("SSSSSS", "ffffff"),
            ("SSSSS", "fffff"),
            ("SSSS", "ffff"),
            ("SSS", "fff"),
            ("SS", "ff"),
            ("S", "f"),
            ("a", "tt"),
            ("EEEE", "dddd"),
            ("EEE", "ddd"),
            ("ee", "dd"),
            ("e", "d"),
            ("xxx", "zzz"),
            ("xx", "zz"),
            ("x", "z"),
        ],
    )
    .replace(format)
}

/// MySQL `date_format` pattern for a Java-style one, used by SingleStore
/// and CUBRID.
pub(crate) fn mysql_datetime_format(format: &str) -> String {
    DatetimeFormatReplacer::new(
        "",
        &[
            ("%", "%%"),
            ("yyyy", "%Y"),
            ("yyy", "%Y"),
            ("yy", "%y"),
            ("y", "%Y"),
            ("MMMM", "%M"),
            ("MMM", "%b"),
            ("MM", "%m"),
            ("M", "%c"),
            ("ww", "%v"),
            ("w", "%v"),
            ("YYYY", "%x"),
            ("YYY", "%x"),
            ("YY", "%x"),
            ("Y", "%x"),
            ("EEEE", "%W"),
            ("EEE", "%a"),
            ("ee", "%w"),
            ("e", "%w"),
            ("dd", "%d"),
            ("d", "%e"),
            ("DDD", "%j"),
            ("DD", "%j"),
            ("D", "%j"),
            ("a", "%p"),
            ("hh", "%I"),
            ("HH", "%H"),
            ("h", "%l"),
            ("H", "%k"),
            ("mm", "%i"),
            ("m", "%i"),
            ("ss", "%S"),
            ("s", "%S"),
            ("SSSSSS", "%f"),
            ("SSSSS", "%f"),
            ("SSSS", "%f"),
            ("SSS", "%f"),
            ("SS", "%f"),
            ("S", "%f"),
        ],
    )
    .replace(format)
}

/// Column types shared by the Transact-SQL databases, SQL Server and Sybase.
pub(crate) const fn transact_sql_column_type(code: SqlTypeCode) -> &'static str {
    match code {
        SqlTypeCode::Boolean => "bit",
        // tinyint is unsigned
        SqlTypeCode::Tinyint => "smallint",
        SqlTypeCode::Integer => "int",
        SqlTypeCode::Date
        | SqlTypeCode::Time
        | SqlTypeCode::TimeWithTimezone
        | SqlTypeCode::Timestamp
        | SqlTypeCode::TimestampWithTimezone => "datetime",
        SqlTypeCode::Blob => "image",
        SqlTypeCode::Clob => "text",
        SqlTypeCode::Nclob => "ntext",
        other => default_column_type(other),
    }
}

/// Typed null understood by DB2 and Derby in a union.
pub(crate) fn db2_select_null_string(code: SqlTypeCode) -> String {
    match code {
        SqlTypeCode::Char
        | SqlTypeCode::Nchar
        | SqlTypeCode::Varchar
        | SqlTypeCode::Nvarchar
        | SqlTypeCode::Long32varchar
        | SqlTypeCode::Long32nvarchar => "nullif('','')",
        SqlTypeCode::Date => "nullif('2000-1-1','2000-1-1')",
        SqlTypeCode::Time => "nullif('00:00:00','00:00:00')",
        SqlTypeCode::Timestamp | SqlTypeCode::TimestampWithTimezone => {
            "nullif('2000-1-1 00:00:00','2000-1-1 00:00:00')"
        }
        _ => "nullif(0,0)",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oracle_datetime_format() {
        assert_eq!(oracle_datetime_format("yyyy-MM-dd HH:mm:ss"), "YYYY-MM-DD HH24:MI:SS");
        assert_eq!(oracle_datetime_format("dd 'of' MMMM"), "DD \"of\" FMMonth");
        assert_eq!(oracle_datetime_format("HH:mm:ss.SSS"), "HH24:MI:SS.FF3");
    }

    #[test]
    fn test_oracle_datetime_format_with_overrides() {
        assert_eq!(
            oracle_datetime_format_with("dd MMMM yyyy", &[("MMMM", "MONTH")]),
            "DD MONTH YYYY"
        );
    }

    #[test]
    fn test_sql_server_datetime_format() {
        assert_eq!(
            sql_server_datetime_format("yyyy-MM-dd HH:mm:ss.SSS a"),
            "yyyy-MM-dd HH:mm:ss.fff tt"
        );
    }

    #[test]
    fn test_mysql_datetime_format() {
        assert_eq!(mysql_datetime_format("yyyy-MM-dd HH:mm:ss"), "%Y-%m-%d %H:%i:%S");
        assert_eq!(mysql_datetime_format("d 'of' MMMM"), "%e of %M");
        assert_eq!(mysql_datetime_format("100%"), "100%%");
    }

    #[test]
    fn test_db2_select_null_string() {
        assert_eq!(db2_select_null_string(SqlTypeCode::Varchar), "nullif('','')");
        assert_eq!(db2_select_null_string(SqlTypeCode::Integer), "nullif(0,0)");
    }
}
