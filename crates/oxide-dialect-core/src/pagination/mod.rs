//! Row limiting applied to rendered SQL.
//!
//! A [`LimitHandler`] rewrites the SQL of a root query so that it returns
//! at most `max_rows` rows starting after `first_row`. Handlers also
//! report the limit values to bind, either before or after the
//! statement's own parameters.

mod handlers;
pub mod scanner;
mod sqlserver;

use core::fmt;

use serde::{Deserialize, Serialize};

pub use handlers::{
    DerbyLimitHandler, FetchLimitHandler, FirstLimitHandler, FirstSkipLimitHandler,
    IrisLimitHandler, LegacyDb2LimitHandler, LegacyHsqlLimitHandler, LegacyOracleLimitHandler,
    LimitLimitHandler, LimitOffsetLimitHandler, NoopLimitHandler, OffsetFetchLimitHandler,
    SkipFirstLimitHandler, TopLimitHandler,
};
pub use sqlserver::{SqlServer2005LimitHandler, SqlServer2012LimitHandler};

use crate::error::{DialectError, Result};
use scanner::{find_keyword, Scanner, TokenKind};

/// Rows to skip and rows to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Limit {
    /// Number of rows to skip.
    pub first_row: Option<u64>,
    /// Maximum number of rows to return.
    pub max_rows: Option<u64>,
}

impl Limit {
    /// Creates a limit.
    #[must_use]
    pub const fn new(first_row: Option<u64>, max_rows: Option<u64>) -> Self {
        Self {
            first_row,
            max_rows,
        }
    }

    /// Rows to skip, 0 when unset.
    #[must_use]
    pub const fn first(&self) -> u64 {
        match self.first_row {
            Some(first) => first,
            None => 0,
        }
    }

    /// Returns true when rows are skipped.
    #[must_use]
    pub const fn has_first_row(&self) -> bool {
        self.first() > 0
    }

    /// Returns true when the row count is bounded.
    #[must_use]
    pub const fn has_max_rows(&self) -> bool {
        self.max_rows.is_some()
    }

    /// Returns true when the limit changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.has_first_row() && !self.has_max_rows()
    }

    /// `first_row + max_rows`, the last row number to return.
    #[must_use]
    pub const fn last_row(&self) -> Option<u64> {
        match self.max_rows {
            Some(max) => Some(self.first().saturating_add(max)),
            None => None,
        }
    }
}

/// Placeholder bound for "no maximum" where a maximum is syntactically required.
pub const UNBOUNDED_MAX_ROWS: u64 = 2_147_483_647;

/// SQL rewritten by a limit handler together with its limit bindings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LimitedSql {
    /// Rewritten SQL.
    pub sql: String,
    /// Values bound before the statement's parameters.
    pub leading: Vec<u64>,
    /// Values bound after the statement's parameters.
    pub trailing: Vec<u64>,
}

impl LimitedSql {
    /// SQL left unchanged.
    #[must_use]
    pub fn unchanged(sql: &str) -> Self {
        Self {
            sql: sql.to_string(),
            ..Self::default()
        }
    }
}

/// Renders row limits for one database.
pub trait LimitHandler: Send + Sync + fmt::Debug {
    /// Returns the handler name, used in logs and capability snapshots.
    fn name(&self) -> &'static str;

    /// Returns true if the handler can limit rows at all.
    fn supports_limit(&self) -> bool {
        true
    }

    /// Returns true if the handler can skip rows.
    fn supports_offset(&self) -> bool {
        self.supports_limit()
    }

    /// Returns true if limit values are bound rather than inlined.
    fn supports_variable_limit(&self) -> bool {
        self.supports_limit()
    }

    /// Rewrites `sql` to apply `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Unsupported`] when the limit needs an offset
    /// the handler cannot express, or the SQL has no `select` to attach to.
    fn process_sql(&self, sql: &str, limit: &Limit) -> Result<LimitedSql>;
}

/// Fails with an unsupported-offset error when `limit` skips rows.
pub(crate) fn reject_offset(handler: &dyn LimitHandler, limit: &Limit) -> Result<()> {
    if limit.has_first_row() {
        return Err(DialectError::unsupported(handler.name(), "row offset"));
    }
    Ok(())
}

/// Byte offset just after the top-level `select` keyword.
fn select_end(sql: &str) -> Option<usize> {
    let tokens = Scanner::new(sql).tokens();
    let idx = find_keyword(sql, &tokens, 0, "select")?;
    Some(tokens[idx].span.end)
}

/// Byte offset after the top-level `select` and a following `distinct`.
fn select_distinct_end(sql: &str) -> Option<usize> {
    let tokens = Scanner::new(sql).tokens();
    let idx = find_keyword(sql, &tokens, 0, "select")?;
    match tokens.get(idx + 1) {
        Some(next) if next.is_keyword(sql, "distinct") => Some(next.span.end),
        _ => Some(tokens[idx].span.end),
    }
}

/// Inserts `clause` right after the first top-level `select`.
///
/// # Errors
///
/// Fails when the SQL has no top-level `select`.
pub fn insert_after_select(clause: &str, sql: &str) -> Result<String> {
    let at = select_end(sql).ok_or_else(|| no_select(sql))?;
    Ok(format!("{}{clause}{}", &sql[..at], &sql[at..]))
}

/// Inserts `clause` after the first top-level `select` or `select distinct`.
///
/// # Errors
///
/// Fails when the SQL has no top-level `select`.
pub fn insert_after_distinct(clause: &str, sql: &str) -> Result<String> {
    let at = select_distinct_end(sql).ok_or_else(|| no_select(sql))?;
    Ok(format!("{}{clause}{}", &sql[..at], &sql[at..]))
}

fn no_select(sql: &str) -> DialectError {
    DialectError::Unsupported(format!("cannot apply a row limit to '{sql}'"))
}

/// Splits a trailing locking clause (`for update`, `for read only`,
/// `for share`, `with rs|rr|cs|ur`) off the query.
///
/// Returns the query body and the clause including its leading space, or
/// an empty clause.
#[must_use]
pub fn split_for_update(sql: &str) -> (&str, &str) {
    let tokens = Scanner::new(sql).tokens();
    for (i, token) in tokens.iter().enumerate() {
        if token.depth != 0 || token.kind != TokenKind::Word {
            continue;
        }
        let Some(next) = tokens.get(i + 1) else {
            break;
        };
        let locking = (token.is_keyword(sql, "for")
            && ["update", "read", "share"]
                .iter()
                .any(|k| next.is_keyword(sql, k)))
            || (i > 0
                && token.is_keyword(sql, "with")
                && ["rs", "rr", "cs", "ur"].iter().any(|k| next.is_keyword(sql, k))
                // an isolation clause ends the query or precedes its lock request
                && tokens
                    .get(i + 2)
                    .is_none_or(|after| after.is_keyword(sql, "use")));
        if locking {
            let body = sql[..token.span.start].trim_end();
            return (body, &sql[body.len()..]);
        }
    }
    (sql, "")
}

/// Returns true if the SQL has a top-level `order by`.
#[must_use]
pub fn has_order_by(sql: &str) -> bool {
    let tokens = Scanner::new(sql).tokens();
    tokens.windows(2).any(|pair| {
        pair[0].depth == 0 && pair[0].is_keyword(sql, "order") && pair[1].is_keyword(sql, "by")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_accessors() {
        let limit = Limit::new(Some(10), Some(5));
        assert!(limit.has_first_row());
        assert_eq!(limit.last_row(), Some(15));
        assert!(Limit::new(Some(0), None).is_empty());
        assert!(!Limit::new(None, Some(3)).has_first_row());
    }

    #[test]
    fn test_insert_after_select() {
        assert_eq!(
            insert_after_select(" first 5", "select distinct a from t").unwrap(),
            "select first 5 distinct a from t"
        );
        assert_eq!(
            insert_after_distinct(" top(?)", "select distinct a from t").unwrap(),
            "select distinct top(?) a from t"
        );
        assert!(insert_after_select(" top 1", "update t set a=1").is_err());
    }

    #[test]
    fn test_split_for_update() {
        assert_eq!(
            split_for_update("select a from t for update with rs"),
            ("select a from t", " for update with rs")
        );
        assert_eq!(
            split_for_update("select a from t with rs"),
            ("select a from t", " with rs")
        );
        assert_eq!(
            split_for_update("select a from (select b from u for read only) x"),
            ("select a from (select b from u for read only) x", "")
        );
    }

    #[test]
    fn test_split_for_update_skips_common_table_expressions() {
        let cte = "with rs as (select a from t) select a from rs";
        assert_eq!(split_for_update(cte), (cte, ""));
        let insert = "insert into u with ur as (select a from t) select a from ur";
        assert_eq!(split_for_update(insert), (insert, ""));
        assert_eq!(
            split_for_update("with cs as (select a from t) select a from cs with ur"),
            ("with cs as (select a from t) select a from cs", " with ur")
        );
        assert_eq!(
            split_for_update("select a from t with rs use and keep update locks"),
            ("select a from t", " with rs use and keep update locks")
        );
    }

    #[test]
    fn test_has_order_by() {
        assert!(has_order_by("select a from t order by a"));
        assert!(!has_order_by("select a from (select b from u order by b) x"));
    }
}
