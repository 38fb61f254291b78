//! SQL Server row limiting.
//!
//! SQL Server 2005 to 2008 have `top` but no offset syntax, so offsets
//! number the rows of the original query inside a `query_` CTE and filter
//! on the row number. The outer query must name every column of the inner
//! one, which means unaliased select items get generated `colN_` aliases.

use tracing::debug;

use super::scanner::{find_keyword, Scanner, Token, TokenKind};
use super::{has_order_by, split_for_update, Limit, LimitHandler, LimitedSql};
use crate::error::{DialectError, Result};

const ROW_NUMBER_CTE: &str = "query_ as (select row_.*,row_number() over (order by current_timestamp) as rownumber_ from (";

/// Words that end an expression and can never be an alias.
const NON_ALIAS_WORDS: [&str; 4] = ["end", "null", "true", "false"];

/// Words that need an operand after them.
const OPERATOR_WORDS: [&str; 12] = [
    "select", "distinct", "case", "when", "then", "else", "and", "or", "not", "is", "in", "like",
];

/// Words that end the select list of a query.
const SELECT_LIST_END: [&str; 6] = ["from", "where", "group", "having", "order", "union"];

/// `top(?)` and a `row_number()` CTE for offsets.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServer2005LimitHandler;

impl SqlServer2005LimitHandler {
    /// Shared instance.
    pub const INSTANCE: Self = Self;
}

/// One edit of the original SQL: insert `text` at byte `at`.
struct Insertion {
    at: usize,
    text: String,
}

/// The main query of a statement that may start with CTEs.
struct MainQuery<'a> {
    sql: &'a str,
    tokens: Vec<Token>,
    select: usize,
}

impl<'a> MainQuery<'a> {
    fn locate(sql: &'a str) -> Result<Self> {
        let tokens = Scanner::new(sql).tokens();
        let select = find_keyword(sql, &tokens, 0, "select").ok_or_else(|| {
            DialectError::Unsupported(format!("cannot apply a row limit to '{sql}'"))
        })?;
        Ok(Self {
            sql,
            tokens,
            select,
        })
    }

    fn has_cte(&self) -> bool {
        self.tokens
            .first()
            .is_some_and(|t| t.is_keyword(self.sql, "with"))
    }

    /// Text before the main `select`, that is the CTE list.
    fn prefix(&self) -> &'a str {
        &self.sql[..self.tokens[self.select].span.start]
    }

    /// Text from the main `select` on.
    fn body(&self) -> &'a str {
        &self.sql[self.tokens[self.select].span.start..]
    }

    /// Index of the first select item token.
    fn items_start(&self) -> usize {
        match self.tokens.get(self.select + 1) {
            Some(t) if t.is_keyword(self.sql, "distinct") => self.select + 2,
            _ => self.select + 1,
        }
    }

    /// Byte offset to insert `top(?)` at.
    fn top_position(&self) -> usize {
        self.tokens[self.items_start() - 1].span.end
    }

    fn items_end(&self) -> usize {
        let start = self.items_start();
        self.tokens[start..]
            .iter()
            .position(|t| {
                t.depth == 0 && SELECT_LIST_END.iter().any(|k| t.is_keyword(self.sql, k))
            })
            .map_or(self.tokens.len(), |i| start + i)
    }

    /// Select items as token slices split at top-level commas.
    fn items(&self) -> Vec<&[Token]> {
        let list = &self.tokens[self.items_start()..self.items_end()];
        list.split(|t| t.depth == 0 && t.kind == TokenKind::Comma)
            .filter(|item| !item.is_empty())
            .collect()
    }
}

/// Alias of a select item, if it has one.
fn item_alias<'a>(sql: &'a str, item: &[Token]) -> Option<&'a str> {
    let [.., before, last] = item else {
        return None;
    };
    if before.is_keyword(sql, "as") {
        return Some(last.text(sql));
    }
    let nameable = match last.kind {
        TokenKind::Word => !NON_ALIAS_WORDS
            .iter()
            .chain(OPERATOR_WORDS.iter())
            .any(|w| last.is_keyword(sql, w)),
        TokenKind::Quoted => !last.text(sql).starts_with('\''),
        _ => false,
    };
    let follows_operand = matches!(
        before.kind,
        TokenKind::Word | TokenKind::Quoted | TokenKind::Close
    ) && !OPERATOR_WORDS.iter().any(|w| before.is_keyword(sql, w));
    (nameable && follows_operand).then(|| last.text(sql))
}

fn is_wildcard(sql: &str, item: &[Token]) -> bool {
    item.last()
        .is_some_and(|t| t.kind == TokenKind::Symbol && t.text(sql) == "*")
}

fn apply(sql: &str, mut insertions: Vec<Insertion>) -> String {
    insertions.sort_by_key(|i| i.at);
    let mut out = String::with_capacity(sql.len() + 64);
    let mut copied = 0;
    for insertion in insertions {
        out.push_str(&sql[copied..insertion.at]);
        out.push_str(&insertion.text);
        copied = insertion.at;
    }
    out.push_str(&sql[copied..]);
    out
}

impl LimitHandler for SqlServer2005LimitHandler {
    fn name(&self) -> &'static str {
        "sqlserver-2005"
    }

    fn process_sql(&self, sql: &str, limit: &Limit) -> Result<LimitedSql> {
        if limit.is_empty() {
            return Ok(LimitedSql::unchanged(sql));
        }
        let sql = sql.trim_start();
        let query = MainQuery::locate(sql)?;

        if !limit.has_first_row() {
            let at = query.top_position();
            return Ok(LimitedSql {
                sql: apply(
                    sql,
                    vec![Insertion {
                        at,
                        text: " top(?)".into(),
                    }],
                ),
                leading: limit.max_rows.into_iter().collect(),
                trailing: Vec::new(),
            });
        }

        let mut insertions = Vec::new();
        let mut aliases = Vec::new();
        let mut wildcard = false;
        let mut generated = 0;
        for item in query.items() {
            if is_wildcard(sql, item) {
                wildcard = true;
                continue;
            }
            if let Some(alias) = item_alias(sql, item) {
                aliases.push(alias.to_string());
                continue;
            }
            let alias = format!("col{generated}_");
            generated += 1;
            if let Some(last) = item.last() {
                insertions.push(Insertion {
                    at: last.span.end,
                    text: format!(" as {alias}"),
                });
            }
            aliases.push(alias);
        }

        let mut leading = Vec::new();
        let first = limit.first();
        if let Some(max) = limit.max_rows {
            if has_order_by(query.body()) {
                insertions.push(Insertion {
                    at: query.top_position(),
                    text: " top(?)".into(),
                });
                leading.push(first.saturating_add(max));
            }
        }

        let prefix = query.prefix();
        let select_at = prefix.len();
        let rewritten = apply(sql, insertions);
        let (head, inner) = rewritten.split_at(select_at);
        let projection = if wildcard {
            "*".to_string()
        } else {
            aliases.join(",")
        };

        let mut out = String::with_capacity(rewritten.len() + 192);
        if query.has_cte() {
            out.push_str(head);
            out.push_str(", ");
        } else {
            out.push_str("with ");
        }
        out.push_str(ROW_NUMBER_CTE);
        out.push_str(inner);
        out.push_str(") row_) select ");
        out.push_str(&projection);
        out.push_str(" from query_ where rownumber_>=?");
        let mut trailing = vec![first.saturating_add(1)];
        if let Some(max) = limit.max_rows {
            out.push_str(" and rownumber_<?");
            trailing.push(first.saturating_add(max).saturating_add(1));
        }
        debug!(handler = self.name(), "emulated offset with row_number()");
        Ok(LimitedSql {
            sql: out,
            leading,
            trailing,
        })
    }
}

/// SQL Server 2012 and later: `offset ? rows fetch next ? rows only`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServer2012LimitHandler;

impl SqlServer2012LimitHandler {
    /// Shared instance.
    pub const INSTANCE: Self = Self;
}

impl LimitHandler for SqlServer2012LimitHandler {
    fn name(&self) -> &'static str {
        "sqlserver-2012"
    }

    fn process_sql(&self, sql: &str, limit: &Limit) -> Result<LimitedSql> {
        if limit.is_empty() {
            return Ok(LimitedSql::unchanged(sql));
        }
        if !limit.has_first_row() {
            return SqlServer2005LimitHandler::INSTANCE.process_sql(sql, limit);
        }
        let (body, lock) = split_for_update(sql);
        let mut clause = String::new();
        if !has_order_by(body) {
            clause.push_str(" order by @@version");
        }
        clause.push_str(" offset ? rows");
        let mut trailing = vec![limit.first()];
        if let Some(max) = limit.max_rows {
            clause.push_str(" fetch next ? rows only");
            trailing.push(max);
        }
        Ok(LimitedSql {
            sql: format!("{body}{clause}{lock}"),
            leading: Vec::new(),
            trailing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "with query_ as (select row_.*,row_number() over (order by current_timestamp) as rownumber_ from (";

    fn limit(first: u64, max: u64) -> Limit {
        Limit::new(Some(first), Some(max))
    }

    fn process(sql: &str, first: u64, max: u64) -> LimitedSql {
        SqlServer2005LimitHandler::INSTANCE
            .process_sql(sql, &limit(first, max))
            .unwrap()
    }

    #[test]
    fn test_distinct_with_order_by() {
        let out = process(
            "select distinct f1 as f53245 from table849752 order by f234, f67 desc",
            10,
            15,
        );
        assert_eq!(
            out.sql,
            format!("{PREFIX}select distinct top(?) f1 as f53245 from table849752 order by f234, f67 desc) row_) select f53245 from query_ where rownumber_>=? and rownumber_<?")
        );
        assert_eq!(out.leading, vec![25]);
        assert_eq!(out.trailing, vec![11, 26]);
    }

    #[test]
    fn test_alias_generation() {
        let out = process("select column1, column2, column3, column4 from table1", 3, 5);
        assert_eq!(
            out.sql,
            format!("{PREFIX}select column1 as col0_, column2 as col1_, column3 as col2_, column4 as col3_ from table1) row_) select col0_,col1_,col2_,col3_ from query_ where rownumber_>=? and rownumber_<?")
        );
        assert!(out.leading.is_empty());
    }

    #[test]
    fn test_aliases_without_as() {
        let out = process("select column1 c1, from_column c2 from table1", 3, 5);
        assert!(out.sql.ends_with("select c1,c2 from query_ where rownumber_>=? and rownumber_<?"));
        let out = process(
            "select cast(x.a as varchar(255)) f1, x.b from t x order by x.b DESC",
            1,
            3,
        );
        assert!(out
            .sql
            .contains("select top(?) cast(x.a as varchar(255)) f1, x.b as col0_ from t x"));
        assert!(out.sql.contains("select f1,col0_ from query_"));
    }

    #[test]
    fn test_case_and_subquery_items() {
        let out = process(
            "select p.id, p.uid AS tmp1, (select case when p.name = 'Smith' then 'Neo' else p.id end) from C p where p.type='Va' order by p.Order",
            1,
            2,
        );
        assert_eq!(
            out.sql,
            format!("{PREFIX}select top(?) p.id as col0_, p.uid AS tmp1, (select case when p.name = 'Smith' then 'Neo' else p.id end) as col1_ from C p where p.type='Va' order by p.Order) row_) select col0_,tmp1,col1_ from query_ where rownumber_>=? and rownumber_<?")
        );
    }

    #[test]
    fn test_bracketed_names() {
        let out = process("select [Created From Item] c1, field2 from table1", 1, 5);
        assert!(out
            .sql
            .contains("select [Created From Item] c1, field2 as col0_ from table1"));
        assert!(out.sql.contains("select c1,col0_ from query_"));
    }

    #[test]
    fn test_wildcards() {
        let out = process(
            "select t1.*, t2.* from tab1 t1, tab2 t2 where t1.ref = t2.ref order by t1.id desc",
            1,
            3,
        );
        assert!(out.sql.contains("select * from query_"));
        assert!(out.sql.contains("select top(?) t1.*, t2.*"));
    }

    #[test]
    fn test_max_only_uses_top() {
        let out = SqlServer2005LimitHandler::INSTANCE
            .process_sql(
                "SELECT DISTINCT a.id as id0_ from A a order by a.id",
                &Limit::new(None, Some(5)),
            )
            .unwrap();
        assert_eq!(out.sql, "SELECT DISTINCT top(?) a.id as id0_ from A a order by a.id");
        assert_eq!(out.leading, vec![5]);
    }

    #[test]
    fn test_cte() {
        let sql = "  \n\tWITH a (c1, c2) AS (SELECT c1, c2 FROM t) SELECT c1, c2 FROM a";
        let out = SqlServer2005LimitHandler::INSTANCE
            .process_sql(sql, &Limit::new(None, Some(5)))
            .unwrap();
        assert_eq!(
            out.sql,
            "WITH a (c1, c2) AS (SELECT c1, c2 FROM t) SELECT top(?) c1, c2 FROM a"
        );
        let out = process(sql, 1, 5);
        assert_eq!(
            out.sql,
            "WITH a (c1, c2) AS (SELECT c1, c2 FROM t) , query_ as (select row_.*,row_number() over (order by current_timestamp) as rownumber_ from (SELECT c1 as col0_, c2 as col1_ FROM a) row_) select col0_,col1_ from query_ where rownumber_>=? and rownumber_<?"
        );
    }

    #[test]
    fn test_sqlserver_2012() {
        let out = SqlServer2012LimitHandler::INSTANCE
            .process_sql("select a from t", &limit(10, 5))
            .unwrap();
        assert_eq!(
            out.sql,
            "select a from t order by @@version offset ? rows fetch next ? rows only"
        );
        assert_eq!(out.trailing, vec![10, 5]);
        let out = SqlServer2012LimitHandler::INSTANCE
            .process_sql("select a from t order by a", &Limit::new(None, Some(5)))
            .unwrap();
        assert_eq!(out.sql, "select top(?) a from t order by a");
    }
}
