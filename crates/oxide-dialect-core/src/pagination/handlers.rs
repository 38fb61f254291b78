//! Limit handlers for the common pagination syntaxes.

use super::{
    insert_after_distinct, insert_after_select, reject_offset, split_for_update, Limit,
    LimitHandler, LimitedSql, UNBOUNDED_MAX_ROWS,
};
use crate::error::Result;

/// Leaves the SQL unchanged; the database has no row limiting.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLimitHandler;

impl NoopLimitHandler {
    /// Shared instance.
    pub const INSTANCE: Self = Self;
}

impl LimitHandler for NoopLimitHandler {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn supports_limit(&self) -> bool {
        false
    }

    fn process_sql(&self, sql: &str, _limit: &Limit) -> Result<LimitedSql> {
        Ok(LimitedSql::unchanged(sql))
    }
}

/// ` limit ? offset ?`, or just ` offset ?` for the offset-only variant
/// when no maximum is given.
#[derive(Debug, Clone, Copy)]
pub struct LimitOffsetLimitHandler {
    offset_only: bool,
}

impl LimitOffsetLimitHandler {
    /// Always renders `limit`, binding the unbounded maximum when needed.
    pub const INSTANCE: Self = Self { offset_only: false };
    /// Renders ` offset ?` alone when there is no maximum.
    pub const OFFSET_ONLY_INSTANCE: Self = Self { offset_only: true };
}

impl LimitHandler for LimitOffsetLimitHandler {
    fn name(&self) -> &'static str {
        "limit-offset"
    }

    fn process_sql(&self, sql: &str, limit: &Limit) -> Result<LimitedSql> {
        if limit.is_empty() {
            return Ok(LimitedSql::unchanged(sql));
        }
        let (body, lock) = split_for_update(sql);
        let mut clause = String::new();
        let mut trailing = Vec::new();
        match limit.max_rows {
            Some(max) => {
                clause.push_str(" limit ?");
                trailing.push(max);
            }
            None if !self.offset_only => {
                clause.push_str(" limit ?");
                trailing.push(UNBOUNDED_MAX_ROWS);
            }
            None => {}
        }
        if limit.has_first_row() {
            clause.push_str(" offset ?");
            trailing.push(limit.first());
        }
        Ok(LimitedSql {
            sql: format!("{body}{clause}{lock}"),
            leading: Vec::new(),
            trailing,
        })
    }
}

/// MySQL style ` limit ?, ?` with the offset first.
#[derive(Debug, Clone, Copy, Default)]
pub struct LimitLimitHandler;

impl LimitLimitHandler {
    /// Shared instance.
    pub const INSTANCE: Self = Self;
}

impl LimitHandler for LimitLimitHandler {
    fn name(&self) -> &'static str {
        "limit-limit"
    }

    fn process_sql(&self, sql: &str, limit: &Limit) -> Result<LimitedSql> {
        if limit.is_empty() {
            return Ok(LimitedSql::unchanged(sql));
        }
        let (body, lock) = split_for_update(sql);
        let max = limit.max_rows.unwrap_or(UNBOUNDED_MAX_ROWS);
        let (clause, trailing) = if limit.has_first_row() {
            (" limit ?, ?", vec![limit.first(), max])
        } else {
            (" limit ?", vec![max])
        };
        Ok(LimitedSql {
            sql: format!("{body}{clause}{lock}"),
            leading: Vec::new(),
            trailing,
        })
    }
}

fn offset_fetch_clause(limit: &Limit, variable: bool, trailing: &mut Vec<u64>) -> String {
    let value = |v: u64, trailing: &mut Vec<u64>| {
        if variable {
            trailing.push(v);
            "?".to_string()
        } else {
            v.to_string()
        }
    };
    let mut clause = String::new();
    if limit.has_first_row() {
        let first = value(limit.first(), trailing);
        clause.push_str(&format!(" offset {first} rows"));
        if let Some(max) = limit.max_rows {
            let max = value(max, trailing);
            clause.push_str(&format!(" fetch next {max} rows only"));
        }
    } else if let Some(max) = limit.max_rows {
        let max = value(max, trailing);
        clause.push_str(&format!(" fetch first {max} rows only"));
    }
    clause
}

/// SQL standard ` offset ? rows fetch next ? rows only`.
#[derive(Debug, Clone, Copy)]
pub struct OffsetFetchLimitHandler {
    variable: bool,
}

impl OffsetFetchLimitHandler {
    /// Binds the limit values.
    pub const INSTANCE: Self = Self { variable: true };
    /// Inlines the limit values.
    pub const INLINE_INSTANCE: Self = Self { variable: false };
}

impl LimitHandler for OffsetFetchLimitHandler {
    fn name(&self) -> &'static str {
        "offset-fetch"
    }

    fn supports_variable_limit(&self) -> bool {
        self.variable
    }

    fn process_sql(&self, sql: &str, limit: &Limit) -> Result<LimitedSql> {
        if limit.is_empty() {
            return Ok(LimitedSql::unchanged(sql));
        }
        let (body, lock) = split_for_update(sql);
        let mut trailing = Vec::new();
        let clause = offset_fetch_clause(limit, self.variable, &mut trailing);
        Ok(LimitedSql {
            sql: format!("{body}{clause}{lock}"),
            leading: Vec::new(),
            trailing,
        })
    }
}

/// ` fetch first ? rows only`, without offsets.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchLimitHandler;

impl FetchLimitHandler {
    /// Shared instance.
    pub const INSTANCE: Self = Self;
}

impl LimitHandler for FetchLimitHandler {
    fn name(&self) -> &'static str {
        "fetch"
    }

    fn supports_offset(&self) -> bool {
        false
    }

    fn process_sql(&self, sql: &str, limit: &Limit) -> Result<LimitedSql> {
        reject_offset(self, limit)?;
        let Some(max) = limit.max_rows else {
            return Ok(LimitedSql::unchanged(sql));
        };
        let (body, lock) = split_for_update(sql);
        Ok(LimitedSql {
            sql: format!("{body} fetch first ? rows only{lock}"),
            leading: Vec::new(),
            trailing: vec![max],
        })
    }
}

/// `select first N`, inlined, without offsets.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstLimitHandler;

impl FirstLimitHandler {
    /// Shared instance.
    pub const INSTANCE: Self = Self;
}

impl LimitHandler for FirstLimitHandler {
    fn name(&self) -> &'static str {
        "first"
    }

    fn supports_offset(&self) -> bool {
        false
    }

    fn supports_variable_limit(&self) -> bool {
        false
    }

    fn process_sql(&self, sql: &str, limit: &Limit) -> Result<LimitedSql> {
        reject_offset(self, limit)?;
        let Some(max) = limit.max_rows else {
            return Ok(LimitedSql::unchanged(sql));
        };
        Ok(LimitedSql::unchanged(&insert_after_select(
            &format!(" first {max}"),
            sql,
        )?))
    }
}

/// `select skip ? first ?`.
#[derive(Debug, Clone, Copy)]
pub struct SkipFirstLimitHandler {
    variable: bool,
}

impl SkipFirstLimitHandler {
    /// Binds the limit values.
    pub const INSTANCE: Self = Self { variable: true };
    /// Inlines the limit values.
    pub const INLINE_INSTANCE: Self = Self { variable: false };
}

impl LimitHandler for SkipFirstLimitHandler {
    fn name(&self) -> &'static str {
        "skip-first"
    }

    fn supports_variable_limit(&self) -> bool {
        self.variable
    }

    fn process_sql(&self, sql: &str, limit: &Limit) -> Result<LimitedSql> {
        if limit.is_empty() {
            return Ok(LimitedSql::unchanged(sql));
        }
        let mut clause = String::new();
        let mut leading = Vec::new();
        if limit.has_first_row() {
            if self.variable {
                clause.push_str(" skip ?");
                leading.push(limit.first());
            } else {
                clause.push_str(&format!(" skip {}", limit.first()));
            }
        }
        if let Some(max) = limit.max_rows {
            if self.variable {
                clause.push_str(" first ?");
                leading.push(max);
            } else {
                clause.push_str(&format!(" first {max}"));
            }
        }
        Ok(LimitedSql {
            sql: insert_after_select(&clause, sql)?,
            leading,
            trailing: Vec::new(),
        })
    }
}

/// `select first ? skip ?`, the maximum bound first.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstSkipLimitHandler;

impl FirstSkipLimitHandler {
    /// Shared instance.
    pub const INSTANCE: Self = Self;
}

impl LimitHandler for FirstSkipLimitHandler {
    fn name(&self) -> &'static str {
        "first-skip"
    }

    fn process_sql(&self, sql: &str, limit: &Limit) -> Result<LimitedSql> {
        if limit.is_empty() {
            return Ok(LimitedSql::unchanged(sql));
        }
        let mut clause = String::new();
        let mut leading = Vec::new();
        if let Some(max) = limit.max_rows {
            clause.push_str(" first ?");
            leading.push(max);
        }
        if limit.has_first_row() {
            clause.push_str(" skip ?");
            leading.push(limit.first());
        }
        Ok(LimitedSql {
            sql: insert_after_select(&clause, sql)?,
            leading,
            trailing: Vec::new(),
        })
    }
}

/// `select top ?` (or `top N`), without offsets.
#[derive(Debug, Clone, Copy)]
pub struct TopLimitHandler {
    variable: bool,
}

impl TopLimitHandler {
    /// Binds the maximum.
    pub const INSTANCE: Self = Self { variable: true };
    /// Inlines the maximum.
    pub const INLINE_INSTANCE: Self = Self { variable: false };
}

impl LimitHandler for TopLimitHandler {
    fn name(&self) -> &'static str {
        "top"
    }

    fn supports_offset(&self) -> bool {
        false
    }

    fn supports_variable_limit(&self) -> bool {
        self.variable
    }

    fn process_sql(&self, sql: &str, limit: &Limit) -> Result<LimitedSql> {
        reject_offset(self, limit)?;
        let Some(max) = limit.max_rows else {
            return Ok(LimitedSql::unchanged(sql));
        };
        if self.variable {
            Ok(LimitedSql {
                sql: insert_after_distinct(" top ?", sql)?,
                leading: vec![max],
                trailing: Vec::new(),
            })
        } else {
            Ok(LimitedSql::unchanged(&insert_after_distinct(
                &format!(" top {max}"),
                sql,
            )?))
        }
    }
}

/// HSQLDB 1.x: `select limit ? ?` or `select top ?`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyHsqlLimitHandler;

impl LegacyHsqlLimitHandler {
    /// Shared instance.
    pub const INSTANCE: Self = Self;
}

impl LimitHandler for LegacyHsqlLimitHandler {
    fn name(&self) -> &'static str {
        "legacy-hsql"
    }

    fn process_sql(&self, sql: &str, limit: &Limit) -> Result<LimitedSql> {
        if limit.is_empty() {
            return Ok(LimitedSql::unchanged(sql));
        }
        let max = limit.max_rows.unwrap_or(UNBOUNDED_MAX_ROWS);
        if limit.has_first_row() {
            Ok(LimitedSql {
                sql: insert_after_select(" limit ? ?", sql)?,
                leading: vec![limit.first(), max],
                trailing: Vec::new(),
            })
        } else {
            Ok(LimitedSql {
                sql: insert_after_select(" top ?", sql)?,
                leading: vec![max],
                trailing: Vec::new(),
            })
        }
    }
}

/// Oracle before 12c: `rownum` wrappers.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyOracleLimitHandler;

impl LegacyOracleLimitHandler {
    /// Shared instance.
    pub const INSTANCE: Self = Self;
}

impl LimitHandler for LegacyOracleLimitHandler {
    fn name(&self) -> &'static str {
        "legacy-oracle"
    }

    fn process_sql(&self, sql: &str, limit: &Limit) -> Result<LimitedSql> {
        if limit.is_empty() {
            return Ok(LimitedSql::unchanged(sql));
        }
        let (body, lock) = split_for_update(sql);
        let max = limit.max_rows.unwrap_or(UNBOUNDED_MAX_ROWS);
        if limit.has_first_row() {
            Ok(LimitedSql {
                sql: format!(
                    "select * from ( select row_.*, rownum rownum_ from ( {body} ) row_ where rownum <= ?) where rownum_ > ?{lock}"
                ),
                leading: Vec::new(),
                trailing: vec![limit.first().saturating_add(max), limit.first()],
            })
        } else {
            Ok(LimitedSql {
                sql: format!("select * from ( {body} ) where rownum <= ?{lock}"),
                leading: Vec::new(),
                trailing: vec![max],
            })
        }
    }
}

/// Derby offset/fetch, placed before a trailing `for update` or `with rs`.
#[derive(Debug, Clone, Copy)]
pub struct DerbyLimitHandler {
    variable: bool,
}

impl DerbyLimitHandler {
    /// Binds the limit values (Derby 10.6 and later).
    pub const INSTANCE: Self = Self { variable: true };
    /// Inlines the limit values (Derby 10.5).
    pub const INLINE_INSTANCE: Self = Self { variable: false };
}

impl LimitHandler for DerbyLimitHandler {
    fn name(&self) -> &'static str {
        "derby"
    }

    fn supports_variable_limit(&self) -> bool {
        self.variable
    }

    fn process_sql(&self, sql: &str, limit: &Limit) -> Result<LimitedSql> {
        if limit.is_empty() {
            return Ok(LimitedSql::unchanged(sql));
        }
        let (body, lock) = split_for_update(sql);
        let mut trailing = Vec::new();
        let clause = offset_fetch_clause(limit, self.variable, &mut trailing);
        Ok(LimitedSql {
            sql: format!("{body}{clause}{lock}"),
            leading: Vec::new(),
            trailing,
        })
    }
}

/// DB2 before 11.1: `fetch first N rows only`, `rownumber()` for offsets.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyDb2LimitHandler;

impl LegacyDb2LimitHandler {
    /// Shared instance.
    pub const INSTANCE: Self = Self;
}

impl LimitHandler for LegacyDb2LimitHandler {
    fn name(&self) -> &'static str {
        "legacy-db2"
    }

    fn supports_variable_limit(&self) -> bool {
        false
    }

    fn process_sql(&self, sql: &str, limit: &Limit) -> Result<LimitedSql> {
        if limit.is_empty() {
            return Ok(LimitedSql::unchanged(sql));
        }
        let (body, lock) = split_for_update(sql);
        let first = limit.first();
        let sql = if limit.has_first_row() {
            let fetch = limit
                .last_row()
                .map(|last| format!(" fetch first {last} rows only"))
                .unwrap_or_default();
            format!(
                "select * from ( select inner2_.*, rownumber() over(order by order of inner2_) as rownumber_ from ( {body}{fetch} ) as inner2_ ) as inner1_ where rownumber_ > {first} order by rownumber_{lock}"
            )
        } else {
            let max = limit.max_rows.unwrap_or(UNBOUNDED_MAX_ROWS);
            format!("{body} fetch first {max} rows only{lock}")
        };
        Ok(LimitedSql::unchanged(&sql))
    }
}

/// InterSystems IRIS: `top ?`, or a `%vid` range over a derived table.
#[derive(Debug, Clone, Copy, Default)]
pub struct IrisLimitHandler;

impl IrisLimitHandler {
    /// Shared instance.
    pub const INSTANCE: Self = Self;
}

impl LimitHandler for IrisLimitHandler {
    fn name(&self) -> &'static str {
        "iris"
    }

    fn process_sql(&self, sql: &str, limit: &Limit) -> Result<LimitedSql> {
        if limit.is_empty() {
            return Ok(LimitedSql::unchanged(sql));
        }
        if !limit.has_first_row() {
            return Ok(LimitedSql {
                sql: insert_after_distinct(" top ?", sql)?,
                leading: limit.max_rows.into_iter().collect(),
                trailing: Vec::new(),
            });
        }
        let inner = insert_after_distinct(" top all", sql)?;
        let max = limit.max_rows.unwrap_or(UNBOUNDED_MAX_ROWS);
        Ok(LimitedSql {
            sql: format!("select * from ({inner}) where %vid between ? and ?"),
            leading: Vec::new(),
            trailing: vec![
                limit.first().saturating_add(1),
                limit.first().saturating_add(max),
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DialectError;

    const SQL: &str = "select a from t";

    fn both(first: u64, max: u64) -> Limit {
        Limit::new(Some(first), Some(max))
    }

    fn max_only(max: u64) -> Limit {
        Limit::new(None, Some(max))
    }

    #[test]
    fn test_noop_and_empty_limit() {
        let out = NoopLimitHandler::INSTANCE.process_sql(SQL, &both(1, 2)).unwrap();
        assert_eq!(out, LimitedSql::unchanged(SQL));
        let out = OffsetFetchLimitHandler::INSTANCE
            .process_sql(SQL, &Limit::default())
            .unwrap();
        assert_eq!(out.sql, SQL);
        assert!(!NoopLimitHandler::INSTANCE.supports_offset());
    }

    #[test]
    fn test_limit_offset() {
        let out = LimitOffsetLimitHandler::INSTANCE
            .process_sql("select a from t for update", &both(10, 5))
            .unwrap();
        assert_eq!(out.sql, "select a from t limit ? offset ? for update");
        assert_eq!(out.trailing, vec![5, 10]);

        let out = LimitOffsetLimitHandler::INSTANCE
            .process_sql(SQL, &Limit::new(Some(3), None))
            .unwrap();
        assert_eq!(out.sql, "select a from t limit ? offset ?");
        assert_eq!(out.trailing, vec![UNBOUNDED_MAX_ROWS, 3]);

        let out = LimitOffsetLimitHandler::OFFSET_ONLY_INSTANCE
            .process_sql(SQL, &Limit::new(Some(3), None))
            .unwrap();
        assert_eq!(out.sql, "select a from t offset ?");
    }

    #[test]
    fn test_limit_limit() {
        let out = LimitLimitHandler::INSTANCE.process_sql(SQL, &both(10, 5)).unwrap();
        assert_eq!(out.sql, "select a from t limit ?, ?");
        assert_eq!(out.trailing, vec![10, 5]);
        let out = LimitLimitHandler::INSTANCE.process_sql(SQL, &max_only(5)).unwrap();
        assert_eq!(out.sql, "select a from t limit ?");
    }

    #[test]
    fn test_offset_fetch() {
        let out = OffsetFetchLimitHandler::INSTANCE
            .process_sql(SQL, &both(10, 5))
            .unwrap();
        assert_eq!(out.sql, "select a from t offset ? rows fetch next ? rows only");
        assert_eq!(out.trailing, vec![10, 5]);
        let out = OffsetFetchLimitHandler::INLINE_INSTANCE
            .process_sql(SQL, &max_only(5))
            .unwrap();
        assert_eq!(out.sql, "select a from t fetch first 5 rows only");
        assert!(out.trailing.is_empty());
    }

    #[test]
    fn test_offset_rejected() {
        let err = TopLimitHandler::INSTANCE
            .process_sql(SQL, &both(1, 2))
            .unwrap_err();
        assert!(matches!(err, DialectError::Unsupported(_)));
        assert!(FirstLimitHandler::INSTANCE.process_sql(SQL, &both(1, 2)).is_err());
        assert!(FetchLimitHandler::INSTANCE.process_sql(SQL, &both(1, 2)).is_err());
    }

    #[test]
    fn test_select_prefix_handlers() {
        let distinct = "select distinct a from t";
        assert_eq!(
            FirstLimitHandler::INSTANCE.process_sql(distinct, &max_only(5)).unwrap().sql,
            "select first 5 distinct a from t"
        );
        let out = SkipFirstLimitHandler::INSTANCE
            .process_sql(distinct, &both(10, 5))
            .unwrap();
        assert_eq!(out.sql, "select skip ? first ? distinct a from t");
        assert_eq!(out.leading, vec![10, 5]);
        let out = FirstSkipLimitHandler::INSTANCE
            .process_sql(SQL, &both(10, 5))
            .unwrap();
        assert_eq!(out.sql, "select first ? skip ? a from t");
        assert_eq!(out.leading, vec![5, 10]);
        let out = TopLimitHandler::INSTANCE.process_sql(distinct, &max_only(5)).unwrap();
        assert_eq!(out.sql, "select distinct top ? a from t");
        assert_eq!(out.leading, vec![5]);
    }

    #[test]
    fn test_legacy_oracle() {
        let out = LegacyOracleLimitHandler::INSTANCE
            .process_sql("select a from t for update", &both(10, 5))
            .unwrap();
        assert_eq!(
            out.sql,
            "select * from ( select row_.*, rownum rownum_ from ( select a from t ) row_ where rownum <= ?) where rownum_ > ? for update"
        );
        assert_eq!(out.trailing, vec![15, 10]);
        let out = LegacyOracleLimitHandler::INSTANCE
            .process_sql(SQL, &max_only(5))
            .unwrap();
        assert_eq!(out.sql, "select * from ( select a from t ) where rownum <= ?");
    }

    #[test]
    fn test_derby_before_lock_clause() {
        let out = DerbyLimitHandler::INSTANCE
            .process_sql("select a from t for update with rs", &both(10, 5))
            .unwrap();
        assert_eq!(
            out.sql,
            "select a from t offset ? rows fetch next ? rows only for update with rs"
        );
    }

    #[test]
    fn test_legacy_db2() {
        let out = LegacyDb2LimitHandler::INSTANCE
            .process_sql(SQL, &max_only(5))
            .unwrap();
        assert_eq!(out.sql, "select a from t fetch first 5 rows only");
        let out = LegacyDb2LimitHandler::INSTANCE
            .process_sql(SQL, &both(10, 5))
            .unwrap();
        assert_eq!(
            out.sql,
            "select * from ( select inner2_.*, rownumber() over(order by order of inner2_) as rownumber_ from ( select a from t fetch first 15 rows only ) as inner2_ ) as inner1_ where rownumber_ > 10 order by rownumber_"
        );
        assert!(out.trailing.is_empty());
    }

    #[test]
    fn test_iris() {
        let out = IrisLimitHandler::INSTANCE.process_sql(SQL, &both(10, 5)).unwrap();
        assert_eq!(
            out.sql,
            "select * from (select top all a from t) where %vid between ? and ?"
        );
        assert_eq!(out.trailing, vec![11, 15]);
        let out = IrisLimitHandler::INSTANCE.process_sql(SQL, &max_only(5)).unwrap();
        assert_eq!(out.sql, "select top ? a from t");
    }

    #[test]
    fn test_legacy_hsql() {
        let out = LegacyHsqlLimitHandler::INSTANCE
            .process_sql(SQL, &both(10, 5))
            .unwrap();
        assert_eq!(out.sql, "select limit ? ? a from t");
        assert_eq!(out.leading, vec![10, 5]);
    }
}
