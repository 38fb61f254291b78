//! SQL statement AST types.

use serde::{Deserialize, Serialize};

use super::expression::Expr;

/// Order direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderDirection {
    /// Ascending order (default).
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl OrderDirection {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Requested null placement for an ORDER BY item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullPrecedence {
    /// NULLs come first.
    First,
    /// NULLs come last.
    Last,
}

impl NullPrecedence {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::First => "nulls first",
            Self::Last => "nulls last",
        }
    }
}

/// An ORDER BY clause entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    /// The expression to order by.
    pub expr: Expr,
    /// The direction (ASC or DESC).
    #[serde(default)]
    pub direction: OrderDirection,
    /// Null ordering (optional).
    #[serde(default)]
    pub nulls: Option<NullPrecedence>,
}

impl OrderBy {
    /// Ascending sort on `expr`.
    #[must_use]
    pub const fn asc(expr: Expr) -> Self {
        Self {
            expr,
            direction: OrderDirection::Asc,
            nulls: None,
        }
    }

    /// Descending sort on `expr`.
    #[must_use]
    pub const fn desc(expr: Expr) -> Self {
        Self {
            expr,
            direction: OrderDirection::Desc,
            nulls: None,
        }
    }

    /// Sets the null precedence.
    #[must_use]
    pub const fn nulls(mut self, nulls: NullPrecedence) -> Self {
        self.nulls = Some(nulls);
        self
    }
}

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinType {
    /// INNER JOIN.
    Inner,
    /// LEFT OUTER JOIN.
    Left,
    /// RIGHT OUTER JOIN.
    Right,
    /// FULL OUTER JOIN.
    Full,
    /// CROSS JOIN.
    Cross,
}

impl JoinType {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inner => "join",
            Self::Left => "left join",
            Self::Right => "right join",
            Self::Full => "full join",
            Self::Cross => "cross join",
        }
    }
}

/// A JOIN clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinClause {
    /// The type of join.
    pub join_type: JoinType,
    /// The table to join.
    pub table: TableRef,
    /// The join condition (for non-CROSS joins).
    #[serde(default)]
    pub on: Option<Expr>,
}

/// A table reference in FROM clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableRef {
    /// A simple table name.
    Table {
        /// Schema name (optional).
        #[serde(default)]
        schema: Option<String>,
        /// Table name.
        name: String,
        /// Alias.
        #[serde(default)]
        alias: Option<String>,
    },
    /// A derived table.
    Subquery {
        /// The subquery.
        query: Box<SelectStatement>,
        /// Alias (required for subqueries).
        alias: String,
        /// Whether the subquery is LATERAL.
        #[serde(default)]
        lateral: bool,
    },
    /// A joined table.
    Join {
        /// Left side of the join.
        left: Box<TableRef>,
        /// The join clause.
        join: Box<JoinClause>,
    },
}

impl TableRef {
    /// Creates a simple table reference.
    #[must_use]
    pub fn table(name: impl Into<String>) -> Self {
        Self::Table {
            schema: None,
            name: name.into(),
            alias: None,
        }
    }

    /// Creates a table reference with schema.
    #[must_use]
    pub fn with_schema(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Table {
            schema: Some(schema.into()),
            name: name.into(),
            alias: None,
        }
    }

    /// Adds an alias to this table reference.
    #[must_use]
    pub fn alias(self, alias: impl Into<String>) -> Self {
        match self {
            Self::Table { schema, name, .. } => Self::Table {
                schema,
                name,
                alias: Some(alias.into()),
            },
            Self::Subquery { query, lateral, .. } => Self::Subquery {
                query,
                alias: alias.into(),
                lateral,
            },
            Self::Join { left, join } => Self::Join {
                left: Box::new((*left).alias(alias)),
                join,
            },
        }
    }

    /// Joins `table` to this reference.
    #[must_use]
    pub fn join(self, join_type: JoinType, table: Self, on: Option<Expr>) -> Self {
        Self::Join {
            left: Box::new(self),
            join: Box::new(JoinClause {
                join_type,
                table,
                on,
            }),
        }
    }
}

/// Set operators combining query specifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetOperator {
    Union,
    UnionAll,
    Intersect,
    IntersectAll,
    Except,
    ExceptAll,
}

impl SetOperator {
    /// Returns the ANSI keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Union => "union",
            Self::UnionAll => "union all",
            Self::Intersect => "intersect",
            Self::IntersectAll => "intersect all",
            Self::Except => "except",
            Self::ExceptAll => "except all",
        }
    }

    /// Returns true for the ALL variants.
    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::UnionAll | Self::IntersectAll | Self::ExceptAll)
    }
}

/// A query specification combined with the preceding one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetOperation {
    /// The operator.
    pub op: SetOperator,
    /// The right-hand query specification.
    pub query: SelectStatement,
}

/// A SELECT statement.
///
/// `order_by`, `limit` and `offset` apply to the whole statement when
/// `set_ops` is not empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectStatement {
    /// Whether to select DISTINCT values.
    pub distinct: bool,
    /// The columns to select.
    pub columns: Vec<SelectColumn>,
    /// The FROM clause.
    pub from: Option<TableRef>,
    /// The WHERE clause.
    pub where_clause: Option<Expr>,
    /// GROUP BY expressions.
    pub group_by: Vec<Expr>,
    /// HAVING clause.
    pub having: Option<Expr>,
    /// UNION / INTERSECT / EXCEPT operands.
    pub set_ops: Vec<SetOperation>,
    /// ORDER BY clauses.
    pub order_by: Vec<OrderBy>,
    /// Row limit (FETCH FIRST / LIMIT).
    pub limit: Option<Expr>,
    /// Rows to skip (OFFSET).
    pub offset: Option<Expr>,
}

impl SelectStatement {
    /// Creates a SELECT of the given columns from `from`.
    #[must_use]
    pub fn new(columns: Vec<SelectColumn>, from: Option<TableRef>) -> Self {
        Self {
            columns,
            from,
            ..Self::default()
        }
    }

    /// Returns true if the statement carries an offset or a limit.
    #[must_use]
    pub const fn has_fetch(&self) -> bool {
        self.limit.is_some() || self.offset.is_some()
    }
}

/// A column in SELECT clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectColumn {
    /// The expression.
    pub expr: Expr,
    /// Column alias.
    #[serde(default)]
    pub alias: Option<String>,
}

impl SelectColumn {
    /// Creates a new select column.
    #[must_use]
    pub const fn new(expr: Expr) -> Self {
        Self { expr, alias: None }
    }

    /// Creates a select column with an alias.
    #[must_use]
    pub fn with_alias(expr: Expr, alias: impl Into<String>) -> Self {
        Self {
            expr,
            alias: Some(alias.into()),
        }
    }
}

/// An INSERT statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertStatement {
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Table name.
    pub table: String,
    /// Column names (optional).
    #[serde(default)]
    pub columns: Vec<String>,
    /// Values to insert.
    pub values: InsertSource,
    /// ON CONFLICT clause (for UPSERT).
    #[serde(default)]
    pub on_conflict: Option<OnConflict>,
}

/// Source of data for INSERT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertSource {
    /// VALUES (...), (...), ...
    Values(Vec<Vec<Expr>>),
    /// SELECT ...
    Query(Box<SelectStatement>),
    /// DEFAULT VALUES
    DefaultValues,
}

/// ON CONFLICT clause for UPSERT.
///
/// Assignment values may refer to the proposed row through columns
/// qualified with [`OnConflict::EXCLUDED`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnConflict {
    /// Conflict target columns.
    pub columns: Vec<String>,
    /// Action to take on conflict.
    pub action: ConflictAction,
}

impl OnConflict {
    /// Qualifier naming the row proposed for insertion.
    pub const EXCLUDED: &'static str = "excluded";
}

/// Action to take on conflict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictAction {
    /// DO NOTHING
    DoNothing,
    /// DO UPDATE SET ...
    DoUpdate(Vec<UpdateAssignment>),
}

/// An UPDATE statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateStatement {
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Table name.
    pub table: String,
    /// Alias.
    #[serde(default)]
    pub alias: Option<String>,
    /// SET assignments.
    pub assignments: Vec<UpdateAssignment>,
    /// FROM clause (for joins in UPDATE).
    #[serde(default)]
    pub from: Option<TableRef>,
    /// WHERE clause.
    #[serde(default)]
    pub where_clause: Option<Expr>,
}

/// An assignment in UPDATE SET.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateAssignment {
    /// Column name.
    pub column: String,
    /// Value expression.
    pub value: Expr,
}

impl UpdateAssignment {
    /// Creates an assignment.
    #[must_use]
    pub fn new(column: impl Into<String>, value: Expr) -> Self {
        Self {
            column: column.into(),
            value,
        }
    }
}

/// A DELETE statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteStatement {
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Table name.
    pub table: String,
    /// Alias.
    #[serde(default)]
    pub alias: Option<String>,
    /// WHERE clause.
    #[serde(default)]
    pub where_clause: Option<Expr>,
}

/// A SQL statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    /// SELECT statement.
    Select(SelectStatement),
    /// INSERT statement.
    Insert(InsertStatement),
    /// UPDATE statement.
    Update(UpdateStatement),
    /// DELETE statement.
    Delete(DeleteStatement),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_direction() {
        assert_eq!(OrderDirection::Asc.as_str(), "asc");
        assert_eq!(OrderDirection::Desc.as_str(), "desc");
    }

    #[test]
    fn test_join_type() {
        assert_eq!(JoinType::Inner.as_str(), "join");
        assert_eq!(JoinType::Left.as_str(), "left join");
    }

    #[test]
    fn test_table_ref_builder() {
        let table = TableRef::table("users").alias("u");
        assert!(
            matches!(table, TableRef::Table { name, alias, .. } if name == "users" && alias == Some(String::from("u")))
        );
    }

    #[test]
    fn test_set_operator() {
        assert_eq!(SetOperator::ExceptAll.as_str(), "except all");
        assert!(SetOperator::UnionAll.is_all());
        assert!(!SetOperator::Intersect.is_all());
    }

    #[test]
    fn test_statement_from_json() {
        let json = r#"{"select":{"columns":[{"expr":{"column":{"name":"id"}}}],"from":{"table":{"name":"orders"}},"limit":{"parameter":{"position":1}}}}"#;
        let statement: Statement = serde_json::from_str(json).unwrap();
        let Statement::Select(select) = statement else {
            panic!("expected a select");
        };
        assert_eq!(select.columns.len(), 1);
        assert!(select.has_fetch());
        assert_eq!(select.from, Some(TableRef::table("orders")));
    }
}
