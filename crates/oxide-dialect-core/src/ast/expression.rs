//! Expression AST types.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::statement::{OrderBy, SelectStatement};
use super::types::{CastTarget, SqlTypeCode};
use crate::dialect::{TemporalType, TemporalUnit};

/// A literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    /// Integer literal.
    Integer(i64),
    /// Float literal.
    Float(f64),
    /// String literal.
    String(String),
    /// Binary literal.
    Binary(Vec<u8>),
    /// Boolean literal.
    Boolean(bool),
    /// NULL literal.
    Null,
    /// Date literal.
    Date(NaiveDate),
    /// Time literal.
    Time(NaiveTime),
    /// Timestamp literal.
    Timestamp(NaiveDateTime),
}

/// A date, time or timestamp value handed to a dialect for literal rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatetimeLiteral {
    /// A calendar date.
    Date(NaiveDate),
    /// A time of day.
    Time(NaiveTime),
    /// A date and time of day.
    Timestamp(NaiveDateTime),
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    And,
    Or,

    // String
    Concat,

    // Bitwise
    BitAnd,
    BitOr,
}

impl BinaryOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "and",
            Self::Or => "or",
            Self::Concat => "||",
            Self::BitAnd => "&",
            Self::BitOr => "|",
        }
    }

    /// Returns the precedence of the operator (higher = binds tighter).
    #[must_use]
    pub const fn precedence(&self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq => 3,
            Self::BitOr => 5,
            Self::BitAnd => 6,
            Self::Add | Self::Sub | Self::Concat => 8,
            Self::Mul | Self::Div | Self::Mod => 9,
        }
    }

    /// Returns true for `=`, `<>`, `<`, `<=`, `>` and `>=`.
    #[must_use]
    pub const fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq
        )
    }

    /// Returns true for `and` and `or`.
    #[must_use]
    pub const fn is_logical(&self) -> bool {
        matches!(self, Self::And | Self::Or)
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    /// Negation (-)
    Neg,
    /// Logical NOT
    Not,
    /// Bitwise NOT (~)
    BitNot,
}

impl UnaryOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Not => "not",
            Self::BitNot => "~",
        }
    }
}

/// A function call expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// The function name.
    pub name: String,
    /// The arguments.
    #[serde(default)]
    pub args: Vec<Expr>,
    /// Whether DISTINCT was specified.
    #[serde(default)]
    pub distinct: bool,
}

impl FunctionCall {
    /// Creates a function call without DISTINCT.
    #[must_use]
    pub fn new(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self {
            name: name.into(),
            args,
            distinct: false,
        }
    }
}

/// An SQL expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    /// A literal value.
    Literal(Literal),

    /// A column reference (optionally qualified with table name).
    Column {
        /// Table name or alias (optional).
        #[serde(default)]
        table: Option<String>,
        /// Column name.
        name: String,
    },

    /// A JDBC bind parameter.
    Parameter {
        /// 1-based position of the value in the caller's parameter list.
        position: usize,
        /// Declared type, when known.
        #[serde(default)]
        sql_type: Option<SqlTypeCode>,
    },

    /// A binary expression.
    Binary {
        /// Left operand.
        left: Box<Expr>,
        /// Operator.
        op: BinaryOp,
        /// Right operand.
        right: Box<Expr>,
    },

    /// A unary expression.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
    },

    /// A function call.
    Function(FunctionCall),

    /// A scalar subquery.
    Subquery(Box<SelectStatement>),

    /// `[NOT] EXISTS (subquery)`.
    Exists {
        /// The subquery.
        query: Box<SelectStatement>,
        /// Whether this is NOT EXISTS.
        #[serde(default)]
        negated: bool,
    },

    /// IS NULL expression.
    IsNull {
        /// The expression to check.
        expr: Box<Expr>,
        /// Whether this is IS NOT NULL.
        #[serde(default)]
        negated: bool,
    },

    /// IN expression.
    In {
        /// The expression to check.
        expr: Box<Expr>,
        /// The list of values.
        list: Vec<Expr>,
        /// Whether this is NOT IN.
        #[serde(default)]
        negated: bool,
    },

    /// IN (subquery) expression.
    InSubquery {
        /// The expression to check.
        expr: Box<Expr>,
        /// The subquery.
        query: Box<SelectStatement>,
        /// Whether this is NOT IN.
        #[serde(default)]
        negated: bool,
    },

    /// BETWEEN expression.
    Between {
        /// The expression to check.
        expr: Box<Expr>,
        /// Lower bound.
        low: Box<Expr>,
        /// Upper bound.
        high: Box<Expr>,
        /// Whether this is NOT BETWEEN.
        #[serde(default)]
        negated: bool,
    },

    /// LIKE expression.
    Like {
        /// The matched expression.
        expr: Box<Expr>,
        /// The pattern.
        pattern: Box<Expr>,
        /// Escape character expression.
        #[serde(default)]
        escape: Option<Box<Expr>>,
        /// Whether this is NOT LIKE.
        #[serde(default)]
        negated: bool,
        /// Whether matching ignores case.
        #[serde(default)]
        case_insensitive: bool,
    },

    /// `IS [NOT] DISTINCT FROM`.
    DistinctFrom {
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
        /// Whether this is IS NOT DISTINCT FROM.
        #[serde(default)]
        negated: bool,
    },

    /// CASE expression.
    Case {
        /// The operand (if any).
        #[serde(default)]
        operand: Option<Box<Expr>>,
        /// WHEN/THEN clauses.
        when_clauses: Vec<(Expr, Expr)>,
        /// ELSE clause.
        #[serde(default)]
        else_clause: Option<Box<Expr>>,
    },

    /// CAST expression.
    Cast {
        /// Expression to cast.
        expr: Box<Expr>,
        /// Target type.
        target: CastTarget,
    },

    /// A row value constructor, `(a, b, ...)`.
    Tuple(Vec<Expr>),

    /// Parenthesized expression.
    Paren(Box<Expr>),

    /// Wildcard (*) in SELECT.
    Wildcard {
        /// Table qualifier (optional).
        #[serde(default)]
        table: Option<String>,
    },

    /// `extract(unit from expr)`.
    Extract {
        /// The field to extract.
        unit: TemporalUnit,
        /// The temporal operand.
        expr: Box<Expr>,
    },

    /// Adds `magnitude` units to a date, time or timestamp.
    TimestampAdd {
        /// Unit of the magnitude.
        unit: TemporalUnit,
        /// Amount to add.
        magnitude: Box<Expr>,
        /// Temporal operand.
        datetime: Box<Expr>,
        /// Type of the temporal operand.
        temporal_type: TemporalType,
    },

    /// Difference between two temporal values in the given unit.
    TimestampDiff {
        /// Unit of the result.
        unit: TemporalUnit,
        /// Start value.
        from: Box<Expr>,
        /// End value.
        to: Box<Expr>,
        /// Type of the start value.
        from_type: TemporalType,
        /// Type of the end value.
        to_type: TemporalType,
    },

    /// A window function call, `f(...) over(partition by ... order by ...)`.
    Window {
        /// The function.
        function: FunctionCall,
        /// PARTITION BY expressions.
        #[serde(default)]
        partition_by: Vec<Expr>,
        /// ORDER BY items.
        #[serde(default)]
        order_by: Vec<OrderBy>,
    },

    /// `current_date`, `current_time` or `current_timestamp`.
    Current(TemporalType),

    /// Formats a temporal value with a Java-style pattern such as `yyyy-MM-dd`.
    Format {
        /// Temporal operand.
        expr: Box<Expr>,
        /// Pattern.
        format: String,
    },
}

impl Expr {
    /// Creates a new column reference.
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column {
            table: None,
            name: name.into(),
        }
    }

    /// Creates a new qualified column reference.
    #[must_use]
    pub fn qualified_column(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Column {
            table: Some(table.into()),
            name: name.into(),
        }
    }

    /// Creates an untyped bind parameter at the given 1-based position.
    #[must_use]
    pub const fn param(position: usize) -> Self {
        Self::Parameter {
            position,
            sql_type: None,
        }
    }

    /// Creates a new integer literal.
    #[must_use]
    pub const fn integer(value: i64) -> Self {
        Self::Literal(Literal::Integer(value))
    }

    /// Creates a new float literal.
    #[must_use]
    pub const fn float(value: f64) -> Self {
        Self::Literal(Literal::Float(value))
    }

    /// Creates a new string literal.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::Literal(Literal::String(value.into()))
    }

    /// Creates a new boolean literal.
    #[must_use]
    pub const fn boolean(value: bool) -> Self {
        Self::Literal(Literal::Boolean(value))
    }

    /// Creates a NULL literal.
    #[must_use]
    pub const fn null() -> Self {
        Self::Literal(Literal::Null)
    }

    /// Creates a function call.
    #[must_use]
    pub fn function(name: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Function(FunctionCall::new(name, args))
    }

    /// Creates a row value constructor.
    #[must_use]
    pub const fn tuple(items: Vec<Self>) -> Self {
        Self::Tuple(items)
    }

    /// Creates a binary expression.
    #[must_use]
    pub fn binary(self, op: BinaryOp, right: Self) -> Self {
        Self::Binary {
            left: Box::new(self),
            op,
            right: Box::new(right),
        }
    }

    /// Creates an equality expression.
    #[must_use]
    pub fn eq(self, right: Self) -> Self {
        self.binary(BinaryOp::Eq, right)
    }

    /// Creates an inequality expression.
    #[must_use]
    pub fn not_eq(self, right: Self) -> Self {
        self.binary(BinaryOp::NotEq, right)
    }

    /// Creates a less-than expression.
    #[must_use]
    pub fn lt(self, right: Self) -> Self {
        self.binary(BinaryOp::Lt, right)
    }

    /// Creates a less-than-or-equal expression.
    #[must_use]
    pub fn lt_eq(self, right: Self) -> Self {
        self.binary(BinaryOp::LtEq, right)
    }

    /// Creates a greater-than expression.
    #[must_use]
    pub fn gt(self, right: Self) -> Self {
        self.binary(BinaryOp::Gt, right)
    }

    /// Creates a greater-than-or-equal expression.
    #[must_use]
    pub fn gt_eq(self, right: Self) -> Self {
        self.binary(BinaryOp::GtEq, right)
    }

    /// Creates an AND expression.
    #[must_use]
    pub fn and(self, right: Self) -> Self {
        self.binary(BinaryOp::And, right)
    }

    /// Creates an OR expression.
    #[must_use]
    pub fn or(self, right: Self) -> Self {
        self.binary(BinaryOp::Or, right)
    }

    /// Creates a NOT expression.
    #[must_use]
    pub fn not(self) -> Self {
        Self::Unary {
            op: UnaryOp::Not,
            operand: Box::new(self),
        }
    }

    /// Creates an IS NULL expression.
    #[must_use]
    pub fn is_null(self) -> Self {
        Self::IsNull {
            expr: Box::new(self),
            negated: false,
        }
    }

    /// Creates an IS NOT NULL expression.
    #[must_use]
    pub fn is_not_null(self) -> Self {
        Self::IsNull {
            expr: Box::new(self),
            negated: true,
        }
    }

    /// Creates a BETWEEN expression.
    #[must_use]
    pub fn between(self, low: Self, high: Self) -> Self {
        Self::Between {
            expr: Box::new(self),
            low: Box::new(low),
            high: Box::new(high),
            negated: false,
        }
    }

    /// Creates an IN expression.
    #[must_use]
    pub fn in_list(self, list: Vec<Self>) -> Self {
        Self::In {
            expr: Box::new(self),
            list,
            negated: false,
        }
    }

    /// Creates a NOT IN expression.
    #[must_use]
    pub fn not_in_list(self, list: Vec<Self>) -> Self {
        Self::In {
            expr: Box::new(self),
            list,
            negated: true,
        }
    }

    /// Creates a LIKE expression.
    #[must_use]
    pub fn like(self, pattern: Self) -> Self {
        Self::Like {
            expr: Box::new(self),
            pattern: Box::new(pattern),
            escape: None,
            negated: false,
            case_insensitive: false,
        }
    }

    /// Creates an IS DISTINCT FROM expression.
    #[must_use]
    pub fn distinct_from(self, right: Self) -> Self {
        Self::DistinctFrom {
            left: Box::new(self),
            right: Box::new(right),
            negated: false,
        }
    }

    /// Creates an IS NOT DISTINCT FROM expression.
    #[must_use]
    pub fn not_distinct_from(self, right: Self) -> Self {
        Self::DistinctFrom {
            left: Box::new(self),
            right: Box::new(right),
            negated: true,
        }
    }

    /// Creates a CAST expression with the type's default size.
    #[must_use]
    pub fn cast(self, code: SqlTypeCode) -> Self {
        Self::Cast {
            expr: Box::new(self),
            target: CastTarget::new(code),
        }
    }

    /// Returns true if the expression is boolean-valued by construction.
    #[must_use]
    pub fn is_predicate(&self) -> bool {
        match self {
            Self::Binary { op, .. } => op.is_comparison() || op.is_logical(),
            Self::Unary { op, .. } => matches!(op, UnaryOp::Not),
            Self::Paren(inner) => inner.is_predicate(),
            Self::Exists { .. }
            | Self::IsNull { .. }
            | Self::In { .. }
            | Self::InSubquery { .. }
            | Self::Between { .. }
            | Self::Like { .. }
            | Self::DistinctFrom { .. } => true,
            _ => false,
        }
    }

    /// Returns true for an untyped bind parameter.
    #[must_use]
    pub const fn is_untyped_parameter(&self) -> bool {
        matches!(self, Self::Parameter { sql_type: None, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_op_precedence() {
        assert!(BinaryOp::Mul.precedence() > BinaryOp::Add.precedence());
        assert!(BinaryOp::And.precedence() > BinaryOp::Or.precedence());
        assert!(BinaryOp::Eq.precedence() > BinaryOp::And.precedence());
    }

    #[test]
    fn test_expr_builders() {
        let col = Expr::column("name");
        assert!(matches!(col, Expr::Column { name, .. } if name == "name"));

        let lit = Expr::integer(42);
        assert!(matches!(lit, Expr::Literal(Literal::Integer(42))));

        let param = Expr::param(3);
        assert!(param.is_untyped_parameter());
    }

    #[test]
    fn test_expr_chaining() {
        let expr = Expr::column("age")
            .gt(Expr::integer(18))
            .and(Expr::column("status").eq(Expr::string("active")));

        assert!(matches!(
            expr,
            Expr::Binary {
                op: BinaryOp::And,
                ..
            }
        ));
        assert!(expr.is_predicate());
    }

    #[test]
    fn test_is_predicate() {
        assert!(Expr::column("a").is_null().is_predicate());
        assert!(Expr::column("a").distinct_from(Expr::param(1)).is_predicate());
        assert!(!Expr::column("a").binary(BinaryOp::Add, Expr::integer(1)).is_predicate());
        assert!(!Expr::boolean(true).is_predicate());
    }

    #[test]
    fn test_expr_from_json() {
        let json = r#"{"binary":{"left":{"column":{"name":"id"}},"op":"eq","right":{"parameter":{"position":1}}}}"#;
        let expr: Expr = serde_json::from_str(json).unwrap();
        assert_eq!(expr, Expr::column("id").eq(Expr::param(1)));
    }
}
