//! Abstract Syntax Tree (AST) types for SQL statements.
//!
//! The tree is owned by the caller and only read by translators. Every
//! node derives `serde` so statements can be loaded from JSON.

mod expression;
mod statement;
mod types;

pub use expression::{BinaryOp, DatetimeLiteral, Expr, FunctionCall, Literal, UnaryOp};
pub use statement::{
    ConflictAction, DeleteStatement, InsertSource, InsertStatement, JoinClause, JoinType,
    NullPrecedence, OnConflict, OrderBy, OrderDirection, SelectColumn, SelectStatement,
    SetOperation, SetOperator, Statement, TableRef, UpdateAssignment, UpdateStatement,
};
pub use types::{expand_type_template, CastTarget, Size, SqlTypeCode};
