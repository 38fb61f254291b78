//! SQL AST to text translation.
//!
//! A [`SqlAstTranslator`] walks a [`Statement`] and writes SQL for one
//! dialect into its [`TranslationContext`]. Every hook has a default in
//! [`standard`]; a dialect translator overrides the hooks whose output
//! differs and can call the standard function for the common part.

pub mod standard;

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::{
    BinaryOp, CastTarget, DeleteStatement, Expr, FunctionCall, InsertStatement, Literal,
    OnConflict, OrderBy, SelectStatement, SetOperator, SqlTypeCode, Statement, TableRef,
    UpdateStatement,
};
use crate::dialect::{Dialect, Fragment, FunctionRegistry, LockOptions};
use crate::error::Result;
use crate::pagination::Limit;

/// A bind value slot in the rendered SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterBinding {
    /// The caller's parameter at this 1-based position.
    Query(usize),
    /// A row limit value.
    Limit(u64),
}

/// Rendered SQL and its bind parameters in text order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JdbcOperation {
    /// SQL text.
    pub sql: String,
    /// One binding per `?` in `sql`.
    pub parameters: Vec<ParameterBinding>,
}

/// Per-execution options applied to a root query.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Row limit applied through the dialect's limit handler.
    pub limit: Option<Limit>,
    /// Pessimistic lock.
    pub lock: Option<LockOptions>,
}

impl QueryOptions {
    /// Sets the row limit.
    #[must_use]
    pub const fn with_limit(mut self, limit: Limit) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the lock.
    #[must_use]
    pub fn with_lock(mut self, lock: LockOptions) -> Self {
        self.lock = Some(lock);
        self
    }
}

/// Clause being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    Select,
    From,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Fetch,
    Values,
    Set,
    Merge,
}

/// How offset and fetch of a query are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationStyle {
    /// ` offset o rows fetch next l rows only`.
    OffsetFetch,
    /// ` limit l offset o`.
    LimitOffset,
    /// ` limit o,l`.
    LimitComma,
    /// `select skip o first l`.
    SkipFirst,
    /// `select first l skip o`.
    FirstSkip,
    /// `select top l`, or `select top(l)`; offsets are emulated.
    Top {
        /// Whether the value is parenthesized.
        parenthesized: bool,
    },
    /// `row_number()` in a derived table.
    RowNumber,
}

/// How columns qualified with [`OnConflict::EXCLUDED`] are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExcludedColumns {
    /// As written.
    #[default]
    Keep,
    /// Qualified with a source alias instead.
    Alias(&'static str),
    /// As `values(column)`.
    ValuesFunction,
}

/// Mutable state of one translation.
pub struct TranslationContext<'d> {
    /// Target dialect.
    pub dialect: &'d dyn Dialect,
    /// The dialect's function renderings.
    pub functions: FunctionRegistry,
    /// SQL written so far.
    pub sql: String,
    /// Bindings of the `?` in `sql`.
    pub parameters: Vec<ParameterBinding>,
    /// True while rendering function arguments.
    pub in_function_call: bool,
    /// Options of the statement.
    pub options: QueryOptions,
    /// Rendering of `excluded.column`.
    pub excluded: ExcludedColumns,
    clause_stack: Vec<Clause>,
    query_depth: usize,
}

impl fmt::Debug for TranslationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationContext")
            .field("dialect", &self.dialect.name())
            .field("sql", &self.sql)
            .field("parameters", &self.parameters)
            .field("clause_stack", &self.clause_stack)
            .finish_non_exhaustive()
    }
}

impl<'d> TranslationContext<'d> {
    /// Creates a context with the dialect's functions registered.
    #[must_use]
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        let mut functions = FunctionRegistry::new();
        dialect.initialize_function_registry(&mut functions);
        Self {
            dialect,
            functions,
            sql: String::new(),
            parameters: Vec::new(),
            in_function_call: false,
            options: QueryOptions::default(),
            excluded: ExcludedColumns::Keep,
            clause_stack: Vec::new(),
            query_depth: 0,
        }
    }

    /// Appends SQL text.
    pub fn append(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Appends a translated fragment.
    pub fn emit(&mut self, fragment: &Fragment) {
        self.sql.push_str(&fragment.sql);
        self.parameters.extend_from_slice(&fragment.parameters);
    }

    /// Appends a bind parameter.
    pub fn bind(&mut self, binding: ParameterBinding) {
        self.sql.push('?');
        self.parameters.push(binding);
    }

    /// Enters a clause.
    pub fn push_clause(&mut self, clause: Clause) {
        self.clause_stack.push(clause);
    }

    /// Leaves the current clause.
    pub fn pop_clause(&mut self) {
        self.clause_stack.pop();
    }

    /// Innermost clause being rendered.
    #[must_use]
    pub fn current_clause(&self) -> Option<Clause> {
        self.clause_stack.last().copied()
    }

    /// Enters a query block.
    pub fn enter_query(&mut self) {
        self.query_depth += 1;
    }

    /// Leaves a query block.
    pub fn exit_query(&mut self) {
        self.query_depth = self.query_depth.saturating_sub(1);
    }

    /// Nesting depth of the query being rendered; 1 for the root query.
    #[must_use]
    pub const fn query_depth(&self) -> usize {
        self.query_depth
    }

    /// Returns true while rendering the root query block.
    #[must_use]
    pub const fn is_root_query(&self) -> bool {
        self.query_depth <= 1
    }
}

/// Visitor rendering a statement tree as SQL.
pub trait SqlAstTranslator<'d> {
    /// Translation state.
    fn context(&mut self) -> &mut TranslationContext<'d>;

    /// Translation state, read only.
    fn context_ref(&self) -> &TranslationContext<'d>;

    /// Renders a statement with its options.
    ///
    /// # Errors
    ///
    /// Fails on constructs the dialect cannot express.
    fn translate(&mut self, statement: &Statement, options: &QueryOptions) -> Result<JdbcOperation> {
        standard::translate(self, statement, options)
    }

    /// Renders any statement.
    ///
    /// # Errors
    ///
    /// Fails on constructs the dialect cannot express.
    fn visit_statement(&mut self, statement: &Statement) -> Result<()> {
        standard::visit_statement(self, statement)
    }

    /// Renders a query with its set operations, ordering and paging.
    ///
    /// # Errors
    ///
    /// Fails on constructs the dialect cannot express.
    fn visit_select(&mut self, select: &SelectStatement) -> Result<()> {
        standard::visit_select(self, select)
    }

    /// Renders `select ... from ... where ... group by ... having ...`.
    ///
    /// # Errors
    ///
    /// Fails on constructs the dialect cannot express.
    fn visit_query_spec(&mut self, select: &SelectStatement) -> Result<()> {
        standard::visit_query_spec(self, select)
    }

    /// Renders `select [distinct] items`, with any prefix paging.
    ///
    /// # Errors
    ///
    /// Fails on constructs the dialect cannot express.
    fn visit_select_clause(&mut self, select: &SelectStatement) -> Result<()> {
        standard::visit_select_clause(self, select)
    }

    /// Renders a table reference.
    ///
    /// # Errors
    ///
    /// Fails on constructs the dialect cannot express.
    fn visit_table_ref(&mut self, table: &TableRef) -> Result<()> {
        standard::visit_table_ref(self, table)
    }

    /// Renders a named table.
    ///
    /// # Errors
    ///
    /// Fails on constructs the dialect cannot express.
    fn visit_table(&mut self, schema: Option<&str>, name: &str, alias: Option<&str>) -> Result<()> {
        standard::visit_table(self, schema, name, alias)
    }

    /// Renders an expression in value position.
    ///
    /// # Errors
    ///
    /// Fails on constructs the dialect cannot express.
    fn visit_expr(&mut self, expr: &Expr) -> Result<()> {
        standard::visit_expr(self, expr)
    }

    /// Renders an expression in predicate position.
    ///
    /// # Errors
    ///
    /// Fails on constructs the dialect cannot express.
    fn visit_predicate(&mut self, expr: &Expr) -> Result<()> {
        standard::visit_predicate(self, expr)
    }

    /// Renders a literal.
    ///
    /// # Errors
    ///
    /// Fails on constructs the dialect cannot express.
    fn visit_literal(&mut self, literal: &Literal) -> Result<()> {
        standard::visit_literal(self, literal)
    }

    /// Renders a bind parameter.
    ///
    /// # Errors
    ///
    /// Fails on constructs the dialect cannot express.
    fn visit_parameter(&mut self, position: usize, sql_type: Option<SqlTypeCode>) -> Result<()> {
        standard::visit_parameter(self, position, sql_type)
    }

    /// Renders a column reference.
    ///
    /// # Errors
    ///
    /// Fails on constructs the dialect cannot express.
    fn visit_column(&mut self, table: Option<&str>, name: &str) -> Result<()> {
        standard::visit_column(self, table, name)
    }

    /// Renders a function call.
    ///
    /// # Errors
    ///
    /// Fails on constructs the dialect cannot express.
    fn visit_function(&mut self, call: &FunctionCall) -> Result<()> {
        standard::visit_function(self, call)
    }

    /// Renders a window function call.
    ///
    /// # Errors
    ///
    /// Fails on constructs the dialect cannot express.
    fn visit_window(
        &mut self,
        function: &FunctionCall,
        partition_by: &[Expr],
        order_by: &[OrderBy],
    ) -> Result<()> {
        standard::visit_window(self, function, partition_by, order_by)
    }

    /// Renders a comparison, expanding row values when needed.
    ///
    /// # Errors
    ///
    /// Fails on constructs the dialect cannot express.
    fn visit_comparison(&mut self, left: &Expr, op: BinaryOp, right: &Expr) -> Result<()> {
        standard::visit_comparison(self, left, op, right)
    }

    /// Renders `is [not] distinct from`.
    ///
    /// # Errors
    ///
    /// Fails on constructs the dialect cannot express.
    fn visit_distinct_from(&mut self, left: &Expr, right: &Expr, negated: bool) -> Result<()> {
        standard::visit_distinct_from(self, left, right, negated)
    }

    /// Renders `[not] in (...)`.
    ///
    /// # Errors
    ///
    /// Fails on constructs the dialect cannot express.
    fn visit_in_list(&mut self, expr: &Expr, list: &[Expr], negated: bool) -> Result<()> {
        standard::visit_in_list(self, expr, list, negated)
    }

    /// Renders a case expression.
    ///
    /// # Errors
    ///
    /// Fails on constructs the dialect cannot express.
    fn visit_case(
        &mut self,
        operand: Option<&Expr>,
        when_clauses: &[(Expr, Expr)],
        else_clause: Option<&Expr>,
    ) -> Result<()> {
        standard::visit_case(self, operand, when_clauses, else_clause)
    }

    /// Renders a cast.
    ///
    /// # Errors
    ///
    /// Fails on constructs the dialect cannot express.
    fn visit_cast(&mut self, expr: &Expr, target: &CastTarget) -> Result<()> {
        standard::visit_cast(self, expr, target)
    }

    /// Renders a set operator keyword.
    ///
    /// # Errors
    ///
    /// Fails when the dialect lacks the operator.
    fn visit_set_operator(&mut self, op: SetOperator) -> Result<()> {
        standard::visit_set_operator(self, op)
    }

    /// Renders a comma separated list of sort items.
    ///
    /// # Errors
    ///
    /// Fails on constructs the dialect cannot express.
    fn visit_order_by(&mut self, items: &[OrderBy]) -> Result<()> {
        standard::visit_order_by(self, items)
    }

    /// Renders one sort item, emulating null precedence when needed.
    ///
    /// # Errors
    ///
    /// Fails on constructs the dialect cannot express.
    fn visit_sort_item(&mut self, item: &OrderBy) -> Result<()> {
        standard::visit_sort_item(self, item)
    }

    /// Renders trailing offset and fetch clauses.
    ///
    /// # Errors
    ///
    /// Fails on constructs the dialect cannot express.
    fn visit_offset_fetch(&mut self, select: &SelectStatement) -> Result<()> {
        standard::visit_offset_fetch(self, select)
    }

    /// How offset and fetch are written.
    fn pagination_style(&self) -> PaginationStyle {
        if self.context_ref().dialect.supports_offset_fetch_clause() {
            PaginationStyle::OffsetFetch
        } else {
            PaginationStyle::RowNumber
        }
    }

    /// Window content of a ranking function without partition or order.
    fn empty_window_order(&self) -> &'static str {
        ""
    }

    /// Renders an insert.
    ///
    /// # Errors
    ///
    /// Fails on constructs the dialect cannot express.
    fn visit_insert(&mut self, insert: &InsertStatement) -> Result<()> {
        standard::visit_insert(self, insert)
    }

    /// Renders an insert with a conflict clause.
    ///
    /// # Errors
    ///
    /// Fails when the dialect has no way to express the upsert.
    fn visit_upsert(&mut self, insert: &InsertStatement, conflict: &OnConflict) -> Result<()> {
        standard::visit_upsert(self, insert, conflict)
    }

    /// Renders an update.
    ///
    /// # Errors
    ///
    /// Fails on constructs the dialect cannot express.
    fn visit_update(&mut self, update: &UpdateStatement) -> Result<()> {
        standard::visit_update(self, update)
    }

    /// Renders a delete.
    ///
    /// # Errors
    ///
    /// Fails on constructs the dialect cannot express.
    fn visit_delete(&mut self, delete: &DeleteStatement) -> Result<()> {
        standard::visit_delete(self, delete)
    }

    /// Applies the lock of the root query.
    ///
    /// # Errors
    ///
    /// Fails when the lock cannot be expressed.
    fn render_lock(&mut self, options: &LockOptions) -> Result<()> {
        standard::render_lock(self, options)
    }
}

/// Translator using only the standard hooks.
#[derive(Debug)]
pub struct StandardSqlAstTranslator<'d> {
    context: TranslationContext<'d>,
}

impl<'d> StandardSqlAstTranslator<'d> {
    /// Creates a translator for `dialect`.
    #[must_use]
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self {
            context: TranslationContext::new(dialect),
        }
    }
}

impl<'d> SqlAstTranslator<'d> for StandardSqlAstTranslator<'d> {
    fn context(&mut self) -> &mut TranslationContext<'d> {
        &mut self.context
    }

    fn context_ref(&self) -> &TranslationContext<'d> {
        &self.context
    }
}
