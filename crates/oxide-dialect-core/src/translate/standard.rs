//! Standard rendering behind every [`SqlAstTranslator`] hook.
//!
//! Each function takes the translator it renders for, so a dialect
//! translator that overrides a hook can still call the function here for
//! the common part. Output follows the lower-case style of generated SQL:
//! no spaces around comparison and arithmetic operators, spaces around
//! `and` and `or`.

use core::fmt::Display;

use tracing::{debug, trace};

use super::{
    Clause, ExcludedColumns, JdbcOperation, PaginationStyle, ParameterBinding, QueryOptions,
    SqlAstTranslator,
};
use crate::ast::{
    BinaryOp, CastTarget, ConflictAction, DatetimeLiteral, DeleteStatement, Expr, FunctionCall,
    InsertSource, InsertStatement, Literal, NullPrecedence, OnConflict, OrderBy, OrderDirection,
    SelectColumn, SelectStatement, SetOperator, Size, SqlTypeCode, Statement, TableRef,
    UpdateAssignment, UpdateStatement,
};
use crate::dialect::{
    Dialect, DistinctFromStrategy, Fragment, LockOptions, Pattern, TemporalType,
};
use crate::error::{DialectError, Result};
use crate::pagination::{Limit, UNBOUNDED_MAX_ROWS};

/// Alias of the derived table in row number pagination.
const ROW_NUMBER_TABLE: &str = "r_";
/// Alias of the source rows in a merge.
const MERGE_SOURCE: &str = "s_";

/// Renders into a separate buffer and returns what was written.
///
/// # Errors
///
/// Returns the error of `render`.
pub fn capture<'d, T, F>(t: &mut T, render: F) -> Result<Fragment>
where
    T: SqlAstTranslator<'d> + ?Sized,
    F: FnOnce(&mut T) -> Result<()>,
{
    let ctx = t.context();
    let saved_sql = std::mem::take(&mut ctx.sql);
    let saved_parameters = std::mem::take(&mut ctx.parameters);
    let result = render(t);
    let ctx = t.context();
    let fragment = Fragment {
        sql: std::mem::replace(&mut ctx.sql, saved_sql),
        parameters: std::mem::replace(&mut ctx.parameters, saved_parameters),
    };
    result.map(|()| fragment)
}

/// Renders an expression in value position into a fragment.
///
/// # Errors
///
/// Fails on constructs the dialect cannot express.
pub fn capture_expr<'d, T>(t: &mut T, expr: &Expr) -> Result<Fragment>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    capture(t, |t| t.visit_expr(expr))
}

/// Unsupported-construct error naming the translator's dialect.
pub fn unsupported<'d, T>(t: &T, what: impl Display) -> DialectError
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    DialectError::unsupported(t.context_ref().dialect.name(), what)
}

/// `schema.name` with both parts passed through [`Dialect::quote`].
#[must_use]
pub fn qualified_name(dialect: &dyn Dialect, schema: Option<&str>, name: &str) -> String {
    match schema {
        Some(schema) => format!("{}.{}", dialect.quote(schema), dialect.quote(name)),
        None => dialect.quote(name),
    }
}

/// Type of an expression when it is evident without a schema.
#[must_use]
pub fn infer_type(expr: &Expr) -> Option<SqlTypeCode> {
    match expr {
        Expr::Parameter { sql_type, .. } => *sql_type,
        Expr::Literal(literal) => match literal {
            Literal::Integer(_) => Some(SqlTypeCode::Bigint),
            Literal::Float(_) => Some(SqlTypeCode::Double),
            Literal::String(_) => Some(SqlTypeCode::Varchar),
            Literal::Binary(_) => Some(SqlTypeCode::Varbinary),
            Literal::Boolean(_) => Some(SqlTypeCode::Boolean),
            Literal::Date(_) => Some(SqlTypeCode::Date),
            Literal::Time(_) => Some(SqlTypeCode::Time),
            Literal::Timestamp(_) => Some(SqlTypeCode::Timestamp),
            Literal::Null => None,
        },
        Expr::Cast { target, .. } => Some(target.code),
        Expr::Current(temporal_type) | Expr::TimestampAdd { temporal_type, .. } => {
            Some(match temporal_type {
                TemporalType::Date => SqlTypeCode::Date,
                TemporalType::Time => SqlTypeCode::Time,
                TemporalType::Timestamp => SqlTypeCode::Timestamp,
            })
        }
        Expr::Paren(inner) => infer_type(inner),
        _ => None,
    }
}

// ---------------------------------------------------------------- statements

/// Renders a statement, then applies lock and row limit of the root query.
///
/// # Errors
///
/// Fails on constructs the dialect cannot express.
pub fn translate<'d, T>(
    t: &mut T,
    statement: &Statement,
    options: &QueryOptions,
) -> Result<JdbcOperation>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    t.context().options = options.clone();
    t.visit_statement(statement)?;
    if matches!(statement, Statement::Select(_)) {
        if let Some(lock) = options.lock.as_ref().filter(|lock| lock.mode.is_pessimistic()) {
            t.render_lock(lock)?;
        }
        if let Some(limit) = options.limit.filter(|limit| !limit.is_empty()) {
            apply_limit(t, &limit)?;
        }
    }
    let ctx = t.context();
    trace!(dialect = ctx.dialect.name(), sql = %ctx.sql, "translated statement");
    Ok(JdbcOperation {
        sql: std::mem::take(&mut ctx.sql),
        parameters: std::mem::take(&mut ctx.parameters),
    })
}

fn apply_limit<'d, T>(t: &mut T, limit: &Limit) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    let ctx = t.context();
    let handler = ctx.dialect.limit_handler();
    let limited = handler.process_sql(&ctx.sql, limit)?;
    debug!(
        handler = handler.name(),
        leading = limited.leading.len(),
        trailing = limited.trailing.len(),
        "applied row limit"
    );
    let mut parameters: Vec<ParameterBinding> = limited
        .leading
        .iter()
        .copied()
        .map(ParameterBinding::Limit)
        .collect();
    parameters.append(&mut ctx.parameters);
    parameters.extend(limited.trailing.iter().copied().map(ParameterBinding::Limit));
    ctx.sql = limited.sql;
    ctx.parameters = parameters;
    Ok(())
}

/// Dispatches on the statement kind.
///
/// # Errors
///
/// Fails on constructs the dialect cannot express.
pub fn visit_statement<'d, T>(t: &mut T, statement: &Statement) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    match statement {
        Statement::Select(select) => t.visit_select(select),
        Statement::Insert(insert) => t.visit_insert(insert),
        Statement::Update(update) => t.visit_update(update),
        Statement::Delete(delete) => t.visit_delete(delete),
    }
}

/// Appends the lock clause, unless the dialect writes table hints.
///
/// # Errors
///
/// Never fails; dialect translators may.
pub fn render_lock<'d, T>(t: &mut T, options: &LockOptions) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    let dialect = t.context_ref().dialect;
    if !dialect.uses_lock_hints() {
        let clause = dialect.lock_clause(options);
        t.context().append(&clause);
    }
    Ok(())
}

// ------------------------------------------------------------------- queries

/// Renders a query block.
///
/// # Errors
///
/// Fails on constructs the dialect cannot express.
pub fn visit_select<'d, T>(t: &mut T, select: &SelectStatement) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    t.context().enter_query();
    let result = render_select(t, select);
    t.context().exit_query();
    result
}

fn render_select<'d, T>(t: &mut T, select: &SelectStatement) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    if needs_row_number_emulation(t, select) {
        return emulate_offset_fetch(t, select);
    }
    t.visit_query_spec(select)?;
    for set_op in &select.set_ops {
        t.context().append(" ");
        t.visit_set_operator(set_op.op)?;
        t.context().append(" ");
        render_set_operand(t, &set_op.query)?;
    }
    if !select.order_by.is_empty() {
        t.context().push_clause(Clause::OrderBy);
        t.context().append(" order by ");
        t.visit_order_by(&select.order_by)?;
        t.context().pop_clause();
    }
    t.visit_offset_fetch(select)
}

fn render_set_operand<'d, T>(t: &mut T, query: &SelectStatement) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    if query.has_fetch() || !query.order_by.is_empty() || !query.set_ops.is_empty() {
        t.context().append("(");
        t.visit_select(query)?;
        t.context().append(")");
        Ok(())
    } else {
        t.visit_query_spec(query)
    }
}

fn needs_row_number_emulation<'d, T>(t: &T, select: &SelectStatement) -> bool
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    match t.pagination_style() {
        PaginationStyle::RowNumber => select.has_fetch(),
        PaginationStyle::Top { .. } => select.offset.is_some(),
        _ => false,
    }
}

/// Renders `select ... from ... where ... group by ... having ...`.
///
/// # Errors
///
/// Fails on constructs the dialect cannot express.
pub fn visit_query_spec<'d, T>(t: &mut T, select: &SelectStatement) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    t.visit_select_clause(select)?;
    render_query_tail(t, select)
}

fn render_query_tail<'d, T>(t: &mut T, select: &SelectStatement) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    match &select.from {
        Some(from) => {
            t.context().push_clause(Clause::From);
            t.context().append(" from ");
            t.visit_table_ref(from)?;
            t.context().pop_clause();
        }
        None => {
            let dual = t.context_ref().dialect.from_dual_for_select_only();
            t.context().append(dual);
        }
    }
    if let Some(restriction) = &select.where_clause {
        t.context().push_clause(Clause::Where);
        t.context().append(" where ");
        t.visit_predicate(restriction)?;
        t.context().pop_clause();
    }
    if !select.group_by.is_empty() {
        t.context().push_clause(Clause::GroupBy);
        t.context().append(" group by ");
        render_expr_list(t, &select.group_by)?;
        t.context().pop_clause();
    }
    if let Some(having) = &select.having {
        t.context().push_clause(Clause::Having);
        t.context().append(" having ");
        t.visit_predicate(having)?;
        t.context().pop_clause();
    }
    Ok(())
}

/// Renders `select [distinct] items` with prefix paging.
///
/// # Errors
///
/// Fails on constructs the dialect cannot express.
pub fn visit_select_clause<'d, T>(t: &mut T, select: &SelectStatement) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    t.context().push_clause(Clause::Select);
    t.context().append("select ");
    let style = t.pagination_style();
    match style {
        PaginationStyle::SkipFirst => {
            render_prefix_value(t, "skip ", select.offset.as_ref())?;
            render_prefix_value(t, "first ", select.limit.as_ref())?;
        }
        PaginationStyle::FirstSkip => {
            render_prefix_value(t, "first ", select.limit.as_ref())?;
            render_prefix_value(t, "skip ", select.offset.as_ref())?;
        }
        _ => {}
    }
    if select.distinct {
        t.context().append("distinct ");
    }
    if let (PaginationStyle::Top { parenthesized }, Some(limit)) = (style, &select.limit) {
        if parenthesized {
            t.context().append("top(");
            t.visit_expr(limit)?;
            t.context().append(") ");
        } else {
            render_prefix_value(t, "top ", Some(limit))?;
        }
    }
    render_select_items(t, &select.columns)?;
    t.context().pop_clause();
    Ok(())
}

fn render_prefix_value<'d, T>(t: &mut T, keyword: &str, value: Option<&Expr>) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    if let Some(value) = value {
        t.context().append(keyword);
        t.visit_expr(value)?;
        t.context().append(" ");
    }
    Ok(())
}

fn render_select_items<'d, T>(t: &mut T, columns: &[SelectColumn]) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            t.context().append(",");
        }
        t.visit_expr(&column.expr)?;
        if let Some(alias) = &column.alias {
            t.context().append(" as ");
            t.context().append(alias);
        }
    }
    Ok(())
}

fn render_expr_list<'d, T>(t: &mut T, exprs: &[Expr]) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    for (i, expr) in exprs.iter().enumerate() {
        if i > 0 {
            t.context().append(",");
        }
        t.visit_expr(expr)?;
    }
    Ok(())
}

/// Renders trailing paging for the suffix pagination styles.
///
/// # Errors
///
/// Fails on constructs the dialect cannot express.
pub fn visit_offset_fetch<'d, T>(t: &mut T, select: &SelectStatement) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    if !select.has_fetch() {
        return Ok(());
    }
    t.context().push_clause(Clause::Fetch);
    match t.pagination_style() {
        PaginationStyle::OffsetFetch => {
            if let Some(offset) = &select.offset {
                t.context().append(" offset ");
                t.visit_expr(offset)?;
                t.context().append(" rows");
            }
            if let Some(limit) = &select.limit {
                let fetch = if select.offset.is_some() {
                    " fetch next "
                } else {
                    " fetch first "
                };
                t.context().append(fetch);
                t.visit_expr(limit)?;
                t.context().append(" rows only");
            }
        }
        PaginationStyle::LimitOffset => {
            if let Some(limit) = &select.limit {
                t.context().append(" limit ");
                t.visit_expr(limit)?;
            }
            if let Some(offset) = &select.offset {
                t.context().append(" offset ");
                t.visit_expr(offset)?;
            }
        }
        PaginationStyle::LimitComma => {
            t.context().append(" limit ");
            if let Some(offset) = &select.offset {
                t.visit_expr(offset)?;
                t.context().append(",");
            }
            match &select.limit {
                Some(limit) => t.visit_expr(limit)?,
                None => t.context().append(&UNBOUNDED_MAX_ROWS.to_string()),
            }
        }
        _ => {}
    }
    t.context().pop_clause();
    Ok(())
}

// select r_.c0_,r_.c1_ as n from (select a c0_,b c1_,row_number() over(order by a) rn_
// from t) r_ where r_.rn_>? and r_.rn_<=?+? order by r_.rn_
fn emulate_offset_fetch<'d, T>(t: &mut T, select: &SelectStatement) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    if !select.set_ops.is_empty() {
        return Err(unsupported(t, "offset/fetch emulation over a set operation"));
    }
    if select.distinct {
        return Err(unsupported(t, "offset/fetch emulation of select distinct"));
    }
    if !t.context_ref().dialect.supports_window_functions() {
        return Err(unsupported(t, "offset/fetch without window functions"));
    }
    if select
        .columns
        .iter()
        .any(|column| matches!(column.expr, Expr::Wildcard { .. }))
    {
        return Err(unsupported(t, "offset/fetch emulation over a '*' projection"));
    }
    debug!(
        dialect = t.context_ref().dialect.name(),
        "emulating offset/fetch with row_number()"
    );

    let mut outer = String::from("select ");
    for (i, column) in select.columns.iter().enumerate() {
        if i > 0 {
            outer.push(',');
        }
        outer.push_str(&format!("{ROW_NUMBER_TABLE}.c{i}_"));
        if let Some(alias) = &column.alias {
            outer.push_str(" as ");
            outer.push_str(alias);
        }
    }
    outer.push_str(" from (select ");
    t.context().append(&outer);

    t.context().push_clause(Clause::Select);
    for (i, column) in select.columns.iter().enumerate() {
        if i > 0 {
            t.context().append(",");
        }
        t.visit_expr(&column.expr)?;
        t.context().append(&format!(" c{i}_"));
    }
    t.context().append(",row_number() over(");
    if select.order_by.is_empty() {
        let empty = t.empty_window_order();
        t.context().append(empty);
    } else {
        t.context().append("order by ");
        t.visit_order_by(&select.order_by)?;
    }
    t.context().append(") rn_");
    t.context().pop_clause();
    render_query_tail(t, select)?;

    t.context()
        .append(&format!(") {ROW_NUMBER_TABLE} where "));
    t.context().push_clause(Clause::Fetch);
    if let Some(offset) = &select.offset {
        t.context().append(&format!("{ROW_NUMBER_TABLE}.rn_>"));
        t.visit_expr(offset)?;
    }
    if let Some(limit) = &select.limit {
        if let Some(offset) = &select.offset {
            t.context()
                .append(&format!(" and {ROW_NUMBER_TABLE}.rn_<="));
            t.visit_expr(offset)?;
            t.context().append("+");
        } else {
            t.context().append(&format!("{ROW_NUMBER_TABLE}.rn_<="));
        }
        t.visit_expr(limit)?;
    }
    t.context().pop_clause();
    t.context()
        .append(&format!(" order by {ROW_NUMBER_TABLE}.rn_"));
    Ok(())
}

/// Renders a set operator keyword, failing when the dialect lacks it.
///
/// # Errors
///
/// Returns [`DialectError::Unsupported`] for `intersect` or `except` on
/// dialects without them.
pub fn visit_set_operator<'d, T>(t: &mut T, op: SetOperator) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    let dialect = t.context_ref().dialect;
    let keyword = match op {
        SetOperator::Intersect | SetOperator::IntersectAll => {
            if !dialect.supports_intersect() {
                return Err(unsupported(t, op.as_str()));
            }
            op.as_str().to_string()
        }
        SetOperator::Except | SetOperator::ExceptAll => {
            if !dialect.supports_except() {
                return Err(unsupported(t, op.as_str()));
            }
            if op.is_all() {
                format!("{} all", dialect.except_keyword())
            } else {
                dialect.except_keyword().to_string()
            }
        }
        SetOperator::Union | SetOperator::UnionAll => op.as_str().to_string(),
    };
    t.context().append(&keyword);
    Ok(())
}

/// Renders sort items separated by commas.
///
/// # Errors
///
/// Fails on constructs the dialect cannot express.
pub fn visit_order_by<'d, T>(t: &mut T, items: &[OrderBy]) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            t.context().append(",");
        }
        t.visit_sort_item(item)?;
    }
    Ok(())
}

/// Renders a sort item; `nulls first|last` becomes a leading
/// `case when x is null then 0 else 1 end` key when unsupported.
///
/// # Errors
///
/// Fails on constructs the dialect cannot express.
pub fn visit_sort_item<'d, T>(t: &mut T, item: &OrderBy) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    let native_nulls = t.context_ref().dialect.supports_null_precedence();
    match item.nulls {
        Some(nulls) if !native_nulls => {
            let expr = capture_expr(t, &item.expr)?;
            let (null_key, value_key) = match nulls {
                NullPrecedence::First => ("0", "1"),
                NullPrecedence::Last => ("1", "0"),
            };
            let ctx = t.context();
            ctx.append("case when ");
            ctx.emit(&expr);
            ctx.append(&format!(" is null then {null_key} else {value_key} end,"));
            ctx.emit(&expr);
        }
        _ => t.visit_expr(&item.expr)?,
    }
    if item.direction == OrderDirection::Desc {
        t.context().append(" desc");
    }
    if let Some(nulls) = item.nulls.filter(|_| native_nulls) {
        t.context().append(" ");
        t.context().append(nulls.as_str());
    }
    Ok(())
}

// -------------------------------------------------------------------- tables

/// Renders a table reference.
///
/// # Errors
///
/// Returns [`DialectError::Unsupported`] for `lateral` on dialects
/// without it.
pub fn visit_table_ref<'d, T>(t: &mut T, table: &TableRef) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    match table {
        TableRef::Table {
            schema,
            name,
            alias,
        } => t.visit_table(schema.as_deref(), name, alias.as_deref()),
        TableRef::Subquery {
            query,
            alias,
            lateral,
        } => {
            if *lateral {
                if !t.context_ref().dialect.supports_lateral() {
                    return Err(unsupported(t, "lateral"));
                }
                t.context().append("lateral ");
            }
            t.context().append("(");
            t.visit_select(query)?;
            t.context().append(") ");
            t.context().append(alias);
            Ok(())
        }
        TableRef::Join { left, join } => {
            t.visit_table_ref(left)?;
            t.context().append(" ");
            t.context().append(join.join_type.as_str());
            t.context().append(" ");
            t.visit_table_ref(&join.table)?;
            if let Some(on) = &join.on {
                t.context().append(" on ");
                t.visit_predicate(on)?;
            }
            Ok(())
        }
    }
}

/// Renders `schema.name alias`, adding the dialect's lock hint to tables
/// of the root query when a lock is requested.
///
/// # Errors
///
/// Never fails; dialect translators may.
pub fn visit_table<'d, T>(
    t: &mut T,
    schema: Option<&str>,
    name: &str,
    alias: Option<&str>,
) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    let ctx = t.context_ref();
    let dialect = ctx.dialect;
    let mut text = qualified_name(dialect, schema, name);
    if let Some(alias) = alias {
        text.push(' ');
        text.push_str(alias);
    }
    if dialect.uses_lock_hints()
        && ctx.is_root_query()
        && ctx.current_clause() == Some(Clause::From)
    {
        if let Some(lock) = ctx.options.lock.as_ref().filter(|l| l.mode.is_pessimistic()) {
            let key = alias.unwrap_or(name);
            if lock.aliases.is_empty() || lock.aliases.iter().any(|a| a == key) {
                text = dialect.append_lock_hint(lock, &text);
            }
        }
    }
    t.context().append(&text);
    Ok(())
}

// --------------------------------------------------------------- expressions

/// Renders an expression in value position. A predicate becomes
/// `case when p then T else F end` when the dialect cannot use it as a
/// value.
///
/// # Errors
///
/// Fails on constructs the dialect cannot express.
pub fn visit_expr<'d, T>(t: &mut T, expr: &Expr) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    if !expr.is_predicate() {
        return render_value(t, expr);
    }
    let dialect = t.context_ref().dialect;
    if dialect.supports_predicate_as_expression() {
        return render_predicate(t, expr);
    }
    t.context().append("case when ");
    render_predicate(t, expr)?;
    let ctx = t.context();
    ctx.append(" then ");
    dialect.append_boolean_literal(&mut ctx.sql, true);
    ctx.append(" else ");
    dialect.append_boolean_literal(&mut ctx.sql, false);
    ctx.append(" end");
    Ok(())
}

/// Renders an expression in predicate position. Without boolean
/// predicates a literal becomes `1=1` or `1=0` and any other value `x=T`.
///
/// # Errors
///
/// Fails on constructs the dialect cannot express.
pub fn visit_predicate<'d, T>(t: &mut T, expr: &Expr) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    if expr.is_predicate() {
        return render_predicate(t, expr);
    }
    let dialect = t.context_ref().dialect;
    if dialect.supports_boolean_expression_as_predicate() {
        return render_value(t, expr);
    }
    match expr {
        Expr::Literal(Literal::Boolean(value)) => {
            t.context().append(if *value { "1=1" } else { "1=0" });
        }
        _ => {
            render_value(t, expr)?;
            let ctx = t.context();
            ctx.append("=");
            dialect.append_boolean_literal(&mut ctx.sql, true);
        }
    }
    Ok(())
}

fn render_predicate<'d, T>(t: &mut T, expr: &Expr) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    match expr {
        Expr::Binary { left, op, right } if op.is_logical() => {
            render_logical_operand(t, left, *op)?;
            t.context().append(if *op == BinaryOp::And { " and " } else { " or " });
            render_logical_operand(t, right, *op)
        }
        Expr::Binary { left, op, right } => t.visit_comparison(left, *op, right),
        Expr::Unary { operand, .. } => {
            t.context().append("not(");
            t.visit_predicate(operand)?;
            t.context().append(")");
            Ok(())
        }
        Expr::Paren(inner) => {
            t.context().append("(");
            t.visit_predicate(inner)?;
            t.context().append(")");
            Ok(())
        }
        Expr::Exists { query, negated } => {
            t.context()
                .append(if *negated { "not exists (" } else { "exists (" });
            t.visit_select(query)?;
            t.context().append(")");
            Ok(())
        }
        Expr::IsNull { expr, negated } => render_is_null(t, expr, *negated),
        Expr::In {
            expr,
            list,
            negated,
        } => t.visit_in_list(expr, list, *negated),
        Expr::InSubquery {
            expr,
            query,
            negated,
        } => {
            if matches!(**expr, Expr::Tuple(_))
                && !t
                    .context_ref()
                    .dialect
                    .supports_row_value_constructor_syntax_in_in_list()
            {
                return Err(unsupported(t, "row value in a subquery predicate"));
            }
            t.visit_expr(expr)?;
            t.context()
                .append(if *negated { " not in (" } else { " in (" });
            t.visit_select(query)?;
            t.context().append(")");
            Ok(())
        }
        Expr::Between {
            expr,
            low,
            high,
            negated,
        } => {
            t.visit_expr(expr)?;
            t.context()
                .append(if *negated { " not between " } else { " between " });
            t.visit_expr(low)?;
            t.context().append(" and ");
            t.visit_expr(high)
        }
        Expr::Like {
            expr,
            pattern,
            escape,
            negated,
            case_insensitive,
        } => render_like(t, expr, pattern, escape.as_deref(), *negated, *case_insensitive),
        Expr::DistinctFrom {
            left,
            right,
            negated,
        } => t.visit_distinct_from(left, right, *negated),
        other => render_value(t, other),
    }
}

fn render_logical_operand<'d, T>(t: &mut T, operand: &Expr, parent: BinaryOp) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    let wrap = parent == BinaryOp::And
        && matches!(operand, Expr::Binary { op: BinaryOp::Or, .. });
    if wrap {
        t.context().append("(");
    }
    t.visit_predicate(operand)?;
    if wrap {
        t.context().append(")");
    }
    Ok(())
}

fn empty_row() -> DialectError {
    DialectError::Semantic("a row value needs at least one element".to_string())
}

fn render_is_null<'d, T>(t: &mut T, expr: &Expr, negated: bool) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    let suffix = if negated { " is not null" } else { " is null" };
    if let Expr::Tuple(items) = expr {
        if items.is_empty() {
            return Err(empty_row());
        }
        if !t
            .context_ref()
            .dialect
            .supports_row_value_constructor_syntax()
        {
            t.context().append("(");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    t.context().append(" and ");
                }
                t.visit_expr(item)?;
                t.context().append(suffix);
            }
            t.context().append(")");
            return Ok(());
        }
    }
    t.visit_expr(expr)?;
    t.context().append(suffix);
    Ok(())
}

fn render_like<'d, T>(
    t: &mut T,
    expr: &Expr,
    pattern: &Expr,
    escape: Option<&Expr>,
    negated: bool,
    case_insensitive: bool,
) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    let dialect = t.context_ref().dialect;
    let not = if negated { " not" } else { "" };
    if case_insensitive && dialect.supports_case_insensitive_like() {
        t.visit_expr(expr)?;
        t.context().append(&format!("{not} ilike "));
        t.visit_expr(pattern)?;
    } else if case_insensitive {
        let lower = dialect.lowercase_function();
        t.context().append(&format!("{lower}("));
        t.visit_expr(expr)?;
        t.context().append(&format!("){not} like {lower}("));
        t.visit_expr(pattern)?;
        t.context().append(")");
    } else {
        t.visit_expr(expr)?;
        t.context().append(&format!("{not} like "));
        t.visit_expr(pattern)?;
    }
    if let Some(escape) = escape {
        t.context().append(" escape ");
        t.visit_expr(escape)?;
    }
    Ok(())
}

fn render_value<'d, T>(t: &mut T, expr: &Expr) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    match expr {
        Expr::Literal(literal) => t.visit_literal(literal),
        Expr::Column { table, name } => t.visit_column(table.as_deref(), name),
        Expr::Parameter { position, sql_type } => t.visit_parameter(*position, *sql_type),
        Expr::Binary { left, op, right } => render_arithmetic(t, left, *op, right),
        Expr::Unary { op, operand } => {
            t.context().append(op.as_str());
            if matches!(**operand, Expr::Binary { .. } | Expr::Unary { .. }) {
                t.context().append("(");
                t.visit_expr(operand)?;
                t.context().append(")");
                Ok(())
            } else {
                t.visit_expr(operand)
            }
        }
        Expr::Function(call) => t.visit_function(call),
        Expr::Subquery(query) => {
            t.context().append("(");
            t.visit_select(query)?;
            t.context().append(")");
            Ok(())
        }
        Expr::Case {
            operand,
            when_clauses,
            else_clause,
        } => t.visit_case(operand.as_deref(), when_clauses, else_clause.as_deref()),
        Expr::Cast { expr, target } => t.visit_cast(expr, target),
        Expr::Tuple(items) => {
            if items.is_empty() {
                return Err(empty_row());
            }
            t.context().append("(");
            render_expr_list(t, items)?;
            t.context().append(")");
            Ok(())
        }
        Expr::Paren(inner) => {
            t.context().append("(");
            t.visit_expr(inner)?;
            t.context().append(")");
            Ok(())
        }
        Expr::Wildcard { table } => {
            let text = match table {
                Some(table) => format!("{}.*", t.context_ref().dialect.quote(table)),
                None => "*".to_string(),
            };
            t.context().append(&text);
            Ok(())
        }
        Expr::Window {
            function,
            partition_by,
            order_by,
        } => t.visit_window(function, partition_by, order_by),
        Expr::Current(temporal_type) => {
            let dialect = t.context_ref().dialect;
            let function = match temporal_type {
                TemporalType::Date => dialect.current_date(),
                TemporalType::Time => dialect.current_time(),
                TemporalType::Timestamp => dialect.current_timestamp(),
            };
            t.context().append(function);
            Ok(())
        }
        Expr::Extract { .. }
        | Expr::TimestampAdd { .. }
        | Expr::TimestampDiff { .. }
        | Expr::Format { .. } => render_temporal(t, expr),
        predicate => render_predicate(t, predicate),
    }
}

fn render_arithmetic<'d, T>(t: &mut T, left: &Expr, op: BinaryOp, right: &Expr) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    if op == BinaryOp::Mod {
        let call = FunctionCall::new("mod", vec![left.clone(), right.clone()]);
        return t.visit_function(&call);
    }
    render_operand(t, left, op, false)?;
    let operator = if op == BinaryOp::Concat {
        t.context_ref().dialect.concat_operator()
    } else {
        op.as_str()
    };
    t.context().append(operator);
    render_operand(t, right, op, true)
}

fn render_operand<'d, T>(t: &mut T, operand: &Expr, parent: BinaryOp, right: bool) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    let wrap = match operand {
        Expr::Binary { op, .. } => {
            op.precedence() < parent.precedence()
                || (right
                    && op.precedence() == parent.precedence()
                    && !matches!(
                        parent,
                        BinaryOp::Add | BinaryOp::Mul | BinaryOp::Concat | BinaryOp::BitAnd | BinaryOp::BitOr
                    ))
        }
        other => other.is_predicate(),
    };
    if wrap {
        t.context().append("(");
    }
    t.visit_expr(operand)?;
    if wrap {
        t.context().append(")");
    }
    Ok(())
}

fn render_temporal<'d, T>(t: &mut T, expr: &Expr) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    let dialect = t.context_ref().dialect;
    let fragment = match expr {
        Expr::Extract { unit, expr } => {
            let pattern = Pattern::parse(&dialect.extract_pattern(*unit)?);
            let field = Fragment::text(dialect.translate_extract_field(*unit));
            let operand = capture_expr(t, expr)?;
            pattern.render(&[field, operand])?
        }
        Expr::TimestampAdd {
            unit,
            magnitude,
            datetime,
            temporal_type,
        } => {
            let pattern =
                Pattern::parse(&dialect.timestampadd_pattern(*unit, *temporal_type, None)?);
            let field = Fragment::text(dialect.translate_duration_field(*unit));
            let magnitude = capture_expr(t, magnitude)?;
            let datetime = capture_expr(t, datetime)?;
            pattern.render(&[field, magnitude, datetime])?
        }
        Expr::TimestampDiff {
            unit,
            from,
            to,
            from_type,
            to_type,
        } => {
            let pattern =
                Pattern::parse(&dialect.timestampdiff_pattern(*unit, *from_type, *to_type)?);
            let field = Fragment::text(dialect.translate_duration_field(*unit));
            let from = capture_expr(t, from)?;
            let to = capture_expr(t, to)?;
            pattern.render(&[field, from, to])?
        }
        Expr::Format { expr, format } => {
            let pattern = dialect
                .format_function_pattern()
                .ok_or_else(|| unsupported(t, "format()"))?;
            let mut native = String::new();
            dialect.append_string_literal(&mut native, &dialect.datetime_format_pattern(format)?);
            let operand = capture_expr(t, expr)?;
            Pattern::parse(pattern).render(&[operand, Fragment::text(native)])?
        }
        other => return render_value(t, other),
    };
    t.context().emit(&fragment);
    Ok(())
}

/// Renders a literal with the dialect's literal syntax.
///
/// # Errors
///
/// Never fails; dialect translators may.
pub fn visit_literal<'d, T>(t: &mut T, literal: &Literal) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    let ctx = t.context();
    let dialect = ctx.dialect;
    match literal {
        Literal::Integer(value) => ctx.append(&value.to_string()),
        Literal::Float(value) => ctx.append(&format!("{value:?}")),
        Literal::String(value) => dialect.append_string_literal(&mut ctx.sql, value),
        Literal::Binary(value) => dialect.append_binary_literal(&mut ctx.sql, value),
        Literal::Boolean(value) => dialect.append_boolean_literal(&mut ctx.sql, *value),
        Literal::Null => ctx.append("null"),
        Literal::Date(value) => {
            dialect.append_datetime_literal(&mut ctx.sql, DatetimeLiteral::Date(*value));
        }
        Literal::Time(value) => {
            dialect.append_datetime_literal(&mut ctx.sql, DatetimeLiteral::Time(*value));
        }
        Literal::Timestamp(value) => {
            dialect.append_datetime_literal(&mut ctx.sql, DatetimeLiteral::Timestamp(*value));
        }
    }
    Ok(())
}

/// Renders `?` bound to the caller's parameter, wrapped in a cast when it
/// is a function argument the dialect cannot type.
///
/// # Errors
///
/// Never fails; dialect translators may.
pub fn visit_parameter<'d, T>(
    t: &mut T,
    position: usize,
    sql_type: Option<SqlTypeCode>,
) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    let ctx = t.context();
    if !ctx.in_function_call || ctx.dialect.supports_untyped_function_parameters() {
        ctx.bind(ParameterBinding::Query(position));
        return Ok(());
    }
    let type_name = ctx
        .dialect
        .cast_type(sql_type.unwrap_or(SqlTypeCode::Varchar));
    ctx.append("cast(");
    ctx.bind(ParameterBinding::Query(position));
    ctx.append(&format!(" as {type_name})"));
    Ok(())
}

/// Renders a column, rewriting `excluded.column` as the context says.
///
/// # Errors
///
/// Never fails; dialect translators may.
pub fn visit_column<'d, T>(t: &mut T, table: Option<&str>, name: &str) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    let ctx = t.context();
    let column = ctx.dialect.quote(name);
    let text = match table {
        Some(table) if table.eq_ignore_ascii_case(OnConflict::EXCLUDED) => match ctx.excluded {
            ExcludedColumns::Keep => format!("{table}.{column}"),
            ExcludedColumns::Alias(alias) => format!("{alias}.{column}"),
            ExcludedColumns::ValuesFunction => format!("values({column})"),
        },
        Some(table) => format!("{}.{column}", ctx.dialect.quote(table)),
        None => column,
    };
    ctx.append(&text);
    Ok(())
}

/// Renders a function through the dialect's registry.
///
/// # Errors
///
/// Fails when a registered pattern does not match the arguments.
pub fn visit_function<'d, T>(t: &mut T, call: &FunctionCall) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    let outer = std::mem::replace(&mut t.context().in_function_call, true);
    let args: Result<Vec<Fragment>> = call.args.iter().map(|arg| capture_expr(t, arg)).collect();
    t.context().in_function_call = outer;
    let args = args?;
    let fragment = t
        .context_ref()
        .functions
        .render(&call.name, call.distinct, &args)?;
    t.context().emit(&fragment);
    Ok(())
}

/// Renders `f(...) over(partition by ... order by ...)`.
///
/// # Errors
///
/// Returns [`DialectError::Unsupported`] on dialects without window
/// functions.
pub fn visit_window<'d, T>(
    t: &mut T,
    function: &FunctionCall,
    partition_by: &[Expr],
    order_by: &[OrderBy],
) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    if !t.context_ref().dialect.supports_window_functions() {
        return Err(unsupported(t, "window functions"));
    }
    t.visit_function(function)?;
    t.context().append(" over(");
    if !partition_by.is_empty() {
        t.context().append("partition by ");
        render_expr_list(t, partition_by)?;
    }
    if !order_by.is_empty() {
        if !partition_by.is_empty() {
            t.context().append(" ");
        }
        t.context().append("order by ");
        t.visit_order_by(order_by)?;
    }
    if partition_by.is_empty() && order_by.is_empty() && is_ranking(&function.name) {
        let empty = t.empty_window_order();
        t.context().append(empty);
    }
    t.context().append(")");
    Ok(())
}

fn is_ranking(name: &str) -> bool {
    ["row_number", "rank", "dense_rank"]
        .iter()
        .any(|ranking| name.eq_ignore_ascii_case(ranking))
}

/// Renders a comparison. Row values are expanded when the dialect has no
/// row value constructors.
///
/// # Errors
///
/// Returns [`DialectError::Semantic`] for empty rows and rows of different
/// arity, and [`DialectError::Unsupported`] for a row compared with a
/// non-row.
pub fn visit_comparison<'d, T>(t: &mut T, left: &Expr, op: BinaryOp, right: &Expr) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    let row_values = t
        .context_ref()
        .dialect
        .supports_row_value_constructor_syntax();
    match (left, right) {
        (Expr::Tuple(l), Expr::Tuple(r)) if !row_values => {
            return expand_tuple_comparison(t, l, op, r);
        }
        (Expr::Tuple(_), _) | (_, Expr::Tuple(_)) if !row_values => {
            return Err(unsupported(t, "row value comparison"));
        }
        _ => {}
    }
    render_operand(t, left, op, false)?;
    t.context().append(op.as_str());
    render_operand(t, right, op, true)
}

/// `(a,b)=(?,?)` as `(a=? and b=?)` and `(a,b)<(?,?)` as
/// `(a<? or a=? and b<?)`.
///
/// # Errors
///
/// Returns [`DialectError::Semantic`] for empty rows and rows of
/// different arity.
pub fn expand_tuple_comparison<'d, T>(
    t: &mut T,
    left: &[Expr],
    op: BinaryOp,
    right: &[Expr],
) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    if left.is_empty() || right.is_empty() {
        return Err(empty_row());
    }
    if left.len() != right.len() {
        return Err(DialectError::Semantic(format!(
            "cannot compare a row of {} values with a row of {}",
            left.len(),
            right.len()
        )));
    }
    let lhs: Vec<Fragment> = left
        .iter()
        .map(|expr| capture_expr(t, expr))
        .collect::<Result<_>>()?;
    let rhs: Vec<Fragment> = right
        .iter()
        .map(|expr| capture_expr(t, expr))
        .collect::<Result<_>>()?;
    trace!(arity = lhs.len(), op = op.as_str(), "expanding row value comparison");
    let ctx = t.context();
    ctx.append("(");
    match op {
        BinaryOp::Eq | BinaryOp::NotEq => {
            let joiner = if op == BinaryOp::Eq { " and " } else { " or " };
            for (i, (l, r)) in lhs.iter().zip(&rhs).enumerate() {
                if i > 0 {
                    ctx.append(joiner);
                }
                ctx.emit(l);
                ctx.append(op.as_str());
                ctx.emit(r);
            }
        }
        _ => {
            let strict = match op {
                BinaryOp::Lt | BinaryOp::LtEq => "<",
                _ => ">",
            };
            let last = lhs.len().saturating_sub(1);
            for i in 0..lhs.len() {
                if i > 0 {
                    ctx.append(" or ");
                }
                for (l, r) in lhs.iter().zip(&rhs).take(i) {
                    ctx.emit(l);
                    ctx.append("=");
                    ctx.emit(r);
                    ctx.append(" and ");
                }
                ctx.emit(&lhs[i]);
                ctx.append(if i == last { op.as_str() } else { strict });
                ctx.emit(&rhs[i]);
            }
        }
    }
    ctx.append(")");
    Ok(())
}

/// Renders `[not] in (...)`. An empty list is `1=0` (`1=1` negated),
/// row values expand to disjunctions, and lists longer than the
/// dialect's limit are split.
///
/// # Errors
///
/// Fails on constructs the dialect cannot express.
pub fn visit_in_list<'d, T>(t: &mut T, expr: &Expr, list: &[Expr], negated: bool) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    if list.is_empty() {
        t.context().append(if negated { "1=1" } else { "1=0" });
        return Ok(());
    }
    let dialect = t.context_ref().dialect;
    if let Expr::Tuple(items) = expr {
        if !dialect.supports_row_value_constructor_syntax_in_in_list() {
            return expand_tuple_in_list(t, items, list, negated);
        }
    }
    let chunk = dialect
        .in_expression_count_limit()
        .and_then(|limit| usize::try_from(limit).ok())
        .filter(|limit| *limit > 0)
        .unwrap_or(list.len());
    let lhs = capture_expr(t, expr)?;
    let chunks = list.len().div_ceil(chunk);
    if chunks > 1 {
        t.context().append("(");
    }
    for (i, values) in list.chunks(chunk).enumerate() {
        if i > 0 {
            t.context().append(if negated { " and " } else { " or " });
        }
        t.context().emit(&lhs);
        t.context()
            .append(if negated { " not in (" } else { " in (" });
        render_expr_list(t, values)?;
        t.context().append(")");
    }
    if chunks > 1 {
        t.context().append(")");
    }
    Ok(())
}

fn expand_tuple_in_list<'d, T>(
    t: &mut T,
    items: &[Expr],
    list: &[Expr],
    negated: bool,
) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    t.context().append(if negated { "not(" } else { "(" });
    for (i, value) in list.iter().enumerate() {
        if i > 0 {
            t.context().append(" or ");
        }
        match value {
            Expr::Tuple(values) => expand_tuple_comparison(t, items, BinaryOp::Eq, values)?,
            _ => return Err(unsupported(t, "row value in list of scalars")),
        }
    }
    t.context().append(")");
    Ok(())
}

/// Renders `is [not] distinct from` natively or by the dialect's
/// emulation strategy.
///
/// # Errors
///
/// Fails on constructs the dialect cannot express.
pub fn visit_distinct_from<'d, T>(t: &mut T, left: &Expr, right: &Expr, negated: bool) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    let dialect = t.context_ref().dialect;
    let strategy = dialect.distinct_from_strategy();
    if strategy == DistinctFromStrategy::Native {
        t.visit_expr(left)?;
        t.context().append(if negated {
            " is not distinct from "
        } else {
            " is distinct from "
        });
        return t.visit_expr(right);
    }
    let l = capture_expr(t, left)?;
    let r = capture_expr(t, right)?;
    trace!(strategy = ?strategy, "emulating distinct from");
    let outcome = if negated { "0" } else { "1" };
    let ctx = t.context();
    match strategy {
        DistinctFromStrategy::Case => {
            ctx.append("case when ");
            ctx.emit(&l);
            ctx.append("=");
            ctx.emit(&r);
            ctx.append(" or ");
            ctx.emit(&l);
            ctx.append(" is null and ");
            ctx.emit(&r);
            ctx.append(&format!(" is null then 0 else 1 end={outcome}"));
        }
        DistinctFromStrategy::Decode => {
            ctx.append("decode(");
            ctx.emit(&l);
            ctx.append(",");
            ctx.emit(&r);
            ctx.append(&format!(",0,1)={outcome}"));
        }
        DistinctFromStrategy::Intersect => {
            let dual = dialect.from_dual_for_select_only();
            ctx.append(if negated { "exists (select " } else { "not exists (select " });
            ctx.emit(&l);
            ctx.append(dual);
            ctx.append(" intersect select ");
            ctx.emit(&r);
            ctx.append(dual);
            ctx.append(")");
        }
        DistinctFromStrategy::NullSafeEquals | DistinctFromStrategy::Native => {
            if !negated {
                ctx.append("not(");
            }
            ctx.emit(&l);
            ctx.append("<=>");
            ctx.emit(&r);
            if !negated {
                ctx.append(")");
            }
        }
    }
    Ok(())
}

/// Renders a simple or searched case expression.
///
/// # Errors
///
/// Fails on constructs the dialect cannot express.
pub fn visit_case<'d, T>(
    t: &mut T,
    operand: Option<&Expr>,
    when_clauses: &[(Expr, Expr)],
    else_clause: Option<&Expr>,
) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    t.context().append("case");
    if let Some(operand) = operand {
        t.context().append(" ");
        t.visit_expr(operand)?;
    }
    for (condition, result) in when_clauses {
        t.context().append(" when ");
        if operand.is_some() {
            t.visit_expr(condition)?;
        } else {
            t.visit_predicate(condition)?;
        }
        t.context().append(" then ");
        t.visit_expr(result)?;
    }
    if let Some(otherwise) = else_clause {
        t.context().append(" else ");
        t.visit_expr(otherwise)?;
    }
    t.context().append(" end");
    Ok(())
}

/// Renders a cast through [`Dialect::cast_pattern`].
///
/// # Errors
///
/// Fails when the cast pattern does not match its arguments.
pub fn visit_cast<'d, T>(t: &mut T, expr: &Expr, target: &CastTarget) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    let dialect = t.context_ref().dialect;
    let pattern = Pattern::parse(&dialect.cast_pattern(infer_type(expr), target.code));
    let type_name = if target.size == Size::default() {
        dialect.cast_type(target.code)
    } else {
        dialect.type_name(target.code, target.size)
    };
    // the cast already types a parameter operand
    let outer = std::mem::replace(&mut t.context().in_function_call, false);
    let operand = capture_expr(t, expr);
    t.context().in_function_call = outer;
    let fragment = pattern.render(&[operand?, Fragment::text(type_name)])?;
    t.context().emit(&fragment);
    Ok(())
}

// -------------------------------------------------------------------- writes

fn render_insert_head<'d, T>(t: &mut T, insert: &InsertStatement)
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    let dialect = t.context_ref().dialect;
    let mut head = format!(
        "insert into {}",
        qualified_name(dialect, insert.schema.as_deref(), &insert.table)
    );
    if !insert.columns.is_empty() {
        let columns: Vec<String> = insert.columns.iter().map(|c| dialect.quote(c)).collect();
        head.push_str(&format!(" ({})", columns.join(",")));
    }
    t.context().append(&head);
}

fn render_insert_source<'d, T>(t: &mut T, insert: &InsertStatement) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    t.context().append(" ");
    match &insert.values {
        InsertSource::Values(rows) => render_values_rows(t, rows),
        InsertSource::Query(query) => t.visit_select(query),
        InsertSource::DefaultValues => {
            let tail = t.context_ref().dialect.no_columns_insert_string();
            t.context().append(tail);
            Ok(())
        }
    }
}

fn render_values_rows<'d, T>(t: &mut T, rows: &[Vec<Expr>]) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    let dialect = t.context_ref().dialect;
    t.context().push_clause(Clause::Values);
    if rows.len() > 1 && !dialect.supports_values_list_for_insert() {
        debug!(
            dialect = dialect.name(),
            rows = rows.len(),
            "emulating multi-row values with union all"
        );
        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                t.context().append(" union all ");
            }
            t.context().append("select ");
            render_expr_list(t, row)?;
            t.context().append(dialect.from_dual_for_select_only());
        }
    } else {
        t.context().append("values ");
        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                t.context().append(",");
            }
            t.context().append("(");
            render_expr_list(t, row)?;
            t.context().append(")");
        }
    }
    t.context().pop_clause();
    Ok(())
}

fn render_assignments<'d, T>(
    t: &mut T,
    assignments: &[UpdateAssignment],
    excluded: ExcludedColumns,
) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    let outer = std::mem::replace(&mut t.context().excluded, excluded);
    t.context().push_clause(Clause::Set);
    let mut result = Ok(());
    for (i, assignment) in assignments.iter().enumerate() {
        if i > 0 {
            t.context().append(",");
        }
        let column = t.context_ref().dialect.quote(&assignment.column);
        t.context().append(&column);
        t.context().append("=");
        result = t.visit_expr(&assignment.value);
        if result.is_err() {
            break;
        }
    }
    t.context().pop_clause();
    t.context().excluded = outer;
    result
}

/// Renders an insert, delegating conflict clauses to
/// [`SqlAstTranslator::visit_upsert`].
///
/// # Errors
///
/// Fails on constructs the dialect cannot express.
pub fn visit_insert<'d, T>(t: &mut T, insert: &InsertStatement) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    if let Some(conflict) = &insert.on_conflict {
        return t.visit_upsert(insert, conflict);
    }
    render_insert_head(t, insert);
    render_insert_source(t, insert)
}

/// Renders an upsert as `on conflict`, `on duplicate key update` or a
/// `merge`, whichever the dialect has first.
///
/// # Errors
///
/// Returns [`DialectError::Unsupported`] when the dialect has none.
pub fn visit_upsert<'d, T>(t: &mut T, insert: &InsertStatement, conflict: &OnConflict) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    let dialect = t.context_ref().dialect;
    if dialect.supports_conflict_clause() {
        render_insert_head(t, insert);
        render_insert_source(t, insert)?;
        t.context().append(" on conflict");
        if !conflict.columns.is_empty() {
            let columns: Vec<String> = conflict.columns.iter().map(|c| dialect.quote(c)).collect();
            t.context().append(&format!(" ({})", columns.join(",")));
        }
        return match &conflict.action {
            ConflictAction::DoNothing => {
                t.context().append(" do nothing");
                Ok(())
            }
            ConflictAction::DoUpdate(assignments) => {
                t.context().append(" do update set ");
                render_assignments(t, assignments, ExcludedColumns::Keep)
            }
        };
    }
    if dialect.supports_on_duplicate_key() {
        render_insert_head(t, insert);
        render_insert_source(t, insert)?;
        t.context().append(" on duplicate key update ");
        return match &conflict.action {
            ConflictAction::DoNothing => {
                let column = conflict
                    .columns
                    .first()
                    .or_else(|| insert.columns.first())
                    .ok_or_else(|| unsupported(t, "on conflict do nothing without columns"))?;
                let column = dialect.quote(column);
                t.context().append(&format!("{column}={column}"));
                Ok(())
            }
            ConflictAction::DoUpdate(assignments) => {
                render_assignments(t, assignments, ExcludedColumns::ValuesFunction)
            }
        };
    }
    if dialect.supports_merge() {
        return render_merge(t, insert, conflict);
    }
    Err(unsupported(t, "insert ... on conflict"))
}

// merge into t using (select ? a,? b from dual) s_ on (t.a=s_.a)
// when not matched then insert (a,b) values (s_.a,s_.b)
// when matched then update set b=s_.b
fn render_merge<'d, T>(t: &mut T, insert: &InsertStatement, conflict: &OnConflict) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    let InsertSource::Values(rows) = &insert.values else {
        return Err(unsupported(t, "merge emulation of an insert from a query"));
    };
    if insert.columns.is_empty() || conflict.columns.is_empty() {
        return Err(unsupported(t, "merge emulation without column names"));
    }
    if let Some(row) = rows.iter().find(|row| row.len() != insert.columns.len()) {
        return Err(DialectError::Semantic(format!(
            "insert into {} names {} columns but a row has {} values",
            insert.table,
            insert.columns.len(),
            row.len()
        )));
    }
    let dialect = t.context_ref().dialect;
    debug!(
        dialect = dialect.name(),
        table = %insert.table,
        "emulating on conflict with merge"
    );
    let columns: Vec<String> = insert.columns.iter().map(|c| dialect.quote(c)).collect();
    let target = qualified_name(dialect, insert.schema.as_deref(), &insert.table);
    t.context().push_clause(Clause::Merge);
    t.context().append(&format!("merge into {target} using ("));
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            t.context().append(" union all ");
        }
        t.context().append("select ");
        for (k, (value, column)) in row.iter().zip(&columns).enumerate() {
            if k > 0 {
                t.context().append(",");
            }
            t.visit_expr(value)?;
            t.context().append(&format!(" {column}"));
        }
        t.context().append(dialect.from_dual_for_select_only());
    }
    let table = dialect.quote(&insert.table);
    let on: Vec<String> = conflict
        .columns
        .iter()
        .map(|c| {
            let c = dialect.quote(c);
            format!("{table}.{c}={MERGE_SOURCE}.{c}")
        })
        .collect();
    let values: Vec<String> = columns.iter().map(|c| format!("{MERGE_SOURCE}.{c}")).collect();
    t.context().append(&format!(
        ") {MERGE_SOURCE} on ({}) when not matched then insert ({}) values ({})",
        on.join(" and "),
        columns.join(","),
        values.join(",")
    ));
    if let ConflictAction::DoUpdate(assignments) = &conflict.action {
        if !assignments.is_empty() {
            t.context().append(" when matched then update set ");
            render_assignments(t, assignments, ExcludedColumns::Alias(MERGE_SOURCE))?;
        }
    }
    t.context().pop_clause();
    Ok(())
}

/// Renders an update. `update ... from` becomes correlated subqueries and
/// an `exists` restriction when the dialect lacks it.
///
/// # Errors
///
/// Fails on constructs the dialect cannot express.
pub fn visit_update<'d, T>(t: &mut T, update: &UpdateStatement) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    let dialect = t.context_ref().dialect;
    let mut target = qualified_name(dialect, update.schema.as_deref(), &update.table);
    if let Some(alias) = &update.alias {
        target.push(' ');
        target.push_str(alias);
    }
    t.context().append(&format!("update {target} set "));
    match &update.from {
        None => {
            render_assignments(t, &update.assignments, ExcludedColumns::Keep)?;
            render_where(t, update.where_clause.as_ref())
        }
        Some(from) if dialect.supports_update_from() => {
            render_assignments(t, &update.assignments, ExcludedColumns::Keep)?;
            t.context().push_clause(Clause::From);
            t.context().append(" from ");
            t.visit_table_ref(from)?;
            t.context().pop_clause();
            render_where(t, update.where_clause.as_ref())
        }
        Some(from) => {
            debug!(
                dialect = dialect.name(),
                table = %update.table,
                "emulating update ... from with correlated subqueries"
            );
            t.context().push_clause(Clause::Set);
            for (i, assignment) in update.assignments.iter().enumerate() {
                if i > 0 {
                    t.context().append(",");
                }
                let column = dialect.quote(&assignment.column);
                t.context().append(&format!("{column}=(select "));
                render_correlated(t, &assignment.value, from, update.where_clause.as_ref())?;
                t.context().append(")");
            }
            t.context().pop_clause();
            t.context().append(" where exists (select ");
            render_correlated(t, &Expr::integer(1), from, update.where_clause.as_ref())?;
            t.context().append(")");
            Ok(())
        }
    }
}

fn render_correlated<'d, T>(
    t: &mut T,
    value: &Expr,
    from: &TableRef,
    restriction: Option<&Expr>,
) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    t.context().enter_query();
    t.visit_expr(value)?;
    t.context().push_clause(Clause::From);
    t.context().append(" from ");
    t.visit_table_ref(from)?;
    t.context().pop_clause();
    render_where(t, restriction)?;
    t.context().exit_query();
    Ok(())
}

fn render_where<'d, T>(t: &mut T, restriction: Option<&Expr>) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    if let Some(restriction) = restriction {
        t.context().push_clause(Clause::Where);
        t.context().append(" where ");
        t.visit_predicate(restriction)?;
        t.context().pop_clause();
    }
    Ok(())
}

/// Renders `delete from table alias where ...`.
///
/// # Errors
///
/// Fails on constructs the dialect cannot express.
pub fn visit_delete<'d, T>(t: &mut T, delete: &DeleteStatement) -> Result<()>
where
    T: SqlAstTranslator<'d> + ?Sized,
{
    let dialect = t.context_ref().dialect;
    let mut target = qualified_name(dialect, delete.schema.as_deref(), &delete.table);
    if let Some(alias) = &delete.alias {
        target.push(' ');
        target.push_str(alias);
    }
    t.context().append(&format!("delete from {target}"));
    render_where(t, delete.where_clause.as_ref())
}
