//! Detects whether a statement already filters on the sentinel column.
//!
//! Every entry point first applies the textual fast-reject check: when the
//! rendered node does not mention the sentinel at all, recursion stops. Then
//! the node is matched exhaustively and any positive branch short-circuits.

use crate::analysis::sentinel::Sentinel;
use crate::parser::ast::{Expression, FromItem, ItemsList, Join, SelectBody, Statement};
use crate::parser::sql_parser;

/// True when a `SELECT` statement references the sentinel column in a
/// condition: `WHERE`, `JOIN ... ON`, or any nested subquery or UNION branch.
///
/// Writes are never scanned here; see [`insert_has_sentinel`].
pub fn scan(statement: &Statement, sentinel: &Sentinel) -> bool {
    if !sentinel.is_mentioned_in(statement) {
        return false;
    }
    match statement {
        Statement::Select(body) => scan_select(body, sentinel),
        Statement::Insert { .. } | Statement::Update { .. } | Statement::Delete { .. } => false,
    }
}

/// Parse `sql` and [`scan`] it. Unparseable or unsupported SQL yields `false`.
pub fn scan_sql(sql: &str, sentinel: &Sentinel) -> bool {
    if !sentinel.is_mentioned_in_text(sql) {
        return false;
    }
    sql_parser::parse_statement(sql).is_ok_and(|statement| scan(&statement, sentinel))
}

/// Scan a query body. A set operation counts as filtered as soon as one of
/// its branches is.
pub fn scan_select(body: &SelectBody, sentinel: &Sentinel) -> bool {
    if !sentinel.is_mentioned_in(body) {
        return false;
    }
    match body {
        SelectBody::Plain(select) => {
            select
                .selection
                .as_ref()
                .is_some_and(|selection| scan_expression(selection, sentinel))
                || select.joins.iter().any(|join| scan_join(join, sentinel))
                || select
                    .from
                    .as_ref()
                    .is_some_and(|from| scan_from_item(from, sentinel))
        }
        SelectBody::SetOperation { branches, .. } => {
            branches.iter().any(|branch| scan_select(branch, sentinel))
        }
        SelectBody::Other { .. } => false,
    }
}

/// Only derived tables can carry a predicate.
pub fn scan_from_item(item: &FromItem, sentinel: &Sentinel) -> bool {
    if !sentinel.is_mentioned_in(item) {
        return false;
    }
    match item {
        FromItem::Subquery { body, .. } => scan_select(body, sentinel),
        FromItem::Table(_) | FromItem::Other { .. } => false,
    }
}

/// Scan the `ON` conditions of a join. The joined relation itself is not
/// inspected.
pub fn scan_join(join: &Join, sentinel: &Sentinel) -> bool {
    if !sentinel.is_mentioned_in(join) {
        return false;
    }
    join.on_conditions
        .iter()
        .any(|condition| scan_expression(condition, sentinel))
}

/// Scan an expression tree.
pub fn scan_expression(expr: &Expression, sentinel: &Sentinel) -> bool {
    if !sentinel.is_mentioned_in(expr) {
        return false;
    }
    match expr {
        Expression::And(left, right)
        | Expression::Or(left, right)
        | Expression::Equals(left, right)
        | Expression::OtherBinary { left, right, .. } => {
            scan_expression(left, sentinel) || scan_expression(right, sentinel)
        }
        Expression::In { left, items, .. } => {
            scan_expression(left, sentinel) || scan_items_list(items, sentinel)
        }
        Expression::Between {
            target, start, end, ..
        } => {
            scan_expression(target, sentinel)
                || scan_expression(start, sentinel)
                || scan_expression(end, sentinel)
        }
        Expression::FunctionCall { args, .. } => {
            args.iter().any(|arg| scan_expression(arg, sentinel))
        }
        Expression::Subquery(body) | Expression::Exists { body, .. } => {
            scan_select(body, sentinel)
        }
        Expression::ColumnRef(column) => sentinel.matches_column(&column.name),
        Expression::Other(_) => false,
    }
}

/// Scan the right-hand side of an `IN` predicate.
pub fn scan_items_list(items: &ItemsList, sentinel: &Sentinel) -> bool {
    if !sentinel.is_mentioned_in(items) {
        return false;
    }
    match items {
        ItemsList::ExpressionList(list) => list.iter().any(|item| scan_expression(item, sentinel)),
        ItemsList::Subquery(body) => scan_select(body, sentinel),
    }
}

/// True when an `INSERT` explicitly sets the sentinel column.
pub fn insert_has_sentinel(statement: &Statement, sentinel: &Sentinel) -> bool {
    match statement {
        Statement::Insert { columns, .. } => {
            columns.iter().any(|column| sentinel.matches_column(column))
        }
        _ => false,
    }
}

/// Parse `sql` and apply [`insert_has_sentinel`]. Unparseable SQL yields `false`.
pub fn insert_sql_has_sentinel(sql: &str, sentinel: &Sentinel) -> bool {
    if !sentinel.is_mentioned_in_text(sql) {
        return false;
    }
    sql_parser::parse_statement(sql).is_ok_and(|statement| insert_has_sentinel(&statement, sentinel))
}
