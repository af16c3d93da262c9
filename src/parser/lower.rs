//! Lowering from `sqlparser`'s syntax tree into the closed analysis grammar.
//!
//! Lowering is total: shapes outside the grammar become `Other` nodes carrying
//! their rendered SQL, so analysis degrades to "not found" instead of failing.

use sqlparser::ast::{
    BinaryOperator, Delete, Expr, FromTable, Function, FunctionArguments, Insert, JoinConstraint,
    JoinOperator, Query, Select, SelectItem, SetExpr, SetQuantifier, TableFactor, TableObject,
    TableWithJoins,
};

use crate::error::{Error, Result};
use crate::parser::ast::{
    Expression, FromItem, ItemsList, Join, PlainSelect, SelectBody, SetOperator, Statement,
    TableRef,
};
use crate::parser::expr::{extract_column_ref, function_arg_expr, table_ref_from_object_name};

/// Lower a parsed statement. Only SELECT, INSERT, UPDATE and DELETE are accepted.
pub fn lower_statement(statement: &sqlparser::ast::Statement) -> Result<Statement> {
    use sqlparser::ast::Statement as Sql;

    match statement {
        Sql::Query(query) => Ok(Statement::Select(lower_query(query))),
        Sql::Insert(insert) => Ok(lower_insert(insert)),
        Sql::Update {
            table, selection, ..
        } => Ok(Statement::Update {
            table: primary_table(table),
            selection: selection.as_ref().map(lower_expr),
        }),
        Sql::Delete(delete) => Ok(lower_delete(delete)),
        other => Err(Error::UnsupportedStatement(leading_keyword(other))),
    }
}

fn leading_keyword(statement: &sqlparser::ast::Statement) -> String {
    statement
        .to_string()
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase()
}

fn lower_insert(insert: &Insert) -> Statement {
    let table = match &insert.table {
        TableObject::TableName(name) => Some(table_ref_from_object_name(name, None)),
        _ => None,
    };
    Statement::Insert {
        table,
        columns: insert.columns.iter().map(|c| c.value.clone()).collect(),
    }
}

fn lower_delete(delete: &Delete) -> Statement {
    let (FromTable::WithFromKeyword(from) | FromTable::WithoutKeyword(from)) = &delete.from;
    // Multi-table `DELETE t1 FROM t1 JOIN t2` names its target before FROM.
    let table = delete
        .tables
        .first()
        .map(|name| table_ref_from_object_name(name, None))
        .or_else(|| from.first().and_then(primary_table));
    Statement::Delete {
        table,
        selection: delete.selection.as_ref().map(lower_expr),
    }
}

fn primary_table(table: &TableWithJoins) -> Option<TableRef> {
    match lower_table_factor(&table.relation) {
        FromItem::Table(table) => Some(table),
        _ => None,
    }
}

/// Lower a query. Queries with a `WITH` clause are outside the grammar.
pub fn lower_query(query: &Query) -> SelectBody {
    if query.with.is_some() {
        return SelectBody::Other {
            sql: query.to_string(),
        };
    }
    lower_set_expr(&query.body)
}

fn lower_set_expr(body: &SetExpr) -> SelectBody {
    match body {
        SetExpr::Select(select) => SelectBody::Plain(lower_select(select)),
        SetExpr::Query(query) => lower_query(query),
        SetExpr::SetOperation {
            op,
            set_quantifier,
            left,
            right,
        } => {
            let operator = match op {
                sqlparser::ast::SetOperator::Union
                    if matches!(set_quantifier, SetQuantifier::All | SetQuantifier::AllByName) =>
                {
                    SetOperator::UnionAll
                }
                sqlparser::ast::SetOperator::Union => SetOperator::Union,
                sqlparser::ast::SetOperator::Intersect => SetOperator::Intersect,
                _ => SetOperator::Except,
            };
            let mut branches = Vec::new();
            push_branch(&mut branches, operator, lower_set_expr(left));
            push_branch(&mut branches, operator, lower_set_expr(right));
            SelectBody::SetOperation { operator, branches }
        }
        other => SelectBody::Other {
            sql: other.to_string(),
        },
    }
}

/// Flatten `a UNION ALL b UNION ALL c` into one chain of three branches.
fn push_branch(branches: &mut Vec<SelectBody>, operator: SetOperator, branch: SelectBody) {
    match branch {
        SelectBody::SetOperation {
            operator: inner,
            branches: nested,
        } if inner == operator => branches.extend(nested),
        other => branches.push(other),
    }
}

fn lower_select(select: &Select) -> PlainSelect {
    let mut tables = select.from.iter();
    let (from, mut joins) = match tables.next() {
        Some(first) => (
            Some(lower_table_factor(&first.relation)),
            first.joins.iter().map(lower_join).collect::<Vec<_>>(),
        ),
        None => (None, Vec::new()),
    };
    // `FROM a, b` keeps `b` as a join without conditions.
    for extra in tables {
        joins.push(Join {
            relation: lower_table_factor(&extra.relation),
            on_conditions: Vec::new(),
        });
        joins.extend(extra.joins.iter().map(lower_join));
    }

    PlainSelect {
        projection: select.projection.iter().map(lower_select_item).collect(),
        from,
        joins,
        selection: select.selection.as_ref().map(lower_expr),
    }
}

fn lower_select_item(item: &SelectItem) -> Expression {
    match item {
        SelectItem::UnnamedExpr(expr) | SelectItem::ExprWithAlias { expr, .. } => lower_expr(expr),
        other => Expression::Other(other.to_string()),
    }
}

fn lower_table_factor(factor: &TableFactor) -> FromItem {
    match factor {
        TableFactor::Table { name, alias, .. } => FromItem::Table(table_ref_from_object_name(
            name,
            alias.as_ref().map(|a| &a.name),
        )),
        TableFactor::Derived {
            subquery, alias, ..
        } => FromItem::Subquery {
            body: Box::new(lower_query(subquery)),
            alias: alias.as_ref().map(|a| a.name.value.clone()),
        },
        other => FromItem::Other {
            sql: other.to_string(),
        },
    }
}

fn lower_join(join: &sqlparser::ast::Join) -> Join {
    Join {
        relation: lower_table_factor(&join.relation),
        on_conditions: join_on_expr(&join.join_operator)
            .map(lower_expr)
            .into_iter()
            .collect(),
    }
}

/// Extract the ON expression from a `JoinOperator`, if present.
fn join_on_expr(op: &JoinOperator) -> Option<&Expr> {
    use sqlparser::ast::JoinOperator::{
        Anti, AsOf, CrossJoin, FullOuter, Inner, Join, Left, LeftAnti, LeftOuter, LeftSemi, Right,
        RightAnti, RightOuter, RightSemi, Semi, StraightJoin,
    };
    let c = match op {
        Join(c) | Inner(c) | Left(c) | LeftOuter(c) | Right(c) | RightOuter(c) | FullOuter(c)
        | CrossJoin(c) | Semi(c) | LeftSemi(c) | RightSemi(c) | Anti(c) | LeftAnti(c)
        | RightAnti(c) | StraightJoin(c) => c,
        AsOf { constraint, .. } => constraint,
        _ => return None,
    };
    if let JoinConstraint::On(expr) = c {
        Some(expr)
    } else {
        None
    }
}

/// Lower an expression. Parentheses are transparent.
pub fn lower_expr(expr: &Expr) -> Expression {
    match expr {
        Expr::Identifier(_) | Expr::CompoundIdentifier(_) => extract_column_ref(expr)
            .map_or_else(|| Expression::Other(expr.to_string()), Expression::ColumnRef),
        Expr::Nested(inner) => lower_expr(inner),
        Expr::BinaryOp { left, op, right } => lower_binary(left, op, right),
        Expr::Like {
            expr: target,
            pattern,
            negated,
            ..
        } => other_binary(if *negated { "NOT LIKE" } else { "LIKE" }, target, pattern),
        Expr::ILike {
            expr: target,
            pattern,
            negated,
            ..
        } => other_binary(if *negated { "NOT ILIKE" } else { "ILIKE" }, target, pattern),
        Expr::SimilarTo {
            expr: target,
            pattern,
            negated,
            ..
        } => other_binary(
            if *negated { "NOT SIMILAR TO" } else { "SIMILAR TO" },
            target,
            pattern,
        ),
        Expr::RLike {
            expr: target,
            pattern,
            negated,
            ..
        } => other_binary(if *negated { "NOT RLIKE" } else { "RLIKE" }, target, pattern),
        Expr::IsDistinctFrom(left, right) => other_binary("IS DISTINCT FROM", left, right),
        Expr::IsNotDistinctFrom(left, right) => {
            other_binary("IS NOT DISTINCT FROM", left, right)
        }
        // The right operand of ANY/ALL may be a subquery; it is lowered like
        // any other operand so the scan still recurses into it.
        Expr::AnyOp {
            left,
            compare_op,
            right,
            ..
        } => other_binary(&format!("{compare_op} ANY"), left, right),
        Expr::AllOp {
            left,
            compare_op,
            right,
        } => other_binary(&format!("{compare_op} ALL"), left, right),
        Expr::InList {
            expr: left,
            list,
            negated,
        } => Expression::In {
            left: Box::new(lower_expr(left)),
            items: ItemsList::ExpressionList(list.iter().map(lower_expr).collect()),
            negated: *negated,
        },
        Expr::InSubquery {
            expr: left,
            subquery,
            negated,
        } => Expression::In {
            left: Box::new(lower_expr(left)),
            items: ItemsList::Subquery(Box::new(lower_query(subquery))),
            negated: *negated,
        },
        Expr::Between {
            expr: target,
            negated,
            low,
            high,
        } => Expression::Between {
            target: Box::new(lower_expr(target)),
            start: Box::new(lower_expr(low)),
            end: Box::new(lower_expr(high)),
            negated: *negated,
        },
        Expr::Function(function) => lower_function(function),
        Expr::Subquery(query) => Expression::Subquery(Box::new(lower_query(query))),
        Expr::Exists { subquery, negated } => Expression::Exists {
            body: Box::new(lower_query(subquery)),
            negated: *negated,
        },
        other => Expression::Other(other.to_string()),
    }
}

fn lower_binary(left: &Expr, op: &BinaryOperator, right: &Expr) -> Expression {
    let (l, r) = (Box::new(lower_expr(left)), Box::new(lower_expr(right)));
    match op {
        BinaryOperator::And => Expression::And(l, r),
        BinaryOperator::Or => Expression::Or(l, r),
        BinaryOperator::Eq => Expression::Equals(l, r),
        other => Expression::OtherBinary {
            op: other.to_string(),
            left: l,
            right: r,
        },
    }
}

fn other_binary(op: &str, left: &Expr, right: &Expr) -> Expression {
    Expression::OtherBinary {
        op: op.to_string(),
        left: Box::new(lower_expr(left)),
        right: Box::new(lower_expr(right)),
    }
}

fn lower_function(function: &Function) -> Expression {
    let args = match &function.args {
        FunctionArguments::None => Vec::new(),
        FunctionArguments::Subquery(query) => {
            vec![Expression::Subquery(Box::new(lower_query(query)))]
        }
        FunctionArguments::List(list) => list
            .args
            .iter()
            .map(|arg| {
                function_arg_expr(arg).map_or_else(|| Expression::Other(arg.to_string()), lower_expr)
            })
            .collect(),
    };
    Expression::FunctionCall {
        name: function.name.to_string(),
        args,
    }
}
