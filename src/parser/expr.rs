use sqlparser::ast::{Expr, FunctionArg, FunctionArgExpr, Ident, ObjectName};

use crate::parser::ast::{ColumnRef, TableRef};
use crate::parser::names::split_schema_and_relation;

/// Extract a column reference from an identifier expression.
///
/// Supports plain identifiers (`tenant_id`) and qualified identifiers
/// (`a.tenant_id`, `app.sys_user.tenant_id`); the qualifier keeps only the
/// component directly before the column.
pub fn extract_column_ref(expr: &Expr) -> Option<ColumnRef> {
    match expr {
        Expr::Identifier(ident) => Some(ColumnRef {
            table: None,
            name: ident.value.clone(),
        }),
        Expr::CompoundIdentifier(parts) => column_ref_from_parts(parts),
        Expr::Nested(inner) => extract_column_ref(inner),
        _ => None,
    }
}

fn column_ref_from_parts(parts: &[Ident]) -> Option<ColumnRef> {
    let (column, qualifiers) = parts.split_last()?;
    Some(ColumnRef {
        table: qualifiers.last().map(|ident| ident.value.clone()),
        name: column.value.clone(),
    })
}

/// Extract the expression payload from a SQL function argument.
pub fn function_arg_expr(arg: &FunctionArg) -> Option<&Expr> {
    match arg {
        FunctionArg::Unnamed(FunctionArgExpr::Expr(expr))
        | FunctionArg::Named {
            arg: FunctionArgExpr::Expr(expr),
            ..
        }
        | FunctionArg::ExprNamed {
            arg: FunctionArgExpr::Expr(expr),
            ..
        } => Some(expr),
        _ => None,
    }
}

/// Build a [`TableRef`] from a possibly schema-qualified object name.
pub fn table_ref_from_object_name(name: &ObjectName, alias: Option<&Ident>) -> TableRef {
    let (schema, relation) = split_schema_and_relation(&name.to_string());
    TableRef {
        schema,
        name: relation,
        alias: alias.map(|ident| ident.value.clone()),
    }
}
