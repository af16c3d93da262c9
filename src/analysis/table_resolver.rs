use crate::parser::ast::{FromItem, SelectBody, Statement, TableRef};

/// Resolve the representative table of a statement.
///
/// Writes return their explicit target. Queries descend through the primary
/// `FROM` item and, for set operations, return the first branch that resolves.
/// Joined tables are never consulted.
pub fn resolve(statement: &Statement) -> Option<&TableRef> {
    match statement {
        Statement::Select(body) => resolve_select(body),
        Statement::Insert { table, .. }
        | Statement::Update { table, .. }
        | Statement::Delete { table, .. } => table.as_ref(),
    }
}

/// Resolve the table of a query body.
pub fn resolve_select(body: &SelectBody) -> Option<&TableRef> {
    match body {
        SelectBody::Plain(select) => match select.from.as_ref()? {
            FromItem::Table(table) => Some(table),
            FromItem::Subquery { body, .. } => resolve_select(body),
            FromItem::Other { .. } => None,
        },
        SelectBody::SetOperation { branches, .. } => branches.iter().find_map(resolve_select),
        SelectBody::Other { .. } => None,
    }
}
