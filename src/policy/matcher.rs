use crate::analysis::table_resolver;
use crate::parser::ast::{Statement, TableRef};
use crate::policy::rule::{PolicyRule, ScopeLevel, StatementKind};

/// Table-scope value that matches every resolvable table.
pub const ALL_TABLES: &str = "all";

/// Marker delimiting a substring pattern such as `**order**`.
pub const PATTERN_MARKER: &str = "**";

/// Decide whether `rule` applies to `statement`.
pub fn matches(rule: &PolicyRule, statement: &Statement) -> bool {
    match rule.scope() {
        ScopeLevel::StatementKind => kind_matches(rule, StatementKind::of(statement)),
        ScopeLevel::Table => {
            table_resolver::resolve(statement).is_some_and(|table| table_matches(rule, table))
        }
        ScopeLevel::Database => {
            table_resolver::resolve(statement).is_some_and(|table| database_matches(rule, table))
        }
    }
}

/// Kind is allowed and not ignored.
pub fn kind_matches(rule: &PolicyRule, kind: StatementKind) -> bool {
    rule.allowed_values().contains(kind.as_str()) && !rule.ignore_values().contains(kind.as_str())
}

/// Ignore list first, then `all`, exact name, and `**substring**` patterns.
pub fn table_matches(rule: &PolicyRule, table: &TableRef) -> bool {
    let name = table.name.to_lowercase();
    if rule.ignore_values().contains(&name) {
        return false;
    }
    let allowed = rule.allowed_values();
    allowed.contains(ALL_TABLES)
        || allowed.contains(&name)
        || allowed
            .iter()
            .filter(|value| value.contains(PATTERN_MARKER))
            .any(|pattern| name.contains(&pattern.replace(PATTERN_MARKER, "")))
}

/// Schema qualifier is present and allowed.
pub fn database_matches(rule: &PolicyRule, table: &TableRef) -> bool {
    table
        .schema
        .as_ref()
        .is_some_and(|schema| rule.allowed_values().contains(&schema.to_lowercase()))
}
