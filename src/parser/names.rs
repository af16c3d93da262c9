/// Return the identifier without surrounding double quotes, backticks or brackets.
pub fn unquote_identifier(ident: &str) -> &str {
    [('"', '"'), ('`', '`'), ('[', ']')]
        .iter()
        .find_map(|(open, close)| {
            ident
                .strip_prefix(*open)
                .and_then(|s| s.strip_suffix(*close))
        })
        .unwrap_or(ident)
}

/// Normalize an identifier for case-insensitive matching.
///
/// Trims whitespace, removes surrounding quotes on a single identifier,
/// and lowercases the result.
pub fn normalize_identifier(ident: &str) -> String {
    unquote_identifier(ident.trim()).to_ascii_lowercase()
}

/// Split a dotted name into its unquoted parts.
///
/// Handles dots inside quoted identifiers, e.g. `"my.schema"."table.name"`.
pub fn split_qualified_name(name: &str) -> Vec<String> {
    let mut quote: Option<char> = None;
    let mut start = 0usize;
    let mut parts = Vec::new();

    for (idx, ch) in name.char_indices() {
        match (quote, ch) {
            (None, '"' | '`') => quote = Some(ch),
            (None, '[') => quote = Some(']'),
            (Some(open), _) if open == ch => quote = None,
            (None, '.') => {
                parts.push(unquote_identifier(name[start..idx].trim()).to_string());
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(unquote_identifier(name[start..].trim()).to_string());
    parts
}

/// Split a potentially schema-qualified table name into `(schema, relation)`.
///
/// Only the two terminal parts matter: `catalog.schema.table` yields
/// `(Some("schema"), "table")`.
pub fn split_schema_and_relation(name: &str) -> (Option<String>, String) {
    let mut parts = split_qualified_name(name);
    let relation = parts.pop().unwrap_or_default();
    (parts.pop(), relation)
}

/// Split a statement id of the form `<owner>.<method>` at its last dot.
pub fn split_owner_and_member(id: &str) -> Option<(&str, &str)> {
    let (owner, member) = id.trim().rsplit_once('.')?;
    if owner.is_empty() || member.is_empty() {
        return None;
    }
    Some((owner, member))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_schema_and_relation_handles_quoted_dots() {
        assert_eq!(
            split_schema_and_relation(r#""my.schema"."table.name""#),
            (Some("my.schema".to_string()), "table.name".to_string())
        );
    }

    #[test]
    fn split_schema_and_relation_keeps_terminal_parts() {
        assert_eq!(
            split_schema_and_relation("cat.test.user"),
            (Some("test".to_string()), "user".to_string())
        );
        assert_eq!(
            split_schema_and_relation("`orders`"),
            (None, "orders".to_string())
        );
    }

    #[test]
    fn normalize_identifier_handles_quotes_and_case() {
        assert_eq!(normalize_identifier(r#""Tenant_ID""#), "tenant_id");
        assert_eq!(normalize_identifier(" `SYS_USER` "), "sys_user");
        assert_eq!(normalize_identifier("[Orders]"), "orders");
    }

    #[test]
    fn split_owner_and_member_uses_last_dot() {
        assert_eq!(
            split_owner_and_member("com.acme.UserMapper.selectById"),
            Some(("com.acme.UserMapper", "selectById"))
        );
        assert_eq!(split_owner_and_member("selectById"), None);
        assert_eq!(split_owner_and_member("com.acme."), None);
    }
}
