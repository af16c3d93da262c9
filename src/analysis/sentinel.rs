use std::fmt;

use crate::parser::names::normalize_identifier;

/// Default discriminator column.
pub const DEFAULT_SENTINEL: &str = "tenant_id";

/// The discriminator column searched for by the predicate scanner.
///
/// Stored lower-cased; every comparison ignores ASCII case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sentinel(String);

impl Sentinel {
    /// Build a sentinel from a column name; surrounding quotes are ignored.
    pub fn new(column: &str) -> Self {
        Self(normalize_identifier(column))
    }

    /// Lower-cased column name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when `column` names the sentinel.
    pub fn matches_column(&self, column: &str) -> bool {
        column.eq_ignore_ascii_case(&self.0)
    }

    /// Fast-reject check: true when the rendered text of `node` contains the
    /// sentinel anywhere. A `false` answer proves the sentinel is absent.
    pub fn is_mentioned_in(&self, node: &dyn fmt::Display) -> bool {
        self.is_mentioned_in_text(&node.to_string())
    }

    /// Same as [`Sentinel::is_mentioned_in`] on raw SQL text.
    pub fn is_mentioned_in_text(&self, text: &str) -> bool {
        !self.0.is_empty() && text.to_ascii_lowercase().contains(&self.0)
    }
}

impl Default for Sentinel {
    fn default() -> Self {
        Self::new(DEFAULT_SENTINEL)
    }
}

impl From<&str> for Sentinel {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
