use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::parser::names::split_owner_and_member;

/// Suffix appended by pagination helpers to the id of a generated count query.
pub const COUNT_SUFFIX: &str = "_COUNT";

/// Exemptions as written in the policy configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExemptionConfig {
    /// Fully qualified owner types whose statements are all exempt.
    #[serde(default)]
    pub owners: Vec<String>,
    /// Individual statement ids (`<owner>.<method>`).
    #[serde(default)]
    pub statements: Vec<String>,
}

/// Statements that must never receive a tenant filter.
///
/// Statement ids have the form `<owner>.<method>`. Ids are compared exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExemptionRegistry {
    owners: HashSet<String>,
    statements: HashSet<String>,
}

impl ExemptionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Exempt every statement of `owner`.
    pub fn exempt_owner(&mut self, owner: impl Into<String>) {
        self.owners.insert(owner.into());
    }

    /// Exempt a single statement id.
    pub fn exempt_statement(&mut self, statement_id: impl Into<String>) {
        self.statements.insert(statement_id.into());
    }

    /// True when nothing is exempt.
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty() && self.statements.is_empty()
    }

    /// True when `statement_id` is exempt, either through its owner or itself.
    ///
    /// A method ending in [`COUNT_SUFFIX`] is looked up under its base name, so
    /// the count query generated for an exempt method is exempt as well.
    pub fn is_exempt(&self, statement_id: &str) -> bool {
        let statement_id = statement_id.trim();
        let Some((owner, method)) = split_owner_and_member(statement_id) else {
            return self.statements.contains(statement_id);
        };
        if self.owners.contains(owner) {
            return true;
        }
        let method = method.strip_suffix(COUNT_SUFFIX).unwrap_or(method);
        self.statements.contains(&format!("{owner}.{method}"))
    }
}

impl From<ExemptionConfig> for ExemptionRegistry {
    fn from(config: ExemptionConfig) -> Self {
        let mut registry = Self::new();
        for owner in config.owners {
            registry.exempt_owner(owner.trim());
        }
        for statement in config.statements {
            registry.exempt_statement(statement.trim());
        }
        registry
    }
}
