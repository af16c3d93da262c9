use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::Error;
use crate::parser::ast::Statement;

/// Granularity at which a rule is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeLevel {
    /// Match on the statement kind (`insert`, `select`, `update`, `delete`).
    #[serde(rename = "dml", alias = "statement_kind")]
    StatementKind,
    /// Match on the resolved table name.
    #[serde(rename = "table")]
    Table,
    /// Match on the schema qualifier of the resolved table.
    #[serde(rename = "databases", alias = "database")]
    Database,
}

impl fmt::Display for ScopeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeLevel::StatementKind => write!(f, "dml"),
            ScopeLevel::Table => write!(f, "table"),
            ScopeLevel::Database => write!(f, "databases"),
        }
    }
}

/// Structural kind of a [`Statement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    /// `INSERT`
    Insert,
    /// `SELECT`
    Select,
    /// `UPDATE`
    Update,
    /// `DELETE`
    Delete,
}

impl StatementKind {
    /// Kind of `statement`, derived from its variant.
    pub fn of(statement: &Statement) -> Self {
        match statement {
            Statement::Select(_) => StatementKind::Select,
            Statement::Insert { .. } => StatementKind::Insert,
            Statement::Update { .. } => StatementKind::Update,
            Statement::Delete { .. } => StatementKind::Delete,
        }
    }

    /// Lower-case name as it appears in rule values.
    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::Insert => "insert",
            StatementKind::Select => "select",
            StatementKind::Update => "update",
            StatementKind::Delete => "delete",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

/// A read-only tenant policy rule.
///
/// Allowed and ignored values are lower-cased once at construction; matching
/// lower-cases only the candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRule {
    name: String,
    scope: ScopeLevel,
    allowed_values: BTreeSet<String>,
    ignore_values: BTreeSet<String>,
}

impl PolicyRule {
    /// Build a rule, normalizing both value sets.
    pub fn new<A, I>(name: impl Into<String>, scope: ScopeLevel, allowed: A, ignore: I) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self {
            name: name.into(),
            scope,
            allowed_values: normalize_values(allowed),
            ignore_values: normalize_values(ignore),
        }
    }

    /// Rule name from configuration.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scope the rule is evaluated at.
    pub fn scope(&self) -> ScopeLevel {
        self.scope
    }

    /// Lower-cased allowed values.
    pub fn allowed_values(&self) -> &BTreeSet<String> {
        &self.allowed_values
    }

    /// Lower-cased ignored values.
    pub fn ignore_values(&self) -> &BTreeSet<String> {
        &self.ignore_values
    }

    /// True when this rule applies to `statement`.
    pub fn matches(&self, statement: &Statement) -> bool {
        crate::policy::matcher::matches(self, statement)
    }
}

fn normalize_values<V>(values: V) -> BTreeSet<String>
where
    V: IntoIterator,
    V::Item: AsRef<str>,
{
    values
        .into_iter()
        .map(|value| value.as_ref().trim().to_lowercase())
        .filter(|value| !value.is_empty())
        .collect()
}

/// One rule as written in the policy configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Rule name, used in decisions and logs.
    pub name: String,
    /// Scope level: `dml`, `table` or `databases`.
    pub level: ScopeLevel,
    /// Allowed values for the scope.
    #[serde(default)]
    pub value: Vec<String>,
    /// Values that suppress a match.
    #[serde(default, alias = "ignore")]
    pub ignore_tables: Vec<String>,
}

impl TryFrom<RuleConfig> for PolicyRule {
    type Error = Error;

    fn try_from(config: RuleConfig) -> Result<Self, Self::Error> {
        if config.name.trim().is_empty() {
            return Err(Error::InvalidRule {
                name: config.name,
                reason: "rule name must not be empty".to_string(),
            });
        }
        Ok(PolicyRule::new(
            config.name.trim(),
            config.level,
            config.value,
            config.ignore_tables,
        ))
    }
}
