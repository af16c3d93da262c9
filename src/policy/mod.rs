/// Single-rule decision: does a rule apply to a statement?
pub mod matcher;
/// Policy rule, scope level and statement kind types, plus their configuration form.
pub mod rule;
/// Ordered rule collection with JSON loading and any-match aggregation.
pub mod rule_set;

pub use matcher::matches;
pub use rule::{PolicyRule, RuleConfig, ScopeLevel, StatementKind};
pub use rule_set::PolicySet;
