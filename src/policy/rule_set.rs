use crate::error::{Error, Result};
use crate::parser::ast::Statement;
use crate::policy::rule::{PolicyRule, RuleConfig};

/// Ordered collection of policy rules with any-match aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicySet {
    rules: Vec<PolicyRule>,
}

impl PolicySet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from configured rules, validating each one.
    pub fn from_configs(configs: impl IntoIterator<Item = RuleConfig>) -> Result<Self> {
        let mut set = Self::new();
        for config in configs {
            set.insert(PolicyRule::try_from(config)?);
        }
        Ok(set)
    }

    /// Build a set from a JSON array of rule objects.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut set = Self::new();
        set.load_from_json(json)?;
        Ok(set)
    }

    /// Merge rules from a JSON array of rule objects.
    ///
    /// A rule whose name is already present replaces the existing one in place.
    pub fn load_from_json(&mut self, json: &str) -> Result<()> {
        let configs: Vec<RuleConfig> = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("invalid rule list: {e}")))?;
        for config in configs {
            self.insert(PolicyRule::try_from(config)?);
        }
        Ok(())
    }

    /// Add a rule, replacing any rule with the same name.
    pub fn insert(&mut self, rule: PolicyRule) {
        match self.rules.iter_mut().find(|r| r.name() == rule.name()) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
    }

    /// Rules in configuration order.
    pub fn rules(&self) -> &[PolicyRule] {
        &self.rules
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when no rule is configured.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules applying to `statement`, in configuration order.
    pub fn matching<'a>(
        &'a self,
        statement: &'a Statement,
    ) -> impl Iterator<Item = &'a PolicyRule> + 'a {
        self.rules.iter().filter(move |rule| rule.matches(statement))
    }

    /// True when any rule applies to `statement`.
    pub fn any_matches(&self, statement: &Statement) -> bool {
        self.matching(statement).next().is_some()
    }
}

impl FromIterator<PolicyRule> for PolicySet {
    fn from_iter<T: IntoIterator<Item = PolicyRule>>(iter: T) -> Self {
        let mut set = Self::new();
        for rule in iter {
            set.insert(rule);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::sql_parser::parse_statement;
    use crate::policy::rule::ScopeLevel;

    #[test]
    fn load_from_json_merges_by_name() {
        let mut set = PolicySet::new();
        set.load_from_json(r#"[{"name": "a", "level": "table", "value": ["orders"]}]"#)
            .expect("rules should load");
        set.load_from_json(
            r#"[{"name": "b", "level": "dml", "value": ["select"]},
                {"name": "a", "level": "table", "value": ["users"]}]"#,
        )
        .expect("rules should merge");

        let names: Vec<&str> = set.rules().iter().map(PolicyRule::name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(set.rules()[0].allowed_values().contains("users"));
    }

    #[test]
    fn load_from_json_reports_invalid_input() {
        let mut set = PolicySet::new();
        let err = set
            .load_from_json(r#"[{"name": "a", "level": "schema"}]"#)
            .unwrap_err();
        assert!(err.to_string().contains("invalid rule list"), "{err}");
    }

    #[test]
    fn matching_keeps_configuration_order() {
        let set: PolicySet = [
            PolicyRule::new("by_table", ScopeLevel::Table, ["orders"], [""; 0]),
            PolicyRule::new("never", ScopeLevel::Database, ["other"], [""; 0]),
            PolicyRule::new("by_kind", ScopeLevel::StatementKind, ["select"], [""; 0]),
        ]
        .into_iter()
        .collect();
        let statement = parse_statement("select * from orders").unwrap();

        let names: Vec<&str> = set.matching(&statement).map(PolicyRule::name).collect();
        assert_eq!(names, vec!["by_table", "by_kind"]);
        assert!(set.any_matches(&statement));
        assert!(!PolicySet::new().any_matches(&statement));
    }
}
