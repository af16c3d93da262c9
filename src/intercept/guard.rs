use serde::Serialize;
use std::borrow::Cow;

use crate::analysis::predicate_scanner::{insert_has_sentinel, scan};
use crate::analysis::sentinel::Sentinel;
use crate::analysis::table_resolver::resolve;
use crate::error::{Error, Result};
use crate::intercept::exemption::ExemptionRegistry;
use crate::parser::ast::{Statement, TableRef};
use crate::parser::sql_parser;
use crate::policy::rule::PolicyRule;
use crate::policy::rule_set::PolicySet;

/// Host-supplied step that injects the tenant predicate into a statement.
pub trait SqlRewriter {
    /// Return the rewritten SQL for `sql`, given the rules that applied.
    fn rewrite(&self, sql: &str, statement: &Statement, rules: &[&PolicyRule]) -> Result<String>;
}

impl<F> SqlRewriter for F
where
    F: Fn(&str, &Statement, &[&PolicyRule]) -> Result<String>,
{
    fn rewrite(&self, sql: &str, statement: &Statement, rules: &[&PolicyRule]) -> Result<String> {
        self(sql, statement, rules)
    }
}

/// Outcome of inspecting one statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// The statement id is exempt; the statement was not analysed.
    Exempt,
    /// The SQL could not be analysed; it must be left untouched.
    Unsupported {
        /// Parse or lowering error.
        reason: String,
    },
    /// A sentinel condition or inserted sentinel column is already present.
    AlreadyScoped,
    /// No configured rule applies.
    NoMatchingRule,
    /// At least one rule applies: the statement needs a tenant filter.
    Inject {
        /// Names of the matching rules, in configuration order.
        rules: Vec<String>,
        /// Resolved target table, when known.
        #[serde(skip_serializing_if = "Option::is_none")]
        table: Option<TableRef>,
    },
}

impl Decision {
    /// True when the statement must be rewritten.
    pub fn requires_filter(&self) -> bool {
        matches!(self, Decision::Inject { .. })
    }

    /// Short snake-case label.
    pub fn label(&self) -> &'static str {
        match self {
            Decision::Exempt => "exempt",
            Decision::Unsupported { .. } => "unsupported",
            Decision::AlreadyScoped => "already_scoped",
            Decision::NoMatchingRule => "no_matching_rule",
            Decision::Inject { .. } => "inject",
        }
    }
}

/// Interception entry point: exemptions, then the sentinel scan, then the
/// policy rules.
#[derive(Debug, Clone, Default)]
pub struct TenantGuard {
    sentinel: Sentinel,
    policies: PolicySet,
    exemptions: ExemptionRegistry,
}

impl TenantGuard {
    /// Assemble a guard from its read-only parts.
    pub fn new(sentinel: Sentinel, policies: PolicySet, exemptions: ExemptionRegistry) -> Self {
        Self {
            sentinel,
            policies,
            exemptions,
        }
    }

    /// Discriminator column.
    pub fn sentinel(&self) -> &Sentinel {
        &self.sentinel
    }

    /// Configured rules.
    pub fn policies(&self) -> &PolicySet {
        &self.policies
    }

    /// Configured exemptions.
    pub fn exemptions(&self) -> &ExemptionRegistry {
        &self.exemptions
    }

    /// Inspect SQL text issued under `statement_id`.
    pub fn inspect(&self, statement_id: Option<&str>, sql: &str) -> Decision {
        match self.prepare(statement_id, sql) {
            Ok(statement) => self.inspect_statement(&statement),
            Err(decision) => decision,
        }
    }

    /// Inspect an already parsed statement. Exemptions are not consulted.
    pub fn inspect_statement(&self, statement: &Statement) -> Decision {
        match self.applicable_rules(statement) {
            Some(rules) => self.decide(statement, &rules),
            None => Decision::AlreadyScoped,
        }
    }

    /// Inspect and, when a filter is required, rewrite the SQL through
    /// `rewriter`. Any other decision returns the original text.
    pub fn intercept<'a, R>(
        &self,
        statement_id: Option<&str>,
        sql: &'a str,
        rewriter: &R,
    ) -> Result<Cow<'a, str>>
    where
        R: SqlRewriter + ?Sized,
    {
        let statement = match self.prepare(statement_id, sql) {
            Ok(statement) => statement,
            Err(_) => return Ok(Cow::Borrowed(sql)),
        };
        let Some(rules) = self.applicable_rules(&statement) else {
            return Ok(Cow::Borrowed(sql));
        };
        if !self.decide(&statement, &rules).requires_filter() {
            return Ok(Cow::Borrowed(sql));
        }

        tracing::debug!(statement_id, sql, "rewriting statement");
        let rewritten = rewriter.rewrite(sql, &statement, &rules)?;
        tracing::debug!(statement_id, sql = %rewritten, "rewritten statement");
        Ok(Cow::Owned(rewritten))
    }

    /// Rules applying to `statement`, or `None` when it is already scoped.
    fn applicable_rules(&self, statement: &Statement) -> Option<Vec<&PolicyRule>> {
        if scan(statement, &self.sentinel) || insert_has_sentinel(statement, &self.sentinel) {
            tracing::debug!(sentinel = %self.sentinel, "statement already scoped");
            return None;
        }
        Some(
            self.policies
                .rules()
                .iter()
                .filter(|rule| rule.matches(statement))
                .collect(),
        )
    }

    fn decide(&self, statement: &Statement, rules: &[&PolicyRule]) -> Decision {
        if rules.is_empty() {
            return Decision::NoMatchingRule;
        }
        let rules: Vec<String> = rules.iter().map(|rule| rule.name().to_string()).collect();
        let table = resolve(statement).cloned();
        tracing::debug!(
            rules = ?rules,
            table = ?table.as_ref().map(TableRef::qualified_name),
            "tenant filter required"
        );
        Decision::Inject { rules, table }
    }

    fn prepare(&self, statement_id: Option<&str>, sql: &str) -> std::result::Result<Statement, Decision> {
        if let Some(id) = statement_id {
            if self.exemptions.is_exempt(id) {
                tracing::debug!(statement_id = id, "statement exempt from tenant filtering");
                return Err(Decision::Exempt);
            }
        }
        sql_parser::parse_statement(sql).map_err(|error| {
            match &error {
                Error::UnsupportedStatement(_) => {
                    tracing::debug!(statement_id, %error, "statement outside tenant scope");
                }
                _ => tracing::warn!(statement_id, %error, "leaving unparseable SQL untouched"),
            }
            Decision::Unsupported {
                reason: error.to_string(),
            }
        })
    }
}
