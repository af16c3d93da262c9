use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::analysis::sentinel::{Sentinel, DEFAULT_SENTINEL};
use crate::error::{Error, Result};
use crate::intercept::exemption::{ExemptionConfig, ExemptionRegistry};
use crate::intercept::guard::TenantGuard;
use crate::policy::rule::RuleConfig;
use crate::policy::rule_set::PolicySet;

/// Policy configuration file: sentinel, rules and exemptions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Discriminator column; [`DEFAULT_SENTINEL`] when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentinel: Option<String>,
    /// Rules in evaluation order.
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
    /// Statements that bypass tenant filtering.
    #[serde(default)]
    pub exempt: ExemptionConfig,
}

impl GuardConfig {
    /// Parse a configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a configuration file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_json(&content)
    }

    /// Effective sentinel column name.
    pub fn sentinel_name(&self) -> &str {
        self.sentinel
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_SENTINEL)
    }

    /// Validate the rules and assemble a guard.
    pub fn build(self) -> Result<TenantGuard> {
        let sentinel = Sentinel::new(self.sentinel_name());
        let policies = PolicySet::from_configs(self.rules)?;
        let exemptions = ExemptionRegistry::from(self.exempt);
        tracing::debug!(
            sentinel = %sentinel,
            rules = policies.len(),
            "tenant guard configured"
        );
        Ok(TenantGuard::new(sentinel, policies, exemptions))
    }
}
