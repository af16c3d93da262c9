//! Decide whether SQL statements issued by a multi-tenant application need a tenant filter.
#![warn(missing_docs)]

/// Sentinel detection and target-table resolution over parsed statements.
pub mod analysis;
/// JSON policy configuration.
pub mod config;
/// Crate error type.
pub mod error;
/// Exemptions, per-statement decisions and the rewrite hook.
pub mod intercept;
/// Audit rendering and report generation.
pub mod output;
/// SQL parsing and lowering into the analysis grammar.
pub mod parser;
/// Tenant policy rules and their evaluation.
pub mod policy;

pub use config::GuardConfig;
pub use error::{Error, Result};
pub use intercept::{Decision, SqlRewriter, TenantGuard};
