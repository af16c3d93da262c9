/// Statement ids that bypass tenant filtering.
pub mod exemption;
/// Per-statement decision pipeline and the rewrite hook.
pub mod guard;

pub use exemption::{ExemptionConfig, ExemptionRegistry};
pub use guard::{Decision, SqlRewriter, TenantGuard};
