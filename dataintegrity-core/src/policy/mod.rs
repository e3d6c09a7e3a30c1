//! Governance policy evaluation.
//!
//! Policies judge a merged [`AuditRecord`] and render a [`PolicyVerdict`]:
//! - **Named** profiles (`research`, `production`) with fixed thresholds on
//!   the composite score, completeness and drifted columns
//! - **Threshold** policies loaded from YAML/JSON documents, with per-dimension
//!   minimums and an optional `pii` block
//!
//! All checks run; violations accumulate in evaluation order.

mod models;
mod named;
mod threshold;

use serde::{Deserialize, Serialize};

use crate::Result;

// Re-export public API
pub use models::{AuditRecord, DriftResult, PolicyStatus, PolicyVerdict};
pub use named::NamedPolicy;
pub use threshold::{PiiPolicy, ThresholdPolicy};

/// Any policy the engine can evaluate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Policy {
    Named(NamedPolicy),
    Threshold(ThresholdPolicy),
}

impl Policy {
    /// Looks up a built-in named policy.
    ///
    /// # Errors
    /// Returns a configuration error for unknown names.
    pub fn named(name: &str) -> Result<Self> {
        NamedPolicy::from_name(name).map(Policy::Named)
    }

    /// Parses a threshold policy from YAML text.
    pub fn from_yaml_str(name: impl Into<String>, text: &str) -> Result<Self> {
        ThresholdPolicy::from_yaml_str(name, text).map(Policy::Threshold)
    }

    /// Policy name reported in verdicts.
    pub fn name(&self) -> &str {
        match self {
            Policy::Named(policy) => &policy.name,
            Policy::Threshold(policy) => &policy.name,
        }
    }

    /// Evaluates the record.
    ///
    /// # Errors
    /// Returns a contract error when a threshold policy with a `pii` block
    /// meets a record without a PII summary.
    pub fn evaluate(&self, record: &AuditRecord) -> Result<PolicyVerdict> {
        let verdict = match self {
            Policy::Named(policy) => policy.evaluate(record),
            Policy::Threshold(policy) => policy.evaluate(record)?,
        };
        tracing::debug!(
            "Policy '{}' evaluated to {} with {} violation(s)",
            verdict.policy_name,
            verdict.status,
            verdict.violations.len()
        );
        Ok(verdict)
    }
}

impl From<NamedPolicy> for Policy {
    fn from(policy: NamedPolicy) -> Self {
        Policy::Named(policy)
    }
}

impl From<ThresholdPolicy> for Policy {
    fn from(policy: ThresholdPolicy) -> Self {
        Policy::Threshold(policy)
    }
}
