//! Policy input and output models.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pii::{DatasetPiiSummary, PiiFinding};
use crate::standards::StandardsAlignment;
use crate::{DataIntegrityError, Result};

/// Per-column result of the external drift comparator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftResult {
    pub column: String,
    pub drift_detected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p_value: Option<f64>,
}

impl DriftResult {
    /// Builds a result without a p-value.
    pub fn new(column: impl Into<String>, drift_detected: bool) -> Self {
        Self {
            column: column.into(),
            drift_detected,
            p_value: None,
        }
    }

    /// Builds a result from a p-value and the configured threshold.
    pub fn from_p_value(column: impl Into<String>, p_value: f64, threshold: f64) -> Self {
        Self {
            column: column.into(),
            drift_detected: p_value < threshold,
            p_value: Some(p_value),
        }
    }
}

/// Merged audit output consumed by policies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    #[serde(alias = "overall_score")]
    pub composite_score: f64,
    pub dimension_scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub pii_summary: Option<DatasetPiiSummary>,
    #[serde(default)]
    pub pii_findings: Vec<PiiFinding>,
    #[serde(default)]
    pub drift_results: Vec<DriftResult>,
    #[serde(default)]
    pub standards_alignment: Option<StandardsAlignment>,
}

impl AuditRecord {
    /// Creates a record holding only quality scores.
    pub fn new(composite_score: f64, dimension_scores: BTreeMap<String, f64>) -> Self {
        Self {
            composite_score,
            dimension_scores,
            pii_summary: None,
            pii_findings: Vec::new(),
            drift_results: Vec::new(),
            standards_alignment: None,
        }
    }

    /// Parses a record handed over by a collaborator.
    ///
    /// # Errors
    /// Returns a contract error when required keys (`composite_score`,
    /// `dimension_scores`) are missing or malformed.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| {
            DataIntegrityError::contract(format!("audit record is malformed: {}", e))
        })
    }

    /// Number of columns flagged by the drift comparator.
    pub fn drifted_column_count(&self) -> usize {
        self.drift_results.iter().filter(|r| r.drift_detected).count()
    }
}

/// Pass/fail outcome of a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PolicyStatus {
    Pass,
    Fail,
}

impl fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyStatus::Pass => f.write_str("PASS"),
            PolicyStatus::Fail => f.write_str("FAIL"),
        }
    }
}

/// Governance decision with its reasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyVerdict {
    pub policy_name: String,
    pub status: PolicyStatus,
    /// Violations in evaluation order
    pub violations: Vec<String>,
    /// True when a violation came from the PII block
    pub pii_violation: bool,
}

impl PolicyVerdict {
    /// Builds a verdict; the status is PASS iff there are no violations.
    pub fn new(policy_name: impl Into<String>, violations: Vec<String>, pii_violation: bool) -> Self {
        let status = if violations.is_empty() {
            PolicyStatus::Pass
        } else {
            PolicyStatus::Fail
        };
        Self {
            policy_name: policy_name.into(),
            status,
            violations,
            pii_violation,
        }
    }

    /// Returns true when the status is PASS.
    pub fn passed(&self) -> bool {
        self.status == PolicyStatus::Pass
    }
}
