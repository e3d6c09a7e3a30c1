//! Threshold policies loaded from policy documents.
//!
//! Expected document structure:
//!
//! ```yaml
//! version: 1
//! policy:
//!   completeness: 0.95
//!   uniqueness: 0.9
//!   pii:
//!     block_high_risk: true
//!     max_medium_risk_ratio: 0.5
//!     allow_low_risk: true
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::pii::RiskLevel;
use crate::{DataIntegrityError, Result};

use super::models::{AuditRecord, PolicyVerdict};

/// Rules of the reserved `pii` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PiiPolicy {
    /// Any high-risk column fails the policy
    #[serde(default)]
    pub block_high_risk: bool,
    /// Maximum match ratio tolerated for a medium-risk finding
    #[serde(default)]
    pub max_medium_risk_ratio: Option<f64>,
    /// When false, any low-risk column fails the policy
    #[serde(default = "default_allow_low_risk")]
    pub allow_low_risk: bool,
}

fn default_allow_low_risk() -> bool {
    true
}

impl Default for PiiPolicy {
    fn default() -> Self {
        Self {
            block_high_risk: false,
            max_medium_risk_ratio: None,
            allow_low_risk: default_allow_low_risk(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PolicyDocument {
    version: i64,
    policy: PolicyBody,
}

#[derive(Debug, Deserialize)]
struct PolicyBody {
    #[serde(default)]
    pii: Option<PiiPolicy>,
    #[serde(flatten)]
    thresholds: BTreeMap<String, f64>,
}

/// Per-dimension minimum scores plus an optional PII block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPolicy {
    /// Policy label used in verdicts
    pub name: String,
    /// Document format version
    pub version: i64,
    /// Dimension to minimum score, evaluated in name order
    pub thresholds: BTreeMap<String, f64>,
    /// Optional PII governance block
    pub pii: Option<PiiPolicy>,
}

impl ThresholdPolicy {
    /// Creates a policy from thresholds.
    ///
    /// # Errors
    /// Returns a configuration error if a threshold or ratio lies outside [0, 1].
    pub fn new(
        name: impl Into<String>,
        thresholds: BTreeMap<String, f64>,
        pii: Option<PiiPolicy>,
    ) -> Result<Self> {
        let policy = Self {
            name: name.into(),
            version: 1,
            thresholds,
            pii,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Parses a YAML policy document.
    ///
    /// # Errors
    /// Returns a policy format error for unparsable or structurally invalid
    /// documents, and a configuration error for out-of-range values.
    pub fn from_yaml_str(name: impl Into<String>, text: &str) -> Result<Self> {
        let name = name.into();
        let document: PolicyDocument = serde_yaml::from_str(text).map_err(|e| {
            DataIntegrityError::policy_format(format!("policy '{}' is not a valid document", name), e)
        })?;
        Self::from_document(name, document)
    }

    /// Parses a policy document already decoded as JSON.
    pub fn from_json_value(name: impl Into<String>, value: serde_json::Value) -> Result<Self> {
        let name = name.into();
        let document: PolicyDocument = serde_json::from_value(value).map_err(|e| {
            DataIntegrityError::policy_format(format!("policy '{}' is not a valid document", name), e)
        })?;
        Self::from_document(name, document)
    }

    fn from_document(name: String, document: PolicyDocument) -> Result<Self> {
        let policy = Self {
            name,
            version: document.version,
            thresholds: document.policy.thresholds,
            pii: document.policy.pii,
        };
        policy.validate()?;
        tracing::debug!(
            "Loaded policy '{}' (version {}) with {} threshold(s)",
            policy.name,
            policy.version,
            policy.thresholds.len()
        );
        Ok(policy)
    }

    fn validate(&self) -> Result<()> {
        for (dimension, min) in &self.thresholds {
            if !(0.0..=1.0).contains(min) {
                return Err(DataIntegrityError::configuration(format!(
                    "policy '{}': threshold for '{}' must be between 0.0 and 1.0, got {}",
                    self.name, dimension, min
                )));
            }
        }
        if let Some(ratio) = self.pii.as_ref().and_then(|p| p.max_medium_risk_ratio)
            && !(0.0..=1.0).contains(&ratio)
        {
            return Err(DataIntegrityError::configuration(format!(
                "policy '{}': max_medium_risk_ratio must be between 0.0 and 1.0, got {}",
                self.name, ratio
            )));
        }
        Ok(())
    }

    /// Evaluates the record; every check runs and violations accumulate.
    ///
    /// # Errors
    /// Returns a contract error when the policy has a `pii` block but the
    /// record carries no PII summary.
    pub fn evaluate(&self, record: &AuditRecord) -> Result<PolicyVerdict> {
        let mut violations = Vec::new();

        for (dimension, &min) in &self.thresholds {
            match record.dimension_scores.get(dimension) {
                None => violations.push(format!(
                    "Dimension '{}' defined in policy was not evaluated in audit.",
                    dimension
                )),
                Some(&actual) if actual < min => violations.push(format!(
                    "Dimension '{}' failed: score {:.4} < threshold {}",
                    dimension, actual, min
                )),
                Some(_) => {}
            }
        }

        let mut pii_violation = false;
        if let Some(pii) = &self.pii {
            let pii_violations = evaluate_pii(&self.name, pii, record)?;
            pii_violation = !pii_violations.is_empty();
            violations.extend(pii_violations);
        }

        Ok(PolicyVerdict::new(self.name.clone(), violations, pii_violation))
    }
}

fn evaluate_pii(policy_name: &str, pii: &PiiPolicy, record: &AuditRecord) -> Result<Vec<String>> {
    let summary = record.pii_summary.as_ref().ok_or_else(|| {
        DataIntegrityError::contract(format!(
            "policy '{}' has a pii block but the audit record carries no pii_summary",
            policy_name
        ))
    })?;

    let mut violations = Vec::new();

    if pii.block_high_risk && summary.high_risk_columns > 0 {
        violations.push(format!(
            "PII Policy Violation: High-risk PII columns detected ({} column(s))",
            summary.high_risk_columns
        ));
    }

    if let Some(max_ratio) = pii.max_medium_risk_ratio {
        for finding in &record.pii_findings {
            if finding.highest_risk == RiskLevel::Medium && finding.match_ratio > max_ratio {
                violations.push(format!(
                    "PII Policy Violation: Column '{}' medium-risk ratio ({:.4}) exceeds limit ({})",
                    finding.column, finding.match_ratio, max_ratio
                ));
            }
        }
    }

    if !pii.allow_low_risk && summary.low_risk_columns > 0 {
        violations.push(format!(
            "PII Policy Violation: Low-risk PII columns detected ({} column(s)) but low-risk PII is not allowed",
            summary.low_risk_columns
        ));
    }

    Ok(violations)
}
