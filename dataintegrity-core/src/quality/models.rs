//! Data quality result models.
//!
//! All results carry scores and ratios only, never cell values.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DataIntegrityError;

/// Score at or above which a rule is considered passed.
pub const DEFAULT_PASS_THRESHOLD: f64 = 0.5;

/// Risk tier of a rule, used to amplify failure penalties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Divisor applied to a failing score.
    ///
    /// - Low: 1.0 (unchanged)
    /// - Medium: 1.5
    /// - High: 2.0
    pub fn weight(&self) -> f64 {
        match self {
            Severity::Low => 1.0,
            Severity::Medium => 1.5,
            Severity::High => 2.0,
        }
    }

    /// Uppercase name as used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = DataIntegrityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(Severity::Low),
            "MEDIUM" => Ok(Severity::Medium),
            "HIGH" => Ok(Severity::High),
            other => Err(DataIntegrityError::configuration(format!(
                "unknown severity '{}', expected LOW, MEDIUM or HIGH",
                other
            ))),
        }
    }
}

/// Outcome of evaluating a single rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    pub rule_id: String,
    pub description: String,
    /// Raw score in [0.0, 1.0]
    pub metric_value: f64,
    pub threshold: f64,
    pub passed: bool,
    pub severity: Severity,
    /// Contribution to the composite score (0.0 for unweighted rules)
    pub weighted_contribution: f64,
}

impl RuleResult {
    /// Creates a rule result using the default pass threshold.
    pub fn new(
        rule_id: impl Into<String>,
        description: impl Into<String>,
        metric_value: f64,
        severity: Severity,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            description: description.into(),
            metric_value,
            threshold: DEFAULT_PASS_THRESHOLD,
            passed: metric_value >= DEFAULT_PASS_THRESHOLD,
            severity,
            weighted_contribution: 0.0,
        }
    }

    /// Sets the weighted contribution.
    pub fn with_contribution(mut self, contribution: f64) -> Self {
        self.weighted_contribution = contribution;
        self
    }
}

/// Non-fatal report of a rule that failed and was scored `0.0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleWarning {
    pub rule_id: String,
    pub message: String,
}

/// Scores produced by one pass of the rule evaluator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleEvaluation {
    /// Rule id to score, ordered by id
    pub scores: BTreeMap<String, f64>,
    /// Rules that failed during evaluation
    pub warnings: Vec<RuleWarning>,
}

/// Per-dimension line of the composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionBreakdown {
    pub raw_score: f64,
    pub adjusted_score: f64,
    /// `None` when severity weighting was disabled
    pub severity: Option<Severity>,
    pub weight: f64,
    pub contribution: f64,
}

/// Composite score with its per-dimension breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Composite score in [0.0, 100.0]
    pub composite_score: f64,
    pub breakdown: BTreeMap<String, DimensionBreakdown>,
    pub weights_used: BTreeMap<String, f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_weights() {
        assert_eq!(Severity::Low.weight(), 1.0);
        assert_eq!(Severity::Medium.weight(), 1.5);
        assert_eq!(Severity::High.weight(), 2.0);
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!("high".parse::<Severity>().unwrap(), Severity::High);
        assert_eq!(" Medium ".parse::<Severity>().unwrap(), Severity::Medium);
        assert!("CRITICAL".parse::<Severity>().is_err());
    }

    #[test]
    fn test_severity_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Severity::High).unwrap(), r#""HIGH""#);
    }

    #[test]
    fn test_rule_result_pass_threshold() {
        let passed = RuleResult::new("completeness", "", 0.5, Severity::High);
        assert!(passed.passed);
        assert_eq!(passed.threshold, 0.5);

        let failed = RuleResult::new("completeness", "", 0.4999, Severity::High);
        assert!(!failed.passed);
    }
}
