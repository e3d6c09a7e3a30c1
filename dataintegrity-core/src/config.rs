//! Audit configuration.
//!
//! This module provides the configuration consumed by the rule evaluator,
//! the scorer and the PII detector: dimension weights, the timeliness
//! window, legacy PII patterns and sampling limits.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance used when checking that weights sum to 1.0.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Default number of rows scanned for PII before deterministic sampling kicks in.
pub const DEFAULT_PII_SAMPLE_THRESHOLD: usize = 100_000;

/// Largest accepted timeliness window, in days (100 years).
pub const MAX_TIMELINESS_MAX_AGE_DAYS: i64 = 36_500;

/// Validation errors for audit configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigValidationError {
    #[error("score_weights must sum to 1.0, got {0:.4}")]
    WeightSum(f64),
    #[error("weight for dimension '{dimension}' must be a finite, non-negative number, got {weight}")]
    InvalidWeight { dimension: String, weight: f64 },
    #[error("drift_p_threshold must be between 0 and 1 (exclusive), got {0}")]
    InvalidDriftThreshold(f64),
    #[error(
        "timeliness_max_age_days must be between 1 and {max}, got {0}",
        max = MAX_TIMELINESS_MAX_AGE_DAYS
    )]
    InvalidTimelinessWindow(i64),
    #[error("pii_sample_threshold must be positive")]
    InvalidSampleThreshold,
    #[error("PII pattern '{name}' does not compile: {message}")]
    InvalidPattern { name: String, message: String },
}

/// Configuration for a single audit run.
///
/// Every field has a default, so partial documents deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrityConfig {
    /// Weighted contribution of each quality dimension (must sum to 1.0)
    pub score_weights: BTreeMap<String, f64>,
    /// p-value below which the external drift comparator flags a column
    pub drift_p_threshold: f64,
    /// Maximum acceptable age of timestamp values, in days
    pub timeliness_max_age_days: i64,
    /// Legacy PII patterns, name to regex, in declaration order.
    /// Legacy matches share one priority; the earlier pattern wins a tie.
    #[serde(with = "ordered_patterns")]
    pub pii_patterns: Vec<(String, String)>,
    /// Rows scanned for PII before switching to first-N sampling
    pub pii_sample_threshold: usize,
    /// Related column groups for the consistency rule (all columns when unset)
    pub column_groups: Option<Vec<Vec<String>>>,
    /// Columns inspected by the timeliness rule (all timestamp columns when empty)
    pub timestamp_columns: Vec<String>,
    /// Attach ISO/IEC 25012 alignment to audit reports
    pub standards_alignment: bool,
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            score_weights: weights(&[
                ("completeness", 0.30),
                ("uniqueness", 0.20),
                ("validity", 0.20),
                ("consistency", 0.20),
                ("timeliness", 0.10),
            ]),
            drift_p_threshold: 0.05,
            timeliness_max_age_days: 30,
            pii_patterns: default_pii_patterns(),
            pii_sample_threshold: DEFAULT_PII_SAMPLE_THRESHOLD,
            column_groups: None,
            timestamp_columns: Vec::new(),
            standards_alignment: false,
        }
    }
}

fn weights(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs
        .iter()
        .map(|(dimension, weight)| ((*dimension).to_string(), *weight))
        .collect()
}

fn default_pii_patterns() -> Vec<(String, String)> {
    [
        ("email", r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+"),
        ("phone", r"\b(\+?\d[\d\s\-().]{7,}\d)\b"),
        ("ssn", r"\b\d{3}[-\s]?\d{2}[-\s]?\d{4}\b"),
        ("credit_card", r"\b(?:\d[ -]?){13,16}\b"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name.to_string(), pattern.to_string()))
    .collect()
}

impl IntegrityConfig {
    /// Creates a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config using the ISO/IEC 25012 weight profile with
    /// standards alignment enabled.
    pub fn iso_25012() -> Self {
        Self {
            score_weights: weights(&crate::standards::ISO_25012_DEFAULT_WEIGHTS),
            standards_alignment: true,
            ..Self::default()
        }
    }

    /// Builder method to replace the dimension weights.
    pub fn with_score_weights(mut self, score_weights: BTreeMap<String, f64>) -> Self {
        self.score_weights = score_weights;
        self
    }

    /// Builder method to set the timeliness window.
    pub fn with_timeliness_max_age_days(mut self, days: i64) -> Self {
        self.timeliness_max_age_days = days;
        self
    }

    /// Builder method to set the drift p-value threshold.
    pub fn with_drift_p_threshold(mut self, threshold: f64) -> Self {
        if !(threshold > 0.0 && threshold < 1.0) {
            tracing::warn!(
                "drift_p_threshold {} clamped to valid range (0.0, 1.0)",
                threshold
            );
        }
        self.drift_p_threshold = threshold.clamp(f64::EPSILON, 1.0 - f64::EPSILON);
        self
    }

    /// Adds a legacy PII pattern, or replaces an existing one in place.
    pub fn with_pii_pattern(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        upsert_pattern(&mut self.pii_patterns, name.into(), pattern.into());
        self
    }

    /// Looks up a legacy PII pattern by name.
    pub fn pii_pattern(&self, name: &str) -> Option<&str> {
        self.pii_patterns
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, pattern)| pattern.as_str())
    }

    /// Builder method to set the PII sampling threshold.
    pub fn with_pii_sample_threshold(mut self, rows: usize) -> Self {
        self.pii_sample_threshold = rows;
        self
    }

    /// Builder method to set the consistency column groups.
    pub fn with_column_groups(mut self, groups: Vec<Vec<String>>) -> Self {
        self.column_groups = Some(groups);
        self
    }

    /// Builder method to set the timeliness columns.
    pub fn with_timestamp_columns(mut self, columns: Vec<String>) -> Self {
        self.timestamp_columns = columns;
        self
    }

    /// Builder method to enable/disable ISO/IEC 25012 alignment.
    pub fn with_standards_alignment(mut self, enabled: bool) -> Self {
        self.standards_alignment = enabled;
        self
    }

    /// Validates the configuration.
    ///
    /// Returns the first problem found; callers treat any error as fatal.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        for (dimension, weight) in &self.score_weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(ConfigValidationError::InvalidWeight {
                    dimension: dimension.clone(),
                    weight: *weight,
                });
            }
        }
        let total: f64 = self.score_weights.values().sum();
        if (total - 1.0).abs() >= WEIGHT_SUM_TOLERANCE {
            return Err(ConfigValidationError::WeightSum(total));
        }
        if !(self.drift_p_threshold > 0.0 && self.drift_p_threshold < 1.0) {
            return Err(ConfigValidationError::InvalidDriftThreshold(
                self.drift_p_threshold,
            ));
        }
        if !(1..=MAX_TIMELINESS_MAX_AGE_DAYS).contains(&self.timeliness_max_age_days) {
            return Err(ConfigValidationError::InvalidTimelinessWindow(
                self.timeliness_max_age_days,
            ));
        }
        if self.pii_sample_threshold == 0 {
            return Err(ConfigValidationError::InvalidSampleThreshold);
        }
        for (name, pattern) in &self.pii_patterns {
            if let Err(e) = regex::Regex::new(pattern) {
                return Err(ConfigValidationError::InvalidPattern {
                    name: name.clone(),
                    message: e.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn upsert_pattern(patterns: &mut Vec<(String, String)>, name: String, pattern: String) {
    match patterns.iter_mut().find(|(existing, _)| *existing == name) {
        Some(entry) => entry.1 = pattern,
        None => patterns.push((name, pattern)),
    }
}

/// Legacy patterns as a `name: regex` map that keeps document order.
mod ordered_patterns {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::{Deserializer, Serializer};

    pub(super) fn serialize<S>(patterns: &[(String, String)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(patterns.iter().map(|(name, pattern)| (name, pattern)))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(PatternsVisitor)
    }

    struct PatternsVisitor;

    impl<'de> Visitor<'de> for PatternsVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of PII pattern names to regexes")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut patterns = Vec::new();
            while let Some((name, pattern)) = map.next_entry::<String, String>()? {
                super::upsert_pattern(&mut patterns, name, pattern);
            }
            Ok(patterns)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = IntegrityConfig::default();
        assert_eq!(config.score_weights.len(), 5);
        assert_eq!(config.score_weights["completeness"], 0.30);
        assert_eq!(config.timeliness_max_age_days, 30);
        assert_eq!(config.pii_sample_threshold, DEFAULT_PII_SAMPLE_THRESHOLD);
        assert!(config.pii_pattern("email").is_some());
        assert!(!config.standards_alignment);
    }

    #[test]
    fn test_config_validate_success() {
        assert!(IntegrityConfig::default().validate().is_ok());
        assert!(IntegrityConfig::iso_25012().validate().is_ok());
    }

    #[test]
    fn test_config_validate_weight_sum() {
        let config = IntegrityConfig::new().with_score_weights(weights(&[
            ("completeness", 0.5),
            ("uniqueness", 0.4),
        ]));
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::WeightSum(_))
        ));
    }

    #[test]
    fn test_config_validate_negative_weight() {
        let config = IntegrityConfig::new().with_score_weights(weights(&[
            ("completeness", 1.5),
            ("uniqueness", -0.5),
        ]));
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidWeight { ref dimension, .. }) if dimension == "uniqueness"
        ));
    }

    #[test]
    fn test_config_validate_timeliness_window() {
        let config = IntegrityConfig::new().with_timeliness_max_age_days(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidTimelinessWindow(0))
        ));
    }

    #[test]
    fn test_config_validate_timeliness_upper_bound() {
        let config = IntegrityConfig::new().with_timeliness_max_age_days(200_000_000);
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidTimelinessWindow(200_000_000))
        ));

        let limit = IntegrityConfig::new().with_timeliness_max_age_days(MAX_TIMELINESS_MAX_AGE_DAYS);
        assert!(limit.validate().is_ok());
    }

    #[test]
    fn test_pii_patterns_keep_declaration_order() {
        let config = IntegrityConfig::default();
        let names: Vec<&str> = config
            .pii_patterns
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(names, vec!["email", "phone", "ssn", "credit_card"]);

        let config: IntegrityConfig =
            serde_json::from_str(r#"{"pii_patterns": {"ssn": "a", "email": "b", "ssn": "c"}}"#)
                .unwrap();
        assert_eq!(
            config.pii_patterns,
            vec![
                ("ssn".to_string(), "c".to_string()),
                ("email".to_string(), "b".to_string())
            ]
        );
    }

    #[test]
    fn test_with_pii_pattern_replaces_in_place() {
        let config = IntegrityConfig::new()
            .with_pii_pattern("phone", r"\d{10}")
            .with_pii_pattern("employee_code", r"EMP-\d{4}");

        assert_eq!(config.pii_patterns[1].0, "phone");
        assert_eq!(config.pii_pattern("phone"), Some(r"\d{10}"));
        assert_eq!(config.pii_patterns.last().unwrap().0, "employee_code");
    }

    #[test]
    fn test_config_validate_drift_threshold() {
        let config = IntegrityConfig {
            drift_p_threshold: 1.5, // Bypass clamping
            ..IntegrityConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidDriftThreshold(_))
        ));
    }

    #[test]
    fn test_config_drift_threshold_clamping() {
        let config = IntegrityConfig::new().with_drift_p_threshold(2.0);
        assert!(config.drift_p_threshold < 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate_bad_pattern() {
        let config = IntegrityConfig::new().with_pii_pattern("broken", r"(unclosed");
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidPattern { ref name, .. }) if name == "broken"
        ));
    }

    #[test]
    fn test_config_validate_sample_threshold() {
        let config = IntegrityConfig::new().with_pii_sample_threshold(0);
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvalidSampleThreshold)
        );
    }

    #[test]
    fn test_config_partial_document() {
        let config: IntegrityConfig =
            serde_json::from_str(r#"{"timeliness_max_age_days": 7}"#).unwrap();
        assert_eq!(config.timeliness_max_age_days, 7);
        assert_eq!(config.score_weights, IntegrityConfig::default().score_weights);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = IntegrityConfig::new()
            .with_column_groups(vec![vec!["a".to_string(), "b".to_string()]])
            .with_standards_alignment(true);

        let json = serde_json::to_string(&config).unwrap();
        let deserialized: IntegrityConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
