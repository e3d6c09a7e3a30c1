//! Severity-weighted composite scoring.
//!
//! Each weighted dimension contributes `adjusted × weight`, where a failing
//! dimension (raw score below the pass threshold) is first divided by its
//! severity weight. The composite is `100 × Σ contribution`.

use std::collections::BTreeMap;

use super::models::{DEFAULT_PASS_THRESHOLD, DimensionBreakdown, ScoreResult, Severity};

/// Aggregates dimension scores into a composite score in [0, 100].
#[derive(Debug, Clone)]
pub struct SeverityWeightedScorer {
    weights: BTreeMap<String, f64>,
    pass_threshold: f64,
}

impl SeverityWeightedScorer {
    /// Creates a scorer using already-validated weights.
    pub fn new(weights: BTreeMap<String, f64>) -> Self {
        Self {
            weights,
            pass_threshold: DEFAULT_PASS_THRESHOLD,
        }
    }

    /// Returns the weights applied by this scorer.
    pub fn weights(&self) -> &BTreeMap<String, f64> {
        &self.weights
    }

    /// Computes the composite score.
    ///
    /// Dimensions missing from `dimension_scores` contribute 0, and
    /// dimensions without a weight are ignored. When `severities` is `None`
    /// severity weighting is disabled; a weighted dimension absent from
    /// `severities` is treated as LOW.
    pub fn compute(
        &self,
        dimension_scores: &BTreeMap<String, f64>,
        severities: Option<&BTreeMap<String, Severity>>,
    ) -> ScoreResult {
        let mut weighted_sum = 0.0;
        let mut breakdown = BTreeMap::new();

        for (dimension, &weight) in &self.weights {
            let raw = dimension_scores
                .get(dimension)
                .copied()
                .filter(|s| s.is_finite())
                .unwrap_or(0.0);

            let (adjusted, severity) = match severities {
                Some(severities) => {
                    let severity = severities.get(dimension).copied().unwrap_or(Severity::Low);
                    let passed = raw >= self.pass_threshold;
                    (apply_risk_weight(raw, severity, passed), Some(severity))
                }
                None => (raw, None),
            };

            let contribution = adjusted * weight;
            weighted_sum += contribution;

            breakdown.insert(
                dimension.clone(),
                DimensionBreakdown {
                    raw_score: round_to(raw, 4),
                    adjusted_score: round_to(adjusted, 4),
                    severity,
                    weight,
                    contribution: round_to(contribution, 4),
                },
            );
        }

        ScoreResult {
            composite_score: round_to((weighted_sum * 100.0).clamp(0.0, 100.0), 2),
            breakdown,
            weights_used: self.weights.clone(),
        }
    }
}

/// Applies the severity penalty to a single dimension score.
///
/// Passing scores are only clamped to [0, 1]; failing scores are divided by
/// the severity weight first.
pub fn apply_risk_weight(raw_score: f64, severity: Severity, passed: bool) -> f64 {
    if passed {
        return raw_score.clamp(0.0, 1.0);
    }
    (raw_score / severity.weight()).clamp(0.0, 1.0)
}

/// Rounds to a fixed number of decimal places.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_weights() -> BTreeMap<String, f64> {
        [
            ("completeness", 0.30),
            ("uniqueness", 0.20),
            ("validity", 0.20),
            ("consistency", 0.20),
            ("timeliness", 0.10),
        ]
        .into_iter()
        .map(|(d, w)| (d.to_string(), w))
        .collect()
    }

    fn scores(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(d, s)| (d.to_string(), *s)).collect()
    }

    fn builtin_severities() -> BTreeMap<String, Severity> {
        [
            ("completeness", Severity::High),
            ("uniqueness", Severity::Medium),
            ("validity", Severity::Medium),
            ("consistency", Severity::High),
            ("timeliness", Severity::Low),
        ]
        .into_iter()
        .map(|(d, s)| (d.to_string(), s))
        .collect()
    }

    #[test]
    fn test_apply_risk_weight() {
        assert!((apply_risk_weight(0.3, Severity::High, false) - 0.15).abs() < 1e-9);
        assert!((apply_risk_weight(0.3, Severity::Medium, false) - 0.2).abs() < 1e-9);
        assert!((apply_risk_weight(0.3, Severity::Low, false) - 0.3).abs() < 1e-9);
        assert!((apply_risk_weight(0.9, Severity::High, true) - 0.9).abs() < 1e-9);
        assert_eq!(apply_risk_weight(1.4, Severity::High, true), 1.0);
        assert_eq!(apply_risk_weight(-0.2, Severity::Low, false), 0.0);
    }

    #[test]
    fn test_perfect_scores() {
        let scorer = SeverityWeightedScorer::new(default_weights());
        let all_ones = scores(&[
            ("completeness", 1.0),
            ("uniqueness", 1.0),
            ("validity", 1.0),
            ("consistency", 1.0),
            ("timeliness", 1.0),
        ]);

        let result = scorer.compute(&all_ones, Some(&builtin_severities()));
        assert_eq!(result.composite_score, 100.0);
    }

    #[test]
    fn test_unweighted_composite() {
        let scorer = SeverityWeightedScorer::new(default_weights());
        let input = scores(&[
            ("completeness", 0.95),
            ("uniqueness", 0.88),
            ("validity", 1.0),
            ("consistency", 0.90),
            ("timeliness", 0.70),
        ]);

        let result = scorer.compute(&input, None);

        // 0.285 + 0.176 + 0.2 + 0.18 + 0.07
        assert!((result.composite_score - 91.1).abs() < 1e-9);
        assert_eq!(result.breakdown["completeness"].severity, None);
    }

    #[test]
    fn test_failing_high_severity_penalised() {
        let scorer = SeverityWeightedScorer::new(default_weights());
        let input = scores(&[
            ("completeness", 0.4),
            ("uniqueness", 1.0),
            ("validity", 1.0),
            ("consistency", 1.0),
            ("timeliness", 1.0),
        ]);

        let result = scorer.compute(&input, Some(&builtin_severities()));
        let line = &result.breakdown["completeness"];

        assert_eq!(line.raw_score, 0.4);
        assert_eq!(line.adjusted_score, 0.2);
        assert_eq!(line.severity, Some(Severity::High));
        assert_eq!(line.contribution, 0.06);
        assert!((result.composite_score - 76.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_dimension_contributes_zero() {
        let scorer = SeverityWeightedScorer::new(default_weights());
        let input = scores(&[
            ("uniqueness", 1.0),
            ("validity", 1.0),
            ("consistency", 1.0),
            ("timeliness", 1.0),
        ]);

        let result = scorer.compute(&input, Some(&builtin_severities()));

        assert_eq!(result.breakdown["completeness"].contribution, 0.0);
        assert!((result.composite_score - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_unweighted_dimension_ignored() {
        let scorer = SeverityWeightedScorer::new(default_weights());
        let input = scores(&[("completeness", 1.0), ("custom", 0.0)]);

        let result = scorer.compute(&input, None);

        assert!(!result.breakdown.contains_key("custom"));
        assert_eq!(result.weights_used, default_weights());
    }

    #[test]
    fn test_missing_severity_defaults_to_low() {
        let scorer = SeverityWeightedScorer::new(default_weights());
        let input = scores(&[("timeliness", 0.2)]);

        let result = scorer.compute(&input, Some(&BTreeMap::new()));
        let line = &result.breakdown["timeliness"];

        assert_eq!(line.severity, Some(Severity::Low));
        assert_eq!(line.adjusted_score, 0.2);
    }

    #[test]
    fn test_non_finite_raw_scores_count_as_zero() {
        let scorer = SeverityWeightedScorer::new(default_weights());
        let input = scores(&[("completeness", f64::NAN), ("uniqueness", f64::INFINITY)]);

        let result = scorer.compute(&input, Some(&builtin_severities()));

        assert_eq!(result.composite_score, 0.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.123456, 4), 0.1235);
        assert_eq!(round_to(0.125, 2), 0.13);
        assert_eq!(round_to(1.0, 2), 1.0);
    }
}
