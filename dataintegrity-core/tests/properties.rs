//! Property-based tests for scoring bounds and guardrail invariants

use std::collections::BTreeMap;

use dataintegrity_core::pii::{is_noisy, luhn_check, shannon_entropy};
use dataintegrity_core::quality::{apply_risk_weight, check_completeness, check_uniqueness};
use dataintegrity_core::{
    AlignmentStatus, Column, Dataset, IntegrityConfig, Severity, SeverityWeightedScorer,
};
use proptest::prelude::*;

const DIMENSIONS: [&str; 5] = [
    "completeness",
    "consistency",
    "timeliness",
    "uniqueness",
    "validity",
];

fn severity_strategy() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Low),
        Just(Severity::Medium),
        Just(Severity::High),
    ]
}

fn named<T: Clone>(values: &[T]) -> BTreeMap<String, T> {
    DIMENSIONS
        .iter()
        .zip(values)
        .map(|(d, v)| ((*d).to_string(), v.clone()))
        .collect()
}

fn default_scorer() -> SeverityWeightedScorer {
    SeverityWeightedScorer::new(IntegrityConfig::default().score_weights)
}

proptest! {
    /// Composite stays in [0, 100] whatever the rules report, NaN included
    #[test]
    fn prop_composite_score_is_bounded(
        scores in prop::collection::vec(any::<f64>(), 5),
        severities in prop::collection::vec(severity_strategy(), 5),
    ) {
        let result = default_scorer().compute(&named(&scores), Some(&named(&severities)));

        prop_assert!(result.composite_score >= 0.0);
        prop_assert!(result.composite_score <= 100.0);
    }

    /// A failing dimension never scores higher under a harsher severity
    #[test]
    fn prop_harsher_severity_never_raises_score(raw in 0.0f64..0.5) {
        let low = apply_risk_weight(raw, Severity::Low, false);
        let medium = apply_risk_weight(raw, Severity::Medium, false);
        let high = apply_risk_weight(raw, Severity::High, false);

        prop_assert!(high <= medium);
        prop_assert!(medium <= low);
    }

    /// Passing dimensions are never penalized
    #[test]
    fn prop_passing_scores_ignore_severity(
        raw in 0.5f64..=1.0,
        severity in severity_strategy(),
    ) {
        prop_assert_eq!(apply_risk_weight(raw, severity, true), raw);
    }

    /// Separators do not change the Luhn verdict
    #[test]
    fn prop_luhn_ignores_separators(digits in "[0-9]{13,16}") {
        let spaced: String = digits
            .chars()
            .enumerate()
            .flat_map(|(i, c)| {
                let sep = (i > 0 && i % 4 == 0).then_some(' ');
                sep.into_iter().chain(std::iter::once(c))
            })
            .collect();

        prop_assert_eq!(luhn_check(&digits), luhn_check(&spaced));
    }

    /// Entropy is bounded by log2 of the value length
    #[test]
    fn prop_entropy_is_bounded(value in ".{1,64}") {
        let entropy = shannon_entropy(&value);
        let bound = (value.chars().count() as f64).log2();

        prop_assert!(entropy >= 0.0);
        prop_assert!(entropy <= bound + 1e-9);
    }

    /// Any value of a single repeated digit longer than four digits is noise
    #[test]
    fn prop_repeated_digits_are_noise(digit in 0u32..10, len in 5usize..20) {
        let c = char::from_digit(digit, 10).unwrap();
        let value: String = std::iter::repeat_n(c, len).collect();

        prop_assert!(is_noisy(&value));
    }

    /// Alignment bands never improve as the score drops
    #[test]
    fn prop_alignment_status_is_monotonic(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(AlignmentStatus::from_score(low) >= AlignmentStatus::from_score(high));
    }

    /// Structural rule scores are fractions for any nullable column content
    #[test]
    fn prop_structural_scores_are_fractions(
        a in prop::collection::vec(prop::option::of(any::<i64>()), 0..40),
    ) {
        let b: Vec<Option<i64>> = a.iter().rev().copied().collect();
        let dataset = Dataset::new(vec![
            Column::numeric("a", a),
            Column::numeric("b", b),
        ])
        .unwrap();

        let completeness = check_completeness(&dataset);
        let uniqueness = check_uniqueness(&dataset);
        prop_assert!((0.0..=1.0).contains(&completeness));
        prop_assert!((0.0..=1.0).contains(&uniqueness));
    }
}
