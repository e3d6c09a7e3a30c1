//! Data quality scoring module.
//!
//! This module scores the structural quality of a dataset:
//! - **Completeness**: fraction of non-null cells
//! - **Uniqueness**: fraction of distinct rows
//! - **Validity**: fraction of columns matching their declared type
//! - **Consistency**: absence of partial nulls inside related column groups
//! - **Timeliness**: recency of timestamp values
//!
//! Rule scores are aggregated by a [`SeverityWeightedScorer`] into a
//! composite score in [0, 100], where failing high-severity rules weigh
//! heavier.
//!
//! # Example
//! ```rust,ignore
//! use dataintegrity_core::quality::{RuleEvaluator, SeverityWeightedScorer};
//!
//! let evaluator = RuleEvaluator::new(config.clone());
//! let evaluation = evaluator.evaluate(&dataset);
//! let scorer = SeverityWeightedScorer::new(config.score_weights.clone());
//! let result = scorer.compute(&evaluation.scores, Some(&evaluator.rules().severities()));
//! println!("DataScore: {:.2}", result.composite_score);
//! ```

mod completeness;
mod consistency;
mod evaluator;
mod models;
mod rules;
mod scorer;
mod timeliness;
mod uniqueness;
mod validity;

// Re-export public API
pub use completeness::check_completeness;
pub use consistency::check_consistency;
pub use evaluator::RuleEvaluator;
pub use models::{
    DEFAULT_PASS_THRESHOLD, DimensionBreakdown, RuleEvaluation, RuleResult, RuleWarning,
    ScoreResult, Severity,
};
pub use rules::{EvaluationContext, Rule, RuleFn, RuleKind, RuleSet};
pub use scorer::{SeverityWeightedScorer, apply_risk_weight};
pub use timeliness::check_timeliness;
pub use uniqueness::check_uniqueness;
pub use validity::check_validity;

pub(crate) use scorer::round_to;
