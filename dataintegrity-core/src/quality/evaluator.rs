//! Rule evaluator.
//!
//! Runs every rule of a [`RuleSet`] against a dataset. A failing rule never
//! aborts the pass: it is scored `0.0` and reported as a warning.

use chrono::{DateTime, Utc};

use crate::config::IntegrityConfig;
use crate::dataset::Dataset;
use crate::error::RuleError;

use super::models::{RuleEvaluation, RuleWarning};
use super::rules::{EvaluationContext, Rule, RuleSet};

/// Evaluates a rule set under a fixed configuration.
#[derive(Debug, Clone)]
pub struct RuleEvaluator {
    config: IntegrityConfig,
    rules: RuleSet,
}

impl RuleEvaluator {
    /// Creates an evaluator running the built-in rules.
    pub fn new(config: IntegrityConfig) -> Self {
        Self::with_rules(config, RuleSet::builtin())
    }

    /// Creates an evaluator running the given rules.
    pub fn with_rules(config: IntegrityConfig, rules: RuleSet) -> Self {
        Self { config, rules }
    }

    /// Returns the rules this evaluator runs.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Returns the evaluator configuration.
    pub fn config(&self) -> &IntegrityConfig {
        &self.config
    }

    /// Evaluates all rules using the wall clock as "now".
    pub fn evaluate(&self, dataset: &Dataset) -> RuleEvaluation {
        self.evaluate_at(dataset, Utc::now())
    }

    /// Evaluates all rules relative to the given instant.
    ///
    /// Identical dataset, configuration and instant always yield identical
    /// scores.
    pub fn evaluate_at(&self, dataset: &Dataset, now: DateTime<Utc>) -> RuleEvaluation {
        let ctx = EvaluationContext {
            config: &self.config,
            now,
        };
        let mut evaluation = RuleEvaluation::default();

        for rule in self.rules.iter() {
            let score = match run_rule(rule, dataset, &ctx) {
                Ok(score) => score,
                Err(e) => {
                    tracing::warn!("Rule '{}' failed and was scored 0.0: {}", rule.id, e);
                    evaluation.warnings.push(RuleWarning {
                        rule_id: rule.id.clone(),
                        message: e.to_string(),
                    });
                    0.0
                }
            };
            tracing::debug!("Rule '{}' scored {:.4}", rule.id, score);
            evaluation.scores.insert(rule.id.clone(), score);
        }

        evaluation
    }
}

/// Runs one rule, rejecting non-finite scores and clamping to [0, 1].
fn run_rule(
    rule: &Rule,
    dataset: &Dataset,
    ctx: &EvaluationContext<'_>,
) -> Result<f64, RuleError> {
    let score = rule.kind.score(dataset, ctx)?;
    if !score.is_finite() {
        return Err(RuleError::NonFiniteScore(score));
    }
    Ok(score.clamp(0.0, 1.0))
}
