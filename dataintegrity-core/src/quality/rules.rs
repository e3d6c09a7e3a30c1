//! Rule definitions and the rule set.
//!
//! Rules are plain data: an id, a description, a severity and a
//! [`RuleKind`] naming the scoring function. Custom rules carry a function
//! pointer, so a [`RuleSet`] stays `Clone + Send + Sync` without boxing.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::config::IntegrityConfig;
use crate::dataset::Dataset;
use crate::error::RuleError;
use crate::{DataIntegrityError, Result};

use super::completeness::check_completeness;
use super::consistency::check_consistency;
use super::models::Severity;
use super::timeliness::check_timeliness;
use super::uniqueness::check_uniqueness;
use super::validity::check_validity;

/// Inputs shared by every rule during one evaluation pass.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub config: &'a IntegrityConfig,
    /// Reference instant for time-dependent rules
    pub now: DateTime<Utc>,
}

/// Signature of a custom rule.
pub type RuleFn = fn(&Dataset, &EvaluationContext<'_>) -> std::result::Result<f64, RuleError>;

/// Scoring function behind a rule.
#[derive(Debug, Clone, Copy)]
pub enum RuleKind {
    Completeness,
    Uniqueness,
    Validity,
    Consistency,
    Timeliness,
    Custom(RuleFn),
}

impl RuleKind {
    /// Runs the scoring function.
    pub fn score(
        &self,
        dataset: &Dataset,
        ctx: &EvaluationContext<'_>,
    ) -> std::result::Result<f64, RuleError> {
        match self {
            RuleKind::Completeness => Ok(check_completeness(dataset)),
            RuleKind::Uniqueness => Ok(check_uniqueness(dataset)),
            RuleKind::Validity => Ok(check_validity(dataset)),
            RuleKind::Consistency => Ok(check_consistency(
                dataset,
                ctx.config.column_groups.as_deref(),
            )),
            RuleKind::Timeliness => check_timeliness(
                dataset,
                &ctx.config.timestamp_columns,
                ctx.config.timeliness_max_age_days,
                ctx.now,
            ),
            RuleKind::Custom(rule_fn) => rule_fn(dataset, ctx),
        }
    }
}

/// A registered data-quality rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: String,
    pub description: String,
    pub severity: Severity,
    pub kind: RuleKind,
}

impl Rule {
    /// Creates a rule.
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
        kind: RuleKind,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            severity,
            kind,
        }
    }

    /// Creates a rule backed by a custom scoring function.
    pub fn custom(
        id: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
        rule_fn: RuleFn,
    ) -> Self {
        Self::new(id, description, severity, RuleKind::Custom(rule_fn))
    }
}

/// Rules keyed by unique id, iterated in id order.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: BTreeMap<String, Rule>,
}

impl RuleSet {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a rule set holding the five built-in dimensions.
    pub fn builtin() -> Self {
        let rules = [
            Rule::new(
                "completeness",
                "Fraction of non-null values across all cells in the dataset.",
                Severity::High,
                RuleKind::Completeness,
            ),
            Rule::new(
                "uniqueness",
                "Fraction of unique rows (absence of exact duplicates).",
                Severity::Medium,
                RuleKind::Uniqueness,
            ),
            Rule::new(
                "validity",
                "Fraction of columns whose values all conform to the declared type.",
                Severity::Medium,
                RuleKind::Validity,
            ),
            Rule::new(
                "consistency",
                "Absence of cross-column null mismatches within related column groups.",
                Severity::High,
                RuleKind::Consistency,
            ),
            Rule::new(
                "timeliness",
                "Fraction of datetime values falling within the configured maximum age window.",
                Severity::Low,
                RuleKind::Timeliness,
            ),
        ];

        Self {
            rules: rules.into_iter().map(|r| (r.id.clone(), r)).collect(),
        }
    }

    /// Registers a rule.
    ///
    /// # Errors
    /// Returns a configuration error when a rule with the same id exists.
    pub fn register(&mut self, rule: Rule) -> Result<()> {
        if self.rules.contains_key(&rule.id) {
            return Err(DataIntegrityError::configuration(format!(
                "rule '{}' is already registered",
                rule.id
            )));
        }
        self.rules.insert(rule.id.clone(), rule);
        Ok(())
    }

    /// Builder variant of [`RuleSet::register`].
    pub fn with_rule(mut self, rule: Rule) -> Result<Self> {
        self.register(rule)?;
        Ok(self)
    }

    /// Looks up a rule by id.
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.get(id)
    }

    /// Iterates rules in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rule is registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule id to severity, as consumed by the scorer.
    pub fn severities(&self) -> BTreeMap<String, Severity> {
        self.rules
            .iter()
            .map(|(id, rule)| (id.clone(), rule.severity))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant_rule(_: &Dataset, _: &EvaluationContext<'_>) -> std::result::Result<f64, RuleError> {
        Ok(0.42)
    }

    #[test]
    fn test_builtin_rules() {
        let rules = RuleSet::builtin();
        let ids: Vec<&str> = rules.iter().map(|r| r.id.as_str()).collect();

        assert_eq!(
            ids,
            vec!["completeness", "consistency", "timeliness", "uniqueness", "validity"]
        );
        assert_eq!(rules.get("completeness").unwrap().severity, Severity::High);
        assert_eq!(rules.get("uniqueness").unwrap().severity, Severity::Medium);
        assert_eq!(rules.get("validity").unwrap().severity, Severity::Medium);
        assert_eq!(rules.get("consistency").unwrap().severity, Severity::High);
        assert_eq!(rules.get("timeliness").unwrap().severity, Severity::Low);
    }

    #[test]
    fn test_register_custom_rule() {
        let mut rules = RuleSet::builtin();
        rules
            .register(Rule::custom("constant", "Always 0.42", Severity::Low, constant_rule))
            .unwrap();

        assert_eq!(rules.len(), 6);
        let config = IntegrityConfig::default();
        let ctx = EvaluationContext {
            config: &config,
            now: Utc::now(),
        };
        let score = rules
            .get("constant")
            .unwrap()
            .kind
            .score(&Dataset::empty(), &ctx)
            .unwrap();
        assert_eq!(score, 0.42);
    }

    #[test]
    fn test_register_duplicate_id_fails() {
        let result = RuleSet::builtin().with_rule(Rule::custom(
            "completeness",
            "Shadowing rule",
            Severity::Low,
            constant_rule,
        ));
        assert!(matches!(
            result,
            Err(DataIntegrityError::Configuration { .. })
        ));
    }

    #[test]
    fn test_severities_map() {
        let severities = RuleSet::builtin().severities();
        assert_eq!(severities.len(), 5);
        assert_eq!(severities["timeliness"], Severity::Low);
    }
}
