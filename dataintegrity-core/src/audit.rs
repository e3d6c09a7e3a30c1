//! Audit facade.
//!
//! The [`Auditor`] wires the rule evaluator, the severity-weighted scorer
//! and the PII detector. The quality half and the PII half of an audit are
//! independent; [`Auditor::audit_async`] runs them on Tokio's blocking pool
//! and joins the results.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::IntegrityConfig;
use crate::dataset::Dataset;
use crate::pii::{ColumnPiiReport, DatasetPiiSummary, PiiDetector, PiiFinding, PiiScanReport};
use crate::policy::{AuditRecord, DriftResult, Policy, PolicyVerdict};
use crate::quality::{
    DimensionBreakdown, RuleEvaluation, RuleEvaluator, RuleResult, RuleSet, RuleWarning,
    ScoreResult, SeverityWeightedScorer,
};
use crate::standards::{StandardsAlignment, evaluate_iso_25012_alignment};
use crate::{DataIntegrityError, Result};

/// Complete result of auditing one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    /// Dataset fingerprint supplied by the connector
    pub fingerprint: Option<String>,
    /// Dataset source label supplied by the connector
    pub source: Option<String>,
    /// Rows in the audited dataset
    pub row_count: usize,
    /// Columns in the audited dataset
    pub column_count: usize,
    /// Composite score in [0, 100]
    pub composite_score: f64,
    /// Per-dimension scoring detail
    pub breakdown: BTreeMap<String, DimensionBreakdown>,
    /// Dimension weights applied by the scorer
    pub weights_used: BTreeMap<String, f64>,
    /// Raw rule scores in [0, 1], keyed by rule id
    pub dimension_scores: BTreeMap<String, f64>,
    /// Rule results in rule-id order
    pub rule_results: Vec<RuleResult>,
    /// Rules that failed and were scored 0.0
    pub rule_warnings: Vec<RuleWarning>,
    /// Dataset-level PII roll-up
    pub pii_summary: DatasetPiiSummary,
    /// Columns with detected PII
    pub pii_columns: BTreeMap<String, ColumnPiiReport>,
    /// Findings ordered by column then entity type
    pub pii_findings: Vec<PiiFinding>,
    /// ISO/IEC 25012 alignment, when enabled in the configuration
    pub standards_alignment: Option<StandardsAlignment>,
    /// Drift results attached after the audit
    pub drift_results: Vec<DriftResult>,
    /// Verdict of the last policy evaluated against this report
    pub policy_verdict: Option<PolicyVerdict>,
}

impl AuditReport {
    /// Projects the report onto the record consumed by policies.
    pub fn record(&self) -> AuditRecord {
        AuditRecord {
            composite_score: self.composite_score,
            dimension_scores: self.dimension_scores.clone(),
            pii_summary: Some(self.pii_summary.clone()),
            pii_findings: self.pii_findings.clone(),
            drift_results: self.drift_results.clone(),
            standards_alignment: self.standards_alignment.clone(),
        }
    }

    /// Attaches drift results produced by the external comparator.
    pub fn with_drift_results(mut self, drift_results: Vec<DriftResult>) -> Self {
        self.drift_results = drift_results;
        self
    }

    /// Evaluates a policy against this report and attaches the verdict.
    pub fn with_policy(mut self, policy: &Policy) -> Result<Self> {
        let verdict = policy.evaluate(&self.record())?;
        self.policy_verdict = Some(verdict);
        Ok(self)
    }

    /// Serializes the report as pretty-printed JSON with stable key order.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| DataIntegrityError::serialization("failed to serialize audit report", e))
    }
}

/// Output of the quality half of an audit.
#[derive(Debug, Clone)]
struct QualityOutcome {
    evaluation: RuleEvaluation,
    score: ScoreResult,
}

/// Runs complete audits under a validated configuration.
#[derive(Debug, Clone)]
pub struct Auditor {
    config: IntegrityConfig,
    evaluator: RuleEvaluator,
    scorer: SeverityWeightedScorer,
    detector: PiiDetector,
}

impl Auditor {
    /// Creates an auditor running the built-in rules.
    ///
    /// # Errors
    /// Returns a configuration error if the configuration is invalid.
    pub fn new(config: IntegrityConfig) -> Result<Self> {
        Self::with_rules(config, RuleSet::builtin())
    }

    /// Creates an auditor running the given rule set.
    pub fn with_rules(config: IntegrityConfig, rules: RuleSet) -> Result<Self> {
        config.validate()?;

        let detector = PiiDetector::new(&config)?;
        let scorer = SeverityWeightedScorer::new(config.score_weights.clone());
        let evaluator = RuleEvaluator::with_rules(config.clone(), rules);

        Ok(Self {
            config,
            evaluator,
            scorer,
            detector,
        })
    }

    /// Returns the auditor configuration.
    pub fn config(&self) -> &IntegrityConfig {
        &self.config
    }

    /// Audits a dataset using the wall clock for time-dependent rules.
    pub fn audit(&self, dataset: &Dataset) -> AuditReport {
        self.audit_at(dataset, Utc::now())
    }

    /// Audits a dataset relative to the given instant.
    pub fn audit_at(&self, dataset: &Dataset, now: DateTime<Utc>) -> AuditReport {
        let quality = self.quality_half(dataset, now);
        let pii = self.pii_half(dataset);
        self.assemble(dataset, quality, pii)
    }

    /// Audits a dataset with the quality and PII halves running concurrently.
    pub async fn audit_async(self: Arc<Self>, dataset: Arc<Dataset>) -> Result<AuditReport> {
        self.audit_async_at(dataset, Utc::now()).await
    }

    /// Concurrent variant of [`Auditor::audit_at`]; results are identical.
    ///
    /// # Errors
    /// Returns [`DataIntegrityError::TaskJoin`] if a blocking task panics.
    pub async fn audit_async_at(
        self: Arc<Self>,
        dataset: Arc<Dataset>,
        now: DateTime<Utc>,
    ) -> Result<AuditReport> {
        let quality_task = {
            let auditor = Arc::clone(&self);
            let dataset = Arc::clone(&dataset);
            tokio::task::spawn_blocking(move || auditor.quality_half(&dataset, now))
        };
        let pii_task = {
            let auditor = Arc::clone(&self);
            let dataset = Arc::clone(&dataset);
            tokio::task::spawn_blocking(move || auditor.pii_half(&dataset))
        };

        let (quality, pii) =
            tokio::try_join!(quality_task, pii_task).map_err(|e| DataIntegrityError::TaskJoin {
                context: "audit half did not complete".to_string(),
                source: e,
            })?;

        Ok(self.assemble(&dataset, quality, pii))
    }

    fn quality_half(&self, dataset: &Dataset, now: DateTime<Utc>) -> QualityOutcome {
        let evaluation = self.evaluator.evaluate_at(dataset, now);
        let severities = self.evaluator.rules().severities();
        let score = self.scorer.compute(&evaluation.scores, Some(&severities));
        tracing::debug!("Quality scoring complete: {:.2}", score.composite_score);
        QualityOutcome { evaluation, score }
    }

    fn pii_half(&self, dataset: &Dataset) -> PiiScanReport {
        self.detector.scan(dataset, self.config.pii_sample_threshold)
    }

    fn assemble(&self, dataset: &Dataset, quality: QualityOutcome, pii: PiiScanReport) -> AuditReport {
        let QualityOutcome { evaluation, score } = quality;

        let rule_results = self
            .evaluator
            .rules()
            .iter()
            .map(|rule| {
                let metric = evaluation.scores.get(&rule.id).copied().unwrap_or(0.0);
                let contribution = score
                    .breakdown
                    .get(&rule.id)
                    .map_or(0.0, |line| line.contribution);
                RuleResult::new(rule.id.clone(), rule.description.clone(), metric, rule.severity)
                    .with_contribution(contribution)
            })
            .collect();

        let standards_alignment = self
            .config
            .standards_alignment
            .then(|| evaluate_iso_25012_alignment(&evaluation.scores));

        let pii_findings = pii.findings();
        let (row_count, column_count) = dataset.shape();

        tracing::info!(
            "Audit complete: score {:.2}, {} PII column(s), {} rule warning(s)",
            score.composite_score,
            pii.summary.total_columns_with_pii,
            evaluation.warnings.len()
        );

        AuditReport {
            fingerprint: dataset.fingerprint.clone(),
            source: dataset.source.clone(),
            row_count,
            column_count,
            composite_score: score.composite_score,
            breakdown: score.breakdown,
            weights_used: score.weights_used,
            dimension_scores: evaluation.scores,
            rule_results,
            rule_warnings: evaluation.warnings,
            pii_summary: pii.summary,
            pii_columns: pii.columns,
            pii_findings,
            standards_alignment,
            drift_results: Vec::new(),
            policy_verdict: None,
        }
    }
}
