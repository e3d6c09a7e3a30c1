//! PII scan result models.
//!
//! Reports carry entity types, counts and ratios. Matched cell values never
//! leave the detector.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::registry::{Category, Confidence, RiskLevel};

/// Entity type emitted by the generic-identifier heuristic.
pub const UNKNOWN_STRUCTURED_IDENTIFIER: &str = "unknown_structured_identifier";

/// A surviving detection for one entity type in one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiiFinding {
    /// Column the finding belongs to
    pub column: String,
    /// Winning entity type, or the generic-identifier marker
    pub dominant_type: String,
    pub category: Category,
    /// Risk level of the entity type
    pub highest_risk: RiskLevel,
    /// Confidence of the entity type
    pub confidence: Confidence,
    /// Rows resolved to this type
    pub matches: usize,
    /// `matches / scanned rows`, rounded to four decimals
    pub match_ratio: f64,
}

/// Per-column scan outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnPiiReport {
    /// True when at least one finding survived the filters
    pub pii_detected: bool,
    /// Rows with a surviving match
    pub count: usize,
    /// Surviving entity type to resolved match count
    pub patterns_hit: BTreeMap<String, usize>,
    /// Findings in entity-type order
    pub pii_findings: Vec<PiiFinding>,
}

impl ColumnPiiReport {
    /// Report for a column with nothing to flag.
    pub fn clean() -> Self {
        Self::default()
    }

    /// Worst risk level among the findings.
    pub fn highest_risk(&self) -> Option<RiskLevel> {
        self.pii_findings.iter().map(|f| f.highest_risk).max()
    }
}

/// Dataset-level PII roll-up.
///
/// Risk buckets count each PII column once, under its worst finding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetPiiSummary {
    /// Columns whose worst finding is high risk
    pub high_risk_columns: usize,
    /// Columns whose worst finding is medium risk
    pub medium_risk_columns: usize,
    /// Columns whose worst finding is low risk
    pub low_risk_columns: usize,
    /// Columns with at least one finding
    pub total_columns_with_pii: usize,
    /// Sum of per-column match counts
    pub total_matches: usize,
    /// True when the dataset exceeded the sample threshold
    pub is_sampled: bool,
    /// Rows actually scanned
    pub sample_size: usize,
}

/// Full PII scan output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PiiScanReport {
    /// Dataset-level roll-up of the column reports
    pub summary: DatasetPiiSummary,
    /// Only columns with detected PII, keyed by column name
    pub columns: BTreeMap<String, ColumnPiiReport>,
}

impl PiiScanReport {
    /// All findings, ordered by column name then entity type.
    pub fn findings(&self) -> Vec<PiiFinding> {
        self.columns
            .values()
            .flat_map(|report| report.pii_findings.iter().cloned())
            .collect()
    }

    /// Report for one column, if it holds PII.
    pub fn column(&self, name: &str) -> Option<&ColumnPiiReport> {
        self.columns.get(name)
    }
}
