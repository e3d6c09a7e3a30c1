//! ISO/IEC 25012 data quality model alignment.
//!
//! Maps internal dimension scores onto the programmatically evaluable
//! ISO/IEC 25012 characteristics. This is alignment reporting only, not a
//! certification.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// ISO characteristic to the internal dimensions it averages.
///
/// Accuracy covers validity (semantic accuracy).
pub const ISO_25012_MAPPING: [(&str, &[&str]); 4] = [
    ("Completeness", &["completeness"]),
    ("Consistency", &["consistency"]),
    ("Currentness", &["timeliness"]),
    ("Accuracy", &["validity"]),
];

/// Dimension weights recommended for general-purpose ISO-aligned audits.
pub const ISO_25012_DEFAULT_WEIGHTS: [(&str, f64); 5] = [
    ("completeness", 0.30),
    ("uniqueness", 0.15),
    ("validity", 0.25),
    ("consistency", 0.15),
    ("timeliness", 0.15),
];

/// Status band of an ISO characteristic score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlignmentStatus {
    Pass,
    MinorIssues,
    ModerateIssues,
    Critical,
}

impl AlignmentStatus {
    /// Classifies a score in [0, 1].
    ///
    /// - `>= 0.95`: Pass
    /// - `>= 0.85`: MinorIssues
    /// - `>= 0.70`: ModerateIssues
    /// - otherwise: Critical
    pub fn from_score(score: f64) -> Self {
        if score >= 0.95 {
            AlignmentStatus::Pass
        } else if score >= 0.85 {
            AlignmentStatus::MinorIssues
        } else if score >= 0.70 {
            AlignmentStatus::ModerateIssues
        } else {
            AlignmentStatus::Critical
        }
    }

    /// Upper-case label used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlignmentStatus::Pass => "PASS",
            AlignmentStatus::MinorIssues => "MINOR_ISSUES",
            AlignmentStatus::ModerateIssues => "MODERATE_ISSUES",
            AlignmentStatus::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for AlignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score and status of one ISO characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CharacteristicAlignment {
    /// Mean of the mapped dimension scores, in [0, 1]
    pub score: f64,
    pub status: AlignmentStatus,
}

/// ISO/IEC 25012 alignment block attached to audit records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardsAlignment {
    /// Characteristic name to alignment
    pub characteristics: BTreeMap<String, CharacteristicAlignment>,
}

impl StandardsAlignment {
    /// Names of characteristics in the Critical band, in name order.
    pub fn critical_characteristics(&self) -> impl Iterator<Item = &str> {
        self.characteristics
            .iter()
            .filter(|(_, c)| c.status == AlignmentStatus::Critical)
            .map(|(name, _)| name.as_str())
    }
}

/// Maps dimension scores onto the ISO/IEC 25012 characteristics.
///
/// Each characteristic scores the mean of its mapped dimensions that are
/// present; a characteristic with none of them present scores 0.0.
pub fn evaluate_iso_25012_alignment(dimension_scores: &BTreeMap<String, f64>) -> StandardsAlignment {
    let characteristics = ISO_25012_MAPPING
        .iter()
        .map(|(characteristic, dimensions)| {
            let scores: Vec<f64> = dimensions
                .iter()
                .filter_map(|d| dimension_scores.get(*d).copied())
                .collect();
            let score = if scores.is_empty() {
                0.0
            } else {
                scores.iter().sum::<f64>() / scores.len() as f64
            };

            (
                (*characteristic).to_string(),
                CharacteristicAlignment {
                    score,
                    status: AlignmentStatus::from_score(score),
                },
            )
        })
        .collect();

    StandardsAlignment { characteristics }
}
