//! Built-in named governance policies.

use serde::{Deserialize, Serialize};

use crate::{DataIntegrityError, Result};

use super::models::{AuditRecord, PolicyVerdict};

/// A fixed-threshold governance profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedPolicy {
    pub name: String,
    /// Minimum composite score, in [0, 100]
    pub min_score: f64,
    /// Minimum completeness dimension score, in [0, 1]
    pub min_completeness: f64,
    /// Drifted columns tolerated before failing
    pub max_drifted_columns: usize,
}

impl NamedPolicy {
    /// Research profile: score >= 90, completeness >= 95%, at most 2 drifted columns.
    pub fn research() -> Self {
        Self {
            name: "research".to_string(),
            min_score: 90.0,
            min_completeness: 0.95,
            max_drifted_columns: 2,
        }
    }

    /// Production profile: score >= 95, completeness >= 98%, no drift.
    pub fn production() -> Self {
        Self {
            name: "production".to_string(),
            min_score: 95.0,
            min_completeness: 0.98,
            max_drifted_columns: 0,
        }
    }

    /// Looks up a built-in profile by name (case-insensitive).
    ///
    /// # Errors
    /// Returns a configuration error for unknown names.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "research" => Ok(Self::research()),
            "production" => Ok(Self::production()),
            other => Err(DataIntegrityError::configuration(format!(
                "unknown policy '{}', expected 'research' or 'production'",
                other
            ))),
        }
    }

    /// Evaluates the record; every check runs and violations accumulate.
    pub fn evaluate(&self, record: &AuditRecord) -> PolicyVerdict {
        let mut violations = Vec::new();

        let score = record.composite_score;
        if score < self.min_score {
            violations.push(format!(
                "DataScore ({:.1}) is below {}",
                score, self.min_score
            ));
        }

        let completeness = record
            .dimension_scores
            .get("completeness")
            .copied()
            .unwrap_or(0.0);
        if completeness < self.min_completeness {
            violations.push(format!(
                "Completeness ({:.1}%) is below {:.1}%",
                completeness * 100.0,
                self.min_completeness * 100.0
            ));
        }

        let drifted = record.drifted_column_count();
        if drifted > self.max_drifted_columns {
            if self.max_drifted_columns == 0 {
                violations.push(format!(
                    "Data drift detected (zero tolerance for {})",
                    self.name
                ));
            } else {
                violations.push(format!(
                    "Drifted columns ({}) exceed limit ({})",
                    drifted, self.max_drifted_columns
                ));
            }
        }

        if let Some(standards) = &record.standards_alignment {
            for characteristic in standards.critical_characteristics() {
                violations.push(format!(
                    "ISO Characteristic '{}' is CRITICAL",
                    characteristic
                ));
            }
        }

        PolicyVerdict::new(self.name.clone(), violations, false)
    }
}
