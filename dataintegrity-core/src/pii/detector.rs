//! PII detection engine.
//!
//! Scans dataset columns for sensitive data in five stages:
//! 1. Type pre-filter (booleans, timestamps and date-shaped text are skipped)
//! 2. Candidate generation against legacy patterns and the entity registry
//! 3. Guardrails rejecting noisy, decimal and checksum-failing candidates
//! 4. Priority resolution to one winning entity per cell
//! 5. Column aggregation with ratio and entropy noise filters
//!
//! Sampling is deterministic (first N rows), so repeated scans of the same
//! data produce identical reports.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::Result;
use crate::config::IntegrityConfig;
use crate::dataset::{CellValue, Column, Dataset, SemanticType};
use crate::error::ColumnScanError;
use crate::quality::round_to;

use super::guardrails::{is_bare_number, is_noisy, looks_like_iso_date, luhn_check, shannon_entropy};
use super::models::{
    ColumnPiiReport, DatasetPiiSummary, PiiFinding, PiiScanReport, UNKNOWN_STRUCTURED_IDENTIFIER,
};
use super::registry::{
    Category, Checksum, CompiledEntity, Confidence, EntityRegistry, PiiEntity, RiskLevel,
};

/// Leading values inspected by the ISO-date pre-filter.
const DATE_HEAD_VALUES: usize = 20;
/// Share of date-shaped leading values that marks a column as dates.
const DATE_COLUMN_RATIO: f64 = 0.8;
/// Leading non-null values inspected for fractional parts.
const DECIMAL_HEAD_VALUES: usize = 1000;
/// Non-high-confidence types below this match ratio are dropped.
const MIN_MATCH_RATIO: f64 = 0.01;
/// Non-high-confidence types whose first match is below this entropy are dropped.
const MIN_ENTROPY_BITS: f64 = 2.0;
/// Column-name fragments that suggest a structured identifier.
const IDENTIFIER_KEYWORDS: [&str; 6] = ["id", "identifier", "national", "tax", "gov", "registration"];
/// Leading values used to measure identifier length.
const IDENTIFIER_HEAD_VALUES: usize = 100;
const IDENTIFIER_MIN_AVG_LEN: f64 = 8.0;
const IDENTIFIER_MAX_AVG_LEN: f64 = 20.0;
const IDENTIFIER_MIN_UNIQUE_RATIO: f64 = 0.8;

/// Column traits that switch guardrails on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnProfile {
    /// Column is declared numeric
    pub is_numeric: bool,
    /// Leading numeric values include fractional parts
    pub has_decimals: bool,
}

impl ColumnProfile {
    /// Profile of a text column.
    pub fn text() -> Self {
        Self::default()
    }

    /// Profile of a numeric column.
    pub fn numeric(has_decimals: bool) -> Self {
        Self {
            is_numeric: true,
            has_decimals,
        }
    }
}

/// A guardrail-approved match of one entity against one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchCandidate<'a> {
    pub entity: &'a PiiEntity,
    /// Position in candidate order: legacy patterns in declaration order,
    /// then the registry
    pub ordinal: usize,
}

/// Picks the winning candidate: lowest priority value, then candidate order.
pub fn resolve<'a, 'b>(candidates: &'b [MatchCandidate<'a>]) -> Option<&'b MatchCandidate<'a>> {
    candidates
        .iter()
        .min_by_key(|c| (c.entity.priority, c.ordinal))
}

/// Rows of one column resolved to the same entity type.
struct TypeGroup<'a> {
    entity: &'a PiiEntity,
    rows: usize,
    first_value: &'a str,
}

/// PII detector combining configured legacy patterns with an entity registry.
#[derive(Debug, Clone)]
pub struct PiiDetector {
    legacy: Vec<CompiledEntity>,
    registry: Arc<EntityRegistry>,
}

impl PiiDetector {
    /// Creates a detector using the built-in entity registry.
    ///
    /// # Errors
    /// Returns a configuration error if any pattern fails to compile.
    pub fn new(config: &IntegrityConfig) -> Result<Self> {
        Self::with_registry(config, Arc::new(EntityRegistry::builtin()?))
    }

    /// Creates a detector sharing an existing registry.
    pub fn with_registry(config: &IntegrityConfig, registry: Arc<EntityRegistry>) -> Result<Self> {
        let legacy = config
            .pii_patterns
            .iter()
            .map(|(name, pattern)| {
                CompiledEntity::compile(PiiEntity::legacy(name.clone(), pattern.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { legacy, registry })
    }

    /// Returns the entity registry.
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Scans every column of the dataset.
    ///
    /// At most `sample_threshold` leading rows are scanned. Columns whose
    /// scan fails are logged and treated as holding no PII.
    pub fn scan(&self, dataset: &Dataset, sample_threshold: usize) -> PiiScanReport {
        let total_rows = dataset.row_count();
        let is_sampled = total_rows > sample_threshold;
        let scan_rows = total_rows.min(sample_threshold);
        if is_sampled {
            tracing::debug!(
                "PII scan limited to the first {} of {} rows",
                scan_rows,
                total_rows
            );
        }

        let mut summary = DatasetPiiSummary {
            is_sampled,
            sample_size: scan_rows,
            ..DatasetPiiSummary::default()
        };
        let mut columns = BTreeMap::new();

        for column in dataset.columns() {
            match self.scan_column(column, scan_rows) {
                Ok(report) if report.pii_detected => {
                    summary.total_matches += report.count;
                    match report.highest_risk() {
                        Some(RiskLevel::High) => summary.high_risk_columns += 1,
                        Some(RiskLevel::Medium) => summary.medium_risk_columns += 1,
                        Some(RiskLevel::Low) => summary.low_risk_columns += 1,
                        None => {}
                    }
                    columns.insert(column.name.clone(), report);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("PII scan skipped column '{}': {}", column.name, e);
                }
            }
        }

        summary.total_columns_with_pii = columns.len();
        tracing::debug!(
            "PII scan found {} column(s) with {} matching row(s)",
            summary.total_columns_with_pii,
            summary.total_matches
        );

        PiiScanReport { summary, columns }
    }

    /// Scans the first `scan_rows` rows of one column.
    ///
    /// # Errors
    /// Returns [`ColumnScanError::TypeMismatch`] when a numeric column holds
    /// a non-numeric cell.
    pub fn scan_column(
        &self,
        column: &Column,
        scan_rows: usize,
    ) -> std::result::Result<ColumnPiiReport, ColumnScanError> {
        if matches!(
            column.semantic_type,
            SemanticType::Boolean | SemanticType::Timestamp
        ) {
            return Ok(ColumnPiiReport::clean());
        }

        let (values, profile) = collect_values(column, scan_rows)?;
        if values.is_empty() {
            return Ok(ColumnPiiReport::clean());
        }
        if is_date_column(&values) {
            tracing::debug!("Column '{}' looks like dates, skipping PII scan", column.name);
            return Ok(ColumnPiiReport::clean());
        }

        let mut groups: BTreeMap<&str, TypeGroup<'_>> = BTreeMap::new();
        for value in &values {
            let candidates = self.candidates(value, profile);
            if let Some(winner) = resolve(&candidates) {
                groups
                    .entry(winner.entity.entity_type.as_str())
                    .or_insert_with(|| TypeGroup {
                        entity: winner.entity,
                        rows: 0,
                        first_value: value.as_str(),
                    })
                    .rows += 1;
            }
        }

        let scan_total = scan_rows as f64;
        let mut patterns_hit = BTreeMap::new();
        let mut findings = Vec::new();

        for (entity_type, group) in &groups {
            let match_ratio = group.rows as f64 / scan_total;
            let trusted = group.entity.confidence == Confidence::High;

            if !trusted && match_ratio < MIN_MATCH_RATIO {
                tracing::debug!(
                    "Dropping '{}' in column '{}': match ratio {:.4} below noise floor",
                    entity_type,
                    column.name,
                    match_ratio
                );
                continue;
            }
            if !trusted && shannon_entropy(group.first_value) < MIN_ENTROPY_BITS {
                tracing::debug!(
                    "Dropping '{}' in column '{}': low-entropy match",
                    entity_type,
                    column.name
                );
                continue;
            }

            patterns_hit.insert((*entity_type).to_string(), group.rows);
            findings.push(PiiFinding {
                column: column.name.clone(),
                dominant_type: (*entity_type).to_string(),
                category: group.entity.category,
                highest_risk: group.entity.risk_level,
                confidence: group.entity.confidence,
                matches: group.rows,
                match_ratio: round_to(match_ratio, 4),
            });
        }

        let mut count: usize = findings.iter().map(|f| f.matches).sum();
        if findings.is_empty()
            && let Some(finding) = structured_identifier(column, &values, scan_rows)
        {
            count = finding.matches;
            findings.push(finding);
        }

        Ok(ColumnPiiReport {
            pii_detected: !findings.is_empty(),
            count,
            patterns_hit,
            pii_findings: findings,
        })
    }

    /// Guardrail-approved candidates for one rendered cell, in candidate order.
    ///
    /// Losing candidates are kept; [`resolve`] picks the winner.
    pub fn candidates(&self, value: &str, profile: ColumnProfile) -> Vec<MatchCandidate<'_>> {
        if is_noisy(value) {
            return Vec::new();
        }

        self.legacy
            .iter()
            .chain(self.registry.entries())
            .enumerate()
            .filter_map(|(ordinal, compiled)| {
                let entity = &compiled.entity;
                if profile.has_decimals && entity.skip_on_decimals {
                    return None;
                }
                if !compiled.is_match(value) {
                    return None;
                }
                if entity.checksum == Some(Checksum::Luhn) && !luhn_check(value) {
                    return None;
                }
                if profile.is_numeric && entity.reject_bare_numbers && is_bare_number(value) {
                    return None;
                }
                Some(MatchCandidate { entity, ordinal })
            })
            .collect()
    }
}

/// Renders the non-null cells of the scanned rows and profiles the column.
fn collect_values(
    column: &Column,
    scan_rows: usize,
) -> std::result::Result<(Vec<String>, ColumnProfile), ColumnScanError> {
    let is_numeric = column.semantic_type == SemanticType::Numeric;
    let mut profile = ColumnProfile {
        is_numeric,
        has_decimals: false,
    };
    let mut values = Vec::new();
    let mut numeric_seen = 0usize;

    for (row, cell) in column.values.iter().take(scan_rows).enumerate() {
        if cell.is_null() {
            continue;
        }
        if is_numeric {
            match cell {
                CellValue::Int(_) => {}
                CellValue::Float(v) => {
                    if numeric_seen < DECIMAL_HEAD_VALUES && v.fract() != 0.0 {
                        profile.has_decimals = true;
                    }
                }
                other => {
                    return Err(ColumnScanError::TypeMismatch {
                        column: column.name.clone(),
                        declared: column.semantic_type.name(),
                        row,
                        found: other.kind(),
                    });
                }
            }
            numeric_seen += 1;
        }
        if let Some(rendered) = cell.render() {
            values.push(rendered);
        }
    }

    Ok((values, profile))
}

fn is_date_column(values: &[String]) -> bool {
    let head = &values[..values.len().min(DATE_HEAD_VALUES)];
    if head.is_empty() {
        return false;
    }
    let hits = head.iter().filter(|v| looks_like_iso_date(v)).count();
    hits as f64 / head.len() as f64 >= DATE_COLUMN_RATIO
}

/// Generic-identifier heuristic for columns without registry findings.
///
/// Flags every non-null scanned row when the column name suggests an
/// identifier, values are identifier-length and mostly distinct.
fn structured_identifier(column: &Column, values: &[String], scan_rows: usize) -> Option<PiiFinding> {
    let name = column.name.to_lowercase();
    if !IDENTIFIER_KEYWORDS.iter().any(|kw| name.contains(kw)) {
        return None;
    }

    let head = &values[..values.len().min(IDENTIFIER_HEAD_VALUES)];
    if head.is_empty() || scan_rows == 0 {
        return None;
    }
    let avg_len =
        head.iter().map(|v| v.chars().count()).sum::<usize>() as f64 / head.len() as f64;
    if !(IDENTIFIER_MIN_AVG_LEN..=IDENTIFIER_MAX_AVG_LEN).contains(&avg_len) {
        return None;
    }

    let distinct = values.iter().map(String::as_str).collect::<HashSet<_>>().len();
    let unique_ratio = distinct as f64 / scan_rows as f64;
    if unique_ratio <= IDENTIFIER_MIN_UNIQUE_RATIO {
        return None;
    }

    let matches = values.len();
    Some(PiiFinding {
        column: column.name.clone(),
        dominant_type: UNKNOWN_STRUCTURED_IDENTIFIER.to_string(),
        category: Category::Identity,
        highest_risk: RiskLevel::Medium,
        confidence: Confidence::Medium,
        matches,
        match_ratio: round_to(matches as f64 / scan_rows as f64, 4),
    })
}
