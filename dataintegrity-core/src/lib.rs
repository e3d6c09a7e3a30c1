//! Data-quality scoring and PII risk classification engine.
//!
//! This crate audits an in-memory tabular [`Dataset`] and produces a
//! deterministic [`AuditReport`]: per-dimension quality scores, a
//! severity-weighted composite score, column-level PII findings and,
//! optionally, ISO/IEC 25012 alignment and a governance policy verdict.
//!
//! # Guarantees
//! - No network or file I/O; datasets and policies arrive from collaborators
//! - Identical dataset, configuration and evaluation instant yield identical reports
//! - A failing rule or column scan degrades to a safe default and never aborts an audit
//! - Only invalid configuration and malformed policy input are fatal
//!
//! # Example
//! ```rust,ignore
//! use dataintegrity_core::{Auditor, Column, Dataset, IntegrityConfig, Policy};
//!
//! let dataset = Dataset::new(vec![
//!     Column::numeric("id", [1i64, 2, 3]),
//!     Column::text("email", ["a@example.com", "b@example.com", "c@example.com"]),
//! ])?;
//!
//! let report = Auditor::new(IntegrityConfig::default())?
//!     .audit(&dataset)
//!     .with_policy(&Policy::named("research")?)?;
//! println!("{}", report.to_json()?);
//! ```

pub mod audit;
pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod pii;
pub mod policy;
pub mod quality;
pub mod standards;

// Re-export commonly used types
pub use audit::{AuditReport, Auditor};
pub use config::{ConfigValidationError, DEFAULT_PII_SAMPLE_THRESHOLD, IntegrityConfig};
pub use dataset::{CellValue, Column, Dataset, SemanticType};
pub use error::{ColumnScanError, DataIntegrityError, Result, RuleError};
pub use pii::{DatasetPiiSummary, PiiDetector, PiiFinding, PiiScanReport, RiskLevel};
pub use policy::{AuditRecord, DriftResult, Policy, PolicyStatus, PolicyVerdict};
pub use quality::{RuleEvaluator, RuleSet, ScoreResult, Severity, SeverityWeightedScorer};
pub use standards::{AlignmentStatus, StandardsAlignment, evaluate_iso_25012_alignment};
