//! PII detection and risk classification module.
//!
//! This module provides pattern-based detection of personally identifiable
//! information in dataset columns:
//! - **Registry**: known identity and financial entities with priorities
//! - **Guardrails**: noise, checksum, entropy and ratio filters
//! - **Detector**: deterministic sampling, priority resolution and per-column
//!   risk aggregation
//!
//! # Security Guarantees
//! - Reports expose entity types, counts and ratios only, never cell values
//! - Classification is deterministic for identical input and configuration
//!
//! # Example
//! ```rust,ignore
//! use dataintegrity_core::pii::PiiDetector;
//!
//! let detector = PiiDetector::new(&config)?;
//! let report = detector.scan(&dataset, config.pii_sample_threshold);
//! println!("High-risk columns: {}", report.summary.high_risk_columns);
//! ```

mod detector;
mod guardrails;
mod models;
mod registry;

// Re-export public API
pub use detector::{ColumnProfile, MatchCandidate, PiiDetector, resolve};
pub use guardrails::{is_bare_number, is_noisy, looks_like_iso_date, luhn_check, shannon_entropy};
pub use models::{
    ColumnPiiReport, DatasetPiiSummary, PiiFinding, PiiScanReport, UNKNOWN_STRUCTURED_IDENTIFIER,
};
pub use registry::{
    Category, Checksum, CompiledEntity, Confidence, EntityRegistry, LEGACY_PRIORITY, PiiEntity,
    RiskLevel, builtin_entities,
};
