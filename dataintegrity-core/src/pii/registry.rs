//! Registry of known sensitive-data entities.
//!
//! Each entity pairs a regex with classification metadata and the guardrails
//! that apply to its candidates. Lower priority values win when several
//! entities match the same cell.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{DataIntegrityError, Result};

/// Priority assigned to legacy configured patterns.
pub const LEGACY_PRIORITY: u32 = 99;

/// Broad class of a sensitive-data entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Identity,
    Financial,
    Contact,
    /// Configured pattern without registry metadata
    Legacy,
}

impl Category {
    /// Lowercase name, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Identity => "identity",
            Category::Financial => "financial",
            Category::Contact => "contact",
            Category::Legacy => "legacy",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exposure risk of a detected entity. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Lowercase name, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much a pattern match alone can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Medium,
    High,
}

impl Confidence {
    /// Lowercase name, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checksum a candidate must pass on top of its regex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Checksum {
    Luhn,
}

/// A sensitive-data entity and its matching rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiiEntity {
    /// Unique type name reported in findings
    pub entity_type: String,
    pub category: Category,
    /// ISO-style country code, or `global`
    pub country: String,
    /// Regex source, matched anywhere in the rendered cell
    pub pattern: String,
    pub risk_level: RiskLevel,
    /// High-confidence types bypass the ratio and entropy filters
    pub confidence: Confidence,
    /// Lower value wins priority resolution
    pub priority: u32,
    /// Checksum a regex match must also pass
    pub checksum: Option<Checksum>,
    /// Not matched at all in columns holding fractional numbers
    pub skip_on_decimals: bool,
    /// All-digit matches are rejected in numeric columns
    pub reject_bare_numbers: bool,
}

impl PiiEntity {
    /// Wraps a configured legacy pattern.
    ///
    /// Legacy candidates carry priority 99 and high confidence. `email` and
    /// `phone` are medium risk, anything else low. Numeric-looking legacy
    /// patterns (`phone`, `ssn`, `credit_card`) are not matched in decimal
    /// columns, and bare-number `phone` matches in numeric columns are
    /// rejected.
    pub fn legacy(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        let name = name.into();
        let risk_level = match name.as_str() {
            "email" | "phone" => RiskLevel::Medium,
            _ => RiskLevel::Low,
        };
        let skip_on_decimals = matches!(name.as_str(), "phone" | "ssn" | "credit_card");
        let reject_bare_numbers = name == "phone";

        Self {
            entity_type: name,
            category: Category::Legacy,
            country: "global".to_string(),
            pattern: pattern.into(),
            risk_level,
            confidence: Confidence::High,
            priority: LEGACY_PRIORITY,
            checksum: None,
            skip_on_decimals,
            reject_bare_numbers,
        }
    }

    fn registered(
        entity_type: &str,
        category: Category,
        country: &str,
        pattern: &str,
        confidence: Confidence,
        priority: u32,
    ) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            category,
            country: country.to_string(),
            pattern: pattern.to_string(),
            risk_level: RiskLevel::High,
            confidence,
            priority,
            checksum: None,
            skip_on_decimals: true,
            reject_bare_numbers: false,
        }
    }

    fn with_checksum(mut self, checksum: Checksum) -> Self {
        self.checksum = Some(checksum);
        self
    }

    fn rejecting_bare_numbers(mut self) -> Self {
        self.reject_bare_numbers = true;
        self
    }
}

/// Built-in global entities, in registry order.
pub fn builtin_entities() -> Vec<PiiEntity> {
    use Category::{Financial, Identity};
    use Confidence::{High, Medium};

    vec![
        PiiEntity::registered("ssn_us", Identity, "US", r"\b\d{3}[-\s]?\d{2}[-\s]?\d{4}\b", High, 2),
        PiiEntity::registered("aadhaar_india", Identity, "IN", r"\b\d{4}\s?\d{4}\s?\d{4}\b", High, 2),
        PiiEntity::registered("pan_india", Identity, "IN", r"\b[A-Z]{5}\d{4}[A-Z]{1}\b", High, 2),
        PiiEntity::registered(
            "gstin_india",
            Identity,
            "IN",
            r"\b\d{2}[A-Z]{5}\d{4}[A-Z]{1}[A-Z\d]{1}[Z]{1}[A-Z\d]{1}\b",
            High,
            2,
        ),
        PiiEntity::registered(
            "ni_uk",
            Identity,
            "UK",
            r"\b[A-CEGHJ-PR-TW-Z]{1}[A-CEGHJ-NPR-TW-Z]{1}\s?\d{2}\s?\d{2}\s?\d{2}\s?[A-D]{1}\b",
            High,
            2,
        ),
        PiiEntity::registered("credit_card", Financial, "global", r"\b(?:\d[ -]?){13,16}\b", High, 1)
            .with_checksum(Checksum::Luhn),
        PiiEntity::registered(
            "iban",
            Financial,
            "global",
            r"\b[A-Z]{2}\d{2}[A-Z\d]{4}\d{7}([A-Z\d]?){0,16}\b",
            High,
            3,
        ),
        // Broad shape; usually needs column context to be meaningful
        PiiEntity::registered("passport", Identity, "global", r"\b[A-Z0-9]{6,9}\b", Medium, 4)
            .rejecting_bare_numbers(),
    ]
}

/// An entity with its compiled regex.
#[derive(Debug, Clone)]
pub struct CompiledEntity {
    /// Source entity
    pub entity: PiiEntity,
    regex: Regex,
}

impl CompiledEntity {
    /// Compiles the entity pattern.
    ///
    /// # Errors
    /// Returns a configuration error if the pattern is not a valid regex.
    pub fn compile(entity: PiiEntity) -> Result<Self> {
        let regex = Regex::new(&entity.pattern).map_err(|e| {
            DataIntegrityError::configuration(format!(
                "PII pattern '{}' does not compile: {}",
                entity.entity_type, e
            ))
        })?;
        Ok(Self { entity, regex })
    }

    /// Returns true if the pattern matches anywhere in `value`.
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// Ordered, compiled entity table shared by detectors.
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    entries: Vec<CompiledEntity>,
}

impl EntityRegistry {
    /// Compiles the built-in global entities.
    pub fn builtin() -> Result<Self> {
        Self::from_entities(builtin_entities())
    }

    /// Compiles a custom entity table, keeping the given order.
    pub fn from_entities(entities: Vec<PiiEntity>) -> Result<Self> {
        let entries = entities
            .into_iter()
            .map(CompiledEntity::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// Entities in registry order.
    pub fn entries(&self) -> &[CompiledEntity] {
        &self.entries
    }

    /// Looks up an entity by type name.
    pub fn get(&self, entity_type: &str) -> Option<&PiiEntity> {
        self.entries
            .iter()
            .map(|e| &e.entity)
            .find(|e| e.entity_type == entity_type)
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no entity is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_compiles() {
        let registry = EntityRegistry::builtin().unwrap();
        let types: Vec<&str> = registry
            .entries()
            .iter()
            .map(|e| e.entity.entity_type.as_str())
            .collect();

        assert_eq!(
            types,
            vec![
                "ssn_us",
                "aadhaar_india",
                "pan_india",
                "gstin_india",
                "ni_uk",
                "credit_card",
                "iban",
                "passport"
            ]
        );
    }

    #[test]
    fn test_builtin_metadata() {
        let registry = EntityRegistry::builtin().unwrap();

        let cc = registry.get("credit_card").unwrap();
        assert_eq!(cc.priority, 1);
        assert_eq!(cc.category, Category::Financial);
        assert_eq!(cc.checksum, Some(Checksum::Luhn));

        let passport = registry.get("passport").unwrap();
        assert_eq!(passport.priority, 4);
        assert_eq!(passport.confidence, Confidence::Medium);
        assert!(passport.reject_bare_numbers);

        assert_eq!(registry.get("iban").unwrap().priority, 3);
        assert_eq!(registry.get("ni_uk").unwrap().country, "UK");
        assert!(registry.entries().iter().all(|e| e.entity.risk_level == RiskLevel::High));
    }

    #[test]
    fn test_entity_patterns() {
        let registry = EntityRegistry::builtin().unwrap();
        let matches = |entity_type: &str, value: &str| {
            registry
                .entries()
                .iter()
                .find(|e| e.entity.entity_type == entity_type)
                .unwrap()
                .is_match(value)
        };

        assert!(matches("ssn_us", "453-20-1511"));
        assert!(matches("pan_india", "ABCDE1234F"));
        assert!(matches("gstin_india", "22ABCDE1234F1Z5"));
        assert!(matches("ni_uk", "AB 12 34 56 C"));
        assert!(matches("iban", "GB82WEST12345698765432"));
        assert!(matches("aadhaar_india", "4532 0151 1283"));
        assert!(!matches("pan_india", "abcde1234f"));
    }

    #[test]
    fn test_legacy_entity() {
        let email = PiiEntity::legacy("email", ".+@.+");
        assert_eq!(email.priority, LEGACY_PRIORITY);
        assert_eq!(email.category, Category::Legacy);
        assert_eq!(email.risk_level, RiskLevel::Medium);
        assert_eq!(email.confidence, Confidence::High);
        assert!(!email.skip_on_decimals);

        let ssn = PiiEntity::legacy("ssn", r"\d+");
        assert_eq!(ssn.risk_level, RiskLevel::Low);
        assert!(ssn.skip_on_decimals);
        assert!(!ssn.reject_bare_numbers);

        assert!(PiiEntity::legacy("phone", r"\d+").reject_bare_numbers);
    }

    #[test]
    fn test_invalid_pattern_is_configuration_error() {
        let result = CompiledEntity::compile(PiiEntity::legacy("broken", "(unclosed"));
        assert!(matches!(
            result,
            Err(DataIntegrityError::Configuration { .. })
        ));
    }

    #[test]
    fn test_risk_ordering() {
        assert!(RiskLevel::High > RiskLevel::Medium);
        assert!(RiskLevel::Medium > RiskLevel::Low);
    }
}
