//! Error types for the audit engine.
//!
//! Only configuration problems and contract violations between collaborators
//! are fatal. Faults inside a single rule or a single column scan have their
//! own error types ([`RuleError`], [`ColumnScanError`]) and are degraded by
//! the engine to a safe default instead of being propagated.

use thiserror::Error;

use crate::config::ConfigValidationError;

/// Main error type for dataintegrity operations.
#[derive(Debug, Error)]
pub enum DataIntegrityError {
    /// Invalid configuration, detected before any rule runs
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A policy document could not be parsed
    #[error("Policy parsing failed: {context}")]
    PolicyFormat {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A collaborator handed over a record that breaks the audit contract
    #[error("Audit record contract violation: {message}")]
    Contract { message: String },

    /// Serialization or deserialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A background audit task did not complete
    #[error("Audit task failed: {context}")]
    TaskJoin {
        context: String,
        #[source]
        source: tokio::task::JoinError,
    },
}

/// Convenience type alias for Results with DataIntegrityError
pub type Result<T> = std::result::Result<T, DataIntegrityError>;

impl DataIntegrityError {
    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a contract violation error
    pub fn contract(message: impl Into<String>) -> Self {
        Self::Contract {
            message: message.into(),
        }
    }

    /// Creates a policy parsing error with context
    pub fn policy_format<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::PolicyFormat {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a serialization error with context
    pub fn serialization(context: impl Into<String>, error: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source: error,
        }
    }
}

impl From<ConfigValidationError> for DataIntegrityError {
    fn from(error: ConfigValidationError) -> Self {
        Self::configuration(error.to_string())
    }
}

/// Failure raised by a single rule while scoring a dataset.
///
/// Never fatal: the evaluator records the rule as `0.0` and emits a warning.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    /// A cell did not have the shape the rule needs
    #[error("column '{column}' row {row}: expected {expected}, found {found}")]
    UnexpectedValue {
        column: String,
        row: usize,
        expected: &'static str,
        found: &'static str,
    },

    /// The timeliness window cannot be applied to the evaluation instant
    #[error("timeliness window of {0} days is out of range")]
    WindowOutOfRange(i64),

    /// The rule produced NaN or an infinite score
    #[error("rule produced a non-finite score ({0})")]
    NonFiniteScore(f64),

    /// Free-form failure reported by a custom rule
    #[error("{0}")]
    Failed(String),
}

/// Failure raised while scanning a single column for PII.
///
/// Never fatal: the detector treats the column as having no finding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnScanError {
    /// A cell contradicts the declared semantic type of its column
    #[error("column '{column}' is declared {declared} but row {row} holds a {found} value")]
    TypeMismatch {
        column: String,
        declared: &'static str,
        row: usize,
        found: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = DataIntegrityError::configuration("score_weights must sum to 1.0");
        assert!(error.to_string().contains("score_weights must sum to 1.0"));

        let error = DataIntegrityError::contract("missing key 'dimension_scores'");
        assert!(error.to_string().contains("dimension_scores"));
    }

    #[test]
    fn test_config_validation_error_conversion() {
        let error: DataIntegrityError = ConfigValidationError::WeightSum(0.9).into();
        assert!(matches!(error, DataIntegrityError::Configuration { .. }));
        assert!(error.to_string().contains("0.9000"));
    }

    #[test]
    fn test_rule_error_display() {
        let error = RuleError::UnexpectedValue {
            column: "created_at".to_string(),
            row: 3,
            expected: "timestamp",
            found: "text",
        };
        assert_eq!(
            error.to_string(),
            "column 'created_at' row 3: expected timestamp, found text"
        );
    }

    #[test]
    fn test_column_scan_error_display() {
        let error = ColumnScanError::TypeMismatch {
            column: "amount".to_string(),
            declared: "numeric",
            row: 0,
            found: "text",
        };
        assert!(error.to_string().contains("declared numeric"));
    }
}
