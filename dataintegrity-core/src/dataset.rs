//! In-memory tabular dataset audited by the engine.
//!
//! Datasets are produced by external connectors; the engine only reads them.
//! A dataset is a list of equally long, uniquely named columns, each tagged
//! with the semantic type inferred upstream.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{DataIntegrityError, Result};

/// Semantic type inferred for a column by the producing collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Numeric,
    Text,
    Boolean,
    Timestamp,
}

impl SemanticType {
    /// Lowercase name used in messages and reports.
    pub fn name(&self) -> &'static str {
        match self {
            SemanticType::Numeric => "numeric",
            SemanticType::Text => "text",
            SemanticType::Boolean => "boolean",
            SemanticType::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Timestamp(DateTime<Utc>),
    Text(String),
}

impl CellValue {
    /// Returns true for missing values (nulls and NaN floats).
    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Name of the value kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            CellValue::Null => "null",
            CellValue::Bool(_) => "boolean",
            CellValue::Int(_) => "integer",
            CellValue::Float(_) => "float",
            CellValue::Timestamp(_) => "timestamp",
            CellValue::Text(_) => "text",
        }
    }

    /// Whether a non-null value is compatible with the declared column type.
    pub fn conforms_to(&self, semantic_type: SemanticType) -> bool {
        matches!(
            (self, semantic_type),
            (CellValue::Int(_) | CellValue::Float(_), SemanticType::Numeric)
                | (CellValue::Text(_), SemanticType::Text)
                | (CellValue::Bool(_), SemanticType::Boolean)
                | (CellValue::Timestamp(_), SemanticType::Timestamp)
        )
    }

    /// Canonical string rendering, or `None` for missing values.
    ///
    /// Integral floats keep one fractional digit (`2.0`) so they stay
    /// distinguishable from integers.
    pub fn render(&self) -> Option<String> {
        if self.is_null() {
            return None;
        }
        Some(match self {
            CellValue::Null => return None,
            CellValue::Bool(b) => b.to_string(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => format!("{:.1}", v),
            CellValue::Float(v) => v.to_string(),
            CellValue::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            CellValue::Text(s) => s.clone(),
        })
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(value: DateTime<Utc>) -> Self {
        CellValue::Timestamp(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Null, Into::into)
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub semantic_type: SemanticType,
    pub values: Vec<CellValue>,
}

impl Column {
    /// Creates a column from any values convertible into cells.
    pub fn new<I, V>(name: impl Into<String>, semantic_type: SemanticType, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        Self {
            name: name.into(),
            semantic_type,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a numeric column.
    pub fn numeric<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        Self::new(name, SemanticType::Numeric, values)
    }

    /// Creates a text column.
    pub fn text<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        Self::new(name, SemanticType::Text, values)
    }

    /// Creates a boolean column.
    pub fn boolean<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        Self::new(name, SemanticType::Boolean, values)
    }

    /// Creates a timestamp column.
    pub fn timestamp<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        Self::new(name, SemanticType::Timestamp, values)
    }

    /// Number of cells in the column.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of non-null cells.
    pub fn non_null_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_null()).count()
    }
}

/// Immutable table handed to a single audit.
///
/// Deserialization goes through [`Dataset::new`], so decoded datasets obey
/// the same shape rules as constructed ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDataset")]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
    /// Content hash computed upstream; opaque to the engine
    pub fingerprint: Option<String>,
    /// Origin of the data (file path, table name, ...)
    pub source: Option<String>,
}

/// Wire form of a [`Dataset`] before shape validation.
#[derive(Debug, Deserialize)]
struct RawDataset {
    columns: Vec<Column>,
    #[serde(default)]
    row_count: Option<usize>,
    #[serde(default)]
    fingerprint: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

impl TryFrom<RawDataset> for Dataset {
    type Error = DataIntegrityError;

    fn try_from(raw: RawDataset) -> Result<Self> {
        let mut dataset = Dataset::new(raw.columns)?;
        if let Some(declared) = raw.row_count
            && declared != dataset.row_count
        {
            return Err(DataIntegrityError::configuration(format!(
                "dataset declares {} rows but its columns hold {}",
                declared, dataset.row_count
            )));
        }
        dataset.fingerprint = raw.fingerprint;
        dataset.source = raw.source;
        Ok(dataset)
    }
}

impl Dataset {
    /// Builds a dataset, rejecting ragged or duplicate-named columns.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map_or(0, Column::len);

        let mut seen: HashSet<&str> = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(DataIntegrityError::configuration(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
            if column.len() != row_count {
                return Err(DataIntegrityError::configuration(format!(
                    "column '{}' has {} rows, expected {}",
                    column.name,
                    column.len(),
                    row_count
                )));
            }
        }

        Ok(Self {
            columns,
            row_count,
            fingerprint: None,
            source: None,
        })
    }

    /// Creates a dataset with no columns and no rows.
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            row_count: 0,
            fingerprint: None,
            source: None,
        }
    }

    /// Attaches the upstream fingerprint.
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    /// Attaches the data source label.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)` shape.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count, self.columns.len())
    }

    /// All columns in construction order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in construction order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns declared with the given semantic type.
    pub fn columns_of_type(&self, semantic_type: SemanticType) -> impl Iterator<Item = &Column> {
        self.columns
            .iter()
            .filter(move |c| c.semantic_type == semantic_type)
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.row_count.saturating_mul(self.columns.len())
    }
}
