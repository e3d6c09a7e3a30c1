//! Validity rule.
//!
//! A column is valid when every non-null cell conforms to the semantic type
//! the producing connector declared for it. Mixed-type columns are the
//! typical failure: numbers parsed as text in a numeric column, stray
//! booleans in a text column.

use crate::dataset::{Column, Dataset};

/// Fraction of columns whose values are self-consistent with their type.
///
/// A dataset without columns scores 1.0.
pub fn check_validity(dataset: &Dataset) -> f64 {
    let total_columns = dataset.column_count();
    if total_columns == 0 {
        return 1.0;
    }

    let typed_columns = dataset.columns().iter().filter(|c| is_well_typed(c)).count();
    typed_columns as f64 / total_columns as f64
}

fn is_well_typed(column: &Column) -> bool {
    column
        .values
        .iter()
        .filter(|v| !v.is_null())
        .all(|v| v.conforms_to(column.semantic_type))
}
