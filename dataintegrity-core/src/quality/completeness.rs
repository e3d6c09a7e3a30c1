//! Completeness rule.
//!
//! Measures the presence of values across every cell of the dataset.

use crate::dataset::Dataset;

/// Fraction of non-null cells across the whole dataset.
///
/// A dataset with no cells is vacuously complete and scores 1.0.
pub fn check_completeness(dataset: &Dataset) -> f64 {
    let total_cells = dataset.cell_count();
    if total_cells == 0 {
        return 1.0;
    }

    let non_null: usize = dataset.columns().iter().map(|c| c.non_null_count()).sum();
    non_null as f64 / total_cells as f64
}
