//! Uniqueness rule.
//!
//! Detects exact duplicate rows.

use std::collections::HashSet;

use crate::dataset::Dataset;

/// Fraction of distinct rows.
///
/// Rows are compared on their canonical cell rendering; nulls compare equal
/// to each other. A dataset without rows scores 1.0.
pub fn check_uniqueness(dataset: &Dataset) -> f64 {
    let total_rows = dataset.row_count();
    if total_rows == 0 {
        return 1.0;
    }

    let unique_rows = (0..total_rows)
        .map(|row| row_key(dataset, row))
        .collect::<HashSet<_>>()
        .len();

    unique_rows as f64 / total_rows as f64
}

/// Builds a comparable key for one row.
fn row_key(dataset: &Dataset, row: usize) -> Vec<Option<String>> {
    dataset
        .columns()
        .iter()
        .map(|column| column.values.get(row).and_then(|v| v.render()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;

    #[test]
    fn test_uniqueness_all_unique() {
        let dataset = Dataset::new(vec![
            Column::numeric("id", [1i64, 2, 3]),
            Column::text("name", ["Alice", "Bob", "Charlie"]),
        ])
        .unwrap();

        assert!((check_uniqueness(&dataset) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_uniqueness_with_row_duplicates() {
        let dataset = Dataset::new(vec![
            Column::numeric("id", [1i64, 1, 2, 1]),
            Column::text("name", ["Alice", "Alice", "Bob", "Alice"]),
        ])
        .unwrap();

        // 2 distinct rows out of 4
        assert!((check_uniqueness(&dataset) - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_uniqueness_column_duplicates_alone_do_not_count() {
        let dataset = Dataset::new(vec![
            Column::numeric("id", [1i64, 2, 3]),
            Column::text("status", ["active", "active", "active"]),
        ])
        .unwrap();

        assert_eq!(check_uniqueness(&dataset), 1.0);
    }

    #[test]
    fn test_uniqueness_nulls_compare_equal() {
        let dataset = Dataset::new(vec![Column::text("email", [None::<&str>, None])]).unwrap();

        assert!((check_uniqueness(&dataset) - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_uniqueness_empty_dataset() {
        assert_eq!(check_uniqueness(&Dataset::empty()), 1.0);
    }
}
