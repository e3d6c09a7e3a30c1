//! Consistency rule.
//!
//! A row is inconsistent when, inside a group of related columns, some
//! values are null while others in the same row are present.

use std::collections::BTreeSet;

use crate::dataset::{CellValue, Column, Dataset};

/// Fraction of rows free of partial nulls across the given column groups.
///
/// With no groups, every column forms a single group. Unknown column names
/// are dropped from a group, and groups left with fewer than two known
/// columns are ignored. A dataset without rows scores 1.0.
pub fn check_consistency(dataset: &Dataset, column_groups: Option<&[Vec<String>]>) -> f64 {
    let total_rows = dataset.row_count();
    if total_rows == 0 {
        return 1.0;
    }

    let default_group;
    let groups: &[Vec<String>] = match column_groups {
        Some(groups) => groups,
        None => {
            default_group = [dataset
                .column_names()
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>()];
            &default_group
        }
    };

    let mut inconsistent_rows: BTreeSet<usize> = BTreeSet::new();

    for group in groups {
        let members: Vec<&Column> = group.iter().filter_map(|name| dataset.column(name)).collect();
        if members.len() < 2 {
            tracing::debug!(
                "Skipping consistency group {:?}: fewer than two known columns",
                group
            );
            continue;
        }

        for row in 0..total_rows {
            let nulls = members
                .iter()
                .filter(|column| column.values.get(row).is_none_or(CellValue::is_null))
                .count();
            if nulls > 0 && nulls < members.len() {
                inconsistent_rows.insert(row);
            }
        }
    }

    (total_rows - inconsistent_rows.len()) as f64 / total_rows as f64
}
