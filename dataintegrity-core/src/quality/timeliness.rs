//! Timeliness rule.
//!
//! Measures how recent timestamp values are relative to an explicit
//! evaluation instant, so results stay reproducible.

use chrono::{DateTime, TimeDelta, Utc};

use crate::dataset::{CellValue, Column, Dataset, SemanticType};
use crate::error::RuleError;

/// Mean fraction of recent values over the inspected timestamp columns.
///
/// Inspected columns are `timestamp_columns` when non-empty (names absent
/// from the dataset are skipped), otherwise every timestamp-typed column.
/// With nothing to inspect the rule is not applicable and scores 1.0; an
/// inspected column without values scores 0.0.
///
/// # Errors
/// Returns [`RuleError::UnexpectedValue`] when an inspected column holds a
/// non-null cell that is not a timestamp, and [`RuleError::WindowOutOfRange`]
/// when the window reaches past the representable date range.
pub fn check_timeliness(
    dataset: &Dataset,
    timestamp_columns: &[String],
    max_age_days: i64,
    now: DateTime<Utc>,
) -> Result<f64, RuleError> {
    let inspected: Vec<&Column> = if timestamp_columns.is_empty() {
        dataset.columns_of_type(SemanticType::Timestamp).collect()
    } else {
        timestamp_columns
            .iter()
            .filter_map(|name| dataset.column(name))
            .collect()
    };

    if inspected.is_empty() {
        return Ok(1.0);
    }

    let cutoff = TimeDelta::try_days(max_age_days)
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or(RuleError::WindowOutOfRange(max_age_days))?;
    let mut total = 0.0;
    for column in &inspected {
        total += column_recency(column, cutoff)?;
    }

    Ok(total / inspected.len() as f64)
}

fn column_recency(column: &Column, cutoff: DateTime<Utc>) -> Result<f64, RuleError> {
    let mut present = 0usize;
    let mut recent = 0usize;

    for (row, value) in column.values.iter().enumerate() {
        match value {
            v if v.is_null() => {}
            CellValue::Timestamp(ts) => {
                present += 1;
                if *ts >= cutoff {
                    recent += 1;
                }
            }
            other => {
                return Err(RuleError::UnexpectedValue {
                    column: column.name.clone(),
                    row,
                    expected: "timestamp",
                    found: other.kind(),
                });
            }
        }
    }

    if present == 0 {
        return Ok(0.0);
    }
    Ok(recent as f64 / present as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_timeliness_no_timestamp_columns() {
        let dataset = Dataset::new(vec![Column::numeric("id", [1i64, 2])]).unwrap();
        assert_eq!(check_timeliness(&dataset, &[], 30, now()).unwrap(), 1.0);
    }

    #[test]
    fn test_timeliness_fraction_recent() {
        let dataset = Dataset::new(vec![Column::timestamp(
            "updated_at",
            [
                Some(now() - Duration::days(1)),
                Some(now() - Duration::days(10)),
                Some(now() - Duration::days(60)),
                None,
            ],
        )])
        .unwrap();

        let score = check_timeliness(&dataset, &[], 30, now()).unwrap();
        assert!((score - 2.0 / 3.0).abs() < 0.001);
    }

    #[test]
    fn test_timeliness_cutoff_is_inclusive() {
        let dataset = Dataset::new(vec![Column::timestamp(
            "updated_at",
            [now() - Duration::days(30)],
        )])
        .unwrap();

        assert_eq!(check_timeliness(&dataset, &[], 30, now()).unwrap(), 1.0);
    }

    #[test]
    fn test_timeliness_averages_columns() {
        let dataset = Dataset::new(vec![
            Column::timestamp("created_at", [now(), now()]),
            Column::timestamp("updated_at", [None::<DateTime<Utc>>, None]),
        ])
        .unwrap();

        // 1.0 for the populated column, 0.0 for the empty one
        let score = check_timeliness(&dataset, &[], 30, now()).unwrap();
        assert!((score - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_timeliness_configured_columns() {
        let dataset = Dataset::new(vec![
            Column::timestamp("created_at", [now() - Duration::days(365)]),
            Column::timestamp("updated_at", [now()]),
        ])
        .unwrap();

        let columns = vec!["updated_at".to_string(), "not_there".to_string()];
        assert_eq!(check_timeliness(&dataset, &columns, 30, now()).unwrap(), 1.0);
    }

    #[test]
    fn test_timeliness_window_out_of_range() {
        let dataset = Dataset::new(vec![Column::timestamp("updated_at", [now()])]).unwrap();

        assert_eq!(
            check_timeliness(&dataset, &[], 200_000_000, now()),
            Err(RuleError::WindowOutOfRange(200_000_000))
        );
        assert_eq!(
            check_timeliness(&dataset, &[], i64::MAX, now()),
            Err(RuleError::WindowOutOfRange(i64::MAX))
        );
    }

    #[test]
    fn test_timeliness_rejects_non_timestamp_cells() {
        let dataset = Dataset::new(vec![Column::text("updated_at", ["yesterday"])]).unwrap();

        let columns = vec!["updated_at".to_string()];
        let err = check_timeliness(&dataset, &columns, 30, now()).unwrap_err();
        assert_eq!(
            err,
            RuleError::UnexpectedValue {
                column: "updated_at".to_string(),
                row: 0,
                expected: "timestamp",
                found: "text",
            }
        );
    }
}
