//! Median and mode fills for single columns.

use crate::error::Result;
use crate::utils::{fill_numeric_nulls, fill_string_nulls, float_values, string_mode};
use polars::prelude::*;
use tracing::debug;

/// Fills the nulls of one column from that column's own distribution.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill the nulls of a numeric column with the median of its non-null values.
    ///
    /// Returns the fill value, or `None` when nothing was filled (no nulls,
    /// no such column, or no non-null values to take a median of). A filled
    /// column is stored as `Float64`.
    pub fn apply_numeric_median(df: &mut DataFrame, col_name: &str) -> Result<Option<f64>> {
        let Ok(column) = df.column(col_name) else {
            return Ok(None);
        };
        let series = column.as_materialized_series();
        if series.null_count() == 0 {
            return Ok(None);
        }

        let Some(median_val) = float_values(series)?.median() else {
            debug!("'{}' has no non-null values, median undefined", col_name);
            return Ok(None);
        };

        let filled = fill_numeric_nulls(series, median_val)?;
        df.replace(col_name, filled)?;
        debug!("Filled '{}' with median: {:.2}", col_name, median_val);
        Ok(Some(median_val))
    }

    /// Fill the nulls of a categorical column with its most frequent value.
    ///
    /// Returns the fill value, or `None` when nothing was filled.
    pub fn apply_mode_imputation(df: &mut DataFrame, col_name: &str) -> Result<Option<String>> {
        let Ok(column) = df.column(col_name) else {
            return Ok(None);
        };
        let series = column.as_materialized_series();
        if series.null_count() == 0 {
            return Ok(None);
        }

        let Some(mode_val) = string_mode(series) else {
            debug!("'{}' has no non-null values, mode undefined", col_name);
            return Ok(None);
        };

        let filled = fill_string_nulls(series, &mode_val)?;
        df.replace(col_name, filled)?;
        debug!("Filled '{}' with mode: '{}'", col_name, mode_val);
        Ok(Some(mode_val))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== median fill ====================

    #[test]
    fn test_median_fill_odd_count() {
        let mut df = df![
            "values" => [Some(1.0), None, Some(3.0), None, Some(5.0)],
        ]
        .unwrap();

        let filled = StatisticalImputer::apply_numeric_median(&mut df, "values").unwrap();
        assert_eq!(filled, Some(3.0));

        let values = df.column("values").unwrap();
        assert_eq!(values.null_count(), 0);

        // Median of [1, 3, 5] = 3
        assert_eq!(values.get(1).unwrap().try_extract::<f64>().unwrap(), 3.0);
        assert_eq!(values.get(3).unwrap().try_extract::<f64>().unwrap(), 3.0);
    }

    #[test]
    fn test_median_fill_even_count_averages() {
        let mut df = df![
            "Sales" => [Some(100i64), None, Some(90)],
        ]
        .unwrap();

        let filled = StatisticalImputer::apply_numeric_median(&mut df, "Sales").unwrap();
        assert_eq!(filled, Some(95.0));

        let values = df.column("Sales").unwrap();
        assert_eq!(values.dtype(), &DataType::Float64);
        assert_eq!(values.get(1).unwrap().try_extract::<f64>().unwrap(), 95.0);
    }

    #[test]
    fn test_median_fill_ignores_nan() {
        let mut df = df![
            "Sales" => [Some(10.0), Some(f64::NAN), None, Some(30.0)],
        ]
        .unwrap();

        let filled = StatisticalImputer::apply_numeric_median(&mut df, "Sales").unwrap();
        assert_eq!(filled, Some(20.0));
    }

    #[test]
    fn test_median_fill_skips_complete_column() {
        let mut df = df![
            "values" => [1i64, 2, 3],
        ]
        .unwrap();

        let filled = StatisticalImputer::apply_numeric_median(&mut df, "values").unwrap();
        assert_eq!(filled, None);
        assert_eq!(df.column("values").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_median_fill_leaves_all_null_column() {
        let mut df = df![
            "values" => [Option::<f64>::None, None, None],
        ]
        .unwrap();

        // No median exists, so the nulls stay
        let filled = StatisticalImputer::apply_numeric_median(&mut df, "values").unwrap();
        assert_eq!(filled, None);
        assert_eq!(df.column("values").unwrap().null_count(), 3);
    }

    #[test]
    fn test_median_fill_unknown_column() {
        let mut df = df![
            "other" => [1.0, 2.0, 3.0],
        ]
        .unwrap();

        let filled = StatisticalImputer::apply_numeric_median(&mut df, "values").unwrap();
        assert_eq!(filled, None);
    }

    // ==================== mode fill ====================

    #[test]
    fn test_mode_fill_most_frequent_store() {
        let mut df = df![
            "region" => [Some("north"), None, Some("south"), Some("north")],
        ]
        .unwrap();

        let filled = StatisticalImputer::apply_mode_imputation(&mut df, "region").unwrap();
        assert_eq!(filled.as_deref(), Some("north"));

        let col = df.column("region").unwrap();
        assert_eq!(col.null_count(), 0);
        assert_eq!(col.as_materialized_series().str().unwrap().get(1), Some("north"));
    }

    #[test]
    fn test_mode_fill_tie_takes_smallest() {
        let mut df = df![
            "region" => [Some("west"), Some("east"), None],
        ]
        .unwrap();

        let filled = StatisticalImputer::apply_mode_imputation(&mut df, "region").unwrap();
        assert_eq!(filled.as_deref(), Some("east"));
    }

    #[test]
    fn test_mode_fill_leaves_all_null_column() {
        let mut df = df![
            "region" => [None::<&str>, None],
        ]
        .unwrap();

        let filled = StatisticalImputer::apply_mode_imputation(&mut df, "region").unwrap();
        assert_eq!(filled, None);
        assert_eq!(df.column("region").unwrap().null_count(), 2);
    }
}
