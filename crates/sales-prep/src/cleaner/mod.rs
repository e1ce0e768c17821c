//! Missing value handling.
//!
//! Numeric columns are filled with their median and categorical columns with
//! their mode. Columns with no non-null values keep their nulls, since neither
//! statistic exists for them.

use crate::error::Result;
use crate::imputers::StatisticalImputer;
use crate::utils::{DtypeCategory, columns_of_category};
use polars::prelude::*;
use tracing::{debug, info};

/// Fill missing values in every numeric and categorical column.
///
/// Numeric columns that had nulls come back as `Float64`. Boolean and
/// temporal columns are left alone.
pub fn handle_missing_values(mut df: DataFrame) -> Result<DataFrame> {
    let numeric_cols = columns_of_category(&df, DtypeCategory::Numeric);
    let categorical_cols = columns_of_category(&df, DtypeCategory::Categorical);

    debug!(
        "Imputing {} numeric and {} categorical columns",
        numeric_cols.len(),
        categorical_cols.len()
    );

    for col_name in &numeric_cols {
        StatisticalImputer::apply_numeric_median(&mut df, col_name)?;
    }

    for col_name in &categorical_cols {
        StatisticalImputer::apply_mode_imputation(&mut df, col_name)?;
    }

    let remaining: usize = df.get_columns().iter().map(|col| col.null_count()).sum();
    if remaining > 0 {
        debug!("{} missing values remain in columns with no observed values", remaining);
    }

    info!("Missing values handled");
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_missing_values_mixed_frame() {
        let df = df![
            "Sales" => [Some(100i64), None, Some(90)],
            "Region" => [Some("north"), Some("north"), None],
            "Promo" => [1i64, 0, 1],
        ]
        .unwrap();

        let df = handle_missing_values(df).unwrap();

        let sales = df.column("Sales").unwrap();
        assert_eq!(sales.null_count(), 0);
        assert_eq!(sales.get(1).unwrap().try_extract::<f64>().unwrap(), 95.0);

        let region = df.column("Region").unwrap().as_materialized_series();
        assert_eq!(region.str().unwrap().get(2), Some("north"));

        // Untouched column keeps its dtype
        assert_eq!(df.column("Promo").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_handle_missing_values_keeps_column_order_and_height() {
        let df = df![
            "a" => [Some(1.0), None],
            "b" => [Some("x"), None],
            "c" => [Some(2.0), None],
        ]
        .unwrap();

        let df = handle_missing_values(df).unwrap();
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn test_handle_missing_values_entirely_null_column_stays_null() {
        let df = df![
            "empty" => [Option::<f64>::None, None],
            "full" => [Some(1.0), None],
        ]
        .unwrap();

        let df = handle_missing_values(df).unwrap();
        assert_eq!(df.column("empty").unwrap().null_count(), 2);
        assert_eq!(df.column("full").unwrap().null_count(), 0);
    }

    #[test]
    fn test_handle_missing_values_empty_frame() {
        let df = handle_missing_values(DataFrame::empty()).unwrap();
        assert_eq!(df.shape(), (0, 0));
    }
}
