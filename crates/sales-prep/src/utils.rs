//! Shared utilities for the sales preprocessing pipeline.
//!
//! This module contains the dtype helpers and the Float64 views used by the
//! cleaner, the outlier filter and the EDA reporter.

use crate::error::{Result, SalesPrepError};
use polars::prelude::*;
use std::collections::BTreeMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for preprocessing purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Date or datetime types
    Datetime,
    /// Boolean type
    Boolean,
    /// String/text type
    Categorical,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time
    )
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_datetime_dtype(dtype) {
        DtypeCategory::Datetime
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        DtypeCategory::Categorical
    } else {
        DtypeCategory::Other
    }
}

/// Names of the columns in `df` that fall into `category`, in frame order.
pub fn columns_of_category(df: &DataFrame, category: DtypeCategory) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| get_dtype_category(col.dtype()) == category)
        .map(|col| col.name().to_string())
        .collect()
}

/// Names of the numeric columns in `df`, in frame order.
pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
    columns_of_category(df, DtypeCategory::Numeric)
}

/// Look up a column, mapping a miss to [`SalesPrepError::ColumnNotFound`].
pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|col| col.as_materialized_series())
        .map_err(|_| SalesPrepError::ColumnNotFound(name.to_string()))
}

/// Look up a column and require it to be numeric.
pub fn require_numeric<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    let series = require_column(df, name)?;
    if !is_numeric_dtype(series.dtype()) {
        return Err(SalesPrepError::NonNumericColumn {
            column: name.to_string(),
            dtype: series.dtype().to_string(),
        });
    }
    Ok(series)
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// A numeric Series as `Float64`, with NaN read as missing.
///
/// Every statistic in the crate goes through this, so NaN cells are skipped
/// the same way nulls are.
pub fn float_values(series: &Series) -> PolarsResult<Float64Chunked> {
    let float_series = series.cast(&DataType::Float64)?;
    let values: Float64Chunked = float_series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values.with_name(series.name().clone()))
}

/// Values of a numeric Series as `Option<f64>`; nulls and NaN become `None`.
pub fn numeric_cells(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let values = float_values(series)?;
    Ok(values.into_iter().collect())
}

/// Observed values of a numeric Series as `f64`.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<f64>> {
    let values = float_values(series)?;
    Ok(values.into_iter().flatten().collect())
}

/// Number of observed (non-null) values.
pub fn observed_count(values: &Float64Chunked) -> usize {
    values.len() - values.null_count()
}

/// Quartiles `(q1, median, q3)` with linear interpolation, `None` if there
/// are no observed values.
pub fn quartiles(values: &Float64Chunked) -> PolarsResult<Option<(f64, f64, f64)>> {
    let q1 = values.quantile(0.25, QuantileMethod::Linear)?;
    let median = values.quantile(0.5, QuantileMethod::Linear)?;
    let q3 = values.quantile(0.75, QuantileMethod::Linear)?;
    Ok(q1.zip(median).zip(q3).map(|((q1, median), q3)| (q1, median, q3)))
}

/// Most frequent non-null value of a string Series.
///
/// Ties go to the smallest value in lexicographic order.
pub fn string_mode(series: &Series) -> Option<String> {
    let str_series = series.cast(&DataType::String).ok()?;
    let str_chunked = str_series.str().ok()?;

    let mut value_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for val in str_chunked.into_iter().flatten() {
        *value_counts.entry(val).or_insert(0) += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (val, count) in value_counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((val, count));
        }
    }
    best.map(|(val, _)| val.to_string())
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
///
/// The result is always `Float64`.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let filled: Vec<f64> = numeric_cells(series)?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Fill null values in a string Series with a specific value.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let str_series = series.cast(&DataType::String)?;
    let filled: Vec<String> = str_series
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value).to_string())
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}
