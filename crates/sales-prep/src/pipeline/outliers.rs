//! Outlier handling module.
//!
//! Z-score based row filtering over the numeric columns of a frame.

use crate::config::{DEFAULT_Z_THRESHOLD, ZeroVariancePolicy};
use crate::error::{Result, SalesPrepError};
use crate::utils::{float_values, numeric_columns, require_column};
use polars::prelude::*;
use tracing::{debug, info};

/// Per-column statistics and Z-scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnZScores {
    /// Column name.
    pub name: String,
    /// Mean of the non-null values.
    pub mean: Option<f64>,
    /// Sample standard deviation (ddof = 1) of the non-null values.
    pub std: Option<f64>,
    /// `(value - mean) / std` per row; `None` for nulls and for every row of
    /// a zero-variance column.
    pub scores: Vec<Option<f64>>,
    /// Which rows hold a non-null value.
    pub observed: Vec<bool>,
}

impl ColumnZScores {
    /// True when the standard deviation is zero or undefined.
    pub fn is_zero_variance(&self) -> bool {
        self.std.is_none_or(|std| !std.is_finite() || std == 0.0)
    }
}

/// Z-score matrix over the numeric columns of a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ZScores {
    /// Number of rows in the source frame.
    pub height: usize,
    /// One entry per numeric column, in frame order.
    pub columns: Vec<ColumnZScores>,
}

impl ZScores {
    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnZScores> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Compute Z-scores for every numeric column.
///
/// Non-numeric columns are skipped. NaN cells count as missing, so they get
/// no score and do not shift the column statistics.
pub fn zscore_matrix(df: &DataFrame) -> Result<ZScores> {
    let mut columns = Vec::new();

    for name in numeric_columns(df) {
        let values = float_values(require_column(df, &name)?)?;
        let (mean, std) = (values.mean(), values.std(1));
        let cells: Vec<Option<f64>> = values.into_iter().collect();
        let mut col = ColumnZScores {
            name,
            mean,
            std,
            scores: vec![None; cells.len()],
            observed: cells.iter().map(Option::is_some).collect(),
        };

        if let (Some(m), Some(s)) = (col.mean, col.std)
            && !col.is_zero_variance()
        {
            col.scores = cells.iter().map(|v| v.map(|val| (val - m) / s)).collect();
        }
        columns.push(col);
    }

    Ok(ZScores {
        height: df.height(),
        columns,
    })
}

/// Remove outlier rows using the default threshold and zero-variance policy.
pub fn remove_outliers(df: DataFrame) -> Result<DataFrame> {
    detect_outliers(df, DEFAULT_Z_THRESHOLD)
}

/// Remove rows whose absolute Z-score reaches `z_thresh` in any numeric
/// column.
///
/// Zero-variance columns never flag a row. See
/// [`detect_outliers_with_policy`] for the other options.
pub fn detect_outliers(df: DataFrame, z_thresh: f64) -> Result<DataFrame> {
    detect_outliers_with_policy(df, z_thresh, ZeroVariancePolicy::default())
}

/// Remove outlier rows with an explicit zero-variance policy.
///
/// A row survives only if every numeric column has a defined Z-score with
/// `|z| < z_thresh`. Rows that still contain a null anywhere after that are
/// dropped too. The logged count is the number of cells with
/// `|z| > z_thresh`, which can exceed the number of rows removed.
pub fn detect_outliers_with_policy(
    df: DataFrame,
    z_thresh: f64,
    policy: ZeroVariancePolicy,
) -> Result<DataFrame> {
    if df.width() == 0 {
        info!("Outliers detected in 0 rows");
        return Ok(df);
    }

    let zscores = zscore_matrix(&df)?;
    let mut keep = vec![true; df.height()];
    let mut violations = 0usize;

    for col in &zscores.columns {
        if col.is_zero_variance() {
            match policy {
                ZeroVariancePolicy::NotOutlier => {
                    debug!("'{}' has zero variance, treating as non-outlier", col.name);
                    for (row, observed) in col.observed.iter().enumerate() {
                        if !observed {
                            keep[row] = false;
                        }
                    }
                }
                ZeroVariancePolicy::AlwaysOutlier => {
                    debug!("'{}' has zero variance, flagging every row", col.name);
                    violations += col.observed.iter().filter(|o| **o).count();
                    keep.fill(false);
                }
                ZeroVariancePolicy::Error => {
                    return Err(SalesPrepError::ZeroVariance(col.name.clone()));
                }
            }
            continue;
        }

        for (row, score) in col.scores.iter().enumerate() {
            match score {
                Some(z) => {
                    if z.abs() > z_thresh {
                        violations += 1;
                    }
                    if z.abs() >= z_thresh {
                        keep[row] = false;
                    }
                }
                None => keep[row] = false,
            }
        }
    }

    // Rows with a null in any column are dropped as well
    for col in df.get_columns() {
        if col.null_count() == 0 {
            continue;
        }
        let nulls = col.as_materialized_series().is_null();
        for (row, is_null) in nulls.into_iter().enumerate() {
            if is_null.unwrap_or(false) {
                keep[row] = false;
            }
        }
    }

    info!("Outliers detected in {} rows", violations);

    let original_rows = df.height();
    let mask = BooleanChunked::from_slice("mask".into(), &keep);
    let filtered = df.filter(&mask)?;

    debug!(
        "Removed {} of {} rows",
        original_rows - filtered.height(),
        original_rows
    );
    Ok(filtered)
}
