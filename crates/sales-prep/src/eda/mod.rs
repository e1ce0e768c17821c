//! Exploratory data analysis.
//!
//! Read-only reporting over a loaded frame: descriptive statistics,
//! missing-value counts and three SVG charts. Nothing here modifies the
//! input.

mod correlation;
mod plots;
mod summary;

pub use correlation::{CorrelationMatrix, correlation_heatmap, correlation_matrix, pearson};
pub use plots::{
    BoxStats, Histogram, SALES_BINS, SalesGroup, gaussian_kde, plot_promo_sales_comparison,
    plot_sales_distribution, sales_by_promo,
};
pub use summary::{
    CategoricalStats, ColumnStats, describe, describe_categorical, eda_summary, missing_counts,
    write_eda_summary,
};

use crate::error::Result;
use crate::loader;
use std::path::Path;
use tracing::info;

/// File names used by [`run_eda`] when saving figures.
pub const SALES_DISTRIBUTION_FILE: &str = "sales_distribution.svg";
pub const PROMO_COMPARISON_FILE: &str = "promo_sales_comparison.svg";
pub const CORRELATION_HEATMAP_FILE: &str = "correlation_heatmap.svg";

/// Run the full EDA pass over the CSV at `path`.
///
/// Unlike the preprocessing loader, a missing file is an error here. With
/// `plot_dir` set, the three figures are written into it.
pub fn run_eda(path: impl AsRef<Path>, plot_dir: Option<&Path>) -> Result<()> {
    let df = loader::read_csv(path)?;
    eda_summary(&df)?;

    let target = |file: &str| plot_dir.map(|dir| dir.join(file));
    plot_sales_distribution(&df, target(SALES_DISTRIBUTION_FILE).as_deref())?;
    plot_promo_sales_comparison(&df, target(PROMO_COMPARISON_FILE).as_deref())?;
    correlation_heatmap(&df, target(CORRELATION_HEATMAP_FILE).as_deref())?;

    info!("EDA process completed");
    Ok(())
}
