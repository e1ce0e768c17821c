//! Sales Data Preprocessing Library
//!
//! Preprocessing and exploratory analysis for tabular sales data, built on
//! Polars.
//!
//! # Overview
//!
//! The preprocessing pipeline runs four stages in a fixed order:
//!
//! - **Loading**: read a CSV with a header row; a missing file gives an empty frame
//! - **Missing values**: median for numeric columns, mode for categorical ones
//! - **Outliers**: drop rows whose Z-score reaches the threshold in any numeric column
//! - **Features**: derive `Year`, `Month` and `Day` from the `Date` column
//!
//! The [`eda`] module reports on a frame without changing it: descriptive
//! statistics, missing-value counts, a sales histogram, a promo boxplot and
//! a correlation heatmap, rendered as SVG.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sales_prep::{PreprocessConfig, Preprocessor, ZeroVariancePolicy};
//!
//! // Defaults: threshold 3.0, constant columns never flag a row
//! let df = sales_prep::preprocess_data("data/sales.csv")?;
//!
//! // Custom configuration and log sink
//! let config = PreprocessConfig::builder()
//!     .z_threshold(2.5)
//!     .zero_variance_policy(ZeroVariancePolicy::Error)
//!     .build()?;
//!
//! let df = Preprocessor::builder()
//!     .config(config)
//!     .log_level(tracing::Level::WARN)
//!     .build()?
//!     .preprocess_data("data/sales.csv")?;
//!
//! println!("{}", df.head(Some(5)));
//! ```
//!
//! # Logging
//!
//! Library code only emits `tracing` events. A [`Preprocessor`] sends them to
//! the [`tracing::Dispatch`] it was built with (stderr at INFO by default);
//! free functions log to whatever subscriber is current. See [`logging`].
//!
//! # Exploratory analysis
//!
//! ```rust,ignore
//! use std::path::Path;
//!
//! sales_prep::run_eda("data/sales.csv", Some(Path::new("plots")))?;
//! ```

pub mod cleaner;
pub mod config;
pub mod eda;
pub mod error;
pub mod imputers;
pub mod loader;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::handle_missing_values;
pub use config::{
    ConfigValidationError, DEFAULT_DATE_COLUMN, DEFAULT_Z_THRESHOLD, PreprocessConfig,
    PreprocessConfigBuilder, ZeroVariancePolicy,
};
pub use eda::{
    CategoricalStats, ColumnStats, CorrelationMatrix, correlation_heatmap, correlation_matrix,
    describe, describe_categorical, eda_summary, missing_counts, plot_promo_sales_comparison,
    plot_sales_distribution, run_eda, write_eda_summary,
};
pub use error::{Result, ResultExt, SalesPrepError};
pub use imputers::StatisticalImputer;
pub use loader::{load_data, read_csv};
pub use pipeline::{
    Preprocessor, PreprocessorBuilder, derive_date_features, detect_outliers,
    detect_outliers_with_policy, feature_engineering, preprocess_data, remove_outliers,
};
pub use render::Figure;
pub use utils::{DtypeCategory, get_dtype_category, is_numeric_dtype};
