//! Pipeline module.
//!
//! This module provides the preprocessing pipeline and the stages it runs
//! after loading and imputation: outlier removal and feature derivation.

mod builder;
pub mod features;
pub mod outliers;

pub use builder::{Preprocessor, PreprocessorBuilder, preprocess_data};
pub use features::{derive_date_features, feature_engineering, parse_date};
pub use outliers::{
    ColumnZScores, ZScores, detect_outliers, detect_outliers_with_policy, remove_outliers,
    zscore_matrix,
};
