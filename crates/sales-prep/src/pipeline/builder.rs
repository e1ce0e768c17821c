//! Main preprocessing pipeline module.
//!
//! This module provides the [`Preprocessor`] struct and its builder, which
//! run the four stages in fixed order: load, impute, filter outliers, derive
//! calendar features.

use crate::cleaner;
use crate::config::PreprocessConfig;
use crate::error::Result;
use crate::loader;
use crate::logging::{self, with_dispatch};
use crate::pipeline::{features, outliers};
use polars::prelude::*;
use std::fmt;
use std::path::Path;
use tracing::{Dispatch, Level, info};

/// The preprocessing pipeline.
///
/// Every stage takes the frame by value and hands back a new one, so a
/// caller never sees a partially processed input. All log events are sent
/// to the pipeline's own [`Dispatch`], stderr at INFO unless the builder
/// was given something else.
///
/// # Example
///
/// ```rust,ignore
/// use sales_prep::{PreprocessConfig, Preprocessor};
///
/// let df = Preprocessor::builder()
///     .config(PreprocessConfig::builder().z_threshold(2.5).build()?)
///     .log_level(tracing::Level::WARN)
///     .build()?
///     .preprocess_data("data/sales.csv")?;
/// ```
pub struct Preprocessor {
    config: PreprocessConfig,
    dispatch: Dispatch,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self {
            config: PreprocessConfig::default(),
            dispatch: logging::default_dispatch(),
        }
    }
}

impl fmt::Debug for Preprocessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preprocessor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Preprocessor {
    /// Create a new pipeline builder.
    pub fn builder() -> PreprocessorBuilder {
        PreprocessorBuilder::default()
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// The log sink this pipeline writes to.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Load the CSV at `path`; a missing file yields an empty frame.
    pub fn load_data(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        with_dispatch(&self.dispatch, || loader::load_data(path))
    }

    /// Median/mode imputation.
    pub fn handle_missing_values(&self, df: DataFrame) -> Result<DataFrame> {
        with_dispatch(&self.dispatch, || cleaner::handle_missing_values(df))
    }

    /// Z-score outlier removal with the configured threshold and policy.
    pub fn detect_outliers(&self, df: DataFrame) -> Result<DataFrame> {
        with_dispatch(&self.dispatch, || {
            outliers::detect_outliers_with_policy(
                df,
                self.config.z_threshold,
                self.config.zero_variance_policy,
            )
        })
    }

    /// Calendar features from the configured date column.
    pub fn feature_engineering(&self, df: DataFrame) -> Result<DataFrame> {
        with_dispatch(&self.dispatch, || {
            features::derive_date_features(df, &self.config.date_column)
        })
    }

    /// Full preprocessing pipeline: load, handle missing values, remove
    /// outliers, derive features.
    ///
    /// The first failing stage aborts the run.
    pub fn preprocess_data(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let df = self.load_data(path)?;
        let df = self.handle_missing_values(df)?;
        let df = self.detect_outliers(df)?;
        let df = self.feature_engineering(df)?;

        with_dispatch(&self.dispatch, || info!("Data preprocessing completed"));
        Ok(df)
    }
}

/// Run the full pipeline with default settings, logging to stderr at INFO.
pub fn preprocess_data(path: impl AsRef<Path>) -> Result<DataFrame> {
    Preprocessor::default().preprocess_data(path)
}

/// Builder for [`Preprocessor`].
#[derive(Default)]
pub struct PreprocessorBuilder {
    config: Option<PreprocessConfig>,
    dispatch: Option<Dispatch>,
}

impl fmt::Debug for PreprocessorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreprocessorBuilder")
            .field("config", &self.config)
            .field("has_dispatch", &self.dispatch.is_some())
            .finish()
    }
}

impl PreprocessorBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PreprocessConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Send log events to `dispatch`.
    pub fn dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Log to stderr at `level`.
    pub fn log_level(mut self, level: Level) -> Self {
        self.dispatch = Some(logging::dispatch_with_level(level));
        self
    }

    /// Discard all log events.
    pub fn silent(mut self) -> Self {
        self.dispatch = Some(logging::silent());
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Preprocessor, crate::config::ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Preprocessor {
            config,
            dispatch: self.dispatch.unwrap_or_else(logging::default_dispatch),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ZeroVariancePolicy;
    use crate::logging::capture::CapturedLogs;

    #[test]
    fn test_preprocessor_builder_default() {
        let pipeline = Preprocessor::builder().build().unwrap();
        assert_eq!(pipeline.config(), &PreprocessConfig::default());
    }

    #[test]
    fn test_preprocessor_builder_with_config() {
        let config = PreprocessConfig::builder()
            .z_threshold(2.0)
            .zero_variance_policy(ZeroVariancePolicy::Error)
            .build()
            .unwrap();

        let pipeline = Preprocessor::builder().config(config).silent().build().unwrap();
        assert_eq!(pipeline.config().z_threshold, 2.0);
        assert_eq!(
            pipeline.config().zero_variance_policy,
            ZeroVariancePolicy::Error
        );
    }

    #[test]
    fn test_preprocessor_builder_rejects_invalid_config() {
        let config = PreprocessConfig {
            z_threshold: -1.0,
            ..PreprocessConfig::default()
        };
        assert!(Preprocessor::builder().config(config).build().is_err());
    }

    #[test]
    fn test_detect_outliers_uses_configured_policy() {
        let config = PreprocessConfig::builder()
            .zero_variance_policy(ZeroVariancePolicy::Error)
            .build()
            .unwrap();
        let pipeline = Preprocessor::builder().config(config).silent().build().unwrap();

        let df = df!["const" => [1.0, 1.0, 1.0]].unwrap();
        let err = pipeline.detect_outliers(df).unwrap_err();
        assert_eq!(err.error_code(), "ZERO_VARIANCE");
    }

    #[test]
    fn test_missing_file_logs_error_to_supplied_sink() {
        let logs = CapturedLogs::default();
        let pipeline = Preprocessor::builder()
            .dispatch(logging::dispatch_to_writer(logs.writer(), Level::INFO))
            .build()
            .unwrap();

        let df = pipeline.preprocess_data("/no/such/dir/sales.csv").unwrap();
        assert_eq!(df.shape(), (0, 0));

        let out = logs.contents();
        assert!(out.contains("ERROR"));
        assert!(out.contains("File not found at /no/such/dir/sales.csv"));
        assert!(out.contains("Missing values handled"));
        assert!(out.contains("Outliers detected in 0 rows"));
        assert!(out.contains("Feature engineering complete"));
        assert!(out.contains("Data preprocessing completed"));
    }

    #[test]
    fn test_stages_on_in_memory_frame() {
        let pipeline = Preprocessor::builder().silent().build().unwrap();
        let df = df![
            "Date" => ["2023-01-01", "2023-01-02", "2023-01-03"],
            "Sales" => [Some(100i64), None, Some(90)],
        ]
        .unwrap();

        let df = pipeline.handle_missing_values(df).unwrap();
        let df = pipeline.detect_outliers(df).unwrap();
        let df = pipeline.feature_engineering(df).unwrap();

        assert_eq!(df.shape(), (3, 5));
    }
}
