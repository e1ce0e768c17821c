//! Configuration types for the sales preprocessing pipeline.
//!
//! The pipeline is driven by function parameters; [`PreprocessConfig`] just
//! groups them so a [`Preprocessor`](crate::Preprocessor) can carry them
//! around, and can be built with a fluent builder or deserialized from JSON.

use serde::{Deserialize, Serialize};

/// Z-score threshold used when none is given.
pub const DEFAULT_Z_THRESHOLD: f64 = 3.0;

/// Name of the column the feature deriver looks for.
pub const DEFAULT_DATE_COLUMN: &str = "Date";

/// What the outlier filter does with a numeric column whose standard
/// deviation is zero (or undefined because it has fewer than two values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ZeroVariancePolicy {
    /// Every value sits on the mean, so no row is an outlier in this column.
    #[default]
    NotOutlier,
    /// Every row is flagged, which removes all rows.
    AlwaysOutlier,
    /// Fail the stage with [`SalesPrepError::ZeroVariance`](crate::SalesPrepError::ZeroVariance).
    Error,
}

/// Configuration for the preprocessing pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use sales_prep::config::{PreprocessConfig, ZeroVariancePolicy};
///
/// let config = PreprocessConfig::builder()
///     .z_threshold(2.5)
///     .zero_variance_policy(ZeroVariancePolicy::Error)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Rows whose absolute Z-score reaches this value in any numeric column
    /// are removed.
    /// Default: 3.0
    pub z_threshold: f64,

    /// Handling of zero-variance numeric columns.
    /// Default: NotOutlier
    pub zero_variance_policy: ZeroVariancePolicy,

    /// Column parsed for calendar features.
    /// Default: "Date"
    pub date_column: String,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            z_threshold: DEFAULT_Z_THRESHOLD,
            zero_variance_policy: ZeroVariancePolicy::default(),
            date_column: DEFAULT_DATE_COLUMN.to_string(),
        }
    }
}

impl PreprocessConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PreprocessConfigBuilder {
        PreprocessConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.z_threshold.is_finite() || self.z_threshold <= 0.0 {
            return Err(ConfigValidationError::InvalidThreshold(self.z_threshold));
        }

        if self.date_column.trim().is_empty() {
            return Err(ConfigValidationError::EmptyDateColumn);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid Z-score threshold: {0} (must be a positive, finite number)")]
    InvalidThreshold(f64),

    #[error("Date column name must not be empty")]
    EmptyDateColumn,
}

impl From<ConfigValidationError> for crate::SalesPrepError {
    fn from(err: ConfigValidationError) -> Self {
        crate::SalesPrepError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`PreprocessConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PreprocessConfigBuilder {
    z_threshold: Option<f64>,
    zero_variance_policy: Option<ZeroVariancePolicy>,
    date_column: Option<String>,
}

impl PreprocessConfigBuilder {
    /// Set the Z-score threshold for outlier removal.
    pub fn z_threshold(mut self, threshold: f64) -> Self {
        self.z_threshold = Some(threshold);
        self
    }

    /// Set how zero-variance columns are treated by the outlier filter.
    pub fn zero_variance_policy(mut self, policy: ZeroVariancePolicy) -> Self {
        self.zero_variance_policy = Some(policy);
        self
    }

    /// Set the name of the date column used for feature derivation.
    pub fn date_column(mut self, column: impl Into<String>) -> Self {
        self.date_column = Some(column.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PreprocessConfig` or an error if validation fails.
    pub fn build(self) -> Result<PreprocessConfig, ConfigValidationError> {
        let config = PreprocessConfig {
            z_threshold: self.z_threshold.unwrap_or(DEFAULT_Z_THRESHOLD),
            zero_variance_policy: self.zero_variance_policy.unwrap_or_default(),
            date_column: self
                .date_column
                .unwrap_or_else(|| DEFAULT_DATE_COLUMN.to_string()),
        };

        config.validate()?;
        Ok(config)
    }
}
