//! Custom error types for the sales preprocessing pipeline.
//!
//! This module provides the error hierarchy using `thiserror`. Every stage
//! of the pipeline and every EDA entry point returns [`Result`], so a single
//! `?` at the call site is enough to propagate failures.
//!
//! Errors are serializable as `{ code, message }` so they can be emitted as
//! JSON by front-ends that wrap the library.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the sales preprocessing pipeline.
#[derive(Error, Debug)]
pub enum SalesPrepError {
    /// Column was not found in the dataset.
    #[error("Column '{0}' is missing from the frame")]
    ColumnNotFound(String),

    /// A numeric-only operation reached a non-numeric column.
    #[error("Column '{column}' has dtype {dtype}, expected a numeric column")]
    NonNumericColumn { column: String, dtype: String },

    /// A column has zero variance and the configured policy rejects it.
    #[error("Column '{0}' has zero variance; Z-scores are undefined")]
    ZeroVariance(String),

    /// A date value could not be parsed.
    #[error("Failed to parse '{value}' in column '{column}' (row {row}) as a date")]
    DateParse {
        column: String,
        row: usize,
        value: String,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<SalesPrepError>,
    },
}

impl SalesPrepError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        SalesPrepError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for callers that branch on failure kind.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::NonNumericColumn { .. } => "NON_NUMERIC_COLUMN",
            Self::ZeroVariance(_) => "ZERO_VARIANCE",
            Self::DateParse { .. } => "DATE_PARSE",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error was caused by a missing column.
    pub fn is_missing_column(&self) -> bool {
        match self {
            Self::ColumnNotFound(_) => true,
            Self::WithContext { source, .. } => source.is_missing_column(),
            _ => false,
        }
    }
}

/// Serialized as a struct with `code` and `message` fields.
impl Serialize for SalesPrepError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("SalesPrepError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for sales preprocessing operations.
pub type Result<T> = std::result::Result<T, SalesPrepError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| SalesPrepError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| SalesPrepError::Io(e).with_context(context))
    }
}
