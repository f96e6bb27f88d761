//! Custom error types for the ingestion and transformation stages.
//!
//! This module provides the error hierarchy using `thiserror` for every
//! failure the processing side of the pipeline can hit: configuration,
//! data source access, splitting, unit normalization and feature
//! transformation.
//!
//! Errors are serializable as `{code, message}` so the command line front end
//! (or any other caller) can report them without matching on variants.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for ingestion, cleaning and transformation.
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// Invalid or malformed configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// The dataset (or a column the stage needs) holds no usable rows.
    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    /// The train/test split cannot be performed.
    #[error("Failed to split dataset: {0}")]
    SplitFailed(String),

    /// Type conversion failed.
    #[error("Failed to convert column '{column}' to {target_type}: {reason}")]
    TypeConversionFailed {
        column: String,
        target_type: String,
        reason: String,
    },

    /// A fitted artifact received input with a different feature layout.
    #[error("Feature mismatch: expected {expected} features, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    /// Relational source error (connection or query).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// YAML configuration parse error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Binary artifact encoding/decoding error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ProcessingError>,
    },
}

impl ProcessingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ProcessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for callers that report errors.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::EmptyDataset(_) => "EMPTY_DATASET",
            Self::SplitFailed(_) => "SPLIT_FAILED",
            Self::TypeConversionFailed { .. } => "TYPE_CONVERSION_FAILED",
            Self::FeatureMismatch { .. } => "FEATURE_MISMATCH",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Yaml(_) => "YAML_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether this error belongs to the configuration category.
    ///
    /// Configuration errors abort the process before any stage runs.
    pub fn is_config_error(&self) -> bool {
        match self {
            Self::InvalidConfig(_) | Self::Yaml(_) => true,
            Self::WithContext { source, .. } => source.is_config_error(),
            _ => false,
        }
    }
}

impl Serialize for ProcessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ProcessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for processing operations.
pub type Result<T> = std::result::Result<T, ProcessingError>;

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
        self.map_err(|e| ProcessingError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ProcessingError::Io(e).with_context(context))
    }
}
