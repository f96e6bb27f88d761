//! Error types for the laptop-learning crate.
//!
//! This module defines [`LearningError`], the main error type used throughout
//! the crate. All public API functions return `Result<T, LearningError>`.
//!
//! # Error Handling
//!
//! Errors are designed to be:
//! - **Descriptive**: Each variant includes context about what went wrong
//! - **Actionable**: Messages name the offending value or file
//!
//! # Example
//!
//! ```no_run
//! use laptop_learning::{LearningError, TrainerConfig};
//!
//! fn configure() -> Result<(), LearningError> {
//!     // Errors are automatically propagated with ?
//!     let _config = TrainerConfig::builder().cv_folds(5).build()?;
//!     Ok(())
//! }
//! ```

use laptop_processing::ProcessingError;
use thiserror::Error;

/// The main error type for training, evaluation and prediction.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// without breaking downstream code.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LearningError {
    /// Invalid trainer configuration.
    ///
    /// Check the error message for details on which configuration value is invalid
    /// and what values are accepted.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid data provided for training or inference.
    ///
    /// Common causes:
    /// - Fewer rows than cross-validation folds
    /// - Constant target
    /// - NaN or infinite values in features or target
    /// - Rows of different widths
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The target column was not found in a transformed array.
    #[error("Target column '{0}' not found")]
    TargetNotFound(String),

    /// Training failed for every candidate or produced unusable output.
    #[error("Training failed: {0}")]
    TrainingFailed(String),

    /// The model artifact does not exist.
    #[error("Model not found: {path}")]
    ModelNotFound {
        /// The path that was not found.
        path: String,
    },

    /// An error occurred during prediction.
    ///
    /// Common causes:
    /// - Input width does not match the model's expected features
    /// - The booster returned a non-finite value
    #[error("Inference error: {0}")]
    InferenceError(String),

    /// Error raised by the processing stages (transformer, configuration).
    #[error(transparent)]
    Processing(#[from] ProcessingError),

    /// Binary model artifact encoding/decoding error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Metric document encoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error while reading transformed arrays.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl LearningError {
    /// Get a stable error code for callers that report errors.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::InvalidData(_) => "INVALID_DATA",
            Self::TargetNotFound(_) => "TARGET_NOT_FOUND",
            Self::TrainingFailed(_) => "TRAINING_FAILED",
            Self::ModelNotFound { .. } => "MODEL_NOT_FOUND",
            Self::InferenceError(_) => "INFERENCE_ERROR",
            Self::Processing(e) => e.error_code(),
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
        }
    }
}

/// Result type alias for laptop-learning operations.
pub type Result<T> = std::result::Result<T, LearningError>;
