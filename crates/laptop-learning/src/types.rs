//! Common types used throughout the laptop-learning crate.
//!
//! - [`HyperParams`]: one point of the hyperparameter grid
//! - [`RegressionMetrics`]: evaluation metrics persisted per split
//! - [`CandidateScore`]: cross-validation result for one grid point
//! - [`TrainingResult`]: everything the grid search produced besides the model
//!
//! # Example
//!
//! ```ignore
//! let result = trainer.train(&train, &test)?;
//!
//! println!("Best params: {}", result.best_params);
//! println!("Test R²: {:.4}", result.test_metrics.r2);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// One candidate configuration of the booster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HyperParams {
    /// Number of boosting rounds (trees).
    pub n_estimators: usize,
    /// Maximum depth of each tree.
    pub max_depth: u32,
    /// Shrinkage applied to each tree's contribution.
    pub learning_rate: f64,
}

impl fmt::Display for HyperParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n_estimators={}, max_depth={}, learning_rate={}",
            self.n_estimators, self.max_depth, self.learning_rate
        )
    }
}

/// Metrics from model evaluation on one split.
///
/// Serialized as the metric document:
///
/// ```json
/// {
///     "r2": 0.87,
///     "mse": 61234.5,
///     "mae": 171.2,
///     "params": {
///         "n_estimators": 400,
///         "max_depth": 5,
///         "learning_rate": 0.1
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// R-squared score.
    ///
    /// Coefficient of determination. Range: (-∞, 1.0], where 1.0 is perfect.
    pub r2: f64,

    /// Mean Squared Error. Lower is better.
    pub mse: f64,

    /// Mean Absolute Error, in euros. Lower is better.
    pub mae: f64,

    /// Hyperparameters of the evaluated model.
    pub params: HyperParams,
}

/// Cross-validation result for a single grid point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub params: HyperParams,
    /// R² on each held-out fold, in fold order.
    pub fold_scores: Vec<f64>,
    /// Mean of `fold_scores`.
    pub mean_score: f64,
}

/// Result of a grid-search training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Grid point with the highest mean cross-validation score.
    pub best_params: HyperParams,

    /// Mean cross-validation R² of `best_params`.
    pub cv_score: f64,

    /// Every evaluated grid point, in grid order.
    pub candidates: Vec<CandidateScore>,

    /// Metrics of the refitted model on the training split.
    pub train_metrics: RegressionMetrics,

    /// Metrics of the refitted model on the test split.
    pub test_metrics: RegressionMetrics,

    /// Wall-clock time of the search and refit.
    pub training_time_seconds: f64,
}
