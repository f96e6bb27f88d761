//! Configuration for the model trainer.
//!
//! This module provides [`TrainerConfig`] and its builder.
//!
//! # Example
//!
//! ```
//! use laptop_learning::TrainerConfig;
//! use laptop_processing::ParamGrid;
//!
//! let config = TrainerConfig::builder()
//!     .cv_folds(3)
//!     .param_grid(ParamGrid {
//!         n_estimators: vec![10, 50],
//!         max_depth: vec![3],
//!         learning_rate: vec![0.1],
//!     })
//!     .n_jobs(2)
//!     .build()
//!     .expect("valid config");
//! assert_eq!(config.param_grid.len(), 2);
//! ```

use crate::error::LearningError;
use laptop_processing::{ModelBuildingConfig, ParamGrid};

/// Configuration for the grid-search trainer.
///
/// Use [`TrainerConfig::builder()`] to construct a configuration with the builder pattern.
///
/// # Validation
///
/// The builder validates the following constraints on [`build()`](TrainerConfigBuilder::build):
/// - `cv_folds` must be at least 2
/// - every grid axis must be non-empty
/// - `n_estimators`, `max_depth` and `learning_rate` values must be positive
/// - `n_jobs` must be `-1` or at least 1
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerConfig {
    /// Number of cross-validation folds (default: 5).
    pub cv_folds: usize,

    /// Hyperparameter grid searched exhaustively.
    pub param_grid: ParamGrid,

    /// Number of parallel jobs (default: -1 for all cores).
    ///
    /// - `-1`: Use all available CPU cores
    /// - `1`: Single-threaded (useful for debugging)
    /// - `n > 1`: Use exactly `n` cores
    pub n_jobs: i32,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            cv_folds: 5,
            param_grid: ParamGrid::default(),
            n_jobs: -1,
        }
    }
}

impl TrainerConfig {
    /// Create a new builder for `TrainerConfig`.
    #[must_use]
    pub fn builder() -> TrainerConfigBuilder {
        TrainerConfigBuilder::default()
    }

    /// Trainer settings from the model section of the configuration document.
    pub fn from_model_config(config: &ModelBuildingConfig) -> Result<Self, LearningError> {
        Self::builder()
            .cv_folds(config.cv_folds)
            .param_grid(config.param_grid.clone())
            .n_jobs(config.n_jobs)
            .build()
    }
}

/// Builder for [`TrainerConfig`].
///
/// Created via [`TrainerConfig::builder()`]. All setters return `self` to allow
/// method chaining.
#[derive(Debug, Clone, Default)]
pub struct TrainerConfigBuilder {
    config: TrainerConfig,
}

impl TrainerConfigBuilder {
    /// Set the number of cross-validation folds (default: 5).
    #[must_use]
    pub fn cv_folds(mut self, folds: usize) -> Self {
        self.config.cv_folds = folds;
        self
    }

    /// Set the hyperparameter grid.
    #[must_use]
    pub fn param_grid(mut self, grid: ParamGrid) -> Self {
        self.config.param_grid = grid;
        self
    }

    /// Set the number of parallel jobs (default: -1 for all cores).
    #[must_use]
    pub fn n_jobs(mut self, jobs: i32) -> Self {
        self.config.n_jobs = jobs;
        self
    }

    /// Build the configuration, validating all settings.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::InvalidConfig`] if any constraint listed on
    /// [`TrainerConfig`] is violated.
    pub fn build(self) -> Result<TrainerConfig, LearningError> {
        if self.config.cv_folds < 2 {
            return Err(LearningError::InvalidConfig(
                "cv_folds must be at least 2".to_string(),
            ));
        }

        let grid = &self.config.param_grid;
        if grid.n_estimators.is_empty()
            || grid.max_depth.is_empty()
            || grid.learning_rate.is_empty()
        {
            return Err(LearningError::InvalidConfig(
                "param_grid axes must not be empty".to_string(),
            ));
        }
        if grid.n_estimators.contains(&0) {
            return Err(LearningError::InvalidConfig(
                "n_estimators values must be at least 1".to_string(),
            ));
        }
        if grid.max_depth.contains(&0) {
            return Err(LearningError::InvalidConfig(
                "max_depth values must be at least 1".to_string(),
            ));
        }
        if grid
            .learning_rate
            .iter()
            .any(|lr| !(lr.is_finite() && *lr > 0.0))
        {
            return Err(LearningError::InvalidConfig(
                "learning_rate values must be positive".to_string(),
            ));
        }

        if self.config.n_jobs == 0 || self.config.n_jobs < -1 {
            return Err(LearningError::InvalidConfig(
                "n_jobs must be -1 or at least 1".to_string(),
            ));
        }

        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laptop_processing::PipelineConfig;

    fn tiny_grid() -> ParamGrid {
        ParamGrid {
            n_estimators: vec![5],
            max_depth: vec![2],
            learning_rate: vec![0.1],
        }
    }

    #[test]
    fn test_default_config() {
        let config = TrainerConfig::default();
        assert_eq!(config.cv_folds, 5);
        assert_eq!(config.n_jobs, -1);
        assert_eq!(config.param_grid.len(), 105);
    }

    #[test]
    fn test_builder() {
        let config = TrainerConfig::builder()
            .cv_folds(3)
            .param_grid(tiny_grid())
            .n_jobs(1)
            .build()
            .unwrap();
        assert_eq!(config.cv_folds, 3);
        assert_eq!(config.n_jobs, 1);
        assert_eq!(config.param_grid, tiny_grid());
    }

    #[test]
    fn test_invalid_cv_folds() {
        let result = TrainerConfig::builder().cv_folds(1).build();
        assert!(result.unwrap_err().to_string().contains("cv_folds"));
    }

    #[test]
    fn test_invalid_grid() {
        let mut grid = tiny_grid();
        grid.max_depth.clear();
        assert!(TrainerConfig::builder().param_grid(grid).build().is_err());

        let mut grid = tiny_grid();
        grid.n_estimators = vec![0];
        let err = TrainerConfig::builder().param_grid(grid).build().unwrap_err();
        assert!(err.to_string().contains("n_estimators"));

        let mut grid = tiny_grid();
        grid.learning_rate = vec![-0.1];
        assert!(TrainerConfig::builder().param_grid(grid).build().is_err());
    }

    #[test]
    fn test_invalid_n_jobs() {
        assert!(TrainerConfig::builder().n_jobs(0).build().is_err());
        assert!(TrainerConfig::builder().n_jobs(-2).build().is_err());
        assert!(TrainerConfig::builder().n_jobs(8).build().is_ok());
    }

    #[test]
    fn test_from_model_config() {
        let model = PipelineConfig::default().model;
        let config = TrainerConfig::from_model_config(&model).unwrap();
        assert_eq!(config, TrainerConfig::default());
    }
}
