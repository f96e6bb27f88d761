//! laptop-learning: grid-searched gradient boosting for laptop prices.
//!
//! This crate trains a squared-error gradient boosted regressor on the
//! transformed arrays produced by `laptop-processing`, scores it, persists it
//! and serves single-record predictions from the persisted artifacts.
//!
//! # Features
//!
//! - **Grid Search**: exhaustive search over `n_estimators × max_depth × learning_rate`
//! - **Cross-Validation**: contiguous k-fold, R² per held-out fold
//! - **Parallelism**: every (candidate, fold) fit runs on the rayon pool
//! - **Metrics**: R², MSE and MAE persisted as JSON per split
//! - **Serving**: lazily loaded transformer + model behind a mutex
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use laptop_learning::{PredictionService, run_model_building};
//! use laptop_processing::{ConfigurationManager, TransformationArtifacts};
//!
//! let manager = ConfigurationManager::from_file("config/config.yaml")?;
//! let transformation = manager.data_transformation_config()?;
//! let model_config = manager.model_building_config()?;
//!
//! let arrays = TransformationArtifacts::load(&transformation)?;
//! let artifacts = run_model_building(&model_config, &arrays)?;
//! println!("best: {}", artifacts.result.best_params);
//!
//! let service = PredictionService::from_config(&transformation, &model_config);
//! let price = service.predict(&record);
//! ```
//!
//! # Architecture
//!
//! ```text
//! TransformationArtifacts ──► Dataset ──► GridSearchTrainer ──► TrainedModel
//!                                              │                    │
//!                                              ▼                    ▼
//!                                       TrainingResult        model.bin
//!                                     (metrics JSON files)          │
//!                                                                   ▼
//!                               LaptopRecord ──► PredictionService ──► Option<f64>
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, LearningError>`]:
//!
//! - [`LearningError::InvalidConfig`] - Invalid trainer configuration
//! - [`LearningError::InvalidData`] - Degenerate or malformed training data
//! - [`LearningError::TrainingFailed`] - No usable candidate
//! - [`LearningError::ModelNotFound`] - Missing model artifact
//! - [`LearningError::InferenceError`] - Prediction failed
//!
//! [`PredictionService::predict`] never returns an error; failures are logged
//! and surface as `None`.

mod config;
mod cv;
mod dataset;
mod error;
mod grid;
pub mod metrics;
mod model;
mod prediction;
mod trainer;
mod types;

// Re-export public API
//
// Configuration types
pub use config::{TrainerConfig, TrainerConfigBuilder};
// Cross-validation and grid expansion
pub use cv::{Fold, KFold};
pub use grid::ParamGridExt;
// Training data
pub use dataset::{Dataset, feature_rows};
// Error types
pub use error::{LearningError, Result};
// Model types
pub use model::{GradientBoostedRegressor, TrainedModel};
// Serving
pub use prediction::PredictionService;
// Training
pub use trainer::{GridSearchTrainer, ModelArtifacts, run_model_building};
// Result and metrics types
pub use types::{CandidateScore, HyperParams, RegressionMetrics, TrainingResult};
