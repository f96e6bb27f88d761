//! Gradient boosted regression trees and the persisted model artifact.
//!
//! Boosting itself is delegated to the `gbdt` crate; this module maps
//! [`HyperParams`] onto its configuration, converts rows between `f64` and
//! the crate's `f32` values, and guards inputs the booster would panic on.
//!
//! # Example
//!
//! ```rust,ignore
//! let model = TrainedModel::load("artifacts/model/model.bin")?;
//! let prices = model.predict(&rows)?;
//! ```

use crate::error::{LearningError, Result};
use crate::types::HyperParams;
use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;

const LOSS: &str = "SquaredError";

/// A fitted squared-error gradient boosted regressor.
#[derive(Serialize, Deserialize)]
pub struct GradientBoostedRegressor {
    params: HyperParams,
    n_features: usize,
    booster: GBDT,
}

impl fmt::Debug for GradientBoostedRegressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GradientBoostedRegressor")
            .field("params", &self.params)
            .field("n_features", &self.n_features)
            .finish_non_exhaustive()
    }
}

fn booster_config(params: &HyperParams, n_features: usize) -> Config {
    let mut cfg = Config::new();
    cfg.set_feature_size(n_features);
    cfg.set_iterations(params.n_estimators);
    cfg.set_max_depth(params.max_depth);
    cfg.set_shrinkage(params.learning_rate as f32);
    cfg.set_loss(LOSS);
    cfg.set_min_leaf_size(1);
    cfg.set_data_sample_ratio(1.0);
    cfg.set_feature_sample_ratio(1.0);
    cfg.set_training_optimization_level(2);
    cfg.set_debug(false);
    cfg
}

fn check_rows(rows: &[Vec<f64>], n_features: usize) -> Result<()> {
    for (i, row) in rows.iter().enumerate() {
        if row.len() != n_features {
            return Err(LearningError::InvalidData(format!(
                "row {i} has {} features, expected {n_features}",
                row.len()
            )));
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(LearningError::InvalidData(format!(
                "row {i} contains a non-finite feature"
            )));
        }
    }
    Ok(())
}

fn to_f32(row: &[f64]) -> Vec<f32> {
    row.iter().map(|&v| v as f32).collect()
}

impl GradientBoostedRegressor {
    /// Fit a booster on `x` / `y` with `params`.
    pub fn fit(params: HyperParams, x: &[Vec<f64>], y: &[f64]) -> Result<Self> {
        if x.is_empty() {
            return Err(LearningError::InvalidData("no training rows".to_string()));
        }
        if x.len() != y.len() {
            return Err(LearningError::InvalidData(format!(
                "{} rows but {} targets",
                x.len(),
                y.len()
            )));
        }
        let n_features = x[0].len();
        if n_features == 0 {
            return Err(LearningError::InvalidData("rows have no features".to_string()));
        }
        check_rows(x, n_features)?;
        if y.iter().any(|v| !v.is_finite()) {
            return Err(LearningError::InvalidData("target contains non-finite values".to_string()));
        }
        if params.n_estimators == 0 || params.max_depth == 0 || !(params.learning_rate > 0.0) {
            return Err(LearningError::InvalidConfig(format!("unusable hyperparameters: {params}")));
        }

        let mut data: DataVec = x
            .iter()
            .zip(y)
            .map(|(row, &label)| Data::new_training_data(to_f32(row), 1.0, label as f32, None))
            .collect();

        let mut booster = GBDT::new(&booster_config(&params, n_features));
        booster.fit(&mut data);
        debug!("Fitted booster ({}) on {} rows", params, x.len());

        Ok(Self {
            params,
            n_features,
            booster,
        })
    }

    pub fn params(&self) -> HyperParams {
        self.params
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Predict one value per row.
    pub fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        check_rows(x, self.n_features).map_err(|e| LearningError::InferenceError(e.to_string()))?;
        if x.is_empty() {
            return Ok(Vec::new());
        }

        let data: DataVec = x
            .iter()
            .map(|row| Data::new_test_data(to_f32(row), None))
            .collect();
        let predictions: Vec<f64> = self
            .booster
            .predict(&data)
            .into_iter()
            .map(f64::from)
            .collect();

        if predictions.len() != x.len() || predictions.iter().any(|p| !p.is_finite()) {
            return Err(LearningError::InferenceError(
                "booster produced invalid predictions".to_string(),
            ));
        }
        Ok(predictions)
    }
}

/// The persisted model: a fitted booster and the feature layout it expects.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainedModel {
    feature_names: Vec<String>,
    regressor: GradientBoostedRegressor,
}

impl TrainedModel {
    pub fn new(feature_names: Vec<String>, regressor: GradientBoostedRegressor) -> Result<Self> {
        if feature_names.len() != regressor.n_features() {
            return Err(LearningError::InvalidData(format!(
                "{} feature names for a model with {} features",
                feature_names.len(),
                regressor.n_features()
            )));
        }
        Ok(Self {
            feature_names,
            regressor,
        })
    }

    pub fn params(&self) -> HyperParams {
        self.regressor.params()
    }

    pub fn n_features(&self) -> usize {
        self.regressor.n_features()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        self.regressor.predict(x)
    }

    /// Serialize to bytes (bincode).
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Deserialize from bytes produced by [`to_bytes()`](Self::to_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let model: Self = bincode::deserialize(bytes)?;
        if model.feature_names.len() != model.regressor.n_features() {
            return Err(LearningError::InferenceError(
                "model artifact has an inconsistent feature layout".to_string(),
            ));
        }
        Ok(model)
    }

    /// Save the model to `path`, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Load a model saved with [`save()`](Self::save).
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::ModelNotFound`] if the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LearningError::ModelNotFound {
                path: path.display().to_string(),
            });
        }
        Self::from_bytes(&fs::read(path)?)
    }
}

static_assertions::assert_impl_all!(TrainedModel: Send, Sync);
