//! Single-record price prediction over persisted artifacts.
//!
//! The service starts unloaded. The first request reads the fitted
//! transformer and the model from disk; once both load, they are kept for
//! the lifetime of the service and never re-read. A failed load leaves the
//! service unloaded so the next request tries again.
//!
//! # Example
//!
//! ```rust,ignore
//! let service = PredictionService::from_config(&transformation, &model);
//! match service.predict(&record) {
//!     Some(price) => println!("{price:.2} EUR"),
//!     None => println!("prediction unavailable"),
//! }
//! ```

use crate::dataset::feature_rows;
use crate::error::{LearningError, Result};
use crate::model::TrainedModel;
use laptop_processing::{
    DataTransformationConfig, FittedTransformer, LaptopRecord, ModelBuildingConfig,
    normalize_units,
};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

struct LoadedArtifacts {
    transformer: FittedTransformer,
    model: TrainedModel,
}

enum ServiceState {
    Unloaded,
    Ready(Arc<LoadedArtifacts>),
}

/// Lazily loaded transformer + model pair answering one record at a time.
pub struct PredictionService {
    preprocessor_path: PathBuf,
    model_path: PathBuf,
    state: Mutex<ServiceState>,
}

impl std::fmt::Debug for PredictionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionService")
            .field("preprocessor_path", &self.preprocessor_path)
            .field("model_path", &self.model_path)
            .field("ready", &self.is_ready())
            .finish()
    }
}

impl PredictionService {
    pub fn new(preprocessor_path: impl Into<PathBuf>, model_path: impl Into<PathBuf>) -> Self {
        Self {
            preprocessor_path: preprocessor_path.into(),
            model_path: model_path.into(),
            state: Mutex::new(ServiceState::Unloaded),
        }
    }

    /// Service over the artifact paths of the transformation and model stages.
    pub fn from_config(
        transformation: &DataTransformationConfig,
        model: &ModelBuildingConfig,
    ) -> Self {
        Self::new(&transformation.preprocessor_path, &model.model_path)
    }

    /// Whether the artifacts have been loaded.
    pub fn is_ready(&self) -> bool {
        matches!(*self.state.lock(), ServiceState::Ready(_))
    }

    /// Predict the price of `record` in euros.
    ///
    /// Any failure (missing artifacts, bad input, inference error) is logged
    /// and yields `None`.
    pub fn predict(&self, record: &LaptopRecord) -> Option<f64> {
        match self.try_predict(record) {
            Ok(price) => Some(price),
            Err(e) => {
                error!("Prediction failed [{}]: {}", e.error_code(), e);
                None
            }
        }
    }

    /// Like [`predict()`](Self::predict), but returns the failure cause.
    pub fn try_predict(&self, record: &LaptopRecord) -> Result<f64> {
        let artifacts = self.artifacts()?;

        let raw = record.to_dataframe()?;
        let normalized = normalize_units(&raw)?;
        let transformed = artifacts.transformer.transform(&normalized)?;
        let rows = feature_rows(&transformed)?;

        artifacts
            .model
            .predict(&rows)?
            .first()
            .copied()
            .ok_or_else(|| {
                LearningError::InferenceError("model returned no prediction".to_string())
            })
    }

    fn artifacts(&self) -> Result<Arc<LoadedArtifacts>> {
        let mut state = self.state.lock();
        if let ServiceState::Ready(artifacts) = &*state {
            return Ok(Arc::clone(artifacts));
        }

        let transformer = FittedTransformer::load(&self.preprocessor_path)?;
        let model = TrainedModel::load(&self.model_path)?;
        if transformer.n_features() != model.n_features() {
            return Err(LearningError::InferenceError(format!(
                "transformer produces {} features but the model expects {}",
                transformer.n_features(),
                model.n_features()
            )));
        }
        info!(
            "Prediction artifacts loaded: {}, {}",
            self.preprocessor_path.display(),
            self.model_path.display()
        );

        let artifacts = Arc::new(LoadedArtifacts { transformer, model });
        *state = ServiceState::Ready(Arc::clone(&artifacts));
        Ok(artifacts)
    }
}

static_assertions::assert_impl_all!(PredictionService: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> LaptopRecord {
        LaptopRecord {
            company: "Dell".to_string(),
            product: "XPS 13".to_string(),
            type_name: "Ultrabook".to_string(),
            inches: 13.3,
            screen_resolution: "1920x1080".to_string(),
            cpu: "Intel Core i7".to_string(),
            ram: 8,
            memory: "256GB SSD".to_string(),
            gpu: "Intel HD Graphics 620".to_string(),
            op_sys: "Windows 10".to_string(),
            weight: 1.2,
        }
    }

    #[test]
    fn test_missing_artifacts_yield_none() {
        let dir = tempfile::tempdir().unwrap();
        let service = PredictionService::new(
            dir.path().join("preprocessor.bin"),
            dir.path().join("model.bin"),
        );

        assert_eq!(service.predict(&record()), None);
        assert!(!service.is_ready());
    }

    #[test]
    fn test_missing_model_reports_cause() {
        let dir = tempfile::tempdir().unwrap();
        let transformer_path = dir.path().join("preprocessor.bin");
        let df = record().to_dataframe().unwrap();
        laptop_processing::FeatureTransformer::new()
            .fit(&df)
            .unwrap()
            .save(&transformer_path)
            .unwrap();

        let service = PredictionService::new(&transformer_path, dir.path().join("model.bin"));
        let err = service.try_predict(&record()).unwrap_err();
        assert!(matches!(err, LearningError::ModelNotFound { .. }));
        assert!(!service.is_ready());
    }
}
