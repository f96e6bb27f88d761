//! Configuration for the pipeline stages.
//!
//! The pipeline is configured by a single YAML document that names an
//! artifacts root and, per stage, a working directory plus the files that
//! stage writes. [`ConfigurationManager`] loads and validates the document
//! and hands each stage a frozen bundle of paths and settings.
//!
//! # Example
//!
//! ```rust,ignore
//! use laptop_processing::config::ConfigurationManager;
//!
//! let manager = ConfigurationManager::from_file("config/config.yaml")?;
//! let ingestion = manager.data_ingestion_config()?;
//! println!("raw snapshot goes to {}", ingestion.raw_path.display());
//! ```

use crate::error::{ProcessingError, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default location of the configuration document.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

fn default_test_size() -> f64 {
    0.2
}

fn default_random_seed() -> u64 {
    42
}

fn default_table() -> String {
    "laptop".to_string()
}

fn default_cv_folds() -> usize {
    5
}

fn default_n_jobs() -> i32 {
    -1
}

/// Settings for the data ingestion stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataIngestionConfig {
    /// Directory holding the raw snapshot and both splits.
    pub root_dir: PathBuf,
    /// Raw snapshot of the source table.
    pub raw_path: PathBuf,
    /// Training split.
    pub train_path: PathBuf,
    /// Test split.
    pub test_path: PathBuf,
    /// Fraction of rows held out for testing, in (0, 1).
    /// Default: 0.2
    #[serde(default = "default_test_size")]
    pub test_size: f64,
    /// Seed for the split permutation.
    /// Default: 42
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,
    /// Source table queried by the relational source.
    /// Default: "laptop"
    #[serde(default = "default_table")]
    pub table: String,
}

/// Settings for the data transformation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTransformationConfig {
    pub root_dir: PathBuf,
    /// Fitted transformer (binary).
    pub preprocessor_path: PathBuf,
    /// Transformed training array (CSV, target last).
    pub train_arr_path: PathBuf,
    /// Transformed test array (CSV, target last).
    pub test_arr_path: PathBuf,
}

/// Hyperparameter grid searched by the model trainer.
///
/// The defaults reproduce the grid the pipeline has always searched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
    /// Number of boosting rounds (trees).
    pub n_estimators: Vec<usize>,
    /// Maximum depth of each tree.
    pub max_depth: Vec<u32>,
    /// Shrinkage applied to each tree's contribution.
    pub learning_rate: Vec<f64>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            n_estimators: vec![10, 50, 100, 200, 400, 450, 500],
            max_depth: vec![3, 5, 7, 9, 11],
            learning_rate: vec![1e-2, 1e-1, 1.0],
        }
    }
}

impl ParamGrid {
    /// Number of candidate configurations in the grid.
    pub fn len(&self) -> usize {
        self.n_estimators.len() * self.max_depth.len() * self.learning_rate.len()
    }

    /// Whether any axis of the grid is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Settings for the model building stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBuildingConfig {
    pub root_dir: PathBuf,
    /// Trained model (binary).
    pub model_path: PathBuf,
    /// Metric document for the training split.
    pub train_metrics_path: PathBuf,
    /// Metric document for the test split.
    pub test_metrics_path: PathBuf,
    /// Number of cross-validation folds.
    /// Default: 5
    #[serde(default = "default_cv_folds")]
    pub cv_folds: usize,
    /// Worker threads for the grid search (-1 = all cores).
    /// Default: -1
    #[serde(default = "default_n_jobs")]
    pub n_jobs: i32,
    #[serde(default)]
    pub param_grid: ParamGrid,
}

/// The whole configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root directory for every artifact the pipeline writes.
    pub artifacts_root: PathBuf,
    pub data_ingestion: DataIngestionConfig,
    pub data_transformation: DataTransformationConfig,
    pub model: ModelBuildingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::rooted_at("artifacts")
    }
}

impl PipelineConfig {
    /// Lay out the conventional artifact tree under `root`.
    ///
    /// ```text
    /// <root>/data_ingestion/{raw,train,test}.csv
    /// <root>/data_transformation/{preprocessor.bin,train_arr.csv,test_arr.csv}
    /// <root>/model/{model.bin,train_metrics.json,test_metrics.json}
    /// ```
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let ingestion_dir = root.join("data_ingestion");
        let transformation_dir = root.join("data_transformation");
        let model_dir = root.join("model");

        Self {
            data_ingestion: DataIngestionConfig {
                raw_path: ingestion_dir.join("raw.csv"),
                train_path: ingestion_dir.join("train.csv"),
                test_path: ingestion_dir.join("test.csv"),
                test_size: default_test_size(),
                random_seed: default_random_seed(),
                table: default_table(),
                root_dir: ingestion_dir,
            },
            data_transformation: DataTransformationConfig {
                preprocessor_path: transformation_dir.join("preprocessor.bin"),
                train_arr_path: transformation_dir.join("train_arr.csv"),
                test_arr_path: transformation_dir.join("test_arr.csv"),
                root_dir: transformation_dir,
            },
            model: ModelBuildingConfig {
                model_path: model_dir.join("model.bin"),
                train_metrics_path: model_dir.join("train_metrics.json"),
                test_metrics_path: model_dir.join("test_metrics.json"),
                cv_folds: default_cv_folds(),
                n_jobs: default_n_jobs(),
                param_grid: ParamGrid::default(),
                root_dir: model_dir,
            },
            artifacts_root: root,
        }
    }

    /// Parse a configuration document from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Err(ProcessingError::InvalidConfig(
                "configuration file is empty".to_string(),
            ));
        }
        let config: PipelineConfig = serde_yaml::from_str(content)?;
        config
            .validate()
            .map_err(|e| ProcessingError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        let test_size = self.data_ingestion.test_size;
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(ConfigValidationError::InvalidTestSize(test_size));
        }

        if self.model.cv_folds < 2 {
            return Err(ConfigValidationError::InvalidCvFolds(self.model.cv_folds));
        }

        let grid = &self.model.param_grid;
        for (axis, empty) in [
            ("n_estimators", grid.n_estimators.is_empty()),
            ("max_depth", grid.max_depth.is_empty()),
            ("learning_rate", grid.learning_rate.is_empty()),
        ] {
            if empty {
                return Err(ConfigValidationError::EmptyGridAxis(axis.to_string()));
            }
        }

        if let Some(&n) = grid.n_estimators.iter().find(|&&n| n == 0) {
            return Err(ConfigValidationError::InvalidGridValue {
                axis: "n_estimators".to_string(),
                value: n as f64,
            });
        }
        if let Some(&d) = grid.max_depth.iter().find(|&&d| d == 0) {
            return Err(ConfigValidationError::InvalidGridValue {
                axis: "max_depth".to_string(),
                value: d as f64,
            });
        }
        if let Some(&lr) = grid
            .learning_rate
            .iter()
            .find(|&&lr| !(lr.is_finite() && lr > 0.0))
        {
            return Err(ConfigValidationError::InvalidGridValue {
                axis: "learning_rate".to_string(),
                value: lr,
            });
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid test_size: {0} (must be between 0.0 and 1.0, exclusive)")]
    InvalidTestSize(f64),

    #[error("Invalid cv_folds: {0} (must be at least 2)")]
    InvalidCvFolds(usize),

    #[error("Parameter grid axis '{0}' is empty")]
    EmptyGridAxis(String),

    #[error("Invalid value {value} in parameter grid axis '{axis}'")]
    InvalidGridValue { axis: String, value: f64 },
}

/// Loads the configuration document and prepares stage directories.
#[derive(Debug, Clone)]
pub struct ConfigurationManager {
    config: PipelineConfig,
}

impl ConfigurationManager {
    /// Read, parse and validate the configuration at `path`, then create the
    /// artifacts root.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .context(format!("Reading configuration file {}", path.display()))?;
        let config = PipelineConfig::from_yaml_str(&content)
            .context(format!("Loading configuration file {}", path.display()))?;
        info!("Configuration file loaded: {}", path.display());
        Self::new(config)
    }

    /// Wrap an already-built configuration and create the artifacts root.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| ProcessingError::InvalidConfig(e.to_string()))?;
        create_directories(&[&config.artifacts_root])?;
        Ok(Self { config })
    }

    /// The full configuration document.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Ingestion settings; creates the stage directory.
    pub fn data_ingestion_config(&self) -> Result<DataIngestionConfig> {
        let config = self.config.data_ingestion.clone();
        create_directories(&[&config.root_dir])?;
        debug!("Data ingestion directory ready: {}", config.root_dir.display());
        Ok(config)
    }

    /// Transformation settings; creates the stage directory.
    pub fn data_transformation_config(&self) -> Result<DataTransformationConfig> {
        let config = self.config.data_transformation.clone();
        create_directories(&[&config.root_dir])?;
        debug!(
            "Data transformation directory ready: {}",
            config.root_dir.display()
        );
        Ok(config)
    }

    /// Model building settings; creates the stage directory.
    pub fn model_building_config(&self) -> Result<ModelBuildingConfig> {
        let config = self.config.model.clone();
        create_directories(&[&config.root_dir])?;
        debug!("Model directory ready: {}", config.root_dir.display());
        Ok(config)
    }
}

/// Create every directory in `dirs` (and parents) if missing.
pub fn create_directories(dirs: &[&Path]) -> Result<()> {
    for dir in dirs {
        fs::create_dir_all(dir).context(format!("Creating directory {}", dir.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MINIMAL: &str = r#"
artifacts_root: artifacts
data_ingestion:
  root_dir: artifacts/data_ingestion
  raw_path: artifacts/data_ingestion/raw.csv
  train_path: artifacts/data_ingestion/train.csv
  test_path: artifacts/data_ingestion/test.csv
data_transformation:
  root_dir: artifacts/data_transformation
  preprocessor_path: artifacts/data_transformation/preprocessor.bin
  train_arr_path: artifacts/data_transformation/train_arr.csv
  test_arr_path: artifacts/data_transformation/test_arr.csv
model:
  root_dir: artifacts/model
  model_path: artifacts/model/model.bin
  train_metrics_path: artifacts/model/train_metrics.json
  test_metrics_path: artifacts/model/test_metrics.json
"#;

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let config = PipelineConfig::from_yaml_str(MINIMAL).unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.model.param_grid.len(), 105);
    }

    #[test]
    fn test_custom_grid() {
        let yaml = format!(
            "{MINIMAL}  cv_folds: 3\n  param_grid:\n    n_estimators: [5]\n    max_depth: [2, 3]\n    learning_rate: [0.1]\n"
        );
        let config = PipelineConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(config.model.cv_folds, 3);
        assert_eq!(config.model.param_grid.max_depth, vec![2, 3]);
        assert_eq!(config.model.param_grid.len(), 2);
    }

    #[test]
    fn test_empty_document_rejected() {
        let err = PipelineConfig::from_yaml_str("   \n").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_malformed_document_rejected() {
        let err = PipelineConfig::from_yaml_str("artifacts_root: [unterminated").unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_missing_section_rejected() {
        let err = PipelineConfig::from_yaml_str("artifacts_root: artifacts\n").unwrap_err();
        assert_eq!(err.error_code(), "YAML_ERROR");
    }

    #[test]
    fn test_validation_invalid_test_size() {
        let mut config = PipelineConfig::default();
        config.data_ingestion.test_size = 1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidTestSize(_))
        ));
    }

    #[test]
    fn test_validation_invalid_cv_folds() {
        let mut config = PipelineConfig::default();
        config.model.cv_folds = 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidCvFolds(1))
        ));
    }

    #[test]
    fn test_validation_empty_grid_axis() {
        let mut config = PipelineConfig::default();
        config.model.param_grid.learning_rate.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::EmptyGridAxis(axis)) if axis == "learning_rate"
        ));
    }

    #[test]
    fn test_validation_non_positive_learning_rate() {
        let mut config = PipelineConfig::default();
        config.model.param_grid.learning_rate = vec![0.1, 0.0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_manager_creates_stage_directories() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigurationManager::new(PipelineConfig::rooted_at(dir.path())).unwrap();

        let ingestion = manager.data_ingestion_config().unwrap();
        let transformation = manager.data_transformation_config().unwrap();
        let model = manager.model_building_config().unwrap();

        assert!(ingestion.root_dir.is_dir());
        assert!(transformation.root_dir.is_dir());
        assert!(model.root_dir.is_dir());
        assert_eq!(ingestion.raw_path, dir.path().join("data_ingestion/raw.csv"));
    }

    #[test]
    fn test_manager_from_missing_file() {
        let err = ConfigurationManager::from_file("does/not/exist.yaml").unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }
}
