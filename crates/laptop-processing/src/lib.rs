//! Laptop Price Processing Library
//!
//! Data-side stages of the laptop price pipeline, built on Polars.
//!
//! # Overview
//!
//! - **Configuration**: YAML document with one section per stage ([`config`])
//! - **Data Ingestion**: MySQL or CSV source, raw snapshot, seeded train/test split ([`ingestion`])
//! - **Unit Normalization**: `"8GB"` → `8`, `"1.5kg"` → `1.5` ([`cleaner`])
//! - **Feature Transformation**: impute, encode and scale into a fixed-width table ([`transform`])
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use laptop_processing::{ConfigurationManager, CsvSource, run_data_ingestion, run_data_transformation};
//!
//! let manager = ConfigurationManager::from_file("config/config.yaml")?;
//!
//! let ingestion_config = manager.data_ingestion_config()?;
//! let source = CsvSource::new("data/laptop_price.csv");
//! let ingestion = run_data_ingestion(&source, &ingestion_config)?;
//!
//! let transformation = run_data_transformation(&manager.data_transformation_config()?, &ingestion)?;
//! println!("train array: {:?}", transformation.train.shape());
//! ```
//!
//! Model training and prediction live in the `laptop-learning` crate.

pub mod cleaner;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod transform;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::normalize_units;
pub use config::{
    ConfigValidationError, ConfigurationManager, DEFAULT_CONFIG_PATH, DataIngestionConfig,
    DataTransformationConfig, ModelBuildingConfig, ParamGrid, PipelineConfig,
};
pub use error::{ProcessingError, Result as ProcessingResult, ResultExt};
pub use ingestion::{
    CsvSource, DatabaseSettings, IngestionArtifacts, MySqlSource, RecordSource,
    run_data_ingestion, train_test_split,
};
pub use transform::{
    FeatureTransformer, FittedTransformer, TransformationArtifacts, run_data_transformation,
    split_target,
};
pub use types::{
    CATEGORICAL_FEATURES, FEATURE_COLUMNS, FEATURE_COUNT, LaptopRecord, NUMERIC_FEATURES,
    TARGET_COLUMN,
};
pub use utils::{read_csv, write_csv};
