//! Data ingestion stage.
//!
//! Pulls the catalog table from a [`RecordSource`], persists a raw snapshot,
//! splits it into train/test partitions and persists both.

mod source;
mod split;

pub use source::{CsvSource, DEFAULT_MYSQL_PORT, DatabaseSettings, MySqlSource, RecordSource};
pub use split::{test_row_count, train_test_split};

use crate::config::DataIngestionConfig;
use crate::error::{Result, ResultExt};
use crate::utils::write_csv;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Files written by the ingestion stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionArtifacts {
    pub raw_path: PathBuf,
    pub train_path: PathBuf,
    pub test_path: PathBuf,
    pub train_rows: usize,
    pub test_rows: usize,
}

impl IngestionArtifacts {
    /// Artifact locations for a stage that already ran, without row counts.
    pub fn from_config(config: &DataIngestionConfig) -> Self {
        Self {
            raw_path: config.raw_path.clone(),
            train_path: config.train_path.clone(),
            test_path: config.test_path.clone(),
            train_rows: 0,
            test_rows: 0,
        }
    }
}

/// Run the ingestion stage: fetch, snapshot, split, persist.
pub fn run_data_ingestion(
    source: &dyn RecordSource,
    config: &DataIngestionConfig,
) -> Result<IngestionArtifacts> {
    info!("Data ingestion started from {}", source.describe());

    let mut raw = source.fetch().context("Fetching catalog table")?;
    write_csv(&mut raw, &config.raw_path)?;
    info!("Raw snapshot saved: {}", config.raw_path.display());

    let (mut train, mut test) = train_test_split(&raw, config.test_size, config.random_seed)?;
    write_csv(&mut train, &config.train_path)?;
    write_csv(&mut test, &config.test_path)?;

    info!(
        "Data ingestion completed: {} train rows, {} test rows",
        train.height(),
        test.height()
    );

    Ok(IngestionArtifacts {
        raw_path: config.raw_path.clone(),
        train_path: config.train_path.clone(),
        test_path: config.test_path.clone(),
        train_rows: train.height(),
        test_rows: test.height(),
    })
}
