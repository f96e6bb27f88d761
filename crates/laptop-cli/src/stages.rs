//! Stage runners behind the subcommands.
//!
//! Each runner takes what the previous stage produced and hands its own
//! artifacts to the next one.

use crate::form::FormOptions;
use crate::prompt;
use anyhow::{Context, Result};
use laptop_learning::{ModelArtifacts, PredictionService, run_model_building};
use laptop_processing::{
    ConfigurationManager, CsvSource, DatabaseSettings, IngestionArtifacts, MySqlSource,
    RecordSource, TransformationArtifacts, run_data_ingestion, run_data_transformation,
};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Where raw records come from.
#[derive(Debug, Clone)]
pub enum SourceChoice {
    /// MySQL, configured from the environment.
    Database,
    /// A CSV snapshot on disk.
    Csv(PathBuf),
}

impl SourceChoice {
    pub fn from_arg(source_csv: Option<PathBuf>) -> Self {
        source_csv.map_or(Self::Database, Self::Csv)
    }

    fn open(&self, table: &str) -> Result<Box<dyn RecordSource>> {
        Ok(match self {
            Self::Csv(path) => Box::new(CsvSource::new(path)),
            Self::Database => {
                let settings = DatabaseSettings::from_env()
                    .context("reading database settings from the environment")?;
                Box::new(MySqlSource::new(settings, table)?)
            }
        })
    }
}

fn stage<T>(name: &str, run: impl FnOnce() -> Result<T>) -> Result<T> {
    info!(">>>>>> {} stage started <<<<<<", name);
    match run() {
        Ok(value) => {
            info!(">>>>>> {} stage completed <<<<<<", name);
            Ok(value)
        }
        Err(e) => {
            error!("{} stage failed: {:#}", name, e);
            Err(e.context(format!("{name} stage failed")))
        }
    }
}

pub fn ingest(manager: &ConfigurationManager, source: &SourceChoice) -> Result<IngestionArtifacts> {
    stage("Data Ingestion", || {
        let config = manager.data_ingestion_config()?;
        let source = source.open(&config.table)?;
        Ok(run_data_ingestion(&*source, &config)?)
    })
}

pub fn transform(
    manager: &ConfigurationManager,
    ingestion: &IngestionArtifacts,
) -> Result<TransformationArtifacts> {
    stage("Data Transformation", || {
        let config = manager.data_transformation_config()?;
        Ok(run_data_transformation(&config, ingestion)?)
    })
}

pub fn train(
    manager: &ConfigurationManager,
    arrays: &TransformationArtifacts,
) -> Result<ModelArtifacts> {
    stage("Model Building", || {
        let config = manager.model_building_config()?;
        let artifacts = run_model_building(&config, arrays)?;
        println!(
            "Best params: {}\nCV R²: {:.4}\nTrain R²: {:.4}\nTest R²: {:.4}",
            artifacts.result.best_params,
            artifacts.result.cv_score,
            artifacts.result.train_metrics.r2,
            artifacts.result.test_metrics.r2
        );
        Ok(artifacts)
    })
}

/// Ingest, transform and train in one go.
pub fn run_all(manager: &ConfigurationManager, source: &SourceChoice) -> Result<ModelArtifacts> {
    let ingestion = ingest(manager, source)?;
    let arrays = transform(manager, &ingestion)?;
    train(manager, &arrays)
}

/// Transform the split files left by an earlier ingestion run.
pub fn transform_existing(manager: &ConfigurationManager) -> Result<TransformationArtifacts> {
    let ingestion = IngestionArtifacts::from_config(&manager.data_ingestion_config()?);
    require_file(&ingestion.train_path, "ingest")?;
    require_file(&ingestion.test_path, "ingest")?;
    transform(manager, &ingestion)
}

/// Train on the arrays left by an earlier transformation run.
pub fn train_existing(manager: &ConfigurationManager) -> Result<ModelArtifacts> {
    let config = manager.data_transformation_config()?;
    require_file(&config.train_arr_path, "transform")?;
    let arrays = TransformationArtifacts::load(&config)?;
    train(manager, &arrays)
}

/// Interactive prediction over the persisted artifacts.
pub fn predict(manager: &ConfigurationManager) -> Result<()> {
    let ingestion = manager.data_ingestion_config()?;
    let options = FormOptions::load(&ingestion.raw_path)
        .with_context(|| format!("loading form choices from {}", ingestion.raw_path.display()))?;
    let service = PredictionService::from_config(
        &manager.data_transformation_config()?,
        &manager.model_building_config()?,
    );
    prompt::run_session(&options, &service)?;
    Ok(())
}

fn require_file(path: &Path, producer: &str) -> Result<()> {
    if !path.exists() {
        anyhow::bail!(
            "{} does not exist; run the `{producer}` command first",
            path.display()
        );
    }
    Ok(())
}
