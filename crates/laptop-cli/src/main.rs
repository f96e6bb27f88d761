//! laptop-price: command line front end of the laptop price pipeline.
//!
//! Runs the training stages (ingest, transform, train) and serves the
//! interactive prediction form.

mod currency;
mod form;
mod logging;
mod prompt;
mod stages;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use laptop_processing::{ConfigurationManager, DEFAULT_CONFIG_PATH};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::logging::LogOptions;
use crate::stages::SourceChoice;

/// Laptop price prediction pipeline
#[derive(Parser, Debug)]
#[command(name = "laptop-price", version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log filter directive (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Directory for per-run log files
    #[arg(long, global = true, default_value = "logs")]
    log_dir: PathBuf,

    /// Only show warnings and errors on the console
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest, transform and train in one go
    Run {
        /// Read records from a CSV snapshot instead of MySQL
        #[arg(long)]
        source_csv: Option<PathBuf>,
    },
    /// Fetch records, save the raw snapshot and the train/test split
    Ingest {
        /// Read records from a CSV snapshot instead of MySQL
        #[arg(long)]
        source_csv: Option<PathBuf>,
    },
    /// Fit the feature transformer and write the transformed arrays
    Transform,
    /// Grid-search the model and write it with its metrics
    Train,
    /// Fill in the prediction form interactively
    Predict,
}

fn main() -> anyhow::Result<()> {
    // Database settings may live in a .env file
    dotenv().ok();

    let cli = Cli::parse();
    let log = logging::init(&LogOptions {
        level: cli.log_level.clone(),
        log_dir: cli.log_dir.clone(),
        quiet: cli.quiet,
    })?;
    info!("Logging to {}", log.file.display());

    let result = run(cli);
    if let Err(e) = &result {
        error!("{:#}", e);
    }
    drop(log);
    result
}

/// Configuration problems are reported apart from I/O failures.
fn load_config(path: &Path) -> anyhow::Result<ConfigurationManager> {
    ConfigurationManager::from_file(path).map_err(|e| {
        if e.is_config_error() {
            anyhow::anyhow!("invalid configuration [{}]: {e}", e.error_code())
        } else {
            anyhow::Error::new(e).context(format!("loading configuration {}", path.display()))
        }
    })
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let manager = load_config(&cli.config)?;

    match cli.command {
        Commands::Run { source_csv } => {
            stages::run_all(&manager, &SourceChoice::from_arg(source_csv))?;
        }
        Commands::Ingest { source_csv } => {
            stages::ingest(&manager, &SourceChoice::from_arg(source_csv))?;
        }
        Commands::Transform => {
            stages::transform_existing(&manager)?;
        }
        Commands::Train => {
            stages::train_existing(&manager)?;
        }
        Commands::Predict => stages::predict(&manager)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "laptop-price",
            "run",
            "--source-csv",
            "data/laptops.csv",
            "--quiet",
            "--config",
            "custom.yaml",
        ])
        .unwrap();

        assert!(cli.quiet);
        assert_eq!(cli.config, PathBuf::from("custom.yaml"));
        assert!(matches!(
            cli.command,
            Commands::Run { source_csv: Some(ref p) } if p == &PathBuf::from("data/laptops.csv")
        ));
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["laptop-price", "train"]).unwrap();
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert_eq!(cli.log_level, "info");
        assert!(!cli.quiet);
    }

    #[test]
    fn test_load_config_reports_invalid_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "model: [not, a, mapping").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().starts_with("invalid configuration [YAML_ERROR]"));
    }

    #[test]
    fn test_load_config_missing_file_is_not_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().starts_with("loading configuration"));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["laptop-price"]).is_err());
    }
}
