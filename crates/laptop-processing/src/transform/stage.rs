//! Data transformation stage.

use super::FeatureTransformer;
use crate::cleaner::normalize_units;
use crate::config::DataTransformationConfig;
use crate::error::{ProcessingError, Result, ResultExt};
use crate::ingestion::IngestionArtifacts;
use crate::types::TARGET_COLUMN;
use crate::utils::{numeric_values, read_csv, require_column, write_csv};
use polars::prelude::*;
use std::path::PathBuf;
use tracing::info;

/// Output of the transformation stage.
///
/// Both arrays hold the transformed features followed by the untouched
/// target as their last column.
#[derive(Debug, Clone)]
pub struct TransformationArtifacts {
    pub preprocessor_path: PathBuf,
    pub train_arr_path: PathBuf,
    pub test_arr_path: PathBuf,
    pub train: DataFrame,
    pub test: DataFrame,
}

impl TransformationArtifacts {
    /// Re-read the arrays a previous run persisted.
    pub fn load(config: &DataTransformationConfig) -> Result<Self> {
        let train = read_csv(&config.train_arr_path)?;
        let test = read_csv(&config.test_arr_path)?;
        for (name, df) in [("train", &train), ("test", &test)] {
            let last = df.get_column_names().last().map(|n| n.to_string());
            if last.as_deref() != Some(TARGET_COLUMN) {
                return Err(ProcessingError::ColumnNotFound(TARGET_COLUMN.to_string())
                    .with_context(format!("{name} array must end with the target column")));
            }
        }
        Ok(Self {
            preprocessor_path: config.preprocessor_path.clone(),
            train_arr_path: config.train_arr_path.clone(),
            test_arr_path: config.test_arr_path.clone(),
            train,
            test,
        })
    }
}

/// Separate the target column from `df`.
///
/// Every row must carry a target value.
pub fn split_target(df: &DataFrame) -> Result<(DataFrame, Vec<f64>)> {
    let values = numeric_values(require_column(df, TARGET_COLUMN)?)?;
    let mut target = Vec::with_capacity(values.len());
    for (row, value) in values.into_iter().enumerate() {
        let value = value.ok_or_else(|| ProcessingError::TypeConversionFailed {
            column: TARGET_COLUMN.to_string(),
            target_type: "Float64".to_string(),
            reason: format!("missing target value at row {row}"),
        })?;
        target.push(value);
    }
    let features = df.drop(TARGET_COLUMN)?;
    Ok((features, target))
}

fn with_target(mut features: DataFrame, target: Vec<f64>) -> Result<DataFrame> {
    features
        .with_column(Column::new(TARGET_COLUMN.into(), target))
        .context("Appending target column")?;
    Ok(features)
}

/// Run the transformation stage: normalize, fit on train, transform both
/// splits, persist the transformer and both arrays.
pub fn run_data_transformation(
    config: &DataTransformationConfig,
    ingestion: &IngestionArtifacts,
) -> Result<TransformationArtifacts> {
    info!("Data transformation started");

    let train =
        normalize_units(&read_csv(&ingestion.train_path)?).context("Normalizing train split")?;
    let test =
        normalize_units(&read_csv(&ingestion.test_path)?).context("Normalizing test split")?;

    let (train_features, train_target) = split_target(&train)?;
    let (test_features, test_target) = split_target(&test)?;

    let (fitted, train_out) = FeatureTransformer::new()
        .fit_transform(&train_features)
        .context("Fitting feature transformer")?;
    let test_out = fitted
        .transform(&test_features)
        .context("Transforming test split")?;

    let mut train_arr = with_target(train_out, train_target)?;
    let mut test_arr = with_target(test_out, test_target)?;

    fitted.save(&config.preprocessor_path)?;
    write_csv(&mut train_arr, &config.train_arr_path)?;
    write_csv(&mut test_arr, &config.test_arr_path)?;

    info!(
        "Data transformation completed: train {:?}, test {:?}, preprocessor saved to {}",
        train_arr.shape(),
        test_arr.shape(),
        config.preprocessor_path.display()
    );

    Ok(TransformationArtifacts {
        preprocessor_path: config.preprocessor_path.clone(),
        train_arr_path: config.train_arr_path.clone(),
        test_arr_path: config.test_arr_path.clone(),
        train: train_arr,
        test: test_arr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_target() {
        let df = df!(
            "Inches" => &[13.3, 15.6],
            "Price_euros" => &[1339.69, 575.0],
        )
        .unwrap();
        let (features, target) = split_target(&df).unwrap();
        assert_eq!(features.width(), 1);
        assert!(features.column("Inches").is_ok());
        assert_eq!(target, vec![1339.69, 575.0]);
    }

    #[test]
    fn test_split_target_missing_value() {
        let df = df!("Price_euros" => &[Some(1.0), None]).unwrap();
        let err = split_target(&df).unwrap_err();
        assert_eq!(err.error_code(), "TYPE_CONVERSION_FAILED");
    }

    #[test]
    fn test_split_target_absent() {
        let df = df!("Inches" => &[13.3]).unwrap();
        let err = split_target(&df).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_load_rejects_array_without_target() {
        let dir = tempfile::tempdir().unwrap();
        let config = crate::config::PipelineConfig::rooted_at(dir.path()).data_transformation;
        let mut df = df!("num__Inches" => &[0.0]).unwrap();
        write_csv(&mut df, &config.train_arr_path).unwrap();
        write_csv(&mut df, &config.test_arr_path).unwrap();

        let err = TransformationArtifacts::load(&config).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }
}
