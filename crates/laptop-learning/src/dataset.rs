//! Row-major training data extracted from transformed arrays.

use crate::error::{LearningError, Result};
use laptop_processing::TARGET_COLUMN;
use polars::prelude::*;

/// Feature rows plus target, validated for training.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub feature_names: Vec<String>,
    pub features: Vec<Vec<f64>>,
    pub target: Vec<f64>,
}

impl Dataset {
    /// Build from a transformed array whose last column is the target.
    pub fn from_array(df: &DataFrame) -> Result<Self> {
        let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
        if names.last().map(String::as_str) != Some(TARGET_COLUMN) {
            return Err(LearningError::TargetNotFound(TARGET_COLUMN.to_string()));
        }

        let mut columns = float_columns(df)?;
        let target = columns.pop().unwrap_or_default();
        let features = transpose(&columns, df.height());

        let mut feature_names = names;
        feature_names.pop();

        let dataset = Self {
            feature_names,
            features,
            target,
        };
        dataset.validate()?;
        Ok(dataset)
    }

    /// Build from already-extracted rows.
    pub fn from_rows(
        feature_names: Vec<String>,
        features: Vec<Vec<f64>>,
        target: Vec<f64>,
    ) -> Result<Self> {
        let dataset = Self {
            feature_names,
            features,
            target,
        };
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Rows selected by `indices`, with their targets.
    pub fn subset(&self, indices: impl IntoIterator<Item = usize>) -> (Vec<Vec<f64>>, Vec<f64>) {
        indices
            .into_iter()
            .map(|i| (self.features[i].clone(), self.target[i]))
            .unzip()
    }

    fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(LearningError::InvalidData("dataset has no rows".to_string()));
        }
        if self.n_features() == 0 {
            return Err(LearningError::InvalidData("dataset has no feature columns".to_string()));
        }
        if self.features.len() != self.target.len() {
            return Err(LearningError::InvalidData(format!(
                "{} feature rows but {} targets",
                self.features.len(),
                self.target.len()
            )));
        }
        for (i, row) in self.features.iter().enumerate() {
            if row.len() != self.n_features() {
                return Err(LearningError::InvalidData(format!(
                    "row {i} has {} features, expected {}",
                    row.len(),
                    self.n_features()
                )));
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(LearningError::InvalidData(format!(
                    "row {i} contains a missing or non-finite feature"
                )));
            }
        }
        if let Some(i) = self.target.iter().position(|v| !v.is_finite()) {
            return Err(LearningError::InvalidData(format!(
                "target at row {i} is missing or non-finite"
            )));
        }
        Ok(())
    }
}

/// Every column as `f64`, missing cells as NaN.
fn float_columns(df: &DataFrame) -> Result<Vec<Vec<f64>>> {
    let mut columns = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        let values = column
            .as_materialized_series()
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect::<Vec<f64>>();
        columns.push(values);
    }
    Ok(columns)
}

fn transpose(columns: &[Vec<f64>], height: usize) -> Vec<Vec<f64>> {
    (0..height)
        .map(|row| columns.iter().map(|col| col[row]).collect())
        .collect()
}

/// Row-major feature matrix of a transformed table without a target column.
pub fn feature_rows(df: &DataFrame) -> Result<Vec<Vec<f64>>> {
    let rows = transpose(&float_columns(df)?, df.height());
    if rows.iter().flatten().any(|v| !v.is_finite()) {
        return Err(LearningError::InvalidData(
            "transformed features contain missing or non-finite values".to_string(),
        ));
    }
    Ok(rows)
}
