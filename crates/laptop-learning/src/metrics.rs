//! Regression metrics.
//!
//! All functions expect slices of equal, non-zero length; callers validate
//! shapes before scoring.

use crate::error::{LearningError, Result};
use crate::types::{HyperParams, RegressionMetrics};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::path::Path;

/// Mean of squared residuals.
pub fn mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let n = y_true.len() as f64;
    y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / n
}

/// Mean of absolute residuals.
pub fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let n = y_true.len() as f64;
    y_true.iter().zip(y_pred).map(|(t, p)| (t - p).abs()).sum::<f64>() / n
}

/// Coefficient of determination.
///
/// With a constant `y_true` the score is 1.0 for a perfect fit and 0.0
/// otherwise.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let n = y_true.len() as f64;
    let mean = y_true.iter().sum::<f64>() / n;
    let ss_res: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).powi(2)).sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        if ss_res == 0.0 { 1.0 } else { 0.0 }
    } else {
        1.0 - ss_res / ss_tot
    }
}

impl RegressionMetrics {
    /// Score predictions of a model trained with `params`.
    pub fn evaluate(y_true: &[f64], y_pred: &[f64], params: HyperParams) -> Result<Self> {
        if y_true.is_empty() || y_true.len() != y_pred.len() {
            return Err(LearningError::InvalidData(format!(
                "cannot score {} predictions against {} targets",
                y_pred.len(),
                y_true.len()
            )));
        }
        Ok(Self {
            r2: r2_score(y_true, y_pred),
            mse: mean_squared_error(y_true, y_pred),
            mae: mean_absolute_error(y_true, y_pred),
            params,
        })
    }

    /// Write the metric document as JSON indented by four spaces.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, to_pretty_json(self)?)?;
        Ok(())
    }

    /// Read a metric document written by [`save_json`](Self::save_json).
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser)?;
    Ok(buf)
}
