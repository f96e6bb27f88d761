//! Standard scaling (z-score).
//!
//! ```text
//! z = (x - mean) / std
//! ```
//!
//! `std` is the population standard deviation of the fitted values. A
//! column with zero variance is scaled by 1 so its output is all zeros.

use crate::utils::mean_and_std;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: f64,
    pub scale: f64,
}

impl StandardScaler {
    /// Fit on `values`; `None` when there is nothing to fit.
    pub fn fit(values: &[f64]) -> Option<Self> {
        let (mean, std) = mean_and_std(values)?;
        let scale = if std > f64::EPSILON { std } else { 1.0 };
        Some(Self { mean, scale })
    }

    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|v| (v - self.mean) / self.scale).collect()
    }
}
