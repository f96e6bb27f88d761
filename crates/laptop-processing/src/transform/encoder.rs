//! Ordinal encoding of categorical values.
//!
//! Each distinct value seen during fit gets its index in sorted order.
//! Values never seen during fit map to [`UNKNOWN_CATEGORY`].

use serde::{Deserialize, Serialize};

/// Code assigned to categories absent from the fitted vocabulary.
pub const UNKNOWN_CATEGORY: f64 = -1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdinalEncoder {
    /// Sorted, deduplicated vocabulary.
    pub categories: Vec<String>,
}

impl OrdinalEncoder {
    pub fn fit(values: &[String]) -> Self {
        let mut categories = values.to_vec();
        categories.sort();
        categories.dedup();
        Self { categories }
    }

    pub fn encode(&self, value: &str) -> f64 {
        match self
            .categories
            .binary_search_by(|probe| probe.as_str().cmp(value))
        {
            Ok(idx) => idx as f64,
            Err(_) => UNKNOWN_CATEGORY,
        }
    }

    pub fn transform(&self, values: &[String]) -> Vec<f64> {
        values.iter().map(|v| self.encode(v)).collect()
    }
}
