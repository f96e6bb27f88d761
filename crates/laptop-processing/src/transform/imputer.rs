//! Most-frequent imputation.
//!
//! Missing cells are replaced with the value seen most often during fit.
//! Ties resolve to the smallest value so refitting on the same data always
//! yields the same statistic.

use crate::error::{ProcessingError, Result};
use crate::utils::{numeric_mode, string_mode};
use serde::{Deserialize, Serialize};

/// Fitted imputer for a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericImputer {
    pub fill_value: f64,
}

impl NumericImputer {
    pub fn fit(column: &str, values: &[Option<f64>]) -> Result<Self> {
        numeric_mode(values)
            .map(|fill_value| Self { fill_value })
            .ok_or_else(|| no_values(column))
    }

    pub fn transform(&self, values: &[Option<f64>]) -> Vec<f64> {
        values.iter().map(|v| v.unwrap_or(self.fill_value)).collect()
    }
}

/// Fitted imputer for a categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalImputer {
    pub fill_value: String,
}

impl CategoricalImputer {
    pub fn fit(column: &str, values: &[Option<String>]) -> Result<Self> {
        string_mode(values)
            .map(|fill_value| Self { fill_value })
            .ok_or_else(|| no_values(column))
    }

    pub fn transform(&self, values: &[Option<String>]) -> Vec<String> {
        values
            .iter()
            .map(|v| v.clone().unwrap_or_else(|| self.fill_value.clone()))
            .collect()
    }
}

fn no_values(column: &str) -> ProcessingError {
    ProcessingError::EmptyDataset(format!("column '{column}' has no non-missing values"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_numeric_imputer_fills_with_mode() {
        let values = vec![Some(8.0), None, Some(16.0), Some(8.0)];
        let imputer = NumericImputer::fit("Ram", &values).unwrap();
        assert_eq!(imputer.fill_value, 8.0);
        assert_eq!(imputer.transform(&values), vec![8.0, 8.0, 16.0, 8.0]);
    }

    #[test]
    fn test_numeric_imputer_all_missing() {
        let err = NumericImputer::fit("Weight", &[None, None]).unwrap_err();
        assert_eq!(err.error_code(), "EMPTY_DATASET");
        assert!(err.to_string().contains("Weight"));
    }

    #[test]
    fn test_categorical_imputer_fills_with_mode() {
        let values = vec![
            Some("Windows 10".to_string()),
            None,
            Some("Linux".to_string()),
            Some("Windows 10".to_string()),
        ];
        let imputer = CategoricalImputer::fit("OpSys", &values).unwrap();
        assert_eq!(imputer.fill_value, "Windows 10");
        assert_eq!(imputer.transform(&values)[1], "Windows 10");
    }
}
