//! Unit normalization for raw catalog tables.
//!
//! The source table stores `Ram` as text such as `"8GB"` and `Weight` as
//! text such as `"1.5kg"`. Both must become plain numbers before the feature
//! transformer sees them:
//!
//! - `Ram` → Int64 gigabytes
//! - `Weight` → Float64 kilograms
//!
//! Suffixes are matched case-insensitively and surrounding whitespace is
//! ignored. Columns that are already numeric are cast rather than parsed, so
//! normalizing twice yields the same table. Empty strings and nulls stay null
//! and are imputed later.

mod converters;

use crate::error::{Result, ResultExt};
use crate::types::{RAM, WEIGHT};
use crate::utils::require_column;
use converters::{ram_to_gigabytes, weight_to_kilograms};
use polars::prelude::*;
use tracing::debug;

/// Strip unit suffixes from `Ram` and `Weight`, leaving other columns untouched.
pub fn normalize_units(df: &DataFrame) -> Result<DataFrame> {
    let mut out = df.clone();

    let ram = ram_to_gigabytes(require_column(df, RAM)?)?;
    out.replace(RAM, ram).context("Replacing Ram column")?;

    let weight = weight_to_kilograms(require_column(df, WEIGHT)?)?;
    out.replace(WEIGHT, weight).context("Replacing Weight column")?;

    debug!("Normalized unit columns for {} rows", out.height());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw_frame() -> DataFrame {
        df!(
            "Company" => &["Apple", "HP", "Dell"],
            "Ram" => &[Some("8GB"), Some("16GB"), None],
            "Weight" => &[Some("1.37kg"), Some(""), Some("2.2kg")],
        )
        .unwrap()
    }

    #[test]
    fn test_normalize_units() {
        let df = normalize_units(&raw_frame()).unwrap();

        assert_eq!(df.column(RAM).unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column(WEIGHT).unwrap().dtype(), &DataType::Float64);
        let ram: Vec<Option<i64>> = df.column(RAM).unwrap().i64().unwrap().into_iter().collect();
        assert_eq!(ram, vec![Some(8), Some(16), None]);
        let weight: Vec<Option<f64>> =
            df.column(WEIGHT).unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(weight, vec![Some(1.37), None, Some(2.2)]);
        assert_eq!(df.column("Company").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_normalize_units_idempotent() {
        let once = normalize_units(&raw_frame()).unwrap();
        let twice = normalize_units(&once).unwrap();
        assert!(once.equals_missing(&twice));
    }

    #[test]
    fn test_normalize_units_missing_column() {
        let df = df!("Ram" => &["8GB"]).unwrap();
        let err = normalize_units(&df).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }
}
