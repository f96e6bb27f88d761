//! Shared utilities for the processing stages.
//!
//! This module contains common helper functions used across multiple modules
//! to reduce code duplication and ensure consistency.

use crate::error::{ProcessingError, Result, ResultExt};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::cmp::Ordering;
use std::fs::{self, File};
use std::path::Path;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType holds text.
#[inline]
pub fn is_string_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String | DataType::Categorical(_, _))
}

/// Fetch a column as a materialized Series, mapping absence to `ColumnNotFound`.
pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|c| c.as_materialized_series())
        .map_err(|_| ProcessingError::ColumnNotFound(name.to_string()))
}

/// Values of a numeric column as `Option<f64>`, treating NaN as missing.
///
/// A fully blank column is read back from CSV as text (or `Null`); it is
/// accepted here as all-missing.
pub fn numeric_values(series: &Series) -> Result<Vec<Option<f64>>> {
    if series.null_count() == series.len() {
        return Ok(vec![None; series.len()]);
    }
    if !is_numeric_dtype(series.dtype()) {
        return Err(ProcessingError::TypeConversionFailed {
            column: series.name().to_string(),
            target_type: "Float64".to_string(),
            reason: format!("column has non-numeric type {}", series.dtype()),
        });
    }
    let floats = series.cast(&DataType::Float64)?;
    Ok(floats
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

/// Values of a column rendered as text; nulls stay `None`.
pub fn string_values(series: &Series) -> Result<Vec<Option<String>>> {
    let text = series.cast(&DataType::String)?;
    Ok(text
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Most frequent value; ties go to the smallest value.
fn mode_by<T: Clone>(mut values: Vec<T>, cmp: impl Fn(&T, &T) -> Ordering) -> Option<T> {
    values.sort_by(&cmp);

    let mut best: Option<(T, usize)> = None;
    let mut i = 0;
    while i < values.len() {
        let mut j = i + 1;
        while j < values.len() && cmp(&values[i], &values[j]) == Ordering::Equal {
            j += 1;
        }
        let count = j - i;
        // strict comparison keeps the first (smallest) value on ties
        if best.as_ref().is_none_or(|(_, best_count)| count > *best_count) {
            best = Some((values[i].clone(), count));
        }
        i = j;
    }

    best.map(|(value, _)| value)
}

/// Most frequent non-missing value of a numeric sequence.
pub fn numeric_mode(values: &[Option<f64>]) -> Option<f64> {
    mode_by(values.iter().flatten().copied().collect(), f64::total_cmp)
}

/// Most frequent non-missing value of a text sequence.
pub fn string_mode(values: &[Option<String>]) -> Option<String> {
    mode_by(values.iter().flatten().cloned().collect(), |a, b| a.cmp(b))
}

/// Sorted distinct non-missing text values.
pub fn distinct_strings(values: &[Option<String>]) -> Vec<String> {
    let mut distinct: Vec<String> = values.iter().flatten().cloned().collect();
    distinct.sort();
    distinct.dedup();
    distinct
}

/// Population mean and standard deviation of a sequence.
pub fn mean_and_std(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance.sqrt()))
}

// =============================================================================
// CSV Utilities
// =============================================================================

/// Read a CSV file with a header row.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(10_000))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .context(format!("Opening CSV file {}", path.display()))?
        .finish()
        .context(format!("Reading CSV file {}", path.display()))
}

/// Write a DataFrame as CSV with a header row, creating parent directories.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context(format!("Creating directory {}", parent.display()))?;
    }
    let mut file =
        File::create(path).context(format!("Creating CSV file {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(df)
        .context(format!("Writing CSV file {}", path.display()))
}

// =============================================================================
// Tests
// =============================================================================
