//! Unit-suffix conversion functions for data cleaning.

use crate::error::{ProcessingError, Result};
use crate::utils::is_numeric_dtype;
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;

/// `<number><optional spaces><unit>` where the unit is matched case-insensitively.
static RAM_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*([+-]?\d+(?:\.\d+)?)\s*(?:gb)?\s*$").expect("Invalid regex: Ram")
});

static WEIGHT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*([+-]?(?:\d+\.?\d*|\.\d+))\s*(?:kgs?)?\s*$")
        .expect("Invalid regex: Weight")
});

fn conversion_error(column: &str, target_type: &str, reason: impl Into<String>) -> ProcessingError {
    ProcessingError::TypeConversionFailed {
        column: column.to_string(),
        target_type: target_type.to_string(),
        reason: reason.into(),
    }
}

/// Strip the unit and return the numeric part, `None` for blank values.
fn capture_number<'a>(pattern: &Regex, value: &'a str) -> std::result::Result<Option<&'a str>, ()> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    pattern
        .captures(value)
        .and_then(|caps| caps.get(1))
        .map(|m| Some(m.as_str()))
        .ok_or(())
}

/// Convert a Ram column (`"8GB"`, `"16 gb"`, `8`) to whole gigabytes.
pub(crate) fn ram_to_gigabytes(series: &Series) -> Result<Series> {
    let name = series.name().to_string();

    if is_numeric_dtype(series.dtype()) {
        let floats = series.cast(&DataType::Float64)?;
        let mut result: Vec<Option<i64>> = Vec::with_capacity(floats.len());
        for value in floats.f64()?.into_iter() {
            match value {
                Some(v) if v.is_nan() => result.push(None),
                Some(v) if v.fract() == 0.0 => result.push(Some(v as i64)),
                Some(v) => {
                    return Err(conversion_error(
                        &name,
                        "Int64",
                        format!("{v} is not a whole number of gigabytes"),
                    ));
                }
                None => result.push(None),
            }
        }
        return Ok(Series::new(series.name().clone(), result));
    }

    let text = series.cast(&DataType::String)?;
    let mut result: Vec<Option<i64>> = Vec::with_capacity(text.len());
    for value in text.str()?.into_iter() {
        let Some(raw) = value else {
            result.push(None);
            continue;
        };
        let number = capture_number(&RAM_PATTERN, raw)
            .map_err(|_| conversion_error(&name, "Int64", format!("unrecognized value '{raw}'")))?;
        match number {
            None => result.push(None),
            Some(n) => {
                let parsed: f64 = n.parse().map_err(|_| {
                    conversion_error(&name, "Int64", format!("unrecognized value '{raw}'"))
                })?;
                if parsed.fract() != 0.0 {
                    return Err(conversion_error(
                        &name,
                        "Int64",
                        format!("'{raw}' is not a whole number of gigabytes"),
                    ));
                }
                result.push(Some(parsed as i64));
            }
        }
    }

    Ok(Series::new(series.name().clone(), result))
}

/// Convert a Weight column (`"1.5kg"`, `"2.1 KG"`, `1.5`) to kilograms.
pub(crate) fn weight_to_kilograms(series: &Series) -> Result<Series> {
    let name = series.name().to_string();

    if is_numeric_dtype(series.dtype()) {
        return Ok(series.cast(&DataType::Float64)?);
    }

    let text = series.cast(&DataType::String)?;
    let mut result: Vec<Option<f64>> = Vec::with_capacity(text.len());
    for value in text.str()?.into_iter() {
        let Some(raw) = value else {
            result.push(None);
            continue;
        };
        let number = capture_number(&WEIGHT_PATTERN, raw).map_err(|_| {
            conversion_error(&name, "Float64", format!("unrecognized value '{raw}'"))
        })?;
        match number {
            None => result.push(None),
            Some(n) => {
                let parsed: f64 = n.parse().map_err(|_| {
                    conversion_error(&name, "Float64", format!("unrecognized value '{raw}'"))
                })?;
                result.push(Some(parsed));
            }
        }
    }

    Ok(Series::new(series.name().clone(), result))
}
