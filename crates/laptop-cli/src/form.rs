//! The prediction form: choices offered to the user and the record it yields.

use laptop_processing::types::{
    COMPANY, CPU, GPU, INCHES, MEMORY, OP_SYS, PRODUCT, RAM, SCREEN_RESOLUTION, TYPE_NAME, WEIGHT,
};
use laptop_processing::utils::{distinct_strings, require_column, string_values};
use laptop_processing::{CATEGORICAL_FEATURES, LaptopRecord, ProcessingResult, read_csv};
use polars::prelude::DataFrame;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Inclusive bounds accepted for a numeric field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

pub const INCHES_RANGE: NumericRange = NumericRange { min: 0.0, max: 20.0 };
pub const RAM_RANGE: NumericRange = NumericRange { min: 0.0, max: 64.0 };
pub const WEIGHT_RANGE: NumericRange = NumericRange { min: 0.0, max: 10.0 };

/// Range for a numeric column, `None` for text columns.
pub fn numeric_range(column: &str) -> Option<NumericRange> {
    match column {
        INCHES => Some(INCHES_RANGE),
        RAM => Some(RAM_RANGE),
        WEIGHT => Some(WEIGHT_RANGE),
        _ => None,
    }
}

/// Choices for each text field, taken from the raw snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormOptions {
    choices: HashMap<String, Vec<String>>,
}

impl FormOptions {
    /// Sorted distinct values of every text column in `df`.
    pub fn from_snapshot(df: &DataFrame) -> ProcessingResult<Self> {
        let mut choices = HashMap::with_capacity(CATEGORICAL_FEATURES.len());
        for column in CATEGORICAL_FEATURES {
            let values = string_values(require_column(df, column)?)?;
            choices.insert(column.to_string(), distinct_strings(&values));
        }
        Ok(Self { choices })
    }

    /// Read the raw snapshot at `path` and collect its choices.
    pub fn load(path: &Path) -> ProcessingResult<Self> {
        Self::from_snapshot(&read_csv(path)?)
    }

    pub fn choices(&self, column: &str) -> &[String] {
        self.choices.get(column).map(Vec::as_slice).unwrap_or_default()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("Please enter all the features (missing: {})", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("{field} must be between {} and {}, got {value}", .range.min, .range.max)]
    OutOfRange {
        field: &'static str,
        value: f64,
        range: NumericRange,
    },
}

/// Field values entered so far. Every field starts unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionForm {
    pub company: Option<String>,
    pub product: Option<String>,
    pub type_name: Option<String>,
    pub inches: Option<f64>,
    pub screen_resolution: Option<String>,
    pub cpu: Option<String>,
    pub ram: Option<i64>,
    pub memory: Option<String>,
    pub gpu: Option<String>,
    pub op_sys: Option<String>,
    pub weight: Option<f64>,
}

fn text(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

// Zero counts as unset, like an untouched number input.
fn number(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

impl PredictionForm {
    /// Set a text field by column name. Unknown columns are ignored.
    pub fn set_text(&mut self, column: &str, value: String) {
        let slot = match column {
            COMPANY => &mut self.company,
            PRODUCT => &mut self.product,
            TYPE_NAME => &mut self.type_name,
            SCREEN_RESOLUTION => &mut self.screen_resolution,
            CPU => &mut self.cpu,
            MEMORY => &mut self.memory,
            GPU => &mut self.gpu,
            OP_SYS => &mut self.op_sys,
            _ => return,
        };
        *slot = Some(value);
    }

    /// Set a numeric field by column name. Ram is stored as whole gigabytes.
    pub fn set_number(&mut self, column: &str, value: f64) {
        match column {
            INCHES => self.inches = Some(value),
            RAM => self.ram = Some(value.round() as i64),
            WEIGHT => self.weight = Some(value),
            _ => {}
        }
    }

    /// Names of the fields that are still unset, in form order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let filled = [
            (COMPANY, text(&self.company).is_some()),
            (PRODUCT, text(&self.product).is_some()),
            (TYPE_NAME, text(&self.type_name).is_some()),
            (INCHES, number(self.inches).is_some()),
            (SCREEN_RESOLUTION, text(&self.screen_resolution).is_some()),
            (CPU, text(&self.cpu).is_some()),
            (RAM, self.ram.is_some_and(|r| r != 0)),
            (MEMORY, text(&self.memory).is_some()),
            (GPU, text(&self.gpu).is_some()),
            (OP_SYS, text(&self.op_sys).is_some()),
            (WEIGHT, number(self.weight).is_some()),
        ];
        filled
            .into_iter()
            .filter(|(_, ok)| !ok)
            .map(|(name, _)| name)
            .collect()
    }

    /// The record to predict, if every field is filled and in range.
    pub fn submit(&self) -> Result<LaptopRecord, FormError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(FormError::MissingFields(missing));
        }

        let inches = self.inches.unwrap_or_default();
        let ram = self.ram.unwrap_or_default();
        let weight = self.weight.unwrap_or_default();
        for (field, value) in [(INCHES, inches), (RAM, ram as f64), (WEIGHT, weight)] {
            if let Some(range) = numeric_range(field).filter(|r| !r.contains(value)) {
                return Err(FormError::OutOfRange { field, value, range });
            }
        }

        let owned = |v: &Option<String>| v.clone().unwrap_or_default();
        Ok(LaptopRecord {
            company: owned(&self.company),
            product: owned(&self.product),
            type_name: owned(&self.type_name),
            inches,
            screen_resolution: owned(&self.screen_resolution),
            cpu: owned(&self.cpu),
            ram,
            memory: owned(&self.memory),
            gpu: owned(&self.gpu),
            op_sys: owned(&self.op_sys),
            weight,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn filled() -> PredictionForm {
        PredictionForm {
            company: Some("Dell".into()),
            product: Some("XPS 13".into()),
            type_name: Some("Ultrabook".into()),
            inches: Some(13.3),
            screen_resolution: Some("1920x1080".into()),
            cpu: Some("Intel Core i7".into()),
            ram: Some(16),
            memory: Some("512GB SSD".into()),
            gpu: Some("Intel Iris".into()),
            op_sys: Some("Windows 10".into()),
            weight: Some(1.2),
        }
    }

    #[test]
    fn test_complete_form_submits() {
        let record = filled().submit().unwrap();
        assert_eq!(record.company, "Dell");
        assert_eq!(record.ram, 16);
        assert_eq!(record.weight, 1.2);
    }

    #[test]
    fn test_empty_form_lists_every_field() {
        let err = PredictionForm::default().submit().unwrap_err();
        let FormError::MissingFields(fields) = err else {
            panic!("expected missing fields");
        };
        assert_eq!(fields.len(), 11);
        assert_eq!(fields[0], COMPANY);
    }

    #[test]
    fn test_each_missing_field_is_named_alone() {
        for column in laptop_processing::FEATURE_COLUMNS {
            let mut form = filled();
            if numeric_range(column).is_some() {
                form.set_number(column, 0.0);
            } else {
                form.set_text(column, String::new());
            }
            assert_eq!(form.submit(), Err(FormError::MissingFields(vec![column])));
        }
    }

    #[test]
    fn test_zero_numbers_count_as_missing() {
        let mut form = filled();
        form.ram = Some(0);
        form.weight = Some(0.0);
        assert_eq!(
            form.submit(),
            Err(FormError::MissingFields(vec![RAM, WEIGHT]))
        );
    }

    #[test]
    fn test_blank_text_counts_as_missing() {
        let mut form = filled();
        form.gpu = Some("  ".into());
        assert_eq!(form.missing_fields(), vec![GPU]);
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let mut form = filled();
        form.inches = Some(25.0);
        assert!(matches!(
            form.submit(),
            Err(FormError::OutOfRange { field: INCHES, .. })
        ));
    }

    #[test]
    fn test_setters_by_column() {
        let mut form = PredictionForm::default();
        form.set_text(OP_SYS, "Linux".into());
        form.set_number(RAM, 7.6);
        form.set_text("Unknown", "x".into());
        assert_eq!(form.op_sys.as_deref(), Some("Linux"));
        assert_eq!(form.ram, Some(8));
    }

    #[test]
    fn test_options_from_snapshot() {
        let df = df!(
            COMPANY => &["HP", "Apple", "HP"],
            PRODUCT => &["a", "b", "c"],
            TYPE_NAME => &["Notebook", "Notebook", "Gaming"],
            SCREEN_RESOLUTION => &["1366x768", "1366x768", "1920x1080"],
            CPU => &["i5", "i5", "i7"],
            MEMORY => &["1TB HDD", "128GB SSD", "1TB HDD"],
            GPU => &["Intel", "AMD", "Nvidia"],
            OP_SYS => &["Windows 10", "macOS", "Linux"],
        )
        .unwrap();
        let options = FormOptions::from_snapshot(&df).unwrap();

        assert_eq!(options.choices(COMPANY), ["Apple", "HP"]);
        assert_eq!(options.choices(TYPE_NAME), ["Gaming", "Notebook"]);
        assert!(options.choices(INCHES).is_empty());
    }

    #[test]
    fn test_numeric_ranges() {
        assert_eq!(numeric_range(RAM), Some(RAM_RANGE));
        assert!(INCHES_RANGE.contains(20.0));
        assert!(!WEIGHT_RANGE.contains(10.5));
        assert_eq!(numeric_range(COMPANY), None);
    }
}
