//! Feature transformation.
//!
//! The transformer turns the eleven catalog feature columns into a fixed
//! width numeric table:
//!
//! ```text
//! Inches, Ram, Weight            → most-frequent impute → standard scale
//! Company, Product, TypeName,    → most-frequent impute → ordinal encode
//! ScreenResolution, Cpu, Memory,   (unseen = -1)       → standard scale
//! Gpu, OpSys
//! ```
//!
//! Output columns are Float64, named `num__<column>` and `cat__<column>` in
//! that order. Fitting produces an immutable [`FittedTransformer`] which is
//! the only thing that can transform; it never refits.
//!
//! # Example
//!
//! ```rust,ignore
//! use laptop_processing::transform::FeatureTransformer;
//!
//! let (fitted, train_features) = FeatureTransformer::new().fit_transform(&train)?;
//! let test_features = fitted.transform(&test)?;
//! fitted.save("artifacts/data_transformation/preprocessor.bin")?;
//! ```

mod encoder;
mod imputer;
mod scaler;
mod stage;

pub use encoder::{OrdinalEncoder, UNKNOWN_CATEGORY};
pub use imputer::{CategoricalImputer, NumericImputer};
pub use scaler::StandardScaler;
pub use stage::{TransformationArtifacts, run_data_transformation, split_target};

use crate::error::{ProcessingError, Result, ResultExt};
use crate::types::{CATEGORICAL_FEATURES, NUMERIC_FEATURES};
use crate::utils::{numeric_values, require_column, string_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Prefix of transformed numeric columns.
pub const NUMERIC_PREFIX: &str = "num__";
/// Prefix of transformed categorical columns.
pub const CATEGORICAL_PREFIX: &str = "cat__";

/// Unfitted column plan.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTransformer {
    numeric: Vec<String>,
    categorical: Vec<String>,
}

impl Default for FeatureTransformer {
    fn default() -> Self {
        Self::with_columns(&NUMERIC_FEATURES, &CATEGORICAL_FEATURES)
    }
}

impl FeatureTransformer {
    /// The catalog plan: three numeric and eight categorical columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// A plan over arbitrary columns.
    pub fn with_columns(numeric: &[&str], categorical: &[&str]) -> Self {
        Self {
            numeric: numeric.iter().map(|c| c.to_string()).collect(),
            categorical: categorical.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Learn per-column statistics from `df`.
    pub fn fit(&self, df: &DataFrame) -> Result<FittedTransformer> {
        for name in self.numeric.iter().chain(self.categorical.iter()) {
            require_column(df, name)?;
        }
        if df.height() == 0 {
            return Err(ProcessingError::EmptyDataset(
                "cannot fit the transformer on zero rows".to_string(),
            ));
        }

        let mut numeric = Vec::with_capacity(self.numeric.len());
        for name in &self.numeric {
            let values = numeric_values(require_column(df, name)?)?;
            let imputer = NumericImputer::fit(name, &values)?;
            let scaler = StandardScaler::fit(&imputer.transform(&values))
                .ok_or_else(|| ProcessingError::EmptyDataset(name.clone()))?;
            debug!(
                "Fitted '{}': fill={}, mean={:.4}, scale={:.4}",
                name, imputer.fill_value, scaler.mean, scaler.scale
            );
            numeric.push(NumericPlan {
                column: name.clone(),
                imputer,
                scaler,
            });
        }

        let mut categorical = Vec::with_capacity(self.categorical.len());
        for name in &self.categorical {
            let values = string_values(require_column(df, name)?)?;
            let imputer = CategoricalImputer::fit(name, &values)?;
            let filled = imputer.transform(&values);
            let encoder = OrdinalEncoder::fit(&filled);
            let scaler = StandardScaler::fit(&encoder.transform(&filled))
                .ok_or_else(|| ProcessingError::EmptyDataset(name.clone()))?;
            debug!(
                "Fitted '{}': fill='{}', {} categories",
                name,
                imputer.fill_value,
                encoder.categories.len()
            );
            categorical.push(CategoricalPlan {
                column: name.clone(),
                imputer,
                encoder,
                scaler,
            });
        }

        Ok(FittedTransformer {
            numeric,
            categorical,
        })
    }

    /// Fit on `df` and transform it with the result.
    pub fn fit_transform(&self, df: &DataFrame) -> Result<(FittedTransformer, DataFrame)> {
        let fitted = self.fit(df)?;
        let transformed = fitted.transform(df)?;
        Ok((fitted, transformed))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct NumericPlan {
    column: String,
    imputer: NumericImputer,
    scaler: StandardScaler,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CategoricalPlan {
    column: String,
    imputer: CategoricalImputer,
    encoder: OrdinalEncoder,
    scaler: StandardScaler,
}

/// Immutable fitted transformer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedTransformer {
    numeric: Vec<NumericPlan>,
    categorical: Vec<CategoricalPlan>,
}

impl FittedTransformer {
    /// Width of every transformed table.
    pub fn n_features(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }

    /// Output column names in order.
    pub fn feature_names(&self) -> Vec<String> {
        self.numeric
            .iter()
            .map(|p| format!("{NUMERIC_PREFIX}{}", p.column))
            .chain(
                self.categorical
                    .iter()
                    .map(|p| format!("{CATEGORICAL_PREFIX}{}", p.column)),
            )
            .collect()
    }

    /// Fitted vocabulary of a categorical column.
    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.categorical
            .iter()
            .find(|p| p.column == column)
            .map(|p| p.encoder.categories.as_slice())
    }

    /// Apply the fitted statistics to `df`. Extra columns are ignored.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.n_features());

        for plan in &self.numeric {
            let values = numeric_values(require_column(df, &plan.column)?)?;
            let scaled = plan.scaler.transform(&plan.imputer.transform(&values));
            columns.push(Column::new(
                format!("{NUMERIC_PREFIX}{}", plan.column).into(),
                scaled,
            ));
        }

        for plan in &self.categorical {
            let values = string_values(require_column(df, &plan.column)?)?;
            let codes = plan.encoder.transform(&plan.imputer.transform(&values));
            columns.push(Column::new(
                format!("{CATEGORICAL_PREFIX}{}", plan.column).into(),
                plan.scaler.transform(&codes),
            ));
        }

        Ok(DataFrame::new(columns)?)
    }

    /// Persist with bincode.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context(format!("Creating directory {}", parent.display()))?;
        }
        let bytes = bincode::serialize(self)?;
        fs::write(path, bytes).context(format!("Writing transformer {}", path.display()))?;
        Ok(())
    }

    /// Load a transformer written by [`FittedTransformer::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).context(format!("Reading transformer {}", path.display()))?;
        let fitted: Self = bincode::deserialize(&bytes)?;
        if fitted.n_features() == 0 {
            return Err(ProcessingError::FeatureMismatch {
                expected: NUMERIC_FEATURES.len() + CATEGORICAL_FEATURES.len(),
                got: 0,
            });
        }
        Ok(fitted)
    }
}

static_assertions::assert_impl_all!(FittedTransformer: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FEATURE_COUNT;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    fn catalog() -> DataFrame {
        df!(
            "Company" => &[Some("Apple"), Some("HP"), Some("HP"), None],
            "Product" => &["MacBook Air", "250 G6", "ProBook 450", "250 G6"],
            "TypeName" => &["Ultrabook", "Notebook", "Notebook", "Notebook"],
            "Inches" => &[Some(13.3), Some(15.6), None, Some(15.6)],
            "ScreenResolution" => &["1440x900", "Full HD 1920x1080", "1366x768", "1366x768"],
            "Cpu" => &["Intel Core i5", "Intel Core i5", "Intel Core i7", "AMD A9"],
            "Ram" => &[8i64, 8, 16, 4],
            "Memory" => &["128GB Flash Storage", "256GB SSD", "1TB HDD", "500GB HDD"],
            "Gpu" => &["Intel HD 6000", "Intel HD 620", "Nvidia GeForce 930MX", "AMD Radeon R5"],
            "OpSys" => &["macOS", "No OS", "Windows 10", "Windows 10"],
            "Weight" => &[1.34, 1.86, 2.1, 2.2],
            "Price_euros" => &[898.94, 575.0, 1000.0, 400.0],
        )
        .unwrap()
    }

    #[test]
    fn test_output_shape_and_names() {
        let (fitted, out) = FeatureTransformer::new().fit_transform(&catalog()).unwrap();

        assert_eq!(out.shape(), (4, FEATURE_COUNT));
        assert_eq!(fitted.n_features(), FEATURE_COUNT);
        let names: Vec<String> = out
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, fitted.feature_names());
        assert_eq!(names[0], "num__Inches");
        assert_eq!(names[3], "cat__Company");
        for col in out.get_columns() {
            assert_eq!(col.dtype(), &DataType::Float64);
        }
    }

    #[test]
    fn test_missing_values_are_imputed_with_mode() {
        let fitted = FeatureTransformer::new().fit(&catalog()).unwrap();
        let out = fitted.transform(&catalog()).unwrap();

        let inches = out.column("num__Inches").unwrap().f64().unwrap();
        // row 2 was missing and takes the mode 15.6, same as rows 1 and 3
        assert_eq!(inches.get(2), inches.get(1));
        let company = out.column("cat__Company").unwrap().f64().unwrap();
        assert_eq!(company.get(3), company.get(1));
        assert_eq!(out.column("num__Inches").unwrap().null_count(), 0);
    }

    #[test]
    fn test_transform_is_stable() {
        let fitted = FeatureTransformer::new().fit(&catalog()).unwrap();
        let first = fitted.transform(&catalog()).unwrap();
        let second = fitted.transform(&catalog()).unwrap();
        assert!(first.equals(&second));
    }

    #[test]
    fn test_width_fixed_for_unseen_categories() {
        let fitted = FeatureTransformer::new().fit(&catalog()).unwrap();
        let mut unseen = catalog().head(Some(1));
        unseen
            .replace("Company", Series::new("Company".into(), &["Razer"]))
            .unwrap();

        let out = fitted.transform(&unseen).unwrap();
        assert_eq!(out.width(), FEATURE_COUNT);

        let plan = &fitted.categorical[0];
        let expected = (UNKNOWN_CATEGORY - plan.scaler.mean) / plan.scaler.scale;
        let got = out.column("cat__Company").unwrap().f64().unwrap().get(0).unwrap();
        assert_relative_eq!(got, expected);
    }

    #[test]
    fn test_fit_missing_column() {
        let df = catalog().drop("Gpu").unwrap();
        let err = FeatureTransformer::new().fit(&df).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_fit_zero_rows() {
        let df = catalog().head(Some(0));
        let err = FeatureTransformer::new().fit(&df).unwrap_err();
        assert_eq!(err.error_code(), "EMPTY_DATASET");
    }

    #[test]
    fn test_fit_text_in_numeric_column() {
        let mut df = catalog();
        df.replace("Ram", Series::new("Ram".into(), &["8GB", "8GB", "16GB", "4GB"]))
            .unwrap();
        let err = FeatureTransformer::new().fit(&df).unwrap_err();
        assert_eq!(err.error_code(), "TYPE_CONVERSION_FAILED");
    }

    #[test]
    fn test_blank_numeric_column_from_csv_is_imputed() {
        let fitted = FeatureTransformer::new().fit(&catalog()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one_row.csv");
        std::fs::write(
            &path,
            "Company,Product,TypeName,Inches,ScreenResolution,Cpu,Ram,Memory,Gpu,OpSys,Weight\n\
             HP,250 G6,Notebook,,1366x768,Intel Core i5,8,256GB SSD,Intel HD Graphics 620,Windows 10,1.86\n",
        )
        .unwrap();
        let df = crate::utils::read_csv(&path).unwrap();
        assert_eq!(df.column("Inches").unwrap().dtype(), &DataType::String);

        let out = fitted.transform(&df).unwrap();
        let complete = fitted.transform(&catalog().slice(1, 1)).unwrap();
        assert_relative_eq!(
            out.column("num__Inches").unwrap().f64().unwrap().get(0).unwrap(),
            complete.column("num__Inches").unwrap().f64().unwrap().get(0).unwrap()
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preprocessor.bin");
        let fitted = FeatureTransformer::new().fit(&catalog()).unwrap();

        fitted.save(&path).unwrap();
        let loaded = FittedTransformer::load(&path).unwrap();
        assert_eq!(loaded, fitted);
        assert_eq!(
            loaded.categories("OpSys").unwrap(),
            &["No OS".to_string(), "Windows 10".to_string(), "macOS".to_string()]
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = FittedTransformer::load("does/not/exist.bin").unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }
}
