//! Record schema shared by every stage.
//!
//! Column names match the source table exactly; the transformer, the
//! prediction service and the form all address columns through these
//! constants.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

pub const COMPANY: &str = "Company";
pub const PRODUCT: &str = "Product";
pub const TYPE_NAME: &str = "TypeName";
pub const INCHES: &str = "Inches";
pub const SCREEN_RESOLUTION: &str = "ScreenResolution";
pub const CPU: &str = "Cpu";
pub const RAM: &str = "Ram";
pub const MEMORY: &str = "Memory";
pub const GPU: &str = "Gpu";
pub const OP_SYS: &str = "OpSys";
pub const WEIGHT: &str = "Weight";

/// Regression target.
pub const TARGET_COLUMN: &str = "Price_euros";

/// Numeric feature columns, in transformer output order.
pub const NUMERIC_FEATURES: [&str; 3] = [INCHES, RAM, WEIGHT];

/// Categorical feature columns, in transformer output order.
pub const CATEGORICAL_FEATURES: [&str; 8] = [
    COMPANY,
    PRODUCT,
    TYPE_NAME,
    SCREEN_RESOLUTION,
    CPU,
    MEMORY,
    GPU,
    OP_SYS,
];

/// All feature columns in record order.
pub const FEATURE_COLUMNS: [&str; 11] = [
    COMPANY,
    PRODUCT,
    TYPE_NAME,
    INCHES,
    SCREEN_RESOLUTION,
    CPU,
    RAM,
    MEMORY,
    GPU,
    OP_SYS,
    WEIGHT,
];

/// Width of a transformed feature table.
pub const FEATURE_COUNT: usize = NUMERIC_FEATURES.len() + CATEGORICAL_FEATURES.len();

/// One laptop listing, without its price.
///
/// Ram is whole gigabytes and Weight is kilograms; both are already stripped
/// of their unit suffix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaptopRecord {
    pub company: String,
    pub product: String,
    pub type_name: String,
    pub inches: f64,
    pub screen_resolution: String,
    pub cpu: String,
    pub ram: i64,
    pub memory: String,
    pub gpu: String,
    pub op_sys: String,
    pub weight: f64,
}

impl LaptopRecord {
    /// Build a one-row table with the source column names, in record order.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            Column::new(COMPANY.into(), [self.company.as_str()]),
            Column::new(PRODUCT.into(), [self.product.as_str()]),
            Column::new(TYPE_NAME.into(), [self.type_name.as_str()]),
            Column::new(INCHES.into(), [self.inches]),
            Column::new(
                SCREEN_RESOLUTION.into(),
                [self.screen_resolution.as_str()],
            ),
            Column::new(CPU.into(), [self.cpu.as_str()]),
            Column::new(RAM.into(), [self.ram]),
            Column::new(MEMORY.into(), [self.memory.as_str()]),
            Column::new(GPU.into(), [self.gpu.as_str()]),
            Column::new(OP_SYS.into(), [self.op_sys.as_str()]),
            Column::new(WEIGHT.into(), [self.weight]),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_record() -> LaptopRecord {
        LaptopRecord {
            company: "Apple".to_string(),
            product: "MacBook Pro".to_string(),
            type_name: "Ultrabook".to_string(),
            inches: 13.3,
            screen_resolution: "IPS Panel Retina Display 2560x1600".to_string(),
            cpu: "Intel Core i5 2.3GHz".to_string(),
            ram: 8,
            memory: "128GB SSD".to_string(),
            gpu: "Intel Iris Plus Graphics 640".to_string(),
            op_sys: "macOS".to_string(),
            weight: 1.37,
        }
    }

    #[test]
    fn test_feature_partition() {
        assert_eq!(FEATURE_COUNT, FEATURE_COLUMNS.len());
        for name in NUMERIC_FEATURES.iter().chain(CATEGORICAL_FEATURES.iter()) {
            assert!(FEATURE_COLUMNS.contains(name));
        }
        assert!(!FEATURE_COLUMNS.contains(&TARGET_COLUMN));
    }

    #[test]
    fn test_record_to_dataframe() {
        let df = sample_record().to_dataframe().unwrap();
        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();

        assert_eq!(df.height(), 1);
        assert_eq!(names, FEATURE_COLUMNS.to_vec());
        assert_eq!(df.column(RAM).unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column(WEIGHT).unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column(CPU).unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_record_json_round_trip() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        let parsed: LaptopRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
