//! Record sources for the ingestion stage.
//!
//! This module defines the [`RecordSource`] trait so the ingestion stage
//! can pull the catalog table from a MySQL server in production or from a
//! CSV snapshot for offline runs and tests, without changing the stage.
//!
//! # Example
//!
//! ```rust,ignore
//! use laptop_processing::ingestion::{DatabaseSettings, MySqlSource, RecordSource};
//!
//! let settings = DatabaseSettings::from_env()?;
//! let source = MySqlSource::new(settings, "laptop")?;
//! let df = source.fetch()?;
//! ```

use crate::error::{ProcessingError, Result, ResultExt};
use crate::utils::read_csv;
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use sqlx::mysql::{MySqlConnectOptions, MySqlRow};
use sqlx::{Column as _, ConnectOptions, Connection, Row, TypeInfo};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default MySQL port when `port` is not set.
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

static TABLE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid regex: table name"));

/// Trait for anything that can produce the raw catalog table.
///
/// Implementations must be `Send + Sync` so a source can be shared with
/// worker threads.
pub trait RecordSource: Send + Sync {
    /// Fetch every row of the catalog table.
    fn fetch(&self) -> Result<DataFrame>;

    /// Human readable description used in log lines.
    fn describe(&self) -> String;
}

// =============================================================================
// MySQL
// =============================================================================

/// Connection parameters for the relational source.
#[derive(Clone, PartialEq)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

impl DatabaseSettings {
    /// Read `host`, `user`, `password`, `database` and optional `port`
    /// from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| {
                ProcessingError::InvalidConfig(format!("environment variable '{key}' is not set"))
            })
        };

        let port = match lookup("port") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                ProcessingError::InvalidConfig(format!("invalid port '{raw}'"))
            })?,
            None => DEFAULT_MYSQL_PORT,
        };

        Ok(Self {
            host: required("host")?,
            port,
            user: required("user")?,
            password: required("password")?,
            database: required("database")?,
        })
    }

    fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }
}

/// Reads the whole catalog table from MySQL.
#[derive(Debug, Clone)]
pub struct MySqlSource {
    settings: DatabaseSettings,
    table: String,
}

impl MySqlSource {
    /// Create a source for `table`. The table name must be a plain identifier.
    pub fn new(settings: DatabaseSettings, table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        if !TABLE_NAME.is_match(&table) {
            return Err(ProcessingError::InvalidConfig(format!(
                "invalid table name '{table}'"
            )));
        }
        Ok(Self { settings, table })
    }

    fn query(&self) -> String {
        format!("SELECT * FROM `{}`", self.table)
    }

    async fn fetch_rows(&self) -> Result<Vec<MySqlRow>> {
        let mut conn = self.settings.connect_options().connect().await?;
        let rows = sqlx::query(&self.query()).fetch_all(&mut conn).await?;
        conn.close().await?;
        Ok(rows)
    }
}

impl RecordSource for MySqlSource {
    fn fetch(&self) -> Result<DataFrame> {
        info!("Reading table '{}' from {}", self.table, self.describe());

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Starting database runtime")?;
        let rows = runtime
            .block_on(self.fetch_rows())
            .context(format!("Querying table '{}'", self.table))?;

        if rows.is_empty() {
            return Err(ProcessingError::EmptyDataset(format!(
                "table '{}' returned no rows",
                self.table
            )));
        }

        let df = rows_to_dataframe(&rows)?;
        info!("Fetched {} rows x {} columns", df.height(), df.width());
        Ok(df)
    }

    fn describe(&self) -> String {
        format!(
            "mysql://{}@{}:{}/{}",
            self.settings.user, self.settings.host, self.settings.port, self.settings.database
        )
    }
}

/// Convert result rows to a DataFrame, one column at a time.
///
/// Integer types become Int64, FLOAT/DOUBLE/DECIMAL become Float64 and
/// everything else is decoded as text. SQL NULL becomes a null cell.
fn rows_to_dataframe(rows: &[MySqlRow]) -> Result<DataFrame> {
    let Some(first) = rows.first() else {
        return Ok(DataFrame::empty());
    };

    let mut columns = Vec::with_capacity(first.columns().len());
    for (idx, column) in first.columns().iter().enumerate() {
        let name = column.name().to_string();
        let type_name = column.type_info().name().to_ascii_uppercase();
        debug!("Decoding column '{}' ({})", name, type_name);

        let decoded = match type_name.as_str() {
            t if t.ends_with("INT UNSIGNED") => {
                let values = rows
                    .iter()
                    .map(|r| {
                        r.try_get::<Option<u64>, _>(idx)
                            .map(|v| v.and_then(|v| i64::try_from(v).ok()))
                    })
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Column::new(name.as_str().into(), values)
            }
            t if t.ends_with("INT") => {
                let values = rows
                    .iter()
                    .map(|r| r.try_get::<Option<i64>, _>(idx))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Column::new(name.as_str().into(), values)
            }
            "FLOAT" => {
                let values = rows
                    .iter()
                    .map(|r| r.try_get::<Option<f32>, _>(idx).map(|v| v.map(f64::from)))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Column::new(name.as_str().into(), values)
            }
            "DOUBLE" => {
                let values = rows
                    .iter()
                    .map(|r| r.try_get::<Option<f64>, _>(idx))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Column::new(name.as_str().into(), values)
            }
            "DECIMAL" => {
                let mut values = Vec::with_capacity(rows.len());
                for row in rows {
                    let text: Option<String> = row.try_get_unchecked(idx)?;
                    let value = match text {
                        Some(t) => Some(t.trim().parse::<f64>().map_err(|_| {
                            ProcessingError::TypeConversionFailed {
                                column: name.clone(),
                                target_type: "Float64".to_string(),
                                reason: format!("invalid decimal '{t}'"),
                            }
                        })?),
                        None => None,
                    };
                    values.push(value);
                }
                Column::new(name.as_str().into(), values)
            }
            _ => {
                let values = rows
                    .iter()
                    .map(|r| r.try_get_unchecked::<Option<String>, _>(idx))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Column::new(name.as_str().into(), values)
            }
        };
        columns.push(decoded);
    }

    Ok(DataFrame::new(columns)?)
}

// =============================================================================
// CSV
// =============================================================================

/// Reads the catalog table from a CSV snapshot with a header row.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for CsvSource {
    fn fetch(&self) -> Result<DataFrame> {
        info!("Reading catalog snapshot {}", self.path.display());
        let df = read_csv(&self.path)?;
        if df.height() == 0 {
            return Err(ProcessingError::EmptyDataset(format!(
                "{} contains no rows",
                self.path.display()
            )));
        }
        Ok(df)
    }

    fn describe(&self) -> String {
        format!("csv://{}", self.path.display())
    }
}

static_assertions::assert_impl_all!(MySqlSource: Send, Sync);
static_assertions::assert_impl_all!(CsvSource: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_settings_from_lookup() {
        let settings = DatabaseSettings::from_lookup(lookup(&[
            ("host", "db.local"),
            ("user", "reader"),
            ("password", "secret"),
            ("database", "catalog"),
        ]))
        .unwrap();

        assert_eq!(settings.port, DEFAULT_MYSQL_PORT);
        assert_eq!(settings.database, "catalog");
        assert!(!format!("{settings:?}").contains("secret"));
    }

    #[test]
    fn test_settings_missing_variable() {
        let err = DatabaseSettings::from_lookup(lookup(&[("host", "db.local")])).unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("'user'"));
    }

    #[test]
    fn test_settings_invalid_port() {
        let err = DatabaseSettings::from_lookup(lookup(&[
            ("host", "h"),
            ("user", "u"),
            ("password", "p"),
            ("database", "d"),
            ("port", "not-a-port"),
        ]))
        .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_mysql_source_rejects_bad_table_name() {
        let settings = DatabaseSettings::from_lookup(lookup(&[
            ("host", "h"),
            ("user", "u"),
            ("password", "p"),
            ("database", "d"),
        ]))
        .unwrap();

        assert!(MySqlSource::new(settings.clone(), "laptop; DROP TABLE x").is_err());
        let source = MySqlSource::new(settings, "laptop").unwrap();
        assert_eq!(source.query(), "SELECT * FROM `laptop`");
        assert_eq!(source.describe(), "mysql://u@h:3306/d");
    }

    #[test]
    fn test_csv_source_missing_file() {
        let source = CsvSource::new("does/not/exist.csv");
        assert!(source.fetch().is_err());
        assert_eq!(source.describe(), "csv://does/not/exist.csv");
    }
}
