//! Startup configuration.
//!
//! The source file, its delimiter, the date format and the columns the
//! analysis depends on are supplied once at startup and validated before the
//! server accepts requests.

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::format::{Item, StrftimeItems};

use crate::error::AppError;

pub const DEFAULT_DATASET_PATH: &str = "electric_power_consumption.csv";
pub const DEFAULT_DATE_COLUMN: &str = "Date";
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";
pub const DEFAULT_TARGET_COLUMN: &str = "Global_active_power";

/// Where the dataset lives and what it must look like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetConfig {
    pub path: PathBuf,
    pub delimiter: u8,
    /// Column parsed as a calendar date during preprocessing.
    pub date_column: String,
    /// `strftime`-style format of the date column.
    pub date_format: String,
    /// Numeric column that is resampled, decomposed and forecast.
    pub target_column: String,
    /// Additional columns the header must contain.
    pub extra_columns: Vec<String>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATASET_PATH),
            delimiter: b',',
            date_column: DEFAULT_DATE_COLUMN.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            target_column: DEFAULT_TARGET_COLUMN.to_string(),
            extra_columns: Vec::new(),
        }
    }
}

impl DatasetConfig {
    /// Every column the source header must contain, without duplicates.
    pub fn expected_columns(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::with_capacity(2 + self.extra_columns.len());
        for name in [self.date_column.as_str(), self.target_column.as_str()]
            .into_iter()
            .chain(self.extra_columns.iter().map(String::as_str))
        {
            if !out.contains(&name) {
                out.push(name);
            }
        }
        out
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.path.as_os_str().is_empty() {
            return Err(AppError::config("Dataset path must not be empty."));
        }
        if !self.delimiter.is_ascii() || matches!(self.delimiter, 0 | b'\n' | b'"') {
            return Err(AppError::config(format!(
                "Invalid delimiter {:?}: must be a single ASCII character other than NUL, newline or quote.",
                self.delimiter as char
            )));
        }
        if self.date_column.trim().is_empty() {
            return Err(AppError::config("Date column name must not be empty."));
        }
        if self.target_column.trim().is_empty() {
            return Err(AppError::config("Target column name must not be empty."));
        }
        if self.date_column == self.target_column {
            return Err(AppError::config(format!(
                "Date and target column are both `{}`.",
                self.date_column
            )));
        }
        if self.extra_columns.iter().any(|c| c.trim().is_empty()) {
            return Err(AppError::config("Expected column names must not be empty."));
        }
        validate_date_format(&self.date_format)
    }
}

fn validate_date_format(fmt: &str) -> Result<(), AppError> {
    if fmt.trim().is_empty() {
        return Err(AppError::config("Date format must not be empty."));
    }
    if StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error)) {
        return Err(AppError::config(format!("Invalid date format '{fmt}'.")));
    }
    Ok(())
}

/// Listener settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::config(format!("Invalid HOST:PORT '{}:{}': {e}", self.host, self.port)))
    }
}
