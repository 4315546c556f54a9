//! CSV ingest.
//!
//! This module turns the delimited source file into a typed [`Table`]:
//!
//! - **Header check** against the configured schema (clear error naming the
//!   missing columns)
//! - **Per-column typing**: integer, float (with missing markers as `NaN`),
//!   or text; dates are left as text here and parsed by preprocessing
//! - **No row filtering**: every record becomes a row, short records are
//!   padded with missing values

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;

use csv::StringRecord;
use rayon::prelude::*;

use crate::domain::{Column, ColumnData, DatasetConfig, Table};
use crate::error::AppError;

/// Cell contents treated as missing regardless of column type.
const MISSING_MARKERS: [&str; 12] = [
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "#N/A", "<NA>",
];

/// Read the configured file into a typed table.
pub fn read_table(config: &DatasetConfig) -> Result<Table, AppError> {
    let file = File::open(&config.path).map_err(|e| {
        AppError::failed(format!("Failed to open CSV '{}': {e}", config.path.display()))
    })?;
    read_table_from(file, config)
}

/// Read a table from any reader (the schema in `config` is still enforced).
pub fn read_table_from<R: Read>(reader: R, config: &DatasetConfig) -> Result<Table, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::failed(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let names = header_names(&headers);
    ensure_expected_columns(&names, config)?;

    let width = names.len();
    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); width];

    for (idx, result) in reader.records().enumerate() {
        // +2: records start on the line after the header, lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| AppError::failed(format!("CSV parse error on line {line}: {e}")))?;
        if record.len() > width {
            return Err(AppError::failed(format!(
                "Line {line} has {} fields, expected {width}.",
                record.len()
            )));
        }
        for (col, cells) in raw.iter_mut().enumerate() {
            let value = record.get(col).filter(|s| !is_missing(s)).map(str::to_string);
            cells.push(value);
        }
    }

    let columns: Vec<Column> = names
        .into_par_iter()
        .zip(raw.into_par_iter())
        .map(|(name, cells)| Column::new(name, infer_column(cells)))
        .collect();

    Table::new(columns).ok_or_else(|| AppError::failed("Column lengths disagree after CSV ingest."))
}

/// Check only the header of the configured file against the expected schema.
pub fn check_schema(config: &DatasetConfig) -> Result<(), AppError> {
    let file = File::open(&config.path).map_err(|e| {
        AppError::config(format!("Failed to open CSV '{}': {e}", config.path.display()))
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter)
        .flexible(true)
        .from_reader(file);
    let headers = reader
        .headers()
        .map_err(|e| AppError::config(format!("Failed to read CSV headers: {e}")))?;
    ensure_expected_columns(&header_names(headers), config)
        .map_err(|e| AppError::config(format!("{} ({})", e.message(), config.path.display())))
}

fn header_names(headers: &StringRecord) -> Vec<String> {
    headers.iter().map(normalize_header_name).collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM;
    // left in place it makes the date column look absent.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn ensure_expected_columns(names: &[String], config: &DatasetConfig) -> Result<(), AppError> {
    let present: HashSet<&str> = names.iter().map(String::as_str).collect();
    let missing: Vec<&str> = config
        .expected_columns()
        .into_iter()
        .filter(|c| !present.contains(c))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(AppError::failed(format!(
        "Missing required column(s): {}. Found: {}.",
        missing.iter().map(|c| format!("`{c}`")).collect::<Vec<_>>().join(", "),
        names.join(", ")
    )))
}

fn is_missing(s: &str) -> bool {
    MISSING_MARKERS.contains(&s)
}

/// Pick the narrowest type that holds every present value.
fn infer_column(cells: Vec<Option<String>>) -> ColumnData {
    let has_missing = cells.iter().any(Option::is_none);

    if !has_missing && !cells.is_empty() {
        let ints: Option<Vec<i64>> = cells
            .iter()
            .map(|c| c.as_deref().and_then(|s| s.trim().parse::<i64>().ok()))
            .collect();
        if let Some(ints) = ints {
            return ColumnData::Int(ints);
        }
    }

    let floats: Option<Vec<f64>> = cells
        .iter()
        .map(|c| match c.as_deref() {
            None => Some(f64::NAN),
            Some(s) => s.trim().parse::<f64>().ok(),
        })
        .collect();
    if let Some(floats) = floats {
        return ColumnData::Float(floats);
    }

    ColumnData::Text(cells)
}
