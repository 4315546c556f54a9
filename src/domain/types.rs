//! Shared domain types.
//!
//! The dataset lives in memory as a small columnar [`Table`]. Columns are typed
//! once at ingest (integer, float, date, text) and carried through unchanged;
//! only the date column is rewritten by preprocessing and only the target
//! column is coerced to numbers by the analysis paths.
//!
//! Response types at the bottom of this file are what the HTTP endpoints (and
//! the CLI) serialize.

use chrono::NaiveDate;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;

/// Rows taken from the head of the dataset for every analytical endpoint.
pub const WORKING_WINDOW: usize = 20_000;

/// Preview length used when the caller gives no (or a zero) row limit.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Seasonal period (in observations) for the additive decomposition.
pub const DECOMPOSITION_PERIOD: usize = 365;

/// Number of SARIMA steps projected past the last observation.
pub const SARIMA_HORIZON: usize = 15;

/// Column storage type, resolved once when the CSV is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DType {
    Int64,
    Float64,
    Date,
    Text,
}

impl DType {
    pub fn label(self) -> &'static str {
        match self {
            DType::Int64 => "int64",
            DType::Float64 => "float64",
            DType::Date => "date",
            DType::Text => "text",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, DType::Int64 | DType::Float64)
    }
}

/// Typed column values.
///
/// Missing markers: `NaN` for floats, `None` for dates and text. Integer columns
/// never contain missing values (a column with gaps is stored as floats).
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Date(Vec<Option<NaiveDate>>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Date(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> DType {
        match self {
            ColumnData::Int(_) => DType::Int64,
            ColumnData::Float(_) => DType::Float64,
            ColumnData::Date(_) => DType::Date,
            ColumnData::Text(_) => DType::Text,
        }
    }

    fn head(&self, n: usize) -> Self {
        match self {
            ColumnData::Int(v) => ColumnData::Int(v[..n.min(v.len())].to_vec()),
            ColumnData::Float(v) => ColumnData::Float(v[..n.min(v.len())].to_vec()),
            ColumnData::Date(v) => ColumnData::Date(v[..n.min(v.len())].to_vec()),
            ColumnData::Text(v) => ColumnData::Text(v[..n.min(v.len())].to_vec()),
        }
    }

    fn retain(&mut self, keep: &[bool]) {
        fn retain_vec<T>(v: &mut Vec<T>, keep: &[bool]) {
            let mut idx = 0;
            v.retain(|_| {
                let k = keep.get(idx).copied().unwrap_or(true);
                idx += 1;
                k
            });
        }
        match self {
            ColumnData::Int(v) => retain_vec(v, keep),
            ColumnData::Float(v) => retain_vec(v, keep),
            ColumnData::Date(v) => retain_vec(v, keep),
            ColumnData::Text(v) => retain_vec(v, keep),
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn dtype(&self) -> DType {
        self.data.dtype()
    }

    pub fn non_null_count(&self) -> usize {
        match &self.data {
            ColumnData::Int(v) => v.len(),
            ColumnData::Float(v) => v.iter().filter(|x| !x.is_nan()).count(),
            ColumnData::Date(v) => v.iter().filter(|x| x.is_some()).count(),
            ColumnData::Text(v) => v.iter().filter(|x| x.is_some()).count(),
        }
    }

    /// Coerce every cell to a number; anything that does not parse is missing.
    pub fn to_numeric(&self) -> Vec<Option<f64>> {
        match &self.data {
            ColumnData::Int(v) => v.iter().map(|&x| Some(x as f64)).collect(),
            ColumnData::Float(v) => v.iter().map(|&x| (!x.is_nan()).then_some(x)).collect(),
            ColumnData::Date(v) => vec![None; v.len()],
            ColumnData::Text(v) => v
                .iter()
                .map(|s| {
                    s.as_deref()
                        .and_then(|s| s.trim().parse::<f64>().ok())
                        .filter(|x| !x.is_nan())
                })
                .collect(),
        }
    }

    /// JSON value for a single cell (`null` when missing).
    pub fn value_at(&self, row: usize) -> Value {
        match &self.data {
            ColumnData::Int(v) => v.get(row).map_or(Value::Null, |&x| Value::from(x)),
            ColumnData::Float(v) => v
                .get(row)
                .and_then(|&x| serde_json::Number::from_f64(x))
                .map_or(Value::Null, Value::Number),
            ColumnData::Date(v) => v
                .get(row)
                .copied()
                .flatten()
                .map_or(Value::Null, |d| Value::String(format!("{}T00:00:00", d.format("%Y-%m-%d")))),
            ColumnData::Text(v) => v
                .get(row)
                .and_then(|s| s.clone())
                .map_or(Value::Null, Value::String),
        }
    }
}

/// The in-memory dataset.
///
/// Rows are addressed by position; there is no separate index, so dropping
/// rows renumbers the remainder contiguously from zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Build a table from equally sized columns.
    ///
    /// Returns `None` when the column lengths disagree.
    pub fn new(columns: Vec<Column>) -> Option<Self> {
        let n_rows = columns.first().map_or(0, Column::len);
        if columns.iter().any(|c| c.len() != n_rows) {
            return None;
        }
        Some(Self { columns, n_rows })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Replace the data of an existing column (lengths must match).
    pub fn replace_column_data(&mut self, idx: usize, data: ColumnData) -> bool {
        match self.columns.get_mut(idx) {
            Some(col) if data.len() == self.n_rows => {
                col.data = data;
                true
            }
            _ => false,
        }
    }

    /// Copy of the first `n` rows.
    pub fn head(&self, n: usize) -> Self {
        let columns: Vec<Column> = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), c.data.head(n)))
            .collect();
        Self {
            columns,
            n_rows: n.min(self.n_rows),
        }
    }

    /// Keep rows whose mask entry is `true`.
    pub fn retain_rows(&mut self, keep: &[bool]) {
        for col in &mut self.columns {
            col.data.retain(keep);
        }
        self.n_rows = self.columns.first().map_or(0, Column::len);
    }

    /// Serializable view of row `row` as a `column -> value` mapping.
    pub fn row(&self, row: usize) -> RowView<'_> {
        RowView { table: self, row }
    }
}

/// A single row rendered as a JSON object in column order.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    table: &'a Table,
    row: usize,
}

impl Serialize for RowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.table.n_columns()))?;
        for col in self.table.columns() {
            map.serialize_entry(&col.name, &col.value_at(self.row))?;
        }
        map.end()
    }
}

/// A date-aligned target series after missing values were dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetSeries {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
}

impl TargetSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An `(x, y)` pair of parallel sequences, `x` being ISO dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series<T = f64> {
    pub x: Vec<String>,
    pub y: Vec<T>,
}

impl<T> Series<T> {
    pub fn from_dates(dates: &[NaiveDate], y: Vec<T>) -> Self {
        Self {
            x: dates.iter().map(|d| iso_date(*d)).collect(),
            y,
        }
    }
}

pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `/fetch-dataset` payload.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetPreview {
    pub message: String,
    pub rows_in_preview: usize,
    pub rows_in_total: usize,
    pub preview_data: Vec<Value>,
}

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub count: f64,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    #[serde(rename = "25%")]
    pub q25: f64,
    #[serde(rename = "50%")]
    pub q50: f64,
    #[serde(rename = "75%")]
    pub q75: f64,
    pub max: f64,
}

/// `column -> statistics` mapping, serialized in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Description {
    pub columns: Vec<(String, ColumnSummary)>,
}

impl Description {
    pub fn get(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }
}

impl Serialize for Description {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, summary) in &self.columns {
            map.serialize_entry(name, summary)?;
        }
        map.end()
    }
}

/// `/data-info` payload.
#[derive(Debug, Clone, Serialize)]
pub struct DataInfo {
    pub info: String,
    pub description: Description,
}

/// `/seasonal-decomposition` payload.
#[derive(Debug, Clone, Serialize)]
pub struct DecompositionOutput {
    pub x: Vec<String>,
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<f64>,
}

/// `/arima-forecast` payload. `test` and `forecast` share the same x axis.
#[derive(Debug, Clone, Serialize)]
pub struct ArimaOutput {
    pub train: Series,
    pub test: Series,
    pub forecast: Series,
}

/// `/sarima-forecast` payload.
///
/// Historical values are optional: forward fill cannot cover gaps that precede
/// the first valid reading, and those stay `null`.
#[derive(Debug, Clone, Serialize)]
pub struct SarimaOutput {
    pub historical: Series<Option<f64>>,
    pub forecast: Series,
}
