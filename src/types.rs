//! Core data model types.
//!
//! Raw input is an untyped, row-major [`DataSet`] of [`Value`] cells. Type detection turns it
//! into one [`ColumnInfo`] per column, which drives filter generation.

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A single untyped cell value.
///
/// `Null` and `Undefined` are distinct on input (an explicit null vs. a cell that was never
/// present, e.g. a ragged row or a JSON object lacking the key) but every operation in this
/// crate normalizes them to one null sentinel via [`Value::normalized`].
///
/// Equality and hashing compare floats bitwise so values can be used as map keys; `NaN` equals
/// itself and `0.0` differs from `-0.0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Explicit missing value.
    Null,
    /// Absent cell.
    Undefined,
    /// Boolean.
    Bool(bool),
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float (may be non-finite).
    Float64(f64),
    /// UTF-8 string.
    Utf8(String),
    /// Point in time.
    Date(DateTime<Utc>),
}

impl Value {
    /// `true` for `Null` and `Undefined`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    /// `true` for null-like cells and strings that are empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null | Value::Undefined => true,
            Value::Utf8(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Returns the value with `Undefined` collapsed into `Null`.
    pub fn normalized(&self) -> Value {
        match self {
            Value::Undefined => Value::Null,
            other => other.clone(),
        }
    }

    /// String coercion used by text search. Null-like cells coerce to the empty string.
    pub fn to_search_text(&self) -> String {
        match self {
            Value::Null | Value::Undefined => String::new(),
            other => other.to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) | (Undefined, Undefined) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int64(a), Int64(b)) => a == b,
            (Float64(a), Float64(b)) => a.to_bits() == b.to_bits(),
            (Utf8(a), Utf8(b)) => a == b,
            (Date(a), Date(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null | Value::Undefined => {}
            Value::Bool(b) => b.hash(state),
            Value::Int64(i) => i.hash(state),
            Value::Float64(f) => f.to_bits().hash(state),
            Value::Utf8(s) => s.hash(state),
            Value::Date(d) => d.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Undefined => write!(f, "undefined"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int64(i) => write!(f, "{i}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Utf8(s) => write!(f, "{s}"),
            Value::Date(d) => write!(f, "{}", d.to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Utf8(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Utf8(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Date(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

static UNDEFINED: Value = Value::Undefined;

/// In-memory untyped tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>`; column positions are stable across rows. Rows may be
/// shorter than `headers`, in which case the missing cells read as [`Value::Undefined`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSet {
    /// Column names, in column order.
    pub headers: Vec<String>,
    /// Row-major value storage (data rows only, never the header).
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from headers and data rows.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { headers, rows }
    }

    /// Create a dataset without a header row; columns are named `Column 1..N`.
    pub fn without_headers(rows: Vec<Vec<Value>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let headers = (1..=width).map(|i| format!("Column {i}")).collect();
        Self { headers, rows }
    }

    /// Build a dataset from a raw matrix.
    ///
    /// When `has_header` is set the first row is stripped and its cells (string-coerced) become
    /// the column names. Blank header cells fall back to `Column N`.
    pub fn from_matrix(mut matrix: Vec<Vec<Value>>, has_header: bool) -> Self {
        if !has_header || matrix.is_empty() {
            return Self::without_headers(matrix);
        }
        let header_row = matrix.remove(0);
        let width = matrix
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(header_row.len());
        let headers = (0..width)
            .map(|i| match header_row.get(i) {
                Some(v) if !v.is_blank() => v.to_string().trim().to_string(),
                _ => format!("Column {}", i + 1),
            })
            .collect();
        Self {
            headers,
            rows: matrix,
        }
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns (the wider of the header and the widest row).
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(self.headers.len())
    }

    /// Name of a column, or `Column N` when the header is missing.
    pub fn column_name(&self, index: usize) -> String {
        self.headers
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("Column {}", index + 1))
    }

    /// Cell at `(row, column)`; absent cells read as [`Value::Undefined`].
    pub fn cell(&self, row: usize, column: usize) -> &Value {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&UNDEFINED)
    }

    /// Iterate the cells of one column, top to bottom.
    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(column).unwrap_or(&UNDEFINED))
    }

    /// Create a new dataset containing only rows that match `predicate`.
    ///
    /// The returned dataset preserves the original headers.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        Self {
            headers: self.headers.clone(),
            rows,
        }
    }
}

/// Semantic type inferred for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Number,
    String,
    Boolean,
    Date,
    /// More than one primary type among non-null cells.
    Mixed,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ColumnType::Number => "number",
            ColumnType::String => "string",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::Mixed => "mixed",
        };
        f.write_str(s)
    }
}

/// Summary statistics, typed per column type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ColumnStatistics {
    /// `min`/`max` include non-finite values; `average` is over finite values only and is
    /// `None` when there are none.
    Number {
        min: f64,
        max: f64,
        average: Option<f64>,
    },
    Date {
        min: DateTime<Utc>,
        max: DateTime<Utc>,
    },
}

/// A distinct value together with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: Value,
    pub count: usize,
}

impl ValueCount {
    pub fn new(value: impl Into<Value>, count: usize) -> Self {
        Self {
            value: value.into(),
            count,
        }
    }
}

/// Inferred schema and statistics for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    /// Column name (from the header, or `Column N`).
    pub name: String,
    /// Position of the column in every row of the originating dataset.
    pub index: usize,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Distinct non-null values in first-seen order, capped by
    /// [`crate::detection::DetectionOptions::unique_values_return_limit`].
    pub unique_values: Vec<ValueCount>,
    /// Number of distinct non-null values. Exact up to the tracking cap, then saturates at it.
    pub unique_count: usize,
    pub has_nulls: bool,
    pub null_count: usize,
    /// First non-null values observed, in row order.
    pub sample_values: Vec<Value>,
    pub statistics: Option<ColumnStatistics>,
}

impl ColumnInfo {
    /// An empty column description of the given type; counts and samples start empty.
    pub fn new(name: impl Into<String>, index: usize, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            index,
            column_type,
            unique_values: Vec::new(),
            unique_count: 0,
            has_nulls: false,
            null_count: 0,
            sample_values: Vec::new(),
            statistics: None,
        }
    }

    /// `(min, max)` when numeric statistics are present.
    pub fn number_bounds(&self) -> Option<(f64, f64)> {
        match self.statistics {
            Some(ColumnStatistics::Number { min, max, .. }) => Some((min, max)),
            _ => None,
        }
    }

    /// `(min, max)` when date statistics are present.
    pub fn date_bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match self.statistics {
            Some(ColumnStatistics::Date { min, max }) => Some((min, max)),
            _ => None,
        }
    }
}
