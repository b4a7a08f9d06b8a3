//! JSON loading into an untyped [`DataSet`].
//!
//! Supported inputs:
//! - An array of arrays: `[["a","b"],[1,2]]` (first row is the header when
//!   [`JsonOptions::header_row`] is set)
//! - An array of objects: `[{"a":1}, {"a":2,"b":true}]`; columns are the keys in first-seen
//!   order and keys absent from a row read as [`Value::Undefined`]
//! - A single object (one row)
//! - Newline-delimited JSON (NDJSON) of arrays or objects

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FilterError, FilterResult};
use crate::types::{DataSet, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JsonOptions {
    /// For array-of-arrays input, treat the first array as column names.
    pub header_row: bool,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self { header_row: true }
    }
}

/// Load a JSON or NDJSON file into a [`DataSet`].
pub fn read_json_from_path(path: impl AsRef<Path>, options: &JsonOptions) -> FilterResult<DataSet> {
    let text = fs::read_to_string(path)?;
    read_json_from_str(&text, options)
}

/// Load JSON from an in-memory string.
pub fn read_json_from_str(input: &str, options: &JsonOptions) -> FilterResult<DataSet> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(FilterError::InvalidInput {
            message: "json input is empty".to_string(),
        });
    }

    let items = match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Array(items)) => items,
        Ok(v @ serde_json::Value::Object(_)) => vec![v],
        Ok(_) => {
            return Err(FilterError::InvalidInput {
                message: "json must be an array, an object, or NDJSON".to_string(),
            });
        }
        // Not a single document; try NDJSON.
        Err(_) => {
            let mut items = Vec::new();
            for (i, line) in trimmed.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let v = serde_json::from_str::<serde_json::Value>(line).map_err(|e| {
                    FilterError::InvalidInput {
                        message: format!("invalid ndjson at line {}: {e}", i + 1),
                    }
                })?;
                items.push(v);
            }
            items
        }
    };

    dataset_from_items(items, options)
}

fn dataset_from_items(
    items: Vec<serde_json::Value>,
    options: &JsonOptions,
) -> FilterResult<DataSet> {
    if items.is_empty() {
        return Ok(DataSet::default());
    }
    if items.iter().all(serde_json::Value::is_array) {
        let matrix = items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::Array(cells) => cells.iter().map(convert_json_value).collect(),
                _ => Vec::new(),
            })
            .collect();
        return Ok(DataSet::from_matrix(matrix, options.header_row));
    }
    if items.iter().all(serde_json::Value::is_object) {
        return Ok(from_objects(&items));
    }
    Err(FilterError::InvalidInput {
        message: "json rows must be all arrays or all objects".to_string(),
    })
}

fn from_objects(items: &[serde_json::Value]) -> DataSet {
    let mut headers: Vec<String> = Vec::new();
    for obj in items.iter().filter_map(serde_json::Value::as_object) {
        for key in obj.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = items
        .iter()
        .filter_map(serde_json::Value::as_object)
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map_or(Value::Undefined, convert_json_value))
                .collect()
        })
        .collect();

    DataSet::new(headers, rows)
}

/// Map a JSON value onto a cell. Nested arrays and objects are kept as their JSON text.
fn convert_json_value(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int64(i),
            None => n.as_f64().map_or(Value::Null, Value::Float64),
        },
        serde_json::Value::String(s) => Value::Utf8(s.clone()),
        other => Value::Utf8(other.to_string()),
    }
}
