//! CSV loading into an untyped [`DataSet`].

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FilterResult;
use crate::types::{DataSet, Value};

/// Options for CSV loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CsvOptions {
    /// Treat the first record as column names.
    pub has_headers: bool,
    pub delimiter: u8,
    /// Trim surrounding whitespace from every cell.
    pub trim: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_headers: true,
            delimiter: b',',
            trim: true,
        }
    }
}

/// Load a CSV file into a [`DataSet`].
///
/// Every cell becomes [`Value::Utf8`]; blank cells become [`Value::Null`]. Types are left to
/// [`crate::detection::TypeDetector`].
pub fn read_csv_from_path(path: impl AsRef<Path>, options: &CsvOptions) -> FilterResult<DataSet> {
    let rdr = builder(options).from_path(path)?;
    read_records(rdr, options)
}

/// Load CSV data from any reader.
pub fn read_csv_from_reader<R: Read>(reader: R, options: &CsvOptions) -> FilterResult<DataSet> {
    read_records(builder(options).from_reader(reader), options)
}

fn builder(options: &CsvOptions) -> csv::ReaderBuilder {
    let mut b = csv::ReaderBuilder::new();
    b.has_headers(options.has_headers)
        .delimiter(options.delimiter)
        // Ragged rows are allowed; short rows read as undefined cells.
        .flexible(true);
    b
}

fn read_records<R: Read>(mut rdr: csv::Reader<R>, options: &CsvOptions) -> FilterResult<DataSet> {
    let headers: Vec<String> = if options.has_headers {
        rdr.headers()?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let h = h.trim();
                if h.is_empty() {
                    format!("Column {}", i + 1)
                } else {
                    h.to_string()
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|raw| to_cell(raw, options.trim))
                .collect::<Vec<_>>(),
        );
    }

    if options.has_headers {
        Ok(DataSet::new(headers, rows))
    } else {
        Ok(DataSet::without_headers(rows))
    }
}

fn to_cell(raw: &str, trim: bool) -> Value {
    if raw.trim().is_empty() {
        return Value::Null;
    }
    let text = if trim { raw.trim() } else { raw };
    Value::Utf8(text.to_string())
}
