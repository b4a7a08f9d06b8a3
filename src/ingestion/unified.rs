//! Path-based loading with format inference.

use std::path::Path;

use tracing::{debug, info};

use crate::error::{FilterError, FilterResult};
use crate::types::DataSet;

use super::csv::{CsvOptions, read_csv_from_path};
use super::json::{JsonOptions, read_json_from_path};

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Comma-separated values.
    Csv,
    /// Tab-separated values.
    Tsv,
    /// JSON array/object or NDJSON.
    Json,
}

impl InputFormat {
    /// Parse an input format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "tsv" | "tab" => Some(Self::Tsv),
            "json" | "ndjson" | "jsonl" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Options for [`load_from_path`].
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// If `None`, the format is inferred from the file extension.
    pub format: Option<InputFormat>,
    pub csv: CsvOptions,
    pub json: JsonOptions,
}

/// Load a file into an untyped [`DataSet`], choosing the reader by extension.
///
/// ```no_run
/// use rust_data_filtering::ingestion::{load_from_path, LoadOptions};
///
/// # fn main() -> Result<(), rust_data_filtering::FilterError> {
/// let ds = load_from_path("people.csv", &LoadOptions::default())?;
/// println!("rows={}", ds.row_count());
/// # Ok(())
/// # }
/// ```
pub fn load_from_path(path: impl AsRef<Path>, options: &LoadOptions) -> FilterResult<DataSet> {
    let path = path.as_ref();
    let format = match options.format {
        Some(f) => f,
        None => infer_format(path)?,
    };
    debug!(path = %path.display(), ?format, "loading dataset");

    let ds = match format {
        InputFormat::Csv => read_csv_from_path(path, &options.csv)?,
        InputFormat::Tsv => {
            let csv = CsvOptions {
                delimiter: b'\t',
                ..options.csv.clone()
            };
            read_csv_from_path(path, &csv)?
        }
        InputFormat::Json => read_json_from_path(path, &options.json)?,
    };

    info!(
        path = %path.display(),
        rows = ds.row_count(),
        columns = ds.column_count(),
        "dataset loaded"
    );
    Ok(ds)
}

fn infer_format(path: &Path) -> FilterResult<InputFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| FilterError::InvalidInput {
            message: format!(
                "cannot infer input format: '{}' has no extension",
                path.display()
            ),
        })?;
    InputFormat::from_extension(ext).ok_or_else(|| FilterError::InvalidInput {
        message: format!("unsupported file extension '.{ext}'"),
    })
}
