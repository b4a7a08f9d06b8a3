//! Loaders that produce untyped [`crate::types::DataSet`]s.
//!
//! Cells come out as raw [`crate::types::Value`]s (text for CSV, JSON scalars for JSON); column
//! types are inferred afterwards by [`crate::detection`].
//!
//! Most callers should use [`load_from_path`] (from [`unified`]), which picks the reader from
//! the file extension. Format-specific functions live under [`csv`] and [`json`].

pub mod csv;
pub mod json;
pub mod unified;

pub use csv::{CsvOptions, read_csv_from_path, read_csv_from_reader};
pub use json::{JsonOptions, read_json_from_path, read_json_from_str};
pub use unified::{InputFormat, LoadOptions, load_from_path};
