//! `rust-data-filtering` infers column types over untyped tabular data, synthesizes a default
//! filter per column, and evaluates user-edited filters deterministically.
//!
//! The pipeline is:
//!
//! 1. load or build a [`types::DataSet`] (rows of loosely typed [`types::Value`]s)
//! 2. [`detection::detect_column_types`] classifies every column as number, string, boolean,
//!    date or mixed and collects unique values, null counts, samples and statistics
//! 3. [`filters::generate_filters`] turns the resulting [`types::ColumnInfo`]s into default
//!    [`filters::FilterConfig`]s (select, range, date, boolean, search, plus a null filter for
//!    columns with nulls)
//! 4. [`filters::FilterEngine`] holds the filters, applies the active ones with AND semantics,
//!    and exports/imports a JSON-serializable [`filters::FilterState`]
//!
//! Detection over large inputs can be moved off the calling thread with
//! [`execution::DetectionTaskRunner`], which discards results of superseded jobs.
//!
//! ## Quick example
//!
//! ```rust
//! use rust_data_filtering::detection::{detect_column_types, DetectionOptions};
//! use rust_data_filtering::filters::{FilterEngine, FilterUpdate, FilterValues, GeneratorOptions};
//! use rust_data_filtering::types::{ColumnType, DataSet, Value};
//!
//! let ds = DataSet::new(
//!     vec!["name".into(), "age".into()],
//!     vec![
//!         vec![Value::from("Ada"), Value::from("36")],
//!         vec![Value::from("Grace"), Value::from("85")],
//!         vec![Value::from("Linus"), Value::Null],
//!     ],
//! );
//!
//! let columns = detect_column_types(&ds, &DetectionOptions::default());
//! assert_eq!(columns[1].column_type, ColumnType::Number);
//! assert!(columns[1].has_nulls);
//!
//! let mut engine = FilterEngine::from_columns(&columns, &GeneratorOptions::default());
//! // name, age and the null filter for age.
//! assert_eq!(engine.filters().len(), 3);
//!
//! // Keep rows where age is not null.
//! engine.update_filter(
//!     "filter-1-null",
//!     FilterUpdate::values(FilterValues::Null(true))
//!         .with_operator(rust_data_filtering::filters::FilterOperator::IsNotNull),
//! );
//! assert_eq!(engine.apply_filters(&ds).row_count(), 2);
//! ```
//!
//! ## Modules
//!
//! - [`types`]: dataset, value and column metadata types
//! - [`detection`]: column type inference
//! - [`filters`]: filter configuration, generation, evaluation and persistence
//! - [`execution`]: background detection with stale-result discarding
//! - [`ingestion`]: CSV / JSON loaders producing untyped datasets
//! - [`error`]: error types shared across the crate

pub mod detection;
pub mod error;
pub mod execution;
pub mod filters;
pub mod ingestion;
pub mod types;

pub use error::{FilterError, FilterResult};
