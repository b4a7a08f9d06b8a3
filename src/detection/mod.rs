//! Column type inference.
//!
//! [`detect_column_types`] (or a configured [`TypeDetector`]) scans a raw [`crate::types::DataSet`]
//! and produces one [`crate::types::ColumnInfo`] per column: semantic type, null and distinct-value
//! counts, samples, and optional min/max/average statistics.
//!
//! Detection never fails. Unparseable cells are strings; columns whose cells disagree beyond
//! [`DetectionOptions::mixed_type_tolerance`] are `mixed`.
//!
//! For large inputs, run detection off the calling thread with
//! [`crate::execution::DetectionTaskRunner`].
//!
//! ```rust
//! use rust_data_filtering::detection::{detect_column_types, DetectionOptions};
//! use rust_data_filtering::types::{ColumnType, DataSet, Value};
//!
//! let ds = DataSet::from_matrix(
//!     vec![
//!         vec![Value::from("city"), Value::from("population")],
//!         vec![Value::from("Oslo"), Value::from("709000")],
//!         vec![Value::from("Bergen"), Value::Null],
//!     ],
//!     true,
//! );
//! let columns = detect_column_types(&ds, &DetectionOptions::default());
//! assert_eq!(columns[0].column_type, ColumnType::String);
//! assert_eq!(columns[1].column_type, ColumnType::Number);
//! assert!(columns[1].has_nulls);
//! ```

pub mod detector;
pub mod parse;

pub use detector::{DetectionOptions, TypeDetector, detect_column_types};
pub use parse::{cell_bool, cell_date, coerce_number, parse_bool_keyword, parse_date};
