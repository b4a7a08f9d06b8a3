//! Filter synthesis and evaluation.
//!
//! - [`generator`]: builds one default [`FilterConfig`] per column from detected
//!   [`crate::types::ColumnInfo`] (plus a `null` filter for columns with nulls)
//! - [`ranges`]: equal-width numeric bins for range filters
//! - [`engine`]: owns filter state and evaluates active filters against a dataset
//! - [`state`]: the JSON-serializable [`FilterState`] snapshot
//!
//! ## Example: detect → generate → filter
//!
//! ```rust
//! use rust_data_filtering::detection::{detect_column_types, DetectionOptions};
//! use rust_data_filtering::filters::{FilterEngine, FilterUpdate, FilterValues, GeneratorOptions};
//! use rust_data_filtering::types::{DataSet, Value};
//!
//! let ds = DataSet::from_matrix(
//!     vec![
//!         vec![Value::from("fruit"), Value::from("price")],
//!         vec![Value::from("apple"), Value::Float64(1.2)],
//!         vec![Value::from("pear"), Value::Float64(0.8)],
//!         vec![Value::from("apple"), Value::Float64(1.4)],
//!     ],
//!     true,
//! );
//! let columns = detect_column_types(&ds, &DetectionOptions::default());
//! let mut engine = FilterEngine::from_columns(&columns, &GeneratorOptions::default());
//!
//! // Select "apple" in the fruit filter.
//! let mut values = engine.filter("filter-0").unwrap().values.clone();
//! if let FilterValues::Select(options) = &mut values {
//!     for option in options.iter_mut() {
//!         option.selected = option.value == Value::from("apple");
//!     }
//! }
//! engine.update_filter("filter-0", FilterUpdate::values(values));
//!
//! let filtered = engine.apply_filters(&ds);
//! assert_eq!(filtered.row_count(), 2);
//!
//! // Persist and restore.
//! let json = engine.export_filter_state().to_json().unwrap();
//! let mut restored = FilterEngine::from_columns(&columns, &GeneratorOptions::default());
//! restored.import_filter_state(&rust_data_filtering::filters::FilterState::from_json(&json).unwrap());
//! assert_eq!(restored.apply_filters(&ds), filtered);
//! ```

pub mod config;
pub mod engine;
pub mod generator;
pub mod predicate;
pub mod ranges;
pub mod state;

pub use config::{
    DateRangeFilter, FilterConfig, FilterOperator, FilterType, FilterValue, FilterValues,
    NumericRange, RangeFilter, RangeMode, SearchFilter,
};
pub use engine::{FilterEngine, FilterUpdate};
pub use generator::{
    FilterSpecGenerator, GeneratorOptions, calculate_value_counts, extract_unique_values,
    extract_unique_values_sorted_by_count, generate_filters, null_filter,
};
pub use predicate::CompiledFilter;
pub use ranges::{generate_default_ranges, generate_ranges};
pub use state::{FilterState, FilterStateEntry};
