//! Automatic filter synthesis from inferred column metadata.
//!
//! [`generate_filters`] emits one primary [`FilterConfig`] per column, chosen by column type and
//! cardinality, followed by a `null` filter for every column that contains nulls:
//!
//! | column type | condition | filter | operator |
//! |---|---|---|---|
//! | string | `0 < unique_count <= 1000` | select | equals |
//! | string | otherwise | search | contains |
//! | number | always | range (bins when >= 5 finite samples) | between |
//! | date | always | date | between |
//! | boolean | always | boolean | equals |
//! | mixed | always | search | contains |

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::detection::coerce_number;
use crate::types::{ColumnInfo, ColumnStatistics, ColumnType, DataSet, Value};

use super::config::{
    DateRangeFilter, FilterConfig, FilterOperator, FilterValue, FilterValues, RangeFilter,
    SearchFilter,
};
use super::ranges::{DEFAULT_BIN_COUNT, generate_ranges};

/// Default cap on the number of values a `select` filter may list.
pub const SELECT_CARDINALITY_LIMIT: usize = 1_000;

/// Options controlling filter generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorOptions {
    /// String columns with more distinct values than this get a search filter.
    pub select_cardinality_limit: usize,
    /// Minimum number of finite numeric samples required before bins are generated.
    pub min_samples_for_bins: usize,
    /// Number of bins for range filters.
    pub bin_count: usize,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            select_cardinality_limit: SELECT_CARDINALITY_LIMIT,
            min_samples_for_bins: 5,
            bin_count: DEFAULT_BIN_COUNT,
        }
    }
}

/// Builds default [`FilterConfig`]s from [`ColumnInfo`]s.
#[derive(Debug, Clone, Default)]
pub struct FilterSpecGenerator {
    options: GeneratorOptions,
}

impl FilterSpecGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Generate filters for all columns, in column index order.
    ///
    /// Returns `columns.len()` primary filters plus one `null` filter per column with nulls.
    #[instrument(level = "debug", skip_all, fields(columns = columns.len()))]
    pub fn generate(&self, columns: &[ColumnInfo]) -> Vec<FilterConfig> {
        let mut ordered: Vec<&ColumnInfo> = columns.iter().collect();
        ordered.sort_by_key(|c| c.index);

        let mut filters = Vec::with_capacity(columns.len() * 2);
        for column in ordered {
            filters.extend(self.filters_for_column(column));
        }
        debug!(filters = filters.len(), "generated filters");
        filters
    }

    /// The default filters of one column: its primary filter, then its null filter if any.
    pub fn filters_for_column(&self, column: &ColumnInfo) -> Vec<FilterConfig> {
        let mut out = vec![self.primary_filter(column)];
        if column.has_nulls {
            out.push(null_filter(column));
        }
        out
    }

    /// The primary (non-null) filter for a column.
    pub fn primary_filter(&self, column: &ColumnInfo) -> FilterConfig {
        let (operator, values) = match column.column_type {
            ColumnType::String
                if column.unique_count > 0
                    && column.unique_count <= self.options.select_cardinality_limit =>
            {
                (FilterOperator::Equals, self.select_values(column))
            }
            ColumnType::Number => (FilterOperator::Between, self.range_values(column)),
            ColumnType::Date => (FilterOperator::Between, date_values(column)),
            ColumnType::Boolean => (FilterOperator::Equals, FilterValues::Boolean(None)),
            ColumnType::String | ColumnType::Mixed => (
                FilterOperator::Contains,
                FilterValues::Search(SearchFilter::default()),
            ),
        };

        FilterConfig {
            id: format!("filter-{}", column.index),
            column: column.name.clone(),
            column_index: column.index,
            active: false,
            operator,
            values,
            display_name: column.name.clone(),
        }
    }

    fn select_values(&self, column: &ColumnInfo) -> FilterValues {
        FilterValues::Select(
            column
                .unique_values
                .iter()
                .take(self.options.select_cardinality_limit)
                .map(|vc| FilterValue {
                    value: vc.value.clone(),
                    selected: false,
                    count: Some(vc.count),
                })
                .collect(),
        )
    }

    fn range_values(&self, column: &ColumnInfo) -> FilterValues {
        let (min, max) = column.number_bounds().unwrap_or((0.0, 0.0));
        let mut range = RangeFilter::continuous(min, max);

        let samples: Vec<f64> = column
            .sample_values
            .iter()
            .filter_map(coerce_number)
            .filter(|v| v.is_finite())
            .collect();
        if samples.len() >= self.options.min_samples_for_bins {
            let bins = generate_ranges(min, max, &samples, self.options.bin_count);
            range.selected_range_ids = Some(bins.iter().map(|b| b.id.clone()).collect());
            range.ranges = Some(bins);
        }
        FilterValues::Range(range)
    }
}

/// Generate filters with the default [`GeneratorOptions`].
pub fn generate_filters(columns: &[ColumnInfo]) -> Vec<FilterConfig> {
    FilterSpecGenerator::default().generate(columns)
}

/// The `null` filter for a column (`is_null`, values `true`).
pub fn null_filter(column: &ColumnInfo) -> FilterConfig {
    FilterConfig {
        id: format!("filter-{}-null", column.index),
        column: column.name.clone(),
        column_index: column.index,
        active: false,
        operator: FilterOperator::IsNull,
        values: FilterValues::Null(true),
        display_name: format!("{} (Nulls)", column.name),
    }
}

fn date_values(column: &ColumnInfo) -> FilterValues {
    let (earliest, latest) = match &column.statistics {
        Some(ColumnStatistics::Date { min, max }) => (Some(*min), Some(*max)),
        // Numeric bounds are read as epoch milliseconds.
        Some(ColumnStatistics::Number { min, max, .. }) => {
            (millis_to_date(*min), millis_to_date(*max))
        }
        None => (None, None),
    };
    let earliest = earliest.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    let latest = latest.unwrap_or_else(Utc::now);

    FilterValues::Date(DateRangeFilter {
        earliest,
        latest,
        current_start: earliest,
        current_end: latest,
    })
}

fn millis_to_date(ms: f64) -> Option<DateTime<Utc>> {
    if !ms.is_finite() {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(ms as i64)
}

/// Distinct values of a column with occurrence counts, in first-seen order.
///
/// `Undefined` is counted as `Null`. The result is a plain prefix cut at `max_values` entries,
/// not a top-K by frequency; see [`extract_unique_values_sorted_by_count`] for that.
pub fn extract_unique_values(
    dataset: &DataSet,
    column_index: usize,
    max_values: usize,
) -> Vec<FilterValue> {
    let mut counts = ordered_counts(dataset, column_index);
    counts.truncate(max_values);
    counts
        .into_iter()
        .map(|(value, count)| FilterValue {
            value,
            selected: false,
            count: Some(count),
        })
        .collect()
}

/// Like [`extract_unique_values`] but keeps the `max_values` most frequent values, most frequent
/// first. Ties keep first-seen order.
pub fn extract_unique_values_sorted_by_count(
    dataset: &DataSet,
    column_index: usize,
    max_values: usize,
) -> Vec<FilterValue> {
    let mut counts = ordered_counts(dataset, column_index);
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(max_values);
    counts
        .into_iter()
        .map(|(value, count)| FilterValue {
            value,
            selected: false,
            count: Some(count),
        })
        .collect()
}

/// Occurrence count of every value in a column, with `Undefined` counted as `Null`.
pub fn calculate_value_counts(dataset: &DataSet, column_index: usize) -> HashMap<Value, usize> {
    let mut counts = HashMap::new();
    for cell in dataset.column_values(column_index) {
        *counts.entry(cell.normalized()).or_insert(0) += 1;
    }
    counts
}

fn ordered_counts(dataset: &DataSet, column_index: usize) -> Vec<(Value, usize)> {
    let mut slots: HashMap<Value, usize> = HashMap::new();
    let mut out: Vec<(Value, usize)> = Vec::new();
    for cell in dataset.column_values(column_index) {
        let key = cell.normalized();
        match slots.get(&key) {
            Some(&slot) => out[slot].1 += 1,
            None => {
                slots.insert(key.clone(), out.len());
                out.push((key, 1));
            }
        }
    }
    out
}
