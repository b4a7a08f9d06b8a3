//! Column type detection over an untyped [`DataSet`].
//!
//! Every non-blank cell is classified against, in order: boolean keyword, number, date, string.
//! A cell can support more than one type (`"1"` is both a boolean keyword and a number), so the
//! column decision looks at per-type support rather than only at the first match:
//!
//! 1. boolean, number, date (in that order): the first type supported by all but
//!    `mixed_type_tolerance` of the non-null cells wins;
//! 2. otherwise `string` if string cells dominate the same way;
//! 3. otherwise `mixed`.
//!
//! Blank strings count as nulls, exactly like `undefined` and `null`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::types::{ColumnInfo, ColumnStatistics, ColumnType, DataSet, Value, ValueCount};

use super::parse::{cell_bool, cell_date, coerce_number};

/// Options controlling type detection.
///
/// Use [`Default`] for common cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DetectionOptions {
    /// Maximum number of distinct values tracked per column.
    ///
    /// Once reached, new distinct values are no longer recorded and `unique_count` saturates at
    /// this value. Occurrence counts of already tracked values stay exact.
    pub unique_values_tracking_cap: usize,
    /// Maximum length of the returned `unique_values` list.
    pub unique_values_return_limit: usize,
    /// Number of leading non-null values kept in `sample_values`.
    pub sample_values_count: usize,
    /// Compute min/max (and average for numbers) for number and date columns.
    pub compute_statistics: bool,
    /// Fraction of non-null cells allowed to disagree with the column type before the column is
    /// classified `mixed`.
    pub mixed_type_tolerance: f64,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            unique_values_tracking_cap: 2_000,
            unique_values_return_limit: 1_000,
            sample_values_count: 5,
            compute_statistics: true,
            mixed_type_tolerance: 0.05,
        }
    }
}

/// Infers a [`ColumnInfo`] for every column of a dataset.
#[derive(Debug, Clone, Default)]
pub struct TypeDetector {
    options: DetectionOptions,
}

impl TypeDetector {
    pub fn new(options: DetectionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DetectionOptions {
        &self.options
    }

    /// Detect all columns. Columns are scanned in parallel; output is in column order.
    #[instrument(
        level = "debug",
        skip_all,
        fields(rows = dataset.row_count(), columns = dataset.column_count())
    )]
    pub fn detect(&self, dataset: &DataSet) -> Vec<ColumnInfo> {
        let columns: Vec<ColumnInfo> = (0..dataset.column_count())
            .into_par_iter()
            .map(|index| self.detect_column(dataset, index))
            .collect();

        info!(
            rows = dataset.row_count(),
            columns = columns.len(),
            "column type detection finished"
        );
        columns
    }

    /// Detect a single column by position.
    pub fn detect_column(&self, dataset: &DataSet, index: usize) -> ColumnInfo {
        let mut acc = ColumnAccumulator::new(&self.options);
        for cell in dataset.column_values(index) {
            acc.observe(cell);
        }
        let info = acc.finish(dataset.column_name(index), index);
        debug!(
            column = %info.name,
            index,
            column_type = %info.column_type,
            unique_count = info.unique_count,
            null_count = info.null_count,
            "column classified"
        );
        info
    }
}

/// Detect column types with the given options.
///
/// This is a convenience wrapper around [`TypeDetector::detect`].
pub fn detect_column_types(dataset: &DataSet, options: &DetectionOptions) -> Vec<ColumnInfo> {
    TypeDetector::new(options.clone()).detect(dataset)
}

#[derive(Debug, Default)]
struct NumberSummary {
    min: Option<f64>,
    max: Option<f64>,
    finite_sum: f64,
    finite_count: usize,
}

impl NumberSummary {
    fn observe(&mut self, v: f64) {
        // f64::min/max ignore a NaN operand, so NaN only survives when every value is NaN.
        self.min = Some(self.min.map_or(v, |m| m.min(v)));
        self.max = Some(self.max.map_or(v, |m| m.max(v)));
        if v.is_finite() {
            self.finite_sum += v;
            self.finite_count += 1;
        }
    }

    fn statistics(&self) -> Option<ColumnStatistics> {
        let (min, max) = (self.min?, self.max?);
        let average = (self.finite_count > 0).then(|| self.finite_sum / self.finite_count as f64);
        Some(ColumnStatistics::Number { min, max, average })
    }
}

#[derive(Debug, Default)]
struct DateSummary {
    bounds: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl DateSummary {
    fn observe(&mut self, d: DateTime<Utc>) {
        self.bounds = Some(match self.bounds {
            Some((min, max)) => (min.min(d), max.max(d)),
            None => (d, d),
        });
    }

    fn statistics(&self) -> Option<ColumnStatistics> {
        self.bounds
            .map(|(min, max)| ColumnStatistics::Date { min, max })
    }
}

/// Single-pass state for one column.
struct ColumnAccumulator<'a> {
    options: &'a DetectionOptions,
    null_count: usize,
    non_null: usize,
    bool_support: usize,
    number_support: usize,
    date_support: usize,
    string_primary: usize,
    seen: HashMap<Value, usize>,
    uniques: Vec<ValueCount>,
    samples: Vec<Value>,
    numbers: NumberSummary,
    dates: DateSummary,
}

impl<'a> ColumnAccumulator<'a> {
    fn new(options: &'a DetectionOptions) -> Self {
        Self {
            options,
            null_count: 0,
            non_null: 0,
            bool_support: 0,
            number_support: 0,
            date_support: 0,
            string_primary: 0,
            seen: HashMap::new(),
            uniques: Vec::new(),
            samples: Vec::new(),
            numbers: NumberSummary::default(),
            dates: DateSummary::default(),
        }
    }

    fn observe(&mut self, cell: &Value) {
        if cell.is_blank() {
            self.null_count += 1;
            return;
        }
        self.non_null += 1;

        let as_bool = cell_bool(cell);
        let as_number = coerce_number(cell);
        let as_date = if as_number.is_none() { cell_date(cell) } else { None };

        if as_bool.is_some() {
            self.bool_support += 1;
        }
        if let Some(n) = as_number {
            self.number_support += 1;
            self.numbers.observe(n);
        }
        if let Some(d) = as_date {
            self.date_support += 1;
            self.dates.observe(d);
        }
        if as_bool.is_none() && as_number.is_none() && as_date.is_none() {
            self.string_primary += 1;
        }

        if let Some(&slot) = self.seen.get(cell) {
            self.uniques[slot].count += 1;
        } else if self.seen.len() < self.options.unique_values_tracking_cap {
            self.seen.insert(cell.clone(), self.uniques.len());
            self.uniques.push(ValueCount::new(cell.clone(), 1));
        }

        if self.samples.len() < self.options.sample_values_count {
            self.samples.push(cell.clone());
        }
    }

    fn resolve_type(&self) -> ColumnType {
        if self.non_null == 0 {
            return ColumnType::String;
        }
        let tolerance = self.options.mixed_type_tolerance.clamp(0.0, 1.0);
        let allowed_outliers = (tolerance * self.non_null as f64).floor() as usize;
        let required = self.non_null.saturating_sub(allowed_outliers).max(1);

        let candidates = [
            (ColumnType::Boolean, self.bool_support),
            (ColumnType::Number, self.number_support),
            (ColumnType::Date, self.date_support),
            (ColumnType::String, self.string_primary),
        ];
        candidates
            .into_iter()
            .find(|(_, support)| *support >= required)
            .map(|(column_type, _)| column_type)
            .unwrap_or(ColumnType::Mixed)
    }

    fn finish(self, name: String, index: usize) -> ColumnInfo {
        let column_type = self.resolve_type();
        let statistics = if self.options.compute_statistics {
            match column_type {
                ColumnType::Number => self.numbers.statistics(),
                ColumnType::Date => self.dates.statistics(),
                _ => None,
            }
        } else {
            None
        };

        let unique_count = self.uniques.len();
        let mut unique_values = self.uniques;
        unique_values.truncate(self.options.unique_values_return_limit);

        ColumnInfo {
            name,
            index,
            column_type,
            unique_values,
            unique_count,
            has_nulls: self.null_count > 0,
            null_count: self.null_count,
            sample_values: self.samples,
            statistics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DetectionOptions, TypeDetector, detect_column_types};
    use crate::types::{ColumnStatistics, ColumnType, DataSet, Value};

    fn single_column(values: Vec<Value>) -> DataSet {
        DataSet::new(
            vec!["col".to_string()],
            values.into_iter().map(|v| vec![v]).collect(),
        )
    }

    fn strs(values: &[&str]) -> Vec<Value> {
        values.iter().map(|s| Value::from(*s)).collect()
    }

    fn detect_one(values: Vec<Value>) -> crate::types::ColumnInfo {
        let ds = single_column(values);
        TypeDetector::default().detect_column(&ds, 0)
    }

    #[test]
    fn classifies_boolean_keywords() {
        let info = detect_one(strs(&["yes", "No", "TRUE", "false"]));
        assert_eq!(info.column_type, ColumnType::Boolean);
        assert!(info.statistics.is_none());
    }

    #[test]
    fn zero_one_strings_resolve_to_boolean_but_wider_ints_to_number() {
        assert_eq!(detect_one(strs(&["1", "0", "1"])).column_type, ColumnType::Boolean);
        assert_eq!(detect_one(strs(&["1", "0", "2", "15"])).column_type, ColumnType::Number);
    }

    #[test]
    fn classifies_numbers_with_statistics() {
        let info = detect_one(vec![
            Value::Int64(10),
            Value::from("20"),
            Value::Float64(30.0),
            Value::Null,
        ]);
        assert_eq!(info.column_type, ColumnType::Number);
        assert_eq!(
            info.statistics,
            Some(ColumnStatistics::Number {
                min: 10.0,
                max: 30.0,
                average: Some(20.0)
            })
        );
        assert!(info.has_nulls);
        assert_eq!(info.null_count, 1);
    }

    #[test]
    fn infinity_is_a_preserved_bound() {
        let info = detect_one(vec![
            Value::Float64(1.0),
            Value::Float64(f64::INFINITY),
            Value::Float64(f64::NAN),
            Value::Float64(3.0),
        ]);
        assert_eq!(info.column_type, ColumnType::Number);
        match info.statistics {
            Some(ColumnStatistics::Number { min, max, average }) => {
                assert_eq!(min, 1.0);
                assert_eq!(max, f64::INFINITY);
                assert_eq!(average, Some(2.0));
            }
            other => panic!("expected number statistics, got {other:?}"),
        }
    }

    #[test]
    fn classifies_dates_with_bounds() {
        let info = detect_one(strs(&["2024-01-05", "2023-12-31", "2024-02-10"]));
        assert_eq!(info.column_type, ColumnType::Date);
        let (min, max) = info.date_bounds().unwrap();
        assert_eq!(min.to_rfc3339(), "2023-12-31T00:00:00+00:00");
        assert_eq!(max.to_rfc3339(), "2024-02-10T00:00:00+00:00");
    }

    #[test]
    fn disagreeing_types_become_mixed() {
        let info = detect_one(strs(&["12", "apple", "2024-01-01", "7", "pear", "9"]));
        assert_eq!(info.column_type, ColumnType::Mixed);
    }

    #[test]
    fn small_minority_is_tolerated() {
        let mut values: Vec<Value> = (0..99).map(Value::Int64).collect();
        values.push(Value::from("n/a"));
        assert_eq!(detect_one(values).column_type, ColumnType::Number);
    }

    #[test]
    fn null_undefined_and_blank_count_as_nulls() {
        let info = detect_one(vec![
            Value::from("a"),
            Value::Null,
            Value::Undefined,
            Value::from("  "),
        ]);
        assert_eq!(info.null_count, 3);
        assert_eq!(info.unique_count, 1);
        assert_eq!(info.column_type, ColumnType::String);
    }

    #[test]
    fn all_null_column_is_string_with_no_uniques() {
        let info = detect_one(vec![Value::Null, Value::Null]);
        assert_eq!(info.column_type, ColumnType::String);
        assert_eq!(info.unique_count, 0);
        assert!(info.sample_values.is_empty());
    }

    #[test]
    fn unique_tracking_saturates_at_cap() {
        let values: Vec<Value> = (0..50).map(|i| Value::Utf8(format!("v{i}"))).collect();
        let ds = single_column(values);
        let opts = DetectionOptions {
            unique_values_tracking_cap: 10,
            unique_values_return_limit: 4,
            ..Default::default()
        };
        let info = TypeDetector::new(opts).detect_column(&ds, 0);
        assert_eq!(info.unique_count, 10);
        assert_eq!(info.unique_values.len(), 4);
        assert_eq!(info.unique_values[0].value, Value::from("v0"));
    }

    #[test]
    fn unique_values_carry_counts_in_first_seen_order() {
        let info = detect_one(strs(&["b", "a", "b", "b"]));
        assert_eq!(info.unique_values[0].value, Value::from("b"));
        assert_eq!(info.unique_values[0].count, 3);
        assert_eq!(info.unique_values[1].count, 1);
    }

    #[test]
    fn samples_are_first_non_null_values() {
        let info = detect_one(vec![
            Value::Null,
            Value::Int64(1),
            Value::Int64(2),
            Value::Int64(3),
            Value::Int64(4),
            Value::Int64(5),
            Value::Int64(6),
        ]);
        assert_eq!(
            info.sample_values,
            (1..=5).map(Value::Int64).collect::<Vec<_>>()
        );
    }

    #[test]
    fn statistics_can_be_disabled() {
        let ds = single_column(vec![Value::Int64(1), Value::Int64(2)]);
        let opts = DetectionOptions {
            compute_statistics: false,
            ..Default::default()
        };
        let cols = detect_column_types(&ds, &opts);
        assert_eq!(cols[0].column_type, ColumnType::Number);
        assert!(cols[0].statistics.is_none());
    }

    #[test]
    fn index_matches_column_position() {
        let ds = DataSet::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![vec![Value::Int64(1), Value::from("x"), Value::Bool(true)]],
        );
        let cols = TypeDetector::default().detect(&ds);
        assert_eq!(cols.len(), 3);
        for (i, col) in cols.iter().enumerate() {
            assert_eq!(col.index, i);
        }
        assert_eq!(cols[1].name, "b");
        assert_eq!(cols[2].column_type, ColumnType::Boolean);
    }
}
