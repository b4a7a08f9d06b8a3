//! Per-type row predicates.
//!
//! A [`FilterConfig`] is compiled once per evaluation into a [`CompiledFilter`] (selected-value
//! set, folded search needle, bin list, ...) and then tested against every row.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::detection::{cell_bool, cell_date, coerce_number};
use crate::types::Value;

use super::config::{FilterConfig, FilterOperator, FilterValues, NumericRange, RangeMode};

static MISSING: Value = Value::Null;

#[derive(Debug)]
enum Predicate<'a> {
    /// No constraint.
    Pass,
    /// Nothing can match.
    Reject,
    Select(HashSet<&'a Value>),
    Continuous { min: f64, max: f64 },
    Binned(Vec<&'a NumericRange>),
    Search { needle: String, fold_case: bool, exact: bool },
    Date { start: DateTime<Utc>, end: DateTime<Utc> },
    Boolean(bool),
    Null { want_null: bool },
}

/// A filter prepared for repeated row evaluation.
#[derive(Debug)]
pub struct CompiledFilter<'a> {
    column_index: usize,
    predicate: Predicate<'a>,
}

impl<'a> CompiledFilter<'a> {
    /// Compile a filter. The `active` flag is not consulted; callers decide which filters apply.
    pub fn compile(config: &'a FilterConfig) -> Self {
        let predicate = match &config.values {
            FilterValues::Select(values) => {
                let selected: HashSet<&Value> = values
                    .iter()
                    .filter(|v| v.selected)
                    .map(|v| match v.value {
                        Value::Undefined => &MISSING,
                        _ => &v.value,
                    })
                    .collect();
                if selected.is_empty() {
                    Predicate::Pass
                } else {
                    Predicate::Select(selected)
                }
            }
            FilterValues::Range(range) => match range.mode {
                RangeMode::Continuous => Predicate::Continuous {
                    min: range.current_min,
                    max: range.current_max,
                },
                RangeMode::Binned => {
                    let ids = range.selected_range_ids.as_deref().unwrap_or_default();
                    let bins: Vec<&NumericRange> = range
                        .ranges
                        .as_deref()
                        .unwrap_or_default()
                        .iter()
                        .filter(|r| ids.contains(&r.id))
                        .collect();
                    if bins.is_empty() {
                        Predicate::Reject
                    } else {
                        Predicate::Binned(bins)
                    }
                }
            },
            FilterValues::Search(search) => {
                if search.query.is_empty() {
                    Predicate::Pass
                } else {
                    let fold_case = !search.case_sensitive;
                    Predicate::Search {
                        needle: if fold_case {
                            search.query.to_lowercase()
                        } else {
                            search.query.clone()
                        },
                        fold_case,
                        exact: search.exact_match || config.operator == FilterOperator::Equals,
                    }
                }
            }
            FilterValues::Date(date) => Predicate::Date {
                start: date.current_start,
                end: date.current_end,
            },
            FilterValues::Boolean(None) => Predicate::Pass,
            FilterValues::Boolean(Some(b)) => Predicate::Boolean(*b),
            FilterValues::Null(false) => Predicate::Pass,
            FilterValues::Null(true) => Predicate::Null {
                want_null: config.operator != FilterOperator::IsNotNull,
            },
        };

        Self {
            column_index: config.column_index,
            predicate,
        }
    }

    /// Whether `row` satisfies the filter. Cells beyond the row's end read as null.
    pub fn matches(&self, row: &[Value]) -> bool {
        let cell = row.get(self.column_index).unwrap_or(&MISSING);
        match &self.predicate {
            Predicate::Pass => true,
            Predicate::Reject => false,
            Predicate::Select(selected) => {
                if matches!(cell, Value::Undefined) {
                    selected.contains(&MISSING)
                } else {
                    selected.contains(cell)
                }
            }
            Predicate::Continuous { min, max } => {
                coerce_number(cell).is_some_and(|v| v >= *min && v <= *max)
            }
            Predicate::Binned(bins) => {
                coerce_number(cell).is_some_and(|v| bins.iter().any(|b| b.contains(v)))
            }
            Predicate::Search {
                needle,
                fold_case,
                exact,
            } => {
                let text = cell.to_search_text();
                let hay = if *fold_case { text.to_lowercase() } else { text };
                if *exact {
                    hay == *needle
                } else {
                    hay.contains(needle.as_str())
                }
            }
            Predicate::Date { start, end } => {
                cell_date(cell).is_some_and(|d| d >= *start && d <= *end)
            }
            Predicate::Boolean(expected) => cell_bool(cell) == Some(*expected),
            Predicate::Null { want_null } => cell.is_blank() == *want_null,
        }
    }
}

impl FilterConfig {
    /// Evaluate this filter against one row, ignoring `active`.
    ///
    /// For many rows, compile once with [`CompiledFilter::compile`] instead.
    pub fn matches_row(&self, row: &[Value]) -> bool {
        CompiledFilter::compile(self).matches(row)
    }
}
