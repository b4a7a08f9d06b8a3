//! Filter specification types.
//!
//! A [`FilterConfig`] is one column's filter and its current state. Its payload is the
//! [`FilterValues`] sum type: each filter type carries its own value shape, and the filter's
//! [`FilterType`] is derived from the payload rather than stored separately.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Value;

/// Kind of filter, as exposed to UI collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    Select,
    Range,
    Search,
    Date,
    Boolean,
    Null,
}

/// Comparison applied by a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    Between,
    Contains,
    IsNull,
    IsNotNull,
}

/// One selectable value of a `select` filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterValue {
    pub value: Value,
    pub selected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl FilterValue {
    pub fn new(value: impl Into<Value>, selected: bool) -> Self {
        Self {
            value: value.into(),
            selected,
            count: None,
        }
    }
}

/// How a range filter constrains values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeMode {
    /// `[current_min, current_max]` slider.
    Continuous,
    /// Union of the selected bins.
    Binned,
}

/// A labeled sub-interval of a numeric column's domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericRange {
    pub id: String,
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub include_min: bool,
    pub include_max: bool,
}

impl NumericRange {
    /// Whether `v` lies in the interval, honoring the boundary flags.
    pub fn contains(&self, v: f64) -> bool {
        let above = if self.include_min { v >= self.min } else { v > self.min };
        let below = if self.include_max { v <= self.max } else { v < self.max };
        above && below
    }
}

/// Payload of a `range` filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeFilter {
    pub min: f64,
    pub max: f64,
    pub current_min: f64,
    pub current_max: f64,
    pub mode: RangeMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranges: Option<Vec<NumericRange>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_range_ids: Option<Vec<String>>,
}

impl RangeFilter {
    /// A continuous filter spanning `[min, max]` with no bins.
    pub fn continuous(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            current_min: min,
            current_max: max,
            mode: RangeMode::Continuous,
            ranges: None,
            selected_range_ids: None,
        }
    }

    /// Drop selected ids that do not name one of `ranges`.
    ///
    /// Returns the number of ids removed.
    pub fn retain_known_range_ids(&mut self) -> usize {
        let Some(selected) = self.selected_range_ids.as_mut() else {
            return 0;
        };
        let before = selected.len();
        let ranges = self.ranges.as_deref().unwrap_or_default();
        selected.retain(|id| ranges.iter().any(|r| &r.id == id));
        before - selected.len()
    }
}

/// Payload of a `date` filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeFilter {
    pub earliest: DateTime<Utc>,
    pub latest: DateTime<Utc>,
    pub current_start: DateTime<Utc>,
    pub current_end: DateTime<Utc>,
}

/// Payload of a `search` filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilter {
    pub query: String,
    pub case_sensitive: bool,
    pub exact_match: bool,
}

/// Filter payload, one variant per [`FilterType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum FilterValues {
    Select(Vec<FilterValue>),
    Range(RangeFilter),
    Search(SearchFilter),
    Date(DateRangeFilter),
    /// `None` means no constraint.
    Boolean(Option<bool>),
    /// `true` enables the null check; the operator picks `is_null` vs `is_not_null`.
    Null(bool),
}

impl FilterValues {
    pub fn filter_type(&self) -> FilterType {
        match self {
            FilterValues::Select(_) => FilterType::Select,
            FilterValues::Range(_) => FilterType::Range,
            FilterValues::Search(_) => FilterType::Search,
            FilterValues::Date(_) => FilterType::Date,
            FilterValues::Boolean(_) => FilterType::Boolean,
            FilterValues::Null(_) => FilterType::Null,
        }
    }
}

/// A single column's filter specification and current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    /// Unique within one generation batch (`filter-<index>` / `filter-<index>-null`).
    pub id: String,
    /// Column name.
    pub column: String,
    pub column_index: usize,
    pub active: bool,
    pub operator: FilterOperator,
    pub values: FilterValues,
    pub display_name: String,
}

impl FilterConfig {
    pub fn filter_type(&self) -> FilterType {
        self.values.filter_type()
    }

    /// Selected values of a `select` filter (empty for other types).
    pub fn selected_values(&self) -> Vec<&Value> {
        match &self.values {
            FilterValues::Select(values) => values
                .iter()
                .filter(|v| v.selected)
                .map(|v| &v.value)
                .collect(),
            _ => Vec::new(),
        }
    }
}
