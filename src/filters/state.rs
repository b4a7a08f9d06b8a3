//! Serializable filter snapshots.

use serde::{Deserialize, Serialize};

use crate::error::FilterResult;

use super::config::{FilterOperator, FilterValues};

/// The persisted part of one filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterStateEntry {
    pub id: String,
    pub active: bool,
    pub values: FilterValues,
    pub operator: FilterOperator,
}

/// Ordered snapshot of every managed filter's `active`, `values` and `operator`.
///
/// Serializes as a plain JSON array, suitable for session storage or for injection by an
/// automation collaborator through [`super::FilterEngine::import_filter_state`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterState {
    pub entries: Vec<FilterStateEntry>,
}

impl FilterState {
    pub fn new(entries: Vec<FilterStateEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&FilterStateEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn to_json(&self) -> FilterResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> FilterResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(input: &str) -> FilterResult<Self> {
        Ok(serde_json::from_str(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::config::{FilterValue, SearchFilter};

    #[test]
    fn json_round_trip() {
        let state = FilterState::new(vec![
            FilterStateEntry {
                id: "filter-0".into(),
                active: true,
                values: FilterValues::Select(vec![FilterValue::new("A", true)]),
                operator: FilterOperator::Equals,
            },
            FilterStateEntry {
                id: "filter-1".into(),
                active: false,
                values: FilterValues::Search(SearchFilter {
                    query: "x".into(),
                    ..Default::default()
                }),
                operator: FilterOperator::Contains,
            },
        ]);
        let json = state.to_json().unwrap();
        assert!(json.starts_with('['));
        assert_eq!(FilterState::from_json(&json).unwrap(), state);
        assert!(state.get("filter-1").is_some());
    }

    #[test]
    fn corrupt_json_is_an_error() {
        let err = FilterState::from_json("{not json").unwrap_err();
        assert!(err.to_string().contains("json error"));
    }
}
