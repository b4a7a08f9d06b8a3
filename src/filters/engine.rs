//! Stateful filter evaluation.
//!
//! A [`FilterEngine`] exclusively owns the [`FilterConfig`]s it was built with. Filters are
//! mutated in place through [`FilterEngine::update_filter`], [`FilterEngine::reset_filter`] and
//! [`FilterEngine::import_filter_state`]; operations naming an unknown filter id are no-ops,
//! since UI and automation collaborators may hold stale filter lists.
//!
//! Evaluation is synchronous and single-threaded: a row survives iff every active filter matches
//! it. Callers serialize concurrent mutation and debounce frequent re-application themselves.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::types::{ColumnInfo, DataSet};

use super::config::{FilterConfig, FilterOperator, FilterValues};
use super::generator::{FilterSpecGenerator, GeneratorOptions};
use super::predicate::CompiledFilter;
use super::state::{FilterState, FilterStateEntry};

/// A partial update merged into a [`FilterConfig`].
///
/// Supplying `values` or `operator` activates the filter unless `active` is explicitly `false`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterUpdate {
    pub active: Option<bool>,
    pub operator: Option<FilterOperator>,
    pub values: Option<FilterValues>,
    pub display_name: Option<String>,
}

impl FilterUpdate {
    /// Update carrying new values.
    pub fn values(values: FilterValues) -> Self {
        Self {
            values: Some(values),
            ..Default::default()
        }
    }

    /// Update carrying a new operator.
    pub fn operator(operator: FilterOperator) -> Self {
        Self {
            operator: Some(operator),
            ..Default::default()
        }
    }

    /// Update that only toggles the filter.
    pub fn active(active: bool) -> Self {
        Self {
            active: Some(active),
            ..Default::default()
        }
    }

    pub fn with_values(mut self, values: FilterValues) -> Self {
        self.values = Some(values);
        self
    }

    pub fn with_operator(mut self, operator: FilterOperator) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }
}

/// Owns a set of filters and evaluates them against datasets.
#[derive(Debug, Clone)]
pub struct FilterEngine {
    filters: Vec<FilterConfig>,
    /// Freshly generated state of every filter, used by resets.
    defaults: Vec<FilterConfig>,
}

impl FilterEngine {
    /// Take ownership of `filters`.
    ///
    /// The filters as given (with `active` cleared) are the defaults that
    /// [`reset_filter`](Self::reset_filter) restores, so pass freshly generated configs.
    pub fn new(filters: Vec<FilterConfig>) -> Self {
        let defaults = filters
            .iter()
            .cloned()
            .map(|mut f| {
                f.active = false;
                f
            })
            .collect();
        Self { filters, defaults }
    }

    /// Generate filters for `columns` and manage them.
    pub fn from_columns(columns: &[ColumnInfo], options: &GeneratorOptions) -> Self {
        Self::new(FilterSpecGenerator::new(options.clone()).generate(columns))
    }

    /// All managed filters, in generation order.
    pub fn filters(&self) -> &[FilterConfig] {
        &self.filters
    }

    pub fn filter(&self, id: &str) -> Option<&FilterConfig> {
        self.filters.iter().find(|f| f.id == id)
    }

    pub fn active_filters(&self) -> impl Iterator<Item = &FilterConfig> + '_ {
        self.filters.iter().filter(|f| f.active)
    }

    pub fn active_filter_count(&self) -> usize {
        self.active_filters().count()
    }

    /// Return the rows of `dataset` that satisfy every active filter, in original order.
    ///
    /// With no active filters the dataset is returned unchanged.
    #[instrument(level = "debug", skip_all, fields(rows = dataset.row_count()))]
    pub fn apply_filters(&self, dataset: &DataSet) -> DataSet {
        let compiled = self.compile_active();
        if compiled.is_empty() {
            return dataset.clone();
        }

        let out = dataset.filter_rows(|row| compiled.iter().all(|f| f.matches(row)));
        debug!(
            active_filters = compiled.len(),
            input_rows = dataset.row_count(),
            output_rows = out.row_count(),
            "filters applied"
        );
        out
    }

    /// Positions of the rows that satisfy every active filter.
    pub fn filtered_row_indices(&self, dataset: &DataSet) -> Vec<usize> {
        let compiled = self.compile_active();
        dataset
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| compiled.iter().all(|f| f.matches(row)))
            .map(|(i, _)| i)
            .collect()
    }

    fn compile_active(&self) -> Vec<CompiledFilter<'_>> {
        self.active_filters().map(CompiledFilter::compile).collect()
    }

    /// Merge `update` into the filter named `id`.
    ///
    /// Returns `false` (and changes nothing) when no such filter exists or when `values` would
    /// change the filter's type. Selected bin ids that do not name one of the filter's bins are
    /// dropped.
    pub fn update_filter(&mut self, id: &str, update: FilterUpdate) -> bool {
        let Some(filter) = self.filters.iter_mut().find(|f| f.id == id) else {
            debug!(id, "update for unknown filter ignored");
            return false;
        };
        if let Some(values) = &update.values {
            if !same_type(filter, values) {
                return false;
            }
        }

        let touches_constraint = update.values.is_some() || update.operator.is_some();
        if let Some(values) = update.values {
            filter.values = sanitized(id, values);
        }
        if let Some(operator) = update.operator {
            filter.operator = operator;
        }
        if let Some(display_name) = update.display_name {
            filter.display_name = display_name;
        }
        filter.active = match update.active {
            Some(active) => active,
            None if touches_constraint => true,
            None => filter.active,
        };
        true
    }

    /// Restore the filter named `id` to its generated default and deactivate it.
    ///
    /// Returns `false` when no such filter exists.
    pub fn reset_filter(&mut self, id: &str) -> bool {
        let Some(default) = self.defaults.iter().find(|f| f.id == id) else {
            debug!(id, "reset for unknown filter ignored");
            return false;
        };
        match self.filters.iter_mut().find(|f| f.id == id) {
            Some(filter) => {
                *filter = default.clone();
                true
            }
            None => false,
        }
    }

    /// Reset every managed filter.
    pub fn reset_all_filters(&mut self) {
        for (filter, default) in self.filters.iter_mut().zip(&self.defaults) {
            *filter = default.clone();
        }
    }

    /// Deactivate every filter while keeping its values.
    pub fn clear_all_filters(&mut self) {
        for filter in &mut self.filters {
            filter.active = false;
        }
    }

    /// Snapshot `active`, `values` and `operator` of every filter, in generation order.
    pub fn export_filter_state(&self) -> FilterState {
        FilterState::new(
            self.filters
                .iter()
                .map(|f| FilterStateEntry {
                    id: f.id.clone(),
                    active: f.active,
                    values: f.values.clone(),
                    operator: f.operator,
                })
                .collect(),
        )
    }

    /// Overwrite `active`, `values` and `operator` of every filter named in `state`.
    ///
    /// Entries with unknown ids or with values of another filter type are ignored, and filters
    /// absent from `state` are untouched. Selected bin ids are checked as in
    /// [`update_filter`](Self::update_filter). Returns the number of filters updated.
    pub fn import_filter_state(&mut self, state: &FilterState) -> usize {
        let mut applied = 0;
        for entry in &state.entries {
            match self.filters.iter_mut().find(|f| f.id == entry.id) {
                Some(filter) if !same_type(filter, &entry.values) => {}
                Some(filter) => {
                    filter.active = entry.active;
                    filter.values = sanitized(&entry.id, entry.values.clone());
                    filter.operator = entry.operator;
                    applied += 1;
                }
                None => debug!(id = %entry.id, "imported state for unknown filter ignored"),
            }
        }
        applied
    }
}

/// Whether `values` has the filter's own type. Logs and rejects otherwise.
fn same_type(filter: &FilterConfig, values: &FilterValues) -> bool {
    let (current, incoming) = (filter.filter_type(), values.filter_type());
    if current != incoming {
        debug!(
            id = %filter.id,
            ?current,
            ?incoming,
            "values of another filter type ignored"
        );
        return false;
    }
    true
}

/// Drop selected bin ids that do not name one of the range's bins.
fn sanitized(id: &str, mut values: FilterValues) -> FilterValues {
    if let FilterValues::Range(range) = &mut values {
        let dropped = range.retain_known_range_ids();
        if dropped > 0 {
            warn!(id, dropped, "dropped unknown range ids");
        }
    }
    values
}
