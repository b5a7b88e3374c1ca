//! Data required to render the lead grid.

use serde::Serialize;

use crate::domain::types::{LeadSource, LeadStatus};
use crate::dto::lead::LeadRow;
use crate::grid::{GridState, LeadFilters, PAGE_SIZE};
use crate::pagination::Paginated;

/// Select option rendered in the filter bar and the lead form.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChoiceOption {
    pub value: &'static str,
    pub label: &'static str,
}

pub fn status_options() -> Vec<ChoiceOption> {
    LeadStatus::ALL
        .into_iter()
        .map(|status| ChoiceOption {
            value: status.as_str(),
            label: status.label(),
        })
        .collect()
}

pub fn source_options() -> Vec<ChoiceOption> {
    LeadSource::ALL
        .into_iter()
        .map(|source| ChoiceOption {
            value: source.as_str(),
            label: source.label(),
        })
        .collect()
}

/// Current filter values as the filter form expects them; `all` for unset.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FilterView {
    pub search: String,
    pub status: &'static str,
    pub source: &'static str,
    pub qualified: &'static str,
}

impl From<&LeadFilters> for FilterView {
    fn from(filters: &LeadFilters) -> Self {
        Self {
            search: filters.search.clone(),
            status: filters.status.map_or("all", LeadStatus::as_str),
            source: filters.source.map_or("all", LeadSource::as_str),
            qualified: match filters.qualified {
                Some(true) => "true",
                Some(false) => "false",
                None => "all",
            },
        }
    }
}

/// Everything the grid template renders.
#[derive(Debug, Serialize)]
pub struct GridPageData {
    pub leads: Paginated<LeadRow>,
    pub filters: FilterView,
    /// True while a fetch is outstanding; the template shows a placeholder.
    pub loading: bool,
}

impl GridPageData {
    pub fn new(state: &GridState, leads: Paginated<LeadRow>) -> Self {
        Self {
            leads,
            filters: FilterView::from(state.filters()),
            loading: state.is_loading(),
        }
    }

    /// Grid without rows, shown when the lead list could not be loaded.
    pub fn unavailable(state: &GridState) -> Self {
        Self::new(
            state,
            Paginated::new(Vec::new(), state.page(), PAGE_SIZE, 0),
        )
    }
}
