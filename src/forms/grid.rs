//! Query-string parameters of the lead grid.

use std::num::IntErrorKind;
use std::str::FromStr;

use serde::Deserialize;

use crate::grid::{FilterChange, GridEvent, LeadFilters, MAX_PAGE};

/// Raw grid parameters. A field that is absent leaves that part of the grid
/// untouched; `"all"` or an empty value clears the filter.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct GridQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub source: Option<String>,
    pub qualified: Option<String>,
    pub page: Option<String>,
}

fn parse_choice<T: FromStr>(raw: &str) -> Option<T> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "all" {
        return None;
    }
    let parsed = raw.parse().ok();
    if parsed.is_none() {
        log::warn!("Ignoring unknown filter value {raw:?}");
    }
    parsed
}

fn parse_qualified(raw: &str) -> Option<bool> {
    match raw.trim() {
        "true" | "yes" => Some(true),
        "false" | "no" => Some(false),
        _ => None,
    }
}

impl GridQuery {
    /// Requested page, clamped to `1..=MAX_PAGE`. Numbers too large for
    /// `usize` count as the last addressable page.
    pub fn page(&self) -> Option<usize> {
        let raw = self.page.as_deref()?.trim();
        let page = match raw.parse::<usize>() {
            Ok(page) => page,
            Err(err) if *err.kind() == IntErrorKind::PosOverflow => MAX_PAGE,
            Err(_) => return None,
        };
        Some(page.clamp(1, MAX_PAGE))
    }

    /// Filter changes carried by the request, in form order.
    pub fn filter_changes(&self) -> Vec<FilterChange> {
        let mut changes = Vec::new();
        if let Some(search) = &self.search {
            changes.push(FilterChange::Search(search.trim().to_string()));
        }
        if let Some(status) = &self.status {
            changes.push(FilterChange::Status(parse_choice(status)));
        }
        if let Some(source) = &self.source {
            changes.push(FilterChange::Source(parse_choice(source)));
        }
        if let Some(qualified) = &self.qualified {
            changes.push(FilterChange::Qualified(parse_qualified(qualified)));
        }
        changes
    }

    /// Grid events for this request; page navigation comes after filter changes.
    pub fn events(&self) -> Vec<GridEvent> {
        let mut events: Vec<GridEvent> = self
            .filter_changes()
            .into_iter()
            .map(GridEvent::FilterChanged)
            .collect();
        if let Some(page) = self.page() {
            events.push(GridEvent::PageRequested(page));
        }
        events
    }

    /// Standalone filter set, for callers without stored grid state.
    pub fn filters(&self) -> LeadFilters {
        let mut filters = LeadFilters::default();
        for change in self.filter_changes() {
            filters.apply(change);
        }
        filters
    }
}
