//! Lead grid state machine.
//!
//! The grid owns the filter and pagination state of the lead list and decides
//! when the list has to be fetched again. Every input is an explicit
//! [`GridEvent`]; [`GridState::handle`] applies it and returns at most one
//! [`GridCommand`]. A filter change resets the page to 1 and yields a single
//! fetch for the new filter on page 1.
//!
//! | event               | condition            | command |
//! |---------------------|----------------------|---------|
//! | `Mounted`           | always               | fetch   |
//! | `FilterChanged`     | value differs        | fetch (page reset to 1) |
//! | `PageRequested`     | page differs         | fetch   |
//! | `RefreshSignalled`  | token differs        | fetch   |
//! | `UserChanged`       | owner differs        | fetch (page reset to 1) |
//! | `LeadDeleted`       | always               | fetch   |
//! | `FetchCompleted`    | page past last page  | fetch (page set to last) |
//! | `FetchCompleted`    | otherwise            | none    |

use serde::{Deserialize, Serialize};

use crate::domain::types::{LeadSource, LeadStatus, UserId};
use crate::repository::LeadListQuery;

/// Rows shown per grid page.
pub const PAGE_SIZE: usize = 20;

/// Highest page whose row offset still fits the store's signed 64-bit offset.
pub const MAX_PAGE: usize = (i64::MAX as u64 / PAGE_SIZE as u64) as usize;

/// Filter set of the grid; `None` means "all".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadFilters {
    pub search: String,
    pub status: Option<LeadStatus>,
    pub source: Option<LeadSource>,
    pub qualified: Option<bool>,
}

impl LeadFilters {
    /// Applies the change, returning whether any value actually changed.
    pub fn apply(&mut self, change: FilterChange) -> bool {
        match change {
            FilterChange::Search(search) => replace(&mut self.search, search),
            FilterChange::Status(status) => replace(&mut self.status, status),
            FilterChange::Source(source) => replace(&mut self.source, source),
            FilterChange::Qualified(qualified) => replace(&mut self.qualified, qualified),
        }
    }

    /// Adds the filter predicates to an owner-scoped query.
    pub fn scope(&self, mut query: LeadListQuery) -> LeadListQuery {
        query = query.search(self.search.as_str());
        if let Some(status) = self.status {
            query = query.status(status);
        }
        if let Some(source) = self.source {
            query = query.source(source);
        }
        if let Some(qualified) = self.qualified {
            query = query.qualified(qualified);
        }
        query
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterChange {
    Search(String),
    Status(Option<LeadStatus>),
    Source(Option<LeadSource>),
    Qualified(Option<bool>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridEvent {
    Mounted,
    FilterChanged(FilterChange),
    PageRequested(usize),
    /// Opaque counter bumped elsewhere after a mutation; only a change matters.
    RefreshSignalled(u64),
    UserChanged(UserId),
    LeadDeleted,
    FetchCompleted { total: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub enum GridCommand {
    Fetch(LeadListQuery),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridState {
    owner_id: UserId,
    filters: LeadFilters,
    page: usize,
    total: usize,
    refresh: u64,
    loading: bool,
}

impl GridState {
    pub fn new(owner_id: UserId) -> Self {
        Self {
            owner_id,
            filters: LeadFilters::default(),
            page: 1,
            total: 0,
            refresh: 0,
            loading: false,
        }
    }

    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    pub fn filters(&self) -> &LeadFilters {
        &self.filters
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(PAGE_SIZE)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Query for the current filters and page.
    pub fn query(&self) -> LeadListQuery {
        self.filters
            .scope(LeadListQuery::new(self.owner_id.clone()))
            .paginate(self.page, PAGE_SIZE)
    }

    /// Applies one event and returns the fetch it requires, if any.
    pub fn handle(&mut self, event: GridEvent) -> Option<GridCommand> {
        match event {
            GridEvent::Mounted | GridEvent::LeadDeleted => self.fetch(),
            GridEvent::FilterChanged(change) => {
                if !self.filters.apply(change) {
                    return None;
                }
                self.page = 1;
                self.fetch()
            }
            GridEvent::PageRequested(page) => {
                let page = self.clamp_page(page);
                if page == self.page {
                    return None;
                }
                self.page = page;
                self.fetch()
            }
            GridEvent::RefreshSignalled(token) => {
                if !replace(&mut self.refresh, token) {
                    return None;
                }
                self.fetch()
            }
            GridEvent::UserChanged(owner_id) => {
                if !replace(&mut self.owner_id, owner_id) {
                    return None;
                }
                self.page = 1;
                self.fetch()
            }
            GridEvent::FetchCompleted { total } => {
                self.total = total;
                self.loading = false;
                // Rows vanished under the current page, e.g. after a delete.
                let last = self.total_pages();
                if last > 0 && self.page > last {
                    self.page = last;
                    return self.fetch();
                }
                None
            }
        }
    }

    fn clamp_page(&self, page: usize) -> usize {
        let page = page.clamp(1, MAX_PAGE);
        match self.total_pages() {
            0 => page,
            last => page.min(last),
        }
    }

    fn fetch(&mut self) -> Option<GridCommand> {
        self.loading = true;
        Some(GridCommand::Fetch(self.query()))
    }
}
