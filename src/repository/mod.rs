use crate::{
    db::{DbConnection, DbPool},
    domain::{
        lead::{Lead, NewLead, UpdateLead},
        types::{LeadId, LeadSource, LeadStatus, UserId},
    },
    repository::errors::RepositoryResult,
};

pub mod errors;
pub mod lead;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;

/// Diesel-backed repository shared by all handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    /// Number of rows skipped before the requested page.
    pub fn offset(&self) -> usize {
        (self.page.max(1) - 1).saturating_mul(self.per_page)
    }

    /// Zero-based inclusive row window `[(page-1)*per_page, page*per_page - 1]`.
    pub fn window(&self) -> (usize, usize) {
        let start = self.offset();
        (start, start.saturating_add(self.per_page).saturating_sub(1))
    }
}

/// Owner-scoped, filtered lead query.
///
/// The owner is mandatory: the repository never issues a lead query without
/// an owner equality predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadListQuery {
    pub owner_id: UserId,
    pub search: Option<String>,
    pub status: Option<LeadStatus>,
    pub source: Option<LeadSource>,
    pub is_qualified: Option<bool>,
    pub pagination: Option<Pagination>,
}

impl LeadListQuery {
    pub fn new(owner_id: UserId) -> Self {
        Self {
            owner_id,
            search: None,
            status: None,
            source: None,
            is_qualified: None,
            pagination: None,
        }
    }

    /// Case-insensitive substring match on name, email or company. Blank input is ignored.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into().trim().to_string();
        self.search = (!term.is_empty()).then_some(term);
        self
    }

    pub fn status(mut self, status: LeadStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn source(mut self, source: LeadSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn qualified(mut self, is_qualified: bool) -> Self {
        self.is_qualified = Some(is_qualified);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

pub trait LeadReader {
    fn get_lead_by_id(&self, id: LeadId, owner_id: &UserId) -> RepositoryResult<Option<Lead>>;
    /// Returns the total number of matching rows together with the requested page.
    fn list_leads(&self, query: LeadListQuery) -> RepositoryResult<(usize, Vec<Lead>)>;
}

pub trait LeadWriter {
    fn create_lead(&self, new_lead: &NewLead) -> RepositoryResult<Lead>;
    fn update_lead(
        &self,
        id: LeadId,
        owner_id: &UserId,
        updates: &UpdateLead,
    ) -> RepositoryResult<Lead>;
    fn delete_lead(&self, id: LeadId, owner_id: &UserId) -> RepositoryResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_window_matches_page() {
        let first = Pagination { page: 1, per_page: 20 };
        assert_eq!(first.window(), (0, 19));

        let third = Pagination { page: 3, per_page: 20 };
        assert_eq!(third.offset(), 40);
        assert_eq!(third.window(), (40, 59));

        let zero = Pagination { page: 0, per_page: 20 };
        assert_eq!(zero.offset(), 0);
    }

    #[test]
    fn oversized_page_saturates_instead_of_overflowing() {
        let huge = Pagination {
            page: usize::MAX,
            per_page: 20,
        };
        assert_eq!(huge.offset(), usize::MAX);
    }

    #[test]
    fn blank_search_is_dropped() {
        let owner = UserId::new("u").unwrap();
        assert_eq!(LeadListQuery::new(owner.clone()).search("   ").search, None);
        assert_eq!(
            LeadListQuery::new(owner).search(" acme ").search.as_deref(),
            Some("acme")
        );
    }
}
