//! Lead grid and lead form workflows.

use crate::domain::auth::AuthenticatedUser;
use crate::domain::lead::{Lead, NewLead, UpdateLead};
use crate::domain::types::LeadId;
use crate::dto::grid::GridPageData;
use crate::dto::lead::LeadRow;
use crate::forms::FormError;
use crate::forms::lead::{DeleteLeadForm, LeadForm};
use crate::grid::{GridCommand, GridEvent, GridState, PAGE_SIZE};
use crate::pagination::Paginated;
use crate::repository::{LeadListQuery, LeadReader, LeadWriter};
use crate::services::{ServiceError, ServiceResult, owner_of};

pub const LOAD_FAILED: &str = "Failed to load leads";

/// Input of one grid render.
#[derive(Debug, Default)]
pub struct GridRequest {
    /// Grid state saved by the previous render, if any.
    pub stored: Option<GridState>,
    /// Events derived from the request, applied in order.
    pub events: Vec<GridEvent>,
    /// Refresh counter of the dashboard.
    pub refresh: u64,
}

#[derive(Debug)]
pub struct GridOutcome {
    /// State to store for the next render.
    pub state: GridState,
    pub page: GridPageData,
    /// Set when the lead list could not be fetched.
    pub notice: Option<&'static str>,
}

/// Replays the request against the stored grid state and runs the single
/// resulting fetch, plus one follow-up when the page no longer exists.
pub fn load_grid<R>(
    repo: &R,
    user: &AuthenticatedUser,
    request: GridRequest,
) -> ServiceResult<GridOutcome>
where
    R: LeadReader + ?Sized,
{
    let owner_id = owner_of(user)?;
    let mut state = request
        .stored
        .unwrap_or_else(|| GridState::new(owner_id.clone()));

    let mut pending = None;
    let events = [
        GridEvent::UserChanged(owner_id),
        GridEvent::RefreshSignalled(request.refresh),
    ]
    .into_iter()
    .chain(request.events)
    .chain([GridEvent::Mounted]);
    for event in events {
        if let Some(command) = state.handle(event) {
            pending = Some(command);
        }
    }

    // A completed fetch may ask for one more when the page ran past the end.
    let mut fetched = None;
    while let Some(GridCommand::Fetch(query)) = pending.take() {
        match repo.list_leads(query) {
            Ok((total, leads)) => {
                pending = state.handle(GridEvent::FetchCompleted { total });
                fetched = Some((total, leads));
            }
            Err(err) => {
                log::error!("Failed to list leads: {err}");
                let total = state.total();
                state.handle(GridEvent::FetchCompleted { total });
                return Ok(GridOutcome {
                    page: GridPageData::unavailable(&state),
                    state,
                    notice: Some(LOAD_FAILED),
                });
            }
        }
    }

    let page = match fetched {
        Some((total, leads)) => {
            let rows = Paginated::new(leads, state.page(), PAGE_SIZE, total).map(LeadRow::from);
            GridPageData::new(&state, rows)
        }
        None => GridPageData::unavailable(&state),
    };
    Ok(GridOutcome {
        page,
        state,
        notice: None,
    })
}

/// Loads a lead owned by the user.
pub fn get_lead<R>(repo: &R, user: &AuthenticatedUser, lead_id: i32) -> ServiceResult<Lead>
where
    R: LeadReader + ?Sized,
{
    let owner_id = owner_of(user)?;
    let lead_id = LeadId::new(lead_id).map_err(|_| ServiceError::NotFound)?;

    repo.get_lead_by_id(lead_id, &owner_id)?
        .ok_or(ServiceError::NotFound)
}

/// Builds the edit draft pre-populated with the lead's current values.
pub fn load_edit_form<R>(
    repo: &R,
    user: &AuthenticatedUser,
    lead_id: i32,
) -> ServiceResult<(Lead, LeadForm)>
where
    R: LeadReader + ?Sized,
{
    let lead = get_lead(repo, user, lead_id)?;
    let form = LeadForm::from(&lead);
    Ok((lead, form))
}

/// Validates the draft and creates a lead owned by the user.
///
/// Validation failures are returned as [`ServiceError::Form`] and never reach
/// the repository.
pub fn create_lead<R>(repo: &R, user: &AuthenticatedUser, form: &LeadForm) -> ServiceResult<Lead>
where
    R: LeadWriter + ?Sized,
{
    let owner_id = owner_of(user)?;
    let fields = form.to_fields()?;

    repo.create_lead(&NewLead::new(owner_id, fields))
        .map_err(|err| {
            log::error!("Failed to create lead: {err}");
            ServiceError::from(err)
        })
}

/// Validates the draft and overwrites the editable fields of the lead.
pub fn update_lead<R>(
    repo: &R,
    user: &AuthenticatedUser,
    lead_id: i32,
    form: &LeadForm,
) -> ServiceResult<Lead>
where
    R: LeadWriter + ?Sized,
{
    let owner_id = owner_of(user)?;
    let lead_id = LeadId::new(lead_id).map_err(|_| ServiceError::NotFound)?;
    let fields = form.to_fields()?;

    repo.update_lead(lead_id, &owner_id, &UpdateLead::new(fields))
        .map_err(|err| {
            log::error!("Failed to update lead {lead_id}: {err}");
            ServiceError::from(err)
        })
}

/// Deletes the lead after an explicit confirmation.
pub fn delete_lead<R>(
    repo: &R,
    user: &AuthenticatedUser,
    lead_id: i32,
    form: &DeleteLeadForm,
) -> ServiceResult<()>
where
    R: LeadWriter + ?Sized,
{
    let owner_id = owner_of(user)?;
    let lead_id = LeadId::new(lead_id).map_err(|_| ServiceError::NotFound)?;

    if !form.is_confirmed() {
        return Err(FormError::NotConfirmed.into());
    }

    repo.delete_lead(lead_id, &owner_id).map_err(|err| {
        log::error!("Failed to delete lead {lead_id}: {err}");
        ServiceError::from(err)
    })
}

/// Every lead matching the user's current grid filters, without pagination.
///
/// A stored grid belonging to another user is ignored.
pub fn export_leads<R>(
    repo: &R,
    user: &AuthenticatedUser,
    stored: Option<&GridState>,
) -> ServiceResult<Vec<Lead>>
where
    R: LeadReader + ?Sized,
{
    let owner_id = owner_of(user)?;
    let mut query = LeadListQuery::new(owner_id.clone());
    if let Some(state) = stored.filter(|state| state.owner_id() == &owner_id) {
        query = state.filters().scope(query);
    }

    let (_, leads) = repo.list_leads(query).map_err(|err| {
        log::error!("Failed to export leads: {err}");
        ServiceError::from(err)
    })?;

    Ok(leads)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::lead::LeadFields;
    use crate::domain::types::{
        LeadEmail, LeadSource, LeadStatus, LeadValue, PersonName, Score, UserId,
    };
    use crate::grid::FilterChange;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;

    fn user() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "owner-1".to_string(),
            email: "rep@example.com".to_string(),
            name: "Rep".to_string(),
            exp: 0,
        }
    }

    fn owner() -> UserId {
        UserId::new("owner-1").unwrap()
    }

    fn build_lead(id: i32) -> Lead {
        let now = Utc::now().naive_utc();
        Lead {
            id: LeadId::new(id).unwrap(),
            owner_id: owner(),
            fields: LeadFields::new(
                PersonName::new("Ada").unwrap(),
                PersonName::new("Lovelace").unwrap(),
                LeadEmail::new("ada@example.com").unwrap(),
                None,
                None,
                None,
                None,
                LeadSource::Website,
                LeadStatus::New,
                Score::new(10).unwrap(),
                LeadValue::new(0.0).unwrap(),
                false,
            ),
            created_at: now,
            updated_at: now,
            last_activity_at: None,
        }
    }

    fn valid_form() -> LeadForm {
        LeadForm {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            ..LeadForm::blank()
        }
    }

    #[test]
    fn first_render_fetches_first_page_once() {
        let mut repo = MockRepository::new();
        repo.expect_list_leads()
            .withf(|query| {
                query.owner_id == owner()
                    && query.pagination.map(|p| (p.page, p.per_page)) == Some((1, PAGE_SIZE))
            })
            .times(1)
            .returning(|_| Ok((2, vec![build_lead(1), build_lead(2)])));

        let outcome = load_grid(&repo, &user(), GridRequest::default()).unwrap();

        assert_eq!(outcome.page.leads.items.len(), 2);
        assert_eq!(outcome.page.leads.total, 2);
        assert!(!outcome.page.loading);
        assert_eq!(outcome.notice, None);
        assert_eq!(outcome.state.total(), 2);
    }

    #[test]
    fn filter_change_fetches_page_one_once() {
        let mut stored = GridState::new(owner());
        stored.handle(GridEvent::FetchCompleted { total: 100 });
        stored.handle(GridEvent::PageRequested(3));
        stored.handle(GridEvent::FetchCompleted { total: 100 });

        let mut repo = MockRepository::new();
        repo.expect_list_leads()
            .withf(|query| {
                query.status == Some(LeadStatus::Won)
                    && query.pagination.map(|p| p.page) == Some(1)
            })
            .times(1)
            .returning(|_| Ok((0, vec![])));

        let request = GridRequest {
            stored: Some(stored),
            events: vec![GridEvent::FilterChanged(FilterChange::Status(Some(
                LeadStatus::Won,
            )))],
            refresh: 0,
        };
        let outcome = load_grid(&repo, &user(), request).unwrap();
        assert_eq!(outcome.state.page(), 1);
    }

    #[test]
    fn oversized_page_request_is_served_without_overflow() {
        let mut repo = MockRepository::new();
        repo.expect_list_leads()
            .withf(|query| {
                query.pagination.map(|p| p.page) == Some(crate::grid::MAX_PAGE)
                    && query
                        .pagination
                        .is_some_and(|p| i64::try_from(p.offset()).is_ok())
            })
            .times(1)
            .returning(|_| Ok((0, vec![])));

        let request = GridRequest {
            events: vec![GridEvent::PageRequested(usize::MAX)],
            ..GridRequest::default()
        };
        let outcome = load_grid(&repo, &user(), request).unwrap();
        assert!(outcome.page.leads.items.is_empty());
        assert_eq!(outcome.notice, None);
    }

    #[test]
    fn delete_of_last_row_on_page_falls_back_to_last_page() {
        let mut stored = GridState::new(owner());
        stored.handle(GridEvent::FetchCompleted { total: 41 });
        stored.handle(GridEvent::PageRequested(3));
        stored.handle(GridEvent::FetchCompleted { total: 41 });

        let mut repo = MockRepository::new();
        let mut seq = mockall::Sequence::new();
        repo.expect_list_leads()
            .withf(|query| query.pagination.map(|p| p.page) == Some(3))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok((40, vec![])));
        repo.expect_list_leads()
            .withf(|query| query.pagination.map(|p| p.page) == Some(2))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok((40, (21..=40).map(build_lead).collect())));

        let request = GridRequest {
            stored: Some(stored),
            events: vec![GridEvent::LeadDeleted],
            refresh: 0,
        };
        let outcome = load_grid(&repo, &user(), request).unwrap();
        assert_eq!(outcome.state.page(), 2);
        assert_eq!(outcome.page.leads.items.len(), 20);
        assert_eq!(
            (outcome.page.leads.first_row, outcome.page.leads.last_row),
            (21, 40)
        );
        assert!(!outcome.page.loading);
    }

    #[test]
    fn stored_grid_of_another_user_is_rescoped() {
        let stored = GridState::new(UserId::new("someone-else").unwrap());
        let mut repo = MockRepository::new();
        repo.expect_list_leads()
            .withf(|query| query.owner_id == owner())
            .times(1)
            .returning(|_| Ok((0, vec![])));

        let request = GridRequest {
            stored: Some(stored),
            ..GridRequest::default()
        };
        let outcome = load_grid(&repo, &user(), request).unwrap();
        assert_eq!(outcome.state.owner_id(), &owner());
    }

    #[test]
    fn fetch_failure_reports_notice_and_keeps_filters() {
        let mut stored = GridState::new(owner());
        stored.handle(GridEvent::FilterChanged(FilterChange::Search(
            "acme".to_string(),
        )));
        let mut repo = MockRepository::new();
        repo.expect_list_leads()
            .times(1)
            .returning(|_| Err(RepositoryError::ConnectionError("down".to_string())));

        let request = GridRequest {
            stored: Some(stored),
            ..GridRequest::default()
        };
        let outcome = load_grid(&repo, &user(), request).unwrap();
        assert_eq!(outcome.notice, Some(LOAD_FAILED));
        assert!(outcome.page.leads.items.is_empty());
        assert_eq!(outcome.state.filters().search, "acme");
        assert!(!outcome.state.is_loading());
    }

    #[test]
    fn invalid_draft_never_reaches_repository() {
        let mut repo = MockRepository::new();
        repo.expect_create_lead().times(0);
        let form = LeadForm {
            email: String::new(),
            ..valid_form()
        };

        let result = create_lead(&repo, &user(), &form);
        assert_eq!(
            result,
            Err(ServiceError::Form(
                FormError::MissingRequiredField.to_string()
            ))
        );
    }

    #[test]
    fn create_attaches_current_user() {
        let mut repo = MockRepository::new();
        repo.expect_create_lead()
            .withf(|new_lead| {
                new_lead.owner_id == owner() && new_lead.fields.first_name.as_str() == "Ada"
            })
            .times(1)
            .returning(|_| Ok(build_lead(9)));

        let lead = create_lead(&repo, &user(), &valid_form()).unwrap();
        assert_eq!(lead.id.get(), 9);
    }

    #[test]
    fn create_failure_is_internal() {
        let mut repo = MockRepository::new();
        repo.expect_create_lead()
            .returning(|_| Err(RepositoryError::ConnectionError("locked".to_string())));

        let result = create_lead(&repo, &user(), &valid_form());
        assert!(matches!(result, Err(ServiceError::Internal(_))));
    }

    #[test]
    fn update_sends_full_field_set_scoped_to_owner() {
        let mut repo = MockRepository::new();
        repo.expect_update_lead()
            .withf(|id, owner_id, updates| {
                id.get() == 4
                    && owner_id == &owner()
                    && updates.fields.score.get() == 0
                    && updates.fields.source == LeadSource::Website
            })
            .times(1)
            .returning(|_, _, _| Ok(build_lead(4)));

        update_lead(&repo, &user(), 4, &valid_form()).unwrap();
    }

    #[test]
    fn update_of_foreign_lead_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_update_lead()
            .returning(|_, _, _| Err(RepositoryError::NotFound));

        let result = update_lead(&repo, &user(), 4, &valid_form());
        assert_eq!(result, Err(ServiceError::NotFound));
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut repo = MockRepository::new();
        repo.expect_delete_lead().times(0);

        let result = delete_lead(&repo, &user(), 3, &DeleteLeadForm::default());
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn confirmed_delete_is_scoped_to_owner() {
        let mut repo = MockRepository::new();
        repo.expect_delete_lead()
            .withf(|id, owner_id| id.get() == 3 && owner_id == &owner())
            .times(1)
            .returning(|_, _| Ok(()));

        let form = DeleteLeadForm {
            confirm: Some("yes".to_string()),
        };
        delete_lead(&repo, &user(), 3, &form).unwrap();
    }

    #[test]
    fn missing_lead_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_lead_by_id().returning(|_, _| Ok(None));

        assert_eq!(
            load_edit_form(&repo, &user(), 77).map(|(lead, _)| lead.id),
            Err(ServiceError::NotFound)
        );
    }

    #[test]
    fn edit_form_is_prefilled() {
        let mut repo = MockRepository::new();
        repo.expect_get_lead_by_id()
            .withf(|id, owner_id| id.get() == 5 && owner_id == &owner())
            .returning(|_, _| Ok(Some(build_lead(5))));

        let (_, form) = load_edit_form(&repo, &user(), 5).unwrap();
        assert_eq!(form.first_name, "Ada");
        assert_eq!(form.score, "10");
    }

    #[test]
    fn export_reuses_filters_without_pagination() {
        let mut stored = GridState::new(owner());
        stored.handle(GridEvent::FilterChanged(FilterChange::Qualified(Some(true))));

        let mut repo = MockRepository::new();
        repo.expect_list_leads()
            .withf(|query| query.is_qualified == Some(true) && query.pagination.is_none())
            .times(1)
            .returning(|_| Ok((1, vec![build_lead(1)])));

        let leads = export_leads(&repo, &user(), Some(&stored)).unwrap();
        assert_eq!(leads.len(), 1);
    }

    #[test]
    fn export_ignores_foreign_grid_state() {
        let mut stored = GridState::new(UserId::new("someone-else").unwrap());
        stored.handle(GridEvent::FilterChanged(FilterChange::Qualified(Some(true))));

        let mut repo = MockRepository::new();
        repo.expect_list_leads()
            .withf(|query| query.owner_id == owner() && query.is_qualified.is_none())
            .times(1)
            .returning(|_| Ok((0, vec![])));

        export_leads(&repo, &user(), Some(&stored)).unwrap();
    }
}
