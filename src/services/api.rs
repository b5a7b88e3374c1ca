use crate::domain::auth::AuthenticatedUser;
use crate::dto::api::LeadsResponse;
use crate::forms::grid::GridQuery;
use crate::grid::PAGE_SIZE;
use crate::repository::{LeadListQuery, LeadReader};
use crate::services::{ServiceError, ServiceResult, owner_of};

/// Returns one page of the user's leads filtered by the query parameters.
///
/// Unlike the HTML grid this endpoint is stateless: absent parameters mean
/// "all" and page 1.
pub fn list_leads<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: &GridQuery,
) -> ServiceResult<LeadsResponse>
where
    R: LeadReader + ?Sized,
{
    let owner_id = owner_of(user)?;
    let page = params.page().unwrap_or(1).max(1);

    let query = params
        .filters()
        .scope(LeadListQuery::new(owner_id))
        .paginate(page, PAGE_SIZE);

    let (total, leads) = repo.list_leads(query).map_err(ServiceError::from)?;

    Ok(LeadsResponse {
        total,
        page,
        total_pages: total.div_ceil(PAGE_SIZE),
        leads,
    })
}
