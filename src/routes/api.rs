use actix_web::{HttpResponse, Responder, get, web};

use crate::domain::auth::AuthenticatedUser;
use crate::forms::grid::GridQuery;
use crate::repository::DieselRepository;
use crate::services::ServiceError;
use crate::services::api::list_leads;

#[get("/v1/leads")]
pub async fn api_v1_leads(
    params: web::Query<GridQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match list_leads(repo.get_ref(), &user, &params) {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(ServiceError::Unauthorized) => HttpResponse::Unauthorized().finish(),
        Err(err) => {
            log::error!("Failed to list leads: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
