use actix_identity::Identity;
use actix_session::Session;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::dashboard::{View, ViewEvent};
use crate::domain::auth::AuthenticatedUser;
use crate::dto::grid::{source_options, status_options};
use crate::forms::grid::GridQuery;
use crate::grid::GridEvent;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{
    base_context, dashboard, redirect, render_template, store_grid, stored_grid, take_deleted,
    view_location,
};
use crate::services::ServiceError;
use crate::services::leads::{GridRequest, load_grid};

#[get("/")]
pub async fn show_index(
    params: web::Query<GridQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    session: Session,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let mut events = Vec::new();
    if take_deleted(&session) {
        events.push(GridEvent::LeadDeleted);
    }
    events.extend(params.events());

    let request = GridRequest {
        stored: stored_grid(&session),
        events,
        refresh: dashboard(&session, View::Grid).refresh(),
    };

    let outcome = match load_grid(repo.get_ref(), &user, request) {
        Ok(outcome) => outcome,
        Err(ServiceError::Unauthorized) => return HttpResponse::Unauthorized().finish(),
        Err(err) => {
            log::error!("Failed to load the lead grid: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };
    store_grid(&session, &outcome.state);

    let mut context = base_context(
        &flash_messages,
        &user,
        "index",
        &server_config.auth_service_url,
    );
    context.insert("grid", &outcome.page);
    context.insert("notice", &outcome.notice);
    context.insert("status_options", &status_options());
    context.insert("source_options", &source_options());

    render_template(&tera, "leads/index.html", &context)
}

#[post("/logout")]
pub async fn logout(
    user: Identity,
    session: Session,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let mut dashboard = dashboard(&session, View::Grid);
    let view = dashboard.handle(ViewEvent::SessionEnded);

    // Purges the session along with the identity.
    user.logout();

    redirect(&view_location(view, &server_config.login_url()))
}
