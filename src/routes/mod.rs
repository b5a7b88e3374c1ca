//! HTTP handlers and the helpers they share.

use actix_session::Session;
use actix_web::HttpResponse;
use actix_web::http::header;
use actix_web_flash_messages::{IncomingFlashMessages, Level};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tera::{Context, Tera};

use crate::dashboard::{Dashboard, View};
use crate::domain::auth::AuthenticatedUser;
use crate::grid::GridState;

pub mod api;
pub mod lead;
pub mod main;

const GRID_KEY: &str = "lead_grid";
const REFRESH_KEY: &str = "lead_refresh";
const DELETED_KEY: &str = "lead_deleted";

/// Maps a flash message level to the Bootstrap alert class.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

/// Context shared by every page: alerts, the current user and navigation.
pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    user: &AuthenticatedUser,
    current_page: &str,
    home_url: &str,
) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_user", user);
    context.insert("current_page", current_page);
    context.insert("home_url", home_url);
    context
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Page that renders `view`.
pub fn view_location(view: View, login_url: &str) -> String {
    match view {
        View::Grid => "/".to_string(),
        View::Create => "/leads/new".to_string(),
        View::Edit(id) => format!("/leads/{id}/edit"),
        View::Login => login_url.to_string(),
    }
}

fn session_get<T: DeserializeOwned>(session: &Session, key: &str) -> Option<T> {
    session.get::<T>(key).unwrap_or_else(|err| {
        log::warn!("Discarding unreadable session value '{key}': {err}");
        None
    })
}

fn session_insert<T: Serialize>(session: &Session, key: &str, value: T) {
    if let Err(err) = session.insert(key, value) {
        log::error!("Failed to store session value '{key}': {err}");
    }
}

/// Grid state saved by the previous grid render.
pub fn stored_grid(session: &Session) -> Option<GridState> {
    session_get(session, GRID_KEY)
}

pub fn store_grid(session: &Session, state: &GridState) {
    session_insert(session, GRID_KEY, state);
}

/// Dashboard resumed in `view` with the refresh counter kept in the session.
pub fn dashboard(session: &Session, view: View) -> Dashboard {
    Dashboard::resume(view, session_get(session, REFRESH_KEY).unwrap_or(0))
}

pub fn store_dashboard(session: &Session, dashboard: &Dashboard) {
    session_insert(session, REFRESH_KEY, dashboard.refresh());
}

/// Marks that a lead was deleted since the last grid render.
pub fn mark_deleted(session: &Session) {
    session_insert(session, DELETED_KEY, true);
}

/// Consumes the deletion mark.
pub fn take_deleted(session: &Session) -> bool {
    session.remove(DELETED_KEY).is_some()
}
