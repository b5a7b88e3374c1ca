//! Create, edit, delete and export handlers.
//!
//! Every handler resumes the [`crate::dashboard::Dashboard`] in the view its
//! page belongs to and follows the view the controller returns.

use actix_session::Session;
use actix_web::http::header;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::{Context, Tera};

use crate::dashboard::{View, ViewEvent};
use crate::domain::auth::AuthenticatedUser;
use crate::domain::lead::Lead;
use crate::domain::types::LeadId;
use crate::dto::grid::{source_options, status_options};
use crate::dto::lead::{CSV_HEADERS, LeadCsvRecord, LeadRow};
use crate::forms::lead::{CancelLeadForm, DeleteLeadForm, LeadForm};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{
    base_context, dashboard, mark_deleted, redirect, render_template, store_dashboard,
    stored_grid, view_location,
};
use crate::services::ServiceError;
use crate::services::leads as lead_service;

const CREATE_FAILED: &str = "Failed to create lead";
const UPDATE_FAILED: &str = "Failed to update lead";
const DELETE_FAILED: &str = "Failed to delete lead";
const NOT_FOUND: &str = "Lead not found.";

/// Renders the lead form for `view` with an optional inline notice.
fn render_form(
    tera: &Tera,
    mut context: Context,
    view: View,
    form: &LeadForm,
    notice: Option<&str>,
) -> HttpResponse {
    let (mode, action) = match view {
        View::Edit(id) => ("edit", format!("/leads/{id}")),
        _ => ("create", "/leads".to_string()),
    };
    if let View::Edit(id) = view {
        context.insert("lead_id", &id);
    }
    context.insert("mode", mode);
    context.insert("action", &action);
    context.insert("form", form);
    context.insert("is_qualified", &form.is_qualified());
    context.insert("notice", &notice);
    context.insert("status_options", &status_options());
    context.insert("source_options", &source_options());

    render_template(tera, "leads/form.html", &context)
}

#[get("/leads/new")]
pub async fn new_lead(
    user: AuthenticatedUser,
    session: Session,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let view = dashboard(&session, View::Grid).handle(ViewEvent::CreateRequested);
    let context = base_context(
        &flash_messages,
        &user,
        "index",
        &server_config.auth_service_url,
    );

    render_form(&tera, context, view, &LeadForm::blank(), None)
}

#[post("/leads")]
pub async fn create_lead(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    session: Session,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<LeadForm>,
) -> impl Responder {
    let mut dashboard = dashboard(&session, View::Create);

    let (event, notice) = match lead_service::create_lead(repo.get_ref(), &user, &form) {
        Ok(lead) => {
            log::info!("Created lead {}", lead.id);
            FlashMessage::success(format!("Lead {} created.", lead.full_name())).send();
            (ViewEvent::Saved, None)
        }
        Err(ServiceError::Form(message)) => (ViewEvent::Rejected, Some(message)),
        Err(ServiceError::Unauthorized) => (ViewEvent::SessionEnded, None),
        Err(_) => (ViewEvent::CreateFailed, Some(CREATE_FAILED.to_string())),
    };

    let view = dashboard.handle(event);
    store_dashboard(&session, &dashboard);

    if view == View::Create {
        let context = base_context(
            &flash_messages,
            &user,
            "index",
            &server_config.auth_service_url,
        );
        return render_form(&tera, context, view, &form, notice.as_deref());
    }
    redirect(&view_location(view, &server_config.login_url()))
}

#[get("/leads/{lead_id:\\d+}/edit")]
pub async fn edit_lead(
    lead_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    session: Session,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let (lead, form) = match lead_service::load_edit_form(repo.get_ref(), &user, lead_id.into_inner())
    {
        Ok(loaded) => loaded,
        Err(ServiceError::NotFound) => {
            FlashMessage::error(NOT_FOUND).send();
            return redirect("/");
        }
        Err(ServiceError::Unauthorized) => return HttpResponse::Unauthorized().finish(),
        Err(err) => {
            log::error!("Failed to load lead: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let view = dashboard(&session, View::Grid).handle(ViewEvent::EditRequested(lead.id));
    let context = base_context(
        &flash_messages,
        &user,
        "index",
        &server_config.auth_service_url,
    );

    render_form(&tera, context, view, &form, None)
}

#[post("/leads/{lead_id:\\d+}")]
pub async fn update_lead(
    lead_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    session: Session,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<LeadForm>,
) -> impl Responder {
    let lead_id = lead_id.into_inner();
    let Ok(id) = LeadId::new(lead_id) else {
        FlashMessage::error(NOT_FOUND).send();
        return redirect("/");
    };
    let mut dashboard = dashboard(&session, View::Edit(id));

    let (event, notice) = match lead_service::update_lead(repo.get_ref(), &user, lead_id, &form) {
        Ok(lead) => {
            log::info!("Updated lead {}", lead.id);
            FlashMessage::success(format!("Lead {} updated.", lead.full_name())).send();
            (ViewEvent::Saved, None)
        }
        Err(ServiceError::Form(message)) => (ViewEvent::Rejected, Some(message)),
        Err(ServiceError::Unauthorized) => (ViewEvent::SessionEnded, None),
        Err(_) => {
            FlashMessage::error(UPDATE_FAILED).send();
            (ViewEvent::UpdateFailed, None)
        }
    };

    let view = dashboard.handle(event);
    store_dashboard(&session, &dashboard);

    if view == View::Edit(id) {
        let context = base_context(
            &flash_messages,
            &user,
            "index",
            &server_config.auth_service_url,
        );
        return render_form(&tera, context, view, &form, notice.as_deref());
    }
    redirect(&view_location(view, &server_config.login_url()))
}

#[post("/leads/cancel")]
pub async fn cancel_lead(
    _user: AuthenticatedUser,
    session: Session,
    server_config: web::Data<ServerConfig>,
    web::Form(form): web::Form<CancelLeadForm>,
) -> impl Responder {
    let from = form
        .lead_id
        .and_then(|id| LeadId::new(id).ok())
        .map_or(View::Create, View::Edit);

    let view = dashboard(&session, from).handle(ViewEvent::Cancelled);
    redirect(&view_location(view, &server_config.login_url()))
}

#[get("/leads/{lead_id:\\d+}/delete")]
pub async fn confirm_delete(
    lead_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let lead = match lead_service::get_lead(repo.get_ref(), &user, lead_id.into_inner()) {
        Ok(lead) => lead,
        Err(ServiceError::NotFound) => {
            FlashMessage::error(NOT_FOUND).send();
            return redirect("/");
        }
        Err(ServiceError::Unauthorized) => return HttpResponse::Unauthorized().finish(),
        Err(err) => {
            log::error!("Failed to load lead: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let mut context = base_context(
        &flash_messages,
        &user,
        "index",
        &server_config.auth_service_url,
    );
    context.insert("lead", &LeadRow::from(&lead));

    render_template(&tera, "leads/delete.html", &context)
}

#[post("/leads/{lead_id:\\d+}/delete")]
pub async fn delete_lead(
    lead_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    session: Session,
    web::Form(form): web::Form<DeleteLeadForm>,
) -> impl Responder {
    let lead_id = lead_id.into_inner();

    match lead_service::delete_lead(repo.get_ref(), &user, lead_id, &form) {
        Ok(()) => {
            log::info!("Deleted lead {lead_id}");
            mark_deleted(&session);
            FlashMessage::success("Lead deleted.").send();
        }
        Err(ServiceError::Unauthorized) => return HttpResponse::Unauthorized().finish(),
        Err(ServiceError::Form(message)) => {
            FlashMessage::warning(message).send();
        }
        Err(_) => {
            FlashMessage::error(DELETE_FAILED).send();
        }
    }

    redirect("/")
}

fn write_csv(leads: &[Lead]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADERS)?;
    for lead in leads {
        writer.serialize(LeadCsvRecord::from(lead))?;
    }

    writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))
}

#[get("/leads/export")]
pub async fn export_leads(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    session: Session,
) -> impl Responder {
    let stored = stored_grid(&session);

    let leads = match lead_service::export_leads(repo.get_ref(), &user, stored.as_ref()) {
        Ok(leads) => leads,
        Err(ServiceError::Unauthorized) => return HttpResponse::Unauthorized().finish(),
        Err(_) => {
            FlashMessage::error(lead_service::LOAD_FAILED).send();
            return redirect("/");
        }
    };

    match write_csv(&leads) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"leads.csv\"",
            ))
            .body(body),
        Err(err) => {
            log::error!("Failed to write leads CSV: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::lead::LeadFields;
    use crate::domain::types::{
        LeadEmail, LeadSource, LeadStatus, LeadValue, PersonName, Score, UserId,
    };

    #[test]
    fn csv_has_header_row_even_without_leads() {
        let body = String::from_utf8(write_csv(&[]).unwrap()).unwrap();
        assert_eq!(body.trim_end(), CSV_HEADERS.join(","));
    }

    #[test]
    fn csv_quotes_fields_with_commas() {
        let now = Utc::now().naive_utc();
        let lead = Lead {
            id: LeadId::new(1).unwrap(),
            owner_id: UserId::new("owner").unwrap(),
            fields: LeadFields::new(
                PersonName::new("Jane").unwrap(),
                PersonName::new("Doe").unwrap(),
                LeadEmail::new("jane@example.com").unwrap(),
                None,
                Some("Acme, Inc.".to_string()),
                None,
                None,
                LeadSource::Website,
                LeadStatus::New,
                Score::new(5).unwrap(),
                LeadValue::new(10.0).unwrap(),
                false,
            ),
            created_at: now,
            updated_at: now,
            last_activity_at: None,
        };

        let body = String::from_utf8(write_csv(&[lead]).unwrap()).unwrap();
        let mut lines = body.lines();
        assert_eq!(lines.next(), Some(CSV_HEADERS.join(",").as_str()));
        let row = lines.next().unwrap();
        assert!(row.starts_with("1,Jane,Doe,jane@example.com,,\"Acme, Inc.\","));
        assert_eq!(lines.next(), None);
    }
}
