//! Presentation records derived from [`Lead`].

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::lead::Lead;
use crate::domain::types::{LeadSource, LeadStatus};

/// Formats an amount as US dollars with thousands separators, e.g. `$1,234.50`.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, digit) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

/// Short date of the last activity, or `Never`.
pub fn format_activity(at: Option<NaiveDateTime>) -> String {
    match at {
        Some(at) => at.format("%-m/%-d/%Y").to_string(),
        None => "Never".to_string(),
    }
}

pub fn status_badge(status: LeadStatus) -> &'static str {
    match status {
        LeadStatus::New => "primary",
        LeadStatus::Contacted => "info",
        LeadStatus::Qualified => "success",
        LeadStatus::Lost => "danger",
        LeadStatus::Won => "warning",
    }
}

pub fn source_badge(source: LeadSource) -> &'static str {
    match source {
        LeadSource::Website => "primary",
        LeadSource::FacebookAds => "info",
        LeadSource::GoogleAds => "danger",
        LeadSource::Referral => "success",
        LeadSource::Events => "warning",
        LeadSource::Other => "secondary",
    }
}

/// Colour of the score bar.
pub fn score_level(score: i32) -> &'static str {
    if score >= 70 {
        "success"
    } else if score >= 40 {
        "warning"
    } else {
        "danger"
    }
}

/// One grid row, ready for the template.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LeadRow {
    pub id: i32,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    /// `City, ST` or whichever part is known.
    pub location: Option<String>,
    pub source: &'static str,
    pub source_label: &'static str,
    pub source_badge: &'static str,
    pub status: &'static str,
    pub status_label: &'static str,
    pub status_badge: &'static str,
    pub score: i32,
    pub score_level: &'static str,
    pub lead_value: String,
    pub is_qualified: bool,
    pub last_activity: String,
}

impl From<&Lead> for LeadRow {
    fn from(lead: &Lead) -> Self {
        let fields = &lead.fields;
        let location = match (fields.city.as_deref(), fields.state.as_deref()) {
            (Some(city), Some(state)) => Some(format!("{city}, {state}")),
            (Some(part), None) | (None, Some(part)) => Some(part.to_string()),
            (None, None) => None,
        };
        Self {
            id: lead.id.get(),
            full_name: lead.full_name(),
            email: fields.email.to_string(),
            phone: fields.phone.clone(),
            company: fields.company.clone(),
            location,
            source: fields.source.as_str(),
            source_label: fields.source.label(),
            source_badge: source_badge(fields.source),
            status: fields.status.as_str(),
            status_label: fields.status.label(),
            status_badge: status_badge(fields.status),
            score: fields.score.get(),
            score_level: score_level(fields.score.get()),
            lead_value: format_currency(fields.lead_value.get()),
            is_qualified: fields.is_qualified,
            last_activity: format_activity(lead.last_activity_at),
        }
    }
}

impl From<Lead> for LeadRow {
    fn from(lead: Lead) -> Self {
        Self::from(&lead)
    }
}

/// Column order of the CSV export.
pub const CSV_HEADERS: [&str; 15] = [
    "id",
    "first_name",
    "last_name",
    "email",
    "phone",
    "company",
    "city",
    "state",
    "source",
    "status",
    "score",
    "lead_value",
    "is_qualified",
    "created_at",
    "last_activity_at",
];

/// One exported lead; fields follow [`CSV_HEADERS`].
#[derive(Debug, Serialize)]
pub struct LeadCsvRecord {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub city: String,
    pub state: String,
    pub source: &'static str,
    pub status: &'static str,
    pub score: i32,
    pub lead_value: f64,
    pub is_qualified: bool,
    pub created_at: String,
    pub last_activity_at: String,
}

impl From<&Lead> for LeadCsvRecord {
    fn from(lead: &Lead) -> Self {
        let fields = &lead.fields;
        Self {
            id: lead.id.get(),
            first_name: fields.first_name.to_string(),
            last_name: fields.last_name.to_string(),
            email: fields.email.to_string(),
            phone: fields.phone.clone().unwrap_or_default(),
            company: fields.company.clone().unwrap_or_default(),
            city: fields.city.clone().unwrap_or_default(),
            state: fields.state.clone().unwrap_or_default(),
            source: fields.source.as_str(),
            status: fields.status.as_str(),
            score: fields.score.get(),
            lead_value: fields.lead_value.get(),
            is_qualified: fields.is_qualified,
            created_at: lead.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            last_activity_at: lead
                .last_activity_at
                .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
        }
    }
}
