use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::lead::{
    Lead as DomainLead, LeadFields, NewLead as DomainNewLead, UpdateLead as DomainUpdateLead,
};
use crate::domain::types::{
    LeadEmail, LeadId, LeadValue, PersonName, Score, TypeConstraintError, UserId,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::leads)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
/// Diesel model for [`crate::domain::lead::Lead`].
pub struct Lead {
    pub id: i32,
    pub owner_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub source: String,
    pub status: String,
    pub score: i32,
    pub lead_value: f64,
    pub is_qualified: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub last_activity_at: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::leads)]
/// Insertable form of [`Lead`].
pub struct NewLead<'a> {
    pub owner_id: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub company: Option<&'a str>,
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
    pub source: &'static str,
    pub status: &'static str,
    pub score: i32,
    pub lead_value: f64,
    pub is_qualified: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::leads)]
#[diesel(treat_none_as_null = true)]
/// Data used when updating a [`Lead`] record.
pub struct UpdateLead<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub company: Option<&'a str>,
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
    pub source: &'static str,
    pub status: &'static str,
    pub score: i32,
    pub lead_value: f64,
    pub is_qualified: bool,
    pub updated_at: NaiveDateTime,
    pub last_activity_at: Option<NaiveDateTime>,
}

impl TryFrom<Lead> for DomainLead {
    type Error = TypeConstraintError;

    fn try_from(lead: Lead) -> Result<Self, Self::Error> {
        let fields = LeadFields::new(
            PersonName::new(lead.first_name)?,
            PersonName::new(lead.last_name)?,
            LeadEmail::new(lead.email)?,
            lead.phone,
            lead.company,
            lead.city,
            lead.state,
            lead.source.parse()?,
            lead.status.parse()?,
            Score::new(lead.score)?,
            LeadValue::new(lead.lead_value)?,
            lead.is_qualified,
        );

        Ok(Self {
            id: LeadId::new(lead.id)?,
            owner_id: UserId::new(lead.owner_id)?,
            fields,
            created_at: lead.created_at,
            updated_at: lead.updated_at,
            last_activity_at: lead.last_activity_at,
        })
    }
}

impl<'a> NewLead<'a> {
    /// Builds the insertable row stamping both timestamps with `now`.
    pub fn from_domain(lead: &'a DomainNewLead, now: NaiveDateTime) -> Self {
        let fields = &lead.fields;
        Self {
            owner_id: lead.owner_id.as_str(),
            first_name: fields.first_name.as_str(),
            last_name: fields.last_name.as_str(),
            email: fields.email.as_str(),
            phone: fields.phone.as_deref(),
            company: fields.company.as_deref(),
            city: fields.city.as_deref(),
            state: fields.state.as_deref(),
            source: fields.source.as_str(),
            status: fields.status.as_str(),
            score: fields.score.get(),
            lead_value: fields.lead_value.get(),
            is_qualified: fields.is_qualified,
            created_at: now,
            updated_at: now,
        }
    }
}

impl<'a> UpdateLead<'a> {
    /// Builds the changeset stamping `updated_at` and `last_activity_at` with `now`.
    pub fn from_domain(update: &'a DomainUpdateLead, now: NaiveDateTime) -> Self {
        let fields = &update.fields;
        Self {
            first_name: fields.first_name.as_str(),
            last_name: fields.last_name.as_str(),
            email: fields.email.as_str(),
            phone: fields.phone.as_deref(),
            company: fields.company.as_deref(),
            city: fields.city.as_deref(),
            state: fields.state.as_deref(),
            source: fields.source.as_str(),
            status: fields.status.as_str(),
            score: fields.score.get(),
            lead_value: fields.lead_value.get(),
            is_qualified: fields.is_qualified,
            updated_at: now,
            last_activity_at: Some(now),
        }
    }
}
