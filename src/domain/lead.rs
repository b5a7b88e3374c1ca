use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    LeadEmail, LeadId, LeadSource, LeadStatus, LeadValue, PersonName, Score, UserId,
};

/// Editable part of a lead; what the form submits on create and on update.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LeadFields {
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: LeadEmail,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub source: LeadSource,
    pub status: LeadStatus,
    pub score: Score,
    pub lead_value: LeadValue,
    pub is_qualified: bool,
}

impl LeadFields {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        first_name: PersonName,
        last_name: PersonName,
        email: LeadEmail,
        phone: Option<String>,
        company: Option<String>,
        city: Option<String>,
        state: Option<String>,
        source: LeadSource,
        status: LeadStatus,
        score: Score,
        lead_value: LeadValue,
        is_qualified: bool,
    ) -> Self {
        Self {
            first_name,
            last_name,
            email,
            phone: normalize_optional(phone),
            company: normalize_optional(company),
            city: normalize_optional(city),
            state: normalize_optional(state),
            source,
            status,
            score,
            lead_value,
            is_qualified,
        }
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Lead {
    pub id: LeadId,
    /// Owning user; never sent to the browser.
    #[serde(skip_serializing)]
    pub owner_id: UserId,
    #[serde(flatten)]
    pub fields: LeadFields,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub last_activity_at: Option<NaiveDateTime>,
}

impl Lead {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.fields.first_name, self.fields.last_name)
    }
}

/// Create request. The store assigns id and timestamps; a new lead has no
/// activity yet.
#[derive(Clone, Debug, PartialEq)]
pub struct NewLead {
    pub owner_id: UserId,
    pub fields: LeadFields,
}

impl NewLead {
    #[must_use]
    pub fn new(owner_id: UserId, fields: LeadFields) -> Self {
        Self { owner_id, fields }
    }
}

/// Update request carrying the full editable field set. Applying it records
/// activity on the lead.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateLead {
    pub fields: LeadFields,
}

impl UpdateLead {
    #[must_use]
    pub fn new(fields: LeadFields) -> Self {
        Self { fields }
    }
}

impl From<&Lead> for UpdateLead {
    fn from(lead: &Lead) -> Self {
        Self::new(lead.fields.clone())
    }
}
