use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::domain::lead::{Lead, LeadFields};
use crate::domain::types::{LeadEmail, LeadSource, LeadStatus, LeadValue, PersonName, Score};
use crate::forms::FormError;

/// Draft of a lead as typed into the create/edit form.
///
/// Every field is kept as raw text so the draft can be echoed back verbatim
/// when the submission is rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub score: String,
    #[serde(default)]
    pub lead_value: String,
    /// Checkbox value; absent when unchecked.
    #[serde(default)]
    pub is_qualified: Option<String>,
}

/// Coerced values the validation rules run against.
#[derive(Debug, Validate)]
struct LeadSubmission {
    #[validate(length(min = 1))]
    first_name: String,
    #[validate(length(min = 1))]
    last_name: String,
    #[validate(length(min = 1))]
    email: String,
    #[validate(range(min = 0, max = 100))]
    score: i64,
}

/// Parses an integer, truncating decimals; empty or invalid input becomes 0.
pub fn coerce_integer(raw: &str) -> i64 {
    let trimmed = raw.trim();
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| {
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(|value| value.trunc() as i64)
        })
        .unwrap_or(0)
}

/// Parses a currency amount; empty, invalid or negative input becomes 0.
pub fn coerce_amount(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
        .unwrap_or(0.0)
}

fn classify(errors: ValidationErrors) -> FormError {
    let fields = errors.field_errors();
    if ["first_name", "last_name", "email"]
        .iter()
        .any(|field| fields.contains_key(*field))
    {
        FormError::MissingRequiredField
    } else if fields.contains_key("score") {
        FormError::ScoreOutOfRange
    } else {
        FormError::Validation(errors)
    }
}

fn optional(value: &str) -> Option<String> {
    Some(value.to_string())
}

impl LeadForm {
    /// Empty draft used by the create view.
    pub fn blank() -> Self {
        Self {
            source: LeadSource::default().as_str().to_string(),
            status: LeadStatus::default().as_str().to_string(),
            score: "0".to_string(),
            lead_value: "0".to_string(),
            ..Self::default()
        }
    }

    pub fn is_qualified(&self) -> bool {
        self.is_qualified
            .as_deref()
            .is_some_and(|value| !matches!(value.trim(), "" | "false" | "off" | "0"))
    }

    /// Validates the draft and packages the full editable field set.
    ///
    /// Required fields are checked before the score range so each rejected
    /// submission reports a single notice.
    pub fn to_fields(&self) -> Result<LeadFields, FormError> {
        let submission = LeadSubmission {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            score: coerce_integer(&self.score),
        };
        submission.validate().map_err(classify)?;

        let source = self
            .source
            .parse::<LeadSource>()
            .map_err(|_| FormError::InvalidSource)?;
        let status = self
            .status
            .parse::<LeadStatus>()
            .map_err(|_| FormError::InvalidStatus)?;
        let score = i32::try_from(submission.score).map_err(|_| FormError::ScoreOutOfRange)?;

        Ok(LeadFields::new(
            PersonName::new(submission.first_name)?,
            PersonName::new(submission.last_name)?,
            LeadEmail::new(submission.email)?,
            optional(&self.phone),
            optional(&self.company),
            optional(&self.city),
            optional(&self.state),
            source,
            status,
            Score::new(score)?,
            LeadValue::new(coerce_amount(&self.lead_value))?,
            self.is_qualified(),
        ))
    }
}

impl From<&Lead> for LeadForm {
    /// Pre-populates the edit draft with the lead's current values.
    fn from(lead: &Lead) -> Self {
        let fields = &lead.fields;
        Self {
            first_name: fields.first_name.to_string(),
            last_name: fields.last_name.to_string(),
            email: fields.email.to_string(),
            phone: fields.phone.clone().unwrap_or_default(),
            company: fields.company.clone().unwrap_or_default(),
            city: fields.city.clone().unwrap_or_default(),
            state: fields.state.clone().unwrap_or_default(),
            source: fields.source.as_str().to_string(),
            status: fields.status.as_str().to_string(),
            score: fields.score.to_string(),
            lead_value: fields.lead_value.to_string(),
            is_qualified: fields.is_qualified.then(|| "true".to_string()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
/// Confirmation posted from the delete page.
pub struct DeleteLeadForm {
    #[serde(default)]
    pub confirm: Option<String>,
}

impl DeleteLeadForm {
    pub fn is_confirmed(&self) -> bool {
        self.confirm
            .as_deref()
            .is_some_and(|value| matches!(value.trim(), "yes" | "true" | "on"))
    }
}

#[derive(Debug, Default, Deserialize)]
/// Draft discarded from either the create or the edit view.
pub struct CancelLeadForm {
    #[serde(default)]
    pub lead_id: Option<i32>,
}
