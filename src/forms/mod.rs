//! Form definitions backing the lead routes.

use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;

pub mod grid;
pub mod lead;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("Please fill in all required fields (first name, last name, email)")]
    MissingRequiredField,

    #[error("Score must be between 0 and 100")]
    ScoreOutOfRange,

    #[error("Unknown lead source")]
    InvalidSource,

    #[error("Unknown lead status")]
    InvalidStatus,

    #[error("Deletion was not confirmed")]
    NotConfirmed,

    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid value: {0}")]
    Constraint(#[from] TypeConstraintError),
}
