//! Business logic shared by the HTML routes and the JSON API.
//!
//! Services are plain functions generic over the repository traits so they
//! can be exercised with the mock repository.

use thiserror::Error;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::types::UserId;

pub mod api;
pub mod leads;

/// Errors surfaced by the service layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    /// Submission rejected by validation; the message is shown to the user.
    #[error("{0}")]
    Form(String),

    #[error("invalid value: {0}")]
    TypeConstraint(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Owner id of the user; a token without a usable subject is unauthorized.
pub(crate) fn owner_of(user: &AuthenticatedUser) -> ServiceResult<UserId> {
    user.user_id().map_err(|err| {
        log::warn!("Rejected user without subject: {err}");
        ServiceError::Unauthorized
    })
}
