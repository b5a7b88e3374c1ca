//! Identity of the user on whose behalf a request runs.

use serde::{Deserialize, Serialize};

use crate::domain::types::{TypeConstraintError, UserId};

/// Claims carried by the session token issued by the auth service.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Stable user identifier; owner of every lead the user creates.
    pub sub: String,
    pub email: String,
    pub name: String,
    /// Expiration as a unix timestamp.
    pub exp: usize,
}

impl AuthenticatedUser {
    /// Owner id used to scope every lead query and mutation.
    pub fn user_id(&self) -> Result<UserId, TypeConstraintError> {
        UserId::new(self.sub.as_str())
    }
}
