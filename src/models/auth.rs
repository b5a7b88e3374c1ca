//! Extraction of the authenticated user from the identity cookie.
//!
//! The auth service signs a JWT and stores it as the identity of the shared
//! session cookie. Handlers receive the decoded claims as an explicit
//! [`AuthenticatedUser`] argument; requests without a valid token are
//! rejected with `401 Unauthorized`, which [`crate::middleware::RedirectUnauthorized`]
//! turns into a redirect to the sign-in page.

use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_web::dev::Payload;
use actix_web::{Error, FromRequest, HttpRequest, error::ErrorUnauthorized, web};
use jsonwebtoken::{DecodingKey, Validation, decode};

use crate::domain::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;

/// Verifies a session token with the shared secret and returns its claims.
pub fn decode_token(token: &str, secret: &str) -> Result<AuthenticatedUser, jsonwebtoken::errors::Error> {
    let data = decode::<AuthenticatedUser>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

fn extract_user(req: &HttpRequest) -> Result<AuthenticatedUser, Error> {
    let config = req
        .app_data::<web::Data<ServerConfig>>()
        .ok_or_else(|| ErrorUnauthorized("server configuration is missing"))?;

    let token = req
        .get_identity()
        .and_then(|identity| identity.id())
        .map_err(|_| ErrorUnauthorized("no active session"))?;

    decode_token(&token, &config.secret).map_err(|err| {
        log::warn!("Rejected session token: {err}");
        ErrorUnauthorized("invalid session token")
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_user(req))
    }
}
