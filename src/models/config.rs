//! Configuration model loaded from external sources.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    pub database_url: String,
    pub templates_dir: String,
    /// Shared secret used to verify session tokens and sign cookies (at least 64 bytes).
    pub secret: String,
    pub auth_service_url: String,
}

impl ServerConfig {
    /// Page the user is sent to when no valid session is present.
    pub fn login_url(&self) -> String {
        format!("{}/auth/signin", self.auth_service_url.trim_end_matches('/'))
    }
}
