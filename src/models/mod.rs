//! Database models and configuration shared across the lead service.

#[cfg(feature = "server")]
pub mod auth;
pub mod config;
pub mod lead;
