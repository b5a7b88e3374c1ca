//! DTOs exposed by the lead API endpoints.

use serde::Serialize;

use crate::domain::lead::Lead;

/// Payload returned by `GET /api/v1/leads`.
#[derive(Debug, Serialize)]
pub struct LeadsResponse {
    /// Total number of leads matching the filter.
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
    /// Requested page of leads; owner ids are never serialized.
    pub leads: Vec<Lead>,
}
