//! Response DTOs.

use serde::{Deserialize, Serialize};

use ruzma_entity::deliverable::SharedLink;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` or `"degraded"`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// `"connected"`, `"unreachable"` or `"not_configured"`.
    pub database: String,
}

/// Shared links after an edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksResponse {
    /// Links as stored.
    pub links: Vec<SharedLink>,
}
