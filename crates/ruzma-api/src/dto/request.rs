//! Request DTOs with validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use ruzma_entity::deliverable::SharedLink;

/// Create milestone request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMilestoneRequest {
    /// Title.
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    /// Description.
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    /// Price.
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: Option<f64>,
    /// Due date (`YYYY-MM-DD`).
    pub due_date: Option<NaiveDate>,
}

/// One row of the link editor.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LinkInput {
    /// URL as typed; may lack a scheme.
    #[serde(default)]
    #[validate(length(max = 2048))]
    pub url: String,
    /// Display title; blank becomes "Shared Link".
    #[serde(default)]
    #[validate(length(max = 200))]
    pub title: String,
}

impl From<LinkInput> for SharedLink {
    fn from(input: LinkInput) -> Self {
        SharedLink::new(input.url, input.title)
    }
}

/// Replace-all links request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SaveLinksRequest {
    /// Editor rows in display order.
    #[serde(default)]
    #[validate(nested)]
    pub links: Vec<LinkInput>,
}

/// Client revision request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRevisionRequest {
    /// Milestone the request is about.
    pub milestone_id: Uuid,
    /// What should change.
    #[validate(length(min = 1, max = 10000, message = "Feedback is required"))]
    pub feedback: String,
    /// Attached image URLs.
    #[serde(default)]
    pub images: Vec<String>,
}

/// Update revision quota request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMaxRevisionsRequest {
    /// New quota; `null` means unlimited.
    pub max_revisions: Option<u32>,
}
