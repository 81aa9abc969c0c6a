//! Milestone entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use ruzma_core::types::{MilestoneId, ProjectId};

use crate::deliverable::DecodedField;

/// A priced, dated deliverable unit within a project.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Milestone {
    /// Unique milestone identifier.
    pub id: MilestoneId,
    /// The project this milestone belongs to.
    pub project_id: ProjectId,
    /// Short title shown to the client.
    pub title: String,
    /// Longer description of the work.
    pub description: Option<String>,
    /// Agreed price in the project's currency.
    pub price: Option<f64>,
    /// Date the work is due.
    pub due_date: Option<NaiveDate>,
    /// Raw deliverable field: shared links and revision ledger as JSON text.
    ///
    /// Decode it with [`crate::deliverable::DecodedField`].
    pub deliverable_link: Option<String>,
    /// When the milestone was created.
    pub created_at: DateTime<Utc>,
    /// When the milestone was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Milestone {
    /// Decode the deliverable field.
    pub fn deliverable(&self) -> DecodedField {
        DecodedField::decode(self.deliverable_link.as_deref())
    }
}

/// Data required to create a new milestone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMilestone {
    /// The owning project.
    pub project_id: ProjectId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Price.
    pub price: Option<f64>,
    /// Due date.
    pub due_date: Option<NaiveDate>,
}
