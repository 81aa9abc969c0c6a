//! Milestone creation and lookup.

use std::sync::Arc;

use tracing::info;

use ruzma_core::error::AppError;
use ruzma_core::result::AppResult;
use ruzma_core::types::{MilestoneId, PageRequest, PageResponse, ProjectId};
use ruzma_database::MilestoneStore;
use ruzma_entity::milestone::{CreateMilestone, Milestone};

/// Creates and reads milestones.
#[derive(Debug, Clone)]
pub struct MilestoneService {
    store: Arc<dyn MilestoneStore>,
}

impl MilestoneService {
    /// Creates a new milestone service.
    pub fn new(store: Arc<dyn MilestoneStore>) -> Self {
        Self { store }
    }

    /// Creates a milestone. Its deliverable field starts empty.
    pub async fn create(&self, mut data: CreateMilestone) -> AppResult<Milestone> {
        data.title = data.title.trim().to_string();
        if data.title.is_empty() {
            return Err(AppError::validation("Milestone title is required"));
        }
        if data.price.is_some_and(|p| !p.is_finite() || p < 0.0) {
            return Err(AppError::validation("Milestone price must be a non-negative number"));
        }

        let milestone = self.store.create(&data).await?;
        info!(
            milestone_id = %milestone.id,
            project_id = %milestone.project_id,
            "Milestone created"
        );
        Ok(milestone)
    }

    /// Fetches a milestone or fails with `NotFound`.
    pub async fn get(&self, id: MilestoneId) -> AppResult<Milestone> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Milestone {id} not found")))
    }

    /// Lists a project's milestones.
    pub async fn list_by_project(
        &self,
        project_id: ProjectId,
        page: PageRequest,
    ) -> AppResult<PageResponse<Milestone>> {
        self.store.find_by_project(project_id, &page).await
    }
}
