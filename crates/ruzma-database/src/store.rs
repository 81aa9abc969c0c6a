//! Storage abstraction for milestones.

use async_trait::async_trait;

use ruzma_core::result::AppResult;
use ruzma_core::types::{MilestoneId, PageRequest, PageResponse, ProjectId};
use ruzma_entity::milestone::{CreateMilestone, Milestone};

/// Persistence operations the deliverable services need.
///
/// The deliverable field is only ever written through
/// [`compare_and_set_deliverable`](Self::compare_and_set_deliverable), so two
/// writers racing on the same milestone cannot overwrite each other silently.
#[async_trait]
pub trait MilestoneStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a milestone by ID.
    async fn find_by_id(&self, id: MilestoneId) -> AppResult<Option<Milestone>>;

    /// List a project's milestones, oldest first.
    async fn find_by_project(
        &self,
        project_id: ProjectId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Milestone>>;

    /// Insert a milestone with an empty deliverable field.
    async fn create(&self, data: &CreateMilestone) -> AppResult<Milestone>;

    /// Replace the deliverable field if it still equals `expected`.
    ///
    /// Returns `false` when the milestone is missing or the stored value has
    /// changed since it was read.
    async fn compare_and_set_deliverable(
        &self,
        id: MilestoneId,
        expected: Option<&str>,
        replacement: Option<&str>,
    ) -> AppResult<bool>;

    /// Every milestone whose deliverable field is not `NULL`.
    async fn find_with_deliverable(&self) -> AppResult<Vec<Milestone>>;
}
