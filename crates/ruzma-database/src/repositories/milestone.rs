//! Milestone repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use ruzma_core::error::{AppError, ErrorKind};
use ruzma_core::result::AppResult;
use ruzma_core::types::{MilestoneId, PageRequest, PageResponse, ProjectId};
use ruzma_entity::milestone::{CreateMilestone, Milestone};

use crate::store::MilestoneStore;

/// Postgres-backed milestone store.
#[derive(Debug, Clone)]
pub struct MilestoneRepository {
    pool: PgPool,
}

impl MilestoneRepository {
    /// Create a new milestone repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MilestoneStore for MilestoneRepository {
    async fn find_by_id(&self, id: MilestoneId) -> AppResult<Option<Milestone>> {
        sqlx::query_as::<_, Milestone>("SELECT * FROM milestones WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find milestone", e))
    }

    async fn find_by_project(
        &self,
        project_id: ProjectId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Milestone>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM milestones WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count milestones", e)
            })?;

        let milestones = sqlx::query_as::<_, Milestone>(
            "SELECT * FROM milestones WHERE project_id = $1 \
             ORDER BY created_at ASC, id ASC LIMIT $2 OFFSET $3",
        )
        .bind(project_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list milestones", e))?;

        Ok(PageResponse::new(milestones, page, total as u64))
    }

    async fn create(&self, data: &CreateMilestone) -> AppResult<Milestone> {
        sqlx::query_as::<_, Milestone>(
            "INSERT INTO milestones (id, project_id, title, description, price, due_date) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(MilestoneId::new())
        .bind(data.project_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.price)
        .bind(data.due_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create milestone", e))
    }

    async fn compare_and_set_deliverable(
        &self,
        id: MilestoneId,
        expected: Option<&str>,
        replacement: Option<&str>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE milestones SET deliverable_link = $3, updated_at = NOW() \
             WHERE id = $1 AND deliverable_link IS NOT DISTINCT FROM $2",
        )
        .bind(id)
        .bind(expected)
        .bind(replacement)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update deliverable field", e)
        })?;

        let swapped = result.rows_affected() > 0;
        debug!(milestone_id = %id, swapped, "Deliverable compare-and-set");
        Ok(swapped)
    }

    async fn find_with_deliverable(&self) -> AppResult<Vec<Milestone>> {
        sqlx::query_as::<_, Milestone>(
            "SELECT * FROM milestones WHERE deliverable_link IS NOT NULL ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list deliverable fields", e)
        })
    }
}
