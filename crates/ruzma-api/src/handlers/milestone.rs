//! Milestone handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use ruzma_core::error::AppError;
use ruzma_core::types::PageResponse;
use ruzma_entity::milestone::{CreateMilestone, Milestone};

use crate::dto::request::CreateMilestoneRequest;
use crate::dto::response::ApiResponse;
use crate::extractors::{PaginationParams, ValidJson, parse_milestone_id, parse_project_id};
use crate::state::AppState;

/// POST /api/projects/{project_id}/milestones
pub async fn create_milestone(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    ValidJson(req): ValidJson<CreateMilestoneRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Milestone>>), AppError> {
    let project_id = parse_project_id(&project_id)?;
    let milestone = state
        .milestone_service
        .create(CreateMilestone {
            project_id,
            title: req.title,
            description: req.description,
            price: req.price,
            due_date: req.due_date,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(milestone))))
}

/// GET /api/projects/{project_id}/milestones
pub async fn list_milestones(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<Milestone>>>, AppError> {
    let project_id = parse_project_id(&project_id)?;
    let page = state
        .milestone_service
        .list_by_project(project_id, params.into_page_request())
        .await?;

    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/milestones/{id}
pub async fn get_milestone(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Milestone>>, AppError> {
    let id = parse_milestone_id(&id)?;
    let milestone = state.milestone_service.get(id).await?;
    Ok(Json(ApiResponse::ok(milestone)))
}
