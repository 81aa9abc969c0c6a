//! Revision request handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use ruzma_core::error::AppError;
use ruzma_core::types::MilestoneId;
use ruzma_entity::deliverable::RevisionData;
use ruzma_service::RevisionOutcome;

use crate::dto::request::{CreateRevisionRequest, UpdateMaxRevisionsRequest};
use crate::dto::response::ApiResponse;
use crate::extractors::{ValidJson, parse_milestone_id};
use crate::state::AppState;

/// POST /api/revision-requests
///
/// Responds 400 with `Revision limit reached` once the quota is used up.
pub async fn create_revision_request(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateRevisionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RevisionOutcome>>), AppError> {
    let outcome = state
        .revision_service
        .submit_request(MilestoneId::from(req.milestone_id), &req.feedback, req.images)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(outcome))))
}

/// GET /api/milestones/{id}/revisions
pub async fn get_revisions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<RevisionData>>, AppError> {
    let id = parse_milestone_id(&id)?;
    let data = state.revision_service.ledger(id).await?;
    Ok(Json(ApiResponse::ok(data)))
}

/// POST /api/milestones/{id}/revisions/{request_id}/addressed
pub async fn mark_addressed(
    State(state): State<AppState>,
    Path((id, request_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<RevisionData>>, AppError> {
    let id = parse_milestone_id(&id)?;
    let data = state
        .revision_service
        .mark_addressed(id, &request_id)
        .await?;
    Ok(Json(ApiResponse::ok(data)))
}

/// PUT /api/milestones/{id}/revisions/max
pub async fn update_max_revisions(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<UpdateMaxRevisionsRequest>,
) -> Result<Json<ApiResponse<RevisionData>>, AppError> {
    let id = parse_milestone_id(&id)?;
    let data = state
        .revision_service
        .update_max_revisions(id, req.max_revisions)
        .await?;
    Ok(Json(ApiResponse::ok(data)))
}
