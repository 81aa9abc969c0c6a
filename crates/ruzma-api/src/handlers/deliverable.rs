//! Deliverable field and shared link handlers.

use axum::Json;
use axum::extract::{Path, State};

use ruzma_core::error::AppError;
use ruzma_service::DeliverableView;

use crate::dto::request::{LinkInput, SaveLinksRequest};
use crate::dto::response::{ApiResponse, LinksResponse};
use crate::extractors::{ValidJson, parse_milestone_id};
use crate::state::AppState;

/// GET /api/milestones/{id}/deliverable
pub async fn get_deliverable(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeliverableView>>, AppError> {
    let id = parse_milestone_id(&id)?;
    let view = state.deliverable_service.view(id).await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// PUT /api/milestones/{id}/links
pub async fn save_links(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<SaveLinksRequest>,
) -> Result<Json<ApiResponse<LinksResponse>>, AppError> {
    let id = parse_milestone_id(&id)?;
    let drafts = req.links.into_iter().map(Into::into).collect();
    let links = state.link_service.replace_links(id, drafts).await?;
    Ok(Json(ApiResponse::ok(LinksResponse { links })))
}

/// POST /api/milestones/{id}/links
pub async fn add_link(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<LinkInput>,
) -> Result<Json<ApiResponse<LinksResponse>>, AppError> {
    let id = parse_milestone_id(&id)?;
    let links = state.link_service.add_link(id, req.into()).await?;
    Ok(Json(ApiResponse::ok(LinksResponse { links })))
}

/// DELETE /api/milestones/{id}/links
pub async fn clear_links(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<LinksResponse>>, AppError> {
    let id = parse_milestone_id(&id)?;
    state.link_service.clear_links(id).await?;
    Ok(Json(ApiResponse::ok(LinksResponse { links: Vec::new() })))
}
