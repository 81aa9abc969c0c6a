//! Route definitions for the Ruzma HTTP API.
//!
//! All routes are mounted under `/api` and receive `AppState` through
//! Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the Axum router with every route, the body limit and request logging.
pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.server.max_body_bytes;

    let api_routes = Router::new()
        .merge(health_routes())
        .merge(milestone_routes())
        .merge(deliverable_routes())
        .merge(revision_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Milestone creation and lookup
fn milestone_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/projects/{project_id}/milestones",
            get(handlers::milestone::list_milestones).post(handlers::milestone::create_milestone),
        )
        .route("/milestones/{id}", get(handlers::milestone::get_milestone))
}

/// Deliverable view and shared link editing
fn deliverable_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/milestones/{id}/deliverable",
            get(handlers::deliverable::get_deliverable),
        )
        .route(
            "/milestones/{id}/links",
            put(handlers::deliverable::save_links)
                .post(handlers::deliverable::add_link)
                .delete(handlers::deliverable::clear_links),
        )
}

/// Revision requests and quota
fn revision_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/revision-requests",
            post(handlers::revision::create_revision_request),
        )
        .route(
            "/milestones/{id}/revisions",
            get(handlers::revision::get_revisions),
        )
        .route(
            "/milestones/{id}/revisions/max",
            put(handlers::revision::update_max_revisions),
        )
        .route(
            "/milestones/{id}/revisions/{request_id}/addressed",
            post(handlers::revision::mark_addressed),
        )
}
