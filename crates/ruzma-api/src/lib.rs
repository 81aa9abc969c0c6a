//! # ruzma-api
//!
//! HTTP API layer for Ruzma built on Axum.
//!
//! Exposes milestone, shared-link and revision-request endpoints under
//! `/api`, together with CORS and request-logging middleware, request
//! extractors, DTOs and the server runner.

pub mod app;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use state::AppState;
