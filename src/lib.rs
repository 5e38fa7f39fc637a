//! Course roster export service
//!
//! Fetches students, groups and memberships of a course from an LMS REST API,
//! joins students to their groups and exports the result as CSV.

pub mod core;
pub mod dtos;
pub mod entities;
pub mod export;
pub mod lms;
pub mod roster;
pub mod services;
pub mod views;

// Re-export of the main types for the binary and the tests
pub use crate::core::{AppError, AppState, Config, ExtractError};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Builds the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    use services::{export_csv, extract_json, extract_page, health, root, script};

    Router::new()
        .route("/", get(root))
        .route("/static/script.js", get(script))
        .route("/health", get(health))
        .route("/extract", post(extract_page))
        .route("/api/extract", post(extract_json))
        .route("/export", post(export_csv))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
