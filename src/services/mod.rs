//! Services module - HTTP handlers
//!
//! Each sub-module owns the endpoints of one step of the workflow.

pub mod export;
pub mod extract;

pub use export::export_csv;
pub use extract::{extract_json, extract_page};

use crate::core::{AppError, AppState, DatabaseStatus, database};
use crate::views::SCRIPT_JS;
use axum::{
    extract::{Json, State},
    http::header,
    response::{Html, IntoResponse},
};
use serde::Serialize;
use std::sync::Arc;

/// Landing page with the extract form
pub async fn root(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    Ok(Html(state.views.render_index()?))
}

pub async fn script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        SCRIPT_JS,
    )
}

#[derive(Serialize)]
pub struct HealthDTO {
    pub status: &'static str,
    pub database: DatabaseStatus,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthDTO> {
    let database = database::probe(state.db.as_ref()).await;
    Json(HealthDTO {
        status: "ok",
        database,
    })
}
