//! Export services - turn a posted roster into a CSV download

use crate::core::{AppError, AppState, ExtractError};
use crate::dtos::ExportRequest;
use crate::entities::Roster;
use crate::export::DOWNLOAD_FILE_NAME;
use axum::{
    extract::{Json, State, rejection::JsonRejection},
    http::header,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{info, instrument};

#[instrument(skip(state, payload))]
pub async fn export_csv(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload.map_err(|e| {
        AppError::bad_request("Invalid export payload").with_details(e.body_text())
    })?;
    let roster = Roster::from(payload);

    // file I/O stays off the async workers
    let worker_state = state.clone();
    let artifact = tokio::task::spawn_blocking(move || worker_state.exporter.export(&roster))
        .await
        .map_err(|e| state.fail(ExtractError::Export(e.to_string())))?
        .map_err(|e| state.fail(e))?;

    let path = artifact.path().display().to_string();
    let bytes = artifact.into_bytes().await.map_err(|e| state.fail(e))?;
    info!("Sending CSV export {} ({} bytes)", path, bytes.len());

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", DOWNLOAD_FILE_NAME),
        ),
    ];
    Ok((headers, bytes))
}
