//! Extract services - fetch a course from the LMS and join it

use crate::core::{AppError, AppState};
use crate::dtos::ExtractForm;
use crate::entities::Roster;
use crate::roster;
use axum::{
    extract::{Form, Json, State, rejection::FormRejection},
    response::Html,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use validator::Validate;

/// Runs fetch + join; shared by the HTML and the JSON endpoint
async fn extract_roster(state: &AppState, form: ExtractForm) -> Result<(String, Roster), AppError> {
    form.validate()?;
    let target = form.resolve().map_err(|e| state.fail(e))?;

    let data = state
        .lms
        .fetch_course(&target.api_key, &target.base_url, &target.course_id)
        .await
        .map_err(|e| state.fail(e))?;

    let roster = roster::join(&data);
    info!(
        "Extracted {} students and {} groups",
        roster.students.len(),
        roster.groups.len()
    );
    Ok((target.course_id.trim().to_string(), roster))
}

fn parse_form(form: Result<Form<ExtractForm>, FormRejection>) -> Result<ExtractForm, AppError> {
    form.map(|Form(form)| form).map_err(|e| {
        AppError::bad_request("Invalid form submission").with_details(e.body_text())
    })
}

#[instrument(skip(state, form))]
pub async fn extract_page(
    State(state): State<Arc<AppState>>,
    form: Result<Form<ExtractForm>, FormRejection>,
) -> Result<Html<String>, AppError> {
    debug!("Extract requested from form");
    let form = parse_form(form)?;
    let (course_id, roster) = extract_roster(&state, form).await?;
    let html = state.views.render_results(&course_id, &roster, Utc::now())?;
    Ok(Html(html))
}

#[instrument(skip(state, form))]
pub async fn extract_json(
    State(state): State<Arc<AppState>>,
    form: Result<Form<ExtractForm>, FormRejection>,
) -> Result<Json<Roster>, AppError> {
    debug!("Extract requested from API");
    let form = parse_form(form)?;
    let (_, roster) = extract_roster(&state, form).await?;
    Ok(Json(roster))
}
