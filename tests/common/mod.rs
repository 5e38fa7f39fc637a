#![allow(dead_code)]

use axum_test::TestServer;
use roster_export::{AppState, Config};
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-token";
pub const COURSE_ID: &str = "42";

/// Config writing exports to `export_dir`, with a short LMS timeout
pub fn test_config(export_dir: &Path) -> Config {
    Config {
        lms_timeout_secs: 1,
        export_dir: Some(export_dir.to_path_buf()),
        ..Config::default()
    }
}

pub fn create_test_state(config: Config) -> Arc<AppState> {
    Arc::new(AppState::new(config, None).expect("Failed to build state"))
}

/// Builds a TestServer around the application router
pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    let app = roster_export::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

fn bearer() -> String {
    format!("Bearer {}", API_KEY)
}

pub fn students_body() -> Value {
    json!([
        {"id": 1, "name": "Ada", "email": "ada@x.com", "sortable_name": "Ada"},
        {"id": 2, "name": "Bob"}
    ])
}

pub fn groups_body() -> Value {
    json!([
        {"id": 10, "name": "G1", "group_category_id": 5},
        {"id": 11, "name": "G2", "group_category_id": 5}
    ])
}

/// Mounts course 42 with two students and two groups.
/// G1 holds Ada plus a non-student (99), G2 is empty.
pub async fn mount_course(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/courses/{}/users", COURSE_ID)))
        .and(query_param("enrollment_type[]", "student"))
        .and(header("authorization", bearer().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(students_body()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/courses/{}/groups", COURSE_ID)))
        .and(header("authorization", bearer().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(groups_body()))
        .mount(server)
        .await;

    mount_memberships(
        server,
        10,
        json!([
            {"id": 500, "group_id": 10, "user_id": 1, "workflow_state": "accepted"},
            {"id": 501, "group_id": 10, "user_id": 99, "workflow_state": "accepted"}
        ]),
    )
    .await;
    mount_memberships(server, 11, json!([])).await;
}

pub async fn mount_memberships(server: &MockServer, group_id: i64, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/groups/{}/memberships", group_id)))
        .and(header("authorization", bearer().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_group_categories(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/courses/{}/group_categories", COURSE_ID)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 5, "name": "Project Teams"}])),
        )
        .mount(server)
        .await;
}

/// Answers every GET with `status`
pub async fn mount_status(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({"errors": []})))
        .mount(server)
        .await;
}

pub fn extract_form(base_url: &str) -> Vec<(&'static str, String)> {
    vec![
        ("api_key", API_KEY.to_string()),
        ("base_url", base_url.to_string()),
        ("course_id", COURSE_ID.to_string()),
    ]
}
