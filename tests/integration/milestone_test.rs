//! Integration tests for milestone creation, lookup and health.

use http::StatusCode;
use serde_json::json;

use ruzma_core::types::{MilestoneId, ProjectId};

use crate::helpers::TestApp;

#[tokio::test]
async fn test_create_and_get_milestone() {
    let app = TestApp::new();
    let id = app.create_milestone("  Logo design  ").await;

    let response = app.request("GET", &format!("/api/milestones/{id}"), None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["title"], "Logo design");
    assert!(response.data()["deliverable_link"].is_null());
}

#[tokio::test]
async fn test_list_milestones_by_project() {
    let app = TestApp::new();
    let project_id = ProjectId::new();
    for title in ["Wireframes", "Final design"] {
        let response = app
            .request(
                "POST",
                &format!("/api/projects/{project_id}/milestones"),
                Some(json!({ "title": title })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
    }
    app.create_milestone("Other project").await;

    let response = app
        .request(
            "GET",
            &format!("/api/projects/{project_id}/milestones?page=1&per_page=10"),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["total_items"], 2);
    assert_eq!(response.data()["items"][0]["title"], "Wireframes");
}

#[tokio::test]
async fn test_create_milestone_rejects_blank_title() {
    let app = TestApp::new();
    let project_id = ProjectId::new();

    let response = app
        .request(
            "POST",
            &format!("/api/projects/{project_id}/milestones"),
            Some(json!({ "title": "", "price": -1.0 })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_unknown_and_malformed_ids() {
    let app = TestApp::new();

    let response = app
        .request("GET", &format!("/api/milestones/{}", MilestoneId::new()), None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error_code(), "NOT_FOUND");

    let response = app.request("GET", "/api/milestones/not-a-uuid", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_without_database() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
    assert_eq!(response.data()["database"], "not_configured");
}
