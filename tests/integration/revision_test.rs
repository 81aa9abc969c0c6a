//! Integration tests for revision requests and quotas.

use http::StatusCode;
use serde_json::json;

use ruzma_core::types::MilestoneId;

use crate::helpers::TestApp;

async fn set_max(app: &TestApp, id: &str, max: Option<u32>) {
    let response = app
        .request(
            "PUT",
            &format!("/api/milestones/{id}/revisions/max"),
            Some(json!({ "maxRevisions": max })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
}

async fn submit(app: &TestApp, id: &str, feedback: &str) -> crate::helpers::TestResponse {
    app.request(
        "POST",
        "/api/revision-requests",
        Some(json!({ "milestoneId": id, "feedback": feedback, "images": [] })),
    )
    .await
}

#[tokio::test]
async fn test_quota_is_enforced() {
    let app = TestApp::new();
    let id = app.create_milestone("Illustration").await;
    set_max(&app, &id, Some(2)).await;

    let first = submit(&app, &id, "warmer palette").await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.data()["remainingRevisions"], 1);
    assert_eq!(first.data()["request"]["status"], "pending");

    let second = submit(&app, &id, "bigger title").await;
    assert_eq!(second.status, StatusCode::CREATED);
    assert_eq!(second.data()["remainingRevisions"], 0);
    assert_eq!(second.data()["usedRevisions"], 2);

    let third = submit(&app, &id, "one more").await;
    assert_eq!(third.status, StatusCode::BAD_REQUEST);
    assert_eq!(third.message(), "Revision limit reached");

    let ledger = app
        .request("GET", &format!("/api/milestones/{id}/revisions"), None)
        .await;
    assert_eq!(ledger.data()["usedRevisions"], 2);
    assert_eq!(ledger.data()["requests"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_raising_quota_reopens_requests() {
    let app = TestApp::new();
    let id = app.create_milestone("Video edit").await;
    set_max(&app, &id, Some(1)).await;

    assert_eq!(submit(&app, &id, "cut intro").await.status, StatusCode::CREATED);
    assert_eq!(submit(&app, &id, "music").await.status, StatusCode::BAD_REQUEST);

    set_max(&app, &id, None).await;
    assert_eq!(submit(&app, &id, "music").await.status, StatusCode::CREATED);

    let view = app
        .request("GET", &format!("/api/milestones/{id}/deliverable"), None)
        .await;
    assert!(view.data()["remainingRevisions"].is_null());
    assert_eq!(view.data()["canRequestRevision"], true);
    assert_eq!(view.data()["revisionData"]["usedRevisions"], 2);
}

#[tokio::test]
async fn test_mark_addressed() {
    let app = TestApp::new();
    let id = app.create_milestone("Landing page").await;

    let created = submit(&app, &id, "fix footer links").await;
    let request_id = created.data()["request"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            "POST",
            &format!("/api/milestones/{id}/revisions/{request_id}/addressed"),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["requests"][0]["status"], "addressed");
    assert_eq!(response.data()["usedRevisions"], 1);

    let response = app
        .request(
            "POST",
            &format!("/api/milestones/{id}/revisions/unknown-id/addressed"),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["requests"][0]["status"], "addressed");
}

#[tokio::test]
async fn test_blank_feedback_is_rejected() {
    let app = TestApp::new();
    let id = app.create_milestone("Poster").await;

    let response = submit(&app, &id, "   ").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");

    let ledger = app
        .request("GET", &format!("/api/milestones/{id}/revisions"), None)
        .await;
    assert_eq!(ledger.data()["usedRevisions"], 0);
}

#[tokio::test]
async fn test_unknown_milestone() {
    let app = TestApp::new();

    let response = submit(&app, &MilestoneId::new().to_string(), "anything").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_links_then_revision_end_to_end() {
    let app = TestApp::new();
    let id = app.create_milestone("Deliverable").await;

    app.request(
        "PUT",
        &format!("/api/milestones/{id}/links"),
        Some(json!({ "links": [{ "url": "example.com", "title": "Draft" }] })),
    )
    .await;
    let created = submit(&app, &id, "please fix colors").await;
    assert_eq!(created.status, StatusCode::CREATED);

    let view = app
        .request("GET", &format!("/api/milestones/{id}/deliverable"), None)
        .await;
    assert_eq!(view.data()["format"], "document");
    assert_eq!(
        view.data()["links"],
        json!([{ "url": "https://example.com", "title": "Draft" }])
    );
    let ledger = &view.data()["revisionData"];
    assert!(ledger["maxRevisions"].is_null());
    assert_eq!(ledger["usedRevisions"], 1);
    assert_eq!(ledger["requests"][0]["feedback"], "please fix colors");
    assert_eq!(ledger["requests"][0]["status"], "pending");
    assert!(
        ledger["requests"][0]["requestedAt"]
            .as_str()
            .unwrap()
            .ends_with('Z')
    );
}
