//! Integration tests for shared link editing and the deliverable view.

use http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_save_links_normalizes_urls() {
    let app = TestApp::new();
    let id = app.create_milestone("Brand kit").await;

    let response = app
        .request(
            "PUT",
            &format!("/api/milestones/{id}/links"),
            Some(json!({
                "links": [
                    { "url": "example.com/kit.zip", "title": "Kit" },
                    { "url": "   ", "title": "dropped" },
                    { "url": "https://figma.com/file/abc", "title": "" }
                ]
            })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    let links = response.data()["links"].as_array().unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0]["url"], "https://example.com/kit.zip");
    assert_eq!(links[1]["title"], "Shared Link");

    let view = app
        .request("GET", &format!("/api/milestones/{id}/deliverable"), None)
        .await;
    assert_eq!(view.data()["format"], "document");
    assert_eq!(view.data()["links"], response.data()["links"]);
}

#[tokio::test]
async fn test_save_links_reports_invalid_rows() {
    let app = TestApp::new();
    let id = app.create_milestone("Brand kit").await;

    let response = app
        .request(
            "PUT",
            &format!("/api/milestones/{id}/links"),
            Some(json!({
                "links": [
                    { "url": "not a url", "title": "A" },
                    { "url": "example.com", "title": "B" }
                ]
            })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");
    let details = response.body["details"].as_array().unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0]["index"], 0);
    assert_eq!(details[0]["reason"], "invalid_url");

    let view = app
        .request("GET", &format!("/api/milestones/{id}/deliverable"), None)
        .await;
    assert_eq!(view.data()["format"], "empty");
}

#[tokio::test]
async fn test_fourth_link_is_refused() {
    let app = TestApp::new();
    let id = app.create_milestone("Photos").await;
    let path = format!("/api/milestones/{id}/links");

    for i in 1..=3 {
        let response = app
            .request(
                "POST",
                &path,
                Some(json!({ "url": format!("photos.example.com/{i}"), "title": "Set" })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.data()["links"].as_array().unwrap().len(), i);
    }

    let response = app
        .request(
            "POST",
            &path,
            Some(json!({ "url": "photos.example.com/4", "title": "Set" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "POLICY_VIOLATION");
}

#[tokio::test]
async fn test_clear_links_keeps_revision_history() {
    let app = TestApp::new();
    let id = app.create_milestone("Copy").await;

    app.request(
        "PUT",
        &format!("/api/milestones/{id}/links"),
        Some(json!({ "links": [{ "url": "docs.example.com/copy", "title": "Copy" }] })),
    )
    .await;
    app.request(
        "POST",
        "/api/revision-requests",
        Some(json!({ "milestoneId": id, "feedback": "shorter headline" })),
    )
    .await;

    let response = app
        .request("DELETE", &format!("/api/milestones/{id}/links"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let view = app
        .request("GET", &format!("/api/milestones/{id}/deliverable"), None)
        .await;
    assert!(view.data()["links"].as_array().unwrap().is_empty());
    assert_eq!(view.data()["revisionData"]["usedRevisions"], 1);
    assert_eq!(
        view.data()["revisionData"]["requests"][0]["feedback"],
        "shorter headline"
    );
}

#[tokio::test]
async fn test_legacy_plain_link_is_readable_and_upgraded_on_write() {
    let app = TestApp::new();
    let id = app.insert_raw(Some("https://example.com/file.pdf"));

    let view = app
        .request("GET", &format!("/api/milestones/{id}/deliverable"), None)
        .await;
    assert_eq!(view.status, StatusCode::OK);
    assert_eq!(view.data()["format"], "legacy_plain_link");
    assert_eq!(view.data()["links"][0]["url"], "https://example.com/file.pdf");
    assert_eq!(view.data()["links"][0]["title"], "Shared Link");
    assert_eq!(view.data()["revisionData"]["usedRevisions"], 0);
    assert!(view.data()["revisionData"]["maxRevisions"].is_null());
    assert_eq!(view.data()["canRequestRevision"], true);

    let response = app
        .request(
            "POST",
            "/api/revision-requests",
            Some(json!({ "milestoneId": id.to_string(), "feedback": "new cover" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let view = app
        .request("GET", &format!("/api/milestones/{id}/deliverable"), None)
        .await;
    assert_eq!(view.data()["format"], "document");
    assert_eq!(view.data()["links"][0]["url"], "https://example.com/file.pdf");
    assert_eq!(view.data()["revisionData"]["usedRevisions"], 1);
}

#[tokio::test]
async fn test_corrupt_field_reads_as_empty() {
    let app = TestApp::new();
    let id = app.insert_raw(Some("42"));

    let view = app
        .request("GET", &format!("/api/milestones/{id}/deliverable"), None)
        .await;

    assert_eq!(view.status, StatusCode::OK);
    assert_eq!(view.data()["format"], "corrupt");
    assert!(view.data()["links"].as_array().unwrap().is_empty());
    assert_eq!(view.data()["revisionData"]["usedRevisions"], 0);
}
