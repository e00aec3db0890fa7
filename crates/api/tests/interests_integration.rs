//! Interest toggling over HTTP.

mod common;

use axum::http::{Method, StatusCode};
use common::{json_request, parse_response_body, TestApp};
use uuid::Uuid;

#[tokio::test]
async fn test_toggle_adds_then_removes() {
    let app = TestApp::new();
    let user = app.user().await;
    let venue = app.venue("Blue Bottle", "Cafe").await;

    let body = app.toggle(user, venue).await;
    assert_eq!(body["status"], "added");
    assert_eq!(body["interest"]["user_id"], user.to_string());
    assert!(body["action_item"].is_null());

    let body = app.toggle(user, venue).await;
    assert_eq!(body["status"], "removed");
    assert_eq!(body["venue_id"], venue.to_string());
}

#[tokio::test]
async fn test_fifth_interest_creates_action_item() {
    let app = TestApp::new();
    let venue = app.venue("Luigi's", "Restaurant").await;

    let (users, first_four) = app.crowd(venue, 4).await;
    assert_eq!(users.len(), 4);
    assert!(first_four.is_none());

    let fifth = app.user().await;
    let body = app.toggle(fifth, venue).await;
    let item = &body["action_item"];
    assert_eq!(item["status"], "active");
    assert_eq!(item["action_type"], "book_venue");
    assert_eq!(item["interested_user_ids"].as_array().unwrap().len(), 5);
    assert!(item["action_code"].as_str().unwrap().starts_with("GO-"));

    // a sixth interest does not create a second item
    let sixth = app.user().await;
    let body = app.toggle(sixth, venue).await;
    assert!(body["action_item"].is_null());
}

#[tokio::test]
async fn test_toggle_unknown_user_or_venue() {
    let app = TestApp::new();
    let user = app.user().await;
    let venue = app.venue("Blue Bottle", "Cafe").await;

    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/interests/toggle",
            serde_json::json!({ "user_id": Uuid::new_v4(), "venue_id": venue }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["message"], "User not found");

    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/interests/toggle",
            serde_json::json!({ "user_id": user, "venue_id": Uuid::new_v4() }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(parse_response_body(response).await["message"], "Venue not found");
}

#[tokio::test]
async fn test_toggle_rejects_malformed_body() {
    let app = TestApp::new();

    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/interests/toggle",
            serde_json::json!({ "user_id": "not-a-uuid" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(parse_response_body(response).await["error"], "validation_error");
}
