//! Venue catalogue, profiles, recommendations and the social feed.

mod common;

use axum::http::StatusCode;
use common::{get_request, parse_response_body, TestApp, ORIGIN};
use uuid::Uuid;

fn names(body: &serde_json::Value) -> Vec<String> {
    body["venues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_list_venues_without_user() {
    let app = TestApp::new();
    app.venue("Zeta Lounge", "Bar").await;
    app.venue("Alpha Roasters", "Cafe").await;

    let response = app.send(get_request("/api/v1/venues")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["total"], 2);
    assert_eq!(names(&body), vec!["Alpha Roasters", "Zeta Lounge"]);
    assert!(body["venues"][0].get("distance_km").is_none());

    let body = parse_response_body(app.send(get_request("/api/v1/venues?categories=CAFE")).await).await;
    assert_eq!(names(&body), vec!["Alpha Roasters"]);
}

#[tokio::test]
async fn test_list_venues_rejects_bad_filters() {
    let app = TestApp::new();
    let user = app.user().await;

    for uri in [
        "/api/v1/venues?max_distance=5".to_string(),
        "/api/v1/venues?sort_by=distance".to_string(),
        "/api/v1/venues?max_distance=-1".to_string(),
        "/api/v1/venues?sort_by=vibes".to_string(),
        format!(
            "/api/v1/venues?user_id={}&only_interested=true&exclude_interested=true",
            user
        ),
    ] {
        let response = app.send(get_request(&uri)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }

    let response = app
        .send(get_request(&format!("/api/v1/venues?user_id={}", Uuid::new_v4())))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_venues_relative_to_user() {
    let app = TestApp::new();
    let user = app.user().await;
    app.venue_at("Far Diner", "Restaurant", ORIGIN.0 + 0.15, ORIGIN.1).await;
    let near = app.venue("Near Cafe", "Cafe").await;
    app.toggle(user, near).await;

    let body = parse_response_body(
        app.send(get_request(&format!("/api/v1/venues?user_id={}", user)))
            .await,
    )
    .await;
    assert_eq!(names(&body), vec!["Near Cafe", "Far Diner"]);
    assert_eq!(body["venues"][0]["user_interested"], true);

    let body = parse_response_body(
        app.send(get_request(&format!(
            "/api/v1/venues?user_id={}&max_distance=5",
            user
        )))
        .await,
    )
    .await;
    assert_eq!(names(&body), vec!["Near Cafe"]);

    let body = parse_response_body(
        app.send(get_request(&format!(
            "/api/v1/venues?user_id={}&exclude_interested=true",
            user
        )))
        .await,
    )
    .await;
    assert_eq!(names(&body), vec!["Far Diner"]);
}

#[tokio::test]
async fn test_venue_detail() {
    let app = TestApp::new();
    let user = app.user().await;
    let venue = app.venue("Blue Bottle", "Cafe").await;
    app.toggle(user, venue).await;

    let response = app
        .send(get_request(&format!(
            "/api/v1/venues/{}?user_id={}",
            venue, user
        )))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["venue"]["name"], "Blue Bottle");
    assert_eq!(body["total_interested"], 1);
    assert_eq!(body["user_interested"], true);
    assert!(body["active_action_item"].is_null());

    let response = app
        .send(get_request(&format!("/api/v1/venues/{}", Uuid::new_v4())))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_profile() {
    let app = TestApp::new();
    let user = app.user().await;
    let friend = app.user().await;
    app.befriend(user, friend).await;
    let venue = app.venue("Blue Bottle", "Cafe").await;
    app.toggle(user, venue).await;

    let response = app.send(get_request(&format!("/api/v1/users/{}", user))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["user"]["id"], user.to_string());
    assert_eq!(body["friends"][0]["id"], friend.to_string());
    assert_eq!(body["interested_venues"][0]["name"], "Blue Bottle");
    assert!(body["action_items"].as_array().unwrap().is_empty());

    let response = app
        .send(get_request(&format!("/api/v1/users/{}", Uuid::new_v4())))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_recommendations_prefer_nearby() {
    let app = TestApp::new();
    let user = app.user_at(ORIGIN.0, ORIGIN.1, &["coffee"]).await;
    app.venue_at("Far Diner", "Restaurant", ORIGIN.0 + 0.15, ORIGIN.1).await;
    app.venue("Near Cafe", "Cafe").await;

    let response = app
        .send(get_request(&format!("/api/v1/users/{}/recommendations", user)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["recommendations"][0]["venue"]["name"], "Near Cafe");
    assert_eq!(body["recommendations"][0]["already_interested"], false);

    let response = app
        .send(get_request(&format!(
            "/api/v1/users/{}/recommendations",
            Uuid::new_v4()
        )))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_social_feed() {
    let app = TestApp::new();
    let user = app.user().await;
    let friend = app.user().await;
    let stranger = app.user().await;
    app.befriend(user, friend).await;
    let venue = app.venue("Blue Bottle", "Cafe").await;
    app.toggle(friend, venue).await;
    app.toggle(stranger, venue).await;

    let response = app
        .send(get_request(&format!("/api/v1/users/{}/feed", user)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["user"]["id"], friend.to_string());
    assert_eq!(body["items"][0]["action"], "interested");
    assert!(body["new_count"].is_null());
    assert!(body["highlighted_venues"].as_array().unwrap().is_empty());

    let body = parse_response_body(
        app.send(get_request(&format!(
            "/api/v1/users/{}/feed?since=2020-01-01T00:00:00Z",
            user
        )))
        .await,
    )
    .await;
    assert_eq!(body["new_count"], 1);

    let response = app
        .send(get_request(&format!("/api/v1/users/{}/feed?since=yesterday", user)))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
