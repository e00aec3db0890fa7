//! Group chat endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::{get_request, json_request, parse_response_body, TestApp};
use uuid::Uuid;

async fn create_chat(app: &TestApp, venue: Uuid, creator: Uuid, participants: &[Uuid]) -> String {
    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/chats",
            serde_json::json!({
                "venue_id": venue,
                "created_by": creator,
                "participant_ids": participants,
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    parse_response_body(response).await["id"]
        .as_str()
        .unwrap()
        .to_string()
}

fn message(chat_id: &str, sender: Uuid, content: &str) -> axum::http::Request<axum::body::Body> {
    json_request(
        Method::POST,
        &format!("/api/v1/chats/{}/messages", chat_id),
        serde_json::json!({ "sender_id": sender, "content": content }),
    )
}

#[tokio::test]
async fn test_create_chat_and_exchange_messages() {
    let app = TestApp::new();
    let venue = app.venue("Dead Rabbit", "Bar").await;
    let alice = app.user().await;
    let bob = app.user().await;

    let chat_id = create_chat(&app, venue, alice, &[alice, bob, bob]).await;

    let response = app.send(message(&chat_id, bob, "Drinks at 8?")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_response_body(response).await;
    assert_eq!(body["content"], "Drinks at 8?");
    assert_eq!(body["sender_id"], bob.to_string());

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let response = app.send(message(&chat_id, alice, "Sure")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .send(get_request(&format!(
            "/api/v1/chats/{}/messages?limit=1",
            chat_id
        )))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = parse_response_body(response).await;
    assert_eq!(page["messages"].as_array().unwrap().len(), 1);
    assert_eq!(page["messages"][0]["content"], "Sure");
    assert_eq!(page["total"], 2);
    assert_eq!(page["has_more"], true);

    let response = app
        .send(get_request(&format!("/api/v1/users/{}/chats", bob)))
        .await;
    let chats = parse_response_body(response).await;
    assert_eq!(chats[0]["participant_count"], 2);
    assert_eq!(chats[0]["last_message"]["content"], "Sure");
    assert_eq!(chats[0]["venue"]["name"], "Dead Rabbit");
}

#[tokio::test]
async fn test_create_chat_validation() {
    let app = TestApp::new();
    let venue = app.venue("Dead Rabbit", "Bar").await;
    let alice = app.user().await;

    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/chats",
            serde_json::json!({
                "venue_id": venue,
                "created_by": alice,
                "participant_ids": [],
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "validation_error");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("participant_ids"));

    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/chats",
            serde_json::json!({
                "venue_id": Uuid::new_v4(),
                "created_by": alice,
                "participant_ids": [alice],
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_send_message_rules() {
    let app = TestApp::new();
    let venue = app.venue("Dead Rabbit", "Bar").await;
    let alice = app.user().await;
    let bob = app.user().await;
    let outsider = app.user().await;
    let chat_id = create_chat(&app, venue, alice, &[alice, bob]).await;

    let response = app.send(message(&chat_id, alice, "   ")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.send(message(&chat_id, alice, &"x".repeat(2001))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.send(message(&chat_id, outsider, "let me in")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .send(message(&Uuid::new_v4().to_string(), alice, "hello"))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_messages_rejects_page_zero() {
    let app = TestApp::new();
    let venue = app.venue("Dead Rabbit", "Bar").await;
    let alice = app.user().await;
    let chat_id = create_chat(&app, venue, alice, &[alice]).await;

    let response = app
        .send(get_request(&format!(
            "/api/v1/chats/{}/messages?page=0",
            chat_id
        )))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
