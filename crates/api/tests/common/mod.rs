//! Common test utilities for router tests.
//!
//! The router is built on the in-memory store with seeded randomness, so no
//! database is needed.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request},
    response::Response,
    Router,
};
use chrono::Utc;
use fake::faker::name::en::Name;
use fake::Fake;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tower::ServiceExt;
use uuid::Uuid;

use domain::memory_store::MemoryStore;
use domain::models::{User, Venue};
use domain::ports::SocialStore;
use domain::services::{ActionItemCoordinator, MockBookingAgent, MockNotificationService};
use rally_api::app::{create_app, AppState};
use rally_api::config::{
    Config, CoordinationConfig, DatabaseConfig, LoggingConfig, SecurityConfig, ServerConfig,
};

/// Times Square.
pub const ORIGIN: (f64, f64) = (40.7580, -73.9855);

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        },
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout_secs: 1,
            idle_timeout_secs: 1,
        },
        logging: LoggingConfig {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig::default(),
        coordination: CoordinationConfig::default(),
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let store = MemoryStore::new();
        let shared: Arc<dyn SocialStore> = Arc::new(store.clone());
        let coordinator = Arc::new(ActionItemCoordinator::new(
            shared.clone(),
            Arc::new(MockNotificationService::new()),
            Arc::new(MockBookingAgent::new(StdRng::seed_from_u64(7))),
            StdRng::seed_from_u64(42),
            config.coordination.settings(),
        ));
        let state = AppState::new(config, shared, coordinator);
        Self {
            router: create_app(state),
            store,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Seeds a user at `(lat, lng)` with the given interest tags.
    pub async fn user_at(&self, lat: f64, lng: f64, interests: &[&str]) -> Uuid {
        let user = User {
            id: Uuid::new_v4(),
            name: Name().fake(),
            avatar: None,
            bio: None,
            latitude: lat,
            longitude: lng,
            interests: interests.iter().map(|s| s.to_string()).collect(),
            created_at: Utc::now(),
        };
        let id = user.id;
        self.store.seed_user(user).await.unwrap();
        id
    }

    pub async fn user(&self) -> Uuid {
        self.user_at(ORIGIN.0, ORIGIN.1, &[]).await
    }

    pub async fn venue(&self, name: &str, category: &str) -> Uuid {
        self.venue_at(name, category, ORIGIN.0, ORIGIN.1).await
    }

    pub async fn venue_at(&self, name: &str, category: &str, lat: f64, lng: f64) -> Uuid {
        let venue = Venue {
            id: Uuid::new_v4(),
            name: name.to_string(),
            category: category.to_string(),
            description: format!("{} in Midtown", category),
            image: None,
            images: Vec::new(),
            address: "1 Broadway".to_string(),
            latitude: lat,
            longitude: lng,
            created_at: Utc::now(),
        };
        let id = venue.id;
        self.store.seed_venue(venue).await.unwrap();
        id
    }

    pub async fn befriend(&self, a: Uuid, b: Uuid) {
        self.store.seed_friendship(a, b).await.unwrap();
    }

    pub async fn toggle(&self, user_id: Uuid, venue_id: Uuid) -> serde_json::Value {
        let response = self
            .send(json_request(
                Method::POST,
                "/api/v1/interests/toggle",
                serde_json::json!({ "user_id": user_id, "venue_id": venue_id }),
            ))
            .await;
        parse_response_body(response).await
    }

    /// Toggles `count` fresh users into `venue_id` and returns them with the
    /// action item id created by the last toggle.
    pub async fn crowd(&self, venue_id: Uuid, count: usize) -> (Vec<Uuid>, Option<Uuid>) {
        let mut users = Vec::with_capacity(count);
        let mut action_item_id = None;
        for _ in 0..count {
            let user = self.user().await;
            let body = self.toggle(user, venue_id).await;
            if let Some(id) = body["action_item"]["id"].as_str() {
                action_item_id = Some(id.parse().unwrap());
            }
            users.push(user);
        }
        (users, action_item_id)
    }
}

pub fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
}
