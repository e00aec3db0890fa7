use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use domain::ports::SocialStore;
use domain::services::{
    ActionItemCoordinator, CatalogueService, ChatService, FeedService, InterestLedger,
    MockBookingAgent, MockNotificationService, RecommendationService,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, security_headers_middleware, trace_id,
};
use crate::routes::{action_items, admin, chats, health, interests, users, venues};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn SocialStore>,
    pub coordinator: Arc<ActionItemCoordinator>,
    pub ledger: Arc<InterestLedger>,
    pub chats: Arc<ChatService>,
    pub feed: Arc<FeedService>,
    pub recommendations: Arc<RecommendationService>,
    pub catalogue: Arc<CatalogueService>,
}

impl AppState {
    /// Wires the services around an already-built coordinator.
    pub fn new(
        config: Config,
        store: Arc<dyn SocialStore>,
        coordinator: Arc<ActionItemCoordinator>,
    ) -> Self {
        let highlight_threshold = config.coordination.highlight_threshold;
        Self {
            ledger: Arc::new(InterestLedger::new(store.clone(), coordinator.clone())),
            chats: Arc::new(ChatService::new(store.clone())),
            feed: Arc::new(FeedService::new(store.clone(), highlight_threshold)),
            recommendations: Arc::new(RecommendationService::new(store.clone())),
            catalogue: Arc::new(CatalogueService::new(store.clone())),
            coordinator,
            store,
            config: Arc::new(config),
        }
    }

    /// State with logging notifications and simulated bookings.
    pub fn with_mock_integrations(config: Config, store: Arc<dyn SocialStore>) -> Self {
        let coordinator = Arc::new(ActionItemCoordinator::with_entropy(
            store.clone(),
            Arc::new(MockNotificationService::new()),
            Arc::new(MockBookingAgent::from_entropy()),
            config.coordination.settings(),
        ));
        Self::new(config, store, coordinator)
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    let api_routes = Router::new()
        .route("/api/v1/interests/toggle", post(interests::toggle_interest))
        .route("/api/v1/venues", get(venues::list_venues))
        .route("/api/v1/venues/:venue_id", get(venues::get_venue))
        .route("/api/v1/users/:user_id", get(users::get_user_profile))
        .route(
            "/api/v1/users/:user_id/recommendations",
            get(users::get_recommendations),
        )
        .route("/api/v1/users/:user_id/chats", get(users::list_user_chats))
        .route("/api/v1/users/:user_id/feed", get(users::get_social_feed))
        .route(
            "/api/v1/action-items/:action_item_id",
            get(action_items::get_action_item),
        )
        .route(
            "/api/v1/action-items/:action_item_id/initiate",
            post(action_items::initiate),
        )
        .route(
            "/api/v1/action-items/:action_item_id/confirm",
            post(action_items::confirm),
        )
        .route(
            "/api/v1/action-items/:action_item_id/decline",
            post(action_items::decline),
        )
        .route(
            "/api/v1/action-items/:action_item_id/dismiss",
            post(action_items::dismiss),
        )
        .route(
            "/api/v1/action-items/:action_item_id/complete",
            post(action_items::complete),
        )
        .route("/api/v1/chats", post(chats::create_chat))
        .route(
            "/api/v1/chats/:chat_id/messages",
            post(chats::send_message).get(chats::list_messages),
        );

    let admin_routes = Router::new().route(
        "/api/v1/admin/action-items/expire",
        post(admin::expire_action_items),
    );

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .merge(admin_routes)
        // Global middleware (bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config))
        .with_state(state)
}
