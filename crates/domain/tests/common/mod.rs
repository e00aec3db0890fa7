//! Common fixtures for domain service tests.
//!
//! Every harness runs against its own in-memory store with a seeded random
//! source, so action codes and reservation codes are reproducible.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use domain::memory_store::MemoryStore;
use domain::models::{ActionItem, User, Venue};
use domain::ports::SocialStore;
use domain::services::{
    ActionItemCoordinator, CatalogueService, ChatService, CoordinationSettings, FeedService,
    InterestLedger, MockBookingAgent, MockNotificationService, NotificationService,
    RecommendationService,
};
use fake::faker::name::en::Name;
use fake::Fake;
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

/// Times Square, used as the default location.
pub const ORIGIN: (f64, f64) = (40.7580, -73.9855);

pub struct Harness {
    pub store: MemoryStore,
    pub notifier: MockNotificationService,
    pub coordinator: Arc<ActionItemCoordinator>,
    pub ledger: Arc<InterestLedger>,
    pub chats: ChatService,
    pub feed: FeedService,
    pub recommendations: RecommendationService,
    pub catalogue: CatalogueService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_notifier(MockNotificationService::new())
    }

    pub fn with_notifier(notifier: MockNotificationService) -> Self {
        Self::build(notifier, CoordinationSettings::default())
    }

    pub fn with_settings(settings: CoordinationSettings) -> Self {
        Self::build(MockNotificationService::new(), settings)
    }

    fn build(notifier: MockNotificationService, settings: CoordinationSettings) -> Self {
        let store = MemoryStore::new();
        let shared: Arc<dyn SocialStore> = Arc::new(store.clone());

        let coordinator = Arc::new(ActionItemCoordinator::new(
            shared.clone(),
            Arc::new(notifier.clone()) as Arc<dyn NotificationService>,
            Arc::new(MockBookingAgent::new(StdRng::seed_from_u64(11))),
            StdRng::seed_from_u64(42),
            settings,
        ));

        Self {
            ledger: Arc::new(InterestLedger::new(shared.clone(), coordinator.clone())),
            chats: ChatService::new(shared.clone()),
            feed: FeedService::new(shared.clone(), settings.highlight_threshold),
            recommendations: RecommendationService::new(shared.clone()),
            catalogue: CatalogueService::new(shared),
            coordinator,
            notifier,
            store,
        }
    }

    pub async fn user_at(&self, lat: f64, lon: f64, interests: &[&str]) -> Uuid {
        let name: String = Name().fake();
        let user = User {
            id: Uuid::new_v4(),
            name,
            avatar: None,
            bio: None,
            latitude: lat,
            longitude: lon,
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

    pub async fn users(&self, n: usize) -> Vec<Uuid> {
        let mut ids = Vec::with_capacity(n);
        for _ in 0..n {
            ids.push(self.user().await);
        }
        ids
    }

    pub async fn venue_at(&self, name: &str, category: &str, lat: f64, lon: f64) -> Uuid {
        let venue = Venue {
            id: Uuid::new_v4(),
            name: name.to_string(),
            category: category.to_string(),
            description: format!("{} in Manhattan", category),
            image: None,
            images: vec![],
            address: "New York, NY".to_string(),
            latitude: lat,
            longitude: lon,
            created_at: Utc::now(),
        };
        let id = venue.id;
        self.store.seed_venue(venue).await.unwrap();
        id
    }

    pub async fn venue(&self, name: &str, category: &str) -> Uuid {
        self.venue_at(name, category, ORIGIN.0, ORIGIN.1).await
    }

    pub async fn befriend(&self, a: Uuid, b: Uuid) {
        self.store.seed_friendship(a, b).await.unwrap();
    }

    /// Toggles interest on for every user, returning the item created, if any.
    pub async fn interest_all(&self, users: &[Uuid], venue_id: Uuid) -> Option<ActionItem> {
        let mut created = None;
        for user_id in users {
            if let domain::models::ToggleResult::Added {
                action_item: Some(item),
                ..
            } = self.ledger.toggle(*user_id, venue_id).await.unwrap()
            {
                created = Some(item);
            }
        }
        created
    }

    /// Venue with an active action item backed by five interested users.
    pub async fn venue_with_action_item(&self, category: &str) -> (Uuid, Vec<Uuid>, ActionItem) {
        let venue_id = self.venue("Threshold Spot", category).await;
        let users = self.users(5).await;
        let item = self
            .interest_all(&users, venue_id)
            .await
            .expect("fifth interest should create an action item");
        (venue_id, users, item)
    }
}
