//! Notification service for coordination events.
//!
//! The core only builds payloads; delivery is left to the implementation.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notification type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    ActionItemCreated,
    GoAheadRequested,
    ChatCreated,
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationType::ActionItemCreated => write!(f, "action_item_created"),
            NotificationType::GoAheadRequested => write!(f, "go_ahead_requested"),
            NotificationType::ChatCreated => write!(f, "chat_created"),
        }
    }
}

/// Sent to every interested user when an action item is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItemCreatedPayload {
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub action_item_id: Uuid,
    pub venue_id: Uuid,
    pub venue_name: String,
    pub action_code: String,
    pub description: String,
    pub recipient_ids: Vec<Uuid>,
    pub timestamp: DateTime<Utc>,
}

/// Sent to invited users when someone starts a go-ahead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoAheadRequestedPayload {
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub action_item_id: Uuid,
    pub venue_id: Uuid,
    pub initiator_id: Uuid,
    pub recipient_ids: Vec<Uuid>,
    pub timestamp: DateTime<Utc>,
}

/// Sent to chat members when a chat is auto-created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCreatedPayload {
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub chat_id: Uuid,
    pub action_item_id: Option<Uuid>,
    pub venue_id: Uuid,
    pub recipient_ids: Vec<Uuid>,
    pub timestamp: DateTime<Utc>,
}

/// Generic notification payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NotificationPayload {
    ActionItemCreated(ActionItemCreatedPayload),
    GoAheadRequested(GoAheadRequestedPayload),
    ChatCreated(ChatCreatedPayload),
}

impl NotificationPayload {
    pub fn notification_type(&self) -> NotificationType {
        match self {
            NotificationPayload::ActionItemCreated(p) => p.notification_type,
            NotificationPayload::GoAheadRequested(p) => p.notification_type,
            NotificationPayload::ChatCreated(p) => p.notification_type,
        }
    }

    pub fn recipient_ids(&self) -> &[Uuid] {
        match self {
            NotificationPayload::ActionItemCreated(p) => &p.recipient_ids,
            NotificationPayload::GoAheadRequested(p) => &p.recipient_ids,
            NotificationPayload::ChatCreated(p) => &p.recipient_ids,
        }
    }
}

/// Result of a notification send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationResult {
    /// Notification was handed to the delivery channel.
    Sent,
    /// Nobody to notify.
    Skipped,
    /// Sending failed (non-blocking for the caller).
    Failed(String),
}

/// Notification service trait for coordination events.
#[async_trait::async_trait]
pub trait NotificationService: Send + Sync {
    async fn send(&self, payload: NotificationPayload) -> NotificationResult;
}

/// Logs the outcome of a send; failures never propagate.
pub async fn dispatch(notifier: &dyn NotificationService, payload: NotificationPayload) {
    let notification_type = payload.notification_type();
    if payload.recipient_ids().is_empty() {
        tracing::debug!(%notification_type, "No recipients, notification skipped");
        return;
    }
    match notifier.send(payload).await {
        NotificationResult::Failed(reason) => {
            tracing::warn!(%notification_type, reason = %reason, "Notification dispatch failed");
        }
        result => {
            tracing::debug!(%notification_type, ?result, "Notification dispatched");
        }
    }
}

/// Mock notification service for development and testing.
///
/// Logs notifications and records them, but doesn't deliver them.
#[derive(Debug, Clone, Default)]
pub struct MockNotificationService {
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
    sent: Arc<Mutex<Vec<NotificationPayload>>>,
}

impl MockNotificationService {
    /// Create a new mock notification service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock service that simulates failures.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// Payloads accepted so far.
    pub fn sent(&self) -> Vec<NotificationPayload> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Payloads of one type accepted so far.
    pub fn sent_of(&self, notification_type: NotificationType) -> Vec<NotificationPayload> {
        self.sent()
            .into_iter()
            .filter(|p| p.notification_type() == notification_type)
            .collect()
    }
}

#[async_trait::async_trait]
impl NotificationService for MockNotificationService {
    async fn send(&self, payload: NotificationPayload) -> NotificationResult {
        let notification_type = payload.notification_type();
        if self.simulate_failure {
            tracing::warn!(
                %notification_type,
                "Mock notification service simulating failure"
            );
            return NotificationResult::Failed("Simulated failure".to_string());
        }

        tracing::info!(
            %notification_type,
            recipients = payload.recipient_ids().len(),
            "Mock: Would send notification"
        );

        if let Ok(mut sent) = self.sent.lock() {
            sent.push(payload);
        }
        NotificationResult::Sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat_created(recipients: Vec<Uuid>) -> NotificationPayload {
        NotificationPayload::ChatCreated(ChatCreatedPayload {
            notification_type: NotificationType::ChatCreated,
            chat_id: Uuid::nil(),
            action_item_id: None,
            venue_id: Uuid::nil(),
            recipient_ids: recipients,
            timestamp: Utc::now(),
        })
    }

    #[test]
    fn test_notification_type_display() {
        assert_eq!(
            NotificationType::ActionItemCreated.to_string(),
            "action_item_created"
        );
        assert_eq!(
            NotificationType::GoAheadRequested.to_string(),
            "go_ahead_requested"
        );
        assert_eq!(NotificationType::ChatCreated.to_string(), "chat_created");
    }

    #[test]
    fn test_payload_serialization() {
        let payload = GoAheadRequestedPayload {
            notification_type: NotificationType::GoAheadRequested,
            action_item_id: Uuid::nil(),
            venue_id: Uuid::nil(),
            initiator_id: Uuid::nil(),
            recipient_ids: vec![Uuid::nil()],
            timestamp: Utc::now(),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "go_ahead_requested");
        assert!(json["initiator_id"].is_string());
    }

    #[tokio::test]
    async fn test_mock_records_sent_payloads() {
        let service = MockNotificationService::new();
        let result = service.send(chat_created(vec![Uuid::new_v4()])).await;

        assert_eq!(result, NotificationResult::Sent);
        assert_eq!(service.sent().len(), 1);
        assert_eq!(service.sent_of(NotificationType::ChatCreated).len(), 1);
        assert!(service.sent_of(NotificationType::GoAheadRequested).is_empty());
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let service = MockNotificationService::failing();
        let result = service.send(chat_created(vec![Uuid::new_v4()])).await;
        assert!(matches!(result, NotificationResult::Failed(_)));
        assert!(service.sent().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_skips_empty_recipients() {
        let service = MockNotificationService::new();
        dispatch(&service, chat_created(vec![])).await;
        assert!(service.sent().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_swallows_failures() {
        let service = MockNotificationService::failing();
        dispatch(&service, chat_created(vec![Uuid::new_v4()])).await;
    }
}
