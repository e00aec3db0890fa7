//! Group chat creation, messaging and listing.

mod common;

use std::collections::HashSet;

use common::Harness;
use domain::models::chat::MESSAGE_PREVIEW_CHARS;
use domain::DomainError;
use shared::pagination::{PageRequest, DEFAULT_PAGE_SIZE};
use uuid::Uuid;

#[tokio::test]
async fn test_create_chat_dedups_participants() {
    let h = Harness::new();
    let venue = h.venue("Katz's", "Deli").await;
    let creator = h.user().await;
    let friend = h.user().await;

    let chat = h
        .chats
        .create_chat(venue, creator, &[friend, creator, friend], None)
        .await
        .unwrap();

    assert_eq!(chat.participant_ids, vec![friend, creator]);
    assert_eq!(chat.chat.created_by, creator);
    assert!(chat.chat.action_item_id.is_none());
}

#[tokio::test]
async fn test_creator_not_added_unless_listed() {
    let h = Harness::new();
    let venue = h.venue("Katz's", "Deli").await;
    let creator = h.user().await;
    let friend = h.user().await;

    let chat = h
        .chats
        .create_chat(venue, creator, &[friend], None)
        .await
        .unwrap();
    assert_eq!(chat.participant_ids, vec![friend]);

    assert!(matches!(
        h.chats.send_message(chat.chat.id, creator, "hi").await,
        Err(DomainError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn test_create_chat_not_found_cases() {
    let h = Harness::new();
    let venue = h.venue("Katz's", "Deli").await;
    let user = h.user().await;

    assert!(matches!(
        h.chats.create_chat(Uuid::new_v4(), user, &[user], None).await,
        Err(DomainError::NotFound(_))
    ));
    assert!(matches!(
        h.chats
            .create_chat(venue, Uuid::new_v4(), &[user], None)
            .await,
        Err(DomainError::NotFound(_))
    ));
    assert!(matches!(
        h.chats
            .create_chat(venue, user, &[user], Some(Uuid::new_v4()))
            .await,
        Err(DomainError::NotFound(_))
    ));
    assert!(matches!(
        h.chats
            .create_chat(venue, user, &[user, Uuid::new_v4()], None)
            .await,
        Err(DomainError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_create_chat_conflicts_with_auto_created_chat() {
    let h = Harness::new();
    let (venue, users, item) = h.venue_with_action_item("Bar").await;
    h.coordinator.initiate(item.id, users[0]).await.unwrap();
    h.coordinator.confirm(item.id, users[1]).await.unwrap();

    assert!(matches!(
        h.chats
            .create_chat(venue, users[0], &[users[0]], Some(item.id))
            .await,
        Err(DomainError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_explicit_chat_for_action_item_blocks_auto_chat() {
    let h = Harness::new();
    let (venue, users, item) = h.venue_with_action_item("Bar").await;
    let manual = h
        .chats
        .create_chat(venue, users[0], &[users[0]], Some(item.id))
        .await
        .unwrap();

    h.coordinator.initiate(item.id, users[0]).await.unwrap();
    let outcome = h.coordinator.confirm(item.id, users[1]).await.unwrap();

    // joins the existing chat instead of creating another
    assert!(!outcome.chat_created);
    assert_eq!(outcome.chat.unwrap().id, manual.chat.id);
}

#[tokio::test]
async fn test_send_message_validation_and_membership() {
    let h = Harness::new();
    let venue = h.venue("Katz's", "Deli").await;
    let member = h.user().await;
    let stranger = h.user().await;
    let chat = h
        .chats
        .create_chat(venue, member, &[member], None)
        .await
        .unwrap();

    assert!(matches!(
        h.chats.send_message(chat.chat.id, member, "   ").await,
        Err(DomainError::Validation(_))
    ));
    assert!(matches!(
        h.chats
            .send_message(chat.chat.id, member, &"x".repeat(2001))
            .await,
        Err(DomainError::Validation(_))
    ));
    assert!(matches!(
        h.chats.send_message(Uuid::new_v4(), member, "hello").await,
        Err(DomainError::NotFound(_))
    ));
    assert!(matches!(
        h.chats.send_message(chat.chat.id, stranger, "hello").await,
        Err(DomainError::Unauthorized(_))
    ));

    let message = h
        .chats
        .send_message(chat.chat.id, member, "Meet at 8?")
        .await
        .unwrap();
    assert_eq!(message.content, "Meet at 8?");
    assert_eq!(message.sender_id, member);
}

#[tokio::test]
async fn test_list_messages_newest_first_with_pagination() {
    let h = Harness::new();
    let venue = h.venue("Katz's", "Deli").await;
    let member = h.user().await;
    let chat = h
        .chats
        .create_chat(venue, member, &[member], None)
        .await
        .unwrap();

    for i in 0..5 {
        h.chats
            .send_message(chat.chat.id, member, &format!("message {}", i))
            .await
            .unwrap();
    }

    let first = h
        .chats
        .list_messages(chat.chat.id, PageRequest::new(Some(1), Some(2), DEFAULT_PAGE_SIZE).unwrap())
        .await
        .unwrap();
    assert_eq!(first.total, 5);
    assert!(first.has_more);
    let contents: Vec<&str> = first.messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["message 4", "message 3"]);

    let last = h
        .chats
        .list_messages(chat.chat.id, PageRequest::new(Some(3), Some(2), DEFAULT_PAGE_SIZE).unwrap())
        .await
        .unwrap();
    assert_eq!(last.messages.len(), 1);
    assert_eq!(last.messages[0].content, "message 0");
    assert!(!last.has_more);

    assert!(matches!(
        h.chats
            .list_messages(Uuid::new_v4(), PageRequest::default())
            .await,
        Err(DomainError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_list_user_chats_summaries() {
    let h = Harness::new();
    let venue = h.venue("Katz's", "Deli").await;
    let me = h.user().await;
    let crowd = h.users(7).await;
    let mut everyone = vec![me];
    everyone.extend(crowd.iter().copied());

    let quiet = h
        .chats
        .create_chat(venue, me, &[me, crowd[0]], None)
        .await
        .unwrap();
    let busy = h
        .chats
        .create_chat(venue, me, &everyone, None)
        .await
        .unwrap();
    let unrelated = h
        .chats
        .create_chat(venue, crowd[1], &[crowd[1]], None)
        .await
        .unwrap();

    let long = "a".repeat(MESSAGE_PREVIEW_CHARS + 20);
    h.chats
        .send_message(quiet.chat.id, crowd[0], &long)
        .await
        .unwrap();

    let chats = h.chats.list_user_chats(me).await.unwrap();
    let ids: Vec<Uuid> = chats.iter().map(|c| c.chat_id).collect();
    assert_eq!(ids, vec![quiet.chat.id, busy.chat.id]);
    assert!(!ids.contains(&unrelated.chat.id));

    let quiet_summary = &chats[0];
    let preview = quiet_summary.last_message.as_ref().unwrap();
    assert_eq!(preview.content.chars().count(), MESSAGE_PREVIEW_CHARS + 3);
    assert!(preview.content.ends_with("..."));
    assert_eq!(quiet_summary.venue.as_ref().unwrap().id, venue);

    let busy_summary = &chats[1];
    assert_eq!(busy_summary.participant_count, 8);
    assert_eq!(busy_summary.participants.len(), 5);
    assert!(busy_summary.last_message.is_none());
    let shown: HashSet<Uuid> = busy_summary.participants.iter().map(|p| p.id).collect();
    assert!(shown.is_subset(&everyone.iter().copied().collect()));
}

#[tokio::test]
async fn test_list_user_chats_unknown_user() {
    let h = Harness::new();
    assert!(matches!(
        h.chats.list_user_chats(Uuid::new_v4()).await,
        Err(DomainError::NotFound(_))
    ));
}
