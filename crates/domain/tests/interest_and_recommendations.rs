//! Interest ledger toggles and the recommendation scorer over live data.

mod common;

use common::{Harness, ORIGIN};
use domain::models::{ToggleResult, ACTIVITY_INTERESTED};
use domain::ports::SocialStore;
use domain::DomainError;
use uuid::Uuid;

#[tokio::test]
async fn test_toggle_adds_interest_and_activity() {
    let h = Harness::new();
    let user = h.user().await;
    let venue = h.venue("Blue Bottle", "Coffee Shop").await;

    let result = h.ledger.toggle(user, venue).await.unwrap();
    match result {
        ToggleResult::Added {
            interest,
            action_item,
        } => {
            assert_eq!(interest.user_id, user);
            assert_eq!(interest.venue_id, venue);
            assert!(action_item.is_none());
        }
        other => panic!("expected Added, got {:?}", other),
    }

    let mut tx = h.store.begin().await.unwrap();
    assert!(tx.find_interest(user, venue).await.unwrap().is_some());
    let activities = tx
        .list_activities(&[user], ACTIVITY_INTERESTED, None, 10, 0)
        .await
        .unwrap();
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0].venue_id, venue);
}

#[tokio::test]
async fn test_double_toggle_leaves_no_residue() {
    let h = Harness::new();
    let user = h.user().await;
    let venue = h.venue("Joe Coffee", "Coffee Shop").await;

    assert!(h.ledger.toggle(user, venue).await.unwrap().is_added());
    let second = h.ledger.toggle(user, venue).await.unwrap();
    assert!(matches!(
        second,
        ToggleResult::Removed { user_id, venue_id } if user_id == user && venue_id == venue
    ));

    let mut tx = h.store.begin().await.unwrap();
    assert!(tx.find_interest(user, venue).await.unwrap().is_none());
    assert_eq!(
        tx.count_activities(&[user], ACTIVITY_INTERESTED, None)
            .await
            .unwrap(),
        0
    );
    assert!(tx.interested_user_ids(venue).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_toggle_unknown_user_or_venue() {
    let h = Harness::new();
    let user = h.user().await;
    let venue = h.venue("Real Venue", "Bar").await;

    assert!(matches!(
        h.ledger.toggle(Uuid::new_v4(), venue).await,
        Err(DomainError::NotFound(_))
    ));
    assert!(matches!(
        h.ledger.toggle(user, Uuid::new_v4()).await,
        Err(DomainError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_own_interest_does_not_change_own_score() {
    let h = Harness::new();
    let me = h.user_at(ORIGIN.0, ORIGIN.1, &["bar"]).await;
    let venue = h.venue("Attaboy", "Cocktail Bar").await;
    let others = h.users(2).await;
    h.interest_all(&others, venue).await;

    let score_for = |recs: &[domain::models::Recommendation]| {
        recs.iter().find(|r| r.venue.id == venue).unwrap().score
    };

    let before = h.recommendations.get_recommendations(me).await.unwrap();
    h.ledger.toggle(me, venue).await.unwrap();
    let after = h.recommendations.get_recommendations(me).await.unwrap();

    assert_eq!(score_for(&before), score_for(&after));
    let entry = after.iter().find(|r| r.venue.id == venue).unwrap();
    assert!(entry.already_interested);
    assert_eq!(entry.total_interested, 3);
}

#[tokio::test]
async fn test_recommendations_sorted_by_score_only() {
    let h = Harness::new();
    let me = h.user_at(ORIGIN.0, ORIGIN.1, &["coffee"]).await;

    // near and matching: high score
    let best = h.venue_at("Coffee Project", "Coffee Shop", ORIGIN.0, ORIGIN.1).await;
    // far and unrelated: low score, but the viewer is interested in it
    let worst = h.venue_at("Far Museum", "Museum", 40.90, -73.80).await;
    let middle = h.venue_at("Nearby Museum", "Museum", ORIGIN.0, ORIGIN.1).await;

    h.ledger.toggle(me, worst).await.unwrap();

    let recs = h.recommendations.get_recommendations(me).await.unwrap();
    let order: Vec<Uuid> = recs.iter().map(|r| r.venue.id).collect();
    assert_eq!(order, vec![best, middle, worst]);

    for pair in recs.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    assert!(recs[2].already_interested);
}

#[tokio::test]
async fn test_recommendation_ties_keep_name_order() {
    let h = Harness::new();
    let me = h.user().await;
    let b = h.venue("Bravo Gallery", "Gallery").await;
    let a = h.venue("Alpha Gallery", "Gallery").await;

    // interest in "Bravo" must not lift it above an equal-scored venue
    h.ledger.toggle(me, b).await.unwrap();

    let recs = h.recommendations.get_recommendations(me).await.unwrap();
    let order: Vec<Uuid> = recs.iter().map(|r| r.venue.id).collect();
    assert_eq!(order, vec![a, b]);
}

#[tokio::test]
async fn test_recommendation_friend_and_popularity_signals() {
    let h = Harness::new();
    let me = h.user().await;
    let venue = h.venue_at("Dante", "Cafe", 40.90, -73.80).await;
    let friends = h.users(3).await;
    for friend in &friends {
        h.befriend(me, *friend).await;
    }
    h.interest_all(&friends, venue).await;

    let recs = h.recommendations.get_recommendations(me).await.unwrap();
    let entry = &recs[0];
    assert_eq!(entry.friends_interested, 3);
    assert_eq!(entry.total_interested, 3);
    assert_eq!(entry.breakdown.popularity.points, 3.0);
    assert_eq!(entry.breakdown.friends.points, 2.5);
    assert_eq!(entry.breakdown.category.points, 0.0);
    assert_eq!(entry.reason, "Popular venue");
    assert!(entry.distance_km > 2.0);
}

#[tokio::test]
async fn test_recommendations_unknown_user() {
    let h = Harness::new();
    assert!(matches!(
        h.recommendations.get_recommendations(Uuid::new_v4()).await,
        Err(DomainError::NotFound(_))
    ));
}
