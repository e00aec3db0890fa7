//! User-scoped endpoints: profile, recommendations, chats and feed.

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use uuid::Uuid;

use domain::models::{ChatSummary, FeedQuery, RecommendationsResponse, SocialFeed, UserProfile};
use shared::pagination::{PageRequest, DEFAULT_PAGE_SIZE};

use crate::app::AppState;
use crate::error::ApiError;

/// GET /api/v1/users/:user_id
pub async fn get_user_profile(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<UserProfile>, ApiError> {
    let Path(user_id) = path?;
    let profile = state.catalogue.get_user_profile(user_id).await?;
    Ok(Json(profile))
}

/// GET /api/v1/users/:user_id/recommendations
///
/// Every venue scored for the user, best score first.
pub async fn get_recommendations(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<RecommendationsResponse>, ApiError> {
    let Path(user_id) = path?;
    let recommendations = state
        .recommendations
        .get_recommendations(user_id)
        .await?;

    Ok(Json(RecommendationsResponse {
        total: recommendations.len(),
        recommendations,
    }))
}

/// GET /api/v1/users/:user_id/chats
pub async fn list_user_chats(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<ChatSummary>>, ApiError> {
    let Path(user_id) = path?;
    let chats = state.chats.list_user_chats(user_id).await?;
    Ok(Json(chats))
}

/// GET /api/v1/users/:user_id/feed
///
/// `since` (RFC 3339) adds a `new_count` of activities after that instant.
pub async fn get_social_feed(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<FeedQuery>, QueryRejection>,
) -> Result<Json<SocialFeed>, ApiError> {
    let Path(user_id) = path?;
    let Query(query) = query?;
    let page = PageRequest::new(query.page, query.limit, DEFAULT_PAGE_SIZE)?;

    let feed = state
        .feed
        .get_social_feed(user_id, query.since, page)
        .await?;
    Ok(Json(feed))
}
