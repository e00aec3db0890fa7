//! Venue catalogue endpoints.

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use uuid::Uuid;
use validator::Validate;

use domain::models::{ListVenuesQuery, ListVenuesResponse, VenueDetail, VenueDetailQuery, VenueFilters};

use crate::app::AppState;
use crate::error::ApiError;

/// GET /api/v1/venues
///
/// Filters: `categories` (comma-separated), `max_distance` (km),
/// `min_friend_interest`, `only_interested`, `exclude_interested`, `sort_by`.
/// Distance, friend and interest filters need `user_id`.
pub async fn list_venues(
    State(state): State<AppState>,
    query: Result<Query<ListVenuesQuery>, QueryRejection>,
) -> Result<Json<ListVenuesResponse>, ApiError> {
    let Query(query) = query?;
    query.validate()?;

    let filters = VenueFilters::from(&query);
    let venues = state.catalogue.get_venues(query.user_id, &filters).await?;

    Ok(Json(ListVenuesResponse {
        total: venues.len(),
        venues,
    }))
}

/// GET /api/v1/venues/:venue_id
pub async fn get_venue(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<VenueDetailQuery>, QueryRejection>,
) -> Result<Json<VenueDetail>, ApiError> {
    let Path(venue_id) = path?;
    let Query(query) = query?;
    let detail = state
        .catalogue
        .get_venue_detail(venue_id, query.user_id)
        .await?;
    Ok(Json(detail))
}
