use crate::handlers::common::{map_service_error, success_response, validate_input};
use crate::{auth::AuthUser, errors::ApiError, AppState};
use axum::{
    extract::{Json, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

const DEFAULT_LIMIT: u64 = 5;

/// Creates the router for the recently-viewed tracker
pub fn recently_viewed_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_recent))
        .route("/track", post(track_view))
}

/// Record a product view
async fn track_view(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<TrackRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .recently_viewed
        .track(user.user_id, payload.product_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({ "success": true })))
}

/// Most-recently-viewed products
async fn get_recent(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<GetRecentQuery>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&params)?;

    let items = state
        .services
        .recently_viewed
        .get_recent(
            user.user_id,
            params.limit.unwrap_or(DEFAULT_LIMIT),
            params.exclude_product_id,
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_response(items))
}

// Request DTOs

#[derive(Debug, Deserialize)]
pub struct TrackRequest {
    pub product_id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GetRecentQuery {
    #[validate(range(min = 1, max = 20))]
    pub limit: Option<u64>,
    pub exclude_product_id: Option<Uuid>,
}
