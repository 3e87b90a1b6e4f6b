use crate::handlers::common::{map_service_error, no_content_response, success_response};
use crate::{auth::AuthUser, errors::ApiError, AppState};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

/// Creates the router for the current user's wishlist
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_wishlist))
        .route("/count", get(count_items))
        .route("/items", post(add_to_wishlist))
        .route("/items/{product_id}", delete(remove_from_wishlist))
        .route("/toggle", post(toggle_wishlist))
        .route("/contains/{product_id}", get(contains))
}

/// All saved products, newest first
async fn get_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .services
        .wishlist
        .get(user.user_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(items))
}

/// Save a product (idempotent)
async fn add_to_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<WishlistProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .services
        .wishlist
        .add(user.user_id, payload.product_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(item))
}

/// Remove a saved product
async fn remove_from_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .wishlist
        .remove(user.user_id, product_id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

/// Flip wishlist membership; reports the resulting state
async fn toggle_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<WishlistProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .services
        .wishlist
        .toggle(user.user_id, payload.product_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(result))
}

/// Membership check
async fn contains(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let in_wishlist = state
        .services
        .wishlist
        .contains(user.user_id, product_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({ "in_wishlist": in_wishlist })))
}

/// Saved-product count
async fn count_items(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let count = state
        .services
        .wishlist
        .count(user.user_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({ "count": count })))
}

// Request DTOs

#[derive(Debug, Deserialize)]
pub struct WishlistProductRequest {
    pub product_id: Uuid,
}
