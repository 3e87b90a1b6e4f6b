use crate::handlers::common::{
    map_service_error, no_content_response, success_response, validate_input,
};
use crate::{auth::AuthUser, errors::ApiError, services::AddToCartInput, AppState};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for the current user's cart
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart))
        .route("/count", get(count_items))
        .route("/items", post(add_to_cart))
        .route("/items/{item_id}", put(update_cart_item))
        .route("/items/{item_id}", delete(remove_cart_item))
        .route("/clear", post(clear_cart))
}

/// Get the cart with items and derived totals
async fn get_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let cart = state
        .services
        .cart
        .get_cart(user.user_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(cart))
}

/// Add a product to the cart (merges into an existing line)
async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = AddToCartInput {
        product_id: payload.product_id,
        quantity: payload.quantity,
    };

    let item = state
        .services
        .cart
        .add_item(user.user_id, input)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(item))
}

/// Overwrite a line's quantity
async fn update_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let item = state
        .services
        .cart
        .update_item_quantity(user.user_id, item_id, payload.quantity)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(item))
}

/// Remove a line from the cart
async fn remove_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(item_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .cart
        .remove_item(user.user_id, item_id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

/// Delete all lines from the cart
async fn clear_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .cart
        .clear_cart(user.user_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({ "success": true })))
}

/// Sum of quantities across the cart
async fn count_items(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let count = state
        .services
        .cart
        .count(user.user_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({ "count": count })))
}

// Request DTOs

#[derive(Debug, Deserialize, Validate)]
pub struct AddItemRequest {
    pub product_id: Uuid,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1))]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuantityRequest {
    #[validate(range(min = 1))]
    pub quantity: i32,
}
