use crate::handlers::common::{created_response, map_service_error, success_response};
use crate::{auth::AuthUser, errors::ApiError, AppState};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde_json::json;
use uuid::Uuid;

/// Creates the router for order capture and history
pub fn orders_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/checkout", post(checkout))
        .route("/count", get(count_orders))
        .route("/{id}", get(get_order))
}

/// Capture the caller's cart into a completed order.
///
/// Totals and unit prices come from the persisted cart and product rows;
/// the request body carries nothing.
async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .services
        .orders
        .checkout(user.user_id)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(order))
}

/// Order history, newest first
async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state
        .services
        .orders
        .get_all(user.user_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(orders))
}

/// One order, scoped to the caller
async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .services
        .orders
        .get_by_id(user.user_id, id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(order))
}

/// Number of orders placed by the caller
async fn count_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let count = state
        .services
        .orders
        .count(user.user_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({ "count": count })))
}
