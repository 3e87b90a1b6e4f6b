use crate::handlers::common::{map_service_error, success_response, validate_input};
use crate::{auth::AuthUser, errors::ApiError, AppState};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for rating endpoints.
///
/// The product aggregate is public; submitting and reading one's own
/// rating require identity.
pub fn ratings_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(rate_product))
        .route("/me/{product_id}", get(get_user_rating))
        .route("/products/{product_id}", get(get_product_rating))
}

/// Submit or update the caller's rating; returns the fresh aggregate
async fn rate_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<RateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let result = state
        .services
        .ratings
        .rate(user.user_id, payload.product_id, payload.value)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(result))
}

/// The caller's stored rating for a product, if any
async fn get_user_rating(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let value = state
        .services
        .ratings
        .get_user_rating(user.user_id, product_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({ "value": value })))
}

/// The product aggregate recomputed from rating rows (public)
async fn get_product_rating(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state
        .services
        .ratings
        .get_product_rating(product_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(summary))
}

// Request DTOs

#[derive(Debug, Deserialize, Validate)]
pub struct RateRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1, max = 5))]
    pub value: i32,
}
