use crate::handlers::common::{created_response, map_service_error, success_response, validate_input};
use crate::{
    auth::AuthUser,
    entities::UserModel,
    errors::ApiError,
    events::Event,
    AppState,
};
use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

/// Creates the router for authentication endpoints
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/me", get(me))
}

/// Register a new account and issue a token
async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let user = state
        .services
        .auth
        .register(payload.name, payload.email, payload.password)
        .await
        .map_err(|e| map_service_error(e.into()))?;

    let token = state
        .services
        .auth
        .generate_token(&user)
        .map_err(|e| map_service_error(e.into()))?;

    state
        .event_sender
        .send_or_log(Event::UserRegistered(user.id))
        .await;

    info!("Registered user {}", user.id);
    Ok(created_response(AuthResponse { token, user }))
}

/// Verify credentials and issue a token
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let user = state
        .services
        .auth
        .verify_credentials(&payload.email, &payload.password)
        .await
        .map_err(|e| map_service_error(e.into()))?;

    let token = state
        .services
        .auth
        .generate_token(&user)
        .map_err(|e| map_service_error(e.into()))?;

    Ok(success_response(AuthResponse { token, user }))
}

/// Resolve the bearer token to its account
async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .services
        .auth
        .get_user(user.user_id)
        .await
        .map_err(|e| map_service_error(e.into()))?;

    Ok(success_response(user))
}

// Request and response DTOs

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    /// Minimum 8 characters
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserModel,
}
