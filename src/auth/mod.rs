/*!
 * # Authentication Module
 *
 * JWT-based authentication for the storefront API. Credentials are stored
 * as argon2 hashes; protected endpoints resolve the caller through the
 * [`AuthUser`] extractor, and services receive nothing but the resolved
 * user id.
 */

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::entities::{user, User, UserModel};
use crate::errors::ServiceError;
use crate::AppState;

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,          // Subject (user ID)
    pub name: String,         // User's name
    pub email: String,        // User's email
    pub jti: String,          // JWT ID (unique identifier for this token)
    pub iat: i64,             // Issued at time
    pub exp: i64,             // Expiration time
    pub iss: String,          // Issuer
    pub aud: String,          // Audience
}

/// Authenticated user data extracted from the JWT token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
}

impl TryFrom<&Claims> for AuthUser {
    type Error = AuthError;

    fn try_from(claims: &Claims) -> Result<Self, Self::Error> {
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
        Ok(Self {
            user_id,
            name: claims.name.clone(),
            email: claims.email.clone(),
        })
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        jwt_issuer: String,
        jwt_audience: String,
        token_expiration: Duration,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            token_expiration,
        }
    }
}

impl From<&crate::config::AppConfig> for AuthConfig {
    fn from(cfg: &crate::config::AppConfig) -> Self {
        Self {
            jwt_secret: cfg.jwt_secret.clone(),
            jwt_issuer: cfg.auth_issuer.clone(),
            jwt_audience: cfg.auth_audience.clone(),
            token_expiration: Duration::from_secs(cfg.jwt_expiration as u64),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email is already registered")]
    EmailTaken,

    #[error("User not found")]
    UserNotFound,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::error::DbErr),
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                ServiceError::Unauthorized("Invalid email or password".to_string())
            }
            AuthError::EmailTaken => {
                ServiceError::Conflict("Email is already registered".to_string())
            }
            AuthError::UserNotFound => ServiceError::NotFound("User not found".to_string()),
            AuthError::TokenExpired => ServiceError::Unauthorized("Token has expired".to_string()),
            AuthError::InvalidToken => ServiceError::Unauthorized("Invalid token".to_string()),
            AuthError::TokenCreation(msg) => ServiceError::InternalError(msg),
            AuthError::Hash(msg) => ServiceError::HashError(msg),
            AuthError::Database(err) => ServiceError::DatabaseError(err),
        }
    }
}

/// Authentication service that handles registration, credential
/// verification, and token issuance/validation.
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
    db: Arc<DatabaseConnection>,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        Self { config, db }
    }

    /// Register a new user, storing an argon2 hash of the password.
    pub async fn register(
        &self,
        name: String,
        email: String,
        password: String,
    ) -> Result<UserModel, AuthError> {
        let existing = User::find()
            .filter(user::Column::Email.eq(email.clone()))
            .one(&*self.db)
            .await?;

        if existing.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(&password)?;

        let user = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            email: Set(email),
            password_hash: Set(password_hash),
            created_at: Set(Utc::now()),
        };

        Ok(user.insert(&*self.db).await?)
    }

    /// Verify a credential pair, returning the user on success.
    ///
    /// Unknown email and bad password produce the same error so callers
    /// cannot probe for registered addresses.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserModel, AuthError> {
        let user = User::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Generate a JWT token for a user
    pub fn generate_token(&self, user: &UserModel) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now
            + ChronoDuration::from_std(self.config.token_expiration)
                .map_err(|_| AuthError::TokenCreation("Invalid token duration".to_string()))?;

        let claims = Claims {
            sub: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Validate a JWT token and return its claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?
        .claims;

        Ok(claims)
    }

    /// Fetch a user by id
    pub async fn get_user(&self, user_id: Uuid) -> Result<UserModel, AuthError> {
        User::find_by_id(user_id)
            .one(&*self.db)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

/// Hash a password with argon2 and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Verify a password against a stored argon2 hash.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ServiceError::Unauthorized("Missing authorization header".into()))?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or_else(|| ServiceError::Unauthorized("Invalid authorization header".into()))?;

        let claims = state
            .services
            .auth
            .validate_token(token)
            .map_err(ServiceError::from)?;

        debug!(user_id = %claims.sub, "Authenticated request");

        AuthUser::try_from(&claims).map_err(ServiceError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig::new(
            "test_secret_key_for_auth_unit_tests_0123456789_0123456789_0123456789".to_string(),
            "storefront-api".to_string(),
            "storefront-clients".to_string(),
            Duration::from_secs(3600),
        )
    }

    fn test_user() -> UserModel {
        UserModel {
            id: Uuid::new_v4(),
            name: "Demo User".to_string(),
            email: "demo@example.com".to_string(),
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn hash_then_verify_roundtrip() {
        let hash = hash_password("hunter2!").expect("hash should succeed");
        assert!(verify_password("hunter2!", &hash).unwrap());
        assert!(!verify_password("hunter3!", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("same-password").unwrap();
        let second = hash_password("same-password").unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn token_roundtrip_carries_identity() {
        let db = Arc::new(sea_orm::DatabaseConnection::default());
        let service = AuthService::new(test_config(), db);
        let user = test_user();

        let token = service.generate_token(&user).expect("token issuance");
        let claims = service.validate_token(&token).expect("token validation");

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, user.email);

        let auth_user = AuthUser::try_from(&claims).unwrap();
        assert_eq!(auth_user.user_id, user.id);
    }

    #[tokio::test]
    async fn tampered_token_is_rejected() {
        let db = Arc::new(sea_orm::DatabaseConnection::default());
        let service = AuthService::new(test_config(), db.clone());
        let token = service.generate_token(&test_user()).unwrap();

        let other = AuthService::new(
            AuthConfig::new(
                "a_completely_different_secret_key_0123456789_0123456789_0123456789".to_string(),
                "storefront-api".to_string(),
                "storefront-clients".to_string(),
                Duration::from_secs(3600),
            ),
            db,
        );

        assert!(matches!(
            other.validate_token(&token),
            Err(AuthError::InvalidToken)
        ));
    }
}
