use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{error, info};

use gyotaku_db::{Database, StoreError};
use gyotaku_types::api::{Claims, LoginRequest, LoginResponse};

use crate::AppState;
use crate::blocking;
use crate::error::ApiError;

/// Minimum length, in characters, of both username and password.
pub const MIN_CREDENTIAL_LEN: usize = 8;

/// Session lifetime.
const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The username was unknown and has just been registered.
    Registered,
    LoggedIn,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("both username and password must have 8 characters at least")]
    InvalidInput,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Log in, registering the user on first sight.
///
/// Registration is a conditional insert, so if two first logins race the
/// loser falls back to verifying against the winner's password.
pub async fn authenticate(
    db: &Arc<Database>,
    username: &str,
    password: &str,
) -> Result<LoginOutcome, AuthError> {
    if username.chars().count() < MIN_CREDENTIAL_LEN || password.chars().count() < MIN_CREDENTIAL_LEN {
        return Err(AuthError::InvalidInput);
    }

    let exists = {
        let db = db.clone();
        let user = username.to_string();
        blocking(move || db.user_exists(&user)).await?
    };

    if !exists {
        let db = db.clone();
        let (user, pass) = (username.to_string(), password.to_string());
        match blocking(move || db.create_user(&user, &pass)).await {
            Ok(()) => return Ok(LoginOutcome::Registered),
            Err(StoreError::Conflict(_)) => {
                info!("User {} registered concurrently, verifying instead", username);
            }
            Err(e) => return Err(e.into()),
        }
    }

    let db = db.clone();
    let (user, pass) = (username.to_string(), password.to_string());
    if blocking(move || db.verify_user(&user, &pass)).await? {
        Ok(LoginOutcome::LoggedIn)
    } else {
        Err(AuthError::InvalidCredentials)
    }
}

/// POST /login: log in or auto-register, returning a bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let outcome = authenticate(&state.db, &req.username, &req.password)
        .await
        .map_err(|e| match e {
            AuthError::InvalidInput => ApiError::new(
                StatusCode::BAD_REQUEST,
                "both username and password must have 8 characters at least",
            ),
            AuthError::InvalidCredentials => {
                ApiError::new(StatusCode::BAD_REQUEST, "invalid username or password")
            }
            AuthError::Store(e) => {
                error!("Login for {} failed: {}", req.username, e);
                ApiError::internal()
            }
        })?;

    let token = create_token(&state.jwt_secret, &req.username).map_err(|e| {
        error!("Failed to sign token: {}", e);
        ApiError::internal()
    })?;

    Ok(Json(LoginResponse {
        username: req.username,
        token,
        registered: outcome == LoginOutcome::Registered,
    }))
}

pub fn create_token(secret: &str, username: &str) -> jsonwebtoken::errors::Result<String> {
    let claims = Claims {
        sub: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}
