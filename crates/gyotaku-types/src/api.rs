use serde::{Deserialize, Serialize};

// -- Session claims --

/// JWT claims carried by every authenticated request.
/// `sub` is the username; usernames are immutable once registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub username: String,
    pub token: String,
    /// True when this login created the account.
    pub registered: bool,
}

// -- Gyotaku --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateGyotakuRequest {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateGyotakuResponse {
    pub id: String,
}

/// Body for every non-2xx JSON response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}
