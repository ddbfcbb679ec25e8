use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gyotaku_types::api::ErrorResponse;

/// An HTTP error with a client-safe message. Internal details are logged
/// where the error is produced, never sent.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: &'static str,
}

impl ApiError {
    pub const fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }

    pub const fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse::new(self.message))).into_response()
    }
}
