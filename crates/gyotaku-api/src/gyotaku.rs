use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::error;

use gyotaku_types::api::{Claims, CreateGyotakuRequest, CreateGyotakuResponse};

use crate::AppState;
use crate::blocking;
use crate::error::ApiError;
use crate::ingest::IngestError;

const BANNER: &str = "
    ><(((('>      ><(((('>      ><(((('>

          Welcome to Gyotaku service!
";

/// GET /
pub async fn index() -> &'static str {
    BANNER
}

/// GET /gyotaku: the caller's content ids, oldest first.
pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<String>>, ApiError> {
    let db = state.db.clone();
    let username = claims.sub.clone();
    let ids = blocking(move || db.get_gyotaku_list(&username))
        .await
        .map_err(|e| {
            error!("Failed to load gyotaku list for {}: {}", claims.sub, e);
            ApiError::internal()
        })?;

    Ok(Json(ids))
}

/// POST /gyotaku: fetch `url` once and store it under its content id.
pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateGyotakuRequest>,
) -> Result<Json<CreateGyotakuResponse>, ApiError> {
    match state.ingestor.ingest(&claims.sub, &req.url).await {
        Ok(id) => Ok(Json(CreateGyotakuResponse { id })),
        Err(IngestError::Conflict(_)) => Err(ApiError::new(
            StatusCode::CONFLICT,
            "this gyotaku has already been taken",
        )),
        // Logged by the ingestor.
        Err(IngestError::FetchFailed(_)) | Err(IngestError::Store(_)) => Err(ApiError::internal()),
    }
}

/// GET /gyotaku/{gid}: existence check only, rendering is not offered.
pub async fn view(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    Path(gid): Path<String>,
) -> ApiError {
    match state.blobs.get(&gid).await {
        Ok(_) => ApiError::new(StatusCode::NOT_IMPLEMENTED, "viewing gyotaku is not supported"),
        Err(e) if e.is_not_found() => ApiError::new(StatusCode::NOT_FOUND, "no such gyotaku"),
        Err(e) => {
            error!("Failed to read gyotaku {}: {}", gid, e);
            ApiError::internal()
        }
    }
}

/// GET /flag: loopback only.
pub async fn flag(State(state): State<AppState>) -> Result<String, ApiError> {
    tokio::fs::read_to_string(&state.flag_path).await.map_err(|e| {
        error!("Failed to read flag file {}: {}", state.flag_path.display(), e);
        ApiError::internal()
    })
}
