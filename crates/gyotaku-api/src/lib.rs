pub mod auth;
pub mod error;
pub mod fetch;
pub mod gyotaku;
pub mod ingest;
pub mod middleware;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use gyotaku_db::{BlobStore, Database, StoreError};

use crate::ingest::Ingestor;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub blobs: Arc<BlobStore>,
    pub ingestor: Ingestor,
    pub jwt_secret: String,
    pub flag_path: PathBuf,
}

/// All routes. Callers add the tracing layer and must serve with
/// `ConnectInfo<SocketAddr>` for the loopback-only routes to admit anyone.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/login", post(auth::login))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/", get(gyotaku::index))
        .route("/gyotaku", get(gyotaku::list).post(gyotaku::create))
        .route("/gyotaku/{gid}", get(gyotaku::view))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_auth))
        .with_state(state.clone());

    let internal_routes = Router::new()
        .route("/flag", get(gyotaku::flag))
        .route_layer(from_fn(middleware::require_loopback))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(internal_routes)
}

/// Run a blocking store call off the async workers.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T, StoreError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e)))?
}
