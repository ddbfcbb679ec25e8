mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::info;

use gyotaku_api::fetch::HttpFetcher;
use gyotaku_api::ingest::Ingestor;
use gyotaku_api::{AppState, AppStateInner};
use gyotaku_db::{BlobStore, Database};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "gyotaku_server=debug,gyotaku_api=debug,gyotaku_db=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    // Init storage
    let db = Arc::new(Database::open(&config.db_path)?);
    let blobs = Arc::new(BlobStore::new(config.blob_dir.clone()).await?);
    let fetcher = Arc::new(HttpFetcher::new(config.max_payload_bytes)?);

    let state: AppState = Arc::new(AppStateInner {
        db: db.clone(),
        blobs: blobs.clone(),
        ingestor: Ingestor::new(db, blobs, fetcher, config.fetch_timeout),
        jwt_secret: config.jwt_secret,
        flag_path: config.flag_path,
    });

    let app = gyotaku_api::router(state).layer(TraceLayer::new_for_http());

    info!("Gyotaku server listening on {}", config.addr);
    info!(
        "Fetch timeout {:?}, payload cap {} bytes",
        config.fetch_timeout, config.max_payload_bytes
    );

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(_) => {
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
