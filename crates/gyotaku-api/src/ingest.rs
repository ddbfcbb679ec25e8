use std::sync::Arc;
use std::time::Duration;

use gyotaku_crypto::content_id;
use gyotaku_db::{BlobStore, Database, StoreError};
use gyotaku_types::models::GyotakuRecord;
use tracing::{error, info, warn};

use crate::blocking;
use crate::fetch::{FetchError, Fetcher};

/// Default budget for one remote fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("gyotaku {0} has already been taken")]
    Conflict(String),

    #[error("fetch failed: {0}")]
    FetchFailed(#[source] FetchError),

    #[error("store error: {0}")]
    Store(#[source] StoreError),
}

impl From<StoreError> for IngestError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(id) => Self::Conflict(id),
            other => Self::Store(other),
        }
    }
}

/// Sequences one ingestion: id → duplicate check → fetch → blob → list.
///
/// The duplicate check is advisory (it saves a fetch); the blob store's
/// no-clobber write is what enforces first-writer-wins. A list append that
/// fails after the blob was written leaves an orphaned blob; it is logged
/// and reported as `Store`, never compensated.
pub struct Ingestor {
    db: Arc<Database>,
    blobs: Arc<BlobStore>,
    fetcher: Arc<dyn Fetcher>,
    fetch_timeout: Duration,
}

impl Ingestor {
    pub fn new(
        db: Arc<Database>,
        blobs: Arc<BlobStore>,
        fetcher: Arc<dyn Fetcher>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            db,
            blobs,
            fetcher,
            fetch_timeout,
        }
    }

    /// Ingest `url` on behalf of `username`. Returns the content id.
    pub async fn ingest(&self, username: &str, url: &str) -> Result<String, IngestError> {
        let id = content_id(url);

        if self.blobs.exists(&id).await? {
            info!("Rejected duplicate gyotaku {} from {}", id, username);
            return Err(IngestError::Conflict(id));
        }

        let payload = match tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(url)).await {
            Ok(Ok(payload)) => payload,
            Ok(Err(e)) => {
                warn!("Fetch of {} failed: {}", url, e);
                return Err(IngestError::FetchFailed(e));
            }
            Err(_) => {
                warn!("Fetch of {} timed out after {:?}", url, self.fetch_timeout);
                return Err(IngestError::FetchFailed(FetchError::Timeout(self.fetch_timeout)));
            }
        };

        // From here on the blob write and the list append run as one detached
        // task, so dropping the caller cannot separate them.
        let record = GyotakuRecord::new(url, payload.to_vec(), username);
        let task = tokio::spawn(persist(
            self.db.clone(),
            self.blobs.clone(),
            id.clone(),
            record,
        ));
        task
            .await
            .map_err(|e| IngestError::Store(StoreError::Io(std::io::Error::other(e))))??;

        Ok(id)
    }
}

/// Steps 4 and 5: store the blob, then link it into the owner's list.
async fn persist(
    db: Arc<Database>,
    blobs: Arc<BlobStore>,
    id: String,
    record: GyotakuRecord,
) -> Result<(), IngestError> {
    let username = record.username.clone();
    let size = record.data.len();

    if let Err(e) = blobs.put(&id, record).await {
        if e.is_conflict() {
            info!("Lost race for gyotaku {} ({})", id, username);
        }
        return Err(e.into());
    }

    let (user, gid) = (username.clone(), id.clone());
    if let Err(e) = blocking(move || db.append_gyotaku_list(&user, &gid)).await {
        error!(
            "Orphaned blob {}: stored for {} but list append failed: {}",
            id, username, e
        );
        return Err(IngestError::Store(e));
    }

    info!("Gyotaku {} taken by {} ({} bytes)", id, username, size);
    Ok(())
}

