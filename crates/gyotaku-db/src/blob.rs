use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use gyotaku_crypto::is_content_id;
use gyotaku_types::models::GyotakuRecord;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::error::{Result, StoreError};

/// Content-addressed record storage.
///
/// Each record is stored as a single file at `{dir}/{content_id}` and is
/// never modified after creation. Writes land in a temp file first and are
/// linked into place without clobbering, so readers never see a partial
/// record and exactly one concurrent writer per id succeeds.
pub struct BlobStore {
    dir: PathBuf,
}

/// On-disk shape of a record. The payload is base64 so the file stays JSON.
#[derive(Serialize, Deserialize)]
struct StoredRecord {
    url: String,
    data: String,
    username: String,
}

impl BlobStore {
    pub async fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Blob storage directory: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for a content id, or `None` if the id is not well-formed.
    /// Ids are validated before they ever reach the filesystem.
    fn path_for(&self, content_id: &str) -> Option<PathBuf> {
        is_content_id(content_id).then(|| self.dir.join(content_id))
    }

    pub async fn exists(&self, content_id: &str) -> Result<bool> {
        match self.path_for(content_id) {
            Some(path) => Ok(fs::try_exists(&path).await?),
            None => Ok(false),
        }
    }

    /// Store a new record. Fails with `Conflict` if the id is already taken.
    ///
    /// Encoding and the write both run on the blocking pool.
    pub async fn put(&self, content_id: &str, record: GyotakuRecord) -> Result<()> {
        let path = self.path_for(content_id).ok_or(StoreError::InvalidContentId)?;

        if fs::try_exists(&path).await? {
            return Err(StoreError::Conflict(content_id.to_string()));
        }

        let size = record.data.len();
        let dir = self.dir.clone();
        let id = content_id.to_string();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let encoded = encode(&record)?;
            match write_new(&dir, &path, &encoded) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(StoreError::Conflict(id)),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(io::Error::other)??;

        debug!("Stored blob {} ({} bytes)", content_id, size);
        Ok(())
    }

    pub async fn get(&self, content_id: &str) -> Result<GyotakuRecord> {
        let not_found = || StoreError::NotFound(content_id.to_string());
        let path = self.path_for(content_id).ok_or_else(not_found)?;

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        };

        let id = content_id.to_string();
        tokio::task::spawn_blocking(move || decode(&id, &bytes))
            .await
            .map_err(io::Error::other)?
    }
}

fn encode(record: &GyotakuRecord) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&StoredRecord {
        url: record.url.clone(),
        data: B64.encode(&record.data),
        username: record.username.clone(),
    })?)
}

fn decode(content_id: &str, bytes: &[u8]) -> Result<GyotakuRecord> {
    let stored: StoredRecord = serde_json::from_slice(bytes)?;
    let data = B64
        .decode(stored.data)
        .map_err(|e| StoreError::Corrupt(format!("blob {content_id}: {e}")))?;

    Ok(GyotakuRecord {
        url: stored.url,
        data,
        username: stored.username,
    })
}

/// Write `bytes` to a temp file in `dir`, sync it, then link it to `target`
/// only if `target` does not exist yet. The temp file is removed either way.
fn write_new(dir: &Path, target: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp = tempfile::Builder::new().prefix(".tmp-").tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist_noclobber(target).map_err(|e| e.error)?;
    Ok(())
}
