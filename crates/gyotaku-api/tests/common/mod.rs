#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bytes::Bytes;
use gyotaku_api::fetch::{FetchError, FetchFuture, Fetcher};
use gyotaku_api::ingest::Ingestor;
use gyotaku_api::{AppState, AppStateInner};
use gyotaku_db::{BlobStore, Database};
use tempfile::TempDir;

pub const JWT_SECRET: &str = "test-secret";

/// In-process stand-in for the remote web.
pub struct FakeFetcher {
    calls: AtomicUsize,
    mode: Mode,
}

enum Mode {
    Echo,
    Large(usize),
    Fail,
    Hang,
}

impl FakeFetcher {
    /// Responds with `payload of <url>`.
    pub fn echo() -> Arc<Self> {
        Arc::new(Self { calls: AtomicUsize::new(0), mode: Mode::Echo })
    }

    /// Responds with `len` bytes of filler.
    pub fn large(len: usize) -> Arc<Self> {
        Arc::new(Self { calls: AtomicUsize::new(0), mode: Mode::Large(len) })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { calls: AtomicUsize::new(0), mode: Mode::Fail })
    }

    /// Never answers within any sane timeout.
    pub fn hanging() -> Arc<Self> {
        Arc::new(Self { calls: AtomicUsize::new(0), mode: Mode::Hang })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn payload_for(url: &str) -> Vec<u8> {
    format!("payload of {url}").into_bytes()
}

impl Fetcher for FakeFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            match self.mode {
                Mode::Echo => Ok(Bytes::from(payload_for(url))),
                Mode::Large(len) => Ok(Bytes::from(vec![b'x'; len])),
                Mode::Fail => Err(FetchError::Other("connection reset".into())),
                Mode::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(Bytes::new())
                }
            }
        })
    }
}

pub struct TestEnv {
    pub dir: TempDir,
    pub db: Arc<Database>,
    pub blobs: Arc<BlobStore>,
}

impl TestEnv {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(Database::open(&dir.path().join("gyotaku.db")).unwrap());
        let blobs = Arc::new(BlobStore::new(dir.path().join("gyotaku")).await.unwrap());
        Self { dir, db, blobs }
    }

    pub fn ingestor(&self, fetcher: Arc<FakeFetcher>, timeout: Duration) -> Ingestor {
        Ingestor::new(self.db.clone(), self.blobs.clone(), fetcher, timeout)
    }

    pub fn app_state(&self, fetcher: Arc<FakeFetcher>) -> AppState {
        let flag_path = self.dir.path().join("flag");
        std::fs::write(&flag_path, "FLAG{test}\n").unwrap();

        Arc::new(AppStateInner {
            db: self.db.clone(),
            blobs: self.blobs.clone(),
            ingestor: self.ingestor(fetcher, Duration::from_secs(5)),
            jwt_secret: JWT_SECRET.to_string(),
            flag_path,
        })
    }
}
