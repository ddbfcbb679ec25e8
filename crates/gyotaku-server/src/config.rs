use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::warn;

use gyotaku_api::fetch::DEFAULT_MAX_PAYLOAD_BYTES;
use gyotaku_api::ingest::DEFAULT_FETCH_TIMEOUT;

/// Server settings, read from `GYOTAKU_*` environment variables.
#[derive(Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub blob_dir: PathBuf,
    pub jwt_secret: String,
    pub fetch_timeout: Duration,
    pub max_payload_bytes: usize,
    pub flag_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = var("GYOTAKU_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_or(&var, "GYOTAKU_PORT", 80)?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        let jwt_secret = match var("GYOTAKU_JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                warn!("GYOTAKU_JWT_SECRET unset; sessions will not survive a restart");
                gyotaku_crypto::keys::generate_secret()
            }
        };

        Ok(Self {
            addr,
            db_path: var("GYOTAKU_DB_PATH").unwrap_or_else(|| "gyotaku.db".into()).into(),
            blob_dir: var("GYOTAKU_BLOB_DIR").unwrap_or_else(|| "./gyotaku".into()).into(),
            jwt_secret,
            fetch_timeout: Duration::from_secs(parse_or(
                &var,
                "GYOTAKU_FETCH_TIMEOUT_SECS",
                DEFAULT_FETCH_TIMEOUT.as_secs(),
            )?),
            max_payload_bytes: parse_or(&var, "GYOTAKU_MAX_PAYLOAD_BYTES", DEFAULT_MAX_PAYLOAD_BYTES)?,
            flag_path: var("GYOTAKU_FLAG_PATH").unwrap_or_else(|| "flag".into()).into(),
        })
    }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw.parse().with_context(|| format!("{key}={raw:?} is not valid")),
        None => Ok(default),
    }
}
