use gyotaku_crypto::CryptoError;

/// Errors returned by the credential, list and blob stores.
///
/// `NotFound` and `Conflict` are semantic outcomes; everything else is an
/// I/O or integrity failure of the backing storage.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    Conflict(String),

    #[error("invalid content id")]
    InvalidContentId,

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("password error: {0}")]
    Password(#[from] CryptoError),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("{0} connection lock poisoned")]
    LockPoisoned(&'static str),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
