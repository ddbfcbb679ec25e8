use serde::{Deserialize, Serialize};

/// A stored snapshot of a remote resource.
///
/// Immutable once written. The payload is kept as raw bytes; the on-disk
/// encoding is owned by the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GyotakuRecord {
    pub url: String,
    pub data: Vec<u8>,
    pub username: String,
}

impl GyotakuRecord {
    pub fn new(url: impl Into<String>, data: impl Into<Vec<u8>>, username: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            data: data.into(),
            username: username.into(),
        }
    }
}
