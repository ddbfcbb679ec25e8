//! Gyotaku Crypto Library
//!
//! - Content ids: SHA-256 of the source URL, lowercase hex.
//! - Passwords: salted Argon2id, stored as PHC strings. Only verify, never recover.
//! - Secrets: random session signing keys.

pub mod content_id;
pub mod keys;
pub mod password;

pub use content_id::{CONTENT_ID_LEN, content_id, is_content_id};

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
}
