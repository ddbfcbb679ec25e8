use gyotaku_crypto::password;
use tracing::info;

use crate::error::{Result, StoreError};
use crate::{Database, kv};

impl Database {
    // -- Credentials --

    pub fn user_exists(&self, username: &str) -> Result<bool> {
        self.with_snapshot(|conn| kv::has(conn, &kv::user_key(username)))
    }

    /// Check a password against the stored hash. An unknown user is `false`.
    ///
    /// The hash is read from a snapshot; the (slow) comparison runs after
    /// the reader connection is released.
    pub fn verify_user(&self, username: &str, password: &str) -> Result<bool> {
        let stored = self.with_snapshot(|conn| kv::get(conn, &kv::user_key(username)))?;

        let Some(bytes) = stored else {
            return Ok(false);
        };
        let phc = std::str::from_utf8(&bytes)
            .map_err(|_| StoreError::Corrupt(format!("credential for {username}")))?;

        Ok(password::verify_password(phc, password)?)
    }

    /// Hash and store a new credential. Never overwrites: an existing
    /// username yields `Conflict`.
    pub fn create_user(&self, username: &str, password: &str) -> Result<()> {
        let hash = password::hash_password(password)?;

        let inserted =
            self.with_write_tx(|conn| kv::insert_new(conn, &kv::user_key(username), hash.as_bytes()))?;
        if !inserted {
            return Err(StoreError::Conflict(username.to_string()));
        }

        info!("Registered user {}", username);
        Ok(())
    }
}
