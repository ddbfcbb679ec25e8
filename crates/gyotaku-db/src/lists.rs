use crate::error::Result;
use crate::{Database, kv};

// Lists are stored as a JSON array of content ids, oldest first.

fn decode(bytes: &[u8]) -> Result<Vec<String>> {
    Ok(serde_json::from_slice(bytes)?)
}

impl Database {
    // -- Per-user gyotaku lists --

    /// Content ids created by `username`, in creation order. Empty if the
    /// user has never created anything.
    pub fn get_gyotaku_list(&self, username: &str) -> Result<Vec<String>> {
        let stored = self.with_snapshot(|conn| kv::get(conn, &kv::list_key(username)))?;
        match stored {
            Some(bytes) => decode(&bytes),
            None => Ok(Vec::new()),
        }
    }

    /// Append `content_id` to the user's list as one read-modify-write
    /// transaction. Returns the new list length.
    ///
    /// All appends share the single writer connection, so appends for
    /// different users also run one after another. Each holds the writer
    /// only for one short transaction; no fetch or other I/O happens under it.
    pub fn append_gyotaku_list(&self, username: &str, content_id: &str) -> Result<usize> {
        let key = kv::list_key(username);
        self.with_write_tx(|conn| {
            let mut list = match kv::get(conn, &key)? {
                Some(bytes) => decode(&bytes)?,
                None => Vec::new(),
            };
            list.push(content_id.to_string());
            kv::put(conn, &key, &serde_json::to_vec(&list)?)?;
            Ok(list.len())
        })
    }
}
