use rusqlite::{Connection, OptionalExtension};

use crate::error::Result;

pub const USER_PREFIX: &str = "user-";
pub const LIST_PREFIX: &str = "gyotaku-";

pub fn user_key(username: &str) -> String {
    format!("{USER_PREFIX}{username}")
}

pub fn list_key(username: &str) -> String {
    format!("{LIST_PREFIX}{username}")
}

pub fn get(conn: &Connection, key: &str) -> Result<Option<Vec<u8>>> {
    let value: Option<Vec<u8>> = conn
        .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
        .optional()?;
    Ok(value)
}

pub fn has(conn: &Connection, key: &str) -> Result<bool> {
    let found: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM kv WHERE key = ?1)",
        [key],
        |row| row.get(0),
    )?;
    Ok(found)
}

/// Insert only if the key is absent. Returns false if it already existed.
pub fn insert_new(conn: &Connection, key: &str, value: &[u8]) -> Result<bool> {
    let changed = conn.execute(
        "INSERT INTO kv (key, value) VALUES (?1, ?2) ON CONFLICT(key) DO NOTHING",
        rusqlite::params![key, value],
    )?;
    Ok(changed == 1)
}

pub fn put(conn: &Connection, key: &str, value: &[u8]) -> Result<()> {
    conn.execute(
        "INSERT INTO kv (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        rusqlite::params![key, value],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::migrations::run(&conn).unwrap();
        conn
    }

    #[test]
    fn prefixes_partition_keys() {
        assert_eq!(user_key("alice1234"), "user-alice1234");
        assert_eq!(list_key("alice1234"), "gyotaku-alice1234");
    }

    #[test]
    fn insert_new_does_not_overwrite() {
        let conn = conn();
        assert!(insert_new(&conn, "k", b"first").unwrap());
        assert!(!insert_new(&conn, "k", b"second").unwrap());
        assert_eq!(get(&conn, "k").unwrap().as_deref(), Some(&b"first"[..]));
    }

    #[test]
    fn put_upserts() {
        let conn = conn();
        assert!(!has(&conn, "k").unwrap());
        put(&conn, "k", b"one").unwrap();
        put(&conn, "k", b"two").unwrap();
        assert!(has(&conn, "k").unwrap());
        assert_eq!(get(&conn, "k").unwrap().as_deref(), Some(&b"two"[..]));
    }

    #[test]
    fn migrations_are_idempotent() {
        let conn = conn();
        crate::migrations::run(&conn).unwrap();
        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }
}
