use rusqlite::Connection;
use tracing::info;

use crate::error::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Database: running migration v1 (key-value table)");
        // Keys are namespaced by prefix: `user-<name>` holds a password hash,
        // `gyotaku-<name>` holds the JSON-encoded list of content ids.
        conn.execute_batch(
            "
            BEGIN;
            CREATE TABLE kv (
                key   TEXT PRIMARY KEY,
                value BLOB NOT NULL
            ) WITHOUT ROWID;

            INSERT INTO schema_version (version) VALUES (1);
            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
