use rusqlite::Connection;

use crate::error::Result;

/// Initialise the credential table. Safe to call on every startup.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS identity_credentials (
            identity_id TEXT PRIMARY KEY,
            blob        BLOB NOT NULL,
            nonce       BLOB,
            updated_at  TEXT NOT NULL
        );",
    )?;
    Ok(())
}
