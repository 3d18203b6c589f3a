//! Sqlite-backed storage used for credentials and pending sync state

use anyhow::Result;
use tokio_rusqlite::Connection;

/// Open the async sqlite connection, creating the database file if needed.
pub async fn async_db(db_path: &str) -> Result<Connection> {
    let path = format!("{}/syllasync.db", db_path.trim_end_matches('/'));
    let conn = Connection::open(path).await?;
    Ok(conn)
}

/// Create the schema. Safe to run repeatedly.
pub fn initialize_db(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )
}
