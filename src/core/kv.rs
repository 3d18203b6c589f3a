//! Durable key-value storage for small JSON blobs under fixed keys.
//!
//! An empty store is a fresh session. A malformed value reads as
//! absent rather than failing the caller.

use anyhow::Result;
use serde::{Serialize, de::DeserializeOwned};
use tokio_rusqlite::Connection;

/// Key for the single Google credential slot
pub const KEY_GOOGLE_TOKENS: &str = "google_tokens";
/// Key for the pre-redirect review snapshot
pub const KEY_PENDING_SYNC: &str = "pending_sync";

pub async fn get<T>(db: &Connection, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned + Send + 'static,
{
    let key = key.to_string();
    let raw: Option<String> = db
        .call(move |conn| {
            let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
            let mut rows = stmt.query([&key])?;
            match rows.next()? {
                Some(row) => Ok(Some(row.get(0)?)),
                None => Ok(None),
            }
        })
        .await?;

    Ok(raw.and_then(|value| serde_json::from_str(&value).ok()))
}

pub async fn set<T: Serialize>(db: &Connection, key: &str, value: &T) -> Result<()> {
    let key = key.to_string();
    let value = serde_json::to_string(value)?;
    db.call(move |conn| {
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            (&key, &value),
        )?;
        Ok(())
    })
    .await?;
    Ok(())
}

pub async fn delete(db: &Connection, key: &str) -> Result<()> {
    let key = key.to_string();
    db.call(move |conn| {
        conn.execute("DELETE FROM kv WHERE key = ?1", [&key])?;
        Ok(())
    })
    .await?;
    Ok(())
}
