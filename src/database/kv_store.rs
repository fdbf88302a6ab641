//! String key-value access on top of the `kv_store` table.
//!
//! The free functions take a borrowed connection so callers can run several
//! of them under one lock. [`Database`] exposes the same operations for
//! single-shot use.

use rusqlite::{params, Connection, OptionalExtension};

use super::connection::Database;
use crate::types::errors::StoreError;

/// Storage key of the completed-downloads list.
pub const MY_DOWNLOADS_KEY: &str = "my_downloads";
/// Storage key of the in-flight downloads map.
pub const ACTIVE_DOWNLOADS_KEY: &str = "active_downloads";
/// Storage key of the bearer token.
pub const USER_TOKEN_KEY: &str = "userToken";
/// Storage key of the serialized user profile.
pub const USER_INFO_KEY: &str = "userInfo";

pub fn get_item(conn: &Connection, key: &str) -> Result<Option<String>, StoreError> {
    let value = conn
        .query_row(
            "SELECT value FROM kv_store WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

pub fn set_item(conn: &Connection, key: &str, value: &str) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)",
        params![key, value, chrono::Utc::now().timestamp()],
    )?;
    Ok(())
}

pub fn remove_item(conn: &Connection, key: &str) -> Result<(), StoreError> {
    conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
    Ok(())
}

pub fn keys(conn: &Connection) -> Result<Vec<String>, StoreError> {
    let mut stmt = conn.prepare("SELECT key FROM kv_store ORDER BY key")?;
    let rows = stmt.query_map([], |row| row.get(0))?;
    let mut result = Vec::new();
    for row in rows {
        result.push(row?);
    }
    Ok(result)
}

impl Database {
    pub fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        get_item(&self.connection(), key)
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        set_item(&self.connection(), key, value)
    }

    pub fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        remove_item(&self.connection(), key)
    }

    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        keys(&self.connection())
    }
}
