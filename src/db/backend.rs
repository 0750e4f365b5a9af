//! Key/value storage backends for the history store.
//!
//! The history is kept as a single JSON payload under one key, so a backend
//! only needs string get/set/remove. Two implementations:
//! - `SqliteStorage`: persistent, one row per key in `kv_store`
//! - `MemoryStorage`: transient, lives as long as the process

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use super::sqlite::{open_database, open_memory_database};
use super::DatabaseError;

/// String key/value medium behind the history store.
pub trait StorageBackend: Send {
    fn get(&self, key: &str) -> Result<Option<String>, DatabaseError>;

    fn set(&self, key: &str, value: &str) -> Result<(), DatabaseError>;

    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), DatabaseError>;

    /// Short name for logs.
    fn describe(&self) -> String;
}

// ── SqliteStorage ─────────────────────────────────────────

/// Persistent backend over the `kv_store` table.
pub struct SqliteStorage {
    conn: Connection,
    label: String,
}

impl SqliteStorage {
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self {
            conn: open_database(path)?,
            label: format!("sqlite:{}", path.display()),
        })
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Self {
            conn: open_memory_database()?,
            label: "sqlite::memory:".into(),
        })
    }
}

impl StorageBackend for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

// ── MemoryStorage ─────────────────────────────────────────

/// Transient backend. Used directly in tests and as the fallback when the
/// persistent medium is unavailable.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, DatabaseError> {
        self.entries
            .lock()
            .map_err(|_| DatabaseError::Unavailable("memory storage lock poisoned".into()))
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DatabaseError> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".into()
    }
}

/// Backend whose writes always fail. Simulates a read-only or full medium.
#[cfg(test)]
pub(crate) struct FailingStorage;

#[cfg(test)]
impl StorageBackend for FailingStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, DatabaseError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), DatabaseError> {
        Err(DatabaseError::Unavailable("write refused".into()))
    }

    fn remove(&self, _key: &str) -> Result<(), DatabaseError> {
        Err(DatabaseError::Unavailable("write refused".into()))
    }

    fn describe(&self) -> String {
        "failing".into()
    }
}
