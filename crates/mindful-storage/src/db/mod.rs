//! Key-value store backed by SQLite.
//!
//! Typed accessors for settings and the published timer snapshot live in
//! sibling modules and build on `get_value` / `set_value`.

mod settings;
mod timer_state;

use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    path::Path,
    sync::{Mutex, MutexGuard},
};

use crate::migrations;

/// Database connection wrapper
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the store at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation, connection opening, or schema initialization fails
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;
        }

        let conn = Connection::open(path).context("Failed to open database connection")?;
        migrations::init_schema(&conn)?;

        log::debug!("Database initialized at: {}", path.display());

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open a throwaway store that lives only as long as the value.
    ///
    /// # Errors
    ///
    /// Returns an error if schema initialization fails
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        migrations::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection lock poisoned"))
    }

    // ==================== Key-Value Methods ====================

    /// Read and decode the JSON value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored value does not decode as `T`
    pub fn get_value<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let raw: Option<String> = self
            .conn()?
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;

        raw.map(|json| {
            serde_json::from_str(&json).with_context(|| format!("Malformed value for key {key}"))
        })
        .transpose()
    }

    /// Encode `value` as JSON and store it under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the upsert fails
    pub fn set_value<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.conn()?.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = ?2,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
            params![key, json],
        )?;
        Ok(())
    }

    /// Check whether a value exists under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub fn has_value(&self, key: &str) -> Result<bool> {
        let count: i64 = self.conn()?.query_row(
            "SELECT COUNT(*) FROM kv WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_reads_as_none() {
        let db = Database::in_memory().unwrap();
        let value: Option<Vec<String>> = db.get_value("nothing").unwrap();
        assert!(value.is_none());
        assert!(!db.has_value("nothing").unwrap());
    }

    #[test]
    fn test_set_value_overwrites() {
        let db = Database::in_memory().unwrap();
        db.set_value("warningDelay", &10u32).unwrap();
        db.set_value("warningDelay", &25u32).unwrap();

        let value: Option<u32> = db.get_value("warningDelay").unwrap();
        assert_eq!(value, Some(25));
    }

    #[test]
    fn test_malformed_value_is_an_error() {
        let db = Database::in_memory().unwrap();
        db.set_value("warningDelay", "not a number").unwrap();

        let result: Result<Option<u32>> = db.get_value("warningDelay");
        assert!(result.is_err());
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("mindful.db");

        {
            let db = Database::new(&path).unwrap();
            db.set_value("blockList", &vec!["x.com"]).unwrap();
        }

        let db = Database::new(&path).unwrap();
        let list: Option<Vec<String>> = db.get_value("blockList").unwrap();
        assert_eq!(list, Some(vec!["x.com".to_string()]));
    }
}
