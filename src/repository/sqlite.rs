//! SQLite Config Store
//!
//! Local persistence for widget configuration. One row per widget key,
//! configuration stored as a JSON text column.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;

use super::traits::{ConfigMap, ConfigStore};
use crate::domain::{DomainError, DomainResult};

/// SQLite implementation of ConfigStore
pub struct SqliteConfigStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteConfigStore {
    /// Open (or create) the database at `path` and run migrations.
    pub fn open(path: impl AsRef<Path>) -> DomainResult<Self> {
        let conn =
            Connection::open(path).map_err(|e| DomainError::Storage(e.to_string()))?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> DomainResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DomainError::Storage(e.to_string()))?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS widget_config (
            widget_key TEXT PRIMARY KEY,
            data TEXT NOT NULL,
            updated_at INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )
    .map_err(|e| DomainError::Storage(e.to_string()))?;

    Ok(())
}

#[async_trait]
impl ConfigStore for SqliteConfigStore {
    async fn load(&self, key: &str) -> DomainResult<ConfigMap> {
        let conn = self.conn.lock().await;

        let stored: Option<String> = conn
            .query_row(
                "SELECT data FROM widget_config WHERE widget_key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| DomainError::Storage(e.to_string()))?;

        let Some(text) = stored else {
            return Ok(ConfigMap::new());
        };

        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(serde_json::Value::Object(map)) => Ok(map),
            _ => {
                log::warn!("stored config for '{}' is not a JSON object, using defaults", key);
                Ok(ConfigMap::new())
            }
        }
    }

    async fn save(&self, key: &str, data: &ConfigMap) -> DomainResult<()> {
        let text =
            serde_json::to_string(data).map_err(|e| DomainError::Storage(e.to_string()))?;
        let conn = self.conn.lock().await;

        conn.execute(
            "INSERT INTO widget_config (widget_key, data, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(widget_key) DO UPDATE SET
                 data = excluded.data,
                 updated_at = excluded.updated_at",
            params![key, text, chrono::Utc::now().timestamp()],
        )
        .map_err(|e| DomainError::Storage(e.to_string()))?;

        Ok(())
    }
}
