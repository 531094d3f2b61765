// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! SQLite-backed record store.
//!
//! One row per data source; `config` is stored as JSON text and timestamps as
//! RFC 3339 strings. Rows are decoded through [`DataSourceRecord`] so a row
//! whose config no longer matches its kind surfaces as a storage error instead
//! of an invalid record.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};

use crate::errors::RegistryError;
use crate::model::{DataSource, DataSourceRecord, SourceKind};
use crate::observability::messages::registry::StoreOpened;
use crate::observability::messages::StructuredLog;
use crate::traits::DataSourceStore;

/// Busy timeout applied to the connection.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SELECT_COLUMNS: &str = "id, name, kind, description, config, owner, is_public, created_at, updated_at";

pub struct SqliteStore {
    path: PathBuf,
    connection: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store at `path` and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                RegistryError::Storage(format!(
                    "unable to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
        let connection = Connection::open_with_flags(&path, flags).map_err(db_error)?;
        connection.busy_timeout(BUSY_TIMEOUT).map_err(db_error)?;
        initialize_schema(&connection)?;

        StoreOpened {
            backend: "sqlite",
            location: &path.display().to_string(),
        }
        .log();

        Ok(Self {
            path,
            connection: Mutex::new(connection),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, RegistryError> {
        self.connection
            .lock()
            .map_err(|_| RegistryError::Storage("connection mutex poisoned".to_string()))
    }
}

#[async_trait]
impl DataSourceStore for SqliteStore {
    async fn insert(&self, record: DataSource) -> Result<(), RegistryError> {
        let row = DataSourceRecord::from(record);
        let config = serde_json::to_string(&row.config)
            .map_err(|e| RegistryError::Storage(e.to_string()))?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO data_sources (id, name, kind, description, config, owner, is_public, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                row.id,
                row.name,
                row.kind.as_str(),
                row.description,
                config,
                row.owner,
                row.is_public,
                row.created_at.to_rfc3339(),
                row.updated_at.to_rfc3339(),
            ],
        )
        .map_err(db_error)?;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<DataSource>, RegistryError> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                &format!("SELECT {} FROM data_sources WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                RawRow::from_row,
            )
            .optional()
            .map_err(db_error)?;
        drop(conn);
        raw.map(RawRow::into_source).transpose()
    }

    async fn list_visible(&self, user_id: &str) -> Result<Vec<DataSource>, RegistryError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM data_sources WHERE owner = ?1 OR is_public = 1 ORDER BY seq",
                SELECT_COLUMNS
            ))
            .map_err(db_error)?;
        let rows = stmt
            .query_map(params![user_id], RawRow::from_row)
            .map_err(db_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error)?;
        drop(stmt);
        drop(conn);
        rows.into_iter().map(RawRow::into_source).collect()
    }

    async fn replace_owned(&self, record: DataSource) -> Result<bool, RegistryError> {
        let row = DataSourceRecord::from(record);
        let config = serde_json::to_string(&row.config)
            .map_err(|e| RegistryError::Storage(e.to_string()))?;
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "UPDATE data_sources
                 SET name = ?1, description = ?2, config = ?3, is_public = ?4, updated_at = ?5
                 WHERE id = ?6 AND owner = ?7",
                params![
                    row.name,
                    row.description,
                    config,
                    row.is_public,
                    row.updated_at.to_rfc3339(),
                    row.id,
                    row.owner,
                ],
            )
            .map_err(db_error)?;
        Ok(changed > 0)
    }

    async fn remove_owned(&self, id: &str, owner: &str) -> Result<bool, RegistryError> {
        let conn = self.lock()?;
        let removed = conn
            .execute(
                "DELETE FROM data_sources WHERE id = ?1 AND owner = ?2",
                params![id, owner],
            )
            .map_err(db_error)?;
        Ok(removed > 0)
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}

/// Column values of one row before decoding.
struct RawRow {
    id: String,
    name: String,
    kind: String,
    description: String,
    config: String,
    owner: String,
    is_public: bool,
    created_at: String,
    updated_at: String,
}

impl RawRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(RawRow {
            id: row.get(0)?,
            name: row.get(1)?,
            kind: row.get(2)?,
            description: row.get(3)?,
            config: row.get(4)?,
            owner: row.get(5)?,
            is_public: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn into_source(self) -> Result<DataSource, RegistryError> {
        let kind = SourceKind::parse(&self.kind).ok_or_else(|| {
            RegistryError::Storage(format!("row '{}' has unknown kind '{}'", self.id, self.kind))
        })?;
        let config = serde_json::from_str(&self.config).map_err(|e| {
            RegistryError::Storage(format!("row '{}' has unreadable config: {}", self.id, e))
        })?;
        let record = DataSourceRecord {
            kind,
            config,
            created_at: parse_timestamp(&self.id, &self.created_at)?,
            updated_at: parse_timestamp(&self.id, &self.updated_at)?,
            id: self.id,
            name: self.name,
            description: self.description,
            owner: self.owner,
            is_public: self.is_public,
        };
        let id = record.id.clone();
        DataSource::try_from(record)
            .map_err(|e| RegistryError::Storage(format!("row '{}' is invalid: {}", id, e)))
    }
}

fn parse_timestamp(id: &str, value: &str) -> Result<DateTime<Utc>, RegistryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| {
            RegistryError::Storage(format!("row '{}' has bad timestamp '{}': {}", id, value, e))
        })
}

fn initialize_schema(connection: &Connection) -> Result<(), RegistryError> {
    connection
        .execute_batch(
            "CREATE TABLE IF NOT EXISTS data_sources (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                kind TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                config TEXT NOT NULL,
                owner TEXT NOT NULL,
                is_public INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_data_sources_owner ON data_sources (owner);",
        )
        .map_err(db_error)
}

fn db_error(err: rusqlite::Error) -> RegistryError {
    RegistryError::Storage(err.to_string())
}
