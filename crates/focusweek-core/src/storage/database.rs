//! SQLite document store keyed by user identity.
//!
//! Each user owns exactly one document: the JSON-encoded [`Snapshot`].
//! Saves replace the whole document. There is no conflict resolution
//! between concurrent writers (two devices for the same user): the last
//! write wins.

use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::debug;

use super::{ConnectionStatus, PersistenceGateway, Snapshot};
use crate::error::{Result, StorageError};

pub const DOCUMENT_DB_FILE: &str = "focusweek.db";

pub struct DocumentGateway {
    conn: Connection,
    user_id: String,
}

impl DocumentGateway {
    /// Open (or create) the document store at `path` for `user_id`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path, user_id: &str) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn, user_id)
    }

    /// Open an in-memory store.
    pub fn open_memory(user_id: &str) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        Self::with_connection(conn, user_id)
    }

    fn with_connection(conn: Connection, user_id: &str) -> Result<Self> {
        let gateway = Self {
            conn,
            user_id: user_id.to_string(),
        };
        gateway.migrate().map_err(StorageError::from)?;
        Ok(gateway)
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS documents (
                user_id    TEXT PRIMARY KEY,
                body       TEXT NOT NULL,
                version    INTEGER NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Users with a stored document, sorted by id.
    pub fn list_users(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT user_id FROM documents ORDER BY user_id")
            .map_err(StorageError::from)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(StorageError::from)?;
        let mut users = Vec::new();
        for row in rows {
            users.push(row.map_err(StorageError::from)?);
        }
        Ok(users)
    }
}

impl PersistenceGateway for DocumentGateway {
    fn load(&self) -> Result<Option<Snapshot>> {
        let mut stmt = self
            .conn
            .prepare("SELECT body FROM documents WHERE user_id = ?1")
            .map_err(StorageError::from)?;
        let body = match stmt.query_row(params![self.user_id], |row| row.get::<_, String>(0)) {
            Ok(body) => body,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(StorageError::from(e).into()),
        };
        Ok(Some(Snapshot::from_json(&body)?))
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        let body = serde_json::to_string(snapshot)?;
        self.conn
            .execute(
                "INSERT OR REPLACE INTO documents (user_id, body, version, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    self.user_id,
                    body,
                    snapshot.version,
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(StorageError::from)?;
        debug!(user_id = %self.user_id, bytes = body.len(), "document written");
        Ok(())
    }

    fn status(&self) -> ConnectionStatus {
        ConnectionStatus::Cloud
    }
}
