//! Local snapshot file.
//!
//! Writes go to a sibling temp file first and are renamed into place, so a
//! crash mid-write leaves the previous snapshot intact.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{ConnectionStatus, PersistenceGateway, Snapshot};
use crate::error::{Result, StorageError};

pub const LOCAL_SNAPSHOT_FILE: &str = "focusweek.json";

pub struct LocalGateway {
    path: PathBuf,
}

impl LocalGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Gateway for the default snapshot file inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(LOCAL_SNAPSHOT_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file_error(&self, source: std::io::Error) -> StorageError {
        StorageError::File {
            path: self.path.clone(),
            source,
        }
    }
}

impl PersistenceGateway for LocalGateway {
    fn load(&self) -> Result<Option<Snapshot>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.file_error(e).into()),
        };
        Ok(Some(Snapshot::from_json(&content)?))
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        let json = snapshot.to_json()?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.file_error(e))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let write = || -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, &self.path)
        };
        write().map_err(|e| self.file_error(e))?;

        debug!(path = %self.path.display(), bytes = json.len(), "snapshot written");
        Ok(())
    }

    fn status(&self) -> ConnectionStatus {
        ConnectionStatus::Local
    }
}
