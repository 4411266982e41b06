//! Persistence: configuration, the versioned snapshot and the gateways that
//! store it.
//!
//! Two durable backends sit behind one [`PersistenceGateway`] trait:
//! - [`LocalGateway`]: a JSON file in the data directory.
//! - [`DocumentGateway`]: a SQLite document table keyed by user identity.
//!
//! The backend is chosen once at startup by [`open_gateway`]; nothing
//! downstream branches on it.

mod config;
pub mod database;
mod local;
mod memory;
mod snapshot;

pub use config::{Config, LoggingConfig, StorageBackend, StorageConfig};
pub use database::DocumentGateway;
pub use local::LocalGateway;
pub use memory::MemoryGateway;
pub use snapshot::{Snapshot, SNAPSHOT_VERSION};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::error::{ConfigError, Result};

/// Durable storage for the session snapshot.
pub trait PersistenceGateway: Send {
    /// Load the last saved snapshot, `None` when nothing was saved yet.
    fn load(&self) -> Result<Option<Snapshot>>;

    /// Replace the stored snapshot.
    fn save(&mut self, snapshot: &Snapshot) -> Result<()>;

    /// Which kind of backend this is, for the connectivity indicator.
    fn status(&self) -> ConnectionStatus;
}

/// Connectivity indicator shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Cloud,
    Local,
}

/// Returns the data directory, creating it if needed.
///
/// Resolution order:
/// 1. `FOCUSWEEK_HOME`
/// 2. `~/.config/focusweek-dev` when `FOCUSWEEK_ENV=dev`
/// 3. `~/.config/focusweek`
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("FOCUSWEEK_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FOCUSWEEK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("focusweek-dev")
            } else {
                base_dir.join("focusweek")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Open the gateway selected by `config`.
///
/// A cloud backend without a user identity falls back to local storage.
///
/// # Errors
/// Returns an error if the data directory or the document store cannot be
/// opened.
pub fn open_gateway(config: &Config) -> Result<Box<dyn PersistenceGateway>> {
    let dir = data_dir()?;
    match (config.storage.backend, config.storage.user_id()) {
        (StorageBackend::Cloud, Some(user_id)) => {
            let path = dir.join(database::DOCUMENT_DB_FILE);
            info!(path = %path.display(), user_id, "using document store");
            Ok(Box::new(DocumentGateway::open(&path, user_id)?))
        }
        (StorageBackend::Cloud, None) => {
            warn!("cloud storage selected but no user_id configured; falling back to local storage");
            Ok(Box::new(LocalGateway::in_dir(&dir)))
        }
        (StorageBackend::Local, _) => {
            info!(dir = %dir.display(), "using local storage");
            Ok(Box::new(LocalGateway::in_dir(&dir)))
        }
    }
}
