use std::sync::{Arc, Mutex};

use super::{ConnectionStatus, PersistenceGateway, Snapshot};
use crate::error::{Result, StorageError};

#[derive(Debug, Default)]
struct MemoryState {
    snapshot: Option<Snapshot>,
    saves: usize,
    fail_saves: bool,
}

/// In-memory gateway. Clones share the same storage, so a test can keep a
/// handle while the session owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        let gateway = Self::default();
        gateway.lock().snapshot = Some(snapshot);
        gateway
    }

    /// Last saved snapshot.
    pub fn stored(&self) -> Option<Snapshot> {
        self.lock().snapshot.clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    /// Make every following save fail with `StorageError::Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.lock().fail_saves = failing;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PersistenceGateway for MemoryGateway {
    fn load(&self) -> Result<Option<Snapshot>> {
        Ok(self.lock().snapshot.clone())
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        let mut state = self.lock();
        if state.fail_saves {
            return Err(StorageError::Unavailable("memory gateway set to fail".into()).into());
        }
        state.snapshot = Some(snapshot.clone());
        state.saves += 1;
        Ok(())
    }

    fn status(&self) -> ConnectionStatus {
        ConnectionStatus::Local
    }
}
