//! Per-target mutual exclusion.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per working directory.
///
/// Entries are created on first use and kept for the life of the process; the
/// set of deploy targets on a host is small.
#[derive(Debug, Default)]
pub struct TargetLocks {
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl TargetLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive use of `dir`. Released when the guard drops.
    pub async fn acquire(&self, dir: &Path) -> OwnedMutexGuard<()> {
        // The map shard guard must not be held across the await.
        let lock = self.locks.entry(dir.to_path_buf()).or_default().value().clone();
        lock.lock_owned().await
    }

    /// True while some pipeline holds `dir`.
    pub fn is_locked(&self, dir: &Path) -> bool {
        self.locks
            .get(dir)
            .is_some_and(|lock| lock.try_lock().is_err())
    }
}
