//! Per-request access to the routing file.
//!
//! The dispatcher never holds on to a snapshot across requests. Under
//! [`ReloadMode::Always`] each [`ConfigStore::load`] reads and parses the file;
//! under [`ReloadMode::Mtime`] the last parsed snapshot is reused while the
//! file's modification time and length are unchanged.
//!
//! Route entries that fail validation are skipped, so one bad entry only
//! takes its own route out of service. Skipped entries and duplicate
//! `(path, host)` pairs are logged when that set of warnings changes, not on
//! every parse.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use arc_swap::{ArcSwap, ArcSwapOption};
use tokio::fs;

use crate::config::loader::{load_routes, ConfigError};
use crate::config::schema::{HookConfig, ReloadMode};
use crate::config::validation::{duplicate_routes, ValidationError};

/// File identity used to decide whether a cached snapshot is still current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    modified: SystemTime,
    len: u64,
}

struct Cached {
    fingerprint: Fingerprint,
    config: Arc<HookConfig>,
}

/// Read-only view of the routing file.
pub struct ConfigStore {
    path: PathBuf,
    mode: ReloadMode,
    cached: ArcSwapOption<Cached>,
    reported: ArcSwap<Vec<String>>,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>, mode: ReloadMode) -> Self {
        Self {
            path: path.into(),
            mode,
            cached: ArcSwapOption::empty(),
            reported: ArcSwap::from_pointee(Vec::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> ReloadMode {
        self.mode
    }

    /// Return the newest snapshot of the routing file.
    ///
    /// Errors are never papered over with an older snapshot.
    pub async fn load(&self) -> Result<Arc<HookConfig>, ConfigError> {
        match self.mode {
            ReloadMode::Always => {
                let (config, skipped) = load_routes(&self.path).await?;
                self.report(&config, &skipped);
                Ok(Arc::new(config))
            }
            ReloadMode::Mtime => self.load_cached().await,
        }
    }

    async fn load_cached(&self) -> Result<Arc<HookConfig>, ConfigError> {
        let fingerprint = match self.fingerprint().await {
            Ok(fp) => fp,
            Err(e) => {
                self.cached.store(None);
                return Err(e.into());
            }
        };

        if let Some(cached) = self.cached.load_full() {
            if cached.fingerprint == fingerprint {
                return Ok(cached.config.clone());
            }
        }

        match load_routes(&self.path).await {
            Ok((config, skipped)) => {
                self.report(&config, &skipped);
                let config = Arc::new(config);
                tracing::debug!(path = %self.path.display(), "Routing file reloaded");
                self.cached.store(Some(Arc::new(Cached {
                    fingerprint,
                    config: config.clone(),
                })));
                Ok(config)
            }
            Err(e) => {
                self.cached.store(None);
                Err(e)
            }
        }
    }

    /// Warn about skipped entries and duplicate routes unless the same set
    /// was already reported. Returns true when a warning was logged.
    pub fn report(&self, config: &HookConfig, skipped: &[ValidationError]) -> bool {
        let mut warnings: Vec<String> = skipped.iter().map(ToString::to_string).collect();
        let skipped_count = warnings.len();
        warnings.extend(duplicate_routes(config));

        if **self.reported.load() == warnings {
            return false;
        }
        for problem in &warnings[..skipped_count] {
            tracing::warn!(path = %self.path.display(), problem = %problem, "Invalid route entry skipped");
        }
        for dup in &warnings[skipped_count..] {
            tracing::warn!(route = %dup, "Duplicate hook route, only the first entry is reachable");
        }
        let changed = !warnings.is_empty();
        self.reported.store(Arc::new(warnings));
        changed
    }

    async fn fingerprint(&self) -> std::io::Result<Fingerprint> {
        let meta = fs::metadata(&self.path).await?;
        Ok(Fingerprint {
            modified: meta.modified()?,
            len: meta.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ONE_HOOK: &str = r#"{"hooks": [{"id": "one", "path": "/one", "dir": "/srv/one",
        "branch": "main", "process": "one", "secret": "S"}]}"#;
    const TWO_HOOKS: &str = r#"{"hooks": [
        {"id": "one", "path": "/one", "dir": "/srv/one", "branch": "main", "process": "one", "secret": "S"},
        {"id": "two", "path": "/two", "dir": "/srv/two", "branch": "main", "process": "two", "secret": "S"}]}"#;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_always_mode_sees_every_edit() {
        let file = write_config(ONE_HOOK);
        let store = ConfigStore::new(file.path(), ReloadMode::Always);
        assert_eq!(store.load().await.unwrap().hooks.len(), 1);

        std::fs::write(file.path(), TWO_HOOKS).unwrap();
        assert_eq!(store.load().await.unwrap().hooks.len(), 2);
    }

    #[tokio::test]
    async fn test_mtime_mode_reuses_unchanged_snapshot() {
        let file = write_config(ONE_HOOK);
        let store = ConfigStore::new(file.path(), ReloadMode::Mtime);
        let first = store.load().await.unwrap();
        let second = store.load().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        // Length changes even if the mtime granularity hides the write.
        std::fs::write(file.path(), TWO_HOOKS).unwrap();
        assert_eq!(store.load().await.unwrap().hooks.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicates_reported_once_per_change() {
        let dup = r#"{"hooks": [
            {"id": "a", "path": "/p", "dir": "/srv/a", "branch": "main", "process": "a", "secret": "S"},
            {"id": "b", "path": "/p", "dir": "/srv/b", "branch": "main", "process": "b", "secret": "S"}]}"#;
        let file = write_config(dup);
        let store = ConfigStore::new(file.path(), ReloadMode::Always);

        let config = store.load().await.unwrap();
        assert!(!store.report(&config, &[]));

        std::fs::write(file.path(), ONE_HOOK).unwrap();
        let config = store.load().await.unwrap();
        assert!(!store.report(&config, &[]));

        std::fs::write(file.path(), dup).unwrap();
        let config = store.load().await.unwrap();
        assert!(!store.report(&config, &[]));
    }

    #[test]
    fn test_report_duplicates_only_on_change() {
        let config: HookConfig = serde_json::from_str(
            r#"{"hooks": [
            {"id": "a", "path": "/p", "dir": "/srv/a", "branch": "main", "process": "a", "secret": "S"},
            {"id": "b", "path": "/p", "dir": "/srv/b", "branch": "main", "process": "b", "secret": "S"}]}"#,
        )
        .unwrap();
        let store = ConfigStore::new("/unused.json", ReloadMode::Always);

        assert!(store.report(&config, &[]));
        assert!(!store.report(&config, &[]));
        assert!(!store.report(&HookConfig::default(), &[]));
        assert!(store.report(&config, &[]));
    }

    #[tokio::test]
    async fn test_invalid_entry_is_skipped_not_fatal() {
        let file = write_config(
            r#"{"hooks": [
            {"id": "bad", "path": "/bad", "dir": "srv/bad", "branch": "main", "process": "bad", "secret": "S"},
            {"id": "one", "path": "/one", "dir": "/srv/one", "branch": "main", "process": "one", "secret": "S"}]}"#,
        );
        let store = ConfigStore::new(file.path(), ReloadMode::Always);

        let config = store.load().await.unwrap();
        let ids: Vec<&str> = config.hooks.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["one"]);
    }

    #[tokio::test]
    async fn test_broken_file_is_not_masked_by_cache() {
        let file = write_config(ONE_HOOK);
        let store = ConfigStore::new(file.path(), ReloadMode::Mtime);
        store.load().await.unwrap();

        std::fs::write(file.path(), "{ broken").unwrap();
        assert!(store.load().await.is_err());
    }
}
