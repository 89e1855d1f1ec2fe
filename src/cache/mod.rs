//! Per-run memoization of parsed inputs.
//!
//! A [`RunCache`] is owned by one [`crate::sync::Syncer`] run. It parses each
//! lock artifact and each pre-commit configuration at most once, keyed by the
//! file's absolute path, and is discarded with the run. Nothing is persisted
//! and entries are never invalidated: every run exports into a fresh scratch
//! directory, so a path seen twice within a run always has the same content.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::core::SyncError;
use crate::hooks::HookRegistry;
use crate::lockfile::LockEntries;

/// Absolute form of `path`, used as the cache key.
///
/// Symlinks are resolved when the file exists; otherwise the path is made
/// absolute against the current directory so the later load reports the
/// original error.
fn cache_key(path: &Path) -> PathBuf {
    path.canonicalize()
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Parsed lock entries and hook registries for one run.
#[derive(Debug, Default)]
pub struct RunCache {
    locks: HashMap<PathBuf, Arc<LockEntries>>,
    hooks: HashMap<PathBuf, Arc<HookRegistry>>,
    hits: usize,
    misses: usize,
}

impl RunCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock entries parsed from `path`, loading them on first use.
    ///
    /// # Errors
    ///
    /// See [`LockEntries::load`]. Failures are not cached.
    pub fn lock_entries(&mut self, path: &Path) -> Result<Arc<LockEntries>> {
        let key = cache_key(path);
        if let Some(entries) = self.locks.get(&key) {
            self.hits += 1;
            tracing::trace!("lock cache hit: {}", key.display());
            return Ok(Arc::clone(entries));
        }

        self.misses += 1;
        let entries = Arc::new(LockEntries::load(&key)?);
        tracing::debug!("Parsed {} locked packages from {}", entries.len(), key.display());
        self.locks.insert(key, Arc::clone(&entries));
        Ok(entries)
    }

    /// Hook registry parsed from `path`, loading it on first use.
    ///
    /// # Errors
    ///
    /// See [`HookRegistry::load`]. Failures are not cached.
    pub fn hook_registry(&mut self, path: &Path) -> Result<Arc<HookRegistry>, SyncError> {
        let key = cache_key(path);
        if let Some(registry) = self.hooks.get(&key) {
            self.hits += 1;
            tracing::trace!("hook cache hit: {}", key.display());
            return Ok(Arc::clone(registry));
        }

        self.misses += 1;
        let registry = Arc::new(HookRegistry::load(&key)?);
        tracing::debug!("Found {} pinned hooks in {}", registry.len(), key.display());
        self.hooks.insert(key, Arc::clone(&registry));
        Ok(registry)
    }

    /// `(hits, misses)` since creation.
    #[must_use]
    pub const fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_is_parsed_once_per_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("requirements.txt");
        std::fs::write(&path, "black==24.1.0\n").unwrap();

        let mut cache = RunCache::new();
        let first = cache.lock_entries(&path).unwrap();

        // A re-read would pick up the new content
        std::fs::write(&path, "black==23.0.0\n").unwrap();
        let second = cache.lock_entries(&path).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.get("black").unwrap().to_string(), "==24.1.0");
        assert_eq!(cache.stats(), (1, 1));
    }

    #[test]
    fn test_relative_and_absolute_paths_share_an_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".pre-commit-config.yaml");
        std::fs::write(&path, "repos:\n  - repo: x\n    rev: v1\n    hooks: [{id: x}]\n").unwrap();
        let indirect = dir.path().join(".").join(".pre-commit-config.yaml");

        let mut cache = RunCache::new();
        let first = cache.hook_registry(&path).unwrap();
        let second = cache.hook_registry(&indirect).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.get("x"), Some("v1"));
    }

    #[test]
    fn test_failures_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".pre-commit-config.yaml");

        let mut cache = RunCache::new();
        assert!(cache.hook_registry(&path).is_err());

        std::fs::write(&path, "repos: []\n").unwrap();
        assert!(cache.hook_registry(&path).unwrap().is_empty());
        assert_eq!(cache.stats(), (0, 2));
    }
}
