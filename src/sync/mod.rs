//! The end-to-end check.
//!
//! A [`Syncer`] owns one [`SyncConfig`] and the [`RunCache`] for its run, and
//! drives the pipeline in order:
//!
//! 1. make sure `uv` exists and is new enough
//! 2. load the pre-commit hook registry
//! 3. copy the manifest into a fresh scratch directory and filter extras/groups
//! 4. export the lock artifact with `uv export`
//! 5. parse the lock artifact
//! 6. compare every requested spec and report the outcome
//!
//! Without any requested spec the run stops after step 2 and reports an empty
//! result. Any failure before step 6 aborts the run. The scratch directory is gone by
//! the time [`Syncer::run`] returns, whichever way it returns.

use std::future::Future;

use anyhow::{Result, anyhow};

use crate::cache::RunCache;
use crate::compare::{Comparator, Comparison};
use crate::config::SyncConfig;
use crate::export::{self, LockResolver};
use crate::manifest;
use crate::report;
use crate::utils::ScratchDir;

/// Runs one sync check.
#[derive(Debug)]
pub struct Syncer {
    config: SyncConfig,
    cache: RunCache,
}

impl Syncer {
    /// Create a syncer for `config` with an empty cache.
    #[must_use]
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            cache: RunCache::new(),
        }
    }

    /// Run the check and return the per-spec results.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`](crate::core::SyncError) describing the first
    /// fatal failure, or [`SyncError::Mismatch`](crate::core::SyncError::Mismatch)
    /// when at least one hook revision disagrees with the lock.
    pub async fn run(&mut self) -> Result<Comparison> {
        let tool_version =
            export::check_tool_version(&self.config.program, &self.config.minimum_tool_version)
                .await?;

        for spec in &self.config.dependencies {
            tracing::info!("Checking {spec}");
        }
        tracing::info!("Manifest: {}", self.config.pyproject.display());
        tracing::info!("Pre-commit config: {}", self.config.pre_commit.display());

        let hooks = self.cache.hook_registry(&self.config.pre_commit)?;

        // No specs: nothing to resolve
        if self.config.dependencies.is_empty() {
            let comparison = Comparison::default();
            report::report(&comparison)?;
            return Ok(comparison);
        }

        let scratch = ScratchDir::new()?;
        let lock = {
            let prepared = manifest::prepare(
                &self.config.pyproject,
                scratch.path(),
                &self.config.extras,
                &self.config.groups,
            )?;
            export::check_group_support(&tool_version, &prepared)?;
            let lock_path = LockResolver::new(&self.config.program, self.config.no_dev())
                .resolve(&prepared, scratch.path())
                .await?;
            self.cache.lock_entries(&lock_path)?
        };
        if let Err(e) = scratch.close() {
            tracing::warn!("{e:#}");
        }

        let comparison = Comparator::new(self.config.comparison).compare(
            &self.config.dependencies,
            &lock,
            &hooks,
        )?;
        report::report(&comparison)?;
        Ok(comparison)
    }
}

/// Drive `run` on its own task so that a panic inside it becomes an error.
///
/// The panicking task is unwound before this returns, dropping whatever it
/// owned, scratch directories included.
///
/// # Errors
///
/// Returns the error of `run`, or an uncategorized error when the task
/// panicked or was cancelled.
pub async fn run_isolated<F>(run: F) -> Result<()>
where
    F: Future<Output = Result<()>> + Send + 'static,
{
    match tokio::spawn(run).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => Err(anyhow!("Unexpected internal error (panic)")),
        Err(e) => Err(anyhow!("Run aborted: {e}")),
    }
}

#[cfg(all(test, unix))]
mod tests;
