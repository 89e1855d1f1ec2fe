//! Scratch directory with RAII cleanup.
//!
//! The manifest copy and the exported lock artifact live in a [`ScratchDir`]
//! created under the system temporary directory (honouring `TMPDIR`). The
//! directory and everything in it is removed when the value is dropped, so
//! cleanup follows every exit path of a run, unwinding included.

use anyhow::{Context, Result};
use std::path::Path;

/// Prefix of every scratch directory name.
pub const SCRATCH_PREFIX: &str = "sync-uv-pre-commit-";

/// A uniquely named temporary directory removed on drop.
///
/// # Examples
///
/// ```rust,no_run
/// use sync_uv_pre_commit::utils::ScratchDir;
///
/// # fn example() -> anyhow::Result<()> {
/// let path = {
///     let scratch = ScratchDir::new()?;
///     std::fs::write(scratch.path().join("pyproject.toml"), "[project]\n")?;
///     scratch.path().to_path_buf()
/// };
/// assert!(!path.exists());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ScratchDir {
    inner: tempfile::TempDir,
}

impl ScratchDir {
    /// Create a fresh scratch directory.
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be created.
    pub fn new() -> Result<Self> {
        let inner = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir()
            .context("Failed to create scratch directory")?;
        tracing::debug!("Created scratch directory {}", inner.path().display());
        Ok(Self { inner })
    }

    /// Location of the directory; valid while `self` lives.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Remove the directory now, reporting any failure.
    ///
    /// Dropping the value removes it as well but ignores errors.
    ///
    /// # Errors
    ///
    /// Fails if the directory or part of its contents cannot be removed.
    pub fn close(self) -> Result<()> {
        let path = self.inner.path().to_path_buf();
        self.inner
            .close()
            .with_context(|| format!("Failed to remove scratch directory {}", path.display()))?;
        tracing::debug!("Removed scratch directory {}", path.display());
        Ok(())
    }
}
