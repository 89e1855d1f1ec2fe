//! Lock resolution through `uv export`.
//!
//! Resolution is delegated entirely to `uv`: the prepared manifest copy is
//! exported as a plain requirements listing next to it in the scratch
//! directory, and that file is the lock artifact handed to
//! [`crate::lockfile`]. Before anything runs, [`check_tool_version`] makes sure
//! the installed `uv` is new enough to understand the export flags.

mod command_builder;

pub use command_builder::{UvCommand, UvCommandOutput};

use crate::core::SyncError;
use crate::manifest::PreparedManifest;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// File name of the exported lock artifact inside the scratch directory.
pub const LOCK_FILE_NAME: &str = "requirements.txt";

/// Oldest `uv` release whose `export` accepts `--group`.
pub const GROUPS_MINIMUM_VERSION: semver::Version = semver::Version::new(0, 4, 27);

/// Locate `program` on `PATH`.
///
/// # Errors
///
/// Returns [`SyncError::ToolMissing`] when it cannot be found.
pub fn locate(program: &str) -> Result<PathBuf, SyncError> {
    which::which(program).map_err(|e| SyncError::ToolMissing {
        program: program.to_string(),
        stderr: e.to_string(),
    })
}

/// Extract the version from `uv --version` output such as
/// `uv 0.4.30 (61ed2a236 2024-11-04)`.
fn parse_tool_version(output: &str) -> Result<semver::Version, SyncError> {
    let token = output.split_whitespace().nth(1).ok_or_else(|| SyncError::Other {
        message: format!("Unrecognized version output: '{output}'"),
    })?;
    semver::Version::parse(token.trim_start_matches('v')).map_err(|e| SyncError::Other {
        message: format!("Unrecognized version '{token}': {e}"),
    })
}

/// Ensure `program` exists and reports at least `minimum`.
///
/// # Errors
///
/// Returns [`SyncError::ToolMissing`] when the program is absent,
/// [`SyncError::ToolVersionUnsupported`] when it is too old, or
/// [`SyncError::Other`] when its version cannot be read.
pub async fn check_tool_version(
    program: &str,
    minimum: &semver::Version,
) -> Result<semver::Version> {
    let resolved = locate(program)?;
    tracing::debug!("Using {} at {}", program, resolved.display());

    let output = UvCommand::version(resolved.display().to_string()).execute_stdout().await?;
    let found = parse_tool_version(&output)?;
    tracing::debug!("{program} version: {found}");

    if found < *minimum {
        return Err(SyncError::ToolVersionUnsupported {
            found: found.to_string(),
            minimum: minimum.to_string(),
        }
        .into());
    }
    Ok(found)
}

/// Reject dependency groups when `found` is too old to export them.
///
/// # Errors
///
/// Returns [`SyncError::ToolVersionUnsupported`] naming
/// [`GROUPS_MINIMUM_VERSION`] when the manifest selects any group.
pub fn check_group_support(
    found: &semver::Version,
    manifest: &PreparedManifest,
) -> Result<(), SyncError> {
    if manifest.groups.is_empty() || *found >= GROUPS_MINIMUM_VERSION {
        return Ok(());
    }
    Err(SyncError::ToolVersionUnsupported {
        found: found.to_string(),
        minimum: GROUPS_MINIMUM_VERSION.to_string(),
    })
}

/// Runs `uv export` for a prepared manifest.
#[derive(Debug, Clone)]
pub struct LockResolver {
    program: String,
    no_dev: bool,
}

impl LockResolver {
    /// Resolver invoking `program`, excluding development groups when `no_dev`.
    pub fn new(program: impl Into<String>, no_dev: bool) -> Self {
        Self {
            program: program.into(),
            no_dev,
        }
    }

    /// Command that would export `manifest` into `scratch`.
    #[must_use]
    pub fn command(&self, manifest: &PreparedManifest, scratch: &Path) -> UvCommand {
        UvCommand::export(&self.program, &scratch.join(LOCK_FILE_NAME))
            .extras(&manifest.extras)
            .groups(&manifest.groups)
            .no_dev(self.no_dev)
            .current_dir(scratch)
    }

    /// Export `manifest` and return the path of the lock artifact.
    ///
    /// # Errors
    ///
    /// Propagates the typed failure of the `uv` invocation, see [`UvCommand::execute`].
    pub async fn resolve(&self, manifest: &PreparedManifest, scratch: &Path) -> Result<PathBuf> {
        let command = self.command(manifest, scratch);
        tracing::info!("Running command:\n    {}", command.command_line());
        command.execute().await?;
        Ok(scratch.join(LOCK_FILE_NAME))
    }
}
