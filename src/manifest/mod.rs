//! Project manifest (`pyproject.toml`) preparation.
//!
//! Resolution runs against a copy of the manifest inside the scratch
//! directory, never the project itself. The copy is rewritten so `uv` can
//! resolve it in isolation:
//!
//! - a `version` listed in `[project] dynamic` is replaced by the fixed
//!   placeholder [`PLACEHOLDER_VERSION`], so no build backend has to run
//! - requested extras are kept only if `[project.optional-dependencies]`
//!   declares them, and requested groups only if `[dependency-groups]` does
//!
//! Unknown extras and groups are dropped without error. One hook invocation
//! can then pass the same `-e`/`-g` flags to projects that do not all
//! declare them.
//!
//! Edits go through `toml_edit` so the rest of the file (comments, ordering,
//! tool tables) reaches `uv` unchanged.

use crate::core::SyncError;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use toml_edit::{DocumentMut, Item, value};

/// Version written in place of a dynamic one.
pub const PLACEHOLDER_VERSION: &str = "0.1.0";

/// File name of the rewritten manifest inside the scratch directory.
pub const MANIFEST_FILE_NAME: &str = "pyproject.toml";

/// A rewritten manifest ready for resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedManifest {
    /// Path of the rewritten copy
    pub path: PathBuf,
    /// Requested extras the manifest declares, in request order
    pub extras: Vec<String>,
    /// Requested groups the manifest declares, in request order
    pub groups: Vec<String>,
}

/// An editable `pyproject.toml`.
#[derive(Debug, Clone)]
pub struct Manifest {
    doc: DocumentMut,
}

impl Manifest {
    /// Parse manifest text; `file` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ManifestParse`] for invalid TOML.
    pub fn parse(content: &str, file: &str) -> Result<Self, SyncError> {
        let doc = content.parse::<DocumentMut>().map_err(|e| SyncError::ManifestParse {
            file: file.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { doc })
    }

    /// Read and parse a manifest.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ManifestParse`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let file = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| SyncError::ManifestParse {
            file: file.clone(),
            reason: e.to_string(),
        })?;
        Self::parse(&content, &file)
    }

    /// Extras declared under `[project.optional-dependencies]`.
    #[must_use]
    pub fn declared_extras(&self) -> BTreeSet<String> {
        self.doc
            .get("project")
            .and_then(|project| project.get("optional-dependencies"))
            .and_then(Item::as_table_like)
            .map(|table| table.iter().map(|(key, _)| key.to_string()).collect())
            .unwrap_or_default()
    }

    /// Groups declared under `[dependency-groups]`.
    #[must_use]
    pub fn declared_groups(&self) -> BTreeSet<String> {
        self.doc
            .get("dependency-groups")
            .and_then(Item::as_table_like)
            .map(|table| table.iter().map(|(key, _)| key.to_string()).collect())
            .unwrap_or_default()
    }

    /// Replace a dynamic `version` with [`PLACEHOLDER_VERSION`].
    ///
    /// Returns whether the manifest changed.
    pub fn remove_dynamic_version(&mut self) -> bool {
        let Some(project) = self.doc.get_mut("project").and_then(Item::as_table_like_mut) else {
            return false;
        };
        let Some(dynamic) = project.get_mut("dynamic").and_then(Item::as_array_mut) else {
            return false;
        };
        let before = dynamic.len();
        dynamic.retain(|entry| entry.as_str() != Some("version"));
        if dynamic.len() == before {
            return false;
        }
        dynamic.fmt();
        project.insert("version", value(PLACEHOLDER_VERSION));
        true
    }

    /// Serialized manifest.
    #[must_use]
    pub fn to_toml_string(&self) -> String {
        self.doc.to_string()
    }
}

/// Keep the requested names present in `declared`, dropping duplicates.
fn filter_declared(requested: &[String], declared: &BTreeSet<String>, what: &str) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();
    for name in requested {
        if !declared.contains(name) {
            tracing::debug!("Ignoring {what} '{name}': not declared in the manifest");
            continue;
        }
        if !kept.contains(name) {
            kept.push(name.clone());
        }
    }
    kept
}

/// Write a resolvable copy of `pyproject` into `scratch` and filter the
/// requested extras and groups down to the declared ones.
///
/// # Errors
///
/// Returns [`SyncError::ManifestParse`] when the manifest cannot be read or
/// parsed, or an I/O error when the copy cannot be written.
pub fn prepare(
    pyproject: &Path,
    scratch: &Path,
    extras: &[String],
    groups: &[String],
) -> Result<PreparedManifest> {
    let mut manifest = Manifest::load(pyproject)?;
    if manifest.remove_dynamic_version() {
        tracing::debug!("Replaced dynamic version with {PLACEHOLDER_VERSION}");
    }

    let extras = filter_declared(extras, &manifest.declared_extras(), "extra");
    let groups = filter_declared(groups, &manifest.declared_groups(), "group");

    let path = scratch.join(MANIFEST_FILE_NAME);
    std::fs::write(&path, manifest.to_toml_string())
        .with_context(|| format!("Failed to write manifest copy: {}", path.display()))?;

    Ok(PreparedManifest {
        path,
        extras,
        groups,
    })
}
