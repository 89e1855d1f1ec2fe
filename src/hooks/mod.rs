//! Pre-commit configuration loading.
//!
//! Only the parts of `.pre-commit-config.yaml` that pin versions matter here:
//!
//! ```yaml
//! repos:
//!   - repo: https://github.com/psf/black-pre-commit-mirror
//!     rev: 24.1.0
//!     hooks:
//!       - id: black
//!   - repo: local
//!     hooks:
//!       - id: pytest
//!         entry: pytest
//!         language: system
//! ```
//!
//! Every hook of a repository block that carries a `rev` is recorded with
//! that revision. Blocks without one (`local`, `meta`) are skipped. Any
//! structural problem is a parsing failure: a partially loaded registry is
//! never returned.

use crate::core::SyncError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Top-level pre-commit configuration, reduced to what is validated here.
#[derive(Debug, Clone, Deserialize)]
pub struct PreCommitConfig {
    /// Repository blocks in declaration order
    pub repos: Vec<RepoBlock>,
}

/// One entry of `repos:`.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoBlock {
    /// Repository URL, or `local` / `meta`
    pub repo: String,
    /// Pinned revision, absent for `local` / `meta`
    #[serde(default)]
    pub rev: Option<String>,
    /// Hooks taken from this repository
    #[serde(default)]
    pub hooks: Vec<HookRef>,
}

/// A hook reference inside a repository block.
#[derive(Debug, Clone, Deserialize)]
pub struct HookRef {
    /// Hook id
    pub id: String,
}

impl PreCommitConfig {
    /// Parse configuration text; `file` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::PreCommitParse`] for invalid YAML, a missing
    /// `repos` list, a block without `repo`, a hook without `id`, or a
    /// non-string `rev`.
    pub fn parse(content: &str, file: &str) -> Result<Self, SyncError> {
        let invalid = |reason: String| SyncError::PreCommitParse {
            file: file.to_string(),
            reason,
        };

        let config: Self = serde_yaml::from_str(content).map_err(|e| invalid(e.to_string()))?;
        for block in &config.repos {
            if block.repo.trim().is_empty() {
                return Err(invalid("repository block with an empty `repo`".to_string()));
            }
            if block.hooks.iter().any(|hook| hook.id.trim().is_empty()) {
                return Err(invalid(format!("hook with an empty `id` in {}", block.repo)));
            }
        }
        Ok(config)
    }

    /// Read and parse a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::PreCommitParse`] when the file cannot be read or
    /// is invalid.
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let file = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| SyncError::PreCommitParse {
            file: file.clone(),
            reason: e.to_string(),
        })?;
        Self::parse(&content, &file)
    }

    /// Map every pinned hook to its block's revision.
    #[must_use]
    pub fn registry(&self) -> HookRegistry {
        self.repos
            .iter()
            .filter_map(|block| block.rev.as_ref().map(|rev| (block, rev)))
            .flat_map(|(block, rev)| {
                block.hooks.iter().map(move |hook| (hook.id.clone(), rev.clone()))
            })
            .collect()
    }
}

/// Hook ids mapped to the revision of the repository that provides them.
///
/// When the same id appears in several pinned blocks, the last one wins.
#[derive(Debug, Clone, Default)]
pub struct HookRegistry {
    hooks: BTreeMap<String, String>,
}

impl HookRegistry {
    /// Load the registry straight from a configuration file.
    ///
    /// # Errors
    ///
    /// See [`PreCommitConfig::load`].
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        Ok(PreCommitConfig::load(path)?.registry())
    }

    /// Revision pinned for `hook_id`.
    #[must_use]
    pub fn get(&self, hook_id: &str) -> Option<&str> {
        self.hooks.get(hook_id).map(String::as_str)
    }

    /// Revision pinned for `hook_id`, as a typed lookup failure when absent.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::HookNotFound`] when no pinned block declares the hook.
    pub fn revision(&self, hook_id: &str) -> Result<&str, SyncError> {
        self.get(hook_id).ok_or_else(|| SyncError::HookNotFound {
            hook_id: hook_id.to_string(),
        })
    }

    /// Number of pinned hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether no hook is pinned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl FromIterator<(String, String)> for HookRegistry {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            hooks: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r"
default_stages: [pre-commit]
repos:
  - repo: https://github.com/psf/black-pre-commit-mirror
    rev: 24.1.0
    hooks:
      - id: black
      - id: black-jupyter
  - repo: https://github.com/astral-sh/ruff-pre-commit
    rev: v0.5.1
    hooks:
      - id: ruff
        args: [--fix]
      - id: ruff-format
  - repo: local
    hooks:
      - id: pytest
        name: pytest
        entry: pytest
        language: system
  - repo: meta
    hooks:
      - id: check-hooks-apply
";

    fn registry(content: &str) -> HookRegistry {
        PreCommitConfig::parse(content, ".pre-commit-config.yaml").unwrap().registry()
    }

    #[test]
    fn test_pinned_hooks_are_registered() {
        let hooks = registry(CONFIG);
        assert_eq!(hooks.len(), 4);
        assert_eq!(hooks.get("black"), Some("24.1.0"));
        assert_eq!(hooks.get("black-jupyter"), Some("24.1.0"));
        assert_eq!(hooks.get("ruff"), Some("v0.5.1"));
        assert_eq!(hooks.get("ruff-format"), Some("v0.5.1"));
    }

    #[test]
    fn test_blocks_without_rev_are_skipped() {
        let hooks = registry(CONFIG);
        assert_eq!(hooks.get("pytest"), None);
        assert_eq!(hooks.get("check-hooks-apply"), None);
    }

    #[test]
    fn test_remote_block_without_rev_is_skipped() {
        let hooks =
            registry("repos:\n  - repo: https://example.com/x\n    hooks:\n      - id: x\n");
        assert!(hooks.is_empty());
    }

    #[test]
    fn test_later_block_wins_for_duplicate_ids() {
        let hooks = registry(concat!(
            "repos:\n",
            "  - repo: a\n    rev: '1.0'\n    hooks: [{id: fmt}]\n",
            "  - repo: b\n    rev: '2.0'\n    hooks: [{id: fmt}]\n",
        ));
        assert_eq!(hooks.get("fmt"), Some("2.0"));
    }

    #[test]
    fn test_revision_lookup_failure() {
        let err = registry(CONFIG).revision("isort").unwrap_err();
        assert!(matches!(err, SyncError::HookNotFound { hook_id } if hook_id == "isort"));
    }

    #[test]
    fn test_invalid_configs() {
        for content in [
            "repos: [",
            "default_stages: [pre-commit]\n",
            "repos:\n  - rev: v1\n    hooks: [{id: x}]\n",
            "repos:\n  - repo: x\n    rev: v1\n    hooks: [{name: x}]\n",
            "repos:\n  - repo: x\n    rev: [1, 2]\n    hooks: [{id: x}]\n",
            "repos:\n  - repo: ''\n    rev: v1\n    hooks: [{id: x}]\n",
        ] {
            let err = PreCommitConfig::parse(content, "cfg.yaml").unwrap_err();
            assert!(matches!(err, SyncError::PreCommitParse { .. }), "{content:?}");
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = HookRegistry::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, SyncError::PreCommitParse { .. }));
    }
}
