//! Run configuration.
//!
//! [`SyncConfig`] collects every knob a single sync run needs, so the pipeline
//! never reads flags or environment variables on its own. The CLI builds one
//! through [`Cli::build_config`](crate::cli::Cli::build_config); tests build
//! them directly.
//!
//! # Environment
//!
//! - `SYNC_UV_PRE_COMMIT_UV`: path or name of the `uv` executable (default `uv`)

use crate::compare::DependencySpec;
use std::path::PathBuf;

/// Environment variable overriding the `uv` executable.
pub const UV_PROGRAM_ENV: &str = "SYNC_UV_PRE_COMMIT_UV";

/// Default `uv` executable name.
pub const DEFAULT_UV_PROGRAM: &str = "uv";

/// Oldest `uv` release supporting `uv export --output-file`.
pub const MINIMUM_UV_VERSION: semver::Version = semver::Version::new(0, 4, 7);

/// Default manifest path.
pub const DEFAULT_PYPROJECT: &str = "pyproject.toml";

/// Default pre-commit configuration path.
pub const DEFAULT_PRE_COMMIT: &str = ".pre-commit-config.yaml";

/// How development dependencies are folded into the resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DevDependencies {
    /// Resolve the default `dev` group along with the project
    #[default]
    Include,
    /// Pass `--no-dev` so only runtime dependencies are resolved
    Exclude,
}

/// Rule used to decide whether a hook revision matches the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComparisonMode {
    /// The stripped revision must satisfy the resolved specifier
    #[default]
    Specifier,
    /// `prefix + pinned version + suffix` must equal the revision verbatim
    Exact,
}

/// Everything a sync run needs to know.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Dependencies to check, in reporting order
    pub dependencies: Vec<DependencySpec>,
    /// Project manifest
    pub pyproject: PathBuf,
    /// Pre-commit configuration
    pub pre_commit: PathBuf,
    /// Requested optional-dependency extras
    pub extras: Vec<String>,
    /// Requested dependency groups
    pub groups: Vec<String>,
    /// Development dependency handling
    pub dev: DevDependencies,
    /// Comparison rule
    pub comparison: ComparisonMode,
    /// `uv` executable
    pub program: String,
    /// Minimum supported `uv` version
    pub minimum_tool_version: semver::Version,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            dependencies: Vec::new(),
            pyproject: PathBuf::from(DEFAULT_PYPROJECT),
            pre_commit: PathBuf::from(DEFAULT_PRE_COMMIT),
            extras: Vec::new(),
            groups: Vec::new(),
            dev: DevDependencies::default(),
            comparison: ComparisonMode::default(),
            program: std::env::var(UV_PROGRAM_ENV)
                .ok()
                .filter(|program| !program.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_UV_PROGRAM.to_string()),
            minimum_tool_version: MINIMUM_UV_VERSION,
        }
    }
}

impl SyncConfig {
    /// Whether `--no-dev` should be passed to the resolver.
    #[must_use]
    pub fn no_dev(&self) -> bool {
        self.dev == DevDependencies::Exclude
    }
}
