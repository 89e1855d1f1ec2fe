//! Error handling for sync-uv-pre-commit
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** ([`SyncError`]) so each pipeline stage can say
//!    precisely what went wrong
//! 2. **Exit-code fidelity**: every error belongs to exactly one [`FailureKind`],
//!    and that kind alone decides the process exit status
//!
//! # Failure kinds and exit codes
//!
//! | Kind                         | Exit | Typical cause                                     |
//! |------------------------------|------|---------------------------------------------------|
//! | [`FailureKind::Parsing`]     | 1    | bad manifest, config, lock line, unknown package  |
//! | [`FailureKind::Mismatch`]    | 2    | hook revision outside the resolved specifier      |
//! | [`FailureKind::Version`]     | 3    | `uv` older than the supported minimum             |
//! | [`FailureKind::Missing`]     | 127  | `uv` not installed or exited with 127             |
//! | [`FailureKind::Unknown`]     | 999  | anything else, including panics                   |
//!
//! Use [`user_friendly_error`] to turn any [`anyhow::Error`] into an
//! [`ErrorContext`] carrying the kind, details and a suggestion.
//!
//! # Examples
//!
//! ```rust,no_run
//! use sync_uv_pre_commit::core::{FailureKind, SyncError, user_friendly_error};
//!
//! let error = SyncError::PackageNotFound { name: "black".to_string() };
//! assert_eq!(error.kind(), FailureKind::Parsing);
//!
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! assert_eq!(ctx.exit_code(), 1);
//! ```

use crate::logging::CRITICAL_TARGET;
use std::fmt;
use thiserror::Error;

/// Exit status reported by the external tool when it could not be found.
pub const EXIT_MISSING: i32 = 127;

/// Exit status reported by the external tool when it failed to parse its input.
pub const EXIT_PARSING: i32 = 1;

/// Category of a run-terminating failure.
///
/// Each category maps to one process exit code via [`FailureKind::exit_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Malformed manifest, pre-commit config or lock content, or a lookup miss
    Parsing,
    /// A resolved version disagrees with a pinned hook revision
    Mismatch,
    /// The external tool is older than the supported minimum
    Version,
    /// The external tool is not installed
    Missing,
    /// Uncategorized failure
    Unknown,
}

impl FailureKind {
    /// Process exit code for this failure kind.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Parsing => 1,
            Self::Mismatch => 2,
            Self::Version => 3,
            Self::Missing => 127,
            Self::Unknown => 999,
        }
    }

    /// Classify the exit status of a failed external command.
    ///
    /// `None` means the process was terminated by a signal.
    #[must_use]
    pub const fn from_exit_status(code: Option<i32>) -> Self {
        match code {
            Some(EXIT_MISSING) => Self::Missing,
            Some(EXIT_PARSING) => Self::Parsing,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Parsing => "parsing",
            Self::Mismatch => "mismatch",
            Self::Version => "version",
            Self::Missing => "missing",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// The main error type for sync-uv-pre-commit operations.
///
/// Variants are grouped by the pipeline stage that raises them:
///
/// ## External tool
/// - [`ToolMissing`](SyncError::ToolMissing) - `uv` absent from `PATH` or exited with 127
/// - [`ToolFailed`](SyncError::ToolFailed) - `uv` exited nonzero; kind follows the status
/// - [`ToolVersionUnsupported`](SyncError::ToolVersionUnsupported) - `uv` too old
///
/// ## Input parsing
/// - [`ManifestParse`](SyncError::ManifestParse) - `pyproject.toml` unreadable or invalid
/// - [`PreCommitParse`](SyncError::PreCommitParse) - `.pre-commit-config.yaml` invalid
/// - [`LockfileParse`](SyncError::LockfileParse) - a requirement line could not be parsed
/// - [`InvalidDependencySpec`](SyncError::InvalidDependencySpec) - bad `-a` token
///
/// ## Lookups
/// - [`PackageNotFound`](SyncError::PackageNotFound) - package missing from the lock
/// - [`HookNotFound`](SyncError::HookNotFound) - hook id missing from the config
///
/// ## Comparison
/// - [`Mismatch`](SyncError::Mismatch) - one or more hooks drifted
#[derive(Error, Debug, Clone)]
pub enum SyncError {
    /// The external resolver could not be found or reported itself missing
    #[error("{program} is not installed or not found in PATH")]
    ToolMissing {
        /// Program that was invoked
        program: String,
        /// Captured standard error, possibly empty
        stderr: String,
    },

    /// The external resolver exited with a nonzero status
    #[error("{operation} failed with exit status {}", describe_status(.code))]
    ToolFailed {
        /// Command line that failed, for example `uv export`
        operation: String,
        /// Raw exit code, `None` when killed by a signal
        code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// The external resolver is older than the minimum supported version
    #[error("uv version {found} is not supported (requires >= {minimum})")]
    ToolVersionUnsupported {
        /// Version reported by `uv --version`
        found: String,
        /// Minimum supported version
        minimum: String,
    },

    /// The project manifest could not be read or rewritten
    #[error("Invalid manifest {file}: {reason}")]
    ManifestParse {
        /// Manifest path
        file: String,
        /// Why parsing failed
        reason: String,
    },

    /// The pre-commit configuration could not be loaded
    #[error("Failed to load pre-commit config {file}: {reason}")]
    PreCommitParse {
        /// Configuration path
        file: String,
        /// Why loading failed
        reason: String,
    },

    /// A line in the exported requirements could not be parsed
    #[error("Invalid requirement on line {line} of {file}: {reason}")]
    LockfileParse {
        /// Lock artifact path
        file: String,
        /// One-based line number
        line: usize,
        /// Why the line was rejected
        reason: String,
    },

    /// A requested package is not present in the resolved lock
    #[error("Package {name} not found in lock file")]
    PackageNotFound {
        /// Requested package name
        name: String,
    },

    /// A requested hook id is not declared with a revision in the config
    #[error("Hook {hook_id} not found in pre-commit config")]
    HookNotFound {
        /// Requested hook id
        hook_id: String,
    },

    /// A `name[:hook_id[:prefix[:suffix]]]` token could not be parsed
    #[error("Invalid dependency argument '{token}': {reason}")]
    InvalidDependencySpec {
        /// Raw token
        token: String,
        /// Why the token was rejected
        reason: String,
    },

    /// A version specifier could not be parsed
    #[error("Invalid version specifier: {specifier}")]
    InvalidSpecifier {
        /// Raw specifier text
        specifier: String,
    },

    /// A version string could not be parsed
    #[error("Invalid version: {version}")]
    InvalidVersion {
        /// Raw version text
        version: String,
    },

    /// One or more hook revisions do not match the resolved versions
    #[error("{failures} hook(s) out of sync with the resolved dependencies")]
    Mismatch {
        /// Number of failed comparisons
        failures: usize,
    },

    /// Uncategorized failure
    #[error("{message}")]
    Other {
        /// Description of the failure
        message: String,
    },
}

impl SyncError {
    /// The failure category, and therefore the exit code, of this error.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::ToolMissing { .. } => FailureKind::Missing,
            Self::ToolFailed { code, .. } => FailureKind::from_exit_status(*code),
            Self::ToolVersionUnsupported { .. } => FailureKind::Version,
            Self::ManifestParse { .. }
            | Self::PreCommitParse { .. }
            | Self::LockfileParse { .. }
            | Self::PackageNotFound { .. }
            | Self::HookNotFound { .. }
            | Self::InvalidDependencySpec { .. }
            | Self::InvalidSpecifier { .. }
            | Self::InvalidVersion { .. } => FailureKind::Parsing,
            Self::Mismatch { .. } => FailureKind::Mismatch,
            Self::Other { .. } => FailureKind::Unknown,
        }
    }

    /// Whether the failure is logged as critical rather than as an error.
    #[must_use]
    pub const fn is_critical(&self) -> bool {
        matches!(
            self,
            Self::PreCommitParse { .. } | Self::ToolVersionUnsupported { .. } | Self::Other { .. }
        )
    }
}

fn describe_status(code: &Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |c| c.to_string())
}

/// Error wrapper with user-facing details and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// The underlying error
    pub error: SyncError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wrap an error without details or suggestion.
    #[must_use]
    pub const fn new(error: SyncError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Attach a suggestion.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach details.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Failure category of the wrapped error.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        self.error.kind()
    }

    /// Exit code the process should terminate with.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.error.kind().exit_code()
    }

    /// Log the error through the active tracing dispatcher.
    ///
    /// Mismatches were already itemized by the reporter, so they are not
    /// repeated here.
    pub fn log(&self) {
        if matches!(self.error, SyncError::Mismatch { .. }) {
            return;
        }
        if self.error.is_critical() {
            tracing::error!(target: CRITICAL_TARGET, "{}", self.error);
            if let Some(details) = &self.details {
                tracing::error!(target: CRITICAL_TARGET, "details: {details}");
            }
        } else {
            tracing::error!("{}", self.error);
            if let Some(details) = &self.details {
                tracing::error!("details: {details}");
            }
        }
        if let Some(suggestion) = &self.suggestion {
            tracing::info!("suggestion: {suggestion}");
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with tailored suggestions.
///
/// [`SyncError`]s keep their kind. Anything else, including I/O failures
/// that escaped a stage without being classified, becomes
/// [`FailureKind::Unknown`] with the full cause chain in the message.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(sync_error) = error.downcast_ref::<SyncError>() {
        return create_error_context(sync_error.clone());
    }

    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(SyncError::Other { message })
}

fn create_error_context(error: SyncError) -> ErrorContext {
    match &error {
        SyncError::ToolMissing { stderr, .. } => {
            let ctx = ErrorContext::new(error.clone()).with_suggestion(
                "Install uv: https://docs.astral.sh/uv/getting-started/installation/",
            );
            if stderr.trim().is_empty() {
                ctx
            } else {
                ctx.with_details(stderr.trim().to_string())
            }
        }
        SyncError::ToolFailed { stderr, .. } => {
            let ctx = ErrorContext::new(error.clone());
            if stderr.trim().is_empty() {
                ctx
            } else {
                ctx.with_details(stderr.trim().to_string())
            }
        }
        SyncError::ToolVersionUnsupported { minimum, .. } => ErrorContext::new(error.clone())
            .with_suggestion(format!("Upgrade uv to {minimum} or newer with `uv self update`")),
        SyncError::PackageNotFound { .. } => ErrorContext::new(error.clone()).with_suggestion(
            "Check the package name, and pass the extras (-e) or groups (-g) that pull it in",
        ),
        SyncError::HookNotFound { .. } => ErrorContext::new(error.clone()).with_suggestion(
            "Check the hook id; only hooks from repositories with a `rev` can be checked",
        ),
        SyncError::InvalidDependencySpec { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Use the form name[:hook_id[:prefix[:suffix]]]"),
        _ => ErrorContext::new(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(FailureKind::Parsing.exit_code(), 1);
        assert_eq!(FailureKind::Mismatch.exit_code(), 2);
        assert_eq!(FailureKind::Version.exit_code(), 3);
        assert_eq!(FailureKind::Missing.exit_code(), 127);
        assert_eq!(FailureKind::Unknown.exit_code(), 999);
    }

    #[test]
    fn test_tool_exit_status_mapping() {
        assert_eq!(FailureKind::from_exit_status(Some(127)), FailureKind::Missing);
        assert_eq!(FailureKind::from_exit_status(Some(1)), FailureKind::Parsing);
        assert_eq!(FailureKind::from_exit_status(Some(2)), FailureKind::Unknown);
        assert_eq!(FailureKind::from_exit_status(None), FailureKind::Unknown);
    }

    #[test]
    fn test_tool_failed_kind_follows_status() {
        let failed = |code| SyncError::ToolFailed {
            operation: "uv export".to_string(),
            code,
            stderr: String::new(),
        };
        assert_eq!(failed(Some(127)).kind(), FailureKind::Missing);
        assert_eq!(failed(Some(1)).kind(), FailureKind::Parsing);
        assert_eq!(failed(Some(101)).kind(), FailureKind::Unknown);
    }

    #[test]
    fn test_critical_failures() {
        let other = SyncError::Other {
            message: "boom".to_string(),
        };
        assert!(other.is_critical());
        let old = SyncError::ToolVersionUnsupported {
            found: "0.4.6".to_string(),
            minimum: "0.4.7".to_string(),
        };
        assert!(old.is_critical());
        assert!(!SyncError::Mismatch { failures: 1 }.is_critical());
        let missing = SyncError::PackageNotFound {
            name: "black".to_string(),
        };
        assert!(!missing.is_critical());
    }

    #[test]
    fn test_user_friendly_error_keeps_kind() {
        let error = anyhow::Error::from(SyncError::HookNotFound {
            hook_id: "ruff".to_string(),
        });
        let ctx = user_friendly_error(error);
        assert_eq!(ctx.kind(), FailureKind::Parsing);
        assert!(ctx.suggestion.is_some());
    }

    #[test]
    fn test_user_friendly_error_through_context() {
        use anyhow::Context;

        let result: anyhow::Result<()> = Err(SyncError::ToolVersionUnsupported {
            found: "0.3.0".to_string(),
            minimum: "0.4.7".to_string(),
        })
        .context("checking uv");
        let ctx = user_friendly_error(result.unwrap_err());
        assert_eq!(ctx.exit_code(), 3);
    }

    #[test]
    fn test_foreign_error_is_unknown() {
        let io = std::io::Error::other("disk on fire");
        let ctx = user_friendly_error(anyhow::Error::from(io).context("copying manifest"));
        assert_eq!(ctx.kind(), FailureKind::Unknown);
        assert!(ctx.to_string().contains("disk on fire"));
    }

    #[test]
    fn test_error_context_display() {
        let ctx = ErrorContext::new(SyncError::PackageNotFound {
            name: "black".to_string(),
        })
        .with_details("looked in requirements.txt")
        .with_suggestion("add it");
        let text = ctx.to_string();
        assert!(text.contains("Package black not found in lock file"));
        assert!(text.contains("Details: looked in requirements.txt"));
        assert!(text.contains("Suggestion: add it"));
    }
}
