//! Builder for `uv` invocations with consistent error mapping.
//!
//! Every external call goes through [`UvCommand`], which captures stdout and
//! stderr, logs the command line, and turns a failed run into a typed
//! [`SyncError`]:
//!
//! - the program cannot be spawned because it does not exist, or it exits
//!   with status 127 → [`SyncError::ToolMissing`]
//! - any other nonzero status → [`SyncError::ToolFailed`], whose kind is
//!   derived from the status (1 → parsing, otherwise unknown)
//!
//! Commands run to completion; no timeout is applied and nothing is retried.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::core::SyncError;
use crate::core::error::EXIT_MISSING;

/// Fluent builder for one `uv` invocation.
///
/// # Examples
///
/// ```rust,no_run
/// use sync_uv_pre_commit::export::UvCommand;
///
/// # async fn example() -> anyhow::Result<()> {
/// let version = UvCommand::version("uv").execute_stdout().await?;
/// println!("{version}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct UvCommand {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    context: Option<String>,
}

/// Captured output of a successful invocation.
#[derive(Debug, Clone)]
pub struct UvCommandOutput {
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl UvCommand {
    /// Start a command for `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            context: None,
        }
    }

    /// Run the command from `dir`.
    #[must_use]
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Label used in log lines, for example `"export"`.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Arguments collected so far.
    #[must_use]
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// The full command line, for logging.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Operation name used in error messages, for example `uv export`.
    fn operation(&self) -> String {
        match self.args.first() {
            Some(first) if !first.starts_with('-') => format!("{} {first}", self.program),
            _ => self.program.clone(),
        }
    }

    /// Run the command and capture its output.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ToolMissing`] or [`SyncError::ToolFailed`] as
    /// described in the module docs, or an untyped error when the process
    /// could not be spawned for another reason.
    pub async fn execute(self) -> Result<UvCommandOutput> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }

        match &self.context {
            Some(ctx) => tracing::debug!("({ctx}) Executing command: {}", self.command_line()),
            None => tracing::debug!("Executing command: {}", self.command_line()),
        }

        let output = match cmd.output().await {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SyncError::ToolMissing {
                    program: self.program.clone(),
                    stderr: e.to_string(),
                }
                .into());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to execute {}", self.command_line()));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            let code = output.status.code();
            tracing::debug!("Command failed with exit code: {code:?}");
            if !stderr.is_empty() {
                tracing::debug!("Error: {}", stderr.trim());
            }

            let error = if code == Some(EXIT_MISSING) {
                SyncError::ToolMissing {
                    program: self.program.clone(),
                    stderr,
                }
            } else {
                SyncError::ToolFailed {
                    operation: self.operation(),
                    code,
                    stderr,
                }
            };
            return Err(error.into());
        }

        if !stdout.trim().is_empty() {
            tracing::trace!("{}", stdout.trim());
        }
        if !stderr.trim().is_empty() {
            tracing::debug!("{}", stderr.trim());
        }

        Ok(UvCommandOutput {
            stdout,
            stderr,
        })
    }

    /// Run the command and return its trimmed stdout.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn execute_stdout(self) -> Result<String> {
        let output = self.execute().await?;
        Ok(output.stdout.trim().to_string())
    }
}

// Convenience builders for the invocations this tool makes

impl UvCommand {
    /// `uv --version`
    pub fn version(program: impl Into<String>) -> Self {
        Self::new(program).arg("--version").with_context("version")
    }

    /// `uv export` writing a requirements listing without hashes to `output`.
    ///
    /// Only flags understood by every supported `uv` are used. The project
    /// and its workspace members come out as `-e` lines, which the lock
    /// parser skips.
    pub fn export(program: impl Into<String>, output: &Path) -> Self {
        Self::new(program)
            .args(["export", "--no-hashes"])
            .arg(format!("--output-file={}", output.display()))
            .with_context("export")
    }

    /// Add `--extra <name>` for each extra.
    #[must_use]
    pub fn extras<'a>(self, extras: impl IntoIterator<Item = &'a String>) -> Self {
        extras.into_iter().fold(self, |cmd, extra| cmd.args(["--extra", extra.as_str()]))
    }

    /// Add `--group <name>` for each group.
    #[must_use]
    pub fn groups<'a>(self, groups: impl IntoIterator<Item = &'a String>) -> Self {
        groups.into_iter().fold(self, |cmd, group| cmd.args(["--group", group.as_str()]))
    }

    /// Add `--no-dev` when `no_dev` holds.
    #[must_use]
    pub fn no_dev(self, no_dev: bool) -> Self {
        if no_dev { self.arg("--no-dev") } else { self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FailureKind;

    #[test]
    fn test_export_arguments() {
        let extras = vec!["lint".to_string()];
        let groups = vec!["typing".to_string(), "docs".to_string()];
        let cmd = UvCommand::export("uv", Path::new("/tmp/req.txt"))
            .extras(&extras)
            .groups(&groups)
            .no_dev(true);

        let args = cmd.get_args();
        assert_eq!(args[0], "export");
        assert_eq!(args[1], "--no-hashes");
        assert_eq!(args[2], "--output-file=/tmp/req.txt");
        assert_eq!(args.iter().filter(|a| *a == "--group").count(), 2);
        assert_eq!(args.last().map(String::as_str), Some("--no-dev"));

        let line = cmd.command_line();
        assert!(line.starts_with("uv export"));
        assert!(line.contains("--extra lint"));
        assert!(line.contains("--group typing --group docs"));
    }

    #[test]
    fn test_no_dev_false_adds_nothing() {
        let cmd = UvCommand::new("uv").no_dev(false);
        assert!(cmd.get_args().is_empty());
    }

    #[test]
    fn test_operation_name() {
        assert_eq!(UvCommand::export("uv", Path::new("r.txt")).operation(), "uv export");
        assert_eq!(UvCommand::version("uv").operation(), "uv");
    }

    #[tokio::test]
    async fn test_missing_program() {
        let err = UvCommand::new("definitely-not-a-real-uv-binary-7f3a")
            .arg("--version")
            .execute()
            .await
            .unwrap_err();
        let sync = err.downcast_ref::<SyncError>().unwrap();
        assert_eq!(sync.kind(), FailureKind::Missing);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_status_mapping() {
        for (status, kind) in [
            (127, FailureKind::Missing),
            (1, FailureKind::Parsing),
            (2, FailureKind::Unknown),
        ] {
            let err = UvCommand::new("sh")
                .arg("-c")
                .arg(format!("echo boom >&2; exit {status}"))
                .execute()
                .await
                .unwrap_err();
            let sync = err.downcast_ref::<SyncError>().unwrap();
            assert_eq!(sync.kind(), kind, "status {status}");
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdout_is_captured() {
        let out = UvCommand::new("sh")
            .args(["-c", "echo '  uv 0.4.30  '"])
            .execute_stdout()
            .await
            .unwrap();
        assert_eq!(out, "uv 0.4.30");
    }
}
