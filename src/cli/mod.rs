//! Command-line interface.
//!
//! The tool is meant to run as a pre-commit hook, so it has a single command
//! and no subcommands:
//!
//! ```bash
//! sync-uv-pre-commit -a black:black:v -a ruff:ruff:v -e lint -g typing
//! ```
//!
//! Any trailing file names pre-commit appends are accepted and ignored.
//! [`Cli::build_config`] turns the flags into a [`SyncConfig`], validating
//! every `-a` token before an external command runs.

use clap::Parser;
use std::path::PathBuf;

use crate::compare::DependencySpec;
use crate::config::{
    ComparisonMode, DEFAULT_PRE_COMMIT, DEFAULT_PYPROJECT, DevDependencies, SyncConfig,
};
use crate::core::SyncError;
use crate::logging::LogLevel;

/// Check pre-commit hook revisions against the versions `uv` resolves.
#[derive(Parser, Debug)]
#[command(
    name = "sync-uv-pre-commit",
    about = "Check pre-commit hook revisions against the dependency versions resolved by uv",
    version,
    author
)]
pub struct Cli {
    /// Package to check, as `name[:hook_id[:prefix[:suffix]]]`.
    ///
    /// The hook id defaults to the package name. The prefix and suffix are
    /// stripped from the hook's `rev` before comparing, so `black:black:v`
    /// accepts `rev: v24.1.0` for a lock pin of `black==24.1.0`.
    #[arg(short = 'a', long = "args", value_name = "SPEC")]
    pub args: Vec<String>,

    /// Project manifest.
    #[arg(short = 'p', long, default_value = DEFAULT_PYPROJECT)]
    pub pyproject: PathBuf,

    /// Pre-commit configuration.
    #[arg(short = 'P', long = "pre-commit", default_value = DEFAULT_PRE_COMMIT)]
    pub pre_commit: PathBuf,

    /// Log level: DEBUG, INFO, WARNING, ERROR, CRITICAL, or a numeric level.
    ///
    /// `RUST_LOG`, when set, takes precedence.
    #[arg(short = 'l', long = "log-level", default_value = "INFO", value_name = "LEVEL")]
    pub log_level: LogLevel,

    /// Optional-dependency extra to resolve; ignored if the manifest does not declare it.
    #[arg(short = 'e', long = "extra", value_name = "EXTRA")]
    pub extras: Vec<String>,

    /// Dependency group to resolve; ignored if the manifest does not declare it.
    #[arg(short = 'g', long = "group", value_name = "GROUP")]
    pub groups: Vec<String>,

    /// Leave the development dependencies out of the resolution.
    #[arg(long)]
    pub no_dev: bool,

    /// Require `prefix + pinned version + suffix` to equal the revision exactly.
    #[arg(long)]
    pub exact: bool,

    /// File names passed by pre-commit; ignored.
    #[arg(value_name = "FILES", hide = true)]
    pub files: Vec<PathBuf>,
}

impl Cli {
    /// Build the run configuration from the parsed flags.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidDependencySpec`] for the first malformed
    /// `-a` token.
    pub fn build_config(&self) -> Result<SyncConfig, SyncError> {
        let dependencies = self
            .args
            .iter()
            .map(|token| DependencySpec::parse(token))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SyncConfig {
            dependencies,
            pyproject: self.pyproject.clone(),
            pre_commit: self.pre_commit.clone(),
            extras: self.extras.clone(),
            groups: self.groups.clone(),
            dev: if self.no_dev {
                DevDependencies::Exclude
            } else {
                DevDependencies::Include
            },
            comparison: if self.exact {
                ComparisonMode::Exact
            } else {
                ComparisonMode::Specifier
            },
            ..SyncConfig::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("sync-uv-pre-commit").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        assert!(cli.args.is_empty());
        assert_eq!(cli.pyproject, PathBuf::from("pyproject.toml"));
        assert_eq!(cli.pre_commit, PathBuf::from(".pre-commit-config.yaml"));
        assert_eq!(cli.log_level, LogLevel::Info);
        assert!(!cli.no_dev);
        assert!(!cli.exact);
    }

    #[test]
    fn test_repeated_flags_and_trailing_files() {
        let cli = parse(&[
            "-a",
            "black:black:v",
            "--args",
            "ruff",
            "-e",
            "lint",
            "-g",
            "typing",
            "--group",
            "docs",
            "-P",
            "ci/pre-commit.yaml",
            "--no-dev",
            "src/a.py",
            "src/b.py",
        ]);
        assert_eq!(cli.args, ["black:black:v", "ruff"]);
        assert_eq!(cli.extras, ["lint"]);
        assert_eq!(cli.groups, ["typing", "docs"]);
        assert_eq!(cli.pre_commit, PathBuf::from("ci/pre-commit.yaml"));
        assert_eq!(cli.files.len(), 2);

        let config = cli.build_config().unwrap();
        assert_eq!(config.dependencies.len(), 2);
        assert_eq!(config.dependencies[0].prefix.as_deref(), Some("v"));
        assert!(config.no_dev());
        assert_eq!(config.comparison, ComparisonMode::Specifier);
    }

    #[test]
    fn test_log_level_forms() {
        assert_eq!(parse(&["-l", "debug"]).log_level, LogLevel::Debug);
        assert_eq!(parse(&["--log-level", "40"]).log_level, LogLevel::Error);
        assert!(Cli::try_parse_from(["sync-uv-pre-commit", "-l", "LOUD"]).is_err());
    }

    #[test]
    fn test_exact_mode() {
        let config = parse(&["--exact", "-a", "black"]).build_config().unwrap();
        assert_eq!(config.comparison, ComparisonMode::Exact);
    }

    #[test]
    fn test_invalid_token_is_rejected() {
        let err = parse(&["-a", "a:b:c:d:e"]).build_config().unwrap_err();
        assert!(matches!(err, SyncError::InvalidDependencySpec { .. }));
    }
}
