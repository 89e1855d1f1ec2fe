//! Shared fixtures for the sync-uv-pre-commit integration tests
//!
//! Every test gets a throwaway project directory holding a manifest, a
//! pre-commit config, a private `TMPDIR`, and a fake `uv` on `PATH`. The fake
//! `uv` is driven by files in the project directory:
//!
//! - `uv-version`: printed for `uv --version`
//! - `lock.txt`: copied to the `--output-file` of `uv export`
//! - `uv-exit`: when present, `uv export` fails with this status
//!
//! It records its arguments in `uv-args.log` and its working directory in
//! `uv-cwd.log`.

// Not every test file uses every helper
#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const PYPROJECT: &str = r#"[project]
name = "demo"
dynamic = ["version"]
requires-python = ">=3.9"
dependencies = ["black>=24"]

[project.optional-dependencies]
lint = ["ruff>=0.5,<0.6"]

[dependency-groups]
typing = ["mypy"]

[tool.hatch.version]
source = "vcs"
"#;

pub const PRE_COMMIT: &str = r"repos:
  - repo: https://github.com/psf/black-pre-commit-mirror
    rev: 24.1.0
    hooks:
      - id: black
  - repo: https://github.com/astral-sh/ruff-pre-commit
    rev: v0.4.9
    hooks:
      - id: ruff
      - id: ruff-format
  - repo: local
    hooks:
      - id: pytest
        name: pytest
        entry: pytest
        language: system
";

pub const LOCK: &str = r"# This file was autogenerated by uv via the following command:
#    uv export --no-hashes --output-file=requirements.txt
black==24.1.0
    # via demo
click==8.1.7
    # via black
ruff==0.5.4
    # via demo
";

const FAKE_UV: &str = r#"#!/bin/sh
root="__ROOT__"
if [ "$1" = "--version" ]; then
  cat "$root/uv-version"
  exit 0
fi
echo "$@" > "$root/uv-args.log"
pwd > "$root/uv-cwd.log"
if [ -f "$root/uv-exit" ]; then
  echo "error: simulated export failure" >&2
  exit "$(cat "$root/uv-exit")"
fi
for arg in "$@"; do
  case "$arg" in
    --output-file=*) cp "$root/lock.txt" "${arg#--output-file=}" ;;
  esac
done
"#;

/// A project directory with a fake `uv`.
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    /// Project with the default manifest, config, and lock, and `uv 0.5.0`.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("bin")).unwrap();
        fs::create_dir(root.join("tmp")).unwrap();
        fs::write(root.join("pyproject.toml"), PYPROJECT).unwrap();
        fs::write(root.join(".pre-commit-config.yaml"), PRE_COMMIT).unwrap();
        fs::write(root.join("lock.txt"), LOCK).unwrap();
        fs::write(root.join("uv-version"), "uv 0.5.0 (0d81bfb 2024-11-19)\n").unwrap();

        let uv = root.join("bin").join("uv");
        fs::write(&uv, FAKE_UV.replace("__ROOT__", &root.display().to_string())).unwrap();
        fs::set_permissions(&uv, fs::Permissions::from_mode(0o755)).unwrap();

        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, name: &str, content: &str) -> &Self {
        fs::write(self.path().join(name), content).unwrap();
        self
    }

    /// Make `uv export` exit with `status`.
    pub fn fail_export_with(&self, status: i32) -> &Self {
        self.write("uv-exit", &status.to_string())
    }

    /// The binary under test, run from the project directory.
    pub fn command(&self) -> Command {
        let mut path = vec![self.path().join("bin")];
        path.extend(std::env::split_paths(&std::env::var_os("PATH").unwrap_or_default()));

        let mut cmd = Command::cargo_bin("sync-uv-pre-commit").unwrap();
        cmd.current_dir(self.path())
            .env("PATH", std::env::join_paths(path).unwrap())
            .env("TMPDIR", self.path().join("tmp"))
            .env_remove("SYNC_UV_PRE_COMMIT_UV")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Arguments the last `uv export` received, if it ran.
    pub fn export_args(&self) -> Option<String> {
        fs::read_to_string(self.path().join("uv-args.log")).ok()
    }

    /// Working directory of the last `uv export`.
    pub fn export_cwd(&self) -> Option<PathBuf> {
        fs::read_to_string(self.path().join("uv-cwd.log")).ok().map(|s| PathBuf::from(s.trim()))
    }

    /// Entries left in the private `TMPDIR`.
    pub fn leftover_temp_entries(&self) -> usize {
        fs::read_dir(self.path().join("tmp")).unwrap().count()
    }
}

/// Exit status as observed by the parent on unix (truncated to 8 bits).
pub const fn observed(code: i32) -> i32 {
    code & 0xff
}
