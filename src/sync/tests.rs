use super::*;
use crate::compare::DependencySpec;
use crate::config::DevDependencies;
use crate::core::{FailureKind, SyncError};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PYPROJECT: &str = r#"[project]
name = "demo"
dynamic = ["version"]
dependencies = ["black==24.1.0"]

[project.optional-dependencies]
lint = ["ruff>=0.5,<0.6"]
"#;

const PRE_COMMIT: &str = r"repos:
  - repo: https://github.com/psf/black-pre-commit-mirror
    rev: v24.1.0
    hooks:
      - id: black
  - repo: https://github.com/astral-sh/ruff-pre-commit
    rev: v0.4.9
    hooks:
      - id: ruff
";

/// Project directory with a fake `uv` that records its arguments and
/// exports `lock` as the resolved requirements.
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new(lock: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pyproject.toml"), PYPROJECT).unwrap();
        std::fs::write(dir.path().join(".pre-commit-config.yaml"), PRE_COMMIT).unwrap();
        std::fs::write(dir.path().join("lock.txt"), lock).unwrap();

        let script = format!(
            r#"#!/bin/sh
if [ "$1" = "--version" ]; then
  echo "uv 0.5.0"
  exit 0
fi
echo "$@" > "{root}/args.log"
pwd > "{root}/cwd.log"
for arg in "$@"; do
  case "$arg" in
    --output-file=*) cp "{root}/lock.txt" "${{arg#--output-file=}}" ;;
  esac
done
"#,
            root = dir.path().display()
        );
        let uv = dir.path().join("uv");
        std::fs::write(&uv, script).unwrap();
        std::fs::set_permissions(&uv, std::fs::Permissions::from_mode(0o755)).unwrap();

        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn config(&self, tokens: &[&str]) -> SyncConfig {
        SyncConfig {
            dependencies: tokens.iter().map(|t| DependencySpec::parse(t).unwrap()).collect(),
            pyproject: self.path().join("pyproject.toml"),
            pre_commit: self.path().join(".pre-commit-config.yaml"),
            program: self.path().join("uv").display().to_string(),
            ..SyncConfig::default()
        }
    }

    fn logged_args(&self) -> String {
        std::fs::read_to_string(self.path().join("args.log")).unwrap()
    }

    fn scratch_used(&self) -> PathBuf {
        PathBuf::from(std::fs::read_to_string(self.path().join("cwd.log")).unwrap().trim())
    }
}

#[tokio::test]
async fn test_matching_hooks_succeed() {
    let fixture = Fixture::new("black==24.1.0\nruff==0.5.4\n");
    let mut syncer = Syncer::new(fixture.config(&["black:black:v"]));
    let comparison = syncer.run().await.unwrap();
    assert_eq!(comparison.success_count(), 1);
    assert!(!fixture.scratch_used().exists());
}

#[tokio::test]
async fn test_drifted_hook_is_a_mismatch() {
    let fixture = Fixture::new("black==24.1.0\nruff==0.5.4\n");
    let mut syncer = Syncer::new(fixture.config(&["black:black:v", "ruff:ruff:v"]));
    let err = syncer.run().await.unwrap_err();
    let sync = err.downcast_ref::<SyncError>().unwrap();
    assert!(matches!(sync, SyncError::Mismatch { failures: 1 }));
    assert!(!fixture.scratch_used().exists());
}

#[tokio::test]
async fn test_undeclared_extras_and_groups_are_not_passed() {
    let fixture = Fixture::new("black==24.1.0\n");
    let mut config = fixture.config(&["black:black:v"]);
    config.extras = vec!["lint".to_string(), "gpu".to_string()];
    config.groups = vec!["typing".to_string()];
    config.dev = DevDependencies::Exclude;

    Syncer::new(config).run().await.unwrap();

    let args = fixture.logged_args();
    assert!(args.contains("--extra lint"));
    assert!(!args.contains("gpu"));
    assert!(!args.contains("--group"));
    assert!(args.contains("--no-dev"));
}

#[tokio::test]
async fn test_missing_package_is_a_parsing_failure() {
    let fixture = Fixture::new("black==24.1.0\n");
    let err = Syncer::new(fixture.config(&["ruff"])).run().await.unwrap_err();
    let sync = err.downcast_ref::<SyncError>().unwrap();
    assert_eq!(sync.kind(), FailureKind::Parsing);
}

#[tokio::test]
async fn test_broken_pre_commit_config_aborts_before_export() {
    let fixture = Fixture::new("black==24.1.0\n");
    std::fs::write(fixture.path().join(".pre-commit-config.yaml"), "repos: [").unwrap();
    let err = Syncer::new(fixture.config(&["black"])).run().await.unwrap_err();
    let sync = err.downcast_ref::<SyncError>().unwrap();
    assert!(matches!(sync, SyncError::PreCommitParse { .. }));
    assert!(!fixture.path().join("args.log").exists());
}

#[tokio::test]
async fn test_missing_tool() {
    let fixture = Fixture::new("");
    let mut config = fixture.config(&["black"]);
    config.program = fixture.path().join("no-such-uv").display().to_string();
    let err = Syncer::new(config).run().await.unwrap_err();
    let sync = err.downcast_ref::<SyncError>().unwrap();
    assert_eq!(sync.kind(), FailureKind::Missing);
}

#[tokio::test]
async fn test_no_specs_skips_export() {
    let fixture = Fixture::new("black==24.1.0\n");
    let comparison = Syncer::new(fixture.config(&[])).run().await.unwrap();
    assert!(comparison.results().is_empty());
    assert!(!fixture.path().join("args.log").exists());
}

#[tokio::test]
async fn test_panic_is_unknown_and_unwinds_scratch() {
    let (tx, rx) = std::sync::mpsc::channel();
    let err = run_isolated(async move {
        let scratch = ScratchDir::new().unwrap();
        tx.send(scratch.path().to_path_buf()).unwrap();
        if scratch.path().exists() {
            panic!("resolver blew up");
        }
        let result: Result<()> = Ok(());
        result
    })
    .await
    .unwrap_err();

    let ctx = crate::core::user_friendly_error(err);
    assert_eq!(ctx.kind(), FailureKind::Unknown);
    assert_eq!(ctx.exit_code(), 999);
    assert!(!rx.recv().unwrap().exists());
}

#[tokio::test]
async fn test_isolated_run_passes_errors_through() {
    let err = run_isolated(async {
        let result: Result<()> = Err(SyncError::HookNotFound {
            hook_id: "ruff".to_string(),
        }
        .into());
        result
    })
    .await
    .unwrap_err();
    assert_eq!(crate::core::user_friendly_error(err).exit_code(), 1);
}
