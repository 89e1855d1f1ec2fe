//! sync-uv-pre-commit - keep pre-commit hook revisions in step with `uv`
//!
//! Formatters and linters often appear twice in a Python project: once as a
//! dependency in `pyproject.toml`, resolved and locked by `uv`, and once as a
//! hook in `.pre-commit-config.yaml`, pinned by `rev`. This crate checks that
//! the two agree.
//!
//! # Pipeline
//!
//! 1. [`export::check_tool_version`] verifies `uv` is installed and recent
//! 2. [`hooks`] maps every pinned hook id to its repository's `rev`
//! 3. [`manifest`] writes a resolvable copy of the manifest into a
//!    [`utils::ScratchDir`], dropping undeclared extras and groups
//! 4. [`export`] runs `uv export` against the copy
//! 5. [`lockfile`] parses the exported requirements
//! 6. [`compare`] checks each `name[:hook_id[:prefix[:suffix]]]` pairing and
//!    [`report`] logs the outcome
//!
//! [`sync::Syncer`] runs the steps for one [`config::SyncConfig`], memoizing
//! parsed inputs in a [`cache::RunCache`].
//!
//! # Example
//!
//! ```rust,no_run
//! use sync_uv_pre_commit::compare::DependencySpec;
//! use sync_uv_pre_commit::config::SyncConfig;
//! use sync_uv_pre_commit::sync::Syncer;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = SyncConfig {
//!     dependencies: vec![DependencySpec::parse("black:black:v")?],
//!     ..SyncConfig::default()
//! };
//! let comparison = Syncer::new(config).run().await?;
//! println!("{} hooks in sync", comparison.success_count());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod cli;
pub mod compare;
pub mod config;
pub mod core;
pub mod export;
pub mod hooks;
pub mod lockfile;
pub mod logging;
pub mod manifest;
pub mod report;
pub mod sync;
pub mod utils;
pub mod version;
