//! Core types shared by every stage of the sync pipeline.
//!
//! - [`SyncError`] - typed failures raised by the stages
//! - [`FailureKind`] - the five failure categories and their exit codes
//! - [`ErrorContext`] / [`user_friendly_error`] - user-facing error rendering

pub mod error;

pub use error::{ErrorContext, FailureKind, SyncError, user_friendly_error};
