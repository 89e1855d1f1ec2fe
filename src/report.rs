//! Run summary and outcome.
//!
//! After every spec has been compared, the summary line is logged (info when
//! clean, error otherwise), followed by one error line per drifted hook in
//! input order. Any failure turns into [`SyncError::Mismatch`], which maps to
//! exit code 2.

use crate::compare::{Comparison, ComparisonResult};
use crate::core::SyncError;

/// Log the outcome of `comparison`.
///
/// # Errors
///
/// Returns [`SyncError::Mismatch`] when at least one spec failed.
pub fn report(comparison: &Comparison) -> Result<(), SyncError> {
    let successes = comparison.success_count();
    let failures = comparison.failure_count();

    if failures == 0 {
        tracing::info!("Results:: {successes} success, {failures} errors");
        return Ok(());
    }

    tracing::error!("Results:: {successes} success, {failures} errors");
    for failure in comparison.failures() {
        if let ComparisonResult::Mismatch { spec, expected, found } = failure {
            tracing::error!("Expected {} to be {}, but found {}", spec.hook_id, expected, found);
        }
    }

    Err(SyncError::Mismatch { failures })
}
