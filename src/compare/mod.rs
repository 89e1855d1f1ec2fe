//! Hook-to-dependency comparison.
//!
//! For every [`DependencySpec`], in the order given on the command line, the
//! [`Comparator`]:
//!
//! 1. looks up the package's resolved specifier in the [`LockEntries`]
//! 2. looks up the hook's pinned revision in the [`HookRegistry`]
//! 3. strips the spec's prefix/suffix from the revision
//! 4. applies the configured [`ComparisonMode`]
//!
//! A missing package or hook aborts the whole comparison with a parsing
//! failure. A revision that simply does not match is recorded and the
//! remaining specs are still evaluated, so one run reports every drifted hook.
//! Matches are logged as they are found; mismatches are left to
//! [`crate::report`] so they come out together, in input order.

mod dependency_spec;

pub use dependency_spec::DependencySpec;

use crate::config::ComparisonMode;
use crate::core::SyncError;
use crate::hooks::HookRegistry;
use crate::lockfile::LockEntries;
use crate::version::{SpecifierSet, Version};

/// Outcome of checking one [`DependencySpec`].
#[derive(Debug, Clone)]
pub enum ComparisonResult {
    /// The hook revision agrees with the lock
    Match {
        /// The checked pairing
        spec: DependencySpec,
        /// Resolved specifier, for example `==24.1.0`
        expected: String,
        /// Hook revision as written in the config
        found: String,
    },
    /// The hook revision disagrees with the lock
    Mismatch {
        /// The checked pairing
        spec: DependencySpec,
        /// Resolved specifier, for example `==24.1.0`
        expected: String,
        /// Hook revision as written in the config
        found: String,
    },
}

impl ComparisonResult {
    /// Whether the revision matched.
    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Match { .. })
    }

    /// The checked pairing.
    #[must_use]
    pub const fn spec(&self) -> &DependencySpec {
        match self {
            Self::Match { spec, .. } | Self::Mismatch { spec, .. } => spec,
        }
    }
}

/// All results of one comparison pass, in input order.
#[derive(Debug, Clone, Default)]
pub struct Comparison {
    results: Vec<ComparisonResult>,
}

impl Comparison {
    /// Results in input order.
    #[must_use]
    pub fn results(&self) -> &[ComparisonResult] {
        &self.results
    }

    /// Number of matching specs.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_match()).count()
    }

    /// Number of mismatching specs.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.results.len() - self.success_count()
    }

    /// Mismatches in input order.
    pub fn failures(&self) -> impl Iterator<Item = &ComparisonResult> {
        self.results.iter().filter(|r| !r.is_match())
    }
}

/// Compares hook revisions against resolved dependency specifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Comparator {
    mode: ComparisonMode,
}

impl Comparator {
    /// Create a comparator using `mode`.
    #[must_use]
    pub const fn new(mode: ComparisonMode) -> Self {
        Self { mode }
    }

    /// Check every spec in order.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::PackageNotFound`] or [`SyncError::HookNotFound`]
    /// for the first spec whose package or hook cannot be found.
    pub fn compare(
        &self,
        specs: &[DependencySpec],
        lock: &LockEntries,
        hooks: &HookRegistry,
    ) -> Result<Comparison, SyncError> {
        let mut comparison = Comparison::default();

        for spec in specs {
            let specifier = lock.specifier(&spec.name)?;
            let rev = hooks.revision(&spec.hook_id)?;

            let expected = specifier.to_string();
            let found = rev.to_string();
            let result = if self.matches(spec, specifier, rev) {
                tracing::info!("Expected {} to be {}, and found {}", spec.hook_id, expected, found);
                ComparisonResult::Match {
                    spec: spec.clone(),
                    expected,
                    found,
                }
            } else {
                tracing::debug!("{} does not satisfy {} for {}", found, expected, spec.name);
                ComparisonResult::Mismatch {
                    spec: spec.clone(),
                    expected,
                    found,
                }
            };
            comparison.results.push(result);
        }

        Ok(comparison)
    }

    fn matches(&self, spec: &DependencySpec, specifier: &SpecifierSet, rev: &str) -> bool {
        match self.mode {
            ComparisonMode::Specifier => {
                let stripped = spec.strip(rev);
                match Version::parse(stripped) {
                    Ok(version) => specifier.contains(&version),
                    Err(_) => {
                        tracing::debug!("Revision {rev} of {} is not a version", spec.hook_id);
                        false
                    }
                }
            }
            ComparisonMode::Exact => {
                specifier.exact_pin().is_some_and(|pin| spec.decorate(pin) == rev)
            }
        }
    }
}
