//! Parsing of the exported requirements listing.
//!
//! `uv export --format requirements-txt` produces lines like:
//!
//! ```text
//! # This file was autogenerated by uv via the following command:
//! #    uv export --no-hashes --output-file=requirements.txt
//! -e .
//! black==24.1.0
//!     # via my-project
//! colorama==0.4.6 ; sys_platform == 'win32'
//! ```
//!
//! [`LockEntries`] keeps one [`SpecifierSet`] per package. Blank lines,
//! comments and option lines (`-e`, `--index-url`, ...) are skipped,
//! environment markers and inline comments are ignored, and when a package
//! appears twice the last line wins.
//!
//! Package names are compared after PEP 503 normalization, so `Typing_Extensions`
//! and `typing-extensions` are the same key.

use crate::core::SyncError;
use crate::version::SpecifierSet;
use anyhow::{Context, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

static REQUIREMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^(?P<name>[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)
        \s*(?:\[(?P<extras>[^\]]*)\])?
        \s*(?P<rest>.*)$",
    )
    .expect("requirement pattern is valid")
});

static SEPARATOR_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_.]+").expect("separator pattern is valid"));

/// Normalize a package name per PEP 503 (lowercase, `-_.` runs become `-`).
#[must_use]
pub fn normalize_name(name: &str) -> String {
    SEPARATOR_RUNS.replace_all(&name.trim().to_ascii_lowercase(), "-").into_owned()
}

/// Resolved package specifiers keyed by normalized name.
#[derive(Debug, Clone, Default)]
pub struct LockEntries {
    entries: BTreeMap<String, SpecifierSet>,
}

impl LockEntries {
    /// Read and parse a lock artifact.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, or with [`SyncError::LockfileParse`]
    /// for a line that is not a valid requirement.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read lock file: {}", path.display()))?;
        Ok(Self::parse(&content, &path.display().to_string())?)
    }

    /// Parse lock content; `file` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::LockfileParse`] for a line that is not a valid
    /// requirement.
    pub fn parse(content: &str, file: &str) -> Result<Self, SyncError> {
        let mut entries = BTreeMap::new();

        for (index, raw) in content.lines().enumerate() {
            let Some((name, specifier)) = parse_line(raw).map_err(|reason| {
                SyncError::LockfileParse {
                    file: file.to_string(),
                    line: index + 1,
                    reason,
                }
            })?
            else {
                continue;
            };
            tracing::trace!("lock entry {name} {specifier}");
            entries.insert(name, specifier);
        }

        Ok(Self { entries })
    }

    /// Resolved specifier for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SpecifierSet> {
        self.entries.get(&normalize_name(name))
    }

    /// Resolved specifier for `name`, as a typed lookup failure when absent.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::PackageNotFound`] when the package is not locked.
    pub fn specifier(&self, name: &str) -> Result<&SpecifierSet, SyncError> {
        self.get(name).ok_or_else(|| SyncError::PackageNotFound {
            name: name.to_string(),
        })
    }

    /// Whether `name` is locked.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of locked packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is locked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by normalized name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SpecifierSet)> {
        self.entries.iter().map(|(name, spec)| (name.as_str(), spec))
    }
}

impl FromIterator<(String, SpecifierSet)> for LockEntries {
    fn from_iter<I: IntoIterator<Item = (String, SpecifierSet)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(name, spec)| (normalize_name(&name), spec)).collect(),
        }
    }
}

/// Parse one line into `(normalized name, specifier)`, or `None` when the
/// line carries no requirement.
fn parse_line(raw: &str) -> Result<Option<(String, SpecifierSet)>, String> {
    let line = strip_inline_comment(raw).trim().trim_end_matches('\\').trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
        return Ok(None);
    }

    let requirement = line.split_once(';').map_or(line, |(req, _markers)| req).trim();
    let caps = REQUIREMENT_PATTERN
        .captures(requirement)
        .ok_or_else(|| format!("'{requirement}' is not a requirement"))?;
    let name = normalize_name(&caps["name"]);
    let rest = caps["rest"].trim();

    if rest.starts_with('@') {
        return Ok(Some((name, SpecifierSet::default())));
    }

    let rest = rest
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(rest);
    let specifier = SpecifierSet::parse(rest).map_err(|e| e.to_string())?;
    Ok(Some((name, specifier)))
}

fn strip_inline_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    for (i, byte) in bytes.iter().enumerate() {
        if *byte == b'#' && (i == 0 || bytes[i - 1].is_ascii_whitespace()) {
            return &line[..i];
        }
    }
    line
}
