//! Python package versions and version specifiers.
//!
//! Hook revisions are compared against what `uv` resolved for the project, and
//! both sides speak Python's versioning scheme (PEP 440), not semver: releases
//! can have any number of segments (`24.1`, `0.4.10.1`), pre-releases are
//! spelled `1.0rc1`, and post/dev releases have their own ordering rules.
//!
//! # Module Organization
//!
//! - [`Version`] - a parsed, totally ordered release identifier
//! - [`specifier`] - single clauses (`>=1.0`) and clause sets (`>=1.0,<2.0`)
//!
//! # Ordering
//!
//! For the same release segments the order is
//! `1.0.dev0 < 1.0a1.dev0 < 1.0a1 < 1.0b1 < 1.0rc1 < 1.0 < 1.0.post0.dev0 < 1.0.post0`,
//! trailing zeros are insignificant (`1.0 == 1.0.0`), and a local label sorts
//! after the same public version (`1.0 < 1.0+local`).
//!
//! # Examples
//!
//! ```rust
//! use sync_uv_pre_commit::version::Version;
//!
//! let stable: Version = "24.1.0".parse().unwrap();
//! let candidate: Version = "24.1rc1".parse().unwrap();
//! assert!(candidate < stable);
//! assert!(candidate.is_prerelease());
//! ```

pub mod specifier;

pub use specifier::{Operator, Specifier, SpecifierSet};

use crate::core::SyncError;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?xi)^\s*
        v?
        (?:(?P<epoch>[0-9]+)!)?
        (?P<release>[0-9]+(?:\.[0-9]+)*)
        (?:
            [-_.]?
            (?P<pre_l>alpha|a|beta|b|preview|pre|c|rc)
            [-_.]?
            (?P<pre_n>[0-9]+)?
        )?
        (?:
            (?:-(?P<post_n1>[0-9]+))
            |
            (?:
                [-_.]?
                (?P<post_l>post|rev|r)
                [-_.]?
                (?P<post_n2>[0-9]+)?
            )
        )?
        (?:
            [-_.]?
            (?P<dev_l>dev)
            [-_.]?
            (?P<dev_n>[0-9]+)?
        )?
        (?:\+(?P<local>[a-z0-9]+(?:[-_.][a-z0-9]+)*))?
        \s*$",
    )
    .expect("version pattern is valid")
});

/// Pre-release phase, ordered `a < b < rc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreRelease {
    /// `a`, `alpha`
    Alpha,
    /// `b`, `beta`
    Beta,
    /// `rc`, `c`, `pre`, `preview`
    Rc,
}

impl PreRelease {
    fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "a" | "alpha" => Self::Alpha,
            "b" | "beta" => Self::Beta,
            _ => Self::Rc,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Alpha => "a",
            Self::Beta => "b",
            Self::Rc => "rc",
        }
    }
}

/// One dot-separated component of a local version label.
///
/// Numeric components sort after alphanumeric ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LocalSegment {
    /// Alphanumeric segment, compared case-insensitively
    Text(String),
    /// Purely numeric segment
    Number(u64),
}

impl fmt::Display for LocalSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// A parsed Python package version.
///
/// Equality and ordering follow PEP 440, so `"1.0"` and `"1.0.0"` compare
/// equal even though [`Version::as_str`] still returns the original text.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    epoch: u64,
    release: Vec<u64>,
    pre: Option<(PreRelease, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Vec<LocalSegment>,
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum PreKey {
    DevOnly,
    Pre(PreRelease, u64),
    Final,
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum DevKey {
    Dev(u64),
    Final,
}

impl Version {
    /// Parse a version string.
    ///
    /// A leading `v` is tolerated, so tag-style strings such as `v24.1.0`
    /// parse to the same version as `24.1.0`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidVersion`] if the text is not a PEP 440 version.
    pub fn parse(text: &str) -> Result<Self, SyncError> {
        let invalid = || SyncError::InvalidVersion {
            version: text.to_string(),
        };
        let caps = VERSION_PATTERN.captures(text).ok_or_else(invalid)?;

        let number = |name: &str| -> Result<Option<u64>, SyncError> {
            caps.name(name)
                .map(|m| m.as_str().parse::<u64>().map_err(|_| invalid()))
                .transpose()
        };

        let epoch = number("epoch")?.unwrap_or(0);
        let release = caps["release"]
            .split('.')
            .map(|segment| segment.parse::<u64>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;

        let pre = match caps.name("pre_l") {
            Some(label) => {
                Some((PreRelease::from_label(label.as_str()), number("pre_n")?.unwrap_or(0)))
            }
            None => None,
        };

        let post = if caps.name("post_n1").is_some() {
            number("post_n1")?
        } else if caps.name("post_l").is_some() {
            Some(number("post_n2")?.unwrap_or(0))
        } else {
            None
        };

        let dev = if caps.name("dev_l").is_some() {
            Some(number("dev_n")?.unwrap_or(0))
        } else {
            None
        };

        let local = caps
            .name("local")
            .map(|m| {
                m.as_str()
                    .split(['-', '_', '.'])
                    .map(|segment| match segment.parse::<u64>() {
                        Ok(n) => LocalSegment::Number(n),
                        Err(_) => LocalSegment::Text(segment.to_ascii_lowercase()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            raw: text.trim().to_string(),
            epoch,
            release,
            pre,
            post,
            dev,
            local,
        })
    }

    /// The text this version was parsed from, trimmed.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Epoch component, `0` when absent.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Release segments, for example `[24, 1, 0]`.
    #[must_use]
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    /// Whether this is a pre-release or a development release.
    #[must_use]
    pub const fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    /// Whether this is a post-release.
    #[must_use]
    pub const fn is_postrelease(&self) -> bool {
        self.post.is_some()
    }

    /// Whether a local label (`+...`) is present.
    #[must_use]
    pub fn has_local(&self) -> bool {
        !self.local.is_empty()
    }

    /// The version with its local label removed.
    #[must_use]
    pub fn public(&self) -> Self {
        let mut public = self.clone();
        public.local.clear();
        public.raw = public.to_string();
        public
    }

    /// Epoch and release only, for example `1.0` for `1.0rc1.post2+abc`.
    #[must_use]
    pub fn base(&self) -> Self {
        Self {
            raw: String::new(),
            epoch: self.epoch,
            release: self.release.clone(),
            pre: None,
            post: None,
            dev: None,
            local: Vec::new(),
        }
    }

    fn trimmed_release(&self) -> &[u64] {
        let end = self.release.iter().rposition(|&n| n != 0).map_or(0, |i| i + 1);
        &self.release[..end]
    }

    fn pre_key(&self) -> PreKey {
        match (self.pre, self.post, self.dev) {
            (None, None, Some(_)) => PreKey::DevOnly,
            (Some((phase, n)), _, _) => PreKey::Pre(phase, n),
            _ => PreKey::Final,
        }
    }

    fn dev_key(&self) -> DevKey {
        self.dev.map_or(DevKey::Final, DevKey::Dev)
    }
}

impl FromStr for Version {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| self.trimmed_release().cmp(other.trimmed_release()))
            .then_with(|| self.pre_key().cmp(&other.pre_key()))
            .then_with(|| self.post.cmp(&other.post))
            .then_with(|| self.dev_key().cmp(&other.dev_key()))
            .then_with(|| {
                let lhs = (!self.local.is_empty()).then_some(&self.local);
                let rhs = (!other.local.is_empty()).then_some(&other.local);
                lhs.cmp(&rhs)
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}!", self.epoch)?;
        }
        let release: Vec<String> = self.release.iter().map(ToString::to_string).collect();
        f.write_str(&release.join("."))?;
        if let Some((phase, n)) = self.pre {
            write!(f, "{}{n}", phase.as_str())?;
        }
        if let Some(post) = self.post {
            write!(f, ".post{post}")?;
        }
        if let Some(dev) = self.dev {
            write!(f, ".dev{dev}")?;
        }
        if !self.local.is_empty() {
            let local: Vec<String> = self.local.iter().map(ToString::to_string).collect();
            write!(f, "+{}", local.join("."))?;
        }
        Ok(())
    }
}
