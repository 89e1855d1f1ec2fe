//! Version specifier clauses and clause sets.
//!
//! A [`Specifier`] is one clause such as `>=1.0` or `==24.1.*`; a
//! [`SpecifierSet`] is a comma-separated conjunction of clauses such as
//! `>=0.5,<0.6`. The lock parser produces one set per package and the
//! comparator asks whether a hook revision is [contained](SpecifierSet::contains)
//! in it.
//!
//! # Pre-release handling
//!
//! Pre-releases (including dev releases) are excluded unless some clause in
//! the set explicitly names a pre-release, so `>=1.0` does not accept
//! `2.0b1` while `>=2.0b1` does.

use super::Version;
use crate::core::SyncError;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static SPECIFIER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<op>===|==|!=|~=|<=|>=|<|>)\s*(?P<version>[^\s,;]+)\s*$")
        .expect("specifier pattern is valid")
});

/// Comparison operator of a single clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<=`
    LessEqual,
    /// `>=`
    GreaterEqual,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `~=`
    Compatible,
    /// `===`
    Arbitrary,
}

impl Operator {
    fn parse(text: &str) -> Option<Self> {
        Some(match text {
            "==" => Self::Equal,
            "!=" => Self::NotEqual,
            "<=" => Self::LessEqual,
            ">=" => Self::GreaterEqual,
            "<" => Self::Less,
            ">" => Self::Greater,
            "~=" => Self::Compatible,
            "===" => Self::Arbitrary,
            _ => return None,
        })
    }

    /// Operator text, for example `">="`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::Compatible => "~=",
            Self::Arbitrary => "===",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single version clause.
#[derive(Debug, Clone)]
pub struct Specifier {
    operator: Operator,
    text: String,
    version: Option<Version>,
    wildcard: bool,
}

impl Specifier {
    /// Parse one clause.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidSpecifier`] when the operator is unknown,
    /// the version does not parse, a wildcard is used with an operator other
    /// than `==`/`!=`, or `~=` names a single release segment.
    pub fn parse(text: &str) -> Result<Self, SyncError> {
        let invalid = || SyncError::InvalidSpecifier {
            specifier: text.trim().to_string(),
        };
        let caps = SPECIFIER_PATTERN.captures(text).ok_or_else(invalid)?;
        let operator = Operator::parse(&caps["op"]).ok_or_else(invalid)?;
        let version_text = caps["version"].to_string();

        if operator == Operator::Arbitrary {
            return Ok(Self {
                operator,
                text: version_text,
                version: None,
                wildcard: false,
            });
        }

        let (body, wildcard) = match version_text.strip_suffix(".*") {
            Some(body) => (body, true),
            None => (version_text.as_str(), false),
        };
        if wildcard && !matches!(operator, Operator::Equal | Operator::NotEqual) {
            return Err(invalid());
        }

        let version = Version::parse(body).map_err(|_| invalid())?;
        if wildcard && (version.is_prerelease() || version.is_postrelease() || version.has_local())
        {
            return Err(invalid());
        }
        if operator == Operator::Compatible && (version.release().len() < 2 || version.has_local())
        {
            return Err(invalid());
        }
        if version.has_local() && !matches!(operator, Operator::Equal | Operator::NotEqual) {
            return Err(invalid());
        }

        Ok(Self {
            operator,
            text: version_text,
            version: Some(version),
            wildcard,
        })
    }

    /// Whether this clause is a plain `==X` pin (no wildcard).
    #[must_use]
    pub fn is_exact_pin(&self) -> bool {
        self.operator == Operator::Equal && !self.wildcard
    }

    /// Version text as written, without the operator.
    #[must_use]
    pub fn version_text(&self) -> &str {
        &self.text
    }

    /// Whether this clause explicitly admits pre-releases.
    #[must_use]
    pub fn allows_prereleases(&self) -> bool {
        match self.operator {
            Operator::Equal
            | Operator::GreaterEqual
            | Operator::LessEqual
            | Operator::Compatible
            | Operator::Arbitrary => self.version.as_ref().is_some_and(Version::is_prerelease),
            _ => false,
        }
    }

    /// Whether `candidate` satisfies this clause, ignoring pre-release policy.
    #[must_use]
    pub fn contains(&self, candidate: &Version) -> bool {
        let Some(spec) = &self.version else {
            return candidate.as_str().eq_ignore_ascii_case(&self.text);
        };

        match self.operator {
            Operator::Equal => self.equals(spec, candidate),
            Operator::NotEqual => !self.equals(spec, candidate),
            Operator::LessEqual => candidate.public() <= *spec,
            Operator::GreaterEqual => candidate.public() >= *spec,
            Operator::Less => {
                candidate < spec
                    && !(!spec.is_prerelease()
                        && candidate.is_prerelease()
                        && candidate.base() == spec.base())
            }
            Operator::Greater => {
                candidate > spec
                    && !(!spec.is_postrelease()
                        && candidate.is_postrelease()
                        && candidate.base() == spec.base())
                    && !(candidate.has_local() && candidate.base() == spec.base())
            }
            Operator::Compatible => {
                let prefix = &spec.release()[..spec.release().len() - 1];
                candidate.public() >= *spec && prefix_matches(spec.epoch(), prefix, candidate)
            }
            Operator::Arbitrary => candidate.as_str().eq_ignore_ascii_case(&self.text),
        }
    }

    fn equals(&self, spec: &Version, candidate: &Version) -> bool {
        if self.wildcard {
            prefix_matches(spec.epoch(), spec.release(), candidate)
        } else if spec.has_local() {
            candidate == spec
        } else {
            candidate.public() == *spec
        }
    }
}

/// `==E!X.Y.*` semantics: same epoch, and the candidate's release (zero
/// padded) starts with `prefix`.
fn prefix_matches(epoch: u64, prefix: &[u64], candidate: &Version) -> bool {
    if candidate.epoch() != epoch {
        return false;
    }
    let release = candidate.release();
    prefix
        .iter()
        .enumerate()
        .all(|(i, expected)| release.get(i).copied().unwrap_or(0) == *expected)
}

impl FromStr for Specifier {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator, self.text)
    }
}

/// A conjunction of [`Specifier`] clauses.
///
/// # Examples
///
/// ```rust
/// use sync_uv_pre_commit::version::{SpecifierSet, Version};
///
/// let range: SpecifierSet = ">=0.5,<0.6".parse().unwrap();
/// assert!(range.contains(&"0.5.7".parse::<Version>().unwrap()));
/// assert!(!range.contains(&"0.4.9".parse::<Version>().unwrap()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SpecifierSet {
    specifiers: Vec<Specifier>,
}

impl SpecifierSet {
    /// Parse a comma-separated list of clauses. Empty input yields an empty set.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidSpecifier`] if any clause is invalid.
    pub fn parse(text: &str) -> Result<Self, SyncError> {
        let specifiers = text
            .split(',')
            .map(str::trim)
            .filter(|clause| !clause.is_empty())
            .map(Specifier::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { specifiers })
    }

    /// Clauses in declaration order.
    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, Specifier> {
        self.specifiers.iter()
    }

    /// Whether the set has no clauses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specifiers.is_empty()
    }

    /// The pinned version text when the set is a single `==X` clause.
    #[must_use]
    pub fn exact_pin(&self) -> Option<&str> {
        match self.specifiers.as_slice() {
            [only] if only.is_exact_pin() => Some(only.version_text()),
            _ => None,
        }
    }

    /// Whether any clause explicitly admits pre-releases.
    #[must_use]
    pub fn allows_prereleases(&self) -> bool {
        self.specifiers.iter().any(Specifier::allows_prereleases)
    }

    /// Whether `candidate` satisfies every clause.
    ///
    /// Pre-release candidates are rejected unless
    /// [`allows_prereleases`](Self::allows_prereleases) holds.
    #[must_use]
    pub fn contains(&self, candidate: &Version) -> bool {
        if candidate.is_prerelease() && !self.allows_prereleases() {
            return false;
        }
        self.specifiers.iter().all(|spec| spec.contains(candidate))
    }
}

impl FromStr for SpecifierSet {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SpecifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clauses: Vec<String> = self.specifiers.iter().map(ToString::to_string).collect();
        f.write_str(&clauses.join(","))
    }
}

impl<'a> IntoIterator for &'a SpecifierSet {
    type Item = &'a Specifier;
    type IntoIter = std::slice::Iter<'a, Specifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.specifiers.iter()
    }
}
