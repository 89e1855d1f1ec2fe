//! `-a/--args` token parsing.
//!
//! Each token names a locked package and the hook whose `rev` should track it:
//!
//! | Token                      | name   | hook_id | prefix | suffix |
//! |----------------------------|--------|---------|--------|--------|
//! | `black`                    | black  | black   | -      | -      |
//! | `ruff:ruff-format`         | ruff   | ruff-format | -  | -      |
//! | `black:black:v`            | black  | black   | `v`    | -      |
//! | `mypy:mypy:v:-py3`         | mypy   | mypy    | `v`    | `-py3` |

use crate::core::SyncError;
use std::fmt;
use std::str::FromStr;

/// One package-to-hook pairing requested on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    /// Package name as it appears in the lock
    pub name: String,
    /// Hook id in the pre-commit configuration
    pub hook_id: String,
    /// Text stripped from the start of the hook revision
    pub prefix: Option<String>,
    /// Text stripped from the end of the hook revision
    pub suffix: Option<String>,
}

impl DependencySpec {
    /// Parse a `name[:hook_id[:prefix[:suffix]]]` token.
    ///
    /// Surrounding whitespace is ignored. The hook id defaults to the package
    /// name when omitted; an empty prefix or suffix field is the same as
    /// leaving it out.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidDependencySpec`] for more than four fields
    /// or an empty name or hook id.
    pub fn parse(token: &str) -> Result<Self, SyncError> {
        let invalid = |reason: &str| SyncError::InvalidDependencySpec {
            token: token.to_string(),
            reason: reason.to_string(),
        };

        let fields: Vec<&str> = token.trim().split(':').collect();
        if fields.len() > 4 {
            return Err(invalid("expected at most four ':'-separated fields"));
        }

        let name = fields[0];
        let hook_id = fields.get(1).copied().unwrap_or(name);
        if name.is_empty() {
            return Err(invalid("package name is empty"));
        }
        if hook_id.is_empty() {
            return Err(invalid("hook id is empty"));
        }

        let optional = |index: usize| {
            fields.get(index).filter(|field| !field.is_empty()).map(|field| (*field).to_string())
        };

        Ok(Self {
            name: name.to_string(),
            hook_id: hook_id.to_string(),
            prefix: optional(2),
            suffix: optional(3),
        })
    }

    /// Remove the configured prefix and suffix from a hook revision.
    ///
    /// Each affix is only removed when the revision actually carries it.
    #[must_use]
    pub fn strip<'a>(&self, rev: &'a str) -> &'a str {
        let mut stripped = rev;
        if let Some(prefix) = &self.prefix {
            stripped = stripped.strip_prefix(prefix.as_str()).unwrap_or(stripped);
        }
        if let Some(suffix) = &self.suffix {
            stripped = stripped.strip_suffix(suffix.as_str()).unwrap_or(stripped);
        }
        stripped
    }

    /// Rebuild a revision from a bare version by adding the affixes.
    #[must_use]
    pub fn decorate(&self, version: &str) -> String {
        format!(
            "{}{version}{}",
            self.prefix.as_deref().unwrap_or_default(),
            self.suffix.as_deref().unwrap_or_default()
        )
    }
}

impl FromStr for DependencySpec {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DependencySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.hook_id)?;
        match (&self.prefix, &self.suffix) {
            (None, None) => Ok(()),
            (prefix, None) => write!(f, ":{}", prefix.as_deref().unwrap_or_default()),
            (prefix, Some(suffix)) => {
                write!(f, ":{}:{suffix}", prefix.as_deref().unwrap_or_default())
            }
        }
    }
}
