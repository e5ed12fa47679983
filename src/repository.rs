//! Repository identifiers
//!
//! A repository is addressed as `owner/name`. The same string is used as the
//! cache key, and the walk starts from `/owner/name` on the hosting service.

use crate::ScrapeError;
use std::fmt;
use std::str::FromStr;

/// A validated `owner/name` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryId {
    owner: String,
    name: String,
}

impl RepositoryId {
    /// Parses an `owner/name` string
    ///
    /// Surrounding whitespace and a single leading or trailing slash are
    /// tolerated. Both segments must be non-empty and made of ASCII
    /// alphanumerics, `-`, `_` or `.`.
    ///
    /// # Example
    ///
    /// ```
    /// use repo_census::RepositoryId;
    ///
    /// let repo = RepositoryId::parse("rust-lang/cargo").unwrap();
    /// assert_eq!(repo.key(), "rust-lang/cargo");
    /// assert_eq!(repo.start_path(), "/rust-lang/cargo");
    /// ```
    pub fn parse(input: &str) -> Result<Self, ScrapeError> {
        let trimmed = input.trim().trim_matches('/');
        let invalid = || ScrapeError::InvalidRepository(input.to_string());

        let (owner, name) = trimmed.split_once('/').ok_or_else(invalid)?;

        if !is_valid_segment(owner) || !is_valid_segment(name) {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Cache key for this repository (`owner/name`)
    pub fn key(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Path of the repository's root listing page
    pub fn start_path(&self) -> String {
        format!("/{}/{}", self.owner, self.name)
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

impl FromStr for RepositoryId {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
