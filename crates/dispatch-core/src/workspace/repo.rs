//! `owner/name` repository references.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::Error;

/// A GitHub repository named as `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSpec {
    pub owner: String,
    pub name: String,
}

impl RepoSpec {
    pub fn clone_url(&self) -> String {
        format!("https://github.com/{}/{}.git", self.owner, self.name)
    }

    /// Directory name of the cached mirror: `owner-name`.
    pub fn dir_name(&self) -> String {
        format!("{}-{}", self.owner, self.name)
    }

    pub fn cache_path(&self, cache_root: &Path) -> PathBuf {
        cache_root.join(self.dir_name())
    }
}

impl FromStr for RepoSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || Error::InvalidConfig(format!("repository must be owner/name, got '{s}'"));
        let (owner, name) = s.split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepoSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Characters that would break the shell lines and AppleScript built from a
/// workspace name.
const FORBIDDEN_NAME_CHARS: [char; 7] = [' ', '/', '\\', '\'', '"', '`', '$'];

/// Check a branch-name prefix chosen by the operator.
pub fn validate_name(name: &str) -> Result<(), Error> {
    if name.trim().is_empty() {
        return Err(Error::InvalidConfig("name cannot be empty".into()));
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN_NAME_CHARS.contains(c)) {
        return Err(Error::InvalidConfig(format!(
            "name contains invalid character '{c}'"
        )));
    }
    Ok(())
}
