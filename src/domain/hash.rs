//! Pinned content hashes
//!
//! Hashes are kept as the exact text found in the package definition.
//! Nix reports fixed-output hashes in SRI form (`sha256-<base64>`), but older
//! definitions may still pin a bare base32 string, so parsing only rejects
//! values that could never be substituted safely.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Algorithm prefix reported by the probe build
pub const SHA256_PREFIX: &str = "sha256-";

#[derive(Debug, Error, PartialEq)]
pub enum HashError {
    #[error("Hash is empty")]
    Empty,

    #[error("Hash contains whitespace: '{0}'")]
    Whitespace(String),
}

/// A content hash recorded in a build definition
///
/// Compared by exact string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PinnedHash(String);

impl PinnedHash {
    /// Returns the hash text as written in the definition
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PinnedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PinnedHash {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(HashError::Empty);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(HashError::Whitespace(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for PinnedHash {
    type Error = HashError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PinnedHash> for String {
    fn from(hash: PinnedHash) -> Self {
        hash.0
    }
}
