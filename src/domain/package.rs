//! Package references and the metadata the build tool reports for them

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::hash::PinnedHash;

/// Store prefix of evaluated flake sources
const STORE_DIR: &str = "/nix/store";

/// Identifier used to address a package with the build tool
///
/// e.g. `path:.#packages.x86_64-linux.default`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageRef(String);

impl PackageRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Selects an attribute of the package (`<ref>.<name>`)
    pub fn attr(&self, name: &str) -> PackageRef {
        PackageRef(format!("{}.{}", self.0, name))
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current pinned state of a package definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    /// The pinned dependency hash
    pub hash: PinnedHash,

    /// The version string as evaluated
    pub version: String,

    /// File declaring the package, when position lookup was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Maps an evaluated source path back into the working tree
///
/// Flakes are evaluated from a copy in the store, so positions look like
/// `/nix/store/<hash>-source/pkgs/foo.nix`. The store directory and the
/// source entry are dropped, leaving `pkgs/foo.nix`. Paths outside the store
/// are returned unchanged.
pub fn source_relative_path(file: &Path) -> PathBuf {
    let Ok(rest) = file.strip_prefix(STORE_DIR) else {
        return file.to_path_buf();
    };

    rest.components()
        .skip(1)
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect()
}
