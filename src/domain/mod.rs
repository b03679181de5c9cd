//! Domain models for hashbump
//!
//! Value types for hashes, versions and package references, without any I/O.

mod hash;
mod package;
mod version;

pub use hash::{HashError, PinnedHash, SHA256_PREFIX};
pub use package::{source_relative_path, PackageMetadata, PackageRef};
pub use version::{DateVersion, VersionError};
