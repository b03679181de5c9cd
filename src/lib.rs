//! hashbump - keeps pinned dependency hashes in Nix package definitions current
//!
//! hashbump asks the build tool for a package's pinned hash and version,
//! provokes a hash mismatch to learn the correct hash, and rewrites the
//! package file in place, bumping its `YYYY.MM.DD.NNN` version along the way.

pub mod domain;
pub mod error;
pub mod tool;
pub mod storage;
pub mod reconcile;
pub mod cli;

pub use domain::{DateVersion, PackageMetadata, PackageRef, PinnedHash};
pub use error::{ReconcileError, ReconcileResult};
pub use reconcile::{Outcome, Reconciler, Report};
