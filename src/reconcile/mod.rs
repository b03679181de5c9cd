//! # Hash Reconciliation
//!
//! Brings a package definition's pinned dependency hash in line with the hash
//! the build tool actually computes, then bumps its date-coded version.
//!
//! ## Steps
//!
//! | Step | Component | Short-circuit |
//! |------|-----------|---------------|
//! | 1. Read metadata | [`BuildTool::read_metadata`](crate::tool::BuildTool::read_metadata) | - |
//! | 2. Locate file | [`FileLocator`](crate::storage::FileLocator) | - |
//! | 3. Staleness guard | [`StalenessGuard`](crate::storage::StalenessGuard) | [`Outcome::Skipped`] |
//! | 4. Probe hash | [`BuildTool::probe_hash`](crate::tool::BuildTool::probe_hash) | - |
//! | 5. Patch hash, bump version | [`Patcher`](crate::storage::Patcher) | [`StepOutcome::NoChange`](crate::storage::StepOutcome) |
//!
//! Any error aborts the run; writes already made stay on disk.

mod reconciler;

pub use reconciler::{Outcome, ReconcileOptions, Reconciler, Report, VersionPolicy};
