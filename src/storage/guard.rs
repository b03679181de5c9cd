//! Staleness guard
//!
//! The pinned hash only needs refreshing after the dependency lock file
//! changes. When the package file is already at least as new as the lock
//! file, a previous run (or a human) has updated it and the run is skipped.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};

use crate::error::{ReconcileError, ReconcileResult};

/// Result of comparing target and reference modification times
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    /// Target is older than the reference; the run proceeds
    Stale {
        target: DateTime<Local>,
        reference: DateTime<Local>,
    },

    /// Target is not older than the reference; the run is skipped
    Fresh {
        target: DateTime<Local>,
        reference: DateTime<Local>,
    },
}

impl Freshness {
    pub fn should_skip(&self) -> bool {
        matches!(self, Freshness::Fresh { .. })
    }
}

/// Compares a target file against a reference file (e.g. `go.mod`)
#[derive(Debug, Clone)]
pub struct StalenessGuard {
    reference: PathBuf,
}

impl StalenessGuard {
    pub fn new(reference: impl Into<PathBuf>) -> Self {
        Self {
            reference: reference.into(),
        }
    }

    pub fn reference(&self) -> &Path {
        &self.reference
    }

    pub fn check(&self, target: &Path) -> ReconcileResult<Freshness> {
        let target_mtime = modified(target)?;
        let reference_mtime = modified(&self.reference)?;

        let target = DateTime::<Local>::from(target_mtime);
        let reference = DateTime::<Local>::from(reference_mtime);

        if target_mtime >= reference_mtime {
            Ok(Freshness::Fresh { target, reference })
        } else {
            Ok(Freshness::Stale { target, reference })
        }
    }
}

fn modified(path: &Path) -> ReconcileResult<SystemTime> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| ReconcileError::io(path, e))
}
