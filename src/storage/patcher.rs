//! In-place text substitution in the target file
//!
//! Each step reads the whole file, replaces every exact occurrence of the old
//! value and writes the whole file back. Steps are independent: a failure in
//! the version step leaves an already written hash update in place.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{DateVersion, PinnedHash};
use crate::error::{ReconcileError, ReconcileResult};

/// What a patch step did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    /// The value was replaced (or would be, in a dry run)
    Updated {
        from: String,
        to: String,
        occurrences: usize,
    },

    /// The file already holds the correct value
    NoChange { value: String },

    /// The step was not run
    Skipped { reason: String },
}

impl StepOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, StepOutcome::Updated { .. })
    }
}

/// Replaces every occurrence of `from` with `to`, returning the count
pub fn substitute(content: &str, from: &str, to: &str) -> (String, usize) {
    if from.is_empty() {
        return (content.to_string(), 0);
    }
    let count = content.matches(from).count();
    (content.replace(from, to), count)
}

/// Rewrites values in one file
pub struct Patcher {
    path: PathBuf,
    dry_run: bool,
}

impl Patcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            dry_run: false,
        }
    }

    /// Compute outcomes without writing
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Replaces the pinned hash
    pub fn replace_hash(&self, old: &PinnedHash, new: &PinnedHash) -> ReconcileResult<StepOutcome> {
        if old == new {
            return Ok(StepOutcome::NoChange {
                value: old.to_string(),
            });
        }
        self.replace(old.as_str(), new.as_str())
    }

    /// Bumps a date-coded version relative to `today`
    pub fn bump_version(&self, old: &str, today: NaiveDate) -> ReconcileResult<StepOutcome> {
        let invalid = |source| ReconcileError::InvalidVersion {
            version: old.to_string(),
            source,
        };
        let current: DateVersion = old.parse().map_err(invalid)?;
        let next = current.next(today).map_err(invalid)?.to_string();
        if next == old {
            return Ok(StepOutcome::NoChange {
                value: old.to_string(),
            });
        }
        self.replace(old, &next)
    }

    fn replace(&self, from: &str, to: &str) -> ReconcileResult<StepOutcome> {
        let content =
            fs::read_to_string(&self.path).map_err(|e| ReconcileError::io(&self.path, e))?;

        let (updated, occurrences) = substitute(&content, from, to);
        if occurrences == 0 {
            return Err(ReconcileError::NotInFile {
                needle: from.to_string(),
                path: self.path.clone(),
            });
        }

        if !self.dry_run {
            fs::write(&self.path, updated).map_err(|e| ReconcileError::io(&self.path, e))?;
        }

        Ok(StepOutcome::Updated {
            from: from.to_string(),
            to: to.to_string(),
            occurrences,
        })
    }
}
