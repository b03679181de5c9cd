//! The reconciliation run

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{PackageMetadata, PackageRef, PinnedHash};
use crate::error::ReconcileResult;
use crate::storage::{FileLocator, Freshness, Patcher, StalenessGuard, StepOutcome};
use crate::tool::{BuildTool, ProcessRunner};

/// When the version step runs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum VersionPolicy {
    /// After every probe, even when the hash was already correct
    Always,
    /// Only when the hash step rewrote the file
    #[default]
    OnHashChange,
    /// Never touch the version
    Never,
}

/// Everything a run needs besides the build tool
pub struct ReconcileOptions {
    pub package: PackageRef,
    pub locator: FileLocator,
    /// `None` disables the staleness check
    pub guard: Option<StalenessGuard>,
    pub version_policy: VersionPolicy,
    pub today: NaiveDate,
    pub dry_run: bool,
}

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub package: PackageRef,
    pub file: PathBuf,
    pub metadata: PackageMetadata,
    pub probed: PinnedHash,
    pub hash: StepOutcome,
    pub version: StepOutcome,
    pub dry_run: bool,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The staleness guard stopped the run before probing
    Skipped {
        package: PackageRef,
        file: PathBuf,
        reason: String,
    },

    /// All steps ran
    Completed(Report),
}

/// Sequences metadata, locate, guard, probe and patch steps
pub struct Reconciler<R> {
    tool: BuildTool<R>,
    options: ReconcileOptions,
}

impl<R: ProcessRunner> Reconciler<R> {
    pub fn new(tool: BuildTool<R>, options: ReconcileOptions) -> Self {
        Self { tool, options }
    }

    /// Runs every step, reporting progress lines through `progress`
    pub fn run(&self, progress: &mut dyn FnMut(&str)) -> ReconcileResult<Outcome> {
        let package = &self.options.package;
        let attrs = self.tool.attrs();

        progress(&format!("Reading {} and {} of {}", attrs.hash, attrs.version, package));
        let metadata = self.tool.read_metadata(package)?;

        let file = self.options.locator.locate(&metadata)?;
        progress(&format!(
            "{} is at {} {}",
            file.display(),
            metadata.hash,
            metadata.version
        ));

        if let Some(guard) = &self.options.guard {
            match guard.check(&file)? {
                Freshness::Fresh { target, reference } => {
                    let reason = format!(
                        "{} is newer than {} ({} >= {})",
                        file.display(),
                        guard.reference().display(),
                        target,
                        reference
                    );
                    progress(&format!("{} - skip bump", reason));
                    return Ok(Outcome::Skipped {
                        package: package.clone(),
                        file,
                        reason,
                    });
                }
                Freshness::Stale { target, reference } => progress(&format!(
                    "{} is older than {} - {} < {}",
                    file.display(),
                    guard.reference().display(),
                    target,
                    reference
                )),
            }
        }

        progress(&format!("Checking {}...", attrs.hash));
        let probed = self.tool.probe_hash(package)?;

        let patcher = Patcher::new(&file).dry_run(self.options.dry_run);

        let hash = patcher.replace_hash(&metadata.hash, &probed)?;
        match &hash {
            StepOutcome::Updated { from, to, .. } => {
                progress(&format!("Updating {} {} => {}", attrs.hash, from, to))
            }
            _ => progress(&format!("Skipping {} update", attrs.hash)),
        }

        let version = match self.options.version_policy {
            VersionPolicy::Never => StepOutcome::Skipped {
                reason: "version bumping disabled".to_string(),
            },
            VersionPolicy::OnHashChange if !hash.is_updated() => StepOutcome::Skipped {
                reason: format!("{} unchanged", attrs.hash),
            },
            _ => {
                progress("Checking version...");
                patcher.bump_version(&metadata.version, self.options.today)?
            }
        };
        match &version {
            StepOutcome::Updated { from, to, .. } => {
                progress(&format!("Updating version {} => {}", from, to))
            }
            _ => progress("Skipping version update"),
        }

        Ok(Outcome::Completed(Report {
            package: package.clone(),
            file,
            metadata,
            probed,
            hash,
            version,
            dry_run: self.options.dry_run,
        }))
    }
}
