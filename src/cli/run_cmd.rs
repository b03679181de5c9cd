//! `hashbump run` - the full reconciliation

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

use super::output::Output;
use super::session::{FileArgs, PackageArgs, Session};
use crate::reconcile::{Outcome, ReconcileOptions, Reconciler, VersionPolicy};
use crate::storage::LocateStrategy;

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub package: PackageArgs,

    #[command(flatten)]
    pub file: FileArgs,

    /// Reference file for the staleness guard (relative to the project root)
    #[arg(long)]
    pub reference: Option<PathBuf>,

    /// Run even if the package file is newer than the reference file
    #[arg(long)]
    pub no_guard: bool,

    /// When to bump the version (overrides `version.bump`)
    #[arg(long, value_enum)]
    pub version_bump: Option<VersionPolicy>,

    /// Date used for the version bump (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub today: Option<NaiveDate>,

    /// Show what would change without writing
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(session: &Session, args: RunArgs, output: &Output) -> Result<()> {
    let strategy = session.locate_strategy(&args.file);
    let tool = session.build_tool(output, strategy == LocateStrategy::Position);
    let today = args.today.unwrap_or_else(super::today);
    let version_policy = args
        .version_bump
        .unwrap_or(session.config().project.version.bump);

    let options = ReconcileOptions {
        package: session.package(&args.package),
        locator: session.locator(strategy.clone()),
        guard: session.guard(args.reference, args.no_guard),
        version_policy,
        today,
        dry_run: args.dry_run,
    };

    output.verbose_ctx(
        "run",
        &format!(
            "package={}, locate={:?}, guard={:?}, version_bump={:?}, today={}, dry_run={}",
            options.package,
            strategy,
            options.guard.as_ref().map(|g| g.reference().display().to_string()),
            version_policy,
            today,
            options.dry_run
        ),
    );

    let reconciler = Reconciler::new(tool, options);
    let outcome = reconciler.run(&mut |line: &str| output.progress(line))?;

    if output.is_json() {
        output.data(&outcome);
        return Ok(());
    }

    if let Outcome::Completed(report) = &outcome {
        if report.dry_run && (report.hash.is_updated() || report.version.is_updated()) {
            println!("Dry run: {} was not modified", report.file.display());
        }
    }

    Ok(())
}
