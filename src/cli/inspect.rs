//! Single-step commands for inspecting a package without patching it

use anyhow::{Context, Result};
use chrono::NaiveDate;

use super::output::Output;
use super::session::{FileArgs, PackageArgs, Session};
use crate::domain::DateVersion;
use crate::storage::{LocateMode, LocateStrategy};

/// `hashbump metadata`
pub fn metadata(session: &Session, args: &PackageArgs, output: &Output) -> Result<()> {
    let position = session.config().project.locate.mode == LocateMode::Position;
    let tool = session.build_tool(output, position);
    let package = session.package(args);

    output.verbose_ctx("metadata", &format!("Evaluating {}", package));
    let metadata = tool.read_metadata(&package)?;

    if output.is_json() {
        output.data(&metadata);
    } else {
        output.field(&tool.attrs().hash, &metadata.hash);
        output.field(&tool.attrs().version, &metadata.version);
        if let Some(file) = &metadata.file {
            output.field("file", &file.display());
        }
    }

    Ok(())
}

/// `hashbump probe`
pub fn probe(session: &Session, args: &PackageArgs, output: &Output) -> Result<()> {
    let tool = session.build_tool(output, false);
    let package = session.package(args);

    let pinned = tool.read_metadata(&package)?.hash;
    output.progress(&format!("Probing {}...", package));
    let probed = tool.probe_hash(&package)?;
    let matches = pinned == probed;

    if output.is_json() {
        output.data(&serde_json::json!({
            "package": package,
            "pinned": pinned,
            "probed": probed,
            "matches": matches,
        }));
    } else {
        output.field("pinned", &pinned);
        output.field("probed", &probed);
        if matches {
            println!("{} is up to date", tool.attrs().hash);
        } else {
            println!("{} is out of date", tool.attrs().hash);
        }
    }

    Ok(())
}

/// `hashbump locate`
pub fn locate(session: &Session, package: &PackageArgs, file: &FileArgs, output: &Output) -> Result<()> {
    let strategy = session.locate_strategy(file);
    let tool = session.build_tool(output, strategy == LocateStrategy::Position);
    let package = session.package(package);

    let metadata = tool.read_metadata(&package)?;
    let path = session.locator(strategy).locate(&metadata)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "package": package,
            "file": path.display().to_string(),
        }));
    } else {
        println!("{}", path.display());
    }

    Ok(())
}

/// `hashbump next-version`
pub fn next_version(version: &str, today: Option<NaiveDate>, output: &Output) -> Result<()> {
    let current = version
        .parse::<DateVersion>()
        .with_context(|| format!("Can't bump version '{}'", version))?;
    let today = today.unwrap_or_else(super::today);
    let next = current
        .next(today)
        .with_context(|| format!("Can't bump version '{}'", version))?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "version": current,
            "next": next,
            "date": today,
        }));
    } else {
        println!("{}", next);
    }

    Ok(())
}
