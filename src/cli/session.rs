//! Wiring configuration and flags into library components

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use super::output::Output;
use crate::domain::PackageRef;
use crate::storage::{Config, FileLocator, LocateMode, LocateStrategy, StalenessGuard};
use crate::tool::{Attributes, BuildTool, SystemRunner};

/// Flags selecting the package
#[derive(Args, Debug, Default)]
pub struct PackageArgs {
    /// Package reference (overrides `package` in hashbump.toml)
    #[arg(long, short = 'p')]
    pub package: Option<String>,
}

/// Flags selecting the target file
#[derive(Args, Debug, Default)]
pub struct FileArgs {
    /// Patch this file instead of locating it (relative to the project root)
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Loaded configuration for one command invocation
pub struct Session {
    config: Config,
}

impl Session {
    /// Loads configuration from `root` as given, or from the project around the current directory
    pub fn open(root: Option<&Path>, config_file: Option<&Path>, output: &Output) -> Result<Self> {
        let config = match root {
            Some(root) => Config::load_at(root.to_path_buf(), config_file)?,
            None => {
                let cwd = std::env::current_dir().context("Failed to read current directory")?;
                Config::load(&cwd, config_file)?
            }
        };
        output.verbose_ctx(
            "config",
            &format!(
                "Project root: {}, config: {}",
                config.project_root.display(),
                config
                    .source
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "defaults".to_string())
            ),
        );

        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.config.project_root
    }

    pub fn package(&self, args: &PackageArgs) -> PackageRef {
        PackageRef::new(
            args.package
                .clone()
                .unwrap_or_else(|| self.config.project.package.clone()),
        )
    }

    /// Builds the Nix adapter; `needs_position` requests the declaring file
    pub fn build_tool(&self, output: &Output, needs_position: bool) -> BuildTool<SystemRunner> {
        let project = &self.config.project;
        let tool = self.config.tool();

        output.verbose_ctx(
            "tool",
            &format!("Using {} {}", tool.program, tool.extra_args.join(" ")),
        );

        BuildTool::new(SystemRunner::new().echo(output.is_verbose() && output.is_text()))
            .program(tool.program)
            .extra_args(tool.extra_args)
            .print_build_logs(tool.print_build_logs)
            .working_dir(self.root())
            .attributes(Attributes {
                hash: project.hash_attr.clone(),
                version: project.version_attr.clone(),
                probe: project.probe_attr.clone(),
                position: needs_position.then(|| project.locate.position_attr.clone()),
            })
    }

    /// Chooses how to find the target file; an explicit file wins over config
    pub fn locate_strategy(&self, args: &FileArgs) -> LocateStrategy {
        let locate = &self.config.project.locate;

        if let Some(path) = args.file.clone().or_else(|| locate.file.clone()) {
            return LocateStrategy::Path { path };
        }

        match locate.mode {
            LocateMode::Search => LocateStrategy::Search {
                extension: locate.extension.clone(),
            },
            LocateMode::Position => LocateStrategy::Position,
        }
    }

    pub fn locator(&self, strategy: LocateStrategy) -> FileLocator {
        FileLocator::new(self.root(), strategy)
    }

    /// Staleness guard from config, unless disabled; `reference` overrides the file
    pub fn guard(&self, reference: Option<PathBuf>, disabled: bool) -> Option<StalenessGuard> {
        let guard = &self.config.project.guard;
        if disabled || (!guard.enabled && reference.is_none()) {
            return None;
        }

        let reference = reference.unwrap_or_else(|| guard.reference.clone());
        Some(StalenessGuard::new(self.root().join(reference)))
    }
}
