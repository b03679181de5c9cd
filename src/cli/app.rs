//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::run_cmd::{self, RunArgs};
use super::session::{FileArgs, PackageArgs, Session};
use super::inspect;
use crate::storage::Config;

#[derive(Parser)]
#[command(name = "hashbump")]
#[command(author, version, about = "Reconcile pinned dependency hashes in Nix package definitions")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (defaults to the nearest directory with hashbump.toml or flake.nix)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Config file to use instead of <root>/hashbump.toml
    #[arg(long, global = true, env = "HASHBUMP_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe the correct hash, patch it in and bump the version
    Run(RunArgs),

    /// Show the pinned hash and version
    Metadata {
        #[command(flatten)]
        package: PackageArgs,
    },

    /// Build with a placeholder hash and show the hash the build reports
    Probe {
        #[command(flatten)]
        package: PackageArgs,
    },

    /// Show the file that pins the hash
    Locate {
        #[command(flatten)]
        package: PackageArgs,

        #[command(flatten)]
        file: FileArgs,
    },

    /// Compute the version following a YYYY.MM.DD.NNN version
    NextVersion {
        /// Current version
        #[arg(value_name = "VERSION")]
        current: String,

        /// Release date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Write a default hashbump.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);

    output.verbose("hashbump starting");

    match cli.command {
        Commands::Run(args) => {
            let session = Session::open(cli.root.as_deref(), cli.config.as_deref(), &output)?;
            run_cmd::run(&session, args, &output)?
        }

        Commands::Metadata { package } => {
            let session = Session::open(cli.root.as_deref(), cli.config.as_deref(), &output)?;
            inspect::metadata(&session, &package, &output)?
        }

        Commands::Probe { package } => {
            let session = Session::open(cli.root.as_deref(), cli.config.as_deref(), &output)?;
            inspect::probe(&session, &package, &output)?
        }

        Commands::Locate { package, file } => {
            let session = Session::open(cli.root.as_deref(), cli.config.as_deref(), &output)?;
            inspect::locate(&session, &package, &file, &output)?
        }

        Commands::NextVersion { current, today } => inspect::next_version(&current, today, &output)?,

        Commands::Init { force } => {
            let root = match cli.root {
                Some(root) => root,
                None => std::env::current_dir()?,
            };
            output.verbose_ctx("init", &format!("Writing config into {}", root.display()));
            let path = Config::write_default(&root, force)?;
            output.success(&format!("Created {}", path.display()));
        }
    }

    output.verbose("Command completed successfully");
    Ok(())
}
