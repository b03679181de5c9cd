//! # Command-Line Interface
//!
//! User-facing commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `run` | Full reconciliation: metadata, locate, guard, probe, patch |
//! | `metadata` | Show the pinned hash and version |
//! | `probe` | Show the hash the build tool computes |
//! | `locate` | Show the file pinning the hash |
//! | `next-version` | Compute the next `YYYY.MM.DD.NNN` version |
//! | `init` | Write a default `hashbump.toml` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable progress lines
//! - `json` - A single machine-parseable JSON document
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output and to stream the build
//! tool's own output:
//! ```bash
//! hashbump --verbose run
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod session;
mod run_cmd;
mod inspect;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};

/// Today's date in local time
fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}
