//! # Storage Layer
//!
//! Everything hashbump reads from or writes to the working tree.
//!
//! ## Files
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Config | TOML | `hashbump.toml`, `~/.config/hashbump/config.toml` |
//! | Package definition | Nix source, patched as text | found by [`FileLocator`] |
//! | Reference file | Only its mtime is read | `go.mod` by default |
//!
//! ## Write Semantics
//!
//! [`Patcher`] reads the whole file, substitutes, and writes the whole file.
//! Writes are not atomic and there is no locking: hashbump is a single-operator
//! maintenance tool.
//!
//! ## Key Types
//!
//! - [`Config`] - Project and global configuration
//! - [`FileLocator`] - Finds the file pinning a hash
//! - [`StalenessGuard`] - Skips runs when the target is already newer
//! - [`Patcher`] - Hash replacement and version bumping

mod config;
mod guard;
mod locator;
mod patcher;

pub use config::{
    Config, ConfigError, GlobalConfig, GuardConfig, LocateConfig, LocateMode, ProjectConfig,
    ToolConfig, VersionConfig, CONFIG_FILE,
};
pub use guard::{Freshness, StalenessGuard};
pub use locator::{FileLocator, LocateStrategy};
pub use patcher::{substitute, Patcher, StepOutcome};
