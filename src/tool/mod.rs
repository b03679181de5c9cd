//! # Build Tool Integration
//!
//! Talks to the external package-build tool (Nix) through a pluggable
//! process runner.
//!
//! ## Protocol
//!
//! ```text
//! hashbump                          nix
//!  │                                 │
//!  ├── eval --json <pkg> --apply ... │
//!  │   stdout: {"vendorSha256": "...", "version": "..."}
//!  │                                 │
//!  ├── build <pkg>.invalidHash       │
//!  │   stderr: ... got: sha256-...   │
//!  │   exit: non-zero (expected)     │
//! ```
//!
//! ## Key Types
//!
//! - [`ProcessRunner`] - Seam for executing commands ([`SystemRunner`] in production)
//! - [`BuildTool`] - Builds invocations and interprets their output
//! - [`parse_probe_output`] - The `got: sha256-...` diagnostic contract

mod diagnostics;
mod nix;
mod runner;

pub use diagnostics::{parse_got_line, parse_probe_output};
pub use nix::{Attributes, BuildTool};
pub use runner::{Invocation, ProcessOutput, ProcessRunner, SystemRunner};

#[cfg(test)]
pub(crate) mod testing;
