//! Parsing of hash-mismatch diagnostics
//!
//! A fixed-output derivation built with the wrong hash fails with:
//!
//! ```text
//! error: hash mismatch in fixed-output derivation '/nix/store/...-vendor.drv':
//!          specified: sha256-AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=
//!             got:    sha256-Xq3tV1o0vG2y4J0pOQ0Sj6Zx8yZb0H3I4P6C3m1r7rE=
//! ```
//!
//! The contract is the `got: (sha256-\S+)` line. When a build reports several
//! mismatches the last one wins, since it belongs to the derivation closest to
//! the package being probed.

use crate::domain::{PinnedHash, SHA256_PREFIX};

/// Extracts the hash from a single `got: sha256-...` line
pub fn parse_got_line(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix("got:")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let hash = rest.trim_start();
    if hash.len() <= SHA256_PREFIX.len()
        || !hash.starts_with(SHA256_PREFIX)
        || hash.contains(char::is_whitespace)
    {
        return None;
    }

    Some(hash)
}

/// Returns the hash from the last `got:` line of a diagnostic stream
pub fn parse_probe_output(diagnostics: &str) -> Option<PinnedHash> {
    diagnostics
        .lines()
        .filter_map(parse_got_line)
        .last()
        .and_then(|hash| hash.parse().ok())
}
