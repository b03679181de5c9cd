//! hashbump - reconcile pinned dependency hashes in Nix package definitions

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = hashbump::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
