//! CLI integration tests for hashbump
//!
//! These tests drive the binary against a fake `nix` shell script, so the
//! whole pipeline runs: metadata evaluation, file lookup, staleness guard,
//! probe build and in-place patching.

#![cfg(unix)]

use predicates::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

const OLD_HASH: &str = "sha256-oldoldoldoldoldoldoldoldoldoldoldoldold=";
const NEW_HASH: &str = "sha256-newnewnewnewnewnewnewnewnewnewnewnewnew=";
const VERSION: &str = "2024.03.15.003";

/// Get a command instance for the hashbump binary
fn hashbump_cmd(dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("hashbump"));
    cmd.current_dir(dir)
        .env_remove("HASHBUMP_CONFIG")
        .env("HOME", dir.join("home"))
        .env("XDG_CONFIG_HOME", dir.join("home/.config"));
    cmd
}

/// Behaviour of the fake build tool
struct FakeNix {
    eval_stdout: String,
    eval_exit: i32,
    build_stderr: String,
    build_exit: i32,
}

impl Default for FakeNix {
    fn default() -> Self {
        Self {
            eval_stdout: format!(r#"{{"vendorSha256":"{}","version":"{}"}}"#, OLD_HASH, VERSION),
            eval_exit: 0,
            build_stderr: format!(
                "error: hash mismatch in fixed-output derivation '/nix/store/x-go-modules.drv':\n         specified: sha256-AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=\n            got:    {}\n",
                NEW_HASH
            ),
            build_exit: 1,
        }
    }
}

impl FakeNix {
    /// Writes the script, its canned outputs and a config pointing at it
    fn install(&self, dir: &Path) {
        let tool_dir = dir.join(".fake-nix");
        fs::create_dir_all(&tool_dir).unwrap();
        fs::write(tool_dir.join("eval.out"), &self.eval_stdout).unwrap();
        fs::write(tool_dir.join("build.err"), &self.build_stderr).unwrap();

        let script = format!(
            r#"#!/bin/sh
here="{dir}"
echo "$*" >> "$here/calls.log"
for arg in "$@"; do
  case "$arg" in
    eval) cat "$here/eval.out"; exit {eval_exit};;
    build) cat "$here/build.err" >&2; exit {build_exit};;
  esac
done
echo "unexpected arguments: $*" >&2
exit 2
"#,
            dir = tool_dir.display(),
            eval_exit = self.eval_exit,
            build_exit = self.build_exit,
        );
        fs::write(tool_dir.join("nix.sh"), script).unwrap();

        let config = format!(
            r#"package = ".#default"

[tool]
program = "sh"
extra_args = ['{}']
print_build_logs = false

[guard]
enabled = true
reference = "go.mod"
"#,
            tool_dir.join("nix.sh").display()
        );
        fs::write(dir.join("hashbump.toml"), config).unwrap();
    }
}

fn set_mtime(path: &Path, secs_ago: u64) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(SystemTime::now() - Duration::from_secs(secs_ago))
        .unwrap();
}

fn package_source() -> String {
    format!(
        r#"{{ buildGoModule }}:
buildGoModule rec {{
  pname = "tullia";
  version = "{}";
  vendorSha256 = "{}";
}}
"#,
        VERSION, OLD_HASH
    )
}

/// A project whose package file is older than go.mod
fn setup_project(fake: FakeNix) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("flake.nix"), "{ outputs = _: {}; }\n").unwrap();
    fs::create_dir_all(dir.path().join("pkgs")).unwrap();
    fs::write(dir.path().join("pkgs/tullia.nix"), package_source()).unwrap();
    fs::write(dir.path().join("go.mod"), "module tullia\n").unwrap();
    set_mtime(&dir.path().join("pkgs/tullia.nix"), 3600);
    set_mtime(&dir.path().join("go.mod"), 60);
    fake.install(dir.path());
    dir
}

fn package_file(dir: &TempDir) -> PathBuf {
    dir.path().join("pkgs/tullia.nix")
}

fn calls(dir: &TempDir) -> Vec<String> {
    fs::read_to_string(dir.path().join(".fake-nix/calls.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Run Tests
// =============================================================================

#[test]
fn test_run_updates_hash_and_version() {
    let dir = setup_project(FakeNix::default());

    hashbump_cmd(dir.path())
        .args(["run", "--today", "2024-03-15"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "Updating vendorSha256 {} => {}",
            OLD_HASH, NEW_HASH
        )))
        .stdout(predicate::str::contains(
            "Updating version 2024.03.15.003 => 2024.03.15.004",
        ));

    let content = fs::read_to_string(package_file(&dir)).unwrap();
    assert!(content.contains(&format!("vendorSha256 = \"{}\";", NEW_HASH)));
    assert!(content.contains("version = \"2024.03.15.004\";"));
    assert!(!content.contains(OLD_HASH));
}

#[test]
fn test_run_resets_sequence_on_new_day() {
    let dir = setup_project(FakeNix::default());

    hashbump_cmd(dir.path())
        .args(["run", "--today", "2024-03-16"])
        .assert()
        .success();

    let content = fs::read_to_string(package_file(&dir)).unwrap();
    assert!(content.contains("version = \"2024.03.16.001\";"));
}

#[test]
fn test_run_invokes_eval_then_build() {
    let dir = setup_project(FakeNix::default());

    hashbump_cmd(dir.path())
        .args(["run", "--today", "2024-03-15"])
        .assert()
        .success();

    let calls = calls(&dir);
    assert_eq!(calls.len(), 2);
    assert!(calls[0].contains("eval --json .#default"));
    assert!(calls[0].contains("inherit (p) vendorSha256 version;"));
    assert!(calls[1].contains("build .#default.invalidHash --no-link"));
}

#[test]
fn test_run_skips_when_package_is_newer() {
    let dir = setup_project(FakeNix::default());
    set_mtime(&package_file(&dir), 1);

    hashbump_cmd(dir.path())
        .args(["run", "--today", "2024-03-15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("skip bump"));

    assert_eq!(fs::read_to_string(package_file(&dir)).unwrap(), package_source());
    assert_eq!(calls(&dir).len(), 1, "probe must not run");
}

#[test]
fn test_run_no_guard_ignores_mtimes() {
    let dir = setup_project(FakeNix::default());
    set_mtime(&package_file(&dir), 1);

    hashbump_cmd(dir.path())
        .args(["run", "--no-guard", "--today", "2024-03-15"])
        .assert()
        .success();

    assert!(fs::read_to_string(package_file(&dir))
        .unwrap()
        .contains(NEW_HASH));
}

#[test]
fn test_run_with_custom_reference() {
    let dir = setup_project(FakeNix::default());
    fs::write(dir.path().join("go.sum"), "").unwrap();
    set_mtime(&dir.path().join("go.sum"), 7200);

    // Package file (1h old) is newer than go.sum (2h old)
    hashbump_cmd(dir.path())
        .args(["run", "--reference", "go.sum", "--today", "2024-03-15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("skip bump"));
}

#[test]
fn test_run_dry_run_writes_nothing() {
    let dir = setup_project(FakeNix::default());

    hashbump_cmd(dir.path())
        .args(["run", "--dry-run", "--today", "2024-03-15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    assert_eq!(fs::read_to_string(package_file(&dir)).unwrap(), package_source());
}

#[test]
fn test_run_same_hash_still_bumps_version() {
    let dir = setup_project(FakeNix {
        build_stderr: format!("            got:    {}\n", OLD_HASH),
        ..FakeNix::default()
    });

    hashbump_cmd(dir.path())
        .args(["run", "--version-bump", "always", "--today", "2024-03-15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipping vendorSha256 update"));

    let content = fs::read_to_string(package_file(&dir)).unwrap();
    assert!(content.contains(OLD_HASH));
    assert!(content.contains("2024.03.15.004"));
}

#[test]
fn test_run_same_hash_leaves_file_unchanged_by_default() {
    let dir = setup_project(FakeNix {
        build_stderr: format!("            got:    {}\n", OLD_HASH),
        ..FakeNix::default()
    });

    hashbump_cmd(dir.path())
        .args(["run", "--no-guard", "--today", "2024-03-15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipping version update"));

    assert_eq!(fs::read_to_string(package_file(&dir)).unwrap(), package_source());
}

#[test]
fn test_run_json_output() {
    let dir = setup_project(FakeNix::default());

    let output = hashbump_cmd(dir.path())
        .args(["run", "--today", "2024-03-15", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(json["outcome"], "completed");
    assert_eq!(json["probed"], NEW_HASH);
    assert_eq!(json["hash"]["status"], "updated");
    assert_eq!(json["version"]["to"], "2024.03.15.004");
    assert_eq!(json["dry_run"], false);
}

#[test]
fn test_run_with_explicit_file() {
    let dir = setup_project(FakeNix::default());

    hashbump_cmd(dir.path())
        .args(["run", "--file", "pkgs/tullia.nix", "--today", "2024-03-15"])
        .assert()
        .success();

    assert!(fs::read_to_string(package_file(&dir))
        .unwrap()
        .contains(NEW_HASH));
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_run_fails_when_metadata_unavailable() {
    let dir = setup_project(FakeNix {
        eval_stdout: "error: flake does not provide attribute\n".to_string(),
        eval_exit: 1,
        ..FakeNix::default()
    });

    hashbump_cmd(dir.path())
        .args(["run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("couldn't get package data"));
}

#[test]
fn test_run_fails_when_no_file_has_hash() {
    let dir = setup_project(FakeNix::default());
    fs::write(package_file(&dir), "{ }\n").unwrap();

    hashbump_cmd(dir.path())
        .args(["run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("couldn't find the package definition"));
}

#[test]
fn test_run_fails_when_probe_reports_no_hash() {
    let dir = setup_project(FakeNix {
        build_stderr: "error: builder for '/nix/store/x.drv' failed with exit code 2\n".to_string(),
        ..FakeNix::default()
    });

    hashbump_cmd(dir.path())
        .args(["run", "--today", "2024-03-15"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("couldn't probe hash"))
        .stderr(predicate::str::contains("failed with exit code 2"));

    assert_eq!(fs::read_to_string(package_file(&dir)).unwrap(), package_source());
}

#[test]
fn test_run_fails_on_non_date_version() {
    let dir = setup_project(FakeNix {
        eval_stdout: format!(r#"{{"vendorSha256":"{}","version":"0.4.1"}}"#, OLD_HASH),
        ..FakeNix::default()
    });

    hashbump_cmd(dir.path())
        .args(["run", "--today", "2024-03-15"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("can't bump version '0.4.1'"));

    // The hash step already wrote its change
    assert!(fs::read_to_string(package_file(&dir))
        .unwrap()
        .contains(NEW_HASH));
}

// =============================================================================
// Inspection Tests
// =============================================================================

#[test]
fn test_metadata_shows_pinned_values() {
    let dir = setup_project(FakeNix::default());

    hashbump_cmd(dir.path())
        .arg("metadata")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("vendorSha256: {}", OLD_HASH)))
        .stdout(predicate::str::contains(format!("version: {}", VERSION)));
}

#[test]
fn test_probe_reports_mismatch_as_json() {
    let dir = setup_project(FakeNix::default());

    let output = hashbump_cmd(dir.path())
        .args(["probe", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["pinned"], OLD_HASH);
    assert_eq!(json["probed"], NEW_HASH);
    assert_eq!(json["matches"], false);

    // Probing never writes
    assert_eq!(fs::read_to_string(package_file(&dir)).unwrap(), package_source());
}

#[test]
fn test_locate_prints_package_file() {
    let dir = setup_project(FakeNix::default());

    hashbump_cmd(dir.path())
        .arg("locate")
        .assert()
        .success()
        .stdout(predicate::str::contains("pkgs/tullia.nix"));
}

#[test]
fn test_next_version() {
    let dir = TempDir::new().unwrap();

    hashbump_cmd(dir.path())
        .args(["next-version", "2024.03.15.003", "--today", "2024-03-15"])
        .assert()
        .success()
        .stdout("2024.03.15.004\n");

    hashbump_cmd(dir.path())
        .args(["next-version", "2024.03.15.003", "--today", "2024-03-16"])
        .assert()
        .success()
        .stdout("2024.03.16.001\n");
}

#[test]
fn test_next_version_rejects_semver() {
    let dir = TempDir::new().unwrap();

    hashbump_cmd(dir.path())
        .args(["next-version", "1.2.3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid version format"));
}

// =============================================================================
// Init Tests
// =============================================================================

#[test]
fn test_init_writes_config() {
    let dir = TempDir::new().unwrap();

    hashbump_cmd(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));

    let config = fs::read_to_string(dir.path().join("hashbump.toml")).unwrap();
    assert!(config.contains("hash_attr = \"vendorSha256\""));

    hashbump_cmd(dir.path()).arg("init").assert().failure();
    hashbump_cmd(dir.path()).args(["init", "--force"]).assert().success();
}
