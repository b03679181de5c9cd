//! Nix build tool adapter
//!
//! Two invocations are needed:
//!
//! | Step | Command |
//! |------|---------|
//! | Metadata | `nix [args] eval --json <pkg> --apply 'p: { inherit (p) <hash> <version>; }'` |
//! | Probe | `nix [args] -L build <pkg>.<probe attr> --no-link` |
//!
//! `[args]` are the configured extra arguments, placed first so they act as
//! global options (and so a wrapper script can be configured as the program).
//!
//! The probe attribute is expected to be the package with its dependency
//! hash replaced by a placeholder, so the build always fails with a hash
//! mismatch naming the real hash.

use std::path::PathBuf;

use serde_json::{Map, Value};

use super::diagnostics::parse_probe_output;
use super::runner::{Invocation, ProcessOutput, ProcessRunner};
use crate::domain::{PackageMetadata, PackageRef, PinnedHash};
use crate::error::{ReconcileError, ReconcileResult};

/// Package attributes the tool reads and builds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attributes {
    /// Attribute holding the pinned hash (e.g. `vendorSha256`)
    pub hash: String,

    /// Attribute holding the version string
    pub version: String,

    /// Attribute building the package with a placeholder hash
    pub probe: String,

    /// Attribute whose definition position names the package file
    pub position: Option<String>,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            hash: "vendorSha256".to_string(),
            version: "version".to_string(),
            probe: "invalidHash".to_string(),
            position: None,
        }
    }
}

/// Drives the build tool through a [`ProcessRunner`]
pub struct BuildTool<R> {
    runner: R,
    program: String,
    extra_args: Vec<String>,
    print_build_logs: bool,
    working_dir: Option<PathBuf>,
    attrs: Attributes,
}

impl<R: ProcessRunner> BuildTool<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            program: "nix".to_string(),
            extra_args: Vec::new(),
            print_build_logs: false,
            working_dir: None,
            attrs: Attributes::default(),
        }
    }

    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Arguments passed to every invocation (e.g. experimental features)
    pub fn extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    pub fn print_build_logs(mut self, enabled: bool) -> Self {
        self.print_build_logs = enabled;
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn attributes(mut self, attrs: Attributes) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    /// Nix expression selecting the metadata fields as a JSON object
    pub fn metadata_expression(&self) -> String {
        let inherit = format!("inherit (p) {} {};", self.attrs.hash, self.attrs.version);
        match &self.attrs.position {
            Some(attr) => format!(
                "p: {{ inherit (builtins.unsafeGetAttrPos \"{}\" p) file; {} }}",
                attr, inherit
            ),
            None => format!("p: {{ {} }}", inherit),
        }
    }

    pub fn metadata_invocation(&self, package: &PackageRef) -> Invocation {
        Invocation::new(&self.program)
            .args(self.extra_args.iter().cloned())
            .args(["eval", "--json", package.as_str()])
            .arg("--apply")
            .arg(self.metadata_expression())
            .current_dir(self.working_dir.clone())
    }

    pub fn probe_invocation(&self, package: &PackageRef) -> Invocation {
        let mut invocation = Invocation::new(&self.program).args(self.extra_args.iter().cloned());
        if self.print_build_logs {
            invocation = invocation.arg("-L");
        }
        invocation
            .arg("build")
            .arg(package.attr(&self.attrs.probe).as_str())
            .arg("--no-link")
            .current_dir(self.working_dir.clone())
    }

    /// Evaluates the pinned hash and version of `package`
    pub fn read_metadata(&self, package: &PackageRef) -> ReconcileResult<PackageMetadata> {
        let invocation = self.metadata_invocation(package);
        let unavailable = |reason: String| ReconcileError::MetadataUnavailable {
            package: package.to_string(),
            reason,
        };

        let output = self
            .runner
            .run(&invocation)
            .map_err(|e| unavailable(format!("failed to run {}: {}", self.program, e)))?;

        if !output.success {
            return Err(unavailable(format!(
                "{} exited with {}{}",
                self.program,
                output.exit_description(),
                last_line_suffix(&output)
            )));
        }

        let object = parse_json_object(&output.stdout)
            .ok_or_else(|| unavailable("no JSON object in evaluation output".to_string()))?;

        let hash = string_field(&object, &self.attrs.hash)
            .ok_or_else(|| unavailable(format!("'{}' is missing or not a string", self.attrs.hash)))?
            .parse::<PinnedHash>()
            .map_err(|e| unavailable(format!("'{}': {}", self.attrs.hash, e)))?;

        let version = string_field(&object, &self.attrs.version)
            .ok_or_else(|| {
                unavailable(format!("'{}' is missing or not a string", self.attrs.version))
            })?
            .to_string();

        let file = string_field(&object, "file").map(PathBuf::from);

        Ok(PackageMetadata {
            hash,
            version,
            file,
        })
    }

    /// Builds the probe attribute and returns the hash the tool computed
    pub fn probe_hash(&self, package: &PackageRef) -> ReconcileResult<PinnedHash> {
        let invocation = self.probe_invocation(package);
        let failed = |reason: String| ReconcileError::ProbeFailed {
            package: package.to_string(),
            reason,
        };

        let output = self
            .runner
            .run(&invocation)
            .map_err(|e| failed(format!("failed to run {}: {}", self.program, e)))?;

        match parse_probe_output(&output.stderr) {
            Some(hash) => Ok(hash),
            None if output.success => Err(failed(
                "build succeeded without reporting a hash mismatch".to_string(),
            )),
            None => Err(failed(format!(
                "build failed with {} without reporting a hash{}",
                output.exit_description(),
                last_line_suffix(&output)
            ))),
        }
    }
}

/// Finds the JSON object printed by `nix eval --json`
fn parse_json_object(stdout: &str) -> Option<Map<String, Value>> {
    let as_object = |text: &str| match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    };

    as_object(stdout.trim()).or_else(|| {
        stdout
            .lines()
            .rev()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .find_map(as_object)
    })
}

fn string_field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object.get(key).and_then(Value::as_str)
}

/// `": <last stderr line>"`, or nothing when stderr is empty
fn last_line_suffix(output: &ProcessOutput) -> String {
    output
        .stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(|l| format!(": {}", l))
        .unwrap_or_default()
}
