//! Configuration handling for hashbump
//!
//! Configuration is stored in `hashbump.toml` (project) and
//! `~/.config/hashbump/config.toml` (global). The global file only supplies
//! build tool defaults; everything about the package lives in the project.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reconcile::VersionPolicy;

/// Project configuration file name
pub const CONFIG_FILE: &str = "hashbump.toml";

/// Files marking a project root when no config file exists
const ROOT_MARKERS: &[&str] = &[CONFIG_FILE, "flake.nix"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// How the build tool is invoked
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolConfig {
    /// Build tool executable
    pub program: String,

    /// Arguments passed to every invocation
    pub extra_args: Vec<String>,

    /// Pass `-L` so build logs are printed in full
    pub print_build_logs: bool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: "nix".to_string(),
            extra_args: vec![
                "--extra-experimental-features".to_string(),
                "nix-command flakes".to_string(),
            ],
            print_build_logs: true,
        }
    }
}

/// Target file lookup mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LocateMode {
    /// Scan the source tree for the pinned hash
    #[default]
    Search,
    /// Use the position where the package is declared
    Position,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LocateConfig {
    pub mode: LocateMode,

    /// Extension of files searched in `search` mode
    pub extension: String,

    /// Attribute whose position names the file in `position` mode
    pub position_attr: String,

    /// Fixed target file, relative to the project root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LocateConfig {
    fn default() -> Self {
        Self {
            mode: LocateMode::Search,
            extension: "nix".to_string(),
            position_attr: "pname".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GuardConfig {
    pub enabled: bool,

    /// File whose changes trigger a hash refresh, relative to the project root
    pub reference: PathBuf,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reference: PathBuf::from("go.mod"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct VersionConfig {
    pub bump: VersionPolicy,
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProjectConfig {
    /// Package reference passed to the build tool
    pub package: String,

    /// Attribute holding the pinned hash
    pub hash_attr: String,

    /// Attribute holding the version string
    pub version_attr: String,

    /// Attribute building the package with a placeholder hash
    pub probe_attr: String,

    /// Build tool settings (falls back to the global config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<ToolConfig>,

    pub locate: LocateConfig,

    pub guard: GuardConfig,

    pub version: VersionConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            package: ".#defaultPackage.x86_64-linux".to_string(),
            hash_attr: "vendorSha256".to_string(),
            version_attr: "version".to_string(),
            probe_attr: "invalidHash".to_string(),
            tool: None,
            locate: LocateConfig::default(),
            guard: GuardConfig::default(),
            version: VersionConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Rejects values that would produce a broken build tool expression
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.package.trim().is_empty() {
            return Err(ConfigError::Invalid("package must not be empty".to_string()));
        }

        for (key, value) in [
            ("hash_attr", &self.hash_attr),
            ("version_attr", &self.version_attr),
            ("probe_attr", &self.probe_attr),
            ("locate.position_attr", &self.locate.position_attr),
        ] {
            if !is_attr_name(value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a plain attribute name, got '{}'",
                    key, value
                )));
            }
        }

        if self.locate.extension.is_empty() || self.locate.extension.starts_with('.') {
            return Err(ConfigError::Invalid(format!(
                "locate.extension must be given without a dot, got '{}'",
                self.locate.extension
            )));
        }

        Ok(())
    }
}

/// Nix identifier: letter or `_`, then letters, digits, `_`, `'`, `-`
fn is_attr_name(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '\'' | '-'))
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct GlobalConfig {
    /// Build tool defaults for every project
    pub tool: Option<ToolConfig>,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
    pub project_root: PathBuf,
    /// Project config file that was read, if any
    pub source: Option<PathBuf>,
}

impl Config {
    /// Loads configuration for the project containing `start`
    ///
    /// `explicit` names a config file to use instead of `<root>/hashbump.toml`.
    pub fn load(start: &Path, explicit: Option<&Path>) -> Result<Self> {
        let project_root = Self::find_project_root(start).unwrap_or_else(|| start.to_path_buf());
        Self::load_at(project_root, explicit)
    }

    /// Loads configuration treating `project_root` as the root, without searching upwards
    pub fn load_at(project_root: PathBuf, explicit: Option<&Path>) -> Result<Self> {
        let global = Self::load_global()?;

        let source = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let path = project_root.join(CONFIG_FILE);
                path.is_file().then_some(path)
            }
        };

        let project = match &source {
            Some(path) => Self::load_project_config(path)?,
            None => ProjectConfig::default(),
        };

        project
            .validate()
            .context("Invalid project configuration")?;

        Ok(Self {
            project,
            global,
            project_root,
            source,
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "hashbump", "hashbump")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads project configuration from a file
    fn load_project_config(config_path: &Path) -> Result<ProjectConfig> {
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .with_context(|| format!("Failed to parse project config: {}", config_path.display()))
    }

    /// Finds the project root by walking up to a `hashbump.toml` or `flake.nix`
    pub fn find_project_root(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if ROOT_MARKERS.iter().any(|m| current.join(m).is_file()) {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Effective build tool settings: project, then global, then defaults
    pub fn tool(&self) -> ToolConfig {
        self.project
            .tool
            .clone()
            .or_else(|| self.global.tool.clone())
            .unwrap_or_default()
    }

    /// Writes a commented default `hashbump.toml` into `root`
    pub fn write_default(root: &Path, force: bool) -> Result<PathBuf> {
        let config_path = root.join(CONFIG_FILE);
        if config_path.exists() && !force {
            return Err(ConfigError::Invalid(format!(
                "{} already exists (use --force to overwrite)",
                config_path.display()
            ))
            .into());
        }

        fs::write(&config_path, DEFAULT_PROJECT_CONFIG)
            .with_context(|| format!("Failed to write config: {}", config_path.display()))?;

        Ok(config_path)
    }
}

const DEFAULT_PROJECT_CONFIG: &str = r#"# hashbump configuration

# Package to evaluate and probe
package = ".#defaultPackage.x86_64-linux"

# Attribute names on the package
hash_attr = "vendorSha256"
version_attr = "version"
# Package variant built with a placeholder hash
probe_attr = "invalidHash"

[tool]
program = "nix"
extra_args = ["--extra-experimental-features", "nix-command flakes"]
print_build_logs = true

[locate]
# "search" scans *.<extension> files for the pinned hash,
# "position" uses the file declaring <position_attr>
mode = "search"
extension = "nix"
position_attr = "pname"

[guard]
# Skip when the package file is newer than the reference file
enabled = true
reference = "go.mod"

[version]
# "always", "on-hash-change" or "never"
bump = "on-hash-change"
"#;
