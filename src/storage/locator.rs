//! Locating the file that pins a hash
//!
//! Strategies:
//! 1. Explicit path given by the user
//! 2. Position reported by the build tool (`unsafeGetAttrPos`)
//! 3. Search the source tree for a file containing the hash

use std::fs;
use std::path::PathBuf;

use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};

use crate::domain::{source_relative_path, PackageMetadata, PinnedHash};
use crate::error::{ReconcileError, ReconcileResult};

/// How the target file is found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LocateStrategy {
    /// Use this file
    Path { path: PathBuf },

    /// Use the declaration position reported in the package metadata
    Position,

    /// Scan files with this extension for the pinned hash
    Search { extension: String },
}

impl Default for LocateStrategy {
    fn default() -> Self {
        LocateStrategy::Search {
            extension: "nix".to_string(),
        }
    }
}

/// Finds the target file relative to a project root
pub struct FileLocator {
    root: PathBuf,
    strategy: LocateStrategy,
}

impl FileLocator {
    pub fn new(root: impl Into<PathBuf>, strategy: LocateStrategy) -> Self {
        Self {
            root: root.into(),
            strategy,
        }
    }

    /// Resolves the target file for a package
    pub fn locate(&self, metadata: &PackageMetadata) -> ReconcileResult<PathBuf> {
        match &self.strategy {
            LocateStrategy::Path { path } => {
                let path = self.root.join(path);
                if path.is_file() {
                    Ok(path)
                } else {
                    Err(ReconcileError::FileNotFound {
                        reason: format!("{} does not exist", path.display()),
                    })
                }
            }
            LocateStrategy::Position => {
                let file = metadata.file.as_deref().ok_or_else(|| {
                    ReconcileError::FileNotFound {
                        reason: "metadata carries no declaration position".to_string(),
                    }
                })?;
                let path = self.root.join(source_relative_path(file));
                if path.is_file() {
                    Ok(path)
                } else {
                    Err(ReconcileError::FileNotFound {
                        reason: format!(
                            "declaration {} maps to missing {}",
                            file.display(),
                            path.display()
                        ),
                    })
                }
            }
            LocateStrategy::Search { extension } => self.search(&metadata.hash, extension),
        }
    }

    /// Returns the first file (in sorted walk order) containing `hash`
    pub fn search(&self, hash: &PinnedHash, extension: &str) -> ReconcileResult<PathBuf> {
        let walker = WalkBuilder::new(&self.root)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for entry in walker.flatten() {
            let path = entry.path();
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(extension) {
                continue;
            }

            // Binary or unreadable files can't hold a pinned hash
            let Ok(content) = fs::read_to_string(path) else {
                continue;
            };
            if content.contains(hash.as_str()) {
                return Ok(path.to_path_buf());
            }
        }

        Err(ReconcileError::FileNotFound {
            reason: format!(
                "no *.{} file under {} contains {}",
                extension,
                self.root.display(),
                hash
            ),
        })
    }
}
