//! Project manifest (tilemerge.yaml) parsing.
//!
//! The manifest sets per-project defaults for the merge pipeline: where
//! to look for maps, where output goes, and what the merged artifacts are
//! called. Command-line flags override manifest values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MergeError, Result};

/// Project manifest loaded from tilemerge.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Source files or directories to merge when none are given on the
    /// command line. Defaults to the current directory if empty.
    #[serde(default)]
    pub sources: Vec<String>,

    /// Output directory for the merged tileset and its tile images.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// File name of the merged tileset descriptor.
    #[serde(default = "default_tileset")]
    pub tileset: String,

    /// Prefix prepended to each rebuilt map's file name. Files already
    /// carrying it are skipped during directory scans.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Patterns to exclude from discovery.
    #[serde(default)]
    pub excludes: Vec<String>,
}

fn default_output() -> PathBuf {
    PathBuf::from(".")
}

fn default_tileset() -> String {
    "merged.tsj".to_string()
}

fn default_prefix() -> String {
    "merged_".to_string()
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            sources: vec![],
            output: default_output(),
            tileset: default_tileset(),
            prefix: default_prefix(),
            excludes: vec![],
        }
    }
}

impl Manifest {
    /// Load manifest from a tilemerge.yaml file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| MergeError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read manifest: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse manifest from YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| MergeError::Config {
            message: format!("Invalid manifest: {}", e),
            help: Some("Check tilemerge.yaml syntax".to_string()),
        })
    }

    /// Check if a path should be excluded based on exclude patterns.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        self.excludes
            .iter()
            .any(|pattern| Self::matches_pattern(&path_str, pattern))
    }

    /// Simple glob pattern matching: * matches any sequence.
    fn matches_pattern(path: &str, pattern: &str) -> bool {
        if let Some(suffix) = pattern.strip_prefix("**/") {
            // **/dir/* matches anything inside dir anywhere in the path
            if let Some(dir) = suffix.strip_suffix("/*") {
                return path.contains(&format!("{}/", dir))
                    || path.contains(&format!("/{}/", dir))
                    || path.starts_with(&format!("{}/", dir));
            }
            return path.contains(suffix) || path.ends_with(suffix);
        }

        if pattern.starts_with('*') && !pattern.contains('/') {
            // Match file extension or suffix
            return path.ends_with(&pattern[1..]);
        }

        if let Some(prefix) = pattern.strip_suffix("/*") {
            // Match directory contents
            return path.starts_with(&format!("{}/", prefix))
                || path.contains(&format!("/{}/", prefix));
        }

        // Exact match or contains
        path.contains(pattern)
    }

    /// Get effective source paths, defaulting to current directory.
    pub fn effective_sources(&self) -> Vec<String> {
        if self.sources.is_empty() {
            vec![".".to_string()]
        } else {
            self.sources.clone()
        }
    }
}
