//! File system scanner for discovering map documents.
//!
//! Recursively walks directories for `.tmj` map files, skipping files
//! whose name already carries the merged-map prefix so a previous run's
//! output is never ingested as input.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::manifest::Manifest;

/// The map document extension.
pub const MAP_EXTENSION: &str = "tmj";

/// Whether a path names a map document.
pub fn is_map_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext == MAP_EXTENSION)
}

/// Whether a file name already starts with the merged-map prefix.
pub fn has_merged_prefix(path: &Path, prefix: &str) -> bool {
    if prefix.is_empty() {
        return false;
    }
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |name| name.starts_with(prefix))
}

/// Scan a directory for map documents.
///
/// The walk is sorted by file name so discovery order, and with it the
/// catalog's first-seen order, is identical run to run.
pub fn scan_directory(root: &Path, prefix: &str, manifest: &Manifest) -> Vec<PathBuf> {
    let mut maps = Vec::new();

    if !root.exists() {
        return maps;
    }

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if path.is_dir() {
            continue;
        }

        if !is_map_file(path) {
            continue;
        }

        // Output of a previous run
        if has_merged_prefix(path, prefix) {
            continue;
        }

        if manifest.is_excluded(path) {
            continue;
        }

        maps.push(path.to_path_buf());
    }

    maps
}

/// Scan multiple source paths.
pub fn scan_sources(
    sources: &[String],
    base_path: &Path,
    prefix: &str,
    manifest: &Manifest,
) -> Vec<PathBuf> {
    let mut maps = Vec::new();

    for source in sources {
        let source_path = if Path::new(source).is_absolute() {
            PathBuf::from(source)
        } else {
            base_path.join(source)
        };

        maps.extend(scan_directory(&source_path, prefix, manifest));
    }

    maps
}
