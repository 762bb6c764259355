//! Input discovery for merge runs.
//!
//! Resolves what to merge from command-line inputs, an optional
//! `tilemerge.yaml` manifest, and directory scans. Directories are walked
//! for `.tmj` maps with the merged-map prefix and manifest excludes
//! filtered out; explicitly named files are taken as given, prefix or
//! not, since the user asked for them.

mod manifest;
mod scanner;

use std::path::{Path, PathBuf};

use crate::error::Result;

pub use manifest::Manifest;
pub use scanner::{has_merged_prefix, is_map_file, scan_directory, scan_sources, MAP_EXTENSION};

/// The name of the manifest file.
pub const MANIFEST_FILENAME: &str = "tilemerge.yaml";

/// Load the manifest from a directory, falling back to defaults.
///
/// Returns the manifest and whether a file was actually found. A manifest
/// that exists but does not parse is an error; the caller treats it as
/// fatal configuration trouble.
pub fn load_manifest(dir: &Path) -> Result<(Manifest, bool)> {
    let path = dir.join(MANIFEST_FILENAME);
    if path.exists() {
        Ok((Manifest::load(&path)?, true))
    } else {
        Ok((Manifest::default(), false))
    }
}

/// Resolve input paths to the ordered list of maps to ingest.
///
/// Empty `inputs` falls back to scanning the manifest's sources (default:
/// the current directory). A named path that is not a directory is passed
/// through untouched, so a missing file surfaces as an ingest error
/// instead of silence.
pub fn discover_inputs(inputs: &[PathBuf], prefix: &str, manifest: &Manifest) -> Vec<PathBuf> {
    if inputs.is_empty() {
        return scan_sources(&manifest.effective_sources(), Path::new("."), prefix, manifest);
    }

    let mut maps = Vec::new();
    for input in inputs {
        if input.is_dir() {
            maps.extend(scan_directory(input, prefix, manifest));
        } else {
            maps.push(input.clone());
        }
    }
    maps
}
