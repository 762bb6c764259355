//! Merge command implementation.
//!
//! Runs the whole pipeline: discover map documents, ingest their tiles
//! into the catalog, materialize the shared tileset, then rebuild and
//! write every map against it. Failures are contained per document and
//! per output file; only configuration trouble aborts the run.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;

use crate::catalog::materialize;
use crate::discovery::{discover_inputs, load_manifest, Manifest};
use crate::document::write_document;
use crate::error::{MergeError, Result};
use crate::ingest::Ingestor;
use crate::output::{display_path, plural, Printer};
use crate::rebuild::{rebuild, relative_source, RemapMiss};

/// Merge duplicate tiles across maps into one shared tileset
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Map files or directories to merge (default: current directory)
    pub inputs: Vec<PathBuf>,

    /// Output directory for the merged tileset and its tile images
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// File name of the merged tileset descriptor
    #[arg(long, short)]
    pub tileset: Option<String>,

    /// Prefix prepended to rebuilt map file names
    #[arg(long, short)]
    pub prefix: Option<String>,
}

/// Effective options after layering flags over the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Settings {
    output: PathBuf,
    tileset: String,
    prefix: String,
}

fn resolve_settings(args: &MergeArgs, manifest: &Manifest) -> Settings {
    Settings {
        output: args
            .output
            .clone()
            .unwrap_or_else(|| manifest.output.clone()),
        tileset: args
            .tileset
            .clone()
            .unwrap_or_else(|| manifest.tileset.clone()),
        prefix: args
            .prefix
            .clone()
            .unwrap_or_else(|| manifest.prefix.clone()),
    }
}

pub fn run(args: MergeArgs, printer: &Printer) -> Result<()> {
    let (manifest, _) = load_manifest(Path::new("."))?;
    let settings = resolve_settings(&args, &manifest);

    if !settings.output.exists() {
        fs::create_dir_all(&settings.output).map_err(|e| MergeError::Io {
            path: settings.output.clone(),
            message: format!("Failed to create output directory: {}", e),
        })?;
    }

    let maps = discover_inputs(&args.inputs, &settings.prefix, &manifest);
    if maps.is_empty() {
        printer.warning("Warning", "no map documents found");
    }

    // Phase 1: ingest every document, skipping the ones that fail
    let mut ingestor = Ingestor::new();
    let mut skipped = 0;
    for map in &maps {
        match ingestor.ingest_file(map) {
            Ok(summary) => printer.status(
                "Merging",
                &format!(
                    "{} ({}, {} new)",
                    display_path(map),
                    plural(summary.tiles, "tile", "tiles"),
                    summary.new
                ),
            ),
            Err(err) => {
                skipped += 1;
                printer.error("Skipping", &format!("{}: {}", display_path(map), err));
            }
        }
    }

    let (catalog, documents) = ingestor.finish();
    let source_tiles = catalog.occurrence_count();

    // Phase 2: write the shared tileset
    let report = materialize(&catalog, &settings.output, &settings.tileset);
    if report.failures.is_empty() {
        printer.status(
            "Writing",
            &format!(
                "{} ({})",
                display_path(&settings.output.join(&settings.tileset)),
                plural(catalog.len(), "tile", "tiles")
            ),
        );
    }
    for failure in &report.failures {
        printer.error("Failed", &failure.to_string());
    }
    let merged = report.catalog;

    // Phase 3: rebuild every ingested map against the shared tileset
    let mut written = 0;
    for document in &documents {
        let map_dir = document.path.parent().unwrap_or_else(|| Path::new("."));
        let source = relative_source(map_dir, merged.descriptor_path());
        let rebuilt = rebuild(document, &merged, source);

        warn_misses(&document.path, &rebuilt.misses, printer);

        let out_path = merged_map_path(&document.path, &settings.prefix);
        match write_document(&out_path, &rebuilt.document) {
            Ok(()) => {
                written += 1;
                printer.status("Writing", &display_path(&out_path));
            }
            Err(err) => printer.error("Failed", &err.to_string()),
        }
    }

    printer.success(
        "Finished",
        &format!(
            "{} into {} across {}",
            plural(source_tiles, "source tile", "source tiles"),
            plural(catalog.len(), "canonical tile", "canonical tiles"),
            plural(written, "map", "maps")
        ),
    );
    if skipped > 0 {
        printer.warning(
            "Warning",
            &format!("{} skipped", plural(skipped, "document", "documents")),
        );
    }

    Ok(())
}

/// One warning per distinct missing gid per layer, not one per cell.
fn warn_misses(map_path: &Path, misses: &[RemapMiss], printer: &Printer) {
    let mut seen = BTreeSet::new();
    for miss in misses {
        if seen.insert((miss.layer.clone(), miss.gid)) {
            printer.warning(
                "Unmapped",
                &format!(
                    "{}: layer '{}' references unknown gid {}",
                    display_path(map_path),
                    miss.layer,
                    miss.gid
                ),
            );
        }
    }
}

/// Where the rebuilt map lands: next to its source, prefix prepended.
fn merged_map_path(source: &Path, prefix: &str) -> PathBuf {
    let name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{prefix}{name}"))
}
