//! Writing the catalog to disk as a shared tileset.
//!
//! Output ids are assigned from catalog positions before any file is
//! touched: canonical tile at position `i` gets local id `i` and output
//! gid `i + 1`. A write failure is recorded and skipped, so one bad file
//! never shifts the ids of the tiles around it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::catalog::{TileCatalog, TileKey};
use crate::document::{write_tileset, Gid, TileDef, Tileset};
use crate::error::MergeError;

/// Outcome of materializing a catalog.
pub struct MaterializeReport {
    /// The written tileset plus the occurrence-to-gid lookup.
    pub catalog: MaterializedCatalog,

    /// Per-file write failures, in catalog order. Never fatal.
    pub failures: Vec<MergeError>,
}

/// A catalog written to disk, ready to rewrite maps against.
pub struct MaterializedCatalog {
    tileset: Tileset,
    descriptor_path: PathBuf,
    lookup: HashMap<TileKey, Gid>,
}

impl MaterializedCatalog {
    /// The output gid for a source occurrence, or `None` when the
    /// occurrence was never admitted.
    pub fn output_gid(&self, key: TileKey) -> Option<Gid> {
        self.lookup.get(&key).copied()
    }

    /// Where the tileset descriptor was written.
    pub fn descriptor_path(&self) -> &Path {
        &self.descriptor_path
    }

    pub fn tileset(&self) -> &Tileset {
        &self.tileset
    }

    /// Number of tile image artifacts the tileset names.
    pub fn artifact_count(&self) -> usize {
        self.tileset.tiles.len()
    }
}

/// Write every canonical tile as a PNG plus one tileset descriptor naming
/// them all.
///
/// Artifacts are named `<stem>_<id>.png` after the descriptor's stem and
/// land next to it in `output_dir`. The directory must already exist;
/// individual write failures are collected in the report.
pub fn materialize(
    catalog: &TileCatalog,
    output_dir: &Path,
    tileset_name: &str,
) -> MaterializeReport {
    let stem = descriptor_stem(tileset_name);
    let descriptor_path = output_dir.join(tileset_name);
    let mut failures = Vec::new();
    let mut tiles = Vec::with_capacity(catalog.len());
    let mut tile_width = 0;
    let mut tile_height = 0;

    for (id, entry) in catalog.entries().enumerate() {
        let artifact = format!("{stem}_{id}.png");
        tile_width = tile_width.max(entry.width());
        tile_height = tile_height.max(entry.height());

        if let Err(err) = entry.image().save_png(&output_dir.join(&artifact)) {
            failures.push(err);
        }

        tiles.push(TileDef {
            id: id as u32,
            image: Some(artifact),
            image_width: Some(entry.width()),
            image_height: Some(entry.height()),
            properties: entry.properties().clone(),
        });
    }

    let tileset = Tileset {
        first_gid: 0,
        name: stem,
        tile_width,
        tile_height,
        margin: 0,
        spacing: 0,
        columns: 0,
        tile_count: tiles.len() as u32,
        image: None,
        tiles,
    };

    if let Err(err) = write_tileset(&descriptor_path, &tileset) {
        failures.push(err);
    }

    let lookup = catalog
        .index
        .iter()
        .map(|(&key, &position)| (key, position as Gid + 1))
        .collect();

    MaterializeReport {
        catalog: MaterializedCatalog {
            tileset,
            descriptor_path,
            lookup,
        },
        failures,
    }
}

fn descriptor_stem(tileset_name: &str) -> String {
    Path::new(tileset_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "merged".to_string())
}
