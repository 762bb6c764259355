//! Map rebuilding.
//!
//! Produces a new document from an ingested one: same dimensions, cell
//! size and properties, non-tile layers copied verbatim, and every tile
//! layer cell translated from its original gid to the merged catalog's
//! output gid. The single merged tileset replaces the original tileset
//! list. The original document is never mutated.

use std::path::{Component, Path};

use crate::catalog::{DocumentId, MaterializedCatalog, TileKey};
use crate::document::{
    Gid, Layer, MapDocument, TileLayer, TilesetEntry, TilesetRef, EMPTY_GID,
};
use crate::ingest::IngestedDocument;

/// A cell whose gid resolved to nothing in the merged catalog.
///
/// Unreachable while admission holds its invariants; a miss usually means
/// the source map referenced a gid its tilesets never defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemapMiss {
    pub layer: String,
    pub x: u32,
    pub y: u32,
    pub gid: Gid,
}

/// A rebuilt document plus every cell that failed to translate.
#[derive(Debug)]
pub struct RebuiltDocument {
    pub document: MapDocument,
    pub misses: Vec<RemapMiss>,
}

/// Rebuild one document against the merged catalog.
///
/// `tileset_source` is the path the rebuilt map stores for the merged
/// descriptor, typically produced by [`relative_source`].
pub fn rebuild(
    original: &IngestedDocument,
    merged: &MaterializedCatalog,
    tileset_source: String,
) -> RebuiltDocument {
    let mut misses = Vec::new();

    let layers = original
        .document
        .layers
        .iter()
        .map(|layer| match layer {
            Layer::Tile(tiles) => Layer::Tile(translate_layer(tiles, original.id, merged, &mut misses)),
            other => other.clone(),
        })
        .collect();

    let document = MapDocument {
        width: original.document.width,
        height: original.document.height,
        tile_width: original.document.tile_width,
        tile_height: original.document.tile_height,
        properties: original.document.properties.clone(),
        tilesets: vec![TilesetEntry::Reference(TilesetRef {
            first_gid: 1,
            source: tileset_source,
        })],
        layers,
    };

    RebuiltDocument { document, misses }
}

fn translate_layer(
    layer: &TileLayer,
    document: DocumentId,
    merged: &MaterializedCatalog,
    misses: &mut Vec<RemapMiss>,
) -> TileLayer {
    let width = layer.width.max(1);
    let data = layer
        .data
        .iter()
        .enumerate()
        .map(|(i, &gid)| {
            if gid == EMPTY_GID {
                return EMPTY_GID;
            }
            match merged.output_gid(TileKey { document, gid }) {
                Some(output) => output,
                None => {
                    misses.push(RemapMiss {
                        layer: layer.name.clone(),
                        x: i as u32 % width,
                        y: i as u32 / width,
                        gid,
                    });
                    EMPTY_GID
                }
            }
        })
        .collect();

    TileLayer {
        name: layer.name.clone(),
        width: layer.width,
        height: layer.height,
        data,
        properties: layer.properties.clone(),
    }
}

/// The path a map written into `map_dir` should store to reach
/// `descriptor`, with forward slashes.
///
/// Falls back to the descriptor path as given when no relative route
/// exists (one path absolute, the other not, or `map_dir` escaping
/// through `..`).
pub fn relative_source(map_dir: &Path, descriptor: &Path) -> String {
    relative_components(map_dir, descriptor)
        .map(|parts| parts.join("/"))
        .unwrap_or_else(|| descriptor.display().to_string())
}

fn relative_components(base: &Path, target: &Path) -> Option<Vec<String>> {
    if base.is_absolute() != target.is_absolute() {
        return None;
    }

    let keep = |component: &Component| !matches!(component, Component::CurDir);
    let base: Vec<Component> = base.components().filter(keep).collect();
    let target: Vec<Component> = target.components().filter(keep).collect();

    let common = base
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    // Cannot step back out of an unresolved ".."
    if base[common..]
        .iter()
        .any(|component| matches!(component, Component::ParentDir))
    {
        return None;
    }

    let mut parts = vec!["..".to_string(); base.len() - common];
    parts.extend(
        target[common..]
            .iter()
            .map(|component| component.as_os_str().to_string_lossy().into_owned()),
    );
    if parts.is_empty() {
        parts.push(".".to_string());
    }
    Some(parts)
}
