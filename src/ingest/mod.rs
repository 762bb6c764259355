//! Document ingestion.
//!
//! The [`Ingestor`] reads one map document at a time, resolves every tile
//! its tilesets define to a decoded bitmap, and feeds each occurrence to
//! the catalog. Ingestion is two-phase per document: all tiles are
//! collected and decoded first, then admitted. A document that fails
//! partway contributes nothing, so a skipped document never leaves stray
//! entries in the catalog.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::catalog::{DocumentId, SourceTileRef, TileCatalog, TileKey};
use crate::document::{
    read_document, read_tileset, Gid, MapDocument, PropertyBag, Tileset, TilesetEntry,
};
use crate::error::{MergeError, Result};
use crate::tile::TileImage;

/// One successfully ingested document, kept for the rebuild phase.
#[derive(Debug)]
pub struct IngestedDocument {
    pub id: DocumentId,
    pub path: PathBuf,
    pub document: MapDocument,
}

/// Per-document admission counts, for progress output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    /// Tiles the document defined.
    pub tiles: usize,

    /// How many founded a new canonical entry.
    pub new: usize,
}

/// Feeds documents into a growing [`TileCatalog`].
#[derive(Debug, Default)]
pub struct Ingestor {
    catalog: TileCatalog,
    documents: Vec<IngestedDocument>,
}

impl Ingestor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one map document.
    ///
    /// On error the catalog and document list are unchanged; the caller
    /// logs the error and moves on to the next document.
    pub fn ingest_file(&mut self, path: &Path) -> Result<IngestSummary> {
        let document = read_document(path)?;
        let id = DocumentId(self.documents.len() as u32);

        let pending = collect_tiles(&document, path, id)?;

        let tiles = pending.len();
        let mut new = 0;
        for tile in pending {
            if self.catalog.admit(tile) {
                new += 1;
            }
        }

        self.documents.push(IngestedDocument {
            id,
            path: path.to_path_buf(),
            document,
        });

        Ok(IngestSummary { tiles, new })
    }

    pub fn catalog(&self) -> &TileCatalog {
        &self.catalog
    }

    /// Documents ingested so far, in ingestion order.
    pub fn documents(&self) -> &[IngestedDocument] {
        &self.documents
    }

    /// Freeze the catalog and hand everything to the materialize/rebuild
    /// phases.
    pub fn finish(self) -> (TileCatalog, Vec<IngestedDocument>) {
        (self.catalog, self.documents)
    }
}

/// Resolve every tile a document's tilesets define, in tileset order.
fn collect_tiles(
    document: &MapDocument,
    map_path: &Path,
    id: DocumentId,
) -> Result<Vec<SourceTileRef>> {
    let map_dir = map_path.parent().unwrap_or_else(|| Path::new("."));
    let mut tiles = Vec::new();

    for entry in &document.tilesets {
        match entry {
            TilesetEntry::Reference(reference) => {
                require_first_gid(reference.first_gid, map_path)?;
                let tileset_path = map_dir.join(&reference.source);
                let tileset = read_tileset(&tileset_path)?;
                let base_dir = tileset_path.parent().unwrap_or(map_dir).to_path_buf();
                collect_tileset(
                    &tileset,
                    reference.first_gid,
                    &base_dir,
                    map_path,
                    id,
                    &mut tiles,
                )?;
            }
            TilesetEntry::Embedded(tileset) => {
                require_first_gid(tileset.first_gid, map_path)?;
                collect_tileset(tileset, tileset.first_gid, map_dir, map_path, id, &mut tiles)?;
            }
        }
    }

    Ok(tiles)
}

fn require_first_gid(first_gid: Gid, map_path: &Path) -> Result<()> {
    if first_gid == 0 {
        return Err(MergeError::Document {
            path: map_path.to_path_buf(),
            message: "tileset has firstgid 0, which collides with the empty-cell sentinel"
                .to_string(),
            help: None,
        });
    }
    Ok(())
}

/// Gids are `firstgid + local id`; a sum past `u32::MAX` means the
/// document's declared layout cannot be addressed.
fn require_gid_in_range(
    first_gid: Gid,
    local: u32,
    tileset_name: &str,
    map_path: &Path,
) -> Result<Gid> {
    first_gid.checked_add(local).ok_or_else(|| {
        document_error(
            map_path,
            format!("tileset '{tileset_name}': tile {local} overflows the gid range"),
        )
    })
}

fn collect_tileset(
    tileset: &Tileset,
    first_gid: Gid,
    base_dir: &Path,
    map_path: &Path,
    document: DocumentId,
    out: &mut Vec<SourceTileRef>,
) -> Result<()> {
    match &tileset.image {
        Some(sheet_image) => collect_sheet(
            tileset,
            sheet_image,
            first_gid,
            base_dir,
            map_path,
            document,
            out,
        ),
        None => collect_collection(tileset, first_gid, base_dir, map_path, document, out),
    }
}

/// Slice a sheet tileset into per-tile bitmaps.
///
/// Tile `i` sits at column `i % columns`, row `i / columns`; its pixel
/// origin is `margin + col * (tile size + spacing)`. Missing `columns`
/// and `tilecount` are derived from the sheet dimensions.
fn collect_sheet(
    tileset: &Tileset,
    sheet_image: &str,
    first_gid: Gid,
    base_dir: &Path,
    map_path: &Path,
    document: DocumentId,
    out: &mut Vec<SourceTileRef>,
) -> Result<()> {
    let tile_width = tileset.tile_width;
    let tile_height = tileset.tile_height;
    if tile_width == 0 || tile_height == 0 {
        return Err(document_error(
            map_path,
            format!("tileset '{}' has a zero tile size", tileset.name),
        ));
    }

    let sheet = TileImage::open(&base_dir.join(sheet_image))?;

    let columns = if tileset.columns > 0 {
        tileset.columns
    } else {
        grid_count(sheet.width(), tileset.margin, tile_width, tileset.spacing)
    };
    if columns == 0 {
        return Err(document_error(
            map_path,
            format!(
                "tileset '{}': sheet {} is narrower than one tile",
                tileset.name, sheet_image
            ),
        ));
    }

    let tile_count = if tileset.tile_count > 0 {
        tileset.tile_count
    } else {
        let rows = grid_count(sheet.height(), tileset.margin, tile_height, tileset.spacing);
        columns.checked_mul(rows).ok_or_else(|| {
            document_error(
                map_path,
                format!("tileset '{}': derived tile count overflows", tileset.name),
            )
        })?
    };

    let properties: HashMap<u32, &PropertyBag> = tileset
        .tiles
        .iter()
        .map(|def| (def.id, &def.properties))
        .collect();

    // Origin math stays in u64: margin and spacing come straight from
    // the document. The first tile that falls outside the sheet ends
    // the loop, which keeps every product far below u64::MAX.
    let step_x = u64::from(tile_width) + u64::from(tileset.spacing);
    let step_y = u64::from(tile_height) + u64::from(tileset.spacing);

    for local in 0..tile_count {
        let col = local % columns;
        let row = local / columns;
        let x = u64::from(tileset.margin) + u64::from(col) * step_x;
        let y = u64::from(tileset.margin) + u64::from(row) * step_y;

        if x + u64::from(tile_width) > u64::from(sheet.width())
            || y + u64::from(tile_height) > u64::from(sheet.height())
        {
            return Err(document_error(
                map_path,
                format!(
                    "tileset '{}': tile {local} falls outside sheet {} ({}x{})",
                    tileset.name,
                    sheet_image,
                    sheet.width(),
                    sheet.height()
                ),
            ));
        }

        out.push(SourceTileRef {
            key: TileKey {
                document,
                gid: require_gid_in_range(first_gid, local, &tileset.name, map_path)?,
            },
            source: map_path.to_path_buf(),
            image: Arc::new(sheet.crop(x as u32, y as u32, tile_width, tile_height)),
            properties: properties
                .get(&local)
                .map(|bag| (*bag).clone())
                .unwrap_or_default(),
        });
    }

    Ok(())
}

/// Load the per-tile images of a collection tileset, ascending by local id.
fn collect_collection(
    tileset: &Tileset,
    first_gid: Gid,
    base_dir: &Path,
    map_path: &Path,
    document: DocumentId,
    out: &mut Vec<SourceTileRef>,
) -> Result<()> {
    let mut defs: Vec<_> = tileset.tiles.iter().collect();
    defs.sort_by_key(|def| def.id);

    for def in defs {
        let image_name = def.image.as_ref().ok_or_else(|| {
            document_error(
                map_path,
                format!(
                    "tileset '{}': tile {} has no image and the tileset has no sheet",
                    tileset.name, def.id
                ),
            )
        })?;

        out.push(SourceTileRef {
            key: TileKey {
                document,
                gid: require_gid_in_range(first_gid, def.id, &tileset.name, map_path)?,
            },
            source: map_path.to_path_buf(),
            image: Arc::new(TileImage::open(&base_dir.join(image_name))?),
            properties: def.properties.clone(),
        });
    }

    Ok(())
}

/// Number of whole tiles that fit along one sheet axis.
///
/// Computed in u64: `margin` and `spacing` come straight from the
/// document. The quotient never exceeds `extent`, so the cast back is
/// lossless. Callers guarantee a non-zero `tile_size`.
fn grid_count(extent: u32, margin: u32, tile_size: u32, spacing: u32) -> u32 {
    let usable = (u64::from(extent) + u64::from(spacing)).saturating_sub(u64::from(margin));
    (usable / (u64::from(tile_size) + u64::from(spacing))) as u32
}

fn document_error(path: &Path, message: String) -> MergeError {
    MergeError::Document {
        path: path.to_path_buf(),
        message,
        help: None,
    }
}
