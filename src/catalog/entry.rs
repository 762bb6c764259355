//! Catalog entries: source tile occurrences and the canonical tiles that
//! absorb them.

use std::path::PathBuf;
use std::sync::Arc;

use crate::catalog::TileKey;
use crate::document::PropertyBag;
use crate::tile::TileImage;

/// One tile occurrence as it appeared in a source document.
///
/// The bitmap is shared behind an [`Arc`]: absorbing an occurrence into a
/// canonical tile never copies pixels.
#[derive(Debug, Clone)]
pub struct SourceTileRef {
    /// Which document, which original gid.
    pub key: TileKey,

    /// The map document the tile came from.
    pub source: PathBuf,

    /// Decoded bitmap.
    pub image: Arc<TileImage>,

    /// Properties attached to the tile in its source tileset.
    pub properties: PropertyBag,
}

/// A group of source tiles proven identical.
///
/// The founding member supplies the bitmap and properties; every later
/// member matched them exactly. Always holds at least one member.
#[derive(Debug)]
pub struct CanonicalTile {
    image: Arc<TileImage>,
    properties: PropertyBag,
    members: Vec<SourceTileRef>,
}

impl CanonicalTile {
    /// Found a new canonical tile from its first occurrence.
    pub fn new(founder: SourceTileRef) -> Self {
        Self {
            image: Arc::clone(&founder.image),
            properties: founder.properties.clone(),
            members: vec![founder],
        }
    }

    /// Whether a candidate occurrence is identical to this tile.
    ///
    /// Properties are compared first, then dimensions, then pixel bytes,
    /// so mismatches bail out before touching raster data. Exact equality
    /// only; near-identical tiles stay distinct.
    pub fn matches(&self, candidate: &SourceTileRef) -> bool {
        self.properties == candidate.properties && self.image.pixels_match(&candidate.image)
    }

    /// Record another occurrence of this tile.
    pub fn absorb(&mut self, occurrence: SourceTileRef) {
        self.members.push(occurrence);
    }

    pub fn image(&self) -> &Arc<TileImage> {
        &self.image
    }

    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    /// All absorbed occurrences, founding member first.
    pub fn members(&self) -> &[SourceTileRef] {
        &self.members
    }

    /// Whether more than one occurrence collapsed into this tile.
    pub fn is_shared(&self) -> bool {
        self.members.len() > 1
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}
