//! Data model for tile map documents.
//!
//! Mirrors the JSON shape of Tiled-style map documents (`.tmj`) and tileset
//! descriptors (`.tsj`): a map has pixel-free grid dimensions, a tile cell
//! size, a property bag, a list of tilesets (embedded or referenced by
//! path), and a list of layers. Unknown JSON fields are ignored on read;
//! writes emit only the modeled fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// String key/value properties attached to maps, layers and tiles.
///
/// A `BTreeMap` keeps iteration and serialization order deterministic;
/// equality is structural (same keys, same values).
pub type PropertyBag = BTreeMap<String, String>;

/// A tile reference as stored in a layer cell: `first_gid + local id`.
pub type Gid = u32;

/// The empty-cell sentinel. No tileset may claim it.
pub const EMPTY_GID: Gid = 0;

/// A parsed map document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDocument {
    /// Grid width in cells.
    pub width: u32,

    /// Grid height in cells.
    pub height: u32,

    /// Cell width in pixels.
    #[serde(rename = "tilewidth")]
    pub tile_width: u32,

    /// Cell height in pixels.
    #[serde(rename = "tileheight")]
    pub tile_height: u32,

    #[serde(default, skip_serializing_if = "PropertyBag::is_empty")]
    pub properties: PropertyBag,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tilesets: Vec<TilesetEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<Layer>,
}

impl MapDocument {
    /// Iterate over the tile layers only.
    pub fn tile_layers(&self) -> impl Iterator<Item = &TileLayer> {
        self.layers.iter().filter_map(|layer| match layer {
            Layer::Tile(tiles) => Some(tiles),
            _ => None,
        })
    }

    /// Total number of non-empty cells across all tile layers.
    pub fn occupied_cells(&self) -> usize {
        self.tile_layers()
            .map(|layer| layer.data.iter().filter(|&&gid| gid != EMPTY_GID).count())
            .sum()
    }
}

/// One entry in a map's tileset list.
///
/// Variant order matters for `untagged` deserialization: a reference has a
/// `source` field an embedded tileset never carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TilesetEntry {
    /// Reference to an external `.tsj` descriptor, resolved relative to
    /// the map document.
    Reference(TilesetRef),

    /// Tileset defined inline in the map document.
    Embedded(Tileset),
}

/// Reference to an external tileset descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilesetRef {
    #[serde(rename = "firstgid")]
    pub first_gid: Gid,

    /// Path to the `.tsj` file, relative to the referencing map.
    pub source: String,
}

/// A tileset definition.
///
/// Either a sheet (`image` present: one atlas sliced on a grid) or a
/// collection (no `image`: each entry in `tiles` names its own file).
/// Standalone `.tsj` descriptors omit `firstgid`; the referencing map
/// supplies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tileset {
    #[serde(rename = "firstgid", default, skip_serializing_if = "gid_is_zero")]
    pub first_gid: Gid,

    pub name: String,

    #[serde(rename = "tilewidth")]
    pub tile_width: u32,

    #[serde(rename = "tileheight")]
    pub tile_height: u32,

    /// Pixels between the sheet edge and the first tile.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub margin: u32,

    /// Pixels between adjacent tiles on the sheet.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub spacing: u32,

    /// Tiles per sheet row; derived from the sheet width when absent.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub columns: u32,

    /// Total tile count; derived from the sheet dimensions when absent.
    #[serde(rename = "tilecount", default, skip_serializing_if = "is_zero")]
    pub tile_count: u32,

    /// Sheet image path, relative to the tileset definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Per-tile definitions: all tiles of a collection, or the tiles of a
    /// sheet that carry extra properties.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tiles: Vec<TileDef>,
}

impl Tileset {
    /// Whether this tileset slices a single sheet image.
    pub fn is_sheet(&self) -> bool {
        self.image.is_some()
    }
}

/// One tile definition inside a tileset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TileDef {
    /// Local id within the tileset (gid = first_gid + id).
    pub id: u32,

    /// Tile image path for collection tilesets, relative to the tileset
    /// definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(rename = "imagewidth", default, skip_serializing_if = "Option::is_none")]
    pub image_width: Option<u32>,

    #[serde(rename = "imageheight", default, skip_serializing_if = "Option::is_none")]
    pub image_height: Option<u32>,

    #[serde(default, skip_serializing_if = "PropertyBag::is_empty")]
    pub properties: PropertyBag,
}

/// A map layer, discriminated by the `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Layer {
    #[serde(rename = "tilelayer")]
    Tile(TileLayer),

    #[serde(rename = "objectgroup")]
    Object(ObjectLayer),

    #[serde(rename = "imagelayer")]
    Image(ImageLayer),
}

impl Layer {
    /// The layer's display name.
    pub fn name(&self) -> &str {
        match self {
            Layer::Tile(layer) => &layer.name,
            Layer::Object(layer) => &layer.name,
            Layer::Image(layer) => &layer.name,
        }
    }
}

/// A grid of tile references.
///
/// `data` is row-major, `width * height` entries, gid 0 for empty cells.
/// Flip/rotation flag bits are not interpreted; a flagged gid resolves
/// like any gid outside every tileset's range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    pub name: String,

    pub width: u32,

    pub height: u32,

    pub data: Vec<Gid>,

    #[serde(default, skip_serializing_if = "PropertyBag::is_empty")]
    pub properties: PropertyBag,
}

impl TileLayer {
    /// The gid at (x, y), or `None` when out of bounds.
    pub fn gid_at(&self, x: u32, y: u32) -> Option<Gid> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get((y * self.width + x) as usize).copied()
    }

    /// Iterate over all cells as (x, y, gid) in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32, Gid)> + '_ {
        let width = self.width.max(1);
        self.data
            .iter()
            .enumerate()
            .map(move |(i, &gid)| (i as u32 % width, i as u32 / width, gid))
    }
}

/// A layer of free-floating objects; copied verbatim during rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectLayer {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<MapObject>,

    #[serde(default, skip_serializing_if = "PropertyBag::is_empty")]
    pub properties: PropertyBag,
}

/// One placed object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapObject {
    pub id: u32,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    pub x: f64,

    pub y: f64,

    #[serde(default, skip_serializing_if = "f64_is_zero")]
    pub width: f64,

    #[serde(default, skip_serializing_if = "f64_is_zero")]
    pub height: f64,

    #[serde(default, skip_serializing_if = "PropertyBag::is_empty")]
    pub properties: PropertyBag,
}

/// A single-image backdrop layer; copied verbatim during rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageLayer {
    pub name: String,

    pub image: String,

    #[serde(default, skip_serializing_if = "PropertyBag::is_empty")]
    pub properties: PropertyBag,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

fn gid_is_zero(gid: &Gid) -> bool {
    *gid == 0
}

fn f64_is_zero(n: &f64) -> bool {
    *n == 0.0
}
