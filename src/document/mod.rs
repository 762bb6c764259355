//! Tile map documents: the data model and its JSON codec.

pub mod codec;
pub mod model;

pub use codec::{read_document, read_tileset, write_atomic, write_document, write_tileset};
pub use model::{
    Gid, ImageLayer, Layer, MapDocument, MapObject, ObjectLayer, PropertyBag, TileDef, TileLayer,
    Tileset, TilesetEntry, TilesetRef, EMPTY_GID,
};
