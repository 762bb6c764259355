//! tilemerge - Shared-tileset consolidation for tile map documents
//!
//! A library for deduplicating the tile graphics of many 2D tile-map
//! documents into one canonical tileset, then rewriting every map to
//! reference the shared tiles.
//!
//! The pipeline runs in three phases: every document is ingested into a
//! [`catalog::TileCatalog`] (pixel-and-property-identical tiles collapse
//! into one canonical entry), the finished catalog is materialized to
//! disk as a tileset, and each map is rebuilt with its cells translated
//! to the catalog's output gids.

pub mod catalog;
pub mod cli;
pub mod discovery;
pub mod document;
pub mod error;
pub mod ingest;
pub mod output;
pub mod rebuild;
pub mod tile;

pub use catalog::{
    materialize, CanonicalTile, DocumentId, MaterializeReport, MaterializedCatalog, SourceTileRef,
    TileCatalog, TileKey,
};
pub use discovery::{discover_inputs, load_manifest, Manifest};
pub use document::{Gid, Layer, MapDocument, PropertyBag, TileLayer, Tileset, EMPTY_GID};
pub use error::{MergeError, Result};
pub use ingest::{IngestSummary, IngestedDocument, Ingestor};
pub use rebuild::{rebuild, relative_source, RebuiltDocument, RemapMiss};
pub use tile::TileImage;
