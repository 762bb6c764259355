//! The shared tile catalog.
//!
//! Admission dedups tiles across every ingested document: an incoming
//! occurrence is compared against canonical tiles in admission order and
//! joins the first one it matches, or founds a new canonical tile at the
//! end. A hash index from occurrence key to catalog position keeps
//! resolution constant-time regardless of catalog size.

pub mod entry;
pub mod materialize;

pub use entry::{CanonicalTile, SourceTileRef};
pub use materialize::{materialize, MaterializeReport, MaterializedCatalog};

use std::collections::HashMap;

use crate::document::Gid;

/// Identifies one ingested document within a run.
///
/// Ids are handed out in ingestion order, so they double as a stable
/// ordering for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub u32);

/// Identity of a tile occurrence: which document, which original gid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileKey {
    pub document: DocumentId,
    pub gid: Gid,
}

/// All canonical tiles admitted so far, in admission order.
#[derive(Debug, Default)]
pub struct TileCatalog {
    entries: Vec<CanonicalTile>,
    index: HashMap<TileKey, usize>,
}

impl TileCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit one occurrence: join the first matching canonical tile, or
    /// found a new one. Returns `true` when a new canonical tile was
    /// founded.
    pub fn admit(&mut self, occurrence: SourceTileRef) -> bool {
        let key = occurrence.key;
        for (position, canonical) in self.entries.iter_mut().enumerate() {
            if canonical.matches(&occurrence) {
                canonical.absorb(occurrence);
                self.index.insert(key, position);
                return false;
            }
        }
        self.index.insert(key, self.entries.len());
        self.entries.push(CanonicalTile::new(occurrence));
        true
    }

    /// Resolve an occurrence to the canonical tile that absorbed it.
    pub fn find_merged(&self, key: TileKey) -> Option<&CanonicalTile> {
        self.index.get(&key).map(|&position| &self.entries[position])
    }

    /// Canonical tiles in admission order.
    pub fn entries(&self) -> impl Iterator<Item = &CanonicalTile> {
        self.entries.iter()
    }

    /// Canonical tiles that absorbed more than one occurrence.
    pub fn shared_entries(&self) -> impl Iterator<Item = &CanonicalTile> {
        self.entries.iter().filter(|entry| entry.is_shared())
    }

    /// Number of canonical tiles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total occurrences absorbed across all canonical tiles.
    pub fn occurrence_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.members().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PropertyBag;
    use crate::tile::TileImage;
    use image::{Rgba, RgbaImage};
    use std::path::PathBuf;
    use std::sync::Arc;

    fn occurrence(document: u32, gid: Gid, rgba: [u8; 4]) -> SourceTileRef {
        SourceTileRef {
            key: TileKey {
                document: DocumentId(document),
                gid,
            },
            source: PathBuf::from(format!("map{document}.tmj")),
            image: Arc::new(TileImage::from_pixels(RgbaImage::from_pixel(
                4,
                4,
                Rgba(rgba),
            ))),
            properties: PropertyBag::new(),
        }
    }

    #[test]
    fn test_first_occurrence_founds_entry() {
        let mut catalog = TileCatalog::new();

        assert!(catalog.admit(occurrence(0, 1, [1, 1, 1, 255])));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.occurrence_count(), 1);
    }

    #[test]
    fn test_identical_occurrence_joins_entry() {
        let mut catalog = TileCatalog::new();
        catalog.admit(occurrence(0, 1, [1, 1, 1, 255]));

        assert!(!catalog.admit(occurrence(1, 7, [1, 1, 1, 255])));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.occurrence_count(), 2);
    }

    #[test]
    fn test_distinct_pixels_stay_distinct() {
        let mut catalog = TileCatalog::new();
        catalog.admit(occurrence(0, 1, [1, 1, 1, 255]));
        catalog.admit(occurrence(0, 2, [2, 2, 2, 255]));

        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_first_fit_wins() {
        // Two distinct entries, then a duplicate of the first: it must
        // join the earlier entry, not the later one.
        let mut catalog = TileCatalog::new();
        catalog.admit(occurrence(0, 1, [1, 1, 1, 255]));
        catalog.admit(occurrence(0, 2, [2, 2, 2, 255]));
        catalog.admit(occurrence(1, 5, [1, 1, 1, 255]));

        let entries: Vec<_> = catalog.entries().collect();
        assert_eq!(entries[0].members().len(), 2);
        assert_eq!(entries[1].members().len(), 1);
    }

    #[test]
    fn test_find_merged_resolves_every_member() {
        let mut catalog = TileCatalog::new();
        catalog.admit(occurrence(0, 1, [1, 1, 1, 255]));
        catalog.admit(occurrence(1, 3, [1, 1, 1, 255]));

        let a = catalog
            .find_merged(TileKey {
                document: DocumentId(0),
                gid: 1,
            })
            .unwrap();
        let b = catalog
            .find_merged(TileKey {
                document: DocumentId(1),
                gid: 3,
            })
            .unwrap();

        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_find_merged_unknown_key() {
        let catalog = TileCatalog::new();

        assert!(catalog
            .find_merged(TileKey {
                document: DocumentId(9),
                gid: 9,
            })
            .is_none());
    }

    #[test]
    fn test_admission_order_preserved() {
        let mut catalog = TileCatalog::new();
        catalog.admit(occurrence(0, 1, [3, 3, 3, 255]));
        catalog.admit(occurrence(0, 2, [1, 1, 1, 255]));
        catalog.admit(occurrence(0, 3, [2, 2, 2, 255]));

        let first_pixels: Vec<_> = catalog
            .entries()
            .map(|entry| entry.image().pixels().get_pixel(0, 0).0[0])
            .collect();
        assert_eq!(first_pixels, vec![3, 1, 2]);
    }

    #[test]
    fn test_shared_entries() {
        let mut catalog = TileCatalog::new();
        catalog.admit(occurrence(0, 1, [1, 1, 1, 255]));
        catalog.admit(occurrence(0, 2, [2, 2, 2, 255]));
        catalog.admit(occurrence(1, 1, [1, 1, 1, 255]));

        assert_eq!(catalog.shared_entries().count(), 1);
    }
}
