//! Benchmarks for the tilemerge pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgba, RgbaImage};

use tilemerge::{
    materialize, rebuild, DocumentId, IngestedDocument, Layer, MapDocument, PropertyBag,
    SourceTileRef, TileCatalog, TileImage, TileKey, TileLayer,
};

/// A 16x16 tile whose pixels are a function of the seed; distinct seeds
/// below 256 give distinct bitmaps.
fn patterned_tile(seed: u32) -> Arc<TileImage> {
    let pixels = RgbaImage::from_fn(16, 16, |x, y| {
        let v = seed.wrapping_mul(31).wrapping_add(x * 7 + y * 13) as u8;
        Rgba([v, v.wrapping_add(40), (seed % 256) as u8, 255])
    });
    Arc::new(TileImage::from_pixels(pixels))
}

fn occurrence(document: u32, gid: u32, seed: u32) -> SourceTileRef {
    SourceTileRef {
        key: TileKey {
            document: DocumentId(document),
            gid,
        },
        source: PathBuf::from("bench.tmj"),
        image: patterned_tile(seed),
        properties: PropertyBag::new(),
    }
}

// -- Admission benchmarks --

fn bench_admission(c: &mut Criterion) {
    let mut group = c.benchmark_group("admission");

    // 512 tiles drawn from 16 distinct bitmaps: the common case, most
    // admissions join an existing entry
    let duplicate_heavy: Vec<SourceTileRef> = (0..512)
        .map(|i| occurrence(i / 64, 1 + i % 64, i % 16))
        .collect();

    // 256 distinct bitmaps: every admission scans the full catalog
    let unique: Vec<SourceTileRef> = (0..256).map(|i| occurrence(0, 1 + i, i)).collect();

    group.bench_function("admit_duplicate_heavy", |b| {
        b.iter(|| {
            let mut catalog = TileCatalog::new();
            for tile in duplicate_heavy.iter().cloned() {
                catalog.admit(black_box(tile));
            }
            catalog.len()
        })
    });

    group.bench_function("admit_all_unique", |b| {
        b.iter(|| {
            let mut catalog = TileCatalog::new();
            for tile in unique.iter().cloned() {
                catalog.admit(black_box(tile));
            }
            catalog.len()
        })
    });

    group.finish();
}

// -- Resolution benchmarks --

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");

    let mut catalog = TileCatalog::new();
    let keys: Vec<TileKey> = (0..256)
        .map(|i| {
            let tile = occurrence(0, 1 + i, i);
            let key = tile.key;
            catalog.admit(tile);
            key
        })
        .collect();

    group.bench_function("find_merged_256", |b| {
        b.iter(|| {
            keys.iter()
                .filter(|&&key| catalog.find_merged(black_box(key)).is_some())
                .count()
        })
    });

    group.finish();
}

// -- Rebuild benchmarks --

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("rebuild");

    let dir = tempfile::tempdir().unwrap();
    let mut catalog = TileCatalog::new();
    for i in 0..64 {
        catalog.admit(occurrence(0, 1 + i, i));
    }
    let merged = materialize(&catalog, dir.path(), "merged.tsj").catalog;

    // 64x64 map cycling through every catalog tile
    let data: Vec<u32> = (0..64 * 64).map(|i| 1 + i % 64).collect();
    let original = IngestedDocument {
        id: DocumentId(0),
        path: PathBuf::from("bench.tmj"),
        document: MapDocument {
            width: 64,
            height: 64,
            tile_width: 16,
            tile_height: 16,
            properties: PropertyBag::new(),
            tilesets: vec![],
            layers: vec![Layer::Tile(TileLayer {
                name: "ground".to_string(),
                width: 64,
                height: 64,
                data,
                properties: PropertyBag::new(),
            })],
        },
    };

    group.bench_function("rebuild_64x64", |b| {
        b.iter(|| rebuild(black_box(&original), &merged, "merged.tsj".to_string()))
    });

    group.finish();
}

criterion_group!(benches, bench_admission, bench_resolution, bench_rebuild);
criterion_main!(benches);
