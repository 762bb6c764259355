//! Inspect command implementation.
//!
//! Dry run of the ingest phase: reports how much a merge would save
//! without writing anything.

use std::path::{Path, PathBuf};

use clap::Args;

use crate::discovery::{discover_inputs, load_manifest};
use crate::error::Result;
use crate::ingest::Ingestor;
use crate::output::{display_path, plural, Printer};

/// Report duplicate tiles across maps without writing anything
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Map files or directories to inspect (default: current directory)
    pub inputs: Vec<PathBuf>,

    /// List every canonical tile shared by more than one source tile
    #[arg(long)]
    pub groups: bool,

    /// Prefix identifying a previous run's output to skip
    #[arg(long, short)]
    pub prefix: Option<String>,
}

pub fn run(args: InspectArgs, printer: &Printer) -> Result<()> {
    let (manifest, _) = load_manifest(Path::new("."))?;
    let prefix = args.prefix.clone().unwrap_or_else(|| manifest.prefix.clone());

    let maps = discover_inputs(&args.inputs, &prefix, &manifest);
    if maps.is_empty() {
        printer.warning("Warning", "no map documents found");
        return Ok(());
    }

    let mut ingestor = Ingestor::new();
    for map in &maps {
        match ingestor.ingest_file(map) {
            Ok(summary) => printer.status(
                "Scanning",
                &format!(
                    "{} ({})",
                    display_path(map),
                    plural(summary.tiles, "tile", "tiles")
                ),
            ),
            Err(err) => printer.error("Skipping", &format!("{}: {}", display_path(map), err)),
        }
    }

    let catalog = ingestor.catalog();
    let sources = catalog.occurrence_count();
    let canonical = catalog.len();

    printer.info(
        "Documents",
        &plural(ingestor.documents().len(), "map ingested", "maps ingested"),
    );
    printer.info(
        "Tiles",
        &format!("{} source, {} canonical", sources, canonical),
    );
    if sources > 0 {
        let duplicates = sources - canonical;
        printer.info(
            "Savings",
            &format!(
                "{} ({}% of source tiles)",
                plural(duplicates, "duplicate", "duplicates"),
                duplicates * 100 / sources
            ),
        );
    }

    if args.groups {
        for (position, entry) in catalog.entries().enumerate() {
            if !entry.is_shared() {
                continue;
            }
            let members: Vec<String> = entry
                .members()
                .iter()
                .map(|member| {
                    let file = member
                        .source
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_else(|| member.source.display().to_string());
                    format!("{}#{}", file, member.key.gid)
                })
                .collect();
            printer.info(
                "Shared",
                &format!(
                    "tile {} ({}x{}) {} {}",
                    position,
                    entry.width(),
                    entry.height(),
                    printer.dim("<-"),
                    members.join(", ")
                ),
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{
        write_document, Layer, MapDocument, PropertyBag, TileDef, TileLayer, Tileset, TilesetEntry,
    };
    use image::{Rgba, RgbaImage};
    use std::fs;
    use tempfile::tempdir;

    fn write_fixture(dir: &Path) {
        RgbaImage::from_pixel(4, 4, Rgba([0, 200, 0, 255]))
            .save(dir.join("grass.png"))
            .unwrap();

        let map = MapDocument {
            width: 1,
            height: 1,
            tile_width: 4,
            tile_height: 4,
            properties: PropertyBag::new(),
            tilesets: vec![TilesetEntry::Embedded(Tileset {
                first_gid: 1,
                name: "terrain".to_string(),
                tile_width: 4,
                tile_height: 4,
                margin: 0,
                spacing: 0,
                columns: 0,
                tile_count: 0,
                image: None,
                tiles: vec![TileDef {
                    id: 0,
                    image: Some("grass.png".to_string()),
                    ..TileDef::default()
                }],
            })],
            layers: vec![Layer::Tile(TileLayer {
                name: "ground".to_string(),
                width: 1,
                height: 1,
                data: vec![1],
                properties: PropertyBag::new(),
            })],
        };
        write_document(&dir.join("a.tmj"), &map).unwrap();
        write_document(&dir.join("b.tmj"), &map).unwrap();
    }

    #[test]
    fn test_inspect_writes_nothing() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path());
        let before: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();

        let args = InspectArgs {
            inputs: vec![dir.path().to_path_buf()],
            groups: true,
            prefix: None,
        };
        run(args, &Printer::new()).unwrap();

        let after: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_inspect_empty_directory() {
        let dir = tempdir().unwrap();

        let args = InspectArgs {
            inputs: vec![dir.path().to_path_buf()],
            groups: false,
            prefix: None,
        };

        run(args, &Printer::new()).unwrap();
    }

    #[test]
    fn test_inspect_tolerates_broken_documents() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path());
        fs::write(dir.path().join("broken.tmj"), "nope").unwrap();

        let args = InspectArgs {
            inputs: vec![dir.path().to_path_buf()],
            groups: false,
            prefix: None,
        };

        run(args, &Printer::new()).unwrap();
    }
}
