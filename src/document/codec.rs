//! Reading and writing documents as JSON files.
//!
//! Maps and tileset descriptors share one wire format (pretty-printed JSON)
//! and one write path: serialize to a buffer, write a temp sibling, rename
//! into place. A crash mid-write never leaves a truncated document behind.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::document::model::{MapDocument, Tileset};
use crate::error::{MergeError, Result};

/// Read and parse a map document.
pub fn read_document(path: &Path) -> Result<MapDocument> {
    let content = read_file(path)?;
    serde_json::from_str(&content).map_err(|err| MergeError::Document {
        path: path.to_path_buf(),
        message: format!("invalid map document: {err}"),
        help: Some(
            "expected Tiled-style JSON with width, height, tilewidth and tileheight".to_string(),
        ),
    })
}

/// Read and parse a standalone tileset descriptor.
pub fn read_tileset(path: &Path) -> Result<Tileset> {
    let content = read_file(path)?;
    serde_json::from_str(&content).map_err(|err| MergeError::Document {
        path: path.to_path_buf(),
        message: format!("invalid tileset descriptor: {err}"),
        help: None,
    })
}

/// Write a map document, replacing any existing file.
pub fn write_document(path: &Path, document: &MapDocument) -> Result<()> {
    write_json(path, document)
}

/// Write a tileset descriptor, replacing any existing file.
pub fn write_tileset(path: &Path, tileset: &Tileset) -> Result<()> {
    write_json(path, tileset)
}

/// Write raw bytes through a temp sibling plus rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let staged = temp_sibling(path);
    fs::write(&staged, bytes).map_err(|err| MergeError::Write {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    fs::rename(&staged, path).map_err(|err| {
        let _ = fs::remove_file(&staged);
        MergeError::Write {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    })
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|err| MergeError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut content = serde_json::to_string_pretty(value).map_err(|err| MergeError::Write {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    content.push('\n');
    write_atomic(path, content.as_bytes())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| OsString::from("out"));
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::{Layer, PropertyBag, TileLayer, TilesetEntry, TilesetRef};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn sample_map() -> MapDocument {
        MapDocument {
            width: 2,
            height: 1,
            tile_width: 8,
            tile_height: 8,
            properties: PropertyBag::new(),
            tilesets: vec![TilesetEntry::Reference(TilesetRef {
                first_gid: 1,
                source: "terrain.tsj".to_string(),
            })],
            layers: vec![Layer::Tile(TileLayer {
                name: "ground".to_string(),
                width: 2,
                height: 1,
                data: vec![1, 0],
                properties: PropertyBag::new(),
            })],
        }
    }

    #[test]
    fn test_document_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("level.tmj");

        write_document(&path, &sample_map()).unwrap();
        let back = read_document(&path).unwrap();

        assert_eq!(back, sample_map());
    }

    #[test]
    fn test_tileset_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("merged.tsj");
        let tileset = Tileset {
            first_gid: 0,
            name: "merged".to_string(),
            tile_width: 8,
            tile_height: 8,
            margin: 0,
            spacing: 0,
            columns: 0,
            tile_count: 2,
            image: None,
            tiles: vec![],
        };

        write_tileset(&path, &tileset).unwrap();
        let back = read_tileset(&path).unwrap();

        assert_eq!(back, tileset);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempdir().unwrap();
        let err = read_document(&dir.path().join("absent.tmj")).unwrap_err();

        assert!(matches!(err, MergeError::Io { .. }));
    }

    #[test]
    fn test_read_malformed_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.tmj");
        fs::write(&path, "{\"width\": \"not a number\"}").unwrap();

        let err = read_document(&path).unwrap_err();

        assert!(matches!(err, MergeError::Document { .. }));
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("level.tmj");

        write_document(&path, &sample_map()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["level.tmj".to_string()]);
    }

    #[test]
    fn test_write_replaces_existing_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("level.tmj");
        fs::write(&path, "garbage").unwrap();

        write_document(&path, &sample_map()).unwrap();

        assert_eq!(read_document(&path).unwrap(), sample_map());
    }
}
