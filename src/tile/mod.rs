//! Tile raster handling.
//!
//! [`TileImage`] wraps a decoded tile bitmap. Every image is converted to
//! RGBA8 at load time, so two tiles that look identical compare equal byte
//! for byte no matter how their source files were encoded (palette PNG,
//! greyscale, RGB with no alpha).

use std::io::Cursor;
use std::path::Path;

use image::{imageops, ImageFormat, RgbaImage};

use crate::document::codec::write_atomic;
use crate::error::{MergeError, Result};

/// A decoded tile bitmap in RGBA8 normal form.
#[derive(Debug, Clone, PartialEq)]
pub struct TileImage {
    pixels: RgbaImage,
}

impl TileImage {
    /// Load and decode an image file.
    pub fn open(path: &Path) -> Result<Self> {
        let decoded = image::open(path).map_err(|err| MergeError::Image {
            path: path.to_path_buf(),
            message: format!("cannot decode image: {err}"),
        })?;
        Ok(Self {
            pixels: decoded.to_rgba8(),
        })
    }

    /// Wrap an already-decoded bitmap.
    pub fn from_pixels(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Copy out the `width` x `height` region at (x, y).
    ///
    /// The caller is responsible for keeping the region inside the bitmap;
    /// sheet slicing validates geometry before cropping.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> TileImage {
        TileImage {
            pixels: imageops::crop_imm(&self.pixels, x, y, width, height).to_image(),
        }
    }

    /// Exact pixel equality: same dimensions and the same RGBA8 bytes.
    pub fn pixels_match(&self, other: &TileImage) -> bool {
        self.width() == other.width()
            && self.height() == other.height()
            && self.pixels.as_raw() == other.pixels.as_raw()
    }

    /// Encode as PNG and write through a temp sibling plus rename.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        let mut encoded = Vec::new();
        self.pixels
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
            .map_err(|err| MergeError::Write {
                path: path.to_path_buf(),
                message: format!("cannot encode PNG: {err}"),
            })?;
        write_atomic(path, &encoded)
    }

    /// Raw access for tests and benchmarks.
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}
