//! I/O helpers for grayscale images and JSON.
//!
//! - `load_grayscale_image`: read a PNG/JPEG/BMP into an owned 8-bit gray buffer.
//! - `save_grayscale_u8`: write an owned 8-bit gray buffer.
//! - `save_grayscale_f64`: map a float field from `[lo, hi]` to 0..=255 and write it.
//! - `save_angle_map`: write an orientation field in [0, π) as gray levels.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::{ImageF64, ImageU8, ImageView};
use crate::error::{OrientationError, Result};
use image::{GrayImage, ImageBuffer, Luma};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Owned 8-bit grayscale buffer with stride and borrowed view conversion.
#[derive(Clone, Debug, PartialEq)]
pub struct GrayImageU8 {
    width: usize,
    height: usize,
    stride: usize,
    data: Vec<u8>,
}

impl GrayImageU8 {
    /// Construct an owned grayscale buffer given raw bytes.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        if data.len() != width * height {
            return Err(OrientationError::ShapeMismatch {
                expected: (width, height),
                actual: (data.len(), 1),
            });
        }
        Ok(Self {
            width,
            height,
            stride: width,
            data,
        })
    }

    /// Round and saturate a float field into 8 bits.
    pub fn from_field(field: &ImageF64) -> Self {
        let data = field
            .data
            .iter()
            .map(|&v| v.round().clamp(0.0, 255.0) as u8)
            .collect();
        Self {
            width: field.w,
            height: field.h,
            stride: field.w,
            data,
        }
    }

    /// Image width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Borrow as a read-only `ImageU8` view
    pub fn as_view(&self) -> ImageU8<'_> {
        ImageU8 {
            w: self.width,
            h: self.height,
            stride: self.stride,
            data: &self.data,
        }
    }
}

/// Load an image from disk and convert to 8-bit grayscale.
pub fn load_grayscale_image(path: &Path) -> Result<GrayImageU8> {
    if !path.exists() {
        return Err(OrientationError::FileNotFound(path.to_path_buf()));
    }
    let img = image::open(path)
        .map_err(|e| OrientationError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .into_luma8();
    let width = img.width() as usize;
    let height = img.height() as usize;
    let data = img.into_raw();
    GrayImageU8::new(width, height, data)
}

/// Save an 8-bit grayscale buffer; the format follows the extension.
pub fn save_grayscale_u8(buffer: &GrayImageU8, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let image: GrayImage =
        ImageBuffer::from_raw(buffer.width as u32, buffer.height as u32, buffer.data.clone())
            .ok_or_else(|| io_error(path, "buffer does not match its dimensions"))?;
    image.save(path).map_err(|e| io_error(path, e))
}

/// Save a float field, mapping `[lo, hi]` linearly to 0..=255 and clamping.
pub fn save_grayscale_f64(field: &ImageF64, lo: f64, hi: f64, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let span = if hi > lo { hi - lo } else { 1.0 };
    let mut out = GrayImage::new(field.w as u32, field.h as u32);
    for y in 0..field.h {
        let row = field.row(y);
        for (x, &px) in row.iter().enumerate() {
            let v = ((px - lo) / span * 255.0).round().clamp(0.0, 255.0);
            out.put_pixel(x as u32, y as u32, Luma([v as u8]));
        }
    }
    out.save(path).map_err(|e| io_error(path, e))
}

/// Save corrected orientations (radians in [0, π)) as a gray-level map.
pub fn save_angle_map(angles: &ImageF64, path: &Path) -> Result<()> {
    save_grayscale_f64(angles, 0.0, std::f64::consts::PI, path)
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value).map_err(|e| io_error(path, e))?;
    fs::write(path, json).map_err(|e| io_error(path, e))
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
    }
    Ok(())
}

fn io_error(path: &Path, e: impl std::fmt::Display) -> OrientationError {
    OrientationError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}
