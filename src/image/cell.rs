//! A grayscale microscopy image together with the path it was read from.
//!
//! Preprocessing returns a new `CellImage` that keeps the source path, so a
//! processed image can never be saved over its own source file.
use super::io::{load_grayscale_image, save_grayscale_u8, GrayImageU8};
use crate::contrast;
use super::{ImageF64, ImagePath, ImageU8};
use crate::error::{OrientationError, Result};
use crate::filters;
use log::debug;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq)]
pub struct CellImage {
    path: ImagePath,
    pixels: GrayImageU8,
}

/// Validate `path`, then decode the file as 8-bit grayscale.
pub fn read_img(path: &str) -> Result<CellImage> {
    let path = ImagePath::new(path)?;
    let pixels = load_grayscale_image(path.as_path())?;
    debug!(
        "read_img: {} ({}x{})",
        path,
        pixels.width(),
        pixels.height()
    );
    Ok(CellImage { path, pixels })
}

impl CellImage {
    pub fn new(path: ImagePath, pixels: GrayImageU8) -> Self {
        Self { path, pixels }
    }

    pub fn path(&self) -> &ImagePath {
        &self.path
    }

    pub fn pixels(&self) -> &GrayImageU8 {
        &self.pixels
    }

    pub fn width(&self) -> usize {
        self.pixels.width()
    }

    pub fn height(&self) -> usize {
        self.pixels.height()
    }

    pub fn as_view(&self) -> ImageU8<'_> {
        self.pixels.as_view()
    }

    /// Promote to the `f64` intensity field consumed by the gradient stage.
    pub fn to_intensity_field(&self) -> ImageF64 {
        self.pixels.as_view().to_f64()
    }

    /// Gaussian blur with a `ksize_x` × `ksize_y` kernel (`sigma <= 0`
    /// derives it from the kernel size). Output is rounded back to 8 bits.
    pub fn gaussian_blur(&self, ksize_x: usize, ksize_y: usize, sigma: f64) -> Result<CellImage> {
        let blurred = filters::gaussian_blur(&self.to_intensity_field(), ksize_x, ksize_y, sigma)?;
        Ok(CellImage {
            path: self.path.clone(),
            pixels: GrayImageU8::from_field(&blurred),
        })
    }

    /// Contrast-limited adaptive histogram equalisation over a
    /// `tiles_x` × `tiles_y` grid; see [`contrast::clahe`].
    pub fn clahe(&self, clip_limit: f64, tiles_x: usize, tiles_y: usize) -> Result<CellImage> {
        let equalised = contrast::clahe(&self.as_view(), clip_limit, tiles_x, tiles_y)?;
        Ok(CellImage {
            path: self.path.clone(),
            pixels: equalised,
        })
    }

    /// Fails with `SourceOverwrite` if `target` resolves to the file this
    /// image was read from.
    pub fn ensure_not_source(&self, target: &Path) -> Result<()> {
        let resolved = resolve(target);
        if resolved == resolve(self.path.as_path()) {
            return Err(OrientationError::SourceOverwrite(resolved));
        }
        Ok(())
    }

    /// Validate `target` as an image output: not the source file, and a
    /// supported extension.
    pub fn output_path(&self, target: &Path) -> Result<ImagePath> {
        self.ensure_not_source(target)?;
        let value = target
            .to_str()
            .ok_or_else(|| OrientationError::InvalidImagePath(target.display().to_string()))?;
        ImagePath::new(value)
    }

    /// Write the pixels to `file_path`.
    ///
    /// Fails with `SourceOverwrite` if the target is the file this image was
    /// read from, and with `InvalidImagePath` for unsupported extensions.
    pub fn save(&self, file_path: &str) -> Result<()> {
        let output = self.output_path(Path::new(file_path))?;
        debug!("CellImage::save: {} -> {}", self.path, output);
        save_grayscale_u8(&self.pixels, output.as_path())
    }
}

/// Absolute form of `path` for identity checks. Symlinks and `..` are
/// resolved for whatever prefix of the path already exists.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };
    if let (Some(parent), Some(name)) = (absolute.parent(), absolute.file_name()) {
        if let Ok(parent) = parent.canonicalize() {
            return parent.join(name);
        }
    }
    absolute
}
