//! Image gradients (Sobel) in double precision.
//!
//! - Builds the separable Sobel pair for the requested kernel size and
//!   correlates it along x (for `ix`) and y (for `iy`).
//! - Outputs keep the input shape; borders use reflect-101 extension, so the
//!   x-derivative of the outermost columns (and the y-derivative of the
//!   outermost rows) only sees mirrored samples and is exactly zero for a
//!   field that is locally symmetric about the edge.
//! - Values are `f64` and unnormalised: a 0→255 step gives `4 * 255` with the
//!   3-tap kernel.
//!
//! Complexity: O(W·H·k) per axis.
use crate::error::Result;
use crate::filters::{apply_separable, sobel_kernels};
use crate::image::ImageF64;
use log::debug;

/// Conventional Sobel kernel size.
pub const DEFAULT_SOBEL_KSIZE: usize = 3;

/// Horizontal and vertical derivatives of one intensity field.
///
/// Both buffers always share the source's shape.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientPair {
    ix: ImageF64,
    iy: ImageF64,
}

impl GradientPair {
    /// Pair two derivative buffers, rejecting mismatched shapes.
    pub fn new(ix: ImageF64, iy: ImageF64) -> Result<Self> {
        ix.ensure_same_shape(&iy)?;
        Ok(Self { ix, iy })
    }

    /// Horizontal derivative (kernel X)
    pub fn ix(&self) -> &ImageF64 {
        &self.ix
    }

    /// Vertical derivative (kernel Y)
    pub fn iy(&self) -> &ImageF64 {
        &self.iy
    }

    pub fn width(&self) -> usize {
        self.ix.w
    }

    pub fn height(&self) -> usize {
        self.ix.h
    }

    /// Euclidean magnitude per pixel: `sqrt(ix^2 + iy^2)`
    pub fn magnitude(&self) -> ImageF64 {
        let mut mag = ImageF64::new(self.ix.w, self.ix.h);
        for ((m, &gx), &gy) in mag.data.iter_mut().zip(&self.ix.data).zip(&self.iy.data) {
            *m = gx.hypot(gy);
        }
        mag
    }

    pub fn into_parts(self) -> (ImageF64, ImageF64) {
        (self.ix, self.iy)
    }
}

/// Compute Sobel gradients of `field` with a `kernel_size` × `kernel_size`
/// operator (`kernel_size` odd, ≥ 1).
pub fn compute_gradients(field: &ImageF64, kernel_size: usize) -> Result<GradientPair> {
    let (derivative, smoothing) = sobel_kernels(kernel_size)?;
    debug!(
        "compute_gradients: {}x{} ksize={}",
        field.w, field.h, kernel_size
    );
    let (ix, iy) = rayon::join(
        || apply_separable(field, &derivative, &smoothing),
        || apply_separable(field, &smoothing, &derivative),
    );
    Ok(GradientPair { ix, iy })
}
