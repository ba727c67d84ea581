//! Separable 1D kernels and correlation passes.
//!
//! Both the Sobel derivative and the Gaussian smoothing used by the pipeline
//! are separable, so every 2D filter here is a row pass followed by a column
//! pass. Kernels are applied as correlations: tap `k` multiplies the sample at
//! offset `k - radius`.
//!
//! Borders use reflect-101 extension (`gfedcb|abcdefgh|gfedcba`): the edge
//! sample is the mirror axis and is not repeated. A one-pixel axis reflects
//! onto itself.
//!
//! Rows of the output are independent, so each pass runs row-parallel with
//! rayon; results do not depend on scheduling.
use crate::error::{check_kernel_size, KernelStage, OrientationError, Result};
use crate::image::{ImageF64, ImageView};
use rayon::prelude::*;

/// Trait implemented by 1D filters applied along one axis.
pub trait SeparableFilter {
    /// Return the 1D taps (in left-to-right order). The kernel does not have
    /// to be symmetric; derivative kernels are antisymmetric.
    fn taps(&self) -> &[f64];

    /// Number of samples reached on each side of the centre.
    fn radius(&self) -> usize {
        self.taps().len() / 2
    }
}

/// Owned odd-length kernel. Built only by [`sobel_kernels`] and
/// [`gaussian_kernel`], which validate the size first.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel1D {
    taps: Vec<f64>,
}

impl Kernel1D {
    pub(crate) fn new(taps: Vec<f64>) -> Self {
        debug_assert!(taps.len() % 2 == 1, "kernel length must be odd");
        Self { taps }
    }

    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.taps.iter().sum()
    }
}

impl SeparableFilter for Kernel1D {
    #[inline]
    fn taps(&self) -> &[f64] {
        &self.taps
    }
}

/// Normalised 3-tap binomial `[1, 2, 1] / 4`.
pub const GAUSSIAN_3TAP: [f64; 3] = [0.25, 0.5, 0.25];
/// Normalised 5-tap binomial `[1, 4, 6, 4, 1] / 16`.
pub const GAUSSIAN_5TAP: [f64; 5] = [0.0625, 0.25, 0.375, 0.25, 0.0625];
/// Fixed 7-tap smoothing table used when sigma is derived.
pub const GAUSSIAN_7TAP: [f64; 7] = [
    0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125,
];

/// Index into `0..n` for a possibly out-of-range position, reflect-101.
#[inline]
pub fn reflect_101(i: isize, n: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let period = 2 * (n as isize - 1);
    let m = i.rem_euclid(period);
    if m >= n as isize {
        (period - m) as usize
    } else {
        m as usize
    }
}

/// Row `n` of Pascal's triangle as `n` taps (`binomial(3) = [1, 2, 1]`).
fn binomial(len: usize) -> Vec<f64> {
    let mut row = vec![1.0];
    for _ in 1..len {
        let mut next = vec![0.0; row.len() + 1];
        for (i, &v) in row.iter().enumerate() {
            next[i] += v;
            next[i + 1] += v;
        }
        row = next;
    }
    row
}

fn convolve_full(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &av) in a.iter().enumerate() {
        for (j, &bv) in b.iter().enumerate() {
            out[i + j] += av * bv;
        }
    }
    out
}

/// First-order Sobel kernels of size `ksize`: `(derivative, smoothing)`.
///
/// `ksize == 1` gives the plain central difference `[-1, 0, 1]` with no
/// cross-axis smoothing. Larger sizes smooth with binomial taps of length
/// `ksize` and differentiate with `[-1, 0, 1]` convolved with binomial taps
/// of length `ksize - 2`. Taps are unnormalised integers.
pub fn sobel_kernels(ksize: usize) -> Result<(Kernel1D, Kernel1D)> {
    check_kernel_size(KernelStage::Sobel, ksize)?;
    if ksize == 1 {
        return Ok((Kernel1D::new(vec![-1.0, 0.0, 1.0]), Kernel1D::new(vec![1.0])));
    }
    let derivative = convolve_full(&[-1.0, 0.0, 1.0], &binomial(ksize - 2));
    Ok((Kernel1D::new(derivative), Kernel1D::new(binomial(ksize))))
}

/// Sigma implied by a kernel size when the caller passes `sigma <= 0`.
pub fn default_sigma(ksize: usize) -> f64 {
    0.3 * ((ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalised Gaussian kernel of size `ksize`.
///
/// `sigma <= 0` derives the width from the kernel size: sizes up to 7 use
/// fixed binomial-like tables, larger sizes sample a Gaussian with
/// [`default_sigma`].
pub fn gaussian_kernel(ksize: usize, sigma: f64) -> Result<Kernel1D> {
    check_kernel_size(KernelStage::Gaussian, ksize)?;
    if !sigma.is_finite() {
        return Err(OrientationError::InvalidSigma(sigma));
    }
    if sigma <= 0.0 {
        match ksize {
            1 => return Ok(Kernel1D::new(vec![1.0])),
            3 => return Ok(Kernel1D::new(GAUSSIAN_3TAP.to_vec())),
            5 => return Ok(Kernel1D::new(GAUSSIAN_5TAP.to_vec())),
            7 => return Ok(Kernel1D::new(GAUSSIAN_7TAP.to_vec())),
            _ => {}
        }
    }
    let sigma = if sigma > 0.0 { sigma } else { default_sigma(ksize) };
    let radius = (ksize / 2) as f64;
    let scale = -0.5 / (sigma * sigma);
    let mut taps: Vec<f64> = (0..ksize)
        .map(|i| {
            let d = i as f64 - radius;
            (scale * d * d).exp()
        })
        .collect();
    let total: f64 = taps.iter().sum();
    for t in &mut taps {
        *t /= total;
    }
    Ok(Kernel1D::new(taps))
}

/// Correlate every row with `filter` (horizontal pass).
pub fn correlate_rows(src: &ImageF64, filter: &dyn SeparableFilter) -> ImageF64 {
    let mut out = ImageF64::new(src.w, src.h);
    if src.is_empty() {
        return out;
    }
    let taps = filter.taps();
    let radius = filter.radius() as isize;
    let w = src.w;
    out.data
        .par_chunks_mut(w)
        .enumerate()
        .for_each(|(y, dst)| {
            let row = src.row(y);
            for (x, d) in dst.iter_mut().enumerate() {
                let mut acc = 0.0;
                for (k, &t) in taps.iter().enumerate() {
                    let sx = reflect_101(x as isize + k as isize - radius, w);
                    acc += t * row[sx];
                }
                *d = acc;
            }
        });
    out
}

/// Correlate every column with `filter` (vertical pass).
pub fn correlate_cols(src: &ImageF64, filter: &dyn SeparableFilter) -> ImageF64 {
    let mut out = ImageF64::new(src.w, src.h);
    if src.is_empty() {
        return out;
    }
    let taps = filter.taps();
    let radius = filter.radius() as isize;
    let (w, h) = (src.w, src.h);
    out.data
        .par_chunks_mut(w)
        .enumerate()
        .for_each(|(y, dst)| {
            for (k, &t) in taps.iter().enumerate() {
                let sy = reflect_101(y as isize + k as isize - radius, h);
                let row = src.row(sy);
                for (d, &s) in dst.iter_mut().zip(row) {
                    *d += t * s;
                }
            }
        });
    out
}

/// Row pass with `row_filter`, then column pass with `col_filter`.
pub fn apply_separable(
    src: &ImageF64,
    row_filter: &dyn SeparableFilter,
    col_filter: &dyn SeparableFilter,
) -> ImageF64 {
    let tmp = correlate_rows(src, row_filter);
    correlate_cols(&tmp, col_filter)
}

/// Gaussian blur with independent horizontal/vertical kernel sizes.
pub fn gaussian_blur(src: &ImageF64, ksize_x: usize, ksize_y: usize, sigma: f64) -> Result<ImageF64> {
    let kx = gaussian_kernel(ksize_x, sigma)?;
    let ky = gaussian_kernel(ksize_y, sigma)?;
    Ok(apply_separable(src, &kx, &ky))
}
