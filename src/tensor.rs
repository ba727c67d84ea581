//! Structure tensor aggregation and orientation statistics.
//!
//! The tensor at a pixel is the Gaussian-weighted local average of the
//! gradient outer product
//!
//! ```text
//! J = G * [ ix·ix  ix·iy ]
//!         [ ix·iy  iy·iy ]
//! ```
//!
//! Only the three distinct components are stored. Everything else (angles,
//! coherence, order parameter, histogram) is derived on demand.
//!
//! Angle conventions:
//! - [`StructureTensorField::angle_field`] is the dominant *gradient*
//!   direction `θ = ½·atan2(2Jxy, Jxx − Jyy)` in (−π/2, π/2]. Flat pixels
//!   (`Jxy = 0`, `Jxx = Jyy`) report exactly 0.
//! - [`StructureTensorField::corrected_angle_field`] is the *structure*
//!   orientation `(θ − π/2) mod π` in [0, π), measured from the horizontal
//!   axis. Flat pixels therefore report π/2.
use crate::angle::{centered_about, normalize_half_pi, DoubledAngleMoments};
use crate::error::{OrientationError, Result};
use crate::filters::{apply_separable, gaussian_kernel};
use crate::gradient::GradientPair;
use crate::histogram::OrientationHistogram;
use crate::image::ImageF64;
use log::{debug, warn};
use nalgebra::{Matrix2, SymmetricEigen, Vector2};
use rayon::prelude::*;
use std::f64::consts::FRAC_PI_2;

/// Smoothing kernel size used when none is configured.
pub const DEFAULT_TENSOR_KSIZE: usize = 15;

/// Per-pixel smoothed second-moment matrix of a gradient field.
#[derive(Clone, Debug, PartialEq)]
pub struct StructureTensorField {
    jxx: ImageF64,
    jyy: ImageF64,
    jxy: ImageF64,
}

/// Eigen-decomposition of one tensor, largest eigenvalue first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrincipalAxes {
    pub lambda_major: f64,
    pub lambda_minor: f64,
    /// Unit eigenvector of `lambda_major` (dominant gradient direction).
    pub major: Vector2<f64>,
    /// Unit eigenvector of `lambda_minor` (structure direction).
    pub minor: Vector2<f64>,
}

/// Field-wide statistics produced by [`StructureTensorField::summarize`].
#[derive(Clone, Debug, PartialEq)]
pub struct OrientationSummary {
    pub order_parameter: f64,
    pub centered_order_parameter: f64,
    /// Circular mean of the corrected angles, radians in [0, π).
    pub mean_orientation: f64,
    pub mean_coherence: f64,
    pub histogram: OrientationHistogram,
}

/// Build the tensor field with a sigma derived from the kernel size.
pub fn build_structure_tensor(
    g: &GradientPair,
    smoothing_kernel_size: usize,
) -> Result<StructureTensorField> {
    build_structure_tensor_with_sigma(g, smoothing_kernel_size, 0.0)
}

/// Build the tensor field with an explicit Gaussian sigma (`<= 0` derives it).
pub fn build_structure_tensor_with_sigma(
    g: &GradientPair,
    smoothing_kernel_size: usize,
    sigma: f64,
) -> Result<StructureTensorField> {
    let kernel = gaussian_kernel(smoothing_kernel_size, sigma)?;
    debug!(
        "build_structure_tensor: {}x{} ksize={} sigma={}",
        g.width(),
        g.height(),
        smoothing_kernel_size,
        sigma
    );

    let (ix, iy) = (g.ix(), g.iy());
    let products = |f: fn(f64, f64) -> f64| -> ImageF64 {
        let mut out = ImageF64::new(ix.w, ix.h);
        out.data
            .par_iter_mut()
            .zip(ix.data.par_iter().zip(iy.data.par_iter()))
            .for_each(|(o, (&a, &b))| *o = f(a, b));
        out
    };
    let xx = products(|a, _| a * a);
    let yy = products(|_, b| b * b);
    let xy = products(|a, b| a * b);

    let smooth = |src: &ImageF64| apply_separable(src, &kernel, &kernel);
    let (jxx, (jyy, jxy)) = rayon::join(
        || smooth(&xx),
        || rayon::join(|| smooth(&yy), || smooth(&xy)),
    );

    Ok(StructureTensorField { jxx, jyy, jxy })
}

impl StructureTensorField {
    /// Assemble a field from precomputed components.
    ///
    /// Rejects mismatched shapes and negative diagonal entries.
    pub fn from_components(jxx: ImageF64, jyy: ImageF64, jxy: ImageF64) -> Result<Self> {
        jxx.ensure_same_shape(&jyy)?;
        jxx.ensure_same_shape(&jxy)?;
        if jxx.data.iter().chain(&jyy.data).any(|&v| v < 0.0) {
            return Err(OrientationError::NegativeDiagonal);
        }
        Ok(Self { jxx, jyy, jxy })
    }

    pub fn jxx(&self) -> &ImageF64 {
        &self.jxx
    }

    pub fn jyy(&self) -> &ImageF64 {
        &self.jyy
    }

    pub fn jxy(&self) -> &ImageF64 {
        &self.jxy
    }

    pub fn width(&self) -> usize {
        self.jxx.w
    }

    pub fn height(&self) -> usize {
        self.jxx.h
    }

    fn zip_map(&self, f: impl Fn(f64, f64, f64) -> f64 + Sync) -> ImageF64 {
        let mut out = ImageF64::new(self.jxx.w, self.jxx.h);
        out.data
            .par_iter_mut()
            .zip(
                self.jxx
                    .data
                    .par_iter()
                    .zip(self.jyy.data.par_iter().zip(self.jxy.data.par_iter())),
            )
            .for_each(|(o, (&xx, (&yy, &xy)))| *o = f(xx, yy, xy));
        out
    }

    /// Dominant gradient direction per pixel, in (−π/2, π/2].
    pub fn angle_field(&self) -> ImageF64 {
        self.zip_map(gradient_angle)
    }

    /// Structure orientation relative to the horizontal axis, in [0, π).
    pub fn corrected_angle_field(&self) -> ImageF64 {
        self.zip_map(|xx, yy, xy| normalize_half_pi(gradient_angle(xx, yy, xy) - FRAC_PI_2))
    }

    /// Normalised eigenvalue gap `(λ1 − λ2) / (λ1 + λ2)` in [0, 1].
    ///
    /// 0 for isotropic neighbourhoods and for pixels with no gradient energy.
    pub fn coherence_field(&self) -> ImageF64 {
        self.zip_map(|xx, yy, xy| {
            let trace = xx + yy;
            if trace <= 0.0 {
                return 0.0;
            }
            ((xx - yy).hypot(2.0 * xy) / trace).min(1.0)
        })
    }

    fn has_energy(&self) -> bool {
        self.jxx.data.iter().chain(&self.jyy.data).any(|&v| v != 0.0)
    }

    fn warn_if_flat(&self) {
        if !self.has_energy() {
            warn!("structure tensor has no gradient energy; all pixels report the flat angle");
        }
    }

    /// Orientation order parameter of the corrected angles.
    ///
    /// `S = sqrt(<cos 2θ>² + <sin 2θ>²)`: 1 for perfectly aligned
    /// structure, near 0 for isotropic content. Fails on an empty field.
    pub fn order_parameter(&self) -> Result<f64> {
        let s = DoubledAngleMoments::from_angles(self.corrected_angle_field().data)?
            .resultant_length();
        self.warn_if_flat();
        debug!("order_parameter: S={s:.6}");
        Ok(s)
    }

    /// Circular mean of the corrected angles, in [0, π).
    pub fn mean_orientation(&self) -> Result<f64> {
        Ok(DoubledAngleMoments::from_angles(self.corrected_angle_field().data)?.mean_angle())
    }

    /// `<cos 2(θ − θ̄)>` against the circular mean θ̄.
    ///
    /// Equal to [`order_parameter`](Self::order_parameter) up to rounding;
    /// reported alongside it for comparison with mean-referenced analyses.
    pub fn centered_order_parameter(&self) -> Result<f64> {
        let angles = self.corrected_angle_field();
        crate::angle::centered_order_parameter(&angles.data)
    }

    /// All summary statistics from a single evaluation of the corrected
    /// angle field. The histogram range is in radians.
    pub fn summarize(
        &self,
        bin_count: usize,
        angle_min: f64,
        angle_max: f64,
    ) -> Result<OrientationSummary> {
        let angles = self.corrected_angle_field();
        let moments = DoubledAngleMoments::from_angles(angles.data.iter().copied())?;
        self.warn_if_flat();
        let mean_orientation = moments.mean_angle();
        let centered_order_parameter = centered_about(&angles.data, mean_orientation)?;
        let coherence = self.coherence_field();
        let mean_coherence = coherence.data.iter().sum::<f64>() / coherence.len() as f64;
        let histogram =
            OrientationHistogram::from_samples(angles.data, bin_count, angle_min, angle_max)?;
        Ok(OrientationSummary {
            order_parameter: moments.resultant_length(),
            centered_order_parameter,
            mean_orientation,
            mean_coherence,
            histogram,
        })
    }

    /// Histogram of the corrected angles over `[angle_min, angle_max]`
    /// (radians, the unit of the angle field).
    pub fn orientation_histogram(
        &self,
        bin_count: usize,
        angle_min: f64,
        angle_max: f64,
    ) -> Result<OrientationHistogram> {
        let angles = self.corrected_angle_field();
        OrientationHistogram::from_samples(angles.data, bin_count, angle_min, angle_max)
    }

    /// Tensor at pixel (x, y) as a symmetric 2×2 matrix.
    pub fn tensor_at(&self, x: usize, y: usize) -> Matrix2<f64> {
        let xy = self.jxy.get(x, y);
        Matrix2::new(self.jxx.get(x, y), xy, xy, self.jyy.get(x, y))
    }

    /// Eigenvalues and eigenvectors of the tensor at (x, y).
    pub fn principal_axes_at(&self, x: usize, y: usize) -> PrincipalAxes {
        let eig = SymmetricEigen::new(self.tensor_at(x, y));
        let (i_major, i_minor) = if eig.eigenvalues[0] >= eig.eigenvalues[1] {
            (0, 1)
        } else {
            (1, 0)
        };
        PrincipalAxes {
            lambda_major: eig.eigenvalues[i_major],
            lambda_minor: eig.eigenvalues[i_minor],
            major: eig.eigenvectors.column(i_major).into_owned(),
            minor: eig.eigenvectors.column(i_minor).into_owned(),
        }
    }
}

#[inline]
fn gradient_angle(jxx: f64, jyy: f64, jxy: f64) -> f64 {
    if jxy == 0.0 {
        // Also folds -0.0, which would otherwise send atan2 to -π.
        return if jxx >= jyy { 0.0 } else { FRAC_PI_2 };
    }
    let theta = 0.5 * (2.0 * jxy).atan2(jxx - jyy);
    if theta <= -FRAC_PI_2 {
        FRAC_PI_2
    } else {
        theta
    }
}
