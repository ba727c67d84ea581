//! End-to-end orientation analysis: optional CLAHE → optional blur → Sobel
//! gradients → structure tensor → angle statistics.
//!
//! `analyze` is the programmatic entry point; it returns the tensor field
//! (for callers that want the per-pixel fields) together with a serializable
//! [`OrientationReport`].
use crate::contrast::{self, ClaheParams};
use crate::error::{OrientationError, Result};
use crate::filters;
use crate::gradient::{compute_gradients, DEFAULT_SOBEL_KSIZE};
use crate::histogram::OrientationHistogram;
use crate::image::{CellImage, GrayImageU8, ImageF64};
use crate::tensor::{build_structure_tensor_with_sigma, StructureTensorField, DEFAULT_TENSOR_KSIZE};
use crate::timing::TimingBreakdown;
use log::debug;
use serde::{Deserialize, Serialize};

/// Parameters of one analysis run.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OrientationParams {
    /// Sobel kernel size (odd, ≥ 1).
    pub sobel_kernel_size: usize,
    /// Gaussian kernel size used to average the gradient outer product.
    pub tensor_kernel_size: usize,
    /// Gaussian sigma for the tensor average; `<= 0` derives it.
    pub tensor_sigma: f64,
    /// Optional contrast equalisation, run first. The field is rounded to
    /// 8 bits for it.
    pub clahe: Option<ClaheParams>,
    /// Optional blur applied to the intensity field before differentiation.
    pub blur: Option<BlurParams>,
    pub histogram: HistogramParams,
}

impl Default for OrientationParams {
    fn default() -> Self {
        Self {
            sobel_kernel_size: DEFAULT_SOBEL_KSIZE,
            tensor_kernel_size: DEFAULT_TENSOR_KSIZE,
            tensor_sigma: 0.0,
            clahe: None,
            blur: None,
            histogram: HistogramParams::default(),
        }
    }
}

/// Gaussian pre-blur.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BlurParams {
    pub kernel_x: usize,
    pub kernel_y: usize,
    pub sigma: f64,
}

impl Default for BlurParams {
    fn default() -> Self {
        Self {
            kernel_x: 5,
            kernel_y: 5,
            sigma: 0.0,
        }
    }
}

/// Rose-histogram binning. The range is given in degrees of structure
/// orientation, `[0, 180]` covering every axis once.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HistogramParams {
    pub bins: usize,
    pub min_deg: f64,
    pub max_deg: f64,
}

impl Default for HistogramParams {
    fn default() -> Self {
        Self {
            bins: 36,
            min_deg: 0.0,
            max_deg: 180.0,
        }
    }
}

/// Histogram with edges expressed in degrees.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramReport {
    pub edges_deg: Vec<f64>,
    pub counts: Vec<u64>,
}

impl From<&OrientationHistogram> for HistogramReport {
    fn from(h: &OrientationHistogram) -> Self {
        Self {
            edges_deg: h.edges().iter().map(|e| e.to_degrees()).collect(),
            counts: h.counts().to_vec(),
        }
    }
}

/// Summary of one analysis run.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrientationReport {
    pub width: usize,
    pub height: usize,
    pub params: OrientationParams,
    /// Resultant length of doubled structure angles, in [0, 1].
    pub order_parameter: f64,
    /// Mean-referenced form `<cos 2(θ − θ̄)>`, reported for comparison.
    pub centered_order_parameter: f64,
    /// Circular mean structure orientation from the horizontal axis.
    pub mean_orientation_deg: f64,
    pub mean_coherence: f64,
    pub histogram: HistogramReport,
    pub timing: TimingBreakdown,
}

/// Result of [`analyze`]: the tensor field plus its summary.
#[derive(Clone, Debug)]
pub struct OrientationAnalysis {
    pub tensor: StructureTensorField,
    /// The field the gradients were computed on, when any preprocessing
    /// stage ran.
    pub preprocessed: Option<ImageF64>,
    pub report: OrientationReport,
}

impl OrientationAnalysis {
    /// Structure orientation per pixel, in [0, π).
    pub fn corrected_angles(&self) -> ImageF64 {
        self.tensor.corrected_angle_field()
    }
}

/// Run the full pipeline on an intensity field.
///
/// Fails on invalid kernel sizes or histogram range before any filtering,
/// and with `EmptyField` for an image without pixels.
pub fn analyze(field: &ImageF64, params: &OrientationParams) -> Result<OrientationAnalysis> {
    validate(params)?;
    if field.is_empty() {
        return Err(OrientationError::EmptyField);
    }
    let mut timing = TimingBreakdown::default();

    let mut preprocessed: Option<ImageF64> = None;
    if let Some(c) = params.clahe {
        let equalised = timing.time("clahe", || {
            let gray = GrayImageU8::from_field(field);
            contrast::clahe(&gray.as_view(), c.clip_limit, c.tiles_x, c.tiles_y)
        })?;
        preprocessed = Some(equalised.as_view().to_f64());
    }
    if let Some(blur) = params.blur {
        let input = preprocessed.as_ref().unwrap_or(field);
        let blurred = timing.time("blur", || {
            filters::gaussian_blur(input, blur.kernel_x, blur.kernel_y, blur.sigma)
        })?;
        preprocessed = Some(blurred);
    }
    let source = preprocessed.as_ref().unwrap_or(field);

    let gradients = timing.time("gradient", || {
        compute_gradients(source, params.sobel_kernel_size)
    })?;
    let tensor = timing.time("tensor", || {
        build_structure_tensor_with_sigma(&gradients, params.tensor_kernel_size, params.tensor_sigma)
    })?;

    let hp = params.histogram;
    let summary = timing.time("statistics", || {
        tensor.summarize(hp.bins, hp.min_deg.to_radians(), hp.max_deg.to_radians())
    })?;

    debug!(
        "analyze: {}x{} S={:.4} mean={:.1}deg total={:.2}ms",
        field.w,
        field.h,
        summary.order_parameter,
        summary.mean_orientation.to_degrees(),
        timing.total_ms
    );

    let report = OrientationReport {
        width: field.w,
        height: field.h,
        params: params.clone(),
        order_parameter: summary.order_parameter,
        centered_order_parameter: summary.centered_order_parameter,
        mean_orientation_deg: summary.mean_orientation.to_degrees(),
        mean_coherence: summary.mean_coherence,
        histogram: HistogramReport::from(&summary.histogram),
        timing,
    };
    Ok(OrientationAnalysis {
        tensor,
        preprocessed,
        report,
    })
}

/// [`analyze`] on a decoded image.
pub fn analyze_image(image: &CellImage, params: &OrientationParams) -> Result<OrientationAnalysis> {
    analyze(&image.to_intensity_field(), params)
}

fn validate(params: &OrientationParams) -> Result<()> {
    filters::sobel_kernels(params.sobel_kernel_size)?;
    filters::gaussian_kernel(params.tensor_kernel_size, params.tensor_sigma)?;
    if let Some(c) = params.clahe {
        if !c.clip_limit.is_finite() {
            return Err(OrientationError::InvalidClipLimit(c.clip_limit));
        }
        if c.tiles_x == 0 || c.tiles_y == 0 {
            return Err(OrientationError::InvalidTileGrid {
                tiles_x: c.tiles_x,
                tiles_y: c.tiles_y,
            });
        }
    }
    if let Some(blur) = params.blur {
        filters::gaussian_kernel(blur.kernel_x, blur.sigma)?;
        filters::gaussian_kernel(blur.kernel_y, blur.sigma)?;
    }
    let hp = params.histogram;
    if hp.bins == 0 || !hp.min_deg.is_finite() || !hp.max_deg.is_finite() || hp.min_deg >= hp.max_deg {
        return Err(OrientationError::InvalidHistogramRange {
            bins: hp.bins,
            min: hp.min_deg,
            max: hp.max_deg,
        });
    }
    Ok(())
}
