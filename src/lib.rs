#![doc = include_str!("../README.md")]

// Public modules (stable surface)
pub mod config;
pub mod error;
pub mod image;
pub mod pipeline;
pub mod timing;

// Stage-level building blocks, usable on their own.
pub mod angle;
pub mod contrast;
pub mod filters;
pub mod gradient;
pub mod histogram;
pub mod tensor;

// --- High-level re-exports -------------------------------------------------

pub use crate::contrast::ClaheParams;
pub use crate::error::{OrientationError, Result};
pub use crate::gradient::{compute_gradients, GradientPair};
pub use crate::histogram::OrientationHistogram;
pub use crate::pipeline::{
    analyze, analyze_image, OrientationAnalysis, OrientationParams, OrientationReport,
};
pub use crate::tensor::{build_structure_tensor, OrientationSummary, StructureTensorField};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use cell_orientation::prelude::*;
///
/// # fn main() -> cell_orientation::Result<()> {
/// let field = ImageF64::from_fn(64, 64, |x, _| if x < 32 { 0.0 } else { 255.0 });
/// let gradients = compute_gradients(&field, 3)?;
/// let tensor = build_structure_tensor(&gradients, 15)?;
/// println!("S = {:.3}", tensor.order_parameter()?);
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::{read_img, CellImage, ImageF64};
    pub use crate::{
        analyze, build_structure_tensor, compute_gradients, OrientationParams,
        StructureTensorField,
    };
}
