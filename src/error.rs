//! Error type shared by the numeric core and the image collaborators.
//!
//! Validation failures (kernel sizes, shapes, paths) are reported before any
//! computation runs. Degenerate pixels (flat regions) are not errors.

use std::path::PathBuf;

/// Pipeline stage a kernel size belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelStage {
    /// Sobel derivative kernel of the gradient stage.
    Sobel,
    /// Gaussian smoothing kernel (structure tensor or preprocessing blur).
    Gaussian,
}

impl std::fmt::Display for KernelStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sobel => write!(f, "sobel"),
            Self::Gaussian => write!(f, "gaussian"),
        }
    }
}

/// Errors returned by the orientation pipeline and its I/O helpers.
#[derive(Debug, Clone, PartialEq)]
pub enum OrientationError {
    /// Kernel size is zero or even.
    InvalidKernelSize { stage: KernelStage, size: usize },
    /// Gaussian sigma is NaN or infinite.
    InvalidSigma(f64),
    /// Two co-indexed buffers disagree in shape, or a buffer does not match
    /// its declared dimensions. Shapes are `(width, height)`.
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    /// A structure tensor diagonal component holds a negative value.
    NegativeDiagonal,
    /// Statistic requested over a field without pixels.
    EmptyField,
    /// Histogram requested with zero bins or an empty/non-finite range.
    InvalidHistogramRange { bins: usize, min: f64, max: f64 },
    /// CLAHE tile grid with a zero dimension, or more tiles than pixels.
    InvalidTileGrid { tiles_x: usize, tiles_y: usize },
    /// CLAHE clip limit is NaN or infinite.
    InvalidClipLimit(f64),
    /// Path does not end in a supported image extension.
    InvalidImagePath(String),
    /// Source image does not exist.
    FileNotFound(PathBuf),
    /// Image exists but could not be decoded.
    Decode { path: PathBuf, message: String },
    /// Save target resolves to the image's own source file.
    SourceOverwrite(PathBuf),
    /// Filesystem or encoder failure while writing.
    Io { path: PathBuf, message: String },
    /// Configuration could not be read or parsed.
    Config(String),
}

impl std::fmt::Display for OrientationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKernelSize { stage, size } => {
                write!(f, "{stage} kernel size must be a positive odd integer, got {size}")
            }
            Self::InvalidSigma(sigma) => write!(f, "gaussian sigma must be finite, got {sigma}"),
            Self::ShapeMismatch { expected, actual } => write!(
                f,
                "shape mismatch: expected {}x{}, got {}x{}",
                expected.0, expected.1, actual.0, actual.1
            ),
            Self::NegativeDiagonal => write!(f, "structure tensor diagonal must be non-negative"),
            Self::EmptyField => write!(f, "statistic undefined for an empty field"),
            Self::InvalidHistogramRange { bins, min, max } => write!(
                f,
                "invalid histogram: {bins} bins over [{min}, {max}]"
            ),
            Self::InvalidTileGrid { tiles_x, tiles_y } => {
                write!(f, "invalid CLAHE tile grid {tiles_x}x{tiles_y}")
            }
            Self::InvalidClipLimit(limit) => {
                write!(f, "CLAHE clip limit must be finite, got {limit}")
            }
            Self::InvalidImagePath(path) => write!(
                f,
                "not an image path (expected .jpg, .jpeg, .png or .bmp): {path}"
            ),
            Self::FileNotFound(path) => write!(f, "file not found: {}", path.display()),
            Self::Decode { path, message } => {
                write!(f, "failed to decode {}: {message}", path.display())
            }
            Self::SourceOverwrite(path) => write!(
                f,
                "refusing to overwrite the source image {}",
                path.display()
            ),
            Self::Io { path, message } => write!(f, "failed to write {}: {message}", path.display()),
            Self::Config(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for OrientationError {}

pub type Result<T> = std::result::Result<T, OrientationError>;

/// Rejects zero and even kernel sizes.
pub(crate) fn check_kernel_size(stage: KernelStage, size: usize) -> Result<()> {
    if size == 0 || size % 2 == 0 {
        return Err(OrientationError::InvalidKernelSize { stage, size });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_size_validation() {
        assert!(check_kernel_size(KernelStage::Sobel, 1).is_ok());
        assert!(check_kernel_size(KernelStage::Sobel, 3).is_ok());
        assert_eq!(
            check_kernel_size(KernelStage::Gaussian, 4),
            Err(OrientationError::InvalidKernelSize {
                stage: KernelStage::Gaussian,
                size: 4
            })
        );
        assert!(check_kernel_size(KernelStage::Sobel, 0).is_err());
    }

    #[test]
    fn display_names_the_stage() {
        let err = OrientationError::InvalidKernelSize {
            stage: KernelStage::Sobel,
            size: 2,
        };
        assert!(err.to_string().starts_with("sobel kernel size"));
    }
}
