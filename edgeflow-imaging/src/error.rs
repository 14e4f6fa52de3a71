//! Error types for image processing

use thiserror::Error;

/// Result type alias for imaging operations
pub type Result<T> = std::result::Result<T, ImagingError>;

/// Errors raised by the edge backends
#[derive(Debug, Error)]
pub enum ImagingError {
    /// The accelerated context could not be created
    #[error("Failed to initialize device context: {0}")]
    DeviceInit(#[from] rayon::ThreadPoolBuildError),

    /// A device buffer did not match its declared dimensions
    #[error("Device buffer of {len} bytes does not hold a {width}x{height} image")]
    BufferMismatch {
        width: u32,
        height: u32,
        len: usize,
    },

    /// Gaussian kernels need an odd, non-zero side length
    #[error("Gaussian kernel size must be odd, got {0}")]
    KernelSize(usize),
}
