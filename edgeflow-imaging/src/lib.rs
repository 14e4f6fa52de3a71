//! Edgeflow Imaging
//!
//! Grayscale image routines used by the edgeflow worker:
//! - Denoise: fixed 5×5 Gaussian smoothing
//! - Edge detection: Canny with hysteresis thresholds
//! - Backends: interchangeable host and accelerated edge detectors
//!
//! Both backends run the same stage kernels, so for identical input and
//! thresholds they produce identical output.

pub mod accelerated;
pub mod backend;
pub mod canny;
pub mod denoise;
pub mod error;

pub use accelerated::{AcceleratedBackend, DeviceImage};
pub use backend::{EdgeBackend, HostBackend};
pub use canny::{CANNY_THRESHOLDS, Thresholds};
pub use denoise::{DENOISE_KERNEL_SIZE, denoise, gaussian_blur};
pub use error::{ImagingError, Result};

pub use image::GrayImage;
