//! Edge detection backends
//!
//! The worker picks one backend per job. Every backend must honour the same
//! thresholds and return an image with the input's dimensions.

use image::GrayImage;

use crate::canny::{self, Thresholds};
use crate::error::Result;

/// An interchangeable edge detection implementation
pub trait EdgeBackend: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Detect edges in a denoised grayscale image
    ///
    /// # Arguments
    /// * `img` - Single-channel input
    /// * `thresholds` - Low/high hysteresis thresholds
    fn detect_edges(&self, img: &GrayImage, thresholds: Thresholds) -> Result<GrayImage>;
}

/// Sequential detector running on the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct HostBackend;

impl HostBackend {
    pub fn new() -> Self {
        Self
    }
}

impl EdgeBackend for HostBackend {
    fn name(&self) -> &'static str {
        "host"
    }

    fn detect_edges(&self, img: &GrayImage, thresholds: Thresholds) -> Result<GrayImage> {
        Ok(canny::canny(img, thresholds))
    }
}
