//! Accelerated edge backend
//!
//! Runs the Canny stage kernels row-parallel on a dedicated compute pool.
//! Work follows an explicit upload → detect → download sequence: the host
//! image is copied into a [`DeviceImage`] owned by the context, all stages
//! operate on device-side planes, and only the final edge plane is copied
//! back into a host [`GrayImage`].

use image::GrayImage;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::backend::EdgeBackend;
use crate::canny::{self, EdgeClass, Gradient, Thresholds};
use crate::error::{ImagingError, Result};

/// Image resident in the accelerated context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl DeviceImage {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Data-parallel edge detector
pub struct AcceleratedBackend {
    pool: ThreadPool,
}

impl AcceleratedBackend {
    /// Create a context using every available hardware thread
    pub fn new() -> Result<Self> {
        Self::with_threads(0)
    }

    /// Create a context with a fixed number of worker threads
    ///
    /// `0` lets the pool size itself to the host.
    pub fn with_threads(threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("edgeflow-accel-{i}"))
            .build()?;
        Ok(Self { pool })
    }

    /// Number of threads backing the context
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Copy a host image into the context
    pub fn upload(&self, img: &GrayImage) -> DeviceImage {
        DeviceImage {
            width: img.width(),
            height: img.height(),
            pixels: img.as_raw().clone(),
        }
    }

    /// Copy a device image back to host memory
    pub fn download(&self, img: DeviceImage) -> Result<GrayImage> {
        let DeviceImage {
            width,
            height,
            pixels,
        } = img;
        let len = pixels.len();
        GrayImage::from_raw(width, height, pixels).ok_or(ImagingError::BufferMismatch {
            width,
            height,
            len,
        })
    }

    /// Run Canny on a device image, producing a device image
    pub fn detect(&self, img: &DeviceImage, thresholds: Thresholds) -> DeviceImage {
        let (w, h) = (img.width as usize, img.height as usize);
        if w == 0 || h == 0 {
            return DeviceImage {
                width: img.width,
                height: img.height,
                pixels: Vec::new(),
            };
        }

        let edges = self.pool.install(|| {
            let src = img.pixels.as_slice();

            let mut grads = vec![Gradient::default(); w * h];
            grads
                .par_chunks_mut(w)
                .enumerate()
                .for_each(|(y, row)| canny::gradient_row(src, w, h, y, row));

            let mut classes = vec![EdgeClass::None; w * h];
            classes
                .par_chunks_mut(w)
                .enumerate()
                .for_each(|(y, row)| canny::classify_row(&grads, w, h, y, thresholds, row));

            canny::hysteresis(&classes, w, h)
        });

        DeviceImage {
            width: img.width,
            height: img.height,
            pixels: edges,
        }
    }
}

impl EdgeBackend for AcceleratedBackend {
    fn name(&self) -> &'static str {
        "accelerated"
    }

    fn detect_edges(&self, img: &GrayImage, thresholds: Thresholds) -> Result<GrayImage> {
        debug!(
            width = img.width(),
            height = img.height(),
            threads = self.threads(),
            "Uploading image to accelerated context"
        );
        let device = self.upload(img);
        let edges = self.detect(&device, thresholds);
        self.download(edges)
    }
}
