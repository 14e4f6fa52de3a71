//! Gaussian smoothing applied before edge detection.

use image::{GrayImage, Luma};

use crate::error::{ImagingError, Result};

/// Side of the square denoise neighborhood.
pub const DENOISE_KERNEL_SIZE: usize = 5;

/// Fixed binomial kernels used when sigma is derived from the kernel size.
/// These match the classic small-kernel tables for odd sizes up to 7.
const SMALL_KERNELS: [&[f32]; 4] = [
    &[1.0],
    &[0.25, 0.5, 0.25],
    &[0.0625, 0.25, 0.375, 0.25, 0.0625],
    &[0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125],
];

/// Denoise with the pipeline's fixed 5×5 Gaussian and derived sigma.
pub fn denoise(img: &GrayImage) -> Result<GrayImage> {
    gaussian_blur(img, DENOISE_KERNEL_SIZE, 0.0)
}

/// Sigma implied by a kernel size when none is given.
pub fn derived_sigma(ksize: usize) -> f64 {
    0.3 * ((ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Build a normalized 1-D Gaussian kernel.
///
/// A non-positive `sigma` is derived from `ksize`; for sizes up to 7 that
/// selects the fixed binomial tables.
pub(crate) fn gaussian_kernel(ksize: usize, sigma: f64) -> Result<Vec<f32>> {
    if ksize % 2 == 0 {
        return Err(ImagingError::KernelSize(ksize));
    }

    if sigma <= 0.0 && ksize <= 7 {
        return Ok(SMALL_KERNELS[ksize / 2].to_vec());
    }

    let sigma = if sigma > 0.0 { sigma } else { derived_sigma(ksize) };
    let half = (ksize / 2) as f64;
    let scale = -0.5 / (sigma * sigma);

    let raw: Vec<f64> = (0..ksize)
        .map(|i| {
            let x = i as f64 - half;
            (scale * x * x).exp()
        })
        .collect();
    let sum: f64 = raw.iter().sum();

    Ok(raw.into_iter().map(|v| (v / sum) as f32).collect())
}

/// Reflect an out-of-range index back into `0..n` without repeating the edge
/// sample (`gfedcb|abcdefgh|gfedcba`).
#[inline]
pub(crate) fn reflect101(i: isize, n: usize) -> usize {
    let n = n as isize;
    if n == 1 {
        return 0;
    }
    let mut i = i;
    // Kernels are small, but tiny images may need more than one bounce.
    while i < 0 || i >= n {
        if i < 0 {
            i = -i;
        }
        if i >= n {
            i = 2 * n - 2 - i;
        }
    }
    i as usize
}

/// Separable Gaussian blur with reflect-101 borders.
///
/// Output has the same dimensions as the input. `ksize` must be odd.
pub fn gaussian_blur(img: &GrayImage, ksize: usize, sigma: f64) -> Result<GrayImage> {
    let kernel = gaussian_kernel(ksize, sigma)?;

    let (w, h) = (img.width() as usize, img.height() as usize);
    if w == 0 || h == 0 {
        return Ok(img.clone());
    }

    let half = (ksize / 2) as isize;
    let src = img.as_raw();

    // Horizontal pass into a float plane.
    let mut tmp = vec![0.0f32; w * h];
    for y in 0..h {
        let row = &src[y * w..(y + 1) * w];
        for x in 0..w {
            let mut acc = 0.0f32;
            for (k, weight) in kernel.iter().enumerate() {
                let sx = reflect101(x as isize + k as isize - half, w);
                acc += weight * row[sx] as f32;
            }
            tmp[y * w + x] = acc;
        }
    }

    // Vertical pass back to 8-bit.
    let mut out = GrayImage::new(w as u32, h as u32);
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f32;
            for (k, weight) in kernel.iter().enumerate() {
                let sy = reflect101(y as isize + k as isize - half, h);
                acc += weight * tmp[sy * w + x];
            }
            out.put_pixel(x as u32, y as u32, Luma([acc.round().clamp(0.0, 255.0) as u8]));
        }
    }

    Ok(out)
}
