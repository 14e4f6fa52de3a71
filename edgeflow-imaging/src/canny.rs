//! Canny edge detection.
//!
//! The detector is split into row kernels so that backends can schedule the
//! per-row stages however they like:
//! 1. [`gradient_row`]: 3×3 Sobel gradients and L1 magnitude.
//! 2. [`classify_row`]: non-maximum suppression and double thresholding.
//! 3. [`hysteresis`]: grow strong edges through connected weak ones.
//!
//! Stages 1 and 2 only read the previous stage's full plane and write their
//! own row, so rows are independent within a stage.

use crate::denoise::reflect101;
use image::GrayImage;

/// Hysteresis thresholds on the L1 gradient magnitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub low: f64,
    pub high: f64,
}

/// Fixed thresholds used by the worker pipeline.
pub const CANNY_THRESHOLDS: Thresholds = Thresholds {
    low: 50.0,
    high: 150.0,
};

impl Thresholds {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Integer bounds with `low <= high`.
    fn bounds(self) -> (i32, i32) {
        let (low, high) = if self.low > self.high {
            (self.high, self.low)
        } else {
            (self.low, self.high)
        };
        (low.floor() as i32, high.floor() as i32)
    }
}

/// Sobel response at one pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gradient {
    pub gx: i32,
    pub gy: i32,
    pub mag: i32,
}

/// Per-pixel result of suppression and double thresholding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum EdgeClass {
    #[default]
    None,
    Weak,
    Strong,
}

/// Compute Sobel gradients for row `y` of a `w`×`h` 8-bit plane.
pub fn gradient_row(src: &[u8], w: usize, h: usize, y: usize, out: &mut [Gradient]) {
    let ym = reflect101(y as isize - 1, h) * w;
    let y0 = y * w;
    let yp = reflect101(y as isize + 1, h) * w;

    for (x, g) in out.iter_mut().enumerate().take(w) {
        let xm = reflect101(x as isize - 1, w);
        let xp = reflect101(x as isize + 1, w);
        let p = |row: usize, col: usize| src[row + col] as i32;

        let gx = (p(ym, xp) + 2 * p(y0, xp) + p(yp, xp)) - (p(ym, xm) + 2 * p(y0, xm) + p(yp, xm));
        let gy = (p(yp, xm) + 2 * p(yp, x) + p(yp, xp)) - (p(ym, xm) + 2 * p(ym, x) + p(ym, xp));

        *g = Gradient {
            gx,
            gy,
            mag: gx.abs() + gy.abs(),
        };
    }
}

/// tan(22.5°), boundary between horizontal and diagonal sectors.
const TAN_22_5: f64 = 0.414_213_562_373_095_1;
/// tan(67.5°), boundary between diagonal and vertical sectors.
const TAN_67_5: f64 = 2.414_213_562_373_095;

/// Suppress non-maxima and classify row `y` against the thresholds.
///
/// Magnitudes outside the image count as zero.
pub fn classify_row(
    grads: &[Gradient],
    w: usize,
    h: usize,
    y: usize,
    thresholds: Thresholds,
    out: &mut [EdgeClass],
) {
    let (low, high) = thresholds.bounds();
    let mag = |x: isize, y: isize| -> i32 {
        if x < 0 || y < 0 || x >= w as isize || y >= h as isize {
            0
        } else {
            grads[y as usize * w + x as usize].mag
        }
    };

    for (x, class) in out.iter_mut().enumerate().take(w) {
        let g = grads[y * w + x];
        let m = g.mag;
        *class = EdgeClass::None;
        if m <= low {
            continue;
        }

        let (xi, yi) = (x as isize, y as isize);
        let ax = g.gx.abs() as f64;
        let ay = g.gy.abs() as f64;

        let is_max = if ay < ax * TAN_22_5 {
            m > mag(xi - 1, yi) && m >= mag(xi + 1, yi)
        } else if ay > ax * TAN_67_5 {
            m > mag(xi, yi - 1) && m >= mag(xi, yi + 1)
        } else {
            let s: isize = if (g.gx < 0) != (g.gy < 0) { -1 } else { 1 };
            m > mag(xi - s, yi - 1) && m > mag(xi + s, yi + 1)
        };

        if is_max {
            *class = if m > high {
                EdgeClass::Strong
            } else {
                EdgeClass::Weak
            };
        }
    }
}

/// Keep strong edges and every weak edge 8-connected to one.
///
/// Returns a binary plane with edges at 255.
pub fn hysteresis(classes: &[EdgeClass], w: usize, h: usize) -> Vec<u8> {
    let mut out = vec![0u8; w * h];
    let mut stack: Vec<usize> = classes
        .iter()
        .enumerate()
        .filter(|(_, c)| **c == EdgeClass::Strong)
        .map(|(i, _)| i)
        .collect();

    for &i in &stack {
        out[i] = 255;
    }

    while let Some(i) = stack.pop() {
        let (x, y) = ((i % w) as isize, (i / w) as isize);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
                    continue;
                }
                let n = ny as usize * w + nx as usize;
                if out[n] == 0 && classes[n] == EdgeClass::Weak {
                    out[n] = 255;
                    stack.push(n);
                }
            }
        }
    }

    out
}

/// Run the full detector on the host, one row at a time.
pub fn canny(img: &GrayImage, thresholds: Thresholds) -> GrayImage {
    let (w, h) = (img.width() as usize, img.height() as usize);
    if w == 0 || h == 0 {
        return GrayImage::new(img.width(), img.height());
    }
    let src = img.as_raw();

    let mut grads = vec![Gradient::default(); w * h];
    for (y, row) in grads.chunks_mut(w).enumerate() {
        gradient_row(src, w, h, y, row);
    }

    let mut classes = vec![EdgeClass::None; w * h];
    for (y, row) in classes.chunks_mut(w).enumerate() {
        classify_row(&grads, w, h, y, thresholds, row);
    }

    let edges = hysteresis(&classes, w, h);
    GrayImage::from_raw(img.width(), img.height(), edges)
        .unwrap_or_else(|| GrayImage::new(img.width(), img.height()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    /// Dark left half, bright right half.
    fn step_image(w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, _| if x < w / 2 { Luma([0]) } else { Luma([255]) })
    }

    #[test]
    fn test_thresholds_swap_when_inverted() {
        assert_eq!(Thresholds::new(150.0, 50.0).bounds(), (50, 150));
        assert_eq!(CANNY_THRESHOLDS.bounds(), (50, 150));
    }

    #[test]
    fn test_gradient_on_vertical_step() {
        let img = step_image(8, 3);
        let mut row = vec![Gradient::default(); 8];
        gradient_row(img.as_raw(), 8, 3, 1, &mut row);

        // Columns 3 and 4 straddle the step.
        assert_eq!(row[3].gx, 4 * 255);
        assert_eq!(row[4].gx, 4 * 255);
        assert_eq!(row[3].gy, 0);
        assert_eq!(row[0].mag, 0);
        assert_eq!(row[7].mag, 0);
    }

    #[test]
    fn test_flat_image_has_no_edges() {
        let img = GrayImage::from_pixel(10, 10, Luma([77]));
        let edges = canny(&img, CANNY_THRESHOLDS);
        assert!(edges.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_step_produces_single_vertical_line() {
        let img = step_image(16, 12);
        let edges = canny(&img, CANNY_THRESHOLDS);

        assert_eq!(edges.dimensions(), (16, 12));
        for y in 0..12 {
            let row: Vec<u8> = (0..16).map(|x| edges.get_pixel(x, y).0[0]).collect();
            // Ties are broken toward the left neighbour, so column 7 survives.
            assert_eq!(row.iter().filter(|&&v| v == 255).count(), 1, "row {y}: {row:?}");
            assert_eq!(row[7], 255);
        }
    }

    #[test]
    fn test_output_is_binary() {
        let img = GrayImage::from_fn(20, 20, |x, y| Luma([((x * 13 + y * 7) % 256) as u8]));
        let edges = canny(&img, CANNY_THRESHOLDS);
        assert!(edges.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn test_weak_edges_need_strong_neighbor() {
        let (w, h) = (5, 1);
        let isolated = [
            EdgeClass::Weak,
            EdgeClass::None,
            EdgeClass::Strong,
            EdgeClass::Weak,
            EdgeClass::Weak,
        ];
        let out = hysteresis(&isolated, w, h);
        assert_eq!(out, vec![0, 0, 255, 255, 255]);
    }

    #[test]
    fn test_high_threshold_above_contrast_yields_nothing() {
        let img = GrayImage::from_fn(16, 8, |x, _| if x < 8 { Luma([100]) } else { Luma([110]) });
        // Step of 10 gives an L1 magnitude of 40, below the low threshold.
        let edges = canny(&img, CANNY_THRESHOLDS);
        assert!(edges.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_empty_image() {
        let img = GrayImage::new(0, 4);
        assert_eq!(canny(&img, CANNY_THRESHOLDS).dimensions(), (0, 4));
    }
}
