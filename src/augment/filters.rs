//! Neighbourhood filters: blurs and 3x3 convolution effects
//!
//! The convolution effects (sharpen, emboss, edge detection) blend their
//! kernel with the identity kernel by a sampled `alpha`, so `alpha = 0`
//! leaves the image unchanged and `alpha = 1` applies the full effect.
//! Borders are mirrored without repeating the edge pixel.

use crate::augment::Operator;
use crate::augment::geometric::BoundaryMode;
use crate::io::error::Result;
use crate::math::raster::{from_array, to_array};
use crate::math::sampling::Param;
use image::RgbImage;
use imageproc::filter::{gaussian_blur_f32, median_filter};
use ndarray::{Array2, Array3, arr2};
use rand::rngs::StdRng;
use std::f32::consts::PI;

/// Smallest sigma that still blurs noticeably
const MIN_SIGMA: f32 = 0.01;

fn identity_kernel() -> Array2<f32> {
    arr2(&[[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]])
}

// (1 - alpha) * identity + alpha * effect
fn mix_with_identity(effect: &Array2<f32>, alpha: f32) -> Array2<f32> {
    identity_kernel().mapv(|v| v * (1.0 - alpha)) + effect.mapv(|v| v * alpha)
}

// Mean over a window spanning `lo..=hi` around each pixel on both axes
fn window_mean(src: &Array3<f32>, lo: i64, hi: i64) -> Array3<f32> {
    let (height, width, _) = src.dim();
    let (h, w) = (height as i64, width as i64);
    let taps = ((hi - lo + 1) * (hi - lo + 1)) as f32;
    let mut out = Array3::zeros(src.dim());
    for ((y, x, c), value) in out.indexed_iter_mut() {
        let mut acc = 0.0;
        for dy in lo..=hi {
            for dx in lo..=hi {
                let sy = BoundaryMode::Reflect.resolve(y as i64 + dy, h);
                let sx = BoundaryMode::Reflect.resolve(x as i64 + dx, w);
                if let Some((sy, sx)) = sy.zip(sx) {
                    acc += src.get((sy as usize, sx as usize, c)).copied().unwrap_or(0.0);
                }
            }
        }
        *value = acc / taps;
    }
    out
}

/// Convolve every channel of `image` with a 3x3 `kernel`
pub fn convolve3x3(image: &RgbImage, kernel: &Array2<f32>) -> RgbImage {
    let src = to_array(image);
    let (height, width, _) = src.dim();
    let (h, w) = (height as i64, width as i64);
    let mut out = Array3::zeros(src.dim());
    for ((y, x, c), value) in out.indexed_iter_mut() {
        let mut acc = 0.0;
        for ((ky, kx), weight) in kernel.indexed_iter() {
            let sy = BoundaryMode::Reflect.resolve(y as i64 + ky as i64 - 1, h);
            let sx = BoundaryMode::Reflect.resolve(x as i64 + kx as i64 - 1, w);
            if let Some((sy, sx)) = sy.zip(sx) {
                acc += weight * src.get((sy as usize, sx as usize, c)).copied().unwrap_or(0.0);
            }
        }
        *value = acc;
    }
    from_array(&out)
}

/// Gaussian blur with a sampled standard deviation
#[derive(Debug, Clone)]
pub struct GaussianBlur {
    /// Standard deviation in pixels
    pub sigma: Param<f32>,
}

impl Operator for GaussianBlur {
    fn name(&self) -> &'static str {
        "gaussian_blur"
    }

    fn apply(&self, image: RgbImage, rng: &mut StdRng) -> Result<RgbImage> {
        let sigma = self.sigma.sample(rng);
        if sigma < MIN_SIGMA {
            return Ok(image);
        }
        Ok(gaussian_blur_f32(&image, sigma))
    }
}

/// Mean over a k x k window
#[derive(Debug, Clone)]
pub struct AverageBlur {
    /// Window side length
    pub k: Param<u32>,
}

impl Operator for AverageBlur {
    fn name(&self) -> &'static str {
        "average_blur"
    }

    fn apply(&self, image: RgbImage, rng: &mut StdRng) -> Result<RgbImage> {
        let k = i64::from(self.k.sample(rng));
        if k <= 1 {
            return Ok(image);
        }
        // Even windows extend one pixel further towards the top-left
        let lo = -(k / 2);
        let hi = k - 1 - k / 2;
        Ok(from_array(&window_mean(&to_array(&image), lo, hi)))
    }
}

/// Median over a k x k window, even sizes rounded up to the next odd size
#[derive(Debug, Clone)]
pub struct MedianBlur {
    /// Window side length
    pub k: Param<u32>,
}

impl Operator for MedianBlur {
    fn name(&self) -> &'static str {
        "median_blur"
    }

    fn apply(&self, image: RgbImage, rng: &mut StdRng) -> Result<RgbImage> {
        let k = self.k.sample(rng);
        let k = if k % 2 == 0 { k + 1 } else { k };
        if k <= 1 {
            return Ok(image);
        }
        let radius = k / 2;
        Ok(median_filter(&image, radius, radius))
    }
}

/// Sharpen with a lightness-weighted Laplacian kernel
#[derive(Debug, Clone)]
pub struct Sharpen {
    /// Blend factor between identity and the sharpening kernel
    pub alpha: Param<f32>,
    /// Weight of the centre pixel, above 1 brightens
    pub lightness: Param<f32>,
}

impl Operator for Sharpen {
    fn name(&self) -> &'static str {
        "sharpen"
    }

    fn apply(&self, image: RgbImage, rng: &mut StdRng) -> Result<RgbImage> {
        let alpha = self.alpha.sample(rng);
        let lightness = self.lightness.sample(rng);
        let effect = arr2(&[
            [-1.0, -1.0, -1.0],
            [-1.0, 8.0 + lightness, -1.0],
            [-1.0, -1.0, -1.0],
        ]);
        Ok(convolve3x3(&image, &mix_with_identity(&effect, alpha)))
    }
}

/// Relief effect along the main diagonal
#[derive(Debug, Clone)]
pub struct Emboss {
    /// Blend factor between identity and the emboss kernel
    pub alpha: Param<f32>,
    /// Depth of the relief
    pub strength: Param<f32>,
}

impl Operator for Emboss {
    fn name(&self) -> &'static str {
        "emboss"
    }

    fn apply(&self, image: RgbImage, rng: &mut StdRng) -> Result<RgbImage> {
        let alpha = self.alpha.sample(rng);
        let s = self.strength.sample(rng);
        let effect = arr2(&[
            [-1.0 - s, -s, 0.0],
            [-s, 1.0, s],
            [0.0, s, 1.0 + s],
        ]);
        Ok(convolve3x3(&image, &mix_with_identity(&effect, alpha)))
    }
}

/// Isotropic Laplacian edge detection
#[derive(Debug, Clone)]
pub struct EdgeDetect {
    /// Blend factor between identity and the edge kernel
    pub alpha: Param<f32>,
}

impl Operator for EdgeDetect {
    fn name(&self) -> &'static str {
        "edge_detect"
    }

    fn apply(&self, image: RgbImage, rng: &mut StdRng) -> Result<RgbImage> {
        let alpha = self.alpha.sample(rng);
        let effect = arr2(&[[0.0, 1.0, 0.0], [1.0, -4.0, 1.0], [0.0, 1.0, 0.0]]);
        Ok(convolve3x3(&image, &mix_with_identity(&effect, alpha)))
    }
}

/// Edge detection favouring edges facing one direction
#[derive(Debug, Clone)]
pub struct DirectedEdgeDetect {
    /// Blend factor between identity and the edge kernel
    pub alpha: Param<f32>,
    /// Direction as a fraction of a full turn, 0 pointing up
    pub direction: Param<f32>,
}

/// Kernel weighting each neighbour by its angular closeness to `direction`
pub fn directed_edge_kernel(direction: f32) -> Array2<f32> {
    let degrees = ((direction * 360.0) as i64).rem_euclid(360) as f32;
    let radians = degrees.to_radians() - 0.5 * PI;
    let (dir_x, dir_y) = (radians.cos(), radians.sin());

    let mut kernel = Array2::zeros((3, 3));
    for ((row, col), weight) in kernel.indexed_iter_mut() {
        let (cell_x, cell_y) = (col as f32 - 1.0, row as f32 - 1.0);
        if row == 1 && col == 1 {
            continue;
        }
        let norm = cell_x.hypot(cell_y);
        let cosine = (cell_x.mul_add(dir_x, cell_y * dir_y) / norm).clamp(-1.0, 1.0);
        let distance = cosine.acos() / PI;
        *weight = (1.0 - distance).powi(4);
    }

    let total: f32 = kernel.sum();
    if total > f32::EPSILON {
        kernel.mapv_inplace(|v| -v / total);
    }
    if let Some(centre) = kernel.get_mut((1, 1)) {
        *centre = 1.0;
    }
    kernel
}

impl Operator for DirectedEdgeDetect {
    fn name(&self) -> &'static str {
        "directed_edge_detect"
    }

    fn apply(&self, image: RgbImage, rng: &mut StdRng) -> Result<RgbImage> {
        let alpha = self.alpha.sample(rng);
        let effect = directed_edge_kernel(self.direction.sample(rng));
        Ok(convolve3x3(&image, &mix_with_identity(&effect, alpha)))
    }
}
