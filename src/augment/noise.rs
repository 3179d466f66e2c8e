//! Pixel noise and dropout

use crate::augment::Operator;
use crate::io::error::{Result, operator_error};
use crate::math::raster::{CHANNELS, saturate};
use crate::math::sampling::{Param, PerChannel};
use bitvec::vec::BitVec;
use image::RgbImage;
use rand::Rng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

/// Smallest side of a coarse dropout grid
const MIN_COARSE_CELLS: u32 = 3;

/// Add normally distributed noise to every pixel
#[derive(Debug, Clone)]
pub struct AdditiveGaussianNoise {
    /// Mean of the noise
    pub loc: Param<f32>,
    /// Standard deviation of the noise, in intensity units
    pub scale: Param<f32>,
    /// Whether each channel gets its own noise sample
    pub per_channel: PerChannel,
}

impl Operator for AdditiveGaussianNoise {
    fn name(&self) -> &'static str {
        "additive_gaussian_noise"
    }

    fn apply(&self, mut image: RgbImage, rng: &mut StdRng) -> Result<RgbImage> {
        let loc = self.loc.sample(rng);
        let scale = self.scale.sample(rng);
        let independent = self.per_channel.resolve(rng);
        let normal = Normal::new(loc, scale).map_err(|e| operator_error(self.name(), &e))?;

        for pixel in image.pixels_mut() {
            if independent {
                for value in &mut pixel.0 {
                    *value = saturate(f32::from(*value) + normal.sample(rng));
                }
            } else {
                let shift = normal.sample(rng);
                for value in &mut pixel.0 {
                    *value = saturate(f32::from(*value) + shift);
                }
            }
        }
        Ok(image)
    }
}

// One bit per pixel, or per pixel channel when `independent`
fn sample_mask(cells: usize, independent: bool, p: f64, rng: &mut StdRng) -> BitVec {
    let len = if independent { cells * CHANNELS } else { cells };
    (0..len).map(|_| rng.random_bool(p)).collect()
}

fn is_dropped(mask: &BitVec, cell: usize, channel: usize, independent: bool) -> bool {
    let index = if independent {
        cell * CHANNELS + channel
    } else {
        cell
    };
    mask.get(index).is_some_and(|bit| *bit)
}

/// Set random pixels (or single channels of pixels) to zero
#[derive(Debug, Clone)]
pub struct Dropout {
    /// Fraction of pixels dropped
    pub p: Param<f64>,
    /// Whether channels are dropped independently
    pub per_channel: PerChannel,
}

impl Operator for Dropout {
    fn name(&self) -> &'static str {
        "dropout"
    }

    fn apply(&self, mut image: RgbImage, rng: &mut StdRng) -> Result<RgbImage> {
        let p = self.p.sample(rng).clamp(0.0, 1.0);
        let independent = self.per_channel.resolve(rng);
        let width = image.width() as usize;
        let cells = width * image.height() as usize;
        let mask = sample_mask(cells, independent, p, rng);

        for (x, y, pixel) in image.enumerate_pixels_mut() {
            let cell = y as usize * width + x as usize;
            for (c, value) in pixel.0.iter_mut().enumerate() {
                if is_dropped(&mask, cell, c, independent) {
                    *value = 0;
                }
            }
        }
        Ok(image)
    }
}

/// Drop rectangular blocks by sampling the mask on a coarse grid
#[derive(Debug, Clone)]
pub struct CoarseDropout {
    /// Fraction of grid cells dropped
    pub p: Param<f64>,
    /// Grid resolution as a fraction of the image size
    pub size_percent: Param<f64>,
    /// Whether channels are dropped independently
    pub per_channel: PerChannel,
}

impl Operator for CoarseDropout {
    fn name(&self) -> &'static str {
        "coarse_dropout"
    }

    fn apply(&self, mut image: RgbImage, rng: &mut StdRng) -> Result<RgbImage> {
        let p = self.p.sample(rng).clamp(0.0, 1.0);
        let size_percent = self.size_percent.sample(rng);
        let independent = self.per_channel.resolve(rng);

        let (width, height) = image.dimensions();
        let grid = |extent: u32| {
            ((f64::from(extent) * size_percent).round() as u32)
                .max(MIN_COARSE_CELLS)
                .min(extent.max(1))
        };
        let (grid_w, grid_h) = (grid(width), grid(height));
        let mask = sample_mask((grid_w * grid_h) as usize, independent, p, rng);

        for (x, y, pixel) in image.enumerate_pixels_mut() {
            let gx = (u64::from(x) * u64::from(grid_w) / u64::from(width.max(1))) as usize;
            let gy = (u64::from(y) * u64::from(grid_h) / u64::from(height.max(1))) as usize;
            let cell = gy * grid_w as usize + gx;
            for (c, value) in pixel.0.iter_mut().enumerate() {
                if is_dropped(&mask, cell, c, independent) {
                    *value = 0;
                }
            }
        }
        Ok(image)
    }
}
