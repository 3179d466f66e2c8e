//! Smooth random masks for blending two augmentation branches

use crate::math::probability::sigmoid;
use crate::math::sampling::{Choice, Param};
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma};
use ndarray::Array2;
use rand::Rng;
use rand::rngs::StdRng;

type NoiseLayer = ImageBuffer<Luma<f32>, Vec<f32>>;

/// How multiple noise iterations are folded into one mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Per-pixel maximum
    Max,
    /// Per-pixel mean
    Mean,
}

/// Generator of per-pixel blend weights in `[0, 1]`
#[derive(Debug, Clone)]
pub enum NoiseMask {
    /// Blob-like mask from coarse random grids upscaled to the image size
    Simplex {
        /// Upper bound on the coarse grid's longer side
        size_px_max: Param<u32>,
        /// Number of layers generated and aggregated
        iterations: Param<u32>,
        /// How layers are combined
        aggregation: Choice<Aggregation>,
        /// Shift of the sigmoid saddle point, higher values favour the background
        threshold: Param<f32>,
    },

    /// Multi-scale mask whose octave weights follow `frequency^exponent`
    ///
    /// Strongly negative exponents produce large smooth clouds, exponents
    /// near zero produce fine grain.
    Frequency {
        /// Power-law exponent of the spectrum
        exponent: Param<f32>,
        /// Upper bound on the coarsest grid's longer side
        size_px_max: Param<u32>,
        /// Probability of sharpening the mask with a sigmoid
        sigmoid_p: f64,
        /// Shift of the sigmoid saddle point
        threshold: Param<f32>,
    },
}

impl NoiseMask {
    /// Mask matching the original library's simplex noise defaults
    pub fn simplex() -> Self {
        Self::Simplex {
            size_px_max: Param::uniform(2, 16),
            iterations: Param::uniform(1, 3),
            aggregation: Choice::of(Aggregation::Max, &[Aggregation::Mean]),
            threshold: Param::uniform(-10.0, 10.0),
        }
    }

    /// Mask with a power-law spectrum controlled by `exponent`
    pub fn frequency(exponent: Param<f32>) -> Self {
        Self::Frequency {
            exponent,
            size_px_max: Param::uniform(4, 16),
            sigmoid_p: 0.5,
            threshold: Param::uniform(-10.0, 10.0),
        }
    }

    /// Sample a `height x width` mask
    pub fn generate(&self, width: u32, height: u32, rng: &mut StdRng) -> Array2<f32> {
        let layer = match self {
            Self::Simplex {
                size_px_max,
                iterations,
                aggregation,
                threshold,
            } => {
                let rounds = iterations.sample(rng).max(1);
                let method = aggregation.sample(rng);
                let mut combined: Option<NoiseLayer> = None;
                for _ in 0..rounds {
                    let cells = size_px_max.sample(rng).max(1);
                    let layer = coarse_layer(width, height, cells, rng);
                    combined = Some(match combined {
                        None => layer,
                        Some(acc) => aggregate(acc, &layer, method),
                    });
                }
                if method == Aggregation::Mean
                    && let Some(ref mut acc) = combined
                {
                    acc.pixels_mut().for_each(|p| p.0[0] /= rounds as f32);
                }
                let thresh = threshold.sample(rng);
                combined.map(|acc| squash(acc, thresh))
            }
            Self::Frequency {
                exponent,
                size_px_max,
                sigmoid_p,
                threshold,
            } => {
                let exponent = exponent.sample(rng);
                let coarsest = size_px_max.sample(rng).max(1);
                let layer = spectral_layer(width, height, coarsest, exponent, rng);
                let thresh = threshold.sample(rng);
                Some(if rng.random_bool(*sigmoid_p) {
                    squash(layer, thresh)
                } else {
                    layer
                })
            }
        };

        let mut mask = Array2::zeros((height as usize, width as usize));
        if let Some(layer) = layer {
            for (x, y, pixel) in layer.enumerate_pixels() {
                if let Some(weight) = mask.get_mut((y as usize, x as usize)) {
                    *weight = pixel.0[0].clamp(0.0, 1.0);
                }
            }
        }
        mask
    }
}

fn upscale_filter(rng: &mut StdRng) -> FilterType {
    let filters = [FilterType::Nearest, FilterType::Triangle, FilterType::CatmullRom];
    filters
        .get(rng.random_range(0..filters.len()))
        .copied()
        .unwrap_or(FilterType::Triangle)
}

// Uniform noise on a grid whose longer side has `cells` samples, resized to the image
fn coarse_layer(width: u32, height: u32, cells: u32, rng: &mut StdRng) -> NoiseLayer {
    let longest = width.max(height).max(1) as f32;
    let grid_w = ((width as f32 / longest) * cells as f32).ceil().max(1.0) as u32;
    let grid_h = ((height as f32 / longest) * cells as f32).ceil().max(1.0) as u32;
    let grid = NoiseLayer::from_fn(grid_w, grid_h, |_, _| Luma([rng.random::<f32>()]));
    let filter = upscale_filter(rng);
    imageops::resize(&grid, width.max(1), height.max(1), filter)
}

fn aggregate(mut acc: NoiseLayer, layer: &NoiseLayer, method: Aggregation) -> NoiseLayer {
    for (a, b) in acc.pixels_mut().zip(layer.pixels()) {
        a.0[0] = match method {
            Aggregation::Max => a.0[0].max(b.0[0]),
            Aggregation::Mean => a.0[0] + b.0[0],
        };
    }
    acc
}

fn squash(mut layer: NoiseLayer, threshold: f32) -> NoiseLayer {
    layer
        .pixels_mut()
        .for_each(|p| p.0[0] = sigmoid(20.0f32.mul_add(p.0[0] - 0.5, -threshold)));
    layer
}

// Octaves double in frequency from the coarsest grid up to the image resolution
fn spectral_layer(
    width: u32,
    height: u32,
    coarsest: u32,
    exponent: f32,
    rng: &mut StdRng,
) -> NoiseLayer {
    let finest = width.max(height).max(1);
    let mut sum = NoiseLayer::new(width.max(1), height.max(1));
    let mut cells = coarsest.min(finest);
    loop {
        let weight = (cells as f32).powf(exponent);
        let octave = coarse_layer(width, height, cells, rng);
        for (s, o) in sum.pixels_mut().zip(octave.pixels()) {
            s.0[0] = weight.mul_add(o.0[0], s.0[0]);
        }
        if cells >= finest {
            break;
        }
        cells = cells.saturating_mul(2).min(finest);
    }

    let (lo, hi) = sum
        .pixels()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.0[0]), hi.max(p.0[0]))
        });
    let span = hi - lo;
    sum.pixels_mut().for_each(|p| {
        p.0[0] = if span > f32::EPSILON {
            (p.0[0] - lo) / span
        } else {
            0.5
        };
    });
    sum
}
