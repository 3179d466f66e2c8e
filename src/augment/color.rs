//! Intensity and colour operators
//!
//! Operators with a `per_channel` setting draw either one value shared by
//! R, G and B or an independent value per channel.

use crate::augment::Operator;
use crate::io::error::Result;
use crate::math::color::{hsv_to_rgb, rgb_to_hsv};
use crate::math::probability::try_probability;
use crate::math::raster::{luminance, saturate};
use crate::math::sampling::{Param, PerChannel};
use image::{Rgb, RgbImage};
use rand::Rng;
use rand::rngs::StdRng;

/// Mid-grey pivot used by contrast adjustments
const CONTRAST_PIVOT: f32 = 128.0;

// Apply `f(value, channel)` to every sample of the image
fn map_channels(mut image: RgbImage, f: impl Fn(u8, usize) -> u8) -> RgbImage {
    for pixel in image.pixels_mut() {
        for (c, value) in pixel.0.iter_mut().enumerate() {
            *value = f(*value, c);
        }
    }
    image
}

/// Invert intensities (`255 - v`) with a small probability
#[derive(Debug, Clone)]
pub struct Invert {
    p: f64,
    per_channel: PerChannel,
}

impl Invert {
    /// Invert with probability `p`, decided per channel as `per_channel` says
    ///
    /// # Errors
    ///
    /// Returns an error if `p` is not a probability
    pub fn new(p: f64, per_channel: PerChannel) -> Result<Self> {
        Ok(Self {
            p: try_probability("p", p)?,
            per_channel,
        })
    }
}

impl Operator for Invert {
    fn name(&self) -> &'static str {
        "invert"
    }

    fn apply(&self, image: RgbImage, rng: &mut StdRng) -> Result<RgbImage> {
        let flips = if self.per_channel.resolve(rng) {
            [rng.random_bool(self.p), rng.random_bool(self.p), rng.random_bool(self.p)]
        } else {
            [rng.random_bool(self.p); 3]
        };
        if !flips.contains(&true) {
            return Ok(image);
        }
        Ok(map_channels(image, |v, c| {
            if flips.get(c).copied().unwrap_or(false) {
                u8::MAX - v
            } else {
                v
            }
        }))
    }
}

/// Add a constant to every pixel
#[derive(Debug, Clone)]
pub struct Add {
    /// Value added, in intensity units
    pub value: Param<i32>,
    /// Whether each channel gets its own value
    pub per_channel: PerChannel,
}

impl Operator for Add {
    fn name(&self) -> &'static str {
        "add"
    }

    fn apply(&self, image: RgbImage, rng: &mut StdRng) -> Result<RgbImage> {
        let shift = self.value.sample_channels(self.per_channel, rng);
        Ok(map_channels(image, |v, c| {
            let delta = shift.get(c).copied().unwrap_or(0);
            (i32::from(v) + delta).clamp(0, 255) as u8
        }))
    }
}

/// Shift hue and saturation by the same sampled amount
///
/// Hue is measured in the 8-bit convention (180 units per turn) and wraps,
/// saturation is clamped.
#[derive(Debug, Clone)]
pub struct AddToHueAndSaturation {
    /// Amount added to both hue and saturation
    pub value: Param<i32>,
}

impl Operator for AddToHueAndSaturation {
    fn name(&self) -> &'static str {
        "add_to_hue_and_saturation"
    }

    fn apply(&self, mut image: RgbImage, rng: &mut StdRng) -> Result<RgbImage> {
        let amount = self.value.sample(rng);
        if amount == 0 {
            return Ok(image);
        }
        let shift = amount as f32;
        for pixel in image.pixels_mut() {
            let [h, s, v] = rgb_to_hsv(pixel.0);
            *pixel = Rgb(hsv_to_rgb([h + shift, s + shift, v]));
        }
        Ok(image)
    }
}

/// Multiply every pixel by a factor
#[derive(Debug, Clone)]
pub struct Multiply {
    /// Multiplier
    pub mul: Param<f32>,
    /// Whether each channel gets its own multiplier
    pub per_channel: PerChannel,
}

impl Operator for Multiply {
    fn name(&self) -> &'static str {
        "multiply"
    }

    fn apply(&self, image: RgbImage, rng: &mut StdRng) -> Result<RgbImage> {
        let factors = self.mul.sample_channels(self.per_channel, rng);
        Ok(map_channels(image, |v, c| {
            saturate(f32::from(v) * factors.get(c).copied().unwrap_or(1.0))
        }))
    }
}

/// Scale distances from mid-grey: `128 + alpha * (v - 128)`
#[derive(Debug, Clone)]
pub struct ContrastNormalization {
    /// Contrast factor, below 1 flattens and above 1 stretches
    pub alpha: Param<f32>,
    /// Whether each channel gets its own factor
    pub per_channel: PerChannel,
}

impl Operator for ContrastNormalization {
    fn name(&self) -> &'static str {
        "contrast_normalization"
    }

    fn apply(&self, image: RgbImage, rng: &mut StdRng) -> Result<RgbImage> {
        let alphas = self.alpha.sample_channels(self.per_channel, rng);
        Ok(map_channels(image, |v, c| {
            let alpha = alphas.get(c).copied().unwrap_or(1.0);
            saturate(alpha.mul_add(f32::from(v) - CONTRAST_PIVOT, CONTRAST_PIVOT))
        }))
    }
}

/// Blend towards the luminance image
#[derive(Debug, Clone)]
pub struct Grayscale {
    /// Weight of the grayscale version, 1 removes all colour
    pub alpha: Param<f32>,
}

impl Operator for Grayscale {
    fn name(&self) -> &'static str {
        "grayscale"
    }

    fn apply(&self, mut image: RgbImage, rng: &mut StdRng) -> Result<RgbImage> {
        let alpha = self.alpha.sample(rng).clamp(0.0, 1.0);
        for pixel in image.pixels_mut() {
            let luma = luminance(pixel);
            for value in &mut pixel.0 {
                let v = f32::from(*value);
                *value = saturate(alpha.mul_add(luma - v, v));
            }
        }
        Ok(image)
    }
}
