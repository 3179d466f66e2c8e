//! The sprite augmentation policy
//!
//! Two stages run in random relative order: a geometric stage whose steps
//! each fire half of the time, and a photometric stage that applies a random
//! subset of up to five catalog operators in random order.

use crate::augment::blend::NoiseMask;
use crate::augment::color::{
    Add, AddToHueAndSaturation, ContrastNormalization, Grayscale, Invert, Multiply,
};
use crate::augment::combinator::Augmenter;
use crate::augment::filters::{
    AverageBlur, DirectedEdgeDetect, EdgeDetect, Emboss, GaussianBlur, MedianBlur, Sharpen,
};
use crate::augment::geometric::{Affine, CropAndPad};
use crate::augment::noise::{AdditiveGaussianNoise, CoarseDropout, Dropout};
use crate::augment::superpixels::Superpixels;
use crate::io::configuration::{DEFAULT_VARIANT_COUNT, MAX_PHOTOMETRIC_STEPS};
use crate::io::error::Result;
use crate::math::sampling::{Param, PerChannel};
use image::{DynamicImage, RgbImage};
use rand::rngs::StdRng;

/// Geometric steps: crop/pad and affine warp, each gated at 50%
///
/// # Errors
///
/// Returns an error if a hard-coded range fails validation
pub fn geometric_stage(keep_size: bool) -> Result<Vec<Augmenter>> {
    Ok(vec![
        Augmenter::sometimes(Augmenter::always(
            CropAndPad::new(-0.05, 0.1).with_keep_size(keep_size),
        )),
        Augmenter::sometimes(Augmenter::always(
            Affine::new()
                .with_scale(Param::uniform(0.8, 1.2), Param::uniform(0.8, 1.2))
                .with_translate_percent(Param::uniform(-0.2, 0.2), Param::uniform(-0.2, 0.2)),
        )),
    ])
}

/// The photometric catalog sampled by the second stage
///
/// # Errors
///
/// Returns an error if a hard-coded range fails validation
pub fn photometric_catalog() -> Result<Vec<Augmenter>> {
    let half = PerChannel::new(0.5)?;

    Ok(vec![
        Augmenter::sometimes(Augmenter::always(Superpixels {
            p_replace: Param::uniform(0.0, 1.0),
            n_segments: Param::uniform(20, 200),
        })),
        Augmenter::one_of(vec![
            Augmenter::always(GaussianBlur {
                sigma: Param::uniform(0.0, 3.0),
            }),
            Augmenter::always(AverageBlur {
                k: Param::uniform(2, 7),
            }),
            Augmenter::always(MedianBlur {
                k: Param::uniform(3, 11),
            }),
        ]),
        Augmenter::always(Sharpen {
            alpha: Param::uniform(0.0, 1.0),
            lightness: Param::uniform(0.75, 1.5),
        }),
        Augmenter::always(Emboss {
            alpha: Param::uniform(0.0, 1.0),
            strength: Param::uniform(0.0, 2.0),
        }),
        Augmenter::noise_alpha(
            NoiseMask::simplex(),
            Augmenter::one_of(vec![
                Augmenter::always(EdgeDetect {
                    alpha: Param::uniform(0.5, 1.0),
                }),
                Augmenter::always(DirectedEdgeDetect {
                    alpha: Param::uniform(0.5, 1.0),
                    direction: Param::uniform(0.0, 1.0),
                }),
            ]),
            None,
        ),
        Augmenter::always(AdditiveGaussianNoise {
            loc: Param::fixed(0.0),
            scale: Param::uniform(0.0, 0.05 * 255.0),
            per_channel: half,
        }),
        Augmenter::one_of(vec![
            Augmenter::always(Dropout {
                p: Param::uniform(0.01, 0.1),
                per_channel: half,
            }),
            Augmenter::always(CoarseDropout {
                p: Param::uniform(0.03, 0.15),
                size_percent: Param::uniform(0.02, 0.05),
                per_channel: PerChannel::new(0.2)?,
            }),
        ]),
        Augmenter::always(Invert::new(0.05, PerChannel::ALWAYS)?),
        Augmenter::always(Add {
            value: Param::uniform(-10, 10),
            per_channel: half,
        }),
        Augmenter::always(AddToHueAndSaturation {
            value: Param::uniform(-20, 20),
        }),
        Augmenter::one_of(vec![
            Augmenter::always(Multiply {
                mul: Param::uniform(0.5, 1.5),
                per_channel: half,
            }),
            Augmenter::noise_alpha(
                NoiseMask::frequency(Param::uniform(-4.0, 0.0)),
                Augmenter::always(Multiply {
                    mul: Param::uniform(0.5, 1.5),
                    per_channel: PerChannel::ALWAYS,
                }),
                Some(Augmenter::always(ContrastNormalization {
                    alpha: Param::uniform(0.5, 2.0),
                    per_channel: PerChannel::NEVER,
                })),
            ),
        ]),
        Augmenter::always(ContrastNormalization {
            alpha: Param::uniform(0.5, 2.0),
            per_channel: half,
        }),
        Augmenter::always(Grayscale {
            alpha: Param::uniform(0.0, 1.0),
        }),
    ])
}

/// Build the full sprite augmentation tree
///
/// `keep_size` controls whether crop/pad restores the input canvas size.
///
/// # Errors
///
/// Returns an error if a hard-coded range fails validation
pub fn sprite_policy(keep_size: bool) -> Result<Augmenter> {
    let mut stages = geometric_stage(keep_size)?;
    stages.push(Augmenter::some_of(
        0,
        MAX_PHOTOMETRIC_STEPS,
        photometric_catalog()?,
        true,
    )?);
    Ok(Augmenter::sequence(stages, true))
}

/// Expands one source image into a fixed number of augmented variants
#[derive(Debug)]
pub struct AugmentationPipeline {
    root: Augmenter,
    count: usize,
}

impl AugmentationPipeline {
    /// Wrap an augmentation tree producing `count` variants per image
    pub const fn new(root: Augmenter, count: usize) -> Self {
        Self { root, count }
    }

    /// The sprite policy with the default variant count
    ///
    /// # Errors
    ///
    /// Returns an error if the policy cannot be built
    pub fn sprite() -> Result<Self> {
        Ok(Self::new(sprite_policy(true)?, DEFAULT_VARIANT_COUNT))
    }

    /// Variants produced per source image
    pub const fn count(&self) -> usize {
        self.count
    }

    /// The augmentation tree
    pub const fn root(&self) -> &Augmenter {
        &self.root
    }

    /// Convert `image` to RGB, dropping any alpha, and sample `count` variants
    ///
    /// Each variant is an independent draw from `rng`.
    ///
    /// # Errors
    ///
    /// Returns the first operator failure; the whole batch is abandoned
    pub fn augment(&self, image: &DynamicImage, rng: &mut StdRng) -> Result<Vec<RgbImage>> {
        let rgb = image.to_rgb8();
        (0..self.count)
            .map(|_| self.root.sample(rgb.clone(), rng))
            .collect()
    }
}
