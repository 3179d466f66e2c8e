//! Stochastic image operators and the combinators that compose them
//!
//! Every operator works on 3-channel RGB images. Alpha is stripped before a
//! pipeline runs and reattached afterwards by [`crate::channels::merge`].

use crate::io::error::Result;
use image::RgbImage;
use rand::rngs::StdRng;
use std::fmt::Debug;

/// Noise-mask blending of two augmentation branches
pub mod blend;
/// Colour and intensity operators
pub mod color;
/// Tree of randomized combinators evaluated by a single recursive sampler
pub mod combinator;
/// Convolution based blur, sharpen, emboss and edge operators
pub mod filters;
/// Canvas geometry operators: crop/pad and affine warps
pub mod geometric;
/// Additive noise and dropout operators
pub mod noise;
/// The sprite augmentation policy and the pipeline that expands images
pub mod policy;
/// Superpixel region replacement
pub mod superpixels;

pub use combinator::Augmenter;
pub use policy::{AugmentationPipeline, sprite_policy};

/// A pure image-to-image transformation with randomly sampled parameters
///
/// Implementations hold only their parameter ranges and draw concrete values
/// from `rng` on each call, so one operator can be shared by any number of
/// invocations.
pub trait Operator: Debug + Send + Sync {
    /// Short stable name used in diagnostics
    fn name(&self) -> &'static str;

    /// Transform `image`
    ///
    /// # Errors
    ///
    /// Returns an error if the operator cannot produce an output for this input
    fn apply(&self, image: RgbImage, rng: &mut StdRng) -> Result<RgbImage>;
}
