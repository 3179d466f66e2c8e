//! Randomized sprite augmentation for building image-classifier training sets
//!
//! A zip archive of `group/item/image` sprites is expanded into a flat
//! `output/item/item_<n>.png` layout where every source image contributes a
//! fixed number of stochastic variants. Alpha is removed before augmentation
//! and the source alpha plane is reattached to each variant afterwards.

#![forbid(unsafe_code)]

/// Stochastic image operators, combinators and the sprite policy
pub mod augment;
/// Reattaching source alpha to augmented RGB variants
pub mod channels;
/// Input/output operations, configuration and error handling
pub mod io;
/// Parameter sampling, colour conversion and raster utilities
pub mod math;

pub use io::error::{AugmentError, Result};
