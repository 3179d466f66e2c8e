//! Channel handling around the RGB-only augmentation pipeline

/// Reattaching the source alpha plane to augmented RGB images
pub mod merge;

pub use merge::{MergeError, merge_channels, try_merge_channels};
