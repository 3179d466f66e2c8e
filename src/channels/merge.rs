//! Alpha reattachment with a best-effort fallback
//!
//! Augmentation runs on RGB data only. Afterwards the source alpha plane is
//! put back so the variant keeps the sprite's transparency. When that is not
//! possible the RGB variant is kept as is, so a batch may mix RGB and RGBA
//! outputs.

use crate::io::image::SourceImage;
use image::{DynamicImage, Rgba, RgbImage, RgbaImage};
use std::fmt;

/// Why an alpha plane could not be reattached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeError {
    /// The source image carries no alpha channel
    MissingAlpha,
    /// The augmented canvas no longer matches the source canvas
    DimensionMismatch {
        /// Source (width, height)
        original: (u32, u32),
        /// Augmented (width, height)
        augmented: (u32, u32),
    },
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAlpha => write!(f, "source image has no alpha channel"),
            Self::DimensionMismatch {
                original,
                augmented,
            } => write!(
                f,
                "source is {}x{} but augmented image is {}x{}",
                original.0, original.1, augmented.0, augmented.1
            ),
        }
    }
}

impl std::error::Error for MergeError {}

/// Build an RGBA image from the augmented R, G, B planes and the original A plane
///
/// # Errors
///
/// Returns [`MergeError`] when the original has no alpha channel or the two
/// images differ in size
pub fn try_merge_channels(
    original: &DynamicImage,
    augmented: &RgbImage,
) -> Result<RgbaImage, MergeError> {
    if !original.color().has_alpha() {
        return Err(MergeError::MissingAlpha);
    }
    let source_dims = (original.width(), original.height());
    if source_dims != augmented.dimensions() {
        return Err(MergeError::DimensionMismatch {
            original: source_dims,
            augmented: augmented.dimensions(),
        });
    }

    let alpha = original.to_rgba8();
    Ok(RgbaImage::from_fn(source_dims.0, source_dims.1, |x, y| {
        let [r, g, b] = augmented.get_pixel(x, y).0;
        let a = alpha.get_pixel(x, y).0[3];
        Rgba([r, g, b, a])
    }))
}

/// Reattach the source alpha to `augmented`, falling back to plain RGB
///
/// A size mismatch is logged as a warning naming the source file and never
/// aborts the run. A missing alpha plane is only logged at debug level here;
/// the dataset builder reports it once per source.
pub fn merge_channels(source: &SourceImage, augmented: RgbImage) -> DynamicImage {
    match try_merge_channels(&source.image, &augmented) {
        Ok(rgba) => DynamicImage::ImageRgba8(rgba),
        Err(MergeError::MissingAlpha) => {
            tracing::debug!(file = %source.path.display(), "no alpha to merge, keeping RGB");
            DynamicImage::ImageRgb8(augmented)
        }
        Err(err) => {
            tracing::warn!(
                file = %source.path.display(),
                "Error merging channels: {err}, keeping RGB"
            );
            DynamicImage::ImageRgb8(augmented)
        }
    }
}
