//! Conversions between `image` buffers and `ndarray` planes
//!
//! Arrays are laid out as (height, width, channel) so that `array[[y, x, c]]`
//! addresses the same sample as `image.get_pixel(x, y)[c]`.

use crate::io::error::{Result, operator_error};
use image::{Rgb, RgbImage};
use ndarray::{Array2, Array3};

/// Number of colour channels the operators work on
pub const CHANNELS: usize = 3;

/// Round and clamp a floating sample into the `u8` range
pub fn saturate(value: f32) -> u8 {
    num_traits::clamp(value.round(), 0.0, 255.0) as u8
}

/// Expand an RGB image into a (height, width, 3) floating point array
pub fn to_array(image: &RgbImage) -> Array3<f32> {
    let (width, height) = image.dimensions();
    let mut array = Array3::zeros((height as usize, width as usize, CHANNELS));
    for (x, y, pixel) in image.enumerate_pixels() {
        for (c, &value) in pixel.0.iter().enumerate() {
            if let Some(sample) = array.get_mut((y as usize, x as usize, c)) {
                *sample = f32::from(value);
            }
        }
    }
    array
}

/// Collapse a (height, width, 3) array back into an RGB image, saturating every sample
pub fn from_array(array: &Array3<f32>) -> RgbImage {
    let (height, width, _) = array.dim();
    RgbImage::from_fn(width as u32, height as u32, |x, y| {
        let sample = |c: usize| {
            array
                .get((y as usize, x as usize, c))
                .copied()
                .map_or(0, saturate)
        };
        Rgb([sample(0), sample(1), sample(2)])
    })
}

/// ITU-R 601 luma of an RGB pixel
pub fn luminance(pixel: &Rgb<u8>) -> f32 {
    let [r, g, b] = pixel.0;
    0.114_f32.mul_add(
        f32::from(b),
        0.299_f32.mul_add(f32::from(r), 0.587 * f32::from(g)),
    )
}

/// Per-pixel linear blend `alpha * foreground + (1 - alpha) * background`
///
/// # Errors
///
/// Returns an error if the two images or the mask disagree on dimensions
pub fn blend(
    foreground: &RgbImage,
    background: &RgbImage,
    alpha: &Array2<f32>,
) -> Result<RgbImage> {
    let (width, height) = foreground.dimensions();
    if background.dimensions() != (width, height)
        || alpha.dim() != (height as usize, width as usize)
    {
        return Err(operator_error(
            "blend",
            &format!(
                "cannot blend {width}x{height} over {}x{} with a {}x{} mask",
                background.width(),
                background.height(),
                alpha.ncols(),
                alpha.nrows()
            ),
        ));
    }

    Ok(RgbImage::from_fn(width, height, |x, y| {
        let a = alpha
            .get((y as usize, x as usize))
            .copied()
            .unwrap_or(0.0)
            .clamp(0.0, 1.0);
        let fg = foreground.get_pixel(x, y).0;
        let bg = background.get_pixel(x, y).0;
        Rgb([0, 1, 2].map(|c| {
            let f = f32::from(fg.get(c).copied().unwrap_or(0));
            let b = f32::from(bg.get(c).copied().unwrap_or(0));
            saturate(a.mul_add(f - b, b))
        }))
    }))
}
