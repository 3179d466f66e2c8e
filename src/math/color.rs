//! 8-bit HSV conversion
//!
//! Hue is stored in `[0, 180)` so a full turn fits a byte, matching the
//! convention augmentation libraries use for `uint8` images.

/// Degrees covered by one hue unit
const HUE_SCALE: f32 = 2.0;

/// Convert an RGB pixel to `[hue, saturation, value]`
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [f32; 3] {
    let [r, g, b] = rgb.map(|c| f32::from(c) / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let degrees = if delta <= f32::EPSILON {
        0.0
    } else if (max - r).abs() <= f32::EPSILON {
        60.0 * ((g - b) / delta)
    } else if (max - g).abs() <= f32::EPSILON {
        60.0 * ((b - r) / delta) + 120.0
    } else {
        60.0 * ((r - g) / delta) + 240.0
    };

    let saturation = if max <= f32::EPSILON { 0.0 } else { delta / max };

    [
        degrees.rem_euclid(360.0) / HUE_SCALE,
        saturation * 255.0,
        max * 255.0,
    ]
}

/// Convert `[hue, saturation, value]` back to an RGB pixel
///
/// Hue wraps around, saturation and value are clamped to `[0, 255]`.
pub fn hsv_to_rgb(hsv: [f32; 3]) -> [u8; 3] {
    let degrees = (hsv[0] * HUE_SCALE).rem_euclid(360.0);
    let saturation = hsv[1].clamp(0.0, 255.0) / 255.0;
    let value = hsv[2].clamp(0.0, 255.0) / 255.0;

    let chroma = value * saturation;
    let sector = degrees / 60.0;
    let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
    let m = value - chroma;

    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };

    [r, g, b].map(|c| ((c + m) * 255.0).round().clamp(0.0, 255.0) as u8)
}
