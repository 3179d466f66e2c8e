//! Operators that move pixels or change the canvas

use crate::augment::Operator;
use crate::io::error::{Result, operator_error};
use crate::math::raster::saturate;
use crate::math::sampling::{Choice, Param, PerChannel};
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use rand::rngs::StdRng;

/// How samples outside the image are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryMode {
    /// A fill colour
    Constant,
    /// Repeat the outermost row or column
    Edge,
    /// Mirror without repeating the edge pixel (`dcb|abcd|cba`)
    Reflect,
    /// Mirror including the edge pixel (`dcba|abcd|dcba`)
    Symmetric,
    /// Tile the image periodically
    Wrap,
}

impl BoundaryMode {
    /// Every supported mode
    pub const ALL: [Self; 5] = [
        Self::Constant,
        Self::Edge,
        Self::Reflect,
        Self::Symmetric,
        Self::Wrap,
    ];

    /// A uniform choice over [`BoundaryMode::ALL`]
    pub fn any() -> Choice<Self> {
        Choice::of(Self::Constant, &[Self::Edge, Self::Reflect, Self::Symmetric, Self::Wrap])
    }

    /// Map `coord` onto `0..len`, or `None` when the fill colour should be used
    pub fn resolve(self, coord: i64, len: i64) -> Option<i64> {
        if len <= 0 {
            return None;
        }
        if (0..len).contains(&coord) {
            return Some(coord);
        }
        match self {
            Self::Constant => None,
            Self::Edge => Some(coord.clamp(0, len - 1)),
            Self::Reflect => {
                if len == 1 {
                    return Some(0);
                }
                let period = 2 * (len - 1);
                let c = coord.rem_euclid(period);
                Some(if c >= len { period - c } else { c })
            }
            Self::Symmetric => {
                let period = 2 * len;
                let c = coord.rem_euclid(period);
                Some(if c >= len { period - 1 - c } else { c })
            }
            Self::Wrap => Some(coord.rem_euclid(len)),
        }
    }
}

/// Resampling used when pixels land between grid positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    /// Order 0
    Nearest,
    /// Order 1
    Bilinear,
}

/// Boundary-aware reader over an RGB image
struct Sampler<'a> {
    image: &'a RgbImage,
    mode: BoundaryMode,
    fill: [u8; 3],
}

impl Sampler<'_> {
    fn texel(&self, x: i64, y: i64) -> [f32; 3] {
        let (width, height) = self.image.dimensions();
        let resolved = self
            .mode
            .resolve(x, i64::from(width))
            .zip(self.mode.resolve(y, i64::from(height)));
        let rgb = match resolved {
            Some((sx, sy)) => self.image.get_pixel(sx as u32, sy as u32).0,
            None => self.fill,
        };
        rgb.map(f32::from)
    }

    fn at(&self, x: f32, y: f32, interpolation: Interpolation) -> [f32; 3] {
        match interpolation {
            Interpolation::Nearest => self.texel(x.round() as i64, y.round() as i64),
            Interpolation::Bilinear => {
                let (x0, y0) = (x.floor(), y.floor());
                let (fx, fy) = (x - x0, y - y0);
                let (ix, iy) = (x0 as i64, y0 as i64);
                let tl = self.texel(ix, iy);
                let tr = self.texel(ix + 1, iy);
                let bl = self.texel(ix, iy + 1);
                let br = self.texel(ix + 1, iy + 1);
                [0, 1, 2].map(|c| {
                    let top = fx.mul_add(tr[c] - tl[c], tl[c]);
                    let bottom = fx.mul_add(br[c] - bl[c], bl[c]);
                    fy.mul_add(bottom - top, top)
                })
            }
        }
    }
}

/// Crop or pad each side by an independently sampled fraction of the extent
///
/// Negative fractions crop, positive fractions pad.
#[derive(Debug, Clone)]
pub struct CropAndPad {
    /// Fraction of the height (top, bottom) or width (left, right) per side
    pub percent: Param<f64>,
    /// Content of the padded border
    pub pad_mode: Choice<BoundaryMode>,
    /// Fill colour used by [`BoundaryMode::Constant`], sampled per channel
    pub pad_cval: Param<u8>,
    /// Resize the result back to the input dimensions
    pub keep_size: bool,
}

impl CropAndPad {
    /// Crop up to `-min` or pad up to `max` of each side, with any padding mode
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            percent: Param::uniform(min, max),
            pad_mode: BoundaryMode::any(),
            pad_cval: Param::uniform(0, 255),
            keep_size: true,
        }
    }

    /// Let the output canvas differ from the input canvas
    #[must_use]
    pub fn with_keep_size(mut self, keep_size: bool) -> Self {
        self.keep_size = keep_size;
        self
    }
}

// Signed pixel amounts per side: top, right, bottom, left
fn side_amounts(percent: [f64; 4], width: u32, height: u32) -> [i64; 4] {
    let extents = [height, width, height, width];
    let mut amounts = [0i64; 4];
    for ((amount, p), extent) in amounts.iter_mut().zip(percent).zip(extents) {
        *amount = (p * f64::from(extent)).round() as i64;
    }
    amounts
}

// Shrink crops until at least one pixel survives on the axis
fn limit_crop(first: i64, second: i64, extent: i64) -> (i64, i64) {
    let (mut a, mut b) = (first.max(0), second.max(0));
    while a + b >= extent && (a > 0 || b > 0) {
        if a >= b {
            a -= 1;
        } else {
            b -= 1;
        }
    }
    (a, b)
}

impl Operator for CropAndPad {
    fn name(&self) -> &'static str {
        "crop_and_pad"
    }

    fn apply(&self, image: RgbImage, rng: &mut StdRng) -> Result<RgbImage> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(operator_error(self.name(), &"input image is empty"));
        }

        let percent = [
            self.percent.sample(rng),
            self.percent.sample(rng),
            self.percent.sample(rng),
            self.percent.sample(rng),
        ];
        let [top, right, bottom, left] = side_amounts(percent, width, height);
        let mode = self.pad_mode.sample(rng);
        let fill = self.pad_cval.sample_channels(PerChannel::ALWAYS, rng);

        let (crop_top, crop_bottom) = limit_crop(-top, -bottom, i64::from(height));
        let (crop_left, crop_right) = limit_crop(-left, -right, i64::from(width));
        let cropped = imageops::crop_imm(
            &image,
            crop_left as u32,
            crop_top as u32,
            (i64::from(width) - crop_left - crop_right) as u32,
            (i64::from(height) - crop_top - crop_bottom) as u32,
        )
        .to_image();

        let (pad_top, pad_left) = (top.max(0), left.max(0));
        let out_width = i64::from(cropped.width()) + pad_left + right.max(0);
        let out_height = i64::from(cropped.height()) + pad_top + bottom.max(0);

        let sampler = Sampler {
            image: &cropped,
            mode,
            fill,
        };
        let padded = RgbImage::from_fn(out_width as u32, out_height as u32, |x, y| {
            let rgb = sampler.texel(i64::from(x) - pad_left, i64::from(y) - pad_top);
            Rgb(rgb.map(saturate))
        });

        if self.keep_size && padded.dimensions() != (width, height) {
            Ok(imageops::resize(&padded, width, height, FilterType::CatmullRom))
        } else {
            Ok(padded)
        }
    }
}

/// Scale about the centre and translate, keeping the canvas size
#[derive(Debug, Clone)]
pub struct Affine {
    /// Horizontal scale factor
    pub scale_x: Param<f32>,
    /// Vertical scale factor
    pub scale_y: Param<f32>,
    /// Horizontal shift as a fraction of the width
    pub translate_x: Param<f32>,
    /// Vertical shift as a fraction of the height
    pub translate_y: Param<f32>,
    /// Resampling order
    pub order: Choice<Interpolation>,
    /// Fill colour for [`BoundaryMode::Constant`], sampled per channel
    pub cval: Param<u8>,
    /// Content of areas uncovered by the transform
    pub mode: Choice<BoundaryMode>,
}

impl Affine {
    /// Identity transform with nearest/bilinear order and any boundary mode
    pub fn new() -> Self {
        Self {
            scale_x: Param::fixed(1.0),
            scale_y: Param::fixed(1.0),
            translate_x: Param::fixed(0.0),
            translate_y: Param::fixed(0.0),
            order: Choice::of(Interpolation::Nearest, &[Interpolation::Bilinear]),
            cval: Param::uniform(0, 255),
            mode: BoundaryMode::any(),
        }
    }

    /// Independent x/y scale ranges
    #[must_use]
    pub fn with_scale(mut self, x: Param<f32>, y: Param<f32>) -> Self {
        self.scale_x = x;
        self.scale_y = y;
        self
    }

    /// Independent x/y translation ranges, as fractions of the extent
    #[must_use]
    pub fn with_translate_percent(mut self, x: Param<f32>, y: Param<f32>) -> Self {
        self.translate_x = x;
        self.translate_y = y;
        self
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::new()
    }
}

impl Operator for Affine {
    fn name(&self) -> &'static str {
        "affine"
    }

    fn apply(&self, image: RgbImage, rng: &mut StdRng) -> Result<RgbImage> {
        let (width, height) = image.dimensions();
        let scale_x = self.scale_x.sample(rng);
        let scale_y = self.scale_y.sample(rng);
        if scale_x.abs() < f32::EPSILON || scale_y.abs() < f32::EPSILON {
            return Err(operator_error(self.name(), &"scale must be non-zero"));
        }
        let shift_x = self.translate_x.sample(rng) * width as f32;
        let shift_y = self.translate_y.sample(rng) * height as f32;
        let order = self.order.sample(rng);
        let fill = self.cval.sample_channels(PerChannel::ALWAYS, rng);
        let mode = self.mode.sample(rng);

        let sampler = Sampler {
            image: &image,
            mode,
            fill,
        };
        let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);

        // Inverse map each output pixel centre back into the source
        Ok(RgbImage::from_fn(width, height, |x, y| {
            let src_x = (x as f32 + 0.5 - cx - shift_x) / scale_x + cx - 0.5;
            let src_y = (y as f32 + 0.5 - cy - shift_y) / scale_y + cy - 0.5;
            Rgb(sampler.at(src_x, src_y, order).map(saturate))
        }))
    }
}
