//! Superpixel segmentation and region replacement
//!
//! Segments are found with a compact SLIC-style clustering in joint
//! colour/position space, seeded on a regular grid.

use crate::augment::Operator;
use crate::io::error::Result;
use crate::math::raster::{CHANNELS, saturate, to_array};
use crate::math::sampling::Param;
use image::{Rgb, RgbImage};
use ndarray::{Array2, Array3};
use rand::Rng;
use rand::rngs::StdRng;

/// Refinement rounds of the clustering
const ITERATIONS: usize = 4;
/// Weight of spatial distance against colour distance
const COMPACTNESS: f32 = 10.0;

#[derive(Debug, Clone, Copy)]
struct Centre {
    color: [f32; CHANNELS],
    x: f32,
    y: f32,
}

/// Label map of a segmentation, one label per pixel
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Segment index of each pixel, indexed `[y, x]`
    pub labels: Array2<usize>,
    /// Number of segments, labels are `0..count`
    pub count: usize,
}

/// Cluster `image` into roughly `segments` compact regions
pub fn segment(image: &RgbImage, segments: u32) -> Segmentation {
    let pixels = to_array(image);
    let (height, width, _) = pixels.dim();
    let area = (height * width).max(1) as f32;
    let step = (area / segments.max(1) as f32).sqrt().max(1.0);

    let mut centres = Vec::new();
    let mut cy = step / 2.0;
    while cy < height as f32 {
        let mut cx = step / 2.0;
        while cx < width as f32 {
            centres.push(Centre {
                color: color_at(&pixels, cx as usize, cy as usize),
                x: cx,
                y: cy,
            });
            cx += step;
        }
        cy += step;
    }
    if centres.is_empty() {
        centres.push(Centre {
            color: color_at(&pixels, 0, 0),
            x: 0.0,
            y: 0.0,
        });
    }

    let mut labels = Array2::zeros((height, width));
    let spatial_weight = (COMPACTNESS / step).powi(2);

    for _ in 0..ITERATIONS {
        let mut distances = Array2::from_elem((height, width), f32::INFINITY);
        for (index, centre) in centres.iter().enumerate() {
            let y0 = (centre.y - step).floor().max(0.0) as usize;
            let y1 = ((centre.y + step).ceil() as usize).min(height);
            let x0 = (centre.x - step).floor().max(0.0) as usize;
            let x1 = ((centre.x + step).ceil() as usize).min(width);
            for y in y0..y1 {
                for x in x0..x1 {
                    let color = color_at(&pixels, x, y);
                    let color_dist: f32 = color
                        .iter()
                        .zip(centre.color)
                        .map(|(a, b)| (a - b).powi(2))
                        .sum();
                    let dx = x as f32 - centre.x;
                    let dy = y as f32 - centre.y;
                    let dist = spatial_weight.mul_add(dx.mul_add(dx, dy * dy), color_dist);
                    if let Some(best) = distances.get_mut((y, x))
                        && dist < *best
                    {
                        *best = dist;
                        if let Some(label) = labels.get_mut((y, x)) {
                            *label = index;
                        }
                    }
                }
            }
        }
        centres = recompute_centres(&pixels, &labels, &centres);
    }

    Segmentation {
        labels,
        count: centres.len(),
    }
}

fn color_at(pixels: &Array3<f32>, x: usize, y: usize) -> [f32; CHANNELS] {
    [0, 1, 2].map(|c| pixels.get((y, x, c)).copied().unwrap_or(0.0))
}

// Centres without members keep their previous position
fn recompute_centres(pixels: &Array3<f32>, labels: &Array2<usize>, old: &[Centre]) -> Vec<Centre> {
    let mut sums = vec![([0.0f32; CHANNELS], 0.0f32, 0.0f32, 0usize); old.len()];
    for ((y, x), &label) in labels.indexed_iter() {
        if let Some(entry) = sums.get_mut(label) {
            let color = color_at(pixels, x, y);
            for (acc, value) in entry.0.iter_mut().zip(color) {
                *acc += value;
            }
            entry.1 += x as f32;
            entry.2 += y as f32;
            entry.3 += 1;
        }
    }
    old.iter()
        .zip(sums)
        .map(|(centre, (color, sx, sy, n))| {
            if n == 0 {
                *centre
            } else {
                let n = n as f32;
                Centre {
                    color: color.map(|v| v / n),
                    x: sx / n,
                    y: sy / n,
                }
            }
        })
        .collect()
}

/// Replace random superpixels by their mean colour
#[derive(Debug, Clone)]
pub struct Superpixels {
    /// Probability that a segment is replaced
    pub p_replace: Param<f64>,
    /// Target number of segments
    pub n_segments: Param<u32>,
}

impl Operator for Superpixels {
    fn name(&self) -> &'static str {
        "superpixels"
    }

    fn apply(&self, mut image: RgbImage, rng: &mut StdRng) -> Result<RgbImage> {
        let p = self.p_replace.sample(rng).clamp(0.0, 1.0);
        let segments = self.n_segments.sample(rng);
        if p <= 0.0 {
            return Ok(image);
        }

        let Segmentation { labels, count } = segment(&image, segments);
        let replace: Vec<bool> = (0..count).map(|_| rng.random_bool(p)).collect();
        if !replace.contains(&true) {
            return Ok(image);
        }

        let mut sums = vec![([0u64; CHANNELS], 0u64); count];
        for (x, y, pixel) in image.enumerate_pixels() {
            let label = labels.get((y as usize, x as usize)).copied().unwrap_or(0);
            if let Some(entry) = sums.get_mut(label) {
                for (acc, value) in entry.0.iter_mut().zip(pixel.0) {
                    *acc += u64::from(value);
                }
                entry.1 += 1;
            }
        }
        let means: Vec<Rgb<u8>> = sums
            .iter()
            .map(|(total, n)| Rgb(total.map(|t| saturate(t as f32 / (*n).max(1) as f32))))
            .collect();

        for (x, y, pixel) in image.enumerate_pixels_mut() {
            let label = labels.get((y as usize, x as usize)).copied().unwrap_or(0);
            if replace.get(label).copied().unwrap_or(false)
                && let Some(mean) = means.get(label)
            {
                *pixel = *mean;
            }
        }
        Ok(image)
    }
}
