//! Loading source sprites and writing augmented variants

use crate::io::configuration::OUTPUT_EXTENSION;
use crate::io::dataset::is_hidden;
use crate::io::error::{AugmentError, Result, WithPath};
use image::{DynamicImage, ImageFormat};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// A decoded source image together with the file it came from
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// File the image was decoded from, used in diagnostics
    pub path: PathBuf,
    /// Decoded pixels in their original colour layout
    pub image: DynamicImage,
}

impl SourceImage {
    /// Decode the image at `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded
    pub fn open(path: &Path) -> Result<Self> {
        let image = image::open(path).map_err(|source| AugmentError::ImageLoad {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            image,
        })
    }

    /// File name for display
    pub fn name(&self) -> Cow<'_, str> {
        self.path
            .file_name()
            .map_or(Cow::Borrowed("<unnamed>"), |n| n.to_string_lossy())
    }

    /// Whether the source carries an alpha channel
    pub fn has_alpha(&self) -> bool {
        self.image.color().has_alpha()
    }
}

/// Decode every visible file directly inside `dir`, in file name order
///
/// # Errors
///
/// Returns an error if the directory cannot be listed or any file fails to decode
pub fn load_images(dir: &Path) -> Result<Vec<SourceImage>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).with_path(dir, "list images")? {
        let path = entry.with_path(dir, "list images")?.path();
        if path.is_file() && !is_hidden(&path) {
            files.push(path);
        }
    }
    files.sort();
    files.iter().map(|path| SourceImage::open(path)).collect()
}

/// Path of variant `index` inside the item folder `dir`: `<dir>/<dir name>_<index>.png`
pub fn variant_path(dir: &Path, index: usize) -> PathBuf {
    let label = dir.file_name().unwrap_or_default().to_string_lossy();
    dir.join(format!("{label}_{index}.{OUTPUT_EXTENSION}"))
}

/// Write `images` as PNGs numbered from `start_index`, returning the next free index
///
/// # Errors
///
/// Returns an error if any image cannot be encoded or written
pub fn save_images(images: &[DynamicImage], dir: &Path, start_index: usize) -> Result<usize> {
    for (offset, image) in images.iter().enumerate() {
        let path = variant_path(dir, start_index + offset);
        image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|source| AugmentError::ImageExport { path, source })?;
    }
    Ok(start_index + images.len())
}
