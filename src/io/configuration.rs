//! Run constants and the validated configuration of one augmentation run

use crate::io::error::{Result, invalid_parameter};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};

// Augmentation policy settings
/// Variants generated per source image
pub const DEFAULT_VARIANT_COUNT: usize = 1000;
/// Largest number of photometric operators applied to one variant
pub const MAX_PHOTOMETRIC_STEPS: usize = 5;

// Filesystem layout
/// Archive holding the group/item sprite tree
pub const DEFAULT_ARCHIVE: &str = "sprites.zip";
/// Working directory the archive is extracted into
pub const DEFAULT_SPRITES_DIR: &str = "sprites";
/// Root of the generated training set
pub const DEFAULT_OUTPUT_DIR: &str = "training_data";
/// Extension of every written variant
pub const OUTPUT_EXTENSION: &str = "png";

// Progress bar display settings
/// Number of item folders shown with their own progress bar
pub const MAX_INDIVIDUAL_PROGRESS_BARS: usize = 5;

/// Everything a run needs, with no implicit working-directory assumptions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Zip archive to stage
    pub archive: PathBuf,
    /// Directory the archive is extracted into (deleted first)
    pub sprites_dir: PathBuf,
    /// Root of the mirrored training set (deleted first)
    pub output_dir: PathBuf,
    /// Variants per source image
    pub count: usize,
    /// Seed for reproducible runs, fresh entropy when absent
    pub seed: Option<u64>,
    /// Reattach the source alpha plane to every variant
    pub merge_alpha: bool,
    /// Resize cropped/padded variants back to the source size
    pub keep_size: bool,
}

impl RunConfig {
    /// Default layout rooted at `base`
    pub fn rooted_at(base: &Path) -> Self {
        Self {
            archive: base.join(DEFAULT_ARCHIVE),
            sprites_dir: base.join(DEFAULT_SPRITES_DIR),
            output_dir: base.join(DEFAULT_OUTPUT_DIR),
            ..Self::default()
        }
    }

    /// Check the directories cannot clobber each other
    ///
    /// # Errors
    ///
    /// Returns an error if the sprites and output directories coincide or one
    /// contains the other, or if the archive lives inside a directory that is
    /// deleted at the start of the run
    pub fn validate(&self) -> Result<()> {
        if self.sprites_dir.starts_with(&self.output_dir)
            || self.output_dir.starts_with(&self.sprites_dir)
        {
            return Err(invalid_parameter(
                "output_dir",
                &self.output_dir.display(),
                &"must not overlap the sprites directory",
            ));
        }
        if self.archive.starts_with(&self.sprites_dir) || self.archive.starts_with(&self.output_dir)
        {
            return Err(invalid_parameter(
                "archive",
                &self.archive.display(),
                &"must not live inside a directory that is recreated",
            ));
        }
        Ok(())
    }

    /// Random source for the run
    pub fn rng(&self) -> StdRng {
        self.seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            archive: PathBuf::from(DEFAULT_ARCHIVE),
            sprites_dir: PathBuf::from(DEFAULT_SPRITES_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            count: DEFAULT_VARIANT_COUNT,
            seed: None,
            merge_alpha: true,
            keep_size: true,
        }
    }
}
