//! Command-line interface and the end-to-end dataset build

use crate::augment::{AugmentationPipeline, sprite_policy};
use crate::channels::merge_channels;
use crate::io::archive::stage_archive;
use crate::io::configuration::{
    DEFAULT_ARCHIVE, DEFAULT_OUTPUT_DIR, DEFAULT_SPRITES_DIR, DEFAULT_VARIANT_COUNT, RunConfig,
};
use crate::io::dataset::{TrainingItem, discover_item_folders, prepare_output_root};
use crate::io::error::Result;
use crate::io::image::{load_images, save_images};
use crate::io::progress::ProgressManager;
use clap::Parser;
use image::DynamicImage;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "spriteaug")]
#[command(
    author,
    version,
    about = "Expand a sprite archive into an augmented training set"
)]
/// Command-line arguments for the sprite augmentation tool
pub struct Cli {
    /// Zip archive containing group/item/image sprite folders
    #[arg(value_name = "ARCHIVE", default_value = DEFAULT_ARCHIVE)]
    pub archive: PathBuf,

    /// Directory the archive is extracted into (recreated on every run)
    #[arg(long, default_value = DEFAULT_SPRITES_DIR)]
    pub sprites_dir: PathBuf,

    /// Root of the generated training set (recreated on every run)
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Number of variants generated per source image
    #[arg(short, long, default_value_t = DEFAULT_VARIANT_COUNT)]
    pub count: usize,

    /// Random seed for reproducible output
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Write RGB variants without reattaching the source alpha channel
    #[arg(long)]
    pub no_merge: bool,

    /// Let crop/pad change the canvas size instead of resizing back
    #[arg(long)]
    pub variable_size: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Run configuration described by these arguments
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            archive: self.archive.clone(),
            sprites_dir: self.sprites_dir.clone(),
            output_dir: self.output_dir.clone(),
            count: self.count,
            seed: self.seed,
            merge_alpha: !self.no_merge,
            keep_size: !self.variable_size,
        }
    }
}

/// Totals reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Item folders processed
    pub items: usize,
    /// Source images augmented
    pub sources: usize,
    /// Variant files written
    pub variants: usize,
}

/// Orchestrates the full flow: stage, walk, augment, merge, write
pub struct DatasetBuilder {
    config: RunConfig,
    pipeline: AugmentationPipeline,
    rng: StdRng,
    progress_manager: Option<ProgressManager>,
}

impl DatasetBuilder {
    /// Build the sprite pipeline for `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn new(config: RunConfig, show_progress: bool) -> Result<Self> {
        config.validate()?;
        let pipeline = AugmentationPipeline::new(sprite_policy(config.keep_size)?, config.count);
        Ok(Self::with_pipeline(config, pipeline, show_progress))
    }

    /// Use a custom pipeline instead of the sprite policy
    pub fn with_pipeline(
        config: RunConfig,
        pipeline: AugmentationPipeline,
        show_progress: bool,
    ) -> Self {
        let rng = config.rng();
        let progress_manager = show_progress.then(ProgressManager::new);
        Self {
            config,
            pipeline,
            rng,
            progress_manager,
        }
    }

    /// Builder configured from command-line arguments
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting configuration is invalid
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        Self::new(cli.run_config(), cli.should_show_progress())
    }

    /// Stage the archive and regenerate the whole training set
    ///
    /// # Errors
    ///
    /// Returns the first fatal failure: archive, I/O, decoding or operator
    /// errors all abort the run
    pub fn run(&mut self) -> Result<RunSummary> {
        let start_time = Instant::now();

        tracing::info!("Unzipping sprites");
        stage_archive(&self.config.archive, &self.config.sprites_dir)?;

        tracing::info!("Structuring training folders");
        prepare_output_root(&self.config.output_dir)?;
        let sprites_dir = self.config.sprites_dir.clone();
        let summary = self.augment_tree(&sprites_dir)?;

        tracing::info!(
            items = summary.items,
            sources = summary.sources,
            variants = summary.variants,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Training data written to {}",
            self.config.output_dir.display()
        );
        Ok(summary)
    }

    /// Augment every item folder below an already extracted `sprites_dir`
    ///
    /// The output root must exist.
    ///
    /// # Errors
    ///
    /// Returns the first fatal failure
    pub fn augment_tree(&mut self, sprites_dir: &Path) -> Result<RunSummary> {
        let folders = discover_item_folders(sprites_dir)?;

        if let Some(ref mut pm) = self.progress_manager {
            pm.initialize(folders.len());
        }

        let mut summary = RunSummary::default();
        for (index, folder) in folders.iter().enumerate() {
            let item = TrainingItem::new(folder, &self.config.output_dir)?;
            let (sources, variants) = self.process_item(index, &item)?;
            summary.items += 1;
            summary.sources += sources;
            summary.variants += variants;
        }

        if let Some(ref pm) = self.progress_manager {
            pm.finish();
        }
        Ok(summary)
    }

    // Returns (source images, variants written)
    fn process_item(&mut self, index: usize, item: &TrainingItem) -> Result<(usize, usize)> {
        tracing::info!("Augmenting image {}", item.label);
        item.create_output_dir()?;

        let sources = load_images(&item.source_dir)?;
        let total = sources.len() * self.pipeline.count();
        if let Some(ref mut pm) = self.progress_manager {
            pm.start_item(index, &item.label, total);
        }

        let mut next_index = 0;
        for source in &sources {
            if self.config.merge_alpha && !source.has_alpha() {
                tracing::info!(
                    file = %source.path.display(),
                    "{} has no alpha channel, writing RGB variants",
                    source.name()
                );
            }
            let variants = self.pipeline.augment(&source.image, &mut self.rng)?;
            let images: Vec<DynamicImage> = variants
                .into_iter()
                .map(|variant| {
                    if self.config.merge_alpha {
                        merge_channels(source, variant)
                    } else {
                        DynamicImage::ImageRgb8(variant)
                    }
                })
                .collect();
            next_index = save_images(&images, &item.output_dir, next_index)?;

            if let Some(ref mut pm) = self.progress_manager {
                pm.update_item(index, next_index);
            }
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.complete_item(index);
        }
        Ok((sources.len(), next_index))
    }
}
