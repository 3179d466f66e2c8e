//! Progress display across item folders with a rolling window of per-item bars

use crate::io::configuration::MAX_INDIVIDUAL_PROGRESS_BARS;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::LazyLock;

/// Coordinates progress display for one augmentation run
///
/// A batch bar counts finished item folders; below it the most recent items
/// each show how many of their variants have been written.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    batch_bar: Option<ProgressBar>,
    item_bars: Vec<ProgressBar>,
    /// Stores (`label`, `written`, `total`) per item for the rolling window
    item_states: Vec<(String, usize, usize)>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

static ITEM_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{msg} [{bar:30.cyan/blue}] {prefix}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] Items: [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

impl ProgressManager {
    /// Create a new progress manager
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            batch_bar: None,
            item_bars: Vec::new(),
            item_states: Vec::new(),
        }
    }

    /// Create the bars for `item_count` item folders
    pub fn initialize(&mut self, item_count: usize) {
        let batch_bar = ProgressBar::new(item_count as u64);
        batch_bar.set_style(BATCH_STYLE.clone());
        self.batch_bar = Some(self.multi_progress.add(batch_bar));

        for _ in 0..item_count.min(MAX_INDIVIDUAL_PROGRESS_BARS) {
            let pb = ProgressBar::new(0);
            pb.set_style(ITEM_STYLE.clone());
            self.item_bars.push(self.multi_progress.add(pb));
        }
    }

    /// Register an item expected to produce `total` variants
    pub fn start_item(&mut self, index: usize, label: &str, total: usize) {
        if index >= self.item_states.len() {
            self.item_states.resize(index + 1, (String::new(), 0, 0));
        }
        if let Some(state) = self.item_states.get_mut(index) {
            *state = (label.to_string(), 0, total);
        }
        self.update_bars();
    }

    /// Report how many variants of the item have been written so far
    pub fn update_item(&mut self, index: usize, written: usize) {
        if let Some(state) = self.item_states.get_mut(index) {
            state.1 = written;
        }
        self.update_bars();
    }

    /// Mark an item as completed and advance the batch bar
    pub fn complete_item(&mut self, index: usize) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.inc(1);
        }
        if let Some(state) = self.item_states.get_mut(index) {
            state.0 = format!("✓ {}", state.0);
            state.1 = state.2;
        }
        self.update_bars();
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.finish_with_message("All items augmented");
        }
        let _ = self.multi_progress.clear();
    }

    /// Number of per-item bars in use
    pub const fn item_bar_count(&self) -> usize {
        self.item_bars.len()
    }

    /// Show the last N registered items in the per-item bars
    fn update_bars(&self) {
        let active: Vec<_> = self
            .item_states
            .iter()
            .filter(|(label, _, _)| !label.is_empty())
            .collect();
        let start = active.len().saturating_sub(MAX_INDIVIDUAL_PROGRESS_BARS);
        let visible = active.get(start..).unwrap_or(&[]);

        for (bar, (label, written, total)) in self.item_bars.iter().zip(visible) {
            bar.set_length(*total as u64);
            bar.set_position(*written as u64);
            let width = total.to_string().len();
            bar.set_message(format!("{written:>width$}/{total}"));
            bar.set_prefix(label.clone());
        }

        for bar in self.item_bars.iter().skip(visible.len()) {
            bar.set_length(0);
            bar.set_position(0);
            bar.set_message(String::new());
            bar.set_prefix(String::new());
        }
    }
}
