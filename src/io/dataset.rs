//! Walking the group/item sprite tree and laying out the training set

use crate::io::error::{Result, WithPath, invalid_parameter};
use std::path::{Path, PathBuf};

/// Metadata folder some archivers add next to the real content
const ARCHIVE_METADATA_DIR: &str = "__MACOSX";

/// Whether `path` names a dot-file or archiver metadata that should be ignored
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .is_some_and(|name| name.starts_with('.') || name == ARCHIVE_METADATA_DIR)
}

/// Immediate visible subdirectories of `path`, sorted
///
/// # Errors
///
/// Returns an error if `path` cannot be listed
pub fn list_subdirectories(path: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(path).with_path(path, "list directory")? {
        let entry_path = entry.with_path(path, "list directory")?.path();
        if entry_path.is_dir() && !is_hidden(&entry_path) {
            dirs.push(entry_path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Item folders two levels below `root` (group, then item)
///
/// # Errors
///
/// Returns an error if `root` or any group folder cannot be listed
pub fn discover_item_folders(root: &Path) -> Result<Vec<PathBuf>> {
    let mut items = Vec::new();
    for group in list_subdirectories(root)? {
        items.extend(list_subdirectories(&group)?);
    }
    Ok(items)
}

/// Delete `path` if present and create it empty
///
/// # Errors
///
/// Returns an error if the directory cannot be removed or created
pub fn prepare_output_root(path: &Path) -> Result<()> {
    if path.exists() {
        std::fs::remove_dir_all(path).with_path(path, "remove directory")?;
    }
    std::fs::create_dir_all(path).with_path(path, "create directory")
}

/// One labelled folder of source images and where its variants go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingItem {
    /// Label shared by every image in the folder (the folder name)
    pub label: String,
    /// Folder holding the source images
    pub source_dir: PathBuf,
    /// Flat output folder `<output root>/<label>`
    pub output_dir: PathBuf,
}

impl TrainingItem {
    /// Describe the item stored in `source_dir`, mirrored under `output_root`
    ///
    /// # Errors
    ///
    /// Returns an error if `source_dir` has no final path component
    pub fn new(source_dir: &Path, output_root: &Path) -> Result<Self> {
        let label = source_dir
            .file_name()
            .ok_or_else(|| {
                invalid_parameter(
                    "item folder",
                    &source_dir.display(),
                    &"has no folder name to use as label",
                )
            })?
            .to_string_lossy()
            .into_owned();
        Ok(Self {
            output_dir: output_root.join(&label),
            source_dir: source_dir.to_path_buf(),
            label,
        })
    }

    /// Create the output folder
    ///
    /// Two items with the same label in different groups collide here and
    /// the run stops instead of mixing their variants.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder already exists or cannot be created
    pub fn create_output_dir(&self) -> Result<()> {
        std::fs::create_dir(&self.output_dir).with_path(&self.output_dir, "create item directory")
    }
}
