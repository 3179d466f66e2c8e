//! Staging the sprite archive into a fresh working directory

use crate::io::error::{AugmentError, Result, WithPath};
use std::fs::File;
use std::path::Path;
use zip::ZipArchive;

/// Extract every entry of the zip archive at `archive` below `dest`
///
/// # Errors
///
/// Returns an error if the archive is missing, corrupt, or cannot be written out
pub fn extract(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive).with_path(archive, "open archive")?;
    let mut zip = ZipArchive::new(file).map_err(|source| AugmentError::Archive {
        path: archive.to_path_buf(),
        source,
    })?;
    tracing::debug!(entries = zip.len(), archive = %archive.display(), "extracting");
    zip.extract(dest).map_err(|source| AugmentError::Archive {
        path: archive.to_path_buf(),
        source,
    })
}

/// Delete `dest` if it exists, then extract `archive` into it
///
/// # Errors
///
/// Returns an error if the old directory cannot be removed or extraction fails
pub fn stage_archive(archive: &Path, dest: &Path) -> Result<()> {
    if dest.exists() {
        std::fs::remove_dir_all(dest).with_path(dest, "remove directory")?;
    }
    std::fs::create_dir_all(dest).with_path(dest, "create directory")?;
    extract(archive, dest)
}
