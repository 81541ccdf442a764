//! Image file discovery for the `add` command

use crate::error::{DirectoryError, Result};
use crate::selection::PendingImage;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}

/// Image files directly inside `folder`, sorted by file name
pub fn scan_folder(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(DirectoryError::FileNotFound(folder.display().to_string()));
    }

    let mut images: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .map(|ext| is_image_extension(&ext.to_string_lossy()))
                .unwrap_or(false)
        })
        .collect();

    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(images)
}

/// Read explicit paths plus everything found in `folder`
pub fn collect_images(paths: &[PathBuf], folder: Option<&Path>) -> Result<Vec<PendingImage>> {
    let mut all: Vec<PathBuf> = paths.to_vec();
    if let Some(folder) = folder {
        all.extend(scan_folder(folder)?);
    }
    all.iter().map(|p| PendingImage::from_path(p)).collect()
}
