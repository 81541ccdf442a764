use crate::error::{DirectoryError, Result};
use rand::Rng;
use school_directory_common::ImageReference;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Image storage backend
pub trait ImageStorage {
    /// Persist one file and return its reference
    fn store(&self, original_name: &str, content: &[u8]) -> Result<ImageReference>;

    /// Remove a stored file. Returns false when nothing was there.
    fn delete(&self, reference: &ImageReference) -> Result<bool>;
}

/// Files under a local directory, referenced by generated filename
pub struct DiskStorage {
    dir: PathBuf,
}

impl DiskStorage {
    /// Use `dir`, creating it if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, reference: &ImageReference) -> Result<PathBuf> {
        let name = reference.as_str();
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(DirectoryError::Storage(format!(
                "invalid image reference: {}",
                name
            )));
        }
        Ok(self.dir.join(name))
    }
}

/// `<unix-millis>-<random><.ext>`, keeping the original extension
fn unique_name(original_name: &str) -> String {
    let ext = Path::new(original_name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("{}-{}{}", chrono::Utc::now().timestamp_millis(), suffix, ext)
}

impl ImageStorage for DiskStorage {
    fn store(&self, original_name: &str, content: &[u8]) -> Result<ImageReference> {
        let name = unique_name(original_name);
        let path = self.dir.join(&name);
        std::fs::write(&path, content)?;
        debug!(original = original_name, stored = %name, "image stored");
        Ok(ImageReference::new(name))
    }

    fn delete(&self, reference: &ImageReference) -> Result<bool> {
        let path = self.path_of(reference)?;
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_unique_name_keeps_extension() {
        let name = unique_name("photo.JPG");
        assert!(name.ends_with(".JPG"));
        let (millis, rest) = name.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert!(rest.trim_end_matches(".JPG").parse::<u32>().is_ok());

        assert!(!unique_name("noext").contains('.'));
    }

    #[test]
    fn test_store_and_delete() {
        let dir = tempdir().expect("Failed to create temp dir");
        let storage = DiskStorage::new(dir.path().join("schoolImages")).unwrap();

        let reference = storage.store("a.png", b"png-bytes").unwrap();
        let path = storage.path_of(&reference).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"png-bytes");

        assert!(storage.delete(&reference).unwrap());
        assert!(!path.exists());
        assert!(!storage.delete(&reference).unwrap());
    }

    #[test]
    fn test_rejects_traversal() {
        let dir = tempdir().expect("Failed to create temp dir");
        let storage = DiskStorage::new(dir.path()).unwrap();
        let result = storage.delete(&ImageReference::new("../secret.txt"));
        assert!(matches!(result, Err(DirectoryError::Storage(_))));
    }
}
