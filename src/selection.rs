//! Pending image selection
//!
//! Ordered set of images picked for the next submission. Identity for
//! deduplication is the (name, size) pair. Every buffered image owns a
//! preview handle for exactly as long as it stays in the buffer.

use crate::error::{DirectoryError, Result};
use base64::Engine;
use school_directory_common::MAX_IMAGES;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Image held in client memory until upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingImage {
    pub name: String,
    pub size: u64,
    content: Arc<[u8]>,
}

impl PendingImage {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let content: Vec<u8> = content.into();
        Self {
            name: name.into(),
            size: content.len() as u64,
            content: content.into(),
        }
    }

    /// Read an image file from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(DirectoryError::FileNotFound(path.display().to_string()));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let content = std::fs::read(path)?;
        Ok(Self::new(name, content))
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// MIME type guessed from the file extension
    pub fn mime_type(&self) -> &'static str {
        let ext = Path::new(&self.name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            _ => "application/octet-stream",
        }
    }

    fn same_identity(&self, other: &PendingImage) -> bool {
        self.name == other.name && self.size == other.size
    }
}

/// Preview of a buffered image, released on drop
#[derive(Debug)]
pub struct PreviewHandle {
    url: String,
    live: Arc<AtomicUsize>,
}

impl PreviewHandle {
    fn acquire(image: &PendingImage, live: &Arc<AtomicUsize>) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image.content());
        live.fetch_add(1, Ordering::SeqCst);
        Self {
            url: format!("data:{};base64,{}", image.mime_type(), encoded),
            live: Arc::clone(live),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Non-fatal buffer warning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferWarning {
    DuplicatesIgnored { count: usize },
}

impl BufferWarning {
    pub fn message(&self) -> &'static str {
        match self {
            BufferWarning::DuplicatesIgnored { .. } => "Some duplicate images were ignored",
        }
    }
}

/// Result of an accepted `add`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOutcome {
    pub accepted: usize,
    pub duplicates_ignored: usize,
}

#[derive(Debug)]
struct BufferedImage {
    image: PendingImage,
    preview: PreviewHandle,
}

/// Client-held image selection
#[derive(Debug, Default)]
pub struct ImageSelectionBuffer {
    entries: Vec<BufferedImage>,
    warning: Option<BufferWarning>,
    live_previews: Arc<AtomicUsize>,
}

impl ImageSelectionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a batch of candidates.
    ///
    /// A batch that would push the buffer past the limit is rejected whole.
    /// Otherwise candidates matching a buffered image (or an earlier
    /// candidate of the same batch) are dropped with a warning.
    pub fn add(&mut self, candidates: Vec<PendingImage>) -> Result<AddOutcome> {
        if self.entries.len() + candidates.len() > MAX_IMAGES {
            return Err(DirectoryError::LimitExceeded {
                current: self.entries.len(),
                incoming: candidates.len(),
            });
        }

        let mut accepted = 0;
        let mut duplicates_ignored = 0;
        for candidate in candidates {
            if self.contains(&candidate) {
                duplicates_ignored += 1;
                continue;
            }
            let preview = PreviewHandle::acquire(&candidate, &self.live_previews);
            self.entries.push(BufferedImage {
                image: candidate,
                preview,
            });
            accepted += 1;
        }

        self.warning = if duplicates_ignored > 0 {
            Some(BufferWarning::DuplicatesIgnored {
                count: duplicates_ignored,
            })
        } else {
            None
        };

        Ok(AddOutcome {
            accepted,
            duplicates_ignored,
        })
    }

    /// Remove one image, releasing its preview and clearing any warning
    pub fn remove(&mut self, index: usize) -> Option<PendingImage> {
        if index >= self.entries.len() {
            return None;
        }
        self.warning = None;
        let BufferedImage { image, preview } = self.entries.remove(index);
        drop(preview);
        Some(image)
    }

    /// Empty the buffer, releasing all previews
    pub fn clear(&mut self) {
        self.entries.clear();
        self.warning = None;
    }

    pub fn contains(&self, image: &PendingImage) -> bool {
        self.entries.iter().any(|e| e.image.same_identity(image))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn warning(&self) -> Option<BufferWarning> {
        self.warning
    }

    pub fn images(&self) -> impl Iterator<Item = &PendingImage> {
        self.entries.iter().map(|e| &e.image)
    }

    /// Owned copy of the selection in order; content is shared, not copied
    pub fn snapshot(&self) -> Vec<PendingImage> {
        self.images().cloned().collect()
    }

    pub fn previews(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.preview.url())
    }

    /// Number of preview handles currently held
    pub fn live_previews(&self) -> usize {
        self.live_previews.load(Ordering::SeqCst)
    }
}
