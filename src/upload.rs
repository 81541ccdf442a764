//! Two-phase submit: upload the selection, then create the record
//!
//! Phase 2 only starts after phase 1 reports success. A phase-2 failure
//! leaves the uploaded images in storage; that orphaned state is logged
//! and left alone.

use crate::api::SchoolApi;
use crate::error::{DirectoryError, Result};
use crate::selection::ImageSelectionBuffer;
use school_directory_common::{ImageReference, NewSchool, SchoolFields};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of a completed submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted {
    pub images: Vec<ImageReference>,
    pub message: String,
}

/// Listing reload deferred after a successful submit
#[must_use = "the listing is only refreshed once this is awaited or settled"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledRefresh {
    due: Instant,
}

impl ScheduledRefresh {
    pub fn after(delay: Duration) -> Self {
        Self {
            due: Instant::now() + delay,
        }
    }

    pub fn due(&self) -> Instant {
        self.due
    }

    /// Wait until the refresh is due
    pub async fn wait(self) {
        tokio::time::sleep_until(self.due).await;
    }
}

pub struct UploadCoordinator<A> {
    api: A,
}

impl<A: SchoolApi> UploadCoordinator<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Upload every buffered image, then create the record referencing
    /// them in submission order.
    pub async fn submit(
        &self,
        fields: &SchoolFields,
        buffer: &ImageSelectionBuffer,
    ) -> Result<Submitted> {
        if buffer.is_empty() {
            return Err(DirectoryError::EmptySelection);
        }

        let images = buffer.snapshot();
        debug!(count = images.len(), "phase 1: uploading images");
        let references = self
            .api
            .upload_images(&images)
            .await
            .map_err(|e| DirectoryError::UploadFailed(e.message))?;

        if references.is_empty() {
            return Err(DirectoryError::UploadFailed(
                "Image upload returned no references".into(),
            ));
        }

        let school = NewSchool {
            fields: fields.clone(),
            images: references,
        };

        debug!(name = %school.fields.name, "phase 2: creating record");
        match self.api.create_school(&school).await {
            Ok(message) => {
                info!(name = %school.fields.name, images = school.images.len(), "school submitted");
                Ok(Submitted {
                    images: school.images,
                    message,
                })
            }
            Err(e) => {
                let orphaned: Vec<&str> = school.images.iter().map(|r| r.as_str()).collect();
                warn!(?orphaned, "record creation failed after upload; images left in storage");
                Err(DirectoryError::RecordCreationFailed(e.message))
            }
        }
    }
}
