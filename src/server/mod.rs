//! In-process implementation of the school endpoints
//!
//! Request validation and status mapping live here; persistence and file
//! storage sit behind `SchoolRepository` and `ImageStorage`.

mod repository;
mod storage;

pub use repository::{SchoolRepository, SqliteRepository, StoredSchool};
pub use storage::{DiskStorage, ImageStorage};

use school_directory_common::{
    encode_image_column, ImageReference, MessageBody, NewSchool, Record, UploadResponse,
    MAX_IMAGES,
};
use thiserror::Error;
use tracing::{error, info, warn};

/// Endpoint failure with its HTTP status
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::Internal(_) => 500,
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// One part of a multipart upload
#[derive(Debug, Clone, Copy)]
pub struct UploadedFile<'a> {
    pub name: &'a str,
    pub content: &'a [u8],
}

/// School endpoints over a repository and an image store
pub struct SchoolService<R, S> {
    repo: R,
    storage: S,
}

impl<R: SchoolRepository, S: ImageStorage> SchoolService<R, S> {
    pub fn new(repo: R, storage: S) -> Self {
        Self { repo, storage }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// `POST /schools/images`
    pub fn upload(&self, files: &[UploadedFile<'_>]) -> ServiceResult<UploadResponse> {
        if files.is_empty() {
            return Err(ServiceError::BadRequest("No files uploaded".into()));
        }
        if files.len() > MAX_IMAGES {
            return Err(ServiceError::BadRequest(format!(
                "Too many files: at most {} images per upload",
                MAX_IMAGES
            )));
        }

        let mut stored = Vec::with_capacity(files.len());
        for file in files {
            match self.storage.store(file.name, file.content) {
                Ok(reference) => stored.push(reference),
                Err(e) => {
                    error!(file = file.name, "upload failed: {}", e);
                    self.discard(&stored);
                    return Err(ServiceError::Internal("Failed to upload images".into()));
                }
            }
        }

        Ok(UploadResponse { urls: stored })
    }

    /// Drop files stored earlier in a batch that did not complete
    fn discard(&self, stored: &[ImageReference]) {
        for reference in stored {
            if let Err(e) = self.storage.delete(reference) {
                warn!(image = %reference, "could not remove partial upload: {}", e);
            }
        }
    }

    /// `POST /schools`
    pub fn create(&self, school: &NewSchool) -> ServiceResult<MessageBody> {
        if school.fields.has_missing() || school.images.is_empty() {
            return Err(ServiceError::BadRequest(
                "All fields and at least one image are required.".into(),
            ));
        }

        let column = encode_image_column(&school.images)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        let id = self.repo.insert(&school.fields, &column).map_err(|e| {
            error!("insert failed: {}", e);
            ServiceError::Internal(e.to_string())
        })?;

        info!(id, name = %school.fields.name, images = school.images.len(), "school added");
        Ok(MessageBody {
            message: "School added successfully".into(),
        })
    }

    /// `GET /schools`
    pub fn list(&self) -> ServiceResult<Vec<Record>> {
        let rows = self.repo.list_desc().map_err(|e| {
            error!("fetch failed: {}", e);
            ServiceError::Internal("Failed to fetch schools".into())
        })?;
        Ok(rows.into_iter().map(StoredSchool::into_record).collect())
    }

    /// Administrative removal of stored images. Missing files are skipped.
    pub fn delete_images(&self, images: &[ImageReference]) -> ServiceResult<MessageBody> {
        for reference in images {
            match self.storage.delete(reference) {
                Ok(_) => {}
                Err(crate::error::DirectoryError::Storage(msg)) => {
                    return Err(ServiceError::BadRequest(msg));
                }
                Err(e) => {
                    error!(image = %reference, "delete failed: {}", e);
                    return Err(ServiceError::Internal("Failed to delete images".into()));
                }
            }
        }
        Ok(MessageBody {
            message: "Images deleted".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use school_directory_common::SchoolFields;
    use tempfile::{tempdir, TempDir};

    fn service() -> (TempDir, SchoolService<SqliteRepository, DiskStorage>) {
        let dir = tempdir().expect("Failed to create temp dir");
        let storage = DiskStorage::new(dir.path().join("schoolImages")).unwrap();
        let repo = SqliteRepository::open_in_memory().unwrap();
        (dir, SchoolService::new(repo, storage))
    }

    fn fields() -> SchoolFields {
        SchoolFields {
            name: "Sunrise".into(),
            address: "1 Main".into(),
            city: "Pune".into(),
            state: "Maharashtra".into(),
            contact: "9876543210".into(),
            email_id: "a@b.in".into(),
        }
    }

    #[test]
    fn test_upload_preserves_order() {
        let (_dir, service) = service();
        let files = [
            UploadedFile { name: "a.jpg", content: b"a" },
            UploadedFile { name: "b.png", content: b"b" },
        ];
        let response = service.upload(&files).unwrap();
        assert_eq!(response.urls.len(), 2);
        assert!(response.urls[0].as_str().ends_with(".jpg"));
        assert!(response.urls[1].as_str().ends_with(".png"));
    }

    #[test]
    fn test_upload_rejects_empty_and_oversized() {
        let (_dir, service) = service();
        let err = service.upload(&[]).unwrap_err();
        assert_eq!(err.status(), 400);
        assert_eq!(err.to_string(), "No files uploaded");

        let files: Vec<UploadedFile> = (0..11)
            .map(|_| UploadedFile { name: "x.jpg", content: b"x" })
            .collect();
        assert_eq!(service.upload(&files).unwrap_err().status(), 400);
        assert_eq!(std::fs::read_dir(service.storage().dir()).unwrap().count(), 0);
    }

    #[test]
    fn test_create_requires_fields_and_images() {
        let (_dir, service) = service();
        let mut school = NewSchool {
            fields: fields(),
            images: vec![],
        };
        let err = service.create(&school).unwrap_err();
        assert_eq!(err.status(), 400);

        school.images.push(ImageReference::new("x.jpg"));
        school.fields.email_id.clear();
        assert_eq!(service.create(&school).unwrap_err().status(), 400);

        school.fields = fields();
        assert_eq!(
            service.create(&school).unwrap().message,
            "School added successfully"
        );
        let records = service.list().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].images, vec![ImageReference::new("x.jpg")]);
    }

    #[test]
    fn test_delete_images() {
        let (_dir, service) = service();
        let response = service
            .upload(&[UploadedFile { name: "a.jpg", content: b"a" }])
            .unwrap();
        let path = service.storage().path_of(&response.urls[0]).unwrap();
        assert!(path.exists());

        let mut images = response.urls.clone();
        images.push(ImageReference::new("missing.jpg"));
        assert_eq!(service.delete_images(&images).unwrap().message, "Images deleted");
        assert!(!path.exists());

        let err = service
            .delete_images(&[ImageReference::new("../etc/passwd")])
            .unwrap_err();
        assert_eq!(err.status(), 400);
    }
}
