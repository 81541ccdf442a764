use super::{ApiError, ApiResult, SchoolApi};
use crate::error::Result;
use crate::selection::PendingImage;
use crate::server::{
    DiskStorage, ImageStorage, SchoolRepository, SchoolService, ServiceError, SqliteRepository,
    UploadedFile,
};
use school_directory_common::{ImageReference, NewSchool, Record};
use std::path::Path;

/// School endpoints served in-process
pub struct LocalApi<R = SqliteRepository, S = DiskStorage> {
    service: SchoolService<R, S>,
}

impl LocalApi {
    /// SQLite file plus an upload directory
    pub fn open(database: &Path, upload_dir: &Path) -> Result<Self> {
        let repo = SqliteRepository::open(database)?;
        let storage = DiskStorage::new(upload_dir)?;
        Ok(Self::new(SchoolService::new(repo, storage)))
    }
}

impl<R: SchoolRepository, S: ImageStorage> LocalApi<R, S> {
    pub fn new(service: SchoolService<R, S>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &SchoolService<R, S> {
        &self.service
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::new(Some(err.status()), err.to_string())
    }
}

impl<R: SchoolRepository, S: ImageStorage> SchoolApi for LocalApi<R, S> {
    async fn upload_images(&self, images: &[PendingImage]) -> ApiResult<Vec<ImageReference>> {
        let files: Vec<UploadedFile<'_>> = images
            .iter()
            .map(|image| UploadedFile {
                name: &image.name,
                content: image.content(),
            })
            .collect();
        Ok(self.service.upload(&files)?.urls)
    }

    async fn create_school(&self, school: &NewSchool) -> ApiResult<String> {
        Ok(self.service.create(school)?.message)
    }

    async fn fetch_schools(&self) -> ApiResult<Vec<Record>> {
        Ok(self.service.list()?)
    }
}
