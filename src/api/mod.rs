//! Transport seam between the client core and the school endpoints
//!
//! - `POST /schools/images`: batch image upload
//! - `POST /schools`: record creation
//! - `GET /schools`: full listing

mod http;
mod local;

pub use http::HttpApi;
pub use local::LocalApi;

use crate::selection::PendingImage;
use school_directory_common::{ImageReference, NewSchool, Record};
use std::fmt;

/// Failed remote call: HTTP status (when one was received) and the
/// server's `{error}` message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} ({})", self.message, status),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// School endpoints as seen by the client
#[allow(async_fn_in_trait)]
pub trait SchoolApi {
    /// Upload the whole selection in one batch. References come back in
    /// submission order.
    async fn upload_images(&self, images: &[PendingImage]) -> ApiResult<Vec<ImageReference>>;

    /// Create a record referencing already-uploaded images
    async fn create_school(&self, school: &NewSchool) -> ApiResult<String>;

    /// Fetch every record, most recent first
    async fn fetch_schools(&self) -> ApiResult<Vec<Record>>;
}

impl<T: SchoolApi> SchoolApi for &T {
    async fn upload_images(&self, images: &[PendingImage]) -> ApiResult<Vec<ImageReference>> {
        (**self).upload_images(images).await
    }

    async fn create_school(&self, school: &NewSchool) -> ApiResult<String> {
        (**self).create_school(school).await
    }

    async fn fetch_schools(&self) -> ApiResult<Vec<Record>> {
        (**self).fetch_schools().await
    }
}

/// Either transport, picked from configuration
pub enum Backend {
    Http(HttpApi),
    Local(LocalApi),
}

impl SchoolApi for Backend {
    async fn upload_images(&self, images: &[PendingImage]) -> ApiResult<Vec<ImageReference>> {
        match self {
            Backend::Http(api) => api.upload_images(images).await,
            Backend::Local(api) => api.upload_images(images).await,
        }
    }

    async fn create_school(&self, school: &NewSchool) -> ApiResult<String> {
        match self {
            Backend::Http(api) => api.create_school(school).await,
            Backend::Local(api) => api.create_school(school).await,
        }
    }

    async fn fetch_schools(&self) -> ApiResult<Vec<Record>> {
        match self {
            Backend::Http(api) => api.fetch_schools().await,
            Backend::Local(api) => api.fetch_schools().await,
        }
    }
}
