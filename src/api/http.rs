use super::{ApiError, ApiResult, SchoolApi};
use crate::selection::PendingImage;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use school_directory_common::{
    decode_records, error_message, ImageReference, MessageBody, NewSchool, Record, UploadResponse,
};
use std::time::Duration;
use tracing::debug;

/// Remote school endpoints over HTTP
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::new(None, e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Use a preconfigured client
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Turn a non-success response into an `ApiError` carrying the `{error}`
/// message, or `fallback` when the body has none
async fn failure(response: Response, fallback: &str) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| fallback.to_string());
    ApiError::new(Some(status), message)
}

fn transport(err: reqwest::Error) -> ApiError {
    ApiError::new(err.status().map(|s| s.as_u16()), err.to_string())
}

impl SchoolApi for HttpApi {
    async fn upload_images(&self, images: &[PendingImage]) -> ApiResult<Vec<ImageReference>> {
        let mut form = Form::new();
        for image in images {
            let part = Part::bytes(image.content().to_vec())
                .file_name(image.name.clone())
                .mime_str(image.mime_type())
                .map_err(transport)?;
            form = form.part("images", part);
        }

        debug!(count = images.len(), "uploading image batch");
        let response = self
            .client
            .post(self.url("/schools/images"))
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(failure(response, "Image upload failed").await);
        }

        let body: UploadResponse = response.json().await.map_err(transport)?;
        Ok(body.urls)
    }

    async fn create_school(&self, school: &NewSchool) -> ApiResult<String> {
        let response = self
            .client
            .post(self.url("/schools"))
            .json(school)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(failure(response, "Failed to add school").await);
        }

        let body: MessageBody = response.json().await.map_err(transport)?;
        Ok(body.message)
    }

    async fn fetch_schools(&self) -> ApiResult<Vec<Record>> {
        let response = self
            .client
            .get(self.url("/schools"))
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(failure(response, "Failed to fetch schools").await);
        }

        let body = response.text().await.map_err(transport)?;
        decode_records(&body).map_err(|e| ApiError::new(None, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let api = HttpApi::new("http://localhost:3000/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(api.url("/schools"), "http://localhost:3000/api/schools");
    }
}
