use crate::validate::ValidationErrors;
use school_directory_common::MAX_IMAGES;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("Maximum {} images allowed ({current} selected, {incoming} more requested)", MAX_IMAGES)]
    LimitExceeded { current: usize, incoming: usize },

    #[error("At least one image is required")]
    EmptySelection,

    #[error("A submission is already in progress")]
    SubmissionInProgress,

    #[error("{0}")]
    UploadFailed(String),

    #[error("{0}")]
    RecordCreationFailed(String),

    #[error("{0}")]
    FetchFailed(String),

    #[error("Image storage error: {0}")]
    Storage(String),

    #[error("Image file not found: {0}")]
    FileNotFound(String),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Payload error: {0}")]
    Payload(#[from] school_directory_common::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl DirectoryError {
    /// Whether the user can correct the input and submit again
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DirectoryError::Validation(_)
                | DirectoryError::LimitExceeded { .. }
                | DirectoryError::EmptySelection
                | DirectoryError::UploadFailed(_)
                | DirectoryError::RecordCreationFailed(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DirectoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_errors_show_server_message() {
        let err = DirectoryError::UploadFailed("Failed to upload images".into());
        assert_eq!(err.to_string(), "Failed to upload images");
        let err = DirectoryError::RecordCreationFailed("duplicate entry".into());
        assert_eq!(err.to_string(), "duplicate entry");
    }

    #[test]
    fn test_limit_message() {
        let err = DirectoryError::LimitExceeded { current: 8, incoming: 3 };
        assert!(err.to_string().starts_with("Maximum 10 images allowed"));
    }

    #[test]
    fn test_retryable() {
        assert!(DirectoryError::EmptySelection.is_retryable());
        assert!(DirectoryError::UploadFailed(String::new()).is_retryable());
        assert!(!DirectoryError::FetchFailed(String::new()).is_retryable());
        assert!(!DirectoryError::Config(String::new()).is_retryable());
    }
}
