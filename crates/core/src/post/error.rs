//! Post operation errors.

use thiserror::Error;

use picpost_shared::AppError;

use super::types::PostId;
use crate::storage::StorageError;

/// Post operation errors.
#[derive(Debug, Error)]
pub enum PostError {
    /// Missing or empty required field.
    #[error("validation failed: {0}")]
    Validation(String),

    /// No file attached under the image field.
    #[error("no image attached")]
    MissingImage,

    /// Post not found.
    #[error("post not found: {0}")]
    NotFound(PostId),

    /// Identifier is not in the store's format.
    #[error("invalid post id: {0}")]
    InvalidIdentifier(String),

    /// Image backend failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl PostError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}

impl From<PostError> for AppError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::Validation(msg) => Self::Validation(msg),
            PostError::MissingImage => Self::BadRequest(
                "No image uploaded. Include an image file in the \"image\" field.".to_string(),
            ),
            PostError::NotFound(_) | PostError::InvalidIdentifier(_) => {
                Self::NotFound("Post not found".to_string())
            }
            PostError::Storage(StorageError::FileTooLarge { max, .. }) => {
                Self::PayloadTooLarge(format!("Image exceeds the {max} byte limit"))
            }
            PostError::Storage(e @ StorageError::UnsupportedType { .. }) => {
                Self::UnsupportedMediaType(e.to_string())
            }
            PostError::Storage(e) => Self::Storage(e.to_string()),
            PostError::Repository(msg) => Self::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_4xx() {
        let cases = [
            (PostError::validation("title is required"), 400),
            (PostError::MissingImage, 400),
            (PostError::NotFound(PostId::new()), 404),
            (PostError::InvalidIdentifier("abc".into()), 404),
            (StorageError::unsupported_type("a.exe", "application/x-msdownload").into(), 400),
            (StorageError::file_too_large(11, 10).into(), 413),
        ];

        for (err, status) in cases {
            let app: AppError = err.into();
            assert_eq!(app.status_code(), status, "{app:?}");
        }
    }

    #[test]
    fn test_server_errors_map_to_500() {
        let app: AppError = PostError::repository("pool timed out").into();
        assert_eq!(app.status_code(), 500);

        let app: AppError = PostError::from(StorageError::operation("disk full")).into();
        assert_eq!(app.status_code(), 500);
        assert_eq!(app.public_message(), "Server error");
    }
}
