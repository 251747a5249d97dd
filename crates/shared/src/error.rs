//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or empty required field.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Malformed request, e.g. no file attached.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Upload is not an accepted image type.
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Upload exceeds the configured byte ceiling.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Resource not found (including malformed identifiers).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Disk or object store failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::BadRequest(_) | Self::UnsupportedMediaType(_) => 400,
            Self::NotFound(_) => 404,
            Self::PayloadTooLarge(_) => 413,
            Self::Storage(_) | Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::UnsupportedMediaType(_) => "UNSUPPORTED_MEDIA_TYPE",
            Self::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Message safe to show to API clients.
    ///
    /// Server-side failures collapse to a generic message.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(msg)
            | Self::BadRequest(msg)
            | Self::UnsupportedMediaType(msg)
            | Self::PayloadTooLarge(msg)
            | Self::NotFound(msg) => msg.clone(),
            Self::Storage(_) | Self::Database(_) => "Server error".to_string(),
        }
    }

    /// Whether this error is the server's fault.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
