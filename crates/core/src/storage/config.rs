//! Storage configuration types.

use std::path::{Path, PathBuf};

use picpost_shared::{StorageKind, StorageSettings};

use super::error::StorageError;

/// Image extensions accepted by the local backend.
const ACCEPTED_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif"];

/// Image MIME types accepted by the local backend.
const ACCEPTED_MIME_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/gif"];

/// Storage provider configuration.
#[derive(Debug, Clone)]
pub enum StorageProvider {
    /// S3-compatible storage: Cloudflare R2, Supabase, AWS S3, DigitalOcean Spaces
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// AWS access key ID.
        access_key_id: String,
        /// AWS secret access key.
        secret_access_key: String,
        /// AWS region.
        region: String,
        /// Base URL clients fetch objects from.
        public_base_url: String,
        /// Key prefix every object is written under.
        folder: String,
    },
    /// Local filesystem served as static files.
    LocalFs {
        /// Root directory path.
        root: PathBuf,
        /// URL prefix the root is mounted under.
        public_prefix: String,
    },
}

impl StorageProvider {
    /// Create S3-compatible provider (Cloudflare R2, Supabase, AWS S3).
    #[must_use]
    pub fn s3(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
        public_base_url: impl Into<String>,
        folder: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
            public_base_url: public_base_url.into(),
            folder: folder.into(),
        }
    }

    /// Create local filesystem provider.
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self::LocalFs {
            root: root.into(),
            public_prefix: public_prefix.into(),
        }
    }

    /// Get the provider name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::LocalFs { .. } => "local",
        }
    }
}

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Maximum file size in bytes.
    pub max_file_size: u64,
}

impl StorageConfig {
    /// Default max file size: 10MB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

    /// Create a new storage config with default settings.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Set maximum file size.
    #[must_use]
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Build from the application settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `s3` is selected without an `s3` section, or if
    /// the local public prefix is not a root-relative path below `/`.
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, StorageError> {
        let provider = match settings.provider {
            StorageKind::Local => {
                validate_public_prefix(&settings.public_prefix)?;
                StorageProvider::local_fs(settings.root.clone(), settings.public_prefix.clone())
            }
            StorageKind::S3 => {
                let s3 = settings.s3.as_ref().ok_or_else(|| {
                    StorageError::configuration("storage.s3 section is required for provider s3")
                })?;
                StorageProvider::s3(
                    s3.endpoint.clone(),
                    s3.bucket.clone(),
                    s3.access_key_id.clone(),
                    s3.secret_access_key.clone(),
                    s3.region.clone(),
                    s3.public_base_url.clone(),
                    settings.folder.clone(),
                )
            }
        };

        Ok(Self::new(provider).with_max_file_size(settings.max_file_size))
    }
}

/// Require a mount point like `/uploads`: leading slash, and not the site root.
///
/// # Errors
///
/// Returns [`StorageError::Configuration`] for `""`, `"/"` or a relative prefix.
pub fn validate_public_prefix(prefix: &str) -> Result<(), StorageError> {
    if !prefix.starts_with('/') || prefix.trim_matches('/').is_empty() {
        return Err(StorageError::configuration(format!(
            "storage.public_prefix must be a path below the root such as \"/uploads\", got {prefix:?}"
        )));
    }
    Ok(())
}

/// Lowercased extension of `filename`, without the dot.
#[must_use]
pub fn file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(str::to_ascii_lowercase)
}

/// Check both the extension and the declared MIME type against the image allowlist.
///
/// # Errors
///
/// Returns [`StorageError::UnsupportedType`] if either one is outside the list.
pub fn check_image_type(filename: &str, mime_type: &str) -> Result<(), StorageError> {
    let ext_ok = file_extension(filename).is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()));
    let mime = mime_type.trim().to_ascii_lowercase();
    let mime_ok = ACCEPTED_MIME_TYPES.contains(&mime.as_str());

    if ext_ok && mime_ok {
        Ok(())
    } else {
        Err(StorageError::unsupported_type(filename, mime_type))
    }
}
