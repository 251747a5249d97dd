//! Image backend abstraction and construction.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use opendal::{Operator, services};

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;
use super::local::LocalImageBackend;
use super::object::ObjectImageBackend;

/// An uploaded image, as received from the client.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Multipart field the file arrived under.
    pub field_name: String,
    /// Client-supplied filename.
    pub filename: String,
    /// Client-declared MIME type.
    pub content_type: String,
    /// Raw bytes.
    pub data: Bytes,
}

impl ImageUpload {
    /// Size of the upload in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Where an image ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// URL clients fetch the image from.
    pub public_url: String,
    /// Backend-internal key used for deletion.
    pub key: String,
}

/// A place images can be written to and removed from.
///
/// Exactly one implementation is active per process, chosen at startup.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// Persist the image and return its public URL and key.
    async fn store(&self, upload: ImageUpload) -> Result<StoredImage, StorageError>;

    /// Remove the bytes behind `key`. Succeeds if they are already gone.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Whether `public_url` points at bytes held by this backend.
    fn owns(&self, public_url: &str) -> bool;

    /// Provider name for logs.
    fn name(&self) -> &'static str;
}

/// Build the backend selected by `config`.
///
/// # Errors
///
/// Returns an error if the provider cannot be initialized.
pub async fn build_backend(config: StorageConfig) -> Result<Arc<dyn ImageBackend>, StorageError> {
    let max_file_size = config.max_file_size;

    let backend: Arc<dyn ImageBackend> = match &config.provider {
        StorageProvider::LocalFs {
            root,
            public_prefix,
        } => Arc::new(LocalImageBackend::open(root, public_prefix, max_file_size).await?),
        StorageProvider::S3 {
            public_base_url,
            folder,
            ..
        } => Arc::new(ObjectImageBackend::new(
            create_operator(&config.provider)?,
            public_base_url.as_str(),
            folder.as_str(),
            max_file_size,
        )),
    };

    tracing::info!(provider = backend.name(), max_file_size, "Image backend ready");
    Ok(backend)
}

/// Create OpenDAL operator from provider config.
pub(crate) fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
    match provider {
        StorageProvider::S3 {
            endpoint,
            bucket,
            access_key_id,
            secret_access_key,
            region,
            ..
        } => {
            let builder = services::S3::default()
                .endpoint(endpoint)
                .bucket(bucket)
                .access_key_id(access_key_id)
                .secret_access_key(secret_access_key)
                .region(region);

            Ok(Operator::new(builder)
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .finish())
        }
        StorageProvider::LocalFs { root, .. } => {
            let builder = services::Fs::default().root(
                root.to_str()
                    .ok_or_else(|| StorageError::configuration("invalid path"))?,
            );

            Ok(Operator::new(builder)
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .finish())
        }
    }
}

/// Sanitize a name fragment for use in a storage key.
///
/// Only allows ASCII alphanumeric characters, dots, hyphens, and underscores.
pub(crate) fn sanitize_component(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_component() {
        assert_eq!(sanitize_component("image"), "image");
        assert_eq!(sanitize_component("my file (1)"), "my_file__1_");
        assert_eq!(sanitize_component("日本語"), "___");
    }

    #[tokio::test]
    async fn test_build_local_backend() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = StorageConfig::new(StorageProvider::local_fs(dir.path(), "/uploads"));

        let backend = build_backend(config).await.expect("local backend");
        assert_eq!(backend.name(), "local");
        assert!(backend.owns("/uploads/image-1.png"));
    }

    #[tokio::test]
    async fn test_build_s3_backend() {
        let config = StorageConfig::new(StorageProvider::s3(
            "https://s3.example.com",
            "images",
            "key",
            "secret",
            "auto",
            "https://cdn.example.com",
            "picpost",
        ));

        let backend = build_backend(config).await.expect("s3 backend");
        assert_eq!(backend.name(), "s3");
        assert!(backend.owns("https://cdn.example.com/picpost/a.png"));
        assert!(!backend.owns("/uploads/a.png"));
    }
}
