//! Local disk image backend.
//!
//! Files land flat in the root directory and are served by the HTTP layer
//! under `public_prefix`. The key is the bare file name.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use opendal::{ErrorKind, Operator};
use uuid::Uuid;

use super::backend::{ImageBackend, ImageUpload, StoredImage, create_operator, sanitize_component};
use super::config::{StorageProvider, check_image_type, file_extension, validate_public_prefix};
use super::error::StorageError;

/// Image backend writing to a local directory.
#[derive(Debug, Clone)]
pub struct LocalImageBackend {
    operator: Operator,
    public_prefix: String,
    max_file_size: u64,
}

impl LocalImageBackend {
    /// Open the backend, creating `root` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if `public_prefix` is not a path below the site root,
    /// the directory cannot be created, or the operator cannot be built.
    pub async fn open(
        root: &Path,
        public_prefix: &str,
        max_file_size: u64,
    ) -> Result<Self, StorageError> {
        validate_public_prefix(public_prefix)?;

        tokio::fs::create_dir_all(root).await.map_err(|e| {
            StorageError::configuration(format!(
                "failed to create storage directory {}: {e}",
                root.display()
            ))
        })?;

        let operator = create_operator(&StorageProvider::local_fs(root, public_prefix))?;

        Ok(Self {
            operator,
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
            max_file_size,
        })
    }

    /// Public URL for a stored file name.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_prefix)
    }
}

/// Build the on-disk name: `{field}-{millis}-{nonce}.{ext}`.
fn synthesize_filename(field_name: &str, original: &str, millis: i64, nonce: &str) -> String {
    let field = sanitize_component(field_name);
    let field = if field.is_empty() { "image".to_string() } else { field };

    match file_extension(original) {
        Some(ext) => format!("{field}-{millis}-{nonce}.{}", sanitize_component(&ext)),
        None => format!("{field}-{millis}-{nonce}"),
    }
}

/// Keys are flat file names; anything that could walk out of the root is rejected.
fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() || key.contains('/') || key.contains('\\') || key.contains("..") {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[async_trait]
impl ImageBackend for LocalImageBackend {
    async fn store(&self, upload: ImageUpload) -> Result<StoredImage, StorageError> {
        let size = upload.size();
        if size > self.max_file_size {
            return Err(StorageError::file_too_large(size, self.max_file_size));
        }
        check_image_type(&upload.filename, &upload.content_type)?;

        let nonce = Uuid::new_v4().simple().to_string();
        let key = synthesize_filename(
            &upload.field_name,
            &upload.filename,
            Utc::now().timestamp_millis(),
            &nonce[..8],
        );

        self.operator
            .write_with(&key, upload.data)
            .content_type(&upload.content_type)
            .await
            .map_err(StorageError::from)?;

        tracing::info!(key = %key, size_bytes = size, "Stored image on local disk");

        Ok(StoredImage {
            public_url: self.public_url(&key),
            key,
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;

        match self.operator.delete(key).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn owns(&self, public_url: &str) -> bool {
        public_url
            .strip_prefix(&self.public_prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .is_some_and(|name| validate_key(name).is_ok())
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn png_upload(filename: &str) -> ImageUpload {
        ImageUpload {
            field_name: "image".to_string(),
            filename: filename.to_string(),
            content_type: "image/png".to_string(),
            data: Bytes::from_static(b"\x89PNG\r\n\x1a\nfake"),
        }
    }

    #[test]
    fn test_synthesize_filename() {
        assert_eq!(
            synthesize_filename("image", "cat.JPG", 1_700_000_000_000, "abcd1234"),
            "image-1700000000000-abcd1234.jpg"
        );
        assert_eq!(
            synthesize_filename("", "cat", 1, "n"),
            "image-1-n"
        );
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("image-1.png").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("nested/file.png").is_err());
    }

    #[tokio::test]
    async fn test_open_creates_missing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("nested").join("uploads");

        LocalImageBackend::open(&root, "/uploads", 1024)
            .await
            .expect("open backend");

        assert!(root.is_dir());
    }

    #[tokio::test]
    async fn test_open_rejects_site_root_prefix() {
        let dir = tempfile::tempdir().expect("tempdir");

        for prefix in ["/", "", "uploads"] {
            let err = LocalImageBackend::open(dir.path(), prefix, 1024)
                .await
                .unwrap_err();
            assert!(matches!(err, StorageError::Configuration(_)), "{prefix:?}");
        }
    }

    #[tokio::test]
    async fn test_store_writes_file_and_returns_relative_url() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = LocalImageBackend::open(dir.path(), "/uploads/", 1024)
            .await
            .expect("open backend");

        let stored = backend.store(png_upload("cat.png")).await.expect("store");

        assert!(stored.key.starts_with("image-"));
        assert!(stored.key.ends_with(".png"));
        assert_eq!(stored.public_url, format!("/uploads/{}", stored.key));
        assert!(dir.path().join(&stored.key).is_file());
        assert!(backend.owns(&stored.public_url));
    }

    #[tokio::test]
    async fn test_store_rejects_unsupported_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = LocalImageBackend::open(dir.path(), "/uploads", 1024)
            .await
            .expect("open backend");

        let err = backend.store(png_upload("script.exe")).await.unwrap_err();
        assert!(matches!(err, StorageError::UnsupportedType { .. }));

        let entries = std::fs::read_dir(dir.path()).expect("read dir").count();
        assert_eq!(entries, 0);
    }

    #[tokio::test]
    async fn test_store_rejects_oversized_upload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = LocalImageBackend::open(dir.path(), "/uploads", 4)
            .await
            .expect("open backend");

        let err = backend.store(png_upload("cat.png")).await.unwrap_err();
        assert!(matches!(err, StorageError::FileTooLarge { max: 4, .. }));
    }

    #[tokio::test]
    async fn test_delete_removes_file_and_tolerates_absence() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = LocalImageBackend::open(dir.path(), "/uploads", 1024)
            .await
            .expect("open backend");

        let stored = backend.store(png_upload("cat.png")).await.expect("store");
        backend.delete(&stored.key).await.expect("first delete");
        assert!(!dir.path().join(&stored.key).exists());

        backend.delete(&stored.key).await.expect("second delete is a no-op");
    }

    #[tokio::test]
    async fn test_owns() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = LocalImageBackend::open(dir.path(), "/uploads", 1024)
            .await
            .expect("open backend");

        assert!(backend.owns("/uploads/image-1.png"));
        assert!(!backend.owns("/uploads/"));
        assert!(!backend.owns("/uploadsx/image-1.png"));
        assert!(!backend.owns("/uploads/../secret"));
        assert!(!backend.owns("https://cdn.example.com/picpost/a.png"));
    }
}
