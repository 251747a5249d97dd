//! S3-compatible object store image backend.

use async_trait::async_trait;
use opendal::{ErrorKind, Operator};
use uuid::Uuid;

use super::backend::{ImageBackend, ImageUpload, StoredImage, sanitize_component};
use super::config::file_extension;
use super::error::StorageError;

/// Image backend writing to an object store bucket.
///
/// The key handed back from [`ImageBackend::store`] is the exact object key,
/// so deletion never has to reverse-engineer it from the public URL.
#[derive(Debug, Clone)]
pub struct ObjectImageBackend {
    operator: Operator,
    public_base_url: String,
    folder: String,
    max_file_size: u64,
}

impl ObjectImageBackend {
    /// Create the backend over an already built operator.
    #[must_use]
    pub fn new(
        operator: Operator,
        public_base_url: impl Into<String>,
        folder: impl Into<String>,
        max_file_size: u64,
    ) -> Self {
        let public_base_url: String = public_base_url.into();
        let folder: String = folder.into();

        Self {
            operator,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            folder: folder.trim_matches('/').to_string(),
            max_file_size,
        }
    }

    /// Object key for a fresh upload: `{folder}/{uuid}.{ext}`.
    #[must_use]
    pub fn generate_key(&self, filename: &str) -> String {
        let id = Uuid::now_v7();
        let name = match file_extension(filename) {
            Some(ext) => format!("{id}.{}", sanitize_component(&ext)),
            None => id.to_string(),
        };

        if self.folder.is_empty() {
            name
        } else {
            format!("{}/{name}", self.folder)
        }
    }

    /// Public URL for an object key.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }
}

#[async_trait]
impl ImageBackend for ObjectImageBackend {
    async fn store(&self, upload: ImageUpload) -> Result<StoredImage, StorageError> {
        let size = upload.size();
        if size > self.max_file_size {
            return Err(StorageError::file_too_large(size, self.max_file_size));
        }

        let key = self.generate_key(&upload.filename);

        self.operator
            .write_with(&key, upload.data)
            .content_type(&upload.content_type)
            .await
            .map_err(StorageError::from)?;

        tracing::info!(key = %key, size_bytes = size, "Uploaded image to object store");

        Ok(StoredImage {
            public_url: self.public_url(&key),
            key,
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        match self.operator.delete(key).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn owns(&self, public_url: &str) -> bool {
        public_url
            .strip_prefix(&self.public_base_url)
            .and_then(|rest| rest.strip_prefix('/'))
            .is_some_and(|key| !key.is_empty())
    }

    fn name(&self) -> &'static str {
        "s3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{StorageProvider, backend::create_operator};

    fn backend(folder: &str) -> ObjectImageBackend {
        let provider = StorageProvider::s3(
            "https://s3.example.com",
            "images",
            "key",
            "secret",
            "auto",
            "https://cdn.example.com/",
            folder,
        );
        let operator = create_operator(&provider).expect("operator");
        ObjectImageBackend::new(operator, "https://cdn.example.com/", folder, 1024)
    }

    #[test]
    fn test_generate_key_under_folder() {
        let backend = backend("picpost");
        let key = backend.generate_key("Holiday Photo.JPG");

        let (folder, name) = key.split_once('/').expect("folder separator");
        assert_eq!(folder, "picpost");
        assert!(name.ends_with(".jpg"));
        assert!(Uuid::parse_str(name.trim_end_matches(".jpg")).is_ok());
    }

    #[test]
    fn test_generate_key_without_folder_or_extension() {
        let backend = backend("");
        let key = backend.generate_key("blob");
        assert!(Uuid::parse_str(&key).is_ok());
    }

    #[test]
    fn test_public_url_and_ownership() {
        let backend = backend("picpost");
        let url = backend.public_url("picpost/abc.png");

        assert_eq!(url, "https://cdn.example.com/picpost/abc.png");
        assert!(backend.owns(&url));
        assert!(!backend.owns("https://cdn.example.com/"));
        assert!(!backend.owns("https://other.example.com/picpost/abc.png"));
        assert!(!backend.owns("/uploads/image-1.png"));
    }

    #[tokio::test]
    async fn test_store_then_delete_by_returned_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        let operator =
            create_operator(&StorageProvider::local_fs(dir.path(), "/uploads")).expect("operator");
        let backend =
            ObjectImageBackend::new(operator, "https://cdn.example.com", "picpost", 1024);

        let stored = backend
            .store(ImageUpload {
                field_name: "image".to_string(),
                filename: "Sunset.PNG".to_string(),
                content_type: "image/png".to_string(),
                data: bytes::Bytes::from_static(b"\x89PNG"),
            })
            .await
            .expect("store");

        let name = stored
            .key
            .strip_prefix("picpost/")
            .and_then(|rest| rest.strip_suffix(".png"))
            .expect("key shaped {folder}/{uuid}.{ext}");
        assert!(Uuid::parse_str(name).is_ok());
        assert_eq!(
            stored.public_url,
            format!("https://cdn.example.com/{}", stored.key)
        );
        assert!(backend.owns(&stored.public_url));

        let object = dir.path().join(&stored.key);
        assert_eq!(std::fs::read(&object).expect("object written"), b"\x89PNG");

        backend.delete(&stored.key).await.expect("delete");
        assert!(!object.exists());

        backend
            .delete(&stored.key)
            .await
            .expect("second delete is a no-op");
    }

    #[tokio::test]
    async fn test_delete_rejects_empty_key() {
        let backend = backend("picpost");
        let err = backend.delete("").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn test_store_rejects_oversized_upload_before_network() {
        let backend = backend("picpost");
        let upload = ImageUpload {
            field_name: "image".to_string(),
            filename: "big.png".to_string(),
            content_type: "image/png".to_string(),
            data: bytes::Bytes::from(vec![0u8; 2048]),
        };

        let err = backend.store(upload).await.unwrap_err();
        assert!(matches!(err, StorageError::FileTooLarge { size: 2048, max: 1024 }));
    }
}
