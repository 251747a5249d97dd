//! Post service implementation.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use super::error::PostError;
use super::types::{CreatePostInput, NewPost, Post, PostId, normalize_title};
use crate::storage::ImageBackend;

/// Repository trait for post persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a post, assigning its id and creation time.
    async fn create(&self, input: NewPost) -> Result<Post, PostError>;

    /// All posts, newest first.
    async fn list_all(&self) -> Result<Vec<Post>, PostError>;

    /// Find post by ID.
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, PostError>;

    /// Delete post by ID. Returns whether a row was removed.
    async fn delete(&self, id: PostId) -> Result<bool, PostError>;
}

/// Orchestrates the image backend and the post repository.
#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn PostRepository>,
    images: Arc<dyn ImageBackend>,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(repo: Arc<dyn PostRepository>, images: Arc<dyn ImageBackend>) -> Self {
        Self { repo, images }
    }

    /// Create a post: store the image, then persist the record.
    ///
    /// If the record cannot be written, the freshly stored image is removed
    /// again on a best-effort basis.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No image is attached
    /// - The title is missing
    /// - The image backend rejects or fails the upload
    /// - Database operation fails
    pub async fn create(&self, input: CreatePostInput) -> Result<Post, PostError> {
        let image = input.image.ok_or(PostError::MissingImage)?;
        // Checked before the upload so a bad title never leaves bytes behind.
        let title = normalize_title(input.title.as_deref())?;

        let stored = self.images.store(image).await.map_err(|e| {
            error!(error = %e, backend = self.images.name(), "Image upload failed");
            PostError::from(e)
        })?;

        let new_post = NewPost::new(
            &title,
            input.description.as_deref(),
            &stored.public_url,
            &stored.key,
        )?;

        match self.repo.create(new_post).await {
            Ok(post) => {
                info!(post_id = %post.id, image_url = %post.image_url, "Post created");
                Ok(post)
            }
            Err(e) => {
                error!(error = %e, key = %stored.key, "Failed to persist post, removing stored image");
                if let Err(cleanup) = self.images.delete(&stored.key).await {
                    warn!(
                        error = %cleanup,
                        key = %stored.key,
                        "Could not remove orphaned image"
                    );
                }
                Err(e)
            }
        }
    }

    /// List all posts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails.
    pub async fn list(&self) -> Result<Vec<Post>, PostError> {
        self.repo.list_all().await
    }

    /// Get post by its client-supplied ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is malformed, the post is missing, or the
    /// database operation fails.
    pub async fn get(&self, raw_id: &str) -> Result<Post, PostError> {
        let id = PostId::parse(raw_id)?;
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(PostError::NotFound(id))
    }

    /// Delete a post and, best effort, its image.
    ///
    /// Image deletion failures are logged and never block removal of the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is malformed, the post is missing, or the
    /// database operation fails.
    pub async fn delete(&self, raw_id: &str) -> Result<(), PostError> {
        let post = self.get(raw_id).await?;

        if self.images.owns(&post.image_url) {
            match self.images.delete(&post.image_key).await {
                Ok(()) => info!(post_id = %post.id, key = %post.image_key, "Image deleted"),
                Err(e) => warn!(
                    post_id = %post.id,
                    key = %post.image_key,
                    error = %e,
                    "Failed to delete image, removing post anyway"
                ),
            }
        } else {
            warn!(
                post_id = %post.id,
                image_url = %post.image_url,
                backend = self.images.name(),
                "Image not held by the active backend, leaving it in place"
            );
        }

        if !self.repo.delete(post.id).await? {
            // Lost a race with a concurrent delete; the record is gone either way.
            info!(post_id = %post.id, "Post already removed");
        }

        info!(post_id = %post.id, "Post deleted");
        Ok(())
    }
}
