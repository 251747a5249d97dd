//! In-memory post repository for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use super::error::PostError;
use super::service::PostRepository;
use super::types::{NewPost, Post, PostId};

/// Post repository backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct InMemoryPostRepository {
    posts: Mutex<HashMap<PostId, Post>>,
    fail_writes: AtomicBool,
}

impl InMemoryPostRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `create` calls fail with a repository error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored posts.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.posts.lock().expect("posts lock").len()
    }

    /// Whether the repository is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<PostId, Post>>, PostError> {
        self.posts
            .lock()
            .map_err(|_| PostError::repository("posts lock poisoned"))
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(&self, input: NewPost) -> Result<Post, PostError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PostError::repository("write rejected"));
        }

        let post = Post {
            id: PostId::new(),
            title: input.title,
            description: input.description,
            image_url: input.image_url,
            image_key: input.image_key,
            created_at: Utc::now(),
        };
        self.lock()?.insert(post.id, post.clone());
        Ok(post)
    }

    async fn list_all(&self) -> Result<Vec<Post>, PostError> {
        let mut posts: Vec<Post> = self.lock()?.values().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, PostError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    async fn delete(&self, id: PostId) -> Result<bool, PostError> {
        Ok(self.lock()?.remove(&id).is_some())
    }
}
