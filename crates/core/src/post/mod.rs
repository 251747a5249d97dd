//! Posts: a title, optional description, and an image.
//!
//! This module provides business logic for posts including:
//! - Field validation and normalization
//! - Create orchestration (image upload, then record)
//! - Delete orchestration (best-effort image removal, then record)

mod error;
#[cfg(any(test, feature = "test-util"))]
mod memory;
mod service;
mod types;

pub use error::PostError;
#[cfg(any(test, feature = "test-util"))]
pub use memory::InMemoryPostRepository;
pub use service::{PostRepository, PostService};
pub use types::{CreatePostInput, NewPost, Post, PostId};
