//! Post types and data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::PostError;
use crate::storage::ImageUpload;

/// Unique identifier for a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub Uuid);

impl PostId {
    /// Creates a new random ID using UUID v7 (time-ordered).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates an ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }

    /// Parse a client-supplied identifier.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::InvalidIdentifier`] if `raw` is not a UUID.
    pub fn parse(raw: &str) -> Result<Self, PostError> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| PostError::InvalidIdentifier(raw.to_string()))
    }
}

impl Default for PostId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PostId {
    type Err = PostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A persisted post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Post ID.
    pub id: PostId,
    /// Trimmed, non-empty title.
    pub title: String,
    /// Trimmed description, `None` when absent or blank.
    pub description: Option<String>,
    /// Where clients fetch the image.
    pub image_url: String,
    /// Backend key of the image, used for deletion.
    pub image_key: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Validated input for inserting a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    /// Trimmed title.
    pub title: String,
    /// Trimmed description.
    pub description: Option<String>,
    /// Public image URL.
    pub image_url: String,
    /// Backend image key.
    pub image_key: String,
}

impl NewPost {
    /// Validate and normalize post fields.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::Validation`] if the title or image URL is empty.
    pub fn new(
        title: &str,
        description: Option<&str>,
        image_url: &str,
        image_key: &str,
    ) -> Result<Self, PostError> {
        let title = normalize_title(Some(title))?;
        let image_url = image_url.trim();
        if image_url.is_empty() {
            return Err(PostError::validation("imageUrl is required"));
        }

        Ok(Self {
            title,
            description: normalize_description(description),
            image_url: image_url.to_string(),
            image_key: image_key.to_string(),
        })
    }
}

/// Raw create request as decoded from the client.
#[derive(Debug, Clone, Default)]
pub struct CreatePostInput {
    /// Title field, if sent.
    pub title: Option<String>,
    /// Description field, if sent.
    pub description: Option<String>,
    /// Image file, if attached.
    pub image: Option<ImageUpload>,
}

/// Trim the title and require it to be non-empty.
pub(crate) fn normalize_title(title: Option<&str>) -> Result<String, PostError> {
    match title.map(str::trim) {
        Some(t) if !t.is_empty() => Ok(t.to_string()),
        _ => Err(PostError::validation("title is required")),
    }
}

/// Trim the description; blank becomes `None`.
pub(crate) fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(String::from)
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_accepted_titles_are_trimmed_and_non_empty(title in ".{0,40}") {
            match normalize_title(Some(&title)) {
                Ok(t) => {
                    prop_assert!(!t.is_empty());
                    prop_assert_eq!(t.as_str(), t.trim());
                }
                Err(_) => prop_assert!(title.trim().is_empty()),
            }
        }
    }
}
