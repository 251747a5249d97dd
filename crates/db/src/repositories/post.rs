//! Post repository for database operations.
//!
//! Implements post CRUD operations using SeaORM.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

use crate::entities::posts;
use picpost_core::post::{NewPost, Post, PostError, PostId, PostRepository as PostRepoTrait};

/// Post repository implementation.
#[derive(Debug, Clone)]
pub struct PostRepository {
    db: DatabaseConnection,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostRepoTrait for PostRepository {
    async fn create(&self, input: NewPost) -> Result<Post, PostError> {
        let active_model = posts::ActiveModel {
            id: Set(Uuid::now_v7()),
            title: Set(input.title),
            description: Set(input.description),
            image_url: Set(input.image_url),
            image_key: Set(input.image_key),
            created_at: Set(Utc::now().into()),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| PostError::repository(e.to_string()))?;

        Ok(to_domain(model))
    }

    async fn list_all(&self) -> Result<Vec<Post>, PostError> {
        let models = posts::Entity::find()
            .order_by_desc(posts::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| PostError::repository(e.to_string()))?;

        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, PostError> {
        let model = posts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| PostError::repository(e.to_string()))?;

        Ok(model.map(to_domain))
    }

    async fn delete(&self, id: PostId) -> Result<bool, PostError> {
        let result = posts::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
            .map_err(|e| PostError::repository(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

/// Convert database model to domain model.
fn to_domain(model: posts::Model) -> Post {
    Post {
        id: PostId::from_uuid(model.id),
        title: model.title,
        description: model.description,
        image_url: model.image_url,
        image_key: model.image_key,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset};

    #[test]
    fn test_to_domain_normalizes_timezone() {
        let created_at = DateTime::<FixedOffset>::parse_from_rfc3339("2026-03-01T12:00:00+02:00")
            .expect("valid timestamp");
        let id = Uuid::new_v4();

        let post = to_domain(posts::Model {
            id,
            title: "T".to_string(),
            description: None,
            image_url: "/uploads/a.png".to_string(),
            image_key: "a.png".to_string(),
            created_at,
        });

        assert_eq!(post.id.into_inner(), id);
        assert_eq!(post.created_at.to_rfc3339(), "2026-03-01T10:00:00+00:00");
        assert_eq!(post.description, None);
    }
}
