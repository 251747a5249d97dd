//! Posts table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(POSTS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS posts CASCADE;")
            .await?;
        Ok(())
    }
}

const POSTS_SQL: &str = r"
CREATE TABLE posts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    title TEXT NOT NULL,
    description TEXT,
    image_url TEXT NOT NULL,
    image_key TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_title_not_blank CHECK (length(btrim(title)) > 0),
    CONSTRAINT chk_image_url_not_blank CHECK (length(btrim(image_url)) > 0)
);

-- Listing is always newest first
CREATE INDEX idx_posts_created_at ON posts(created_at DESC);
";
