//! Post routes.
//!
//! Create accepts `multipart/form-data` with an `image` file plus `title`
//! and optional `description` text fields. The other endpoints are plain
//! JSON.

use axum::{
    Json, Router,
    extract::{
        Multipart, Path, State,
        multipart::{Field, MultipartError, MultipartRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::{AppState, error::ApiError};
use picpost_core::post::{CreatePostInput, Post};
use picpost_core::storage::ImageUpload;
use picpost_shared::AppError;

/// Multipart field the image must arrive under.
pub const IMAGE_FIELD: &str = "image";

const NO_IMAGE_MESSAGE: &str = "No image uploaded. Include an image file in the \"image\" field.";

/// Creates the post routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/{id}", get(get_post).delete(delete_post))
}

// ============================================================================
// Response Types
// ============================================================================

/// Post as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    /// Post ID.
    pub id: String,
    /// Title.
    pub title: String,
    /// Description, omitted when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Where the image is served from.
    pub image_url: String,
    /// Creation time (RFC 3339).
    pub created_at: String,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id.to_string(),
            title: post.title,
            description: post.description,
            image_url: post.image_url,
            created_at: post.created_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/posts
async fn create_post(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let multipart = multipart.map_err(|rejection| {
        debug!(error = %rejection, "Rejected non-multipart create request");
        AppError::BadRequest(NO_IMAGE_MESSAGE.to_string())
    })?;

    let input = read_create_form(multipart).await?;
    let post = state.posts.create(input).await?;

    Ok((StatusCode::CREATED, Json(PostResponse::from(post))))
}

/// GET /api/posts
async fn list_posts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let posts = state.posts.list().await?;
    let body: Vec<PostResponse> = posts.into_iter().map(PostResponse::from).collect();
    Ok(Json(body))
}

/// GET /api/posts/{id}
async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.posts.get(&id).await?;
    Ok(Json(PostResponse::from(post)))
}

/// DELETE /api/posts/{id}
async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.posts.delete(&id).await?;

    Ok(Json(json!({ "msg": "Post removed" })))
}

// ============================================================================
// Multipart decoding
// ============================================================================

/// Collect the create form into a [`CreatePostInput`].
///
/// Exactly one file is accepted, under [`IMAGE_FIELD`]. Unknown text
/// fields are ignored; a file under any other name is rejected.
async fn read_create_form(mut multipart: Multipart) -> Result<CreatePostInput, AppError> {
    let mut input = CreatePostInput::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        let is_file = field.file_name().is_some();

        match name.as_str() {
            IMAGE_FIELD if is_file => {
                if input.image.is_some() {
                    return Err(AppError::BadRequest(
                        "Only one image may be uploaded per post".to_string(),
                    ));
                }
                input.image = Some(read_image(field).await?);
            }
            "title" if !is_file => input.title = Some(read_text(field).await?),
            "description" if !is_file => input.description = Some(read_text(field).await?),
            _ if is_file => {
                return Err(AppError::BadRequest(format!(
                    "Unexpected file field \"{name}\". {NO_IMAGE_MESSAGE}"
                )));
            }
            _ => debug!(field = %name, "Ignoring unknown form field"),
        }
    }

    Ok(input)
}

async fn read_image(field: Field<'_>) -> Result<ImageUpload, AppError> {
    let field_name = field.name().unwrap_or(IMAGE_FIELD).to_string();
    let filename = field.file_name().unwrap_or_default().to_string();
    let content_type = field
        .content_type()
        .map_or("application/octet-stream", normalize_mime_type)
        .to_string();

    let data = field.bytes().await.map_err(multipart_error)?;

    Ok(ImageUpload {
        field_name,
        filename,
        content_type,
        data,
    })
}

async fn read_text(field: Field<'_>) -> Result<String, AppError> {
    field.text().await.map_err(multipart_error)
}

/// Strip MIME parameters, e.g. `image/png; charset=binary` -> `image/png`.
fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map_or(content_type, str::trim)
}

#[allow(clippy::needless_pass_by_value)]
fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Uploaded file exceeds the size limit".to_string())
    } else {
        AppError::BadRequest(format!("Malformed multipart body: {}", err.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use picpost_core::post::PostId;
    use rstest::rstest;

    #[rstest]
    #[case("image/png", "image/png")]
    #[case("image/jpeg; charset=binary", "image/jpeg")]
    #[case(" image/gif ;x=y", "image/gif")]
    fn test_normalize_mime_type(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_mime_type(raw), expected);
    }

    #[test]
    fn test_post_response_shape() {
        let post = Post {
            id: PostId::new(),
            title: "T".to_string(),
            description: None,
            image_url: "/uploads/image-1-deadbeef.png".to_string(),
            image_key: "image-1-deadbeef.png".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        };
        let id = post.id.to_string();

        let value = serde_json::to_value(PostResponse::from(post)).unwrap();

        assert_eq!(value["id"], id);
        assert_eq!(value["imageUrl"], "/uploads/image-1-deadbeef.png");
        assert_eq!(value["createdAt"], "2026-03-01T12:00:00+00:00");
        assert!(value.get("description").is_none());
        assert!(value.get("imageKey").is_none());
    }
}
