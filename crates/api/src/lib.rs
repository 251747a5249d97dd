//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for posts
//! - Multipart upload decoding
//! - Error-to-response mapping
//! - Static serving of locally stored images

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use picpost_core::post::PostService;
use picpost_core::storage::{StorageConfig, StorageProvider};

pub use error::ApiError;

/// Room for multipart boundaries and text fields on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Post orchestration over the store and the active image backend.
    pub posts: Arc<PostService>,
    /// Storage configuration the backend was built from.
    pub storage: Arc<StorageConfig>,
}

impl AppState {
    /// Create application state.
    #[must_use]
    pub fn new(posts: PostService, storage: StorageConfig) -> Self {
        Self {
            posts: Arc::new(posts),
            storage: Arc::new(storage),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.storage.max_file_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    let mut router = Router::new()
        .merge(routes::health::root_routes())
        .nest("/api", routes::api_routes())
        .layer(DefaultBodyLimit::max(body_limit));

    if let StorageProvider::LocalFs {
        root,
        public_prefix,
    } = &state.storage.provider
    {
        let mount = public_prefix.trim_matches('/');
        if mount.is_empty() {
            tracing::warn!(
                prefix = %public_prefix,
                "Public prefix resolves to the site root, not serving uploaded images"
            );
        } else {
            let prefix = format!("/{mount}");
            tracing::info!(prefix = %prefix, root = %root.display(), "Serving uploaded images");
            router = router.nest_service(&prefix, ServeDir::new(root));
        }
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
