//! Picpost API Server
//!
//! Main entry point for the Picpost backend service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use picpost_api::{AppState, create_router};
use picpost_core::post::PostService;
use picpost_core::storage::{StorageConfig, build_backend};
use picpost_db::{PostRepository, connect_with};
use picpost_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "picpost=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect_with(&config.database).await?;
    info!("Connected to database");

    let storage = StorageConfig::from_settings(&config.storage)?;
    let images = build_backend(storage.clone()).await?;
    info!(
        provider = storage.provider.name(),
        max_file_size = storage.max_file_size,
        "Image storage configured"
    );

    let posts = PostService::new(Arc::new(PostRepository::new(db)), images);
    let app = create_router(AppState::new(posts, storage));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
