//! Shared errors and configuration for picpost.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;

pub use config::{AppConfig, DatabaseConfig, S3Settings, ServerConfig, StorageKind, StorageSettings};
pub use error::{AppError, AppResult};
