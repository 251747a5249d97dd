//! Core business logic for picpost.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//!
//! # Modules
//!
//! - `post` - Post types, validation, and create/delete orchestration
//! - `storage` - Image backends (local disk, S3-compatible object store)

pub mod post;
pub mod storage;
