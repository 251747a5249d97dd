//! Image storage backends built on Apache OpenDAL.
//!
//! Two interchangeable backends implement [`ImageBackend`]:
//! - [`LocalImageBackend`]: flat directory on local disk, served as static files
//! - [`ObjectImageBackend`]: S3-compatible bucket (Cloudflare R2, AWS S3, ...)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     ImageBackend (trait)                         │
//! │        store(upload) -> {public_url, key}   delete(key)          │
//! ├────────────────────────────────┬────────────────────────────────┤
//! │ LocalImageBackend (services-fs)│ ObjectImageBackend (services-s3)│
//! │ /uploads/{field}-{ts}-{n}.ext  │ {base}/{folder}/{uuid}.ext      │
//! └────────────────────────────────┴────────────────────────────────┘
//! ```

mod backend;
mod config;
mod error;
mod local;
mod object;

pub use backend::{ImageBackend, ImageUpload, StoredImage, build_backend};
pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use local::LocalImageBackend;
pub use object::ObjectImageBackend;
