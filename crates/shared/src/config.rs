//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
///
/// Built once at startup and handed to the database layer and the image
/// backend; nothing reads configuration from ambient state afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Image storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Which image backend the process runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Files on local disk, served under the public prefix.
    #[default]
    Local,
    /// S3-compatible object storage.
    S3,
}

/// Image storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Active backend.
    #[serde(default)]
    pub provider: StorageKind,
    /// Directory for the local backend.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// URL prefix under which local files are served.
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
    /// Logical folder objects are placed under in the object store.
    #[serde(default = "default_folder")]
    pub folder: String,
    /// Upload ceiling in bytes, shared by both backends.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Object store settings, required when `provider = "s3"`.
    #[serde(default)]
    pub s3: Option<S3Settings>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: StorageKind::default(),
            root: default_root(),
            public_prefix: default_public_prefix(),
            folder: default_folder(),
            max_file_size: default_max_file_size(),
            s3: None,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_public_prefix() -> String {
    "/uploads".to_string()
}

fn default_folder() -> String {
    "picpost".to_string()
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

/// S3-compatible object store settings.
#[derive(Debug, Clone, Deserialize)]
pub struct S3Settings {
    /// S3 endpoint URL.
    pub endpoint: String,
    /// Bucket name.
    pub bucket: String,
    /// Region (`auto` for R2).
    #[serde(default = "default_region")]
    pub region: String,
    /// Access key ID.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Public base URL objects are reachable under, e.g. a CDN domain.
    pub public_base_url: String,
}

fn default_region() -> String {
    "auto".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// A plain `DATABASE_URL`, as read by the migrator, seeds `database.url`
    /// at the lowest precedence so one `.env` drives both binaries.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let mut builder = config::Config::builder();
        if let Ok(url) = std::env::var("DATABASE_URL") {
            builder = builder.set_default("database.url", url)?;
        }

        let config = builder
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("PICPOST").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
