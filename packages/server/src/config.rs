use std::path::PathBuf;

use common::SuffixStrategy;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Local asset storage.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root of the `temp/` and `creators/` trees.
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,
    /// URL prefix that placed assets are served under.
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
    /// Per-file limit for content items, in bytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
    /// Per-file limit for avatars and banners, in bytes.
    #[serde(default = "default_max_image_size")]
    pub max_image_size: u64,
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("./uploads")
}
fn default_public_prefix() -> String {
    "/uploads".into()
}
fn default_max_upload_size() -> u64 {
    100 * 1024 * 1024
}
fn default_max_image_size() -> u64 {
    10 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uploads_dir: default_uploads_dir(),
            public_prefix: default_public_prefix(),
            max_upload_size: default_max_upload_size(),
            max_image_size: default_max_image_size(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct NamingConfig {
    #[serde(default)]
    pub suffix: SuffixStrategy,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ErrorsConfig {
    /// Include failure details in the `debug` member of error responses.
    #[serde(default)]
    pub expose_debug: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub naming: NamingConfig,
    #[serde(default)]
    pub errors: ErrorsConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., FANVIEW__DATABASE__URL)
            .add_source(
                Environment::with_prefix("FANVIEW")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allow_origins")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}
