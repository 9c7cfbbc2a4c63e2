use crate::constants::cache::{
    SNAPSHOT_CAPACITY, SNAPSHOT_TTL_SECONDS, STATUS_CAPACITY, STATUS_TTL_SECONDS,
};
use crate::constants::{DEFAULT_IMAGE_SERVICE_URL, DEFAULT_PORT, DEFAULT_STATUS_URL};
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

pub mod paths;
pub mod validation;

use paths::{get_config_path, get_log_dir_path};
use validation::validate_config;

/// Configuration structure for the application.
/// Handles loading, saving, and managing application settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// URL of the upstream status list (a JSON array of server records).
    #[serde(default = "default_status_url")]
    pub status_url: String,
    /// Regex selecting the server when a request names none. Absent matches
    /// the first server listed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_server_name: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path to the log file. If not specified, logs will be written to a default location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file_path: Option<String>,
    /// HTTP timeout in seconds for upstream requests. Absent leaves the
    /// client without an explicit timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_timeout_seconds: Option<u64>,
    /// Image service queried by the xbar plugin in image mode.
    #[serde(default = "default_image_service_url")]
    pub image_service_url: String,
    #[serde(default)]
    pub fonts: FontConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Where fonts come from and which families the scoreboard asks for.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FontConfig {
    /// Directory of TTF/OTF files loaded in addition to system fonts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_dir: Option<String>,
    pub load_system_fonts: bool,
    pub family: String,
    pub display_family: String,
}

impl Default for FontConfig {
    fn default() -> Self {
        FontConfig {
            font_dir: None,
            load_system_fonts: true,
            family: "xbar SF".to_string(),
            display_family: "xbar SF Display".to_string(),
        }
    }
}

/// Time-to-live and capacity of both cache tiers.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub status_ttl_seconds: u64,
    pub status_capacity: usize,
    pub snapshot_ttl_seconds: u64,
    pub snapshot_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            status_ttl_seconds: STATUS_TTL_SECONDS,
            status_capacity: STATUS_CAPACITY,
            snapshot_ttl_seconds: SNAPSHOT_TTL_SECONDS,
            snapshot_capacity: SNAPSHOT_CAPACITY,
        }
    }
}

fn default_status_url() -> String {
    DEFAULT_STATUS_URL.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_image_service_url() -> String {
    DEFAULT_IMAGE_SERVICE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            status_url: default_status_url(),
            default_server_name: None,
            port: default_port(),
            log_file_path: None,
            http_timeout_seconds: None,
            image_service_url: default_image_service_url(),
            fonts: FontConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, or from the default config file
    /// location when `path` is `None`. A missing file yields defaults.
    /// Environment variables can override config file values.
    ///
    /// # Environment Variables
    /// - `T2_STATUS_URL` - Override the upstream status URL
    /// - `T2_SERVER_NAME` - Override the default server name filter
    /// - `PORT` - Override the listen port
    /// - `T2_LOG_FILE` - Override log file path
    /// - `T2_FONT_DIR` - Override the font directory
    /// - `T2_HTTP_TIMEOUT` - Override HTTP timeout in seconds
    pub async fn load(path: Option<&str>) -> Result<Self, AppError> {
        let config_path = path.map(str::to_string).unwrap_or_else(get_config_path);

        let mut config = if Path::new(&config_path).exists() {
            Self::load_from_path(&config_path).await?
        } else {
            info!("No config file at {config_path}, using defaults");
            Config::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(status_url) = std::env::var("T2_STATUS_URL") {
            self.status_url = status_url;
        }

        if let Ok(server_name) = std::env::var("T2_SERVER_NAME") {
            self.default_server_name = (!server_name.is_empty()).then_some(server_name);
        }

        if let Some(port) = std::env::var("PORT").ok().and_then(|s| s.parse::<u16>().ok()) {
            self.port = port;
        }

        if let Ok(log_file_path) = std::env::var("T2_LOG_FILE") {
            self.log_file_path = Some(log_file_path);
        }

        if let Ok(font_dir) = std::env::var("T2_FONT_DIR") {
            self.fonts.font_dir = Some(font_dir);
        }

        if let Some(timeout) = std::env::var("T2_HTTP_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            self.http_timeout_seconds = Some(timeout);
        }
    }

    /// Validates the configuration settings
    pub fn validate(&self) -> Result<(), AppError> {
        validate_config(self)
    }

    /// Returns the platform-specific path for the config file.
    pub fn get_config_path() -> String {
        paths::get_config_path()
    }

    /// Returns the platform-specific path for the log directory.
    pub fn get_log_dir_path() -> String {
        get_log_dir_path()
    }

    /// Saves configuration to a file path, creating the parent directory
    /// if it doesn't exist.
    ///
    /// # Errors
    /// * `AppError::Config` - If the provided path has no parent directory
    /// * `AppError::Io` - If there's an I/O error creating directories or writing the file
    /// * `AppError::TomlSerialize` - If there's an error serializing the configuration
    pub async fn save_to_path(&self, path: &str) -> Result<(), AppError> {
        let config_dir = Path::new(path).parent().ok_or_else(|| {
            AppError::config_error(format!("Path '{path}' has no parent directory"))
        })?;

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).await?;
        }
        let content = toml::to_string_pretty(self)?;
        let mut file = fs::File::create(path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Loads configuration from a file path without applying overrides.
    pub async fn load_from_path(path: &str) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
