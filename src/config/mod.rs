//! Configuration management
//!
//! Configuration loads from a YAML file, with environment variables taking
//! precedence for deployment-specific values.

pub mod auth;
pub mod server;

pub use auth::AuthConfig;
pub use server::ServerConfig;

use crate::utils::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from a YAML file, then apply environment overrides
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::config(format!("Failed to read config file: {}", e)))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .map_err(|e| AppError::config(format!("Failed to parse config: {}", e)))?;

        config.apply_env();
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Build configuration from defaults plus environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Overlay `FLOCK_*` environment variables
    fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("FLOCK_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("FLOCK_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(url) = std::env::var("FLOCK_PUBLIC_URL") {
            self.server.public_url = url;
        }
        if let Ok(secret) = std::env::var("FLOCK_SESSION_SECRET") {
            self.auth.session_secret = secret;
        }
    }

    /// Validate the full configuration
    pub fn validate(&self) -> Result<()> {
        self.server.validate().map_err(AppError::config)?;
        self.auth.validate().map_err(AppError::config)?;
        Ok(())
    }
}
