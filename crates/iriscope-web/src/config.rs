//! Configuration loading for Iriscope.
//! Reads iriscope.toml from the current directory or the path in the
//! IRISCOPE_CONFIG env var. Every field has a default, so the file is
//! optional; IRISCOPE_BACKEND_URL and IRISCOPE_ENVIRONMENT override it.

use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 3001 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the external inference service.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// "production" or "development"; defaults to production unless set.
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_base_url() -> String { "http://127.0.0.1:8000".to_string() }
fn default_environment() -> String { "production".to_string() }

impl Default for BackendConfig {
    fn default() -> Self {
        Self { base_url: default_base_url(), environment: default_environment() }
    }
}

impl Config {
    /// Load configuration, falling back to defaults when no file exists.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("IRISCOPE_CONFIG")
            .unwrap_or_else(|_| "iriscope.toml".to_string());

        let mut config = if Path::new(&path).exists() {
            let content = std::fs::read_to_string(&path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        if let Ok(url) = std::env::var("IRISCOPE_BACKEND_URL") {
            config.backend.base_url = url;
        }
        if let Ok(environment) = std::env::var("IRISCOPE_ENVIRONMENT") {
            config.backend.environment = environment;
        }

        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.backend.environment == "production"
    }
}
