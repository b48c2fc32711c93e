// src/infrastructure/config.rs
use crate::application::HydrationMode;
use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, CREDENTIALS_FILE_NAME, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_URL_TTL_SECS,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// TOML configuration for the backends
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ApiConfig {
    /// GraphQL endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Sent as `x-api-key` when non-empty
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StorageConfig {
    /// `s3://bucket/prefix`, `file:///dir` or `memory://`
    #[serde(default = "default_storage_uri")]
    pub uri: String,
    #[serde(default)]
    pub region: String,
    /// Used to build image URLs when the store cannot presign
    #[serde(default)]
    pub public_base_url: String,
    #[serde(default = "default_url_ttl_secs")]
    pub url_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct AuthConfig {
    /// Empty means `<config dir>/cloudnotes/credentials.json`
    #[serde(default)]
    pub credentials_path: String,
    #[serde(default)]
    pub sign_out_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct FetchConfig {
    #[serde(default)]
    pub hydration: HydrationMode,
}

// Default value functions
fn default_endpoint() -> String { String::new() }
fn default_timeout_secs() -> u64 { DEFAULT_REQUEST_TIMEOUT_SECS }
fn default_storage_uri() -> String { String::new() }
fn default_url_ttl_secs() -> u64 { DEFAULT_URL_TTL_SECS }

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uri: default_storage_uri(),
            region: String::new(),
            public_base_url: String::new(),
            url_ttl_secs: default_url_ttl_secs(),
        }
    }
}

impl AuthConfig {
    pub fn credentials_path(&self) -> Result<PathBuf> {
        if !self.credentials_path.is_empty() {
            return Ok(PathBuf::from(&self.credentials_path));
        }
        Ok(config_dir()?.join(CREDENTIALS_FILE_NAME))
    }

    pub fn sign_out_url(&self) -> Option<&str> {
        Some(self.sign_out_url.as_str()).filter(|s| !s.is_empty())
    }
}

impl Config {
    /// Default location: `<config dir>/cloudnotes/config.toml`
    pub fn default_path() -> Result<PathBuf> {
        Ok(config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read config file {}. Run `cloudnotes init` to create one",
                path.as_ref().display()
            )
        })?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse TOML config")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize config to TOML")?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }
        std::fs::write(path.as_ref(), toml_string)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Create default configuration file at path
    pub fn create_default(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::default();
        config.save(path)?;
        Ok(config)
    }

    /// Fail early on settings every data command needs.
    pub fn validate(&self) -> Result<()> {
        if self.api.endpoint.is_empty() {
            anyhow::bail!("api.endpoint is not set in the config file");
        }
        if self.storage.uri.is_empty() {
            anyhow::bail!("storage.uri is not set in the config file");
        }
        Ok(())
    }
}

fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not find config directory")?;
    Ok(base.join(CONFIG_DIR_NAME))
}
