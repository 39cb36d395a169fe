//! Configuration service implementation.
//!
//! Loads [`ClientConfig`] from `~/.config/codechat/config.toml` and applies
//! environment overrides on top.

use std::path::{Path, PathBuf};

use codechat_core::config::ClientConfig;
use codechat_core::{CodechatError, Result};

use crate::paths::CodechatPaths;

pub const ENV_API_URL: &str = "CODECHAT_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "CODECHAT_TIMEOUT_SECS";

/// Reads and writes the client configuration file.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    /// Creates a service for the default config file location.
    pub fn new(paths: &CodechatPaths) -> Result<Self> {
        Ok(Self {
            path: paths.config_file()?,
        })
    }

    /// Creates a service for an explicit config file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the file. A missing file yields the defaults.
    pub async fn load(&self) -> Result<ClientConfig> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    "[ConfigService] No config at {}, using defaults",
                    self.path.display()
                );
                return Ok(ClientConfig::default());
            }
            Err(err) => return Err(err.into()),
        };

        let config: ClientConfig = toml::from_str(&content).map_err(|e| {
            CodechatError::config(format!(
                "Failed to parse configuration file at {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(config.normalized())
    }

    /// Loads the file and applies process environment overrides.
    pub async fn load_with_env(&self) -> Result<ClientConfig> {
        let config = self.load().await?;
        Ok(apply_env_overrides(config, |key| std::env::var(key).ok()))
    }

    /// Writes `config` back, creating the parent directory if needed.
    pub async fn save(&self, config: &ClientConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = toml::to_string_pretty(config)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

/// Applies `CODECHAT_*` overrides read through `lookup`.
pub fn apply_env_overrides<F>(mut config: ClientConfig, lookup: F) -> ClientConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_API_URL).filter(|url| !url.trim().is_empty()) {
        config.api_base_url = url;
    }

    if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
        match raw.trim().parse::<u64>() {
            Ok(secs) => config.request_timeout_secs = secs,
            Err(_) => tracing::warn!(
                "[ConfigService] Ignoring invalid {}={}",
                ENV_TIMEOUT_SECS,
                raw
            ),
        }
    }

    config.normalized()
}
