//! Path management for codechat configuration and logs.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/codechat/          # Config directory
//! ├── config.toml              # Client configuration
//! └── logs/                    # Application logs
//!     └── codechat.log.YYYY-MM-DD
//! ```

use std::path::PathBuf;

use codechat_core::CodechatError;

const APP_DIR: &str = "codechat";
const CONFIG_FILE: &str = "config.toml";
const LOG_DIR: &str = "logs";

/// Resolves codechat paths, optionally under an explicit base directory.
#[derive(Debug, Clone, Default)]
pub struct CodechatPaths {
    base_override: Option<PathBuf>,
}

impl CodechatPaths {
    /// Creates a resolver. `base_override` replaces the platform config dir
    /// (used by tests).
    pub fn new(base_override: Option<PathBuf>) -> Self {
        Self { base_override }
    }

    /// Returns the codechat configuration directory (e.g. `~/.config/codechat/`).
    pub fn config_dir(&self) -> Result<PathBuf, CodechatError> {
        if let Some(base) = &self.base_override {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| CodechatError::config("Cannot find home directory"))
    }

    pub fn config_file(&self) -> Result<PathBuf, CodechatError> {
        Ok(self.config_dir()?.join(CONFIG_FILE))
    }

    pub fn log_dir(&self) -> Result<PathBuf, CodechatError> {
        Ok(self.config_dir()?.join(LOG_DIR))
    }
}
