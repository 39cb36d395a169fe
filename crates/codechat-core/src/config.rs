//! Client configuration model.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ingest::ChunkingConfig;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Root of `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the analysis backend.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Deadline for session, tree, chat and explain calls.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Deadline for upload and clone calls.
    #[serde(default = "default_ingestion_timeout_secs")]
    pub ingestion_timeout_secs: u64,
    /// Fixed delay before a demo reply is appended.
    #[serde(default = "default_demo_reply_delay_ms")]
    pub demo_reply_delay_ms: u64,
    /// Interval of the simulated progress/stage animation.
    #[serde(default = "default_progress_tick_ms")]
    pub progress_tick_ms: u64,
    /// Token budget forwarded with chat requests.
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub chunking: ChunkingConfig,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_ingestion_timeout_secs() -> u64 {
    900
}

fn default_demo_reply_delay_ms() -> u64 {
    600
}

fn default_progress_tick_ms() -> u64 {
    250
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            ingestion_timeout_secs: default_ingestion_timeout_secs(),
            demo_reply_delay_ms: default_demo_reply_delay_ms(),
            progress_tick_ms: default_progress_tick_ms(),
            max_tokens: None,
            chunking: ChunkingConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn ingestion_timeout(&self) -> Duration {
        Duration::from_secs(self.ingestion_timeout_secs.max(1))
    }

    pub fn demo_reply_delay(&self) -> Duration {
        Duration::from_millis(self.demo_reply_delay_ms)
    }

    pub fn progress_tick(&self) -> Duration {
        Duration::from_millis(self.progress_tick_ms.max(10))
    }

    /// Returns a copy with out-of-range chunking values replaced by defaults.
    pub fn normalized(mut self) -> Self {
        self.chunking = self.chunking.clamped();
        self.api_base_url = self.api_base_url.trim().trim_end_matches('/').to_string();
        self
    }
}
