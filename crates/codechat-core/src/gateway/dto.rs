//! Wire types exchanged with the analysis backend.

use serde::{Deserialize, Serialize};

use crate::ingest::ChunkingConfig;
use crate::session::{ExplanationStats, FileTreeNode, RetrievalStats};

/// `GET /` health check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub features: Vec<String>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// `POST /reset-session`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub namespace: String,
}

/// `GET /file-tree`.
///
/// `success: false` with only a `message` means "nothing ingested yet" and is
/// not an error; an `error` field marks a backend failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTreeResponse {
    pub success: bool,
    #[serde(default)]
    pub tree: Vec<FileTreeNode>,
    #[serde(default)]
    pub root_path: Option<String>,
    #[serde(default)]
    pub total_files: Option<u64>,
    #[serde(default)]
    pub files_processed: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl FileTreeResponse {
    /// True when the backend reported a failure rather than an empty corpus.
    pub fn is_error(&self) -> bool {
        !self.success && self.error.is_some()
    }
}

/// `POST /upload-file` and `POST /upload-github`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub namespace: String,
    /// Echo of the chunking parameters the backend applied (file upload only).
    #[serde(default)]
    pub config: Option<ChunkingConfig>,
}

/// `POST /chat` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// `POST /chat` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub metadata: RetrievalStats,
}

/// `POST /explain-file` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainRequest {
    pub file_path: String,
}

/// `POST /explain-file` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainResponse {
    pub success: bool,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub metadata: ExplanationStats,
}
