//! Remote gateway contract.
//!
//! Defines the typed boundary to the analysis backend. Implementations
//! normalize every transport error, non-2xx status and `success: false` body
//! (except the logical-empty file-tree reply) into a `CodechatError`.

mod dto;

use async_trait::async_trait;

pub use dto::{
    ChatRequest, ChatResponse, ExplainRequest, ExplainResponse, FileTreeResponse, HealthStatus,
    ResetResponse, UploadResponse,
};

use crate::error::Result;
use crate::ingest::{ChunkingConfig, FileCandidate, RepositoryUrl};
use crate::session::SessionSnapshot;

/// Typed request/response boundary to the backend. Holds no client state.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// `GET /` liveness and advertised features.
    async fn health(&self) -> Result<HealthStatus>;

    /// `GET /session-info`.
    async fn session_info(&self) -> Result<SessionSnapshot>;

    /// `POST /reset-session`.
    async fn reset_session(&self) -> Result<ResetResponse>;

    /// `GET /file-tree`.
    ///
    /// Returns `Ok` for the "no files" sentinel; callers inspect the body.
    async fn file_tree(&self) -> Result<FileTreeResponse>;

    /// `POST /upload-file` (multipart).
    async fn upload_files(
        &self,
        files: &[FileCandidate],
        config: &ChunkingConfig,
    ) -> Result<UploadResponse>;

    /// `POST /upload-github` (multipart form).
    async fn upload_github(
        &self,
        repository: &RepositoryUrl,
        config: &ChunkingConfig,
    ) -> Result<UploadResponse>;

    /// `POST /chat`.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// `POST /explain-file`.
    async fn explain_file(&self, file_path: &str) -> Result<ExplainResponse>;
}
