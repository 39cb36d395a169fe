//! Ingestion domain module.
//!
//! Types shared by the file-upload and GitHub-clone flows: client-side
//! admission of uploaded files, chunking configuration, repository URL
//! validation and the processing-stage pipeline shown during a clone.

mod admission;
mod chunking;
mod github;
mod pipeline;

use serde::{Deserialize, Serialize};

pub use admission::{
    AdmissionPolicy, AdmissionReport, FileCandidate, MAX_BATCH_SIZE, MAX_FILE_BYTES, Rejection,
    RejectionReason, SUPPORTED_EXTENSIONS, UploadItem, UploadStatus,
};
pub use chunking::{
    CHUNK_OVERLAP_RANGE, CHUNK_SIZE_RANGE, ChunkingConfig, DEFAULT_CHUNK_OVERLAP,
    DEFAULT_CHUNK_SIZE,
};
pub use github::{RepositoryUrl, UrlRejection, validate_github_url};
pub use pipeline::{ProcessingPipeline, ProcessingStage, ProcessingStep, StepStatus};

/// Which flow holds the ingestion slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum IngestionKind {
    #[strum(serialize = "file upload")]
    FileUpload,
    #[strum(serialize = "GitHub clone")]
    GithubClone,
}
