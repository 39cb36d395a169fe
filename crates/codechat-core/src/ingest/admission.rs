//! Client-side admission of files selected for upload.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Largest file accepted for upload (10 MiB).
pub const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Most files accepted in one batch.
pub const MAX_BATCH_SIZE: usize = 20;

/// Extensions the backend loader indexes.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "py", "js", "ts", "jsx", "tsx", "java", "c", "cpp", "go", "rs", "php", "rb", "swift", "kt",
    "cs", "vb", "html", "css", "json", "xml", "yml", "yaml", "ipynb", "md", "txt", "sql", "csv",
];

/// A file the user picked, before admission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCandidate {
    /// File name sent to the backend.
    pub name: String,
    /// Local path the bytes are read from.
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            size_bytes,
        }
    }

    /// Lower-cased extension of the file name, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }
}

/// Why a single file was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    #[strum(serialize = "file exceeds the size limit")]
    Oversize,
    #[strum(serialize = "file type is not supported")]
    UnsupportedType,
    #[strum(serialize = "batch size limit reached")]
    BatchLimit,
}

/// A rejected file and the specific reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub candidate: FileCandidate,
    pub reason: RejectionReason,
    /// Human-readable reason carrying the limit that was applied.
    pub detail: String,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.candidate.name, self.detail)
    }
}

/// Formats a byte count the way limits are shown to the user.
fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * KIB;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{} MiB", bytes / MIB)
    } else if bytes >= KIB && bytes % KIB == 0 {
        format!("{} KiB", bytes / KIB)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Lifecycle of an upload item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UploadStatus {
    Pending,
    Uploading,
    Complete,
    Error,
}

/// An admitted file tracked through the upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadItem {
    pub id: String,
    pub file: FileCandidate,
    /// Displayed progress, 0..=100. Not a success signal.
    pub progress: u8,
    pub status: UploadStatus,
}

impl UploadItem {
    pub fn new(file: FileCandidate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            file,
            progress: 0,
            status: UploadStatus::Pending,
        }
    }

    /// Advances displayed progress by `step`, never beyond `ceiling`.
    pub fn advance(&mut self, step: u8, ceiling: u8) {
        if self.status == UploadStatus::Uploading {
            self.progress = self.progress.saturating_add(step).min(ceiling.min(100));
        }
    }

    pub fn complete(&mut self) {
        self.progress = 100;
        self.status = UploadStatus::Complete;
    }

    pub fn fail(&mut self) {
        self.status = UploadStatus::Error;
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, UploadStatus::Complete | UploadStatus::Error)
    }
}

/// Result of admitting one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdmissionReport {
    pub accepted: Vec<UploadItem>,
    pub rejected: Vec<Rejection>,
}

impl AdmissionReport {
    pub fn total(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }
}

/// Limits applied to each selected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionPolicy {
    pub max_file_bytes: u64,
    pub max_batch_size: usize,
    pub supported_extensions: Vec<String>,
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self {
            max_file_bytes: MAX_FILE_BYTES,
            max_batch_size: MAX_BATCH_SIZE,
            supported_extensions: SUPPORTED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl AdmissionPolicy {
    pub fn is_supported(&self, candidate: &FileCandidate) -> bool {
        candidate
            .extension()
            .is_some_and(|ext| self.supported_extensions.iter().any(|s| *s == ext))
    }

    /// Describes `reason` with this policy's limits.
    pub fn describe(&self, reason: RejectionReason) -> String {
        match reason {
            RejectionReason::Oversize => format!(
                "file exceeds the {} limit",
                format_size(self.max_file_bytes)
            ),
            RejectionReason::UnsupportedType => reason.to_string(),
            RejectionReason::BatchLimit => {
                format!("batch is limited to {} files", self.max_batch_size)
            }
        }
    }

    /// Splits a batch into accepted items and per-item rejections.
    ///
    /// `already_queued` counts items already holding batch slots. Every input
    /// ends up in exactly one of the two lists.
    pub fn admit(&self, candidates: Vec<FileCandidate>, already_queued: usize) -> AdmissionReport {
        let mut report = AdmissionReport::default();

        for candidate in candidates {
            let reason = if !self.is_supported(&candidate) {
                Some(RejectionReason::UnsupportedType)
            } else if candidate.size_bytes > self.max_file_bytes {
                Some(RejectionReason::Oversize)
            } else if already_queued + report.accepted.len() >= self.max_batch_size {
                Some(RejectionReason::BatchLimit)
            } else {
                None
            };

            match reason {
                Some(reason) => {
                    tracing::debug!(
                        "[Admission] Rejected {}: {}",
                        candidate.name,
                        reason
                    );
                    let detail = self.describe(reason);
                    report.rejected.push(Rejection {
                        candidate,
                        reason,
                        detail,
                    });
                }
                None => report.accepted.push(UploadItem::new(candidate)),
            }
        }

        report
    }
}
