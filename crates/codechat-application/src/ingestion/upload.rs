use std::sync::Arc;
use std::time::Duration;

use codechat_core::config::ClientConfig;
use codechat_core::gateway::{RemoteGateway, UploadResponse};
use codechat_core::ingest::{
    AdmissionPolicy, ChunkingConfig, FileCandidate, IngestionKind, Rejection, UploadItem,
    UploadStatus,
};
use codechat_core::notification::NotificationSink;
use codechat_core::{CodechatError, Result};
use tokio::sync::RwLock;

use super::IngestionSlot;
use crate::session_store::SessionStore;

const PROGRESS_STEP: u8 = 10;
const PROGRESS_CEILING: u8 = 90;

/// Outcome of one upload submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadReport {
    /// Ids of the items sent to the backend.
    pub submitted: Vec<String>,
    /// Items turned away by admission in this call.
    pub rejected: Vec<Rejection>,
    /// Backend answer; `None` when nothing was submitted.
    pub response: Option<UploadResponse>,
}

/// Drives the file-upload flow from selection to a terminal state.
pub struct UploadCoordinator {
    gateway: Arc<dyn RemoteGateway>,
    store: Arc<SessionStore>,
    slot: Arc<IngestionSlot>,
    notifier: NotificationSink,
    policy: AdmissionPolicy,
    progress_tick: Duration,
    deadline: Duration,
    items: RwLock<Vec<UploadItem>>,
}

impl UploadCoordinator {
    pub fn new(
        gateway: Arc<dyn RemoteGateway>,
        store: Arc<SessionStore>,
        slot: Arc<IngestionSlot>,
        notifier: NotificationSink,
        config: &ClientConfig,
    ) -> Self {
        Self {
            gateway,
            store,
            slot,
            notifier,
            policy: AdmissionPolicy::default(),
            progress_tick: config.progress_tick(),
            deadline: config.ingestion_timeout(),
            items: RwLock::new(Vec::new()),
        }
    }

    pub fn with_policy(mut self, policy: AdmissionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn items(&self) -> Vec<UploadItem> {
        self.items.read().await.clone()
    }

    /// Admits `candidates` into the queue; returns the per-item rejections.
    ///
    /// Items still pending or uploading count against the batch limit.
    pub async fn select(&self, candidates: Vec<FileCandidate>) -> Vec<Rejection> {
        let mut items = self.items.write().await;
        let queued = items.iter().filter(|item| !item.is_terminal()).count();
        let report = self.policy.admit(candidates, queued);

        tracing::debug!(
            "[UploadCoordinator] Admitted {} of {} file(s)",
            report.accepted.len(),
            report.total()
        );
        items.extend(report.accepted);

        if !report.rejected.is_empty() {
            let summary = report
                .rejected
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            tracing::warn!("[UploadCoordinator] Rejected: {}", summary);
            self.notifier.error(
                format!("{} file(s) rejected", report.rejected.len()),
                summary,
            );
        }
        report.rejected
    }

    /// Removes an item at any status. Returns false for an unknown id.
    pub async fn remove(&self, id: &str) -> bool {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|item| item.id != id);
        items.len() != before
    }

    /// Drops items that reached a terminal status.
    pub async fn clear_finished(&self) {
        self.items.write().await.retain(|item| !item.is_terminal());
    }

    /// Selects `candidates` and submits every pending item.
    pub async fn upload(
        &self,
        candidates: Vec<FileCandidate>,
        config: ChunkingConfig,
    ) -> Result<UploadReport> {
        let rejected = self.select(candidates).await;
        let mut report = self.submit(config).await?;
        report.rejected = rejected;
        Ok(report)
    }

    /// Sends all pending items to the backend in one request.
    ///
    /// Nothing pending is a no-op. Success is decided by the gateway answer
    /// only; displayed progress never exceeds the ceiling until then.
    pub async fn submit(&self, config: ChunkingConfig) -> Result<UploadReport> {
        let config = config.clamped();

        let pending: Vec<UploadItem> = self
            .items
            .read()
            .await
            .iter()
            .filter(|item| item.status == UploadStatus::Pending)
            .cloned()
            .collect();
        if pending.is_empty() {
            tracing::debug!("[UploadCoordinator] Nothing to upload");
            return Ok(UploadReport::default());
        }

        let _permit = match self.slot.try_acquire(IngestionKind::FileUpload) {
            Ok(permit) => permit,
            Err(err) => {
                self.notifier.error("Upload not started", err.to_string());
                return Err(err);
            }
        };

        let ids: Vec<String> = pending.iter().map(|item| item.id.clone()).collect();
        let files: Vec<FileCandidate> = pending.into_iter().map(|item| item.file).collect();
        self.update(&ids, |item| item.status = UploadStatus::Uploading)
            .await;
        tracing::info!(
            "[UploadCoordinator] Uploading {} file(s) (chunk_size={}, chunk_overlap={})",
            files.len(),
            config.chunk_size,
            config.chunk_overlap
        );

        let epoch = self.store.reset_epoch().await;
        let result = self.run_with_progress(&ids, &files, &config).await;

        match result {
            Ok(response) => {
                self.update(&ids, UploadItem::complete).await;
                if self.store.confirm_ingestion(epoch).await.is_some() {
                    // Failure is already reported by refresh_file_tree.
                    let _ = self.store.refresh_file_tree().await;
                }
                self.notifier
                    .success("Files uploaded", response.message.clone());
                Ok(UploadReport {
                    submitted: ids,
                    rejected: Vec::new(),
                    response: Some(response),
                })
            }
            Err(err) => {
                self.update(&ids, UploadItem::fail).await;
                tracing::error!("[UploadCoordinator] Upload failed: {}", err);
                self.notifier.error("Upload failed", err.to_string());
                Err(err)
            }
        }
    }

    async fn run_with_progress(
        &self,
        ids: &[String],
        files: &[FileCandidate],
        config: &ChunkingConfig,
    ) -> Result<UploadResponse> {
        let upload = tokio::time::timeout(self.deadline, self.gateway.upload_files(files, config));
        tokio::pin!(upload);
        let mut ticker = tokio::time::interval(self.progress_tick);
        ticker.tick().await;

        loop {
            tokio::select! {
                outcome = &mut upload => {
                    return outcome.unwrap_or_else(|_| {
                        Err(CodechatError::timeout("upload-file", self.deadline.as_secs()))
                    });
                }
                _ = ticker.tick() => {
                    self.update(ids, |item| item.advance(PROGRESS_STEP, PROGRESS_CEILING)).await;
                }
            }
        }
    }

    async fn update<F>(&self, ids: &[String], mut apply: F)
    where
        F: FnMut(&mut UploadItem),
    {
        let mut items = self.items.write().await;
        // Items removed by the user mid-upload are simply skipped.
        for item in items.iter_mut().filter(|item| ids.contains(&item.id)) {
            apply(item);
        }
    }
}
