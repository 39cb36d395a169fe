use std::sync::Arc;
use std::time::Duration;

use codechat_core::config::ClientConfig;
use codechat_core::gateway::{RemoteGateway, UploadResponse};
use codechat_core::ingest::{
    ChunkingConfig, IngestionKind, ProcessingPipeline, RepositoryUrl, validate_github_url,
};
use codechat_core::notification::NotificationSink;
use codechat_core::{CodechatError, Result};
use tokio::sync::RwLock;

use super::IngestionSlot;
use crate::session_store::SessionStore;

/// Drives the GitHub-clone flow through its processing stages.
pub struct GithubCoordinator {
    gateway: Arc<dyn RemoteGateway>,
    store: Arc<SessionStore>,
    slot: Arc<IngestionSlot>,
    notifier: NotificationSink,
    stage_tick: Duration,
    deadline: Duration,
    pipeline: RwLock<ProcessingPipeline>,
}

impl GithubCoordinator {
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
            stage_tick: config.progress_tick(),
            deadline: config.ingestion_timeout(),
            pipeline: RwLock::new(ProcessingPipeline::new()),
        }
    }

    /// Current stage sequence of the last (or running) submission.
    pub async fn pipeline(&self) -> ProcessingPipeline {
        self.pipeline.read().await.clone()
    }

    /// Validates `url` and ingests the repository.
    pub async fn submit(&self, url: &str, config: ChunkingConfig) -> Result<UploadResponse> {
        let repository = match validate_github_url(url) {
            Ok(repository) => repository,
            Err(rejection) => {
                let err = CodechatError::from(rejection);
                tracing::warn!("[GithubCoordinator] {}", err);
                self.notifier.error("Invalid repository URL", rejection.to_string());
                return Err(err);
            }
        };
        if let Some(branch) = &repository.branch {
            tracing::debug!(
                "[GithubCoordinator] Branch '{}' requested; backend clones the default branch",
                branch
            );
        }

        let _permit = match self.slot.try_acquire(IngestionKind::GithubClone) {
            Ok(permit) => permit,
            Err(err) => {
                self.notifier.error("Clone not started", err.to_string());
                return Err(err);
            }
        };

        {
            let mut pipeline = self.pipeline.write().await;
            *pipeline = ProcessingPipeline::new();
            pipeline.start();
        }
        tracing::info!("[GithubCoordinator] Ingesting {}", repository.slug());

        let epoch = self.store.reset_epoch().await;
        match self.run_with_stages(&repository, &config.clamped()).await {
            Ok(response) => {
                self.pipeline.write().await.complete();
                if self.store.confirm_ingestion(epoch).await.is_some() {
                    // Failure is already reported by refresh_file_tree.
                    let _ = self.store.refresh_file_tree().await;
                }
                self.notifier
                    .success(format!("{} ingested", repository.slug()), response.message.clone());
                Ok(response)
            }
            Err(err) => {
                let failed_at = self.pipeline.write().await.fail();
                tracing::error!(
                    "[GithubCoordinator] Ingestion of {} failed at {:?}: {}",
                    repository.slug(),
                    failed_at,
                    err
                );
                self.notifier.error("Repository ingestion failed", err.to_string());
                Err(err)
            }
        }
    }

    async fn run_with_stages(
        &self,
        repository: &RepositoryUrl,
        config: &ChunkingConfig,
    ) -> Result<UploadResponse> {
        let clone = tokio::time::timeout(
            self.deadline,
            self.gateway.upload_github(repository, config),
        );
        tokio::pin!(clone);
        let mut ticker = tokio::time::interval(self.stage_tick);
        ticker.tick().await;

        loop {
            tokio::select! {
                outcome = &mut clone => {
                    return outcome.unwrap_or_else(|_| {
                        Err(CodechatError::timeout("upload-github", self.deadline.as_secs()))
                    });
                }
                _ = ticker.tick() => {
                    if let Some(stage) = self.pipeline.write().await.advance() {
                        tracing::debug!("[GithubCoordinator] Stage: {}", stage);
                    }
                }
            }
        }
    }
}
