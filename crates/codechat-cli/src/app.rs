//! Wiring of gateway, store, coordinators and conversation.

use std::sync::Arc;

use anyhow::{Context, Result};
use codechat_application::{
    ConversationEngine, GithubCoordinator, IngestionSlot, ResolverFactory, SessionStore,
    UploadCoordinator,
};
use codechat_core::config::ClientConfig;
use codechat_core::gateway::{HealthStatus, RemoteGateway};
use codechat_core::notification::{Notification, NotificationSink};
use codechat_interaction::HttpGateway;
use tokio::sync::mpsc::UnboundedReceiver;

pub struct App {
    pub config: ClientConfig,
    pub gateway: Arc<dyn RemoteGateway>,
    pub store: Arc<SessionStore>,
    pub upload: UploadCoordinator,
    pub github: GithubCoordinator,
    factory: ResolverFactory,
    sink: NotificationSink,
    notifications: UnboundedReceiver<Notification>,
}

impl App {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let gateway: Arc<dyn RemoteGateway> =
            Arc::new(HttpGateway::new(&config).context("Failed to create HTTP gateway")?);
        let (sink, notifications) = NotificationSink::channel();

        let store = Arc::new(SessionStore::new(gateway.clone(), sink.clone()));
        let slot = Arc::new(IngestionSlot::new());
        let upload = UploadCoordinator::new(
            gateway.clone(),
            store.clone(),
            slot.clone(),
            sink.clone(),
            &config,
        );
        let github = GithubCoordinator::new(
            gateway.clone(),
            store.clone(),
            slot,
            sink.clone(),
            &config,
        );
        let factory = ResolverFactory::new(gateway.clone(), &config);

        tracing::info!("[App] Using backend at {}", config.api_base_url);
        Ok(Self {
            config,
            gateway,
            store,
            upload,
            github,
            factory,
            sink,
            notifications,
        })
    }

    /// Creates a fresh conversation whose mode follows the current readiness.
    pub async fn mount_conversation(&self) -> ConversationEngine {
        // Failure is reported through notifications; readiness is then Unknown.
        let _ = self.store.refresh_session().await;
        let engine = ConversationEngine::new(self.factory.clone(), self.sink.clone());
        engine.observe_readiness(self.store.readiness().await).await;
        engine
    }

    /// Health check; `None` when the backend cannot be reached.
    pub async fn health(&self) -> Option<HealthStatus> {
        match self.gateway.health().await {
            Ok(health) => Some(health),
            Err(err) => {
                tracing::warn!("[App] Health check failed: {}", err);
                None
            }
        }
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        let mut drained = Vec::new();
        while let Ok(notification) = self.notifications.try_recv() {
            drained.push(notification);
        }
        drained
    }
}
