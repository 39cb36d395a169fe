//! SessionStore - single writer of session truth.
//!
//! Holds the latest session snapshot, the path-keyed file tree, the tri-state
//! readiness and the loading counter. Readiness changes only through
//! [`Readiness::merge`]; responses issued before the latest reset are
//! discarded by comparing reset epochs.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use codechat_core::Result;
use codechat_core::gateway::RemoteGateway;
use codechat_core::notification::NotificationSink;
use codechat_core::session::{Evidence, FileTree, Readiness, SessionSnapshot};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct SessionState {
    snapshot: Option<SessionSnapshot>,
    readiness: Readiness,
    tree: FileTree,
    /// Incremented by every reset; queries remember the value they started with.
    epoch: u64,
}

/// Read-only copy of the store for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub snapshot: Option<SessionSnapshot>,
    pub readiness: Readiness,
    pub tree: FileTree,
    pub is_loading: bool,
}

impl SessionView {
    pub fn has_data(&self) -> bool {
        self.readiness.has_data()
    }
}

/// Decrements the loading counter when dropped.
struct LoadingGuard<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> LoadingGuard<'a> {
    fn new(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self { counter }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Process-wide session state, shared as `Arc<SessionStore>`.
pub struct SessionStore {
    gateway: Arc<dyn RemoteGateway>,
    notifier: NotificationSink,
    state: RwLock<SessionState>,
    loading: AtomicUsize,
}

impl SessionStore {
    pub fn new(gateway: Arc<dyn RemoteGateway>, notifier: NotificationSink) -> Self {
        Self {
            gateway,
            notifier,
            state: RwLock::new(SessionState::default()),
            loading: AtomicUsize::new(0),
        }
    }

    pub async fn view(&self) -> SessionView {
        let state = self.state.read().await;
        SessionView {
            snapshot: state.snapshot.clone(),
            readiness: state.readiness,
            tree: state.tree.clone(),
            is_loading: self.is_loading(),
        }
    }

    pub async fn readiness(&self) -> Readiness {
        self.state.read().await.readiness
    }

    pub async fn has_data(&self) -> bool {
        self.readiness().await.has_data()
    }

    pub async fn tree(&self) -> FileTree {
        self.state.read().await.tree.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst) > 0
    }

    /// Number of resets so far; pair with [`SessionStore::confirm_ingestion`].
    pub async fn reset_epoch(&self) -> u64 {
        self.state.read().await.epoch
    }

    /// Queries the session and merges the answer into readiness.
    ///
    /// On a confirmed corpus the file tree is refreshed before returning. On
    /// failure the snapshot is dropped; a previously confirmed readiness and
    /// its tree are kept, anything else falls back to `Unknown`.
    pub async fn refresh_session(&self) -> Result<Readiness> {
        let _loading = LoadingGuard::new(&self.loading);
        let epoch = self.reset_epoch().await;

        match self.gateway.session_info().await {
            Ok(snapshot) => {
                let readiness = {
                    let mut state = self.state.write().await;
                    if state.epoch != epoch {
                        tracing::debug!("[SessionStore] Discarding pre-reset session response");
                        return Ok(state.readiness);
                    }
                    let evidence = if snapshot.has_data {
                        Evidence::Confirmed
                    } else {
                        Evidence::Unconfirmed
                    };
                    state.readiness = state.readiness.merge(evidence);
                    tracing::debug!(
                        "[SessionStore] Session {} has_data={} -> readiness {}",
                        snapshot.namespace,
                        snapshot.has_data,
                        state.readiness
                    );
                    state.snapshot = Some(snapshot);
                    if !state.readiness.has_data() {
                        state.tree = FileTree::default();
                    }
                    state.readiness
                };

                if readiness.has_data() {
                    // Failure is already reported by refresh_file_tree.
                    let _ = self.refresh_file_tree().await;
                }
                Ok(self.readiness().await)
            }
            Err(err) => {
                {
                    let mut state = self.state.write().await;
                    if state.epoch != epoch {
                        tracing::debug!("[SessionStore] Discarding pre-reset session failure");
                        return Err(err);
                    }
                    state.snapshot = None;
                    state.readiness = state.readiness.merge(Evidence::Unreachable);
                    if !state.readiness.has_data() {
                        state.tree = FileTree::default();
                    }
                }
                tracing::error!("[SessionStore] Session query failed: {}", err);
                self.notifier
                    .error("Could not reach the backend", err.to_string());
                Err(err)
            }
        }
    }

    /// Resets the backend session and clears local truth.
    ///
    /// After a successful reset readiness is `Empty` and the tree is empty,
    /// whatever the follow-up session query reported. A failed reset call
    /// leaves state untouched.
    pub async fn reset_session(&self) -> Result<SessionView> {
        let _loading = LoadingGuard::new(&self.loading);

        let response = match self.gateway.reset_session().await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!("[SessionStore] Reset failed: {}", err);
                self.notifier.error("Reset failed", err.to_string());
                return Err(err);
            }
        };
        tracing::info!(
            "[SessionStore] Backend session reset, new namespace {}",
            response.namespace
        );

        self.clear_after_reset(false).await;
        // Failure is already reported by refresh_session.
        let _ = self.refresh_session().await;
        self.clear_after_reset(true).await;

        self.notifier.success("Session reset", response.message);
        Ok(self.view().await)
    }

    async fn clear_after_reset(&self, keep_snapshot: bool) {
        let mut state = self.state.write().await;
        state.epoch += 1;
        state.readiness = state.readiness.merge(Evidence::Reset);
        state.tree = FileTree::default();
        if !keep_snapshot {
            state.snapshot = None;
        }
    }

    /// Queries the file tree and replaces the local copy.
    ///
    /// A non-empty tree confirms data. An empty tree or the "no files yet"
    /// sentinel leaves readiness alone. On failure the local tree is
    /// cleared and readiness is not touched.
    pub async fn refresh_file_tree(&self) -> Result<usize> {
        let _loading = LoadingGuard::new(&self.loading);
        let epoch = self.reset_epoch().await;

        match self.gateway.file_tree().await {
            Ok(response) => {
                let tree = FileTree::from_nodes(response.tree);
                let mut state = self.state.write().await;
                if state.epoch != epoch {
                    tracing::debug!("[SessionStore] Discarding pre-reset tree response");
                    return Ok(state.tree.len());
                }
                if tree.is_empty() {
                    if let Some(message) = response.message {
                        tracing::debug!("[SessionStore] Empty tree: {}", message);
                    }
                } else {
                    state.readiness = state.readiness.merge(Evidence::Confirmed);
                }
                tracing::debug!(
                    "[SessionStore] File tree replaced ({} files)",
                    tree.file_count()
                );
                state.tree = tree;
                Ok(state.tree.len())
            }
            Err(err) => {
                {
                    let mut state = self.state.write().await;
                    if state.epoch != epoch {
                        return Err(err);
                    }
                    state.tree = FileTree::default();
                }
                tracing::warn!("[SessionStore] File tree query failed: {}", err);
                self.notifier
                    .error("Could not load the file tree", err.to_string());
                Err(err)
            }
        }
    }

    /// Confirms data for an ingestion that started at reset epoch `epoch`.
    ///
    /// Returns `None` without touching readiness when a reset completed or
    /// began since then.
    pub async fn confirm_ingestion(&self, epoch: u64) -> Option<Readiness> {
        let mut state = self.state.write().await;
        if state.epoch != epoch {
            tracing::debug!(
                "[SessionStore] Ingestion from epoch {} finished after a reset (now {})",
                epoch,
                state.epoch
            );
            return None;
        }
        state.readiness = state.readiness.merge(Evidence::Confirmed);
        Some(state.readiness)
    }

    /// Optimistic readiness update.
    ///
    /// `true` confirms data; `false` never downgrades a confirmed state.
    pub async fn set_has_data(&self, has_data: bool) -> Readiness {
        let evidence = if has_data {
            Evidence::Confirmed
        } else {
            Evidence::Unconfirmed
        };
        let mut state = self.state.write().await;
        state.readiness = state.readiness.merge(evidence);
        state.readiness
    }
}
