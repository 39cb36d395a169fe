#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use codechat_core::config::ClientConfig;
use codechat_core::gateway::{
    ChatRequest, ChatResponse, ExplainResponse, FileTreeResponse, HealthStatus, RemoteGateway,
    ResetResponse, UploadResponse,
};
use codechat_core::ingest::{ChunkingConfig, FileCandidate, RepositoryUrl};
use codechat_core::notification::{Notification, NotificationLevel};
use codechat_core::session::{
    ExplanationStats, FeatureFlags, FileTreeNode, RetrievalStats, SessionSnapshot,
};
use codechat_core::{CodechatError, Result};
use tokio::sync::{Notify, mpsc};

#[derive(Default)]
pub struct Calls {
    pub session: AtomicUsize,
    pub tree: AtomicUsize,
    pub reset: AtomicUsize,
    pub upload: AtomicUsize,
    pub github: AtomicUsize,
    pub chat: AtomicUsize,
    pub explain: AtomicUsize,
}

impl Calls {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

type Gates = Mutex<VecDeque<Arc<Notify>>>;

/// Scripted gateway. Each operation returns a clone of its configured
/// result; a queued gate makes the next call of that operation wait until
/// the test notifies it.
pub struct MockGateway {
    pub session: Mutex<Result<SessionSnapshot>>,
    pub tree: Mutex<Result<FileTreeResponse>>,
    pub reset: Mutex<Result<ResetResponse>>,
    pub upload: Mutex<Result<UploadResponse>>,
    pub github: Mutex<Result<UploadResponse>>,
    pub chat: Mutex<Result<ChatResponse>>,
    pub explain: Mutex<Result<ExplainResponse>>,
    pub calls: Calls,
    pub last_github: Mutex<Option<(RepositoryUrl, ChunkingConfig)>>,
    /// When set, a successful reset does not clear the scripted corpus.
    pub keep_data_on_reset: AtomicBool,
    session_gates: Gates,
    tree_gates: Gates,
    upload_gates: Gates,
    github_gates: Gates,
    chat_gates: Gates,
}

impl MockGateway {
    /// Backend reachable, nothing ingested.
    pub fn empty() -> Self {
        Self {
            session: Mutex::new(Ok(snapshot(false))),
            tree: Mutex::new(Ok(empty_tree())),
            reset: Mutex::new(Ok(ResetResponse {
                success: true,
                message: "Session reset successfully".to_string(),
                namespace: "fresh".to_string(),
            })),
            upload: Mutex::new(Ok(UploadResponse {
                success: true,
                message: "Processed 12 chunks from 3 files".to_string(),
                namespace: "ns-1".to_string(),
                config: Some(ChunkingConfig::default()),
            })),
            github: Mutex::new(Ok(UploadResponse {
                success: true,
                message: "Repository processed: 40 chunks from 9 files".to_string(),
                namespace: "ns-1".to_string(),
                config: None,
            })),
            chat: Mutex::new(Ok(ChatResponse {
                success: true,
                response: "The entry point is main.py.".to_string(),
                metadata: RetrievalStats {
                    chunks_found: 5,
                    files_involved: 2,
                    retrieval_reranked: true,
                    ..RetrievalStats::default()
                },
            })),
            explain: Mutex::new(Ok(ExplainResponse {
                success: true,
                response: "This file wires the routes.".to_string(),
                metadata: ExplanationStats {
                    source: "embedded".to_string(),
                    chunks_used: Some(4),
                    ..ExplanationStats::default()
                },
            })),
            calls: Calls::default(),
            last_github: Mutex::new(None),
            keep_data_on_reset: AtomicBool::new(false),
            session_gates: Mutex::new(VecDeque::new()),
            tree_gates: Mutex::new(VecDeque::new()),
            upload_gates: Mutex::new(VecDeque::new()),
            github_gates: Mutex::new(VecDeque::new()),
            chat_gates: Mutex::new(VecDeque::new()),
        }
    }

    /// Backend reachable with an ingested corpus.
    pub fn with_data() -> Self {
        let gateway = Self::empty();
        gateway.set_session(Ok(snapshot(true)));
        gateway.set_tree(Ok(sample_tree()));
        gateway
    }

    pub fn set_session(&self, result: Result<SessionSnapshot>) {
        *self.session.lock().unwrap() = result;
    }

    pub fn set_tree(&self, result: Result<FileTreeResponse>) {
        *self.tree.lock().unwrap() = result;
    }

    pub fn set_reset(&self, result: Result<ResetResponse>) {
        *self.reset.lock().unwrap() = result;
    }

    pub fn set_upload(&self, result: Result<UploadResponse>) {
        *self.upload.lock().unwrap() = result;
    }

    pub fn set_github(&self, result: Result<UploadResponse>) {
        *self.github.lock().unwrap() = result;
    }

    pub fn set_chat(&self, result: Result<ChatResponse>) {
        *self.chat.lock().unwrap() = result;
    }

    pub fn gate_session(&self) -> Arc<Notify> {
        push_gate(&self.session_gates)
    }

    pub fn gate_tree(&self) -> Arc<Notify> {
        push_gate(&self.tree_gates)
    }

    pub fn gate_upload(&self) -> Arc<Notify> {
        push_gate(&self.upload_gates)
    }

    pub fn gate_github(&self) -> Arc<Notify> {
        push_gate(&self.github_gates)
    }

    pub fn gate_chat(&self) -> Arc<Notify> {
        push_gate(&self.chat_gates)
    }
}

fn push_gate(gates: &Gates) -> Arc<Notify> {
    let gate = Arc::new(Notify::new());
    gates.lock().unwrap().push_back(gate.clone());
    gate
}

async fn pass_gate(gates: &Gates) {
    let gate = gates.lock().unwrap().pop_front();
    if let Some(gate) = gate {
        gate.notified().await;
    }
}

#[async_trait]
impl RemoteGateway for MockGateway {
    async fn health(&self) -> Result<HealthStatus> {
        Ok(HealthStatus {
            status: "ok".to_string(),
            message: "RAG Code Reviewer is running".to_string(),
            features: vec!["reranking".to_string()],
        })
    }

    async fn session_info(&self) -> Result<SessionSnapshot> {
        self.calls.session.fetch_add(1, Ordering::SeqCst);
        pass_gate(&self.session_gates).await;
        self.session.lock().unwrap().clone()
    }

    async fn reset_session(&self) -> Result<ResetResponse> {
        self.calls.reset.fetch_add(1, Ordering::SeqCst);
        let result = self.reset.lock().unwrap().clone();
        if result.is_ok() && !self.keep_data_on_reset.load(Ordering::SeqCst) {
            self.set_session(Ok(snapshot(false)));
            self.set_tree(Ok(empty_tree()));
        }
        result
    }

    async fn file_tree(&self) -> Result<FileTreeResponse> {
        self.calls.tree.fetch_add(1, Ordering::SeqCst);
        pass_gate(&self.tree_gates).await;
        self.tree.lock().unwrap().clone()
    }

    async fn upload_files(
        &self,
        _files: &[FileCandidate],
        _config: &ChunkingConfig,
    ) -> Result<UploadResponse> {
        self.calls.upload.fetch_add(1, Ordering::SeqCst);
        pass_gate(&self.upload_gates).await;
        let result = self.upload.lock().unwrap().clone();
        if result.is_ok() {
            self.set_session(Ok(snapshot(true)));
            self.set_tree(Ok(sample_tree()));
        }
        result
    }

    async fn upload_github(
        &self,
        repository: &RepositoryUrl,
        config: &ChunkingConfig,
    ) -> Result<UploadResponse> {
        self.calls.github.fetch_add(1, Ordering::SeqCst);
        *self.last_github.lock().unwrap() = Some((repository.clone(), *config));
        pass_gate(&self.github_gates).await;
        let result = self.github.lock().unwrap().clone();
        if result.is_ok() {
            self.set_session(Ok(snapshot(true)));
            self.set_tree(Ok(sample_tree()));
        }
        result
    }

    async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse> {
        self.calls.chat.fetch_add(1, Ordering::SeqCst);
        pass_gate(&self.chat_gates).await;
        self.chat.lock().unwrap().clone()
    }

    async fn explain_file(&self, _file_path: &str) -> Result<ExplainResponse> {
        self.calls.explain.fetch_add(1, Ordering::SeqCst);
        self.explain.lock().unwrap().clone()
    }
}

pub fn snapshot(has_data: bool) -> SessionSnapshot {
    SessionSnapshot {
        namespace: "ns-1".to_string(),
        has_data,
        files_processed: if has_data { 3 } else { 0 },
        features: FeatureFlags::default(),
    }
}

pub fn empty_tree() -> FileTreeResponse {
    FileTreeResponse {
        success: false,
        message: Some("No files uploaded yet".to_string()),
        ..FileTreeResponse::default()
    }
}

pub fn sample_tree() -> FileTreeResponse {
    FileTreeResponse {
        success: true,
        tree: vec![
            FileTreeNode::folder(
                "src",
                "src",
                vec![
                    FileTreeNode::file("main.py", "src/main.py"),
                    FileTreeNode::file("util.py", "src/util.py"),
                ],
            ),
            FileTreeNode::file("README.md", "README.md"),
        ],
        root_path: Some("/data/repo".to_string()),
        total_files: Some(3),
        files_processed: Some(3),
        ..FileTreeResponse::default()
    }
}

pub fn gateway_down(operation: &'static str) -> CodechatError {
    CodechatError::gateway(operation, "connection refused")
}

/// Fast timings for coordinator tests.
pub fn test_config() -> ClientConfig {
    ClientConfig {
        demo_reply_delay_ms: 0,
        progress_tick_ms: 10,
        ..ClientConfig::default()
    }
}

pub fn drain(receiver: &mut mpsc::UnboundedReceiver<Notification>) -> Vec<Notification> {
    let mut out = Vec::new();
    while let Ok(notification) = receiver.try_recv() {
        out.push(notification);
    }
    out
}

pub fn count_level(notifications: &[Notification], level: NotificationLevel) -> usize {
    notifications.iter().filter(|n| n.level == level).count()
}

/// Waits until `counter` reaches `expected`, yielding to other tasks.
pub async fn wait_for_calls(counter: &AtomicUsize, expected: usize) {
    while counter.load(Ordering::SeqCst) < expected {
        tokio::task::yield_now().await;
    }
}
