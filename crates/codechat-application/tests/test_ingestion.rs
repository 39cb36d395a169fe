mod common;

use std::sync::Arc;
use std::time::Duration;

use codechat_application::{GithubCoordinator, IngestionSlot, SessionStore, UploadCoordinator};
use codechat_core::CodechatError;
use codechat_core::config::ClientConfig;
use codechat_core::ingest::{
    AdmissionPolicy, ChunkingConfig, FileCandidate, IngestionKind, MAX_FILE_BYTES,
    ProcessingStage, RejectionReason, StepStatus, UploadStatus,
};
use codechat_core::session::Readiness;
use codechat_core::notification::{Notification, NotificationLevel, NotificationSink};
use common::*;
use tokio::sync::mpsc::UnboundedReceiver;

struct Harness {
    gateway: Arc<MockGateway>,
    store: Arc<SessionStore>,
    upload: Arc<UploadCoordinator>,
    github: Arc<GithubCoordinator>,
    notifications: UnboundedReceiver<Notification>,
}

fn harness_with(gateway: MockGateway, config: ClientConfig) -> Harness {
    let gateway = Arc::new(gateway);
    let (sink, notifications) = NotificationSink::channel();
    let store = Arc::new(SessionStore::new(gateway.clone(), sink.clone()));
    let slot = Arc::new(IngestionSlot::new());
    let upload = Arc::new(UploadCoordinator::new(
        gateway.clone(),
        store.clone(),
        slot.clone(),
        sink.clone(),
        &config,
    ));
    let github = Arc::new(GithubCoordinator::new(
        gateway.clone(),
        store.clone(),
        slot,
        sink,
        &config,
    ));
    Harness {
        gateway,
        store,
        upload,
        github,
        notifications,
    }
}

fn harness() -> Harness {
    harness_with(MockGateway::empty(), test_config())
}

fn candidates() -> Vec<FileCandidate> {
    vec![
        FileCandidate::new("main.py", "/tmp/main.py", 1_200),
        FileCandidate::new("util.py", "/tmp/util.py", 800),
        FileCandidate::new("README.md", "/tmp/README.md", 300),
        FileCandidate::new("dump.json", "/tmp/dump.json", MAX_FILE_BYTES + 1),
    ]
}

#[tokio::test]
async fn test_three_valid_one_oversized() {
    let mut h = harness();

    let report = h
        .upload
        .upload(candidates(), ChunkingConfig::default())
        .await
        .unwrap();

    assert_eq!(report.submitted.len(), 3);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].reason, RejectionReason::Oversize);
    assert_eq!(report.rejected[0].candidate.name, "dump.json");

    let items = h.upload.items().await;
    assert_eq!(items.len(), 3);
    assert!(
        items
            .iter()
            .all(|item| item.status == UploadStatus::Complete && item.progress == 100)
    );

    let view = h.store.view().await;
    assert!(view.has_data());
    assert!(!view.tree.is_empty());
    assert_eq!(Calls::get(&h.gateway.calls.upload), 1);

    let sent = drain(&mut h.notifications);
    assert_eq!(count_level(&sent, NotificationLevel::Error), 1);
    assert_eq!(count_level(&sent, NotificationLevel::Success), 1);
}

#[tokio::test]
async fn test_empty_batch_after_admission_is_a_noop() {
    let h = harness();

    let report = h
        .upload
        .upload(
            vec![FileCandidate::new("photo.png", "/tmp/photo.png", 10)],
            ChunkingConfig::default(),
        )
        .await
        .unwrap();

    assert!(report.submitted.is_empty());
    assert!(report.response.is_none());
    assert_eq!(report.rejected[0].reason, RejectionReason::UnsupportedType);
    assert_eq!(Calls::get(&h.gateway.calls.upload), 0);
}

#[tokio::test]
async fn test_upload_failure_marks_items_and_keeps_readiness() {
    let mut h = harness_with(MockGateway::with_data(), test_config());
    h.store.refresh_session().await.unwrap();
    h.gateway.set_upload(Err(gateway_down("upload-file")));

    let err = h
        .upload
        .upload(candidates()[..2].to_vec(), ChunkingConfig::default())
        .await
        .unwrap_err();

    assert!(err.is_gateway());
    assert!(
        h.upload
            .items()
            .await
            .iter()
            .all(|item| item.status == UploadStatus::Error)
    );
    assert!(h.store.has_data().await);
    let sent = drain(&mut h.notifications);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].level, NotificationLevel::Error);
}

#[tokio::test(start_paused = true)]
async fn test_progress_stays_below_completion_until_response() {
    let h = harness();
    let gate = h.gateway.gate_upload();
    h.upload.select(candidates()[..1].to_vec()).await;

    let running = {
        let upload = h.upload.clone();
        tokio::spawn(async move { upload.submit(ChunkingConfig::default()).await })
    };
    wait_for_calls(&h.gateway.calls.upload, 1).await;
    tokio::time::sleep(Duration::from_secs(5)).await;

    let item = h.upload.items().await.remove(0);
    assert_eq!(item.status, UploadStatus::Uploading);
    assert!(item.progress > 0 && item.progress < 100);

    gate.notify_one();
    running.await.unwrap().unwrap();
    let item = h.upload.items().await.remove(0);
    assert_eq!(item.status, UploadStatus::Complete);
    assert_eq!(item.progress, 100);
}

#[tokio::test(start_paused = true)]
async fn test_hung_upload_times_out_and_frees_slot() {
    let config = ClientConfig {
        ingestion_timeout_secs: 2,
        ..test_config()
    };
    let h = harness_with(MockGateway::empty(), config);
    let _never = h.gateway.gate_upload();

    let err = h
        .upload
        .upload(candidates()[..1].to_vec(), ChunkingConfig::default())
        .await
        .unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(h.upload.items().await[0].status, UploadStatus::Error);
    // The slot is free again.
    h.github
        .submit("https://github.com/rust-lang/log", ChunkingConfig::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_remove_item_at_any_status() {
    let h = harness();
    h.upload.select(candidates()[..2].to_vec()).await;
    let id = h.upload.items().await[0].id.clone();

    assert!(h.upload.remove(&id).await);
    assert!(!h.upload.remove(&id).await);
    assert_eq!(h.upload.items().await.len(), 1);
}

#[tokio::test]
async fn test_batch_limit_counts_queued_items() {
    let h = harness();
    let many: Vec<FileCandidate> = (0..25)
        .map(|i| FileCandidate::new(format!("f{i}.rs"), format!("/tmp/f{i}.rs"), 10))
        .collect();

    let rejected = h.upload.select(many).await;

    assert_eq!(h.upload.items().await.len(), 20);
    assert_eq!(rejected.len(), 5);
    assert!(
        rejected
            .iter()
            .all(|r| r.reason == RejectionReason::BatchLimit)
    );
}

#[tokio::test]
async fn test_github_success_completes_every_stage() {
    let mut h = harness();

    h.github
        .submit(
            "https://github.com/owner/repo/tree/main",
            ChunkingConfig::new(1200, 150),
        )
        .await
        .unwrap();

    let pipeline = h.github.pipeline().await;
    assert!(pipeline.is_finished());
    assert!(pipeline.is_consistent());
    assert!(h.store.has_data().await);
    assert!(!h.store.tree().await.is_empty());

    let (repository, config) = h.gateway.last_github.lock().unwrap().clone().unwrap();
    assert_eq!(repository.clone_url(), "https://github.com/owner/repo");
    assert_eq!(config, ChunkingConfig::new(1200, 150));
    let sent = drain(&mut h.notifications);
    assert_eq!(count_level(&sent, NotificationLevel::Success), 1);
}

#[tokio::test]
async fn test_github_rejects_file_url_without_network() {
    let mut h = harness();

    let err = h
        .github
        .submit(
            "https://github.com/owner/repo/blob/main/x.js",
            ChunkingConfig::default(),
        )
        .await
        .unwrap_err();

    assert!(err.is_admission());
    assert!(err.to_string().contains("specific file"));
    assert_eq!(Calls::get(&h.gateway.calls.github), 0);
    assert_eq!(drain(&mut h.notifications).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_github_failure_marks_active_stage_only() {
    let h = harness();
    h.gateway.set_github(Err(gateway_down("upload-github")));
    let gate = h.gateway.gate_github();

    let running = {
        let github = h.github.clone();
        tokio::spawn(async move {
            github
                .submit("https://github.com/owner/repo", ChunkingConfig::default())
                .await
        })
    };
    wait_for_calls(&h.gateway.calls.github, 1).await;
    // One tick: Cloning completes, Parsing becomes active.
    tokio::time::sleep(Duration::from_millis(15)).await;
    let midway = h.github.pipeline().await;
    assert!(midway.is_consistent());
    assert_eq!(midway.active(), Some(ProcessingStage::Parsing));

    gate.notify_one();
    assert!(running.await.unwrap().is_err());

    let pipeline = h.github.pipeline().await;
    let statuses: Vec<StepStatus> = pipeline.steps().iter().map(|s| s.status).collect();
    assert_eq!(
        statuses,
        vec![
            StepStatus::Complete,
            StepStatus::Error,
            StepStatus::Pending,
            StepStatus::Pending
        ]
    );
    assert!(pipeline.is_consistent());
    assert!(!h.store.has_data().await);
}

#[tokio::test]
async fn test_ingestions_are_mutually_exclusive() {
    let h = harness();
    let gate = h.gateway.gate_github();

    let clone = {
        let github = h.github.clone();
        tokio::spawn(async move {
            github
                .submit("https://github.com/owner/repo", ChunkingConfig::default())
                .await
        })
    };
    wait_for_calls(&h.gateway.calls.github, 1).await;

    let err = h
        .upload
        .upload(candidates()[..1].to_vec(), ChunkingConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CodechatError::OperationInProgress {
            current: IngestionKind::GithubClone
        }
    ));
    assert_eq!(Calls::get(&h.gateway.calls.upload), 0);

    gate.notify_one();
    clone.await.unwrap().unwrap();

    // The rejected item is still pending and can be submitted now.
    h.upload.submit(ChunkingConfig::default()).await.unwrap();
    assert_eq!(Calls::get(&h.gateway.calls.upload), 1);
}

#[tokio::test]
async fn test_upload_finishing_after_reset_does_not_restore_data() {
    let h = harness();
    let gate = h.gateway.gate_upload();

    let running = {
        let upload = h.upload.clone();
        tokio::spawn(async move {
            upload
                .upload(candidates()[..1].to_vec(), ChunkingConfig::default())
                .await
        })
    };
    wait_for_calls(&h.gateway.calls.upload, 1).await;

    h.store.reset_session().await.unwrap();
    let trees_after_reset = Calls::get(&h.gateway.calls.tree);

    gate.notify_one();
    running.await.unwrap().unwrap();

    assert_eq!(h.store.readiness().await, Readiness::Empty);
    assert!(h.store.tree().await.is_empty());
    assert_eq!(Calls::get(&h.gateway.calls.tree), trees_after_reset);
    assert_eq!(
        h.upload.items().await[0].status,
        UploadStatus::Complete,
        "the backend call itself succeeded"
    );
}

#[tokio::test]
async fn test_github_finishing_after_reset_does_not_restore_data() {
    let h = harness();
    let gate = h.gateway.gate_github();

    let running = {
        let github = h.github.clone();
        tokio::spawn(async move {
            github
                .submit("https://github.com/owner/repo", ChunkingConfig::default())
                .await
        })
    };
    wait_for_calls(&h.gateway.calls.github, 1).await;
    h.store.reset_session().await.unwrap();

    gate.notify_one();
    running.await.unwrap().unwrap();

    assert!(!h.store.has_data().await);
    assert!(h.store.tree().await.is_empty());
}

#[tokio::test]
async fn test_rejection_notice_uses_configured_limits() {
    let gateway = Arc::new(MockGateway::empty());
    let (sink, mut notifications) = NotificationSink::channel();
    let store = Arc::new(SessionStore::new(gateway.clone(), sink.clone()));
    let upload = UploadCoordinator::new(
        gateway,
        store,
        Arc::new(IngestionSlot::new()),
        sink,
        &test_config(),
    )
    .with_policy(AdmissionPolicy {
        max_batch_size: 2,
        ..AdmissionPolicy::default()
    });

    let rejected = upload.select(candidates()[..3].to_vec()).await;

    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].reason, RejectionReason::BatchLimit);
    let sent = drain(&mut notifications);
    assert_eq!(sent.len(), 1);
    assert!(sent[0].message.contains("README.md: batch is limited to 2 files"));
}
