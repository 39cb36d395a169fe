//! Application layer for codechat.
//!
//! Use cases that reconcile backend responses into client state: the session
//! store, the two ingestion coordinators and the conversation engine.
//!
//! Every `Err` returned from these use cases has already been reported once
//! through the [`NotificationSink`](codechat_core::notification::NotificationSink)
//! and left state fully defined; callers only decide what to render.

pub mod conversation;
pub mod ingestion;
pub mod prompts;
pub mod session_store;

pub use conversation::{ConversationEngine, ResolverFactory};
pub use ingestion::{GithubCoordinator, IngestionSlot, UploadCoordinator, UploadReport};
pub use session_store::{SessionStore, SessionView};
