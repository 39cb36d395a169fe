//! Session domain module.
//!
//! This module contains the client-side view of a backend session: the
//! snapshot returned by the session query, the readiness value derived from
//! it, the file tree of the ingested corpus, and the conversation transcript
//! types.
//!
//! # Module Structure
//!
//! - `snapshot`: Backend session snapshot (`SessionSnapshot`, `FeatureFlags`)
//! - `readiness`: Tri-state readiness and its monotonic merge (`Readiness`, `Evidence`)
//! - `file_tree`: Wire tree nodes and the path-keyed arena (`FileTreeNode`, `FileTree`)
//! - `message`: Transcript messages (`Message`, `MessageRole`, `MessageMetadata`)
//! - `mode`: Live/demo routing mode (`ConversationMode`)

mod file_tree;
mod message;
mod mode;
mod readiness;
mod snapshot;

pub use file_tree::{FileTree, FileTreeNode, NodeKind, TreeEntry, TreeRow, TreeViewState};
pub use message::{
    ExplanationStats, FileSummaryEntry, Message, MessageMetadata, MessageRole, RetrievalStats,
};
pub use mode::ConversationMode;
pub use readiness::{Evidence, Readiness};
pub use snapshot::{FeatureFlags, SessionSnapshot};
