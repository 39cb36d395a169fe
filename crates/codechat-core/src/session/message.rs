//! Conversation message types.
//!
//! This module contains types for representing messages in the transcript,
//! including roles and the retrieval metadata the backend attaches to replies.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the assistant (backend or demo resolver).
    Assistant,
}

/// Per-file retrieval statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummaryEntry {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub language: String,
}

/// Retrieval statistics returned with a chat reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalStats {
    #[serde(default)]
    pub chunks_found: u32,
    #[serde(default)]
    pub files_involved: u32,
    #[serde(default)]
    pub file_summary: BTreeMap<String, FileSummaryEntry>,
    #[serde(default)]
    pub retrieval_reranked: bool,
}

impl RetrievalStats {
    /// One-line `name (language)` listing of the files involved.
    pub fn files_line(&self) -> String {
        self.file_summary
            .iter()
            .map(|(name, entry)| format!("{name} ({})", entry.language))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Metadata returned with a file explanation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationStats {
    /// `embedded` or `direct_read` on success.
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub chunks_used: Option<u32>,
    #[serde(default)]
    pub file_size_kb: Option<u64>,
    #[serde(default)]
    pub was_truncated: Option<bool>,
    #[serde(default)]
    pub method: Option<String>,
}

/// Structured metadata attached to an assistant message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageMetadata {
    /// Reply to a general chat turn.
    Retrieval(RetrievalStats),
    /// Reply to an explain-file turn.
    FileExplanation(ExplanationStats),
    /// Reply synthesized locally in demo mode.
    Demo,
    /// Fallback reply written after the turn failed.
    Failed { error: String },
}

/// A single message in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content.into(), None)
    }

    pub fn assistant(content: impl Into<String>, metadata: Option<MessageMetadata>) -> Self {
        Self::new(MessageRole::Assistant, content.into(), metadata)
    }

    fn new(role: MessageRole, content: String, metadata: Option<MessageMetadata>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            timestamp: Utc::now(),
            metadata,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.metadata, Some(MessageMetadata::Failed { .. }))
    }
}
