//! Backend session snapshot.

use serde::{Deserialize, Serialize};

/// Retrieval features advertised by the backend for the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    #[serde(default)]
    pub hosted_embeddings: bool,
    #[serde(default)]
    pub reranking: bool,
    #[serde(default)]
    pub dynamic_topk: bool,
    #[serde(default)]
    pub token_management: bool,
}

impl FeatureFlags {
    /// Names of the enabled features, in a stable order.
    pub fn enabled(&self) -> Vec<&'static str> {
        [
            ("hosted_embeddings", self.hosted_embeddings),
            ("reranking", self.reranking),
            ("dynamic_topk", self.dynamic_topk),
            ("token_management", self.token_management),
        ]
        .into_iter()
        .filter_map(|(name, on)| on.then_some(name))
        .collect()
    }
}

/// Immutable result of the session query.
///
/// The store replaces its snapshot wholesale on every successful query and
/// never patches individual fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Backend namespace scoping this session's corpus.
    pub namespace: String,
    /// Whether the backend reports an analyzable corpus.
    pub has_data: bool,
    /// Number of files the backend ingested for this namespace.
    #[serde(default)]
    pub files_processed: u64,
    #[serde(default)]
    pub features: FeatureFlags,
}
