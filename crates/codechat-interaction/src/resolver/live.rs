use std::sync::Arc;

use async_trait::async_trait;
use codechat_core::Result;
use codechat_core::gateway::{ChatRequest, RemoteGateway};
use codechat_core::session::{ConversationMode, MessageMetadata};

use super::{Resolution, Resolver, Turn};

/// Resolves turns through the backend. Each turn issues exactly one call:
/// `chat` for general turns, `explain_file` for explain turns.
#[derive(Clone)]
pub struct LiveResolver {
    gateway: Arc<dyn RemoteGateway>,
    max_tokens: Option<u32>,
}

impl LiveResolver {
    pub fn new(gateway: Arc<dyn RemoteGateway>, max_tokens: Option<u32>) -> Self {
        Self {
            gateway,
            max_tokens,
        }
    }
}

#[async_trait]
impl Resolver for LiveResolver {
    fn mode(&self) -> ConversationMode {
        ConversationMode::Live
    }

    async fn resolve(&self, turn: &Turn) -> Result<Resolution> {
        match turn {
            Turn::Chat { message } => {
                let request = ChatRequest {
                    message: message.clone(),
                    max_tokens: self.max_tokens,
                };
                let response = self.gateway.chat(&request).await?;
                tracing::debug!(
                    "[LiveResolver] chat answered from {} chunk(s)",
                    response.metadata.chunks_found
                );
                Ok(Resolution {
                    content: response.response,
                    metadata: MessageMetadata::Retrieval(response.metadata),
                })
            }
            Turn::Explain { file_path, .. } => {
                let response = self.gateway.explain_file(file_path).await?;
                tracing::debug!(
                    "[LiveResolver] explained {} via {}",
                    file_path,
                    response.metadata.source
                );
                Ok(Resolution {
                    content: response.response,
                    metadata: MessageMetadata::FileExplanation(response.metadata),
                })
            }
        }
    }
}
