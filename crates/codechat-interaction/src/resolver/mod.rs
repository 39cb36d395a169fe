//! Per-turn resolvers.
//!
//! The conversation engine is parameterized by one [`Resolver`] chosen when
//! its mode is decided: [`LiveResolver`] goes to the backend, [`DemoResolver`]
//! answers locally.

mod demo;
mod live;

use async_trait::async_trait;
use codechat_core::Result;
use codechat_core::session::{ConversationMode, MessageMetadata};

pub use demo::{DemoResolver, demo_reply};
pub use live::LiveResolver;

/// What a user turn asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    /// General question about the corpus.
    Chat { message: String },
    /// Explanation of one file. `prompt` is the text shown in the transcript.
    Explain { file_path: String, prompt: String },
}

impl Turn {
    pub fn chat(message: impl Into<String>) -> Self {
        Turn::Chat {
            message: message.into(),
        }
    }

    /// Text recorded as the user message for this turn.
    pub fn prompt(&self) -> &str {
        match self {
            Turn::Chat { message } => message,
            Turn::Explain { prompt, .. } => prompt,
        }
    }
}

/// Assistant reply produced for a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub content: String,
    pub metadata: MessageMetadata,
}

/// Answers one turn.
#[async_trait]
pub trait Resolver: Send + Sync {
    fn mode(&self) -> ConversationMode;

    async fn resolve(&self, turn: &Turn) -> Result<Resolution>;
}
