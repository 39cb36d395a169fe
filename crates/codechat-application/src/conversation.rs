//! ConversationEngine - transcript ownership and per-turn routing.
//!
//! The engine is parameterized by one [`Resolver`] picked when the mode is
//! decided. Only one turn may be unresolved at a time, so assistant replies
//! are appended in send order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use codechat_core::config::ClientConfig;
use codechat_core::gateway::RemoteGateway;
use codechat_core::notification::NotificationSink;
use codechat_core::quick_action::QuickAction;
use codechat_core::session::{ConversationMode, Message, MessageMetadata, Readiness};
use codechat_core::{CodechatError, Result};
use codechat_interaction::{DemoResolver, LiveResolver, Resolver, Turn};
use tokio::sync::RwLock;

use crate::prompts;

pub const WELCOME_MESSAGE: &str = "Welcome! Upload files or connect a GitHub repository, \
then ask me anything about the code.";

pub const APOLOGY_MESSAGE: &str =
    "Sorry, I couldn't get an answer from the backend for that message. Please try again.";

const CANCELLED_ERROR: &str = "turn cancelled before a reply arrived";

/// Builds the resolver for a decided mode.
#[derive(Clone)]
pub struct ResolverFactory {
    gateway: Arc<dyn RemoteGateway>,
    max_tokens: Option<u32>,
    demo_delay: Duration,
}

impl ResolverFactory {
    pub fn new(gateway: Arc<dyn RemoteGateway>, config: &ClientConfig) -> Self {
        Self {
            gateway,
            max_tokens: config.max_tokens,
            demo_delay: config.demo_reply_delay(),
        }
    }

    pub fn for_mode(&self, mode: ConversationMode) -> Arc<dyn Resolver> {
        match mode {
            ConversationMode::Live => {
                Arc::new(LiveResolver::new(self.gateway.clone(), self.max_tokens))
            }
            ConversationMode::Demo => Arc::new(DemoResolver::new(self.demo_delay)),
        }
    }
}

fn lock_transcript(transcript: &Mutex<Vec<Message>>) -> MutexGuard<'_, Vec<Message>> {
    // Messages are only ever pushed whole; a poisoned lock still holds a valid transcript.
    transcript.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One unresolved turn.
///
/// Dropping the guard clears the in-flight flag. If the turn is dropped
/// before [`TurnGuard::answer`], the apology is appended so every user
/// message still gets exactly one assistant reply.
struct TurnGuard<'a> {
    flag: &'a AtomicBool,
    transcript: &'a Mutex<Vec<Message>>,
    answered: bool,
}

impl TurnGuard<'_> {
    fn ask(&self, prompt: &str) {
        lock_transcript(self.transcript).push(Message::user(prompt));
    }

    fn answer(mut self, reply: Message) -> Message {
        lock_transcript(self.transcript).push(reply.clone());
        self.answered = true;
        reply
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        if !self.answered {
            tracing::warn!("[ConversationEngine] Turn dropped before resolution");
            lock_transcript(self.transcript).push(Message::assistant(
                APOLOGY_MESSAGE,
                Some(MessageMetadata::Failed {
                    error: CANCELLED_ERROR.to_string(),
                }),
            ));
        }
        self.flag.store(false, Ordering::SeqCst);
    }
}

pub struct ConversationEngine {
    factory: ResolverFactory,
    notifier: NotificationSink,
    resolver: RwLock<Option<Arc<dyn Resolver>>>,
    transcript: Mutex<Vec<Message>>,
    in_flight: AtomicBool,
}

impl ConversationEngine {
    /// Creates an engine with an undecided mode and the welcome message.
    pub fn new(factory: ResolverFactory, notifier: NotificationSink) -> Self {
        Self {
            factory,
            notifier,
            resolver: RwLock::new(None),
            transcript: Mutex::new(vec![Message::assistant(WELCOME_MESSAGE, None)]),
            in_flight: AtomicBool::new(false),
        }
    }

    pub async fn mode(&self) -> Option<ConversationMode> {
        self.resolver.read().await.as_ref().map(|r| r.mode())
    }

    /// Decides the mode on the first observation; later calls keep it.
    pub async fn observe_readiness(&self, readiness: Readiness) -> ConversationMode {
        let mut resolver = self.resolver.write().await;
        if let Some(current) = resolver.as_ref() {
            return current.mode();
        }
        let mode = ConversationMode::for_readiness(readiness);
        tracing::info!(
            "[ConversationEngine] Mode decided: {} (readiness {})",
            mode,
            readiness
        );
        *resolver = Some(self.factory.for_mode(mode));
        mode
    }

    /// Re-checks the mode after a completed ingestion.
    ///
    /// A demo conversation switches to live once data is confirmed; the
    /// transcript is kept. A live mode is never downgraded here, only by
    /// [`ConversationEngine::reset_mode`].
    pub async fn observe_ingestion(&self, readiness: Readiness) -> ConversationMode {
        let mut resolver = self.resolver.write().await;
        match resolver.as_ref().map(|r| r.mode()) {
            Some(ConversationMode::Live) => return ConversationMode::Live,
            Some(ConversationMode::Demo) if !readiness.has_data() => {
                return ConversationMode::Demo;
            }
            _ => {}
        }
        let mode = ConversationMode::for_readiness(readiness);
        tracing::info!(
            "[ConversationEngine] Mode after ingestion: {} (readiness {})",
            mode,
            readiness
        );
        *resolver = Some(self.factory.for_mode(mode));
        mode
    }

    /// Returns the engine to an undecided mode after an explicit reset.
    pub async fn reset_mode(&self) {
        *self.resolver.write().await = None;
        tracing::debug!("[ConversationEngine] Mode cleared");
    }

    pub async fn transcript(&self) -> Vec<Message> {
        lock_transcript(&self.transcript).clone()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Sends a general chat turn and returns the assistant reply.
    pub async fn send(&self, text: &str) -> Result<Message> {
        let text = text.trim();
        if text.is_empty() {
            return Err(self.reject(CodechatError::EmptyMessage));
        }
        self.run_turn(Turn::chat(text)).await
    }

    pub async fn send_quick_action(&self, action: QuickAction) -> Result<Message> {
        self.run_turn(Turn::chat(action.prompt())).await
    }

    /// Asks for an explanation of one file.
    pub async fn explain_file(&self, file_path: &str) -> Result<Message> {
        let file_path = file_path.trim();
        if file_path.is_empty() {
            return Err(self.reject(CodechatError::EmptyMessage));
        }
        let prompt = prompts::explain_file_prompt(file_path).map_err(|e| self.reject(e))?;
        self.run_turn(Turn::Explain {
            file_path: file_path.to_string(),
            prompt,
        })
        .await
    }

    async fn run_turn(&self, turn: Turn) -> Result<Message> {
        let resolver = self
            .resolver
            .read()
            .await
            .clone()
            .ok_or_else(|| self.reject(CodechatError::ModeUndecided))?;

        let guard = self.begin_turn().map_err(|e| self.reject(e))?;
        guard.ask(turn.prompt());

        let reply = match resolver.resolve(&turn).await {
            Ok(resolution) => Message::assistant(resolution.content, Some(resolution.metadata)),
            Err(err) => {
                tracing::error!("[ConversationEngine] Turn failed: {}", err);
                self.notifier.error("Message failed", err.to_string());
                Message::assistant(
                    APOLOGY_MESSAGE,
                    Some(MessageMetadata::Failed {
                        error: err.to_string(),
                    }),
                )
            }
        };

        Ok(guard.answer(reply))
    }

    fn begin_turn(&self) -> Result<TurnGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| CodechatError::TurnInFlight)?;
        Ok(TurnGuard {
            flag: &self.in_flight,
            transcript: &self.transcript,
            answered: false,
        })
    }

    fn reject(&self, err: CodechatError) -> CodechatError {
        tracing::warn!("[ConversationEngine] Turn rejected: {}", err);
        self.notifier.error("Message not sent", err.to_string());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard<'a>(flag: &'a AtomicBool, transcript: &'a Mutex<Vec<Message>>) -> TurnGuard<'a> {
        flag.store(true, Ordering::SeqCst);
        TurnGuard {
            flag,
            transcript,
            answered: false,
        }
    }

    #[test]
    fn test_answered_turn_appends_reply_once() {
        let flag = AtomicBool::new(false);
        let transcript = Mutex::new(Vec::new());
        {
            let turn = guard(&flag, &transcript);
            turn.ask("hi");
            assert!(flag.load(Ordering::SeqCst));
            turn.answer(Message::assistant("hello", None));
        }
        assert!(!flag.load(Ordering::SeqCst));
        let transcript = transcript.into_inner().unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1].content, "hello");
    }

    #[test]
    fn test_dropped_turn_appends_apology() {
        let flag = AtomicBool::new(false);
        let transcript = Mutex::new(Vec::new());
        {
            let turn = guard(&flag, &transcript);
            turn.ask("hi");
        }
        assert!(!flag.load(Ordering::SeqCst));
        let transcript = transcript.into_inner().unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1].content, APOLOGY_MESSAGE);
        assert!(transcript[1].is_failure());
    }
}
