use std::time::Duration;

use async_trait::async_trait;
use codechat_core::Result;
use codechat_core::session::{ConversationMode, MessageMetadata};

use super::{Resolution, Resolver, Turn};

const UPLOAD_HINT: &str =
    "Upload files or connect a GitHub repository to get answers about your own code.";

/// Network-free resolver used while no corpus is loaded.
#[derive(Debug, Clone)]
pub struct DemoResolver {
    delay: Duration,
}

impl DemoResolver {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Resolver for DemoResolver {
    fn mode(&self) -> ConversationMode {
        ConversationMode::Demo
    }

    async fn resolve(&self, turn: &Turn) -> Result<Resolution> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(Resolution {
            content: demo_reply(turn),
            metadata: MessageMetadata::Demo,
        })
    }
}

/// Deterministic demo answer for `turn`; depends only on its text.
pub fn demo_reply(turn: &Turn) -> String {
    let body = match turn {
        Turn::Explain { file_path, .. } => format!(
            "In demo mode I can't read `{}`. Once the repository is ingested, \
             I'll walk through what the file does, its key functions and how it \
             connects to the rest of the codebase.",
            file_path
        ),
        Turn::Chat { message } => topic_reply(&message.to_lowercase()).to_string(),
    };
    format!("{}\n\n_{}_", body, UPLOAD_HINT)
}

fn topic_reply(text: &str) -> &'static str {
    let mentions = |words: &[&str]| words.iter().any(|word| text.contains(word));

    if mentions(&["architecture", "structure", "overview"]) {
        "This is demo mode, so there's no real codebase to describe yet. With a \
         repository loaded I'd map out its top-level modules, the entry points, \
         and how requests move between layers."
    } else if mentions(&["bug", "error", "issue", "crash"]) {
        "In demo mode I can't inspect real code for bugs. With a corpus loaded I \
         look for unchecked errors, missing edge cases and risky concurrency, and \
         point at the exact files involved."
    } else if mentions(&["improve", "refactor", "clean"]) {
        "Improvement suggestions need real code. Once something is ingested I \
         can point out duplication, unclear naming and places where tests are \
         missing."
    } else if mentions(&["flow", "pipeline"]) {
        "Data-flow questions are answered by tracing calls across files, which \
         needs an ingested repository. Try again after uploading."
    } else if mentions(&["depend", "librar", "package", "import"]) {
        "Dependency analysis reads manifests and import statements from your \
         code. Nothing is loaded yet, so there is nothing to list."
    } else if mentions(&["component", "function", "class", "module"]) {
        "Once code is loaded I can list its main components and summarize what \
         each one is responsible for."
    } else if mentions(&["hello", "hi ", "hey"]) || text.trim() == "hi" {
        "Hi! I'm running in demo mode right now. Ask me about architecture, \
         bugs, improvements or dependencies to see what I can do."
    } else {
        "I'm running in demo mode, so this answer isn't based on any real code. \
         Ask about architecture, components, bugs, data flow or dependencies \
         once a repository is loaded."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_selection() {
        assert!(demo_reply(&Turn::chat("Show me the ARCHITECTURE")).contains("top-level modules"));
        assert!(demo_reply(&Turn::chat("any bugs?")).contains("unchecked errors"));
        assert!(demo_reply(&Turn::chat("what's the weather")).contains("demo mode"));
    }

    #[test]
    fn test_explain_reply_names_the_file() {
        let turn = Turn::Explain {
            file_path: "src/main.rs".to_string(),
            prompt: "Explain src/main.rs".to_string(),
        };
        assert!(demo_reply(&turn).contains("`src/main.rs`"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_waits_for_delay() {
        let resolver = DemoResolver::new(Duration::from_millis(600));
        let started = tokio::time::Instant::now();
        let resolution = resolver.resolve(&Turn::chat("hello")).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(600));
        assert_eq!(resolution.metadata, MessageMetadata::Demo);
        assert_eq!(resolver.mode(), ConversationMode::Demo);
    }
}
