//! Conversation routing mode.

use serde::{Deserialize, Serialize};

use super::Readiness;

/// How chat turns are resolved for the lifetime of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConversationMode {
    /// Turns go to the backend.
    Live,
    /// Turns are answered locally without network access.
    Demo,
}

impl ConversationMode {
    /// Mode chosen at the first readiness observation: live only when data
    /// is confirmed.
    pub fn for_readiness(readiness: Readiness) -> Self {
        if readiness.has_data() {
            ConversationMode::Live
        } else {
            ConversationMode::Demo
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_for_readiness() {
        assert_eq!(
            ConversationMode::for_readiness(Readiness::Present),
            ConversationMode::Live
        );
        assert_eq!(
            ConversationMode::for_readiness(Readiness::Empty),
            ConversationMode::Demo
        );
        assert_eq!(
            ConversationMode::for_readiness(Readiness::Unknown),
            ConversationMode::Demo
        );
    }
}
