//! Quick-action chips.
//!
//! A chip is sugar over a normal chat turn: it only supplies canned prompt
//! text.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Canned prompts offered next to the chat input.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum QuickAction {
    ArchitectureOverview,
    MainComponents,
    PotentialBugs,
    Improvements,
    DataFlow,
    Dependencies,
}

impl QuickAction {
    /// All chips in display order.
    pub fn all() -> Vec<QuickAction> {
        QuickAction::iter().collect()
    }

    /// Chip at a 1-based display position.
    pub fn from_position(position: usize) -> Option<QuickAction> {
        position
            .checked_sub(1)
            .and_then(|index| QuickAction::iter().nth(index))
    }

    pub fn label(self) -> &'static str {
        match self {
            QuickAction::ArchitectureOverview => "Architecture overview",
            QuickAction::MainComponents => "Main components",
            QuickAction::PotentialBugs => "Find potential bugs",
            QuickAction::Improvements => "Suggest improvements",
            QuickAction::DataFlow => "Explain data flow",
            QuickAction::Dependencies => "List dependencies",
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            QuickAction::ArchitectureOverview => {
                "Give me an overview of this codebase's architecture and how the main parts fit together."
            }
            QuickAction::MainComponents => {
                "What are the main components, classes and functions in this codebase, and what does each one do?"
            }
            QuickAction::PotentialBugs => {
                "Review this code for potential bugs, error-handling gaps and edge cases that are not covered."
            }
            QuickAction::Improvements => {
                "What improvements would you suggest for readability, performance and maintainability?"
            }
            QuickAction::DataFlow => {
                "Explain how data flows through this codebase, from inputs to outputs."
            }
            QuickAction::Dependencies => {
                "Which external libraries and dependencies does this code use, and what for?"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_are_one_based() {
        assert_eq!(
            QuickAction::from_position(1),
            Some(QuickAction::ArchitectureOverview)
        );
        assert_eq!(QuickAction::from_position(6), Some(QuickAction::Dependencies));
        assert_eq!(QuickAction::from_position(0), None);
        assert_eq!(QuickAction::from_position(7), None);
    }

    #[test]
    fn test_every_chip_has_text() {
        for action in QuickAction::all() {
            assert!(!action.label().is_empty());
            assert!(action.prompt().ends_with('.') || action.prompt().ends_with('?'));
        }
    }
}
