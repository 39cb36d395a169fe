//! Data readiness of the backend session.
//!
//! Readiness is tri-state so that "backend unreachable" is never conflated
//! with "backend confirmed empty". All writers go through [`Readiness::merge`].

use serde::{Deserialize, Serialize};

/// Whether the backend currently holds an analyzable corpus.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Readiness {
    /// No answer from the backend yet (or it could not be reached).
    #[default]
    Unknown,
    /// The backend answered and holds no corpus.
    Empty,
    /// Some source confirmed that a corpus exists.
    Present,
}

/// A fact observed about readiness, fed into [`Readiness::merge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evidence {
    /// A response confirmed data exists (session query, non-empty tree,
    /// successful ingestion).
    Confirmed,
    /// A successful response that does not confirm data.
    Unconfirmed,
    /// The backend could not be reached.
    Unreachable,
    /// An explicit reset completed.
    Reset,
}

impl Readiness {
    /// Returns true only when data has been confirmed.
    pub fn has_data(self) -> bool {
        matches!(self, Readiness::Present)
    }

    /// Folds a new piece of evidence into the current value.
    ///
    /// `Present` is sticky: only [`Evidence::Reset`] leaves it.
    pub fn merge(self, evidence: Evidence) -> Readiness {
        match (self, evidence) {
            (_, Evidence::Reset) => Readiness::Empty,
            (_, Evidence::Confirmed) => Readiness::Present,
            (Readiness::Present, _) => Readiness::Present,
            (_, Evidence::Unconfirmed) => Readiness::Empty,
            (_, Evidence::Unreachable) => Readiness::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_EVIDENCE: [Evidence; 4] = [
        Evidence::Confirmed,
        Evidence::Unconfirmed,
        Evidence::Unreachable,
        Evidence::Reset,
    ];

    #[test]
    fn test_present_survives_everything_but_reset() {
        for evidence in [Evidence::Confirmed, Evidence::Unconfirmed, Evidence::Unreachable] {
            assert_eq!(Readiness::Present.merge(evidence), Readiness::Present);
        }
        assert_eq!(Readiness::Present.merge(Evidence::Reset), Readiness::Empty);
    }

    #[test]
    fn test_monotonic_over_all_sequences_without_reset() {
        let non_reset = [Evidence::Confirmed, Evidence::Unconfirmed, Evidence::Unreachable];
        for a in non_reset {
            for b in non_reset {
                for c in non_reset {
                    let mut readiness = Readiness::Unknown;
                    let mut seen_confirmed = false;
                    for evidence in [a, b, c] {
                        readiness = readiness.merge(evidence);
                        seen_confirmed |= evidence == Evidence::Confirmed;
                        assert_eq!(readiness.has_data(), seen_confirmed);
                    }
                }
            }
        }
    }

    #[test]
    fn test_reset_always_lands_on_empty() {
        for start in [Readiness::Unknown, Readiness::Empty, Readiness::Present] {
            assert_eq!(start.merge(Evidence::Reset), Readiness::Empty);
        }
    }

    #[test]
    fn test_unreachable_does_not_claim_empty() {
        assert_eq!(Readiness::Empty.merge(Evidence::Unreachable), Readiness::Unknown);
        assert_eq!(Readiness::Unknown.merge(Evidence::Unconfirmed), Readiness::Empty);
    }

    #[test]
    fn test_merge_is_idempotent() {
        for start in [Readiness::Unknown, Readiness::Empty, Readiness::Present] {
            for evidence in ALL_EVIDENCE {
                let once = start.merge(evidence);
                assert_eq!(once.merge(evidence), once);
            }
        }
    }
}
