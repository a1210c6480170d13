//! Stage module - the three pipeline stages and the per-sentence state machine
//!
//! Every sentence starts `Pending` and moves through the stages strictly in
//! order:
//!
//! ```text
//! Pending ─Selection─▶ Selected ─Disambiguation─▶ Disambiguated ─Decomposition─▶ Decomposed
//!    │                     │                            │
//!    └─────────────────────┴────────────────────────────┴──────▶ Rejected
//! ```
//!
//! `Decomposed` and `Rejected` are terminal. Only `Decomposed` carries claims.

use crate::claim::Claim;
use std::fmt;

/// One language-model-backed transformation in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Does the sentence contain a verifiable proposition?
    Selection,

    /// Rewrite the sentence so it stands without context
    Disambiguation,

    /// Split the sentence into atomic propositions
    Decomposition,
}

impl Stage {
    /// All stages in pipeline order
    pub const ALL: [Stage; 3] = [Stage::Selection, Stage::Disambiguation, Stage::Decomposition];

    /// Get the stage name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Selection => "selection",
            Stage::Disambiguation => "disambiguation",
            Stage::Decomposition => "decomposition",
        }
    }

    /// Upper-case task label used in user prompts
    pub fn task_label(&self) -> &'static str {
        match self {
            Stage::Selection => "SELECTION",
            Stage::Disambiguation => "DISAMBIGUATION",
            Stage::Decomposition => "DECOMPOSITION",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed result of the Selection stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionVerdict {
    /// The sentence holds at least one verifiable proposition
    Verifiable {
        /// Sentence with editorializing stripped (or the original if unchanged)
        revised: String,
    },

    /// Nothing in the sentence can be checked
    NotVerifiable,
}

/// Typed result of the Disambiguation stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisambiguationVerdict {
    /// The sentence was decontextualized
    Resolved {
        /// Fully decontextualized sentence
        sentence: String,
    },

    /// Readers would not converge on one interpretation
    Ambiguous,
}

/// Why a sentence ended without claims
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Selection found no verifiable proposition
    NotVerifiable,

    /// Disambiguation found irreducible ambiguity
    Ambiguous,

    /// Decomposition produced an empty proposition list
    NoPropositions,

    /// Stage output lacked the expected markers
    Malformed(String),

    /// The language-model call failed or timed out
    Service(String),

    /// The extraction was cancelled before this sentence finished
    Cancelled,
}

impl RejectReason {
    /// Short machine-friendly label
    pub fn label(&self) -> &'static str {
        match self {
            RejectReason::NotVerifiable => "not_verifiable",
            RejectReason::Ambiguous => "ambiguous",
            RejectReason::NoPropositions => "no_propositions",
            RejectReason::Malformed(_) => "malformed",
            RejectReason::Service(_) => "service",
            RejectReason::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Malformed(detail) => write!(f, "malformed output: {}", detail),
            RejectReason::Service(detail) => write!(f, "service error: {}", detail),
            other => f.write_str(other.label()),
        }
    }
}

/// Where one sentence currently is in the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SentenceState {
    /// Not yet processed
    #[default]
    Pending,

    /// Passed Selection; carries the revised sentence
    Selected {
        /// Revised sentence
        sentence: String,
    },

    /// Passed Disambiguation; carries the decontextualized sentence
    Disambiguated {
        /// Decontextualized sentence
        sentence: String,
    },

    /// Terminal: decomposed into at least one claim
    Decomposed {
        /// Claims in decomposition order
        claims: Vec<Claim>,
    },

    /// Terminal: contributes no claims
    Rejected {
        /// Stage at which the sentence was dropped (`None` when no stage is to blame)
        stage: Option<Stage>,

        /// Why it was dropped
        reason: RejectReason,
    },
}

impl SentenceState {
    /// Whether no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, SentenceState::Decomposed { .. } | SentenceState::Rejected { .. })
    }

    /// The stage that should run next, if any
    pub fn next_stage(&self) -> Option<Stage> {
        match self {
            SentenceState::Pending => Some(Stage::Selection),
            SentenceState::Selected { .. } => Some(Stage::Disambiguation),
            SentenceState::Disambiguated { .. } => Some(Stage::Decomposition),
            SentenceState::Decomposed { .. } | SentenceState::Rejected { .. } => None,
        }
    }

    /// The sentence text carried into the next stage, if any
    pub fn carried_sentence(&self) -> Option<&str> {
        match self {
            SentenceState::Selected { sentence } | SentenceState::Disambiguated { sentence } => {
                Some(sentence)
            }
            _ => None,
        }
    }

    /// Claims produced by this sentence (empty unless decomposed)
    pub fn claims(&self) -> &[Claim] {
        match self {
            SentenceState::Decomposed { claims } => claims,
            _ => &[],
        }
    }

    /// Apply the Selection verdict (`Pending` only)
    pub fn apply_selection(self, verdict: SelectionVerdict) -> Result<Self, String> {
        self.expect_stage(Stage::Selection)?;
        Ok(match verdict {
            SelectionVerdict::Verifiable { revised } => SentenceState::Selected { sentence: revised },
            SelectionVerdict::NotVerifiable => SentenceState::Rejected {
                stage: Some(Stage::Selection),
                reason: RejectReason::NotVerifiable,
            },
        })
    }

    /// Apply the Disambiguation verdict (`Selected` only)
    pub fn apply_disambiguation(self, verdict: DisambiguationVerdict) -> Result<Self, String> {
        self.expect_stage(Stage::Disambiguation)?;
        Ok(match verdict {
            DisambiguationVerdict::Resolved { sentence } => SentenceState::Disambiguated { sentence },
            DisambiguationVerdict::Ambiguous => SentenceState::Rejected {
                stage: Some(Stage::Disambiguation),
                reason: RejectReason::Ambiguous,
            },
        })
    }

    /// Apply the Decomposition result (`Disambiguated` only)
    ///
    /// Empty propositions are discarded; if none remain the sentence is rejected.
    pub fn apply_decomposition(self, propositions: Vec<Claim>) -> Result<Self, String> {
        self.expect_stage(Stage::Decomposition)?;
        let claims: Vec<Claim> = propositions.into_iter().filter(|c| !c.is_empty()).collect();
        Ok(if claims.is_empty() {
            SentenceState::Rejected {
                stage: Some(Stage::Decomposition),
                reason: RejectReason::NoPropositions,
            }
        } else {
            SentenceState::Decomposed { claims }
        })
    }

    /// Reject at whatever stage would have run next
    ///
    /// Terminal states are returned unchanged.
    pub fn reject(self, reason: RejectReason) -> Self {
        if self.is_terminal() {
            return self;
        }
        SentenceState::Rejected {
            stage: self.next_stage(),
            reason,
        }
    }

    fn expect_stage(&self, stage: Stage) -> Result<(), String> {
        match self.next_stage() {
            Some(next) if next == stage => Ok(()),
            Some(next) => Err(format!("cannot apply {} while {} is pending", stage, next)),
            None => Err(format!("cannot apply {} to a terminal state", stage)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifiable(s: &str) -> SelectionVerdict {
        SelectionVerdict::Verifiable { revised: s.to_string() }
    }

    #[test]
    fn test_happy_path() {
        let state = SentenceState::Pending
            .apply_selection(verifiable("Smith advocates for renewable energy."))
            .unwrap();
        assert_eq!(state.next_stage(), Some(Stage::Disambiguation));
        assert_eq!(state.carried_sentence(), Some("Smith advocates for renewable energy."));

        let state = state
            .apply_disambiguation(DisambiguationVerdict::Resolved {
                sentence: "Smith advocates for renewable energy.".to_string(),
            })
            .unwrap();
        let state = state
            .apply_decomposition(vec![Claim::new("Smith advocates for renewable energy.")])
            .unwrap();

        assert!(state.is_terminal());
        assert_eq!(state.claims().len(), 1);
    }

    #[test]
    fn test_selection_rejects() {
        let state = SentenceState::Pending
            .apply_selection(SelectionVerdict::NotVerifiable)
            .unwrap();
        assert_eq!(
            state,
            SentenceState::Rejected {
                stage: Some(Stage::Selection),
                reason: RejectReason::NotVerifiable,
            }
        );
        assert!(state.claims().is_empty());
    }

    #[test]
    fn test_ambiguous_rejects() {
        let state = SentenceState::Selected { sentence: "He led it.".to_string() }
            .apply_disambiguation(DisambiguationVerdict::Ambiguous)
            .unwrap();
        assert!(matches!(
            state,
            SentenceState::Rejected { stage: Some(Stage::Disambiguation), reason: RejectReason::Ambiguous }
        ));
    }

    #[test]
    fn test_empty_decomposition_rejects() {
        let state = SentenceState::Disambiguated { sentence: "x".to_string() }
            .apply_decomposition(vec![Claim::new("  ")])
            .unwrap();
        assert!(matches!(
            state,
            SentenceState::Rejected { reason: RejectReason::NoPropositions, .. }
        ));
    }

    #[test]
    fn test_out_of_order_transition_is_error() {
        let result = SentenceState::Pending.apply_decomposition(vec![Claim::new("a")]);
        assert!(result.is_err());

        let terminal = SentenceState::Pending
            .apply_selection(SelectionVerdict::NotVerifiable)
            .unwrap();
        assert!(terminal.apply_selection(verifiable("a")).is_err());
    }

    #[test]
    fn test_reject_records_pending_stage() {
        let state = SentenceState::Selected { sentence: "x".to_string() }
            .reject(RejectReason::Service("timeout".to_string()));
        assert!(matches!(
            state,
            SentenceState::Rejected { stage: Some(Stage::Disambiguation), reason: RejectReason::Service(_) }
        ));
    }

    #[test]
    fn test_reject_keeps_terminal_state() {
        let done = SentenceState::Decomposed { claims: vec![Claim::new("a")] };
        let after = done.clone().reject(RejectReason::Cancelled);
        assert_eq!(after, done);
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(RejectReason::Ambiguous.to_string(), "ambiguous");
        assert_eq!(
            RejectReason::Service("HTTP 500".to_string()).to_string(),
            "service error: HTTP 500"
        );
    }
}
