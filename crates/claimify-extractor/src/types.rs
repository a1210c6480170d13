//! Request and response types for extraction

use crate::metrics::ExtractionMetrics;
use claimify_domain::{Claim, SentenceState};
use serde::{Deserialize, Serialize};

/// Request to extract claims from one answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRequest {
    /// Question the answer responds to
    pub question: String,

    /// Answer text to extract claims from
    pub answer: String,

    /// Look-back override (config value when `None`)
    #[serde(default)]
    pub preceding: Option<usize>,

    /// Look-forward override (config value when `None`)
    #[serde(default)]
    pub following: Option<usize>,
}

impl ExtractionRequest {
    /// Create a request using the configured window sizes
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            preceding: None,
            following: None,
        }
    }

    /// Override the context window sizes for this request
    pub fn with_window(mut self, preceding: usize, following: usize) -> Self {
        self.preceding = Some(preceding);
        self.following = Some(following);
        self
    }
}

/// Trace of one sentence through the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceReport {
    /// Position in the segmented answer
    pub index: usize,

    /// Sentence text as segmented
    pub text: String,

    /// Rendered context window passed to the stages
    pub context: String,

    /// Terminal state reached
    pub state: SentenceState,
}

impl SentenceReport {
    /// Claims this sentence contributed
    pub fn claims(&self) -> &[Claim] {
        self.state.claims()
    }

    /// Whether the sentence ended without claims
    pub fn is_rejected(&self) -> bool {
        matches!(self.state, SentenceState::Rejected { .. })
    }
}

/// Result of an extraction run
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Claims in sentence order, then decomposition order
    pub claims: Vec<Claim>,

    /// One report per segmented sentence, in order
    pub sentences: Vec<SentenceReport>,

    /// Metadata about the run
    pub metadata: ExtractionMetadata,

    /// Per-outcome counters
    pub metrics: ExtractionMetrics,
}

impl ExtractionResult {
    /// Claim texts in output order
    pub fn claim_texts(&self) -> Vec<&str> {
        self.claims.iter().map(Claim::as_str).collect()
    }
}

/// Metadata about an extraction run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionMetadata {
    /// Name of the LLM model used
    pub model_name: String,

    /// Number of segmented sentences
    pub sentence_count: usize,

    /// Stage calls sent to the gateway
    pub gateway_calls: usize,

    /// Look-back used
    pub preceding: usize,

    /// Look-forward used
    pub following: usize,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,

    /// Whether the run was cancelled before every sentence finished
    pub cancelled: bool,
}
