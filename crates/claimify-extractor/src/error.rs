//! Error types for the Extractor

use claimify_domain::RejectReason;
use std::time::Duration;
use thiserror::Error;

/// Errors that can end an extraction run
///
/// Per-sentence failures never surface here; they reject the sentence and the
/// run continues. Only configuration problems, oversized input and a run in
/// which every sentence hit a service failure are reported to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractorError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Answer exceeds the configured maximum length
    #[error("Answer too long: {length} chars (max: {max})")]
    AnswerTooLong {
        /// Length of the answer in characters
        length: usize,
        /// Configured maximum
        max: usize,
    },

    /// Every sentence failed with a service error
    #[error("All {sentences} sentences failed; last error: {last_error}")]
    AllSentencesFailed {
        /// Number of sentences attempted
        sentences: usize,
        /// Message of the last service failure
        last_error: String,
    },
}

/// Stage output that could not be mapped to a typed result
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The reply was empty
    #[error("empty reply")]
    Empty,

    /// An expected marker or field was not found
    #[error("missing marker: {0}")]
    MissingMarker(&'static str),

    /// The reply contradicts itself
    #[error("contradictory output: {0}")]
    Contradictory(String),
}

/// Failure of one stage invocation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StageError {
    /// The gateway returned an error
    #[error("{0}")]
    Service(String),

    /// The gateway did not answer within the stage timeout
    #[error("stage call timed out after {0:?}")]
    Timeout(Duration),

    /// The reply could not be parsed
    #[error("{0}")]
    Parse(#[from] ParseError),

    /// The parsed verdict did not fit the sentence's current state
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
}

impl StageError {
    /// How a sentence that hit this error is reported
    pub fn reject_reason(&self) -> RejectReason {
        match self {
            StageError::Service(_) | StageError::Timeout(_) => RejectReason::Service(self.to_string()),
            StageError::Parse(_) | StageError::InvalidTransition(_) => {
                RejectReason::Malformed(self.to_string())
            }
        }
    }
}
