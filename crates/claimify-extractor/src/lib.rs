//! Claimify Extractor
//!
//! Extracts atomic, independently verifiable claims from a long answer to a
//! question.
//!
//! # Overview
//!
//! The answer is segmented into sentences. Each sentence, together with a
//! window of neighbouring sentences, goes through three language-model stages:
//!
//! 1. **Selection**: keep only sentences with a specific, verifiable proposition
//! 2. **Disambiguation**: rewrite the sentence so it stands without context
//! 3. **Decomposition**: split it into minimal propositions
//!
//! # Architecture
//!
//! ```text
//! Answer → Segmenter → Sentences ─┬─ Context Window ─┐
//!                                 └──────────────────┴→ Pipeline → Gateway → Claims
//! ```
//!
//! # Example Usage
//!
//! ```
//! use claimify_extractor::{Extractor, ExtractorConfig};
//! use claimify_llm::MockGateway;
//!
//! # tokio_test::block_on(async {
//! let gateway = MockGateway::new("NO_VERIFIABLE_CLAIMS");
//! let extractor = Extractor::new(gateway, ExtractorConfig::default())?;
//!
//! let claims = extractor
//!     .extract("What could AI do?", "AI could lead to advancements in healthcare.")
//!     .await?;
//! assert!(claims.is_empty());
//! # Ok::<(), claimify_extractor::ExtractorError>(())
//! # }).unwrap();
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
mod metrics;
pub mod parser;
mod pipeline;
pub mod prompt;
mod segment;
mod types;


pub use config::ExtractorConfig;
pub use error::{ExtractorError, ParseError, StageError};
pub use extractor::Extractor;
pub use metrics::ExtractionMetrics;
pub use prompt::{system_prompt, PromptBuilder};
pub use segment::{segment, split_paragraphs, MIN_SENTENCE_CHARS};
pub use types::{ExtractionMetadata, ExtractionRequest, ExtractionResult, SentenceReport};

pub use tokio_util::sync::CancellationToken;
