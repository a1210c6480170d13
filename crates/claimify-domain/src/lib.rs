//! Claimify Domain Layer
//!
//! This crate contains the core domain model for claim extraction. It defines
//! the value objects that flow through the pipeline and the trait seam to the
//! language-model service, and performs no I/O of its own.
//!
//! ## Key Concepts
//!
//! - **Sentence**: One ordered unit of the answer being fact-checked
//! - **Context Window**: The neighbouring sentences used to resolve ambiguity
//! - **Claim**: A minimal, independently verifiable proposition
//! - **Stage**: Selection, Disambiguation or Decomposition
//! - **Sentence State**: Where a sentence currently is in the pipeline
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture:
//! - Pure domain logic only
//! - Infrastructure (HTTP gateways) lives in `claimify-llm`
//! - The pipeline itself lives in `claimify-extractor`
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod claim;
pub mod context;
pub mod sentence;
pub mod stage;
pub mod traits;

// Re-exports for convenience
pub use claim::Claim;
pub use context::{build_window, ContextWindow};
pub use sentence::{index_sentences, Sentence};
pub use stage::{DisambiguationVerdict, RejectReason, SelectionVerdict, SentenceState, Stage};
pub use traits::{CompletionGateway, DETERMINISTIC_TEMPERATURE};
