//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::metrics::ExtractionMetrics;
use crate::pipeline::SentencePipeline;
use crate::segment::segment;
use crate::types::{ExtractionMetadata, ExtractionRequest, ExtractionResult, SentenceReport};
use claimify_domain::{build_window, Claim, CompletionGateway, RejectReason, SentenceState};
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// The Extractor turns a question/answer pair into atomic claims
///
/// Owns its gateway; one Extractor can serve any number of runs.
pub struct Extractor<G>
where
    G: CompletionGateway,
{
    gateway: Arc<G>,
    config: ExtractorConfig,
}

impl<G> Extractor<G>
where
    G: CompletionGateway,
{
    /// Create a new Extractor
    ///
    /// # Errors
    ///
    /// Returns [`ExtractorError::Config`] if `config` does not validate.
    pub fn new(gateway: G, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        Self::with_shared_gateway(Arc::new(gateway), config)
    }

    /// Create a new Extractor around an already shared gateway
    pub fn with_shared_gateway(gateway: Arc<G>, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        Ok(Self { gateway, config })
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Gateway used for stage calls
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Extract claims using the configured window sizes
    pub async fn extract(&self, question: &str, answer: &str) -> Result<Vec<String>, ExtractorError> {
        self.extract_with_window(question, answer, self.config.preceding, self.config.following)
            .await
    }

    /// Extract claims with explicit look-back `preceding` and look-forward
    /// `following` window sizes
    ///
    /// Claims are returned in sentence order, then in decomposition order
    /// within a sentence. No deduplication is performed.
    pub async fn extract_with_window(
        &self,
        question: &str,
        answer: &str,
        preceding: usize,
        following: usize,
    ) -> Result<Vec<String>, ExtractorError> {
        let request = ExtractionRequest::new(question, answer).with_window(preceding, following);
        let result = self.run(request).await?;
        Ok(result.claims.into_iter().map(Claim::into_string).collect())
    }

    /// Run an extraction and return claims plus the per-sentence trace
    pub async fn run(&self, request: ExtractionRequest) -> Result<ExtractionResult, ExtractorError> {
        self.run_with_cancel(request, CancellationToken::new()).await
    }

    /// Run an extraction that stops early when `cancel` fires
    ///
    /// Sentences finished before cancellation keep their claims; the rest are
    /// reported as rejected with [`RejectReason::Cancelled`].
    pub async fn run_with_cancel(
        &self,
        request: ExtractionRequest,
        cancel: CancellationToken,
    ) -> Result<ExtractionResult, ExtractorError> {
        let length = request.answer.chars().count();
        if length > self.config.max_answer_length {
            return Err(ExtractorError::AnswerTooLong {
                length,
                max: self.config.max_answer_length,
            });
        }

        let start_time = Instant::now();
        let preceding = request.preceding.unwrap_or(self.config.preceding);
        let following = request.following.unwrap_or(self.config.following);
        let sentences = segment(&request.answer);

        info!(
            sentences = sentences.len(),
            preceding,
            following,
            concurrency = self.config.max_concurrency,
            model = self.gateway.model_name(),
            "Starting claim extraction"
        );

        let calls = AtomicUsize::new(0);
        let pipeline = SentencePipeline::new(
            self.gateway.as_ref(),
            &request.question,
            self.config.stage_timeout(),
            &calls,
        );

        let reports: Vec<SentenceReport> = stream::iter(sentences.iter().map(|sentence| {
            let context = build_window(&sentences, sentence.index, preceding, following);
            let pipeline = &pipeline;
            let cancel = &cancel;

            async move {
                let state = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => SentenceState::Rejected {
                        stage: None,
                        reason: RejectReason::Cancelled,
                    },
                    state = pipeline.run(sentence, &context) => state,
                };

                SentenceReport {
                    index: sentence.index,
                    text: sentence.text.clone(),
                    context,
                    state,
                }
            }
        }))
        .buffered(self.config.max_concurrency)
        .collect()
        .await;

        if let Some(last_error) = all_failed(&reports) {
            warn!(sentences = reports.len(), error = %last_error, "Every sentence failed");
            return Err(ExtractorError::AllSentencesFailed {
                sentences: reports.len(),
                last_error,
            });
        }

        let mut claims = Vec::new();
        let mut metrics = ExtractionMetrics::new();
        for report in &reports {
            metrics.record_sentence(&report.state);
            claims.extend(report.claims().iter().cloned());
        }

        let metadata = ExtractionMetadata {
            model_name: self.gateway.model_name().to_string(),
            sentence_count: reports.len(),
            gateway_calls: calls.load(Ordering::Relaxed),
            preceding,
            following,
            processing_time_ms: start_time.elapsed().as_millis() as u64,
            cancelled: cancel.is_cancelled(),
        };

        info!(
            claims = claims.len(),
            decomposed = metrics.decomposed,
            rejected = metrics.total_rejected(),
            gateway_calls = metadata.gateway_calls,
            elapsed_ms = metadata.processing_time_ms,
            cancelled = metadata.cancelled,
            "Extraction complete"
        );

        Ok(ExtractionResult {
            claims,
            sentences: reports,
            metadata,
            metrics,
        })
    }
}

/// Last service error, if at least one sentence ran and every one of them
/// failed at the gateway
fn all_failed(reports: &[SentenceReport]) -> Option<String> {
    let mut last_error = None;
    for report in reports {
        match &report.state {
            SentenceState::Rejected {
                reason: RejectReason::Service(msg),
                ..
            } => last_error = Some(msg.clone()),
            _ => return None,
        }
    }
    last_error
}
