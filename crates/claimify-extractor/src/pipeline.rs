//! Per-sentence three-stage pipeline
//!
//! Runs Selection, Disambiguation and Decomposition in order for one sentence,
//! stopping at the first rejection. Every stage call is bounded by the stage
//! timeout; a failed call rejects the sentence and never the whole run.

use crate::error::StageError;
use crate::parser::{parse_decomposition, parse_disambiguation, parse_selection};
use crate::prompt::PromptBuilder;
use claimify_domain::{CompletionGateway, Sentence, SentenceState, Stage, DETERMINISTIC_TEMPERATURE};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Drives one sentence to a terminal state
pub(crate) struct SentencePipeline<'a, G> {
    gateway: &'a G,
    question: &'a str,
    stage_timeout: Duration,
    calls: &'a AtomicUsize,
}

impl<'a, G> SentencePipeline<'a, G>
where
    G: CompletionGateway,
{
    /// Create a pipeline sharing `calls` as the gateway call counter
    pub(crate) fn new(
        gateway: &'a G,
        question: &'a str,
        stage_timeout: Duration,
        calls: &'a AtomicUsize,
    ) -> Self {
        Self {
            gateway,
            question,
            stage_timeout,
            calls,
        }
    }

    /// Run all stages for `sentence` with its rendered `context`
    pub(crate) async fn run(&self, sentence: &Sentence, context: &str) -> SentenceState {
        let mut state = SentenceState::Pending;

        while let Some(stage) = state.next_stage() {
            let input = state.carried_sentence().unwrap_or(&sentence.text).to_string();

            let outcome = match self.invoke(stage, context, &input).await {
                Ok(reply) => advance(state.clone(), stage, &reply, &input),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(next) => {
                    debug!(sentence = sentence.index, stage = %stage, "Stage complete");
                    state = next;
                }
                Err(e) => {
                    warn!(
                        sentence = sentence.index,
                        stage = %stage,
                        error = %e,
                        "Stage failed, skipping sentence"
                    );
                    return state.reject(e.reject_reason());
                }
            }
        }

        state
    }

    async fn invoke(&self, stage: Stage, context: &str, sentence: &str) -> Result<String, StageError> {
        let prompt = PromptBuilder::new(stage, self.question)
            .context(context)
            .sentence(sentence);
        let user_prompt = prompt.build();

        self.calls.fetch_add(1, Ordering::Relaxed);
        debug!(stage = %stage, prompt_len = user_prompt.len(), "Calling gateway");

        let reply = timeout(
            self.stage_timeout,
            self.gateway
                .complete(prompt.system_prompt(), &user_prompt, DETERMINISTIC_TEMPERATURE),
        )
        .await
        .map_err(|_| StageError::Timeout(self.stage_timeout))?
        .map_err(|e| StageError::Service(e.to_string()))?;

        debug!(stage = %stage, reply_len = reply.len(), "Gateway replied");
        Ok(reply)
    }
}

/// Parse `reply` for `stage` and apply it to `state`
fn advance(
    state: SentenceState,
    stage: Stage,
    reply: &str,
    input: &str,
) -> Result<SentenceState, StageError> {
    let next = match stage {
        Stage::Selection => state.apply_selection(parse_selection(reply, input)?),
        Stage::Disambiguation => state.apply_disambiguation(parse_disambiguation(reply)?),
        Stage::Decomposition => state.apply_decomposition(parse_decomposition(reply)?),
    };
    next.map_err(StageError::InvalidTransition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimify_domain::{Claim, RejectReason};
    use claimify_llm::MockGateway;

    const SELECT_YES: &str = "Final submission:\nContains a specific and verifiable proposition\n\
                              Sentence with only verifiable information:\nremains unchanged";

    async fn run(gateway: &MockGateway, text: &str) -> (SentenceState, usize) {
        let calls = AtomicUsize::new(0);
        let pipeline = SentencePipeline::new(gateway, "What happened?", Duration::from_secs(5), &calls);
        let state = pipeline.run(&Sentence::new(0, text), "").await;
        (state, calls.load(Ordering::Relaxed))
    }

    #[tokio::test]
    async fn test_full_pipeline() {
        let gateway = MockGateway::default();
        gateway.add_response(&["SELECTION task"], SELECT_YES);
        gateway.add_response(&["DISAMBIGUATION task"], "DecontextualizedSentence: John led the team.");
        gateway.add_response(&["DECOMPOSITION task", "John led the team."], r#"["John led the team."]"#);

        let (state, calls) = run(&gateway, "He led the team.").await;
        assert_eq!(calls, 3);
        assert_eq!(state.claims(), &[Claim::new("John led the team.")]);
    }

    #[tokio::test]
    async fn test_selection_rejection_stops_pipeline() {
        let gateway = MockGateway::new("NO_VERIFIABLE_CLAIMS");
        let (state, calls) = run(&gateway, "AI could lead to advancements in healthcare.").await;

        assert_eq!(calls, 1);
        assert_eq!(
            state,
            SentenceState::Rejected { stage: Some(Stage::Selection), reason: RejectReason::NotVerifiable }
        );
    }

    #[tokio::test]
    async fn test_stages_receive_carried_sentence() {
        let gateway = MockGateway::default();
        gateway.add_response(
            &["SELECTION task"],
            "Final submission: Contains a specific and verifiable proposition\n\
             Sentence with only verifiable information: Smith advocates for renewable energy.",
        );
        gateway.add_response(&["DISAMBIGUATION task"], "DecontextualizedSentence: Senator Smith advocates for renewable energy.");
        gateway.add_response(&["DECOMPOSITION task"], r#"["Senator Smith advocates for renewable energy."]"#);

        let (state, _) = run(&gateway, "Smith's advocacy for renewable energy is crucial.").await;
        assert_eq!(state.claims().len(), 1);

        let calls = gateway.calls();
        assert!(calls[0].user_prompt.ends_with("Smith's advocacy for renewable energy is crucial."));
        assert!(calls[1].user_prompt.ends_with("Sentence:\nSmith advocates for renewable energy."));
        assert!(calls[2].user_prompt.ends_with("Sentence:\nSenator Smith advocates for renewable energy."));
        assert!(calls.iter().all(|c| c.temperature == DETERMINISTIC_TEMPERATURE));
    }

    #[tokio::test]
    async fn test_service_error_rejects_at_failing_stage() {
        let gateway = MockGateway::default();
        gateway.add_response(&["SELECTION task"], SELECT_YES);
        gateway.add_error(&["DISAMBIGUATION task"]);

        let (state, calls) = run(&gateway, "He led the team.").await;
        assert_eq!(calls, 2);
        assert!(matches!(
            state,
            SentenceState::Rejected { stage: Some(Stage::Disambiguation), reason: RejectReason::Service(_) }
        ));
    }

    #[tokio::test]
    async fn test_malformed_reply_fails_closed() {
        let gateway = MockGateway::new("I'm not sure what you mean.\nCould you clarify?");
        let (state, _) = run(&gateway, "He led the team.").await;
        assert!(matches!(
            state,
            SentenceState::Rejected { stage: Some(Stage::Selection), reason: RejectReason::Malformed(_) }
        ));
    }

    #[tokio::test]
    async fn test_empty_decomposition_rejects() {
        let gateway = MockGateway::default();
        gateway.add_response(&["SELECTION task"], SELECT_YES);
        gateway.add_response(&["DISAMBIGUATION task"], "DecontextualizedSentence: John led the team.");
        gateway.add_response(&["DECOMPOSITION task"], "[]");

        let (state, _) = run(&gateway, "He led the team.").await;
        assert!(matches!(
            state,
            SentenceState::Rejected { stage: Some(Stage::Decomposition), reason: RejectReason::NoPropositions }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_stage_times_out() {
        let gateway = MockGateway::default();
        gateway.add_delayed_response(&["SELECTION task"], Duration::from_secs(60), SELECT_YES);

        let (state, _) = run(&gateway, "He led the team.").await;
        match state {
            SentenceState::Rejected { stage: Some(Stage::Selection), reason: RejectReason::Service(msg) } => {
                assert!(msg.contains("timed out"));
            }
            other => panic!("Expected timeout rejection, got {:?}", other),
        }
    }
}
