//! Metrics collection for extraction runs

use claimify_domain::{RejectReason, SentenceState};
use serde::Serialize;
use std::collections::BTreeMap;

/// Counters collected during one extraction run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionMetrics {
    /// Sentences seen
    pub sentences: usize,

    /// Sentences that produced claims
    pub decomposed: usize,

    /// Rejected sentences per reason label
    pub rejected: BTreeMap<&'static str, usize>,

    /// Claims emitted
    pub claims: usize,
}

impl ExtractionMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the terminal state of one sentence
    pub fn record_sentence(&mut self, state: &SentenceState) {
        self.sentences += 1;
        match state {
            SentenceState::Decomposed { claims } => {
                self.decomposed += 1;
                self.claims += claims.len();
            }
            SentenceState::Rejected { reason, .. } => self.record_rejection(reason),
            _ => {}
        }
    }

    /// Record a rejection
    pub fn record_rejection(&mut self, reason: &RejectReason) {
        *self.rejected.entry(reason.label()).or_insert(0) += 1;
    }

    /// Total rejected sentences
    pub fn total_rejected(&self) -> usize {
        self.rejected.values().sum()
    }

    /// Rejections for one reason label (see [`RejectReason::label`])
    pub fn rejected_for(&self, label: &str) -> usize {
        self.rejected.get(label).copied().unwrap_or(0)
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Extraction Metrics Summary".to_string(),
            "==========================".to_string(),
            format!("Sentences: {}", self.sentences),
            format!("Decomposed: {}", self.decomposed),
            format!("Claims: {}", self.claims),
        ];

        if !self.rejected.is_empty() {
            lines.push(String::new());
            lines.push("Rejections by reason:".to_string());
            for (reason, count) in &self.rejected {
                lines.push(format!("  {}: {}", reason, count));
            }
            lines.push(format!("  Total: {}", self.total_rejected()));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimify_domain::{Claim, Stage};

    fn rejected(reason: RejectReason) -> SentenceState {
        SentenceState::Rejected { stage: Some(Stage::Selection), reason }
    }

    #[test]
    fn test_metrics_creation() {
        let metrics = ExtractionMetrics::new();
        assert_eq!(metrics.sentences, 0);
        assert_eq!(metrics.total_rejected(), 0);
    }

    #[test]
    fn test_record_sentences() {
        let mut metrics = ExtractionMetrics::new();
        metrics.record_sentence(&SentenceState::Decomposed {
            claims: vec![Claim::new("a"), Claim::new("b")],
        });
        metrics.record_sentence(&rejected(RejectReason::NotVerifiable));
        metrics.record_sentence(&rejected(RejectReason::NotVerifiable));
        metrics.record_sentence(&rejected(RejectReason::Service("timeout".into())));

        assert_eq!(metrics.sentences, 4);
        assert_eq!(metrics.decomposed, 1);
        assert_eq!(metrics.claims, 2);
        assert_eq!(metrics.rejected_for("not_verifiable"), 2);
        assert_eq!(metrics.rejected_for("service"), 1);
        assert_eq!(metrics.rejected_for("ambiguous"), 0);
        assert_eq!(metrics.total_rejected(), 3);
    }

    #[test]
    fn test_summary() {
        let mut metrics = ExtractionMetrics::new();
        metrics.record_sentence(&SentenceState::Decomposed { claims: vec![Claim::new("a")] });
        metrics.record_sentence(&rejected(RejectReason::Ambiguous));

        let summary = metrics.summary();
        assert!(summary.contains("Sentences: 2"));
        assert!(summary.contains("Claims: 1"));
        assert!(summary.contains("ambiguous: 1"));
        assert!(summary.contains("Total: 1"));
    }
}
