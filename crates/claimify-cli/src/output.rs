//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use claimify_domain::{Sentence, SentenceState};
use claimify_extractor::{ExtractionResult, SentenceReport};
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style, Width},
};

/// Tables wider than this wrap their cells.
const MAX_TABLE_WIDTH: usize = 120;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Active output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format the claims of an extraction run.
    pub fn format_claims(&self, result: &ExtractionResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_result_json(result, false),
            OutputFormat::Table => Ok(self.format_claims_table(result)),
            OutputFormat::Quiet => Ok(result.claim_texts().join("\n")),
        }
    }

    /// Format the per-sentence trace of an extraction run.
    pub fn format_trace(&self, result: &ExtractionResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_result_json(result, true),
            OutputFormat::Table => Ok(self.format_trace_table(&result.sentences)),
            OutputFormat::Quiet => Ok(result
                .sentences
                .iter()
                .map(|r| format!("{}\t{}", r.index, outcome(&r.state)))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    /// Format segmented sentences with their context windows.
    pub fn format_segments(&self, segments: &[(Sentence, String)]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let json: Vec<serde_json::Value> = segments
                    .iter()
                    .map(|(sentence, context)| {
                        serde_json::json!({
                            "index": sentence.index,
                            "text": sentence.text,
                            "context": context,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Table => {
                if segments.is_empty() {
                    return Ok(self.colorize("No sentences found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["#", "Sentence", "Context"]);
                for (sentence, context) in segments {
                    builder.push_record([sentence.index.to_string(), sentence.text.clone(), context.clone()]);
                }
                Ok(self.render(builder))
            }
            OutputFormat::Quiet => Ok(segments
                .iter()
                .map(|(sentence, _)| sentence.text.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    /// Format run statistics as a one-line summary.
    pub fn run_summary(&self, result: &ExtractionResult) -> String {
        let metadata = &result.metadata;
        let msg = format!(
            "{} claim(s) from {} sentence(s), {} model call(s) to {} in {} ms",
            result.claims.len(),
            metadata.sentence_count,
            metadata.gateway_calls,
            metadata.model_name,
            metadata.processing_time_ms
        );
        if metadata.cancelled {
            self.warning(&format!("Cancelled: {}", msg))
        } else {
            self.info(&msg)
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn format_result_json(&self, result: &ExtractionResult, trace: bool) -> Result<String> {
        let mut json = serde_json::json!({
            "claims": result.claim_texts(),
            "metadata": result.metadata,
            "metrics": result.metrics,
        });

        if trace {
            json["sentences"] = result
                .sentences
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "index": r.index,
                        "text": r.text,
                        "context": r.context,
                        "outcome": outcome(&r.state),
                        "claims": r.claims().iter().map(|c| c.as_str()).collect::<Vec<_>>(),
                    })
                })
                .collect();
        }

        Ok(serde_json::to_string_pretty(&json)?)
    }

    fn format_claims_table(&self, result: &ExtractionResult) -> String {
        if result.claims.is_empty() {
            return self.colorize("No claims found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["#", "Claim"]);
        for (i, claim) in result.claims.iter().enumerate() {
            builder.push_record([(i + 1).to_string(), claim.to_string()]);
        }
        self.render(builder)
    }

    fn format_trace_table(&self, reports: &[SentenceReport]) -> String {
        if reports.is_empty() {
            return self.colorize("No sentences found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["#", "Sentence", "Outcome", "Claims"]);
        for report in reports {
            let claims = report
                .claims()
                .iter()
                .map(|c| format!("- {}", c))
                .collect::<Vec<_>>()
                .join("\n");
            let color = if report.is_rejected() { "yellow" } else { "green" };
            let status = self.colorize(&outcome(&report.state), color);
            builder.push_record([report.index.to_string(), report.text.clone(), status, claims]);
        }
        self.render(builder)
    }

    fn render(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()))
            .with(Width::wrap(MAX_TABLE_WIDTH));

        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Short description of how a sentence ended.
pub fn outcome(state: &SentenceState) -> String {
    match state {
        SentenceState::Decomposed { claims } => format!("decomposed ({})", claims.len()),
        SentenceState::Rejected { stage: Some(stage), reason } => {
            format!("rejected at {}: {}", stage, reason)
        }
        SentenceState::Rejected { stage: None, reason } => format!("rejected: {}", reason),
        SentenceState::Pending => "pending".to_string(),
        SentenceState::Selected { .. } | SentenceState::Disambiguated { .. } => "in progress".to_string(),
    }
}
