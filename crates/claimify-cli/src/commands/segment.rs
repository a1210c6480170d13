//! Segment command implementation.

use super::read_answer;
use crate::cli::SegmentArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use claimify_domain::{build_window, Sentence};
use claimify_extractor::segment;

/// Execute the segment command.
pub async fn execute_segment(args: SegmentArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let answer = read_answer(args.answer.as_deref())?;
    let preceding = args.preceding.unwrap_or(config.extractor.preceding);
    let following = args.following.unwrap_or(config.extractor.following);

    println!("{}", formatter.format_segments(&windows(&answer, preceding, following))?);

    Ok(())
}

/// Segment `answer` and pair every sentence with its context window.
fn windows(answer: &str, preceding: usize, following: usize) -> Vec<(Sentence, String)> {
    let sentences = segment(answer);
    sentences
        .iter()
        .map(|s| (s.clone(), build_window(&sentences, s.index, preceding, following)))
        .collect()
}
