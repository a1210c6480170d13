//! Answer segmentation into paragraphs and sentences

use claimify_domain::{index_sentences, Sentence};
use regex::Regex;
use std::sync::LazyLock;
use unicode_segmentation::UnicodeSegmentation;

/// Candidates shorter than this (in characters) are merged into the
/// preceding sentence
pub const MIN_SENTENCE_CHARS: usize = 5;

/// Titles that never end a sentence
const TITLES: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "gen", "gov", "sen", "rep", "col", "lt",
    "sgt", "capt", "rev", "hon", "mt", "ft",
];

/// Abbreviations that end a sentence unless lowercase text or a number follows
const ABBREVIATIONS: &[&str] = &[
    "no", "vs", "etc", "inc", "ltd", "co", "corp", "approx", "fig", "vol", "dept", "est", "jan",
    "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
];

/// Two or more newlines, possibly separated by whitespace-only lines
static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid paragraph regex"));

/// Split text into trimmed, non-empty paragraphs
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Split text into an ordered sequence of sentences
///
/// Paragraphs are tokenized on Unicode sentence boundaries (UAX #29), then a
/// boundary right after a title (`Dr.`), an initial (`J.`) or a dotted
/// abbreviation (`U.S.`, `e.g.`) is undone. Fragments shorter than
/// [`MIN_SENTENCE_CHARS`] are appended to the last accepted sentence instead
/// of standing alone. Only the very first sentence of the answer can
/// be such a short fragment.
///
/// # Examples
///
/// ```
/// use claimify_extractor::segment;
///
/// let sentences = segment("John joined in 2010. He led the team.\n\nGrowth followed.");
/// let texts: Vec<&str> = sentences.iter().map(|s| s.text.as_str()).collect();
/// assert_eq!(texts, ["John joined in 2010.", "He led the team.", "Growth followed."]);
/// assert_eq!(sentences[2].index, 2);
/// ```
pub fn segment(text: &str) -> Vec<Sentence> {
    let mut merged: Vec<String> = Vec::new();

    for paragraph in split_paragraphs(text) {
        for candidate in sentence_candidates(paragraph) {
            match merged.last_mut() {
                Some(last) if candidate.chars().count() < MIN_SENTENCE_CHARS => {
                    last.push(' ');
                    last.push_str(&candidate);
                }
                _ => merged.push(candidate),
            }
        }
    }

    index_sentences(merged)
}

/// Sentence candidates of one paragraph, with abbreviation splits rejoined
fn sentence_candidates(paragraph: &str) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();

    for candidate in paragraph.split_sentence_bounds().map(str::trim) {
        if candidate.is_empty() {
            continue;
        }
        match candidates.last_mut() {
            Some(last) if continues_abbreviation(last, candidate) => {
                last.push(' ');
                last.push_str(candidate);
            }
            _ => candidates.push(candidate.to_string()),
        }
    }
    candidates
}

/// Whether `previous` stops on an abbreviation that `next` continues
fn continues_abbreviation(previous: &str, next: &str) -> bool {
    let Some(word) = previous.split_whitespace().last() else {
        return false;
    };
    let word = word.trim_start_matches(|c: char| !c.is_alphanumeric());
    let stem = match word.strip_suffix('.') {
        Some(stem) if !stem.is_empty() => stem,
        _ => return false,
    };

    // Initial: "J."
    let mut chars = stem.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return c.is_uppercase();
    }

    // Dotted: "U.S.", "e.g."
    if stem.contains('.') {
        return stem
            .split('.')
            .all(|part| (1..=2).contains(&part.chars().count()) && part.chars().all(char::is_alphabetic));
    }

    let lower = stem.to_lowercase();
    if TITLES.contains(&lower.as_str()) {
        return true;
    }
    ABBREVIATIONS.contains(&lower.as_str())
        && next
            .chars()
            .next()
            .is_some_and(|c| c.is_lowercase() || c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(sentences: &[Sentence]) -> Vec<&str> {
        sentences.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(segment("").is_empty());
        assert!(segment("   \n\n \t\n").is_empty());
    }

    #[test]
    fn test_single_paragraph() {
        let sentences = segment("John joined in 2010. He led the team. Growth followed.");
        assert_eq!(
            texts(&sentences),
            ["John joined in 2010.", "He led the team.", "Growth followed."]
        );
    }

    #[test]
    fn test_paragraph_split_with_whitespace_lines() {
        let paragraphs = split_paragraphs("First paragraph.\n  \t\nSecond paragraph.\n\n\n\nThird.");
        assert_eq!(paragraphs, ["First paragraph.", "Second paragraph.", "Third."]);
    }

    #[test]
    fn test_single_newline_is_not_a_paragraph_break() {
        assert_eq!(split_paragraphs("line one\nline two").len(), 1);
    }

    #[test]
    fn test_short_fragment_merged_into_previous() {
        let sentences = segment("The launch went well. Ok. Sales rose afterwards.");
        assert_eq!(
            texts(&sentences),
            ["The launch went well. Ok.", "Sales rose afterwards."]
        );
    }

    #[test]
    fn test_short_fragment_merged_across_paragraphs() {
        let sentences = segment("The launch went well.\n\nOk.\n\nSales rose afterwards.");
        assert_eq!(
            texts(&sentences),
            ["The launch went well. Ok.", "Sales rose afterwards."]
        );
    }

    #[test]
    fn test_leading_short_fragment_stands_alone() {
        let sentences = segment("Hi. The company went public in 2020.");
        assert_eq!(texts(&sentences), ["Hi.", "The company went public in 2020."]);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // Four characters, more than four bytes
        let sentences = segment("Revenue doubled in 2019. Ünï. Then it fell.");
        assert_eq!(
            texts(&sentences),
            ["Revenue doubled in 2019. Ünï.", "Then it fell."]
        );
    }

    #[test]
    fn test_indices_are_contiguous() {
        let sentences = segment("One sentence here.\n\nAnother one here. And a third one.");
        let indices: Vec<usize> = sentences.iter().map(|s| s.index).collect();
        assert_eq!(indices, [0, 1, 2]);
    }

    #[test]
    fn test_title_keeps_sentence_together() {
        let sentences = segment("Smith met Dr. Jones at the lab in 2019. They talked.");
        assert_eq!(
            texts(&sentences),
            ["Smith met Dr. Jones at the lab in 2019.", "They talked."]
        );
    }

    #[test]
    fn test_dotted_abbreviation_keeps_sentence_together() {
        assert_eq!(
            texts(&segment("The U.S. Army expanded in 2001.")),
            ["The U.S. Army expanded in 2001."]
        );
        assert_eq!(
            texts(&segment("Some metals, e.g. copper, conduct well. Glass does not.")),
            ["Some metals, e.g. copper, conduct well.", "Glass does not."]
        );
    }

    #[test]
    fn test_initials_keep_sentence_together() {
        assert_eq!(
            texts(&segment("J. K. Rowling wrote seven books. They sold widely.")),
            ["J. K. Rowling wrote seven books.", "They sold widely."]
        );
    }

    #[test]
    fn test_contextual_abbreviation() {
        assert_eq!(
            texts(&segment("The firm is listed as No. 5 in the ranking.")),
            ["The firm is listed as No. 5 in the ranking."]
        );
        // "no." followed by a capitalised sentence is a real boundary
        assert_eq!(
            texts(&segment("The answer was no. Then the board voted again.")),
            ["The answer was no.", "Then the board voted again."]
        );
    }

    #[test]
    fn test_deterministic() {
        let text = "Smith's advocacy for renewable energy is crucial. AI could help.\n\nDr. Jones agreed.";
        assert_eq!(segment(text), segment(text));
        assert_eq!(segment(text)[2].text, "Dr. Jones agreed.");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Paragraphs made of lowercase words that each end in a long sentence
    fn paragraph() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-z]{1,8}( [a-z]{1,8}){0,6}[.!?]", 1..5)
            .prop_map(|sentences| {
                sentences
                    .into_iter()
                    .map(|s| format!("Word {}", s))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
    }

    proptest! {
        /// Property: at least one sentence per paragraph
        #[test]
        fn test_count_at_least_paragraphs(paragraphs in prop::collection::vec(paragraph(), 1..6)) {
            let text = paragraphs.join("\n\n");
            let sentences = segment(&text);
            prop_assert!(sentences.len() >= split_paragraphs(&text).len());
        }

        /// Property: no short fragment after the first sentence
        #[test]
        fn test_no_standalone_short_fragments(text in "[A-Za-z .!?\n]{0,200}") {
            let sentences = segment(&text);
            for sentence in sentences.iter().skip(1) {
                prop_assert!(sentence.text.chars().count() >= MIN_SENTENCE_CHARS);
            }
        }

        /// Property: sentences are trimmed and non-empty
        #[test]
        fn test_sentences_trimmed(text in "\\PC{0,200}") {
            for sentence in segment(&text) {
                prop_assert!(!sentence.text.is_empty());
                prop_assert_eq!(sentence.text.trim(), sentence.text.as_str());
            }
        }
    }
}
