//! Parse stage replies into typed results
//!
//! Each parser first looks for the structured fields the system prompts ask
//! for, then falls back to the terse sentinel replies (`NO_VERIFIABLE_CLAIMS`,
//! `CANNOT_BE_DISAMBIGUATED`, `NO_CLAIMS`, a bare sentence or list). A terse
//! value is only accepted when it reads like content rather than commentary
//! about the sentence. Anything else is a [`ParseError`]; the pipeline
//! rejects the sentence in that case.

use crate::error::ParseError;
use crate::prompt::{
    CANNOT_DECONTEXTUALIZE, DECONTEXTUALIZED_FIELD, PROPOSITIONS_WITH_CONTEXT_HEADER,
    SELECTION_REVISION_HEADER, SELECTION_VERDICT_HEADER, VERIFIABLE,
};
use claimify_domain::{Claim, DisambiguationVerdict, SelectionVerdict};

/// Terse Selection reply for a sentence without verifiable content
pub const NO_VERIFIABLE_CLAIMS: &str = "NO_VERIFIABLE_CLAIMS";

/// Terse Disambiguation reply for an ambiguous sentence
pub const CANNOT_BE_DISAMBIGUATED: &str = "CANNOT_BE_DISAMBIGUATED";

/// Terse Decomposition reply for an empty proposition list
pub const NO_CLAIMS: &str = "NO_CLAIMS";

const TRUE_OR_FALSE_SUFFIX: &str = "- true or false?";

/// Words that mark a reply as commentary or a refusal rather than a value
const COMMENTARY_WORDS: &[&str] = &[
    "verifiable",
    "unverifiable",
    "proposition",
    "propositions",
    "sentence",
    "sentences",
    "claim",
    "claims",
    "cannot",
    "unable",
    "sorry",
    "ambiguous",
    "unclear",
    "decontextualize",
    "decontextualized",
];

/// Parse a Selection reply
///
/// `original` is carried forward when the reply marks the sentence as
/// verifiable but leaves it unchanged (or gives no revision at all).
///
/// # Examples
///
/// ```
/// use claimify_domain::SelectionVerdict;
/// use claimify_extractor::parser::parse_selection;
///
/// let reply = "Final submission:\nContains a specific and verifiable proposition\n\
///              Sentence with only verifiable information:\nSmith advocates for renewable energy.";
/// let verdict = parse_selection(reply, "Smith's advocacy for renewable energy is crucial.").unwrap();
/// assert_eq!(
///     verdict,
///     SelectionVerdict::Verifiable { revised: "Smith advocates for renewable energy.".into() }
/// );
/// ```
pub fn parse_selection(reply: &str, original: &str) -> Result<SelectionVerdict, ParseError> {
    let text = strip_code_fence(reply);
    if text.is_empty() {
        return Err(ParseError::Empty);
    }
    if text.contains(NO_VERIFIABLE_CLAIMS) {
        return Ok(SelectionVerdict::NotVerifiable);
    }

    let verdict = match field_value(&text, SELECTION_VERDICT_HEADER) {
        Some(value) => classify_verdict(&value),
        None if text.contains("Does NOT contain") => Some(false),
        None => bare_verdict(&text),
    };

    match verdict {
        Some(false) => Ok(SelectionVerdict::NotVerifiable),
        Some(true) => {
            let revision = field_value(&text, SELECTION_REVISION_HEADER);
            let revised = resolve_revision(revision.as_deref(), original)?;
            Ok(SelectionVerdict::Verifiable { revised })
        }
        None => match single_line(&text) {
            Some(line) if is_terse_value(line) || is_unchanged(line) => {
                Ok(SelectionVerdict::Verifiable {
                    revised: resolve_revision(Some(line), original)?,
                })
            }
            _ => Err(ParseError::MissingMarker(SELECTION_VERDICT_HEADER)),
        },
    }
}

/// Parse a Disambiguation reply
///
/// The last `DecontextualizedSentence:` field wins; its value may sit on the
/// same line or on the next non-empty line.
pub fn parse_disambiguation(reply: &str) -> Result<DisambiguationVerdict, ParseError> {
    let text = strip_code_fence(reply);
    if text.is_empty() {
        return Err(ParseError::Empty);
    }
    if text.contains(CANNOT_BE_DISAMBIGUATED) {
        return Ok(DisambiguationVerdict::Ambiguous);
    }

    if let Some(value) = field_value(&text, DECONTEXTUALIZED_FIELD) {
        if is_cannot_decontextualize(&value) {
            return Ok(DisambiguationVerdict::Ambiguous);
        }
        if value.is_empty() {
            return Err(ParseError::MissingMarker(DECONTEXTUALIZED_FIELD));
        }
        return Ok(DisambiguationVerdict::Resolved { sentence: value });
    }

    if is_cannot_decontextualize(&text) {
        return Ok(DisambiguationVerdict::Ambiguous);
    }
    if text.contains(DECONTEXTUALIZED_FIELD) {
        // Header present with nothing after it
        return Err(ParseError::MissingMarker(DECONTEXTUALIZED_FIELD));
    }

    match single_line(&text).map(unquote) {
        Some(line) if !line.is_empty() && is_terse_value(line) => {
            Ok(DisambiguationVerdict::Resolved {
                sentence: line.to_string(),
            })
        }
        _ => Err(ParseError::MissingMarker(DECONTEXTUALIZED_FIELD)),
    }
}

/// Parse a Decomposition reply into claims, in the order given
///
/// The list under the "with Essential Context" header is preferred, then the
/// first bracketed list anywhere in the reply. Lists are read as JSON first,
/// then as JSON without trailing commas, then as the bare sequence of quoted
/// strings. A reply with no bracketed list is accepted only as a bulleted or
/// numbered list, one proposition per item.
///
/// An empty result is not an error; the pipeline rejects the sentence with
/// `NoPropositions`.
pub fn parse_decomposition(reply: &str) -> Result<Vec<Claim>, ParseError> {
    let text = strip_code_fence(reply);
    if text.is_empty() {
        return Err(ParseError::Empty);
    }

    let lines: Vec<&str> = text.lines().collect();
    if lines.iter().any(|l| l.trim() == NO_CLAIMS) {
        return Ok(Vec::new());
    }

    let after_header = lines
        .iter()
        .rposition(|l| clean_line(l).starts_with(PROPOSITIONS_WITH_CONTEXT_HEADER))
        .map(|pos| pos + 1);

    let items = after_header
        .and_then(|start| find_array(&lines[start..]))
        .or_else(|| find_array(&lines));

    if let Some(items) = items {
        return Ok(to_claims(items.iter().map(String::as_str)));
    }

    let listed: Option<Vec<&str>> = lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(|l| list_item(l).filter(|item| is_listed_proposition(item)))
        .collect();

    match listed {
        Some(items) if !items.is_empty() => Ok(to_claims(items.into_iter())),
        _ => Err(ParseError::MissingMarker("proposition list")),
    }
}

/// Strip a surrounding markdown code block, if any
fn strip_code_fence(reply: &str) -> String {
    let trimmed = reply.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    // Skip the opening fence (```json or ```) and the closing one
    let lines: Vec<&str> = trimmed.lines().collect();
    let end = if lines.len() > 1 && lines[lines.len() - 1].trim_start().starts_with("```") {
        lines.len() - 1
    } else {
        lines.len()
    };
    lines[1..end].join("\n").trim().to_string()
}

/// Trim a line and drop markdown emphasis/heading decoration
fn clean_line(line: &str) -> &str {
    line.trim().trim_start_matches(['*', '#', '_']).trim_start()
}

/// Value of the last `header` field: the rest of its line, or the next
/// non-empty line when the header stands alone
fn field_value(text: &str, header: &str) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();
    let pos = lines.iter().rposition(|l| clean_line(l).starts_with(header))?;

    let rest = clean_line(lines[pos])[header.len()..]
        .trim()
        .trim_matches(['*', '_'])
        .trim();
    if !rest.is_empty() {
        return Some(unquote(rest).to_string());
    }

    lines[pos + 1..]
        .iter()
        .map(|l| l.trim())
        .find(|l| !l.is_empty())
        .map(|l| unquote(l).to_string())
}

/// Remove one pair of surrounding quotes
fn unquote(s: &str) -> &str {
    let s = s.trim();
    if s.chars().count() < 2 {
        return s;
    }
    for (open, close) in [('"', '"'), ('\'', '\''), ('“', '”')] {
        if s.starts_with(open) && s.ends_with(close) {
            return s[open.len_utf8()..s.len() - close.len_utf8()].trim();
        }
    }
    s
}

/// The only non-empty line of `text`, if there is exactly one
fn single_line(text: &str) -> Option<&str> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    let first = lines.next()?;
    match lines.next() {
        None => Some(first),
        Some(_) => None,
    }
}

/// Verdict from a reply without the header: only a line that is exactly the
/// positive verdict phrase counts
fn bare_verdict(text: &str) -> Option<bool> {
    let phrase = VERIFIABLE.to_lowercase();
    text.lines()
        .map(|l| unquote(clean_line(l)).trim_end_matches('.').to_lowercase())
        .any(|l| l == phrase)
        .then_some(true)
}

fn classify_verdict(value: &str) -> Option<bool> {
    let lower = value.to_lowercase();
    if lower.contains("does not contain") {
        Some(false)
    } else if lower.contains(&VERIFIABLE.to_lowercase()) {
        Some(true)
    } else {
        None
    }
}

fn resolve_revision(revision: Option<&str>, original: &str) -> Result<String, ParseError> {
    let value = match revision.map(unquote) {
        None => return Ok(original.trim().to_string()),
        Some(v) => v,
    };

    if is_unchanged(value) {
        return Ok(original.trim().to_string());
    }
    if normalize(value) == "none" {
        return Err(ParseError::Contradictory(
            "verifiable verdict without a verifiable sentence".to_string(),
        ));
    }
    Ok(value.to_string())
}

fn normalize(value: &str) -> String {
    unquote(value)
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

/// "remains unchanged" and its variants
fn is_unchanged(value: &str) -> bool {
    matches!(
        normalize(value).as_str(),
        "" | "remains unchanged" | "unchanged" | "the sentence remains unchanged"
    )
}

/// Whether a bare reply line reads as a value rather than commentary
fn is_terse_value(line: &str) -> bool {
    let lower = line.to_lowercase();
    if lower.contains("can't") || lower.contains("can\u{2019}t") {
        return false;
    }
    !lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| COMMENTARY_WORDS.contains(&word))
}

fn is_cannot_decontextualize(value: &str) -> bool {
    value
        .to_lowercase()
        .contains(&CANNOT_DECONTEXTUALIZE.to_lowercase())
}

/// Items of the first list starting at the beginning of a line
fn find_array(lines: &[&str]) -> Option<Vec<String>> {
    let start = lines.iter().position(|l| l.trim_start().starts_with('['))?;
    let joined = lines[start..].join("\n");
    let block = bracket_block(&joined);

    if let Ok(items) = serde_json::from_str::<Vec<String>>(block) {
        return Some(items);
    }
    if let Ok(items) = serde_json::from_str::<Vec<String>>(&strip_trailing_commas(block)) {
        return Some(items);
    }
    Some(quoted_strings(block))
}

/// Slice from the opening `[` to its matching `]`, ignoring brackets inside
/// string literals; the whole input if the list is never closed
fn bracket_block(s: &str) -> &str {
    let s = s.trim_start();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return &s[..=i];
                }
            }
            _ => {}
        }
    }
    s
}

/// Drop commas that directly precede a closing `]`, outside string literals
fn strip_trailing_commas(block: &str) -> String {
    let mut out = String::with_capacity(block.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in block.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if c == ',' && block[i + 1..].trim_start().starts_with(']') {
            continue;
        }
        out.push(c);
    }
    out
}

/// String literals of a list that is not valid JSON, in order
///
/// Straight-quoted items follow JSON escaping; curly-quoted items run to the
/// closing `”`. Line breaks and separators between items are ignored.
fn quoted_strings(block: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut chars = block.char_indices();

    while let Some((start, open)) = chars.next() {
        let close = match open {
            '"' => '"',
            '“' => '”',
            _ => continue,
        };

        let mut escaped = false;
        let mut end = None;
        for (i, c) in chars.by_ref() {
            if escaped {
                escaped = false;
            } else if c == '\\' && close == '"' {
                escaped = true;
            } else if c == close {
                end = Some(i);
                break;
            }
        }

        let Some(end) = end else {
            break;
        };
        let inner = &block[start + open.len_utf8()..end];
        let item = match close {
            '"' => serde_json::from_str::<String>(&block[start..=end])
                .unwrap_or_else(|_| inner.to_string()),
            _ => inner.to_string(),
        };
        items.push(item);
    }
    items
}

fn to_claims<'a>(items: impl Iterator<Item = &'a str>) -> Vec<Claim> {
    items
        .map(clean_proposition)
        .map(Claim::new)
        .filter(|c| !c.is_empty())
        .collect()
}

/// Trim, drop the "- true or false?" suffix and surrounding quotes
fn clean_proposition(item: &str) -> String {
    let item = unquote(item);
    let item = if item.to_ascii_lowercase().ends_with(TRUE_OR_FALSE_SUFFIX) {
        &item[..item.len() - TRUE_OR_FALSE_SUFFIX.len()]
    } else {
        item
    };
    unquote(item).to_string()
}

fn is_listed_proposition(item: &str) -> bool {
    !item.is_empty() && !item.ends_with(':') && is_terse_value(item)
}

/// Text of a bulleted ("- ", "* ", "• ") or numbered ("1. ", "2) ") line
fn list_item(line: &str) -> Option<&str> {
    let line = line.trim();
    for marker in ["- ", "* ", "• "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some(rest.trim_start());
        }
    }

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = &line[digits..];
    rest.strip_prefix(". ")
        .or_else(|| rest.strip_prefix(") "))
        .map(str::trim_start)
}
