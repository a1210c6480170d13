//! Sentence module - the ordered units an answer is split into

use std::fmt;

/// One sentence of a segmented answer
///
/// Sentences are created once by the segmenter and never move afterwards:
/// `index` is the position in the answer and the only relationship between
/// sentences that matters to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sentence {
    /// Zero-based position in the answer
    pub index: usize,

    /// Sentence text, trimmed
    pub text: String,
}

impl Sentence {
    /// Create a new sentence
    ///
    /// # Examples
    ///
    /// ```
    /// use claimify_domain::Sentence;
    ///
    /// let s = Sentence::new(0, "John joined in 2010.");
    /// assert_eq!(s.index, 0);
    /// assert_eq!(s.text, "John joined in 2010.");
    /// ```
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Length of the text in characters (Unicode scalar values)
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

impl AsRef<str> for Sentence {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Build an indexed sentence sequence from plain strings
///
/// Indices are assigned 0..n-1 in the given order.
pub fn index_sentences<I, S>(texts: I) -> Vec<Sentence>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    texts
        .into_iter()
        .enumerate()
        .map(|(index, text)| Sentence::new(index, text))
        .collect()
}
