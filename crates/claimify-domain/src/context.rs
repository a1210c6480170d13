//! Context window module - neighbouring sentences around a target sentence
//!
//! The disambiguation stage needs to see a bounded span of text around the
//! sentence being analysed. The window is clamped at both ends of the answer
//! and never contains the target sentence itself.

use crate::sentence::Sentence;

/// Neighbouring sentences of one target sentence
///
/// Borrowed from the segmented answer; cheap to build per sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextWindow<'a> {
    /// Index of the sentence this window surrounds
    pub target_index: usize,

    /// Up to `p` sentences before the target, in order
    pub preceding: &'a [Sentence],

    /// Up to `f` sentences after the target, in order
    pub following: &'a [Sentence],
}

impl<'a> ContextWindow<'a> {
    /// Build the window for `index` with `preceding` look-back and
    /// `following` look-forward sizes
    ///
    /// `start = max(0, index - p)` and `end = min(len, index + f + 1)`.
    /// An index past the end of the sequence yields an empty window.
    ///
    /// # Examples
    ///
    /// ```
    /// use claimify_domain::{ContextWindow, Sentence};
    ///
    /// let sentences = vec![
    ///     Sentence::new(0, "John joined in 2010."),
    ///     Sentence::new(1, "He led the team."),
    ///     Sentence::new(2, "Growth followed."),
    /// ];
    /// let window = ContextWindow::build(&sentences, 1, 1, 1);
    /// assert_eq!(window.render(), "John joined in 2010. Growth followed.");
    /// ```
    pub fn build(sentences: &'a [Sentence], index: usize, preceding: usize, following: usize) -> Self {
        let len = sentences.len();
        if index >= len {
            return Self {
                target_index: index,
                preceding: &[],
                following: &[],
            };
        }

        let start = index.saturating_sub(preceding);
        let end = index.saturating_add(following).saturating_add(1).min(len);

        Self {
            target_index: index,
            preceding: &sentences[start..index],
            following: &sentences[index + 1..end],
        }
    }

    /// Number of sentences in the window
    pub fn len(&self) -> usize {
        self.preceding.len() + self.following.len()
    }

    /// Whether the window holds no sentences
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the window's sentences, preceding first
    pub fn sentences(&self) -> impl Iterator<Item = &'a Sentence> + '_ {
        self.preceding.iter().chain(self.following.iter())
    }

    /// Join the window's sentences with single spaces
    pub fn render(&self) -> String {
        self.sentences()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Build the context string for `index`
///
/// Convenience wrapper over [`ContextWindow::build`] + [`ContextWindow::render`].
pub fn build_window(sentences: &[Sentence], index: usize, preceding: usize, following: usize) -> String {
    ContextWindow::build(sentences, index, preceding, following).render()
}
