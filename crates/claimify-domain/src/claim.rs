//! Claim module - the output unit of the extraction pipeline

use std::fmt;

/// A claim - one minimal, independently verifiable proposition
///
/// Claims carry no back-reference to the sentence they came from. Their
/// position in the final claim list follows sentence order, then the
/// decomposition order within a sentence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Claim(String);

impl Claim {
    /// Create a new claim from proposition text
    ///
    /// Surrounding whitespace is trimmed.
    ///
    /// # Examples
    ///
    /// ```
    /// use claimify_domain::Claim;
    ///
    /// let claim = Claim::new("  Smith advocates for renewable energy. ");
    /// assert_eq!(claim.as_str(), "Smith advocates for renewable energy.");
    /// ```
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.len() == text.len() {
            Self(text)
        } else {
            Self(trimmed.to_string())
        }
    }

    /// Borrow the proposition text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the claim, returning the proposition text
    pub fn into_string(self) -> String {
        self.0
    }

    /// Whether the claim has no text
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Claim {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Claim> for String {
    fn from(claim: Claim) -> Self {
        claim.0
    }
}
