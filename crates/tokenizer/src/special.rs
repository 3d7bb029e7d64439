use serde::{Deserialize, Serialize};

/// Reserved vocabulary entries that exist regardless of corpus content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialTokens {
    /// Stands in for any token missing from the vocabulary.
    pub unk: String,
    /// Sentence-start marker, repeated to fill the first context.
    pub start: String,
    /// Sentence-end marker, predicted once per line.
    pub end: String,
}

impl Default for SpecialTokens {
    fn default() -> Self {
        Self {
            unk: "<UNK>".to_string(),
            start: "<S>".to_string(),
            end: "</S>".to_string(),
        }
    }
}

impl SpecialTokens {
    /// In the order they are appended to a freshly built vocabulary.
    pub fn as_array(&self) -> [&str; 3] {
        [&self.unk, &self.start, &self.end]
    }
}
