//! Token estimation heuristics

/// Token estimator trait for different tokenization strategies
pub trait TokenEstimator: Send + Sync {
    /// Estimate the number of tokens in the given text
    fn estimate(&self, text: &str) -> usize;
}

/// Length-ratio estimator: `round(len / chars_per_token)`.
///
/// Length is counted in UTF-16 code units so CJK and ASCII text produce the
/// same counts clients observe for `string.length`.
pub struct CharRatioEstimator {
    chars_per_token: usize,
}

impl CharRatioEstimator {
    pub fn new(chars_per_token: usize) -> Self {
        Self {
            chars_per_token: chars_per_token.max(1),
        }
    }
}

impl Default for CharRatioEstimator {
    fn default() -> Self {
        Self::new(4)
    }
}

impl TokenEstimator for CharRatioEstimator {
    fn estimate(&self, text: &str) -> usize {
        let len = text.encode_utf16().count();
        // Half rounds up
        (len + self.chars_per_token / 2) / self.chars_per_token
    }
}
