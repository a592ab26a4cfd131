//! Token estimation for planning
//!
//! Approximates model-context cost from character counts. This is a planning
//! heuristic, not tokenization: roughly 4 characters per token for English
//! filing text, with the divisor carried in configuration.

/// Character-count token estimator.
#[derive(Debug, Clone, Copy)]
pub struct TokenEstimator {
    chars_per_token: usize,
}

impl TokenEstimator {
    /// Create an estimator with the given characters-per-token divisor.
    pub fn new(chars_per_token: usize) -> Self {
        Self {
            chars_per_token: chars_per_token.max(1),
        }
    }

    /// Estimate the token cost of a text span.
    pub fn estimate(&self, text: &str) -> usize {
        text.len() / self.chars_per_token
    }

    /// Estimate the output cost of a span as a fixed fraction of its input cost.
    pub fn estimate_output(&self, input_tokens: usize, fraction: f64) -> usize {
        (input_tokens as f64 * fraction) as usize
    }
}

impl Default for TokenEstimator {
    fn default() -> Self {
        Self::new(4)
    }
}
