//! Approximate token counting.
//!
//! Used only to decide when summarization or truncation is needed, so
//! exactness does not matter; monotonicity with text length does. The
//! estimator never fails: a model without a known encoding ratio logs a
//! warning and falls back to the 4-chars-per-token heuristic.

use tracing::warn;

/// Fallback ratio when the model encoding is unknown.
const FALLBACK_CHARS_PER_TOKEN: f32 = 4.0;

/// Average characters per token for known model families, measured on
/// English prose. Matched by model-id prefix.
const MODEL_RATIOS: &[(&str, f32)] = &[
    ("gemini-2", 4.0),
    ("gemini-1.5", 4.0),
    ("gemini", 4.0),
    ("gpt-4", 3.8),
    ("gpt-3.5", 3.8),
    ("claude", 3.5),
];

/// Character-ratio token estimator for a specific model.
#[derive(Debug, Clone, Copy)]
pub struct TokenEstimator {
    chars_per_token: f32,
}

impl Default for TokenEstimator {
    fn default() -> Self {
        Self {
            chars_per_token: FALLBACK_CHARS_PER_TOKEN,
        }
    }
}

impl TokenEstimator {
    /// Estimator for the given model id. Unknown models log a warning and
    /// use the fallback ratio rather than failing the caller.
    #[must_use]
    pub fn for_model(model: &str) -> Self {
        match MODEL_RATIOS
            .iter()
            .find(|(prefix, _)| model.starts_with(prefix))
        {
            Some((_, ratio)) => Self {
                chars_per_token: *ratio,
            },
            None => {
                warn!(model, "no token ratio for model, using character heuristic");
                Self::default()
            },
        }
    }

    /// Approximate token count for `text`.
    #[must_use]
    pub fn estimate(&self, text: &str) -> usize {
        (text.chars().count() as f32 / self.chars_per_token).ceil() as usize
    }
}
