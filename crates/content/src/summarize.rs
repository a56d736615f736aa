//! Model-backed summarization of long content.

use tracing::{debug, info};

use podforge_gemini::{GeminiClient, GeminiError};

use crate::tokens::TokenEstimator;

/// Content below this estimated token count is returned unchanged; a model
/// call would cost more than it saves.
const MIN_SUMMARIZE_TOKENS: usize = 1000;

const SUMMARIZER_INSTRUCTION: &str =
    "You are an expert content summarizer who maintains the key information \
     while reducing length.";

/// How aggressively to compress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl TargetLength {
    /// Natural-language description used in the summarization prompt.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Short => "a concise 2-3 paragraph summary",
            Self::Medium => "a detailed 4-6 paragraph summary with key points",
            Self::Long => {
                "a comprehensive summary that preserves the most important details and examples"
            },
        }
    }
}

/// Compress `text` toward `target` length with a single model call.
///
/// Returns the input unchanged when it is already short. Model failures
/// propagate unmodified; retry lives in the client.
pub async fn summarize(
    client: &GeminiClient,
    estimator: TokenEstimator,
    text: &str,
    target: TargetLength,
) -> Result<String, GeminiError> {
    let token_count = estimator.estimate(text);
    if token_count < MIN_SUMMARIZE_TOKENS {
        debug!(token_count, "content already short, skipping summarization");
        return Ok(text.to_string());
    }

    let prompt = format!(
        "Summarize the following content into {}. Preserve the most important \
         information, key concepts, and any specific data or statistics that \
         would be valuable in a podcast discussion. Focus on creating a coherent \
         narrative that could be used as source material for a podcast.\n\n\
         CONTENT TO SUMMARIZE:\n{text}",
        target.description()
    );

    info!(token_count, target = ?target, "summarizing content");
    let summary = client.generate(SUMMARIZER_INSTRUCTION, &[], &prompt).await?;
    debug!(
        summary_tokens = estimator.estimate(&summary),
        "summarization complete"
    );
    Ok(summary)
}
