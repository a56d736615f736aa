//! Topic extraction.

use std::sync::LazyLock;

use {regex::Regex, tracing::debug};

use podforge_gemini::{GeminiClient, GeminiError};

const TOPIC_INSTRUCTION: &str =
    "You are an expert at identifying key topics and themes in content.";

/// Leading list markers the model tends to emit: "1. ", "- ", "• ", "* ".
#[allow(clippy::expect_used)]
static LIST_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\d+[.)]\s*|[-•*]\s*)").expect("list marker pattern compiles")
});

/// Ask the model for the `n` most salient topics in `text`.
///
/// Returns up to `n` short phrases; fewer is not an error.
pub async fn extract_topics(
    client: &GeminiClient,
    text: &str,
    n: usize,
) -> Result<Vec<String>, GeminiError> {
    let prompt = format!(
        "Identify the {n} most important topics or themes in the following \
         content. For each topic, provide a short phrase (3-5 words) that \
         accurately describes it. Format your response as a simple list of \
         topics, one per line.\n\nCONTENT:\n{text}"
    );

    let response = client.generate(TOPIC_INSTRUCTION, &[], &prompt).await?;
    let topics = clean_topic_lines(&response, n);
    debug!(count = topics.len(), "extracted topics");
    Ok(topics)
}

/// Strip list markers, drop blanks, cap at `n`.
fn clean_topic_lines(response: &str, n: usize) -> Vec<String> {
    response
        .lines()
        .map(|line| LIST_MARKER_RE.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .take(n)
        .collect()
}
