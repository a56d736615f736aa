//! Dialogue generation: the pipeline entry point.

use tracing::{debug, info};

use {
    podforge_content::{
        ContentExtractor, TargetLength, TokenEstimator, extract_topics, research_company,
        summarize,
    },
    podforge_gemini::{Content, GeminiClient},
};

use crate::{
    dialogue::DialogueTurn, error::PipelineError, script::parse_script, source::ContentSource,
};

/// Website content above this estimated token count is summarized before
/// dialogue generation.
const URL_SUMMARIZE_TOKENS: usize = 6000;

/// Raw text above this estimated token count is summarized.
const RAW_TEXT_SUMMARIZE_TOKENS: usize = 8000;

/// Topics requested for website sources.
const TOPIC_COUNT: usize = 5;

/// Builds the model context for a content source and turns the model's
/// script into typed dialogue turns.
pub struct PodcastPipeline {
    gemini: GeminiClient,
    extractor: ContentExtractor,
    estimator: TokenEstimator,
}

impl PodcastPipeline {
    /// Create a pipeline around a Gemini client. `model` selects the token
    /// estimation ratio.
    #[must_use]
    pub fn new(gemini: GeminiClient, model: &str) -> Self {
        let estimator = TokenEstimator::for_model(model);
        Self {
            gemini,
            extractor: ContentExtractor::new(estimator),
            estimator,
        }
    }

    /// Generate dialogue turns for one content source.
    ///
    /// Builds the source-specific context, issues exactly one dialogue
    /// model call, and parses the response. An unparseable response is a
    /// hard [`PipelineError::NoDialogue`] failure.
    pub async fn generate(
        &self,
        prompt: &str,
        system_instruction: &str,
        source: &ContentSource,
    ) -> Result<Vec<DialogueTurn>, PipelineError> {
        info!(source = source.kind(), "generating podcast dialogue");
        let history = self.build_context(source).await?;

        let raw = self
            .gemini
            .generate(system_instruction, &history, prompt)
            .await?;

        let turns = parse_script(&raw);
        if turns.is_empty() {
            return Err(PipelineError::NoDialogue);
        }
        info!(turns = turns.len(), "dialogue parsed");
        Ok(turns)
    }

    /// Assemble the single context message for the dialogue call.
    async fn build_context(&self, source: &ContentSource) -> Result<Vec<Content>, PipelineError> {
        match source {
            ContentSource::Pdf(path) => {
                if !path.is_file() {
                    return Err(PipelineError::InputNotFound(path.clone()));
                }
                let handle = self.gemini.upload_file(path, "application/pdf").await?;
                Ok(vec![Content::user_file(&handle)])
            },

            ContentSource::Url(url) => {
                let extracted = self.extractor.extract(url).await;
                if extracted.main_content.trim().is_empty() {
                    return Err(PipelineError::ContentExtraction { url: url.clone() });
                }

                let mut content_text = extracted.combined();
                let token_count = self.estimator.estimate(&content_text);
                if token_count > URL_SUMMARIZE_TOKENS {
                    debug!(token_count, "website content is long, summarizing");
                    content_text = summarize(
                        &self.gemini,
                        self.estimator,
                        &content_text,
                        TargetLength::Long,
                    )
                    .await?;
                }

                let topics = extract_topics(&self.gemini, &content_text, TOPIC_COUNT).await?;
                let context = format!(
                    "WEBSITE: {}\n\nCONTENT SUMMARY:\n{}\n\nMAIN TOPICS: {}",
                    extracted.title,
                    content_text,
                    topics.join(", ")
                );
                Ok(vec![Content::user_text(context)])
            },

            ContentSource::CompanyName(name) => {
                let info = research_company(&self.gemini, name).await?;
                Ok(vec![Content::user_text(format!(
                    "COMPANY INFORMATION:\n{info}"
                ))])
            },

            ContentSource::RawText(text) => {
                let token_count = self.estimator.estimate(text);
                let content_text = if token_count > RAW_TEXT_SUMMARIZE_TOKENS {
                    debug!(token_count, "raw text is long, summarizing");
                    summarize(&self.gemini, self.estimator, text, TargetLength::Long).await?
                } else {
                    text.clone()
                };
                Ok(vec![Content::user_text(content_text)])
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use {
        super::*,
        crate::dialogue::Speaker,
        podforge_config::GeminiConfig,
        std::path::PathBuf,
        wiremock::{
            Mock, MockServer, ResponseTemplate,
            matchers::{body_partial_json, method, path, path_regex},
        },
    };

    fn pipeline(base_url: &str) -> PodcastPipeline {
        let gemini = GeminiClient::from_config(&GeminiConfig {
            api_key: Some(secrecy::Secret::new("test-key".into())),
            ..Default::default()
        })
        .with_base_url(base_url);
        PodcastPipeline::new(gemini, "gemini-2.0-flash")
    }

    fn dialogue_response(script: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [
                { "content": { "parts": [{ "text": script }] } }
            ]
        })
    }

    #[tokio::test]
    async fn test_missing_pdf_fails_without_network() {
        let mock_server = MockServer::start().await;
        let pipeline = pipeline(&mock_server.uri());

        let source = ContentSource::Pdf(PathBuf::from("/nonexistent/paper.pdf"));
        let result = pipeline.generate("prompt", "sys", &source).await;

        assert!(matches!(result, Err(PipelineError::InputNotFound(_))));
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_raw_text_source_single_model_call() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(":generateContent$"))
            .and(body_partial_json(serde_json::json!({
                "contents": [
                    { "role": "user", "parts": [{ "text": "A note about crabs." }] },
                    { "role": "user", "parts": [{ "text": "make it fun" }] },
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(dialogue_response(
                "male-1: Crabs!\nfemale-1: Crabs indeed.",
            )))
            .expect(1)
            .mount(&mock_server)
            .await;

        let pipeline = pipeline(&mock_server.uri());
        let source = ContentSource::RawText("A note about crabs.".into());
        let turns = pipeline.generate("make it fun", "sys", &source).await.unwrap();

        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].speaker(), Speaker::Primary);
        assert_eq!(turns[1].text(), "Crabs indeed.");
    }

    #[tokio::test]
    async fn test_unparseable_response_is_no_dialogue() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(":generateContent$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(dialogue_response(
                "Sorry, I cannot help with that.",
            )))
            .mount(&mock_server)
            .await;

        let pipeline = pipeline(&mock_server.uri());
        let source = ContentSource::RawText("anything".into());
        let result = pipeline.generate("prompt", "sys", &source).await;

        assert!(matches!(result, Err(PipelineError::NoDialogue)));
    }

    #[tokio::test]
    async fn test_url_source_extracts_topics_and_generates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/post"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html><head><title>Ferris</title>\
                 <meta name=\"description\" content=\"A mascot story.\"></head>\
                 <body><article><p>Ferris the crab has been the unofficial Rust mascot \
                 since the language's early days, adored by the community.</p>\
                 </article></body></html>",
            ))
            .mount(&mock_server)
            .await;

        // First generateContent call: topic extraction. Second: dialogue.
        Mock::given(method("POST"))
            .and(path_regex(":generateContent$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(dialogue_response(
                "1. Rust mascots\n2. Community lore",
            )))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path_regex(":generateContent$"))
            .and(body_partial_json(serde_json::json!({
                "systemInstruction": { "parts": [{ "text": "sys" }] }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(dialogue_response(
                "host: Today, a crab.\nguest: The crab.",
            )))
            .mount(&mock_server)
            .await;

        let pipeline = pipeline(&mock_server.uri());
        let source = ContentSource::Url(format!("{}/post", mock_server.uri()));
        let turns = pipeline.generate("prompt", "sys", &source).await.unwrap();

        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].speaker(), Speaker::Primary);
        assert_eq!(turns[1].speaker(), Speaker::Secondary);

        // Dialogue request context carries the website framing.
        let requests = mock_server.received_requests().await.unwrap();
        let dialogue_request = requests
            .iter()
            .filter(|r| r.url.path().ends_with(":generateContent"))
            .last()
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&dialogue_request.body).unwrap();
        let context = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(context.starts_with("WEBSITE: Ferris"));
        assert!(context.contains("MAIN TOPICS: Rust mascots, Community lore"));
    }

    #[tokio::test]
    async fn test_url_source_with_empty_extraction_fails() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/empty"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let pipeline = pipeline(&mock_server.uri());
        let source = ContentSource::Url(format!("{}/empty", mock_server.uri()));
        let result = pipeline.generate("prompt", "sys", &source).await;

        assert!(matches!(
            result,
            Err(PipelineError::ContentExtraction { .. })
        ));
    }

    #[tokio::test]
    async fn test_company_source_wraps_research_in_context() {
        let mock_server = MockServer::start().await;

        // First call: company research. Second: dialogue generation.
        Mock::given(method("POST"))
            .and(path_regex(":generateContent$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(dialogue_response(
                "Acme Corp builds anvils.",
            )))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path_regex(":generateContent$"))
            .and(body_partial_json(serde_json::json!({
                "contents": [
                    { "role": "user", "parts": [{ "text": "COMPANY INFORMATION:\nAcme Corp builds anvils." }] },
                    { "role": "user", "parts": [{ "text": "prompt" }] },
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(dialogue_response(
                "male-1: Anvils.\nfemale-1: Since forever.",
            )))
            .expect(1)
            .mount(&mock_server)
            .await;

        let pipeline = pipeline(&mock_server.uri());
        let source = ContentSource::CompanyName("Acme Corp".into());
        let turns = pipeline.generate("prompt", "sys", &source).await.unwrap();
        assert_eq!(turns.len(), 2);
    }

    #[tokio::test]
    async fn test_pdf_source_uploads_then_references_file() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/upload/v1beta/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "file": {
                    "name": "files/doc",
                    "uri": "https://generativelanguage.googleapis.com/v1beta/files/doc",
                    "mimeType": "application/pdf"
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path_regex(":generateContent$"))
            .and(body_partial_json(serde_json::json!({
                "contents": [
                    { "role": "user", "parts": [{ "fileData": { "mimeType": "application/pdf" } }] },
                    { "role": "user", "parts": [{ "text": "prompt" }] },
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(dialogue_response(
                "male-1: Page one says hello.",
            )))
            .expect(1)
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let pdf_path = dir.path().join("paper.pdf");
        std::fs::write(&pdf_path, b"%PDF-1.4 fake").unwrap();

        let pipeline = pipeline(&mock_server.uri());
        let source = ContentSource::Pdf(pdf_path);
        let turns = pipeline.generate("prompt", "sys", &source).await.unwrap();
        assert_eq!(turns.len(), 1);
    }
}
