//! HTTP client for the Gemini generateContent and file-upload endpoints.

use std::path::Path;

use {
    reqwest::{
        Client,
        multipart::{Form, Part as MultipartPart},
    },
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
    tracing::debug,
};

use {
    podforge_common::{RetryPolicy, with_retry},
    podforge_config::{GeminiConfig, GenerationConfig},
};

use crate::{
    error::GeminiError,
    types::{Content, FileHandle},
};

/// Gemini API base URL.
const API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Gemini generative-model client.
///
/// Generation calls are retried per the configured [`RetryPolicy`]; only
/// rate-limit, 5xx, and transient transport failures are retried.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<Secret<String>>,
    model: String,
    generation: GenerationConfig,
    base_url: String,
    retry: RetryPolicy,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiClient {
    /// Create a client from configuration.
    #[must_use]
    pub fn from_config(config: &GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            generation: config.generation.clone(),
            base_url: API_BASE.into(),
            retry: RetryPolicy::default(),
        }
    }

    /// Override the API base URL (for testing against a mock server).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Whether a credential is present. Checked before any network call.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn get_api_key(&self) -> Result<&Secret<String>, GeminiError> {
        self.api_key.as_ref().ok_or(GeminiError::MissingApiKey)
    }

    /// Generate text from a prompt, a system directive, and prior context.
    ///
    /// Issues exactly one logical model call; transient failures are
    /// retried internally.
    pub async fn generate(
        &self,
        system_instruction: &str,
        history: &[Content],
        prompt: &str,
    ) -> Result<String, GeminiError> {
        with_retry(self.retry, "gemini.generate", || {
            self.generate_once(system_instruction, history, prompt)
        })
        .await
    }

    async fn generate_once(
        &self,
        system_instruction: &str,
        history: &[Content],
        prompt: &str,
    ) -> Result<String, GeminiError> {
        let api_key = self.get_api_key()?;

        let mut contents: Vec<serde_json::Value> = Vec::with_capacity(history.len() + 1);
        for content in history {
            contents.push(serde_json::to_value(content).unwrap_or_default());
        }
        contents.push(serde_json::to_value(Content::user_text(prompt)).unwrap_or_default());

        let body = serde_json::json!({
            "contents": contents,
            "systemInstruction": {
                "parts": [{ "text": system_instruction }]
            },
            "generationConfig": {
                "temperature": self.generation.temperature,
                "topP": self.generation.top_p,
                "topK": self.generation.top_k,
                "maxOutputTokens": self.generation.max_output_tokens,
            },
        });

        debug!(
            model = %self.model,
            history_len = history.len(),
            "gemini generate request"
        );

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key.expose_secret())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::from_status(status, body));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text = parsed.first_candidate_text();
        if text.trim().is_empty() {
            return Err(GeminiError::EmptyResponse);
        }
        Ok(text)
    }

    /// Upload a local file to the Gemini file store.
    ///
    /// The returned handle can be referenced from generation requests via
    /// [`Content::user_file`].
    pub async fn upload_file(
        &self,
        path: &Path,
        mime_type: &str,
    ) -> Result<FileHandle, GeminiError> {
        let api_key = self.get_api_key()?;

        let bytes = tokio::fs::read(path).await?;
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".into());

        let metadata = serde_json::json!({ "file": { "display_name": display_name } });
        let file_part = MultipartPart::bytes(bytes)
            .file_name(display_name.clone())
            .mime_str(mime_type)
            .map_err(|_| GeminiError::InvalidMimeType(mime_type.into()))?;
        let form = Form::new()
            .text("metadata", metadata.to_string())
            .part("file", file_part);

        debug!(path = %path.display(), mime_type, "uploading file to gemini");

        let url = format!("{}/upload/v1beta/files", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key.expose_secret())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::from_status(status, body));
        }

        let parsed: UploadResponse = response.json().await?;
        debug!(uri = %parsed.file.uri, "file uploaded");
        Ok(parsed.file)
    }
}

// ── API Types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate, empty if absent.
    fn first_candidate_text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: FileHandle,
}
