//! ElevenLabs TTS provider implementation.
//!
//! ElevenLabs synthesizes one utterance per request, keyed by voice ID,
//! returning raw MP3 bytes. Input longer than the provider-side limit is
//! truncated with an ellipsis before the call.

use {
    async_trait::async_trait,
    bytes::Bytes,
    reqwest::Client,
    secrecy::{ExposeSecret, Secret},
    serde::Serialize,
    tracing::{debug, warn},
};

use podforge_config::ElevenLabsConfig;

use crate::{error::TtsError, provider::SpeechProvider};

/// ElevenLabs API base URL.
const API_BASE: &str = "https://api.elevenlabs.io/v1";

/// ElevenLabs TTS provider.
#[derive(Clone)]
pub struct ElevenLabsTts {
    client: Client,
    api_key: Option<Secret<String>>,
    model_id: String,
    stability: f32,
    similarity_boost: f32,
    max_text_length: usize,
    base_url: String,
}

impl std::fmt::Debug for ElevenLabsTts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevenLabsTts")
            .field("api_key", &"[REDACTED]")
            .field("model_id", &self.model_id)
            .field("max_text_length", &self.max_text_length)
            .finish()
    }
}

impl ElevenLabsTts {
    /// Create a provider from configuration.
    #[must_use]
    pub fn from_config(config: &ElevenLabsConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            model_id: config.model_id.clone(),
            stability: config.stability,
            similarity_boost: config.similarity_boost,
            max_text_length: config.max_text_length,
            base_url: API_BASE.into(),
        }
    }

    /// Override the API base URL (for testing).
    #[cfg(test)]
    #[must_use]
    fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn get_api_key(&self) -> Result<&Secret<String>, TtsError> {
        self.api_key.as_ref().ok_or(TtsError::MissingApiKey)
    }
}

#[async_trait]
impl SpeechProvider for ElevenLabsTts {
    fn id(&self) -> &'static str {
        "elevenlabs"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Bytes, TtsError> {
        let api_key = self.get_api_key()?;

        let text = match truncate_for_synthesis(text, self.max_text_length) {
            Truncated::No => text.to_string(),
            Truncated::Yes(shortened) => {
                warn!(
                    limit = self.max_text_length,
                    original_len = text.len(),
                    "turn text exceeds provider limit, truncating"
                );
                shortened
            },
        };

        let body = TtsRequest {
            text: &text,
            model_id: &self.model_id,
            voice_settings: VoiceSettings {
                stability: self.stability,
                similarity_boost: self.similarity_boost,
            },
        };

        let url = format!("{}/text-to-speech/{voice_id}", self.base_url);
        debug!(voice_id, text_len = text.len(), "elevenlabs TTS request");

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", api_key.expose_secret())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TtsError::from_status(status, voice_id, body));
        }

        Ok(response.bytes().await?)
    }
}

enum Truncated {
    No,
    Yes(String),
}

/// Cap input at `max` characters, ending at a char boundary with an
/// ellipsis marker. Lossy, but keeps the call inside provider limits.
fn truncate_for_synthesis(text: &str, max: usize) -> Truncated {
    if text.len() <= max {
        return Truncated::No;
    }
    let mut end = max.saturating_sub(1);
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    let mut shortened = text[..end].to_string();
    shortened.push('…');
    Truncated::Yes(shortened)
}

// ── API Types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}
