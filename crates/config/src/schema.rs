//! Configuration schema.

use {
    secrecy::Secret,
    serde::{Deserialize, Serialize},
};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gemini: GeminiConfig,
    pub elevenlabs: ElevenLabsConfig,
}

impl AppConfig {
    /// Build configuration from environment variables.
    ///
    /// Recognized variables: `GEMINI_API_KEY`, `GEMINI_MODEL`,
    /// `ELEVENLABS_API_KEY`, `ELEVENLABS_VOICE_PRIMARY`,
    /// `ELEVENLABS_VOICE_SECONDARY`. Missing keys stay `None`; each client
    /// reports a configuration error before any network call is attempted.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            config.gemini.api_key = Some(Secret::new(key));
        }
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            config.gemini.model = model;
        }
        if let Ok(key) = std::env::var("ELEVENLABS_API_KEY") {
            config.elevenlabs.api_key = Some(Secret::new(key));
        }
        if let Ok(voice) = std::env::var("ELEVENLABS_VOICE_PRIMARY") {
            config.elevenlabs.primary_voice_id = voice;
        }
        if let Ok(voice) = std::env::var("ELEVENLABS_VOICE_SECONDARY") {
            config.elevenlabs.secondary_voice_id = voice;
        }
        config
    }
}

/// Gemini generative-model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API key (from GEMINI_API_KEY env or config).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_option_secret",
        deserialize_with = "deserialize_option_secret"
    )]
    pub api_key: Option<Secret<String>>,

    /// Model id (e.g. "gemini-2.0-flash").
    pub model: String,

    /// Generation parameters sent with every call.
    pub generation: GenerationConfig,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.0-flash".into(),
            generation: GenerationConfig::default(),
        }
    }
}

/// Sampling parameters for dialogue generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            top_p: 0.9,
            top_k: 40,
            max_output_tokens: 8192,
        }
    }
}

/// ElevenLabs text-to-speech configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElevenLabsConfig {
    /// API key (from ELEVENLABS_API_KEY env or config).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_option_secret",
        deserialize_with = "deserialize_option_secret"
    )]
    pub api_key: Option<Secret<String>>,

    /// Model to use (e.g. "eleven_turbo_v2_5").
    pub model_id: String,

    /// Voice for the primary (host) speaker.
    pub primary_voice_id: String,

    /// Voice for the secondary (co-host) speaker.
    pub secondary_voice_id: String,

    /// Voice stability (0.0 - 1.0).
    pub stability: f32,

    /// Similarity boost (0.0 - 1.0).
    pub similarity_boost: f32,

    /// Provider-side input cap; longer text is truncated before the call.
    pub max_text_length: usize,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model_id: "eleven_turbo_v2_5".into(),
            primary_voice_id: "onwK4e9ZLuTAKqWW03F9".into(),
            secondary_voice_id: "9BWtsMINqrJLrRacOk9x".into(),
            stability: 0.5,
            similarity_boost: 0.75,
            max_text_length: 5000,
        }
    }
}

// ── Secret serialization helpers ───────────────────────────────────────────

fn serialize_option_secret<S>(
    value: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use secrecy::ExposeSecret;
    match value {
        Some(secret) => serializer.serialize_some(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

fn deserialize_option_secret<'de, D>(deserializer: D) -> Result<Option<Secret<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.map(Secret::new))
}
