use {async_trait::async_trait, bytes::Bytes};

use crate::error::TtsError;

/// Text-to-speech provider trait.
///
/// One call synthesizes one utterance with one voice. Implementations do
/// not retry; the caller owns the retry policy so attempts stay observable.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Provider identifier (e.g. "elevenlabs").
    fn id(&self) -> &'static str;

    /// Check if the provider credential is present.
    fn is_configured(&self) -> bool;

    /// Convert text to audio bytes using the given voice.
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Bytes, TtsError>;
}
