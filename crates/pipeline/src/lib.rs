//! The content-to-dialogue-to-audio pipeline.
//!
//! A run ingests one [`ContentSource`], turns it into a two-speaker script
//! via the generative model, parses the script into typed turns, and
//! synthesizes per-turn audio concurrently into a single
//! [`PipelineResult`].

mod dialogue;
mod error;
mod generate;
mod result;
mod script;
mod source;
mod synthesize;

pub use {
    dialogue::{DialogueTurn, Speaker, VoiceMap},
    error::PipelineError,
    generate::PodcastPipeline,
    result::PipelineResult,
    script::parse_script,
    source::ContentSource,
    synthesize::AudioSynthesizer,
};

use std::sync::Arc;

use {podforge_config::AppConfig, podforge_gemini::GeminiClient, podforge_voice::ElevenLabsTts};

/// End-to-end generator: dialogue generation plus audio synthesis.
pub struct PodcastGenerator {
    pipeline: PodcastPipeline,
    synthesizer: AudioSynthesizer,
}

impl PodcastGenerator {
    /// Build all collaborators from configuration.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let gemini = GeminiClient::from_config(&config.gemini);
        let provider = Arc::new(ElevenLabsTts::from_config(&config.elevenlabs));
        Self {
            pipeline: PodcastPipeline::new(gemini, &config.gemini.model),
            synthesizer: AudioSynthesizer::new(provider, VoiceMap::from_config(&config.elevenlabs)),
        }
    }

    /// Run the full pipeline for one content source.
    pub async fn run(
        &self,
        prompt: &str,
        system_instruction: &str,
        source: &ContentSource,
    ) -> Result<PipelineResult, PipelineError> {
        let turns = self
            .pipeline
            .generate(prompt, system_instruction, source)
            .await?;
        self.synthesizer.synthesize(&turns).await
    }
}
