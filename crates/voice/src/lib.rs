//! Speech synthesis providers.
//!
//! The pipeline consumes text-to-speech through the [`SpeechProvider`]
//! trait; [`ElevenLabsTts`] is the production implementation.

mod elevenlabs;
mod error;
mod provider;

pub use {elevenlabs::ElevenLabsTts, error::TtsError, provider::SpeechProvider};
