//! Podforge configuration types.
//!
//! Configuration is built once at process start ([`AppConfig::from_env`])
//! and passed into component constructors. Components never read ambient
//! environment state themselves.

mod schema;

pub use schema::{AppConfig, ElevenLabsConfig, GeminiConfig, GenerationConfig};
