//! Gemini generative-model client.
//!
//! Wraps the two operations the pipeline needs: single-shot content
//! generation with a system instruction and prior context, and file upload
//! to the model's file store for document-grounded generation.

mod client;
mod error;
mod types;

pub use {
    client::GeminiClient,
    error::GeminiError,
    types::{Content, FileHandle, Part},
};
