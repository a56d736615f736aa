//! Content acquisition and preparation for the podcast pipeline.
//!
//! Everything upstream of dialogue generation lives here: approximate
//! token counting, web page extraction, model-backed summarization, topic
//! extraction, and company research.

pub mod company;
pub mod extract;
pub mod summarize;
pub mod tokens;
pub mod topics;

pub use {
    company::research_company,
    extract::{ContentExtractor, ExtractedContent},
    summarize::{TargetLength, summarize},
    tokens::TokenEstimator,
    topics::extract_topics,
};
