//! Shared utilities used across all podforge crates.

pub mod retry;

pub use retry::{Retryable, RetryPolicy, with_retry};
