use std::{path::Path, time::Duration};

use bytes::Bytes;

/// Bitrate assumed when estimating playback duration from byte length;
/// matches the provider's default MP3 output.
const ASSUMED_BITRATE_BPS: f64 = 128_000.0;

/// Output of a pipeline run. Constructed once; never mutated.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Concatenated audio in original turn order. May be shorter than the
    /// full dialogue when individual turns failed.
    pub audio: Bytes,
    /// Turn-ordered transcript with inline `[ERROR ...]` markers for
    /// failed turns.
    pub transcript: String,
    /// Number of parsed dialogue turns.
    pub total_items: usize,
    /// Number of turns whose audio synthesis succeeded.
    pub processed_items: usize,
}

impl PipelineResult {
    /// Size of the audio output in bytes.
    #[must_use]
    pub fn file_size(&self) -> usize {
        self.audio.len()
    }

    /// Rough playback duration derived from byte length.
    #[must_use]
    pub fn duration_estimate(&self) -> Duration {
        Duration::from_secs_f64(self.audio.len() as f64 * 8.0 / ASSUMED_BITRATE_BPS)
    }

    /// Whether every turn synthesized successfully.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.processed_items == self.total_items
    }

    /// Write the audio bytes to `path`.
    pub fn write_audio(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, &self.audio)
    }

    /// Write the transcript (UTF-8 text) to `path`.
    pub fn write_transcript(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.transcript.as_bytes())
    }
}
