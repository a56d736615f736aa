use std::path::PathBuf;

use podforge_gemini::GeminiError;

/// Failures that abort a whole pipeline run.
///
/// Per-turn synthesis failures are not represented here; they degrade into
/// transcript markers and a reduced processed count.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("speech provider credential not configured")]
    MissingSpeechCredential,

    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("could not extract meaningful content from {url}")]
    ContentExtraction { url: String },

    #[error(transparent)]
    Generation(#[from] GeminiError),

    #[error("no dialogue turns could be parsed from the model output")]
    NoDialogue,

    #[error("no dialogue turns to synthesize")]
    NoTurns,

    #[error("speech synthesis produced no audio")]
    SynthesisFailed,
}
