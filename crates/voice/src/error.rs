use podforge_common::Retryable;

/// Typed failures from a speech-synthesis call.
///
/// The status classes the pipeline distinguishes: validation (400),
/// authentication (401), unknown voice (404), rate limit (429), other
/// server errors, and transport failures. Classification is structural;
/// no error-message sniffing.
#[derive(Debug, thiserror::Error)]
pub enum TtsError {
    #[error("speech provider API key not configured")]
    MissingApiKey,

    #[error("speech provider rejected the request: {message}")]
    InvalidRequest { message: String },

    #[error("speech provider rejected the credential: {message}")]
    Unauthorized { message: String },

    #[error("voice '{voice_id}' not found")]
    VoiceNotFound { voice_id: String },

    #[error("speech provider rate limit exceeded: {message}")]
    RateLimited { message: String },

    #[error("speech provider error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("speech request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("speech request timed out")]
    Timeout,
}

impl TtsError {
    /// Map a non-success HTTP status plus response body to a typed error.
    pub(crate) fn from_status(status: reqwest::StatusCode, voice_id: &str, body: String) -> Self {
        match status.as_u16() {
            400 => Self::InvalidRequest { message: body },
            401 => Self::Unauthorized { message: body },
            404 => Self::VoiceNotFound {
                voice_id: voice_id.into(),
            },
            429 => Self::RateLimited { message: body },
            status => Self::Api {
                status,
                message: body,
            },
        }
    }
}

impl Retryable for TtsError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Timeout => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Http(err) => err.is_timeout() || err.is_connect(),
            Self::MissingApiKey
            | Self::InvalidRequest { .. }
            | Self::Unauthorized { .. }
            | Self::VoiceNotFound { .. } => false,
        }
    }
}
