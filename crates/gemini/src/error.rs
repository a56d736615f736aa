use podforge_common::Retryable;

/// Typed failures from the Gemini API.
///
/// Classification is structural (status codes carried in variants), never
/// derived from matching substrings of error text.
#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("Gemini API key not configured")]
    MissingApiKey,

    #[error("Gemini rate limit exceeded: {message}")]
    RateLimited { message: String },

    #[error("Gemini rejected the credential: {message}")]
    Unauthorized { message: String },

    #[error("Gemini API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Gemini request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to read upload source: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid MIME type: {0}")]
    InvalidMimeType(String),

    #[error("Gemini returned no candidate text")]
    EmptyResponse,
}

impl GeminiError {
    /// Map a non-success HTTP status plus response body to a typed error.
    pub(crate) fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            429 => Self::RateLimited { message: body },
            401 | 403 => Self::Unauthorized { message: body },
            status => Self::Api {
                status,
                message: body,
            },
        }
    }
}

impl Retryable for GeminiError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Http(err) => err.is_timeout() || err.is_connect(),
            Self::MissingApiKey
            | Self::Unauthorized { .. }
            | Self::Io(_)
            | Self::InvalidMimeType(_)
            | Self::EmptyResponse => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            GeminiError::from_status(reqwest::StatusCode::TOO_MANY_REQUESTS, String::new()),
            GeminiError::RateLimited { .. }
        ));
        assert!(matches!(
            GeminiError::from_status(reqwest::StatusCode::UNAUTHORIZED, String::new()),
            GeminiError::Unauthorized { .. }
        ));
        assert!(matches!(
            GeminiError::from_status(reqwest::StatusCode::BAD_REQUEST, String::new()),
            GeminiError::Api { status: 400, .. }
        ));
    }

    #[test]
    fn test_retryability() {
        assert!(
            GeminiError::RateLimited {
                message: String::new()
            }
            .is_retryable()
        );
        assert!(
            GeminiError::Api {
                status: 503,
                message: String::new()
            }
            .is_retryable()
        );
        assert!(
            !GeminiError::Api {
                status: 400,
                message: String::new()
            }
            .is_retryable()
        );
        assert!(
            !GeminiError::Unauthorized {
                message: String::new()
            }
            .is_retryable()
        );
        assert!(!GeminiError::EmptyResponse.is_retryable());
    }
}
