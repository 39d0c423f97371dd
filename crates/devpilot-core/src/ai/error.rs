//! Errors from completion calls

use std::time::Duration;

/// Errors from LLM operations.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("completion timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("missing API key: {0}")]
    MissingApiKey(String),
}

impl CompletionError {
    pub fn is_timeout(&self) -> bool {
        match self {
            CompletionError::Timeout(_) => true,
            CompletionError::Http(err) => err.is_timeout(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CompletionError::Api {
            status: 401,
            message: "invalid api key".into(),
        };
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("invalid api key"));

        let err = CompletionError::Timeout(Duration::from_secs(60));
        assert!(err.to_string().contains("timed out"));
        assert!(err.is_timeout());

        let err = CompletionError::MissingApiKey("GEMINI_API_KEY not set".into());
        assert!(err.to_string().contains("missing API key"));
        assert!(!err.is_timeout());
    }
}
