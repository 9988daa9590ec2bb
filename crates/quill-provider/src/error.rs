//! Provider errors

/// Provider error
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Transport failure or timeout
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("API Error: {code} {reason}")]
    Status {
        /// HTTP status code
        code: u16,
        /// Canonical reason phrase
        reason: String,
    },

    /// Body was not a usable chat completion
    #[error("{0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Missing or empty `choices[0].message.content`
    #[must_use]
    pub fn empty_response() -> Self {
        Self::MalformedResponse("Received an empty response from the AI.".to_string())
    }

    /// True for timeouts and 5xx/429 answers
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request(err) => err.is_timeout() || err.is_connect(),
            Self::Status { code, .. } => *code == 429 || *code >= 500,
            Self::MalformedResponse(_) => false,
        }
    }

    /// Message suitable for showing to the user
    #[must_use]
    pub fn user_message(&self) -> String {
        format!("An error occurred: {self}")
    }
}
