//! Errors raised by the generative backend layer.

use storyboard_common::error::StoryboardError;

/// Failures of backend requests and credential handling.
#[derive(Debug, thiserror::Error)]
pub enum GenAiError {
    /// Analysis request failed for any reason (transport, status, parse).
    #[error("analysis failed: {message}")]
    Analysis { message: String, credential: bool },

    /// Sketch request failed.
    #[error("image generation failed: {message}")]
    Image { message: String, credential: bool },

    /// The backend rejected the key during an explicit check.
    #[error("credential rejected: {message}")]
    Credential { message: String },

    /// No key could be obtained from the provider.
    #[error("no API key available: {message}")]
    MissingCredential { message: String },

    /// The request was refused locally before reaching the network.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Result type alias using GenAiError.
pub type GenAiResult<T> = Result<T, GenAiError>;

impl GenAiError {
    pub fn analysis(msg: impl Into<String>, credential: bool) -> Self {
        Self::Analysis {
            message: msg.into(),
            credential,
        }
    }

    pub fn image(msg: impl Into<String>, credential: bool) -> Self {
        Self::Image {
            message: msg.into(),
            credential,
        }
    }

    pub fn credential(msg: impl Into<String>) -> Self {
        Self::Credential {
            message: msg.into(),
        }
    }

    pub fn missing_credential(msg: impl Into<String>) -> Self {
        Self::MissingCredential {
            message: msg.into(),
        }
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: msg.into(),
        }
    }

    /// Whether the failure means the key itself is unusable.
    pub fn is_credential(&self) -> bool {
        match self {
            Self::Analysis { credential, .. } | Self::Image { credential, .. } => *credential,
            Self::Credential { .. } | Self::MissingCredential { .. } => true,
            Self::InvalidRequest { .. } | Self::Client(_) => false,
        }
    }
}

impl From<GenAiError> for StoryboardError {
    fn from(err: GenAiError) -> Self {
        let message = err.to_string();
        match err {
            GenAiError::Analysis { .. } | GenAiError::InvalidRequest { .. } => {
                StoryboardError::analysis(message)
            }
            GenAiError::Image { .. } => StoryboardError::image_generation(message),
            GenAiError::Credential { .. } | GenAiError::MissingCredential { .. } => {
                StoryboardError::credential(message)
            }
            GenAiError::Client(e) => StoryboardError::Other(anyhow::Error::new(e)),
        }
    }
}
