//! Error types shared across Storyboard crates.

use std::path::PathBuf;

/// Top-level error type for Storyboard operations.
#[derive(Debug, thiserror::Error)]
pub enum StoryboardError {
    #[error("Analysis error: {message}")]
    Analysis { message: String },

    #[error("Image generation error: {message}")]
    ImageGeneration { message: String },

    #[error("Credential error: {message}")]
    Credential { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Export error: {message}")]
    Export { message: String },

    #[error("Project error: {message}")]
    Project { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using StoryboardError.
pub type StoryboardResult<T> = Result<T, StoryboardError>;

impl StoryboardError {
    pub fn analysis(msg: impl Into<String>) -> Self {
        Self::Analysis {
            message: msg.into(),
        }
    }

    pub fn image_generation(msg: impl Into<String>) -> Self {
        Self::ImageGeneration {
            message: msg.into(),
        }
    }

    pub fn credential(msg: impl Into<String>) -> Self {
        Self::Credential {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export {
            message: msg.into(),
        }
    }

    pub fn project(msg: impl Into<String>) -> Self {
        Self::Project {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this error means the credential itself is unusable.
    pub fn is_credential(&self) -> bool {
        matches!(self, Self::Credential { .. })
    }
}
