//! Error types shared across Paneview crates.

use std::path::PathBuf;

/// Top-level error type for Paneview operations.
#[derive(Debug, thiserror::Error)]
pub enum PaneviewError {
    #[error("Pattern error in '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("Export error: {message}")]
    Export { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using PaneviewError.
pub type PaneviewResult<T> = Result<T, PaneviewError>;

impl PaneviewError {
    pub fn pattern(pattern: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            message: msg.into(),
        }
    }

    pub fn decode(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Short message without the category prefix, for inline status labels
    /// and tile annotations where space is tight.
    pub fn short_message(&self) -> String {
        match self {
            Self::Pattern { message, .. }
            | Self::Decode { message, .. }
            | Self::Export { message }
            | Self::Config { message } => message.clone(),
            Self::Io(e) => e.to_string(),
            Self::Json(e) => e.to_string(),
            Self::Other(e) => e.to_string(),
        }
    }
}
