//! Error types shared across ClearCast crates.

use std::path::PathBuf;

/// Top-level error type for ClearCast operations.
#[derive(Debug, thiserror::Error)]
pub enum ClearcastError {
    #[error("Input too large: {size_bytes} bytes exceeds the {limit_bytes} byte limit")]
    InputTooLarge { size_bytes: u64, limit_bytes: u64 },

    #[error("No audio track found in video")]
    NoAudioTrack,

    #[error("Model initialization failed: {message}")]
    ModelInit { message: String },

    #[error("Processing timeout during {stage}")]
    ProcessingTimeout { stage: String },

    #[error("Download error: {message}")]
    Download { message: String },

    #[error("Media error: {message}")]
    Media { message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

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

/// Result type alias using ClearcastError.
pub type ClearcastResult<T> = Result<T, ClearcastError>;

impl ClearcastError {
    pub fn model_init(msg: impl Into<String>) -> Self {
        Self::ModelInit {
            message: msg.into(),
        }
    }

    pub fn timeout(stage: impl Into<String>) -> Self {
        Self::ProcessingTimeout {
            stage: stage.into(),
        }
    }

    pub fn download(msg: impl Into<String>) -> Self {
        Self::Download {
            message: msg.into(),
        }
    }

    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media {
            message: msg.into(),
        }
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// User-facing message for the chat front end.
    ///
    /// Every internal error maps to something the submitter can act on;
    /// unclassified failures get a generic retry prompt.
    pub fn user_message(&self) -> String {
        match self {
            Self::InputTooLarge {
                size_bytes,
                limit_bytes,
            } => format!(
                "File too large: maximum {:.0}MB allowed (file is {:.2}MB)",
                *limit_bytes as f64 / (1024.0 * 1024.0),
                *size_bytes as f64 / (1024.0 * 1024.0),
            ),
            Self::NoAudioTrack => "No audio track found in the video.".to_string(),
            Self::ModelInit { .. } => {
                "The enhancement model is unavailable right now. Please try again later."
                    .to_string()
            }
            Self::ProcessingTimeout { .. } => {
                "Processing timed out: the video may be too long or the system overloaded."
                    .to_string()
            }
            Self::Download { .. } => {
                "Failed to download the video. Please try sending it again.".to_string()
            }
            _ => "An error occurred while processing your video. Please try again or send a \
                  different video."
                .to_string(),
        }
    }
}
