/// Demo error types
use encore_control::{ArtworkError, ControlError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DemoError>;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Playlist error: {0}")]
    Playlist(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid argument for {command}: {reason}")]
    InvalidArgument { command: String, reason: String },

    #[error(transparent)]
    Control(#[from] ControlError),

    #[error("Artwork loader error: {0}")]
    Artwork(#[from] ArtworkError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<config::ConfigError> for DemoError {
    fn from(err: config::ConfigError) -> Self {
        DemoError::Config(err.to_string())
    }
}
