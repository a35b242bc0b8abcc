//! Error types for the control loop and artwork loading

use encore_playback::PlaybackError;
use thiserror::Error;

/// Errors returned through a [`crate::PlayerHandle`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControlError {
    /// The control loop has stopped
    #[error("Control loop is not running")]
    Closed,

    /// The controller rejected the operation
    #[error(transparent)]
    Playback(#[from] PlaybackError),
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;

/// Errors that can occur while loading artwork
#[derive(Error, Debug)]
pub enum ArtworkError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error reading a local file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Server answered with a non-success status
    #[error("Artwork request failed with status {0}")]
    Status(u16),

    /// Locator scheme the loader cannot fetch
    #[error("Unsupported artwork locator: {0}")]
    UnsupportedScheme(String),

    /// Source returned no bytes
    #[error("Artwork is empty")]
    Empty,
}
