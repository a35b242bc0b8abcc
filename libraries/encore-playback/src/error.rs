//! Error types for playback control

use crate::types::TrackId;
use thiserror::Error;

/// Playback errors
///
/// None of these are fatal. Transport operations hand them back as values so
/// callers can tell a no-op apart from an applied command.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    /// Track source locator could not be resolved (item is skipped)
    #[error("Track {id} has no resolvable source locator: {locator:?}")]
    UnresolvableSource {
        id: TrackId,
        locator: Option<String>,
    },

    /// Engine reported the queue item as unplayable
    #[error("Queue item {index} failed to load")]
    ItemFailed { index: usize },

    /// No engine or queue is active
    #[error("No active queue")]
    Unavailable,

    /// Index outside the current queue
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Already at the first or last queue entry
    #[error("No adjacent track at queue boundary")]
    QueueBoundary,

    /// Audio output session could not be activated
    #[error("Audio session error: {0}")]
    Session(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
