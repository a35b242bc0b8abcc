//! Playback events
//!
//! The controller never calls listeners directly. It queues [`PlayerEvent`]s
//! which the owner drains after every call and fans out:
//! - Listener notifications (status, active track, progress, cover requests)
//! - Remote surface updates (now playing, artwork, command table, skip interval)
//! - Background work requests (artwork fetches)

use crate::engine::{ControlEvent, EventSink};
use crate::remote::RemoteCommandSet;
use crate::types::{CoverImage, PlaybackStatus, TrackId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Events emitted by the playback controller
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    /// Status reconciled; fired even when the status did not change
    StatusChanged { status: PlaybackStatus },

    /// Engine moved to another queue entry
    ActiveTrackChanged { index: usize },

    /// Position as a fraction of the item duration (0.0 - 1.0)
    ProgressUpdated { fraction: f64 },

    /// Current track has no artwork; any listener may answer
    CoverImageRequested(CoverImageRequest),

    /// Lock-screen metadata for the current item
    NowPlayingUpdated(NowPlayingInfo),

    /// Lock-screen artwork for the current item
    NowPlayingArtwork { image: CoverImage },

    /// Remote command enablement changed
    RemoteCommandsChanged(RemoteCommandSet),

    /// Preferred skip interval for the remote surface
    SkipIntervalChanged { interval: Duration },

    /// Artwork to be fetched off the control task
    ArtworkFetchRequested(ArtworkFetch),
}

/// Now-playing metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NowPlayingInfo {
    pub index: usize,
    pub track_id: TrackId,
    pub title: String,
    pub album_title: String,

    #[serde(with = "crate::config::secs")]
    pub elapsed: Duration,

    #[serde(with = "crate::config::secs")]
    pub duration: Duration,

    pub rate: f32,
}

/// Point-in-time view of the controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub status: PlaybackStatus,
    pub current_index: Option<usize>,
    pub track_id: Option<TrackId>,
    pub queue_len: usize,
    pub rate: f32,

    #[serde(with = "crate::config::secs")]
    pub position: Duration,

    pub progress: Option<f64>,
    pub ticking: bool,
}

/// Routes a cover image answer back to the control task
///
/// Tagged with the queue generation so answers for a replaced queue are
/// discarded.
#[derive(Clone)]
pub struct CoverImageReply {
    generation: u64,
    index: usize,
    sink: Arc<dyn EventSink>,
}

impl CoverImageReply {
    pub fn new(generation: u64, index: usize, sink: Arc<dyn EventSink>) -> Self {
        Self {
            generation,
            index,
            sink,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn send(&self, image: Option<CoverImage>) {
        self.sink.post(ControlEvent::CoverImage {
            generation: self.generation,
            index: self.index,
            image,
        });
    }
}

impl fmt::Debug for CoverImageReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoverImageReply")
            .field("generation", &self.generation)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

/// Pull-style request for a cover image
#[derive(Debug, Clone)]
pub struct CoverImageRequest {
    pub index: usize,
    pub track_id: TrackId,
    reply: CoverImageReply,
}

impl CoverImageRequest {
    pub(crate) fn new(index: usize, track_id: TrackId, reply: CoverImageReply) -> Self {
        Self {
            index,
            track_id,
            reply,
        }
    }

    /// Answer the request; may be called from any thread
    pub fn respond(&self, image: Option<CoverImage>) {
        self.reply.send(image);
    }
}

/// Background artwork fetch for one track
#[derive(Debug, Clone)]
pub struct ArtworkFetch {
    pub index: usize,
    pub locator: Url,
    pub reply: CoverImageReply,
}
