//! Notification consumers and event fan-out
//!
//! Listeners and the remote surface only ever see events after the controller
//! call that produced them has returned. Delivery is push, at most once, with
//! no replay for late subscribers.

use crate::events::{ArtworkFetch, CoverImageRequest, NowPlayingInfo, PlayerEvent};
use crate::remote::RemoteCommandKind;
use crate::types::{CoverImage, PlaybackStatus};
use std::time::Duration;

/// Consumer of controller notifications
///
/// Every method has an empty default so listeners only implement what they use.
pub trait PlaybackListener: Send {
    fn on_status_changed(&mut self, _status: PlaybackStatus) {}

    fn on_active_track_changed(&mut self, _index: usize) {}

    fn on_progress_updated(&mut self, _fraction: f64) {}

    /// The current track has no artwork; answer through the request if possible
    fn on_cover_image_requested(&mut self, _request: &CoverImageRequest) {}
}

/// Lock-screen / hardware-control surface
pub trait RemoteSurface: Send {
    fn update_now_playing(&mut self, info: &NowPlayingInfo);

    fn update_artwork(&mut self, image: &CoverImage);

    fn set_command_enabled(&mut self, kind: RemoteCommandKind, enabled: bool);

    fn set_skip_interval(&mut self, interval: Duration);

    fn status_changed(&mut self, _status: PlaybackStatus) {}
}

/// Registered listeners plus the optional remote surface
#[derive(Default)]
pub struct EventFanout {
    listeners: Vec<Box<dyn PlaybackListener>>,
    surface: Option<Box<dyn RemoteSurface>>,
}

impl EventFanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: Box<dyn PlaybackListener>) {
        self.listeners.push(listener);
    }

    /// Install the remote surface, replacing any previous one
    pub fn set_surface(&mut self, surface: Box<dyn RemoteSurface>) {
        self.surface = Some(surface);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    /// Deliver one event
    ///
    /// Artwork fetches are not a notification; they are handed back so the
    /// owner can run them off the control task.
    pub fn dispatch(&mut self, event: PlayerEvent) -> Option<ArtworkFetch> {
        match event {
            PlayerEvent::StatusChanged { status } => {
                for listener in &mut self.listeners {
                    listener.on_status_changed(status);
                }
                if let Some(surface) = self.surface.as_mut() {
                    surface.status_changed(status);
                }
            }
            PlayerEvent::ActiveTrackChanged { index } => {
                for listener in &mut self.listeners {
                    listener.on_active_track_changed(index);
                }
            }
            PlayerEvent::ProgressUpdated { fraction } => {
                for listener in &mut self.listeners {
                    listener.on_progress_updated(fraction);
                }
            }
            PlayerEvent::CoverImageRequested(request) => {
                for listener in &mut self.listeners {
                    listener.on_cover_image_requested(&request);
                }
            }
            PlayerEvent::NowPlayingUpdated(info) => {
                if let Some(surface) = self.surface.as_mut() {
                    surface.update_now_playing(&info);
                }
            }
            PlayerEvent::NowPlayingArtwork { image } => {
                if let Some(surface) = self.surface.as_mut() {
                    surface.update_artwork(&image);
                }
            }
            PlayerEvent::RemoteCommandsChanged(commands) => {
                if let Some(surface) = self.surface.as_mut() {
                    for (kind, enabled) in commands.iter() {
                        surface.set_command_enabled(kind, enabled);
                    }
                }
            }
            PlayerEvent::SkipIntervalChanged { interval } => {
                if let Some(surface) = self.surface.as_mut() {
                    surface.set_skip_interval(interval);
                }
            }
            PlayerEvent::ArtworkFetchRequested(fetch) => return Some(fetch),
        }
        None
    }
}
