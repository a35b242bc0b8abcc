//! Encore - Queued Playback Control
//!
//! Platform-agnostic control layer for a queued audio player.
//!
//! This crate provides:
//! - Queue building from caller-supplied items (unresolvable items skipped)
//! - Status reconciliation from asynchronous engine events
//! - Transport: play/pause, seek, skip, next/previous, jump, rate cycling
//! - Remote (lock-screen / hardware) command bridging
//! - Now-playing metadata and cover art requests
//!
//! # Architecture
//!
//! `encore-playback` has no async runtime and no platform code:
//! - The media engine is a trait ([`MediaEngine`]) created per setup by an
//!   [`EngineFactory`]
//! - Engine events come back as [`ControlEvent`]s through an [`EventSink`]
//!   and are applied with [`PlaybackController::handle_event`]
//! - Notifications are queued as [`PlayerEvent`]s and fanned out by the owner
//!   (see [`EventFanout`])
//!
//! `encore-control` wraps all of this in a tokio control loop.
//!
//! # Example: Synchronous Embedding
//!
//! ```rust
//! use encore_playback::{
//!     ControlEvent, EngineSignal, EngineEventSender, ItemReadiness, MediaEngine,
//!     PlaybackController, PlayerConfig, SeekCompletion, Subscription, Track, TrackInfo,
//! };
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! // A platform engine (AVQueuePlayer, ExoPlayer, GStreamer...)
//! struct SilentEngine;
//!
//! impl MediaEngine for SilentEngine {
//!     fn load_queue(&mut self, _tracks: &[Track], _start: usize) {}
//!     fn clear(&mut self) {}
//!     fn play(&mut self, _rate: f32) {}
//!     fn pause(&mut self) {}
//!     fn seek(&mut self, _position: Duration, completion: SeekCompletion) {
//!         completion.complete(true);
//!     }
//!     fn current_item(&self) -> Option<usize> { None }
//!     fn current_time(&self) -> Duration { Duration::ZERO }
//!     fn duration(&self) -> Option<Duration> { None }
//!     fn rate(&self) -> f32 { 0.0 }
//!     fn set_rate(&mut self, _rate: f32) {}
//!     fn readiness(&self) -> ItemReadiness { ItemReadiness::Unknown }
//!     fn subscribe(&mut self, _signal: EngineSignal, _sender: EngineEventSender) {}
//!     fn unsubscribe(&mut self, _subscription: Subscription) {}
//! }
//!
//! let (tx, rx) = crossbeam_channel::unbounded::<ControlEvent>();
//! let factory = || Box::new(SilentEngine) as Box<dyn MediaEngine>;
//! let mut controller = PlaybackController::new(PlayerConfig::default(), factory, Arc::new(tx));
//!
//! controller.setup(
//!     &[TrackInfo::new("intro", "https://cdn.example.com/intro.mp3", "Intro", "Demo")],
//!     0,
//!     false,
//! );
//!
//! // On the control thread: apply engine events, then fan out notifications
//! while let Ok(event) = rx.try_recv() {
//!     controller.handle_event(event);
//! }
//! for event in controller.drain_events() {
//!     println!("{:?}", event);
//! }
//! ```

mod config;
mod controller;
mod engine;
mod error;
mod events;
mod listener;
mod queue;
mod remote;
pub mod types;

// Public exports
pub use config::{PlayerConfig, DEFAULT_RATE};
pub use controller::PlaybackController;
pub use engine::{
    AudioSession, ControlEvent, EngineEvent, EngineEventSender, EngineFactory, EngineSignal,
    EventSink, MediaEngine, NoopAudioSession, SeekCompletion, SeekId, Subscription,
};
pub use error::{PlaybackError, Result};
pub use events::{
    ArtworkFetch, CoverImageReply, CoverImageRequest, NowPlayingInfo, PlayerEvent, PlayerSnapshot,
};
pub use listener::{EventFanout, PlaybackListener, RemoteSurface};
pub use queue::TrackQueue;
pub use remote::{CommandStatus, RemoteCommand, RemoteCommandKind, RemoteCommandSet};
pub use types::{
    resolve_locator, CoverImage, ItemReadiness, PlaybackStatus, RemoteCommandMode, Track, TrackId,
    TrackInfo,
};
