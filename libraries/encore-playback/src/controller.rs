//! Playback controller - status reconciliation and transport
//!
//! Owns the queue, the engine instance and every subscription made on it.
//! The engine reports changes asynchronously; the owner feeds them back in
//! through [`PlaybackController::handle_event`] on the same task that makes
//! transport calls, so no state here is ever touched concurrently.
//!
//! Status mapping:
//! - active item changed -> `Loading` (readiness observer moves to the new item)
//! - readiness `Unknown` -> `None`, `ReadyToPlay` -> `Playing`/`ReadyToPlay`
//!   depending on the engine rate, `Failed` -> `Failed` (sticky for the item)
//! - rate changed -> `Playing` when > 0, `Paused` otherwise
//! - engine without a current item -> `None`, progress tick cancelled

use crate::{
    config::{validate_rate, validate_rates, PlayerConfig, DEFAULT_RATE},
    engine::{
        AudioSession, ControlEvent, EngineEvent, EngineEventSender, EngineFactory, EngineSignal,
        EventSink, MediaEngine, NoopAudioSession, SeekCompletion, SeekId, Subscription,
    },
    error::{PlaybackError, Result},
    events::{
        ArtworkFetch, CoverImageReply, CoverImageRequest, NowPlayingInfo, PlayerEvent,
        PlayerSnapshot,
    },
    queue::TrackQueue,
    remote::RemoteCommandSet,
    types::{CoverImage, ItemReadiness, PlaybackStatus, RemoteCommandMode, Track, TrackInfo},
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Subscriptions held on the engine for its whole lifetime
#[derive(Debug, Clone, Copy)]
struct EngineSubscriptions {
    active_item: Subscription,
    rate: Subscription,
}

/// The single readiness observer, always on the current item
#[derive(Debug, Clone, Copy)]
struct ReadinessObserver {
    subscription: Subscription,
    item: usize,
}

/// Latest outstanding seek and what to do when it lands
#[derive(Debug, Clone, Copy)]
struct PendingSeek {
    id: SeekId,
    resume: bool,
    restore: PlaybackStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipDirection {
    Forward,
    Backward,
}

/// Central playback control
///
/// Single owner, no interior mutability. Every call may queue
/// [`PlayerEvent`]s; drain them with [`PlaybackController::drain_events`].
pub struct PlaybackController {
    // Configuration (live)
    config: PlayerConfig,
    rate: f32,

    // Collaborators
    factory: Box<dyn EngineFactory>,
    session: Box<dyn AudioSession>,
    sink: Arc<dyn EventSink>,

    // Engine and queue
    engine: Option<Box<dyn MediaEngine>>,
    queue: TrackQueue,
    generation: u64,

    // Reconciled state
    status: PlaybackStatus,
    current_index: Option<usize>,
    failed_item: Option<usize>,

    // Subscriptions and in-flight requests
    subscriptions: Option<EngineSubscriptions>,
    readiness: Option<ReadinessObserver>,
    next_subscription_id: u64,
    next_seek_id: u64,
    pending_seek: Option<PendingSeek>,

    ticking: bool,
    session_active: bool,

    pending_events: Vec<PlayerEvent>,
}

impl PlaybackController {
    /// Create a controller with no queue
    ///
    /// Queues the initial remote command table and skip interval so the
    /// remote surface can be configured before the first setup.
    pub fn new(
        config: PlayerConfig,
        factory: impl EngineFactory + 'static,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let rate = if validate_rate(config.initial_rate).is_ok() {
            config.initial_rate
        } else {
            warn!(
                "Invalid initial rate {}, using {}",
                config.initial_rate, DEFAULT_RATE
            );
            DEFAULT_RATE
        };

        let mut controller = Self {
            rate,
            factory: Box::new(factory),
            session: Box::new(NoopAudioSession),
            sink,
            engine: None,
            queue: TrackQueue::new(),
            generation: 0,
            status: PlaybackStatus::None,
            current_index: None,
            failed_item: None,
            subscriptions: None,
            readiness: None,
            next_subscription_id: 0,
            next_seek_id: 0,
            pending_seek: None,
            ticking: false,
            session_active: false,
            pending_events: Vec::new(),
            config,
        };

        controller.emit(PlayerEvent::RemoteCommandsChanged(RemoteCommandSet::for_mode(
            controller.config.command_mode,
        )));
        controller.emit(PlayerEvent::SkipIntervalChanged {
            interval: controller.config.skip_interval,
        });
        controller
    }

    /// Use a platform audio session (activated on first play)
    pub fn with_audio_session(mut self, session: impl AudioSession + 'static) -> Self {
        self.session = Box::new(session);
        self
    }

    // ===== Setup & Teardown =====

    /// Replace the queue and start a fresh engine
    ///
    /// `start_from` is clamped into the built queue. With no playable items
    /// the status stays `Loading` and no engine is created.
    pub fn setup(&mut self, items: &[TrackInfo], start_from: i64, play_after_setup: bool) {
        self.teardown();
        self.set_status(PlaybackStatus::Loading);

        if items.is_empty() {
            debug!("Setup called with an empty item list");
            return;
        }

        self.generation += 1;
        let (queue, skipped) = TrackQueue::build(items);
        if !skipped.is_empty() {
            warn!("{} of {} queue items skipped", skipped.len(), items.len());
        }
        self.queue = queue;

        let Some(start) = self.queue.clamp_index(start_from) else {
            warn!("No playable items in queue");
            return;
        };

        let active_item = self.allocate_subscription();
        let rate = self.allocate_subscription();

        let mut engine = self.factory.create();
        engine.load_queue(self.queue.tracks(), start);
        engine.subscribe(
            EngineSignal::ActiveItemChanged,
            EngineEventSender::new(active_item, EngineSignal::ActiveItemChanged, self.sink.clone()),
        );
        engine.subscribe(
            EngineSignal::RateChanged,
            EngineEventSender::new(rate, EngineSignal::RateChanged, self.sink.clone()),
        );
        self.engine = Some(engine);
        self.subscriptions = Some(EngineSubscriptions { active_item, rate });

        info!(
            "Queue ready: {} tracks, starting at {} (generation {})",
            self.queue.len(),
            start,
            self.generation
        );

        self.request_artwork();

        if play_after_setup {
            if let Err(e) = self.play() {
                debug!("Play after setup skipped: {}", e);
            }
        }
    }

    /// Tear everything down and report `None`
    ///
    /// Safe to call repeatedly.
    pub fn clean(&mut self) {
        self.teardown();
        self.set_status(PlaybackStatus::None);
    }

    fn teardown(&mut self) {
        self.pending_seek = None;
        self.stop_tick();

        let subscriptions = self.subscriptions.take();
        let readiness = self.readiness.take();

        if let Some(mut engine) = self.engine.take() {
            engine.pause();
            if let Some(subscriptions) = subscriptions {
                engine.unsubscribe(subscriptions.active_item);
                engine.unsubscribe(subscriptions.rate);
            }
            if let Some(observer) = readiness {
                engine.unsubscribe(observer.subscription);
            }
            engine.clear();
            debug!("Engine released");
        }

        self.queue.clear();
        self.current_index = None;
        self.failed_item = None;
    }

    fn request_artwork(&mut self) {
        let fetches: Vec<ArtworkFetch> = self
            .queue
            .tracks()
            .iter()
            .filter(|track| track.artwork().is_none())
            .filter_map(|track| {
                track.artwork_locator().map(|locator| ArtworkFetch {
                    index: track.index(),
                    locator: locator.clone(),
                    reply: CoverImageReply::new(self.generation, track.index(), self.sink.clone()),
                })
            })
            .collect();

        for fetch in fetches {
            self.emit(PlayerEvent::ArtworkFetchRequested(fetch));
        }
    }

    // ===== Event Reconciliation =====

    /// Apply one event delivered from the engine or a background worker
    pub fn handle_event(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::Engine(event) => self.handle_engine_event(event),
            ControlEvent::CoverImage {
                generation,
                index,
                image,
            } => self.apply_cover_image(generation, index, image),
        }
    }

    fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::ActiveItemChanged { subscription, item } => {
                if self.subscriptions.map(|s| s.active_item) == Some(subscription) {
                    self.reconcile_active_item(item);
                } else {
                    debug!("Dropping item change from stale subscription {}", subscription.id());
                }
            }
            EngineEvent::RateChanged { subscription, rate } => {
                if self.subscriptions.map(|s| s.rate) == Some(subscription) {
                    self.reconcile_rate(rate);
                } else {
                    debug!("Dropping rate change from stale subscription {}", subscription.id());
                }
            }
            EngineEvent::ReadinessChanged {
                subscription,
                item,
                readiness,
            } => {
                if self.readiness.map(|o| o.subscription) == Some(subscription) {
                    self.reconcile_readiness(item, readiness);
                } else {
                    debug!("Dropping readiness of item {} from stale observer", item);
                }
            }
            EngineEvent::SeekCompleted { seek, finished } => self.finish_seek(seek, finished),
        }
    }

    fn reconcile_active_item(&mut self, reported: Option<usize>) {
        let Some(index) = self.live_item() else {
            self.force_none();
            return;
        };

        if reported != Some(index) {
            debug!(
                "Engine reported item {:?}, current item is {}",
                reported, index
            );
        }

        self.set_status(PlaybackStatus::Loading);
        self.observe_readiness(index);
        self.current_index = Some(index);
        self.failed_item = None;
        self.update_now_playing(None);
        self.emit(PlayerEvent::ActiveTrackChanged { index });
        self.update_progress();
    }

    fn reconcile_readiness(&mut self, item: usize, readiness: ItemReadiness) {
        let Some(current) = self.live_item() else {
            self.force_none();
            return;
        };

        if item != current {
            debug!("Readiness for item {} while {} is current", item, current);
            return;
        }

        match readiness {
            ItemReadiness::Unknown => self.set_status(PlaybackStatus::None),
            ItemReadiness::ReadyToPlay => {
                let playing = self.engine.as_ref().is_some_and(|e| e.rate() > 0.0);
                self.set_status(if playing {
                    PlaybackStatus::Playing
                } else {
                    PlaybackStatus::ReadyToPlay
                });
            }
            ItemReadiness::Failed => {
                warn!("{}", PlaybackError::ItemFailed { index: item });
                self.failed_item = Some(item);
                self.set_status(PlaybackStatus::Failed);
            }
        }
    }

    fn reconcile_rate(&mut self, rate: f32) {
        if self.engine.is_none() {
            self.set_status(PlaybackStatus::None);
            return;
        }

        let Some(current) = self.live_item() else {
            self.force_none();
            return;
        };

        if self.failed_item == Some(current) {
            debug!("Rate {} ignored, item {} failed", rate, current);
            return;
        }

        self.set_status(if rate > 0.0 {
            PlaybackStatus::Playing
        } else {
            PlaybackStatus::Paused
        });
    }

    fn force_none(&mut self) {
        if let (Some(engine), Some(observer)) = (self.engine.as_mut(), self.readiness.take()) {
            engine.unsubscribe(observer.subscription);
        }
        self.current_index = None;
        self.set_status(PlaybackStatus::None);
        self.stop_tick();
    }

    /// Move the readiness observer to `index`
    ///
    /// Always re-attaches, even for the same item, so the engine re-delivers
    /// an already resolved readiness.
    fn observe_readiness(&mut self, index: usize) {
        let subscription = self.allocate_subscription();
        let sender = EngineEventSender::new(
            subscription,
            EngineSignal::Readiness { item: index },
            self.sink.clone(),
        );

        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        if let Some(previous) = self.readiness.take() {
            engine.unsubscribe(previous.subscription);
        }
        engine.subscribe(EngineSignal::Readiness { item: index }, sender);
        self.readiness = Some(ReadinessObserver {
            subscription,
            item: index,
        });
    }

    fn finish_seek(&mut self, seek: SeekId, finished: bool) {
        match self.pending_seek {
            Some(pending) if pending.id == seek => {
                self.pending_seek = None;
                if !finished {
                    debug!("Seek {} interrupted by the engine", seek.id());
                }

                if pending.resume {
                    if let Err(e) = self.play() {
                        debug!("Resume after seek skipped: {}", e);
                    }
                } else if self.status == PlaybackStatus::Loading
                    && self.live_item().is_some()
                    && self.engine.as_ref().is_some_and(|e| e.rate() <= 0.0)
                    && matches!(
                        pending.restore,
                        PlaybackStatus::Paused | PlaybackStatus::ReadyToPlay
                    )
                {
                    self.set_status(pending.restore);
                    self.update_progress();
                }
            }
            _ => debug!("Ignoring completion of superseded seek {}", seek.id()),
        }
    }

    fn apply_cover_image(&mut self, generation: u64, index: usize, image: Option<CoverImage>) {
        if generation != self.generation {
            debug!("Dropping cover image for replaced queue (generation {})", generation);
            return;
        }

        let Some(image) = image else {
            debug!("No cover image available for item {}", index);
            return;
        };

        if !self.queue.set_artwork(index, image.clone()) {
            return;
        }

        if self.live_item() == Some(index) {
            self.emit(PlayerEvent::NowPlayingArtwork { image });
        }
    }

    /// Periodic progress tick from the owner's timer
    pub fn on_progress_tick(&mut self) {
        if self.ticking {
            self.update_progress();
        }
    }

    // ===== Transport =====

    /// Toggle between playing and paused
    ///
    /// Returns the resulting status, or `None` when nothing is loaded.
    pub fn play_or_pause(&mut self) -> PlaybackStatus {
        if self.live_item().is_none() {
            return PlaybackStatus::None;
        }

        match self.status {
            PlaybackStatus::Loading | PlaybackStatus::None => PlaybackStatus::Loading,
            PlaybackStatus::Failed => PlaybackStatus::Failed,
            PlaybackStatus::ReadyToPlay | PlaybackStatus::Paused => match self.play() {
                Ok(()) => PlaybackStatus::Playing,
                Err(_) => PlaybackStatus::None,
            },
            PlaybackStatus::Playing => match self.pause() {
                Ok(()) => PlaybackStatus::Paused,
                Err(_) => PlaybackStatus::None,
            },
        }
    }

    /// Start playback at the configured rate and arm the progress tick
    pub fn play(&mut self) -> Result<()> {
        self.transport_item()?;

        if !self.session_active {
            match self.session.activate() {
                Ok(()) => {
                    self.session_active = true;
                    debug!("Audio session activated");
                }
                Err(e) => warn!("Audio session activation failed: {}", e),
            }
        }

        let rate = self.rate;
        if let Some(engine) = self.engine.as_mut() {
            engine.play(rate);
        }

        self.update_progress();
        self.update_now_playing(None);

        if !self.ticking {
            self.ticking = true;
            debug!("Progress tick started");
        }

        Ok(())
    }

    /// Pause playback and stop the progress tick
    ///
    /// A pending seek keeps its target but no longer resumes on completion.
    pub fn pause(&mut self) -> Result<()> {
        self.transport_item()?;

        if let Some(pending) = self.pending_seek.as_mut() {
            if pending.resume {
                debug!("Seek {} will not resume", pending.id.id());
                pending.resume = false;
            }
        }
        self.halt();
        Ok(())
    }

    fn halt(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.pause();
        }
        self.set_status(PlaybackStatus::Paused);
        self.stop_tick();
        self.update_progress();
    }

    /// Seek to a fraction (0.0 - 1.0) of the current item
    pub fn seek_to_percent(&mut self, fraction: f64) -> Result<()> {
        let Some(engine) = self.engine.as_ref() else {
            return Err(PlaybackError::Unavailable);
        };

        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let duration = engine.duration().unwrap_or_default();

        self.seek_to(duration.mul_f64(fraction))
    }

    /// Seek to an absolute position in the current item
    ///
    /// Playback pauses while seeking and resumes once the latest seek
    /// completes if it was playing when the seek chain started.
    pub fn seek_to(&mut self, position: Duration) -> Result<()> {
        self.transport_item()?;

        let was_playing = self.status == PlaybackStatus::Playing;
        let restore = if was_playing {
            PlaybackStatus::Paused
        } else {
            self.status
        };

        if was_playing {
            self.halt();
        }

        self.set_status(PlaybackStatus::Loading);
        self.start_seek(position, was_playing, restore);
        Ok(())
    }

    /// Issue a seek, replacing any outstanding one
    fn start_seek(&mut self, position: Duration, resume: bool, restore: PlaybackStatus) {
        let previous = self.pending_seek.take();
        let resume = resume || previous.is_some_and(|p| p.resume);
        let restore = previous.map_or(restore, |p| p.restore);

        self.next_seek_id += 1;
        let id = SeekId::new(self.next_seek_id);
        self.pending_seek = Some(PendingSeek {
            id,
            resume,
            restore,
        });

        if let Some(previous) = previous {
            debug!("Seek {} supersedes seek {}", id.id(), previous.id.id());
        }

        let completion = SeekCompletion::new(id, self.sink.clone());
        if let Some(engine) = self.engine.as_mut() {
            engine.seek(position, completion);
        }
    }

    /// Go to the next queue entry
    pub fn next(&mut self) -> Result<()> {
        if self.engine.is_none() {
            return Err(PlaybackError::Unavailable);
        }
        let index = self.live_item().ok_or(PlaybackError::Unavailable)?;

        if index + 1 >= self.queue.len() {
            return Err(PlaybackError::QueueBoundary);
        }
        self.go_to(index + 1)
    }

    /// Go to the previous queue entry
    pub fn previous(&mut self) -> Result<()> {
        if self.engine.is_none() {
            return Err(PlaybackError::Unavailable);
        }
        let index = self.live_item().ok_or(PlaybackError::Unavailable)?;

        if index == 0 {
            return Err(PlaybackError::QueueBoundary);
        }
        self.go_to(index - 1)
    }

    /// Jump to a queue entry by its build-time index
    ///
    /// The engine's live queue is rebuilt from `index` onwards; earlier
    /// entries stay addressable.
    pub fn go_to(&mut self, index: usize) -> Result<()> {
        if self.engine.is_none() {
            return Err(PlaybackError::Unavailable);
        }
        if !self.queue.contains_index(index) {
            return Err(PlaybackError::IndexOutOfBounds(index));
        }

        let was_playing = self.status == PlaybackStatus::Playing;
        if was_playing {
            self.halt();
        }

        self.pending_seek = None;
        if let Some(engine) = self.engine.as_mut() {
            engine.load_queue(self.queue.tracks(), index);
        }
        debug!("Live queue rebuilt from item {}", index);

        if was_playing {
            self.play()?;
        }
        Ok(())
    }

    /// Jump forward by the skip interval and play
    pub fn skip_forward(&mut self) -> Result<()> {
        self.skip(SkipDirection::Forward)
    }

    /// Jump backward by the skip interval and play
    pub fn skip_backward(&mut self) -> Result<()> {
        self.skip(SkipDirection::Backward)
    }

    fn skip(&mut self, direction: SkipDirection) -> Result<()> {
        self.transport_item()?;
        self.halt();

        let Some(engine) = self.engine.as_ref() else {
            return Err(PlaybackError::Unavailable);
        };
        let current = engine.current_time();
        let interval = self.config.skip_interval;

        let target = match direction {
            SkipDirection::Forward => {
                let target = current.saturating_add(interval);
                engine.duration().map_or(target, |duration| target.min(duration))
            }
            SkipDirection::Backward => current.saturating_sub(interval),
        };

        // Skips always resume, whatever the status was before
        self.start_seek(target, true, PlaybackStatus::Paused);
        Ok(())
    }

    /// Cycle to the next selectable rate
    ///
    /// A rate outside the list resets to 1.0 instead of advancing.
    pub fn change_to_next_rate(&mut self) -> f32 {
        let rates = &self.config.playback_rates;
        let next = match rates.iter().rposition(|r| rates_match(*r, self.rate)) {
            Some(position) => rates[(position + 1) % rates.len()],
            None => DEFAULT_RATE,
        };

        self.apply_rate(next);
        next
    }

    // ===== Live Configuration =====

    /// Set the rate used for playback
    pub fn set_rate(&mut self, rate: f32) -> Result<()> {
        validate_rate(rate)?;
        self.apply_rate(rate);
        Ok(())
    }

    fn apply_rate(&mut self, rate: f32) {
        self.rate = rate;
        if self.status == PlaybackStatus::Playing {
            if let Some(engine) = self.engine.as_mut() {
                engine.set_rate(rate);
            }
        }
        debug!("Playback rate set to {}", rate);
    }

    /// Replace the selectable rates
    pub fn set_playback_rates(&mut self, rates: Vec<f32>) -> Result<()> {
        validate_rates(&rates)?;
        self.config.playback_rates = rates;
        Ok(())
    }

    /// Change the skip interval; the remote surface is told as well
    pub fn set_skip_interval(&mut self, interval: Duration) -> Result<()> {
        if interval.is_zero() {
            return Err(PlaybackError::InvalidConfig(
                "skip interval must be greater than zero".to_string(),
            ));
        }
        self.config.skip_interval = interval;
        self.emit(PlayerEvent::SkipIntervalChanged { interval });
        Ok(())
    }

    /// Change the progress tick period (applied by the owner's timer)
    pub fn set_progress_interval(&mut self, interval: Duration) -> Result<()> {
        if interval.is_zero() {
            return Err(PlaybackError::InvalidConfig(
                "progress interval must be greater than zero".to_string(),
            ));
        }
        self.config.progress_interval = interval;
        Ok(())
    }

    /// Switch which remote affordance pair is enabled
    pub fn set_command_mode(&mut self, mode: RemoteCommandMode) {
        self.config.command_mode = mode;
        self.emit(PlayerEvent::RemoteCommandsChanged(RemoteCommandSet::for_mode(mode)));
    }

    /// Re-publish now-playing metadata (e.g. when the app is backgrounded)
    pub fn refresh_now_playing(&mut self) {
        self.update_now_playing(None);
    }

    /// Re-send everything a newly attached remote surface needs
    pub fn refresh_remote_surface(&mut self) {
        self.emit(PlayerEvent::RemoteCommandsChanged(RemoteCommandSet::for_mode(
            self.config.command_mode,
        )));
        self.emit(PlayerEvent::SkipIntervalChanged {
            interval: self.config.skip_interval,
        });
        self.update_now_playing(None);
    }

    // ===== State Queries =====

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    /// Queue index of the active item
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_index.and_then(|index| self.queue.get(index))
    }

    pub fn queue(&self) -> &TrackQueue {
        &self.queue
    }

    /// Setup counter; bumps on every non-empty setup
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn playback_rates(&self) -> &[f32] {
        &self.config.playback_rates
    }

    pub fn skip_interval(&self) -> Duration {
        self.config.skip_interval
    }

    pub fn progress_interval(&self) -> Duration {
        self.config.progress_interval
    }

    pub fn command_mode(&self) -> RemoteCommandMode {
        self.config.command_mode
    }

    /// Whether the owner should be delivering progress ticks
    pub fn is_progress_ticking(&self) -> bool {
        self.ticking
    }

    pub fn has_engine(&self) -> bool {
        self.engine.is_some()
    }

    pub fn current_time(&self) -> Duration {
        self.engine
            .as_ref()
            .map(|e| e.current_time())
            .unwrap_or_default()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.engine.as_ref().and_then(|e| e.duration())
    }

    /// Position as a fraction of the duration
    pub fn progress(&self) -> Option<f64> {
        let duration = self.duration().filter(|d| !d.is_zero())?;
        Some((self.current_time().as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0))
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            status: self.status,
            current_index: self.current_index,
            track_id: self.current_track().map(|track| track.id().clone()),
            queue_len: self.queue.len(),
            rate: self.rate,
            position: self.current_time(),
            progress: self.progress(),
            ticking: self.ticking,
        }
    }

    // ===== Events =====

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internal =====

    pub(crate) fn update_now_playing(&mut self, elapsed: Option<Duration>) {
        let Some(engine) = self.engine.as_ref() else {
            return;
        };
        let Some(duration) = engine.duration().filter(|d| !d.is_zero()) else {
            return;
        };
        let Some(track) = self.live_item().and_then(|index| self.queue.get(index)) else {
            return;
        };

        let info = NowPlayingInfo {
            index: track.index(),
            track_id: track.id().clone(),
            title: track.title().to_string(),
            album_title: track.album_title().to_string(),
            elapsed: elapsed.unwrap_or_else(|| engine.current_time()),
            duration,
            rate: engine.rate(),
        };
        let artwork = track.artwork().cloned();

        let index = info.index;
        let track_id = info.track_id.clone();
        self.emit(PlayerEvent::NowPlayingUpdated(info));

        match artwork {
            Some(image) => self.emit(PlayerEvent::NowPlayingArtwork { image }),
            None => {
                let reply = CoverImageReply::new(self.generation, index, self.sink.clone());
                self.emit(PlayerEvent::CoverImageRequested(CoverImageRequest::new(
                    index, track_id, reply,
                )));
            }
        }
    }

    fn update_progress(&mut self) {
        let Some(engine) = self.engine.as_ref() else {
            return;
        };
        let Some(duration) = engine.duration().filter(|d| !d.is_zero()) else {
            return;
        };

        let promote = self.status != PlaybackStatus::Playing
            && engine.readiness() == ItemReadiness::ReadyToPlay
            && engine.rate() > 0.0;
        let fraction =
            (engine.current_time().as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0);

        if promote && !self.current_item_failed() {
            self.set_status(PlaybackStatus::Playing);
        }
        self.emit(PlayerEvent::ProgressUpdated { fraction });
    }

    fn set_status(&mut self, status: PlaybackStatus) {
        if self.status != status {
            debug!("Status {:?} -> {:?}", self.status, status);
        }
        self.status = status;
        self.emit(PlayerEvent::StatusChanged { status });
    }

    fn stop_tick(&mut self) {
        if self.ticking {
            self.ticking = false;
            debug!("Progress tick stopped");
        }
    }

    /// Current engine item, validated against the queue
    fn live_item(&self) -> Option<usize> {
        self.engine
            .as_ref()
            .and_then(|e| e.current_item())
            .filter(|index| self.queue.contains_index(*index))
    }

    /// Current item if transport may act on it
    ///
    /// A failed item stays failed until the active item changes.
    fn transport_item(&self) -> Result<usize> {
        let index = self.live_item().ok_or(PlaybackError::Unavailable)?;
        if self.failed_item == Some(index) {
            return Err(PlaybackError::ItemFailed { index });
        }
        Ok(index)
    }

    fn current_item_failed(&self) -> bool {
        self.failed_item.is_some() && self.failed_item == self.live_item()
    }

    fn allocate_subscription(&mut self) -> Subscription {
        self.next_subscription_id += 1;
        Subscription::new(self.next_subscription_id)
    }

    fn emit(&mut self, event: PlayerEvent) {
        self.pending_events.push(event);
    }
}

/// Rates come from config files; compare with a tolerance
fn rates_match(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}
