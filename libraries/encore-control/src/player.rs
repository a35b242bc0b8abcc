//! Control loop
//!
//! Owns the [`PlaybackController`] on a single tokio task. Handle calls,
//! engine events, seek completions and cover-image replies all arrive on one
//! channel; the progress tick is an interval owned by the loop and armed only
//! while the controller reports it active. After every message the queued
//! notifications are fanned out to listeners and the remote surface.

use crate::artwork::{spawn_fetch, ArtworkLoader};
use crate::error::Result;
use crate::handle::{ChannelSink, Message, PlayerHandle};
use encore_playback::{
    AudioSession, EngineFactory, EventFanout, PlaybackController, PlaybackListener, PlayerConfig,
    RemoteSurface,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Shortest progress tick period the loop will arm
pub const MIN_PROGRESS_INTERVAL: Duration = Duration::from_millis(50);

/// Progress timer and the period it was armed with
struct ProgressTick {
    period: Duration,
    interval: Interval,
}

/// What woke the loop
enum Wake {
    Message(Option<Message>),
    Tick,
}

/// Single-task owner of the playback controller
pub struct ControlLoop {
    controller: PlaybackController,
    fanout: EventFanout,
    loader: Option<Arc<dyn ArtworkLoader>>,
    rx: mpsc::UnboundedReceiver<Message>,
    tick: Option<ProgressTick>,
}

impl ControlLoop {
    /// Create the loop and the first handle to it
    ///
    /// Nothing runs until [`ControlLoop::spawn`] or [`ControlLoop::run`].
    pub fn new(
        config: PlayerConfig,
        factory: impl EngineFactory + 'static,
    ) -> Result<(Self, PlayerHandle)> {
        config.validate()?;

        let (tx, rx) = mpsc::unbounded_channel();
        let sink = Arc::new(ChannelSink::new(&tx));
        let controller = PlaybackController::new(config, factory, sink);

        let control = Self {
            controller,
            fanout: EventFanout::new(),
            loader: None,
            rx,
            tick: None,
        };
        Ok((control, PlayerHandle::new(tx)))
    }

    /// Fetch artwork locators in the background
    pub fn with_artwork_loader(mut self, loader: Arc<dyn ArtworkLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn with_audio_session(mut self, session: impl AudioSession + 'static) -> Self {
        self.controller = self.controller.with_audio_session(session);
        self
    }

    pub fn with_listener(mut self, listener: impl PlaybackListener + 'static) -> Self {
        self.fanout.add_listener(Box::new(listener));
        self
    }

    pub fn with_surface(mut self, surface: impl RemoteSurface + 'static) -> Self {
        self.fanout.set_surface(Box::new(surface));
        self
    }

    /// Run the loop on its own task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Run until shutdown or until every handle is dropped
    pub async fn run(mut self) {
        info!("Playback control loop started");
        self.flush();

        loop {
            self.sync_tick();

            let wake = tokio::select! {
                message = self.rx.recv() => Wake::Message(message),
                () = next_tick(&mut self.tick) => Wake::Tick,
            };

            let message = match wake {
                Wake::Tick => {
                    self.controller.on_progress_tick();
                    self.flush();
                    continue;
                }
                Wake::Message(message) => message,
            };

            match message {
                Some(Message::Event(event)) => self.controller.handle_event(event),
                Some(Message::Call(call)) => call(&mut self.controller),
                Some(Message::AddListener(listener)) => self.fanout.add_listener(listener),
                Some(Message::SetSurface(surface)) => {
                    self.fanout.set_surface(surface);
                    self.controller.refresh_remote_surface();
                }
                Some(Message::Shutdown) => {
                    debug!("Shutdown requested");
                    break;
                }
                None => {
                    debug!("All player handles dropped");
                    break;
                }
            }

            self.flush();
        }

        self.controller.clean();
        self.flush();
        info!("Playback control loop stopped");
    }

    /// Fan out queued notifications, starting any artwork fetches
    fn flush(&mut self) {
        for event in self.controller.drain_events() {
            let Some(fetch) = self.fanout.dispatch(event) else {
                continue;
            };

            match &self.loader {
                Some(loader) => spawn_fetch(loader.clone(), fetch),
                None => debug!(
                    index = fetch.index,
                    "No artwork loader configured, skipping {}", fetch.locator
                ),
            }
        }
    }

    /// Arm, re-arm or drop the progress timer to match the controller
    fn sync_tick(&mut self) {
        if !self.controller.is_progress_ticking() {
            if self.tick.take().is_some() {
                debug!("Progress tick stopped");
            }
            return;
        }

        let requested = self.controller.progress_interval();
        let period = requested.max(MIN_PROGRESS_INTERVAL);
        if self.tick.as_ref().is_some_and(|tick| tick.period == period) {
            return;
        }

        if requested < MIN_PROGRESS_INTERVAL {
            warn!(
                "Progress interval {:?} too short, using {:?}",
                requested, MIN_PROGRESS_INTERVAL
            );
        }

        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        debug!(?period, "Progress tick armed");
        self.tick = Some(ProgressTick { period, interval });
    }
}

/// Next progress tick, or never when the timer is not armed
async fn next_tick(tick: &mut Option<ProgressTick>) {
    match tick {
        Some(tick) => {
            tick.interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
