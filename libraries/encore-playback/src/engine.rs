//! Media engine contract
//!
//! The engine is the platform's queued-playback primitive (AVQueuePlayer,
//! ExoPlayer, a GStreamer pipeline...). The controller drives it through
//! [`MediaEngine`] and receives its asynchronous events as typed
//! [`EngineEvent`]s posted to an [`EventSink`]. The sink is expected to hand
//! them to the single task that owns the controller.

use crate::error::Result;
use crate::types::{CoverImage, ItemReadiness, Track};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Handle identifying one engine subscription
///
/// Allocated by the controller and echoed back in every event, so events from
/// detached observers can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

impl Subscription {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// Identifier of one seek request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeekId(u64);

impl SeekId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// Engine signals a controller can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineSignal {
    /// The engine's current item changed (or was removed)
    ActiveItemChanged,

    /// The engine's playback rate changed
    RateChanged,

    /// Readiness of one queue item (by queue index)
    Readiness { item: usize },
}

/// Asynchronous engine events
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    ActiveItemChanged {
        subscription: Subscription,
        /// Queue index of the new current item
        item: Option<usize>,
    },

    RateChanged {
        subscription: Subscription,
        rate: f32,
    },

    ReadinessChanged {
        subscription: Subscription,
        item: usize,
        readiness: ItemReadiness,
    },

    SeekCompleted {
        seek: SeekId,
        /// False when the engine interrupted the seek
        finished: bool,
    },
}

/// Everything that may be delivered to the controller's owning task
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    Engine(EngineEvent),

    /// Cover image answer (background fetch or listener reply)
    CoverImage {
        generation: u64,
        index: usize,
        image: Option<CoverImage>,
    },
}

/// Destination for events produced off the control task
pub trait EventSink: Send + Sync {
    fn post(&self, event: ControlEvent);
}

/// Synchronous embeddings can drain a crossbeam channel on their control thread
impl EventSink for crossbeam_channel::Sender<ControlEvent> {
    fn post(&self, event: ControlEvent) {
        if self.send(event).is_err() {
            debug!("Control channel closed, dropping event");
        }
    }
}

/// Typed sender handed to the engine for one subscription
#[derive(Clone)]
pub struct EngineEventSender {
    subscription: Subscription,
    signal: EngineSignal,
    sink: Arc<dyn EventSink>,
}

impl EngineEventSender {
    pub fn new(subscription: Subscription, signal: EngineSignal, sink: Arc<dyn EventSink>) -> Self {
        Self {
            subscription,
            signal,
            sink,
        }
    }

    pub fn subscription(&self) -> Subscription {
        self.subscription
    }

    pub fn signal(&self) -> EngineSignal {
        self.signal
    }

    pub fn active_item_changed(&self, item: Option<usize>) {
        self.sink.post(ControlEvent::Engine(EngineEvent::ActiveItemChanged {
            subscription: self.subscription,
            item,
        }));
    }

    pub fn rate_changed(&self, rate: f32) {
        self.sink.post(ControlEvent::Engine(EngineEvent::RateChanged {
            subscription: self.subscription,
            rate,
        }));
    }

    pub fn readiness_changed(&self, item: usize, readiness: ItemReadiness) {
        self.sink
            .post(ControlEvent::Engine(EngineEvent::ReadinessChanged {
                subscription: self.subscription,
                item,
                readiness,
            }));
    }
}

impl fmt::Debug for EngineEventSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineEventSender")
            .field("subscription", &self.subscription)
            .field("signal", &self.signal)
            .finish_non_exhaustive()
    }
}

/// One-shot completion callback for a seek
pub struct SeekCompletion {
    seek: SeekId,
    sink: Arc<dyn EventSink>,
}

impl SeekCompletion {
    pub fn new(seek: SeekId, sink: Arc<dyn EventSink>) -> Self {
        Self { seek, sink }
    }

    pub fn seek(&self) -> SeekId {
        self.seek
    }

    /// Report the seek as done; consumes the completion
    pub fn complete(self, finished: bool) {
        self.sink.post(ControlEvent::Engine(EngineEvent::SeekCompleted {
            seek: self.seek,
            finished,
        }));
    }
}

impl fmt::Debug for SeekCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeekCompletion")
            .field("seek", &self.seek)
            .finish_non_exhaustive()
    }
}

/// Queued media playback primitive
///
/// Implementations must never call back into the controller directly; all
/// notifications go through the senders handed to [`MediaEngine::subscribe`]
/// and [`MediaEngine::seek`].
///
/// Subscription contract:
/// - `ActiveItemChanged` and `RateChanged` deliver the current value right
///   away, then every change.
/// - `Readiness { item }` delivers the current readiness right away only when
///   it is already resolved (not `Unknown`), then every change.
pub trait MediaEngine: Send {
    /// Replace the live queue with `tracks[start..]` and make `tracks[start]`
    /// current. Items begin at their `start_offset` when present.
    fn load_queue(&mut self, tracks: &[Track], start: usize);

    /// Remove every item from the live queue
    fn clear(&mut self);

    /// Start playback immediately at `rate`
    fn play(&mut self, rate: f32);

    fn pause(&mut self);

    /// Seek the current item; `completion` must be completed exactly once
    fn seek(&mut self, position: Duration, completion: SeekCompletion);

    /// Queue index of the current item
    fn current_item(&self) -> Option<usize>;

    /// Position in the current item
    fn current_time(&self) -> Duration;

    /// Duration of the current item, `None` while unknown
    fn duration(&self) -> Option<Duration>;

    /// Reported playback rate (0.0 while paused)
    fn rate(&self) -> f32;

    /// Change the speed of an item that is already playing
    ///
    /// Must not start playback by itself.
    fn set_rate(&mut self, rate: f32);

    /// Readiness of the current item
    fn readiness(&self) -> ItemReadiness;

    fn subscribe(&mut self, signal: EngineSignal, sender: EngineEventSender);

    fn unsubscribe(&mut self, subscription: Subscription);
}

/// Creates a fresh engine for every setup
pub trait EngineFactory: Send {
    fn create(&mut self) -> Box<dyn MediaEngine>;
}

impl<F> EngineFactory for F
where
    F: FnMut() -> Box<dyn MediaEngine> + Send,
{
    fn create(&mut self) -> Box<dyn MediaEngine> {
        self()
    }
}

/// Platform audio output session (category, activation, remote-control events)
pub trait AudioSession: Send {
    fn activate(&mut self) -> Result<()>;
}

/// Session for platforms without an explicit activation step
#[derive(Debug, Default)]
pub struct NoopAudioSession;

impl AudioSession for NoopAudioSession {
    fn activate(&mut self) -> Result<()> {
        Ok(())
    }
}
