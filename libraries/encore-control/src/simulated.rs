//! Simulated media engine
//!
//! Plays nothing, but behaves like a queued platform player on tokio time:
//! items become ready after a load delay, positions advance with the rate,
//! finished items advance the queue and seeks complete after a short delay.
//! Used by the demo application and by tests running on a paused clock.

use encore_playback::{
    EngineEventSender, EngineSignal, ItemReadiness, MediaEngine, SeekCompletion, Subscription,
    Track, TrackId,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Timing and failure behaviour of the simulated engine
#[derive(Debug, Clone)]
pub struct SimulatedOptions {
    /// Duration reported for every item
    pub track_duration: Duration,

    /// Time until an item becomes ready
    pub load_delay: Duration,

    /// Time until a seek completes
    pub seek_delay: Duration,

    /// Items that fail to load
    pub failing: HashSet<TrackId>,
}

impl Default for SimulatedOptions {
    fn default() -> Self {
        Self {
            track_duration: Duration::from_secs(180),
            load_delay: Duration::from_millis(300),
            seek_delay: Duration::from_millis(100),
            failing: HashSet::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    index: usize,
    id: TrackId,
    offset: Duration,
}

struct SimState {
    options: SimulatedOptions,
    live: Vec<Entry>,
    readiness: HashMap<usize, ItemReadiness>,
    position: Duration,
    clock_started: Option<Instant>,
    rate: f32,
    subscribers: Vec<EngineEventSender>,
    pending_seek: Option<SeekCompletion>,
    load_epoch: u64,
    play_epoch: u64,
}

impl SimState {
    fn current(&self) -> Option<usize> {
        self.live.first().map(|entry| entry.index)
    }

    fn current_readiness(&self) -> ItemReadiness {
        self.current()
            .and_then(|item| self.readiness.get(&item).copied())
            .unwrap_or_default()
    }

    fn position_now(&self) -> Duration {
        match self.clock_started {
            Some(started) => (self.position + started.elapsed().mul_f32(self.rate))
                .min(self.options.track_duration),
            None => self.position,
        }
    }

    /// Fold elapsed time into `position` and stop the clock
    fn stop_clock(&mut self) {
        self.position = self.position_now();
        self.clock_started = None;
        self.play_epoch += 1;
    }

    fn notify_active_item(&self) {
        let item = self.current();
        for sender in &self.subscribers {
            if sender.signal() == EngineSignal::ActiveItemChanged {
                sender.active_item_changed(item);
            }
        }
    }

    fn notify_rate(&self) {
        for sender in &self.subscribers {
            if sender.signal() == EngineSignal::RateChanged {
                sender.rate_changed(self.rate);
            }
        }
    }

    fn notify_readiness(&self, item: usize, readiness: ItemReadiness) {
        for sender in &self.subscribers {
            if sender.signal() == (EngineSignal::Readiness { item }) {
                sender.readiness_changed(item, readiness);
            }
        }
    }
}

type Shared = Arc<Mutex<SimState>>;

fn lock(shared: &Shared) -> MutexGuard<'_, SimState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Resolve readiness of the current item after the load delay
fn schedule_readiness(shared: &Shared, state: &SimState) {
    let Some(entry) = state.live.first() else {
        return;
    };
    if state.readiness.contains_key(&entry.index) {
        return;
    }

    let item = entry.index;
    let readiness = if state.options.failing.contains(&entry.id) {
        ItemReadiness::Failed
    } else {
        ItemReadiness::ReadyToPlay
    };
    let epoch = state.load_epoch;
    let delay = state.options.load_delay;
    let shared = shared.clone();

    tokio::spawn(async move {
        sleep(delay).await;
        let mut state = lock(&shared);
        if state.load_epoch != epoch || state.current() != Some(item) {
            return;
        }

        debug!(item, ?readiness, "Simulated item resolved");
        state.readiness.insert(item, readiness);
        state.notify_readiness(item, readiness);
        start_clock(&shared, &mut state);
    });
}

/// Start advancing time if the current item is ready and the rate positive
fn start_clock(shared: &Shared, state: &mut SimState) {
    if state.rate <= 0.0 || state.current_readiness() != ItemReadiness::ReadyToPlay {
        return;
    }

    state.stop_clock();
    state.clock_started = Some(Instant::now());

    let remaining = state.options.track_duration.saturating_sub(state.position);
    let wait = remaining.div_f32(state.rate);
    let epoch = state.play_epoch;
    let shared = shared.clone();

    tokio::spawn(async move {
        sleep(wait).await;
        let mut state = lock(&shared);
        if state.play_epoch == epoch {
            advance(&shared, &mut state);
        }
    });
}

/// Current item played to its end
fn advance(shared: &Shared, state: &mut SimState) {
    state.stop_clock();
    state.load_epoch += 1;
    if !state.live.is_empty() {
        state.live.remove(0);
    }
    state.position = state.live.first().map(|e| e.offset).unwrap_or_default();
    debug!(item = ?state.current(), "Simulated engine advanced");
    state.notify_active_item();

    if state.live.is_empty() {
        state.rate = 0.0;
        state.notify_rate();
        return;
    }

    schedule_readiness(shared, state);
    start_clock(shared, state);
}

/// Queued player running on tokio timers
pub struct SimulatedEngine {
    shared: Shared,
}

impl SimulatedEngine {
    pub fn new(options: SimulatedOptions) -> Self {
        Self {
            shared: Arc::new(Mutex::new(SimState {
                options,
                live: Vec::new(),
                readiness: HashMap::new(),
                position: Duration::ZERO,
                clock_started: None,
                rate: 0.0,
                subscribers: Vec::new(),
                pending_seek: None,
                load_epoch: 0,
                play_epoch: 0,
            })),
        }
    }
}

impl MediaEngine for SimulatedEngine {
    fn load_queue(&mut self, tracks: &[Track], start: usize) {
        let mut state = lock(&self.shared);
        state.stop_clock();
        state.load_epoch += 1;
        state.live = tracks
            .get(start..)
            .unwrap_or_default()
            .iter()
            .map(|track| Entry {
                index: track.index(),
                id: track.id().clone(),
                offset: track.start_offset().unwrap_or_default(),
            })
            .collect();
        state.position = state.live.first().map(|e| e.offset).unwrap_or_default();
        state.notify_active_item();

        schedule_readiness(&self.shared, &state);
        start_clock(&self.shared, &mut state);
    }

    fn clear(&mut self) {
        let mut state = lock(&self.shared);
        state.stop_clock();
        state.load_epoch += 1;
        state.live.clear();
        state.position = Duration::ZERO;
        if let Some(seek) = state.pending_seek.take() {
            seek.complete(false);
        }
        state.notify_active_item();
    }

    fn play(&mut self, rate: f32) {
        let mut state = lock(&self.shared);
        state.rate = rate;
        state.notify_rate();
        start_clock(&self.shared, &mut state);
    }

    fn pause(&mut self) {
        let mut state = lock(&self.shared);
        state.stop_clock();
        state.rate = 0.0;
        state.notify_rate();
    }

    fn seek(&mut self, position: Duration, completion: SeekCompletion) {
        let mut state = lock(&self.shared);
        if let Some(previous) = state.pending_seek.take() {
            previous.complete(false);
        }

        let running = state.clock_started.is_some();
        state.stop_clock();
        state.position = position.min(state.options.track_duration);
        if running {
            start_clock(&self.shared, &mut state);
        }

        let seek = completion.seek();
        state.pending_seek = Some(completion);
        let delay = state.options.seek_delay;
        let shared = self.shared.clone();

        tokio::spawn(async move {
            sleep(delay).await;
            let mut state = lock(&shared);
            if state.pending_seek.as_ref().map(SeekCompletion::seek) == Some(seek) {
                if let Some(completion) = state.pending_seek.take() {
                    completion.complete(true);
                }
            }
        });
    }

    fn current_item(&self) -> Option<usize> {
        lock(&self.shared).current()
    }

    fn current_time(&self) -> Duration {
        lock(&self.shared).position_now()
    }

    fn duration(&self) -> Option<Duration> {
        let state = lock(&self.shared);
        state.current().map(|_| state.options.track_duration)
    }

    fn rate(&self) -> f32 {
        lock(&self.shared).rate
    }

    fn set_rate(&mut self, rate: f32) {
        let mut state = lock(&self.shared);
        if state.rate <= 0.0 {
            return;
        }
        state.stop_clock();
        state.rate = rate;
        state.notify_rate();
        start_clock(&self.shared, &mut state);
    }

    fn readiness(&self) -> ItemReadiness {
        lock(&self.shared).current_readiness()
    }

    fn subscribe(&mut self, signal: EngineSignal, sender: EngineEventSender) {
        let mut state = lock(&self.shared);
        match signal {
            EngineSignal::ActiveItemChanged => sender.active_item_changed(state.current()),
            EngineSignal::RateChanged => sender.rate_changed(state.rate),
            EngineSignal::Readiness { item } => {
                if let Some(readiness) = state.readiness.get(&item) {
                    sender.readiness_changed(item, *readiness);
                }
            }
        }
        state.subscribers.push(sender);
    }

    fn unsubscribe(&mut self, subscription: Subscription) {
        lock(&self.shared)
            .subscribers
            .retain(|sender| sender.subscription() != subscription);
    }
}
