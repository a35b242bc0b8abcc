//! Shared test fixtures: a scriptable engine and a synchronous harness
#![allow(dead_code)]

use crossbeam_channel::{Receiver, Sender};
use encore_playback::{
    ControlEvent, EngineEventSender, EngineSignal, ItemReadiness, MediaEngine, PlaybackController,
    PlaybackStatus, PlayerConfig, PlayerEvent, SeekCompletion, Subscription, Track, TrackInfo,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

// ===== Fake Engine =====

/// Engine state shared between the engine (owned by the controller) and the test
#[derive(Default)]
pub struct FakeState {
    /// Queue indices in the live queue, current first
    pub live: Vec<usize>,
    pub start_offsets: HashMap<usize, Duration>,
    pub readiness: HashMap<usize, ItemReadiness>,
    pub duration: Option<Duration>,
    pub current_time: Duration,
    pub rate: f32,
    pub subscribers: Vec<EngineEventSender>,
    /// Every subscription ever made, in order
    pub subscribed: Vec<(EngineSignal, Subscription)>,
    pub seeks: Vec<(Duration, SeekCompletion)>,
    pub seek_targets: Vec<Duration>,
    pub calls: Vec<String>,
    pub created: usize,
}

impl FakeState {
    fn current(&self) -> Option<usize> {
        self.live.first().copied()
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

    fn notify_readiness(&self, item: usize) {
        let readiness = self.readiness.get(&item).copied().unwrap_or_default();
        for sender in &self.subscribers {
            if sender.signal() == (EngineSignal::Readiness { item }) {
                sender.readiness_changed(item, readiness);
            }
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeEngineHandle {
    state: Arc<Mutex<FakeState>>,
}

impl FakeEngineHandle {
    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn engine(&self) -> Box<dyn MediaEngine> {
        self.state().created += 1;
        Box::new(FakeEngine {
            state: self.state.clone(),
        })
    }

    pub fn set_duration(&self, duration: Option<Duration>) {
        self.state().duration = duration;
    }

    pub fn set_current_time(&self, time: Duration) {
        self.state().current_time = time;
    }

    /// Resolve readiness of `item` and notify observers
    pub fn set_readiness(&self, item: usize, readiness: ItemReadiness) {
        let mut state = self.state();
        state.readiness.insert(item, readiness);
        state.notify_readiness(item);
    }

    /// Change the rate from the engine side (e.g. a stall)
    pub fn set_rate(&self, rate: f32) {
        let mut state = self.state();
        state.rate = rate;
        state.notify_rate();
    }

    /// Current item played to its end; the engine advances
    pub fn finish_current(&self) {
        let mut state = self.state();
        if !state.live.is_empty() {
            state.live.remove(0);
        }
        state.current_time = Duration::ZERO;
        state.notify_active_item();
    }

    /// Complete the `n`-th outstanding seek
    pub fn complete_seek(&self, n: usize, finished: bool) {
        let (position, completion) = self.state().seeks.remove(n);
        self.set_current_time(position);
        completion.complete(finished);
    }

    pub fn pending_seeks(&self) -> usize {
        self.state().seeks.len()
    }

    pub fn seek_targets(&self) -> Vec<Duration> {
        self.state().seek_targets.clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    pub fn live(&self) -> Vec<usize> {
        self.state().live.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.state().subscribers.len()
    }

    pub fn rate(&self) -> f32 {
        self.state().rate
    }

    /// Readiness subscriptions made for `item`, oldest first
    pub fn readiness_subscriptions(&self, item: usize) -> Vec<Subscription> {
        self.state()
            .subscribed
            .iter()
            .filter(|(signal, _)| *signal == EngineSignal::Readiness { item })
            .map(|(_, subscription)| *subscription)
            .collect()
    }

    pub fn engines_created(&self) -> usize {
        self.state().created
    }
}

pub struct FakeEngine {
    state: Arc<Mutex<FakeState>>,
}

impl FakeEngine {
    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }
}

impl MediaEngine for FakeEngine {
    fn load_queue(&mut self, tracks: &[Track], start: usize) {
        let mut state = self.state();
        state.calls.push(format!("load_queue {}", start));
        state.live = tracks[start..].iter().map(Track::index).collect();
        state.start_offsets = tracks
            .iter()
            .filter_map(|t| t.start_offset().map(|offset| (t.index(), offset)))
            .collect();
        state.current_time = state
            .start_offsets
            .get(&tracks[start].index())
            .copied()
            .unwrap_or_default();
        state.notify_active_item();
    }

    fn clear(&mut self) {
        let mut state = self.state();
        state.calls.push("clear".to_string());
        state.live.clear();
        state.notify_active_item();
    }

    fn play(&mut self, rate: f32) {
        let mut state = self.state();
        state.calls.push(format!("play {}", rate));
        state.rate = rate;
        state.notify_rate();
    }

    fn pause(&mut self) {
        let mut state = self.state();
        state.calls.push("pause".to_string());
        state.rate = 0.0;
        state.notify_rate();
    }

    fn seek(&mut self, position: Duration, completion: SeekCompletion) {
        let mut state = self.state();
        state.calls.push(format!("seek {:?}", position));
        state.seek_targets.push(position);
        state.seeks.push((position, completion));
    }

    fn current_item(&self) -> Option<usize> {
        self.state().current()
    }

    fn current_time(&self) -> Duration {
        self.state().current_time
    }

    fn duration(&self) -> Option<Duration> {
        let state = self.state();
        state.current().and(state.duration)
    }

    fn rate(&self) -> f32 {
        self.state().rate
    }

    fn set_rate(&mut self, rate: f32) {
        let mut state = self.state();
        state.calls.push(format!("set_rate {}", rate));
        if state.rate > 0.0 {
            state.rate = rate;
            state.notify_rate();
        }
    }

    fn readiness(&self) -> ItemReadiness {
        let state = self.state();
        state
            .current()
            .and_then(|item| state.readiness.get(&item).copied())
            .unwrap_or_default()
    }

    fn subscribe(&mut self, signal: EngineSignal, sender: EngineEventSender) {
        let mut state = self.state();
        state.subscribed.push((signal, sender.subscription()));

        match signal {
            EngineSignal::ActiveItemChanged => sender.active_item_changed(state.current()),
            EngineSignal::RateChanged => sender.rate_changed(state.rate),
            EngineSignal::Readiness { item } => {
                let readiness = state.readiness.get(&item).copied().unwrap_or_default();
                if readiness != ItemReadiness::Unknown {
                    sender.readiness_changed(item, readiness);
                }
            }
        }
        state.subscribers.push(sender);
    }

    fn unsubscribe(&mut self, subscription: Subscription) {
        self.state()
            .subscribers
            .retain(|sender| sender.subscription() != subscription);
    }
}

// ===== Harness =====

/// Controller wired to a fake engine, pumped synchronously
pub struct Harness {
    pub controller: PlaybackController,
    pub engine: FakeEngineHandle,
    pub tx: Sender<ControlEvent>,
    rx: Receiver<ControlEvent>,
    events: Vec<PlayerEvent>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(PlayerConfig::default())
    }

    pub fn with_config(config: PlayerConfig) -> Self {
        let engine = FakeEngineHandle::default();
        engine.set_duration(Some(Duration::from_secs(100)));

        let (tx, rx) = crossbeam_channel::unbounded();
        let factory = {
            let engine = engine.clone();
            move || engine.engine()
        };
        let controller = PlaybackController::new(config, factory, Arc::new(tx.clone()));

        let mut harness = Self {
            controller,
            engine,
            tx,
            rx,
            events: Vec::new(),
        };
        harness.pump();
        harness
    }

    /// Apply queued engine events and collect notifications
    pub fn pump(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.controller.handle_event(event);
        }
        self.events.extend(self.controller.drain_events());
    }

    /// Notifications collected since the last call
    pub fn take_events(&mut self) -> Vec<PlayerEvent> {
        self.pump();
        std::mem::take(&mut self.events)
    }

    pub fn take_statuses(&mut self) -> Vec<PlaybackStatus> {
        self.take_events()
            .into_iter()
            .filter_map(|event| match event {
                PlayerEvent::StatusChanged { status } => Some(status),
                _ => None,
            })
            .collect()
    }

    pub fn status(&mut self) -> PlaybackStatus {
        self.pump();
        self.controller.status()
    }

    /// Set up `count` tracks and settle
    pub fn setup(&mut self, count: usize, start_from: i64, play: bool) {
        self.controller.setup(&items(count), start_from, play);
        self.pump();
    }

    /// Set up, mark the first item ready and start playing
    pub fn playing(count: usize) -> Self {
        let mut harness = Self::new();
        harness.setup(count, 0, false);
        harness.engine.set_readiness(0, ItemReadiness::ReadyToPlay);
        harness.controller.play().unwrap();
        harness.pump();
        harness.take_events();
        harness
    }
}

pub fn item(n: usize) -> TrackInfo {
    TrackInfo::new(
        format!("track-{}", n),
        format!("https://cdn.example.com/audio/{}.mp3", n),
        format!("Track {}", n),
        "Test Album",
    )
}

pub fn items(count: usize) -> Vec<TrackInfo> {
    (0..count).map(item).collect()
}
