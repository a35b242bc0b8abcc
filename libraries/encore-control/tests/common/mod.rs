//! Shared fixtures for control loop tests
#![allow(dead_code)]

use async_trait::async_trait;
use encore_control::{
    ArtworkError, ArtworkLoader, ControlLoop, PlayerHandle, SimulatedEngine, SimulatedOptions,
};
use encore_playback::{
    CoverImage, CoverImageRequest, MediaEngine, NowPlayingInfo, PlaybackListener, PlaybackStatus,
    PlayerConfig, RemoteCommandKind, RemoteSurface, TrackId, TrackInfo,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

pub const TRACK_DURATION: Duration = Duration::from_secs(10);
pub const LOAD_DELAY: Duration = Duration::from_millis(300);

// ===== Recorders =====

/// Everything listeners and the surface were told
#[derive(Default)]
pub struct Recorded {
    pub statuses: Vec<PlaybackStatus>,
    pub active_tracks: Vec<usize>,
    pub progress: Vec<f64>,
    pub cover_requests: Vec<(usize, TrackId)>,
    pub now_playing: Vec<NowPlayingInfo>,
    pub artwork: Vec<CoverImage>,
    pub commands: Vec<(RemoteCommandKind, bool)>,
    pub skip_intervals: Vec<Duration>,
    pub surface_statuses: Vec<PlaybackStatus>,
}

#[derive(Clone, Default)]
pub struct Recorder {
    inner: Arc<Mutex<Recorded>>,
}

impl Recorder {
    pub fn get(&self) -> MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap()
    }

    pub fn listener(&self) -> RecordingListener {
        RecordingListener {
            recorder: self.clone(),
            cover: None,
        }
    }

    /// Listener that answers every cover request with `image`
    pub fn answering_listener(&self, image: Option<CoverImage>) -> RecordingListener {
        RecordingListener {
            recorder: self.clone(),
            cover: Some(image),
        }
    }

    pub fn surface(&self) -> RecordingSurface {
        RecordingSurface {
            recorder: self.clone(),
        }
    }

    pub fn last_status(&self) -> Option<PlaybackStatus> {
        self.get().statuses.last().copied()
    }
}

pub struct RecordingListener {
    recorder: Recorder,
    cover: Option<Option<CoverImage>>,
}

impl PlaybackListener for RecordingListener {
    fn on_status_changed(&mut self, status: PlaybackStatus) {
        self.recorder.get().statuses.push(status);
    }

    fn on_active_track_changed(&mut self, index: usize) {
        self.recorder.get().active_tracks.push(index);
    }

    fn on_progress_updated(&mut self, fraction: f64) {
        self.recorder.get().progress.push(fraction);
    }

    fn on_cover_image_requested(&mut self, request: &CoverImageRequest) {
        self.recorder
            .get()
            .cover_requests
            .push((request.index, request.track_id.clone()));
        if let Some(image) = &self.cover {
            request.respond(image.clone());
        }
    }
}

pub struct RecordingSurface {
    recorder: Recorder,
}

impl RemoteSurface for RecordingSurface {
    fn update_now_playing(&mut self, info: &NowPlayingInfo) {
        self.recorder.get().now_playing.push(info.clone());
    }

    fn update_artwork(&mut self, image: &CoverImage) {
        self.recorder.get().artwork.push(image.clone());
    }

    fn set_command_enabled(&mut self, kind: RemoteCommandKind, enabled: bool) {
        self.recorder.get().commands.push((kind, enabled));
    }

    fn set_skip_interval(&mut self, interval: Duration) {
        self.recorder.get().skip_intervals.push(interval);
    }

    fn status_changed(&mut self, status: PlaybackStatus) {
        self.recorder.get().surface_statuses.push(status);
    }
}

// ===== Artwork =====

/// Loader serving a fixed image, counting requested locators
#[derive(Default)]
pub struct StubLoader {
    pub requested: Mutex<Vec<Url>>,
    pub fail: bool,
}

#[async_trait]
impl ArtworkLoader for StubLoader {
    async fn load(&self, locator: &Url) -> Result<CoverImage, ArtworkError> {
        self.requested.lock().unwrap().push(locator.clone());
        tokio::time::sleep(Duration::from_millis(50)).await;
        if self.fail {
            return Err(ArtworkError::Status(404));
        }
        Ok(CoverImage::new(vec![1, 2, 3]).with_mime_type("image/png"))
    }
}

// ===== Player =====

pub fn options() -> SimulatedOptions {
    SimulatedOptions {
        track_duration: TRACK_DURATION,
        load_delay: LOAD_DELAY,
        seek_delay: Duration::from_millis(100),
        failing: HashSet::new(),
    }
}

pub fn failing(ids: &[&str]) -> SimulatedOptions {
    SimulatedOptions {
        failing: ids.iter().map(|id| TrackId::new(*id)).collect(),
        ..options()
    }
}

pub fn factory(options: SimulatedOptions) -> impl FnMut() -> Box<dyn MediaEngine> + Send {
    move || Box::new(SimulatedEngine::new(options.clone())) as Box<dyn MediaEngine>
}

/// Control loop with a recording listener and surface attached
pub fn control_loop(config: PlayerConfig, options: SimulatedOptions) -> (ControlLoop, Recorder, PlayerHandle) {
    let recorder = Recorder::default();
    let (control, player) = ControlLoop::new(config, factory(options)).unwrap();
    let control = control
        .with_listener(recorder.listener())
        .with_surface(recorder.surface());
    (control, recorder, player)
}

pub fn spawn_player() -> (PlayerHandle, Recorder, JoinHandle<()>) {
    let (control, recorder, player) = control_loop(PlayerConfig::default(), options());
    (player, recorder, control.spawn())
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
