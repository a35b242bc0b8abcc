//! Core types for playback control

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Track identifier supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    /// Create a new track ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TrackId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Encoded cover image bytes
///
/// Cheap to clone; the bytes are shared.
#[derive(Clone, PartialEq, Eq)]
pub struct CoverImage {
    data: Arc<[u8]>,
    mime_type: Option<String>,
}

impl CoverImage {
    /// Wrap encoded image bytes
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: Arc::from(data.into()),
            mime_type: None,
        }
    }

    /// Attach a MIME type (e.g. `image/jpeg`)
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for CoverImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoverImage")
            .field("len", &self.data.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/// Caller-supplied description of one queue entry
///
/// Locators are kept as strings here and resolved when the queue is built,
/// so a playlist file with a broken entry still loads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackInfo {
    pub id: TrackId,

    /// Remote URL or absolute file path of the audio
    #[serde(default)]
    pub source: Option<String>,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub album_title: String,

    /// Cover art to fetch in the background
    #[serde(default)]
    pub artwork_url: Option<String>,

    /// Cover art already in memory (takes precedence over `artwork_url`)
    #[serde(skip)]
    pub cover_image: Option<CoverImage>,

    /// Offset to start the item at, in seconds when serialized
    #[serde(default, with = "crate::config::opt_secs")]
    pub start_at: Option<Duration>,
}

impl TrackInfo {
    pub fn new(
        id: impl Into<TrackId>,
        source: impl Into<String>,
        title: impl Into<String>,
        album_title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: Some(source.into()),
            title: title.into(),
            album_title: album_title.into(),
            artwork_url: None,
            cover_image: None,
            start_at: None,
        }
    }

    pub fn with_artwork_url(mut self, url: impl Into<String>) -> Self {
        self.artwork_url = Some(url.into());
        self
    }

    pub fn with_cover_image(mut self, image: CoverImage) -> Self {
        self.cover_image = Some(image);
        self
    }

    pub fn with_start_at(mut self, offset: Duration) -> Self {
        self.start_at = Some(offset);
        self
    }
}

/// One entry of the built queue
///
/// `index` is the position at build time and never changes, even when the
/// engine's live queue is trimmed by `go_to`.
#[derive(Debug, Clone)]
pub struct Track {
    index: usize,
    id: TrackId,
    source: Url,
    title: String,
    album_title: String,
    artwork_locator: Option<Url>,
    artwork: Option<CoverImage>,
    start_offset: Option<Duration>,
}

impl Track {
    /// Build a track at `index`, resolving its locators
    pub fn from_info(index: usize, info: &TrackInfo) -> Result<Self> {
        let source = info
            .source
            .as_deref()
            .and_then(resolve_locator)
            .ok_or_else(|| PlaybackError::UnresolvableSource {
                id: info.id.clone(),
                locator: info.source.clone(),
            })?;

        let artwork_locator = match (&info.cover_image, info.artwork_url.as_deref()) {
            (Some(_), _) | (None, None) => None,
            (None, Some(raw)) => {
                let parsed = Url::parse(raw).ok();
                if parsed.is_none() {
                    tracing::warn!("Ignoring invalid artwork URL for track {}: {}", info.id, raw);
                }
                parsed
            }
        };

        Ok(Self {
            index,
            id: info.id.clone(),
            source,
            title: info.title.clone(),
            album_title: info.album_title.clone(),
            artwork_locator,
            artwork: info.cover_image.clone(),
            start_offset: info.start_at,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn id(&self) -> &TrackId {
        &self.id
    }

    pub fn source(&self) -> &Url {
        &self.source
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn album_title(&self) -> &str {
        &self.album_title
    }

    /// Remote artwork still to be fetched
    pub fn artwork_locator(&self) -> Option<&Url> {
        self.artwork_locator.as_ref()
    }

    /// Resolved cover image, if any
    pub fn artwork(&self) -> Option<&CoverImage> {
        self.artwork.as_ref()
    }

    pub fn start_offset(&self) -> Option<Duration> {
        self.start_offset
    }

    pub(crate) fn set_artwork(&mut self, image: CoverImage) {
        self.artwork = Some(image);
    }
}

/// Tracks are the same entry if either the id or the source matches
impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id || self.source == other.source
    }
}

/// Resolve a source locator to a URL
///
/// Accepts absolute URLs and absolute filesystem paths.
pub fn resolve_locator(raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(url) = Url::parse(raw) {
        return Some(url);
    }

    let path = Path::new(raw);
    if path.is_absolute() {
        Url::from_file_path(path).ok()
    } else {
        None
    }
}

/// Public playback status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackStatus {
    /// No item loaded in the engine
    #[default]
    None,

    /// Item changing, buffering or seeking
    Loading,

    /// Active item is unplayable
    Failed,

    /// Item loaded, never started
    ReadyToPlay,

    Playing,

    Paused,
}

/// Per-item readiness reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemReadiness {
    #[default]
    Unknown,
    ReadyToPlay,
    Failed,
}

/// Which remote affordance pair is offered
///
/// Skip and next/previous are mutually exclusive on the remote surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RemoteCommandMode {
    #[default]
    Skip,
    NextPrevious,
}
