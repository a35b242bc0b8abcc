//! Track queue built once per setup

use crate::error::PlaybackError;
use crate::types::{CoverImage, Track, TrackInfo};
use tracing::warn;

/// Ordered, index-stable list of tracks
///
/// The engine may only hold a suffix of this list (after `go_to`), but every
/// track stays addressable by its build-time index.
#[derive(Debug, Clone, Default)]
pub struct TrackQueue {
    tracks: Vec<Track>,
}

impl TrackQueue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a queue from caller-supplied items
    ///
    /// Items whose source cannot be resolved are skipped and returned as
    /// errors; the remaining items get consecutive indices.
    pub fn build(items: &[TrackInfo]) -> (Self, Vec<PlaybackError>) {
        let mut tracks = Vec::with_capacity(items.len());
        let mut skipped = Vec::new();

        for info in items {
            match Track::from_info(tracks.len(), info) {
                Ok(track) => tracks.push(track),
                Err(e) => {
                    warn!("Skipping queue item: {}", e);
                    skipped.push(e);
                }
            }
        }

        (Self { tracks }, skipped)
    }

    /// Clamp a requested start position into the queue
    ///
    /// Returns `None` for an empty queue.
    pub fn clamp_index(&self, requested: i64) -> Option<usize> {
        let last = self.tracks.len().checked_sub(1)?;
        if requested <= 0 {
            return Some(0);
        }
        Some(usize::try_from(requested).map_or(last, |index| index.min(last)))
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn contains_index(&self, index: usize) -> bool {
        index < self.tracks.len()
    }

    /// Store resolved artwork for a track, returns false for unknown indices
    pub fn set_artwork(&mut self, index: usize, image: CoverImage) -> bool {
        match self.tracks.get_mut(index) {
            Some(track) => {
                track.set_artwork(image);
                true
            }
            None => false,
        }
    }

    /// Clear all tracks
    pub fn clear(&mut self) {
        self.tracks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, source: Option<&str>) -> TrackInfo {
        let mut info = TrackInfo::new(id, "", format!("Track {}", id), "Album");
        info.source = source.map(str::to_string);
        info
    }

    #[test]
    fn skips_unresolvable_items_and_reindexes() {
        let items = vec![
            item("a", Some("https://x.test/a.mp3")),
            item("b", None),
            item("c", Some("https://x.test/c.mp3")),
        ];
        let (queue, skipped) = TrackQueue::build(&items);

        assert_eq!(queue.len(), 2);
        assert_eq!(skipped.len(), 1);
        assert_eq!(queue.get(0).map(|t| t.id().as_str()), Some("a"));
        assert_eq!(queue.get(1).map(|t| t.id().as_str()), Some("c"));
        assert_eq!(queue.get(1).map(Track::index), Some(1));
    }

    #[test]
    fn clamp_index_bounds() {
        let items: Vec<_> = (0..3)
            .map(|i| item(&i.to_string(), Some(&format!("https://x.test/{}.mp3", i))))
            .collect();
        let (queue, _) = TrackQueue::build(&items);

        assert_eq!(queue.clamp_index(-4), Some(0));
        assert_eq!(queue.clamp_index(0), Some(0));
        assert_eq!(queue.clamp_index(2), Some(2));
        assert_eq!(queue.clamp_index(3), Some(2));
        assert_eq!(queue.clamp_index(i64::MAX), Some(2));
        assert_eq!(TrackQueue::new().clamp_index(0), None);
    }

    #[test]
    fn set_artwork_by_index() {
        let (mut queue, _) = TrackQueue::build(&[item("a", Some("https://x.test/a.mp3"))]);
        assert!(queue.set_artwork(0, CoverImage::new(vec![7; 4])));
        assert!(!queue.set_artwork(5, CoverImage::new(vec![7; 4])));
        assert_eq!(queue.get(0).and_then(Track::artwork).map(CoverImage::len), Some(4));
    }
}
