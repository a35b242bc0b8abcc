/// Playlist files
///
/// A playlist is a JSON array of track descriptions:
/// `[{"id": "a", "source": "https://...", "title": "A", "album_title": "X"}]`
///
/// Entries with a missing or unresolvable source are kept here and skipped
/// when the queue is built.
use crate::error::{DemoError, Result};
use encore_playback::TrackInfo;
use std::path::Path;
use std::time::Duration;

/// Parse a playlist from JSON text
pub fn parse(json: &str) -> Result<Vec<TrackInfo>> {
    let tracks: Vec<TrackInfo> = serde_json::from_str(json)?;
    if tracks.is_empty() {
        return Err(DemoError::Playlist("playlist is empty".to_string()));
    }
    Ok(tracks)
}

/// Read a playlist file
pub async fn load(path: &Path) -> Result<Vec<TrackInfo>> {
    let json = tokio::fs::read_to_string(path).await?;
    parse(&json).map_err(|e| match e {
        DemoError::Json(e) => DemoError::Playlist(format!("{}: {}", path.display(), e)),
        other => other,
    })
}

/// Built-in playlist used when none is given
pub fn sample() -> Vec<TrackInfo> {
    vec![
        TrackInfo::new(
            "overture",
            "https://media.example.com/encore/overture.mp3",
            "Overture",
            "Encore Sessions",
        )
        .with_artwork_url("https://media.example.com/encore/sessions.jpg"),
        TrackInfo::new(
            "interlude",
            "https://media.example.com/encore/interlude.mp3",
            "Interlude",
            "Encore Sessions",
        ),
        TrackInfo::new(
            "finale",
            "https://media.example.com/encore/finale.mp3",
            "Finale",
            "Encore Sessions",
        )
        .with_start_at(Duration::from_secs(30)),
    ]
}
