/// Listener and remote surface that report through tracing
use encore_playback::{
    CoverImage, CoverImageRequest, NowPlayingInfo, PlaybackListener, PlaybackStatus,
    RemoteCommandKind, RemoteSurface,
};
use std::time::Duration;
use tracing::{debug, info};

/// Logs status and track changes; progress only at debug level
#[derive(Debug, Default)]
pub struct LogListener {
    last_percent: Option<u32>,
}

impl PlaybackListener for LogListener {
    fn on_status_changed(&mut self, status: PlaybackStatus) {
        info!(?status, "Status changed");
    }

    fn on_active_track_changed(&mut self, index: usize) {
        self.last_percent = None;
        info!(index, "Now on track");
    }

    fn on_progress_updated(&mut self, fraction: f64) {
        let percent = (fraction * 100.0).round() as u32;
        if self.last_percent != Some(percent) {
            self.last_percent = Some(percent);
            debug!(percent, "Progress");
        }
    }

    fn on_cover_image_requested(&mut self, request: &CoverImageRequest) {
        // Nothing local to offer; the surface keeps its placeholder
        debug!(index = request.index, track = %request.track_id.as_str(), "Cover image requested");
        request.respond(None);
    }
}

/// Stand-in for a lock screen
#[derive(Debug, Default)]
pub struct LogSurface {
    enabled: Vec<RemoteCommandKind>,
}

impl LogSurface {
    pub fn enabled_commands(&self) -> &[RemoteCommandKind] {
        &self.enabled
    }
}

impl RemoteSurface for LogSurface {
    fn update_now_playing(&mut self, info: &NowPlayingInfo) {
        info!(
            "Now playing: {} - {} [{:.0}s / {:.0}s at {}x]",
            info.title,
            info.album_title,
            info.elapsed.as_secs_f64(),
            info.duration.as_secs_f64(),
            info.rate
        );
    }

    fn update_artwork(&mut self, image: &CoverImage) {
        info!(
            bytes = image.len(),
            mime = image.mime_type().unwrap_or("unknown"),
            "Lock screen artwork updated"
        );
    }

    fn set_command_enabled(&mut self, kind: RemoteCommandKind, enabled: bool) {
        self.enabled.retain(|k| *k != kind);
        if enabled {
            self.enabled.push(kind);
        }
        debug!(?kind, enabled, "Remote command");
    }

    fn set_skip_interval(&mut self, interval: Duration) {
        debug!(?interval, "Remote skip interval");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_tracks_enabled_commands() {
        let mut surface = LogSurface::default();
        surface.set_command_enabled(RemoteCommandKind::SkipForward, true);
        surface.set_command_enabled(RemoteCommandKind::NextTrack, false);
        surface.set_command_enabled(RemoteCommandKind::Play, true);
        surface.set_command_enabled(RemoteCommandKind::SkipForward, false);

        assert_eq!(surface.enabled_commands(), &[RemoteCommandKind::Play]);
    }

    #[test]
    fn listener_resets_progress_on_track_change() {
        let mut listener = LogListener::default();
        listener.on_progress_updated(0.5);
        assert_eq!(listener.last_percent, Some(50));

        listener.on_active_track_changed(1);
        assert_eq!(listener.last_percent, None);
    }
}
