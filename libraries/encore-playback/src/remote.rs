//! Remote command bridging
//!
//! Hardware and lock-screen commands arrive as [`RemoteCommand`]s and map onto
//! one transport operation each. A command succeeds when the controller ends
//! up with an item loaded.

use crate::controller::PlaybackController;
use crate::error::Result;
use crate::types::{PlaybackStatus, RemoteCommandMode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Command invoked on the remote surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RemoteCommand {
    TogglePlayPause,
    Play,
    Pause,
    Stop,
    NextTrack,
    PreviousTrack,
    SkipForward,
    SkipBackward,
    SeekForward,
    SeekBackward,
    ChangePlaybackRate(f32),
    ChangePlaybackPosition(Duration),
}

impl RemoteCommand {
    pub fn kind(&self) -> RemoteCommandKind {
        match self {
            Self::TogglePlayPause => RemoteCommandKind::TogglePlayPause,
            Self::Play => RemoteCommandKind::Play,
            Self::Pause => RemoteCommandKind::Pause,
            Self::Stop => RemoteCommandKind::Stop,
            Self::NextTrack => RemoteCommandKind::NextTrack,
            Self::PreviousTrack => RemoteCommandKind::PreviousTrack,
            Self::SkipForward => RemoteCommandKind::SkipForward,
            Self::SkipBackward => RemoteCommandKind::SkipBackward,
            Self::SeekForward => RemoteCommandKind::SeekForward,
            Self::SeekBackward => RemoteCommandKind::SeekBackward,
            Self::ChangePlaybackRate(_) => RemoteCommandKind::ChangePlaybackRate,
            Self::ChangePlaybackPosition(_) => RemoteCommandKind::ChangePlaybackPosition,
        }
    }
}

/// Remote command without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RemoteCommandKind {
    TogglePlayPause,
    Play,
    Pause,
    Stop,
    NextTrack,
    PreviousTrack,
    SkipForward,
    SkipBackward,
    SeekForward,
    SeekBackward,
    ChangePlaybackRate,
    ChangePlaybackPosition,
}

impl RemoteCommandKind {
    pub const ALL: [RemoteCommandKind; 12] = [
        Self::TogglePlayPause,
        Self::Play,
        Self::Pause,
        Self::Stop,
        Self::NextTrack,
        Self::PreviousTrack,
        Self::SkipForward,
        Self::SkipBackward,
        Self::SeekForward,
        Self::SeekBackward,
        Self::ChangePlaybackRate,
        Self::ChangePlaybackPosition,
    ];
}

/// Result reported back to the remote surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandStatus {
    Success,
    CommandFailed,
}

/// Enablement table for every remote command under one mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCommandSet {
    mode: RemoteCommandMode,
}

impl RemoteCommandSet {
    pub fn for_mode(mode: RemoteCommandMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> RemoteCommandMode {
        self.mode
    }

    pub fn is_enabled(&self, kind: RemoteCommandKind) -> bool {
        use RemoteCommandKind::{
            ChangePlaybackPosition, ChangePlaybackRate, NextTrack, Pause, Play, PreviousTrack,
            SeekBackward, SeekForward, SkipBackward, SkipForward, Stop, TogglePlayPause,
        };

        match kind {
            TogglePlayPause | Play | Pause | Stop | ChangePlaybackPosition => true,
            SkipForward | SkipBackward => self.mode == RemoteCommandMode::Skip,
            NextTrack | PreviousTrack => self.mode == RemoteCommandMode::NextPrevious,
            SeekForward | SeekBackward | ChangePlaybackRate => false,
        }
    }

    /// Every command with its enablement, in a stable order
    pub fn iter(&self) -> impl Iterator<Item = (RemoteCommandKind, bool)> + '_ {
        RemoteCommandKind::ALL
            .into_iter()
            .map(move |kind| (kind, self.is_enabled(kind)))
    }
}

impl PlaybackController {
    /// Run a remote command through the matching transport operation
    pub fn handle_remote_command(&mut self, command: RemoteCommand) -> CommandStatus {
        debug!("Remote command: {:?}", command);

        match command {
            RemoteCommand::TogglePlayPause => {
                if self.play_or_pause() == PlaybackStatus::None {
                    CommandStatus::CommandFailed
                } else {
                    CommandStatus::Success
                }
            }
            RemoteCommand::Play => {
                let result = self.play();
                self.report(result)
            }
            RemoteCommand::Pause | RemoteCommand::Stop => {
                let result = self.pause();
                self.report(result)
            }
            RemoteCommand::NextTrack => {
                let result = self.next();
                self.report(result)
            }
            RemoteCommand::PreviousTrack => {
                let result = self.previous();
                self.report(result)
            }
            RemoteCommand::SkipForward => {
                let result = self.skip_forward();
                self.report(result)
            }
            RemoteCommand::SkipBackward => {
                let result = self.skip_backward();
                self.report(result)
            }
            RemoteCommand::ChangePlaybackPosition(position) => {
                // Show the target right away, the seek lands later
                self.update_now_playing(Some(position));
                let result = self.seek_to(position);
                self.report(result)
            }
            RemoteCommand::SeekForward
            | RemoteCommand::SeekBackward
            | RemoteCommand::ChangePlaybackRate(_) => CommandStatus::CommandFailed,
        }
    }

    fn report(&self, result: Result<()>) -> CommandStatus {
        if let Err(e) = result {
            debug!("Remote command not applied: {}", e);
        }
        if self.status() == PlaybackStatus::None {
            CommandStatus::CommandFailed
        } else {
            CommandStatus::Success
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_mode_table() {
        let set = RemoteCommandSet::for_mode(RemoteCommandMode::Skip);
        assert!(set.is_enabled(RemoteCommandKind::SkipForward));
        assert!(set.is_enabled(RemoteCommandKind::SkipBackward));
        assert!(!set.is_enabled(RemoteCommandKind::NextTrack));
        assert!(!set.is_enabled(RemoteCommandKind::PreviousTrack));
        assert!(set.is_enabled(RemoteCommandKind::ChangePlaybackPosition));
    }

    #[test]
    fn next_previous_mode_table() {
        let set = RemoteCommandSet::for_mode(RemoteCommandMode::NextPrevious);
        assert!(!set.is_enabled(RemoteCommandKind::SkipForward));
        assert!(set.is_enabled(RemoteCommandKind::NextTrack));
        assert!(set.is_enabled(RemoteCommandKind::PreviousTrack));
        assert!(set.is_enabled(RemoteCommandKind::TogglePlayPause));
    }

    #[test]
    fn seek_and_rate_commands_never_enabled() {
        for mode in [RemoteCommandMode::Skip, RemoteCommandMode::NextPrevious] {
            let set = RemoteCommandSet::for_mode(mode);
            assert!(!set.is_enabled(RemoteCommandKind::SeekForward));
            assert!(!set.is_enabled(RemoteCommandKind::SeekBackward));
            assert!(!set.is_enabled(RemoteCommandKind::ChangePlaybackRate));
        }
    }

    #[test]
    fn iter_covers_every_command_once() {
        let set = RemoteCommandSet::for_mode(RemoteCommandMode::Skip);
        let kinds: Vec<_> = set.iter().map(|(kind, _)| kind).collect();
        assert_eq!(kinds, RemoteCommandKind::ALL.to_vec());
        assert_eq!(set.iter().filter(|(_, enabled)| *enabled).count(), 7);
    }

    #[test]
    fn command_kind_drops_payload() {
        assert_eq!(
            RemoteCommand::ChangePlaybackPosition(Duration::from_secs(3)).kind(),
            RemoteCommandKind::ChangePlaybackPosition
        );
        assert_eq!(
            RemoteCommand::ChangePlaybackRate(2.0).kind(),
            RemoteCommandKind::ChangePlaybackRate
        );
    }
}
