/// Console commands
use crate::error::{DemoError, Result};
use encore_control::PlayerHandle;
use encore_playback::{PlayerSnapshot, RemoteCommand, RemoteCommandMode};
use std::str::FromStr;
use std::time::Duration;

pub const HELP: &str = "\
commands:
  play | pause | toggle      transport
  next | prev | goto <n>     queue navigation
  seek <secs> | pct <0-1>    seek
  fwd | back                 skip by the skip interval
  rate [<r>]                 cycle or set the playback rate
  mode skip|next             remote command mode
  remote <command>           simulate a lock-screen command
  status | json              print the player state
  clean | help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play,
    Pause,
    Toggle,
    Next,
    Previous,
    GoTo(usize),
    Seek(Duration),
    SeekPercent(f64),
    SkipForward,
    SkipBackward,
    CycleRate,
    SetRate(f32),
    Mode(RemoteCommandMode),
    Remote(RemoteCommand),
    Status,
    Json,
    Clean,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = DemoError;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(DemoError::UnknownCommand(String::new()));
        };
        let arg = words.next();

        let command = match name {
            "play" => Command::Play,
            "pause" => Command::Pause,
            "toggle" | "p" => Command::Toggle,
            "next" | "n" => Command::Next,
            "prev" | "previous" => Command::Previous,
            "goto" => Command::GoTo(parse_arg(name, arg)?),
            "seek" => {
                let seconds: f64 = parse_arg(name, arg)?;
                let position = Duration::try_from_secs_f64(seconds)
                    .map_err(|e| invalid(name, e.to_string()))?;
                Command::Seek(position)
            }
            "pct" => Command::SeekPercent(parse_arg(name, arg)?),
            "fwd" => Command::SkipForward,
            "back" => Command::SkipBackward,
            "rate" => match arg {
                Some(_) => Command::SetRate(parse_arg(name, arg)?),
                None => Command::CycleRate,
            },
            "mode" => match arg {
                Some("skip") => Command::Mode(RemoteCommandMode::Skip),
                Some("next") => Command::Mode(RemoteCommandMode::NextPrevious),
                _ => return Err(invalid(name, "expected skip or next")),
            },
            "remote" => Command::Remote(parse_remote(arg)?),
            "status" | "s" => Command::Status,
            "json" => Command::Json,
            "clean" => Command::Clean,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(DemoError::UnknownCommand(other.to_string())),
        };

        Ok(command)
    }
}

fn invalid(command: &str, reason: impl Into<String>) -> DemoError {
    DemoError::InvalidArgument {
        command: command.to_string(),
        reason: reason.into(),
    }
}

fn parse_arg<T: FromStr>(command: &str, arg: Option<&str>) -> Result<T> {
    let arg = arg.ok_or_else(|| invalid(command, "missing argument"))?;
    arg.parse()
        .map_err(|_| invalid(command, format!("cannot parse '{}'", arg)))
}

fn parse_remote(arg: Option<&str>) -> Result<RemoteCommand> {
    let command = match arg {
        Some("toggle") => RemoteCommand::TogglePlayPause,
        Some("play") => RemoteCommand::Play,
        Some("pause") => RemoteCommand::Pause,
        Some("stop") => RemoteCommand::Stop,
        Some("next") => RemoteCommand::NextTrack,
        Some("prev") => RemoteCommand::PreviousTrack,
        Some("fwd") => RemoteCommand::SkipForward,
        Some("back") => RemoteCommand::SkipBackward,
        _ => return Err(invalid("remote", "expected toggle, play, pause, stop, next, prev, fwd or back")),
    };
    Ok(command)
}

/// Run one command against the player, returning text to print
pub async fn execute(player: &PlayerHandle, command: Command) -> Result<Option<String>> {
    let output = match command {
        Command::Play => {
            player.play().await?;
            None
        }
        Command::Pause => {
            player.pause().await?;
            None
        }
        Command::Toggle => Some(format!("{:?}", player.play_or_pause().await?)),
        Command::Next => {
            player.next().await?;
            None
        }
        Command::Previous => {
            player.previous().await?;
            None
        }
        Command::GoTo(index) => {
            player.go_to(index).await?;
            None
        }
        Command::Seek(position) => {
            player.seek_to(position).await?;
            None
        }
        Command::SeekPercent(fraction) => {
            player.seek_to_percent(fraction).await?;
            None
        }
        Command::SkipForward => {
            player.skip_forward().await?;
            None
        }
        Command::SkipBackward => {
            player.skip_backward().await?;
            None
        }
        Command::CycleRate => Some(format!("rate {}", player.change_to_next_rate().await?)),
        Command::SetRate(rate) => {
            player.set_rate(rate).await?;
            Some(format!("rate {}", rate))
        }
        Command::Mode(mode) => {
            player.set_command_mode(mode).await?;
            None
        }
        Command::Remote(command) => Some(format!("{:?}", player.remote_command(command).await?)),
        Command::Status => Some(describe(&player.snapshot().await?)),
        Command::Json => Some(serde_json::to_string_pretty(&player.snapshot().await?)?),
        Command::Clean => {
            player.clean().await?;
            None
        }
        Command::Help => Some(HELP.to_string()),
        Command::Quit => None,
    };

    Ok(output)
}

/// One-line summary of the player state
pub fn describe(snapshot: &PlayerSnapshot) -> String {
    let track = match (&snapshot.current_index, &snapshot.track_id) {
        (Some(index), Some(id)) => format!("#{} {}", index, id.as_str()),
        _ => "-".to_string(),
    };
    let progress = snapshot
        .progress
        .map(|fraction| format!("{:.0}%", fraction * 100.0))
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{:?} | {} of {} | {:.1}s ({}) | rate {}",
        snapshot.status,
        track,
        snapshot.queue_len,
        snapshot.position.as_secs_f64(),
        progress,
        snapshot.rate
    )
}
