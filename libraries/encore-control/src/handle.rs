//! Cloneable handle to the control loop
//!
//! Every call is a message on the control channel; calls that return a value
//! wait for the reply on a oneshot channel.

use crate::error::{ControlError, Result};
use encore_playback::{
    CommandStatus, ControlEvent, EventSink, PlaybackController, PlaybackListener, PlaybackStatus,
    PlayerSnapshot, RemoteCommand, RemoteCommandMode, RemoteSurface, TrackInfo,
};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// Work executed on the control task
pub(crate) type Call = Box<dyn FnOnce(&mut PlaybackController) + Send>;

/// Messages accepted by the control loop
pub(crate) enum Message {
    Event(ControlEvent),
    Call(Call),
    AddListener(Box<dyn PlaybackListener>),
    SetSurface(Box<dyn RemoteSurface>),
    Shutdown,
}

/// Event sink posting into the control channel
///
/// Holds a weak sender so that engines and background fetches never keep the
/// loop alive once every [`PlayerHandle`] is gone.
pub(crate) struct ChannelSink {
    tx: mpsc::WeakUnboundedSender<Message>,
}

impl ChannelSink {
    pub(crate) fn new(tx: &mpsc::UnboundedSender<Message>) -> Self {
        Self { tx: tx.downgrade() }
    }
}

impl EventSink for ChannelSink {
    fn post(&self, event: ControlEvent) {
        let delivered = self
            .tx
            .upgrade()
            .is_some_and(|tx| tx.send(Message::Event(event)).is_ok());
        if !delivered {
            debug!("Control loop gone, dropping event");
        }
    }
}

/// Handle for driving the player from any task
#[derive(Clone)]
pub struct PlayerHandle {
    tx: mpsc::UnboundedSender<Message>,
}

impl PlayerHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Message>) -> Self {
        Self { tx }
    }

    /// Run `f` on the control task and wait for its result
    async fn call<R, F>(&self, f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut PlaybackController) -> R + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let call: Call = Box::new(move |controller| {
            // The caller may have given up waiting
            let _ = reply_tx.send(f(controller));
        });

        self.send(Message::Call(call))?;
        reply_rx.await.map_err(|_| ControlError::Closed)
    }

    fn send(&self, message: Message) -> Result<()> {
        self.tx.send(message).map_err(|_| ControlError::Closed)
    }

    /// Whether the control loop is still running
    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }

    // ===== Setup & Teardown =====

    pub async fn setup(&self, items: Vec<TrackInfo>, start_from: i64, play: bool) -> Result<()> {
        self.call(move |c| c.setup(&items, start_from, play)).await
    }

    pub async fn clean(&self) -> Result<()> {
        self.call(PlaybackController::clean).await
    }

    /// Stop the control loop (the queue is cleaned on the way out)
    pub fn shutdown(&self) -> Result<()> {
        self.send(Message::Shutdown)
    }

    // ===== Transport =====

    pub async fn play(&self) -> Result<()> {
        Ok(self.call(PlaybackController::play).await??)
    }

    pub async fn pause(&self) -> Result<()> {
        Ok(self.call(PlaybackController::pause).await??)
    }

    pub async fn play_or_pause(&self) -> Result<PlaybackStatus> {
        self.call(PlaybackController::play_or_pause).await
    }

    pub async fn seek_to(&self, position: Duration) -> Result<()> {
        Ok(self.call(move |c| c.seek_to(position)).await??)
    }

    pub async fn seek_to_percent(&self, fraction: f64) -> Result<()> {
        Ok(self.call(move |c| c.seek_to_percent(fraction)).await??)
    }

    pub async fn next(&self) -> Result<()> {
        Ok(self.call(PlaybackController::next).await??)
    }

    pub async fn previous(&self) -> Result<()> {
        Ok(self.call(PlaybackController::previous).await??)
    }

    pub async fn go_to(&self, index: usize) -> Result<()> {
        Ok(self.call(move |c| c.go_to(index)).await??)
    }

    pub async fn skip_forward(&self) -> Result<()> {
        Ok(self.call(PlaybackController::skip_forward).await??)
    }

    pub async fn skip_backward(&self) -> Result<()> {
        Ok(self.call(PlaybackController::skip_backward).await??)
    }

    pub async fn change_to_next_rate(&self) -> Result<f32> {
        self.call(PlaybackController::change_to_next_rate).await
    }

    // ===== Live Configuration =====

    pub async fn set_rate(&self, rate: f32) -> Result<()> {
        Ok(self.call(move |c| c.set_rate(rate)).await??)
    }

    pub async fn set_playback_rates(&self, rates: Vec<f32>) -> Result<()> {
        Ok(self.call(move |c| c.set_playback_rates(rates)).await??)
    }

    pub async fn set_skip_interval(&self, interval: Duration) -> Result<()> {
        Ok(self.call(move |c| c.set_skip_interval(interval)).await??)
    }

    pub async fn set_progress_interval(&self, interval: Duration) -> Result<()> {
        Ok(self.call(move |c| c.set_progress_interval(interval)).await??)
    }

    pub async fn set_command_mode(&self, mode: RemoteCommandMode) -> Result<()> {
        self.call(move |c| c.set_command_mode(mode)).await
    }

    pub async fn refresh_now_playing(&self) -> Result<()> {
        self.call(PlaybackController::refresh_now_playing).await
    }

    // ===== Remote Commands =====

    /// Run a remote command and report its outcome
    pub async fn remote_command(&self, command: RemoteCommand) -> Result<CommandStatus> {
        self.call(move |c| c.handle_remote_command(command)).await
    }

    /// Fire-and-forget variant for synchronous platform callbacks
    pub fn send_remote_command(&self, command: RemoteCommand) -> Result<()> {
        self.send(Message::Call(Box::new(move |c| {
            let status = c.handle_remote_command(command);
            debug!(?status, "Remote command {:?} handled", command);
        })))
    }

    // ===== Listeners =====

    pub fn add_listener(&self, listener: impl PlaybackListener + 'static) -> Result<()> {
        self.send(Message::AddListener(Box::new(listener)))
    }

    /// Attach the remote surface; it is brought up to date right away
    pub fn set_surface(&self, surface: impl RemoteSurface + 'static) -> Result<()> {
        self.send(Message::SetSurface(Box::new(surface)))
    }

    // ===== State Queries =====

    pub async fn status(&self) -> Result<PlaybackStatus> {
        self.call(|c| c.status()).await
    }

    pub async fn snapshot(&self) -> Result<PlayerSnapshot> {
        self.call(|c| c.snapshot()).await
    }
}
