//! Encore - Async Playback Control
//!
//! Runs an [`encore_playback::PlaybackController`] on a tokio task and
//! exposes it through a cloneable [`PlayerHandle`].
//!
//! This crate provides:
//! - [`ControlLoop`]: single-task owner of the controller, the progress tick
//!   and the listener fan-out
//! - [`PlayerHandle`]: request/reply access from any task
//! - [`ArtworkLoader`]: background cover art retrieval (HTTP and local files)
//! - [`SimulatedEngine`]: a timer-driven engine for demos and tests
//!
//! # Example
//!
//! ```rust,no_run
//! use encore_control::{ControlLoop, SimulatedEngine, SimulatedOptions};
//! use encore_playback::{MediaEngine, PlayerConfig, TrackInfo};
//!
//! # async fn example() -> encore_control::Result<()> {
//! let factory = || Box::new(SimulatedEngine::new(SimulatedOptions::default())) as Box<dyn MediaEngine>;
//! let (control, player) = ControlLoop::new(PlayerConfig::default(), factory)?;
//! let task = control.spawn();
//!
//! player
//!     .setup(
//!         vec![TrackInfo::new("intro", "https://cdn.example.com/intro.mp3", "Intro", "Demo")],
//!         0,
//!         true,
//!     )
//!     .await?;
//! println!("{:?}", player.snapshot().await?);
//!
//! player.shutdown()?;
//! let _ = task.await;
//! # Ok(())
//! # }
//! ```

mod artwork;
mod error;
mod handle;
mod player;
mod simulated;

pub use artwork::{ArtworkLoader, HttpArtworkLoader};
pub use error::{ArtworkError, ControlError, Result};
pub use handle::PlayerHandle;
pub use player::{ControlLoop, MIN_PROGRESS_INTERVAL};
pub use simulated::{SimulatedEngine, SimulatedOptions};
