//! Encore Demo Library
//!
//! Console player driving the Encore control loop with a simulated engine.
//!
//! This library exposes configuration, playlist and command handling for testing.

pub mod config;
pub mod console;
pub mod error;
pub mod output;
pub mod playlist;

pub use error::{DemoError, Result};
