/// Demo configuration
use crate::error::{DemoError, Result};
use encore_control::SimulatedOptions;
use encore_playback::{PlayerConfig, TrackId};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DemoConfig {
    #[serde(default)]
    pub player: PlayerConfig,

    #[serde(default)]
    pub engine: EngineSettings,

    #[serde(default)]
    pub artwork: ArtworkSettings,
}

/// Behaviour of the simulated engine
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineSettings {
    #[serde(default = "default_track_duration_secs")]
    pub track_duration_secs: u64,

    #[serde(default = "default_load_delay_ms")]
    pub load_delay_ms: u64,

    #[serde(default = "default_seek_delay_ms")]
    pub seek_delay_ms: u64,

    /// Track ids that fail to load
    #[serde(default)]
    pub failing: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtworkSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl DemoConfig {
    /// Load configuration from file and environment
    ///
    /// Without an explicit path an `encore.toml` in the working directory is
    /// used if present. Environment variables prefixed with `ENCORE_` override
    /// file values, with `__` between sections (`ENCORE_PLAYER__SKIP_INTERVAL=30`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        settings = match path {
            Some(path) => settings.add_source(config::File::from(path)),
            None => settings.add_source(config::File::with_name("encore").required(false)),
        };

        settings = settings.add_source(
            config::Environment::with_prefix("ENCORE")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("player.playback_rates")
                .with_list_parse_key("engine.failing")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.player
            .validate()
            .map_err(|e| DemoError::Config(e.to_string()))?;

        if self.engine.track_duration_secs == 0 {
            return Err(DemoError::Config(
                "engine.track_duration_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

impl EngineSettings {
    pub fn simulated_options(&self) -> SimulatedOptions {
        SimulatedOptions {
            track_duration: Duration::from_secs(self.track_duration_secs),
            load_delay: Duration::from_millis(self.load_delay_ms),
            seek_delay: Duration::from_millis(self.seek_delay_ms),
            failing: self.failing.iter().map(TrackId::new).collect(),
        }
    }
}

// Default values
fn default_track_duration_secs() -> u64 {
    180
}

fn default_load_delay_ms() -> u64 {
    300
}

fn default_seek_delay_ms() -> u64 {
    100
}

fn default_enabled() -> bool {
    true
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            track_duration_secs: default_track_duration_secs(),
            load_delay_ms: default_load_delay_ms(),
            seek_delay_ms: default_seek_delay_ms(),
            failing: Vec::new(),
        }
    }
}

impl Default for ArtworkSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
        }
    }
}
