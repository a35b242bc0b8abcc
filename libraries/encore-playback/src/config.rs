//! Player configuration

use crate::error::{PlaybackError, Result};
use crate::types::RemoteCommandMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Rate the player falls back to when the current rate is not selectable
pub const DEFAULT_RATE: f32 = 1.0;

/// Configuration for the playback controller
///
/// Every field can also be changed live on the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Rate used by `play` (default: 1.0)
    #[serde(default = "default_rate")]
    pub initial_rate: f32,

    /// Rates cycled by `change_to_next_rate`
    #[serde(default = "default_playback_rates")]
    pub playback_rates: Vec<f32>,

    /// Skip forward/backward distance (default: 15s)
    #[serde(default = "default_skip_interval", with = "secs")]
    pub skip_interval: Duration,

    /// Period of the progress tick while playing (default: 1s)
    #[serde(default = "default_progress_interval", with = "secs")]
    pub progress_interval: Duration,

    /// Remote affordances offered (default: skip)
    #[serde(default)]
    pub command_mode: RemoteCommandMode,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            initial_rate: default_rate(),
            playback_rates: default_playback_rates(),
            skip_interval: default_skip_interval(),
            progress_interval: default_progress_interval(),
            command_mode: RemoteCommandMode::default(),
        }
    }
}

impl PlayerConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        validate_rate(self.initial_rate)?;
        validate_rates(&self.playback_rates)?;

        if self.skip_interval.is_zero() {
            return Err(PlaybackError::InvalidConfig(
                "skip_interval must be greater than zero".to_string(),
            ));
        }

        if self.progress_interval.is_zero() {
            return Err(PlaybackError::InvalidConfig(
                "progress_interval must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

pub(crate) fn validate_rate(rate: f32) -> Result<()> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(PlaybackError::InvalidConfig(format!(
            "playback rate must be positive, got {}",
            rate
        )))
    }
}

pub(crate) fn validate_rates(rates: &[f32]) -> Result<()> {
    if rates.is_empty() {
        return Err(PlaybackError::InvalidConfig(
            "playback_rates must not be empty".to_string(),
        ));
    }
    rates.iter().try_for_each(|rate| validate_rate(*rate))
}

// Default values
fn default_rate() -> f32 {
    DEFAULT_RATE
}

fn default_playback_rates() -> Vec<f32> {
    vec![0.5, 0.75, 1.0, 1.25, 1.5, 2.0]
}

fn default_skip_interval() -> Duration {
    Duration::from_secs(15)
}

fn default_progress_interval() -> Duration {
    Duration::from_secs(1)
}

/// Durations as floating point seconds
pub(crate) mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let seconds = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(seconds).map_err(serde::de::Error::custom)
    }
}

/// Optional durations as floating point seconds
pub(crate) mod opt_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&duration.as_secs_f64()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<f64>::deserialize(deserializer)?
            .map(|seconds| Duration::try_from_secs_f64(seconds).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlayerConfig::default();
        assert_eq!(config.initial_rate, 1.0);
        assert_eq!(config.playback_rates, vec![0.5, 0.75, 1.0, 1.25, 1.5, 2.0]);
        assert_eq!(config.skip_interval, Duration::from_secs(15));
        assert_eq!(config.progress_interval, Duration::from_secs(1));
        assert_eq!(config.command_mode, RemoteCommandMode::Skip);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: PlayerConfig =
            serde_json::from_str(r#"{"skip_interval": 30, "command_mode": "nextPrevious"}"#)
                .unwrap();
        assert_eq!(config.skip_interval, Duration::from_secs(30));
        assert_eq!(config.command_mode, RemoteCommandMode::NextPrevious);
        assert_eq!(config.progress_interval, Duration::from_secs(1));
        assert_eq!(config.playback_rates.len(), 6);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let empty_rates = PlayerConfig {
            playback_rates: vec![],
            ..Default::default()
        };
        assert!(matches!(
            empty_rates.validate(),
            Err(PlaybackError::InvalidConfig(_))
        ));

        let negative_rate = PlayerConfig {
            playback_rates: vec![1.0, -2.0],
            ..Default::default()
        };
        assert!(negative_rate.validate().is_err());

        let zero_skip = PlayerConfig {
            skip_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(zero_skip.validate().is_err());

        let nan_rate = PlayerConfig {
            initial_rate: f32::NAN,
            ..Default::default()
        };
        assert!(nan_rate.validate().is_err());
    }
}
