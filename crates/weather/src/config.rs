//! Static tuning supplied at initialization.
//!
//! Every struct deserializes with `#[serde(default)]`, so a partial config
//! file only overrides what it names. Call [`WeatherConfig::validate`] (the
//! component constructors do) before use.

use crate::condition::{EffectParameterTable, WeatherCondition};
use crate::effects::SkyTint;
use serde::{Deserialize, Serialize};
use stormrunner_core::error::{
    validate_duration, validate_non_negative, validate_range, validate_unit,
};
use stormrunner_core::{ClipId, ConfigError};

/// Top-level weather tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Condition the simulation starts in (at rest).
    pub initial_condition: WeatherCondition,
    /// Seconds a condition transition takes.
    pub transition_duration: f32,
    /// Condition → target intensities.
    pub table: EffectParameterTable,
    /// Lightning strike scheduling.
    pub lightning: LightningConfig,
    /// Random weather cycling.
    pub cycle: CycleConfig,
    /// Sky colors blended by rain intensity.
    pub sky: SkyTint,
    /// Rate at which ambient light chases its weather target (per second).
    pub light_response: f32,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            initial_condition: WeatherCondition::Clear,
            transition_duration: 5.0,
            table: EffectParameterTable::STANDARD,
            lightning: LightningConfig::default(),
            cycle: CycleConfig::default(),
            sky: SkyTint::default(),
            light_response: 2.0,
        }
    }
}

impl WeatherConfig {
    /// Validate every nested section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_duration("transition_duration", self.transition_duration)?;
        validate_non_negative("light_response", self.light_response)?;
        self.table.validate()?;
        self.lightning.validate()?;
        self.cycle.validate()?;
        Ok(())
    }
}

/// Lightning strike tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightningConfig {
    /// Shortest wait between strikes (seconds, > 0).
    pub min_wait: f32,
    /// Longest wait between strikes (seconds).
    pub max_wait: f32,
    /// Thunder clips; one is picked uniformly per strike.
    pub thunder_clips: Vec<ClipId>,
    /// Camera shake strength requested per strike.
    pub camera_shake_intensity: f32,
    /// Camera shake length requested per strike (seconds).
    pub camera_shake_duration: f32,
    /// Flash curve shape.
    pub flash: FlashConfig,
}

impl Default for LightningConfig {
    fn default() -> Self {
        Self {
            min_wait: 2.0,
            max_wait: 8.0,
            thunder_clips: vec![
                ClipId::new("thunder_01"),
                ClipId::new("thunder_02"),
                ClipId::new("thunder_03"),
            ],
            camera_shake_intensity: 0.5,
            camera_shake_duration: 0.5,
            flash: FlashConfig::default(),
        }
    }
}

impl LightningConfig {
    /// Validate waits, clip set, shake and flash values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_range("lightning wait", self.min_wait, self.max_wait)?;
        if self.thunder_clips.is_empty() {
            return Err(ConfigError::EmptySet {
                name: "thunder_clips",
            });
        }
        validate_non_negative("camera_shake_intensity", self.camera_shake_intensity)?;
        validate_duration("camera_shake_duration", self.camera_shake_duration)?;
        self.flash.validate()
    }
}

/// Double-flash light spike.
///
/// A bright strike, a dark gap, then a dimmer echo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashConfig {
    /// Light intensity of the main strike.
    pub peak_intensity: f32,
    /// Seconds the main strike is lit.
    pub peak_duration: f32,
    /// Seconds of darkness between strike and echo.
    pub gap_duration: f32,
    /// Light intensity of the echo.
    pub echo_intensity: f32,
    /// Seconds the echo is lit.
    pub echo_duration: f32,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            peak_intensity: 3.0,
            peak_duration: 0.1,
            gap_duration: 0.1,
            echo_intensity: 2.0,
            echo_duration: 0.05,
        }
    }
}

impl FlashConfig {
    /// Intensities must be non-negative, durations valid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_non_negative("flash peak_intensity", self.peak_intensity)?;
        validate_non_negative("flash echo_intensity", self.echo_intensity)?;
        validate_duration("flash peak_duration", self.peak_duration)?;
        validate_duration("flash gap_duration", self.gap_duration)?;
        validate_duration("flash echo_duration", self.echo_duration)?;
        Ok(())
    }
}

/// Random weather cycling tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// Whether the driver runs at all.
    pub enabled: bool,
    /// Shortest wait between requests (seconds, > 0).
    pub min_interval: f32,
    /// Longest wait between requests (seconds).
    pub max_interval: f32,
    /// Chance a request picks a storm-family condition instead of Clear.
    pub storm_probability: f32,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_interval: 30.0,
            max_interval: 120.0,
            storm_probability: 0.3,
        }
    }
}

impl CycleConfig {
    /// Validate the interval range and probability.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_range("cycle interval", self.min_interval, self.max_interval)?;
        validate_unit("storm_probability", self.storm_probability)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(WeatherConfig::default().validate().is_ok());
    }

    #[test]
    fn negative_transition_duration_is_rejected() {
        let config = WeatherConfig {
            transition_duration: -5.0,
            ..WeatherConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDuration {
                name: "transition_duration",
                ..
            })
        ));
    }

    #[test]
    fn empty_thunder_set_is_rejected() {
        let mut config = WeatherConfig::default();
        config.lightning.thunder_clips.clear();
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptySet {
                name: "thunder_clips"
            })
        );
    }

    #[test]
    fn inverted_wait_range_is_rejected() {
        let mut config = WeatherConfig::default();
        config.lightning.min_wait = 9.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange { .. })
        ));
    }

    #[test]
    fn probability_above_one_is_rejected() {
        let mut config = WeatherConfig::default();
        config.cycle.storm_probability = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: WeatherConfig =
            serde_json::from_str(r#"{ "transition_duration": 3.0, "cycle": { "enabled": false } }"#)
                .expect("partial config parses");
        assert_eq!(config.transition_duration, 3.0);
        assert!(!config.cycle.enabled);
        assert_eq!(config.cycle.storm_probability, 0.3);
        assert_eq!(config.lightning.thunder_clips.len(), 3);
    }
}
