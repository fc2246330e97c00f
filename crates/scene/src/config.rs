//! Scene-level configuration.

use serde::{Deserialize, Serialize};
use stormrunner_audio::AudioConfig;
use stormrunner_core::{ClipId, ConfigError};
use stormrunner_weather::WeatherConfig;

/// Everything the atmosphere needs at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtmosphereConfig {
    /// Weather simulation tuning.
    pub weather: WeatherConfig,
    /// Mixer, ambience and music tuning.
    pub audio: AudioConfig,
    /// Loop played under the wind level.
    pub wind_clip: ClipId,
    /// Start the first playlist track on construction.
    pub autoplay_music: bool,
}

impl Default for AtmosphereConfig {
    fn default() -> Self {
        Self {
            weather: WeatherConfig::default(),
            audio: AudioConfig::default(),
            wind_clip: ClipId::new("wind"),
            autoplay_music: true,
        }
    }
}

impl AtmosphereConfig {
    /// Validate weather and audio sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weather.validate()?;
        self.audio.validate()
    }
}
