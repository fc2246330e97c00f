//! Audio tuning supplied at initialization.

use crate::settings::AudioSettings;
use crate::sounds::{AmbienceMap, MusicConfig};
use serde::{Deserialize, Serialize};
use stormrunner_core::error::validate_duration;
use stormrunner_core::ConfigError;

/// Mixer volumes, ambience mapping and music playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Mixer group volumes.
    pub settings: AudioSettings,
    /// Condition → ambience loop.
    pub ambience: AmbienceMap,
    /// Seconds an ambience crossfade takes.
    pub ambience_crossfade: f32,
    /// Playlist and crossfade.
    pub music: MusicConfig,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            settings: AudioSettings::default(),
            ambience: AmbienceMap::default(),
            ambience_crossfade: 2.0,
            music: MusicConfig::default(),
        }
    }
}

impl AudioConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.settings.validate()?;
        self.ambience.validate()?;
        validate_duration("ambience crossfade", self.ambience_crossfade)?;
        self.music.validate()
    }
}
