//! Clip tables: weather ambience per condition and the music playlist.

use serde::{Deserialize, Serialize};
use stormrunner_core::error::{validate_duration, validate_unit};
use stormrunner_core::{ClipId, ConfigError};
use stormrunner_weather::WeatherCondition;

/// A looping clip and the gain it settles at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbienceEntry {
    /// Clip to loop.
    pub clip: ClipId,
    /// Target voice gain (0.0 to 1.0).
    pub volume: f32,
}

impl AmbienceEntry {
    /// Build an entry.
    pub fn new(clip: impl Into<String>, volume: f32) -> Self {
        Self {
            clip: ClipId::new(clip),
            volume,
        }
    }
}

/// Condition → ambience loop. `None` means silence.
///
/// Several conditions may share a clip; the bridge then only retargets gain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbienceMap {
    /// Loop for Clear.
    pub clear: Option<AmbienceEntry>,
    /// Loop for LightRain.
    pub light_rain: Option<AmbienceEntry>,
    /// Loop for HeavyRain.
    pub heavy_rain: Option<AmbienceEntry>,
    /// Loop for Storm.
    pub storm: Option<AmbienceEntry>,
}

impl Default for AmbienceMap {
    fn default() -> Self {
        Self {
            clear: None,
            light_rain: Some(AmbienceEntry::new("rain_light", 0.8)),
            heavy_rain: Some(AmbienceEntry::new("rain_heavy", 0.8)),
            storm: Some(AmbienceEntry::new("storm", 0.8)),
        }
    }
}

impl AmbienceMap {
    /// Ambience for `condition`.
    pub fn resolve(&self, condition: WeatherCondition) -> Option<&AmbienceEntry> {
        match condition {
            WeatherCondition::Clear => self.clear.as_ref(),
            WeatherCondition::LightRain => self.light_rain.as_ref(),
            WeatherCondition::HeavyRain => self.heavy_rain.as_ref(),
            WeatherCondition::Storm => self.storm.as_ref(),
        }
    }

    /// Entry volumes must lie in `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for entry in WeatherCondition::ALL.iter().filter_map(|c| self.resolve(*c)) {
            validate_unit("ambience volume", entry.volume)?;
        }
        Ok(())
    }
}

/// Music tracks and their crossfade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicConfig {
    /// Playlist order.
    pub tracks: Vec<ClipId>,
    /// Seconds a track change crossfades.
    pub crossfade: f32,
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self {
            tracks: vec![
                ClipId::new("music_01"),
                ClipId::new("music_02"),
                ClipId::new("music_03"),
            ],
            crossfade: 3.0,
        }
    }
}

impl MusicConfig {
    /// Crossfade must be a valid duration. An empty playlist is allowed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_duration("music crossfade", self.crossfade)?;
        Ok(())
    }
}
