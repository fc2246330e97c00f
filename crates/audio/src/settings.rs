//! Mixer group volume controls.

use serde::{Deserialize, Serialize};
use std::fmt;
use stormrunner_core::error::validate_unit;
use stormrunner_core::ConfigError;

/// Output group a voice is mixed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixerGroup {
    /// Background music.
    Music,
    /// One-shot effects (thunder).
    Sfx,
    /// Procedural wind/rain beds.
    Ambient,
    /// Weather ambience loops.
    Weather,
}

impl MixerGroup {
    /// Every group.
    pub const ALL: [MixerGroup; 4] = [
        MixerGroup::Music,
        MixerGroup::Sfx,
        MixerGroup::Ambient,
        MixerGroup::Weather,
    ];

    /// Stable lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            MixerGroup::Music => "music",
            MixerGroup::Sfx => "sfx",
            MixerGroup::Ambient => "ambient",
            MixerGroup::Weather => "weather",
        }
    }
}

impl fmt::Display for MixerGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Audio volume settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Master volume (0.0 to 1.0)
    pub master: f32,
    /// Music volume (0.0 to 1.0)
    pub music: f32,
    /// Sound effects volume (0.0 to 1.0)
    pub sfx: f32,
    /// Ambient bed volume (0.0 to 1.0)
    pub ambient: f32,
    /// Weather ambience volume (0.0 to 1.0)
    pub weather: f32,
    /// Whether audio is muted
    pub muted: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master: 1.0,
            music: 0.7,
            sfx: 1.0,
            ambient: 0.5,
            weather: 0.8,
            muted: false,
        }
    }
}

impl AudioSettings {
    /// Create new audio settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Volume of `group` before master and mute.
    pub fn group_volume(&self, group: MixerGroup) -> f32 {
        match group {
            MixerGroup::Music => self.music,
            MixerGroup::Sfx => self.sfx,
            MixerGroup::Ambient => self.ambient,
            MixerGroup::Weather => self.weather,
        }
    }

    /// Get the effective volume of `group` (master * group, zero when muted).
    pub fn effective_volume(&self, group: MixerGroup) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master * self.group_volume(group)
        }
    }

    /// Set the volume of `group` (clamped to 0.0-1.0).
    pub fn set_group(&mut self, group: MixerGroup, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        match group {
            MixerGroup::Music => self.music = volume,
            MixerGroup::Sfx => self.sfx = volume,
            MixerGroup::Ambient => self.ambient = volume,
            MixerGroup::Weather => self.weather = volume,
        }
    }

    /// Set master volume (clamped to 0.0-1.0).
    pub fn set_master(&mut self, volume: f32) {
        self.master = volume.clamp(0.0, 1.0);
    }

    /// Toggle mute state.
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Every volume must lie in `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_unit("master volume", self.master)?;
        validate_unit("music volume", self.music)?;
        validate_unit("sfx volume", self.sfx)?;
        validate_unit("ambient volume", self.ambient)?;
        validate_unit("weather volume", self.weather)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AudioSettings::default();
        assert_eq!(settings.master, 1.0);
        assert_eq!(settings.music, 0.7);
        assert_eq!(settings.ambient, 0.5);
        assert_eq!(settings.weather, 0.8);
        assert!(!settings.muted);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_effective_volumes() {
        let settings = AudioSettings {
            master: 0.5,
            music: 0.8,
            sfx: 0.6,
            ..Default::default()
        };

        assert!((settings.effective_volume(MixerGroup::Music) - 0.4).abs() < 0.001);
        assert!((settings.effective_volume(MixerGroup::Sfx) - 0.3).abs() < 0.001);
        assert!((settings.effective_volume(MixerGroup::Weather) - 0.4).abs() < 0.001);
    }

    #[test]
    fn test_mute() {
        let mut settings = AudioSettings::default();
        settings.toggle_mute();
        for group in MixerGroup::ALL {
            assert_eq!(settings.effective_volume(group), 0.0);
        }

        settings.toggle_mute();
        assert!(settings.effective_volume(MixerGroup::Music) > 0.0);
    }

    #[test]
    fn test_volume_clamping() {
        let mut settings = AudioSettings::default();
        settings.set_master(1.5);
        assert_eq!(settings.master, 1.0);

        settings.set_group(MixerGroup::Music, -0.5);
        assert_eq!(settings.music, 0.0);
    }

    #[test]
    fn out_of_range_volume_is_rejected() {
        let settings = AudioSettings {
            weather: 1.2,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
