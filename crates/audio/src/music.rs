//! Background music with crossfading track changes.
//!
//! Track changes are explicit; nothing advances the playlist on its own.

use crate::mixer::{CrossfadeMixer, Voice};
use crate::sounds::MusicConfig;
use stormrunner_core::{ClipId, ConfigError, RampChannel};
use tracing::debug;

/// Playlist player fading on [`RampChannel::MusicCrossfade`].
#[derive(Debug)]
pub struct MusicPlayer {
    tracks: Vec<ClipId>,
    crossfade: f32,
    mixer: CrossfadeMixer,
    current: Option<usize>,
}

impl MusicPlayer {
    /// Validate `config` and start silent.
    pub fn new(config: &MusicConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            tracks: config.tracks.clone(),
            crossfade: config.crossfade,
            mixer: CrossfadeMixer::new(RampChannel::MusicCrossfade),
            current: None,
        })
    }

    /// Crossfade to track `index`.
    pub fn play_track(&mut self, index: usize) -> Result<&ClipId, ConfigError> {
        let Some(track) = self.tracks.get(index) else {
            return Err(ConfigError::IndexOutOfRange {
                name: "music track",
                index,
                len: self.tracks.len(),
            });
        };
        self.mixer.fade_to(Some((track, 1.0)), self.crossfade)?;
        self.current = Some(index);
        debug!(index, track = %track, "music track change");
        Ok(track)
    }

    /// Crossfade to the following track, wrapping around. `None` with an empty playlist.
    pub fn next_track(&mut self) -> Result<Option<&ClipId>, ConfigError> {
        if self.tracks.is_empty() {
            return Ok(None);
        }
        let next = self.current.map_or(0, |i| (i + 1) % self.tracks.len());
        self.play_track(next).map(Some)
    }

    /// Crossfade to the preceding track, wrapping around.
    pub fn previous_track(&mut self) -> Result<Option<&ClipId>, ConfigError> {
        let len = self.tracks.len();
        if len == 0 {
            return Ok(None);
        }
        let previous = self.current.map_or(len - 1, |i| (i + len - 1) % len);
        self.play_track(previous).map(Some)
    }

    /// Fade everything out.
    pub fn stop(&mut self) -> Result<(), ConfigError> {
        self.mixer.fade_to(None, self.crossfade)?;
        self.current = None;
        Ok(())
    }

    /// Step the crossfade.
    pub fn advance(&mut self, dt: f32) {
        self.mixer.advance(dt);
    }

    /// Index of the selected track.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Selected track.
    pub fn current_track(&self) -> Option<&ClipId> {
        self.current.and_then(|i| self.tracks.get(i))
    }

    /// Playlist length.
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Current music voices.
    pub fn voices(&self) -> Vec<Voice> {
        self.mixer.voices()
    }
}
