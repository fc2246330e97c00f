#![warn(missing_docs)]
//! Weather-reactive audio for stormrunner.
//!
//! Mixes weather ambience, music and thunder one-shots. Uses rodio for
//! cross-platform output when the `rodio_backend` feature is enabled.
//!
//! # Architecture
//!
//! - [`AudioReactionBridge`] - crossfades the weather ambience on condition changes
//! - [`MusicPlayer`] - playlist with crossfading track changes
//! - [`CrossfadeMixer`] - voices faded together by one ramp
//! - [`AudioManager`] - clip cache, one-shots and looped voices
//! - [`AudioSettings`] - Volume controls per [`MixerGroup`]
//!
//! # Example
//!
//! ```ignore
//! let mut bridge = AudioReactionBridge::new(AmbienceMap::default(), 2.0)?;
//! bridge.on_condition_changed(&WeatherChanged::new(Clear, Storm))?;
//! bridge.advance(dt);
//! audio.sync_loops(MixerGroup::Weather, &bridge.voices());
//! ```

mod bridge;
mod config;
mod manager;
mod mixer;
mod music;
mod settings;
mod sounds;

pub use bridge::{AudioReaction, AudioReactionBridge};
pub use config::AudioConfig;
pub use manager::AudioManager;
pub use mixer::{CrossfadeMixer, Voice};
pub use music::MusicPlayer;
pub use settings::{AudioSettings, MixerGroup};
pub use sounds::{AmbienceEntry, AmbienceMap, MusicConfig};
