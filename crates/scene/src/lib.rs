//! Scene wiring for the weather simulation.
//!
//! [`Atmosphere`] owns the weather state machine, the random cycle, the
//! ambience bridge, the music playlist, the directional light and the audio
//! output, and steps them in a fixed order every tick:
//!
//! 1. random cycle requests
//! 2. weather transition and lightning
//! 3. ambience crossfade
//! 4. light level, then per-strike flash, thunder and camera shake
//! 5. music crossfade
//! 6. loop reconciliation on the audio output

#![warn(missing_docs)]

mod atmosphere;
mod config;

pub use atmosphere::{Atmosphere, AtmosphereFrame};
pub use config::AtmosphereConfig;
