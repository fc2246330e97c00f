#![warn(missing_docs)]
//! Weather simulation for stormrunner.
//!
//! Tracks a discrete [`WeatherCondition`], interpolates the continuous
//! [`WeatherParameters`] between conditions, schedules lightning during
//! storms and cycles the weather at random intervals.
//!
//! # Architecture
//!
//! - [`WeatherStateMachine`] - sole owner of the current condition and parameters
//! - [`LightningEventGenerator`] - wait-then-strike loop, run by the machine while Storm is active
//! - [`WeatherCycleDriver`] - random change requests fed to the machine
//! - [`AmbientLight`] and the other `effects` outputs - values read by rendering
//!
//! Everything advances from one `advance(dt)` call per simulation tick.

pub mod condition;
pub mod config;
pub mod cycle;
pub mod effects;
pub mod events;
pub mod lightning;
pub mod machine;

pub use condition::{EffectParameterTable, WeatherChanged, WeatherCondition, WeatherParameters};
pub use config::{CycleConfig, FlashConfig, LightningConfig, WeatherConfig};
pub use cycle::WeatherCycleDriver;
pub use effects::{AmbienceLevels, AmbientLight, EffectOutputs, RainEmission, SkyTint};
pub use events::{Subscribers, SubscriptionId};
pub use lightning::{
    CameraShakeSink, FlashProfile, FlashSegment, LightningEvent, LightningEventGenerator,
    LightningState,
};
pub use machine::{MachineStep, TransitionState, WeatherStateMachine};
