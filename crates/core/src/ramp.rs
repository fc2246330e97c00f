//! Channel-keyed, cancellable interpolation ramps.
//!
//! A [`RampController`] owns at most one active ramp per channel. Starting a
//! ramp on a busy channel drops the previous one on the spot: its callbacks are
//! discarded and it never reports another tick. Every ramp instance carries a
//! unique [`RampGeneration`] so owners can check that a reported tick still
//! belongs to the ramp they started.
//!
//! Progress only moves inside [`RampController::advance`], which the external
//! scheduler calls once per simulation tick.

use crate::easing::{lerp, Easing};
use crate::error::{validate_duration, ConfigError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::trace;

/// Tolerance absorbing accumulated float error in `elapsed`.
const COMPLETION_EPSILON: f32 = 1e-5;

/// Unique id of a started ramp instance.
pub type RampGeneration = u64;

/// Well-known interpolation streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RampChannel {
    /// Weather parameter transition progress.
    WeatherParameters,
    /// Weather ambience crossfade progress.
    WeatherAudioVolume,
    /// Music track crossfade progress.
    MusicCrossfade,
    /// Lightning flash segment sequencing.
    LightFlash,
}

impl RampChannel {
    /// Stable channel name used in logs and event records.
    pub fn name(self) -> &'static str {
        match self {
            RampChannel::WeatherParameters => "weather-parameters",
            RampChannel::WeatherAudioVolume => "weather-audio-volume",
            RampChannel::MusicCrossfade => "music-crossfade",
            RampChannel::LightFlash => "light-flash",
        }
    }
}

/// Parameters of a single ramp.
#[derive(Debug, Clone, Copy)]
pub struct RampSpec {
    /// Start value.
    pub from: f32,
    /// Target value.
    pub to: f32,
    /// Duration in seconds; `0` jumps straight to `to`.
    pub duration: f32,
    /// Progress curve.
    pub easing: Easing,
}

impl RampSpec {
    /// Build a ramp description.
    pub fn new(from: f32, to: f32, duration: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            easing,
        }
    }

    /// Linear ramp shorthand.
    pub fn linear(from: f32, to: f32, duration: f32) -> Self {
        Self::new(from, to, duration, Easing::Linear)
    }

    /// Reject negative/NaN durations and non-finite endpoints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_duration("ramp duration", self.duration)?;
        for (name, value) in [("ramp start", self.from), ("ramp target", self.to)] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { name, value });
            }
        }
        Ok(())
    }

    /// Sample the ramp after `elapsed` seconds: `(value, progress, completed)`.
    fn sample(&self, elapsed: f32) -> (f32, f32, bool) {
        if self.duration <= 0.0 || elapsed + COMPLETION_EPSILON >= self.duration {
            return (self.to, 1.0, true);
        }
        let progress = (elapsed / self.duration).clamp(0.0, 1.0);
        (
            lerp(self.from, self.to, self.easing.apply(progress)),
            progress,
            false,
        )
    }
}

/// Value reported by a live ramp during [`RampController::advance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampTick<C> {
    /// Channel the ramp runs on.
    pub channel: C,
    /// Generation of the ramp that produced this tick.
    pub generation: RampGeneration,
    /// Interpolated value (exactly `to` once completed).
    pub value: f32,
    /// Linear progress in `[0, 1]`.
    pub progress: f32,
    /// Whether this is the final tick of the ramp.
    pub completed: bool,
}

type TickCallback = Box<dyn FnMut(f32)>;
type CompleteCallback = Box<dyn FnOnce()>;

struct ActiveRamp {
    generation: RampGeneration,
    spec: RampSpec,
    elapsed: f32,
    value: f32,
    on_tick: Option<TickCallback>,
    on_complete: Option<CompleteCallback>,
}

/// Owner of the live ramp on each channel.
pub struct RampController<C> {
    ramps: BTreeMap<C, ActiveRamp>,
    next_generation: RampGeneration,
}

impl<C: Ord + Copy + fmt::Debug> RampController<C> {
    /// Create a controller with no active ramps.
    pub fn new() -> Self {
        Self {
            ramps: BTreeMap::new(),
            next_generation: 0,
        }
    }

    /// Start a ramp on `channel`, superseding any ramp already running there.
    ///
    /// The `RampSpec` is validated before anything is touched, so a rejected ramp
    /// leaves the previous one running.
    pub fn start(&mut self, channel: C, spec: RampSpec) -> Result<RampGeneration, ConfigError> {
        self.insert(channel, spec, None, None)
    }

    /// Start a ramp that reports through callbacks.
    ///
    /// `on_tick` receives the interpolated value every advance; `on_complete`
    /// runs exactly once after the final tick, and never if the ramp is
    /// superseded or cancelled first.
    pub fn start_with_callbacks<T, F>(
        &mut self,
        channel: C,
        spec: RampSpec,
        on_tick: T,
        on_complete: F,
    ) -> Result<RampGeneration, ConfigError>
    where
        T: FnMut(f32) + 'static,
        F: FnOnce() + 'static,
    {
        self.insert(
            channel,
            spec,
            Some(Box::new(on_tick)),
            Some(Box::new(on_complete)),
        )
    }

    fn insert(
        &mut self,
        channel: C,
        spec: RampSpec,
        on_tick: Option<TickCallback>,
        on_complete: Option<CompleteCallback>,
    ) -> Result<RampGeneration, ConfigError> {
        spec.validate()?;
        self.next_generation += 1;
        let generation = self.next_generation;
        let ramp = ActiveRamp {
            generation,
            spec,
            elapsed: 0.0,
            value: spec.from,
            on_tick,
            on_complete,
        };
        if let Some(previous) = self.ramps.insert(channel, ramp) {
            trace!(
                ?channel,
                superseded = previous.generation,
                generation,
                "ramp superseded"
            );
        }
        Ok(generation)
    }

    /// Cancel the ramp on `channel` without invoking its completion callback.
    pub fn cancel(&mut self, channel: C) -> bool {
        self.ramps.remove(&channel).is_some()
    }

    /// Cancel every active ramp.
    pub fn cancel_all(&mut self) {
        self.ramps.clear();
    }

    /// Whether a ramp is running on `channel`.
    pub fn is_active(&self, channel: C) -> bool {
        self.ramps.contains_key(&channel)
    }

    /// Latest interpolated value on `channel`.
    pub fn value(&self, channel: C) -> Option<f32> {
        self.ramps.get(&channel).map(|ramp| ramp.value)
    }

    /// Generation of the live ramp on `channel`.
    pub fn generation(&self, channel: C) -> Option<RampGeneration> {
        self.ramps.get(&channel).map(|ramp| ramp.generation)
    }

    /// Number of channels with a live ramp.
    pub fn active_count(&self) -> usize {
        self.ramps.len()
    }

    /// Advance every live ramp by `dt` seconds.
    ///
    /// Non-finite or negative `dt` counts as zero. Completed ramps are removed
    /// after their final tick. Ticks are returned in channel order.
    pub fn advance(&mut self, dt: f32) -> Vec<RampTick<C>> {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        let mut ticks = Vec::with_capacity(self.ramps.len());

        // Superseded ramps were already dropped from the map, so every
        // callback below belongs to its channel's live generation.
        self.ramps.retain(|&channel, ramp| {
            ramp.elapsed += dt;
            let (value, progress, completed) = ramp.spec.sample(ramp.elapsed);
            ramp.value = value;

            if let Some(on_tick) = ramp.on_tick.as_mut() {
                on_tick(value);
            }
            if completed {
                if let Some(on_complete) = ramp.on_complete.take() {
                    on_complete();
                }
            }

            ticks.push(RampTick {
                channel,
                generation: ramp.generation,
                value,
                progress,
                completed,
            });
            !completed
        });

        ticks
    }
}

impl<C: Ord + Copy + fmt::Debug> Default for RampController<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: fmt::Debug> fmt::Debug for RampController<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (channel, ramp) in &self.ramps {
            map.entry(channel, &(ramp.generation, ramp.value));
        }
        map.finish()
    }
}
