#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod easing;
pub mod error;
pub mod ramp;

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export commonly used types
pub use easing::{lerp, smoothstep, Easing};
pub use error::ConfigError;
pub use ramp::{RampChannel, RampController, RampGeneration, RampSpec, RampTick};

/// Fixed tick type (20 TPS => 50 ms per tick).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTick(pub u64);

impl SimTick {
    /// First tick in any deterministic timeline.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }
}

/// Default simulation rate.
pub const TICKS_PER_SECOND: u32 = 20;

/// Seconds covered by one tick at [`TICKS_PER_SECOND`].
pub const TICK_SECONDS: f32 = 1.0 / TICKS_PER_SECOND as f32;

/// Random stream domain for the lightning strike scheduler.
pub const LIGHTNING_DOMAIN: u64 = 0x4C49_4748_544E_494E;
/// Random stream domain for the weather cycle scheduler.
pub const CYCLE_DOMAIN: u64 = 0x4359_434C_4500_0001;
/// Random stream domain for camera shake offsets.
pub const SHAKE_DOMAIN: u64 = 0x5348_414B_4500_0002;

/// Helper to derive a reproducible RNG seeded by a base seed and a component domain.
pub fn domain_rng(seed: u64, domain: u64) -> StdRng {
    let mixed = seed ^ domain.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    StdRng::seed_from_u64(mixed)
}

/// Uniform random draws used by the randomized schedulers.
///
/// Every scheduler in the workspace is generic over this trait so tests can
/// substitute a scripted sequence of draws.
pub trait RandomSource {
    /// Next uniform draw in `[0, 1)`.
    fn next_unit(&mut self) -> f32;

    /// Uniform draw in `[min, max]`.
    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_unit()
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick_index(&mut self, len: usize) -> usize {
        let scaled = (self.next_unit() * len as f32) as usize;
        scaled.min(len.saturating_sub(1))
    }
}

impl RandomSource for StdRng {
    fn next_unit(&mut self) -> f32 {
        self.gen::<f32>()
    }
}

/// Identifier of an audio clip (ambience loop, thunder one-shot, music track).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipId(pub String);

impl ClipId {
    /// Build a clip id from anything string-like.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the raw name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClipId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
