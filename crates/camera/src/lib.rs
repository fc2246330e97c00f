#![warn(missing_docs)]
//! Camera shake driven by lightning strikes.
//!
//! The camera rig itself lives elsewhere; this crate only turns shake
//! requests into a per-tick positional offset to add to the rig's follow
//! offset.

use glam::Vec3;
use rand::rngs::StdRng;
use std::fmt;
use stormrunner_core::{domain_rng, RandomSource, SHAKE_DOMAIN};
use stormrunner_weather::CameraShakeSink;
use tracing::debug;

/// Remaining time below which a shake counts as finished.
const EXPIRY_EPSILON: f32 = 1e-5;

/// Attempts at rejection-sampling a point in the unit ball before falling back.
const UNIT_BALL_ATTEMPTS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
struct ActiveShake {
    intensity: f32,
    remaining: f32,
}

/// Shake accumulator.
///
/// Overlapping requests run side by side; the strongest one that is still
/// running sets the offset magnitude.
pub struct CameraShake<R = StdRng> {
    rng: R,
    shakes: Vec<ActiveShake>,
    offset: Vec3,
    requests: u64,
}

impl CameraShake<StdRng> {
    /// Shake drawing from the camera stream of `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::new(domain_rng(seed, SHAKE_DOMAIN))
    }
}

impl<R: RandomSource> CameraShake<R> {
    /// Idle shake.
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            shakes: Vec::new(),
            offset: Vec3::ZERO,
            requests: 0,
        }
    }

    /// Queue a shake of `intensity` for `duration` seconds.
    ///
    /// Non-finite or non-positive values are ignored.
    pub fn request(&mut self, intensity: f32, duration: f32) {
        if !(intensity.is_finite() && duration.is_finite() && intensity > 0.0 && duration > 0.0) {
            debug!(intensity, duration, "ignoring degenerate camera shake");
            return;
        }
        self.requests += 1;
        self.shakes.push(ActiveShake {
            intensity,
            remaining: duration,
        });
    }

    /// Whether any shake is running.
    pub fn is_shaking(&self) -> bool {
        !self.shakes.is_empty()
    }

    /// Shake requests accepted so far.
    pub fn requests(&self) -> u64 {
        self.requests
    }

    /// Offset produced by the last [`CameraShake::advance`].
    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    /// `base` displaced by the current offset.
    pub fn apply_to(&self, base: Vec3) -> Vec3 {
        base + self.offset
    }

    /// Draw this tick's offset, then age every shake by `dt`.
    pub fn advance(&mut self, dt: f32) -> Vec3 {
        let strongest = self
            .shakes
            .iter()
            .map(|s| s.intensity)
            .fold(0.0f32, f32::max);
        self.offset = if strongest > 0.0 {
            self.unit_ball_point() * strongest
        } else {
            Vec3::ZERO
        };

        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        for shake in &mut self.shakes {
            shake.remaining -= dt;
        }
        self.shakes.retain(|s| s.remaining > EXPIRY_EPSILON);
        self.offset
    }

    fn unit_ball_point(&mut self) -> Vec3 {
        for _ in 0..UNIT_BALL_ATTEMPTS {
            let p = Vec3::new(
                self.rng.range(-1.0, 1.0),
                self.rng.range(-1.0, 1.0),
                self.rng.range(-1.0, 1.0),
            );
            if p.length_squared() <= 1.0 {
                return p;
            }
        }
        Vec3::ZERO
    }
}

impl<R: RandomSource> CameraShakeSink for CameraShake<R> {
    fn shake(&mut self, intensity: f32, duration: f32) {
        self.request(intensity, duration);
    }
}

impl<R> fmt::Debug for CameraShake<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraShake")
            .field("shakes", &self.shakes)
            .field("offset", &self.offset)
            .field("requests", &self.requests)
            .finish()
    }
}
