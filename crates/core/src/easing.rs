//! Easing curves mapping normalized progress to eased progress.

use serde::{Deserialize, Serialize};

/// Pluggable easing function.
///
/// All variants map `[0, 1]` onto `[0, 1]`; inputs outside the unit interval
/// are clamped first so a ramp can never overshoot its endpoints.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant-rate interpolation.
    #[default]
    Linear,
    /// Hermite smoothstep, `t² (3 − 2t)`.
    SmoothStep,
    /// Caller-supplied curve. Not representable in config files.
    #[serde(skip)]
    Custom(fn(f32) -> f32),
}

impl Easing {
    /// Map progress `t` to eased progress.
    pub fn apply(self, t: f32) -> f32 {
        let t = clamp_unit(t);
        match self {
            Easing::Linear => t,
            Easing::SmoothStep => smoothstep(t),
            Easing::Custom(curve) => clamp_unit(curve(t)),
        }
    }
}

/// Hermite smoothstep on `[0, 1]`.
pub fn smoothstep(t: f32) -> f32 {
    let t = clamp_unit(t);
    t * t * (3.0 - 2.0 * t)
}

/// Linear interpolation from `a` to `b`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn clamp_unit(t: f32) -> f32 {
    if t.is_nan() {
        0.0
    } else {
        t.clamp(0.0, 1.0)
    }
}
