//! Effect values derived from the current weather parameters.
//!
//! These are what rendering and audio sinks read each tick. Everything here
//! except [`AmbientLight`] is a pure function of [`WeatherParameters`].

use crate::condition::WeatherParameters;
use crate::lightning::{FlashProfile, FlashSegment};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use stormrunner_core::{lerp, RampChannel, RampController, RampSpec};
use tracing::warn;

/// Sky colors blended by rain intensity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyTint {
    /// RGB tint with no rain.
    pub clear: [f32; 3],
    /// RGB tint at full rain.
    pub storm: [f32; 3],
}

impl Default for SkyTint {
    fn default() -> Self {
        Self {
            clear: [0.0, 1.0, 1.0],
            storm: [0.5, 0.5, 0.5],
        }
    }
}

impl SkyTint {
    /// Tint for `params`.
    pub fn color(&self, params: &WeatherParameters) -> [f32; 3] {
        let t = params.rain_intensity;
        [
            lerp(self.clear[0], self.storm[0], t),
            lerp(self.clear[1], self.storm[1], t),
            lerp(self.clear[2], self.storm[2], t),
        ]
    }
}

/// Rain particle emitter settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RainEmission {
    /// Particles per second.
    pub rate: f32,
    /// Initial particle speed.
    pub start_speed: f32,
}

impl RainEmission {
    /// Emitter settings for `params`.
    pub fn from_parameters(params: &WeatherParameters) -> Self {
        Self {
            rate: params.rain_intensity * 1000.0,
            start_speed: params.rain_intensity * 20.0 + 5.0,
        }
    }
}

/// Procedural rain/wind loop levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbienceLevels {
    /// Rain loop volume.
    pub rain_volume: f32,
    /// Rain loop pitch.
    pub rain_pitch: f32,
    /// Wind loop volume.
    pub wind_volume: f32,
    /// Wind loop pitch.
    pub wind_pitch: f32,
}

impl AmbienceLevels {
    /// Loop levels for `params`.
    pub fn from_parameters(params: &WeatherParameters) -> Self {
        Self {
            rain_volume: params.rain_intensity * 0.8,
            rain_pitch: 0.8 + params.rain_intensity * 0.4,
            wind_volume: params.wind_intensity * 0.6,
            wind_pitch: 0.9 + params.wind_intensity * 0.3,
        }
    }
}

/// Every stateless effect output bundled for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectOutputs {
    /// Sky tint RGB.
    pub sky_color: [f32; 3],
    /// Rain emitter settings.
    pub rain: RainEmission,
    /// Rain and wind loop levels.
    pub ambience: AmbienceLevels,
}

impl EffectOutputs {
    /// Derive all outputs from `params`.
    pub fn from_parameters(params: &WeatherParameters, sky: &SkyTint) -> Self {
        Self {
            sky_color: sky.color(params),
            rain: RainEmission::from_parameters(params),
            ambience: AmbienceLevels::from_parameters(params),
        }
    }
}

/// Directional light intensity with weather dimming and lightning flashes.
///
/// The base level chases a weather-dependent target. Flashes are played one
/// segment at a time on [`RampChannel::LightFlash`]; while a lit segment runs
/// its intensity replaces the base.
#[derive(Debug)]
pub struct AmbientLight {
    response: f32,
    base: f32,
    ramps: RampController<RampChannel>,
    pending: VecDeque<FlashSegment>,
    flash: Option<f32>,
    segment_left: f32,
}

impl AmbientLight {
    /// Full daylight, chasing targets at `response` per second.
    pub fn new(response: f32) -> Self {
        Self {
            response,
            base: 1.0,
            ramps: RampController::new(),
            pending: VecDeque::new(),
            flash: None,
            segment_left: 0.0,
        }
    }

    /// Resting light level for `params`.
    pub fn target_for(params: &WeatherParameters) -> f32 {
        (1.0 - 0.6 * params.rain_intensity - 0.3 * params.lightning_proneness).clamp(0.0, 1.0)
    }

    /// Jump the base level straight to the target for `params`.
    pub fn settle(&mut self, params: &WeatherParameters) {
        self.base = Self::target_for(params);
    }

    /// Current light intensity.
    pub fn intensity(&self) -> f32 {
        match self.flash {
            Some(lit) if lit > 0.0 => lit,
            _ => self.base,
        }
    }

    /// Weather-driven level, ignoring any flash.
    pub fn base_intensity(&self) -> f32 {
        self.base
    }

    /// Whether a flash is still playing.
    pub fn is_flashing(&self) -> bool {
        self.flash.is_some()
    }

    /// Play `profile`, replacing any flash still in progress.
    pub fn play_flash(&mut self, profile: &FlashProfile) {
        self.pending = profile.segments.iter().copied().collect();
        self.start_next_segment();
    }

    /// Step the base level toward `params` and the flash sequence by `dt`.
    ///
    /// Time left over when a segment ends mid-step runs into the next one.
    pub fn advance(&mut self, dt: f32, params: &WeatherParameters) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let target = Self::target_for(params);
        let blend = (self.response * dt).min(1.0);
        self.base += (target - self.base) * blend;

        let mut step = dt;
        loop {
            let budget = self.segment_left;
            let completed = self.ramps.advance(step).iter().any(|tick| tick.completed);
            if !completed {
                self.segment_left -= step;
                break;
            }
            let carry = (step - budget).max(0.0);
            self.start_next_segment();
            if self.flash.is_none() || carry <= 0.0 {
                break;
            }
            step = carry;
        }
    }

    fn start_next_segment(&mut self) {
        let Some(segment) = self.pending.pop_front() else {
            self.ramps.cancel(RampChannel::LightFlash);
            self.flash = None;
            return;
        };
        // Each segment holds a constant level for its duration.
        let hold = RampSpec::linear(segment.intensity, segment.intensity, segment.duration);
        match self.ramps.start(RampChannel::LightFlash, hold) {
            Ok(_) => {
                self.flash = Some(segment.intensity);
                self.segment_left = segment.duration;
            }
            Err(err) => {
                warn!(%err, "dropping malformed flash");
                self.pending.clear();
                self.ramps.cancel(RampChannel::LightFlash);
                self.flash = None;
            }
        }
    }
}
