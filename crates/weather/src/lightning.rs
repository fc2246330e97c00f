//! Randomized lightning strikes during storms.
//!
//! The generator is Idle until [`LightningEventGenerator::start`]. While
//! Active it waits a random interval, fires one [`LightningEvent`], and
//! repeats. [`LightningEventGenerator::stop`] drops the pending wait on the
//! spot, so no strike can land after a stop no matter how far the wait had
//! progressed.

use crate::config::{FlashConfig, LightningConfig};
use crate::events::{SubscriptionId, Subscribers};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use stormrunner_core::{domain_rng, ClipId, ConfigError, RandomSource, LIGHTNING_DOMAIN};
use tracing::debug;

/// Generator run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightningState {
    /// Not scheduling strikes.
    Idle,
    /// Waiting for the next strike.
    Active,
}

/// One constant-intensity stretch of a flash.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlashSegment {
    /// Light intensity while the segment runs; `0` means unlit.
    pub intensity: f32,
    /// Seconds the segment lasts.
    pub duration: f32,
}

/// Light intensity over time for a single strike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashProfile {
    /// Segments played back to back.
    pub segments: Vec<FlashSegment>,
}

impl FlashProfile {
    /// Bright strike, dark gap, dimmer echo.
    pub fn double_flash(config: &FlashConfig) -> Self {
        Self {
            segments: vec![
                FlashSegment {
                    intensity: config.peak_intensity,
                    duration: config.peak_duration,
                },
                FlashSegment {
                    intensity: 0.0,
                    duration: config.gap_duration,
                },
                FlashSegment {
                    intensity: config.echo_intensity,
                    duration: config.echo_duration,
                },
            ],
        }
    }

    /// Total length in seconds.
    pub fn duration(&self) -> f32 {
        self.segments.iter().map(|s| s.duration).sum()
    }

    /// Intensity `t` seconds into the flash; `0` before or after it.
    pub fn sample(&self, t: f32) -> f32 {
        if t < 0.0 {
            return 0.0;
        }
        let mut start = 0.0;
        for segment in &self.segments {
            let end = start + segment.duration;
            if t < end {
                return segment.intensity;
            }
            start = end;
        }
        0.0
    }

    /// Brightest segment.
    pub fn peak(&self) -> f32 {
        self.segments
            .iter()
            .map(|s| s.intensity)
            .fold(0.0, f32::max)
    }
}

/// A single strike: flash, thunder and camera reaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightningEvent {
    /// 1-based strike counter for this generator.
    pub strike: u64,
    /// Light flash curve.
    pub flash: FlashProfile,
    /// Thunder clip to play.
    pub thunder_clip: ClipId,
    /// Requested camera shake strength.
    pub camera_shake_intensity: f32,
    /// Requested camera shake length (seconds).
    pub camera_shake_duration: f32,
}

/// Receiver of camera shake requests.
pub trait CameraShakeSink {
    /// Shake the camera with `intensity` for `duration` seconds.
    fn shake(&mut self, intensity: f32, duration: f32);
}

impl<T: CameraShakeSink + ?Sized> CameraShakeSink for Rc<RefCell<T>> {
    fn shake(&mut self, intensity: f32, duration: f32) {
        self.borrow_mut().shake(intensity, duration);
    }
}

/// Wait-then-strike scheduler.
pub struct LightningEventGenerator<R = StdRng> {
    config: LightningConfig,
    rng: R,
    state: LightningState,
    next_strike_in: Option<f32>,
    strikes: u64,
    listeners: Subscribers<LightningEvent>,
}

impl LightningEventGenerator<StdRng> {
    /// Generator drawing from the lightning stream of `seed`.
    pub fn seeded(config: LightningConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::new(config, domain_rng(seed, LIGHTNING_DOMAIN))
    }
}

impl<R: RandomSource> LightningEventGenerator<R> {
    /// Validate `config` and build an Idle generator.
    pub fn new(config: LightningConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            rng,
            state: LightningState::Idle,
            next_strike_in: None,
            strikes: 0,
            listeners: Subscribers::new(),
        })
    }

    /// Current run state.
    pub fn state(&self) -> LightningState {
        self.state
    }

    /// Whether strikes are being scheduled.
    pub fn is_active(&self) -> bool {
        self.state == LightningState::Active
    }

    /// Seconds until the pending strike, if one is scheduled.
    pub fn next_strike_in(&self) -> Option<f32> {
        self.next_strike_in
    }

    /// Strikes fired so far.
    pub fn strikes(&self) -> u64 {
        self.strikes
    }

    /// Register a strike listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&LightningEvent) + 'static) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    /// Remove a strike listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Idle → Active. No-op (returns `false`) when already Active.
    pub fn start(&mut self) -> bool {
        if self.is_active() {
            return false;
        }
        self.state = LightningState::Active;
        let wait = self.draw_wait();
        self.next_strike_in = Some(wait);
        debug!(wait, "lightning started");
        true
    }

    /// Active → Idle, cancelling the pending wait. No-op when Idle.
    pub fn stop(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.state = LightningState::Idle;
        let cancelled = self.next_strike_in.take();
        debug!(?cancelled, "lightning stopped");
        true
    }

    /// Advance the pending wait by `dt`, firing every strike that comes due.
    ///
    /// Overdue time beyond one `max_wait` is dropped.
    pub fn advance(&mut self, dt: f32) -> Vec<LightningEvent> {
        let mut events = Vec::new();
        if !self.is_active() {
            return events;
        }
        let Some(mut remaining) = self.next_strike_in else {
            return events;
        };

        remaining -= if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        // Overdue time past one full wait is dropped; with min_wait > 0 this
        // bounds a single step to max_wait / min_wait + 1 strikes.
        remaining = remaining.max(-self.config.max_wait);
        while remaining <= 0.0 {
            let event = self.strike();
            self.listeners.emit(&event);
            events.push(event);
            remaining += self.draw_wait();
        }
        self.next_strike_in = Some(remaining);
        events
    }

    fn draw_wait(&mut self) -> f32 {
        self.rng.range(self.config.min_wait, self.config.max_wait)
    }

    fn strike(&mut self) -> LightningEvent {
        self.strikes += 1;
        // thunder_clips is non-empty by validation.
        let index = self.rng.pick_index(self.config.thunder_clips.len());
        let thunder_clip = self.config.thunder_clips[index].clone();
        debug!(strike = self.strikes, clip = %thunder_clip, "lightning strike");
        LightningEvent {
            strike: self.strikes,
            flash: FlashProfile::double_flash(&self.config.flash),
            thunder_clip,
            camera_shake_intensity: self.config.camera_shake_intensity,
            camera_shake_duration: self.config.camera_shake_duration,
        }
    }
}

impl<R> fmt::Debug for LightningEventGenerator<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LightningEventGenerator")
            .field("state", &self.state)
            .field("next_strike_in", &self.next_strike_in)
            .field("strikes", &self.strikes)
            .field("listeners", &self.listeners)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stormrunner_testkit::ScriptedRandom;

    fn scripted(draws: &[f32]) -> LightningEventGenerator<ScriptedRandom> {
        LightningEventGenerator::new(LightningConfig::default(), ScriptedRandom::new(draws))
            .expect("default lightning config is valid")
    }

    #[test]
    fn starts_idle_and_never_fires_while_idle() {
        let mut gen = scripted(&[0.0]);
        assert_eq!(gen.state(), LightningState::Idle);
        assert!(gen.advance(100.0).is_empty());
    }

    #[test]
    fn fires_after_drawn_wait() {
        // wait = 2 + 6 * 0.5 = 5; clip index = floor(0.7 * 3) = 2
        let mut gen = scripted(&[0.5, 0.7, 0.5]);
        assert!(gen.start());
        assert_eq!(gen.next_strike_in(), Some(5.0));

        assert!(gen.advance(4.0).is_empty());
        let events = gen.advance(1.0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].strike, 1);
        assert_eq!(events[0].thunder_clip, ClipId::new("thunder_03"));
        assert_eq!(events[0].camera_shake_intensity, 0.5);
        assert_eq!(events[0].camera_shake_duration, 0.5);
        assert_eq!(gen.next_strike_in(), Some(5.0));
    }

    #[test]
    fn stop_cancels_wait_even_when_nearly_elapsed() {
        let mut gen = scripted(&[0.5]);
        gen.start();
        // 90% of the 5 second wait.
        assert!(gen.advance(4.5).is_empty());
        assert!(gen.stop());
        assert_eq!(gen.next_strike_in(), None);
        assert!(gen.advance(10.0).is_empty());
        assert_eq!(gen.strikes(), 0);
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let mut gen = scripted(&[0.25, 0.75]);
        assert!(gen.start());
        let wait = gen.next_strike_in();
        assert!(!gen.start());
        assert_eq!(gen.next_strike_in(), wait, "re-entrant start must not redraw");

        assert!(gen.stop());
        assert!(!gen.stop());
    }

    #[test]
    fn large_steps_fire_every_due_strike() {
        // Waits of exactly 2 seconds each (min_wait).
        let mut gen = scripted(&[0.0]);
        gen.start();
        let events = gen.advance(6.0);
        assert_eq!(events.len(), 3);
        assert_eq!(events.iter().map(|e| e.strike).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn huge_step_fires_a_bounded_burst() {
        let mut gen = LightningEventGenerator::seeded(LightningConfig::default(), 1).unwrap();
        gen.start();
        let events = gen.advance(1.0e9);
        // At most max_wait / min_wait + 1 strikes.
        assert!(!events.is_empty() && events.len() <= 5, "{} strikes", events.len());
        let next = gen.next_strike_in().unwrap();
        assert!(next > 0.0 && next <= 8.0);
        assert!(gen.advance(f32::MAX).len() <= 5);
    }

    #[test]
    fn listeners_receive_strikes() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut gen = scripted(&[0.0]);
        let sink = seen.clone();
        gen.subscribe(move |event| sink.borrow_mut().push(event.strike));
        gen.start();
        gen.advance(2.0);
        assert_eq!(*seen.borrow(), vec![1]);
    }

    #[test]
    fn empty_thunder_set_is_a_config_error() {
        let config = LightningConfig {
            thunder_clips: Vec::new(),
            ..LightningConfig::default()
        };
        assert!(matches!(
            LightningEventGenerator::seeded(config, 1),
            Err(ConfigError::EmptySet { .. })
        ));
    }

    #[test]
    fn double_flash_profile_shape() {
        let profile = FlashProfile::double_flash(&FlashConfig::default());
        assert_eq!(profile.sample(0.05), 3.0);
        assert_eq!(profile.sample(0.15), 0.0);
        assert_eq!(profile.sample(0.22), 2.0);
        assert_eq!(profile.sample(1.0), 0.0);
        assert_eq!(profile.peak(), 3.0);
        assert!((profile.duration() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn seeded_generators_agree() {
        let mut a = LightningEventGenerator::seeded(LightningConfig::default(), 99).unwrap();
        let mut b = LightningEventGenerator::seeded(LightningConfig::default(), 99).unwrap();
        a.start();
        b.start();
        for _ in 0..400 {
            assert_eq!(a.advance(0.05), b.advance(0.05));
        }
        assert!(a.strikes() > 0);
    }
}
