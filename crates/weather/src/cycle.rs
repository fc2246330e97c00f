//! Background weather cycling.
//!
//! Waits a random interval, then requests either a storm-family condition
//! (with probability `storm_probability`, picked uniformly) or Clear, and
//! repeats until stopped.

use crate::condition::WeatherCondition;
use crate::config::CycleConfig;
use crate::machine::WeatherStateMachine;
use rand::rngs::StdRng;
use stormrunner_core::{domain_rng, ConfigError, RandomSource, CYCLE_DOMAIN};
use tracing::debug;

/// Randomized scheduler of weather change requests.
#[derive(Debug)]
pub struct WeatherCycleDriver<R = StdRng> {
    config: CycleConfig,
    rng: R,
    next_request_in: Option<f32>,
    requests: u64,
}

impl WeatherCycleDriver<StdRng> {
    /// Driver drawing from the cycle stream of `seed`.
    pub fn seeded(config: CycleConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::new(config, domain_rng(seed, CYCLE_DOMAIN))
    }
}

impl<R: RandomSource> WeatherCycleDriver<R> {
    /// Validate `config`; the first wait is drawn now when cycling is enabled.
    pub fn new(config: CycleConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut driver = Self {
            config,
            rng,
            next_request_in: None,
            requests: 0,
        };
        if config.enabled {
            driver.start();
        }
        Ok(driver)
    }

    /// Whether a request is scheduled.
    pub fn is_running(&self) -> bool {
        self.next_request_in.is_some()
    }

    /// Seconds until the next request.
    pub fn next_request_in(&self) -> Option<f32> {
        self.next_request_in
    }

    /// Requests issued so far.
    pub fn requests(&self) -> u64 {
        self.requests
    }

    /// Schedule the next request if not already running.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        let wait = self.draw_interval();
        self.next_request_in = Some(wait);
        debug!(wait, "weather cycle started");
        true
    }

    /// Cancel the pending wait.
    pub fn stop(&mut self) -> bool {
        let was_running = self.next_request_in.take().is_some();
        if was_running {
            debug!("weather cycle stopped");
        }
        was_running
    }

    /// Advance the wait by `dt` and return the conditions that came due.
    ///
    /// Overdue time beyond one `max_interval` is dropped.
    pub fn advance(&mut self, dt: f32) -> Vec<WeatherCondition> {
        let mut due = Vec::new();
        let Some(mut remaining) = self.next_request_in else {
            return due;
        };
        remaining -= if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        // A step longer than one full interval still yields a bounded burst.
        remaining = remaining.max(-self.config.max_interval);
        while remaining <= 0.0 {
            let condition = self.roll();
            self.requests += 1;
            debug!(%condition, request = self.requests, "weather cycle request");
            due.push(condition);
            remaining += self.draw_interval();
        }
        self.next_request_in = Some(remaining);
        due
    }

    /// Advance by `dt` and forward every due request to `machine`.
    pub fn drive<L: RandomSource>(
        &mut self,
        dt: f32,
        machine: &mut WeatherStateMachine<L>,
    ) -> Result<Vec<WeatherCondition>, ConfigError> {
        let due = self.advance(dt);
        for &condition in &due {
            machine.request_change(condition)?;
        }
        Ok(due)
    }

    fn draw_interval(&mut self) -> f32 {
        self.rng
            .range(self.config.min_interval, self.config.max_interval)
    }

    fn roll(&mut self) -> WeatherCondition {
        if self.rng.next_unit() < self.config.storm_probability {
            let family = WeatherCondition::STORM_FAMILY;
            family[self.rng.pick_index(family.len())]
        } else {
            WeatherCondition::Clear
        }
    }
}
