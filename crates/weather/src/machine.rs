//! Weather condition state machine.
//!
//! The machine is the only writer of the current condition and parameters.
//! A change request captures the parameters as they are *right now* (mid
//! transition included) and ramps from there to the table entry of the new
//! condition with smoothstep easing. Only when that ramp completes does the
//! condition itself change, listeners hear about it, and lightning is started
//! or stopped.

use crate::condition::{EffectParameterTable, WeatherChanged, WeatherCondition, WeatherParameters};
use crate::config::WeatherConfig;
use crate::events::{SubscriptionId, Subscribers};
use crate::lightning::{LightningEvent, LightningEventGenerator};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use stormrunner_core::{
    domain_rng, ConfigError, Easing, RampChannel, RampController, RampGeneration, RampSpec,
    RandomSource, LIGHTNING_DOMAIN,
};
use tracing::{debug, info};

/// The in-flight transition. At most one exists at a time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionState {
    /// Condition at rest when the transition began.
    pub from: WeatherCondition,
    /// Condition the transition settles on.
    pub to: WeatherCondition,
    /// Parameters captured when the request arrived.
    pub start: WeatherParameters,
    /// Table entry for `to`.
    pub target: WeatherParameters,
    /// Seconds elapsed so far.
    pub elapsed: f32,
    /// Total seconds.
    pub duration: f32,
    /// Ramp generation driving this transition.
    pub generation: RampGeneration,
}

impl TransitionState {
    /// Linear progress in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }
}

/// What happened during one [`WeatherStateMachine::advance`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MachineStep {
    /// Set when a transition settled on a different condition.
    pub changed: Option<WeatherChanged>,
    /// Lightning strikes fired this step.
    pub lightning: Vec<LightningEvent>,
}

/// Owner of the current weather condition.
pub struct WeatherStateMachine<R = StdRng> {
    table: EffectParameterTable,
    transition_duration: f32,
    current: WeatherCondition,
    parameters: WeatherParameters,
    transition: Option<TransitionState>,
    ramps: RampController<RampChannel>,
    lightning: LightningEventGenerator<R>,
    listeners: Subscribers<WeatherChanged>,
}

impl WeatherStateMachine<StdRng> {
    /// Machine whose lightning draws from the lightning stream of `seed`.
    pub fn seeded(config: &WeatherConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::new(config, domain_rng(seed, LIGHTNING_DOMAIN))
    }
}

impl<R: RandomSource> WeatherStateMachine<R> {
    /// Validate `config` and start at rest in its initial condition.
    pub fn new(config: &WeatherConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut lightning = LightningEventGenerator::new(config.lightning.clone(), rng)?;
        let current = config.initial_condition;
        if current.is_storm() {
            lightning.start();
        }
        Ok(Self {
            table: config.table,
            transition_duration: config.transition_duration,
            current,
            parameters: config.table.get(current),
            transition: None,
            ramps: RampController::new(),
            lightning,
            listeners: Subscribers::new(),
        })
    }

    /// Resting condition (unchanged until a transition completes).
    pub fn current_condition(&self) -> WeatherCondition {
        self.current
    }

    /// Parameters as of the last step.
    pub fn current_parameters(&self) -> WeatherParameters {
        self.parameters
    }

    /// Condition the machine is heading for.
    pub fn target_condition(&self) -> WeatherCondition {
        self.transition.map_or(self.current, |t| t.to)
    }

    /// In-flight transition, if any.
    pub fn transition(&self) -> Option<&TransitionState> {
        self.transition.as_ref()
    }

    /// Whether a transition is running.
    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Lookup table in use.
    pub fn table(&self) -> &EffectParameterTable {
        &self.table
    }

    /// Lightning generator driven by this machine.
    pub fn lightning(&self) -> &LightningEventGenerator<R> {
        &self.lightning
    }

    /// Register a condition-change listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&WeatherChanged) + 'static) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    /// Remove a condition-change listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Register a lightning strike listener.
    pub fn subscribe_lightning(
        &mut self,
        listener: impl FnMut(&LightningEvent) + 'static,
    ) -> SubscriptionId {
        self.lightning.subscribe(listener)
    }

    /// Remove a lightning strike listener.
    pub fn unsubscribe_lightning(&mut self, id: SubscriptionId) -> bool {
        self.lightning.unsubscribe(id)
    }

    /// Request a transition to `condition`.
    ///
    /// Returns `Ok(false)` when already at rest in `condition`. Otherwise any
    /// in-flight transition is superseded and a new one starts from the
    /// current interpolated parameters.
    pub fn request_change(&mut self, condition: WeatherCondition) -> Result<bool, ConfigError> {
        if condition == self.current && self.transition.is_none() {
            return Ok(false);
        }

        let start = self.parameters;
        let target = self.table.get(condition);
        let spec = RampSpec::new(0.0, 1.0, self.transition_duration, Easing::SmoothStep);
        let generation = self.ramps.start(RampChannel::WeatherParameters, spec)?;

        if let Some(previous) = self.transition.replace(TransitionState {
            from: self.current,
            to: condition,
            start,
            target,
            elapsed: 0.0,
            duration: self.transition_duration,
            generation,
        }) {
            debug!(
                superseded = %previous.to,
                to = %condition,
                progress = previous.progress(),
                "weather transition superseded"
            );
        }
        debug!(from = %self.current, to = %condition, ?start, "weather transition started");
        Ok(true)
    }

    /// Parse `name` and request it. Nothing changes if the name is unknown.
    pub fn request_named(&mut self, name: &str) -> Result<bool, ConfigError> {
        let condition: WeatherCondition = name.parse()?;
        self.request_change(condition)
    }

    /// Advance the transition, then lightning, by `dt` seconds.
    pub fn advance(&mut self, dt: f32) -> MachineStep {
        let mut step = MachineStep::default();
        let mut started_lightning = false;

        for tick in self.ramps.advance(dt) {
            if tick.channel != RampChannel::WeatherParameters {
                continue;
            }
            let transition = self
                .transition
                .as_mut()
                .unwrap_or_else(|| panic!("parameter ramp {} without a transition", tick.generation));
            assert_eq!(
                transition.generation, tick.generation,
                "parameter ramp does not belong to the active transition"
            );

            transition.elapsed = tick.progress * transition.duration;
            if !tick.completed {
                self.parameters = transition.start.lerp(transition.target, tick.value);
                continue;
            }

            let finished = *transition;
            self.transition = None;
            self.parameters = finished.target;
            let previous = self.current;
            self.current = finished.to;

            if finished.to.is_storm() {
                started_lightning = self.lightning.start();
            } else {
                self.lightning.stop();
            }

            if previous != finished.to {
                let event = WeatherChanged::new(previous, finished.to);
                info!(from = %previous, to = %finished.to, "weather changed");
                self.listeners.emit(&event);
                step.changed = Some(event);
            }
        }

        // A generator started this step begins its first wait next step.
        if !started_lightning {
            step.lightning = self.lightning.advance(dt);
        }
        step
    }
}

impl<R> fmt::Debug for WeatherStateMachine<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherStateMachine")
            .field("current", &self.current)
            .field("parameters", &self.parameters)
            .field("transition", &self.transition)
            .field("lightning", &self.lightning)
            .field("listeners", &self.listeners)
            .finish()
    }
}
