//! Weather ambience that follows condition changes.

use crate::mixer::{CrossfadeMixer, Voice};
use crate::sounds::AmbienceMap;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use stormrunner_core::error::validate_duration;
use stormrunner_core::{ClipId, ConfigError, RampChannel, RandomSource};
use stormrunner_weather::{SubscriptionId, WeatherChanged, WeatherCondition, WeatherStateMachine};
use tracing::{debug, warn};

/// How the bridge reacted to a condition change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reaction")]
pub enum AudioReaction {
    /// The ambience clip changed and a crossfade started.
    Crossfade {
        /// Clip fading out (`None` from silence).
        from: Option<ClipId>,
        /// Clip fading in (`None` to silence).
        to: Option<ClipId>,
    },
    /// Same clip; only its gain target moved.
    GainOnly {
        /// Clip kept playing.
        clip: ClipId,
        /// New gain target.
        volume: f32,
    },
    /// Silence before and after.
    Unchanged,
}

/// Crossfades the weather ambience loop on [`RampChannel::WeatherAudioVolume`].
#[derive(Debug)]
pub struct AudioReactionBridge {
    map: AmbienceMap,
    crossfade: f32,
    mixer: CrossfadeMixer,
    current: Option<ClipId>,
}

impl AudioReactionBridge {
    /// Validate the map and crossfade length.
    pub fn new(map: AmbienceMap, crossfade: f32) -> Result<Self, ConfigError> {
        map.validate()?;
        validate_duration("ambience crossfade", crossfade)?;
        Ok(Self {
            map,
            crossfade,
            mixer: CrossfadeMixer::new(RampChannel::WeatherAudioVolume),
            current: None,
        })
    }

    /// Register `bridge` as a condition-change listener of `machine`.
    pub fn subscribe_to<R: RandomSource>(
        bridge: &Rc<RefCell<Self>>,
        machine: &mut WeatherStateMachine<R>,
    ) -> SubscriptionId {
        let bridge = Rc::clone(bridge);
        machine.subscribe(move |event| {
            if let Err(err) = bridge.borrow_mut().on_condition_changed(event) {
                warn!(%err, "weather ambience crossfade rejected");
            }
        })
    }

    /// React to a settled condition change.
    pub fn on_condition_changed(
        &mut self,
        event: &WeatherChanged,
    ) -> Result<AudioReaction, ConfigError> {
        self.react_to(event.to)
    }

    /// Fade toward the ambience of `condition` (also used to prime the initial condition).
    pub fn react_to(&mut self, condition: WeatherCondition) -> Result<AudioReaction, ConfigError> {
        let entry = self.map.resolve(condition).cloned();
        let reaction = match (self.current.clone(), entry) {
            (None, None) => AudioReaction::Unchanged,
            (Some(current), Some(entry)) if current == entry.clip => {
                self.mixer
                    .fade_to(Some((&entry.clip, entry.volume)), self.crossfade)?;
                AudioReaction::GainOnly {
                    clip: entry.clip,
                    volume: entry.volume,
                }
            }
            (from, entry) => {
                self.mixer.fade_to(
                    entry.as_ref().map(|e| (&e.clip, e.volume)),
                    self.crossfade,
                )?;
                self.current = entry.map(|e| e.clip);
                AudioReaction::Crossfade {
                    from,
                    to: self.current.clone(),
                }
            }
        };
        debug!(%condition, ?reaction, "weather ambience reaction");
        Ok(reaction)
    }

    /// Step the crossfade.
    pub fn advance(&mut self, dt: f32) {
        self.mixer.advance(dt);
    }

    /// Clip the ambience is settling on.
    pub fn current_clip(&self) -> Option<&ClipId> {
        self.current.as_ref()
    }

    /// Whether a crossfade is running.
    pub fn is_fading(&self) -> bool {
        self.mixer.is_fading()
    }

    /// Current ambience voices with their gains.
    pub fn voices(&self) -> Vec<Voice> {
        self.mixer.voices()
    }

    /// Current gain of `clip`.
    pub fn gain(&self, clip: &ClipId) -> f32 {
        self.mixer.gain(clip)
    }
}
