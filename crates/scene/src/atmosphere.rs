//! The atmosphere facade: one tick of weather, light, audio and camera shake.

use crate::config::AtmosphereConfig;
use anyhow::{Context, Result};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use stormrunner_audio::{AudioManager, AudioReactionBridge, MixerGroup, MusicPlayer, Voice};
use stormrunner_core::{ClipId, ConfigError, SimTick};
use stormrunner_weather::{
    AmbientLight, CameraShakeSink, EffectOutputs, LightningEvent, LightningState, SkyTint,
    SubscriptionId, WeatherChanged, WeatherCondition, WeatherCycleDriver, WeatherParameters,
    WeatherStateMachine,
};
use tracing::{debug, info, trace};

/// Everything observable after one [`Atmosphere::advance`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtmosphereFrame {
    /// Tick that was just simulated.
    pub tick: SimTick,
    /// Condition at rest (or the transition origin).
    pub condition: WeatherCondition,
    /// Condition being approached.
    pub target: WeatherCondition,
    /// Interpolated intensities.
    pub parameters: WeatherParameters,
    /// Eased transition progress, if one is running.
    pub transition_progress: Option<f32>,
    /// Lightning scheduler state.
    pub lightning: LightningState,
    /// Sky, rain and loop levels.
    pub effects: EffectOutputs,
    /// Directional light intensity, flash included.
    pub light_intensity: f32,
    /// Weather ambience voices.
    pub ambience: Vec<Voice>,
    /// Music voices.
    pub music: Vec<Voice>,
    /// Settled condition change, if any.
    pub changed: Option<WeatherChanged>,
    /// Strikes fired this tick.
    pub strikes: Vec<LightningEvent>,
    /// Conditions the random cycle requested this tick.
    pub cycle_requests: Vec<WeatherCondition>,
}

/// Weather with every reacting subsystem wired to it.
pub struct Atmosphere {
    tick: SimTick,
    sky: SkyTint,
    wind_clip: ClipId,
    machine: WeatherStateMachine,
    cycle: WeatherCycleDriver,
    bridge: Rc<RefCell<AudioReactionBridge>>,
    music: MusicPlayer,
    light: AmbientLight,
    audio: AudioManager,
    camera_shake: Option<Box<dyn CameraShakeSink>>,
}

impl Atmosphere {
    /// Build every subsystem from `config`, seeding all randomness from `seed`.
    ///
    /// Audio starts on the silent stub backend; see [`Atmosphere::with_audio`].
    pub fn new(config: &AtmosphereConfig, seed: u64) -> Result<Self> {
        config.validate().context("invalid atmosphere config")?;

        let mut machine = WeatherStateMachine::seeded(&config.weather, seed)?;
        let cycle = WeatherCycleDriver::seeded(config.weather.cycle, seed)?;

        let bridge = Rc::new(RefCell::new(AudioReactionBridge::new(
            config.audio.ambience.clone(),
            config.audio.ambience_crossfade,
        )?));
        AudioReactionBridge::subscribe_to(&bridge, &mut machine);
        bridge.borrow_mut().react_to(machine.current_condition())?;

        let mut music = MusicPlayer::new(&config.audio.music)?;
        if config.autoplay_music {
            music.next_track()?;
        }

        let mut light = AmbientLight::new(config.weather.light_response);
        light.settle(&machine.current_parameters());

        let mut audio = AudioManager::stub();
        *audio.settings_mut() = config.audio.settings.clone();

        info!(
            seed,
            condition = %machine.current_condition(),
            cycle = cycle.is_running(),
            "atmosphere ready"
        );

        Ok(Self {
            tick: SimTick::ZERO,
            sky: config.weather.sky,
            wind_clip: config.wind_clip.clone(),
            machine,
            cycle,
            bridge,
            music,
            light,
            audio,
            camera_shake: None,
        })
    }

    /// Swap in a different audio backend, keeping the current mixer settings.
    pub fn with_audio(mut self, mut audio: AudioManager) -> Self {
        self.audio.stop_all();
        *audio.settings_mut() = self.audio.settings().clone();
        self.audio = audio;
        self
    }

    /// Route lightning camera shake to `sink`.
    pub fn set_camera_shake_sink(&mut self, sink: Box<dyn CameraShakeSink>) {
        self.camera_shake = Some(sink);
    }

    /// Stop routing camera shake.
    pub fn clear_camera_shake_sink(&mut self) {
        self.camera_shake = None;
    }

    /// Next tick to be simulated.
    pub fn tick(&self) -> SimTick {
        self.tick
    }

    /// Condition at rest (or the transition origin).
    pub fn current_condition(&self) -> WeatherCondition {
        self.machine.current_condition()
    }

    /// Interpolated intensities.
    pub fn current_parameters(&self) -> WeatherParameters {
        self.machine.current_parameters()
    }

    /// Begin a transition toward `condition`.
    pub fn request_weather_change(
        &mut self,
        condition: WeatherCondition,
    ) -> Result<bool, ConfigError> {
        self.machine.request_change(condition)
    }

    /// Begin a transition toward the condition called `name`.
    pub fn request_weather_named(&mut self, name: &str) -> Result<bool, ConfigError> {
        self.machine.request_named(name)
    }

    /// Listen for settled condition changes.
    pub fn subscribe(&mut self, listener: impl FnMut(&WeatherChanged) + 'static) -> SubscriptionId {
        self.machine.subscribe(listener)
    }

    /// Listen for lightning strikes.
    pub fn subscribe_lightning(
        &mut self,
        listener: impl FnMut(&LightningEvent) + 'static,
    ) -> SubscriptionId {
        self.machine.subscribe_lightning(listener)
    }

    /// Drop a condition-change listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.machine.unsubscribe(id)
    }

    /// Weather state machine.
    pub fn machine(&self) -> &WeatherStateMachine {
        &self.machine
    }

    /// Random weather cycle.
    pub fn cycle_mut(&mut self) -> &mut WeatherCycleDriver {
        &mut self.cycle
    }

    /// Music playlist.
    pub fn music(&self) -> &MusicPlayer {
        &self.music
    }

    /// Music playlist controls.
    pub fn music_mut(&mut self) -> &mut MusicPlayer {
        &mut self.music
    }

    /// Directional light.
    pub fn light(&self) -> &AmbientLight {
        &self.light
    }

    /// Audio output.
    pub fn audio(&self) -> &AudioManager {
        &self.audio
    }

    /// Audio output (settings, clip loading).
    pub fn audio_mut(&mut self) -> &mut AudioManager {
        &mut self.audio
    }

    /// Clip the weather ambience is settling on.
    pub fn ambience_clip(&self) -> Option<ClipId> {
        self.bridge.borrow().current_clip().cloned()
    }

    /// Simulate one step of `dt` seconds.
    pub fn advance(&mut self, dt: f32) -> Result<AtmosphereFrame> {
        let cycle_requests = self
            .cycle
            .drive(dt, &mut self.machine)
            .context("weather cycle request rejected")?;
        let step = self.machine.advance(dt);
        let parameters = self.machine.current_parameters();

        self.bridge.borrow_mut().advance(dt);
        self.light.advance(dt, &parameters);
        for strike in &step.lightning {
            self.light.play_flash(&strike.flash);
            self.audio
                .play_one_shot(&strike.thunder_clip, MixerGroup::Sfx, 1.0);
            match self.camera_shake.as_mut() {
                Some(sink) => {
                    sink.shake(strike.camera_shake_intensity, strike.camera_shake_duration)
                }
                None => trace!(strike = strike.strike, "no camera shake sink"),
            }
        }
        self.music.advance(dt);

        let effects = EffectOutputs::from_parameters(&parameters, &self.sky);
        let ambience = self.bridge.borrow().voices();
        let music = self.music.voices();
        let wind = [Voice {
            clip: self.wind_clip.clone(),
            gain: effects.ambience.wind_volume,
        }];
        self.audio.sync_loops(MixerGroup::Weather, &ambience);
        self.audio.sync_loops(MixerGroup::Music, &music);
        self.audio.sync_loops(MixerGroup::Ambient, &wind);
        self.audio.update();

        if let Some(changed) = &step.changed {
            debug!(tick = self.tick.0, from = %changed.from, to = %changed.to, "weather settled");
        }

        let frame = AtmosphereFrame {
            tick: self.tick,
            condition: self.machine.current_condition(),
            target: self.machine.target_condition(),
            parameters,
            transition_progress: self.machine.transition().map(|t| t.progress()),
            lightning: self.machine.lightning().state(),
            effects,
            light_intensity: self.light.intensity(),
            ambience,
            music,
            changed: step.changed,
            strikes: step.lightning,
            cycle_requests,
        };
        self.tick = self.tick.advance(1);
        Ok(frame)
    }
}

impl std::fmt::Debug for Atmosphere {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Atmosphere")
            .field("tick", &self.tick)
            .field("machine", &self.machine)
            .field("cycle", &self.cycle)
            .field("light", &self.light)
            .field("camera_shake", &self.camera_shake.is_some())
            .finish_non_exhaustive()
    }
}
