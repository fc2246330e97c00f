//! Multi-voice crossfading on a single ramp channel.
//!
//! Every voice remembers the gain it started from and the gain it is heading
//! to; one linear progress ramp drives all of them. Re-targeting mid-fade
//! captures each voice's current gain as its new start, so gains never jump.

use serde::{Deserialize, Serialize};
use stormrunner_core::{
    lerp, ClipId, ConfigError, RampChannel, RampController, RampGeneration, RampSpec,
};
use tracing::debug;

/// A looping clip and its current gain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    /// Clip being played.
    pub clip: ClipId,
    /// Current voice gain.
    pub gain: f32,
}

#[derive(Debug, Clone)]
struct FadingVoice {
    clip: ClipId,
    from: f32,
    to: f32,
    gain: f32,
}

/// Set of voices faded together on one [`RampChannel`].
#[derive(Debug)]
pub struct CrossfadeMixer {
    channel: RampChannel,
    ramps: RampController<RampChannel>,
    voices: Vec<FadingVoice>,
}

impl CrossfadeMixer {
    /// Silent mixer fading on `channel`.
    pub fn new(channel: RampChannel) -> Self {
        Self {
            channel,
            ramps: RampController::new(),
            voices: Vec::new(),
        }
    }

    /// Channel the fades run on.
    pub fn channel(&self) -> RampChannel {
        self.channel
    }

    /// Fade toward `target` (clip and gain) over `duration`; `None` fades everything out.
    ///
    /// Voices other than the target fade to zero. A target clip that is
    /// already playing is retargeted in place instead of being restarted.
    /// Rejected durations leave every voice untouched.
    pub fn fade_to(
        &mut self,
        target: Option<(&ClipId, f32)>,
        duration: f32,
    ) -> Result<RampGeneration, ConfigError> {
        let generation = self
            .ramps
            .start(self.channel, RampSpec::linear(0.0, 1.0, duration))?;

        for voice in &mut self.voices {
            voice.from = voice.gain;
            voice.to = match target {
                Some((clip, gain)) if *clip == voice.clip => gain,
                _ => 0.0,
            };
        }
        if let Some((clip, gain)) = target {
            if !self.voices.iter().any(|v| v.clip == *clip) {
                self.voices.push(FadingVoice {
                    clip: clip.clone(),
                    from: 0.0,
                    to: gain,
                    gain: 0.0,
                });
            }
        }
        debug!(
            channel = self.channel.name(),
            target = ?target.map(|(clip, gain)| (clip.as_str(), gain)),
            duration,
            generation,
            "crossfade started"
        );
        Ok(generation)
    }

    /// Step the live fade by `dt`. Returns `true` when it completed this step.
    pub fn advance(&mut self, dt: f32) -> bool {
        let mut finished = false;
        for tick in self.ramps.advance(dt) {
            for voice in &mut self.voices {
                voice.gain = lerp(voice.from, voice.to, tick.value);
            }
            if tick.completed {
                for voice in &mut self.voices {
                    voice.gain = voice.to;
                    voice.from = voice.to;
                }
                self.voices.retain(|voice| voice.to > 0.0);
                finished = true;
                debug!(channel = self.channel.name(), "crossfade finished");
            }
        }
        finished
    }

    /// Whether a fade is in progress.
    pub fn is_fading(&self) -> bool {
        self.ramps.is_active(self.channel)
    }

    /// Current gain of `clip` (zero when not playing).
    pub fn gain(&self, clip: &ClipId) -> f32 {
        self.voices
            .iter()
            .find(|v| v.clip == *clip)
            .map_or(0.0, |v| v.gain)
    }

    /// Every audible or fading voice.
    pub fn voices(&self) -> Vec<Voice> {
        self.voices
            .iter()
            .map(|v| Voice {
                clip: v.clip.clone(),
                gain: v.gain,
            })
            .collect()
    }

    /// Clip the mixer is fading toward (or holding).
    pub fn target_clip(&self) -> Option<&ClipId> {
        self.voices.iter().find(|v| v.to > 0.0).map(|v| &v.clip)
    }
}
