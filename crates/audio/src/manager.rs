//! Audio manager: clip cache, one-shots and looped voices.

use crate::mixer::Voice;
use crate::settings::{AudioSettings, MixerGroup};
use anyhow::Result;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use stormrunner_core::ClipId;
use tracing::debug;

#[cfg(feature = "rodio_backend")]
mod backend {
    use super::*;
    use anyhow::Context;
    use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
    use std::io::Cursor;

    /// Audio data for a loaded clip.
    pub struct ClipData {
        /// Raw audio bytes
        pub data: Vec<u8>,
    }

    /// Backend state for rodio audio.
    pub struct BackendState {
        /// Output stream (must be kept alive)
        _stream: OutputStream,
        /// Stream handle for creating sinks
        stream_handle: OutputStreamHandle,
        /// Active one-shot sinks
        one_shots: Vec<Sink>,
        /// Looping sinks keyed by group and clip
        loops: BTreeMap<(MixerGroup, ClipId), Sink>,
    }

    impl BackendState {
        pub fn new() -> Result<Self> {
            let (stream, stream_handle) =
                OutputStream::try_default().context("Failed to create audio output stream")?;

            Ok(Self {
                _stream: stream,
                stream_handle,
                one_shots: Vec::new(),
                loops: BTreeMap::new(),
            })
        }

        pub fn play_once(&mut self, data: &ClipData, volume: f32) -> Result<()> {
            let source = rodio::Decoder::new(Cursor::new(data.data.clone()))
                .context("Failed to decode audio")?;
            let sink = Sink::try_new(&self.stream_handle).context("Failed to create audio sink")?;
            sink.set_volume(volume);
            sink.append(source);

            self.one_shots.retain(|s| !s.empty());
            self.one_shots.push(sink);
            Ok(())
        }

        pub fn set_loop(
            &mut self,
            group: MixerGroup,
            clip: &ClipId,
            data: Option<&ClipData>,
            volume: f32,
        ) -> Result<()> {
            let key = (group, clip.clone());
            if let Some(sink) = self.loops.get(&key) {
                sink.set_volume(volume);
                return Ok(());
            }
            let Some(data) = data else {
                return Ok(());
            };
            let source = rodio::Decoder::new(Cursor::new(data.data.clone()))
                .context("Failed to decode audio")?
                .repeat_infinite();
            let sink = Sink::try_new(&self.stream_handle).context("Failed to create audio sink")?;
            sink.set_volume(volume);
            sink.append(source);
            self.loops.insert(key, sink);
            Ok(())
        }

        pub fn stop_loop(&mut self, group: MixerGroup, clip: &ClipId) {
            if let Some(sink) = self.loops.remove(&(group, clip.clone())) {
                sink.stop();
            }
        }

        pub fn update(&mut self) {
            self.one_shots.retain(|s| !s.empty());
        }

        pub fn active_sound_count(&self) -> usize {
            self.one_shots.len() + self.loops.len()
        }

        pub fn stop_all(&mut self) {
            for sink in self.one_shots.drain(..) {
                sink.stop();
            }
            for (_, sink) in std::mem::take(&mut self.loops) {
                sink.stop();
            }
        }
    }
}

#[cfg(not(feature = "rodio_backend"))]
mod backend {
    use super::*;

    /// Audio data for a loaded clip (stub).
    #[allow(dead_code)]
    pub struct ClipData {
        /// Raw audio bytes (unused in stub mode)
        pub data: Vec<u8>,
    }

    /// Backend state stub when rodio is not available.
    pub struct BackendState;

    impl BackendState {
        pub fn new() -> Result<Self> {
            debug!("Audio backend: stub (no rodio)");
            Ok(Self)
        }

        pub fn play_once(&mut self, _data: &ClipData, _volume: f32) -> Result<()> {
            Ok(())
        }

        pub fn set_loop(
            &mut self,
            _group: MixerGroup,
            _clip: &ClipId,
            _data: Option<&ClipData>,
            _volume: f32,
        ) -> Result<()> {
            Ok(())
        }

        pub fn stop_loop(&mut self, _group: MixerGroup, _clip: &ClipId) {}

        pub fn update(&mut self) {}

        pub fn active_sound_count(&self) -> usize {
            0
        }

        pub fn stop_all(&mut self) {}
    }
}

use backend::{BackendState, ClipData};

/// Gains below this are treated as silent.
const SILENCE: f32 = 1e-3;

/// Output side of the weather audio.
///
/// Voices are mixed as `voice gain * master * group`. Looped voices are
/// reconciled against the desired set each tick with [`AudioManager::sync_loops`];
/// one-shots (thunder) fire and forget. Without a backend the manager still
/// tracks what it would play, which is what headless runs and tests inspect.
pub struct AudioManager {
    /// Backend state
    backend: Option<BackendState>,
    /// Current audio settings
    settings: AudioSettings,
    /// Loaded clip cache
    clips: HashMap<ClipId, Arc<ClipData>>,
    /// Effective loop volumes as of the last sync
    loops: BTreeMap<(MixerGroup, ClipId), f32>,
    /// One-shots requested so far
    one_shots: u64,
}

impl AudioManager {
    /// Create a new audio manager.
    ///
    /// Initializes the audio output device and prepares for playback.
    /// Falls back to a stub if audio initialization fails.
    pub fn new() -> Result<Self> {
        let backend = match BackendState::new() {
            Ok(b) => {
                debug!("Audio manager initialized");
                Some(b)
            }
            Err(e) => {
                tracing::warn!("Failed to initialize audio: {}. Using stub.", e);
                None
            }
        };

        Ok(Self {
            backend,
            ..Self::stub()
        })
    }

    /// Create a stub audio manager that doesn't actually play audio.
    ///
    /// Useful for testing or headless operation.
    pub fn stub() -> Self {
        Self {
            backend: None,
            settings: AudioSettings::default(),
            clips: HashMap::new(),
            loops: BTreeMap::new(),
            one_shots: 0,
        }
    }

    /// Check if audio playback is available.
    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Get the current audio settings.
    pub fn settings(&self) -> &AudioSettings {
        &self.settings
    }

    /// Get mutable access to audio settings.
    ///
    /// Loop volumes pick up the change on the next [`AudioManager::sync_loops`].
    pub fn settings_mut(&mut self) -> &mut AudioSettings {
        &mut self.settings
    }

    /// Load a clip into memory.
    pub fn load_clip(&mut self, id: ClipId, data: Vec<u8>) {
        debug!(clip = %id, bytes = data.len(), "Loaded clip");
        self.clips.insert(id, Arc::new(ClipData { data }));
    }

    /// Whether `id` has been loaded.
    pub fn is_loaded(&self, id: &ClipId) -> bool {
        self.clips.contains_key(id)
    }

    /// Fire a one-shot of `id` in `group` at `volume`.
    pub fn play_one_shot(&mut self, id: &ClipId, group: MixerGroup, volume: f32) {
        let volume = volume * self.settings.effective_volume(group);
        if volume < SILENCE {
            return; // Too quiet to hear
        }
        self.one_shots += 1;

        match self.clips.get(id) {
            Some(data) => {
                if let Some(backend) = &mut self.backend {
                    if let Err(e) = backend.play_once(data.as_ref(), volume) {
                        tracing::warn!("Failed to play clip {}: {}", id, e);
                    }
                }
            }
            // Clip not loaded - normal in headless runs
            None => debug!(clip = %id, "Clip not loaded"),
        }
    }

    /// Reconcile the looping voices of `group` with `voices`.
    ///
    /// Loops missing from `voices` (or gone silent) are stopped.
    pub fn sync_loops(&mut self, group: MixerGroup, voices: &[Voice]) {
        let group_volume = self.settings.effective_volume(group);
        let mut desired: BTreeMap<ClipId, f32> = BTreeMap::new();
        for voice in voices {
            let volume = voice.gain * group_volume;
            if volume >= SILENCE {
                desired.insert(voice.clip.clone(), volume);
            }
        }

        let stale: Vec<ClipId> = self
            .loops
            .keys()
            .filter(|(g, clip)| *g == group && !desired.contains_key(clip))
            .map(|(_, clip)| clip.clone())
            .collect();
        for clip in stale {
            self.loops.remove(&(group, clip.clone()));
            if let Some(backend) = &mut self.backend {
                backend.stop_loop(group, &clip);
            }
        }

        for (clip, volume) in desired {
            if let Some(backend) = &mut self.backend {
                let data = self.clips.get(&clip).map(Arc::as_ref);
                if let Err(e) = backend.set_loop(group, &clip, data, volume) {
                    tracing::warn!("Failed to loop clip {}: {}", clip, e);
                }
            }
            self.loops.insert((group, clip), volume);
        }
    }

    /// Effective volume of a looping clip (zero when not looping).
    pub fn loop_volume(&self, group: MixerGroup, clip: &ClipId) -> f32 {
        self.loops
            .get(&(group, clip.clone()))
            .copied()
            .unwrap_or(0.0)
    }

    /// Number of loops currently held.
    pub fn loop_count(&self) -> usize {
        self.loops.len()
    }

    /// One-shots requested so far.
    pub fn one_shots_played(&self) -> u64 {
        self.one_shots
    }

    /// Update audio state (call once per frame).
    ///
    /// Cleans up finished one-shots.
    pub fn update(&mut self) {
        if let Some(backend) = &mut self.backend {
            backend.update();
        }
    }

    /// Get the number of currently playing sounds.
    pub fn active_sound_count(&self) -> usize {
        self.backend
            .as_ref()
            .map(|b| b.active_sound_count())
            .unwrap_or(0)
    }

    /// Stop all sounds.
    pub fn stop_all(&mut self) {
        if let Some(backend) = &mut self.backend {
            backend.stop_all();
        }
        self.loops.clear();
    }
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::stub()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(clip: &str, gain: f32) -> Voice {
        Voice {
            clip: ClipId::new(clip),
            gain,
        }
    }

    #[test]
    fn stub_tracks_state_without_output() {
        let mut manager = AudioManager::stub();
        assert!(!manager.is_available());
        manager.sync_loops(MixerGroup::Ambient, &[voice("wind", 1.0)]);
        assert_eq!(manager.active_sound_count(), 0);
        assert_eq!(manager.loop_count(), 1);
        manager.stop_all();
        assert_eq!(manager.loop_count(), 0);
    }

    #[test]
    fn master_change_applies_on_next_sync() {
        let mut manager = AudioManager::stub();
        manager.sync_loops(MixerGroup::Ambient, &[voice("wind", 1.0)]);
        manager.settings_mut().set_master(0.5);
        assert_eq!(manager.loop_volume(MixerGroup::Ambient, &ClipId::new("wind")), 0.5);
        manager.sync_loops(MixerGroup::Ambient, &[voice("wind", 1.0)]);
        assert_eq!(manager.loop_volume(MixerGroup::Ambient, &ClipId::new("wind")), 0.25);
    }

    #[test]
    fn loops_follow_voices_and_mixer() {
        let mut manager = AudioManager::stub();
        manager.sync_loops(MixerGroup::Weather, &[voice("storm", 0.5), voice("rain_heavy", 0.25)]);
        // weather group 0.8
        assert!((manager.loop_volume(MixerGroup::Weather, &ClipId::new("storm")) - 0.4).abs() < 1e-6);
        assert_eq!(manager.loop_count(), 2);

        manager.sync_loops(MixerGroup::Weather, &[voice("storm", 1.0), voice("rain_heavy", 0.0)]);
        assert_eq!(manager.loop_count(), 1);
        assert_eq!(
            manager.loop_volume(MixerGroup::Weather, &ClipId::new("rain_heavy")),
            0.0
        );
    }

    #[test]
    fn syncing_one_group_leaves_others() {
        let mut manager = AudioManager::stub();
        manager.sync_loops(MixerGroup::Music, &[voice("music_01", 1.0)]);
        manager.sync_loops(MixerGroup::Weather, &[]);
        assert!((manager.loop_volume(MixerGroup::Music, &ClipId::new("music_01")) - 0.7).abs() < 1e-6);
    }

    #[test]
    fn muted_one_shots_are_dropped() {
        let mut manager = AudioManager::stub();
        manager.play_one_shot(&ClipId::new("thunder_01"), MixerGroup::Sfx, 1.0);
        assert_eq!(manager.one_shots_played(), 1);

        manager.settings_mut().toggle_mute();
        manager.play_one_shot(&ClipId::new("thunder_02"), MixerGroup::Sfx, 1.0);
        assert_eq!(manager.one_shots_played(), 1);
    }

    #[test]
    fn loaded_clips_are_cached() {
        let mut manager = AudioManager::stub();
        manager.load_clip(ClipId::new("thunder_01"), vec![0u8; 16]);
        assert!(manager.is_loaded(&ClipId::new("thunder_01")));
        assert!(!manager.is_loaded(&ClipId::new("thunder_02")));
    }
}
