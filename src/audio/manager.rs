//! Sound manager
//!
//! Plays multiple overlapping copies of each sound effect. Every effect is
//! loaded once with a fixed pool of instances; `play` picks the first
//! instance that is not currently playing.

use std::path::{Path, PathBuf};

use nalgebra::Vector3;

use super::backend::{AudioBackend, InstanceFlags};
use super::error::SoundError;
use super::sounds::{SoundEntry, SoundSettings};

/// One specific instance of one specific effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Voice {
    pub effect: usize,
    pub instance: usize,
}

/// Which instance an adjustment applies to
///
/// Unset fields fall back to the last played effect and instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Target {
    pub effect: Option<usize>,
    pub instance: Option<usize>,
}

impl Target {
    /// The instance returned by the most recent `play` or `play_looped`
    pub const LAST: Target = Target {
        effect: None,
        instance: None,
    };

    /// An instance of the last played effect
    pub const fn instance(instance: usize) -> Self {
        Self {
            effect: None,
            instance: Some(instance),
        }
    }

    /// A fully specified instance
    pub const fn voice(effect: usize, instance: usize) -> Self {
        Self {
            effect: Some(effect),
            instance: Some(instance),
        }
    }
}

impl From<Voice> for Target {
    fn from(voice: Voice) -> Self {
        Target::voice(voice.effect, voice.instance)
    }
}

struct SoundInstance<B: AudioBackend> {
    voice: B::Instance,
    /// Requested volume, restored on unmute
    volume: f32,
    /// Non-spatial instances ignore `move_to`
    spatial: bool,
}

struct SoundEffect<B: AudioBackend> {
    path: PathBuf,
    data: B::Effect,
    instances: Vec<SoundInstance<B>>,
}

/// Owns the audio backend, the loaded effects and all their instances
pub struct SoundManager<B: AudioBackend> {
    backend: B,
    effects: Vec<SoundEffect<B>>,
    max_sounds: usize,
    last_played: Option<Voice>,
    muted: bool,
}

impl<B: AudioBackend> SoundManager<B> {
    /// Create an empty manager allowing at most `max_sounds` effects
    pub fn new(backend: B, max_sounds: usize) -> Self {
        Self {
            backend,
            effects: Vec::new(),
            max_sounds,
            last_played: None,
            muted: false,
        }
    }

    /// Create a manager and load every sound listed in `settings`
    pub fn from_settings(backend: B, settings: &SoundSettings) -> Result<Self, SoundError> {
        let mut manager = Self::new(backend, settings.max_sounds);
        manager.load(&settings.sounds)?;
        Ok(manager)
    }

    /// Load sound effects, assigning indices in list order
    ///
    /// Either every entry loads or nothing does. Can only succeed once.
    pub fn load(&mut self, entries: &[SoundEntry]) -> Result<(), SoundError> {
        if !self.effects.is_empty() {
            return Err(SoundError::AlreadyLoaded);
        }
        if entries.len() > self.max_sounds {
            return Err(SoundError::TooManySounds {
                requested: entries.len(),
                max: self.max_sounds,
            });
        }
        if let Some(entry) = entries.iter().find(|e| e.instances == 0) {
            return Err(SoundError::NoInstances(entry.file.clone()));
        }

        let mut effects = Vec::with_capacity(entries.len());
        for entry in entries {
            let data = self.backend.load_effect(&entry.file)?;
            let flags = InstanceFlags {
                spatial: entry.spatial,
            };
            let mut instances = Vec::with_capacity(entry.instances);
            for _ in 0..entry.instances {
                let mut voice = self.backend.create_instance(&data, flags);
                if self.muted {
                    self.backend.set_volume(&mut voice, 0.0);
                }
                instances.push(SoundInstance {
                    voice,
                    volume: 1.0,
                    spatial: entry.spatial,
                });
            }
            effects.push(SoundEffect {
                path: entry.file.clone(),
                data,
                instances,
            });
        }

        self.effects = effects;
        log::info!("Loaded {} sounds", self.effects.len());
        Ok(())
    }

    /// Play a sound, returning the instance used
    ///
    /// Returns `Ok(None)` when every instance of the sound is busy.
    pub fn play(&mut self, effect: usize) -> Result<Option<usize>, SoundError> {
        self.start(effect, false)
    }

    /// Play a sound looped, returning the instance used
    pub fn play_looped(&mut self, effect: usize) -> Result<Option<usize>, SoundError> {
        self.start(effect, true)
    }

    fn start(&mut self, effect: usize, looped: bool) -> Result<Option<usize>, SoundError> {
        self.check_effect(effect)?;
        let Some(instance) = self.next_instance(effect) else {
            log::debug!(
                "All {} instances of {} busy, skipping",
                self.effects[effect].instances.len(),
                self.effects[effect].path.display()
            );
            return Ok(None);
        };

        let slot = &mut self.effects[effect].instances[instance];
        self.backend.play(&mut slot.voice, looped);
        self.last_played = Some(Voice { effect, instance });
        Ok(Some(instance))
    }

    /// First instance of `effect` that is not playing
    fn next_instance(&self, effect: usize) -> Option<usize> {
        self.effects[effect]
            .instances
            .iter()
            .position(|slot| !self.backend.is_playing(&slot.voice))
    }

    /// Set the 3D position of an instance, in Render World units
    ///
    /// Instances loaded with `spatial: false` keep their position.
    pub fn move_to(&mut self, position: Vector3<f32>, target: Target) -> Result<(), SoundError> {
        let voice = self.resolve(target)?;
        let slot = &mut self.effects[voice.effect].instances[voice.instance];
        if slot.spatial {
            self.backend.set_position(&mut slot.voice, position);
        }
        Ok(())
    }

    /// Move the listener that spatial instances are heard from
    pub fn set_listener(&mut self, listener: Vector3<f32>) {
        self.backend.set_listener(listener);
    }

    /// Set the pitch shift of an instance in octaves, clamped to [-1, 1]
    ///
    /// NaN and infinite values reset the pitch to 0.
    pub fn set_pitch(&mut self, pitch: f32, target: Target) -> Result<(), SoundError> {
        let voice = self.resolve(target)?;
        let slot = &mut self.effects[voice.effect].instances[voice.instance];
        let pitch = if pitch.is_finite() {
            pitch.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        self.backend.set_pitch(&mut slot.voice, pitch);
        Ok(())
    }

    /// Set the volume of an instance
    ///
    /// While muted the value is remembered and applied on unmute.
    pub fn set_volume(&mut self, volume: f32, target: Target) -> Result<(), SoundError> {
        let voice = self.resolve(target)?;
        let slot = &mut self.effects[voice.effect].instances[voice.instance];
        slot.volume = volume.max(0.0);
        if !self.muted {
            self.backend.set_volume(&mut slot.voice, slot.volume);
        }
        Ok(())
    }

    /// Toggle mute, returning whether sound is now muted
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        for slot in self.effects.iter_mut().flat_map(|e| e.instances.iter_mut()) {
            let volume = if self.muted { 0.0 } else { slot.volume };
            self.backend.set_volume(&mut slot.voice, volume);
        }
        log::info!("Sound {}", if self.muted { "muted" } else { "unmuted" });
        self.muted
    }

    /// Stop every instance of a sound
    pub fn stop(&mut self, effect: usize) -> Result<(), SoundError> {
        self.check_effect(effect)?;
        for slot in &mut self.effects[effect].instances {
            self.backend.stop(&mut slot.voice);
        }
        Ok(())
    }

    /// Stop every instance of every sound
    pub fn stop_all(&mut self) {
        for slot in self.effects.iter_mut().flat_map(|e| e.instances.iter_mut()) {
            self.backend.stop(&mut slot.voice);
        }
    }

    /// Whether a specific instance is playing
    pub fn is_playing(&self, voice: Voice) -> Result<bool, SoundError> {
        self.check_voice(voice)?;
        let slot = &self.effects[voice.effect].instances[voice.instance];
        Ok(self.backend.is_playing(&slot.voice))
    }

    /// Number of sounds loaded
    pub fn count(&self) -> usize {
        self.effects.len()
    }

    /// Maximum number of sounds allowed
    pub fn max_sounds(&self) -> usize {
        self.max_sounds
    }

    /// Number of instances of a sound
    pub fn instance_count(&self, effect: usize) -> Result<usize, SoundError> {
        self.check_effect(effect)?;
        Ok(self.effects[effect].instances.len())
    }

    /// Loaded data of a sound
    pub fn effect(&self, effect: usize) -> Result<&B::Effect, SoundError> {
        self.check_effect(effect)?;
        Ok(&self.effects[effect].data)
    }

    /// File a sound was loaded from
    pub fn sound_path(&self, effect: usize) -> Result<&Path, SoundError> {
        self.check_effect(effect)?;
        Ok(&self.effects[effect].path)
    }

    /// Check if sound is muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// The instance most recently started by `play` or `play_looped`
    pub fn last_played(&self) -> Option<Voice> {
        self.last_played
    }

    /// Get the backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Get the backend mutably
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn resolve(&self, target: Target) -> Result<Voice, SoundError> {
        let effect = match target.effect {
            Some(effect) => effect,
            None => self.last_played.ok_or(SoundError::NothingPlayed)?.effect,
        };
        let instance = match target.instance {
            Some(instance) => instance,
            None => self.last_played.ok_or(SoundError::NothingPlayed)?.instance,
        };
        let voice = Voice { effect, instance };
        self.check_voice(voice)?;
        Ok(voice)
    }

    fn check_effect(&self, effect: usize) -> Result<(), SoundError> {
        if effect < self.effects.len() {
            Ok(())
        } else {
            Err(SoundError::InvalidEffect {
                index: effect,
                count: self.effects.len(),
            })
        }
    }

    fn check_voice(&self, voice: Voice) -> Result<(), SoundError> {
        self.check_effect(voice.effect)?;
        let count = self.effects[voice.effect].instances.len();
        if voice.instance < count {
            Ok(())
        } else {
            Err(SoundError::InvalidInstance {
                effect: voice.effect,
                instance: voice.instance,
                count,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SilentBackend;

    #[derive(Debug)]
    struct FakeVoice {
        playing: bool,
        looped: bool,
        plays: u32,
        volume: f32,
        pitch: f32,
        position: Vector3<f32>,
        flags: InstanceFlags,
    }

    /// Backend whose voices play until the test finishes them
    struct FakeBackend {
        missing: Vec<PathBuf>,
        loaded: Vec<PathBuf>,
        listener: Vector3<f32>,
    }

    impl Default for FakeBackend {
        fn default() -> Self {
            Self {
                missing: Vec::new(),
                loaded: Vec::new(),
                listener: Vector3::zeros(),
            }
        }
    }

    impl AudioBackend for FakeBackend {
        type Effect = PathBuf;
        type Instance = FakeVoice;

        fn load_effect(&mut self, path: &Path) -> Result<PathBuf, SoundError> {
            if self.missing.iter().any(|m| m == path) {
                return Err(SoundError::LoadFailed {
                    path: path.to_path_buf(),
                    reason: "file not found".to_string(),
                });
            }
            self.loaded.push(path.to_path_buf());
            Ok(path.to_path_buf())
        }

        fn create_instance(&mut self, _effect: &PathBuf, flags: InstanceFlags) -> FakeVoice {
            FakeVoice {
                playing: false,
                looped: false,
                plays: 0,
                volume: 1.0,
                pitch: 0.0,
                position: Vector3::zeros(),
                flags,
            }
        }

        fn play(&mut self, instance: &mut FakeVoice, looped: bool) {
            instance.playing = true;
            instance.looped = looped;
            instance.plays += 1;
        }

        fn stop(&mut self, instance: &mut FakeVoice) {
            instance.playing = false;
        }

        fn is_playing(&self, instance: &FakeVoice) -> bool {
            instance.playing
        }

        fn set_position(&mut self, instance: &mut FakeVoice, position: Vector3<f32>) {
            instance.position = position;
        }

        fn set_pitch(&mut self, instance: &mut FakeVoice, pitch: f32) {
            instance.pitch = pitch;
        }

        fn set_volume(&mut self, instance: &mut FakeVoice, volume: f32) {
            instance.volume = volume;
        }

        fn set_listener(&mut self, listener: Vector3<f32>) {
            self.listener = listener;
        }
    }

    fn manager(entries: &[SoundEntry]) -> SoundManager<FakeBackend> {
        let mut manager = SoundManager::new(FakeBackend::default(), 8);
        manager.load(entries).unwrap();
        manager
    }

    fn voice(manager: &SoundManager<FakeBackend>, effect: usize, instance: usize) -> &FakeVoice {
        &manager.effects[effect].instances[instance].voice
    }

    #[test]
    fn test_play_uses_distinct_instances() {
        let mut sm = manager(&[SoundEntry::new("click.wav").with_instances(3)]);

        assert_eq!(sm.play(0).unwrap(), Some(0));
        assert_eq!(sm.play(0).unwrap(), Some(1));
        assert_eq!(sm.play(0).unwrap(), Some(2));
        // Pool exhausted
        assert_eq!(sm.play(0).unwrap(), None);
        assert_eq!(sm.last_played(), Some(Voice { effect: 0, instance: 2 }));
    }

    #[test]
    fn test_finished_instance_is_reused() {
        let mut sm = manager(&[SoundEntry::new("click.wav").with_instances(3)]);
        for _ in 0..3 {
            sm.play(0).unwrap();
        }

        sm.effects[0].instances[1].voice.playing = false;
        assert_eq!(sm.play(0).unwrap(), Some(1));
        assert_eq!(voice(&sm, 0, 1).plays, 2);
    }

    #[test]
    fn test_loop() {
        let mut sm = manager(&[SoundEntry::new("hum.wav").with_instances(2)]);
        assert_eq!(sm.play_looped(0).unwrap(), Some(0));
        assert!(voice(&sm, 0, 0).looped);
        assert!(sm.is_playing(Voice { effect: 0, instance: 0 }).unwrap());

        assert_eq!(sm.play(0).unwrap(), Some(1));
        assert!(!voice(&sm, 0, 1).looped);
    }

    #[test]
    fn test_invalid_effect() {
        let mut sm = manager(&[SoundEntry::new("click.wav")]);
        assert!(matches!(
            sm.play(1),
            Err(SoundError::InvalidEffect { index: 1, count: 1 })
        ));
        assert!(sm.play_looped(5).is_err());
        assert!(sm.stop(1).is_err());
        assert!(sm.instance_count(1).is_err());
    }

    #[test]
    fn test_last_played_target() {
        let mut sm = manager(&[
            SoundEntry::new("a.wav").with_instances(2),
            SoundEntry::new("b.wav").with_instances(2),
        ]);
        sm.play(0).unwrap();
        sm.play(0).unwrap();
        sm.play(1).unwrap();

        sm.set_volume(0.25, Target::LAST).unwrap();
        sm.set_pitch(0.5, Target::LAST).unwrap();
        sm.move_to(Vector3::new(3.0, 0.0, 1.0), Target::LAST).unwrap();

        let b = voice(&sm, 1, 0);
        assert_eq!(b.volume, 0.25);
        assert_eq!(b.pitch, 0.5);
        assert_eq!(b.position, Vector3::new(3.0, 0.0, 1.0));

        // Sound a was untouched
        assert_eq!(voice(&sm, 0, 1).volume, 1.0);
        assert_eq!(voice(&sm, 0, 0).pitch, 0.0);
    }

    #[test]
    fn test_explicit_targets() {
        let mut sm = manager(&[
            SoundEntry::new("a.wav").with_instances(2),
            SoundEntry::new("b.wav").with_instances(3),
        ]);
        sm.play(1).unwrap();

        // Instance 2 of the last played sound (b)
        sm.set_volume(0.5, Target::instance(2)).unwrap();
        assert_eq!(voice(&sm, 1, 2).volume, 0.5);

        sm.set_volume(0.1, Target::voice(0, 1)).unwrap();
        assert_eq!(voice(&sm, 0, 1).volume, 0.1);

        // Effect given, instance falls back to last played instance (0)
        sm.set_pitch(-0.5, Target { effect: Some(0), instance: None }).unwrap();
        assert_eq!(voice(&sm, 0, 0).pitch, -0.5);

        assert!(matches!(
            sm.set_volume(0.5, Target::voice(0, 2)),
            Err(SoundError::InvalidInstance { effect: 0, instance: 2, count: 2 })
        ));
    }

    #[test]
    fn test_nothing_played() {
        let mut sm = manager(&[SoundEntry::new("a.wav")]);
        assert!(matches!(
            sm.set_volume(0.5, Target::LAST),
            Err(SoundError::NothingPlayed)
        ));
        // A fully specified target does not need a previous play
        assert!(sm.set_volume(0.5, Target::voice(0, 0)).is_ok());
    }

    #[test]
    fn test_pitch_and_volume_are_clamped() {
        let mut sm = manager(&[SoundEntry::new("a.wav")]);
        sm.play(0).unwrap();
        sm.set_pitch(3.0, Target::LAST).unwrap();
        sm.set_volume(-1.0, Target::LAST).unwrap();
        assert_eq!(voice(&sm, 0, 0).pitch, 1.0);
        assert_eq!(voice(&sm, 0, 0).volume, 0.0);
    }

    #[test]
    fn test_non_finite_pitch_resets() {
        let mut sm = manager(&[SoundEntry::new("a.wav")]);
        sm.play(0).unwrap();
        sm.set_pitch(0.5, Target::LAST).unwrap();
        sm.set_pitch(f32::NAN, Target::LAST).unwrap();
        assert_eq!(voice(&sm, 0, 0).pitch, 0.0);

        sm.set_pitch(f32::INFINITY, Target::LAST).unwrap();
        assert_eq!(voice(&sm, 0, 0).pitch, 0.0);
    }

    #[test]
    fn test_spatial_flag_reaches_instances() {
        let mut sm = manager(&[
            SoundEntry::new("crate_hit.wav").with_instances(2),
            SoundEntry::new("ambience.wav").with_spatial(false),
        ]);
        assert!(voice(&sm, 0, 0).flags.spatial);
        assert!(voice(&sm, 0, 1).flags.spatial);
        assert!(!voice(&sm, 1, 0).flags.spatial);

        let here = Vector3::new(4.0, 0.0, 2.0);
        sm.move_to(here, Target::voice(0, 1)).unwrap();
        sm.move_to(here, Target::voice(1, 0)).unwrap();
        assert_eq!(voice(&sm, 0, 1).position, here);
        // Non-spatial sounds stay put
        assert_eq!(voice(&sm, 1, 0).position, Vector3::zeros());
    }

    #[test]
    fn test_set_listener() {
        let mut sm = manager(&[SoundEntry::new("a.wav")]);
        sm.set_listener(Vector3::new(-3.0, 1.0, 0.0));
        assert_eq!(sm.backend().listener, Vector3::new(-3.0, 1.0, 0.0));
    }

    #[test]
    fn test_mute_toggle_restores_volumes() {
        let mut sm = manager(&[
            SoundEntry::new("a.wav").with_instances(2),
            SoundEntry::new("b.wav"),
        ]);
        sm.set_volume(0.3, Target::voice(0, 1)).unwrap();
        sm.set_volume(0.7, Target::voice(1, 0)).unwrap();

        assert!(sm.toggle_mute());
        assert!(sm.is_muted());
        assert_eq!(voice(&sm, 0, 0).volume, 0.0);
        assert_eq!(voice(&sm, 0, 1).volume, 0.0);
        assert_eq!(voice(&sm, 1, 0).volume, 0.0);

        assert!(!sm.toggle_mute());
        assert_eq!(voice(&sm, 0, 0).volume, 1.0);
        assert_eq!(voice(&sm, 0, 1).volume, 0.3);
        assert_eq!(voice(&sm, 1, 0).volume, 0.7);
    }

    #[test]
    fn test_volume_while_muted_applies_on_unmute() {
        let mut sm = manager(&[SoundEntry::new("a.wav")]);
        sm.toggle_mute();
        sm.set_volume(0.4, Target::voice(0, 0)).unwrap();
        assert_eq!(voice(&sm, 0, 0).volume, 0.0);

        sm.toggle_mute();
        assert_eq!(voice(&sm, 0, 0).volume, 0.4);
    }

    #[test]
    fn test_load_too_many() {
        let mut sm = SoundManager::new(FakeBackend::default(), 1);
        let result = sm.load(&[SoundEntry::new("a.wav"), SoundEntry::new("b.wav")]);
        assert!(matches!(
            result,
            Err(SoundError::TooManySounds { requested: 2, max: 1 })
        ));
        assert_eq!(sm.count(), 0);
        assert!(sm.backend().loaded.is_empty());
    }

    #[test]
    fn test_load_is_all_or_nothing() {
        let backend = FakeBackend {
            missing: vec![PathBuf::from("b.wav")],
            ..Default::default()
        };
        let mut sm = SoundManager::new(backend, 4);
        let entries = [SoundEntry::new("a.wav"), SoundEntry::new("b.wav")];

        assert!(matches!(sm.load(&entries), Err(SoundError::LoadFailed { .. })));
        assert_eq!(sm.count(), 0);
        assert!(sm.play(0).is_err());

        sm.backend_mut().missing.clear();
        sm.load(&entries).unwrap();
        assert_eq!(sm.count(), 2);
    }

    #[test]
    fn test_load_twice() {
        let mut sm = manager(&[SoundEntry::new("a.wav")]);
        assert!(matches!(
            sm.load(&[SoundEntry::new("b.wav")]),
            Err(SoundError::AlreadyLoaded)
        ));
        assert_eq!(sm.count(), 1);
    }

    #[test]
    fn test_load_zero_instances() {
        let mut sm = SoundManager::new(FakeBackend::default(), 4);
        let result = sm.load(&[SoundEntry::new("a.wav").with_instances(0)]);
        assert!(matches!(result, Err(SoundError::NoInstances(_))));
    }

    #[test]
    fn test_stop() {
        let mut sm = manager(&[
            SoundEntry::new("a.wav").with_instances(2),
            SoundEntry::new("b.wav"),
        ]);
        sm.play(0).unwrap();
        sm.play_looped(0).unwrap();
        sm.play(1).unwrap();

        sm.stop(0).unwrap();
        assert!(!voice(&sm, 0, 0).playing);
        assert!(!voice(&sm, 0, 1).playing);
        assert!(voice(&sm, 1, 0).playing);

        sm.stop_all();
        assert!(!voice(&sm, 1, 0).playing);
        assert_eq!(sm.play(0).unwrap(), Some(0));
    }

    #[test]
    fn test_from_settings() {
        let settings = SoundSettings {
            max_sounds: 2,
            sounds: vec![SoundEntry::new("a.wav").with_instances(4)],
            ..Default::default()
        };
        let sm = SoundManager::from_settings(FakeBackend::default(), &settings).unwrap();
        assert_eq!(sm.count(), 1);
        assert_eq!(sm.max_sounds(), 2);
        assert_eq!(sm.instance_count(0).unwrap(), 4);
        assert_eq!(sm.effect(0).unwrap(), &PathBuf::from("a.wav"));
        assert_eq!(sm.sound_path(0).unwrap(), Path::new("a.wav"));
    }

    #[test]
    fn test_silent_backend() {
        let mut sm = SoundManager::new(SilentBackend, 4);
        sm.load(&[SoundEntry::new("missing.wav").with_instances(2)]).unwrap();

        // Nothing ever plays, so the first instance is always free
        assert_eq!(sm.play(0).unwrap(), Some(0));
        assert_eq!(sm.play(0).unwrap(), Some(0));
        assert!(!sm.is_playing(Voice { effect: 0, instance: 0 }).unwrap());
        sm.set_volume(0.5, Target::LAST).unwrap();
    }
}
