//! Audio backend interface
//!
//! The narrow set of engine capabilities the sound manager needs. The
//! manager never talks to an audio library directly, so it can run on
//! [`KiraBackend`](super::KiraBackend), on [`SilentBackend`] when no device
//! is available, or on a fake in tests.

use std::path::Path;

use nalgebra::Vector3;

use super::error::SoundError;

/// Options for a newly created instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceFlags {
    /// Instance is positioned in 3D relative to the listener
    pub spatial: bool,
}

impl Default for InstanceFlags {
    fn default() -> Self {
        Self { spatial: true }
    }
}

/// Capabilities of an audio engine
pub trait AudioBackend {
    /// Loaded sound data
    type Effect;
    /// One playable voice of an effect
    type Instance;

    /// Load a sound effect from a file
    fn load_effect(&mut self, path: &Path) -> Result<Self::Effect, SoundError>;

    /// Create a voice of `effect`
    fn create_instance(&mut self, effect: &Self::Effect, flags: InstanceFlags) -> Self::Instance;

    /// Start playing from the beginning, looping forever if `looped`
    fn play(&mut self, instance: &mut Self::Instance, looped: bool);

    /// Stop playing
    fn stop(&mut self, instance: &mut Self::Instance);

    /// Whether the instance is producing sound
    fn is_playing(&self, instance: &Self::Instance) -> bool;

    /// Set the emitter position in Render World units
    fn set_position(&mut self, instance: &mut Self::Instance, position: Vector3<f32>);

    /// Set the pitch shift in octaves
    fn set_pitch(&mut self, instance: &mut Self::Instance, pitch: f32);

    /// Set the amplitude
    fn set_volume(&mut self, instance: &mut Self::Instance, volume: f32);

    /// Move the listener. Backends without spatial audio ignore it.
    fn set_listener(&mut self, _listener: Vector3<f32>) {}
}

/// Backend that loads and plays nothing
///
/// Used when the audio device cannot be opened, so the game keeps running
/// with sound disabled.
#[derive(Debug, Default)]
pub struct SilentBackend;

impl AudioBackend for SilentBackend {
    type Effect = ();
    type Instance = ();

    fn load_effect(&mut self, path: &Path) -> Result<(), SoundError> {
        log::debug!("Silent backend skipping {}", path.display());
        Ok(())
    }

    fn create_instance(&mut self, _effect: &(), _flags: InstanceFlags) {}

    fn play(&mut self, _instance: &mut (), _looped: bool) {}

    fn stop(&mut self, _instance: &mut ()) {}

    fn is_playing(&self, _instance: &()) -> bool {
        false
    }

    fn set_position(&mut self, _instance: &mut (), _position: Vector3<f32>) {}

    fn set_pitch(&mut self, _instance: &mut (), _pitch: f32) {}

    fn set_volume(&mut self, _instance: &mut (), _volume: f32) {}
}
