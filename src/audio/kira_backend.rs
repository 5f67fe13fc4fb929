//! Audio backend using Kira
//!
//! Every instance keeps its own copy of the decoded sound (shared frames,
//! so cloning is cheap) along with the volume, pitch and position last set
//! on it. Those settings survive a replay of the same instance.

use std::path::Path;

use kira::{
    manager::{backend::DefaultBackend, AudioManager as KiraManager, AudioManagerSettings},
    sound::{
        static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings},
        PlaybackRate, PlaybackState,
    },
    tween::Tween,
    Volume,
};
use nalgebra::Vector3;

use super::backend::{AudioBackend, InstanceFlags};
use super::error::SoundError;
use super::sounds::SoundSettings;

/// Kira audio manager plus the listener that spatial sounds are heard from
pub struct KiraBackend {
    manager: KiraManager,
    listener: Vector3<f32>,
    reference_distance: f32,
}

/// One voice of a sound effect
pub struct KiraVoice {
    data: StaticSoundData,
    handle: Option<StaticSoundHandle>,
    spatial: bool,
    volume: f32,
    pitch: f32,
    position: Vector3<f32>,
}

impl KiraBackend {
    /// Open the default audio device
    pub fn new(settings: &SoundSettings) -> Result<Self, SoundError> {
        let manager = KiraManager::<DefaultBackend>::new(AudioManagerSettings::default())
            .map_err(|e| SoundError::Backend(e.to_string()))?;
        log::info!("Audio manager initialized successfully");

        let (x, y, z) = settings.listener;
        Ok(Self {
            manager,
            listener: Vector3::new(x, y, z),
            reference_distance: settings.reference_distance,
        })
    }

    /// Pan and amplitude a voice should play with right now
    fn mix(&self, voice: &KiraVoice) -> (f64, f64) {
        let (pan, gain) = voice_mix(
            voice.spatial,
            voice.position,
            self.listener,
            self.reference_distance,
        );
        (pan, f64::from(voice.volume) * gain)
    }
}

/// Pan and gain for a voice at `position` heard from `listener`
///
/// Non-spatial voices are always centred at full gain.
pub fn voice_mix(
    spatial: bool,
    position: Vector3<f32>,
    listener: Vector3<f32>,
    reference_distance: f32,
) -> (f64, f64) {
    if spatial {
        spatial_mix(position - listener, reference_distance)
    } else {
        (0.5, 1.0)
    }
}

/// Pan (0 left, 0.5 centre, 1 right) and gain for an emitter at `offset`
/// from the listener. Gain halves at `reference_distance`.
pub fn spatial_mix(offset: Vector3<f32>, reference_distance: f32) -> (f64, f64) {
    let distance = offset.norm();
    if distance <= f32::EPSILON {
        return (0.5, 1.0);
    }
    let side = (offset.x / distance).clamp(-1.0, 1.0);
    let pan = 0.5 + 0.5 * f64::from(side);
    let gain = 1.0 / (1.0 + f64::from(distance / reference_distance));
    (pan, gain)
}

/// Playback rate factor for a pitch shift in octaves
pub fn pitch_factor(pitch: f32) -> f64 {
    2f64.powf(f64::from(pitch))
}

impl AudioBackend for KiraBackend {
    type Effect = StaticSoundData;
    type Instance = KiraVoice;

    fn load_effect(&mut self, path: &Path) -> Result<StaticSoundData, SoundError> {
        if !path.exists() {
            return Err(SoundError::LoadFailed {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
            });
        }
        StaticSoundData::from_file(path).map_err(|e| SoundError::LoadFailed {
            path: path.to_path_buf(),
            reason: format!("{:?}", e),
        })
    }

    fn create_instance(&mut self, effect: &StaticSoundData, flags: InstanceFlags) -> KiraVoice {
        KiraVoice {
            data: effect.clone(),
            handle: None,
            spatial: flags.spatial,
            volume: 1.0,
            pitch: 0.0,
            position: Vector3::zeros(),
        }
    }

    fn play(&mut self, instance: &mut KiraVoice, looped: bool) {
        if let Some(mut handle) = instance.handle.take() {
            handle.stop(Tween::default());
        }

        let (panning, amplitude) = self.mix(instance);
        let mut settings = StaticSoundSettings::new()
            .volume(Volume::Amplitude(amplitude))
            .playback_rate(PlaybackRate::Factor(pitch_factor(instance.pitch)))
            .panning(panning);
        if looped {
            settings = settings.loop_region(..);
        }

        match self.manager.play(instance.data.clone().with_settings(settings)) {
            Ok(handle) => instance.handle = Some(handle),
            Err(e) => log::debug!("Failed to play sound: {:?}", e),
        }
    }

    fn stop(&mut self, instance: &mut KiraVoice) {
        if let Some(mut handle) = instance.handle.take() {
            handle.stop(Tween::default());
        }
    }

    fn is_playing(&self, instance: &KiraVoice) -> bool {
        instance
            .handle
            .as_ref()
            .is_some_and(|h| matches!(h.state(), PlaybackState::Playing))
    }

    fn set_position(&mut self, instance: &mut KiraVoice, position: Vector3<f32>) {
        if !instance.spatial {
            return;
        }
        instance.position = position;
        let (panning, amplitude) = self.mix(instance);
        if let Some(handle) = instance.handle.as_mut() {
            handle.set_panning(panning, Tween::default());
            handle.set_volume(Volume::Amplitude(amplitude), Tween::default());
        }
    }

    fn set_pitch(&mut self, instance: &mut KiraVoice, pitch: f32) {
        instance.pitch = pitch;
        if let Some(handle) = instance.handle.as_mut() {
            handle.set_playback_rate(PlaybackRate::Factor(pitch_factor(pitch)), Tween::default());
        }
    }

    fn set_volume(&mut self, instance: &mut KiraVoice, volume: f32) {
        instance.volume = volume;
        let (_, amplitude) = self.mix(instance);
        if let Some(handle) = instance.handle.as_mut() {
            handle.set_volume(Volume::Amplitude(amplitude), Tween::default());
        }
    }

    /// Takes effect on the next adjustment or replay of each voice
    fn set_listener(&mut self, listener: Vector3<f32>) {
        self.listener = listener;
    }
}
