//! Jointsim - Sound demo
//!
//! Loads the sound list, plays each sound once while sweeping it across the
//! listener from left to right, then exercises mute.

use std::thread;
use std::time::Duration;

use anyhow::Result;
use nalgebra::Vector3;

use jointsim::audio::{AudioBackend, KiraBackend, SilentBackend, SoundManager, Target, Voice};
use jointsim::data::{load_settings, DEFAULT_SETTINGS_PATH};
use jointsim::game::{pw2rw, ObjectType};

/// Pan sweep resolution
const SWEEP_STEPS: u32 = 20;
const STEP_TIME: Duration = Duration::from_millis(50);

/// Half width of the sweep in Physics World units
const SWEEP_HALF_WIDTH: f32 = 5.0;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting Jointsim v{}", env!("CARGO_PKG_VERSION"));

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS_PATH.to_string());
    let settings = load_settings(&path)?;

    match KiraBackend::new(&settings) {
        Ok(backend) => run(SoundManager::from_settings(backend, &settings)?)?,
        Err(e) => {
            log::warn!("{}. Audio disabled.", e);
            run(SoundManager::from_settings(SilentBackend, &settings)?)?
        }
    }

    log::info!("Jointsim shut down cleanly");
    Ok(())
}

fn run<B: AudioBackend>(mut sounds: SoundManager<B>) -> Result<()> {
    for effect in 0..sounds.count() {
        let object = ObjectType::ALL[effect % ObjectType::ALL.len()];
        let Some(instance) = sounds.play(effect)? else {
            continue;
        };
        log::info!(
            "Playing {} for {}",
            sounds.sound_path(effect)?.display(),
            object.name()
        );

        sweep(&mut sounds, Voice { effect, instance })?;
    }

    if sounds.count() > 0 {
        // Hear the loop from the left edge of the sweep
        sounds.set_listener(Vector3::new(pw2rw(-SWEEP_HALF_WIDTH), 0.0, 0.0));
        sounds.play_looped(0)?;
        sounds.set_volume(0.5, Target::LAST)?;
        sounds.toggle_mute();
        thread::sleep(STEP_TIME * SWEEP_STEPS);
        sounds.toggle_mute();
        thread::sleep(STEP_TIME * SWEEP_STEPS);
    }

    sounds.stop_all();
    Ok(())
}

/// Move a playing sound from the listener's left to its right
fn sweep<B: AudioBackend>(sounds: &mut SoundManager<B>, voice: Voice) -> Result<()> {
    for step in 0..=SWEEP_STEPS {
        if !sounds.is_playing(voice)? {
            break;
        }
        let t = step as f32 / SWEEP_STEPS as f32;
        let x = pw2rw(-SWEEP_HALF_WIDTH + 2.0 * SWEEP_HALF_WIDTH * t);
        sounds.move_to(Vector3::new(x, 0.0, 1.0), voice.into())?;
        thread::sleep(STEP_TIME);
    }
    Ok(())
}
