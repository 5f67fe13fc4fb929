//! Sound definitions
//!
//! The list of sound effects to load and the limits they are loaded under.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One sound effect to load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundEntry {
    /// WAV file, relative paths resolve against the settings directory
    pub file: PathBuf,
    /// Number of copies that can play at the same time
    #[serde(default = "default_instances")]
    pub instances: usize,
    /// Whether instances respond to `move_to`
    #[serde(default = "default_spatial")]
    pub spatial: bool,
}

impl SoundEntry {
    /// Entry with one spatial instance
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            instances: default_instances(),
            spatial: default_spatial(),
        }
    }

    /// Set the instance count
    pub fn with_instances(mut self, instances: usize) -> Self {
        self.instances = instances;
        self
    }

    /// Set whether instances are spatial
    pub fn with_spatial(mut self, spatial: bool) -> Self {
        self.spatial = spatial;
        self
    }
}

fn default_instances() -> usize {
    1
}

fn default_spatial() -> bool {
    true
}

/// Sound settings read from the settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundSettings {
    /// Maximum number of sound effects allowed
    pub max_sounds: usize,
    /// Listener position in Render World units
    pub listener: (f32, f32, f32),
    /// Distance at which a spatial sound plays at half volume
    pub reference_distance: f32,
    /// Sounds to load, in index order
    pub sounds: Vec<SoundEntry>,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            max_sounds: 16,
            listener: (0.0, 0.0, 0.0),
            reference_distance: 10.0,
            sounds: Vec::new(),
        }
    }
}

impl SoundSettings {
    /// Resolve relative sound paths against `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        for entry in &mut self.sounds {
            if entry.file.is_relative() {
                entry.file = base.join(&entry.file);
            }
        }
    }

    /// Check the settings for entries that could never be played
    pub fn validate(&self) -> Result<(), String> {
        if let Some(entry) = self.sounds.iter().find(|e| e.instances == 0) {
            return Err(format!("{} has zero instances", entry.file.display()));
        }
        if self.reference_distance <= 0.0 {
            return Err(format!(
                "reference_distance must be positive, got {}",
                self.reference_distance
            ));
        }
        Ok(())
    }
}
