//! RON settings loader
//!
//! Loads sound settings from an external RON file, with fallback to defaults.

use std::fs;
use std::path::Path;

use crate::audio::SoundSettings;

/// Default location of the settings file
pub const DEFAULT_SETTINGS_PATH: &str = "assets/sounds.ron";

/// Settings loading errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Settings parsed but make no sense
    #[error("Invalid settings: {0}")]
    Invalid(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),
}

/// Load sound settings from a RON file
///
/// Relative sound paths are resolved against the file's directory.
pub fn load_settings(path: impl AsRef<Path>) -> Result<SoundSettings, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let mut settings: SoundSettings = ron::from_str(&content)?;
    settings.validate().map_err(ConfigError::Invalid)?;

    if let Some(base) = path.parent() {
        settings.resolve_paths(base);
    }
    log::info!(
        "Read {} sound entries from {}",
        settings.sounds.len(),
        path.display()
    );
    Ok(settings)
}

/// Load sound settings, falling back to defaults if the file is missing or bad
pub fn load_settings_or_default(path: impl AsRef<Path>) -> SoundSettings {
    let path = path.as_ref();
    load_settings(path).unwrap_or_else(|e| {
        log::warn!("Failed to load {}: {}. Using defaults.", path.display(), e);
        SoundSettings::default()
    })
}

/// Write settings as pretty RON for easy editing
pub fn save_settings(settings: &SoundSettings, path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let content = ron::ser::to_string_pretty(settings, ron::ser::PrettyConfig::default())?;
    fs::write(path, content)?;
    Ok(())
}
