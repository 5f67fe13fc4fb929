//! Data loading
//!
//! Loads the sound list and limits from an external RON file so sounds can
//! be added without recompiling.

pub mod loader;

pub use loader::{
    load_settings, load_settings_or_default, save_settings, ConfigError, DEFAULT_SETTINGS_PATH,
};
