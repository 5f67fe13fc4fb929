//! Sound manager errors

use std::path::PathBuf;

/// Errors raised by the sound manager and its backends
#[derive(thiserror::Error, Debug)]
pub enum SoundError {
    /// More sounds configured than the manager allows
    #[error("too many sounds: {requested} configured, maximum is {max}")]
    TooManySounds { requested: usize, max: usize },

    /// A sound entry has no instances
    #[error("sound {0} has zero instances")]
    NoInstances(PathBuf),

    /// Sounds were already loaded
    #[error("sounds are already loaded")]
    AlreadyLoaded,

    /// A sound file could not be loaded
    #[error("failed to load sound {path}: {reason}")]
    LoadFailed { path: PathBuf, reason: String },

    /// Effect index out of range
    #[error("invalid sound index {index}, {count} sounds loaded")]
    InvalidEffect { index: usize, count: usize },

    /// Instance index out of range for its effect
    #[error("invalid instance {instance} of sound {effect}, it has {count} instances")]
    InvalidInstance {
        effect: usize,
        instance: usize,
        count: usize,
    },

    /// A call targeted the last played sound before anything was played
    #[error("no sound has been played yet")]
    NothingPlayed,

    /// The audio device could not be opened
    #[error("audio backend unavailable: {0}")]
    Backend(String),
}
