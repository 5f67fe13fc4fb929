//! Audio system
//!
//! Plays overlapping copies of sound effects through a pluggable backend,
//! Kira by default.

pub mod backend;
pub mod error;
pub mod kira_backend;
pub mod manager;
pub mod sounds;

pub use backend::{AudioBackend, InstanceFlags, SilentBackend};
pub use error::SoundError;
pub use kira_backend::{KiraBackend, KiraVoice};
pub use manager::{SoundManager, Target, Voice};
pub use sounds::{SoundEntry, SoundSettings};
