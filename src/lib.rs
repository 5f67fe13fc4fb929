//! Jointsim - sound and world units for a joint-simulation physics demo
//!
//! Crates on pulleys, an elephant on a see-saw, and every collision able
//! to play its sound over itself.

pub mod audio;
pub mod data;
pub mod game;

// Re-export commonly used types
pub use audio::{SoundManager, SoundSettings, Target};
pub use game::ObjectType;
