//! Game specific defines
//!
//! Object types for the joint simulation and unit conversions between
//! the Physics World and the Render World.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Types of object that can appear in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    Line,
    Crate,
    Safe,
    Elephant,
    Pulley,
    /// Second wheel of a pulley pair
    Pulley2,
}

impl ObjectType {
    /// Every object type, in declaration order
    pub const ALL: [ObjectType; 6] = [
        ObjectType::Line,
        ObjectType::Crate,
        ObjectType::Safe,
        ObjectType::Elephant,
        ObjectType::Pulley,
        ObjectType::Pulley2,
    ];

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            ObjectType::Line => "Line",
            ObjectType::Crate => "Crate",
            ObjectType::Safe => "Safe",
            ObjectType::Elephant => "Elephant",
            ObjectType::Pulley => "Pulley",
            ObjectType::Pulley2 => "Pulley 2",
        }
    }
}

/// Physics World to Render World rescale value
pub const PRV: f32 = 10.0;

/// Physics World to Render World units
#[inline]
pub fn pw2rw(x: f32) -> f32 {
    x * PRV
}

/// Render World to Physics World units
#[inline]
pub fn rw2pw(x: f32) -> f32 {
    x / PRV
}

/// Render World to Physics World units for an integer render coordinate
#[inline]
pub fn rw2pw_int(x: i32) -> f32 {
    x as f32 / PRV
}

/// Physics World to Render World for a point
#[inline]
pub fn pw2rw_vec(v: Vector2<f32>) -> Vector2<f32> {
    v * PRV
}

/// Render World to Physics World for a point
#[inline]
pub fn rw2pw_vec(v: Vector2<f32>) -> Vector2<f32> {
    v / PRV
}
