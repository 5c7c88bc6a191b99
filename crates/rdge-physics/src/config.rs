// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Graph-wide simulation settings.

use crate::math::Vec2;

/// Settings for a [`CollisionGraph`](crate::CollisionGraph).
///
/// With the `serde` feature the struct (de)serializes with every field
/// optional, falling back to [`GraphConfig::default`].
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GraphConfig {
    /// Acceleration applied to every awake dynamic body, scaled per body.
    pub gravity: Vec2,
    /// Sequential-impulse passes per step.
    pub velocity_iterations: u32,
    /// Position-correction passes per step.
    pub position_iterations: u32,
    /// Lets resting islands fall asleep.
    pub allow_sleep: bool,
    /// Clears accumulated forces and torques after each step.
    pub auto_clear_forces: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -9.8),
            velocity_iterations: 8,
            position_iterations: 3,
            allow_sleep: true,
            auto_clear_forces: true,
        }
    }
}

impl GraphConfig {
    /// Default settings with a custom gravity vector.
    pub fn with_gravity(gravity: Vec2) -> Self {
        Self { gravity, ..Self::default() }
    }
}
