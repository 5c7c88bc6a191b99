// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Tuning constants shared by the collision pipeline and the solver.
//!
//! Lengths are metres, angles radians, times seconds.

use std::f32::consts::PI;

/// Collision and constraint tolerance. Contacts are allowed to overlap by this
/// much before the position solver pushes back.
pub const LINEAR_SLOP: f32 = 0.005;

/// Maximum number of vertices a [`crate::Polygon`] may carry.
pub const MAX_POLYGON_VERTICES: usize = 8;

/// Padding added around each tight box when it becomes a tree leaf.
pub const FATTEN_AMOUNT: f32 = 0.1;

/// Scale applied to a proxy's displacement when predicting its next fat box.
pub const DISPLACEMENT_MULTIPLIER: f32 = 2.0;

/// Approach speed above which restitution is applied.
pub const VELOCITY_THRESHOLD: f32 = 1.0;

/// Fraction of the remaining overlap resolved per position iteration.
pub const BAUMGARTE: f32 = 0.2;

/// Largest position correction applied to a single contact point per pass.
pub const MAX_LINEAR_CORRECTION: f32 = 0.2;

/// Largest translation a body may make in one step.
pub const MAX_TRANSLATION: f32 = 2.0;

/// Largest rotation a body may make in one step.
pub const MAX_ROTATION: f32 = 0.5 * PI;

/// Linear speed under which a body counts as resting.
pub const LINEAR_SLEEP_TOLERANCE: f32 = 0.01;

/// Angular speed under which a body counts as resting (2°/s).
pub const ANGULAR_SLEEP_TOLERANCE: f32 = 2.0 / 180.0 * PI;

/// Seconds an island must rest before it is put to sleep.
pub const TIME_TO_SLEEP: f32 = 0.5;

/// Iteration cap for the GJK overlap test.
pub const GJK_MAX_ITERATIONS: usize = 32;
