// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Planar math: vectors and rotations for the collision and solver code.
//!
//! All operations stay in `f32`; nothing here allocates.

mod rotation;
mod vec2;

pub use rotation::Rotation;
pub use vec2::Vec2;

/// Global epsilon used by math routines when detecting degenerate values.
pub const EPSILON: f32 = 1e-6;
