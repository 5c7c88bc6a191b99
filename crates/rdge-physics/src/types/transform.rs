// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::math::{Rotation, Vec2};

/// Rigid 2D transform used to place shapes and bodies in the world.
///
/// Conventions:
/// - `position` is the world-space location of the local origin, in metres.
/// - `rotation` is applied before translation: `world = R * local + position`.
/// - No scale; collision shapes are always expressed at unit scale.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Transform {
    position: Vec2,
    rotation: Rotation,
}

impl Transform {
    /// Identity transform (no translation, no rotation).
    pub const IDENTITY: Self = Self { position: Vec2::ZERO, rotation: Rotation::IDENTITY };

    /// Creates a transform from a position and an angle in radians.
    pub fn new(position: Vec2, angle: f32) -> Self {
        Self { position, rotation: Rotation::from_angle(angle) }
    }

    /// Creates a transform from already-built components.
    pub const fn from_parts(position: Vec2, rotation: Rotation) -> Self {
        Self { position, rotation }
    }

    /// Translation component.
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Rotation component.
    pub const fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Maps a local-space point to world space.
    pub fn apply(&self, local: Vec2) -> Vec2 {
        self.rotation.rotate(local) + self.position
    }

    /// Maps a world-space point back to local space.
    pub fn apply_inverse(&self, world: Vec2) -> Vec2 {
        self.rotation.inv_rotate(world - self.position)
    }

    /// Rotates a direction into world space without translating it.
    pub fn apply_vector(&self, local: Vec2) -> Vec2 {
        self.rotation.rotate(local)
    }

    /// Rotates a world-space direction into local space.
    pub fn apply_inverse_vector(&self, world: Vec2) -> Vec2 {
        self.rotation.inv_rotate(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn apply_then_inverse_is_identity() {
        let xf = Transform::new(Vec2::new(3.0, -2.0), FRAC_PI_2);
        let p = Vec2::new(1.0, 0.5);
        let w = xf.apply(p);
        // (1, 0.5) rotated a quarter turn is (-0.5, 1), then translated.
        assert!((w.x() - 2.5).abs() < 1e-6 && (w.y() + 1.0).abs() < 1e-6);
        let back = xf.apply_inverse(w);
        assert!((back.x() - 1.0).abs() < 1e-6 && (back.y() - 0.5).abs() < 1e-6);
    }
}
