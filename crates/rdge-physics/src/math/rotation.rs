// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::math::Vec2;

/// Planar rotation stored as a cached sine/cosine pair.
///
/// Keeping `sin`/`cos` instead of the angle means rotating a point is four
/// multiplies; [`Rotation::angle`] recovers the angle with `atan2` when needed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rotation {
    s: f32,
    c: f32,
}

impl Rotation {
    /// The identity rotation (angle zero).
    pub const IDENTITY: Self = Self { s: 0.0, c: 1.0 };

    /// Builds a rotation from an angle in radians.
    pub fn from_angle(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self { s, c }
    }

    /// Sine of the rotation angle.
    pub const fn sin(&self) -> f32 {
        self.s
    }

    /// Cosine of the rotation angle.
    pub const fn cos(&self) -> f32 {
        self.c
    }

    /// Angle in radians, in `(-π, π]`.
    pub fn angle(&self) -> f32 {
        self.s.atan2(self.c)
    }

    /// Rotates `v` by this rotation.
    pub fn rotate(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.c * v.x() - self.s * v.y(), self.s * v.x() + self.c * v.y())
    }

    /// Rotates `v` by the inverse of this rotation.
    pub fn inv_rotate(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.c * v.x() + self.s * v.y(), -self.s * v.x() + self.c * v.y())
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn quarter_turn_maps_x_to_y() {
        let r = Rotation::from_angle(FRAC_PI_2);
        let v = r.rotate(Vec2::UNIT_X);
        assert!((v.x()).abs() < 1e-6 && (v.y() - 1.0).abs() < 1e-6);
        let back = r.inv_rotate(v);
        assert!((back.x() - 1.0).abs() < 1e-6 && back.y().abs() < 1e-6);
        assert!((r.angle() - FRAC_PI_2).abs() < 1e-6);
    }
}
