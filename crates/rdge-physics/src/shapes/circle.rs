// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use std::f32::consts::PI;

use super::{MassData, ShapeError};
use crate::math::Vec2;
use crate::types::aabb::Aabb;
use crate::types::transform::Transform;

/// Solid disc defined by a center and a radius.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Circle {
    center: Vec2,
    radius: f32,
}

impl Circle {
    /// Builds a circle.
    ///
    /// # Errors
    /// [`ShapeError::InvalidRadius`] if `radius` is negative or not finite,
    /// [`ShapeError::NonFinite`] if `center` is not finite.
    pub fn new(center: Vec2, radius: f32) -> Result<Self, ShapeError> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(ShapeError::InvalidRadius(radius));
        }
        if !center.is_finite() {
            return Err(ShapeError::NonFinite);
        }
        Ok(Self { center, radius })
    }

    /// Center point.
    pub const fn center(&self) -> Vec2 {
        self.center
    }

    /// Radius.
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    pub(crate) fn contains_local(&self, point: Vec2) -> bool {
        point.distance_squared(self.center) < self.radius * self.radius
    }

    pub(crate) fn compute_aabb(&self, xf: &Transform) -> Aabb {
        Aabb::from_center_half_extents(xf.apply(self.center), self.radius, self.radius)
    }

    pub(crate) fn compute_mass(&self, density: f32) -> MassData {
        let r2 = self.radius * self.radius;
        let mass = density * PI * r2;
        let centroid_inertia = 0.5 * mass * r2;
        MassData {
            mass,
            center: self.center,
            inertia: centroid_inertia + mass * self.center.length_squared(),
            centroid_inertia,
        }
    }

    pub(crate) fn transformed(&self, xf: &Transform) -> Self {
        Self { center: xf.apply(self.center), radius: self.radius }
    }

    pub(crate) fn support(&self, direction: Vec2) -> Vec2 {
        self.center + direction.normalize() * self.radius
    }
}
