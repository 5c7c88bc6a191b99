// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Collision shapes.
//!
//! The shape set is closed (circles and convex polygons), so [`Shape`] is an
//! enum and every per-shape operation is a `match`. Shapes are small `Copy`
//! values: a fixture keeps one in body-local space and a second copy
//! re-posed into world space each step.

use thiserror::Error;

use crate::math::Vec2;
use crate::types::aabb::Aabb;
use crate::types::transform::Transform;

mod circle;
mod polygon;

pub use circle::Circle;
pub use polygon::Polygon;

/// Discriminant of a [`Shape`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShapeType {
    /// A [`Circle`].
    Circle,
    /// A convex [`Polygon`].
    Polygon,
}

/// Errors raised when building a shape from caller data.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ShapeError {
    /// Radius was negative or not finite.
    #[error("circle radius must be finite and non-negative, got {0}")]
    InvalidRadius(f32),
    /// A coordinate was NaN or infinite.
    #[error("shape coordinates must be finite")]
    NonFinite,
    /// Fewer than three distinct points were supplied.
    #[error("polygon needs at least 3 distinct vertices, got {0}")]
    TooFewVertices(usize),
    /// More input points than a polygon can hold.
    #[error("polygon accepts at most {max} vertices, got {got}")]
    TooManyVertices {
        /// Points supplied.
        got: usize,
        /// Capacity of a polygon.
        max: usize,
    },
    /// The points are collinear or enclose no area.
    #[error("polygon is degenerate (collinear points or zero area)")]
    Degenerate,
}

/// Mass properties of a shape at a given density.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct MassData {
    /// Mass in kilograms (area × density).
    pub mass: f32,
    /// Centroid in the shape's local frame.
    pub center: Vec2,
    /// Rotational inertia about the shape's local origin.
    pub inertia: f32,
    /// Rotational inertia about [`MassData::center`]. Computed directly, so it
    /// stays accurate for shapes far from their local origin.
    pub centroid_inertia: f32,
}

impl MassData {
    /// Rotational inertia about [`MassData::center`].
    pub const fn inertia_about_centroid(&self) -> f32 {
        self.centroid_inertia
    }
}

/// A collision shape.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Shape {
    /// Solid disc.
    Circle(Circle),
    /// Solid convex polygon.
    Polygon(Polygon),
}

impl Shape {
    /// Which variant this is.
    pub const fn shape_type(&self) -> ShapeType {
        match self {
            Self::Circle(_) => ShapeType::Circle,
            Self::Polygon(_) => ShapeType::Polygon,
        }
    }

    /// Area centroid in the shape's own frame.
    pub fn centroid(&self) -> Vec2 {
        match self {
            Self::Circle(c) => c.center(),
            Self::Polygon(p) => p.centroid(),
        }
    }

    /// Returns `true` if world-space `point` lies strictly inside the shape
    /// placed at `xf`.
    pub fn contains(&self, xf: &Transform, point: Vec2) -> bool {
        let local = xf.apply_inverse(point);
        match self {
            Self::Circle(c) => c.contains_local(local),
            Self::Polygon(p) => p.contains_local(local),
        }
    }

    /// Tight world-space bounds of the shape placed at `xf`.
    pub fn compute_aabb(&self, xf: &Transform) -> Aabb {
        match self {
            Self::Circle(c) => c.compute_aabb(xf),
            Self::Polygon(p) => p.compute_aabb(xf),
        }
    }

    /// Mass, centroid and inertia for the given density (kg/m²).
    pub fn compute_mass(&self, density: f32) -> MassData {
        match self {
            Self::Circle(c) => c.compute_mass(density),
            Self::Polygon(p) => p.compute_mass(density),
        }
    }

    /// Copy of this shape re-posed by `xf`.
    pub fn transformed(&self, xf: &Transform) -> Self {
        match self {
            Self::Circle(c) => Self::Circle(c.transformed(xf)),
            Self::Polygon(p) => Self::Polygon(p.transformed(xf)),
        }
    }

    /// Farthest point of the shape along `direction`.
    pub fn support(&self, direction: Vec2) -> Vec2 {
        match self {
            Self::Circle(c) => c.support(direction),
            Self::Polygon(p) => p.support(direction),
        }
    }
}

impl From<Circle> for Shape {
    fn from(value: Circle) -> Self {
        Self::Circle(value)
    }
}

impl From<Polygon> for Shape {
    fn from(value: Polygon) -> Self {
        Self::Polygon(value)
    }
}
