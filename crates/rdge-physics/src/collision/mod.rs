// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Narrow phase: exact intersection tests between world-space shapes.
//!
//! [`collide`] produces a [`Manifold`] for a pair of shapes; [`intersects`] is
//! the cheaper yes/no query used for sensors. Both are edge-exclusive: shapes
//! that merely touch do not intersect.
//!
//! Manifold conventions:
//! - `normal` is a unit vector pointing from shape A toward shape B.
//! - `depths[i]` is the positive penetration at `points[i]`.
//! - `plane` is a point on the reference feature (the face or surface the
//!   normal was taken from).

mod gjk;
mod sat;

pub use gjk::gjk_intersects;

use crate::math::Vec2;
use crate::shapes::{Circle, Shape};

/// Result of a narrow-phase test.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Manifold {
    /// Number of valid entries in `points`/`depths` (0, 1 or 2).
    pub count: usize,
    /// World-space contact points.
    pub points: [Vec2; 2],
    /// Penetration depth per point.
    pub depths: [f32; 2],
    /// Shared contact normal, from A toward B.
    pub normal: Vec2,
    /// Point on the reference feature.
    pub plane: Vec2,
}

impl Default for Manifold {
    fn default() -> Self {
        Self {
            count: 0,
            points: [Vec2::ZERO; 2],
            depths: [0.0; 2],
            normal: Vec2::ZERO,
            plane: Vec2::ZERO,
        }
    }
}

impl Manifold {
    /// One-point manifold.
    pub fn single(point: Vec2, depth: f32, normal: Vec2, plane: Vec2) -> Self {
        Self { count: 1, points: [point, Vec2::ZERO], depths: [depth, 0.0], normal, plane }
    }

    /// Valid contact points.
    pub fn contact_points(&self) -> &[Vec2] {
        &self.points[..self.count]
    }

    /// Valid penetration depths.
    pub fn contact_depths(&self) -> &[f32] {
        &self.depths[..self.count]
    }

    /// Deepest penetration across all points, or zero when empty.
    pub fn max_depth(&self) -> f32 {
        self.contact_depths().iter().copied().fold(0.0, f32::max)
    }

    /// Same contact seen from the other shape: the normal is reversed.
    #[must_use]
    pub fn flipped(mut self) -> Self {
        self.normal = -self.normal;
        self
    }
}

/// Computes the contact manifold between two world-space shapes.
///
/// Returns `None` when the shapes do not overlap.
pub fn collide(a: &Shape, b: &Shape) -> Option<Manifold> {
    match (a, b) {
        (Shape::Circle(ca), Shape::Circle(cb)) => collide_circles(ca, cb),
        (Shape::Polygon(pa), Shape::Circle(cb)) => sat::collide_polygon_circle(pa, cb),
        (Shape::Circle(ca), Shape::Polygon(pb)) => {
            sat::collide_polygon_circle(pb, ca).map(Manifold::flipped)
        }
        (Shape::Polygon(pa), Shape::Polygon(pb)) => sat::collide_polygons(pa, pb),
    }
}

/// Boolean overlap test between two world-space shapes.
///
/// Circle pairs use the closed form; everything else goes through GJK.
pub fn intersects(a: &Shape, b: &Shape) -> bool {
    match (a, b) {
        (Shape::Circle(ca), Shape::Circle(cb)) => circles_intersect(ca, cb),
        _ => gjk_intersects(a, b),
    }
}

/// `true` iff the squared center distance is below `(r1 + r2)²`.
pub fn circles_intersect(a: &Circle, b: &Circle) -> bool {
    let r = a.radius() + b.radius();
    a.center().distance_squared(b.center()) < r * r
}

/// Circle-circle manifold: one point halfway between the centers.
pub fn collide_circles(a: &Circle, b: &Circle) -> Option<Manifold> {
    if !circles_intersect(a, b) {
        return None;
    }
    let d = b.center() - a.center();
    let dist = d.length();
    let normal = if dist > 0.0 { d * (1.0 / dist) } else { Vec2::UNIT_Y };
    let depth = a.radius() + b.radius() - dist;
    let point = (a.center() + b.center()) * 0.5;
    let plane = a.center() + normal * a.radius();
    Some(Manifold::single(point, depth, normal, plane))
}
