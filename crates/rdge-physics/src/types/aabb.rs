// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::collision::Manifold;
use crate::math::Vec2;

/// Axis-aligned bounding box in world coordinates.
///
/// Invariants:
/// - `min` components are less than or equal to `max` components.
/// - Values are `f32` and represent metres in world space.
///
/// Overlap and point containment are edge-exclusive: boxes that only share an
/// edge or a corner are not considered overlapping.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    min: Vec2,
    max: Vec2,
}

impl Aabb {
    /// Constructs an AABB from its minimum and maximum corners.
    ///
    /// # Panics
    /// Panics if any component of `min` is greater than its counterpart in `max`.
    pub fn new(min: Vec2, max: Vec2) -> Self {
        assert!(min.x() <= max.x() && min.y() <= max.y(), "invalid AABB: min > max");
        Self { min, max }
    }

    /// Builds an AABB from two arbitrary corners, sorting components.
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Self { min: a.min(b), max: a.max(b) }
    }

    /// Builds an AABB centered at `center` with half-extents `hx, hy`.
    pub fn from_center_half_extents(center: Vec2, hx: f32, hy: f32) -> Self {
        let he = Vec2::new(hx, hy);
        Self::new(center - he, center + he)
    }

    /// Builds the minimal AABB that contains all `points`.
    ///
    /// # Panics
    /// Panics if `points` is empty.
    pub fn from_points(points: &[Vec2]) -> Self {
        assert!(!points.is_empty(), "from_points requires at least one point");
        let mut min = points[0];
        let mut max = points[0];
        for p in &points[1..] {
            min = min.min(*p);
            max = max.max(*p);
        }
        Self { min, max }
    }

    /// Returns the minimum corner.
    pub const fn min(&self) -> Vec2 {
        self.min
    }

    /// Returns the maximum corner.
    pub const fn max(&self) -> Vec2 {
        self.max
    }

    /// Width along X.
    pub fn width(&self) -> f32 {
        self.max.x() - self.min.x()
    }

    /// Height along Y.
    pub fn height(&self) -> f32 {
        self.max.y() - self.min.y()
    }

    /// Centroid of the box.
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Half the width and height.
    pub fn half_extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    /// Perimeter, used as the surface-area heuristic by the tree.
    pub fn perimeter(&self) -> f32 {
        2.0 * (self.width() + self.height())
    }

    /// Returns `true` if `point` lies strictly inside the box.
    pub fn contains_point(&self, point: Vec2) -> bool {
        self.min.x() < point.x()
            && point.x() < self.max.x()
            && self.min.y() < point.y()
            && point.y() < self.max.y()
    }

    /// Returns `true` if `other` fits entirely within this box (inclusive).
    pub fn contains(&self, other: &Self) -> bool {
        self.min.x() <= other.min.x()
            && self.min.y() <= other.min.y()
            && other.max.x() <= self.max.x()
            && other.max.y() <= self.max.y()
    }

    /// Returns `true` if this AABB overlaps another (exclusive on faces).
    pub fn overlaps(&self, other: &Self) -> bool {
        other.min.x() < self.max.x()
            && self.min.x() < other.max.x()
            && other.min.y() < self.max.y()
            && self.min.y() < other.max.y()
    }

    /// Returns the union of two AABBs.
    pub fn union(&self, other: &Self) -> Self {
        Self { min: self.min.min(other.min), max: self.max.max(other.max) }
    }

    /// Inflates the box by a uniform margin `m` in all directions.
    pub fn inflate(&self, m: f32) -> Self {
        let delta = Vec2::new(m, m);
        Self { min: self.min - delta, max: self.max + delta }
    }

    /// Stretches the box along `displacement`, growing only the sides the
    /// displacement points toward.
    pub fn expand_by_displacement(&self, displacement: Vec2) -> Self {
        let mut min = self.min;
        let mut max = self.max;
        if displacement.x() < 0.0 {
            min = Vec2::new(min.x() + displacement.x(), min.y());
        } else {
            max = Vec2::new(max.x() + displacement.x(), max.y());
        }
        if displacement.y() < 0.0 {
            min = Vec2::new(min.x(), min.y() + displacement.y());
        } else {
            max = Vec2::new(max.x(), max.y() + displacement.y());
        }
        Self { min, max }
    }

    /// Computes a single-point manifold between two overlapping boxes.
    ///
    /// The separating axis is the one with the smaller overlap; the normal
    /// points from `self` toward `other` along that axis. The contact point
    /// sits on the edge of whichever box is penetrated along the minor axis.
    /// When the centers line up exactly on the minor axis the tie goes to
    /// `other`'s edge if `self` starts lower (x-axis case) or further left
    /// (y-axis case), and to `self`'s corner otherwise.
    ///
    /// Returns `None` when either axis overlap is `<= 0`.
    pub fn manifold(&self, other: &Self) -> Option<Manifold> {
        let cen_a = self.center();
        let cen_b = other.center();
        let ext_a = self.half_extents();
        let ext_b = other.half_extents();
        let d = cen_b - cen_a;

        let overlap_x = ext_a.x() + ext_b.x() - d.x().abs();
        if overlap_x <= 0.0 {
            return None;
        }
        let overlap_y = ext_a.y() + ext_b.y() - d.y().abs();
        if overlap_y <= 0.0 {
            return None;
        }

        let sign_x = if d.x() < 0.0 { -1.0 } else { 1.0 };
        let sign_y = if d.y() < 0.0 { -1.0 } else { 1.0 };

        let (depth, normal, point) = if overlap_x < overlap_y {
            let point = if d.y() != 0.0 || self.min.y() < other.min.y() {
                Vec2::new(cen_a.x() + ext_a.x() * sign_x, cen_b.y() - ext_b.y() * sign_y)
            } else {
                Vec2::new(cen_b.x() - ext_b.x() * sign_x, cen_a.y() - ext_a.y() * sign_y)
            };
            (overlap_x, Vec2::new(sign_x, 0.0), point)
        } else {
            let point = if d.x() != 0.0 || self.min.x() < other.min.x() {
                Vec2::new(cen_b.x() - ext_b.x() * sign_x, cen_a.y() + ext_a.y() * sign_y)
            } else {
                Vec2::new(cen_a.x() - ext_a.x() * sign_x, cen_b.y() - ext_b.y() * sign_y)
            };
            (overlap_y, Vec2::new(0.0, sign_y), point)
        };

        let plane = cen_a + Vec2::new(normal.x() * ext_a.x(), normal.y() * ext_a.y());
        Some(Manifold::single(point, depth, normal, plane))
    }
}
