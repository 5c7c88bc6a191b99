// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use super::{MassData, ShapeError};
use crate::constants::{LINEAR_SLOP, MAX_POLYGON_VERTICES};
use crate::math::{Vec2, EPSILON};
use crate::types::aabb::Aabb;
use crate::types::transform::Transform;

const WELD_DISTANCE_SQUARED: f32 = (LINEAR_SLOP * 0.5) * (LINEAR_SLOP * 0.5);
const INV3: f32 = 1.0 / 3.0;

/// Solid convex polygon with at most [`MAX_POLYGON_VERTICES`] vertices.
///
/// Invariants:
/// - Vertices form a convex, counter-clockwise loop with non-zero area.
/// - `normals[i]` is the outward unit normal of edge `vertices[i] → vertices[i + 1]`.
/// - The centroid is the area centroid, cached at construction.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Polygon {
    vertices: [Vec2; MAX_POLYGON_VERTICES],
    normals: [Vec2; MAX_POLYGON_VERTICES],
    count: usize,
    centroid: Vec2,
}

impl Polygon {
    /// Builds the convex hull of `points`.
    ///
    /// Points closer than half of [`LINEAR_SLOP`] are welded together. The hull
    /// starts at the rightmost point (lowest on ties) and winds
    /// counter-clockwise, so the same point set always yields the same vertex
    /// order regardless of input order.
    ///
    /// # Errors
    /// See [`ShapeError`]: too few/many points, non-finite input, or a hull
    /// with no area.
    pub fn new(points: &[Vec2]) -> Result<Self, ShapeError> {
        if points.len() > MAX_POLYGON_VERTICES {
            return Err(ShapeError::TooManyVertices {
                got: points.len(),
                max: MAX_POLYGON_VERTICES,
            });
        }
        if points.len() < 3 {
            return Err(ShapeError::TooFewVertices(points.len()));
        }
        if points.iter().any(|p| !p.is_finite()) {
            return Err(ShapeError::NonFinite);
        }

        let mut welded: Vec<Vec2> = Vec::with_capacity(points.len());
        for p in points {
            if welded.iter().all(|w| p.distance_squared(*w) >= WELD_DISTANCE_SQUARED) {
                welded.push(*p);
            }
        }
        if welded.len() < 3 {
            return Err(ShapeError::TooFewVertices(welded.len()));
        }

        let hull = gift_wrap(&welded)?;
        Self::from_ccw(&hull)
    }

    /// Axis-aligned box centered on the local origin.
    ///
    /// # Errors
    /// [`ShapeError::Degenerate`] unless both half-extents are positive.
    pub fn new_box(hx: f32, hy: f32) -> Result<Self, ShapeError> {
        Self::new_oriented_box(hx, hy, Vec2::ZERO, 0.0)
    }

    /// Box with half-extents `hx, hy`, centered at `center` and rotated by
    /// `angle` radians in the shape's local frame.
    ///
    /// # Errors
    /// [`ShapeError::Degenerate`] unless both half-extents are positive.
    pub fn new_oriented_box(hx: f32, hy: f32, center: Vec2, angle: f32) -> Result<Self, ShapeError> {
        if !(hx.is_finite() && hy.is_finite() && center.is_finite() && angle.is_finite()) {
            return Err(ShapeError::NonFinite);
        }
        if hx <= 0.0 || hy <= 0.0 {
            return Err(ShapeError::Degenerate);
        }
        let corners = [
            Vec2::new(-hx, -hy),
            Vec2::new(hx, -hy),
            Vec2::new(hx, hy),
            Vec2::new(-hx, hy),
        ];
        let xf = Transform::new(center, angle);
        Self::from_ccw(&corners.map(|c| xf.apply(c)))
    }

    /// Builds a polygon from vertices already known to be a CCW convex loop.
    fn from_ccw(hull: &[Vec2]) -> Result<Self, ShapeError> {
        let count = hull.len();
        debug_assert!((3..=MAX_POLYGON_VERTICES).contains(&count));

        let mut vertices = [Vec2::ZERO; MAX_POLYGON_VERTICES];
        vertices[..count].copy_from_slice(hull);

        let mut normals = [Vec2::ZERO; MAX_POLYGON_VERTICES];
        for i in 0..count {
            let edge = vertices[(i + 1) % count] - vertices[i];
            if edge.length_squared() <= EPSILON * EPSILON {
                return Err(ShapeError::Degenerate);
            }
            normals[i] = edge.cross_scalar(1.0).normalize();
        }

        let (area, centroid) = area_and_centroid(&vertices[..count]);
        if area <= EPSILON {
            return Err(ShapeError::Degenerate);
        }

        Ok(Self { vertices, normals, count, centroid })
    }

    /// Vertices in counter-clockwise order.
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices[..self.count]
    }

    /// Outward unit normals, one per edge.
    pub fn normals(&self) -> &[Vec2] {
        &self.normals[..self.count]
    }

    /// Number of vertices.
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Area centroid.
    pub const fn centroid(&self) -> Vec2 {
        self.centroid
    }

    pub(crate) fn contains_local(&self, point: Vec2) -> bool {
        self.vertices()
            .iter()
            .zip(self.normals())
            .all(|(v, n)| n.dot(point - *v) < 0.0)
    }

    pub(crate) fn compute_aabb(&self, xf: &Transform) -> Aabb {
        let mut min = xf.apply(self.vertices[0]);
        let mut max = min;
        for v in &self.vertices()[1..] {
            let w = xf.apply(*v);
            min = min.min(w);
            max = max.max(w);
        }
        Aabb::new(min, max)
    }

    /// Fans triangles out from the first vertex. Each triangle contributes its
    /// signed area, area-weighted centroid and second moment. The second moment
    /// is shifted from the fan origin to the centroid while all terms are still
    /// relative to a vertex, then out to the polygon's local origin.
    pub(crate) fn compute_mass(&self, density: f32) -> MassData {
        let verts = self.vertices();
        let origin = verts[0];

        let mut area = 0.0;
        let mut center = Vec2::ZERO;
        let mut inertia = 0.0;
        for i in 0..verts.len() {
            let e1 = verts[i] - origin;
            let e2 = verts[(i + 1) % verts.len()] - origin;
            let d = e1.cross(e2);
            let tri_area = 0.5 * d;
            area += tri_area;
            center += (e1 + e2) * (tri_area * INV3);

            let int_x2 = e1.x() * e1.x() + e2.x() * e1.x() + e2.x() * e2.x();
            let int_y2 = e1.y() * e1.y() + e2.y() * e1.y() + e2.y() * e2.y();
            inertia += (0.25 * INV3 * d) * (int_x2 + int_y2);
        }

        let mass = density * area;
        let fan_center = center * (1.0 / area);
        let local_center = fan_center + origin;
        let centroid_inertia = density * inertia - mass * fan_center.length_squared();
        let inertia = centroid_inertia + mass * local_center.length_squared();

        MassData { mass, center: local_center, inertia, centroid_inertia }
    }

    pub(crate) fn transformed(&self, xf: &Transform) -> Self {
        let mut out = *self;
        for i in 0..self.count {
            out.vertices[i] = xf.apply(self.vertices[i]);
            out.normals[i] = xf.apply_vector(self.normals[i]);
        }
        out.centroid = xf.apply(self.centroid);
        out
    }

    pub(crate) fn support(&self, direction: Vec2) -> Vec2 {
        let mut best = self.vertices[0];
        let mut best_dot = best.dot(direction);
        for v in &self.vertices()[1..] {
            let d = v.dot(direction);
            if d > best_dot {
                best = *v;
                best_dot = d;
            }
        }
        best
    }
}

/// Gift-wrapping convex hull, CCW, starting at the rightmost (then lowest)
/// point. Collinear points on an edge are dropped in favour of the farther one.
fn gift_wrap(points: &[Vec2]) -> Result<Vec<Vec2>, ShapeError> {
    let n = points.len();
    let mut start = 0;
    for (i, p) in points.iter().enumerate().skip(1) {
        let best = points[start];
        if p.x() > best.x() || (p.x() == best.x() && p.y() < best.y()) {
            start = i;
        }
    }

    let mut hull: Vec<usize> = Vec::with_capacity(n);
    let mut current = start;
    loop {
        if hull.len() == n {
            // Every point was visited without closing the loop.
            return Err(ShapeError::Degenerate);
        }
        hull.push(current);

        let mut next = 0;
        for j in 1..n {
            if next == current {
                next = j;
                continue;
            }
            let r = points[next] - points[current];
            let v = points[j] - points[current];
            let c = r.cross(v);
            if c < 0.0 || (c == 0.0 && v.length_squared() > r.length_squared()) {
                next = j;
            }
        }

        current = next;
        if current == start {
            break;
        }
    }

    if hull.len() < 3 {
        return Err(ShapeError::Degenerate);
    }
    Ok(hull.into_iter().map(|i| points[i]).collect())
}

fn area_and_centroid(verts: &[Vec2]) -> (f32, Vec2) {
    let origin = verts[0];
    let mut area = 0.0;
    let mut center = Vec2::ZERO;
    for i in 1..verts.len() - 1 {
        let e1 = verts[i] - origin;
        let e2 = verts[i + 1] - origin;
        let tri_area = 0.5 * e1.cross(e2);
        area += tri_area;
        center += (e1 + e2) * (tri_area * INV3);
    }
    if area <= EPSILON {
        return (area, origin);
    }
    (area, center * (1.0 / area) + origin)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::float_cmp)]

    use super::*;
    use proptest::prelude::*;

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    fn close(a: f32, b: f32, scale: f32) -> bool {
        (a - b).abs() <= 1e-3 * scale.abs().max(1.0)
    }

    /// Every cyclic rotation of the loop must give the same mass properties.
    fn assert_rotation_invariant(base: &Polygon) -> Result<(), TestCaseError> {
        let expected = base.compute_mass(1.0);
        let mut ring = base.vertices().to_vec();
        for _ in 1..ring.len() {
            ring.rotate_left(1);
            let rotated = Polygon::from_ccw(&ring).unwrap();
            prop_assert_eq!(rotated.vertices()[0], ring[0]);
            let md = rotated.compute_mass(1.0);
            prop_assert!(close(md.mass, expected.mass, expected.mass));
            prop_assert!(close(md.center.x(), expected.center.x(), expected.center.x()));
            prop_assert!(close(md.center.y(), expected.center.y(), expected.center.y()));
            prop_assert!(close(md.inertia, expected.inertia, expected.inertia));
            prop_assert!(close(md.centroid_inertia, expected.centroid_inertia, expected.inertia));
        }
        Ok(())
    }

    #[test]
    fn pentagon_mass_ignores_start_vertex() {
        let p = Polygon::new(&[v(3.0, 0.0), v(4.0, 2.0), v(1.5, 3.0), v(-1.0, 2.0), v(0.0, 0.0)])
            .unwrap();
        assert_rotation_invariant(&p).unwrap();
    }

    proptest! {
        #[test]
        fn mass_ignores_start_vertex(
            coords in prop::collection::vec((-20.0f32..20.0, -20.0f32..20.0), 3..=MAX_POLYGON_VERTICES)
        ) {
            let points: Vec<Vec2> = coords.into_iter().map(|(x, y)| v(x, y)).collect();
            let Ok(base) = Polygon::new(&points) else { return Ok(()) };
            prop_assume!(base.compute_mass(1.0).mass > 1.0);
            assert_rotation_invariant(&base)?;
        }
    }

    #[test]
    fn hull_starts_rightmost_and_winds_ccw() {
        let p = Polygon::new(&[v(2.0, 7.0), v(4.0, 2.0), v(8.0, 7.0)]).unwrap();
        assert_eq!(p.vertices(), &[v(8.0, 7.0), v(2.0, 7.0), v(4.0, 2.0)]);
        assert_eq!(p.normals()[0], v(0.0, 1.0));
        assert!((p.centroid().x() - 14.0 / 3.0).abs() < 1e-5);
        assert!((p.centroid().y() - 16.0 / 3.0).abs() < 1e-5);
    }

    #[test]
    fn interior_and_duplicate_points_are_dropped() {
        let p = Polygon::new(&[
            v(0.0, 0.0),
            v(1.0, 0.0),
            v(0.5, 0.5),
            v(1.0, 1.0),
            v(1.0, 1.001),
            v(0.0, 1.0),
            v(0.0, 0.0005),
        ])
        .unwrap();
        assert_eq!(p.count(), 4);
        assert_eq!(p.vertices()[0], v(1.0, 0.0));
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        assert_eq!(
            Polygon::new(&[v(0.0, 0.0), v(1.0, 1.0)]),
            Err(ShapeError::TooFewVertices(2))
        );
        assert_eq!(
            Polygon::new(&[v(0.0, 0.0), v(1.0, 1.0), v(2.0, 2.0)]),
            Err(ShapeError::Degenerate)
        );
        assert_eq!(
            Polygon::new(&[v(0.0, 0.0), v(0.001, 0.0), v(0.0, 0.001)]),
            Err(ShapeError::TooFewVertices(1))
        );
        assert!(matches!(
            Polygon::new(&[v(0.0, 0.0); 9]),
            Err(ShapeError::TooManyVertices { got: 9, max: 8 })
        ));
        assert_eq!(Polygon::new_box(0.0, 1.0), Err(ShapeError::Degenerate));
    }

    #[test]
    fn containment_is_edge_exclusive() {
        let p = Polygon::new(&[v(2.0, 7.0), v(4.0, 2.0), v(8.0, 7.0)]).unwrap();
        assert!(p.contains_local(v(4.0, 5.0)));
        assert!(!p.contains_local(v(1.0, 7.0)));
        assert!(!p.contains_local(v(3.0, 7.0)));
        assert!(!p.contains_local(v(2.0, 7.0)));
    }

    #[test]
    fn oriented_box_is_centered() {
        let p = Polygon::new_oriented_box(2.0, 1.0, v(3.0, 4.0), 0.3).unwrap();
        assert!((p.centroid().x() - 3.0).abs() < 1e-5);
        assert!((p.centroid().y() - 4.0).abs() < 1e-5);
        let m = p.compute_mass(1.0);
        assert!((m.mass - 8.0).abs() < 1e-4);
    }
}
