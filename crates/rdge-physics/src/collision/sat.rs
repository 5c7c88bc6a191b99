// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Separating-axis manifolds for polygon pairs and polygon/circle pairs.

use super::Manifold;
use crate::constants::LINEAR_SLOP;
use crate::math::{Vec2, EPSILON};
use crate::shapes::{Circle, Polygon};

/// A face on B must beat A's best face by this much to become the reference
/// face; keeps the choice stable when both are nearly equal.
const RELATIVE_TOLERANCE: f32 = 0.1 * LINEAR_SLOP;

/// Largest separation of `b` from any face of `a`, with the face index.
fn max_separation(a: &Polygon, b: &Polygon) -> (f32, usize) {
    let mut best = f32::MIN;
    let mut best_index = 0;
    for (i, (v, n)) in a.vertices().iter().zip(a.normals()).enumerate() {
        let s = b
            .vertices()
            .iter()
            .map(|w| n.dot(*w - *v))
            .fold(f32::MAX, f32::min);
        if s > best {
            best = s;
            best_index = i;
        }
    }
    (best, best_index)
}

/// Incident edge on `inc`: the one whose normal is most anti-parallel to
/// `ref_normal`.
fn incident_edge(inc: &Polygon, ref_normal: Vec2) -> [Vec2; 2] {
    let mut index = 0;
    let mut min_dot = f32::MAX;
    for (i, n) in inc.normals().iter().enumerate() {
        let d = ref_normal.dot(*n);
        if d < min_dot {
            min_dot = d;
            index = i;
        }
    }
    let verts = inc.vertices();
    [verts[index], verts[(index + 1) % verts.len()]]
}

/// Sutherland-Hodgman clip of a segment against the half-plane
/// `normal · x <= offset`.
fn clip_segment(input: [Vec2; 2], normal: Vec2, offset: f32) -> Option<[Vec2; 2]> {
    let d0 = normal.dot(input[0]) - offset;
    let d1 = normal.dot(input[1]) - offset;

    let mut out = [Vec2::ZERO; 2];
    let mut n = 0;
    if d0 <= 0.0 {
        out[n] = input[0];
        n += 1;
    }
    if d1 <= 0.0 {
        out[n] = input[1];
        n += 1;
    }
    if d0 * d1 < 0.0 && n < 2 {
        let t = d0 / (d0 - d1);
        out[n] = input[0] + (input[1] - input[0]) * t;
        n += 1;
    }
    (n == 2).then_some(out)
}

/// Polygon-polygon manifold.
///
/// Every face normal of both polygons is a candidate separating axis. The
/// axis with the least penetration wins; ties (within a small tolerance) go to
/// `a`. The incident edge of the other polygon is clipped against the side
/// planes of the reference face, and clipped points that lie behind the
/// reference face become contacts.
pub(super) fn collide_polygons(a: &Polygon, b: &Polygon) -> Option<Manifold> {
    let (sep_a, edge_a) = max_separation(a, b);
    if sep_a >= 0.0 {
        return None;
    }
    let (sep_b, edge_b) = max_separation(b, a);
    if sep_b >= 0.0 {
        return None;
    }

    let (reference, incident, edge, flip) = if sep_b > sep_a + RELATIVE_TOLERANCE {
        (b, a, edge_b, true)
    } else {
        (a, b, edge_a, false)
    };

    let ref_verts = reference.vertices();
    let v11 = ref_verts[edge];
    let v12 = ref_verts[(edge + 1) % ref_verts.len()];
    let tangent = (v12 - v11).normalize();
    let normal = tangent.cross_scalar(1.0);

    let front_offset = normal.dot(v11);
    let side_offset1 = -tangent.dot(v11);
    let side_offset2 = tangent.dot(v12);

    let inc_edge = incident_edge(incident, reference.normals()[edge]);
    let clipped = clip_segment(inc_edge, -tangent, side_offset1)?;
    let clipped = clip_segment(clipped, tangent, side_offset2)?;

    let mut manifold = Manifold {
        normal: if flip { -normal } else { normal },
        plane: (v11 + v12) * 0.5,
        ..Manifold::default()
    };
    for point in clipped {
        let separation = normal.dot(point) - front_offset;
        if separation < 0.0 {
            manifold.points[manifold.count] = point;
            manifold.depths[manifold.count] = -separation;
            manifold.count += 1;
        }
    }
    (manifold.count > 0).then_some(manifold)
}

/// Polygon-circle manifold. The normal points from the polygon toward the
/// circle; the contact point is halfway between the circle's deepest point and
/// the polygon's surface.
pub(super) fn collide_polygon_circle(poly: &Polygon, circle: &Circle) -> Option<Manifold> {
    let c = circle.center();
    let radius = circle.radius();
    let verts = poly.vertices();
    let normals = poly.normals();

    let mut separation = f32::MIN;
    let mut face = 0;
    for (i, (v, n)) in verts.iter().zip(normals).enumerate() {
        let s = n.dot(c - *v);
        if s >= radius {
            return None;
        }
        if s > separation {
            separation = s;
            face = i;
        }
    }

    let v1 = verts[face];
    let v2 = verts[(face + 1) % verts.len()];

    let contact = |normal: Vec2, dist: f32, plane: Vec2| {
        let point = c - normal * ((radius + dist) * 0.5);
        Manifold::single(point, radius - dist, normal, plane)
    };

    // Center inside the polygon: push out through the closest face.
    if separation < EPSILON {
        return Some(contact(normals[face], separation, v1));
    }

    let u1 = (c - v1).dot(v2 - v1);
    let u2 = (c - v2).dot(v1 - v2);
    if u1 <= 0.0 || u2 <= 0.0 {
        let vertex = if u1 <= 0.0 { v1 } else { v2 };
        let dist = c.distance(vertex);
        if dist >= radius {
            return None;
        }
        return Some(contact((c - vertex).normalize(), dist, vertex));
    }

    let normal = normals[face];
    let dist = (c - v1).dot(normal);
    if dist >= radius {
        return None;
    }
    Some(contact(normal, dist, v1))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::float_cmp)]

    use super::*;

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    #[test]
    fn vertex_region_normal_points_at_circle() {
        let square = Polygon::new_box(1.0, 1.0).unwrap();
        let ball = Circle::new(v(1.5, 1.5), 1.0).unwrap();
        let m = collide_polygon_circle(&square, &ball).unwrap();
        let s = std::f32::consts::FRAC_1_SQRT_2;
        assert!((m.normal.x() - s).abs() < 1e-5 && (m.normal.y() - s).abs() < 1e-5);
        assert!((m.depths[0] - 0.292_893_2).abs() < 1e-4);
        assert!((m.points[0].x() - 0.896_446_6).abs() < 1e-4);
    }

    #[test]
    fn deep_circle_uses_nearest_face() {
        let square = Polygon::new_box(1.0, 1.0).unwrap();
        let ball = Circle::new(v(0.5, 0.0), 1.0).unwrap();
        let m = collide_polygon_circle(&square, &ball).unwrap();
        assert_eq!(m.normal, v(1.0, 0.0));
        assert!((m.depths[0] - 1.5).abs() < 1e-6);
        assert!((m.points[0].x() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn circle_resting_on_face_is_not_a_contact() {
        let square = Polygon::new_box(1.0, 1.0).unwrap();
        let ball = Circle::new(v(0.0, 2.0), 1.0).unwrap();
        assert!(collide_polygon_circle(&square, &ball).is_none());
    }

    #[test]
    fn overlapping_boxes_clip_to_two_points() {
        let a = Polygon::new_box(1.0, 1.0).unwrap();
        let b = Polygon::new_oriented_box(1.0, 1.0, v(1.5, 0.5), 0.0).unwrap();
        let m = collide_polygons(&a, &b).unwrap();
        assert_eq!(m.count, 2);
        assert_eq!(m.normal, v(1.0, 0.0));
        for i in 0..2 {
            assert!((m.depths[i] - 0.5).abs() < 1e-6);
            assert!((m.points[i].x() - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn boxes_sharing_an_edge_do_not_collide() {
        let a = Polygon::new_box(1.0, 1.0).unwrap();
        let b = Polygon::new_oriented_box(1.0, 1.0, v(2.0, 0.0), 0.0).unwrap();
        assert!(collide_polygons(&a, &b).is_none());
    }
}
