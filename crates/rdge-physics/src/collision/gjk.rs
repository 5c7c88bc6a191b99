// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Boolean GJK (Gilbert-Johnson-Keerthi) overlap test for convex shapes.
//!
//! Works on the Minkowski difference `A - B`: the shapes overlap iff it
//! contains the origin. Configurations where the origin sits on the boundary
//! of the difference (touching shapes) report no overlap, matching the
//! edge-exclusive convention used by the rest of the narrow phase. Running out
//! of iterations also reports no overlap.

use crate::constants::GJK_MAX_ITERATIONS;
use crate::math::{Vec2, EPSILON};
use crate::shapes::Shape;

/// Up to three Minkowski-difference points; the newest is always last.
struct Simplex {
    points: [Vec2; 3],
    len: usize,
}

impl Simplex {
    const fn new(first: Vec2) -> Self {
        Self { points: [first, Vec2::ZERO, Vec2::ZERO], len: 1 }
    }

    fn push(&mut self, p: Vec2) {
        debug_assert!(self.len < 3, "simplex overflow");
        self.points[self.len] = p;
        self.len += 1;
    }

    fn set(&mut self, points: &[Vec2]) {
        self.points[..points.len()].copy_from_slice(points);
        self.len = points.len();
    }

    /// Reduces the simplex toward the origin and picks the next search
    /// direction. Returns `true` once the origin is enclosed.
    fn contains_origin(&mut self, dir: &mut Vec2) -> bool {
        match self.len {
            2 => {
                self.line_case(dir);
                false
            }
            3 => self.triangle_case(dir),
            _ => false,
        }
    }

    fn line_case(&mut self, dir: &mut Vec2) {
        let a = self.points[1];
        let b = self.points[0];
        let ab = b - a;
        let ao = -a;
        if ab.dot(ao) > 0.0 {
            // Origin is between A and B.
            let d = triple_product(ab, ao, ab);
            *dir = if d.length_squared() <= EPSILON * EPSILON { ab.perp() } else { d };
        } else {
            // Origin is past A.
            self.set(&[a]);
            *dir = ao;
        }
    }

    fn triangle_case(&mut self, dir: &mut Vec2) -> bool {
        let a = self.points[2];
        let b = self.points[1];
        let c = self.points[0];
        let ab = b - a;
        let ac = c - a;
        let ao = -a;

        let ab_perp = triple_product(ac, ab, ab);
        if ab_perp.dot(ao) >= 0.0 {
            // Origin is past AB edge.
            self.set(&[b, a]);
            *dir = ab_perp;
            return false;
        }
        let ac_perp = triple_product(ab, ac, ac);
        if ac_perp.dot(ao) >= 0.0 {
            // Origin is past AC edge.
            self.set(&[c, a]);
            *dir = ac_perp;
            return false;
        }
        true
    }
}

/// `(a × b) × c` expanded for the plane: `b (a·c) - a (b·c)`.
fn triple_product(a: Vec2, b: Vec2, c: Vec2) -> Vec2 {
    b * a.dot(c) - a * b.dot(c)
}

fn support(a: &Shape, b: &Shape, dir: Vec2) -> Vec2 {
    a.support(dir) - b.support(-dir)
}

/// Returns `true` if two convex world-space shapes overlap.
pub fn gjk_intersects(a: &Shape, b: &Shape) -> bool {
    let mut dir = b.centroid() - a.centroid();
    if dir.length_squared() <= EPSILON * EPSILON {
        dir = Vec2::UNIT_X;
    }

    let first = support(a, b, dir);
    let mut simplex = Simplex::new(first);
    dir = -first;

    for _ in 0..GJK_MAX_ITERATIONS {
        if dir.length_squared() <= EPSILON * EPSILON {
            // Origin lies on the simplex: the shapes only touch.
            return false;
        }
        let p = support(a, b, dir);
        if p.dot(dir) <= 0.0 {
            return false;
        }
        simplex.push(p);
        if simplex.contains_origin(&mut dir) {
            return true;
        }
    }
    false
}
