// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs, clippy::unwrap_used)]
//! Mass, centroid and inertia of circles and polygons.

mod common;

use common::{approx_eq, approx_vec, v};
use rdge_physics::{Circle, Polygon, Shape, ShapeError, ShapeType, Transform, Vec2};

#[test]
fn unit_circle_mass_matches_closed_form() {
    let md = Shape::from(Circle::new(Vec2::ZERO, 1.0).unwrap()).compute_mass(1.0);
    assert!(approx_eq(md.mass, core::f32::consts::PI, 1e-5));
    assert!(approx_vec(md.center, Vec2::ZERO, 1e-6));
    assert!(approx_eq(md.inertia, core::f32::consts::FRAC_PI_2, 1e-5));
}

#[test]
fn offset_circle_uses_parallel_axis() {
    let md = Shape::from(Circle::new(v(0.0, 2.0), 1.0).unwrap()).compute_mass(0.5);
    let mass = 0.5 * core::f32::consts::PI;
    assert!(approx_eq(md.mass, mass, 1e-5));
    assert!(approx_eq(md.inertia, mass * 4.5, 1e-4));
    assert!(approx_eq(md.inertia_about_centroid(), mass * 0.5, 1e-4));
}

#[test]
fn centroid_inertia_survives_large_offsets() {
    let md = Shape::from(Circle::new(v(1000.0, 0.0), 0.1).unwrap()).compute_mass(1.0);
    let mass = core::f32::consts::PI * 0.01;
    assert!(approx_eq(md.inertia_about_centroid(), 0.5 * mass * 0.01, 1e-9));

    let far_box = Polygon::new_oriented_box(0.5, 0.5, v(1000.0, -1000.0), 0.4).unwrap();
    let md = Shape::from(far_box).compute_mass(1.0);
    assert!(approx_eq(md.inertia_about_centroid(), 1.0 / 6.0, 1e-3));
}

#[test]
fn triangle_regression_values() {
    let tri = Polygon::new(&[v(0.0, 0.0), v(1.5, 3.0), v(3.0, 0.0)]).unwrap();
    let md = Shape::from(tri).compute_mass(1.0);
    assert!(approx_eq(md.mass, 4.5, 1e-5));
    assert!(approx_vec(md.center, v(1.5, 1.0), 1e-5));
    assert!(approx_eq(md.inertia, 18.5625, 1e-3));
    // About the centroid: 18.5625 - 4.5 * |(1.5, 1)|².
    assert!(approx_eq(md.inertia_about_centroid(), 3.9375, 1e-3));
}

#[test]
fn translated_triangles_keep_mass_and_shift_inertia() {
    let up = Polygon::new(&[v(1.0, 1.0), v(2.5, 4.0), v(4.0, 1.0)]).unwrap();
    let md = Shape::from(up).compute_mass(1.0);
    assert!(approx_eq(md.mass, 4.5, 1e-5));
    assert!(approx_vec(md.center, v(2.5, 2.0), 1e-5));
    assert!(approx_eq(md.inertia, 50.0625, 1e-3));

    let down = Polygon::new(&[v(-1.0, -1.0), v(0.5, 2.0), v(2.0, -1.0)]).unwrap();
    let md = Shape::from(down).compute_mass(1.0);
    assert!(approx_eq(md.inertia, 5.0625, 1e-3));
}

#[test]
fn pentagon_regression_values() {
    let pts = [v(3.0, 0.0), v(4.0, 2.0), v(1.5, 3.0), v(-1.0, 2.0), v(0.0, 0.0)];
    let md = Shape::from(Polygon::new(&pts).unwrap()).compute_mass(1.0);
    assert!(approx_eq(md.mass, 10.5, 1e-4));
    assert!(approx_vec(md.center, v(1.5, 1.380_952), 1e-4));
    assert!(approx_eq(md.inertia, 63.3125, 1e-2));
}

#[test]
fn irregular_polygon_is_hulled_ccw() {
    let pts = [v(-1.0, 0.0), v(0.0, -3.0), v(1.0, 0.0), v(1.0, 1.0), v(-1.0, 2.0)];
    let poly = Polygon::new(&pts).unwrap();
    assert_eq!(poly.count(), 5);
    assert_eq!(poly.vertices()[0], v(1.0, 0.0));
    let md = Shape::from(poly).compute_mass(1.0);
    assert!(approx_eq(md.mass, 6.0, 1e-4));
    assert!(approx_vec(md.center, v(-0.055_556, -0.111_111), 1e-4));
    assert!(approx_eq(md.inertia, 8.5, 1e-2));
}

#[test]
fn density_scales_mass_linearly() {
    let shape = Shape::from(Polygon::new_box(1.0, 2.0).unwrap());
    let one = shape.compute_mass(1.0);
    let three = shape.compute_mass(3.0);
    assert!(approx_eq(three.mass, one.mass * 3.0, 1e-4));
    assert!(approx_eq(three.inertia, one.inertia * 3.0, 1e-3));
}

#[test]
fn invalid_shapes_are_rejected() {
    assert_eq!(Circle::new(Vec2::ZERO, -0.5), Err(ShapeError::InvalidRadius(-0.5)));
    assert!(matches!(
        Polygon::new(&[v(0.0, 0.0), v(1.0, 1.0), v(2.0, 2.0)]),
        Err(ShapeError::Degenerate)
    ));
    assert!(matches!(Polygon::new(&[v(0.0, 0.0), v(1.0, 1.0)]), Err(ShapeError::TooFewVertices(2))));
    let many: Vec<Vec2> = (0u8..9)
        .map(|i| {
            let a = f32::from(i) * 0.6;
            v(a.cos(), a.sin())
        })
        .collect();
    assert!(matches!(Polygon::new(&many), Err(ShapeError::TooManyVertices { got: 9, max: 8 })));
}

#[test]
fn contains_respects_transform() {
    let shape = Shape::from(Polygon::new_box(1.0, 0.25).unwrap());
    assert_eq!(shape.shape_type(), ShapeType::Polygon);
    let xf = Transform::new(v(5.0, 0.0), core::f32::consts::FRAC_PI_2);
    // The box is now tall: half-extents (0.25, 1) around (5, 0).
    assert!(shape.contains(&xf, v(5.0, 0.9)));
    assert!(!shape.contains(&xf, v(5.9, 0.0)));
}

#[test]
fn aabb_of_rotated_box() {
    let shape = Shape::from(Polygon::new_box(1.0, 1.0).unwrap());
    let aabb = shape.compute_aabb(&Transform::new(v(0.0, 0.0), core::f32::consts::FRAC_PI_4));
    let r = core::f32::consts::SQRT_2;
    assert!(approx_vec(aabb.max(), v(r, r), 1e-5));
    assert!(approx_vec(aabb.min(), v(-r, -r), 1e-5));
}
