// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Built-in scenes.

use clap::ValueEnum;
use rdge_physics::{BodyType, GraphConfig, Vec2};

use crate::scene::{BodySpec, FixtureSpec, Scene, ShapeSpec};

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Demo {
    /// A slowly spinning hollow box with loose crates inside.
    Tumbler,
    /// A stack of boxes in a triangle on a wide floor.
    Pyramid,
    /// Rows of balls dropped onto a floor.
    Rain,
}

impl Demo {
    pub fn scene(self) -> Scene {
        match self {
            Self::Tumbler => tumbler(),
            Self::Pyramid => pyramid(),
            Self::Rain => rain(),
        }
    }
}

fn boxed(hx: f32, hy: f32) -> ShapeSpec {
    ShapeSpec::Box { hx, hy, center: Vec2::ZERO, angle: 0.0 }
}

fn floor(half_width: f32) -> BodySpec {
    BodySpec::new(BodyType::Static, Vec2::ZERO)
        .named("floor")
        .with_fixture(FixtureSpec::new(boxed(half_width, 0.5)).with_friction(0.6))
}

fn tumbler() -> Scene {
    let wall = |hx: f32, hy: f32, x: f32, y: f32| {
        FixtureSpec::new(ShapeSpec::Box { hx, hy, center: Vec2::new(x, y), angle: 0.0 })
            .with_density(5.0)
    };
    let mut drum = BodySpec::new(BodyType::Kinematic, Vec2::new(0.0, 10.0))
        .named("drum")
        .with_fixture(wall(0.5, 10.0, 10.0, 0.0))
        .with_fixture(wall(0.5, 10.0, -10.0, 0.0))
        .with_fixture(wall(10.0, 0.5, 0.0, 10.0))
        .with_fixture(wall(10.0, 0.5, 0.0, -10.0));
    drum.angular_velocity = 0.05 * core::f32::consts::PI;

    let mut bodies = vec![drum];
    for i in 0..10u8 {
        let x = f32::from(i % 5) * 2.0 - 4.0;
        let y = 6.0 + f32::from(i / 5) * 2.0;
        bodies.push(
            BodySpec::new(BodyType::Dynamic, Vec2::new(x, y))
                .named(format!("crate-{i}"))
                .with_fixture(FixtureSpec::new(boxed(0.625, 0.625)).with_density(1.0)),
        );
    }
    Scene { config: GraphConfig::default(), bodies }
}

fn pyramid() -> Scene {
    const ROWS: u8 = 8;
    const HALF: f32 = 0.5;
    let mut bodies = vec![floor(40.0)];
    for row in 0..ROWS {
        let count = ROWS - row;
        let y = 0.5 + HALF + f32::from(row) * 2.0 * HALF;
        let x0 = -f32::from(count - 1) * 0.5 * 1.125;
        for col in 0..count {
            let x = x0 + f32::from(col) * 1.125;
            bodies.push(
                BodySpec::new(BodyType::Dynamic, Vec2::new(x, y))
                    .named(format!("block-{row}-{col}"))
                    .with_fixture(FixtureSpec::new(boxed(HALF, HALF)).with_density(1.0)),
            );
        }
    }
    Scene { config: GraphConfig::default(), bodies }
}

fn rain() -> Scene {
    let mut bodies = vec![floor(20.0)];
    for row in 0..3u8 {
        let stagger = if row % 2 == 0 { 0.0 } else { 0.5 };
        for col in 0..10u8 {
            let x = f32::from(col) - 4.5 + stagger;
            let y = 4.0 + f32::from(row) * 1.5;
            let shape = ShapeSpec::Circle { center: Vec2::ZERO, radius: 0.4 };
            bodies.push(
                BodySpec::new(BodyType::Dynamic, Vec2::new(x, y))
                    .named(format!("drop-{row}-{col}"))
                    .with_fixture(FixtureSpec::new(shape).with_density(1.0)),
            );
        }
    }
    Scene { config: GraphConfig::default(), bodies }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use rdge_physics::DefaultListener;

    #[test]
    fn every_demo_builds() {
        for demo in Demo::value_variants() {
            let scene = demo.scene();
            let (graph, handles) = scene.build(DefaultListener).unwrap();
            assert_eq!(handles.len(), scene.bodies.len());
            assert!(graph.fixture_count() >= scene.bodies.len());
        }
    }

    #[test]
    fn pyramid_has_a_triangle_of_blocks() {
        let scene = Demo::Pyramid.scene();
        // Floor plus 8 + 7 + ... + 1 blocks.
        assert_eq!(scene.bodies.len(), 1 + 36);
    }

    #[test]
    fn demo_scenes_round_trip_through_json() {
        let scene = Demo::Tumbler.scene();
        let text = serde_json::to_string(&scene).unwrap();
        let back: Scene = serde_json::from_str(&text).unwrap();
        assert_eq!(back, scene);
    }
}
