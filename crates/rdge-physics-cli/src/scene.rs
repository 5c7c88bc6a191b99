// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! JSON scene format and its translation into a collision graph.
//!
//! Every field except a fixture's `shape` is optional. Vectors are written as
//! `{ "x": .., "y": .. }`; shapes carry a `type` tag of `circle`, `polygon` or
//! `box`.

use anyhow::{Context, Result};
use rdge_physics::{
    BodyHandle, BodyProfile, BodyType, Circle, CollisionFilter, CollisionGraph, ContactListener,
    FixtureProfile, GraphConfig, Polygon, Shape, ShapeError, Vec2,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A complete scene: graph settings plus the bodies to create, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub config: GraphConfig,
    pub bodies: Vec<BodySpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodySpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub kind: BodyType,
    pub position: Vec2,
    pub angle: f32,
    pub linear_velocity: Vec2,
    pub angular_velocity: f32,
    pub gravity_scale: f32,
    pub fixed_rotation: bool,
    pub fixtures: Vec<FixtureSpec>,
}

impl Default for BodySpec {
    fn default() -> Self {
        Self {
            name: None,
            kind: BodyType::Static,
            position: Vec2::ZERO,
            angle: 0.0,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            gravity_scale: 1.0,
            fixed_rotation: false,
            fixtures: Vec::new(),
        }
    }
}

impl BodySpec {
    pub fn new(kind: BodyType, position: Vec2) -> Self {
        Self { kind, position, ..Self::default() }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_fixture(mut self, fixture: FixtureSpec) -> Self {
        self.fixtures.push(fixture);
        self
    }

    fn profile(&self) -> BodyProfile {
        BodyProfile {
            body_type: self.kind,
            position: self.position,
            angle: self.angle,
            linear_velocity: self.linear_velocity,
            angular_velocity: self.angular_velocity,
            gravity_scale: self.gravity_scale,
            fixed_rotation: self.fixed_rotation,
            ..BodyProfile::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureSpec {
    pub shape: ShapeSpec,
    #[serde(default)]
    pub density: f32,
    #[serde(default = "default_friction")]
    pub friction: f32,
    #[serde(default)]
    pub restitution: f32,
    #[serde(default)]
    pub sensor: bool,
    #[serde(default)]
    pub filter: CollisionFilter,
}

const fn default_friction() -> f32 {
    0.2
}

impl FixtureSpec {
    pub fn new(shape: ShapeSpec) -> Self {
        Self {
            shape,
            density: 0.0,
            friction: default_friction(),
            restitution: 0.0,
            sensor: false,
            filter: CollisionFilter::default(),
        }
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    fn profile(&self) -> Result<FixtureProfile, ShapeError> {
        let shape = Shape::try_from(&self.shape)?;
        let profile = FixtureProfile::new(shape)
            .with_density(self.density)
            .with_friction(self.friction)
            .with_restitution(self.restitution)
            .with_filter(self.filter);
        Ok(if self.sensor { profile.sensor() } else { profile })
    }
}

/// Shape description in body-local coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeSpec {
    Circle {
        #[serde(default)]
        center: Vec2,
        radius: f32,
    },
    Polygon {
        vertices: Vec<Vec2>,
    },
    Box {
        hx: f32,
        hy: f32,
        #[serde(default)]
        center: Vec2,
        #[serde(default)]
        angle: f32,
    },
}

impl TryFrom<&ShapeSpec> for Shape {
    type Error = ShapeError;

    fn try_from(spec: &ShapeSpec) -> Result<Self, Self::Error> {
        Ok(match spec {
            ShapeSpec::Circle { center, radius } => Circle::new(*center, *radius)?.into(),
            ShapeSpec::Polygon { vertices } => Polygon::new(vertices)?.into(),
            ShapeSpec::Box { hx, hy, center, angle } => {
                Polygon::new_oriented_box(*hx, *hy, *center, *angle)?.into()
            }
        })
    }
}

impl Scene {
    /// Builds a graph reporting to `listener`. Returns the graph and each
    /// body's handle with its display label, in scene order.
    pub fn build<L: ContactListener>(
        &self,
        listener: L,
    ) -> Result<(CollisionGraph<L>, Vec<(String, BodyHandle)>)> {
        let mut graph = CollisionGraph::with_listener(self.config, listener);
        let mut handles = Vec::with_capacity(self.bodies.len());
        for (index, spec) in self.bodies.iter().enumerate() {
            let label = spec.name.clone().unwrap_or_else(|| format!("#{index}"));
            let body = graph.create_body(&spec.profile());
            for (slot, fixture) in spec.fixtures.iter().enumerate() {
                let profile = fixture
                    .profile()
                    .with_context(|| format!("body {label}: fixture {slot} has an invalid shape"))?;
                graph
                    .create_fixture(body, &profile)
                    .with_context(|| format!("body {label}: failed to attach fixture {slot}"))?;
            }
            handles.push((label, body));
        }
        info!(bodies = handles.len(), fixtures = graph.fixture_count(), "scene built");
        Ok((graph, handles))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::float_cmp)]

    use super::*;
    use rdge_physics::DefaultListener;

    const BALL_ON_FLOOR: &str = r#"{
        "config": { "gravity": { "x": 0.0, "y": -10.0 } },
        "bodies": [
            { "name": "floor", "fixtures": [ { "shape": { "type": "box", "hx": 5.0, "hy": 0.5 } } ] },
            {
                "name": "ball",
                "kind": "dynamic",
                "position": { "x": 0.0, "y": 2.0 },
                "fixtures": [ { "shape": { "type": "circle", "radius": 0.5 }, "density": 1.0 } ]
            }
        ]
    }"#;

    #[test]
    fn sparse_scene_uses_defaults() {
        let scene: Scene = serde_json::from_str(BALL_ON_FLOOR).unwrap();
        assert_eq!(scene.config.velocity_iterations, GraphConfig::default().velocity_iterations);
        assert_eq!(scene.bodies[0].kind, BodyType::Static);
        assert_eq!(scene.bodies[1].gravity_scale, 1.0);
        assert_eq!(scene.bodies[1].fixtures[0].friction, 0.2);
    }

    #[test]
    fn build_creates_bodies_in_order() {
        let scene: Scene = serde_json::from_str(BALL_ON_FLOOR).unwrap();
        let (graph, handles) = scene.build(DefaultListener).unwrap();
        let labels: Vec<&str> = handles.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, ["floor", "ball"]);
        assert_eq!(graph.fixture_count(), 2);
        assert!(graph.body(handles[1].1).unwrap().mass() > 0.0);
    }

    #[test]
    fn invalid_shapes_name_the_body() {
        let scene = Scene {
            bodies: vec![BodySpec::new(BodyType::Dynamic, Vec2::ZERO).with_fixture(FixtureSpec::new(
                ShapeSpec::Circle { center: Vec2::ZERO, radius: -1.0 },
            ))],
            ..Scene::default()
        };
        let err = scene.build(DefaultListener).unwrap_err();
        assert!(format!("{err:#}").contains("body #0"));
    }

    #[test]
    fn polygon_spec_goes_through_the_hull() {
        let spec = ShapeSpec::Polygon {
            vertices: vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)],
        };
        assert!(matches!(Shape::try_from(&spec), Ok(Shape::Polygon(_))));
    }
}
