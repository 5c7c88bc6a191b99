// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Fixtures bind a shape and material to a body.

use crate::body::BodyHandle;
use crate::broad::ProxyId;
use crate::filter::CollisionFilter;
use crate::math::Vec2;
use crate::pool::Handle;
use crate::shapes::{Shape, ShapeType};
use crate::types::aabb::Aabb;
use crate::types::transform::Transform;

/// Generation-checked handle to a [`Fixture`].
pub type FixtureHandle = Handle<Fixture>;

/// Creation parameters for a fixture.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FixtureProfile {
    /// Shape in body-local coordinates.
    pub shape: Shape,
    /// Mass per square metre. Zero-density fixtures add no mass.
    pub density: f32,
    /// Coulomb friction coefficient.
    pub friction: f32,
    /// Bounciness in `[0, 1]`.
    pub restitution: f32,
    /// Pair filter.
    pub filter: CollisionFilter,
    /// Sensors report overlap but never produce a collision response.
    pub is_sensor: bool,
    /// Opaque caller payload.
    pub user_data: u64,
}

impl FixtureProfile {
    /// Profile with default material for `shape`.
    pub fn new(shape: impl Into<Shape>) -> Self {
        Self {
            shape: shape.into(),
            density: 0.0,
            friction: 0.2,
            restitution: 0.0,
            filter: CollisionFilter::default(),
            is_sensor: false,
            user_data: 0,
        }
    }

    /// Sets the density.
    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    /// Sets the friction coefficient.
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    /// Sets the restitution.
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    /// Sets the collision filter.
    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Marks the fixture as a sensor.
    pub fn sensor(mut self) -> Self {
        self.is_sensor = true;
        self
    }

    /// Sets the caller payload.
    pub fn with_user_data(mut self, user_data: u64) -> Self {
        self.user_data = user_data;
        self
    }
}

/// A shape attached to exactly one body for its whole lifetime.
///
/// The fixture keeps its shape in body-local space and a world-space copy
/// that [`Fixture::synchronize`] refreshes from the body transform once per
/// step, before the narrow phase runs.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub(crate) body: BodyHandle,
    shape: Shape,
    world_shape: Shape,
    density: f32,
    friction: f32,
    restitution: f32,
    filter: CollisionFilter,
    is_sensor: bool,
    pub(crate) proxy: Option<ProxyId<FixtureHandle>>,
    user_data: u64,
}

impl Fixture {
    pub(crate) fn new(body: BodyHandle, profile: &FixtureProfile, xf: &Transform) -> Self {
        Self {
            body,
            shape: profile.shape,
            world_shape: profile.shape.transformed(xf),
            density: profile.density,
            friction: profile.friction,
            restitution: profile.restitution,
            filter: profile.filter,
            is_sensor: profile.is_sensor,
            proxy: None,
            user_data: profile.user_data,
        }
    }

    /// Owning body.
    pub const fn body(&self) -> BodyHandle {
        self.body
    }

    /// Shape in body-local coordinates.
    pub const fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Shape posed by the body transform at the last synchronization.
    pub const fn world_shape(&self) -> &Shape {
        &self.world_shape
    }

    /// Kind of the attached shape.
    pub const fn shape_type(&self) -> ShapeType {
        self.shape.shape_type()
    }

    /// Density.
    pub const fn density(&self) -> f32 {
        self.density
    }

    /// Friction coefficient.
    pub const fn friction(&self) -> f32 {
        self.friction
    }

    /// Sets the friction used by contacts created from now on.
    pub fn set_friction(&mut self, friction: f32) {
        self.friction = friction;
    }

    /// Restitution.
    pub const fn restitution(&self) -> f32 {
        self.restitution
    }

    /// Sets the restitution used by contacts created from now on.
    pub fn set_restitution(&mut self, restitution: f32) {
        self.restitution = restitution;
    }

    /// Pair filter.
    pub const fn filter(&self) -> CollisionFilter {
        self.filter
    }

    /// Returns `true` for sensors.
    pub const fn is_sensor(&self) -> bool {
        self.is_sensor
    }

    /// Opaque caller payload.
    pub const fn user_data(&self) -> u64 {
        self.user_data
    }

    /// Sets the opaque caller payload.
    pub fn set_user_data(&mut self, user_data: u64) {
        self.user_data = user_data;
    }

    /// Broad-phase proxy; `None` while the body is not simulating.
    pub const fn proxy(&self) -> Option<ProxyId<FixtureHandle>> {
        self.proxy
    }

    /// Tight world-space bounds of the synchronized shape.
    pub fn aabb(&self) -> Aabb {
        self.world_shape.compute_aabb(&Transform::IDENTITY)
    }

    /// Tests a world-space point against the synchronized shape.
    pub fn test_point(&self, point: Vec2) -> bool {
        self.world_shape.contains(&Transform::IDENTITY, point)
    }

    /// Returns `true` if the flag changed. Waking the body is left to the
    /// graph.
    pub(crate) fn set_sensor(&mut self, is_sensor: bool) -> bool {
        let changed = self.is_sensor != is_sensor;
        self.is_sensor = is_sensor;
        changed
    }

    pub(crate) fn set_filter(&mut self, filter: CollisionFilter) {
        self.filter = filter;
    }

    /// Re-poses the world shape with `xf` and returns its tight bounds.
    pub(crate) fn synchronize(&mut self, xf: &Transform) -> Aabb {
        self.world_shape = self.shape.transformed(xf);
        self.aabb()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::float_cmp)]

    use super::*;
    use crate::pool::Pool;
    use crate::shapes::Circle;

    #[test]
    fn synchronize_moves_the_world_shape() {
        let mut bodies: Pool<crate::body::RigidBody> = Pool::new();
        let body = bodies.allocate(crate::body::RigidBody::new(&crate::body::BodyProfile::default()));
        let circle = Circle::new(Vec2::new(1.0, 0.0), 0.5).unwrap();
        let mut fixture = Fixture::new(body, &FixtureProfile::new(circle), &Transform::IDENTITY);
        assert!(fixture.test_point(Vec2::new(1.2, 0.0)));

        let aabb = fixture.synchronize(&Transform::new(Vec2::new(0.0, 3.0), core::f32::consts::FRAC_PI_2));
        // Local (1, 0) rotated a quarter turn lands at (0, 1), then shifted up.
        assert!((aabb.center().x()).abs() < 1e-5);
        assert!((aabb.center().y() - 4.0).abs() < 1e-5);
        assert!(!fixture.test_point(Vec2::new(1.2, 0.0)));
        assert_eq!(fixture.shape(), &Shape::Circle(circle));
    }

    #[test]
    fn sensor_toggle_reports_changes() {
        let mut bodies: Pool<crate::body::RigidBody> = Pool::new();
        let body = bodies.allocate(crate::body::RigidBody::new(&crate::body::BodyProfile::default()));
        let circle = Circle::new(Vec2::ZERO, 1.0).unwrap();
        let mut fixture = Fixture::new(body, &FixtureProfile::new(circle), &Transform::IDENTITY);
        assert!(fixture.set_sensor(true));
        assert!(!fixture.set_sensor(true));
        assert!(fixture.is_sensor());
    }
}
