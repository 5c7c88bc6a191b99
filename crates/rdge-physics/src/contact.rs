// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Persistent fixture pairs.
//!
//! A contact exists while the fat boxes of its two fixtures overlap. Each step
//! re-runs the narrow phase and moves the contact between *separated* and
//! *touching*; the transitions drive [`ContactListener`] callbacks.

use tracing::trace;

use crate::body::BodyHandle;
use crate::collision::{collide, intersects, Manifold};
use crate::fixture::{Fixture, FixtureHandle};
use crate::listener::ContactListener;
use crate::pool::Handle;

/// Generation-checked handle to a [`Contact`].
pub type ContactHandle = Handle<Contact>;

/// Geometric mean, so a frictionless surface stays frictionless.
pub fn mix_friction(a: f32, b: f32) -> f32 {
    (a * b).sqrt()
}

/// The bouncier surface wins.
pub fn mix_restitution(a: f32, b: f32) -> f32 {
    a.max(b)
}

/// A persistent pair of fixtures on different bodies.
///
/// The manifold normal points from fixture A toward fixture B. Sensor
/// contacts never carry manifold points.
#[derive(Debug, Clone)]
pub struct Contact {
    pub(crate) fixture_a: FixtureHandle,
    pub(crate) fixture_b: FixtureHandle,
    pub(crate) body_a: BodyHandle,
    pub(crate) body_b: BodyHandle,
    manifold: Manifold,
    touching: bool,
    enabled: bool,
    sensor: bool,
    pub(crate) filter_dirty: bool,
    friction: f32,
    restitution: f32,
    tangent_speed: f32,
}

impl Contact {
    pub(crate) fn new(
        fixture_a: FixtureHandle,
        a: &Fixture,
        fixture_b: FixtureHandle,
        b: &Fixture,
    ) -> Self {
        Self {
            fixture_a,
            fixture_b,
            body_a: a.body(),
            body_b: b.body(),
            manifold: Manifold::default(),
            touching: false,
            enabled: true,
            sensor: a.is_sensor() || b.is_sensor(),
            filter_dirty: false,
            friction: mix_friction(a.friction(), b.friction()),
            restitution: mix_restitution(a.restitution(), b.restitution()),
            tangent_speed: 0.0,
        }
    }

    /// First fixture; the polygon when the pair mixes a polygon and a circle.
    pub const fn fixture_a(&self) -> FixtureHandle {
        self.fixture_a
    }

    /// Second fixture.
    pub const fn fixture_b(&self) -> FixtureHandle {
        self.fixture_b
    }

    /// Body owning fixture A.
    pub const fn body_a(&self) -> BodyHandle {
        self.body_a
    }

    /// Body owning fixture B.
    pub const fn body_b(&self) -> BodyHandle {
        self.body_b
    }

    /// The fixture paired with `fixture`, if `fixture` belongs to this contact.
    pub fn other_fixture(&self, fixture: FixtureHandle) -> Option<FixtureHandle> {
        if fixture == self.fixture_a {
            Some(self.fixture_b)
        } else if fixture == self.fixture_b {
            Some(self.fixture_a)
        } else {
            None
        }
    }

    /// Current manifold. Points are in world space since the narrow phase
    /// runs on world shapes.
    pub const fn manifold(&self) -> &Manifold {
        &self.manifold
    }

    /// Returns `true` while the shapes overlap.
    pub const fn is_touching(&self) -> bool {
        self.touching
    }

    /// Returns `true` unless disabled during `pre_solve` this step.
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disables the contact for the current step. Re-enabled on every update.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Returns `true` if either fixture is a sensor.
    pub const fn is_sensor(&self) -> bool {
        self.sensor
    }

    /// Mixed friction.
    pub const fn friction(&self) -> f32 {
        self.friction
    }

    /// Overrides the mixed friction for the current step.
    pub fn set_friction(&mut self, friction: f32) {
        self.friction = friction;
    }

    /// Mixed restitution.
    pub const fn restitution(&self) -> f32 {
        self.restitution
    }

    /// Overrides the mixed restitution for the current step.
    pub fn set_restitution(&mut self, restitution: f32) {
        self.restitution = restitution;
    }

    /// Surface speed along the tangent, for conveyor belts.
    pub const fn tangent_speed(&self) -> f32 {
        self.tangent_speed
    }

    /// Sets the surface speed along the tangent for the current step.
    pub fn set_tangent_speed(&mut self, speed: f32) {
        self.tangent_speed = speed;
    }

    /// Re-runs the narrow phase against the fixtures' world shapes and fires
    /// the transition callbacks. Overrides made in the previous `pre_solve`
    /// are dropped first.
    ///
    /// Returns `true` when the touching state changed.
    pub(crate) fn update<L>(&mut self, a: &Fixture, b: &Fixture, listener: &mut L) -> bool
    where
        L: ContactListener + ?Sized,
    {
        let old_manifold = self.manifold;
        let was_touching = self.touching;
        self.enabled = true;
        self.friction = mix_friction(a.friction(), b.friction());
        self.restitution = mix_restitution(a.restitution(), b.restitution());
        self.tangent_speed = 0.0;
        self.sensor = a.is_sensor() || b.is_sensor();

        let touching = if self.sensor {
            self.manifold = Manifold::default();
            intersects(a.world_shape(), b.world_shape())
        } else {
            let manifold = collide(a.world_shape(), b.world_shape());
            self.manifold = manifold.unwrap_or_default();
            self.manifold.count > 0
        };
        self.touching = touching;

        match (was_touching, touching) {
            (false, true) => {
                trace!(fixture_a = ?self.fixture_a, fixture_b = ?self.fixture_b, "begin contact");
                listener.begin_contact(self);
            }
            (true, false) => {
                trace!(fixture_a = ?self.fixture_a, fixture_b = ?self.fixture_b, "end contact");
                listener.end_contact(self);
            }
            _ => {}
        }

        if touching && !self.sensor {
            listener.pre_solve(self, &old_manifold);
        }
        touching != was_touching
    }
}
