// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Rigid bodies.

use crate::contact::ContactHandle;
use crate::fixture::{Fixture, FixtureHandle};
use crate::math::{Rotation, Vec2};
use crate::pool::{Handle, Pool};
use crate::shapes::MassData;
use crate::types::transform::Transform;

/// Generation-checked handle to a [`RigidBody`].
pub type BodyHandle = Handle<RigidBody>;

/// How a body participates in the simulation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BodyType {
    /// Never moves; infinite mass.
    #[default]
    Static,
    /// Moves by its velocity only; infinite mass.
    Kinematic,
    /// Fully simulated.
    Dynamic,
}

/// Creation parameters for a body.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BodyProfile {
    /// Body kind.
    pub body_type: BodyType,
    /// World position of the body origin.
    pub position: Vec2,
    /// World rotation in radians.
    pub angle: f32,
    /// Linear velocity of the centroid.
    pub linear_velocity: Vec2,
    /// Angular velocity in radians per second.
    pub angular_velocity: f32,
    /// Linear velocity damping.
    pub linear_damping: f32,
    /// Angular velocity damping.
    pub angular_damping: f32,
    /// Multiplier on the graph gravity.
    pub gravity_scale: f32,
    /// Whether the body takes part in collision and integration.
    pub simulate: bool,
    /// Initial awake state.
    pub awake: bool,
    /// Locks rotation.
    pub fixed_rotation: bool,
    /// Keeps the body (and its island) from sleeping.
    pub prevent_sleep: bool,
    /// Opaque caller payload.
    pub user_data: u64,
}

impl Default for BodyProfile {
    fn default() -> Self {
        Self {
            body_type: BodyType::Static,
            position: Vec2::ZERO,
            angle: 0.0,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            gravity_scale: 1.0,
            simulate: true,
            awake: true,
            fixed_rotation: false,
            prevent_sleep: false,
            user_data: 0,
        }
    }
}

impl BodyProfile {
    /// Dynamic body at `position`.
    pub fn dynamic(position: Vec2) -> Self {
        Self { body_type: BodyType::Dynamic, position, ..Self::default() }
    }

    /// Kinematic body at `position`.
    pub fn kinematic(position: Vec2) -> Self {
        Self { body_type: BodyType::Kinematic, position, ..Self::default() }
    }

    /// Static body at `position`.
    pub fn fixed(position: Vec2) -> Self {
        Self { position, ..Self::default() }
    }

    /// Sets the initial linear velocity.
    pub fn with_linear_velocity(mut self, velocity: Vec2) -> Self {
        self.linear_velocity = velocity;
        self
    }

    /// Sets the initial angle.
    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }
}

/// Adjacency record linking a body to one of its contacts.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ContactEdge {
    /// The contact.
    pub contact: ContactHandle,
    /// The body on the other side of the contact.
    pub other: BodyHandle,
}

/// A rigid body: an aggregate of fixtures with a pose, velocity and mass.
///
/// The pose is stored twice: as the world centroid plus angle (what the solver
/// integrates) and as the transform of the body origin (what fixtures are
/// posed with). [`RigidBody::synchronize_transform`] derives the latter.
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub(crate) body_type: BodyType,
    pub(crate) xf: Transform,
    pub(crate) center: Vec2,
    pub(crate) angle: f32,
    pub(crate) local_center: Vec2,
    pub(crate) linear_velocity: Vec2,
    pub(crate) angular_velocity: f32,
    pub(crate) force: Vec2,
    pub(crate) torque: f32,
    pub(crate) mass: f32,
    pub(crate) inv_mass: f32,
    pub(crate) inertia: f32,
    pub(crate) inv_inertia: f32,
    pub(crate) linear_damping: f32,
    pub(crate) angular_damping: f32,
    pub(crate) gravity_scale: f32,
    pub(crate) sleep_time: f32,
    pub(crate) awake: bool,
    pub(crate) simulate: bool,
    pub(crate) fixed_rotation: bool,
    pub(crate) prevent_sleep: bool,
    pub(crate) user_data: u64,
    pub(crate) fixtures: Vec<FixtureHandle>,
    pub(crate) contacts: Vec<ContactEdge>,
    /// Set when the pose changed since fixtures were last synchronized.
    pub(crate) needs_sync: bool,
    /// Origin position at the last fixture synchronization.
    pub(crate) synced_position: Vec2,
}

impl RigidBody {
    pub(crate) fn new(profile: &BodyProfile) -> Self {
        let xf = Transform::new(profile.position, profile.angle);
        let is_static = profile.body_type == BodyType::Static;
        let (mass, inv_mass) = if profile.body_type == BodyType::Dynamic { (1.0, 1.0) } else { (0.0, 0.0) };
        Self {
            body_type: profile.body_type,
            xf,
            center: profile.position,
            angle: profile.angle,
            local_center: Vec2::ZERO,
            linear_velocity: if is_static { Vec2::ZERO } else { profile.linear_velocity },
            angular_velocity: if is_static { 0.0 } else { profile.angular_velocity },
            force: Vec2::ZERO,
            torque: 0.0,
            mass,
            inv_mass,
            inertia: 0.0,
            inv_inertia: 0.0,
            linear_damping: profile.linear_damping,
            angular_damping: profile.angular_damping,
            gravity_scale: profile.gravity_scale,
            sleep_time: 0.0,
            awake: profile.awake && !is_static,
            simulate: profile.simulate,
            fixed_rotation: profile.fixed_rotation,
            prevent_sleep: profile.prevent_sleep,
            user_data: profile.user_data,
            fixtures: Vec::new(),
            contacts: Vec::new(),
            needs_sync: true,
            synced_position: profile.position,
        }
    }

    /// Body kind.
    pub const fn body_type(&self) -> BodyType {
        self.body_type
    }

    /// Transform of the body origin.
    pub const fn transform(&self) -> &Transform {
        &self.xf
    }

    /// World position of the body origin.
    pub const fn position(&self) -> Vec2 {
        self.xf.position()
    }

    /// World rotation in radians.
    pub const fn angle(&self) -> f32 {
        self.angle
    }

    /// World-space centroid.
    pub const fn world_center(&self) -> Vec2 {
        self.center
    }

    /// Centroid in body-local coordinates.
    pub const fn local_center(&self) -> Vec2 {
        self.local_center
    }

    /// Linear velocity of the centroid.
    pub const fn linear_velocity(&self) -> Vec2 {
        self.linear_velocity
    }

    /// Sets the linear velocity. Ignored for static bodies; wakes the body
    /// when the velocity is non-zero.
    pub fn set_linear_velocity(&mut self, velocity: Vec2) {
        if self.body_type == BodyType::Static {
            return;
        }
        if velocity.dot(velocity) > 0.0 {
            self.wake_up();
        }
        self.linear_velocity = velocity;
    }

    /// Angular velocity in radians per second.
    pub const fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    /// Sets the angular velocity. Ignored for static bodies.
    pub fn set_angular_velocity(&mut self, omega: f32) {
        if self.body_type == BodyType::Static {
            return;
        }
        if omega * omega > 0.0 {
            self.wake_up();
        }
        self.angular_velocity = omega;
    }

    /// Total mass; zero for static and kinematic bodies.
    pub const fn mass(&self) -> f32 {
        self.mass
    }

    /// Rotational inertia about the centroid.
    pub const fn inertia(&self) -> f32 {
        self.inertia
    }

    /// Inverse mass; zero for static and kinematic bodies.
    pub const fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    /// Accumulated force for the next step.
    pub const fn force(&self) -> Vec2 {
        self.force
    }

    /// Accumulated torque for the next step.
    pub const fn torque(&self) -> f32 {
        self.torque
    }

    /// Gravity multiplier.
    pub const fn gravity_scale(&self) -> f32 {
        self.gravity_scale
    }

    /// Sets the gravity multiplier.
    pub fn set_gravity_scale(&mut self, scale: f32) {
        self.gravity_scale = scale;
    }

    /// Linear damping.
    pub const fn linear_damping(&self) -> f32 {
        self.linear_damping
    }

    /// Sets the linear damping.
    pub fn set_linear_damping(&mut self, damping: f32) {
        self.linear_damping = damping;
    }

    /// Angular damping.
    pub const fn angular_damping(&self) -> f32 {
        self.angular_damping
    }

    /// Sets the angular damping.
    pub fn set_angular_damping(&mut self, damping: f32) {
        self.angular_damping = damping;
    }

    /// Returns `true` while the body is awake.
    pub const fn is_awake(&self) -> bool {
        self.awake
    }

    /// Returns `true` while the body takes part in the simulation.
    pub const fn is_simulating(&self) -> bool {
        self.simulate
    }

    /// Returns `true` if rotation is locked.
    pub const fn is_fixed_rotation(&self) -> bool {
        self.fixed_rotation
    }

    /// Returns `true` if the body is kept from sleeping.
    pub const fn is_sleep_prevented(&self) -> bool {
        self.prevent_sleep
    }

    /// Keeps the body awake, or lets it sleep again.
    pub fn set_prevent_sleep(&mut self, prevent: bool) {
        self.prevent_sleep = prevent;
        if prevent {
            self.wake_up();
        }
    }

    /// Opaque caller payload.
    pub const fn user_data(&self) -> u64 {
        self.user_data
    }

    /// Sets the opaque caller payload.
    pub fn set_user_data(&mut self, user_data: u64) {
        self.user_data = user_data;
    }

    /// Attached fixtures in creation order.
    pub fn fixtures(&self) -> &[FixtureHandle] {
        &self.fixtures
    }

    /// Contacts involving this body.
    pub fn contacts(&self) -> &[ContactEdge] {
        &self.contacts
    }

    /// Wakes the body and resets its sleep timer. Static bodies never wake.
    pub fn wake_up(&mut self) {
        if self.body_type == BodyType::Static {
            return;
        }
        if !self.awake {
            self.awake = true;
            self.sleep_time = 0.0;
        }
    }

    /// Puts the body to sleep, clearing velocities and accumulated forces.
    pub fn sleep(&mut self) {
        self.awake = false;
        self.sleep_time = 0.0;
        self.linear_velocity = Vec2::ZERO;
        self.angular_velocity = 0.0;
        self.force = Vec2::ZERO;
        self.torque = 0.0;
    }

    /// Applies a world-space force at a world point.
    pub fn apply_force(&mut self, force: Vec2, point: Vec2, wake: bool) {
        if !self.accepts_loads(wake) {
            return;
        }
        self.force += force;
        self.torque += (point - self.center).cross(force);
    }

    /// Applies a world-space force at the centroid.
    pub fn apply_force_to_center(&mut self, force: Vec2, wake: bool) {
        if self.accepts_loads(wake) {
            self.force += force;
        }
    }

    /// Applies a torque.
    pub fn apply_torque(&mut self, torque: f32, wake: bool) {
        if self.accepts_loads(wake) {
            self.torque += torque;
        }
    }

    /// Applies a world-space impulse at a world point, changing velocity
    /// immediately.
    pub fn apply_linear_impulse(&mut self, impulse: Vec2, point: Vec2, wake: bool) {
        if !self.accepts_loads(wake) {
            return;
        }
        self.linear_velocity += impulse * self.inv_mass;
        self.angular_velocity += self.inv_inertia * (point - self.center).cross(impulse);
    }

    /// Applies a world-space impulse at the centroid.
    pub fn apply_linear_impulse_to_center(&mut self, impulse: Vec2, wake: bool) {
        if self.accepts_loads(wake) {
            self.linear_velocity += impulse * self.inv_mass;
        }
    }

    /// Applies an angular impulse.
    pub fn apply_angular_impulse(&mut self, impulse: f32, wake: bool) {
        if self.accepts_loads(wake) {
            self.angular_velocity += self.inv_inertia * impulse;
        }
    }

    /// Maps a body-local point to world space.
    pub fn world_point(&self, local: Vec2) -> Vec2 {
        self.xf.apply(local)
    }

    /// Rotates a body-local vector into world space.
    pub fn world_vector(&self, local: Vec2) -> Vec2 {
        self.xf.apply_vector(local)
    }

    /// Maps a world point to body-local space.
    pub fn local_point(&self, world: Vec2) -> Vec2 {
        self.xf.apply_inverse(world)
    }

    /// Rotates a world vector into body-local space.
    pub fn local_vector(&self, world: Vec2) -> Vec2 {
        self.xf.apply_inverse_vector(world)
    }

    /// Velocity of the material point currently at `world`.
    pub fn linear_velocity_from_world_point(&self, world: Vec2) -> Vec2 {
        self.linear_velocity + Vec2::scalar_cross(self.angular_velocity, world - self.center)
    }

    /// Velocity of the material point at body-local `local`.
    pub fn linear_velocity_from_local_point(&self, local: Vec2) -> Vec2 {
        self.linear_velocity_from_world_point(self.world_point(local))
    }

    /// Only dynamic bodies take forces and impulses. Sleeping bodies ignore
    /// them unless `wake` is set.
    fn accepts_loads(&mut self, wake: bool) -> bool {
        if self.body_type != BodyType::Dynamic {
            return false;
        }
        if wake && !self.awake {
            self.wake_up();
        }
        self.awake
    }

    /// Derives the origin transform from the centroid and angle.
    pub(crate) fn synchronize_transform(&mut self) {
        let rotation = Rotation::from_angle(self.angle);
        let position = self.center - rotation.rotate(self.local_center);
        self.xf = Transform::from_parts(position, rotation);
    }

    /// Teleports the origin. The next synchronization sees no displacement,
    /// so fat boxes are not stretched along the jump.
    pub(crate) fn set_transform(&mut self, position: Vec2, angle: f32) {
        self.xf = Transform::new(position, angle);
        self.angle = angle;
        self.center = self.xf.apply(self.local_center);
        self.needs_sync = true;
        self.synced_position = position;
    }

    /// Recomputes mass, centroid and inertia from the attached fixtures.
    pub(crate) fn reset_mass_data(&mut self, fixtures: &Pool<Fixture>) {
        self.mass = 0.0;
        self.inv_mass = 0.0;
        self.inertia = 0.0;
        self.inv_inertia = 0.0;
        self.local_center = Vec2::ZERO;

        if self.body_type != BodyType::Dynamic {
            self.center = self.xf.position();
            return;
        }

        let parts: Vec<MassData> = self
            .fixtures
            .iter()
            .filter_map(|&h| fixtures.get(h))
            .filter(|fixture| fixture.density() > 0.0)
            .map(|fixture| fixture.shape().compute_mass(fixture.density()))
            .collect();

        let mut local_center = Vec2::ZERO;
        for md in &parts {
            self.mass += md.mass;
            local_center += md.center * md.mass;
        }

        if self.mass > 0.0 {
            self.inv_mass = 1.0 / self.mass;
            local_center *= self.inv_mass;
        } else {
            // Dynamic bodies always have positive mass.
            self.mass = 1.0;
            self.inv_mass = 1.0;
        }

        // Each part's own centroidal inertia, shifted to the body centroid.
        let inertia: f32 = parts
            .iter()
            .map(|md| md.centroid_inertia + md.mass * (md.center - local_center).length_squared())
            .sum();
        if inertia > 0.0 && !self.fixed_rotation {
            self.inertia = inertia;
            self.inv_inertia = 1.0 / inertia;
        }

        // Keep the velocity of the material points when the centroid shifts.
        let old_center = self.center;
        self.local_center = local_center;
        self.center = self.xf.apply(local_center);
        self.linear_velocity += Vec2::scalar_cross(self.angular_velocity, self.center - old_center);
    }

    pub(crate) fn remove_contact_edge(&mut self, contact: ContactHandle) {
        self.contacts.retain(|edge| edge.contact != contact);
    }
}
