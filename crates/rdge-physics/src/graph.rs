// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! The collision graph: owner of bodies, fixtures, contacts and the broad
//! phase, and driver of the per-step pipeline.

use core::fmt;

use rustc_hash::FxHashMap;
use tracing::{debug, instrument};

use crate::body::{BodyHandle, BodyProfile, BodyType, ContactEdge, RigidBody};
use crate::broad::{DynamicTree, ProxyId};
use crate::config::GraphConfig;
use crate::contact::{Contact, ContactHandle};
use crate::error::PhysicsError;
use crate::filter::{CollisionFilter, ContactFilter, DefaultContactFilter};
use crate::fixture::{Fixture, FixtureHandle, FixtureProfile};
use crate::listener::{ContactListener, DefaultListener};
use crate::math::Vec2;
use crate::pool::Pool;
use crate::shapes::ShapeType;
use crate::solver::{self, StepContext};
use crate::types::aabb::Aabb;

/// Summary of one [`CollisionGraph::step`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct StepStats {
    /// Live contacts after the step.
    pub contacts: usize,
    /// Contacts whose shapes overlap.
    pub touching: usize,
    /// Islands solved.
    pub islands: usize,
    /// Non-static bodies still awake after the step.
    pub awake_bodies: usize,
}

/// Canonical key for a fixture pair.
fn pair_key(a: FixtureHandle, b: FixtureHandle) -> (FixtureHandle, FixtureHandle) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Owns every body, fixture and contact, plus the broad-phase tree.
///
/// Each [`step`](CollisionGraph::step) runs four phases in order, each seeing
/// the complete result of the previous one:
///
/// 1. synchronize moved bodies' fixtures and proxies;
/// 2. find new broad-phase pairs and create contacts;
/// 3. update every contact (narrow phase, begin/end/pre-solve callbacks);
/// 4. solve islands, integrate, fire post-solve, and put resting islands to
///    sleep.
///
/// Manifolds are therefore always computed against pre-integration poses.
///
/// All mutation happens through `&mut self`, so the listener (which the graph
/// owns) cannot reach back into the graph while a step is running.
pub struct CollisionGraph<L: ContactListener = DefaultListener> {
    config: GraphConfig,
    bodies: Pool<RigidBody>,
    fixtures: Pool<Fixture>,
    contacts: Pool<Contact>,
    tree: DynamicTree<FixtureHandle>,
    pairs: FxHashMap<(FixtureHandle, FixtureHandle), ContactHandle>,
    move_buffer: Vec<ProxyId<FixtureHandle>>,
    filter: Box<dyn ContactFilter>,
    listener: L,
}

impl<L: ContactListener + fmt::Debug> fmt::Debug for CollisionGraph<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollisionGraph")
            .field("config", &self.config)
            .field("bodies", &self.bodies.len())
            .field("fixtures", &self.fixtures.len())
            .field("contacts", &self.contacts.len())
            .field("tree_height", &self.tree.height())
            .field("listener", &self.listener)
            .finish_non_exhaustive()
    }
}

impl Default for CollisionGraph<DefaultListener> {
    fn default() -> Self {
        Self::new(GraphConfig::default())
    }
}

impl CollisionGraph<DefaultListener> {
    /// Creates an empty graph that ignores contact events.
    pub fn new(config: GraphConfig) -> Self {
        Self::with_listener(config, DefaultListener)
    }
}

impl<L: ContactListener> CollisionGraph<L> {
    /// Creates an empty graph reporting events to `listener`.
    pub fn with_listener(config: GraphConfig, listener: L) -> Self {
        Self {
            config,
            bodies: Pool::new(),
            fixtures: Pool::new(),
            contacts: Pool::new(),
            tree: DynamicTree::new(),
            pairs: FxHashMap::default(),
            move_buffer: Vec::new(),
            filter: Box::new(DefaultContactFilter),
            listener,
        }
    }

    /// Current settings.
    pub const fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Mutable settings; changes apply from the next step.
    pub fn config_mut(&mut self) -> &mut GraphConfig {
        &mut self.config
    }

    /// Gravity applied to awake dynamic bodies.
    pub const fn gravity(&self) -> Vec2 {
        self.config.gravity
    }

    /// Sets the gravity vector.
    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.config.gravity = gravity;
    }

    /// The event listener.
    pub const fn listener(&self) -> &L {
        &self.listener
    }

    /// Mutable access to the event listener.
    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    /// Replaces the listener, returning the old one.
    pub fn set_listener(&mut self, listener: L) -> L {
        core::mem::replace(&mut self.listener, listener)
    }

    /// Replaces the pair filter consulted when contacts are created.
    pub fn set_contact_filter(&mut self, filter: impl ContactFilter + 'static) {
        self.filter = Box::new(filter);
    }

    /// Broad-phase tree, for diagnostics.
    pub const fn tree(&self) -> &DynamicTree<FixtureHandle> {
        &self.tree
    }

    /// Number of live bodies.
    pub const fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of live fixtures.
    pub const fn fixture_count(&self) -> usize {
        self.fixtures.len()
    }

    /// Number of live contacts.
    pub const fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    /// Looks up a body.
    pub fn body(&self, body: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(body)
    }

    /// Mutable body access for velocities, forces and sleep state.
    pub fn body_mut(&mut self, body: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(body)
    }

    /// Iterates over bodies in slot order.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody)> + '_ {
        self.bodies.iter()
    }

    /// Looks up a fixture.
    pub fn fixture(&self, fixture: FixtureHandle) -> Option<&Fixture> {
        self.fixtures.get(fixture)
    }

    /// Mutable fixture access for material and user data.
    pub fn fixture_mut(&mut self, fixture: FixtureHandle) -> Option<&mut Fixture> {
        self.fixtures.get_mut(fixture)
    }

    /// Looks up a contact.
    pub fn contact(&self, contact: ContactHandle) -> Option<&Contact> {
        self.contacts.get(contact)
    }

    /// Iterates over contacts in slot order.
    pub fn contacts(&self) -> impl Iterator<Item = (ContactHandle, &Contact)> + '_ {
        self.contacts.iter()
    }

    /// Contact between two fixtures, if one exists.
    pub fn contact_between(&self, a: FixtureHandle, b: FixtureHandle) -> Option<ContactHandle> {
        self.pairs.get(&pair_key(a, b)).copied()
    }

    /// Creates a body with no fixtures.
    pub fn create_body(&mut self, profile: &BodyProfile) -> BodyHandle {
        let handle = self.bodies.allocate(RigidBody::new(profile));
        debug!(body = ?handle, body_type = ?profile.body_type, "body created");
        handle
    }

    /// Destroys a body with its fixtures and contacts.
    ///
    /// Touching contacts report `end_contact`; each fixture reports
    /// `fixture_destroyed`.
    pub fn destroy_body(&mut self, body: BodyHandle) -> Result<(), PhysicsError> {
        let Some(record) = self.bodies.get(body) else {
            return Err(PhysicsError::UnknownBody(body));
        };
        let doomed: Vec<ContactHandle> = record.contacts.iter().map(|edge| edge.contact).collect();
        for contact in doomed {
            self.destroy_contact(contact);
        }

        let fixtures = core::mem::take(&mut self.bodies[body].fixtures);
        for fixture in fixtures {
            self.listener.fixture_destroyed(fixture);
            self.free_fixture(fixture);
        }
        self.bodies.free(body);
        debug!(?body, "body destroyed");
        Ok(())
    }

    /// Attaches a fixture to `body`, inserts its proxy and refreshes the
    /// body's mass.
    pub fn create_fixture(
        &mut self,
        body: BodyHandle,
        profile: &FixtureProfile,
    ) -> Result<FixtureHandle, PhysicsError> {
        let Some(record) = self.bodies.get(body) else {
            return Err(PhysicsError::UnknownBody(body));
        };
        let simulate = record.simulate;
        let fixture = Fixture::new(body, profile, &record.xf);
        let aabb = fixture.aabb();
        let handle = self.fixtures.allocate(fixture);
        if simulate {
            self.create_proxy(handle, aabb);
        }

        let record = &mut self.bodies[body];
        record.fixtures.push(handle);
        if profile.density > 0.0 {
            record.reset_mass_data(&self.fixtures);
        }
        debug!(fixture = ?handle, ?body, shape = ?profile.shape.shape_type(), "fixture created");
        Ok(handle)
    }

    /// Detaches and destroys a fixture, destroying its contacts first.
    ///
    /// No `fixture_destroyed` callback fires for explicit destruction.
    pub fn destroy_fixture(&mut self, fixture: FixtureHandle) -> Result<(), PhysicsError> {
        let Some(record) = self.fixtures.get(fixture) else {
            return Err(PhysicsError::UnknownFixture(fixture));
        };
        let body = record.body;
        let doomed: Vec<ContactHandle> = self.bodies[body]
            .contacts
            .iter()
            .map(|edge| edge.contact)
            .filter(|&contact| {
                self.contacts.get(contact).is_some_and(|c| c.other_fixture(fixture).is_some())
            })
            .collect();
        for contact in doomed {
            self.destroy_contact(contact);
        }

        self.free_fixture(fixture);
        let record = &mut self.bodies[body];
        record.fixtures.retain(|&f| f != fixture);
        record.reset_mass_data(&self.fixtures);
        debug!(?fixture, ?body, "fixture destroyed");
        Ok(())
    }

    /// Teleports a body. Contacts are re-evaluated on the next step.
    pub fn set_transform(
        &mut self,
        body: BodyHandle,
        position: Vec2,
        angle: f32,
    ) -> Result<(), PhysicsError> {
        let record = self.bodies.get_mut(body).ok_or(PhysicsError::UnknownBody(body))?;
        record.set_transform(position, angle);
        Ok(())
    }

    /// Switches a fixture between sensor and solid; wakes the body when the
    /// flag changes.
    pub fn set_sensor(&mut self, fixture: FixtureHandle, is_sensor: bool) -> Result<(), PhysicsError> {
        let record = self.fixtures.get_mut(fixture).ok_or(PhysicsError::UnknownFixture(fixture))?;
        if record.set_sensor(is_sensor) {
            let body = record.body;
            self.bodies[body].wake_up();
        }
        Ok(())
    }

    /// Replaces a fixture's filter. Existing contacts are re-filtered and the
    /// proxy is searched for new pairs on the next step.
    pub fn set_filter(
        &mut self,
        fixture: FixtureHandle,
        filter: CollisionFilter,
    ) -> Result<(), PhysicsError> {
        let record = self.fixtures.get_mut(fixture).ok_or(PhysicsError::UnknownFixture(fixture))?;
        record.set_filter(filter);
        let (body, proxy) = (record.body, record.proxy);

        for edge in &self.bodies[body].contacts {
            if let Some(contact) = self.contacts.get_mut(edge.contact) {
                if contact.other_fixture(fixture).is_some() {
                    contact.filter_dirty = true;
                }
            }
        }
        if let Some(proxy) = proxy {
            self.move_buffer.push(proxy);
        }
        Ok(())
    }

    /// Takes a body out of the simulation (destroying its proxies and
    /// contacts) or puts it back.
    pub fn set_simulating(&mut self, body: BodyHandle, simulate: bool) -> Result<(), PhysicsError> {
        let record = self.bodies.get_mut(body).ok_or(PhysicsError::UnknownBody(body))?;
        if record.simulate == simulate {
            return Ok(());
        }
        record.simulate = simulate;
        let fixtures = record.fixtures.clone();

        if simulate {
            let xf = self.bodies[body].xf;
            for fixture in fixtures {
                let aabb = self.fixtures[fixture].synchronize(&xf);
                self.create_proxy(fixture, aabb);
            }
            let record = &mut self.bodies[body];
            record.synced_position = xf.position();
            record.needs_sync = false;
        } else {
            for fixture in fixtures {
                if let Some(proxy) = self.fixtures[fixture].proxy.take() {
                    self.destroy_proxy(proxy);
                }
            }
            let doomed: Vec<ContactHandle> =
                self.bodies[body].contacts.iter().map(|edge| edge.contact).collect();
            for contact in doomed {
                self.destroy_contact(contact);
            }
        }
        debug!(?body, simulate, "body simulation toggled");
        Ok(())
    }

    /// Fixtures whose bounds overlap `aabb`.
    pub fn query_aabb(&self, aabb: &Aabb) -> Vec<FixtureHandle> {
        let mut out = Vec::new();
        self.tree.query(aabb, |proxy| {
            if let Some(fixture) = self.tree.payload(proxy) {
                if self.fixtures.get(fixture).is_some_and(|f| f.aabb().overlaps(aabb)) {
                    out.push(fixture);
                }
            }
            true
        });
        out.sort_unstable();
        out
    }

    /// Fixtures whose shapes contain the world point `point`.
    pub fn query_point(&self, point: Vec2) -> Vec<FixtureHandle> {
        let probe = Aabb::from_center_half_extents(point, crate::LINEAR_SLOP, crate::LINEAR_SLOP);
        let mut out = Vec::new();
        self.tree.query(&probe, |proxy| {
            if let Some(fixture) = self.tree.payload(proxy) {
                if self.fixtures.get(fixture).is_some_and(|f| f.test_point(point)) {
                    out.push(fixture);
                }
            }
            true
        });
        out.sort_unstable();
        out
    }

    /// Advances the simulation by `dt` seconds.
    #[instrument(skip(self))]
    pub fn step(&mut self, dt: f32) -> Result<StepStats, PhysicsError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(PhysicsError::InvalidTimestep(dt));
        }

        self.synchronize_fixtures();
        self.find_new_contacts();
        self.update_contacts();

        let ctx = StepContext {
            dt,
            gravity: self.config.gravity,
            velocity_iterations: self.config.velocity_iterations,
            position_iterations: self.config.position_iterations,
            allow_sleep: self.config.allow_sleep,
        };
        let report = solver::solve(&mut self.bodies, &self.contacts, &ctx, &mut self.listener);

        if self.config.auto_clear_forces {
            self.clear_forces();
        }

        let stats = StepStats {
            contacts: self.contacts.len(),
            touching: self.contacts.iter().filter(|(_, c)| c.is_touching()).count(),
            islands: report.islands,
            awake_bodies: self
                .bodies
                .iter()
                .filter(|(_, b)| b.awake && b.body_type != BodyType::Static)
                .count(),
        };
        debug!(
            contacts = stats.contacts,
            touching = stats.touching,
            islands = stats.islands,
            awake_bodies = stats.awake_bodies,
            "step complete"
        );
        Ok(stats)
    }

    /// Clears accumulated forces and torques on every body.
    pub fn clear_forces(&mut self) {
        for (_, body) in self.bodies.iter_mut() {
            body.force = Vec2::ZERO;
            body.torque = 0.0;
        }
    }

    /// Phase 1: re-pose fixtures of moved bodies and move their proxies.
    fn synchronize_fixtures(&mut self) {
        let Self { bodies, fixtures, tree, move_buffer, .. } = self;
        for (_, body) in bodies.iter_mut() {
            if !body.needs_sync {
                continue;
            }
            body.needs_sync = false;
            if !body.simulate {
                continue;
            }
            let displacement = body.xf.position() - body.synced_position;
            body.synced_position = body.xf.position();
            for &handle in &body.fixtures {
                let Some(fixture) = fixtures.get_mut(handle) else { continue };
                let aabb = fixture.synchronize(&body.xf);
                if let Some(proxy) = fixture.proxy {
                    if tree.move_proxy(proxy, aabb, displacement) {
                        move_buffer.push(proxy);
                    }
                }
            }
        }
    }

    /// Phase 2: turn new broad-phase pairs into contacts.
    fn find_new_contacts(&mut self) {
        if self.move_buffer.is_empty() {
            return;
        }
        let candidates = self.tree.query_pairs(&self.move_buffer);
        self.move_buffer.clear();
        for (a, b) in candidates {
            self.add_pair(a, b);
        }
    }

    fn add_pair(&mut self, a: FixtureHandle, b: FixtureHandle) {
        let key = pair_key(a, b);
        if self.pairs.contains_key(&key) {
            return;
        }
        let (Some(fa), Some(fb)) = (self.fixtures.get(a), self.fixtures.get(b)) else {
            return;
        };
        if fa.body == fb.body || !self.bodies_can_collide(fa.body, fb.body) {
            return;
        }
        if !self.filter.should_collide(fa, fb) {
            return;
        }

        // Mixed pairs put the polygon first.
        let (a, fa, b, fb) = if fa.shape_type() == ShapeType::Circle
            && fb.shape_type() == ShapeType::Polygon
        {
            (b, fb, a, fa)
        } else {
            (a, fa, b, fb)
        };
        let contact = Contact::new(a, fa, b, fb);
        let (body_a, body_b, sensor) = (contact.body_a, contact.body_b, contact.is_sensor());
        let handle = self.contacts.allocate(contact);
        self.pairs.insert(key, handle);

        let edge_a = ContactEdge { contact: handle, other: body_b };
        let edge_b = ContactEdge { contact: handle, other: body_a };
        let record = &mut self.bodies[body_a];
        record.contacts.push(edge_a);
        if !sensor {
            record.wake_up();
        }
        let record = &mut self.bodies[body_b];
        record.contacts.push(edge_b);
        if !sensor {
            record.wake_up();
        }
        debug!(contact = ?handle, fixture_a = ?a, fixture_b = ?b, "contact created");
    }

    /// At least one body must be dynamic.
    fn bodies_can_collide(&self, a: BodyHandle, b: BodyHandle) -> bool {
        match (self.bodies.get(a), self.bodies.get(b)) {
            (Some(a), Some(b)) => {
                a.body_type == BodyType::Dynamic || b.body_type == BodyType::Dynamic
            }
            _ => false,
        }
    }

    /// Phase 3: purge stale contacts and run the narrow phase on the rest.
    fn update_contacts(&mut self) {
        for handle in self.contacts.handles() {
            let Some(contact) = self.contacts.get(handle) else { continue };
            let (a, b) = (contact.fixture_a, contact.fixture_b);
            let (Some(fa), Some(fb)) = (self.fixtures.get(a), self.fixtures.get(b)) else {
                self.destroy_contact(handle);
                continue;
            };

            if contact.filter_dirty {
                if !self.bodies_can_collide(fa.body, fb.body) || !self.filter.should_collide(fa, fb) {
                    self.destroy_contact(handle);
                    continue;
                }
                self.contacts[handle].filter_dirty = false;
            }

            let active = |body: BodyHandle| {
                self.bodies
                    .get(body)
                    .is_some_and(|b| b.awake && b.body_type != BodyType::Static)
            };
            if !active(fa.body) && !active(fb.body) {
                continue;
            }

            let overlapping = match (fa.proxy, fb.proxy) {
                (Some(pa), Some(pb)) => self.tree.overlaps(pa, pb),
                _ => false,
            };
            if !overlapping {
                self.destroy_contact(handle);
                continue;
            }

            let Self { contacts, fixtures, bodies, listener, .. } = &mut *self;
            let contact = &mut contacts[handle];
            let changed = contact.update(&fixtures[a], &fixtures[b], listener);
            if changed && !contact.is_sensor() {
                bodies[contact.body_a].wake_up();
                bodies[contact.body_b].wake_up();
            }
        }
    }

    /// Frees a contact, firing `end_contact` if it was touching.
    fn destroy_contact(&mut self, handle: ContactHandle) {
        let Some(contact) = self.contacts.free(handle) else { return };
        if contact.is_touching() {
            self.listener.end_contact(&contact);
        }
        self.pairs.remove(&pair_key(contact.fixture_a, contact.fixture_b));
        for body in [contact.body_a, contact.body_b] {
            if let Some(record) = self.bodies.get_mut(body) {
                record.remove_contact_edge(handle);
            }
        }
        debug!(contact = ?handle, "contact destroyed");
    }

    fn create_proxy(&mut self, fixture: FixtureHandle, aabb: Aabb) {
        let proxy = self.tree.create_proxy(aabb, fixture);
        self.fixtures[fixture].proxy = Some(proxy);
        self.move_buffer.push(proxy);
    }

    fn destroy_proxy(&mut self, proxy: ProxyId<FixtureHandle>) {
        self.tree.destroy_proxy(proxy);
        self.move_buffer.retain(|&p| p != proxy);
    }

    /// Frees a fixture and its proxy. Contacts must already be gone.
    fn free_fixture(&mut self, fixture: FixtureHandle) {
        if let Some(record) = self.fixtures.free(fixture) {
            if let Some(proxy) = record.proxy {
                self.destroy_proxy(proxy);
            }
        }
    }
}
