// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(dead_code, clippy::expect_used)]

use rdge_physics::{
    BodyHandle, BodyProfile, Circle, CollisionGraph, Contact, ContactImpulse, ContactListener,
    FixtureHandle, FixtureProfile, GraphConfig, Manifold, Polygon, Vec2,
};

pub fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

pub fn approx_vec(a: Vec2, b: Vec2, eps: f32) -> bool {
    approx_eq(a.x(), b.x(), eps) && approx_eq(a.y(), b.y(), eps)
}

pub fn v(x: f32, y: f32) -> Vec2 {
    Vec2::new(x, y)
}

/// One recorded listener callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Begin(FixtureHandle, FixtureHandle),
    End(FixtureHandle, FixtureHandle),
    PreSolve(FixtureHandle, FixtureHandle),
    PostSolve(FixtureHandle, FixtureHandle, ContactImpulse),
    FixtureDestroyed(FixtureHandle),
}

/// Listener that keeps every callback in order.
#[derive(Debug, Default)]
pub struct Recorder {
    pub events: Vec<Event>,
}

impl Recorder {
    pub fn begins(&self) -> usize {
        self.events.iter().filter(|e| matches!(e, Event::Begin(..))).count()
    }

    pub fn ends(&self) -> usize {
        self.events.iter().filter(|e| matches!(e, Event::End(..))).count()
    }

    pub fn pre_solves(&self) -> usize {
        self.events.iter().filter(|e| matches!(e, Event::PreSolve(..))).count()
    }

    pub fn post_solves(&self) -> usize {
        self.events.iter().filter(|e| matches!(e, Event::PostSolve(..))).count()
    }

    pub fn position_of(&self, wanted: fn(&Event) -> bool) -> Option<usize> {
        self.events.iter().position(wanted)
    }
}

impl ContactListener for Recorder {
    fn begin_contact(&mut self, contact: &Contact) {
        self.events.push(Event::Begin(contact.fixture_a(), contact.fixture_b()));
    }

    fn end_contact(&mut self, contact: &Contact) {
        self.events.push(Event::End(contact.fixture_a(), contact.fixture_b()));
    }

    fn pre_solve(&mut self, contact: &mut Contact, _old_manifold: &Manifold) {
        self.events.push(Event::PreSolve(contact.fixture_a(), contact.fixture_b()));
    }

    fn post_solve(&mut self, contact: &Contact, impulse: &ContactImpulse) {
        self.events.push(Event::PostSolve(contact.fixture_a(), contact.fixture_b(), *impulse));
    }

    fn fixture_destroyed(&mut self, fixture: FixtureHandle) {
        self.events.push(Event::FixtureDestroyed(fixture));
    }
}

pub fn recording_graph(gravity: Vec2) -> CollisionGraph<Recorder> {
    CollisionGraph::with_listener(GraphConfig::with_gravity(gravity), Recorder::default())
}

/// Dynamic circle body with one fixture; returns both handles.
pub fn ball<L: ContactListener>(
    graph: &mut CollisionGraph<L>,
    center: Vec2,
    radius: f32,
    velocity: Vec2,
) -> (BodyHandle, FixtureHandle) {
    let body =
        graph.create_body(&BodyProfile::dynamic(center).with_linear_velocity(velocity));
    let shape = Circle::new(Vec2::ZERO, radius).expect("valid radius");
    let fixture = graph
        .create_fixture(body, &FixtureProfile::new(shape).with_density(1.0))
        .expect("live body");
    (body, fixture)
}

/// Static box `2·hx × 2·hy` centred at `center`.
pub fn ground<L: ContactListener>(
    graph: &mut CollisionGraph<L>,
    center: Vec2,
    hx: f32,
    hy: f32,
) -> (BodyHandle, FixtureHandle) {
    let body = graph.create_body(&BodyProfile::fixed(center));
    let shape = Polygon::new_box(hx, hy).expect("valid box");
    let fixture = graph
        .create_fixture(body, &FixtureProfile::new(shape).with_friction(0.6))
        .expect("live body");
    (body, fixture)
}
