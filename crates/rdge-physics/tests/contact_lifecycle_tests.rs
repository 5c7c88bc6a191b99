// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
//! Scripted scenarios exercising begin/end/pre-solve/post-solve ordering.

mod common;

use common::{approx_eq, ball, ground, recording_graph, v, Event};
use rdge_physics::{
    BodyHandle, BodyProfile, Circle, CollisionGraph, Contact, ContactListener, FixtureHandle,
    FixtureProfile, GraphConfig, Manifold, Polygon, StepStats, Vec2, mix_friction,
};

const DT: f32 = 1.0 / 60.0;
const GRAVITY: Vec2 = Vec2::new(0.0, -9.8);

fn run<L: ContactListener>(graph: &mut CollisionGraph<L>, steps: usize) {
    for _ in 0..steps {
        graph.step(DT).expect("valid timestep");
    }
}

fn bouncy_ball<L: ContactListener>(
    graph: &mut CollisionGraph<L>,
    center: Vec2,
    velocity: Vec2,
) -> (BodyHandle, FixtureHandle) {
    let body = graph.create_body(&BodyProfile::dynamic(center).with_linear_velocity(velocity));
    let profile = FixtureProfile::new(Circle::new(Vec2::ZERO, 0.5).unwrap())
        .with_density(1.0)
        .with_friction(0.0)
        .with_restitution(1.0);
    (body, graph.create_fixture(body, &profile).unwrap())
}

#[test]
fn head_on_circles_begin_once_and_end_once() {
    let mut graph = recording_graph(GRAVITY);
    let (left, fa) = bouncy_ball(&mut graph, v(-3.0, 5.0), v(2.0, 0.0));
    let (right, fb) = bouncy_ball(&mut graph, v(3.0, 5.0), v(-2.0, 0.0));

    run(&mut graph, 240);

    let rec = graph.listener();
    assert_eq!(rec.begins(), 1, "{:?}", rec.events);
    assert_eq!(rec.ends(), 1, "{:?}", rec.events);
    assert!(rec.pre_solves() >= 1);
    assert!(rec.post_solves() >= 1);

    let begin = rec.position_of(|e| matches!(e, Event::Begin(..))).unwrap();
    let end = rec.position_of(|e| matches!(e, Event::End(..))).unwrap();
    assert!(begin < end);
    for (i, event) in rec.events.iter().enumerate() {
        if matches!(event, Event::PreSolve(..) | Event::PostSolve(..)) {
            assert!(begin < i && i < end, "solver callback outside the touching window");
        }
    }
    assert_eq!(rec.events[begin], Event::Begin(fa, fb));

    // Equal masses, perfectly elastic: the velocities swap.
    let vl = graph.body(left).unwrap().linear_velocity();
    let vr = graph.body(right).unwrap().linear_velocity();
    assert!(approx_eq(vl.x(), -2.0, 0.1), "left {vl:?}");
    assert!(approx_eq(vr.x(), 2.0, 0.1), "right {vr:?}");
    assert!(graph.contact_between(fa, fb).is_none());
}

#[test]
fn distant_bodies_raise_no_events() {
    let mut graph = recording_graph(GRAVITY);
    ball(&mut graph, v(-50.0, 0.0), 0.5, v(-1.0, 0.0));
    ball(&mut graph, v(50.0, 0.0), 0.5, v(1.0, 0.0));
    run(&mut graph, 100);
    assert!(graph.listener().events.is_empty());
    assert_eq!(graph.contact_count(), 0);
}

#[test]
fn sensor_reports_overlap_without_solving() {
    let mut graph = recording_graph(GRAVITY);
    let gate = graph.create_body(&BodyProfile::fixed(Vec2::ZERO));
    let gate_fixture = graph
        .create_fixture(gate, &FixtureProfile::new(Polygon::new_box(2.0, 0.5).unwrap()).sensor())
        .unwrap();
    let (body, _) = ball(&mut graph, v(0.0, 5.0), 0.5, Vec2::ZERO);

    run(&mut graph, 120);

    let rec = graph.listener();
    assert_eq!(rec.begins(), 1);
    assert_eq!(rec.ends(), 1);
    assert_eq!(rec.pre_solves(), 0);
    assert_eq!(rec.post_solves(), 0);
    assert!(matches!(rec.events[0], Event::Begin(a, _) if a == gate_fixture));
    assert!(graph.body(body).unwrap().position().y() < -5.0);
}

#[test]
fn resting_ball_touches_and_falls_asleep() {
    let mut graph = recording_graph(GRAVITY);
    let (_, floor) = ground(&mut graph, Vec2::ZERO, 5.0, 0.5);
    let (body, fixture) = ball(&mut graph, v(0.0, 2.0), 0.5, Vec2::ZERO);

    let mut last = StepStats::default();
    for _ in 0..600 {
        last = graph.step(DT).unwrap();
    }

    let record = graph.body(body).unwrap();
    assert!(!record.is_awake());
    assert_eq!(last.awake_bodies, 0);
    assert!(approx_eq(record.position().y(), 1.0, 0.05), "{:?}", record.position());

    let rec = graph.listener();
    assert_eq!(rec.begins(), 1);
    assert_eq!(rec.ends(), 0);
    // Polygon fixtures come first in mixed pairs.
    assert_eq!(rec.events[0], Event::Begin(floor, fixture));
    let pushing = rec.events.iter().any(|e| {
        matches!(e, Event::PostSolve(_, _, impulse) if impulse.count == 1 && impulse.normal_impulses[0] > 0.0)
    });
    assert!(pushing);

    let contact = graph.contact_between(floor, fixture).unwrap();
    assert!(graph.contact(contact).unwrap().is_touching());
}

#[test]
fn destroying_a_body_ends_contacts_then_reports_fixtures() {
    let mut graph = recording_graph(GRAVITY);
    let (floor_body, floor) = ground(&mut graph, Vec2::ZERO, 5.0, 0.5);
    ball(&mut graph, v(0.0, 1.0), 0.5, Vec2::ZERO);
    run(&mut graph, 10);
    assert_eq!(graph.listener().begins(), 1);
    graph.listener_mut().events.clear();

    graph.destroy_body(floor_body).unwrap();
    let rec = graph.listener();
    assert_eq!(rec.events.len(), 2, "{:?}", rec.events);
    assert!(matches!(rec.events[0], Event::End(..)));
    assert_eq!(rec.events[1], Event::FixtureDestroyed(floor));
    assert_eq!(graph.contact_count(), 0);
    assert!(graph.fixture(floor).is_none());
}

#[test]
fn destroying_a_fixture_ends_its_contacts_silently() {
    let mut graph = recording_graph(GRAVITY);
    let (_, floor) = ground(&mut graph, Vec2::ZERO, 5.0, 0.5);
    ball(&mut graph, v(0.0, 1.0), 0.5, Vec2::ZERO);
    run(&mut graph, 10);
    graph.listener_mut().events.clear();

    graph.destroy_fixture(floor).unwrap();
    let rec = graph.listener();
    assert_eq!(rec.ends(), 1);
    assert!(!rec.events.iter().any(|e| matches!(e, Event::FixtureDestroyed(_))));
    assert_eq!(graph.contact_count(), 0);
}

/// Disables every contact before the solver sees it.
#[derive(Debug, Default)]
struct Ghost {
    old_counts: Vec<usize>,
}

impl ContactListener for Ghost {
    fn pre_solve(&mut self, contact: &mut Contact, old_manifold: &Manifold) {
        self.old_counts.push(old_manifold.count);
        contact.set_enabled(false);
    }
}

#[test]
fn pre_solve_can_disable_a_contact() {
    let mut graph = CollisionGraph::with_listener(GraphConfig::with_gravity(GRAVITY), Ghost::default());
    let (_, _) = ground(&mut graph, Vec2::ZERO, 5.0, 0.5);
    let (body, _) = ball(&mut graph, v(0.0, 2.0), 0.5, Vec2::ZERO);

    run(&mut graph, 90);

    assert!(graph.body(body).unwrap().position().y() < -1.0);
    let counts = &graph.listener().old_counts;
    assert!(counts.len() >= 2);
    // The first pre-solve has no previous manifold; later ones do.
    assert_eq!(counts[0], 0);
    assert!(counts[1] > 0);
}

/// Overrides the contact material in its first `pre_solve` only, recording
/// what each call sees on entry.
#[derive(Debug, Default)]
struct OneShotMaterial {
    seen: Vec<(f32, f32, f32)>,
}

impl ContactListener for OneShotMaterial {
    fn pre_solve(&mut self, contact: &mut Contact, _old_manifold: &Manifold) {
        self.seen.push((contact.friction(), contact.restitution(), contact.tangent_speed()));
        if self.seen.len() == 1 {
            contact.set_friction(0.0);
            contact.set_restitution(0.9);
            contact.set_tangent_speed(3.0);
        }
    }
}

#[test]
fn pre_solve_overrides_last_one_step() {
    let mut graph =
        CollisionGraph::with_listener(GraphConfig::with_gravity(GRAVITY), OneShotMaterial::default());
    ground(&mut graph, Vec2::ZERO, 5.0, 0.5);
    ball(&mut graph, v(0.0, 0.99), 0.5, Vec2::ZERO);

    run(&mut graph, 5);

    let seen = &graph.listener().seen;
    assert!(seen.len() >= 2, "{seen:?}");
    // Ground friction 0.6 against the default 0.2; neither surface bounces.
    let mixed = (mix_friction(0.6, 0.2), 0.0, 0.0);
    assert_eq!(seen[0], mixed);
    assert_eq!(seen[1], mixed);
}
