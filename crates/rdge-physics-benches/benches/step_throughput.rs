// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! Benchmark: full `CollisionGraph::step` over scattered falling bodies.
//!
//! Half the bodies are circles and half are boxes, dropped onto a static
//! floor; the graph is pre-stepped so the measured steps include resting
//! contacts as well as new pairs.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rdge_physics::{
    BodyProfile, Circle, CollisionGraph, FixtureProfile, GraphConfig, Polygon, Vec2,
};

const DT: f32 = 1.0 / 60.0;

fn build_scene(n: u32) -> CollisionGraph {
    let mut graph = CollisionGraph::new(GraphConfig::default());
    let width = (n as f32).sqrt() * 1.5 + 5.0;
    let floor = graph.create_body(&BodyProfile::fixed(Vec2::ZERO));
    let ground = Polygon::new_box(width, 0.5).expect("floor box");
    graph.create_fixture(floor, &FixtureProfile::new(ground).with_friction(0.6)).expect("floor");

    let mut rng = StdRng::seed_from_u64(42);
    let ball = Circle::new(Vec2::ZERO, 0.4).expect("ball");
    let crate_box = Polygon::new_box(0.4, 0.4).expect("crate");
    for i in 0..n {
        let position = Vec2::new(rng.gen_range(-width..width), rng.gen_range(2.0..2.0 + width));
        let body = graph.create_body(&BodyProfile::dynamic(position));
        let profile = if i % 2 == 0 {
            FixtureProfile::new(ball)
        } else {
            FixtureProfile::new(crate_box)
        };
        graph.create_fixture(body, &profile.with_density(1.0)).expect("body fixture");
    }
    for _ in 0..30 {
        graph.step(DT).expect("warm-up step");
    }
    graph
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_step");
    group.sample_size(20);
    for &n in &[64u32, 256, 1_024] {
        group.throughput(Throughput::Elements(u64::from(n)));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter_batched(
                || build_scene(n),
                |mut graph| {
                    for _ in 0..10 {
                        graph.step(DT).expect("step");
                    }
                    graph.contact_count()
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_step);
criterion_main!(benches);
