// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! Benchmark: dynamic tree insert/move/query under random motion.
//!
//! Each iteration moves every proxy by a random step; roughly a third of the
//! moves escape their fat box and force a reinsertion.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rdge_physics::broad::{DynamicTree, ProxyId};
use rdge_physics::{Aabb, Vec2};

fn random_box(rng: &mut StdRng, extent: f32) -> Aabb {
    let center = Vec2::new(rng.gen_range(-extent..extent), rng.gen_range(-extent..extent));
    let half = rng.gen_range(0.2..1.0);
    Aabb::from_center_half_extents(center, half, half)
}

fn build_tree(n: u32, rng: &mut StdRng) -> (DynamicTree<u32>, Vec<(ProxyId<u32>, Aabb)>) {
    let mut tree = DynamicTree::new();
    let extent = (n as f32).sqrt() * 2.0;
    let proxies = (0..n)
        .map(|i| {
            let aabb = random_box(rng, extent);
            (tree.create_proxy(aabb, i), aabb)
        })
        .collect();
    (tree, proxies)
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("bvh_insert");
    for &n in &[100u32, 1_000, 10_000] {
        group.throughput(Throughput::Elements(u64::from(n)));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter_batched(
                || StdRng::seed_from_u64(7),
                |mut rng| build_tree(n, &mut rng),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("bvh_move");
    for &n in &[100u32, 1_000, 10_000] {
        group.throughput(Throughput::Elements(u64::from(n)));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter_batched(
                || {
                    let mut rng = StdRng::seed_from_u64(11);
                    let (tree, proxies) = build_tree(n, &mut rng);
                    (tree, proxies, rng)
                },
                |(mut tree, mut proxies, mut rng)| {
                    let mut reinserted = 0usize;
                    for (proxy, aabb) in &mut proxies {
                        let d = Vec2::new(rng.gen_range(-0.15..0.15), rng.gen_range(-0.15..0.15));
                        *aabb = Aabb::new(aabb.min() + d, aabb.max() + d);
                        if tree.move_proxy(*proxy, *aabb, d) {
                            reinserted += 1;
                        }
                    }
                    // Keep the tree honest: it must stay AVL-balanced.
                    assert!(tree.max_imbalance() <= 1);
                    reinserted
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_pairs(c: &mut Criterion) {
    let mut group = c.benchmark_group("bvh_query_pairs");
    for &n in &[100u32, 1_000, 10_000] {
        let mut rng = StdRng::seed_from_u64(13);
        let (tree, proxies) = build_tree(n, &mut rng);
        let ids: Vec<_> = proxies.iter().map(|(id, _)| *id).collect();
        group.throughput(Throughput::Elements(u64::from(n)));
        group.bench_with_input(BenchmarkId::from_parameter(n), &ids, |b, ids| {
            b.iter(|| tree.query_pairs(ids).len());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert, bench_move, bench_pairs);
criterion_main!(benches);
