//! Benchmarks for the vertex and edge fusers.
//!
//! Run with: cargo bench -p nmg-kernel-fuse

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use nmg_kernel_classify::ClassifyOptions;
use nmg_kernel_fuse::{fuse_edges, fuse_vertices, NoProgress, Scope};
use nmg_kernel_math::{Point3, Tolerance};
use nmg_kernel_topo::Model;

/// An `n × n` grid of unit quads in z = 0, each over its own four vertices,
/// with corners jittered well inside the default tolerance.
fn loose_grid(n: usize) -> Model {
    let mut model = Model::new();
    let r = model.add_region();
    let Ok(s) = model.add_shell(r) else {
        return model;
    };
    let jitter = |i: usize, j: usize, k: usize| ((i * 31 + j * 17 + k * 7) % 11) as f64 * 1e-5;
    for i in 0..n {
        for j in 0..n {
            let (x, y) = (i as f64, j as f64);
            let corners = [(x, y), (x + 1.0, y), (x + 1.0, y + 1.0), (x, y + 1.0)];
            let verts: Vec<_> = corners
                .iter()
                .enumerate()
                .map(|(k, &(cx, cy))| {
                    model.add_vertex(Point3::new(cx + jitter(i, j, k), cy, 0.0))
                })
                .collect();
            if model.add_face(s, &verts).is_err() {
                return model;
            }
        }
    }
    model
}

fn bench_fuse_vertices(c: &mut Criterion) {
    let mut group = c.benchmark_group("fuse_vertices");
    let tol = Tolerance::default();
    for n in [8, 32] {
        group.bench_with_input(BenchmarkId::from_parameter(n * n), &n, |b, &n| {
            b.iter_batched(
                || loose_grid(n),
                |mut model| {
                    black_box(fuse_vertices(&mut model, Scope::Model, &tol, &mut NoProgress).ok())
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_fuse_edges(c: &mut Criterion) {
    let mut group = c.benchmark_group("fuse_edges");
    let tol = Tolerance::default();
    let opts = ClassifyOptions::default();
    for n in [8, 16] {
        group.bench_with_input(BenchmarkId::from_parameter(n * n), &n, |b, &n| {
            b.iter_batched(
                || loose_grid(n),
                |mut model| {
                    black_box(fuse_edges(&mut model, Scope::Model, &tol, &opts, &mut NoProgress).ok())
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_fuse_vertices, bench_fuse_edges);
criterion_main!(benches);
