//! Benchmarks for hidden-line projection.
//!
//! Run with: cargo bench -p edgeproj
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p edgeproj -- --save-baseline main
//! 2. After changes: cargo bench -p edgeproj -- --baseline main

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use edgeproj::edges::extract_feature_edges;
use edgeproj::{
    generate, Axis, LinearIndex, Projection, ProjectionOptions, ProjectionTask, TriangleSoup,
};

// =============================================================================
// Test Mesh Generation
// =============================================================================

/// A `n x n` grid of boxes with staggered heights, so neighbours occlude
/// each other from the side views.
fn box_grid(n: usize) -> Vec<TriangleSoup> {
    let mut parts = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            let (x, y) = (i as f32 * 1.5, j as f32 * 1.5);
            let h = 1.0 + ((i * 7 + j * 3) % 5) as f32 * 0.4;
            parts.push(TriangleSoup::cuboid([x, y, 0.0], [x + 1.0, y + 1.0, h]));
        }
    }
    parts
}

fn triangle_count(parts: &[TriangleSoup]) -> u64 {
    parts.iter().map(|p| p.triangle_count() as u64).sum()
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_feature_edges(c: &mut Criterion) {
    let mut group = c.benchmark_group("feature_edges");

    for n in [4, 8, 16] {
        let mesh = TriangleSoup::merge(&box_grid(n)).unwrap();
        let triangles = mesh.triangles();
        group.throughput(Throughput::Elements(triangles.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &triangles, |b, tris| {
            b.iter(|| extract_feature_edges(black_box(tris), Axis::Z, 50.0));
        });
    }

    group.finish();
}

fn bench_single_view(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_view");
    group.sample_size(20);

    for n in [4, 8, 16] {
        let parts = box_grid(n);
        group.throughput(Throughput::Elements(triangle_count(&parts)));
        group.bench_with_input(BenchmarkId::new("bvh", n), &parts, |b, parts| {
            b.iter(|| generate(black_box(parts), &ProjectionOptions::default()).unwrap());
        });
    }

    group.finish();
}

fn bench_index_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_comparison");
    group.sample_size(10);

    let parts = box_grid(8);
    group.bench_function("bvh", |b| {
        b.iter(|| generate(black_box(&parts), &ProjectionOptions::default()).unwrap());
    });
    group.bench_function("linear", |b| {
        b.iter(|| {
            ProjectionTask::<LinearIndex>::with_index(black_box(&parts), ProjectionOptions::default())
                .unwrap()
                .finish(|_, _| {})
                .unwrap()
        });
    });

    group.finish();
}

fn bench_all_views(c: &mut Criterion) {
    let mut group = c.benchmark_group("all_views");
    group.sample_size(10);

    let parts = box_grid(8);
    let options = ProjectionOptions {
        projection: Projection::AllViews,
        ..Default::default()
    };
    group.bench_function("grid_8", |b| {
        b.iter(|| generate(black_box(&parts), &options).unwrap());
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_feature_edges,
    bench_single_view,
    bench_index_comparison,
    bench_all_views
);
criterion_main!(benches);
