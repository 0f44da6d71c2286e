//! Benchmarks for grid and triangle mesh construction.
//!
//! Run with: cargo bench --package mesh-builder --bench mesh_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mesh_builder::{build_grid_mesh, build_triangle_mesh, grid_normals, MeshOptions};
use surface_common::Frame;
use test_utils::{create_dome_grid, create_ramp_properties, create_tin_square, punch_holes};

/// Dome-shaped depth surface with a band of missing nodes.
fn generate_surface(size: usize) -> (Frame, Vec<f32>, Vec<f32>) {
    let frame = Frame::new([0.0, 0.0], [25.0, 25.0], [size, size]);
    let mut elevation = create_dome_grid(size, size, 2000.0, 300.0);
    let holes: Vec<(usize, usize)> = (0..size).map(|i| (i, size / 2)).collect();
    punch_holes(&mut elevation, size, &holes);
    let properties = create_ramp_properties(size * size);
    (frame, elevation, properties)
}

fn bench_grid_mesh(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_mesh");

    for size in [64, 256, 1024] {
        let (frame, elevation, properties) = generate_surface(size);
        group.throughput(Throughput::Elements((size * size) as u64));

        group.bench_with_input(BenchmarkId::new("node_centered", size), &size, |b, _| {
            b.iter(|| {
                build_grid_mesh(
                    black_box(Some(elevation.as_slice())),
                    black_box(&properties),
                    &frame,
                    &MeshOptions::default(),
                )
            })
        });

        let cell_properties = create_ramp_properties((size - 1) * (size - 1));
        group.bench_with_input(BenchmarkId::new("cell_centered", size), &size, |b, _| {
            b.iter(|| {
                build_grid_mesh(
                    black_box(Some(elevation.as_slice())),
                    black_box(&cell_properties),
                    &frame,
                    &MeshOptions::default(),
                )
            })
        });
    }

    group.finish();
}

fn bench_normals(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_normals");

    for size in [32, 128, 512] {
        let (frame, elevation, _) = generate_surface(size);
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| grid_normals(black_box(Some(elevation.as_slice())), &frame, true))
        });
    }

    group.finish();
}

fn bench_triangle_mesh(c: &mut Criterion) {
    let (points, triangles) = create_tin_square(300, 10.0, 1500.0);
    c.bench_function("triangle_mesh_300x300", |b| {
        b.iter(|| {
            build_triangle_mesh(
                black_box(&points),
                black_box(&triangles),
                &MeshOptions::default(),
            )
        })
    });
}

criterion_group!(benches, bench_grid_mesh, bench_normals, bench_triangle_mesh);
criterion_main!(benches);
