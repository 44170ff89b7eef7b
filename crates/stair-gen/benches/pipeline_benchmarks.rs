//! Benchmarks for the placement/weld/deform pipeline.
//!
//! Run with: cargo bench -p stair-gen

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use nalgebra::{Point3, Vector3};
use stair_gen::{
    Mesh, PathParams, SimplifyParams, Transform, Vertex, WeldParams, deform_to_path,
    simplify_mesh, stair_path, weld_adjacent,
};

/// Railing segment with `rings` cross-sections along Z and seam caps on
/// both ends.
fn create_segment(rings: usize) -> Mesh {
    let mut mesh = Mesh::new();
    let depth = 1.0;

    for i in 0..rings {
        let z = depth * i as f64 / (rings - 1) as f64;
        let normal = if i == 0 {
            Vector3::z()
        } else if i == rings - 1 {
            -Vector3::z()
        } else {
            Vector3::y()
        };
        for k in 0..4 {
            let angle = std::f64::consts::TAU * k as f64 / 4.0;
            mesh.vertices.push(Vertex::with_normal(
                Point3::new(0.05 * angle.cos(), 0.05 * angle.sin() + 0.5, z),
                normal,
            ));
        }
    }
    for i in 0..rings as u32 - 1 {
        let base = i * 4;
        for k in 0..4 {
            let a = base + k;
            let b = base + (k + 1) % 4;
            mesh.faces.push([a, b, a + 4]);
            mesh.faces.push([b, b + 4, a + 4]);
        }
    }
    mesh
}

fn bench_weld(c: &mut Criterion) {
    let mut group = c.benchmark_group("weld_adjacent");
    for &count in &[4usize, 16, 64] {
        let segment = create_segment(16);
        let placed: Vec<(&Mesh, Transform)> = (0..count)
            .map(|i| {
                (
                    &segment,
                    Transform::from_position(Point3::new(0.0, 0.0, i as f64)),
                )
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(count), &placed, |b, placed| {
            b.iter(|| weld_adjacent(black_box(placed), &WeldParams::default()).unwrap());
        });
    }
    group.finish();
}

fn bench_deform(c: &mut Criterion) {
    let mut group = c.benchmark_group("deform_to_path");

    let segment = create_segment(256);
    let steps: Vec<Point3<f64>> = (0..12)
        .map(|i| Point3::new(0.0, 0.5 * i as f64, i as f64))
        .collect();
    let waypoints = stair_path(&steps, &PathParams::default()).unwrap();

    group.bench_function("segment_256_rings", |b| {
        b.iter(|| deform_to_path(black_box(&segment), black_box(&waypoints)).unwrap());
    });
    group.finish();
}

fn bench_simplify(c: &mut Criterion) {
    let mut group = c.benchmark_group("simplify_mesh");

    let segment = create_segment(512);
    for &ratio in &[0.25f64, 0.5, 0.75] {
        group.bench_with_input(BenchmarkId::from_parameter(ratio), &ratio, |b, &ratio| {
            b.iter(|| simplify_mesh(black_box(&segment), &SimplifyParams { ratio }));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_weld, bench_deform, bench_simplify);
criterion_main!(benches);
