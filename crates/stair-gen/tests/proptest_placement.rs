//! Property-based tests for placement math, welding, and the simplifier.

use nalgebra::{Point3, Vector3};
use proptest::prelude::*;
use stair_gen::{
    Mesh, SimplifyParams, Transform, Vertex, WeldParams, linear_transforms, simplify_mesh,
    spiral_radius, spiral_transform, sweep_transforms, weld_adjacent,
};

/// Railing-style segment with a +Z front cap at z=0 and a -Z back cap at
/// z=1, the shape the welder chains along the path axis.
fn capped_segment() -> Mesh {
    let mut mesh = Mesh::new();
    let mut quad = |z: f64, normal: Vector3<f64>| {
        let base = mesh.vertices.len() as u32;
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            mesh.vertices
                .push(Vertex::with_normal(Point3::new(x, y, z), normal));
        }
        mesh.faces.push([base, base + 1, base + 2]);
        mesh.faces.push([base, base + 2, base + 3]);
    };
    quad(0.0, Vector3::z());
    quad(1.0, -Vector3::z());
    mesh
}

fn small_vector() -> impl Strategy<Value = Vector3<f64>> {
    (-10.0..10.0f64, -10.0..10.0f64, -10.0..10.0f64)
        .prop_map(|(x, y, z)| Vector3::new(x, y, z))
}

fn grid_mesh(vertex_count: usize) -> Mesh {
    let mut mesh = Mesh::new();
    for i in 0..vertex_count {
        mesh.vertices.push(Vertex::from_coords(
            (i % 10) as f64,
            (i / 10) as f64,
            (i % 7) as f64,
        ));
    }
    let mut i = 0;
    while i + 2 < vertex_count {
        mesh.faces.push([i as u32, (i + 1) as u32, (i + 2) as u32]);
        i += 3;
    }
    mesh
}

proptest! {
    /// Growing a linear chain keeps the existing prefix bit-identical.
    #[test]
    fn linear_growth_is_prefix_stable(
        offset in small_vector(),
        count in 0usize..40,
        extra in 1usize..20,
    ) {
        let origin = Transform::identity();
        let short = linear_transforms(&origin, offset, count);
        let long = linear_transforms(&origin, offset, count + extra);

        prop_assert_eq!(long.len(), count + extra);
        for (a, b) in short.iter().zip(&long) {
            prop_assert_eq!(a.position, b.position);
            prop_assert_eq!(a.rotation, b.rotation);
        }
        // Appended instances continue at offset * i.
        for (i, t) in long.iter().enumerate().skip(count) {
            let expected = origin.position + offset * (i + 1) as f64;
            prop_assert!((t.position - expected).norm() < 1e-9);
        }
    }

    /// Every spiral instance sits exactly on the radius in the horizontal
    /// plane, and consecutive instances climb one height step.
    #[test]
    fn spiral_instances_lie_on_radius(
        count in 1usize..60,
        spacing in 0.01..50.0f64,
        height in 0.0..50.0f64,
    ) {
        let radius = spiral_radius(count, spacing);
        for i in 0..count {
            let t = spiral_transform(i, count, radius, height);
            let horizontal = (t.position.x.powi(2) + t.position.z.powi(2)).sqrt();
            prop_assert!((horizontal - radius).abs() < 1e-9 * radius.max(1.0));
            prop_assert!((t.position.y - i as f64 * height).abs() < 1e-12);
        }
    }

    /// The sweep's lateral correction is a rotated (v, v, 0) vector: a pure
    /// Y rotation preserves its Y component and its horizontal magnitude.
    #[test]
    fn sweep_lateral_correction_magnitudes(
        degrees in -360.0..360.0f64,
        multiplier in 0.0..1.0f64,
        count in 1usize..30,
    ) {
        let origin = Transform::identity();
        let offset = Vector3::new(0.0, 1.0, 1.0);
        let placements = sweep_transforms(&origin, offset, degrees, multiplier, count);

        for (i, t) in placements.iter().enumerate() {
            let progress = (i + 1) as f64 / count as f64;
            let rotation_y = degrees * progress;
            let v = rotation_y.signum() * rotation_y.abs() / 360.0 * multiplier * 10.0 * progress;

            let base = origin.position + offset * (i + 1) as f64;
            let lateral = t.position - base;

            prop_assert!((lateral.y - v).abs() < 1e-9);
            let horizontal = (lateral.x.powi(2) + lateral.z.powi(2)).sqrt();
            prop_assert!((horizontal - v.abs()).abs() < 1e-9);
        }
    }

    /// Simplification never produces an out-of-range index and respects the
    /// minimum vertex floor.
    #[test]
    fn simplify_indices_in_range(
        vertex_count in 9usize..200,
        ratio in 0.05..1.0f64,
    ) {
        let mesh = grid_mesh(vertex_count);
        let result = simplify_mesh(&mesh, &SimplifyParams { ratio });

        result.mesh.validate_indices().unwrap();
        prop_assert!(result.final_vertices >= 8.min(vertex_count));
    }

    /// Ratio 1.0 is always a perfect identity.
    #[test]
    fn simplify_identity(vertex_count in 3usize..100) {
        let mesh = grid_mesh(vertex_count);
        let result = simplify_mesh(&mesh, &SimplifyParams { ratio: 1.0 });

        prop_assert_eq!(result.final_vertices, mesh.vertex_count());
        prop_assert_eq!(result.final_triangles, mesh.face_count());
        for (a, b) in mesh.vertices.iter().zip(&result.mesh.vertices) {
            prop_assert_eq!(a.position, b.position);
        }
    }

    /// Chained segments weld exactly their coincident seam caps: each
    /// interior seam merges 4 vertex pairs and the triangle list never
    /// references a redirected index out of range.
    #[test]
    fn weld_chain_merges_each_seam(count in 2usize..10) {
        let segment = capped_segment();
        let placed: Vec<(&Mesh, Transform)> = (0..count)
            .map(|i| {
                (
                    &segment,
                    Transform::from_position(Point3::new(0.0, 0.0, i as f64)),
                )
            })
            .collect();

        let result = weld_adjacent(&placed, &WeldParams::default()).unwrap();
        prop_assert_eq!(result.vertices_welded, (count - 1) * 4);
        prop_assert_eq!(result.pairs_skipped, 0);
        result.mesh.validate_indices().unwrap();
    }

    /// Welding is idempotent on disjoint runs: a gap wider than the weld
    /// tolerance keeps every input vertex distinct.
    #[test]
    fn weld_disjoint_keeps_all_vertices(count in 2usize..8, gap in 1.1..10.0f64) {
        let segment = capped_segment();
        let placed: Vec<(&Mesh, Transform)> = (0..count)
            .map(|i| {
                (
                    &segment,
                    Transform::from_position(Point3::new(0.0, 0.0, i as f64 * gap)),
                )
            })
            .collect();

        let result = weld_adjacent(&placed, &WeldParams::default()).unwrap();
        prop_assert_eq!(result.vertices_welded, 0);
        prop_assert_eq!(result.mesh.vertex_count(), segment.vertex_count() * count);
        result.mesh.validate_indices().unwrap();
    }

    /// Deformation endpoints land on the path endpoints for any path.
    #[test]
    fn deform_endpoint_property(
        path_y in proptest::collection::vec(-5.0..5.0f64, 2..10),
    ) {
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 1.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.5));
        mesh.faces.push([0, 1, 2]);

        let waypoints: Vec<Point3<f64>> = path_y
            .iter()
            .enumerate()
            .map(|(i, &y)| Point3::new(0.0, y, i as f64))
            .collect();

        let deformed = stair_gen::deform_to_path(&mesh, &waypoints).unwrap();
        // Vertex 0 sits at the minimum extent, vertex 1 at the maximum.
        prop_assert!((deformed.vertices[0].position - waypoints[0]).norm() < 1e-9);
        prop_assert!(
            (deformed.vertices[1].position - waypoints[waypoints.len() - 1]).norm() < 1e-9
        );
    }
}
