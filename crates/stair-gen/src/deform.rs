//! Path-following mesh deformation.
//!
//! Re-maps a straight mesh onto an arbitrary polyline: every vertex is
//! parameterized by its normalized position along the mesh's local path
//! axis (Z), that parameter selects a segment of the polyline, and the
//! vertex is rebuilt in a local frame derived from the path tangent. The
//! path-axis component of the vertex is consumed entirely by its projection
//! onto the path; only the lateral X/Y components persist as offsets from
//! the centerline. Topology and UVs pass through unchanged, so a straight
//! railing can be re-skinned onto a curved or spiral staircase without
//! regenerating triangles.

use nalgebra::{Point3, UnitQuaternion, Vector3};
use rayon::prelude::*;
use tracing::info;

use crate::error::{StairError, StairResult};
use crate::types::{Mesh, Vertex};

/// Deform a mesh onto a polyline of world-space waypoints.
///
/// Requires at least two waypoints and a non-empty mesh. Degenerate
/// geometry (zero-length mesh extent, duplicate waypoints, vertical
/// tangents) is clamped to safe defaults and never produces NaNs.
pub fn deform_to_path(mesh: &Mesh, waypoints: &[Point3<f64>]) -> StairResult<Mesh> {
    if waypoints.len() < 2 {
        return Err(StairError::invalid_path(waypoints.len()));
    }
    let (min, max) = mesh
        .bounds()
        .ok_or_else(|| StairError::empty_mesh("nothing to deform"))?;

    let mesh_start = min.z;
    let mesh_length = max.z - min.z;
    let last_segment = waypoints.len() - 2;

    let vertices: Vec<Vertex> = mesh
        .vertices
        .par_iter()
        .map(|vertex| {
            let local = vertex.position;

            // Normalized position along the local path axis. A flat mesh
            // (zero extent) maps everything to the path start.
            let t = if mesh_length > f64::EPSILON {
                ((local.z - mesh_start) / mesh_length).clamp(0.0, 1.0)
            } else {
                0.0
            };

            let along = t * (waypoints.len() - 1) as f64;
            let path_index = (along.floor() as usize).min(last_segment);
            let segment_t = (along - path_index as f64).clamp(0.0, 1.0);

            let path_position = crate::path::lerp(
                waypoints[path_index],
                waypoints[path_index + 1],
                segment_t,
            );

            // Central-difference tangent; degenerate spans fall back to +Z.
            let ahead = waypoints[(path_index + 1).min(waypoints.len() - 1)];
            let behind = waypoints[path_index.saturating_sub(1)];
            let tangent = (ahead - behind)
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(Vector3::z);

            let up = Vector3::y();
            let right = tangent
                .cross(&up)
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(Vector3::x);

            let position = path_position + right * local.x + up * local.y;

            let normal = vertex.normal.map(|n| {
                // Shortest rotation taking +Z to the tangent; an
                // anti-parallel tangent flips around up instead.
                let rotation = UnitQuaternion::rotation_between(&Vector3::z(), &tangent)
                    .unwrap_or_else(|| {
                        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), std::f64::consts::PI)
                    });
                (rotation * n)
                    .try_normalize(f64::EPSILON)
                    .unwrap_or(Vector3::y())
            });

            Vertex {
                position,
                normal,
                uv: vertex.uv,
            }
        })
        .collect();

    info!(
        vertices = vertices.len(),
        waypoints = waypoints.len(),
        "Deformed mesh onto path"
    );

    Ok(Mesh {
        vertices,
        faces: mesh.faces.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Straight bar along +Z from 0 to `length`, one vertex ring per unit.
    fn straight_bar(length: usize) -> Mesh {
        let mut mesh = Mesh::new();
        for i in 0..=length {
            let z = i as f64;
            mesh.vertices
                .push(Vertex::with_normal(Point3::new(-0.1, 0.0, z), -Vector3::x()));
            mesh.vertices
                .push(Vertex::with_normal(Point3::new(0.1, 0.0, z), Vector3::x()));
            mesh.vertices
                .push(Vertex::with_normal(Point3::new(0.0, 0.2, z), Vector3::y()));
        }
        for i in 0..length as u32 {
            let base = i * 3;
            mesh.faces.push([base, base + 1, base + 3]);
            mesh.faces.push([base + 1, base + 4, base + 3]);
            mesh.faces.push([base + 1, base + 2, base + 4]);
            mesh.faces.push([base + 2, base + 5, base + 4]);
        }
        mesh
    }

    #[test]
    fn test_needs_two_waypoints() {
        let mesh = straight_bar(2);
        let err = deform_to_path(&mesh, &[Point3::origin()]).unwrap_err();
        assert!(matches!(err, StairError::InvalidPath { waypoints: 1 }));
    }

    #[test]
    fn test_empty_mesh_rejected() {
        let mesh = Mesh::new();
        let path = [Point3::origin(), Point3::new(0.0, 0.0, 1.0)];
        assert!(matches!(
            deform_to_path(&mesh, &path),
            Err(StairError::EmptyMesh { .. })
        ));
    }

    #[test]
    fn test_endpoints_map_to_path_ends() {
        let mesh = straight_bar(4);
        let path = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 2.0),
            Point3::new(0.0, 2.0, 4.0),
        ];
        let deformed = deform_to_path(&mesh, &path).unwrap();

        // A vertex at the minimum extent with zero lateral offset maps to
        // the first waypoint; maximum extent maps to the last.
        let first = &deformed.vertices[2].position; // (0.0, 0.2, 0)
        assert_relative_eq!(first.z, path[0].z, epsilon = 1e-9);
        let last_ring = deformed.vertices.len() - 1;
        let last = &deformed.vertices[last_ring].position;
        assert_relative_eq!(last.z, path[2].z, epsilon = 1e-9);
        assert_relative_eq!(last.y, path[2].y + 0.2, epsilon = 1e-9);
    }

    #[test]
    fn test_identity_path_preserves_shape() {
        let mesh = straight_bar(3);
        // Path runs straight along +Z exactly like the bar itself.
        let path = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.5),
            Point3::new(0.0, 0.0, 3.0),
        ];
        let deformed = deform_to_path(&mesh, &path).unwrap();

        for (orig, new) in mesh.vertices.iter().zip(&deformed.vertices) {
            // right = tangent x up = z x y = -x... the frame flips X.
            assert_relative_eq!(new.position.x, -orig.position.x, epsilon = 1e-9);
            assert_relative_eq!(new.position.y, orig.position.y, epsilon = 1e-9);
            assert_relative_eq!(new.position.z, orig.position.z, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_topology_and_uv_pass_through() {
        let mut mesh = straight_bar(2);
        mesh.vertices[0].uv = Some(nalgebra::Point2::new(0.25, 0.75));
        let path = [Point3::origin(), Point3::new(1.0, 0.0, 2.0)];

        let deformed = deform_to_path(&mesh, &path).unwrap();
        assert_eq!(deformed.faces, mesh.faces);
        assert_eq!(deformed.vertices[0].uv, mesh.vertices[0].uv);
    }

    #[test]
    fn test_duplicate_waypoints_produce_no_nans() {
        let mesh = straight_bar(3);
        let p = Point3::new(0.0, 0.0, 1.0);
        let path = [p, p, p];
        let deformed = deform_to_path(&mesh, &path).unwrap();

        for vertex in &deformed.vertices {
            assert!(vertex.position.coords.iter().all(|c| c.is_finite()));
            if let Some(n) = vertex.normal {
                assert!(n.iter().all(|c| c.is_finite()));
            }
        }
    }

    #[test]
    fn test_vertical_tangent_produces_no_nans() {
        let mesh = straight_bar(2);
        // Tangent parallel to world up breaks the cross product; the frame
        // must fall back instead of emitting NaNs.
        let path = [Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 5.0, 0.0)];
        let deformed = deform_to_path(&mesh, &path).unwrap();
        for vertex in &deformed.vertices {
            assert!(vertex.position.coords.iter().all(|c| c.is_finite()));
        }
    }

    #[test]
    fn test_normals_follow_tangent() {
        let mesh = straight_bar(2);
        // Path turns from +Z onto +X.
        let path = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
        ];
        let deformed = deform_to_path(&mesh, &path).unwrap();

        // The up-facing ridge normals stay unit length after transport.
        for vertex in deformed.vertices.iter().skip(2).step_by(3) {
            let n = vertex.normal.unwrap();
            assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_flat_mesh_maps_to_path_start() {
        // All vertices at z=0: zero extent along the path axis.
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
        mesh.faces.push([0, 1, 2]);

        let path = [Point3::new(5.0, 0.0, 5.0), Point3::new(5.0, 0.0, 9.0)];
        let deformed = deform_to_path(&mesh, &path).unwrap();
        assert_relative_eq!(deformed.vertices[0].position.z, 5.0, epsilon = 1e-9);
    }
}
