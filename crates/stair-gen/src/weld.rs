//! Face classification and seam welding across adjacent mesh instances.
//!
//! The welder handles a bounded two-neighbor adjacency model: an ordered run
//! of instances chained along the path axis (Z). Each instance's boundary
//! vertices are classified into a front set (normals toward +Z) and a back
//! set (normals toward -Z); the back face of instance `i` is then welded to
//! the front face of instance `i+1` by redirecting the front vertices onto
//! the nearest back vertex within tolerance. The weld is pure index
//! remapping — vertex storage stays concatenated and may keep unreferenced
//! duplicates.

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{StairError, StairResult};
use crate::scene::{ObjectHandle, Scene, SceneObject};
use crate::transform::Transform;
use crate::types::{Mesh, Vertex};

/// Parameters for face classification and welding.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
pub struct WeldParams {
    /// Maximum distance between vertices that may be merged, in world units.
    pub weld_distance: f64,
    /// Angular threshold in degrees between a vertex normal and the path
    /// axis for the vertex to count as front- or back-facing.
    pub face_angle_degrees: f64,
}

impl Default for WeldParams {
    fn default() -> Self {
        Self {
            weld_distance: 0.01,
            face_angle_degrees: 45.0,
        }
    }
}

/// Result of welding an ordered run of instances.
#[derive(Debug, Clone)]
pub struct WeldResult {
    /// The combined mesh with remapped triangle indices.
    pub mesh: Mesh,
    /// Number of front-face vertices redirected onto back-face vertices.
    pub vertices_welded: usize,
    /// Adjacent pairs skipped because a face set was empty.
    pub pairs_skipped: usize,
    /// Number of input meshes consumed.
    pub input_count: usize,
}

/// A classified boundary vertex: combined-mesh index plus world-space data.
#[derive(Debug, Clone, Copy)]
struct FaceVertex {
    index: u32,
    position: Point3<f64>,
}

/// Front/back face sets for one instance in the combined vertex array.
#[derive(Debug, Default)]
struct FaceSets {
    front: Vec<FaceVertex>,
    back: Vec<FaceVertex>,
}

/// Weld an ordered sequence of placed meshes into one combined mesh.
///
/// Inputs are sorted by their transform's Z coordinate before processing;
/// the order of equal-Z inputs is preserved. Fewer than two inputs is a
/// precondition error and nothing is emitted. A pair with an empty front or
/// back set is skipped with a warning and processing continues.
pub fn weld_adjacent(inputs: &[(&Mesh, Transform)], params: &WeldParams) -> StairResult<WeldResult> {
    if inputs.len() < 2 {
        return Err(StairError::not_enough_meshes(2, inputs.len()));
    }

    let mut order: Vec<usize> = (0..inputs.len()).collect();
    order.sort_by(|&a, &b| {
        inputs[a]
            .1
            .position
            .z
            .total_cmp(&inputs[b].1.position.z)
    });

    // Bake every instance to world space once and concatenate.
    let mut combined = Mesh::new();
    let mut ranges = Vec::with_capacity(inputs.len());
    for &idx in &order {
        let (mesh, transform) = &inputs[idx];
        let start = combined.vertices.len() as u32;
        let world = world_vertices(mesh, transform);

        for face in &mesh.faces {
            combined
                .faces
                .push([face[0] + start, face[1] + start, face[2] + start]);
        }
        combined.vertices.extend(world);
        ranges.push((start, combined.vertices.len() as u32));
    }

    debug!(
        meshes = inputs.len(),
        vertices = combined.vertex_count(),
        "Combined instances before welding"
    );

    // Classify each instance's boundary vertices.
    let face_sets: Vec<FaceSets> = ranges
        .iter()
        .map(|&(start, end)| classify_range(&combined.vertices, start, end, params))
        .collect();

    // Canonical index map: identity until a front vertex is redirected.
    let mut canonical: Vec<u32> = (0..combined.vertices.len() as u32).collect();
    let mut vertices_welded = 0;
    let mut pairs_skipped = 0;

    for i in 0..face_sets.len() - 1 {
        let source = &face_sets[i].back;
        let target = &face_sets[i + 1].front;

        if source.is_empty() || target.is_empty() {
            warn!(
                pair = i,
                back = source.len(),
                front = target.len(),
                "Empty face set, skipping weld pair"
            );
            pairs_skipped += 1;
            continue;
        }

        let welded = weld_pair(source, target, params.weld_distance, &mut canonical);
        debug!(pair = i, welded, "Welded adjacent faces");
        vertices_welded += welded;
    }

    for face in &mut combined.faces {
        face[0] = canonical[face[0] as usize];
        face[1] = canonical[face[1] as usize];
        face[2] = canonical[face[2] as usize];
    }

    info!(
        meshes = inputs.len(),
        vertices_welded,
        pairs_skipped,
        vertices = combined.vertex_count(),
        "Weld pass complete"
    );
    crate::tracing_ext::log_mesh_stats(&combined, "welded");

    Ok(WeldResult {
        mesh: combined,
        vertices_welded,
        pairs_skipped,
        input_count: inputs.len(),
    })
}

/// Bake an instance's vertices to world space.
fn world_vertices(mesh: &Mesh, transform: &Transform) -> Vec<Vertex> {
    mesh.vertices
        .par_iter()
        .map(|v| Vertex {
            position: transform.transform_point(&v.position),
            normal: v.normal.map(|n| transform.transform_direction(&n)),
            uv: v.uv,
        })
        .collect()
}

/// Classify one instance's vertices into front and back sets.
///
/// A vertex with no normal uses world up, which matches neither set.
fn classify_range(vertices: &[Vertex], start: u32, end: u32, params: &WeldParams) -> FaceSets {
    let cos_threshold = params.face_angle_degrees.to_radians().cos();
    let mut sets = FaceSets::default();

    for index in start..end {
        let vertex = &vertices[index as usize];
        let normal = vertex.normal.unwrap_or_else(Vector3::y);
        let norm = normal.norm();
        if norm < f64::EPSILON {
            continue;
        }

        let cos_front = normal.z / norm;
        let entry = FaceVertex {
            index,
            position: vertex.position,
        };
        if cos_front > cos_threshold {
            sets.front.push(entry);
        } else if -cos_front > cos_threshold {
            sets.back.push(entry);
        }
    }

    sets
}

/// Redirect each target (front) vertex onto its nearest source (back)
/// vertex within the weld distance. Strictly nearest wins; equidistant
/// candidates resolve to the first in source-list order.
fn weld_pair(
    source: &[FaceVertex],
    target: &[FaceVertex],
    weld_distance: f64,
    canonical: &mut [u32],
) -> usize {
    let mut welded = 0;

    for t in target {
        let mut closest: Option<u32> = None;
        let mut closest_distance = f64::MAX;

        for s in source {
            let distance = (s.position - t.position).norm();
            if distance < closest_distance && distance <= weld_distance {
                closest_distance = distance;
                closest = Some(s.index);
            }
        }

        if let Some(source_index) = closest {
            canonical[t.index as usize] = canonical[source_index as usize];
            welded += 1;
        }
    }

    welded
}

/// A weld pass committed to the scene.
#[derive(Debug, Clone, Copy)]
pub struct SceneWeld {
    /// The new object carrying the combined mesh.
    pub object: ObjectHandle,
    pub vertices_welded: usize,
    pub pairs_skipped: usize,
}

/// Weld the meshes of the given scene objects and commit the result as a
/// new object carrying a collider mirror and the first input's material.
///
/// Objects without a mesh are skipped with a warning. The inputs themselves
/// are left in place.
pub fn weld_selected(
    scene: &mut Scene,
    handles: &[ObjectHandle],
    name: &str,
    params: &WeldParams,
) -> StairResult<SceneWeld> {
    let mut inputs: Vec<(&Mesh, Transform)> = Vec::with_capacity(handles.len());
    let mut material = None;

    for &handle in handles {
        let Some(object) = scene.get(handle) else {
            continue;
        };
        match &object.mesh {
            Some(mesh) => {
                if material.is_none() {
                    material = object.material.clone();
                }
                inputs.push((mesh, object.transform));
            }
            None => warn!(name = object.name.as_str(), "Object has no mesh, skipping"),
        }
    }

    let result = weld_adjacent(&inputs, params)?;
    let vertices_welded = result.vertices_welded;
    let pairs_skipped = result.pairs_skipped;

    let mut welded = SceneObject::new(name, Transform::identity()).with_mesh(result.mesh);
    welded.material = material;
    welded.has_collider = true;
    Ok(SceneWeld {
        object: scene.spawn(welded),
        vertices_welded,
        pairs_skipped,
    })
}

/// Facing histogram and basic statistics for one mesh instance.
#[derive(Debug, Clone, Default)]
pub struct FaceReport {
    pub vertices: usize,
    pub triangles: usize,
    pub bounds_min: Point3<f64>,
    pub bounds_max: Point3<f64>,
    pub front: usize,
    pub back: usize,
    pub left: usize,
    pub right: usize,
    pub up: usize,
    pub down: usize,
}

/// Count world-space vertex normals against the six cardinal directions at
/// the 45 degree threshold. Directions are checked in front, back, left,
/// right, up, down order; the first match wins.
pub fn face_report(mesh: &Mesh, transform: &Transform) -> FaceReport {
    let cos_threshold = 45.0_f64.to_radians().cos();
    let (bounds_min, bounds_max) = mesh.bounds().unwrap_or_default();

    let mut report = FaceReport {
        vertices: mesh.vertex_count(),
        triangles: mesh.face_count(),
        bounds_min,
        bounds_max,
        ..FaceReport::default()
    };

    let axes = [
        Vector3::z(),
        -Vector3::z(),
        -Vector3::x(),
        Vector3::x(),
        Vector3::y(),
        -Vector3::y(),
    ];

    for vertex in &mesh.vertices {
        let Some(normal) = vertex.normal else {
            continue;
        };
        let world = transform.transform_direction(&normal);
        let norm = world.norm();
        if norm < f64::EPSILON {
            continue;
        }

        let slots = [
            &mut report.front,
            &mut report.back,
            &mut report.left,
            &mut report.right,
            &mut report.up,
            &mut report.down,
        ];
        for (axis, slot) in axes.iter().zip(slots) {
            if world.dot(axis) / norm > cos_threshold {
                *slot += 1;
                break;
            }
        }
    }

    report
}

impl std::fmt::Display for FaceReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "vertices: {}, triangles: {}",
            self.vertices, self.triangles
        )?;
        writeln!(
            f,
            "bounds: ({:.3}, {:.3}, {:.3}) .. ({:.3}, {:.3}, {:.3})",
            self.bounds_min.x,
            self.bounds_min.y,
            self.bounds_min.z,
            self.bounds_max.x,
            self.bounds_max.y,
            self.bounds_max.z
        )?;
        write!(
            f,
            "facing: front {}, back {}, left {}, right {}, up {}, down {}",
            self.front, self.back, self.left, self.right, self.up, self.down
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn at_z(z: f64) -> Transform {
        Transform::from_position(Point3::new(0.0, 0.0, z))
    }

    #[test]
    fn test_needs_two_meshes() {
        let mesh = rail_segment(1.0);
        let inputs = [(&mesh, Transform::identity())];
        let err = weld_adjacent(&inputs, &WeldParams::default()).unwrap_err();
        assert!(matches!(
            err,
            StairError::NotEnoughMeshes { needed: 2, got: 1 }
        ));
    }

    /// Mesh shaped for the welder's chaining contract: its back face (-Z
    /// normals) sits at the far end (z=depth) and its front face (+Z
    /// normals) at the near end (z=0), the way an extruded rail segment
    /// meets its neighbors.
    fn rail_segment(depth: f64) -> Mesh {
        let mut mesh = Mesh::new();

        let mut quad = |corners: [[f64; 3]; 4], normal: Vector3<f64>| {
            let base = mesh.vertices.len() as u32;
            for c in corners {
                mesh.vertices
                    .push(Vertex::with_normal(Point3::new(c[0], c[1], c[2]), normal));
            }
            mesh.faces.push([base, base + 1, base + 2]);
            mesh.faces.push([base, base + 2, base + 3]);
        };

        // Front (toward the next segment along +Z ordering) at z=0.
        quad(
            [
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            Vector3::z(),
        );
        // Back at z=depth.
        quad(
            [
                [0.0, 0.0, depth],
                [0.0, 1.0, depth],
                [1.0, 1.0, depth],
                [1.0, 0.0, depth],
            ],
            -Vector3::z(),
        );

        mesh
    }

    #[test]
    fn test_adjacent_segments_weld_by_coincident_pairs() {
        let mesh = rail_segment(1.0);
        // Segment 1 spans [0,1]; segment 2 spans [1,2]. Segment 1's back
        // face (z=1) coincides with segment 2's front face (z=1).
        let inputs = [(&mesh, at_z(0.0)), (&mesh, at_z(1.0))];
        let result = weld_adjacent(&inputs, &WeldParams::default()).unwrap();

        assert_eq!(result.vertices_welded, 4);
        assert_eq!(result.pairs_skipped, 0);

        // Triangle list no longer references the redirected front vertices.
        let second_front_start = mesh.vertex_count() as u32;
        let second_front_end = second_front_start + 4;
        for face in &result.mesh.faces {
            for &idx in face {
                assert!(
                    !(second_front_start..second_front_end).contains(&idx),
                    "face references unwelded index {idx}"
                );
            }
        }
    }

    #[test]
    fn test_disjoint_meshes_do_not_weld() {
        let mesh = rail_segment(1.0);
        let inputs = [(&mesh, at_z(0.0)), (&mesh, at_z(5.0))];
        let result = weld_adjacent(&inputs, &WeldParams::default()).unwrap();

        assert_eq!(result.vertices_welded, 0);
        assert_eq!(
            result.mesh.vertex_count(),
            mesh.vertex_count() * 2,
            "disjoint weld keeps all vertices"
        );
        result.mesh.validate_indices().unwrap();
    }

    #[test]
    fn test_weld_is_order_insensitive() {
        let mesh = rail_segment(1.0);
        let forward = [(&mesh, at_z(0.0)), (&mesh, at_z(1.0))];
        let reversed = [(&mesh, at_z(1.0)), (&mesh, at_z(0.0))];

        let a = weld_adjacent(&forward, &WeldParams::default()).unwrap();
        let b = weld_adjacent(&reversed, &WeldParams::default()).unwrap();
        assert_eq!(a.vertices_welded, b.vertices_welded);
    }

    #[test]
    fn test_nearest_source_wins() {
        // Source back face has two vertices near the target; the strictly
        // nearest one must win.
        let mut source = Mesh::new();
        source
            .vertices
            .push(Vertex::with_normal(Point3::new(0.0, 0.0, 1.0), -Vector3::z()));
        source.vertices.push(Vertex::with_normal(
            Point3::new(0.004, 0.0, 1.0),
            -Vector3::z(),
        ));
        source.vertices.push(Vertex::with_normal(
            Point3::new(0.0, 1.0, 1.0),
            -Vector3::z(),
        ));
        source.faces.push([0, 1, 2]);

        let mut target = Mesh::new();
        target.vertices.push(Vertex::with_normal(
            Point3::new(0.005, 0.0, 1.0),
            Vector3::z(),
        ));
        target
            .vertices
            .push(Vertex::with_normal(Point3::new(5.0, 0.0, 1.0), Vector3::z()));
        target
            .vertices
            .push(Vertex::with_normal(Point3::new(5.0, 1.0, 1.0), Vector3::z()));
        target.faces.push([0, 1, 2]);

        // Equal Z keeps input order (the sort is stable), so the source
        // mesh stays first in the run.
        let inputs = [(&source, at_z(0.0)), (&target, at_z(0.0))];
        let result = weld_adjacent(&inputs, &WeldParams::default()).unwrap();

        assert_eq!(result.vertices_welded, 1);
        // Target vertex 0 (combined index 3) redirected to source index 1.
        assert_eq!(result.mesh.faces[1][0], 1);
    }

    #[test]
    fn test_empty_face_set_skips_pair() {
        // Sideways-facing mesh has neither front nor back vertices.
        let mut sideways = Mesh::new();
        for i in 0..3 {
            sideways.vertices.push(Vertex::with_normal(
                Point3::new(0.0, i as f64, 0.0),
                Vector3::x(),
            ));
        }
        sideways.faces.push([0, 1, 2]);

        let rail = rail_segment(1.0);
        let inputs = [
            (&sideways, at_z(0.0)),
            (&rail, at_z(1.0)),
        ];
        let result = weld_adjacent(&inputs, &WeldParams::default()).unwrap();
        assert_eq!(result.pairs_skipped, 1);
        assert_eq!(result.vertices_welded, 0);
    }

    #[test]
    fn test_weld_selected_creates_object() {
        let mut scene = Scene::new();
        let mesh = rail_segment(1.0);

        let mut a = SceneObject::new("seg_1", at_z(0.0)).with_mesh(mesh.clone());
        a.material = Some("steel".into());
        let ha = scene.spawn(a);
        let hb = scene.spawn(SceneObject::new("seg_2", at_z(1.0)).with_mesh(mesh));

        let weld = weld_selected(
            &mut scene,
            &[ha, hb],
            "Welded_Adjacent_Faces",
            &WeldParams::default(),
        )
        .unwrap();
        assert_eq!(weld.vertices_welded, 4);

        let object = scene.get(weld.object).unwrap();
        assert_eq!(object.name, "Welded_Adjacent_Faces");
        assert_eq!(object.material.as_deref(), Some("steel"));
        assert!(object.has_collider);
        assert!(object.mesh.is_some());
        // Inputs are left in place.
        assert!(scene.contains(ha));
        assert!(scene.contains(hb));
    }

    #[test]
    fn test_face_report_histogram() {
        let mesh = rail_segment(1.0);
        let report = face_report(&mesh, &Transform::identity());

        assert_eq!(report.vertices, 8);
        assert_eq!(report.triangles, 4);
        assert_eq!(report.front, 4);
        assert_eq!(report.back, 4);
        assert_eq!(report.up, 0);
        assert_relative_eq!(report.bounds_max.z, 1.0);
    }
}
