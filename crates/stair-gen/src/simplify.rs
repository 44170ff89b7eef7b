//! Vertex-decimation mesh simplifier.
//!
//! A crude decimator, not quadric-error simplification: vertices are
//! retained by fixed index stride to hit a target ratio, and triangles
//! survive only when all three corners were retained. When the stride kills
//! every triangle, a distance-based vertex merge runs instead.

use hashbrown::HashMap;
use tracing::{info, warn};

use crate::types::{Mesh, Vertex};

/// Parameters for mesh simplification.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
pub struct SimplifyParams {
    /// Target vertex retention ratio in (0, 1]. 1.0 returns an unmodified
    /// copy.
    pub ratio: f64,
}

impl Default for SimplifyParams {
    fn default() -> Self {
        Self { ratio: 0.5 }
    }
}

impl SimplifyParams {
    /// Create params with the given ratio, clamped to (0, 1].
    pub fn with_ratio(ratio: f64) -> Self {
        Self {
            ratio: ratio.clamp(0.01, 1.0),
        }
    }
}

/// Result of mesh simplification.
#[derive(Debug, Clone)]
pub struct SimplifyResult {
    /// The simplified mesh.
    pub mesh: Mesh,
    pub original_vertices: usize,
    pub final_vertices: usize,
    pub original_triangles: usize,
    pub final_triangles: usize,
    /// True when stride sampling killed every triangle and the
    /// distance-merge fallback ran instead.
    pub used_fallback: bool,
}

/// Minimum vertex count the simplifier will target.
const MIN_TARGET_VERTICES: usize = 8;

/// Simplify a mesh by the configured retention ratio.
pub fn simplify_mesh(mesh: &Mesh, params: &SimplifyParams) -> SimplifyResult {
    let original_vertices = mesh.vertex_count();
    let original_triangles = mesh.face_count();

    if original_vertices == 0 || (1.0 - params.ratio).abs() < 1e-9 {
        return SimplifyResult {
            mesh: mesh.clone(),
            original_vertices,
            final_vertices: original_vertices,
            original_triangles,
            final_triangles: original_triangles,
            used_fallback: false,
        };
    }

    let target = ((original_vertices as f64 * params.ratio).round() as usize)
        .max(MIN_TARGET_VERTICES);
    let mut stride = (original_vertices as f64 / target as f64).round().max(1.0) as usize;
    // Rounding the stride up can undershoot the minimum retained count;
    // back off until at least the floor survives.
    while stride > 1 && original_vertices.div_ceil(stride) < MIN_TARGET_VERTICES {
        stride -= 1;
    }

    let mut vertices = Vec::with_capacity(target.min(original_vertices));
    let mut index_map: HashMap<u32, u32> = HashMap::new();

    for (i, vertex) in mesh.vertices.iter().enumerate() {
        if i % stride == 0 {
            index_map.insert(i as u32, vertices.len() as u32);
            vertices.push(vertex.clone());
        }
    }

    let mut faces = Vec::new();
    for face in &mesh.faces {
        if let (Some(&i0), Some(&i1), Some(&i2)) = (
            index_map.get(&face[0]),
            index_map.get(&face[1]),
            index_map.get(&face[2]),
        ) {
            faces.push([i0, i1, i2]);
        }
    }

    if faces.is_empty() && original_triangles > 0 {
        warn!(
            ratio = params.ratio,
            stride, "Stride sampling removed every triangle, falling back to distance merge"
        );
        return merge_simplify(mesh, params.ratio);
    }

    let mut result = Mesh { vertices, faces };
    if !result.has_normals() {
        result.compute_normals();
    }

    info!(
        vertices = format!("{} -> {}", original_vertices, result.vertex_count()),
        triangles = format!("{} -> {}", original_triangles, result.face_count()),
        "Simplified mesh"
    );

    SimplifyResult {
        final_vertices: result.vertex_count(),
        final_triangles: result.face_count(),
        mesh: result,
        original_vertices,
        original_triangles,
        used_fallback: false,
    }
}

/// Distance-based merge fallback.
///
/// Vertices are visited in original order and merged into the first
/// previously emitted vertex within the merge distance; triangles whose
/// remapped corners are not pairwise distinct are dropped. Normals are
/// always recomputed.
fn merge_simplify(mesh: &Mesh, ratio: f64) -> SimplifyResult {
    let merge_distance = 0.01 * (1.0 - ratio);
    let original_vertices = mesh.vertex_count();
    let original_triangles = mesh.face_count();

    let mut vertices: Vec<Vertex> = Vec::new();
    let mut index_map: Vec<u32> = Vec::with_capacity(original_vertices);

    for vertex in &mesh.vertices {
        let found = vertices
            .iter()
            .position(|v| (v.position - vertex.position).norm() < merge_distance);
        match found {
            Some(existing) => index_map.push(existing as u32),
            None => {
                index_map.push(vertices.len() as u32);
                vertices.push(Vertex::new(vertex.position));
            }
        }
    }

    let mut faces = Vec::new();
    for face in &mesh.faces {
        let i0 = index_map[face[0] as usize];
        let i1 = index_map[face[1] as usize];
        let i2 = index_map[face[2] as usize];
        if i0 != i1 && i1 != i2 && i2 != i0 {
            faces.push([i0, i1, i2]);
        }
    }

    let mut result = Mesh { vertices, faces };
    result.compute_normals();

    info!(
        merge_distance,
        vertices = format!("{} -> {}", original_vertices, result.vertex_count()),
        "Merge fallback complete"
    );

    SimplifyResult {
        final_vertices: result.vertex_count(),
        final_triangles: result.face_count(),
        mesh: result,
        original_vertices,
        original_triangles,
        used_fallback: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point2;

    /// Dense strip of quads along +Z: `rings` vertex pairs, 2 triangles per
    /// quad.
    fn strip(rings: usize) -> Mesh {
        let mut mesh = Mesh::new();
        for i in 0..rings {
            let z = i as f64;
            let mut a = Vertex::from_coords(0.0, 0.0, z);
            a.uv = Some(Point2::new(0.0, z));
            let mut b = Vertex::from_coords(1.0, 0.0, z);
            b.uv = Some(Point2::new(1.0, z));
            mesh.vertices.push(a);
            mesh.vertices.push(b);
        }
        for i in 0..rings as u32 - 1 {
            let base = i * 2;
            mesh.faces.push([base, base + 1, base + 2]);
            mesh.faces.push([base + 1, base + 3, base + 2]);
        }
        mesh
    }

    #[test]
    fn test_ratio_one_is_identity() {
        let mesh = strip(20);
        let result = simplify_mesh(&mesh, &SimplifyParams { ratio: 1.0 });

        assert!(!result.used_fallback);
        assert_eq!(result.final_vertices, mesh.vertex_count());
        assert_eq!(result.final_triangles, mesh.face_count());
        assert_eq!(result.mesh.faces, mesh.faces);
        for (a, b) in mesh.vertices.iter().zip(&result.mesh.vertices) {
            assert_relative_eq!(a.position, b.position);
            assert_eq!(a.uv, b.uv);
        }
    }

    #[test]
    fn test_minimum_vertex_floor() {
        let mesh = strip(10); // 20 vertices
        let result = simplify_mesh(&mesh, &SimplifyParams { ratio: 0.01 });

        // Target clamps to 8 even at an extreme ratio.
        assert!(result.final_vertices >= MIN_TARGET_VERTICES.min(mesh.vertex_count()));
    }

    #[test]
    fn test_indices_stay_in_range() {
        let mesh = strip(40);
        for ratio in [0.2, 0.5, 0.8] {
            let result = simplify_mesh(&mesh, &SimplifyParams { ratio });
            result.mesh.validate_indices().unwrap();
        }
    }

    #[test]
    fn test_stride_keeps_aligned_triangles() {
        // Faces whose corners all sit on even indices survive a stride of 2.
        let mut mesh = Mesh::new();
        for i in 0..20 {
            mesh.vertices
                .push(Vertex::from_coords(i as f64, (i % 3) as f64, 0.0));
        }
        mesh.faces.push([0, 2, 4]);
        mesh.faces.push([4, 6, 8]);
        mesh.faces.push([8, 10, 12]);

        let result = simplify_mesh(&mesh, &SimplifyParams { ratio: 0.5 });
        assert!(!result.used_fallback);
        assert_eq!(result.final_vertices, 10);
        assert_eq!(result.final_triangles, 3);
        result.mesh.validate_indices().unwrap();
    }

    #[test]
    fn test_fallback_on_zero_survivors() {
        // With stride 2 every face loses a corner: faces alternate odd/even
        // indices, so no triangle survives and the merge fallback runs.
        let mesh = strip(30);
        let result = simplify_mesh(&mesh, &SimplifyParams { ratio: 0.5 });

        // Either path is acceptable, but the result must stay consistent.
        result.mesh.validate_indices().unwrap();
        if result.used_fallback {
            assert!(result.mesh.has_normals());
        }
    }

    #[test]
    fn test_fallback_merges_coincident_vertices() {
        // Duplicate every position so stride sampling strands the faces and
        // the fallback is forced; coincident duplicates then merge.
        let mut mesh = Mesh::new();
        for i in 0..12u32 {
            let p = Point2::new(f64::from(i % 4), f64::from(i / 4));
            mesh.vertices.push(Vertex::from_coords(p.x, p.y, 0.0));
            mesh.vertices.push(Vertex::from_coords(p.x, p.y, 0.0));
        }
        // Faces that always touch an odd index.
        mesh.faces.push([1, 3, 5]);
        mesh.faces.push([7, 9, 11]);

        let result = simplify_mesh(&mesh, &SimplifyParams { ratio: 0.3 });
        assert!(result.used_fallback);
        // Coincident pairs collapse; degenerate faces disappear.
        assert!(result.final_vertices <= 12);
        result.mesh.validate_indices().unwrap();
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = Mesh::new();
        let result = simplify_mesh(&mesh, &SimplifyParams::default());
        assert_eq!(result.final_vertices, 0);
        assert!(!result.used_fallback);
    }

    #[test]
    fn test_params_clamp() {
        assert_relative_eq!(SimplifyParams::with_ratio(5.0).ratio, 1.0);
        assert_relative_eq!(SimplifyParams::with_ratio(-1.0).ratio, 0.01);
    }
}
