//! Core mesh data types.

use nalgebra::{Point2, Point3, Vector3};

use crate::transform::Transform;

/// A vertex with position and optional shading attributes.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// 3D position (local space unless documented otherwise).
    pub position: Point3<f64>,

    /// Unit normal vector. Absent normals fall back to world up wherever a
    /// direction is required.
    pub normal: Option<Vector3<f64>>,

    /// 2D texture coordinate.
    pub uv: Option<Point2<f64>>,
}

impl Vertex {
    /// Create a new vertex with only position set.
    #[inline]
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            normal: None,
            uv: None,
        }
    }

    /// Create a vertex from raw coordinates.
    #[inline]
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }

    /// Create a vertex with position and normal.
    #[inline]
    pub fn with_normal(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            position,
            normal: Some(normal),
            uv: None,
        }
    }
}

/// A triangle mesh with indexed vertices and faces.
///
/// Faces are `[v0, v1, v2]` index triples into the vertex array with
/// counter-clockwise winding. Normal and UV channels are carried per vertex
/// and may be absent.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Vertex data.
    pub vertices: Vec<Vertex>,

    /// Triangle faces as indices into the vertex array.
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Number of vertices in the mesh.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces (triangles) in the mesh.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if mesh is empty (no vertices or faces).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// True if any vertex carries a normal.
    pub fn has_normals(&self) -> bool {
        self.vertices.iter().any(|v| v.normal.is_some())
    }

    /// True if any vertex carries a texture coordinate.
    pub fn has_uvs(&self) -> bool {
        self.vertices.iter().any(|v| v.uv.is_some())
    }

    /// Compute the axis-aligned bounding box.
    /// Returns (min_corner, max_corner) or None if mesh has no vertices.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        if self.vertices.is_empty() {
            return None;
        }

        let mut min = self.vertices[0].position;
        let mut max = self.vertices[0].position;

        for vertex in &self.vertices[1..] {
            let p = &vertex.position;
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        Some((min, max))
    }

    /// Iterate over triangles, yielding Triangle structs with actual vertex data.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.faces.iter().map(|&[i0, i1, i2]| Triangle {
            v0: self.vertices[i0 as usize].position,
            v1: self.vertices[i1 as usize].position,
            v2: self.vertices[i2 as usize].position,
        })
    }

    /// Bake a transform into a copy of the mesh: positions go through the
    /// full transform, normals through rotation only.
    pub fn transformed(&self, transform: &Transform) -> Mesh {
        let vertices = self
            .vertices
            .iter()
            .map(|v| Vertex {
                position: transform.transform_point(&v.position),
                normal: v.normal.map(|n| transform.transform_direction(&n)),
                uv: v.uv,
            })
            .collect();

        Mesh {
            vertices,
            faces: self.faces.clone(),
        }
    }

    /// Compute vertex normals from face normals (area-weighted average).
    ///
    /// Overwrites any existing normals.
    pub fn compute_normals(&mut self) {
        let mut accumulated = vec![Vector3::zeros(); self.vertices.len()];

        for &[i0, i1, i2] in &self.faces {
            let tri = Triangle {
                v0: self.vertices[i0 as usize].position,
                v1: self.vertices[i1 as usize].position,
                v2: self.vertices[i2 as usize].position,
            };
            // Unnormalized cross product weights by triangle area.
            let n = tri.normal_unnormalized();
            accumulated[i0 as usize] += n;
            accumulated[i1 as usize] += n;
            accumulated[i2 as usize] += n;
        }

        for (vertex, sum) in self.vertices.iter_mut().zip(accumulated) {
            vertex.normal = sum.try_normalize(f64::EPSILON);
        }
    }

    /// Check that every face index is in range.
    pub fn validate_indices(&self) -> crate::error::StairResult<()> {
        let count = self.vertices.len();
        for (face_index, face) in self.faces.iter().enumerate() {
            for &idx in face {
                if idx as usize >= count {
                    return Err(crate::error::StairError::invalid_vertex_index(
                        face_index, idx, count,
                    ));
                }
            }
        }
        Ok(())
    }
}

/// A triangle with concrete vertex positions.
///
/// Utility type for geometric calculations. Winding is counter-clockwise
/// when viewed from the front.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub v0: Point3<f64>,
    pub v1: Point3<f64>,
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle from three points.
    #[inline]
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Compute the (unnormalized) face normal via cross product.
    #[inline]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        let e1 = self.v1 - self.v0;
        let e2 = self.v2 - self.v0;
        e1.cross(&e2)
    }

    /// Compute the unit face normal.
    /// Returns None for degenerate triangles (zero area).
    pub fn normal(&self) -> Option<Vector3<f64>> {
        let n = self.normal_unnormalized();
        let len_sq = n.norm_squared();
        if len_sq > f64::EPSILON {
            Some(n / len_sq.sqrt())
        } else {
            None
        }
    }

    /// Compute the area of the triangle.
    #[inline]
    pub fn area(&self) -> f64 {
        self.normal_unnormalized().norm() * 0.5
    }
}
