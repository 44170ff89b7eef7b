//! Wavefront OBJ load and save.
//!
//! OBJ is the one format this tool reads and writes: it is indexed storage,
//! so triangle structure survives a round trip. Faces are triangulated on
//! load and each distinct position/uv/normal corner becomes one unified
//! vertex.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use hashbrown::HashMap;
use nalgebra::{Point2, Point3, Vector3};
use tracing::info;

use crate::error::{StairError, StairResult};
use crate::types::{Mesh, Vertex};

/// Load a mesh from a file, detecting the format from the extension.
pub fn load_mesh(path: &Path) -> StairResult<Mesh> {
    match extension(path).as_deref() {
        Some("obj") => load_obj(path),
        other => Err(StairError::UnsupportedFormat {
            extension: other.map(str::to_string),
        }),
    }
}

/// Save a mesh to a file, detecting the format from the extension.
pub fn save_mesh(mesh: &Mesh, path: &Path) -> StairResult<()> {
    match extension(path).as_deref() {
        Some("obj") => save_obj(mesh, path),
        other => Err(StairError::UnsupportedFormat {
            extension: other.map(str::to_string),
        }),
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Load a Wavefront OBJ file.
pub fn load_obj(path: &Path) -> StairResult<Mesh> {
    let file = File::open(path).map_err(|e| StairError::io_read(path, e))?;
    let reader = BufReader::new(file);

    let mut positions: Vec<Point3<f64>> = Vec::new();
    let mut normals: Vec<Vector3<f64>> = Vec::new();
    let mut uvs: Vec<Point2<f64>> = Vec::new();

    let mut mesh = Mesh::new();
    // One output vertex per distinct position/uv/normal index triple.
    let mut corner_map: HashMap<(usize, Option<usize>, Option<usize>), u32> = HashMap::new();

    for (line_number, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| StairError::io_read(path, e))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        let keyword = parts.next().unwrap_or_default();
        let parse_err =
            |detail: &str| StairError::parse_error(path, format!("line {}: {detail}", line_number + 1));

        match keyword {
            "v" => {
                let coords = parse_floats::<3>(&mut parts)
                    .ok_or_else(|| parse_err("malformed vertex position"))?;
                positions.push(Point3::new(coords[0], coords[1], coords[2]));
            }
            "vn" => {
                let coords = parse_floats::<3>(&mut parts)
                    .ok_or_else(|| parse_err("malformed vertex normal"))?;
                normals.push(Vector3::new(coords[0], coords[1], coords[2]));
            }
            "vt" => {
                let coords = parse_floats::<2>(&mut parts)
                    .ok_or_else(|| parse_err("malformed texture coordinate"))?;
                uvs.push(Point2::new(coords[0], coords[1]));
            }
            "f" => {
                let mut corners: Vec<u32> = Vec::with_capacity(4);
                for corner in parts {
                    let (vi, ti, ni) = parse_corner(corner, positions.len(), uvs.len(), normals.len())
                        .ok_or_else(|| parse_err("malformed face corner"))?;

                    let index = *corner_map.entry((vi, ti, ni)).or_insert_with(|| {
                        let vertex = Vertex {
                            position: positions[vi],
                            normal: ni.map(|i| normals[i]),
                            uv: ti.map(|i| uvs[i]),
                        };
                        mesh.vertices.push(vertex);
                        (mesh.vertices.len() - 1) as u32
                    });
                    corners.push(index);
                }

                if corners.len() < 3 {
                    return Err(parse_err("face with fewer than 3 corners"));
                }
                for i in 1..corners.len() - 1 {
                    mesh.faces.push([corners[0], corners[i], corners[i + 1]]);
                }
            }
            // Groups, objects, materials and smoothing are ignored.
            _ => {}
        }
    }

    if mesh.is_empty() {
        return Err(StairError::empty_mesh(format!(
            "{} contains no usable geometry",
            path.display()
        )));
    }

    info!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "Loaded OBJ"
    );
    Ok(mesh)
}

fn parse_floats<const N: usize>(parts: &mut std::str::SplitWhitespace<'_>) -> Option<[f64; N]> {
    let mut out = [0.0; N];
    for slot in &mut out {
        *slot = parts.next()?.parse().ok()?;
    }
    Some(out)
}

/// Parse one face corner (`v`, `v/vt`, `v//vn`, or `v/vt/vn`) into
/// zero-based indices, validating ranges. Negative (relative) indices count
/// back from the end of the respective list.
fn parse_corner(
    corner: &str,
    positions: usize,
    uvs: usize,
    normals: usize,
) -> Option<(usize, Option<usize>, Option<usize>)> {
    let mut fields = corner.split('/');

    let vi = resolve_index(fields.next()?, positions)?;
    let ti = match fields.next() {
        None | Some("") => None,
        Some(field) => Some(resolve_index(field, uvs)?),
    };
    let ni = match fields.next() {
        None | Some("") => None,
        Some(field) => Some(resolve_index(field, normals)?),
    };

    Some((vi, ti, ni))
}

fn resolve_index(field: &str, len: usize) -> Option<usize> {
    let value: i64 = field.parse().ok()?;
    let index = if value > 0 {
        (value - 1) as usize
    } else if value < 0 {
        len.checked_sub(value.unsigned_abs() as usize)?
    } else {
        return None;
    };
    (index < len).then_some(index)
}

/// Save a mesh as Wavefront OBJ.
///
/// Normal and UV channels are written when any vertex carries them; absent
/// entries fall back to world up and the UV origin so the channels stay
/// parallel to the positions.
pub fn save_obj(mesh: &Mesh, path: &Path) -> StairResult<()> {
    let file = File::create(path).map_err(|e| StairError::io_write(path, e))?;
    let mut writer = BufWriter::new(file);

    let write_err = |e: std::io::Error| StairError::io_write(path, e);

    let has_normals = mesh.has_normals();
    let has_uvs = mesh.has_uvs();

    for vertex in &mesh.vertices {
        let p = &vertex.position;
        writeln!(writer, "v {} {} {}", p.x, p.y, p.z).map_err(write_err)?;
    }
    if has_uvs {
        for vertex in &mesh.vertices {
            let uv = vertex.uv.unwrap_or_else(Point2::origin);
            writeln!(writer, "vt {} {}", uv.x, uv.y).map_err(write_err)?;
        }
    }
    if has_normals {
        for vertex in &mesh.vertices {
            let n = vertex.normal.unwrap_or_else(Vector3::y);
            writeln!(writer, "vn {} {} {}", n.x, n.y, n.z).map_err(write_err)?;
        }
    }

    for face in &mesh.faces {
        let [a, b, c] = face.map(|i| i as u64 + 1);
        match (has_uvs, has_normals) {
            (false, false) => writeln!(writer, "f {a} {b} {c}"),
            (true, false) => writeln!(writer, "f {a}/{a} {b}/{b} {c}/{c}"),
            (false, true) => writeln!(writer, "f {a}//{a} {b}//{b} {c}//{c}"),
            (true, true) => writeln!(writer, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}"),
        }
        .map_err(write_err)?;
    }

    writer.flush().map_err(write_err)?;
    info!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "Saved OBJ"
    );
    Ok(())
}
