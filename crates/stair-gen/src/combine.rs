//! Combining placed meshes into a single baked mesh.

use tracing::{info, warn};

use crate::error::{StairError, StairResult};
use crate::scene::{ObjectHandle, Scene, SceneObject};
use crate::transform::Transform;
use crate::types::Mesh;

/// Bake and concatenate placed meshes into one world-space mesh.
///
/// Normals are recomputed on the result.
pub fn combine_meshes(inputs: &[(&Mesh, Transform)]) -> StairResult<Mesh> {
    if inputs.is_empty() {
        return Err(StairError::not_enough_meshes(1, 0));
    }

    let mut combined = Mesh::new();
    for (mesh, transform) in inputs {
        let offset = combined.vertices.len() as u32;
        let world = mesh.transformed(transform);
        combined.vertices.extend(world.vertices);
        for face in &world.faces {
            combined
                .faces
                .push([face[0] + offset, face[1] + offset, face[2] + offset]);
        }
    }

    combined.compute_normals();
    Ok(combined)
}

/// Combine the meshes of the selected objects into a new `Combined_Stairs`
/// object and destroy the inputs, keeping the protected origin alive.
///
/// Requires at least two objects with meshes; objects without a mesh are
/// skipped with a warning. The combined object carries the first input's
/// material.
pub fn combine_selected(
    scene: &mut Scene,
    handles: &[ObjectHandle],
    protected: Option<ObjectHandle>,
) -> StairResult<ObjectHandle> {
    let mut inputs: Vec<(&Mesh, Transform)> = Vec::new();
    let mut materials: Vec<String> = Vec::new();
    let mut consumed: Vec<ObjectHandle> = Vec::new();

    for &handle in handles {
        let Some(object) = scene.get(handle) else {
            continue;
        };
        match &object.mesh {
            Some(mesh) => {
                if let Some(material) = &object.material
                    && !materials.contains(material)
                {
                    materials.push(material.clone());
                }
                inputs.push((mesh, object.transform));
                consumed.push(handle);
            }
            None => warn!(name = object.name.as_str(), "Object has no mesh, skipping"),
        }
    }

    if inputs.len() < 2 {
        return Err(StairError::not_enough_meshes(2, inputs.len()));
    }

    let mesh = combine_meshes(&inputs)?;
    info!(
        inputs = inputs.len(),
        vertices = mesh.vertex_count(),
        materials = materials.len(),
        "Combined selected objects"
    );

    let mut combined = SceneObject::new("Combined_Stairs", Transform::identity()).with_mesh(mesh);
    combined.material = materials.into_iter().next();
    let result = scene.spawn(combined);

    let mut destroyed = 0;
    for handle in consumed {
        if Some(handle) != protected && scene.remove(handle).is_some() {
            destroyed += 1;
        }
    }
    info!(destroyed, "Removed combined inputs");

    Ok(result)
}
