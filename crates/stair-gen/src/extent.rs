//! Measuring the length of a repeat unit along the path axis.

use tracing::debug;

use crate::scene::SceneObject;

/// Which measurement produced an object's extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtentSource {
    /// Mesh bounding box depth scaled by the transform.
    MeshBounds,
    /// Transform scale alone (no mesh available).
    TransformScale,
    /// Constant fallback when nothing is measurable.
    Fallback,
}

/// Fallback extent when an object carries nothing measurable.
pub const FALLBACK_EXTENT: f64 = 1.0;

/// Resolve an object's extent along the path axis (Z).
///
/// Priority order: mesh bounds depth times transform scale, then the
/// transform's Z scale, then [`FALLBACK_EXTENT`]. The chosen source is
/// returned for logging.
pub fn resolve_extent(object: &SceneObject) -> (f64, ExtentSource) {
    if let Some(mesh) = &object.mesh
        && let Some((min, max)) = mesh.bounds()
    {
        let length = (max.z - min.z) * object.transform.scale.z;
        debug!(
            name = object.name.as_str(),
            length,
            source = "mesh bounds",
            "Resolved segment extent"
        );
        return (length, ExtentSource::MeshBounds);
    }

    let scale = object.transform.scale.z;
    if scale.is_finite() && scale > 0.0 {
        debug!(
            name = object.name.as_str(),
            length = scale,
            source = "transform scale",
            "Resolved segment extent"
        );
        return (scale, ExtentSource::TransformScale);
    }

    debug!(
        name = object.name.as_str(),
        length = FALLBACK_EXTENT,
        source = "fallback",
        "Resolved segment extent"
    );
    (FALLBACK_EXTENT, ExtentSource::Fallback)
}
