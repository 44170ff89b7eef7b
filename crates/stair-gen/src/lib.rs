//! Procedural staircase and railing generation.
//!
//! This crate is an authoring-time mesh tool: it duplicates a "step" mesh
//! along an offset vector to build a staircase, optionally bends the run
//! into a rotation sweep or a circular spiral, and generates companion
//! railings that are welded at touching faces and deformed to follow the
//! resulting stair path.
//!
//! # Pipeline
//!
//! - **Placement** ([`placement`], [`stair`]): transforms for repeated
//!   units under linear, rotation-sweep, and spiral policies, with
//!   length-delta-aware regeneration for interactive editing.
//! - **Welding** ([`weld`]): adjacent-face vertex welding across an ordered
//!   run of instances, producing one seamless combined mesh.
//! - **Deformation** ([`deform`]): re-maps a straight mesh onto an
//!   arbitrary waypoint polyline.
//! - **Simplification** ([`simplify`]): a crude stride decimator with a
//!   distance-merge fallback.
//!
//! The railing pipeline ([`railing`]) chains these phases as plain
//! sequential calls; [`scene`] provides the object registry the scene-level
//! operations work against.
//!
//! # Quick start
//!
//! ```
//! use stair_gen::{Mesh, Scene, SceneObject, StairConfig, StairGenerator, Transform, Vertex};
//! use nalgebra::Vector3;
//!
//! let mut scene = Scene::new();
//!
//! // A one-triangle stand-in for the step prefab.
//! let mut step = Mesh::new();
//! step.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
//! step.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
//! step.vertices.push(Vertex::from_coords(0.0, 0.2, 1.0));
//! step.faces.push([0, 1, 2]);
//!
//! let origin = scene.spawn(SceneObject::new("step", Transform::identity()).with_mesh(step));
//! let mut stairs = StairGenerator::new(
//!     origin,
//!     StairConfig {
//!         count: 8,
//!         offset: Vector3::new(0.0, 0.5, 1.0),
//!         ..StairConfig::default()
//!     },
//! );
//! stairs.generate(&mut scene).unwrap();
//! assert_eq!(stairs.instances().len(), 8);
//! ```
//!
//! # Coordinate system and path axis
//!
//! Right-handed, Y up. The path axis — the direction staircase and railing
//! segments are chained along — is **Z**. Face classification, extent
//! measurement, and path parameterization all run along Z.
//!
//! # Error handling
//!
//! Operations return [`StairResult`]. Configuration and precondition errors
//! abort before mutating the scene; degenerate geometry (an empty seam face
//! set, a decimation that kills every triangle) logs a warning and falls
//! back instead of failing. See [`error`] for the taxonomy.

pub mod combine;
pub mod deform;
mod error;
pub mod extent;
pub mod io;
pub mod path;
pub mod placement;
pub mod railing;
pub mod scene;
pub mod simplify;
pub mod stair;
pub mod tracing_ext;
mod transform;
mod types;
pub mod weld;

// Re-export core types at crate root
pub use error::{ErrorCode, StairError, StairResult};
pub use scene::{ObjectHandle, Scene, SceneObject};
pub use transform::Transform;
pub use types::{Mesh, Triangle, Vertex};

// Re-export commonly used operations
pub use combine::{combine_meshes, combine_selected};
pub use deform::deform_to_path;
pub use extent::{ExtentSource, resolve_extent};
pub use path::{PathParams, stair_path};
pub use placement::{linear_transforms, spiral_radius, spiral_transform, sweep_transforms};
pub use railing::{RailingConfig, RailingGenerator, RailingResult, RailingSide};
pub use simplify::{SimplifyParams, SimplifyResult, simplify_mesh};
pub use stair::{PlacementMode, StairConfig, StairGenerator};
pub use weld::{FaceReport, SceneWeld, WeldParams, WeldResult, face_report, weld_adjacent, weld_selected};

// Convenience methods on Mesh
impl Mesh {
    /// Load a mesh from a file, auto-detecting format from extension.
    pub fn load(path: impl AsRef<std::path::Path>) -> StairResult<Self> {
        io::load_mesh(path.as_ref())
    }

    /// Save the mesh to a file, auto-detecting format from extension.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> StairResult<()> {
        io::save_mesh(self, path.as_ref())
    }

    /// Simplify the mesh by a target vertex retention ratio.
    pub fn simplify(&self, ratio: f64) -> SimplifyResult {
        simplify_mesh(self, &SimplifyParams::with_ratio(ratio))
    }

    /// Deform the mesh onto a waypoint path.
    pub fn follow_path(&self, waypoints: &[nalgebra::Point3<f64>]) -> StairResult<Mesh> {
        deform_to_path(self, waypoints)
    }
}
