pub mod combine;
pub mod follow;
pub mod info;
pub mod railing;
pub mod simplify;
pub mod stairs;
pub mod weld;

use nalgebra::Vector3;
use stair_gen::{Scene, SceneObject, StairConfig, StairGenerator, Transform};

use crate::PlacementModeArg;

/// Build a staircase scene from a step mesh and apply the requested
/// placement mode. Returns the scene and its generator.
#[allow(clippy::too_many_arguments)]
pub(crate) fn build_staircase(
    step_mesh: stair_gen::Mesh,
    count: usize,
    offset: Vector3<f64>,
    mode: PlacementModeArg,
    sweep_degrees: f64,
    position_multiplier: f64,
    step_spacing: f64,
    height_step: f64,
) -> anyhow::Result<(Scene, StairGenerator)> {
    let mut scene = Scene::new();
    let origin = scene.spawn(SceneObject::new("step", Transform::identity()).with_mesh(step_mesh));

    let mut stairs = StairGenerator::new(
        origin,
        StairConfig {
            count,
            offset,
            final_rotation_y: sweep_degrees,
            position_multiplier,
            step_spacing,
            height_step,
        },
    );
    stairs.generate(&mut scene)?;

    match mode {
        PlacementModeArg::Linear => {}
        PlacementModeArg::Sweep => stairs.apply_rotation_sweep(&mut scene)?,
        PlacementModeArg::Spiral => stairs.apply_spiral(&mut scene)?,
    }

    Ok((scene, stairs))
}
