//! Pure placement math for repeated units.
//!
//! Everything here is a function from configuration to transforms; scene
//! bookkeeping lives in [`crate::stair`]. Three policies exist: a linear
//! chain along an offset vector, a rotation sweep with a lateral correction,
//! and a circular spiral.

use nalgebra::{Point3, UnitQuaternion, Vector3};
use std::f64::consts::TAU;

use crate::transform::Transform;

/// Transforms for a linear chain of `count` instances.
///
/// Instance `i` (1-based) sits at `origin.position + offset * i` and
/// inherits the origin's rotation and scale.
pub fn linear_transforms(origin: &Transform, offset: Vector3<f64>, count: usize) -> Vec<Transform> {
    (1..=count)
        .map(|i| Transform {
            position: origin.position + offset * i as f64,
            rotation: origin.rotation,
            scale: origin.scale,
        })
        .collect()
}

/// Transform for one instance of a rotation sweep.
///
/// `index` is 0-based out of `count`. The instance is rotated by a
/// progressive fraction of the final Y rotation and pushed sideways along
/// its own local X and Y axes, which turns a flat rotation into a sweeping,
/// banking run.
pub fn sweep_transform(
    origin: &Transform,
    offset: Vector3<f64>,
    final_rotation_y_degrees: f64,
    position_multiplier: f64,
    index: usize,
    count: usize,
) -> Transform {
    let progress = (index + 1) as f64 / count as f64;
    let rotation_y = final_rotation_y_degrees * progress;

    let rotation =
        origin.rotation * UnitQuaternion::from_euler_angles(0.0, rotation_y.to_radians(), 0.0);
    let base_position = origin.position + offset * (index + 1) as f64;

    let local_offset = sweep_position_offset(rotation_y, progress, position_multiplier);
    let position = base_position + rotation * local_offset;

    Transform {
        position,
        rotation,
        scale: origin.scale,
    }
}

/// Lateral correction for a sweep instance, in the instance's local axes.
///
/// Sign follows the rotation direction; magnitude grows with both the
/// rotation fraction and the instance's progress along the run. The path
/// axis component stays zero.
fn sweep_position_offset(rotation_y: f64, progress: f64, position_multiplier: f64) -> Vector3<f64> {
    let direction = rotation_y.signum();
    let intensity = rotation_y.abs() / 360.0;
    let value = intensity * position_multiplier * 10.0 * progress;

    Vector3::new(value * direction, value * direction, 0.0)
}

/// Transforms for every instance of a rotation sweep.
pub fn sweep_transforms(
    origin: &Transform,
    offset: Vector3<f64>,
    final_rotation_y_degrees: f64,
    position_multiplier: f64,
    count: usize,
) -> Vec<Transform> {
    (0..count)
        .map(|i| {
            sweep_transform(
                origin,
                offset,
                final_rotation_y_degrees,
                position_multiplier,
                i,
                count,
            )
        })
        .collect()
}

/// Spiral radius for `count` steps of the given spacing.
///
/// The circumference allots one spacing for the step and one for the gap,
/// using the same configured value for both terms.
pub fn spiral_radius(count: usize, step_spacing: f64) -> f64 {
    count as f64 * (step_spacing + step_spacing) / TAU
}

/// Transform for one instance of a circular spiral.
///
/// `index` is 0-based out of `count`. Consecutive instances advance by
/// `2π/count` radians around the vertical axis and one `height_step` in
/// elevation; each faces along the circle tangent.
pub fn spiral_transform(index: usize, count: usize, radius: f64, height_step: f64) -> Transform {
    let angle = index as f64 * TAU / count as f64;
    let position = Point3::new(
        radius * angle.cos(),
        index as f64 * height_step,
        radius * angle.sin(),
    );
    let tangent = Vector3::new(-angle.sin(), 0.0, angle.cos());
    let rotation = UnitQuaternion::face_towards(&tangent, &Vector3::y());

    Transform {
        position,
        rotation,
        scale: Vector3::new(1.0, 1.0, 1.0),
    }
}
