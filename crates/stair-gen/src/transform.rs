//! Object transforms used as placement targets and path waypoints.

use nalgebra::{Point3, UnitQuaternion, Vector3};

/// Position, rotation, and scale of a placed object.
///
/// Scale is assumed non-reflective. Directions (normals) are transformed by
/// rotation only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Point3<f64>,
    pub rotation: UnitQuaternion<f64>,
    pub scale: Vector3<f64>,
}

impl Transform {
    /// The identity transform at the world origin.
    pub fn identity() -> Self {
        Self {
            position: Point3::origin(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// A transform at the given position with identity rotation and unit scale.
    pub fn from_position(position: Point3<f64>) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    /// Apply scale, rotation, and translation to a local point.
    #[inline]
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        let scaled = Vector3::new(
            point.x * self.scale.x,
            point.y * self.scale.y,
            point.z * self.scale.z,
        );
        self.position + self.rotation * scaled
    }

    /// Apply rotation only to a local direction.
    #[inline]
    pub fn transform_direction(&self, direction: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * direction
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
