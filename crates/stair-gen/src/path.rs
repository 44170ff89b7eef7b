//! Waypoint paths derived from placed stair steps.
//!
//! The deformation path is built from the *staircase* duplicates, not the
//! railing segments: step positions in sequence order, with interpolated
//! intermediate samples between consecutive steps so the deformer has
//! enough waypoints to follow a curved run.

use nalgebra::Point3;
use tracing::debug;

use crate::error::{StairError, StairResult};

/// Parameters for path sampling.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
pub struct PathParams {
    /// Interpolated samples inserted between consecutive steps.
    pub samples_per_step: usize,
    /// Smoothing factor in [0, 1] applied to intermediate samples.
    pub smoothing: f64,
}

impl Default for PathParams {
    fn default() -> Self {
        Self {
            samples_per_step: 3,
            smoothing: 0.1,
        }
    }
}

/// Build a waypoint path through the given step positions.
///
/// Requires at least two steps. Each consecutive pair contributes
/// `samples_per_step` interpolated points after the first step's own
/// position; the final step closes the path.
pub fn stair_path(steps: &[Point3<f64>], params: &PathParams) -> StairResult<Vec<Point3<f64>>> {
    if steps.len() < 2 {
        return Err(StairError::invalid_path(steps.len()));
    }

    let mut points = Vec::with_capacity(steps.len() * (params.samples_per_step + 1));

    for (i, &step) in steps.iter().enumerate() {
        points.push(step);

        if i + 1 < steps.len() {
            let next = steps[i + 1];
            for j in 1..=params.samples_per_step {
                let t = j as f64 / (params.samples_per_step + 1) as f64;
                let mut sample = lerp(step, next, t);
                if params.smoothing > 0.0 {
                    sample = smooth(sample, &points, params.smoothing);
                }
                points.push(sample);
            }
        }
    }

    debug!(
        steps = steps.len(),
        waypoints = points.len(),
        "Built stair path"
    );
    Ok(points)
}

/// Pull a sample toward the straight continuation from the previous point.
fn smooth(point: Point3<f64>, existing: &[Point3<f64>], factor: f64) -> Point3<f64> {
    if existing.len() < 2 {
        return point;
    }

    let last = existing[existing.len() - 1];
    let delta = point - last;
    let distance = delta.norm();
    if distance < f64::EPSILON {
        return point;
    }

    let direction = delta / distance;
    lerp(point, last + direction * distance, factor)
}

/// Linear interpolation between two points.
#[inline]
pub fn lerp(a: Point3<f64>, b: Point3<f64>, t: f64) -> Point3<f64> {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_too_few_steps() {
        let err = stair_path(&[Point3::origin()], &PathParams::default()).unwrap_err();
        assert!(matches!(
            err,
            crate::error::StairError::InvalidPath { waypoints: 1 }
        ));
    }

    #[test]
    fn test_two_steps_sample_count() {
        let steps = [Point3::origin(), Point3::new(0.0, 0.0, 4.0)];
        let params = PathParams {
            samples_per_step: 3,
            smoothing: 0.0,
        };
        let path = stair_path(&steps, &params).unwrap();

        // step, 3 samples, step
        assert_eq!(path.len(), 5);
        assert_relative_eq!(path[0], steps[0]);
        assert_relative_eq!(path[4], steps[1]);
        assert_relative_eq!(path[1].z, 1.0);
        assert_relative_eq!(path[2].z, 2.0);
        assert_relative_eq!(path[3].z, 3.0);
    }

    #[test]
    fn test_endpoints_are_step_positions() {
        let steps = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 1.0),
            Point3::new(0.0, 2.0, 2.0),
        ];
        let path = stair_path(&steps, &PathParams::default()).unwrap();
        assert_relative_eq!(path[0], steps[0]);
        assert_relative_eq!(*path.last().unwrap(), steps[2]);
    }

    #[test]
    fn test_smoothing_keeps_collinear_samples() {
        // On a straight run the smoothing target coincides with the sample,
        // so smoothed and unsmoothed paths agree.
        let steps = [Point3::origin(), Point3::new(0.0, 0.0, 10.0)];
        let plain = stair_path(
            &steps,
            &PathParams {
                samples_per_step: 4,
                smoothing: 0.0,
            },
        )
        .unwrap();
        let smoothed = stair_path(
            &steps,
            &PathParams {
                samples_per_step: 4,
                smoothing: 0.5,
            },
        )
        .unwrap();

        for (a, b) in plain.iter().zip(&smoothed) {
            assert_relative_eq!(*a, *b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_zero_samples_gives_steps_only() {
        let steps = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 1.0),
            Point3::new(0.0, 2.0, 2.0),
        ];
        let path = stair_path(
            &steps,
            &PathParams {
                samples_per_step: 0,
                smoothing: 0.1,
            },
        )
        .unwrap();
        assert_eq!(path.len(), 3);
    }
}
