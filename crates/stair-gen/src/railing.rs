//! Railing generation: straight segments, seam welding, path following.
//!
//! The pipeline is three explicit phases, each committing its output before
//! the next phase reads it:
//!
//! 1. straight segment runs placed beside the staircase, one per side;
//! 2. each side's run welded into one seamless mesh;
//! 3. the welded mesh deformed onto the staircase path.
//!
//! An optional simplification pass can follow. Phases are plain sequential
//! calls returning results, so phase ordering is guaranteed by construction
//! rather than by scheduling.

use nalgebra::Point3;
use tracing::{info, warn};

use crate::deform::deform_to_path;
use crate::error::{StairError, StairResult};
use crate::extent::resolve_extent;
use crate::path::{PathParams, stair_path};
use crate::scene::{ObjectHandle, Scene, SceneObject};
use crate::simplify::{SimplifyParams, simplify_mesh};
use crate::stair::StairGenerator;
use crate::tracing_ext::OperationTimer;
use crate::transform::Transform;
use crate::weld::{WeldParams, weld_selected};

/// Which side of the staircase a railing run sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RailingSide {
    Left,
    Right,
}

impl RailingSide {
    /// Display name used in object naming.
    pub fn name(self) -> &'static str {
        match self {
            RailingSide::Left => "Left",
            RailingSide::Right => "Right",
        }
    }

    /// Sign of the lateral offset from the staircase centerline.
    fn multiplier(self) -> f64 {
        match self {
            RailingSide::Left => -1.0,
            RailingSide::Right => 1.0,
        }
    }
}

/// Configuration for railing generation.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
pub struct RailingConfig {
    /// Lateral distance from the staircase centerline.
    pub x_offset: f64,
    /// Number of straight segments per side.
    pub segment_count: usize,
    /// Generate runs on both sides instead of the right side only.
    pub both_sides: bool,
    /// Longitudinal overlap between consecutive segments, consumed so the
    /// seam faces coincide.
    pub overlap: f64,
    /// Path sampling parameters for the follow phase.
    pub path: PathParams,
    /// Welding parameters for the seam phase.
    pub weld: WeldParams,
    /// Optional post-process decimation ratio.
    pub simplify_ratio: Option<f64>,
}

impl Default for RailingConfig {
    fn default() -> Self {
        Self {
            x_offset: 2.0,
            segment_count: 10,
            both_sides: true,
            overlap: 0.05,
            path: PathParams::default(),
            weld: WeldParams::default(),
            simplify_ratio: None,
        }
    }
}

/// Summary of one full railing generation run.
#[derive(Debug, Clone)]
pub struct RailingResult {
    /// Finished railing objects, one per side.
    pub railings: Vec<ObjectHandle>,
    /// Waypoints in the stair path the railings follow.
    pub path_waypoints: usize,
    /// Total vertices welded across all sides.
    pub vertices_welded: usize,
}

/// Generates railings that follow a staircase.
#[derive(Debug)]
pub struct RailingGenerator {
    prefab: ObjectHandle,
    config: RailingConfig,
    /// Straight segment runs from the last generation, grouped per side.
    segment_runs: Vec<(RailingSide, Vec<ObjectHandle>)>,
    containers: Vec<ObjectHandle>,
    railings: Vec<ObjectHandle>,
}

impl RailingGenerator {
    /// Create a generator using the given railing segment prefab.
    pub fn new(prefab: ObjectHandle, config: RailingConfig) -> Self {
        Self {
            prefab,
            config,
            segment_runs: Vec::new(),
            containers: Vec::new(),
            railings: Vec::new(),
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &RailingConfig {
        &self.config
    }

    /// Finished railing objects from the last run.
    pub fn railings(&self) -> &[ObjectHandle] {
        &self.railings
    }

    /// Phase 1: place straight segment runs beside the origin.
    ///
    /// Segment spacing comes from the prefab's measured extent minus the
    /// configured overlap, so consecutive seam faces coincide within weld
    /// tolerance.
    pub fn generate_straight(&mut self, scene: &mut Scene) -> StairResult<()> {
        let prefab = scene
            .get(self.prefab)
            .ok_or_else(|| StairError::missing_reference("railing segment prefab"))?
            .clone();

        self.clear(scene);

        let (segment_length, _) = resolve_extent(&prefab);
        let effective_length = segment_length - self.config.overlap;
        info!(
            segment_length,
            effective_length,
            count = self.config.segment_count,
            "Generating straight railing segments"
        );

        let sides: &[RailingSide] = if self.config.both_sides {
            &[RailingSide::Right, RailingSide::Left]
        } else {
            &[RailingSide::Right]
        };

        for &side in sides {
            let container = scene.spawn(SceneObject::new(
                format!("StraightRailings_{}", side.name()),
                Transform::identity(),
            ));
            self.containers.push(container);

            let start = Point3::new(self.config.x_offset * side.multiplier(), 0.0, 0.0);
            let mut run = Vec::with_capacity(self.config.segment_count);
            for i in 0..self.config.segment_count {
                let mut segment = prefab.clone();
                segment.name = format!("Railing_{}_{}", side.name(), i + 1);
                segment.transform = Transform::from_position(Point3::new(
                    start.x,
                    start.y,
                    start.z + i as f64 * effective_length,
                ));
                segment.parent = Some(container);
                run.push(scene.spawn(segment));
            }
            self.segment_runs.push((side, run));
        }

        Ok(())
    }

    /// Run the full pipeline: straight segments, per-side welding, path
    /// following, optional simplification.
    ///
    /// The deformation path comes from the staircase duplicates, not from
    /// the railing segments themselves.
    pub fn generate(
        &mut self,
        scene: &mut Scene,
        stairs: &StairGenerator,
    ) -> StairResult<RailingResult> {
        let _timer = OperationTimer::new("generate_railings");

        // The path is validated up front so a bad staircase aborts before
        // any segments are placed.
        let steps = stairs.instance_positions(scene);
        let waypoints = stair_path(&steps, &self.config.path)?;

        self.generate_straight(scene)?;

        let mut vertices_welded = 0;
        let runs = std::mem::take(&mut self.segment_runs);
        for (side, run) in &runs {
            let weld = weld_selected(
                scene,
                run,
                &format!("Welded_Adjacent_Faces_{}", side.name()),
                &self.config.weld,
            )?;
            vertices_welded += weld.vertices_welded;

            let object = scene
                .get(weld.object)
                .ok_or_else(|| StairError::missing_reference("welded railing"))?;
            let mesh = object
                .mesh
                .as_ref()
                .ok_or_else(|| StairError::missing_mesh(object.name.clone()))?;

            let mut deformed = deform_to_path(mesh, &waypoints)?;

            if let Some(ratio) = self.config.simplify_ratio {
                let result = simplify_mesh(&deformed, &SimplifyParams::with_ratio(ratio));
                deformed = result.mesh;
            }

            let object = scene
                .get_mut(weld.object)
                .ok_or_else(|| StairError::missing_reference("welded railing"))?;
            object.mesh = Some(deformed);
            self.railings.push(weld.object);
        }
        self.segment_runs = runs;

        info!(
            sides = self.segment_runs.len(),
            waypoints = waypoints.len(),
            "Railing generation complete"
        );

        Ok(RailingResult {
            railings: self.railings.clone(),
            path_waypoints: waypoints.len(),
            vertices_welded,
        })
    }

    /// Destroy everything from the previous run.
    pub fn clear(&mut self, scene: &mut Scene) {
        for container in self.containers.drain(..) {
            scene.remove_with_children(container);
        }
        for (_, run) in self.segment_runs.drain(..) {
            for handle in run {
                scene.remove(handle);
            }
        }
        for handle in self.railings.drain(..) {
            if scene.remove(handle).is_none() {
                warn!("Railing object already removed");
            }
        }
    }
}
