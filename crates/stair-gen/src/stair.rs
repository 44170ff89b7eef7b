//! Scene-level staircase generation.
//!
//! [`StairGenerator`] owns the duplicates it creates through scene handles
//! and re-places them under one of the three placement policies. Placement
//! itself is the pure math in [`crate::placement`]; callers change the
//! configuration and ask for a refresh instead of the generator diffing
//! parameters behind their back.

use nalgebra::{Point3, Vector3};
use tracing::{info, warn};

use crate::error::{StairError, StairResult};
use crate::placement;
use crate::scene::{self, ObjectHandle, Scene, SceneObject};
use crate::transform::Transform;

/// Configuration for staircase generation.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
pub struct StairConfig {
    /// Number of duplicates to generate.
    pub count: usize,
    /// Offset vector between consecutive steps.
    pub offset: Vector3<f64>,
    /// Total Y rotation reached by the last instance of a rotation sweep,
    /// in degrees.
    pub final_rotation_y: f64,
    /// Strength of the sweep's lateral correction.
    pub position_multiplier: f64,
    /// Step spacing along the spiral circumference.
    pub step_spacing: f64,
    /// Elevation gained per spiral step.
    pub height_step: f64,
}

impl Default for StairConfig {
    fn default() -> Self {
        Self {
            count: 11,
            offset: Vector3::new(0.0, 1.0, 1.0),
            final_rotation_y: 90.0,
            position_multiplier: 0.1,
            step_spacing: 15.0,
            height_step: 25.0,
        }
    }
}

/// Which placement policy currently shapes the staircase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementMode {
    #[default]
    Linear,
    RotationSweep,
    Spiral,
}

/// Generates and owns staircase duplicates in a scene.
#[derive(Debug)]
pub struct StairGenerator {
    origin: ObjectHandle,
    config: StairConfig,
    mode: PlacementMode,
    container: Option<ObjectHandle>,
    instances: Vec<ObjectHandle>,
    run_counter: u32,
}

impl StairGenerator {
    /// Create a generator for the given origin object.
    pub fn new(origin: ObjectHandle, config: StairConfig) -> Self {
        Self {
            origin,
            config,
            mode: PlacementMode::Linear,
            container: None,
            instances: Vec::new(),
            run_counter: 1,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &StairConfig {
        &self.config
    }

    /// Replace the configuration. Call [`Self::refresh`] or
    /// [`Self::set_count`] afterwards to apply it.
    pub fn set_config(&mut self, config: StairConfig) {
        self.config = config;
    }

    /// Active placement mode.
    pub fn mode(&self) -> PlacementMode {
        self.mode
    }

    /// Handles of the current duplicates in sequence order.
    pub fn instances(&self) -> &[ObjectHandle] {
        &self.instances
    }

    /// Generate the configured number of duplicates from scratch.
    ///
    /// Idempotent: any duplicates from a previous run are destroyed first,
    /// including stale ones found by name. Returns the number created.
    pub fn generate(&mut self, scene: &mut Scene) -> StairResult<usize> {
        let origin = scene
            .get(self.origin)
            .ok_or_else(|| StairError::missing_reference("origin object"))?;
        let origin_name = origin.name.clone();
        let origin_transform = origin.transform;
        let template = origin.clone();

        self.clear(scene);

        let container = scene.spawn(SceneObject::new(
            format!("CollectionStep{}", self.run_counter),
            Transform::from_position(origin_transform.position),
        ));
        self.run_counter += 1;
        self.container = Some(container);

        let placements =
            placement::linear_transforms(&origin_transform, self.config.offset, self.config.count);
        for (i, transform) in placements.into_iter().enumerate() {
            let seq = (i + 1) as u32;
            let mut duplicate = template.clone();
            duplicate.name = scene::duplicate_name(&origin_name, seq);
            duplicate.transform = transform;
            duplicate.parent = Some(container);
            self.instances.push(scene.spawn(duplicate));
        }

        self.mode = PlacementMode::Linear;
        info!(count = self.instances.len(), "Generated staircase duplicates");
        Ok(self.instances.len())
    }

    /// Destroy every duplicate this generator owns, plus any stale object
    /// still carrying the origin's duplicate naming.
    pub fn clear(&mut self, scene: &mut Scene) {
        if let Some(container) = self.container.take() {
            scene.remove_with_children(container);
        }
        for handle in self.instances.drain(..) {
            scene.remove(handle);
        }
        if let Some(origin) = scene.get(self.origin) {
            let origin_name = origin.name.clone();
            scene.remove_named_duplicates(&origin_name);
        }
        self.mode = PlacementMode::Linear;
    }

    /// Grow or shrink the duplicate chain without a full rebuild.
    ///
    /// Growing appends instances chained from the last existing one;
    /// shrinking removes from the tail and renames the survivors to keep
    /// the 1-based sequence contiguous. The active placement mode is then
    /// re-applied.
    pub fn set_count(&mut self, scene: &mut Scene, count: usize) -> StairResult<()> {
        if self.instances.is_empty() {
            return Err(StairError::NoInstances);
        }
        let origin = scene
            .get(self.origin)
            .ok_or_else(|| StairError::missing_reference("origin object"))?;
        let origin_name = origin.name.clone();

        let current = self.instances.len();
        if count > current {
            let Some(&last) = self.instances.last() else {
                return Err(StairError::NoInstances);
            };
            let template = scene
                .get(last)
                .ok_or_else(|| StairError::missing_reference("last duplicate"))?
                .clone();
            let mut chain_position = template.transform.position;

            for seq in (current + 1)..=count {
                chain_position += self.config.offset;
                let mut duplicate = template.clone();
                duplicate.name = scene::duplicate_name(&origin_name, seq as u32);
                duplicate.transform.position = chain_position;
                duplicate.parent = self.container;
                self.instances.push(scene.spawn(duplicate));
            }
            info!(added = count - current, "Appended duplicates");
        } else if count < current {
            for handle in self.instances.drain(count..) {
                scene.remove(handle);
            }
            for (i, &handle) in self.instances.iter().enumerate() {
                if let Some(object) = scene.get_mut(handle) {
                    object.name = scene::duplicate_name(&origin_name, (i + 1) as u32);
                }
            }
            info!(removed = current - count, "Removed duplicates from tail");
        }

        self.config.count = count;
        self.refresh(scene)
    }

    /// Re-place every instance under the active placement mode.
    pub fn refresh(&mut self, scene: &mut Scene) -> StairResult<()> {
        match self.mode {
            PlacementMode::Linear => self.apply_linear(scene),
            PlacementMode::RotationSweep => self.apply_rotation_sweep(scene),
            PlacementMode::Spiral => self.apply_spiral(scene),
        }
    }

    fn apply_linear(&mut self, scene: &mut Scene) -> StairResult<()> {
        let origin_transform = self.origin_transform(scene)?;
        let sorted = self.sorted_instances(scene);
        let placements =
            placement::linear_transforms(&origin_transform, self.config.offset, sorted.len());

        for (handle, transform) in sorted.into_iter().zip(placements) {
            if let Some(object) = scene.get_mut(handle) {
                object.transform.position = transform.position;
                object.transform.rotation = transform.rotation;
            }
        }
        self.mode = PlacementMode::Linear;
        Ok(())
    }

    /// Bend the run into a rotation sweep around the origin.
    ///
    /// Requires existing duplicates; instances are re-sorted by sequence
    /// number before placement.
    pub fn apply_rotation_sweep(&mut self, scene: &mut Scene) -> StairResult<()> {
        if self.instances.is_empty() {
            warn!("No duplicates found, generate them first");
            return Err(StairError::NoInstances);
        }
        let origin_transform = self.origin_transform(scene)?;
        let sorted = self.sorted_instances(scene);
        let count = sorted.len();

        for (i, handle) in sorted.into_iter().enumerate() {
            let transform = placement::sweep_transform(
                &origin_transform,
                self.config.offset,
                self.config.final_rotation_y,
                self.config.position_multiplier,
                i,
                count,
            );
            if let Some(object) = scene.get_mut(handle) {
                object.transform.position = transform.position;
                object.transform.rotation = transform.rotation;
            }
        }

        self.mode = PlacementMode::RotationSweep;
        info!(count, final_rotation_y = self.config.final_rotation_y, "Applied rotation sweep");
        Ok(())
    }

    /// Arrange the run as a circular spiral.
    ///
    /// Requires existing duplicates; instances are re-sorted by sequence
    /// number before placement.
    pub fn apply_spiral(&mut self, scene: &mut Scene) -> StairResult<()> {
        if self.instances.is_empty() {
            warn!("No step duplicates found, generate them first");
            return Err(StairError::NoInstances);
        }
        let sorted = self.sorted_instances(scene);
        let count = sorted.len();
        let radius = placement::spiral_radius(count, self.config.step_spacing);

        for (i, handle) in sorted.into_iter().enumerate() {
            let transform = placement::spiral_transform(i, count, radius, self.config.height_step);
            if let Some(object) = scene.get_mut(handle) {
                object.transform.position = transform.position;
                object.transform.rotation = transform.rotation;
            }
        }

        self.mode = PlacementMode::Spiral;
        info!(count, radius, "Applied spiral placement");
        Ok(())
    }

    /// Copy the origin's blend-shape weights onto every duplicate.
    ///
    /// Returns the number of duplicates updated. An origin without weights
    /// is not an error; nothing is updated.
    pub fn sync_blend_weights(&self, scene: &mut Scene) -> StairResult<usize> {
        let origin = scene
            .get(self.origin)
            .ok_or_else(|| StairError::missing_reference("origin object"))?;
        let Some(weights) = origin.blend_weights.clone() else {
            warn!("Origin carries no blend-shape weights");
            return Ok(0);
        };

        let mut updated = 0;
        for &handle in &self.instances {
            if let Some(object) = scene.get_mut(handle) {
                object.blend_weights = Some(weights.clone());
                updated += 1;
            }
        }
        info!(updated, "Synchronized blend-shape weights");
        Ok(updated)
    }

    /// World positions of the duplicates in sequence order, used as path
    /// waypoints for railing deformation.
    pub fn instance_positions(&self, scene: &Scene) -> Vec<Point3<f64>> {
        self.sorted_instances(scene)
            .into_iter()
            .filter_map(|h| scene.get(h).map(|o| o.transform.position))
            .collect()
    }

    fn origin_transform(&self, scene: &Scene) -> StairResult<Transform> {
        scene
            .get(self.origin)
            .map(|o| o.transform)
            .ok_or_else(|| StairError::missing_reference("origin object"))
    }

    /// Live instance handles re-sorted by the sequence number parsed from
    /// their names. Placement is not order-stable from unordered scene
    /// queries, so every placement pass sorts first.
    fn sorted_instances(&self, scene: &Scene) -> Vec<ObjectHandle> {
        let mut with_seq: Vec<(u32, ObjectHandle)> = self
            .instances
            .iter()
            .filter_map(|&handle| {
                let object = scene.get(handle)?;
                let origin = scene.get(self.origin)?;
                scene::parse_duplicate_seq(&object.name, &origin.name).map(|seq| (seq, handle))
            })
            .collect();
        with_seq.sort_by_key(|&(seq, _)| seq);
        with_seq.into_iter().map(|(_, handle)| handle).collect()
    }
}
